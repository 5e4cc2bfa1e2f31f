use super::utils::color_valid_rgb_hex;
use anyhow::Context;
use clap::Args;
use image::Rgb;
use ndarray::{Array2, Array4, ArrayD, ArrayView4, Axis, Ix2};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tumorprep::prelude::{ModelHandle, PrepError, SegmentationModel, Upload, ViewerSession};
use tumorprep::render::{self, OVERLAY_RED};

#[derive(Args, Debug)]
pub struct Preview {
    /// FLAIR体数据(.nii/.nii.gz)。
    #[arg(long)]
    flair: PathBuf,
    /// T1体数据。
    #[arg(long)]
    t1: PathBuf,
    /// T1CE体数据。
    #[arg(long)]
    t1ce: PathBuf,
    /// T2体数据。
    #[arg(long)]
    t2: PathBuf,
    /// 切片索引（默认取中间切片）。
    #[arg(long = "slice", short)]
    slice: Option<usize>,
    /// 输出目录。
    #[arg(long = "output-dir", short)]
    out_dir: PathBuf,
    /// 推理运行时导出的概率图npy文件，形状为(H, W)或(1, H, W, 1)。
    #[arg(long, short)]
    predictions: Option<PathBuf>,
    /// 肿瘤叠加颜色（默认红色）。
    #[arg(long, short, value_parser = color_valid_rgb_hex)]
    color: Option<Rgb<u8>>,
}

impl Preview {
    pub fn run(&mut self) -> anyhow::Result<()> {
        // [flair, t1, t1ce, t2] -> [output-dir/{input.npy, flair.png, mask.png, overlay.png}]
        let uploads = [
            read_upload(&self.flair)?,
            read_upload(&self.t1)?,
            read_upload(&self.t1ce)?,
            read_upload(&self.t2)?,
        ];
        let session = match ViewerSession::from_uploads(&uploads) {
            Ok(session) => session,
            Err(e @ (PrepError::UnsupportedFormat(_) | PrepError::ShapeMismatch { .. })) => {
                eprintln!("{e}");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let depth_index = self.slice.unwrap_or_else(|| session.default_slice());
        if depth_index >= session.depth() {
            eprintln!(
                "切片索引{depth_index}越界，可选范围为0..{}。",
                session.depth()
            );
            return Ok(());
        }
        println!("体数据形状: {:?}，切片索引: {depth_index}", session.shape());

        let input = session.prepare(depth_index)?;
        fs::create_dir_all(self.out_dir.as_path())?;

        self.out_dir.push("input.npy");
        ndarray_npy::write_npy(self.out_dir.as_path(), &input.batch)?;
        self.out_dir.pop();

        self.out_dir.push("flair.png");
        render::gray_image(input.flair.view()).save(self.out_dir.as_path())?;
        self.out_dir.pop();

        if let Some(ref predictions) = self.predictions {
            let handle = ModelHandle::load(predictions, ExportedPrediction::open)?;
            let mask = handle.segment(&input)?;
            let color = self.color.unwrap_or(OVERLAY_RED);
            info!(
                source = %handle.source().display(),
                tumor_pixels = mask.iter().filter(|&&v| v == 1).count(),
                "prediction thresholded"
            );

            self.out_dir.push("mask.png");
            render::mask_image(mask.view()).save(self.out_dir.as_path())?;
            self.out_dir.pop();

            self.out_dir.push("overlay.png");
            render::overlay(input.flair.view(), mask.view(), color)?.save(self.out_dir.as_path())?;
            self.out_dir.pop();
        }
        Ok(())
    }
}

fn read_upload(path: &Path) -> anyhow::Result<Upload> {
    Upload::read_from(path).with_context(|| format!("cannot read `{}`", path.display()))
}

/// 推理运行时针对同一张切片导出的概率图。
struct ExportedPrediction {
    probs: Array2<f32>,
}

impl ExportedPrediction {
    fn open(path: &Path) -> tumorprep::Result<Self> {
        let raw: ArrayD<f32> =
            ndarray_npy::read_npy(path).map_err(|e| PrepError::Model(e.to_string()))?;
        Ok(Self {
            probs: squeeze_probs(raw)?,
        })
    }
}

fn squeeze_probs(mut raw: ArrayD<f32>) -> tumorprep::Result<Array2<f32>> {
    if raw.ndim() == 4 && raw.shape()[0] == 1 && raw.shape()[3] == 1 {
        raw = raw.index_axis_move(Axis(3), 0).index_axis_move(Axis(0), 0);
    }
    let shape = raw.shape().to_vec();
    raw.into_dimensionality::<Ix2>()
        .map_err(|_| PrepError::Model(format!("unexpected probability map shape {shape:?}")))
}

impl SegmentationModel for ExportedPrediction {
    fn predict(&self, batch: ArrayView4<f32>) -> tumorprep::Result<Array4<f32>> {
        let (_, h, w, _) = batch.dim();
        if self.probs.dim() != (h, w) {
            return Err(PrepError::Model(format!(
                "probability map is {:?}, input slice is {:?}",
                self.probs.dim(),
                (h, w)
            )));
        }
        Ok(self
            .probs
            .clone()
            .insert_axis(Axis(0))
            .insert_axis(Axis(3)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    #[test]
    fn test_squeeze_probs() {
        let batched = ArrayD::<f32>::zeros(IxDyn(&[1, 4, 5, 1]));
        assert_eq!(squeeze_probs(batched).unwrap().dim(), (4, 5));
        let plain = ArrayD::<f32>::zeros(IxDyn(&[4, 5]));
        assert_eq!(squeeze_probs(plain).unwrap().dim(), (4, 5));
        let volume = ArrayD::<f32>::zeros(IxDyn(&[4, 5, 6]));
        assert!(squeeze_probs(volume).is_err());
    }

    #[test]
    fn test_exported_prediction_shape_check() {
        let model = ExportedPrediction {
            probs: Array2::from_elem((4, 4), 0.9),
        };
        let batch = Array4::<f32>::zeros((1, 4, 4, 4));
        assert_eq!(model.predict(batch.view()).unwrap().dim(), (1, 4, 4, 1));
        let wrong = Array4::<f32>::zeros((1, 8, 8, 4));
        assert!(model.predict(wrong.view()).is_err());
    }
}
