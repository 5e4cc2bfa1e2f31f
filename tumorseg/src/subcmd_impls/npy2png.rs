use super::extract::parse_metadata;
use super::utils::{color_valid_rgb_hex, ranges_to_integers, SampleRanges};
use super::{IMAGES_NPY, MASKS_NPY, METADATA_JSON};
use anyhow::{anyhow, ensure, Context};
use clap::Args;
use image::Rgb;
use ndarray::{s, Array4};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use tumorprep::prelude::Modality;
use tumorprep::render::{self, OVERLAY_RED};

#[derive(Args, Debug)]
pub struct Npy2png {
    /// `extract`的输出目录。
    #[arg(long = "input-dir", short)]
    in_dir: PathBuf,
    /// 输出目录。
    #[arg(long = "output-dir", short)]
    out_dir: PathBuf,
    /// 样本序号，形如`0-3,7`（默认全选）。
    #[arg(long, short, value_parser = ranges_to_integers)]
    samples: Option<SampleRanges>,
    /// 标注叠加颜色（默认红色）。
    #[arg(long, short, value_parser = color_valid_rgb_hex)]
    color: Option<Rgb<u8>>,
}

impl Npy2png {
    pub fn run(&mut self) -> anyhow::Result<()> {
        // [input-dir/{images.npy, masks.npy, metadata.json}] -> [output-dir/*.png]
        ensure!(self.in_dir.is_dir(), "`{}` is not a directory", self.in_dir.display());
        fs::create_dir_all(self.out_dir.as_path())?;

        let images: Array4<f32> = ndarray_npy::read_npy(self.in_dir.join(IMAGES_NPY))
            .context("cannot read images.npy")?;
        let masks: Array4<u8> = ndarray_npy::read_npy(self.in_dir.join(MASKS_NPY))
            .context("cannot read masks.npy")?;
        let metadata = parse_metadata(&fs::read_to_string(self.in_dir.join(METADATA_JSON))?)?;

        let n = metadata.len();
        ensure!(
            images.len_of(ndarray::Axis(0)) == n && masks.len_of(ndarray::Axis(0)) == n,
            "images, masks and metadata lengths differ"
        );
        let selected: BTreeSet<usize> = match self.samples {
            Some(ref ranges) => ranges.to_integers(n).map_err(|e| anyhow!(e))?,
            None => (0..n).collect(),
        };

        let color = self.color.unwrap_or(OVERLAY_RED);
        for i in selected {
            let meta = &metadata[i];
            let flair = images.slice(s![i, .., .., Modality::Flair.channel()]);
            let truth = masks.slice(s![i, .., .., 0]);
            let stem = format!("{}_{:03}", meta.patient_id, meta.depth_index);
            println!("处理样本`{i}` ({stem})...");

            self.out_dir.push(format!("{stem}_flair.png"));
            render::gray_image(flair).save(self.out_dir.as_path())?;
            self.out_dir.pop();

            self.out_dir.push(format!("{stem}_truth.png"));
            render::mask_image(truth).save(self.out_dir.as_path())?;
            self.out_dir.pop();

            self.out_dir.push(format!("{stem}_overlay.png"));
            render::overlay(flair, truth, color)?.save(self.out_dir.as_path())?;
            self.out_dir.pop();
        }
        Ok(())
    }
}
