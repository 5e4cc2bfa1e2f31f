use super::utils::positive_usize;
use super::{IMAGES_NPY, MASKS_NPY, METADATA_JSON};
use anyhow::{ensure, Context};
use clap::Args;
use json::JsonValue;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tumorprep::prelude::{DatasetScanner, ScanConfig, SliceMeta, NUM_SLICES, STRIDE, TARGET_HEIGHT};

#[derive(Args, Debug)]
pub struct Extract {
    /// 数据集根目录，每个病例一个子目录。
    #[arg(long = "base-dir", short = 'D')]
    base_dir: PathBuf,
    /// 输出目录。
    #[arg(long = "output-dir", short)]
    out_dir: PathBuf,
    /// 深度索引步长。
    #[arg(long, default_value_t = STRIDE, value_parser = positive_usize)]
    stride: usize,
    /// 深度索引上界（不含）。
    #[arg(long = "num-slices", default_value_t = NUM_SLICES)]
    num_slices: usize,
    /// 目标切片边长。
    #[arg(long, default_value_t = TARGET_HEIGHT, value_parser = positive_usize)]
    size: usize,
}

impl Extract {
    pub fn run(&mut self) -> anyhow::Result<()> {
        // [base-dir/{patient}/*.nii] -> [output-dir/{images.npy, masks.npy, metadata.json}]
        ensure!(
            self.base_dir.is_dir(),
            "`{}` is not a directory",
            self.base_dir.display()
        );
        fs::create_dir_all(self.out_dir.as_path())
            .with_context(|| format!("cannot create `{}`", self.out_dir.display()))?;

        let config = ScanConfig {
            num_slices: self.num_slices,
            stride: self.stride,
            target: (self.size, self.size),
        };
        let dataset = DatasetScanner::new(self.base_dir.as_path(), config).scan()?;
        let (images, masks, metadata) = dataset.into_arrays()?;
        info!(samples = metadata.len(), "writing dataset arrays");

        self.out_dir.push(IMAGES_NPY);
        ndarray_npy::write_npy(self.out_dir.as_path(), &images)?;
        self.out_dir.pop();

        self.out_dir.push(MASKS_NPY);
        ndarray_npy::write_npy(self.out_dir.as_path(), &masks)?;
        self.out_dir.pop();

        self.out_dir.push(METADATA_JSON);
        fs::write(self.out_dir.as_path(), metadata_json(&metadata)?.pretty(2))?;
        self.out_dir.pop();

        println!("共提取{}个样本。", metadata.len());
        Ok(())
    }
}

/// `[{"patient_id": ..., "slice_index": ...}, ...]`
pub fn metadata_json(metadata: &[SliceMeta]) -> json::Result<JsonValue> {
    let mut list = JsonValue::new_array();
    for meta in metadata {
        let mut entry = JsonValue::new_object();
        entry.insert("patient_id", meta.patient_id.as_str())?;
        entry.insert("slice_index", meta.depth_index)?;
        list.push(entry)?;
    }
    Ok(list)
}

/// 解析`metadata_json`写出的内容。
pub fn parse_metadata(text: &str) -> anyhow::Result<Vec<SliceMeta>> {
    let value = json::parse(text)?;
    ensure!(value.is_array(), "metadata must be a JSON array");
    value
        .members()
        .map(|entry| -> anyhow::Result<SliceMeta> {
            let patient_id = entry["patient_id"]
                .as_str()
                .context("missing `patient_id`")?
                .to_owned();
            let depth_index = entry["slice_index"]
                .as_usize()
                .context("missing `slice_index`")?;
            Ok(SliceMeta {
                patient_id,
                depth_index,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_json_layout() {
        let metadata = vec![
            SliceMeta {
                patient_id: "BraTS20_Training_001".into(),
                depth_index: 0,
            },
            SliceMeta {
                patient_id: "BraTS20_Training_001".into(),
                depth_index: 5,
            },
        ];
        let value = metadata_json(&metadata).unwrap();
        assert_eq!(value.len(), 2);
        assert_eq!(value[1]["slice_index"].as_usize(), Some(5));
        assert_eq!(parse_metadata(&value.dump()).unwrap(), metadata);
    }

    #[test]
    fn test_parse_metadata_rejects_garbage() {
        assert!(parse_metadata("{}").is_err());
        assert!(parse_metadata(r#"[{"patient_id": 3}]"#).is_err());
    }
}
