use clap::Args;
use std::path::PathBuf;
use tumorprep::prep::{is_degenerate, min_max, Volume};

#[derive(Args, Debug)]
pub struct Inspect {
    /// 体数据文件(.nii/.nii.gz)。
    #[arg(long, short)]
    volume: PathBuf,
}

impl Inspect {
    pub fn run(&mut self) -> anyhow::Result<()> {
        let volume = Volume::open(self.volume.as_path())?;
        println!("形状: {:?}", volume.shape());

        let mut degenerate = Vec::new();
        let mut range: Option<(f32, f32)> = None;
        for z in 0..volume.depth() {
            let slice = volume.slice(z)?;
            if is_degenerate(slice) {
                degenerate.push(z);
            } else if let Some((lo, hi)) = min_max(slice) {
                range = Some(range.map_or((lo, hi), |(a, b)| (a.min(lo), b.max(hi))));
            }
        }
        if let Some((lo, hi)) = range {
            println!("强度范围: [{lo}, {hi}]");
        }
        println!("退化切片个数: {} / {}", degenerate.len(), volume.depth());
        if !degenerate.is_empty() {
            println!("\t{degenerate:?}");
        }
        Ok(())
    }
}
