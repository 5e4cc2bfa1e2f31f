use anyhow::Context;
use clap::Args;
use ndarray::ArrayD;
use std::path::PathBuf;
use tumorprep::prelude::dice_score;

#[derive(Args, Debug)]
pub struct Dice {
    /// 标注掩膜npy文件（u8，取值0或1）。
    #[arg(long, short)]
    truth: PathBuf,
    /// 预测掩膜npy文件（u8，取值0或1）。
    #[arg(long, short)]
    pred: PathBuf,
}

impl Dice {
    pub fn run(&mut self) -> anyhow::Result<()> {
        let truth: ArrayD<u8> = ndarray_npy::read_npy(self.truth.as_path())
            .with_context(|| format!("cannot read `{}`", self.truth.display()))?;
        let pred: ArrayD<u8> = ndarray_npy::read_npy(self.pred.as_path())
            .with_context(|| format!("cannot read `{}`", self.pred.display()))?;
        println!("Dice Score: {}", dice_score(&truth, &pred)?);
        Ok(())
    }
}
