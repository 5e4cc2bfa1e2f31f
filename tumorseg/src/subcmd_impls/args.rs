use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "tumorseg")]
#[command(about = "脑肿瘤多模态MRI切片预处理工具集.")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// 子命令。
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run_program(&mut self) -> anyhow::Result<()> {
        match self.command {
            Commands::Extract(ref mut v) => v.run(),
            Commands::Preview(ref mut v) => v.run(),
            Commands::Npy2png(ref mut v) => v.run(),
            Commands::Dice(ref mut v) => v.run(),
            Commands::Inspect(ref mut v) => v.run(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 扫描病例目录，提取训练切片并保存为npy数据。
    Extract(crate::subcmd_impls::extract::Extract),
    /// 预处理四个模态文件中的一张切片，生成模型输入与可视化图像。
    Preview(crate::subcmd_impls::preview::Preview),
    /// 将`extract`输出中的样本转换为png文件。
    Npy2png(crate::subcmd_impls::npy2png::Npy2png),
    /// 计算两个二值掩膜npy文件的Dice系数。
    Dice(crate::subcmd_impls::dice::Dice),
    /// 查看单个体数据文件的形状与退化切片情况。
    Inspect(crate::subcmd_impls::inspect::Inspect),
}
