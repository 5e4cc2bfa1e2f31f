mod subcmd_impls;

pub use subcmd_impls::args::Cli;

use tracing_subscriber::EnvFilter;

/// 初始化日志输出到stderr，级别由`RUST_LOG`控制，默认`info`。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
