use clap::Parser;
use tumorseg::Cli;

fn main() -> anyhow::Result<()> {
    tumorseg::init_tracing();
    let mut cmd: Cli = Cli::parse();
    cmd.run_program()
}
