//! HSL CLI - Command line tool for computing hydraulic structure laws.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "hsl-cli",
    version,
    about = "Hydraulic structure law toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: hsl_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    hsl_cmd::run(cli.command)
}
