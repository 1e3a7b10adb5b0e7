//! MAN CLI - Command line tool for previewing the maritime measurement overlay.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "man-cli",
    version,
    about = "Maritime aerosol measurement overlay toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: man_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    man_cmd::run(cli.command).await
}
