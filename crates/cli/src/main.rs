use clap::Parser;

use shopfront_cli::app::App;
use shopfront_cli::commands::{self, Cli};
use shopfront_cli::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    shopfront_cli::telemetry::init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let app = App::build(config).await?;
    commands::run(&app, cli.command).await
}
