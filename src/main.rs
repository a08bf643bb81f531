use anyhow::Result;
use clap::Parser;
use tracing::info;

use cachet_exporter::{logging, Args, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = Settings::load(&args)?;

    logging::init(&settings.log_level)?;
    info!("Starting cachet_exporter {}", env!("CARGO_PKG_VERSION"));

    cachet_exporter::run(settings).await
}
