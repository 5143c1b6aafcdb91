use anyhow::Result;
use co2pathways::fetch;
use reqwest::Client;
use std::env;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Download the latest OWID CO2 dataset into the raw data directory.
///
/// Usage: cargo run --bin update_owid [DEST_DIR]
#[tokio::main]
async fn main() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env_filter).init();

    let dest_dir = env::args().nth(1).unwrap_or_else(|| "data/raw".into());
    info!(url = fetch::OWID_CO2_URL, dest = %dest_dir, "downloading OWID CO2 dataset");

    let client = Client::new();
    let path = fetch::download_owid(&client, &dest_dir).await?;
    info!(path = %path.display(), "download complete");
    Ok(())
}
