use anyhow::Result;
use co2pathways::{config::PipelineConfig, fetch};
use std::{env, path::PathBuf};

/// Verify that the manually-placed WEO Annex A file is where the pipeline
/// expects it.
///
/// Usage: cargo run --bin check_weo [CONFIG_YAML]
fn main() -> Result<()> {
    let cfg_path = env::args().nth(1).map(PathBuf::from);
    let cfg = PipelineConfig::load(cfg_path.as_deref())?;

    fetch::require_weo_file(&cfg.weo_path())?;
    println!("outlook file found: {}", cfg.weo_path().display());
    Ok(())
}
