// src/fetch/mod.rs

use anyhow::{bail, Result};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::fs;
use url::Url;

/// OWID publishes a stable CSV endpoint for the CO2 dataset.
pub const OWID_CO2_URL: &str =
    "https://raw.githubusercontent.com/owid/co2-data/master/owid-co2-data.csv";

/// Download the OWID CO2 dataset into `dest_dir`, keeping the upstream
/// filename. Returns the full path of the saved file.
pub async fn download_owid(client: &Client, dest_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let dest_dir = dest_dir.as_ref();
    let url = Url::parse(OWID_CO2_URL)?;
    let filename = url
        .path_segments()
        .and_then(|segments| segments.last())
        .filter(|name| !name.is_empty())
        .unwrap_or("owid-co2-data.csv");
    let dest_path = dest_dir.join(filename);

    fs::create_dir_all(dest_dir).await?;

    let resp = client.get(url.as_str()).send().await?.error_for_status()?;
    let bytes = resp.bytes().await?;
    fs::write(&dest_path, &bytes).await?;

    Ok(dest_path)
}

/// The outlook file has no stable public endpoint and must be placed
/// manually; fail with instructions when it is missing.
pub fn require_weo_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        bail!(
            "outlook file not found at {}; download the WEO Annex A free dataset \
             and place it there",
            path.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_weo_file_reports_the_expected_path() {
        let err = require_weo_file(Path::new("/nonexistent/weo.csv")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/weo.csv"));
    }

    #[test]
    fn present_weo_file_passes() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("weo.csv");
        std::fs::write(&path, "SCENARIO\n")?;
        require_weo_file(&path)
    }
}
