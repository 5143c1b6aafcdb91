// src/store/load.rs

use anyhow::{bail, Context, Result};
use glob::glob;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::canon::owid::{self, OwidRaw};
use crate::canon::weo::{self, WeoRaw};

/// Load the historical source. The raw file carries dozens of columns; only
/// the ones the pipeline consumes are deserialized, but the required set must
/// be present in the header.
pub fn load_owid(path: &Path) -> Result<Vec<OwidRaw>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("opening historical CSV {}", path.display()))?;

    let headers: Vec<String> = rdr
        .headers()
        .with_context(|| format!("reading header of {}", path.display()))?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let missing: Vec<&str> = owid::REQUIRED_COLUMNS
        .iter()
        .filter(|c| !headers.iter().any(|h| h == *c))
        .copied()
        .collect();
    if !missing.is_empty() {
        bail!(
            "historical source {} is missing required column(s) {:?}",
            path.display(),
            missing
        );
    }

    let rows: Vec<OwidRaw> = rdr
        .deserialize()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("parsing historical CSV {}", path.display()))?;
    info!(rows = rows.len(), path = %path.display(), "loaded historical source");
    Ok(rows)
}

/// Load the outlook source, failing fast on header drift.
pub fn load_weo(path: &Path) -> Result<Vec<WeoRaw>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("opening outlook CSV {}", path.display()))?;

    let headers: Vec<String> = rdr
        .headers()
        .with_context(|| format!("reading header of {}", path.display()))?
        .iter()
        .map(|h| h.to_string())
        .collect();
    weo::validate_columns(&headers)?;

    let rows: Vec<WeoRaw> = rdr
        .deserialize()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("parsing outlook CSV {}", path.display()))?;
    info!(rows = rows.len(), path = %path.display(), "loaded outlook source");
    Ok(rows)
}

/// Every CSV currently sitting in the raw data directory.
pub fn list_raw_csvs(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}/*.csv", dir.display());
    let mut files = Vec::new();
    for entry in glob(&pattern).context("invalid glob pattern for raw directory")? {
        match entry {
            Ok(p) if p.is_file() => files.push(p),
            _ => continue,
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn owid_loads_and_ignores_extra_columns() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("owid.csv");
        let mut f = std::fs::File::create(&path)?;
        writeln!(f, "country,year,iso_code,co2,co2_per_capita")?;
        writeln!(f, "World,2020,OWID_WRL,34807.26,4.46")?;
        writeln!(f, "World,2021,OWID_WRL,,")?;
        let rows = load_owid(&path)?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].co2, Some(34807.26));
        assert_eq!(rows[1].co2, None);
        Ok(())
    }

    #[test]
    fn owid_missing_value_column_is_fatal() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("owid.csv");
        let mut f = std::fs::File::create(&path)?;
        writeln!(f, "country,year,co2_per_capita")?;
        writeln!(f, "World,2020,4.46")?;
        let err = load_owid(&path).unwrap_err();
        assert!(err.to_string().contains("co2"));
        Ok(())
    }

    #[test]
    fn weo_header_drift_is_fatal() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("weo.csv");
        let mut f = std::fs::File::create(&path)?;
        writeln!(f, "PUBLICATION,SCENARIO,CATEGORY,PRODUCT,REGION,YEAR,VALUE")?;
        writeln!(f, "WEO2025,Stated Policies Scenario,CO2 total,Total,World,2030,31000")?;
        let err = load_weo(&path).unwrap_err();
        assert!(err.to_string().contains("FLOW"));
        Ok(())
    }

    #[test]
    fn weo_loads_typed_rows() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("weo.csv");
        let mut f = std::fs::File::create(&path)?;
        writeln!(
            f,
            "PUBLICATION,SCENARIO,CATEGORY,PRODUCT,FLOW,UNIT,REGION,YEAR,VALUE"
        )?;
        writeln!(
            f,
            "WEO2025,Net Zero Emissions by 2050 Scenario,CO2 total,Total,Industry,Mt CO2,World,2035,3200.5"
        )?;
        let rows = load_weo(&path)?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].flow, "Industry");
        assert_eq!(rows[0].value, Some(3200.5));
        Ok(())
    }

    #[test]
    fn lists_raw_csvs_sorted() -> Result<()> {
        let dir = TempDir::new()?;
        for name in ["b.csv", "a.csv", "notes.txt"] {
            std::fs::write(dir.path().join(name), "x")?;
        }
        let files = list_raw_csvs(dir.path())?;
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
        Ok(())
    }
}
