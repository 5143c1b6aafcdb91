// src/canon/owid.rs

use anyhow::{bail, Result};
use serde::Deserialize;
use tracing::{debug, info};

use super::CanonicalRecord;
use crate::config::PipelineConfig;

/// Columns the historical source must carry. The raw file has dozens more;
/// everything else is ignored on deserialization.
pub const REQUIRED_COLUMNS: [&str; 3] = ["country", "year", "co2"];

pub const SOURCE_TAG: &str = "OWID";

/// One raw row of the OWID CO2 dataset, reduced to the fields this pipeline
/// consumes. `co2` is total fossil + industry emissions in Mt.
#[derive(Debug, Clone, Deserialize)]
pub struct OwidRaw {
    pub country: String,
    pub year: i32,
    pub co2: Option<f64>,
}

/// Normalize the historical source into canonical records: restrict to the
/// analysis region and year window, keep the single base variable, drop rows
/// with no value. Negative retained values are fatal; historical CO2 totals
/// cannot be negative, so one showing up means the upstream file is corrupt.
pub fn canonicalize(cfg: &PipelineConfig, rows: &[OwidRaw]) -> Result<Vec<CanonicalRecord>> {
    let mut out = Vec::new();
    let mut dropped_missing = 0usize;

    for row in rows {
        if row.country != cfg.region {
            continue;
        }
        if row.year < cfg.historical_start_year || row.year > cfg.historical_end_year {
            continue;
        }
        let value = match row.co2 {
            Some(v) => v,
            None => {
                dropped_missing += 1;
                continue;
            }
        };
        if value < 0.0 {
            bail!(
                "historical CO2 value {} at year {} is negative; upstream data is corrupt",
                value,
                row.year
            );
        }
        out.push(CanonicalRecord {
            year: row.year,
            region: cfg.region.clone(),
            sector: cfg.historical_sector.clone(),
            scenario: cfg.historical_label.clone(),
            variable: cfg.variable.clone(),
            value,
            unit: cfg.unit.clone(),
            source: SOURCE_TAG.into(),
        });
    }

    if dropped_missing > 0 {
        debug!(dropped_missing, "dropped historical rows without a value");
    }
    info!(rows = out.len(), region = %cfg.region, "canonicalized historical source");
    Ok(out)
}
