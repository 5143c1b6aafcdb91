// src/canon/weo.rs

use anyhow::{bail, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;

/// Raw columns the outlook source must carry. A missing one is a
/// configuration error, not a data gap: it means the upstream file layout
/// changed underneath us.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "REGION", "SCENARIO", "YEAR", "VALUE", "CATEGORY", "PRODUCT", "FLOW", "UNIT",
];

pub const SOURCE_TAG: &str = "IEA WEO";

/// One raw row of the WEO Annex A free dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct WeoRaw {
    #[serde(rename = "REGION")]
    pub region: String,
    #[serde(rename = "SCENARIO")]
    pub scenario: String,
    #[serde(rename = "YEAR")]
    pub year: i32,
    #[serde(rename = "VALUE")]
    pub value: Option<f64>,
    #[serde(rename = "CATEGORY")]
    pub category: String,
    #[serde(rename = "PRODUCT")]
    pub product: String,
    #[serde(rename = "FLOW")]
    pub flow: String,
    #[serde(rename = "UNIT")]
    pub unit: String,
}

/// A scenario-source row after canonicalization but before series selection.
/// The raw taxonomy columns stay attached because the selector still needs
/// them; projection to [`super::CanonicalRecord`] happens post-selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioRecord {
    pub year: i32,
    pub region: String,
    pub scenario: String,
    pub category: String,
    pub product: String,
    pub flow: String,
    pub unit: String,
    pub value: f64,
}

/// Fail fast when the raw header set has drifted.
pub fn validate_columns(headers: &[String]) -> Result<()> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !headers.iter().any(|h| h == *c))
        .copied()
        .collect();
    if !missing.is_empty() {
        bail!(
            "outlook source is missing required column(s) {:?}; found {:?}",
            missing,
            headers
        );
    }
    Ok(())
}

/// Map a free-text scenario label onto a canonical one. Case-insensitive
/// substring match against the configured keyword table; `None` means the
/// label belongs to a scenario this analysis does not track.
pub fn map_scenario_label(cfg: &PipelineConfig, raw_label: &str) -> Option<String> {
    let lowered = raw_label.to_lowercase();
    for entry in &cfg.scenario_keywords {
        if entry.keywords.iter().any(|k| lowered.contains(&k.to_lowercase())) {
            return Some(entry.label.clone());
        }
    }
    None
}

/// Normalize the outlook source: restrict to the analysis region, resolve
/// scenario labels, drop rows with no value or an untracked label.
pub fn canonicalize(cfg: &PipelineConfig, rows: &[WeoRaw]) -> Result<Vec<ScenarioRecord>> {
    let mut out = Vec::new();
    let mut dropped_unmatched = 0usize;
    let mut dropped_missing = 0usize;

    for row in rows {
        if row.region != cfg.region {
            continue;
        }
        let scenario = match map_scenario_label(cfg, &row.scenario) {
            Some(label) => label,
            None => {
                dropped_unmatched += 1;
                continue;
            }
        };
        let value = match row.value {
            Some(v) => v,
            None => {
                dropped_missing += 1;
                continue;
            }
        };
        out.push(ScenarioRecord {
            year: row.year,
            region: row.region.clone(),
            scenario,
            category: row.category.clone(),
            product: row.product.clone(),
            flow: row.flow.clone(),
            unit: row.unit.clone(),
            value,
        });
    }

    if dropped_unmatched > 0 {
        warn!(
            dropped_unmatched,
            "dropped outlook rows whose scenario label matched no keyword"
        );
    }
    if dropped_missing > 0 {
        debug!(dropped_missing, "dropped outlook rows without a value");
    }
    info!(rows = out.len(), region = %cfg.region, "canonicalized outlook source");
    Ok(out)
}
