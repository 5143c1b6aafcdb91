// src/config.rs

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Top-level flows from the WEO Annex A taxonomy that do not overlap each
/// other. Nested flows ("Total final consumption", fuel-level breakdowns)
/// stay out so sector sums never double count.
static DEFAULT_ALLOWED_FLOWS: Lazy<Vec<String>> = Lazy::new(|| {
    [
        "Total energy supply",
        "Electricity and heat sectors",
        "Industry",
        "Transport",
        "Buildings",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
});

/// How interior gaps between milestone years are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpMethod {
    /// Straight line over the numeric year axis between the two anchors.
    Linear,
    /// Carry the previous anchor forward until the next one.
    Previous,
}

/// Maps a canonical scenario label to the substrings that identify it in the
/// free-text SCENARIO column of the outlook source. Matching is
/// case-insensitive; rows matching no entry are dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioKeywords {
    pub label: String,
    pub keywords: Vec<String>,
}

/// The fixed 4-tuple that pins down exactly one emissions series definition
/// inside the outlook source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesSelector {
    pub category: String,
    pub product: String,
    pub unit: String,
    pub flows: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Single region the whole analysis is restricted to.
    pub region: String,
    /// Inclusive year window applied to the historical source.
    pub historical_start_year: i32,
    pub historical_end_year: i32,
    /// Last historical year scenarios may be anchored from.
    pub historical_cutoff: i32,
    /// Sector label the historical totals are filed under.
    pub historical_sector: String,
    /// Canonical scenario labels.
    pub historical_label: String,
    pub baseline_label: String,
    pub net_zero_label: String,
    /// Free-text label matching for the outlook source.
    pub scenario_keywords: Vec<ScenarioKeywords>,
    /// Series selection within the outlook source.
    pub selector: SeriesSelector,
    /// Canonical variable and unit every record is normalized to.
    pub variable: String,
    pub unit: String,
    /// Inclusive annualization window.
    pub window_start_year: i32,
    pub window_end_year: i32,
    pub interpolation: InterpMethod,
    /// First year included in the cumulative metric.
    pub cumulative_start_year: i32,
    /// Years probed when building regime features, and the cluster count.
    pub regime_probe_years: Vec<i32>,
    pub regime_clusters: usize,
    /// Injected paths. Nothing in the library creates these implicitly; the
    /// orchestrator owns directory creation.
    pub raw_dir: PathBuf,
    pub output_dir: PathBuf,
    pub owid_file: String,
    pub weo_file: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            region: "World".into(),
            historical_start_year: 2000,
            historical_end_year: 2024,
            historical_cutoff: 2024,
            historical_sector: "Total energy supply".into(),
            historical_label: "historical".into(),
            baseline_label: "STEPS".into(),
            net_zero_label: "NZE".into(),
            scenario_keywords: vec![
                ScenarioKeywords {
                    label: "STEPS".into(),
                    keywords: vec!["stated policies".into(), "steps".into()],
                },
                ScenarioKeywords {
                    label: "NZE".into(),
                    keywords: vec!["net zero".into(), "nze".into()],
                },
            ],
            selector: SeriesSelector {
                category: "CO2 total".into(),
                product: "Total".into(),
                unit: "Mt CO2".into(),
                flows: DEFAULT_ALLOWED_FLOWS.clone(),
            },
            variable: "co2_emissions".into(),
            unit: "Mt CO2".into(),
            window_start_year: 2020,
            window_end_year: 2050,
            interpolation: InterpMethod::Linear,
            cumulative_start_year: 2025,
            regime_probe_years: vec![2030, 2040, 2050],
            regime_clusters: 3,
            raw_dir: PathBuf::from("data/raw"),
            output_dir: PathBuf::from("outputs"),
            owid_file: "owid-co2-data.csv".into(),
            weo_file: "WEO2025_AnnexA_Free_Dataset_World.csv".into(),
        }
    }
}

impl PipelineConfig {
    /// Load overrides from a YAML file on top of the defaults. `None` runs
    /// the stock configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            None => Ok(PipelineConfig::default()),
            Some(p) => {
                let text = fs::read_to_string(p)
                    .with_context(|| format!("reading config file {}", p.display()))?;
                let cfg: PipelineConfig = serde_yaml::from_str(&text)
                    .with_context(|| format!("parsing config file {}", p.display()))?;
                Ok(cfg)
            }
        }
    }

    pub fn owid_path(&self) -> PathBuf {
        self.raw_dir.join(&self.owid_file)
    }

    pub fn weo_path(&self) -> PathBuf {
        self.raw_dir.join(&self.weo_file)
    }
}
