// src/store/summary.rs

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{collections::BTreeMap, fs, io::Write, path::Path};
use tracing::info;

use crate::config::PipelineConfig;

/// Per-run provenance artifact: when the run happened, how many rows each
/// stage produced, and the exact configuration it ran under.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub row_counts: BTreeMap<String, usize>,
    pub config: PipelineConfig,
}

impl RunSummary {
    pub fn new(config: &PipelineConfig) -> Self {
        RunSummary {
            started_at: Utc::now(),
            finished_at: None,
            row_counts: BTreeMap::new(),
            config: config.clone(),
        }
    }

    pub fn record(&mut self, stage: &str, rows: usize) {
        self.row_counts.insert(stage.to_string(), rows);
    }

    /// Stamp the end time and persist as pretty JSON, atomically.
    pub fn finish(mut self, path: &Path) -> Result<()> {
        self.finished_at = Some(Utc::now());

        let tmp_path = path.with_extension("json.tmp");
        {
            let mut f = fs::File::create(&tmp_path)
                .with_context(|| format!("creating {}", tmp_path.display()))?;
            serde_json::to_writer_pretty(&mut f, &self).context("serializing run summary")?;
            f.write_all(b"\n")?;
        }
        fs::rename(&tmp_path, path)
            .with_context(|| format!("renaming {} -> {}", tmp_path.display(), path.display()))?;
        info!(path = %path.display(), "wrote run summary");
        Ok(())
    }
}
