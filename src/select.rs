// src/select.rs
//
// Series selection inside the outlook source. The Annex A taxonomy nests
// flows several levels deep; summing across levels double counts. One fixed
// (category, product, unit, flow allow-list) tuple pins down a single
// defensible series per sector, and anything outside it is discarded before
// the canonical table is assembled.

use anyhow::{bail, Result};
use std::collections::HashMap;
use tracing::info;

use crate::canon::weo::{ScenarioRecord, SOURCE_TAG};
use crate::canon::CanonicalRecord;
use crate::config::PipelineConfig;

/// Apply the 4-tuple selector and project the survivors into canonical
/// records.
///
/// Two conditions abort the run:
/// - an empty selection, which means the selector no longer matches the
///   source taxonomy (config drift or an upstream schema change);
/// - more than one row for a (year, scenario, sector) key, which means the
///   selector is too broad or the source itself is duplicated. Summing such
///   rows silently would hide a double-counting bug, so it is never done.
pub fn apply(cfg: &PipelineConfig, rows: &[ScenarioRecord]) -> Result<Vec<CanonicalRecord>> {
    let sel = &cfg.selector;

    let selected: Vec<&ScenarioRecord> = rows
        .iter()
        .filter(|r| {
            r.category == sel.category
                && r.product == sel.product
                && r.unit == sel.unit
                && sel.flows.iter().any(|f| f == &r.flow)
        })
        .collect();

    if selected.is_empty() {
        bail!(
            "series selector matched zero outlook rows \
             (category `{}`, product `{}`, unit `{}`, {} flows); \
             the selector no longer fits the source",
            sel.category,
            sel.product,
            sel.unit,
            sel.flows.len()
        );
    }

    let mut key_counts: HashMap<(i32, &str, &str), usize> = HashMap::new();
    for r in &selected {
        *key_counts
            .entry((r.year, r.scenario.as_str(), r.flow.as_str()))
            .or_insert(0) += 1;
    }
    if let Some(((year, scenario, flow), n)) = key_counts.iter().find(|(_, n)| **n > 1) {
        bail!(
            "series selector is not unique: {} rows for year {}, scenario `{}`, sector `{}`",
            n,
            year,
            scenario,
            flow
        );
    }

    info!(rows = selected.len(), "selected outlook series");

    Ok(selected
        .into_iter()
        .map(|r| CanonicalRecord {
            year: r.year,
            region: r.region.clone(),
            sector: r.flow.clone(),
            scenario: r.scenario.clone(),
            variable: cfg.variable.clone(),
            value: r.value,
            unit: cfg.unit.clone(),
            source: SOURCE_TAG.into(),
        })
        .collect())
}
