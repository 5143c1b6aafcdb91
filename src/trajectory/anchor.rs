// src/trajectory/anchor.rs

use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

use super::TrajectoryRow;
use crate::config::PipelineConfig;

/// Extend each forward scenario backward with the observed historical series.
///
/// Outlook sources publish sparse milestone years; the years before the first
/// milestone must come from the historical record rather than being invented.
/// For every sector that exists in history, historical values at or before
/// the cutoff are prepended to each forward scenario as if they were its own
/// data. Where the scenario already has a value for an early year, history
/// stops just before it, so a (year, scenario, sector) key is never produced
/// twice.
///
/// The returned table holds the forward scenarios only, still sparse in the
/// milestone region. The historical series itself stays observational; it is
/// carried through to the raw trajectory output by the caller, not annualized
/// into the future.
pub fn extend(
    cfg: &PipelineConfig,
    historical: &[TrajectoryRow],
    scenarios: &[TrajectoryRow],
) -> Vec<TrajectoryRow> {
    let hist_sectors: HashSet<&str> = historical.iter().map(|r| r.sector.as_str()).collect();

    // earliest scenario-owned year per (scenario, sector)
    let mut first_own_year: BTreeMap<(&str, &str), i32> = BTreeMap::new();
    for row in scenarios {
        first_own_year
            .entry((row.scenario.as_str(), row.sector.as_str()))
            .and_modify(|y| *y = (*y).min(row.year))
            .or_insert(row.year);
    }

    let mut out: Vec<TrajectoryRow> = Vec::with_capacity(scenarios.len() + historical.len() * 2);

    for label in [&cfg.baseline_label, &cfg.net_zero_label] {
        for hist in historical {
            if hist.year > cfg.historical_cutoff {
                continue;
            }
            if !hist_sectors.contains(hist.sector.as_str()) {
                continue;
            }
            if let Some(first) = first_own_year.get(&(label.as_str(), hist.sector.as_str())) {
                if hist.year >= *first {
                    continue;
                }
            }
            out.push(TrajectoryRow {
                year: hist.year,
                scenario: label.clone(),
                sector: hist.sector.clone(),
                value: hist.value,
            });
        }
    }

    let anchored = out.len();
    out.extend(scenarios.iter().cloned());
    out.sort_by(|a, b| {
        (&a.scenario, &a.sector, a.year).cmp(&(&b.scenario, &b.sector, b.year))
    });

    debug!(anchored, scenario_rows = scenarios.len(), "anchoring done");
    info!(rows = out.len(), "built anchored scenario trajectories");
    out
}
