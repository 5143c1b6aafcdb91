// src/trajectory/metrics.rs

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use super::{partition, TrajectoryRow};
use crate::config::PipelineConfig;

/// Baseline-minus-net-zero gap per (year, sector).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapRow {
    pub year: i32,
    pub sector: String,
    pub gap_abs: f64,
    pub gap_pct_of_baseline: f64,
}

/// Running emissions sum per (scenario, sector) from the configured start
/// year onward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativeRow {
    pub year: i32,
    pub scenario: String,
    pub sector: String,
    pub value: f64,
    pub cumulative_emissions: f64,
}

/// Series rescaled so each group's first year equals 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedRow {
    pub year: i32,
    pub scenario: String,
    pub sector: String,
    pub emissions_index: f64,
}

/// Pivot the annualized table wide-by-scenario and compute the gap between
/// baseline and net-zero per (year, sector). A scenario absent from the table
/// altogether is fatal: after annualization both must exist, so a missing one
/// signals a data or configuration problem rather than an empty result.
///
/// A zero baseline makes the percentage non-finite; that value is emitted
/// as-is so consumers can see the edge case instead of a silent zero.
pub fn gaps(cfg: &PipelineConfig, annual: &[TrajectoryRow]) -> Result<Vec<GapRow>> {
    let mut baseline: BTreeMap<(String, i32), f64> = BTreeMap::new();
    let mut net_zero: BTreeMap<(String, i32), f64> = BTreeMap::new();

    for row in annual {
        if row.scenario == cfg.baseline_label {
            baseline.insert((row.sector.clone(), row.year), row.value);
        } else if row.scenario == cfg.net_zero_label {
            net_zero.insert((row.sector.clone(), row.year), row.value);
        }
    }

    if baseline.is_empty() {
        bail!(
            "baseline scenario `{}` is absent from the annualized trajectories",
            cfg.baseline_label
        );
    }
    if net_zero.is_empty() {
        bail!(
            "net-zero scenario `{}` is absent from the annualized trajectories",
            cfg.net_zero_label
        );
    }

    let mut out = Vec::new();
    for ((sector, year), base) in &baseline {
        if let Some(nz) = net_zero.get(&(sector.clone(), *year)) {
            let gap_abs = base - nz;
            out.push(GapRow {
                year: *year,
                sector: sector.clone(),
                gap_abs,
                gap_pct_of_baseline: gap_abs / base * 100.0,
            });
        }
    }

    info!(rows = out.len(), "computed scenario gaps");
    Ok(out)
}

/// Running sum of value per (scenario, sector), years at or after the
/// configured start year, sorted ascending. The first retained year's
/// cumulative equals its own value.
pub fn cumulative(cfg: &PipelineConfig, annual: &[TrajectoryRow]) -> Vec<CumulativeRow> {
    let mut out = Vec::new();
    for ((scenario, sector), series) in partition(annual) {
        let mut running = 0.0;
        for (year, value) in series {
            if year < cfg.cumulative_start_year {
                continue;
            }
            running += value;
            out.push(CumulativeRow {
                year,
                scenario: scenario.clone(),
                sector: sector.clone(),
                value,
                cumulative_emissions: running,
            });
        }
    }
    info!(rows = out.len(), from = cfg.cumulative_start_year, "computed cumulative emissions");
    out
}

/// Rescale each (scenario, sector) series to 100 at its first available
/// year. A zero first value makes the whole group non-finite; the values
/// propagate unaltered.
pub fn indexed(annual: &[TrajectoryRow]) -> Vec<IndexedRow> {
    let mut out = Vec::new();
    for ((scenario, sector), series) in partition(annual) {
        let base = match series.first() {
            Some((_, v)) => *v,
            None => continue,
        };
        for (year, value) in series {
            out.push(IndexedRow {
                year,
                scenario: scenario.clone(),
                sector: sector.clone(),
                emissions_index: value / base * 100.0,
            });
        }
    }
    info!(rows = out.len(), "computed indexed trajectories");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(year: i32, scenario: &str, sector: &str, value: f64) -> TrajectoryRow {
        TrajectoryRow {
            year,
            scenario: scenario.into(),
            sector: sector.into(),
            value,
        }
    }

    #[test]
    fn gap_matches_worked_example() -> Result<()> {
        // STEPS [2020:100, 2030:90], NZE [2020:100, 2030:50]
        let cfg = PipelineConfig::default();
        let annual = vec![
            row(2020, "STEPS", "Industry", 100.0),
            row(2030, "STEPS", "Industry", 90.0),
            row(2020, "NZE", "Industry", 100.0),
            row(2030, "NZE", "Industry", 50.0),
        ];
        let gaps = gaps(&cfg, &annual)?;
        let g2030 = gaps.iter().find(|g| g.year == 2030).unwrap();
        assert_eq!(g2030.gap_abs, 40.0);
        assert!((g2030.gap_pct_of_baseline - 44.444444444444444).abs() < 1e-9);
        let g2020 = gaps.iter().find(|g| g.year == 2020).unwrap();
        assert_eq!(g2020.gap_abs, 0.0);
        Ok(())
    }

    #[test]
    fn gap_requires_both_scenarios() {
        let cfg = PipelineConfig::default();
        let annual = vec![row(2030, "STEPS", "Industry", 90.0)];
        let err = gaps(&cfg, &annual).unwrap_err();
        assert!(err.to_string().contains("NZE"));
    }

    #[test]
    fn zero_baseline_propagates_nonfinite_percentage() -> Result<()> {
        let cfg = PipelineConfig::default();
        let annual = vec![
            row(2040, "STEPS", "Buildings", 0.0),
            row(2040, "NZE", "Buildings", -5.0),
        ];
        let gaps = gaps(&cfg, &annual)?;
        assert_eq!(gaps[0].gap_abs, 5.0);
        assert!(!gaps[0].gap_pct_of_baseline.is_finite());
        Ok(())
    }

    #[test]
    fn cumulative_is_a_running_sum_from_the_start_year() {
        let mut cfg = PipelineConfig::default();
        cfg.cumulative_start_year = 2030;
        let annual = vec![
            row(2029, "NZE", "Industry", 55.0), // before the start year
            row(2030, "NZE", "Industry", 50.0),
            row(2031, "NZE", "Industry", 48.0),
            row(2032, "NZE", "Industry", 46.0),
        ];
        let cum = cumulative(&cfg, &annual);
        assert_eq!(cum.len(), 3);
        assert_eq!(cum[0].cumulative_emissions, 50.0);
        assert_eq!(cum[1].cumulative_emissions, 98.0);
        assert_eq!(cum[2].cumulative_emissions, 144.0);
    }

    #[test]
    fn cumulative_decreases_where_values_go_negative() {
        let mut cfg = PipelineConfig::default();
        cfg.cumulative_start_year = 2048;
        let annual = vec![
            row(2048, "NZE", "Total energy supply", 4.0),
            row(2049, "NZE", "Total energy supply", 1.0),
            row(2050, "NZE", "Total energy supply", -2.0), // net removal
        ];
        let cum = cumulative(&cfg, &annual);
        let sums: Vec<f64> = cum.iter().map(|c| c.cumulative_emissions).collect();
        assert_eq!(sums, vec![4.0, 5.0, 3.0]);
        assert!(sums[2] < sums[1]);
    }

    #[test]
    fn cumulative_is_nondecreasing_for_nonnegative_values() {
        let cfg = PipelineConfig::default();
        let annual: Vec<TrajectoryRow> = (2025..=2050)
            .map(|y| row(y, "STEPS", "Industry", 90.0 - 0.5 * f64::from(y - 2025)))
            .collect();
        let cum = cumulative(&cfg, &annual);
        for pair in cum.windows(2) {
            assert!(pair[1].cumulative_emissions >= pair[0].cumulative_emissions);
        }
    }

    #[test]
    fn indexed_first_year_is_exactly_100() {
        let annual = vec![
            row(2020, "NZE", "Industry", 80.0),
            row(2030, "NZE", "Industry", 40.0),
            row(2025, "STEPS", "Industry", 120.0),
            row(2035, "STEPS", "Industry", 90.0),
        ];
        let idx = indexed(&annual);
        for ((_, _), series) in partition(
            &idx.iter()
                .map(|r| row(r.year, &r.scenario, &r.sector, r.emissions_index))
                .collect::<Vec<_>>(),
        ) {
            assert_eq!(series.first().unwrap().1, 100.0);
        }
        let nze_2030 = idx
            .iter()
            .find(|r| r.scenario == "NZE" && r.year == 2030)
            .unwrap();
        assert_eq!(nze_2030.emissions_index, 50.0);
    }

    #[test]
    fn zero_index_base_propagates_nonfinite_values() {
        let annual = vec![
            row(2020, "NZE", "Buildings", 0.0),
            row(2021, "NZE", "Buildings", 3.0),
        ];
        let idx = indexed(&annual);
        assert!(idx.iter().any(|r| !r.emissions_index.is_finite()));
    }
}
