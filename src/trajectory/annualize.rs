// src/trajectory/annualize.rs

use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{info, instrument};

use super::{partition, TrajectoryRow};
use crate::config::{InterpMethod, PipelineConfig};

/// Densify every (scenario, sector) series onto the configured annual window.
///
/// Per group, independently:
/// 1. reindex onto each integer year in [window_start, window_end]; known
///    points outside the window do not participate;
/// 2. fill interior gaps between the group's earliest and latest known years
///    with the configured interpolation;
/// 3. years before the earliest known point stay undefined — no backward
///    extrapolation, ever;
/// 4. forward-fill the latest known value out to the window end;
/// 5. drop whatever is still undefined.
///
/// Groups are processed in parallel; the output is re-sorted to a
/// deterministic (scenario, sector, year) order. Running the pass again on
/// its own output changes nothing.
#[instrument(level = "info", skip(cfg, rows), fields(rows = rows.len()))]
pub fn run(cfg: &PipelineConfig, rows: &[TrajectoryRow]) -> Vec<TrajectoryRow> {
    let groups: Vec<_> = partition(rows).into_iter().collect();

    let mut out: Vec<TrajectoryRow> = groups
        .par_iter()
        .flat_map(|((scenario, sector), series)| {
            annualize_group(cfg, series)
                .into_iter()
                .map(|(year, value)| TrajectoryRow {
                    year,
                    scenario: scenario.clone(),
                    sector: sector.clone(),
                    value,
                })
                .collect::<Vec<_>>()
        })
        .collect();

    out.sort_by(|a, b| {
        (&a.scenario, &a.sector, a.year).cmp(&(&b.scenario, &b.sector, b.year))
    });

    info!(groups = groups.len(), rows = out.len(), "annualized trajectories");
    out
}

fn annualize_group(cfg: &PipelineConfig, series: &[(i32, f64)]) -> Vec<(i32, f64)> {
    let known: BTreeMap<i32, f64> = series
        .iter()
        .filter(|(year, _)| *year >= cfg.window_start_year && *year <= cfg.window_end_year)
        .copied()
        .collect();

    let (first, last) = match (known.keys().next(), known.keys().next_back()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Vec::new(), // no anchor inside the window
    };

    let mut out = Vec::with_capacity((cfg.window_end_year - first + 1) as usize);
    for year in cfg.window_start_year..=cfg.window_end_year {
        if year < first {
            continue;
        }
        let value = match known.get(&year) {
            Some(v) => *v,
            None if year < last => interpolate(cfg.interpolation, &known, year),
            // past the last known point: the final value persists to the horizon
            None => known[&last],
        };
        out.push((year, value));
    }
    out
}

fn interpolate(method: InterpMethod, known: &BTreeMap<i32, f64>, year: i32) -> f64 {
    // callers guarantee a known point on both sides
    let (x0, y0) = known
        .range(..year)
        .next_back()
        .map(|(x, y)| (*x, *y))
        .expect("interior year has a left anchor");
    let (x1, y1) = known
        .range(year..)
        .next()
        .map(|(x, y)| (*x, *y))
        .expect("interior year has a right anchor");

    match method {
        InterpMethod::Linear => y0 + (y1 - y0) * f64::from(year - x0) / f64::from(x1 - x0),
        InterpMethod::Previous => y0,
    }
}
