// src/trajectory/mod.rs

pub mod anchor;
pub mod annualize;
pub mod metrics;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::canon::CanonicalRecord;

/// A canonical record projected down to the axes the trajectory stages work
/// on. Within (year, scenario, sector) exactly one value exists; duplicates
/// from the projection are summed here, once, on the way in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryRow {
    pub year: i32,
    pub scenario: String,
    pub sector: String,
    pub value: f64,
}

/// Group key for per-series operations.
pub type GroupKey = (String, String); // (scenario, sector)

/// Project canonical records onto (year, scenario, sector, value), summing
/// duplicate keys, ordered by (scenario, sector, year).
pub fn from_canonical(records: &[CanonicalRecord]) -> Vec<TrajectoryRow> {
    let mut agg: BTreeMap<(String, String, i32), f64> = BTreeMap::new();
    for rec in records {
        *agg.entry((rec.scenario.clone(), rec.sector.clone(), rec.year))
            .or_insert(0.0) += rec.value;
    }
    agg.into_iter()
        .map(|((scenario, sector, year), value)| TrajectoryRow {
            year,
            scenario,
            sector,
            value,
        })
        .collect()
}

/// Partition rows into per-(scenario, sector) series, each sorted by year.
/// Every within-group operation downstream (interpolation, forward-fill,
/// running sums, indexing) assumes this ordering.
pub fn partition(rows: &[TrajectoryRow]) -> BTreeMap<GroupKey, Vec<(i32, f64)>> {
    let mut groups: BTreeMap<GroupKey, Vec<(i32, f64)>> = BTreeMap::new();
    for row in rows {
        groups
            .entry((row.scenario.clone(), row.sector.clone()))
            .or_default()
            .push((row.year, row.value));
    }
    for series in groups.values_mut() {
        series.sort_by_key(|(year, _)| *year);
    }
    groups
}
