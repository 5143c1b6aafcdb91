// src/regimes.rs
//
// Optional interpretation layer: cluster sectors by the shape of their
// net-zero indexed trajectory. Consumes the indexed table as opaque tabular
// input and emits a labeled table; nothing upstream depends on it.

use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::trajectory::metrics::IndexedRow;

/// One sector labeled with its decarbonization regime.
#[derive(Debug, Clone, PartialEq)]
pub struct RegimeRow {
    pub sector: String,
    pub cluster: usize,
    /// Indexed values at the configured probe years, in probe-year order.
    pub features: Vec<f64>,
}

const MAX_ITERATIONS: usize = 100;

/// Build one feature vector per sector from the net-zero scenario's indexed
/// values at the configured probe years, then k-means them into regimes.
/// Sectors missing a probe year are skipped with a warning; the cluster
/// count is clamped to the number of distinct feature vectors. Deterministic:
/// farthest-point seeding, no randomness.
pub fn characterize(cfg: &PipelineConfig, indexed: &[IndexedRow]) -> Vec<RegimeRow> {
    let mut per_sector: BTreeMap<&str, BTreeMap<i32, f64>> = BTreeMap::new();
    for row in indexed {
        if row.scenario == cfg.net_zero_label {
            per_sector
                .entry(row.sector.as_str())
                .or_default()
                .insert(row.year, row.emissions_index);
        }
    }

    let mut sectors: Vec<String> = Vec::new();
    let mut features: Vec<Vec<f64>> = Vec::new();
    for (sector, years) in &per_sector {
        let probe: Option<Vec<f64>> = cfg
            .regime_probe_years
            .iter()
            .map(|y| years.get(y).copied())
            .collect();
        match probe {
            Some(vector) => {
                sectors.push(sector.to_string());
                features.push(vector);
            }
            None => warn!(sector = %sector, "sector lacks a probe year; skipped in regime clustering"),
        }
    }

    if sectors.is_empty() {
        warn!("no sectors eligible for regime clustering");
        return Vec::new();
    }

    let normalized = zscore(&features);
    let k = effective_k(cfg.regime_clusters, &normalized);
    let labels = kmeans(&normalized, k);

    info!(sectors = sectors.len(), clusters = k, "characterized decarbonization regimes");

    sectors
        .into_iter()
        .zip(features)
        .zip(labels)
        .map(|((sector, features), cluster)| RegimeRow {
            sector,
            cluster,
            features,
        })
        .collect()
}

/// Standardize each feature dimension; a constant dimension maps to zero.
fn zscore(features: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = features.len() as f64;
    let dims = features.first().map_or(0, |f| f.len());

    let mut means = vec![0.0; dims];
    for row in features {
        for (d, v) in row.iter().enumerate() {
            means[d] += v / n;
        }
    }
    let mut stds = vec![0.0; dims];
    for row in features {
        for (d, v) in row.iter().enumerate() {
            stds[d] += (v - means[d]).powi(2) / n;
        }
    }
    for s in &mut stds {
        *s = s.sqrt();
    }

    features
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(d, v)| if stds[d] > 0.0 { (v - means[d]) / stds[d] } else { 0.0 })
                .collect()
        })
        .collect()
}

fn effective_k(requested: usize, points: &[Vec<f64>]) -> usize {
    let mut distinct: Vec<&Vec<f64>> = Vec::new();
    for p in points {
        if !distinct.iter().any(|d| *d == p) {
            distinct.push(p);
        }
    }
    requested.clamp(1, distinct.len())
}

fn sq_dist(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Plain Lloyd iteration with farthest-point seeding.
fn kmeans(points: &[Vec<f64>], k: usize) -> Vec<usize> {
    let mut centroids: Vec<Vec<f64>> = vec![points[0].clone()];
    while centroids.len() < k {
        let next = points
            .iter()
            .max_by(|a, b| {
                let da: f64 = centroids.iter().map(|c| sq_dist(a, c)).fold(f64::MAX, f64::min);
                let db: f64 = centroids.iter().map(|c| sq_dist(b, c)).fold(f64::MAX, f64::min);
                da.total_cmp(&db)
            })
            .expect("points are non-empty");
        centroids.push(next.clone());
    }

    let mut labels = vec![0usize; points.len()];
    for _ in 0..MAX_ITERATIONS {
        let mut changed = false;
        for (i, p) in points.iter().enumerate() {
            let nearest = centroids
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| sq_dist(p, a).total_cmp(&sq_dist(p, b)))
                .map(|(idx, _)| idx)
                .expect("centroids are non-empty");
            if labels[i] != nearest {
                labels[i] = nearest;
                changed = true;
            }
        }
        if !changed {
            break;
        }

        let dims = points[0].len();
        let mut sums = vec![vec![0.0; dims]; centroids.len()];
        let mut counts = vec![0usize; centroids.len()];
        for (p, &label) in points.iter().zip(&labels) {
            counts[label] += 1;
            for (d, v) in p.iter().enumerate() {
                sums[label][d] += v;
            }
        }
        for (c, (sum, count)) in centroids.iter_mut().zip(sums.into_iter().zip(counts)) {
            if count > 0 {
                *c = sum.into_iter().map(|s| s / count as f64).collect();
            }
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(year: i32, scenario: &str, sector: &str, value: f64) -> IndexedRow {
        IndexedRow {
            year,
            scenario: scenario.into(),
            sector: sector.into(),
            emissions_index: value,
        }
    }

    #[test]
    fn separates_fast_and_slow_decliners() {
        let mut cfg = PipelineConfig::default();
        cfg.regime_clusters = 2;
        let mut rows = Vec::new();
        for (sector, shape) in [
            ("Industry", [80.0, 50.0, 20.0]),
            ("Transport", [82.0, 52.0, 22.0]),
            ("Buildings", [98.0, 95.0, 92.0]),
            ("Total energy supply", [97.0, 94.0, 90.0]),
        ] {
            for (year, v) in cfg.regime_probe_years.iter().zip(shape) {
                rows.push(idx(*year, "NZE", sector, v));
            }
        }
        let regimes = characterize(&cfg, &rows);
        assert_eq!(regimes.len(), 4);

        let label_of = |s: &str| regimes.iter().find(|r| r.sector == s).unwrap().cluster;
        assert_eq!(label_of("Industry"), label_of("Transport"));
        assert_eq!(label_of("Buildings"), label_of("Total energy supply"));
        assert_ne!(label_of("Industry"), label_of("Buildings"));
    }

    #[test]
    fn sectors_missing_probe_years_are_skipped() {
        let cfg = PipelineConfig::default();
        let rows = vec![
            idx(2030, "NZE", "Industry", 80.0),
            idx(2040, "NZE", "Industry", 50.0),
            // Industry has no 2050 value; Transport is complete
            idx(2030, "NZE", "Transport", 82.0),
            idx(2040, "NZE", "Transport", 52.0),
            idx(2050, "NZE", "Transport", 22.0),
        ];
        let regimes = characterize(&cfg, &rows);
        assert_eq!(regimes.len(), 1);
        assert_eq!(regimes[0].sector, "Transport");
    }

    #[test]
    fn baseline_rows_do_not_leak_into_features() {
        let cfg = PipelineConfig::default();
        let mut rows = Vec::new();
        for (year, v) in cfg.regime_probe_years.iter().zip([80.0, 50.0, 20.0]) {
            rows.push(idx(*year, "NZE", "Industry", v));
            rows.push(idx(*year, "STEPS", "Industry", 100.0));
        }
        let regimes = characterize(&cfg, &rows);
        assert_eq!(regimes.len(), 1);
        assert_eq!(regimes[0].features, vec![80.0, 50.0, 20.0]);
    }

    #[test]
    fn cluster_count_clamps_to_distinct_vectors() {
        let mut cfg = PipelineConfig::default();
        cfg.regime_clusters = 5;
        let mut rows = Vec::new();
        for sector in ["Industry", "Transport"] {
            for (year, v) in cfg.regime_probe_years.iter().zip([80.0, 50.0, 20.0]) {
                rows.push(idx(*year, "NZE", sector, v));
            }
        }
        let regimes = characterize(&cfg, &rows);
        // identical vectors collapse to one cluster
        assert!(regimes.iter().all(|r| r.cluster == 0));
    }
}
