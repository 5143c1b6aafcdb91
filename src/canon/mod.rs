// src/canon/mod.rs

pub mod owid;
pub mod weo;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;

/// The canonical column set, in order. Both source branches normalize into
/// exactly this shape; anything else downstream is a bug in the branch.
pub const SCHEMA_COLUMNS: [&str; 8] = [
    "year", "region", "sector", "scenario", "variable", "value", "unit", "source",
];

/// One row of the canonical long-format table. Removal technologies in the
/// net-zero scenario can carry negative values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub year: i32,
    pub region: String,
    pub sector: String,
    pub scenario: String,
    pub variable: String,
    pub value: f64,
    pub unit: String,
    pub source: String,
}

/// Merge the historical and scenario branches into one canonical table,
/// re-checking the invariants the branches are supposed to have established.
/// A violation here means a branch is emitting rows outside the canonical
/// schema and the run must not continue.
pub fn concat(cfg: &PipelineConfig, branches: Vec<Vec<CanonicalRecord>>) -> Result<Vec<CanonicalRecord>> {
    let known_scenarios = [
        cfg.historical_label.as_str(),
        cfg.baseline_label.as_str(),
        cfg.net_zero_label.as_str(),
    ];

    let mut out: Vec<CanonicalRecord> = Vec::new();
    for branch in branches {
        out.extend(branch);
    }

    for rec in &out {
        if !known_scenarios.contains(&rec.scenario.as_str()) {
            bail!(
                "canonical schema mismatch: unknown scenario label `{}` (year {}, sector `{}`)",
                rec.scenario,
                rec.year,
                rec.sector
            );
        }
        if rec.variable != cfg.variable {
            bail!(
                "canonical schema mismatch: variable `{}` != `{}`",
                rec.variable,
                cfg.variable
            );
        }
        if rec.unit != cfg.unit {
            bail!(
                "canonical schema mismatch: unit `{}` != `{}`",
                rec.unit,
                cfg.unit
            );
        }
        if rec.region != cfg.region {
            bail!(
                "canonical schema mismatch: region `{}` != `{}`",
                rec.region,
                cfg.region
            );
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(scenario: &str) -> CanonicalRecord {
        CanonicalRecord {
            year: 2030,
            region: "World".into(),
            sector: "Total energy supply".into(),
            scenario: scenario.into(),
            variable: "co2_emissions".into(),
            value: 1.0,
            unit: "Mt CO2".into(),
            source: "test".into(),
        }
    }

    #[test]
    fn concat_accepts_known_scenarios() -> Result<()> {
        let cfg = PipelineConfig::default();
        let merged = concat(&cfg, vec![vec![rec("historical")], vec![rec("STEPS"), rec("NZE")]])?;
        assert_eq!(merged.len(), 3);
        Ok(())
    }

    #[test]
    fn concat_rejects_unknown_scenario() {
        let cfg = PipelineConfig::default();
        let err = concat(&cfg, vec![vec![rec("APS")]]).unwrap_err();
        assert!(err.to_string().contains("unknown scenario label"));
    }

    #[test]
    fn concat_rejects_foreign_unit() {
        let cfg = PipelineConfig::default();
        let mut bad = rec("STEPS");
        bad.unit = "Gt CO2".into();
        assert!(concat(&cfg, vec![vec![bad]]).is_err());
    }

    #[test]
    fn serialized_header_matches_schema_columns() -> Result<()> {
        // The CSV header the canonical table persists with is exactly the
        // fixed column set, in order.
        let mut buf = Vec::new();
        {
            let mut w = csv::Writer::from_writer(&mut buf);
            w.serialize(rec("historical"))?;
            w.flush()?;
        }
        let data = String::from_utf8(buf)?;
        let header = data.lines().next().unwrap();
        assert_eq!(header, SCHEMA_COLUMNS.join(","));
        Ok(())
    }
}
