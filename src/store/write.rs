// src/store/write.rs

use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, Float64Array, Int32Array, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use serde::Serialize;
use std::{
    fs::{self, File},
    io::BufWriter,
    path::Path,
    sync::Arc,
};
use tracing::info;

use crate::regimes::RegimeRow;
use crate::trajectory::TrajectoryRow;

/// Write any serializable table as CSV. The file lands atomically: rows go
/// to a `.tmp` sibling first, which is renamed over the target on success.
/// Non-finite floats serialize as their textual forms ("NaN", "inf") so edge
/// cases stay visible to consumers.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let tmp_path = path.with_extension("csv.tmp");
    {
        let file = File::create(&tmp_path)
            .with_context(|| format!("creating {}", tmp_path.display()))?;
        let mut w = csv::Writer::from_writer(BufWriter::new(file));
        for row in rows {
            w.serialize(row)
                .with_context(|| format!("writing row to {}", tmp_path.display()))?;
        }
        w.flush()
            .with_context(|| format!("flushing {}", tmp_path.display()))?;
    }
    fs::rename(&tmp_path, path)
        .with_context(|| format!("renaming {} -> {}", tmp_path.display(), path.display()))?;
    info!(rows = rows.len(), path = %path.display(), "wrote table");
    Ok(())
}

/// The regimes table has one feature column per probe year, so the header is
/// assembled by hand instead of via serde.
pub fn write_regimes_csv(path: &Path, probe_years: &[i32], rows: &[RegimeRow]) -> Result<()> {
    let tmp_path = path.with_extension("csv.tmp");
    {
        let file = File::create(&tmp_path)
            .with_context(|| format!("creating {}", tmp_path.display()))?;
        let mut w = csv::Writer::from_writer(BufWriter::new(file));

        let mut header = vec!["sector".to_string(), "cluster".to_string()];
        header.extend(probe_years.iter().map(|y| format!("index_{}", y)));
        w.write_record(&header)?;

        for row in rows {
            let mut rec = vec![row.sector.clone(), row.cluster.to_string()];
            rec.extend(row.features.iter().map(|v| v.to_string()));
            w.write_record(&rec)
                .with_context(|| format!("writing row to {}", tmp_path.display()))?;
        }
        w.flush()?;
    }
    fs::rename(&tmp_path, path)
        .with_context(|| format!("renaming {} -> {}", tmp_path.display(), path.display()))?;
    info!(rows = rows.len(), path = %path.display(), "wrote regimes table");
    Ok(())
}

/// The annualized trajectory table doubles as a Parquet artifact for
/// columnar consumers.
pub fn write_trajectories_parquet(path: &Path, rows: &[TrajectoryRow]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("year", DataType::Int32, false),
        Field::new("scenario", DataType::Utf8, false),
        Field::new("sector", DataType::Utf8, false),
        Field::new("value", DataType::Float64, false),
    ]));

    let years = Int32Array::from_iter_values(rows.iter().map(|r| r.year));
    let scenarios = StringArray::from_iter_values(rows.iter().map(|r| r.scenario.as_str()));
    let sectors = StringArray::from_iter_values(rows.iter().map(|r| r.sector.as_str()));
    let values = Float64Array::from_iter_values(rows.iter().map(|r| r.value));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(years) as ArrayRef,
            Arc::new(scenarios) as ArrayRef,
            Arc::new(sectors) as ArrayRef,
            Arc::new(values) as ArrayRef,
        ],
    )
    .context("building trajectory record batch")?;

    let tmp_path = path.with_extension("parquet.tmp");
    let file = File::create(&tmp_path)
        .with_context(|| format!("creating {}", tmp_path.display()))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, schema, Some(props))
        .context("creating Arrow writer for trajectories")?;
    writer.write(&batch).context("writing trajectory batch")?;
    writer.close().context("closing trajectory writer")?;

    fs::rename(&tmp_path, path)
        .with_context(|| format!("renaming {} -> {}", tmp_path.display(), path.display()))?;
    info!(rows = rows.len(), path = %path.display(), "wrote trajectory parquet");
    Ok(())
}
