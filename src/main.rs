use anyhow::{Context, Result};
use co2pathways::{
    canon::{self, owid, weo},
    config::PipelineConfig,
    regimes, select, store,
    trajectory::{self, anchor, annualize, metrics},
};
use std::{env, fs, path::PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env_filter).init();
    info!("startup");

    // ─── 2) configuration ────────────────────────────────────────────
    let cfg_path = env::args().nth(1).map(PathBuf::from);
    let cfg = PipelineConfig::load(cfg_path.as_deref())?;
    fs::create_dir_all(&cfg.output_dir)
        .with_context(|| format!("creating output directory {}", cfg.output_dir.display()))?;

    let raw_csvs = store::list_raw_csvs(&cfg.raw_dir)?;
    info!(files = raw_csvs.len(), dir = %cfg.raw_dir.display(), "raw CSVs present");

    let mut summary = store::RunSummary::new(&cfg);

    // ─── 3) load raw sources ─────────────────────────────────────────
    let owid_raw = store::load_owid(&cfg.owid_path())?;
    let weo_raw = store::load_weo(&cfg.weo_path())?;

    // ─── 4) canonicalize + select ────────────────────────────────────
    let hist = owid::canonicalize(&cfg, &owid_raw)?;
    let scen = weo::canonicalize(&cfg, &weo_raw)?;
    let selected = select::apply(&cfg, &scen)?;
    let canonical = canon::concat(&cfg, vec![hist, selected])?;
    summary.record("canonical", canonical.len());

    // ─── 5) anchor + annualize ───────────────────────────────────────
    let traj = trajectory::from_canonical(&canonical);
    let (hist_traj, scen_traj): (Vec<_>, Vec<_>) = traj
        .into_iter()
        .partition(|r| r.scenario == cfg.historical_label);

    let anchored = anchor::extend(&cfg, &hist_traj, &scen_traj);

    // raw trajectories: the observed series plus the anchored sparse
    // scenario series, before any densification
    let mut trajectories_raw = hist_traj.clone();
    trajectories_raw.extend(anchored.iter().cloned());
    trajectories_raw.sort_by(|a, b| {
        (&a.scenario, &a.sector, a.year).cmp(&(&b.scenario, &b.sector, b.year))
    });
    summary.record("trajectories_raw", trajectories_raw.len());

    let annual = annualize::run(&cfg, &anchored);
    summary.record("trajectories", annual.len());

    // ─── 6) derived metrics ──────────────────────────────────────────
    let gaps = metrics::gaps(&cfg, &annual)?;
    let cumulative = metrics::cumulative(&cfg, &annual);
    let indexed = metrics::indexed(&annual);
    let regime_rows = regimes::characterize(&cfg, &indexed);
    summary.record("gaps", gaps.len());
    summary.record("cumulative", cumulative.len());
    summary.record("indexed", indexed.len());
    summary.record("regimes", regime_rows.len());

    // ─── 7) persist outputs ──────────────────────────────────────────
    let out = &cfg.output_dir;
    store::write_csv(&out.join("canonical.csv"), &canonical)?;
    store::write_csv(&out.join("trajectories_raw.csv"), &trajectories_raw)?;
    store::write_csv(&out.join("trajectories.csv"), &annual)?;
    store::write_trajectories_parquet(&out.join("trajectories.parquet"), &annual)?;
    store::write_csv(&out.join("gaps.csv"), &gaps)?;
    store::write_csv(&out.join("cumulative.csv"), &cumulative)?;
    store::write_csv(&out.join("indexed.csv"), &indexed)?;
    store::write_regimes_csv(&out.join("regimes.csv"), &cfg.regime_probe_years, &regime_rows)?;
    summary.finish(&out.join("run_summary.json"))?;

    info!("all done");
    Ok(())
}
