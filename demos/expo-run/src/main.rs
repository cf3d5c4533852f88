//! expo-run: simulate one activity profile over N realisations and write
//! one exposure artifact per realisation.
//!
//! ```text
//! expo-run homemaker_buffer_workday 10 --arg 500
//! expo-run commuter_workday 10 --min 3 --arg 7 --inputs data/ --format sqlite
//! ```
//!
//! `--arg` is the OD matrix id for commuters (artifact `<profile>_ODnn_<r>`)
//! and the leisure radius in metres for homemakers.  Artifacts land in
//! `<output>/<artifact>/`, the run log of each in `<output>/log/`.

mod inputs;
mod logging;
mod synthetic;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};

use expo_output::{ArtifactObserver, CsvWriter, OutputWriter, artifact_dir, artifact_name, log_path};
use expo_profile::ProfileKind;
use expo_sim::{Pipeline, PipelineBuilder, PipelineConfig, RealisationSummary};

use logging::LogMirror;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Csv,
    Sqlite,
    Parquet,
}

#[derive(Parser, Debug)]
#[command(name = "expo-run")]
#[command(about = "Simulate activity schedules and sample exposure per realisation")]
struct Args {
    /// homemaker_buffer_workday, homemaker_buffer_weekend or commuter_workday
    profile: ProfileKind,

    /// Index of the last realisation
    realisations: u32,

    /// Index of the first realisation
    #[arg(long, default_value = "1")]
    min: u32,

    /// Worker threads (default: all logical cores)
    #[arg(long)]
    workers: Option<usize>,

    /// OD matrix id (commuters) or leisure radius in metres (homemakers)
    #[arg(long)]
    arg: Option<u32>,

    /// Pipeline configuration JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output root
    #[arg(long, default_value = "output")]
    output: PathBuf,

    #[arg(long, value_enum, default_value_t = Format::Csv)]
    format: Format,

    /// Input directory; the synthetic city is used when absent
    #[arg(long)]
    inputs: Option<PathBuf>,

    /// Agents in the synthetic city
    #[arg(long, default_value = "500")]
    agents: usize,

    /// Keep only the first N homes
    #[arg(long)]
    limit: Option<usize>,
}

// ── Realisation ───────────────────────────────────────────────────────────────

fn run_with<W: OutputWriter>(pipeline: &Pipeline, r: u32, writer: W) -> Result<RealisationSummary> {
    let mut obs = ArtifactObserver::new(writer, *pipeline.clock());
    let result = pipeline.run_realisation(r, &mut obs);
    if result.is_err() {
        // Aborted realisations skip `on_realisation_end`.
        if let Err(e) = obs.close() {
            tracing::warn!(error = %e, "closing aborted artifact failed");
        }
    }
    let summary = result?;
    if let Some(e) = obs.take_error() {
        return Err(e.into());
    }
    Ok(summary)
}

fn run_realisation(pipeline: &Pipeline, r: u32, dir: &Path, format: Format) -> Result<RealisationSummary> {
    let vars = pipeline.variables();
    match format {
        Format::Csv => run_with(pipeline, r, CsvWriter::new(dir, vars)?),
        #[cfg(feature = "sqlite")]
        Format::Sqlite => run_with(pipeline, r, expo_output::SqliteWriter::new(dir, vars)?),
        #[cfg(feature = "parquet")]
        Format::Parquet => run_with(pipeline, r, expo_output::ParquetWriter::new(dir, vars)?),
        #[allow(unreachable_patterns)]
        other => bail!("expo-run was built without the {other:?} backend; enable its Cargo feature"),
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();
    let mirror = LogMirror::default();
    logging::init(Some(mirror.clone()));

    if args.min == 0 || args.min > args.realisations {
        bail!("realisation range {}..={} is empty", args.min, args.realisations);
    }

    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if args.workers.is_some() {
        config.workers = args.workers;
    }

    let od_id = match args.profile {
        ProfileKind::CommuterWorkday => args.arg,
        ProfileKind::HomemakerBufferWorkday | ProfileKind::HomemakerBufferWeekend => {
            if let Some(radius) = args.arg {
                config.leisure_radius = f64::from(radius);
            }
            None
        }
    };

    let mut inputs = match &args.inputs {
        Some(dir) => inputs::load(dir, od_id)?,
        None => synthetic::city(&config, args.agents, od_id)?,
    };
    if let Some(n) = args.limit {
        inputs.registry.truncate_homes(n);
    }

    let mut builder = PipelineBuilder::new(config, args.profile.instantiate(), inputs.registry, inputs.cube);
    if let Some(od) = inputs.od {
        builder = builder.od(od);
    }
    let pipeline = builder.build()?;

    println!("=== expo-run: {} ===", args.profile);
    println!(
        "Agents: {}  |  Realisations: {}..={}  |  Variables: {}",
        pipeline.registry().homes().len(),
        args.min,
        args.realisations,
        pipeline.variables().join(", "),
    );
    println!();

    let t0 = Instant::now();
    let mut totals = Vec::new();
    for r in args.min..=args.realisations {
        let name = artifact_name(pipeline.profile().name(), od_id, r);
        mirror.open(&log_path(&args.output, &name))?;

        let t = Instant::now();
        let summary = run_realisation(&pipeline, r, &artifact_dir(&args.output, &name), args.format);
        mirror.close()?;
        let summary = summary?;

        tracing::info!(artifact = %name, secs = t.elapsed().as_secs_f64(), "artifact written");
        totals.push((name, summary));
    }

    println!();
    println!("Completed in {:.3} s", t0.elapsed().as_secs_f64());
    println!("{:<40} {:>8} {:>8}", "Artifact", "Agents", "Failed");
    println!("{}", "-".repeat(58));
    for (name, s) in &totals {
        println!("{:<40} {:>8} {:>8}", name, s.succeeded(), s.failed);
    }
    Ok(())
}
