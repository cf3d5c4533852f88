//! expo-weekly: combine persisted day summaries into weekly artifacts.
//!
//! ```text
//! expo-weekly week.json --output output
//! expo-weekly week.json --output output --sqlite
//! ```
//!
//! See `expo_output::weekly` for the combination format.

mod logging;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use expo_output::{WeeklyCombination, log_path, run_weekly};

use logging::LogMirror;

#[derive(Parser, Debug)]
#[command(name = "expo-weekly")]
#[command(about = "Combine day-type artifacts into weekly exposure statistics")]
struct Args {
    /// Weekly combination JSON
    combination: PathBuf,

    /// Output root holding the realisation artifacts
    #[arg(long, default_value = "output")]
    output: PathBuf,

    /// Also store the weekly tables in `<output>/<name>/weekly.db`
    #[arg(long)]
    sqlite: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mirror = LogMirror::default();
    logging::init(Some(mirror.clone()));

    if args.sqlite && !cfg!(feature = "sqlite") {
        bail!("expo-weekly was built without the sqlite backend; enable its Cargo feature");
    }

    let combination = WeeklyCombination::from_json_file(&args.combination)
        .with_context(|| format!("loading {}", args.combination.display()))?;
    mirror.open(&log_path(&args.output, &combination.name))?;

    let report = run_weekly(&args.output, &combination);
    mirror.close()?;
    #[cfg_attr(not(feature = "sqlite"), allow(unused_mut))]
    let mut report = report?;

    #[cfg(feature = "sqlite")]
    if args.sqlite {
        let dir = args.output.join(&combination.name);
        let db = expo_output::write_weekly_sqlite(&dir, &report.tables, combination.realisations as usize)?;
        report.files.push(db);
    }

    println!("=== expo-weekly: {} ===", combination.name);
    println!(
        "Realisations: {}  |  Day types: {}  |  Agents: {}",
        combination.realisations,
        combination.day_types.len(),
        report.tables.first().map_or(0, |t| t.records.len()),
    );
    for file in &report.files {
        println!("  {}", file.display());
    }
    Ok(())
}
