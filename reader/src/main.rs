use anyhow::{ensure, Context};
use clap::Parser;
use log::info;
use source::archive::ArchiveSource;
use source::directory::DirectorySource;
use source::synthetic::{write_synthetic_day, SyntheticProfile};
use source::DetectorSource;
use std::path::PathBuf;
use workflow::config::{OutputResolution, ReaderConfig};
use workflow::runner::Runner;

mod report;
mod source;
mod workflow;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Derive volume, occupancy and speed series from detector streams"
)]
struct Args {
    /// A .traffic archive, or a directory of `<id>.v30` / `<id>.c30` streams
    #[arg(long)]
    source: PathBuf,
    /// Load reader settings from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Detector to process; repeat for several, omit for all
    #[arg(long = "detector")]
    detectors: Vec<String>,
    /// Only print the detector IDs found in the source
    #[arg(long, default_value_t = false)]
    list: bool,
    /// Speed limit in mph for every detector without an override
    #[arg(long)]
    speed_limit: Option<f64>,
    #[arg(long, value_enum)]
    resolution: Option<OutputResolution>,
    /// Emit full reports as JSON instead of summary lines
    #[arg(long, default_value_t = false)]
    json: bool,
    /// Write a synthetic detector-day with this ID into the source first
    #[arg(long)]
    generate: Option<String>,
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ReaderConfig::load(path)?,
        None => ReaderConfig::default(),
    };
    config.apply_overrides(args.speed_limit, args.resolution);

    if let Some(detector_id) = &args.generate {
        ensure!(
            !args.source.is_file(),
            "synthetic data can only be written to a directory source"
        );
        let profile = SyntheticProfile {
            seed: args.seed,
            ..Default::default()
        };
        write_synthetic_day(&args.source, detector_id, &profile, &config.traffic)
            .with_context(|| format!("generating synthetic detector {}", detector_id))?;
        info!("wrote synthetic detector {} to {}", detector_id, args.source.display());
    }

    let source: Box<dyn DetectorSource> = if args.source.is_file() {
        Box::new(ArchiveSource::open(&args.source)?)
    } else {
        Box::new(DirectorySource::open(&args.source)?)
    };
    if args.list {
        for detector_id in source.list_detectors()? {
            println!("{}", detector_id);
        }
        return Ok(());
    }

    let detectors = if args.detectors.is_empty() {
        source.list_detectors()?
    } else {
        args.detectors.clone()
    };

    let runner = Runner::new(config)?;
    let outcome = runner.execute(source.as_ref(), &detectors);

    if args.json {
        let json = serde_json::to_string_pretty(&outcome.reports).context("serializing reports")?;
        println!("{}", json);
    } else {
        for report in &outcome.reports {
            println!("{}", report.summary_line());
        }
    }
    for skipped in &outcome.skipped {
        eprintln!("skipped detector {}: {}", skipped.detector_id, skipped.reason);
    }

    let metrics = runner.metrics().snapshot();
    info!(
        "processed {} detectors, skipped {}, substituted {} streams",
        metrics.processed, metrics.skipped, metrics.substituted_streams
    );

    Ok(())
}
