use anyhow::{ensure, Context};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use trafficcore::processing::{encode_occupancies, encode_volumes};
use trafficcore::record::{RawDetectorDay, StreamKind};
use trafficcore::TrafficConfig;

const FEET_PER_SECOND_PER_MPH: f64 = 5280.0 / 3600.0;

/// Shape of a generated detector-day with a morning and an evening peak.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticProfile {
    pub seed: u64,
    /// Vehicles per raw record at the height of a peak.
    pub peak_volume: f64,
    pub free_flow_speed: f64,
    /// Effective vehicle plus detection-zone length in feet.
    pub field_length: f64,
    /// Fraction of congestion-induced slowdown at the height of a peak.
    pub congestion: f64,
    /// Probability that a record is reported as missing.
    pub dropout: f64,
}

impl Default for SyntheticProfile {
    fn default() -> Self {
        Self {
            seed: 0,
            peak_volume: 12.0,
            free_flow_speed: 65.0,
            field_length: 22.0,
            congestion: 0.7,
            dropout: 0.01,
        }
    }
}

fn peak(fraction_of_day: f64, center: f64, width: f64) -> f64 {
    (-((fraction_of_day - center) / width).powi(2)).exp()
}

fn build_streams(
    profile: &SyntheticProfile,
    config: &TrafficConfig,
) -> anyhow::Result<(Vec<i8>, Vec<i16>)> {
    config
        .validate()
        .context("validating traffic configuration for synthetic data")?;
    ensure!(
        profile.free_flow_speed > 0.0 && profile.field_length > 0.0,
        "synthetic profile needs positive speed and field length"
    );
    ensure!(
        (0.0..=1.0).contains(&profile.dropout),
        "dropout must be a probability, got {}",
        profile.dropout
    );

    let records = config.records_per_day;
    let window_secs = f64::from(config.raw_interval_secs());
    let max_volume = i8::try_from(config.max_volume.min(i32::from(i8::MAX)))
        .context("volume range does not fit the record width")?;
    let max_counts = i16::try_from(config.max_occupancy_counts.min(i32::from(i16::MAX)))
        .context("occupancy range does not fit the record width")?;

    let mut rng = StdRng::seed_from_u64(profile.seed);
    let mut volumes = Vec::with_capacity(records);
    let mut occupancies = Vec::with_capacity(records);

    for index in 0..records {
        if rng.gen_bool(profile.dropout) {
            volumes.push(-1);
            occupancies.push(-1);
            continue;
        }

        let t = index as f64 / records as f64;
        let intensity = 0.05 + 0.95 * peak(t, 8.0 / 24.0, 0.06).max(peak(t, 17.5 / 24.0, 0.07));
        let expected = profile.peak_volume * intensity + rng.gen_range(-0.5..0.5);
        let volume = (expected.round() as i8).clamp(0, max_volume);

        let speed_mph = profile.free_flow_speed * (1.0 - profile.congestion * intensity.powi(4));
        let dwell_secs = profile.field_length / (speed_mph * FEET_PER_SECOND_PER_MPH);
        let ratio = (f64::from(volume) * dwell_secs / window_secs).min(1.0);
        let counts = (ratio * f64::from(max_counts)).round() as i16;

        volumes.push(volume);
        occupancies.push(counts.clamp(0, max_counts));
    }

    Ok((volumes, occupancies))
}

pub fn build_raw_day(
    detector_id: &str,
    profile: &SyntheticProfile,
    config: &TrafficConfig,
) -> anyhow::Result<RawDetectorDay> {
    let (volumes, occupancies) = build_streams(profile, config)?;
    Ok(RawDetectorDay::new(
        detector_id,
        encode_volumes(&volumes),
        encode_occupancies(&occupancies),
    ))
}

/// Writes a generated detector-day as `<id>.v30` / `<id>.c30` into `dir`.
pub fn write_synthetic_day<P: AsRef<Path>>(
    dir: P,
    detector_id: &str,
    profile: &SyntheticProfile,
    config: &TrafficConfig,
) -> anyhow::Result<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let day = build_raw_day(detector_id, profile, config)?;
    for (kind, bytes) in [
        (StreamKind::Volume, &day.volume_bytes),
        (StreamKind::Occupancy, &day.occupancy_bytes),
    ] {
        let path = dir.join(format!("{}.{}", detector_id, kind.extension()));
        fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}
