//! Temporal roll-ups. Any invalid input poisons its whole bucket.

use crate::math::stats::StatsHelper;
use crate::prelude::{Sample, SampleSequence, TrafficError, TrafficResult};
use crate::record::DetectorRecord;

/// Raw records per one-minute bucket.
pub const MINUTE_FACTOR: usize = 2;
/// One-minute buckets per five-minute bucket.
pub const FIVE_MINUTE_FACTOR: usize = 5;

fn check_factor(len: usize, factor: usize) -> TrafficResult<()> {
    if factor == 0 || len % factor != 0 {
        return Err(TrafficError::MisalignedSequence { len, factor });
    }
    Ok(())
}

fn interval_of(sequence: &SampleSequence, factor: usize) -> u32 {
    sequence.interval_secs() * factor as u32
}

/// Rolls 30-second records up to one-minute buckets.
pub fn aggregate_pairs(record: &DetectorRecord) -> TrafficResult<DetectorRecord> {
    aggregate_pairs_by(record, MINUTE_FACTOR)
}

/// Groups `factor` adjacent records: volumes are summed, occupancies averaged.
///
/// A bucket is valid only if every volume and every occupancy in it is valid;
/// otherwise both outputs for that bucket are invalid.
pub fn aggregate_pairs_by(record: &DetectorRecord, factor: usize) -> TrafficResult<DetectorRecord> {
    check_factor(record.len(), factor)?;
    let volumes = record.volumes().samples();
    let occupancies = record.occupancies().samples();

    let mut summed: Vec<Sample> = Vec::with_capacity(record.len() / factor);
    let mut averaged: Vec<Sample> = Vec::with_capacity(record.len() / factor);
    let buckets = volumes
        .chunks_exact(factor)
        .zip(occupancies.chunks_exact(factor));
    for (vol_bucket, occ_bucket) in buckets {
        let vol_values: Option<Vec<f64>> = vol_bucket.iter().map(|s| s.value()).collect();
        let occ_values: Option<Vec<f64>> = occ_bucket.iter().map(|s| s.value()).collect();
        match (vol_values, occ_values) {
            (Some(vols), Some(occs)) => {
                summed.push(Sample::checked(vols.iter().sum()));
                averaged.push(Sample::from(StatsHelper::mean(occs)));
            }
            _ => {
                summed.push(Sample::Invalid);
                averaged.push(Sample::Invalid);
            }
        }
    }

    DetectorRecord::new(
        SampleSequence::new(interval_of(record.volumes(), factor), summed),
        SampleSequence::new(interval_of(record.occupancies(), factor), averaged),
    )
}

/// Rolls one-minute speeds up to five-minute buckets.
///
/// All five minutes of a bucket are examined; a single invalid minute
/// invalidates the bucket.
pub fn aggregate_speeds(speeds: &SampleSequence) -> TrafficResult<SampleSequence> {
    aggregate_mean_by(speeds, FIVE_MINUTE_FACTOR)
}

/// Averages `factor` adjacent samples into one bucket.
pub fn aggregate_mean_by(
    sequence: &SampleSequence,
    factor: usize,
) -> TrafficResult<SampleSequence> {
    check_factor(sequence.len(), factor)?;
    let buckets = sequence
        .samples()
        .chunks_exact(factor)
        .map(|bucket| {
            let values: Option<Vec<f64>> = bucket.iter().map(|s| s.value()).collect();
            Sample::from(values.and_then(StatsHelper::mean))
        })
        .collect();
    Ok(SampleSequence::new(interval_of(sequence, factor), buckets))
}
