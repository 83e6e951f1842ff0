//! Effective field length from low-occupancy volume/occupancy pairs.

use crate::math::stats::StatsHelper;
use crate::prelude::{FieldLength, Sample, SampleSequence, TrafficConfig};
use crate::record::DetectorRecord;
use crate::telemetry::log::LogManager;

pub const FEET_PER_MILE: f64 = 5280.0;
pub const MINUTES_PER_HOUR: f64 = 60.0;

/// Day-average field length plus the per-bucket estimates it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldLengthEstimate {
    /// Invalid when no bucket produced an estimate.
    pub average: Sample,
    pub per_sample: SampleSequence,
}

impl FieldLengthEstimate {
    pub fn average_length(&self) -> Option<FieldLength> {
        self.average
            .value()
            .and_then(|feet| FieldLength::new(feet).ok())
    }
}

/// Estimates the field length of each bucket and their average.
///
/// A bucket contributes only when `0 < occupancy <= low_occupancy_ceiling`
/// and its volume is a valid non-zero count; vehicles are then assumed to
/// travel at the speed limit.
pub fn field_lengths(record: &DetectorRecord, config: &TrafficConfig) -> FieldLengthEstimate {
    let logger = LogManager::new("field_length");
    let ceiling = config.low_occupancy_ceiling;

    let per_sample: Vec<Sample> = record
        .volumes()
        .iter()
        .zip(record.occupancies().iter())
        .map(|(volume, occupancy)| match (volume.value(), occupancy.value()) {
            (Some(vol), Some(occ)) if vol > 0.0 && occ > 0.0 && occ <= ceiling => {
                Sample::checked(
                    (config.speed_limit * occ * FEET_PER_MILE) / (vol * MINUTES_PER_HOUR),
                )
            }
            _ => Sample::Invalid,
        })
        .collect();

    let per_sample = SampleSequence::new(record.interval_secs(), per_sample);
    let average = Sample::from(StatsHelper::mean(per_sample.valid_values()));
    logger.record(&format!(
        "{} of {} buckets usable, average {:?}",
        per_sample.valid_count(),
        per_sample.len(),
        average.value()
    ));

    FieldLengthEstimate {
        average,
        per_sample,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(volumes: Vec<Sample>, occupancies: Vec<Sample>) -> DetectorRecord {
        DetectorRecord::new(
            SampleSequence::new(60, volumes),
            SampleSequence::new(60, occupancies),
        )
        .unwrap()
    }

    fn config(speed_limit: f64) -> TrafficConfig {
        TrafficConfig::default().with_speed_limit(speed_limit)
    }

    #[test]
    fn single_sample_matches_hand_computation() {
        let estimate = field_lengths(
            &record(vec![Sample::Valid(10.0)], vec![Sample::Valid(0.05)]),
            &config(60.0),
        );
        let length = estimate.average.value().unwrap();
        assert!((length - 26.4).abs() < 1e-9);
        assert_eq!(estimate.per_sample.len(), 1);
        assert!((estimate.average_length().unwrap().feet() - 26.4).abs() < 1e-9);
    }

    #[test]
    fn ineligible_samples_are_invalid() {
        let estimate = field_lengths(
            &record(
                vec![
                    Sample::Valid(0.0),
                    Sample::Valid(10.0),
                    Sample::Valid(10.0),
                    Sample::Invalid,
                    Sample::Valid(10.0),
                    Sample::Valid(10.0),
                ],
                vec![
                    Sample::Valid(0.05),
                    Sample::Valid(0.0),
                    Sample::Valid(0.11),
                    Sample::Valid(0.05),
                    Sample::Invalid,
                    Sample::Valid(0.1),
                ],
            ),
            &config(60.0),
        );
        let validity: Vec<bool> = estimate.per_sample.iter().map(Sample::is_valid).collect();
        assert_eq!(validity, vec![false, false, false, false, false, true]);
        assert!((estimate.average.value().unwrap() - 52.8).abs() < 1e-9);
    }

    #[test]
    fn average_is_invalid_when_nothing_qualifies() {
        let estimate = field_lengths(
            &record(vec![Sample::Valid(10.0); 3], vec![Sample::Valid(0.5); 3]),
            &config(70.0),
        );
        assert_eq!(estimate.average, Sample::Invalid);
        assert!(estimate.average_length().is_none());
        assert_eq!(estimate.per_sample.len(), 3);
    }

    #[test]
    fn average_covers_only_valid_samples() {
        let estimate = field_lengths(
            &record(
                vec![Sample::Valid(10.0), Sample::Valid(20.0), Sample::Invalid],
                vec![Sample::Valid(0.05), Sample::Valid(0.05), Sample::Valid(0.05)],
            ),
            &config(60.0),
        );
        assert!((estimate.average.value().unwrap() - (26.4 + 13.2) / 2.0).abs() < 1e-9);
    }
}
