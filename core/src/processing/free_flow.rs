//! Free-flow speed from the parabolic density-flow relation.

use crate::prelude::{FieldLength, Sample, TrafficConfig};
use crate::processing::field_length::{FEET_PER_MILE, MINUTES_PER_HOUR};
use crate::record::DetectorRecord;
use crate::telemetry::log::LogManager;

/// Estimates the uncongested speed of a detector-day in miles per hour.
///
/// Only buckets with `0 < occupancy < low_occupancy_ceiling` and a positive
/// volume take part. Returns [`Sample::Invalid`] when none do or when their
/// adjusted densities sum to zero.
pub fn free_flow_speed(
    record: &DetectorRecord,
    field_length: FieldLength,
    config: &TrafficConfig,
) -> Sample {
    let logger = LogManager::new("free_flow");
    let feet = field_length.feet();
    let max_density = (config.max_occupancy * FEET_PER_MILE) / feet;

    let mut volume_sum = 0.0;
    let mut density_sum = 0.0;
    let mut qualifying = 0usize;
    for (volume, occupancy) in record.volumes().iter().zip(record.occupancies().iter()) {
        let (Some(vol), Some(occ)) = (volume.value(), occupancy.value()) else {
            continue;
        };
        if vol <= 0.0 || occ <= 0.0 || occ >= config.low_occupancy_ceiling {
            continue;
        }
        let density = (occ * FEET_PER_MILE) / feet;
        volume_sum += vol;
        density_sum += density - (density * density) / max_density;
        qualifying += 1;
    }

    if qualifying == 0 || density_sum == 0.0 {
        logger.record("no qualifying buckets for free-flow speed");
        return Sample::Invalid;
    }

    let speed = Sample::checked((MINUTES_PER_HOUR * volume_sum) / density_sum);
    logger.record(&format!(
        "free-flow speed {:?} from {} buckets",
        speed.value(),
        qualifying
    ));
    speed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::SampleSequence;

    fn record(volumes: Vec<Sample>, occupancies: Vec<Sample>) -> DetectorRecord {
        DetectorRecord::new(
            SampleSequence::new(60, volumes),
            SampleSequence::new(60, occupancies),
        )
        .unwrap()
    }

    #[test]
    fn single_sample_matches_hand_computation() {
        let length = FieldLength::new(26.4).unwrap();
        let speed = free_flow_speed(
            &record(vec![Sample::Valid(10.0)], vec![Sample::Valid(0.05)]),
            length,
            &TrafficConfig::default(),
        )
        .value()
        .unwrap();
        let max_density = 0.98 * 5280.0 / 26.4;
        let adjusted = 10.0 - 100.0 / max_density;
        assert!((speed - 600.0 / adjusted).abs() < 1e-9);
        assert!((speed - 63.2).abs() < 0.1);
    }

    #[test]
    fn sums_across_qualifying_samples_only() {
        let length = FieldLength::new(26.4).unwrap();
        let speed = free_flow_speed(
            &record(
                vec![
                    Sample::Valid(10.0),
                    Sample::Valid(10.0),
                    Sample::Valid(0.0),
                    Sample::Valid(30.0),
                    Sample::Invalid,
                ],
                vec![
                    Sample::Valid(0.05),
                    Sample::Valid(0.05),
                    Sample::Valid(0.05),
                    Sample::Valid(0.1),
                    Sample::Valid(0.05),
                ],
            ),
            length,
            &TrafficConfig::default(),
        );
        let single = free_flow_speed(
            &record(vec![Sample::Valid(10.0)], vec![Sample::Valid(0.05)]),
            length,
            &TrafficConfig::default(),
        );
        let (pair, single) = (speed.value().unwrap(), single.value().unwrap());
        assert!((pair - single).abs() < 1e-9);
    }

    #[test]
    fn no_qualifying_samples_is_invalid() {
        let speed = free_flow_speed(
            &record(vec![Sample::Valid(10.0); 2], vec![Sample::Valid(0.3); 2]),
            FieldLength::new(20.0).unwrap(),
            &TrafficConfig::default(),
        );
        assert_eq!(speed, Sample::Invalid);
    }
}
