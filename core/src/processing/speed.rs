//! Three-regime speed estimation from occupancy.

use crate::prelude::{FieldLength, Sample, SampleSequence, TrafficConfig, TrafficResult};
use crate::processing::field_length::field_lengths;
use crate::processing::free_flow::free_flow_speed;
use crate::record::DetectorRecord;
use crate::telemetry::log::LogManager;
use serde::Serialize;

/// Occupancy band that selects the speed formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    /// `0 < occupancy <= low_occupancy_ceiling`
    Uncongested,
    /// `low_occupancy_ceiling < occupancy <= theta`
    Transitional,
    /// `occupancy > theta`
    Congested,
}

impl Regime {
    /// Zero or negative occupancy belongs to no regime.
    pub fn classify(occupancy: f64, config: &TrafficConfig) -> Option<Regime> {
        if occupancy <= 0.0 {
            None
        } else if occupancy <= config.low_occupancy_ceiling {
            Some(Regime::Uncongested)
        } else if occupancy <= config.theta {
            Some(Regime::Transitional)
        } else {
            Some(Regime::Congested)
        }
    }
}

/// Where the free-flow speed and field length of an estimate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedBasis {
    /// Both derived from the day's data.
    Derived,
    /// Caller-supplied field length, derived free-flow speed.
    SuppliedFieldLength,
    /// No field length could be estimated; default length and speed limit used.
    DefaultFieldLength,
    /// Field length available but free-flow speed was not; speed limit used.
    SpeedLimitFreeFlow,
}

/// Per-bucket speeds plus the parameters they were computed with.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedEstimate {
    pub speeds: SampleSequence,
    pub free_flow_speed: f64,
    pub average_field_length: FieldLength,
    pub basis: SpeedBasis,
}

enum SampleLengths {
    Uniform(f64),
    PerSample(SampleSequence),
}

impl SampleLengths {
    fn at(&self, index: usize) -> Sample {
        match self {
            SampleLengths::Uniform(feet) => Sample::Valid(*feet),
            SampleLengths::PerSample(lengths) => lengths.get(index),
        }
    }
}

/// Speed for one bucket; `sample_length` only matters in the uncongested regime.
fn regime_speed(
    occupancy: f64,
    sample_length: Sample,
    average_length: f64,
    free_flow: f64,
    config: &TrafficConfig,
) -> Sample {
    let theta = config.theta;
    match Regime::classify(occupancy, config) {
        None => Sample::Invalid,
        Some(Regime::Uncongested) => {
            sample_length.map(|length| free_flow * (1.0 - (occupancy * average_length) / length))
        }
        Some(Regime::Transitional) => Sample::checked(free_flow * (1.0 - occupancy)),
        Some(Regime::Congested) => {
            let exponent = -(1.0 / theta) * ((100.0 * occupancy) / (100.0 - theta));
            Sample::checked(free_flow * (1.0 - theta) * exponent.exp())
        }
    }
}

/// Estimates per-bucket speeds for one detector-day.
///
/// Without a supplied `field_length` the day's own field-length estimate is
/// used. When that cannot be formed, the default field length and the speed
/// limit stand in; when only the free-flow speed is missing, the speed limit
/// replaces it.
pub fn estimate_speeds(
    record: &DetectorRecord,
    config: &TrafficConfig,
    field_length: Option<FieldLength>,
) -> TrafficResult<SpeedEstimate> {
    let logger = LogManager::new("speed");

    let derived = match field_length {
        Some(length) => Some((
            length,
            SampleLengths::Uniform(length.feet()),
            SpeedBasis::SuppliedFieldLength,
        )),
        None => {
            let estimate = field_lengths(record, config);
            estimate.average_length().map(|average| {
                (
                    average,
                    SampleLengths::PerSample(estimate.per_sample),
                    SpeedBasis::Derived,
                )
            })
        }
    };

    let (average, lengths, free_flow, basis) = match derived {
        Some((average, lengths, basis)) => match free_flow_speed(record, average, config).value() {
            Some(free_flow) => (average, lengths, free_flow, basis),
            None => {
                logger.warn(&format!(
                    "free-flow speed unavailable, using speed limit {}",
                    config.speed_limit
                ));
                (average, lengths, config.speed_limit, SpeedBasis::SpeedLimitFreeFlow)
            }
        },
        None => {
            let fallback = FieldLength::new(config.default_field_length)?;
            logger.warn(&format!(
                "field length unavailable, using default {} ft and speed limit {}",
                fallback.feet(),
                config.speed_limit
            ));
            (
                fallback,
                SampleLengths::Uniform(fallback.feet()),
                config.speed_limit,
                SpeedBasis::DefaultFieldLength,
            )
        }
    };

    let speeds: Vec<Sample> = record
        .occupancies()
        .iter()
        .enumerate()
        .map(|(index, occupancy)| match occupancy.value() {
            Some(occ) => regime_speed(occ, lengths.at(index), average.feet(), free_flow, config),
            None => Sample::Invalid,
        })
        .collect();
    let speeds = SampleSequence::new(record.interval_secs(), speeds);

    logger.record(&format!(
        "{} of {} speeds valid (free flow {:.2}, field length {:.2}, {:?})",
        speeds.valid_count(),
        speeds.len(),
        free_flow,
        average.feet(),
        basis
    ));

    Ok(SpeedEstimate {
        speeds,
        free_flow_speed: free_flow,
        average_field_length: average,
        basis,
    })
}

/// Per-bucket speeds only; see [`estimate_speeds`].
pub fn speeds(
    record: &DetectorRecord,
    config: &TrafficConfig,
    field_length: Option<FieldLength>,
) -> TrafficResult<SampleSequence> {
    estimate_speeds(record, config, field_length).map(|estimate| estimate.speeds)
}
