use crate::record::StreamKind;
use serde::{Deserialize, Serialize};

/// Seconds in one calendar day; sequence intervals are derived from it.
pub const SECONDS_PER_DAY: u32 = 86_400;

/// One scalar measurement, or the marker that no usable value exists.
///
/// Serialized as a nullable number so reports stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum Sample {
    Valid(f64),
    Invalid,
}

impl Sample {
    /// Wraps a computed value, refusing NaN and infinities.
    pub fn checked(value: f64) -> Self {
        if value.is_finite() {
            Sample::Valid(value)
        } else {
            Sample::Invalid
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Sample::Valid(value) => Some(value),
            Sample::Invalid => None,
        }
    }

    pub fn is_valid(self) -> bool {
        matches!(self, Sample::Valid(_))
    }

    pub fn map<F: FnOnce(f64) -> f64>(self, f: F) -> Self {
        match self {
            Sample::Valid(value) => Sample::checked(f(value)),
            Sample::Invalid => Sample::Invalid,
        }
    }
}

impl From<Option<f64>> for Sample {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Sample::Invalid, Sample::checked)
    }
}

impl From<Sample> for Option<f64> {
    fn from(sample: Sample) -> Self {
        sample.value()
    }
}

/// Fixed-length run of samples covering one detector-day at one resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSequence {
    interval_secs: u32,
    samples: Vec<Sample>,
}

impl SampleSequence {
    pub fn new(interval_secs: u32, samples: Vec<Sample>) -> Self {
        Self {
            interval_secs,
            samples,
        }
    }

    /// Sequence of `len` samples that are all invalid.
    pub fn invalid(interval_secs: u32, len: usize) -> Self {
        Self::new(interval_secs, vec![Sample::Invalid; len])
    }

    pub fn interval_secs(&self) -> u32 {
        self.interval_secs
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn get(&self, index: usize) -> Sample {
        self.samples.get(index).copied().unwrap_or(Sample::Invalid)
    }

    pub fn iter(&self) -> impl Iterator<Item = Sample> + '_ {
        self.samples.iter().copied()
    }

    pub fn valid_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().filter_map(|sample| sample.value())
    }

    pub fn valid_count(&self) -> usize {
        self.samples.iter().filter(|sample| sample.is_valid()).count()
    }
}

/// Effective detector field length in feet; always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct FieldLength(f64);

impl FieldLength {
    pub fn new(feet: f64) -> TrafficResult<Self> {
        if feet.is_finite() && feet > 0.0 {
            Ok(Self(feet))
        } else {
            Err(TrafficError::NonPositiveFieldLength(feet))
        }
    }

    pub fn feet(self) -> f64 {
        self.0
    }
}

/// Tunables shared by the decoder and every estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficConfig {
    /// Posted speed limit in miles per hour.
    pub speed_limit: f64,
    /// Occupancy where the congested regime begins (published value 0.15).
    pub theta: f64,
    /// Occupancy assumed at jam density.
    pub max_occupancy: f64,
    /// Upper occupancy bound of the uncongested regime.
    pub low_occupancy_ceiling: f64,
    /// Field length in feet used when none can be estimated.
    pub default_field_length: f64,
    /// Raw records per stream per day.
    pub records_per_day: usize,
    /// Largest plausible vehicle count in one raw record.
    pub max_volume: i32,
    /// Occupied hundredths of a second in a fully occupied raw record.
    pub max_occupancy_counts: i32,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            speed_limit: 70.0,
            theta: 0.15,
            max_occupancy: 0.98,
            low_occupancy_ceiling: 0.1,
            default_field_length: 25.0,
            records_per_day: 2880,
            max_volume: 40,
            max_occupancy_counts: 1800,
        }
    }
}

impl TrafficConfig {
    pub fn with_speed_limit(&self, speed_limit: f64) -> Self {
        Self {
            speed_limit,
            ..self.clone()
        }
    }

    /// Seconds covered by one raw record.
    pub fn raw_interval_secs(&self) -> u32 {
        SECONDS_PER_DAY / self.records_per_day.max(1) as u32
    }

    pub fn validate(&self) -> TrafficResult<()> {
        if !(self.speed_limit.is_finite() && self.speed_limit > 0.0) {
            return Err(TrafficError::InvalidConfig(format!(
                "speed limit must be positive, got {}",
                self.speed_limit
            )));
        }
        if !(self.theta > 0.0 && self.theta < 1.0) {
            return Err(TrafficError::InvalidConfig(format!(
                "theta must lie in (0, 1), got {}",
                self.theta
            )));
        }
        if !(self.max_occupancy > 0.0 && self.max_occupancy <= 1.0) {
            return Err(TrafficError::InvalidConfig(format!(
                "max occupancy must lie in (0, 1], got {}",
                self.max_occupancy
            )));
        }
        if !(self.low_occupancy_ceiling > 0.0 && self.low_occupancy_ceiling <= self.theta) {
            return Err(TrafficError::InvalidConfig(format!(
                "low occupancy ceiling must lie in (0, theta], got {}",
                self.low_occupancy_ceiling
            )));
        }
        if self.records_per_day == 0 || SECONDS_PER_DAY as usize % self.records_per_day != 0 {
            return Err(TrafficError::InvalidConfig(format!(
                "records per day must divide a day evenly, got {}",
                self.records_per_day
            )));
        }
        if self.max_volume <= 0 || self.max_occupancy_counts <= 0 {
            return Err(TrafficError::InvalidConfig(
                "raw value ranges must be positive".into(),
            ));
        }
        FieldLength::new(self.default_field_length)?;
        Ok(())
    }
}

/// Common error type for decoding and derivation.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TrafficError {
    #[error("malformed {stream} stream: expected {expected} bytes, got {actual}")]
    MalformedRecord {
        stream: StreamKind,
        expected: usize,
        actual: usize,
    },
    #[error("sequence length mismatch: {volumes} volumes vs {occupancies} occupancies")]
    LengthMismatch { volumes: usize, occupancies: usize },
    #[error("resolution mismatch: {volumes}s volumes vs {occupancies}s occupancies")]
    ResolutionMismatch { volumes: u32, occupancies: u32 },
    #[error("cannot group {len} samples into buckets of {factor}")]
    MisalignedSequence { len: usize, factor: usize },
    #[error("field length must be strictly positive, got {0}")]
    NonPositiveFieldLength(f64),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type TrafficResult<T> = Result<T, TrafficError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_rejects_non_finite_values() {
        assert_eq!(Sample::checked(f64::NAN), Sample::Invalid);
        assert_eq!(Sample::checked(f64::INFINITY), Sample::Invalid);
        assert_eq!(Sample::checked(1.5), Sample::Valid(1.5));
        assert_eq!(Sample::Valid(2.0).map(|v| v / 0.0), Sample::Invalid);
    }

    #[test]
    fn sample_serializes_as_nullable_number() {
        let seq = vec![Sample::Valid(0.5), Sample::Invalid];
        let json = serde_json::to_string(&seq).unwrap();
        assert_eq!(json, "[0.5,null]");
        let back: Vec<Sample> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, seq);
    }

    #[test]
    fn field_length_must_be_positive() {
        assert!(FieldLength::new(0.0).is_err());
        assert!(FieldLength::new(-3.0).is_err());
        assert!(FieldLength::new(f64::NAN).is_err());
        assert_eq!(FieldLength::new(26.4).unwrap().feet(), 26.4);
    }

    #[test]
    fn default_config_is_valid_and_uses_thirty_second_records() {
        let config = TrafficConfig::default();
        config.validate().unwrap();
        assert_eq!(config.raw_interval_secs(), 30);
    }

    #[test]
    fn config_rejects_bad_values() {
        let base = TrafficConfig::default();
        assert!(base.with_speed_limit(0.0).validate().is_err());
        let bad_theta = TrafficConfig {
            theta: 1.5,
            ..base.clone()
        };
        assert!(bad_theta.validate().is_err());
        let bad_records = TrafficConfig {
            records_per_day: 7,
            ..base.clone()
        };
        assert!(bad_records.validate().is_err());
        let bad_default = TrafficConfig {
            default_field_length: 0.0,
            ..base
        };
        assert!(matches!(
            bad_default.validate(),
            Err(TrafficError::NonPositiveFieldLength(_))
        ));
    }
}
