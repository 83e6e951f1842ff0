use crate::prelude::{SampleSequence, TrafficError, TrafficResult};
use serde::{Deserialize, Serialize};

/// Undecoded stream buffers for one detector-day, as handed over by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDetectorDay {
    pub detector_id: String,
    pub volume_bytes: Vec<u8>,
    pub occupancy_bytes: Vec<u8>,
}

impl RawDetectorDay {
    pub fn new(
        detector_id: impl Into<String>,
        volume_bytes: Vec<u8>,
        occupancy_bytes: Vec<u8>,
    ) -> Self {
        Self {
            detector_id: detector_id.into(),
            volume_bytes,
            occupancy_bytes,
        }
    }
}

/// Volume and occupancy sequences of equal length and resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorRecord {
    volumes: SampleSequence,
    occupancies: SampleSequence,
}

impl DetectorRecord {
    pub fn new(volumes: SampleSequence, occupancies: SampleSequence) -> TrafficResult<Self> {
        if volumes.len() != occupancies.len() {
            return Err(TrafficError::LengthMismatch {
                volumes: volumes.len(),
                occupancies: occupancies.len(),
            });
        }
        if volumes.interval_secs() != occupancies.interval_secs() {
            return Err(TrafficError::ResolutionMismatch {
                volumes: volumes.interval_secs(),
                occupancies: occupancies.interval_secs(),
            });
        }
        Ok(Self {
            volumes,
            occupancies,
        })
    }

    pub fn volumes(&self) -> &SampleSequence {
        &self.volumes
    }

    pub fn occupancies(&self) -> &SampleSequence {
        &self.occupancies
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    pub fn interval_secs(&self) -> u32 {
        self.volumes.interval_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::Sample;

    #[test]
    fn record_requires_matching_lengths() {
        let volumes = SampleSequence::invalid(60, 3);
        let occupancies = SampleSequence::invalid(60, 4);
        assert_eq!(
            DetectorRecord::new(volumes, occupancies),
            Err(TrafficError::LengthMismatch {
                volumes: 3,
                occupancies: 4
            })
        );
    }

    #[test]
    fn record_requires_matching_resolution() {
        let volumes = SampleSequence::new(30, vec![Sample::Valid(1.0)]);
        let occupancies = SampleSequence::new(60, vec![Sample::Valid(0.1)]);
        assert!(matches!(
            DetectorRecord::new(volumes, occupancies),
            Err(TrafficError::ResolutionMismatch { .. })
        ));
    }
}
