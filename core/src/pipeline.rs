use crate::prelude::{SampleSequence, TrafficConfig, TrafficResult};
use crate::processing::aggregate::{
    aggregate_pairs, aggregate_pairs_by, aggregate_speeds, FIVE_MINUTE_FACTOR,
};
use crate::processing::decoder::{decode_occupancies, decode_volumes};
use crate::processing::speed::{estimate_speeds, SpeedEstimate};
use crate::record::{DetectorRecord, RawDetectorDay};
use crate::telemetry::log::LogManager;

/// Every derived series for one detector-day.
#[derive(Debug, Clone)]
pub struct DetectorDay {
    pub detector_id: String,
    /// Decoded 30-second records.
    pub raw: DetectorRecord,
    pub minute: DetectorRecord,
    pub five_minute: DetectorRecord,
    /// One-minute speeds and the parameters behind them.
    pub speed: SpeedEstimate,
    pub five_minute_speeds: SampleSequence,
}

/// Chains decoding, aggregation and speed estimation for single detector-days.
#[derive(Debug, Clone)]
pub struct DayPipeline {
    config: TrafficConfig,
}

impl DayPipeline {
    pub fn new(config: TrafficConfig) -> TrafficResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Decodes both streams; a stream of the wrong length is an error.
    pub fn decode(&self, raw: &RawDetectorDay) -> TrafficResult<DetectorRecord> {
        let volumes = decode_volumes(&raw.volume_bytes, &self.config)?;
        let occupancies = decode_occupancies(&raw.occupancy_bytes, &self.config)?;
        DetectorRecord::new(volumes, occupancies)
    }

    pub fn run(&self, raw: &RawDetectorDay) -> TrafficResult<DetectorDay> {
        let record = self.decode(raw)?;
        self.derive(&raw.detector_id, record)
    }

    /// Derives every coarser series from already decoded 30-second records.
    pub fn derive(&self, detector_id: &str, raw: DetectorRecord) -> TrafficResult<DetectorDay> {
        let logger = LogManager::new("pipeline");

        let minute = aggregate_pairs(&raw)?;
        let five_minute = aggregate_pairs_by(&minute, FIVE_MINUTE_FACTOR)?;
        let speed = estimate_speeds(&minute, &self.config, None)?;
        let five_minute_speeds = aggregate_speeds(&speed.speeds)?;

        logger.record(&format!(
            "detector {}: {} raw, {} minute, {} five-minute buckets",
            detector_id,
            raw.len(),
            minute.len(),
            five_minute.len()
        ));

        Ok(DetectorDay {
            detector_id: detector_id.to_string(),
            raw,
            minute,
            five_minute,
            speed,
            five_minute_speeds,
        })
    }
}
