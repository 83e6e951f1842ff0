use crate::workflow::config::OutputResolution;
use serde::Serialize;
use trafficcore::math::{SequenceSummary, StatsHelper};
use trafficcore::processing::SpeedBasis;
use trafficcore::record::{DetectorRecord, StreamKind};
use trafficcore::{DetectorDay, SampleSequence};

/// Per-detector summary printed by the batch driver.
#[derive(Debug, Clone, Serialize)]
pub struct DetectorReport {
    pub detector_id: String,
    pub interval_secs: u32,
    pub volume: SequenceSummary,
    pub occupancy: SequenceSummary,
    pub speed: SequenceSummary,
    pub free_flow_speed: f64,
    pub average_field_length: f64,
    pub basis: SpeedBasis,
    /// Streams replaced by all-invalid data.
    pub substituted: Vec<StreamKind>,
    pub speeds: SampleSequence,
}

impl DetectorReport {
    pub fn from_day(
        day: &DetectorDay,
        resolution: OutputResolution,
        substituted: Vec<StreamKind>,
    ) -> Self {
        let (record, speeds): (&DetectorRecord, &SampleSequence) = match resolution {
            OutputResolution::OneMinute => (&day.minute, &day.speed.speeds),
            OutputResolution::FiveMinute => (&day.five_minute, &day.five_minute_speeds),
        };

        Self {
            detector_id: day.detector_id.clone(),
            interval_secs: speeds.interval_secs(),
            volume: StatsHelper::summarize(record.volumes()),
            occupancy: StatsHelper::summarize(record.occupancies()),
            speed: StatsHelper::summarize(speeds),
            free_flow_speed: day.speed.free_flow_speed,
            average_field_length: day.speed.average_field_length.feet(),
            basis: day.speed.basis,
            substituted,
            speeds: speeds.clone(),
        }
    }

    pub fn summary_line(&self) -> String {
        let fmt = |value: Option<f64>| {
            value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
        };
        let mut line = format!(
            "detector {} [{}s] valid {}/{} vol {} occ {} speed mean {} min {} max {} | free flow {:.2} mph, field length {:.2} ft ({:?})",
            self.detector_id,
            self.interval_secs,
            self.speed.valid,
            self.speed.valid + self.speed.invalid,
            fmt(self.volume.mean),
            fmt(self.occupancy.mean),
            fmt(self.speed.mean),
            fmt(self.speed.min),
            fmt(self.speed.max),
            self.free_flow_speed,
            self.average_field_length,
            self.basis
        );
        if !self.substituted.is_empty() {
            let streams: Vec<String> = self.substituted.iter().map(ToString::to_string).collect();
            line.push_str(&format!(" substituted: {}", streams.join(", ")));
        }
        line
    }
}
