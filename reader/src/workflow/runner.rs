use crate::report::DetectorReport;
use crate::source::DetectorSource;
use crate::workflow::config::ReaderConfig;
use anyhow::{bail, Context};
use log::{info, warn};
use trafficcore::processing::{decode_occupancies, decode_volumes};
use trafficcore::record::{DetectorRecord, StreamKind};
use trafficcore::telemetry::MetricsRecorder;
use trafficcore::{DayPipeline, SampleSequence, TrafficConfig, TrafficError};

/// Detector left out of a batch, with the reason.
#[derive(Debug, Clone)]
pub struct SkippedDetector {
    pub detector_id: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub reports: Vec<DetectorReport>,
    pub skipped: Vec<SkippedDetector>,
}

pub struct Runner {
    config: ReaderConfig,
    metrics: MetricsRecorder,
}

impl Runner {
    pub fn new(config: ReaderConfig) -> anyhow::Result<Self> {
        config
            .traffic
            .validate()
            .context("validating traffic configuration")?;
        Ok(Self {
            config,
            metrics: MetricsRecorder::new(),
        })
    }

    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }

    /// Processes every detector in turn; failures skip the detector, never the batch.
    pub fn execute(&self, source: &dyn DetectorSource, detectors: &[String]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for detector_id in detectors {
            match self.process(source, detector_id) {
                Ok(report) => {
                    self.metrics.record_processed();
                    outcome.reports.push(report);
                }
                Err(err) => {
                    warn!("skipping detector {}: {:#}", detector_id, err);
                    self.metrics.record_skipped();
                    outcome.skipped.push(SkippedDetector {
                        detector_id: detector_id.clone(),
                        reason: format!("{:#}", err),
                    });
                }
            }
        }
        info!(
            "batch finished: {} processed, {} skipped",
            outcome.reports.len(),
            outcome.skipped.len()
        );
        outcome
    }

    pub fn process(
        &self,
        source: &dyn DetectorSource,
        detector_id: &str,
    ) -> anyhow::Result<DetectorReport> {
        let traffic = self.config.traffic_for(detector_id);
        let pipeline = DayPipeline::new(traffic.clone())
            .with_context(|| format!("configuring detector {}", detector_id))?;

        let volume_bytes = source.read_stream(detector_id, StreamKind::Volume)?;
        let occupancy_bytes = source.read_stream(detector_id, StreamKind::Occupancy)?;
        if volume_bytes.is_none() && occupancy_bytes.is_none() {
            bail!("no records found for detector {}", detector_id);
        }

        let mut substituted = Vec::new();
        let volumes = self.decode_stream(
            detector_id,
            StreamKind::Volume,
            volume_bytes,
            &traffic,
            &mut substituted,
        )?;
        let occupancies = self.decode_stream(
            detector_id,
            StreamKind::Occupancy,
            occupancy_bytes,
            &traffic,
            &mut substituted,
        )?;

        let record = DetectorRecord::new(volumes, occupancies)?;
        let day = pipeline
            .derive(detector_id, record)
            .with_context(|| format!("deriving series for detector {}", detector_id))?;
        Ok(DetectorReport::from_day(&day, self.config.resolution, substituted))
    }

    /// Decodes one stream, applying the all-invalid fallback when allowed.
    fn decode_stream(
        &self,
        detector_id: &str,
        kind: StreamKind,
        bytes: Option<Vec<u8>>,
        traffic: &TrafficConfig,
        substituted: &mut Vec<StreamKind>,
    ) -> anyhow::Result<SampleSequence> {
        let decode = |buffer: &[u8]| match kind {
            StreamKind::Volume => decode_volumes(buffer, traffic),
            StreamKind::Occupancy => decode_occupancies(buffer, traffic),
        };

        let reason = match bytes {
            Some(buffer) => match decode(&buffer) {
                Ok(sequence) => return Ok(sequence),
                Err(err @ TrafficError::MalformedRecord { .. }) => err.to_string(),
                Err(err) => return Err(err.into()),
            },
            None => format!("no {} stream", kind),
        };

        if !self.config.fallback_invalid {
            bail!("detector {}: {}", detector_id, reason);
        }
        warn!(
            "detector {}: {}, substituting an all-invalid {} stream",
            detector_id, reason, kind
        );
        self.metrics.record_substituted();
        substituted.push(kind);
        Ok(SampleSequence::invalid(
            traffic.raw_interval_secs(),
            traffic.records_per_day,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::directory::DirectorySource;
    use crate::source::synthetic::{write_synthetic_day, SyntheticProfile};
    use crate::workflow::config::OutputResolution;
    use std::fs;
    use tempfile::TempDir;
    use trafficcore::processing::SpeedBasis;

    fn source_with(detectors: &[&str]) -> (TempDir, DirectorySource) {
        let dir = TempDir::new().unwrap();
        for (seed, id) in detectors.iter().enumerate() {
            let profile = SyntheticProfile {
                seed: seed as u64,
                ..Default::default()
            };
            write_synthetic_day(dir.path(), id, &profile, &TrafficConfig::default()).unwrap();
        }
        let source = DirectorySource::open(dir.path()).unwrap();
        (dir, source)
    }

    #[test]
    fn runner_processes_every_listed_detector() {
        let (_dir, source) = source_with(&["10", "11"]);
        let runner = Runner::new(ReaderConfig::default()).unwrap();
        let detectors = source.list_detectors().unwrap();
        let outcome = runner.execute(&source, &detectors);
        assert_eq!(outcome.reports.len(), 2);
        assert!(outcome.skipped.is_empty());
        assert_eq!(outcome.reports[0].speeds.len(), 1440);
        assert_eq!(runner.metrics().snapshot().processed, 2);
    }

    #[test]
    fn unknown_detector_is_skipped_not_fatal() {
        let (_dir, source) = source_with(&["10"]);
        let runner = Runner::new(ReaderConfig::default()).unwrap();
        let outcome = runner.execute(&source, &["99".to_string(), "10".to_string()]);
        assert_eq!(outcome.reports.len(), 1);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].detector_id, "99");
        assert_eq!(runner.metrics().snapshot().skipped, 1);
    }

    #[test]
    fn missing_occupancy_stream_is_substituted() {
        let (dir, source) = source_with(&["10"]);
        fs::remove_file(dir.path().join("10.c30")).unwrap();
        let runner = Runner::new(ReaderConfig::default()).unwrap();
        let report = runner.process(&source, "10").unwrap();
        assert_eq!(report.substituted, vec![StreamKind::Occupancy]);
        assert_eq!(report.speed.valid, 0);
        assert_eq!(report.basis, SpeedBasis::DefaultFieldLength);
        assert_eq!(runner.metrics().snapshot().substituted_streams, 1);
    }

    #[test]
    fn malformed_stream_without_fallback_skips_detector() {
        let (dir, source) = source_with(&["10"]);
        fs::write(dir.path().join("10.v30"), [0u8; 12]).unwrap();
        let config = ReaderConfig {
            fallback_invalid: false,
            ..Default::default()
        };
        let runner = Runner::new(config).unwrap();
        let outcome = runner.execute(&source, &["10".to_string()]);
        assert!(outcome.reports.is_empty());
        assert!(outcome.skipped[0].reason.contains("malformed volume stream"));
    }

    #[test]
    fn per_detector_speed_limit_and_resolution_apply() {
        let (_dir, source) = source_with(&["10"]);
        let mut config = ReaderConfig::default();
        config.speed_limits.insert("10".into(), 30.0);
        config.resolution = OutputResolution::FiveMinute;
        let runner = Runner::new(config).unwrap();
        let report = runner.process(&source, "10").unwrap();
        assert_eq!(report.interval_secs, 300);
        assert_eq!(report.speeds.len(), 288);

        let baseline = Runner::new(ReaderConfig::default())
            .unwrap()
            .process(&source, "10")
            .unwrap();
        assert!(report.average_field_length < baseline.average_field_length);
    }

    #[test]
    fn invalid_traffic_config_is_rejected() {
        let mut config = ReaderConfig::default();
        config.traffic.speed_limit = 0.0;
        assert!(Runner::new(config).is_err());
    }
}
