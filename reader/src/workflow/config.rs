use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use trafficcore::TrafficConfig;

/// Bucket size of the series a report is built from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputResolution {
    #[default]
    OneMinute,
    FiveMinute,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub traffic: TrafficConfig,
    pub resolution: OutputResolution,
    /// Substitute an all-invalid stream for a missing or malformed one.
    pub fallback_invalid: bool,
    /// Per-detector speed limits in mph, overriding `traffic.speed_limit`.
    pub speed_limits: BTreeMap<String, f64>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            traffic: TrafficConfig::default(),
            resolution: OutputResolution::default(),
            fallback_invalid: true,
            speed_limits: BTreeMap::new(),
        }
    }
}

impl ReaderConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading reader config {}", path_ref.display()))?;
        let config: ReaderConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing reader config {}", path_ref.display()))?;
        Ok(config)
    }

    /// Command-line values win over the file.
    pub fn apply_overrides(
        &mut self,
        speed_limit: Option<f64>,
        resolution: Option<OutputResolution>,
    ) {
        if let Some(speed_limit) = speed_limit {
            self.traffic.speed_limit = speed_limit;
        }
        if let Some(resolution) = resolution {
            self.resolution = resolution;
        }
    }

    pub fn traffic_for(&self, detector_id: &str) -> TrafficConfig {
        match self.speed_limits.get(detector_id) {
            Some(&speed_limit) => self.traffic.with_speed_limit(speed_limit),
            None => self.traffic.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_follow_traffic_defaults() {
        let cfg = ReaderConfig::default();
        assert_eq!(cfg.traffic.speed_limit, 70.0);
        assert_eq!(cfg.resolution, OutputResolution::OneMinute);
        assert!(cfg.fallback_invalid);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"traffic:\n  speed_limit: 55\n  theta: 0.2\nresolution: five_minute\nfallback_invalid: false\nspeed_limits:\n  \"1042\": 45\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = ReaderConfig::load(&path).unwrap();
        assert_eq!(cfg.traffic.speed_limit, 55.0);
        assert_eq!(cfg.traffic.theta, 0.2);
        assert_eq!(cfg.traffic.records_per_day, 2880);
        assert_eq!(cfg.resolution, OutputResolution::FiveMinute);
        assert!(!cfg.fallback_invalid);
        assert_eq!(cfg.traffic_for("1042").speed_limit, 45.0);
        assert_eq!(cfg.traffic_for("7").speed_limit, 55.0);
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut cfg = ReaderConfig::default();
        cfg.apply_overrides(Some(60.0), Some(OutputResolution::FiveMinute));
        assert_eq!(cfg.traffic.speed_limit, 60.0);
        assert_eq!(cfg.resolution, OutputResolution::FiveMinute);
        cfg.apply_overrides(None, None);
        assert_eq!(cfg.traffic.speed_limit, 60.0);
    }
}
