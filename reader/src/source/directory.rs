use super::DetectorSource;
use anyhow::{bail, Context};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use trafficcore::record::StreamKind;

/// Unpacked traffic archive: one `<id>.v30` and one `<id>.c30` file per detector.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn open<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            bail!("traffic source {} is not a directory", root.display());
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn stream_path(&self, detector_id: &str, kind: StreamKind) -> PathBuf {
        self.root
            .join(format!("{}.{}", detector_id, kind.extension()))
    }
}

impl DetectorSource for DirectorySource {
    fn list_detectors(&self) -> anyhow::Result<Vec<String>> {
        let entries = fs::read_dir(&self.root)
            .with_context(|| format!("listing traffic source {}", self.root.display()))?;

        let mut detectors = Vec::new();
        for entry in entries {
            let path = entry
                .with_context(|| format!("reading entry in {}", self.root.display()))?
                .path();
            let is_volume = path
                .extension()
                .is_some_and(|ext| ext == StreamKind::Volume.extension());
            if !is_volume {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                detectors.push(stem.to_string());
            }
        }
        detectors.sort();
        Ok(detectors)
    }

    fn read_stream(&self, detector_id: &str, kind: StreamKind) -> anyhow::Result<Option<Vec<u8>>> {
        let path = self.stream_path(detector_id, kind);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => {
                Err(err).with_context(|| format!("reading {} stream {}", kind, path.display()))
            }
        }
    }
}
