use super::DetectorSource;
use anyhow::Context;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use trafficcore::record::StreamKind;
use zip::result::ZipError;
use zip::ZipArchive;

/// A `.traffic` file: a zip archive holding `<id>.v30` and `<id>.c30` entries.
///
/// The archive is reopened for every call and closed before it returns.
#[derive(Debug, Clone)]
pub struct ArchiveSource {
    path: PathBuf,
}

impl ArchiveSource {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let source = Self {
            path: path.as_ref().to_path_buf(),
        };
        source.archive()?;
        Ok(source)
    }

    fn archive(&self) -> anyhow::Result<ZipArchive<File>> {
        let file = File::open(&self.path)
            .with_context(|| format!("opening traffic archive {}", self.path.display()))?;
        ZipArchive::new(file)
            .with_context(|| format!("reading traffic archive {}", self.path.display()))
    }
}

impl DetectorSource for ArchiveSource {
    fn list_detectors(&self) -> anyhow::Result<Vec<String>> {
        let archive = self.archive()?;
        let suffix = format!(".{}", StreamKind::Volume.extension());
        let mut detectors: Vec<String> = archive
            .file_names()
            .filter_map(|name| name.strip_suffix(suffix.as_str()))
            .map(str::to_string)
            .collect();
        detectors.sort();
        detectors.dedup();
        Ok(detectors)
    }

    fn read_stream(&self, detector_id: &str, kind: StreamKind) -> anyhow::Result<Option<Vec<u8>>> {
        let mut archive = self.archive()?;
        let name = format!("{}.{}", detector_id, kind.extension());
        let mut entry = match archive.by_name(&name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("locating {} in {}", name, self.path.display())
                })
            }
        };

        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut bytes)
            .with_context(|| format!("reading {} from {}", name, self.path.display()))?;
        Ok(Some(bytes))
    }
}
