pub mod archive;
pub mod directory;
pub mod synthetic;

use trafficcore::record::StreamKind;

/// Supplies raw stream buffers keyed by detector ID.
pub trait DetectorSource {
    /// IDs of every detector that has a volume stream, sorted.
    fn list_detectors(&self) -> anyhow::Result<Vec<String>>;

    /// Bytes of one stream, or `None` when the detector has no such stream.
    fn read_stream(&self, detector_id: &str, kind: StreamKind) -> anyhow::Result<Option<Vec<u8>>>;
}
