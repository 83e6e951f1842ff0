use serde::{Deserialize, Serialize};
use std::fmt;

/// The two per-detector record streams stored for each day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    /// One signed byte per record: vehicles counted in the window.
    Volume,
    /// Two signed big-endian bytes per record: occupied hundredths of a second.
    Occupancy,
}

impl StreamKind {
    /// File extension used for the stream inside a traffic archive.
    pub fn extension(self) -> &'static str {
        match self {
            StreamKind::Volume => "v30",
            StreamKind::Occupancy => "c30",
        }
    }

    pub fn record_width(self) -> usize {
        match self {
            StreamKind::Volume => 1,
            StreamKind::Occupancy => 2,
        }
    }

    pub fn expected_len(self, records: usize) -> usize {
        records * self.record_width()
    }

    /// Buffer of canonical length in which every record decodes as invalid.
    ///
    /// 0xFF is -1 in both encodings, which lies outside every valid range.
    pub fn invalid_buffer(self, records: usize) -> Vec<u8> {
        vec![0xFF; self.expected_len(records)]
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Volume => f.write_str("volume"),
            StreamKind::Occupancy => f.write_str("occupancy"),
        }
    }
}
