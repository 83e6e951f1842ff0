pub mod detector;
pub mod stream;

pub use detector::{DetectorRecord, RawDetectorDay};
pub use stream::StreamKind;
