//! Decode-and-derive core for loop-detector traffic data.
//!
//! Raw 30-second volume and occupancy streams are decoded with per-sample
//! validity, rolled up to coarser buckets, and fed through the field-length,
//! free-flow and three-regime speed estimators. Every stage is a pure
//! transform over immutable sequences.

pub mod math;
pub mod pipeline;
pub mod prelude;
pub mod processing;
pub mod record;
pub mod telemetry;

pub use pipeline::{DayPipeline, DetectorDay};
pub use prelude::{FieldLength, Sample, SampleSequence, TrafficConfig, TrafficError, TrafficResult};
