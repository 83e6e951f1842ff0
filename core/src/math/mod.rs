pub mod stats;

pub use stats::{SequenceSummary, StatsHelper};
