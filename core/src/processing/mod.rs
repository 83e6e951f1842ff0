pub mod aggregate;
pub mod decoder;
pub mod field_length;
pub mod free_flow;
pub mod speed;

pub use aggregate::{aggregate_mean_by, aggregate_pairs, aggregate_pairs_by, aggregate_speeds};
pub use decoder::{decode_occupancies, decode_volumes, encode_occupancies, encode_volumes};
pub use field_length::{field_lengths, FieldLengthEstimate};
pub use free_flow::free_flow_speed;
pub use speed::{estimate_speeds, speeds, Regime, SpeedBasis, SpeedEstimate};
