//! Raw stream decoding with per-record range checks.

use crate::prelude::{Sample, SampleSequence, TrafficConfig, TrafficError, TrafficResult};
use crate::record::StreamKind;

fn check_length(buffer: &[u8], stream: StreamKind, config: &TrafficConfig) -> TrafficResult<()> {
    let expected = stream.expected_len(config.records_per_day);
    if buffer.len() != expected {
        return Err(TrafficError::MalformedRecord {
            stream,
            expected,
            actual: buffer.len(),
        });
    }
    Ok(())
}

/// Decodes a volume stream of one signed byte per record.
///
/// Counts outside `[0, max_volume]` become invalid samples.
pub fn decode_volumes(buffer: &[u8], config: &TrafficConfig) -> TrafficResult<SampleSequence> {
    check_length(buffer, StreamKind::Volume, config)?;
    let samples: Vec<Sample> = buffer
        .iter()
        .map(|&byte| {
            let count = i32::from(byte as i8);
            if (0..=config.max_volume).contains(&count) {
                Sample::Valid(f64::from(count))
            } else {
                Sample::Invalid
            }
        })
        .collect();
    Ok(SampleSequence::new(config.raw_interval_secs(), samples))
}

/// Decodes an occupancy stream of signed big-endian 16-bit records into ratios.
///
/// Counts outside `[0, max_occupancy_counts]` become invalid samples.
pub fn decode_occupancies(buffer: &[u8], config: &TrafficConfig) -> TrafficResult<SampleSequence> {
    check_length(buffer, StreamKind::Occupancy, config)?;
    let full_scale = f64::from(config.max_occupancy_counts);
    let samples: Vec<Sample> = buffer
        .chunks_exact(StreamKind::Occupancy.record_width())
        .map(|pair| {
            let counts = i32::from(i16::from_be_bytes([pair[0], pair[1]]));
            if (0..=config.max_occupancy_counts).contains(&counts) {
                Sample::Valid(f64::from(counts) / full_scale)
            } else {
                Sample::Invalid
            }
        })
        .collect();
    Ok(SampleSequence::new(config.raw_interval_secs(), samples))
}

/// Inverse of [`decode_volumes`] for writing raw streams.
pub fn encode_volumes(counts: &[i8]) -> Vec<u8> {
    counts.iter().flat_map(|count| count.to_be_bytes()).collect()
}

/// Inverse of [`decode_occupancies`] for writing raw streams.
pub fn encode_occupancies(counts: &[i16]) -> Vec<u8> {
    counts.iter().flat_map(|count| count.to_be_bytes()).collect()
}
