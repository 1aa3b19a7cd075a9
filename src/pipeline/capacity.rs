use crate::header::HEADER_OVERHEAD_BYTES;

/// Maximum secret size (bytes) for a cover of `sample_count` frames per channel
///
/// `floor(sample_count * channel_count * lsb_depth / 8) - HEADER_OVERHEAD_BYTES`,
/// never negative. The overhead assumes the longest filename, so any secret
/// within this bound fits regardless of its name.
pub fn estimate_capacity(sample_count: usize, channel_count: usize, lsb_depth: u8) -> usize {
    let bits = (sample_count as u128) * (channel_count as u128) * u128::from(lsb_depth);
    let bytes = usize::try_from(bits / 8).unwrap_or(usize::MAX);
    bytes.saturating_sub(HEADER_OVERHEAD_BYTES)
}

/// Exact serialized frame size in bytes for a given filename and payload
pub fn frame_len(filename_len: usize, payload_len: usize) -> usize {
    let bits = crate::header::HEADER_FIXED_BITS + filename_len * 8 + payload_len * 8;
    (bits + 7) / 8
}

/// Number of samples needed to carry `frame_bytes` at `lsb_depth` bits each
pub fn samples_needed(frame_bytes: usize, lsb_depth: u8) -> usize {
    let depth = usize::from(lsb_depth.max(1));
    (frame_bytes * 8 + depth - 1) / depth
}
