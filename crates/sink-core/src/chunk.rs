//! Chunk planning: how many frames a payload needs and which bytes each covers.
//!
//! A `max_frame_size` of 0 means unbounded: the payload always travels as a
//! single frame, even when it is empty. With a bounded size an empty payload
//! plans zero frames, so nothing is sent for it at all.

use std::ops::Range;

/// Number of frames needed for a payload of `len` bytes.
///
///   max_frame_size == 0  →  1
///   max_frame_size  > 0  →  ceil(len / max_frame_size)   (0 when len == 0)
pub fn plan_count(len: usize, max_frame_size: usize) -> usize {
    if max_frame_size == 0 {
        return 1;
    }
    len.div_ceil(max_frame_size)
}

/// Half-open byte range covered by frame `index`.
///
/// Only meaningful for `index < plan_count(len, max_frame_size)`.
pub fn bounds(len: usize, max_frame_size: usize, index: usize) -> Range<usize> {
    debug_assert!(
        index < plan_count(len, max_frame_size),
        "frame index {index} outside plan for {len} bytes at {max_frame_size}"
    );

    if max_frame_size == 0 {
        return 0..len;
    }
    let start = index * max_frame_size;
    let end = start.saturating_add(max_frame_size).min(len);
    start..end
}

/// Every frame range of a payload, in index order.
pub fn frame_ranges(len: usize, max_frame_size: usize) -> impl Iterator<Item = Range<usize>> {
    (0..plan_count(len, max_frame_size)).map(move |index| bounds(len, max_frame_size, index))
}
