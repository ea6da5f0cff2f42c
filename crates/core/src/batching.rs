use crate::{
    error::{AlchemyError, Result},
    types::Segment,
};

/// Segments per labeling request.
pub const BATCH_SIZE: usize = 40;

/// Keep only segments that start before `limit_minutes`; 0 keeps everything.
pub fn apply_duration_limit(segments: &[Segment], limit_minutes: u32) -> Result<Vec<Segment>> {
    if limit_minutes == 0 {
        return Ok(segments.to_vec());
    }

    let limit_seconds = f64::from(limit_minutes) * 60.0;
    let kept: Vec<Segment> = segments
        .iter()
        .filter(|s| s.start_seconds < limit_seconds)
        .cloned()
        .collect();

    if kept.is_empty() {
        return Err(AlchemyError::NoSegmentsInRange { limit_minutes });
    }

    tracing::debug!(
        total = segments.len(),
        kept = kept.len(),
        limit_minutes,
        "applied duration limit"
    );
    Ok(kept)
}

/// Split into contiguous batches of at most `size` segments, preserving order.
pub fn chunk_segments(segments: &[Segment], size: usize) -> Vec<&[Segment]> {
    segments.chunks(size.max(1)).collect()
}
