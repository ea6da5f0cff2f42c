//! Transcript parsing.
//!
//! Two input shapes are understood: the indexed subtitle format
//! (`1\n00:00:01,000 --> 00:00:03,500\ntext`) and a freeform transcript with
//! inline `[m:ss]` markers, which is converted into the indexed format first.

pub mod freeform;
pub mod srt;

pub use freeform::convert_freeform;
pub use srt::{format_srt_time, parse_transcript, timestamp_to_seconds};

use crate::{
    error::{AlchemyError, Result},
    types::Segment,
};

/// Parse raw file text of either format.
///
/// Indexed text is tried first; text with no valid indexed blocks falls back
/// to freeform conversion. Fails when neither yields a segment.
pub fn parse_any(raw: &str) -> Result<Vec<Segment>> {
    let segments = parse_transcript(raw);
    if !segments.is_empty() {
        return Ok(segments);
    }

    let converted = convert_freeform(raw).ok_or(AlchemyError::NoTimestampMarkers)?;
    let segments = parse_transcript(&converted);
    if segments.is_empty() {
        return Err(AlchemyError::InvalidFormat {
            reason: "timestamp markers found but no text between them".to_string(),
        });
    }
    Ok(segments)
}
