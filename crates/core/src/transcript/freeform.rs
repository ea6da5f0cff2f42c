use std::{fmt::Write, sync::LazyLock};

use regex::Regex;

use crate::transcript::srt::format_srt_time;

/// Minimum duration given to the final segment.
pub const MIN_TAIL_SECONDS: u64 = 3;
/// Speaking-rate estimate used to size the final segment.
pub const WORDS_PER_SECOND: u64 = 3;

// [m:ss], [mm:ss] or [h:mm:ss]
static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([0-9]{1,2}:[0-9]{2}|[0-9]:[0-9]{2}:[0-9]{2})\]").expect("marker regex is valid")
});

struct Marker<'a> {
    seconds: u64,
    /// Byte range of the whole `[..]` marker.
    start: usize,
    end: usize,
    raw: &'a str,
}

fn marker_seconds(time: &str) -> u64 {
    let parts: Vec<u64> = time.split(':').filter_map(|p| p.parse().ok()).collect();
    match parts.as_slice() {
        [m, s] => m * 60 + s,
        [h, m, s] => h * 3600 + m * 60 + s,
        _ => 0,
    }
}

/// Estimated duration of a trailing segment with no following marker.
pub fn tail_duration(content: &str) -> u64 {
    let words = content.split_whitespace().count() as u64;
    MIN_TAIL_SECONDS.max(words.div_ceil(WORDS_PER_SECOND))
}

/// Convert a transcript with inline `[m:ss]` markers into indexed subtitle text.
///
/// Each marker opens a segment that runs until the next marker; empty
/// segments are skipped and indices are assigned sequentially to the
/// segments that remain. Returns `None` when the text has no markers at all.
pub fn convert_freeform(raw: &str) -> Option<String> {
    let markers: Vec<Marker<'_>> = MARKER
        .captures_iter(raw)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let time = caps.get(1)?;
            Some(Marker {
                seconds: marker_seconds(time.as_str()),
                start: whole.start(),
                end: whole.end(),
                raw: time.as_str(),
            })
        })
        .collect();

    if markers.is_empty() {
        return None;
    }

    let mut output = String::new();
    let mut next_index = 1u32;

    for (i, current) in markers.iter().enumerate() {
        let next = markers.get(i + 1);
        let content_end = next.map_or(raw.len(), |n| n.start);
        let content = raw[current.end..content_end].trim();

        if content.is_empty() {
            tracing::debug!(marker = current.raw, "skipping empty freeform segment");
            continue;
        }

        let start_seconds = current.seconds;
        let end_seconds = match next {
            Some(n) => n.seconds,
            None => start_seconds + tail_duration(content),
        };

        // Blank lines inside the text would split the indexed block.
        let text = content.split_whitespace().collect::<Vec<_>>().join(" ");
        let _ = write!(
            output,
            "{}\n{} --> {}\n{}\n\n",
            next_index,
            format_srt_time(start_seconds),
            format_srt_time(end_seconds),
            text
        );
        next_index += 1;
    }

    tracing::debug!(
        markers = markers.len(),
        segments = next_index - 1,
        "converted freeform transcript"
    );
    Some(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::parse_transcript;

    #[test]
    fn round_trips_through_indexed_parser() {
        let srt = convert_freeform("[0:00] A first thought. [0:10] B second").unwrap();
        let segments = parse_transcript(&srt);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].start_seconds, 0.0);
        assert_eq!(segments[0].end_seconds, 10.0);
        assert_eq!(segments[1].start_seconds, 10.0);
        assert_eq!(segments[0].text, "A first thought.");
    }

    #[test]
    fn no_markers_is_a_sentinel_not_a_panic() {
        assert_eq!(convert_freeform("no timing here"), None);
        assert_eq!(convert_freeform(""), None);
    }

    #[test]
    fn supports_hour_markers() {
        let srt = convert_freeform("[1:02:03] late line [1:02:09] later").unwrap();
        let segments = parse_transcript(&srt);
        assert_eq!(segments[0].start_time, "01:02:03,000");
        assert_eq!(segments[0].end_time, "01:02:09,000");
    }

    #[test]
    fn two_digit_minutes() {
        let srt = convert_freeform("[12:30] text").unwrap();
        assert!(srt.starts_with("1\n00:12:30,000 --> "));
    }

    #[test]
    fn final_segment_uses_word_count_heuristic() {
        // 10 words -> ceil(10 / 3) = 4 seconds
        let srt = convert_freeform("[0:20] one two three four five six seven eight nine ten").unwrap();
        assert!(srt.contains("00:00:20,000 --> 00:00:24,000"));

        // short tail gets the minimum
        let srt = convert_freeform("[0:20] hi").unwrap();
        assert!(srt.contains("00:00:20,000 --> 00:00:23,000"));
    }

    #[test]
    fn empty_segments_are_skipped_and_indices_stay_sequential() {
        let srt = convert_freeform("[0:00]   [0:05] kept [0:09]\n[0:12] also kept").unwrap();
        let segments = parse_transcript(&srt);

        let indices: Vec<u32> = segments.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![1, 2]);
        assert_eq!(segments[0].start_seconds, 5.0);
        assert_eq!(segments[0].end_seconds, 9.0);
        assert_eq!(segments[1].start_seconds, 12.0);
    }

    #[test]
    fn paragraph_breaks_stay_in_their_segment() {
        let srt = convert_freeform(
            "[0:00] First paragraph.\n\nSecond paragraph of the same segment. [0:10] Next one",
        )
        .unwrap();
        let segments = parse_transcript(&srt);

        assert_eq!(segments.len(), 2);
        assert_eq!(
            segments[0].text,
            "First paragraph. Second paragraph of the same segment."
        );
        assert_eq!(segments[1].text, "Next one");
        assert_eq!(segments[1].index, 2);
    }

    #[test]
    fn never_emits_milliseconds() {
        let srt = convert_freeform("[0:01] a [0:02] b").unwrap();
        assert_eq!(srt.matches(",000").count(), 4);
    }
}
