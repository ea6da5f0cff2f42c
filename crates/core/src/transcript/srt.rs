use std::sync::LazyLock;

use regex::Regex;

use crate::types::Segment;

static TIME_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]{2}:[0-9]{2}:[0-9]{2},[0-9]{3}) --> ([0-9]{2}:[0-9]{2}:[0-9]{2},[0-9]{3})")
        .expect("time line regex is valid")
});

// One or more blank (possibly whitespace-only) lines.
static BLOCK_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[ \t]*\n)+").expect("block separator regex is valid"));

static MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("markup regex is valid"));

/// Convert "HH:MM:SS,mmm" into seconds since start.
pub fn timestamp_to_seconds(timestamp: &str) -> Option<f64> {
    let (clock, millis) = timestamp.split_once(',')?;
    let mut parts = clock.split(':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds: u64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let millis: u64 = millis.parse().ok()?;

    Some((hours * 3600 + minutes * 60 + seconds) as f64 + millis as f64 / 1000.0)
}

/// Format whole seconds as "HH:MM:SS,000".
pub fn format_srt_time(total_seconds: u64) -> String {
    let h = total_seconds / 3600;
    let m = (total_seconds % 3600) / 60;
    let s = total_seconds % 60;
    format!("{h:02}:{m:02}:{s:02},000")
}

/// Parse indexed subtitle text into ordered segments.
///
/// Blocks without an integer index, without a `HH:MM:SS,mmm --> HH:MM:SS,mmm`
/// line, or without at least one text line are dropped.
pub fn parse_transcript(data: &str) -> Vec<Segment> {
    let normalized = data
        .trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n");

    let segments: Vec<Segment> = BLOCK_SEPARATOR
        .split(normalized.trim())
        .filter_map(parse_block)
        .collect();

    tracing::debug!(segments = segments.len(), "parsed indexed transcript");
    segments
}

fn parse_block(block: &str) -> Option<Segment> {
    let lines: Vec<&str> = block.split('\n').collect();
    if lines.len() < 3 {
        tracing::debug!(block, "dropping block with fewer than 3 lines");
        return None;
    }

    let Some(index) = lines[0].trim().parse::<u32>().ok().filter(|i| *i > 0) else {
        tracing::debug!(line = lines[0], "dropping block without a positive integer index");
        return None;
    };

    let Some(caps) = TIME_LINE.captures(lines[1]) else {
        tracing::debug!(index, line = lines[1], "dropping block without time line");
        return None;
    };
    let start_time = caps[1].to_string();
    let end_time = caps[2].to_string();
    let start_seconds = timestamp_to_seconds(&start_time)?;
    let end_seconds = timestamp_to_seconds(&end_time)?;

    if end_seconds < start_seconds {
        tracing::debug!(index, start_seconds, end_seconds, "dropping block that ends before it starts");
        return None;
    }

    let joined = lines[2..].join(" ");
    let text = MARKUP.replace_all(&joined, "").trim().to_string();

    Some(Segment {
        index,
        start_time,
        end_time,
        text,
        start_seconds,
        end_seconds,
    })
}
