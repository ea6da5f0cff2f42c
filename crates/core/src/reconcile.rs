use serde_json::Value;

use crate::types::{AnalyzedSegment, Segment, SegmentLabel};

/// Rationale attached when no usable entry came back for a segment.
pub const ANALYSIS_MISSING: &str = "Analysis missing";
/// Rationale attached when the whole batch request failed.
pub const ANALYSIS_ERROR: &str = "Error in analysis";

fn entry_index(entry: &Value) -> Option<f64> {
    entry.get("index")?.as_f64()
}

fn entry_label(entry: &Value) -> Option<SegmentLabel> {
    entry.get("label")?.as_str()?.parse().ok()
}

fn entry_rationale(entry: &Value) -> Option<&str> {
    entry
        .get("analysis")?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Attach a label to a segment without consulting any model output.
pub fn fallback_segment(segment: &Segment, rationale: &str) -> AnalyzedSegment {
    AnalyzedSegment {
        segment: segment.clone(),
        label: SegmentLabel::MainContent,
        analysis: rationale.to_string(),
    }
}

/// Map model entries back onto the original batch by segment index.
///
/// Always returns exactly one [`AnalyzedSegment`] per input segment, in input
/// order. The first entry whose `index` matches is used; later duplicates and
/// entries for unknown indices are ignored. Entries with a missing or
/// unrecognized label fall back to `MAIN_CONTENT`.
pub fn reconcile_batch(batch: &[Segment], entries: &[Value]) -> Vec<AnalyzedSegment> {
    let mut missing = 0usize;

    let analyzed: Vec<AnalyzedSegment> = batch
        .iter()
        .map(|original| {
            let wanted = f64::from(original.index);
            let found = entries
                .iter()
                .find(|entry| entry_index(entry) == Some(wanted));

            match found.and_then(|entry| entry_label(entry).map(|label| (entry, label))) {
                Some((entry, label)) => AnalyzedSegment {
                    segment: original.clone(),
                    label,
                    analysis: entry_rationale(entry)
                        .unwrap_or(ANALYSIS_MISSING)
                        .to_string(),
                },
                None => {
                    missing += 1;
                    fallback_segment(original, ANALYSIS_MISSING)
                }
            }
        })
        .collect();

    if missing > 0 {
        tracing::warn!(
            missing,
            batch_len = batch.len(),
            "segments without a usable label, defaulted to MAIN_CONTENT"
        );
    }

    analyzed
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn seg(index: u32) -> Segment {
        Segment {
            index,
            start_time: "00:00:00,000".into(),
            end_time: "00:00:01,000".into(),
            text: format!("line {index}"),
            start_seconds: f64::from(index),
            end_seconds: f64::from(index) + 1.0,
        }
    }

    #[test]
    fn uncovered_segment_gets_placeholder() {
        let batch = vec![seg(1), seg(2), seg(3)];
        let entries = vec![
            json!({"index": 1, "label": "HOOK", "analysis": "grabs attention"}),
            json!({"index": 3, "label": "CTA", "analysis": "asks to subscribe"}),
        ];

        let out = reconcile_batch(&batch, &entries);

        assert_eq!(out.len(), 3);
        assert_eq!(out[0].label, SegmentLabel::Hook);
        assert_eq!(out[1].label, SegmentLabel::MainContent);
        assert_eq!(out[1].analysis, ANALYSIS_MISSING);
        assert_eq!(out[2].label, SegmentLabel::Cta);
        assert_eq!(out[2].segment.index, 3);
    }

    #[test]
    fn empty_entries_default_everything() {
        let batch = vec![seg(4), seg(5)];
        let out = reconcile_batch(&batch, &[]);
        assert!(out.iter().all(|a| a.label == SegmentLabel::MainContent));
        assert!(out.iter().all(|a| a.analysis == ANALYSIS_MISSING));
    }

    #[test]
    fn first_duplicate_wins() {
        let batch = vec![seg(1)];
        let entries = vec![
            json!({"index": 1, "label": "SETUP", "analysis": "first"}),
            json!({"index": 1, "label": "ENDING", "analysis": "second"}),
        ];
        let out = reconcile_batch(&batch, &entries);
        assert_eq!(out[0].label, SegmentLabel::Setup);
        assert_eq!(out[0].analysis, "first");
    }

    #[test]
    fn invalid_label_falls_back() {
        let batch = vec![seg(1), seg(2)];
        let entries = vec![
            json!({"index": 1, "label": "INTRO", "analysis": "made up label"}),
            json!({"index": 2, "analysis": "no label at all"}),
        ];
        let out = reconcile_batch(&batch, &entries);
        assert_eq!(out[0].label, SegmentLabel::MainContent);
        assert_eq!(out[0].analysis, ANALYSIS_MISSING);
        assert_eq!(out[1].label, SegmentLabel::MainContent);
    }

    #[test]
    fn ignores_unknown_indices_and_non_objects() {
        let batch = vec![seg(2)];
        let entries = vec![
            json!("noise"),
            json!({"index": 99, "label": "HOOK"}),
            json!({"index": 2.0, "label": "ENDING", "analysis": "wraps up"}),
        ];
        let out = reconcile_batch(&batch, &entries);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].label, SegmentLabel::Ending);
    }

    #[test]
    fn valid_label_without_rationale_keeps_label() {
        let out = reconcile_batch(&[seg(1)], &[json!({"index": 1, "label": "HOOK"})]);
        assert_eq!(out[0].label, SegmentLabel::Hook);
        assert_eq!(out[0].analysis, ANALYSIS_MISSING);
    }

    #[test]
    fn preserves_input_order_regardless_of_entry_order() {
        let batch = vec![seg(1), seg(2)];
        let entries = vec![
            json!({"index": 2, "label": "ENDING", "analysis": "b"}),
            json!({"index": 1, "label": "HOOK", "analysis": "a"}),
        ];
        let out = reconcile_batch(&batch, &entries);
        let indices: Vec<u32> = out.iter().map(|a| a.segment.index).collect();
        assert_eq!(indices, vec![1, 2]);
    }
}
