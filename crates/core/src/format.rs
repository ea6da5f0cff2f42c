use crate::types::{AnalyzedSegment, MasterTemplate, ScriptAnalysis, SegmentLabel};

/// Format seconds as MM:SS timestamp
pub fn format_timestamp(seconds: f64) -> String {
    let mins = (seconds / 60.0) as u32;
    let secs = (seconds % 60.0) as u32;
    format!("{:02}:{:02}", mins, secs)
}

/// Number of segments per label, in closed-set order, skipping absent labels.
pub fn label_distribution(segments: &[AnalyzedSegment]) -> Vec<(SegmentLabel, usize)> {
    SegmentLabel::ALL
        .iter()
        .map(|label| {
            let count = segments.iter().filter(|s| s.label == *label).count();
            (*label, count)
        })
        .filter(|(_, count)| *count > 0)
        .collect()
}

/// Format a script analysis as human-readable markdown
pub fn format_analysis_readable(analysis: &ScriptAnalysis) -> String {
    let mut output = String::new();

    output.push_str("# Script Analysis\n\n");
    output.push_str(&format!(
        "**Pacing:** {}/100 | **Hook:** {}/100 | **Tone:** {}\n\n",
        analysis.pacing_score, analysis.hook_score, analysis.dominant_tone
    ));

    output.push_str("## Summary\n\n");
    output.push_str(&analysis.summary);
    output.push_str("\n\n");

    if !analysis.key_patterns.is_empty() {
        output.push_str("## Key Patterns\n\n");
        for pattern in &analysis.key_patterns {
            output.push_str(&format!("• {}\n", pattern));
        }
        output.push('\n');
    }

    if let Some(style) = &analysis.writing_style {
        output.push_str("## Writing Style\n\n");
        if !style.tone_keywords.is_empty() {
            output.push_str(&format!("**Tone keywords:** {}\n\n", style.tone_keywords.join(", ")));
        }
        if !style.voice_description.is_empty() {
            output.push_str(&format!("**Persona:** {}\n\n", style.voice_description));
        }
        if !style.instructional_directive.is_empty() {
            output.push_str(&format!("**Voice directive:** {}\n\n", style.instructional_directive));
        }
        if !style.rhetorical_devices.is_empty() {
            output.push_str(&format!(
                "**Rhetorical devices:** {}\n\n",
                style.rhetorical_devices.join(", ")
            ));
        }
        if !style.complexity_level.is_empty() {
            output.push_str(&format!("**Complexity:** {}\n\n", style.complexity_level));
        }
    }

    let total = analysis.segments.len().max(1);
    output.push_str("## Structure\n\n");
    for (label, count) in label_distribution(&analysis.segments) {
        output.push_str(&format!(
            "• {}: {} segments ({:.0}%)\n",
            label,
            count,
            count as f64 * 100.0 / total as f64
        ));
    }
    output.push('\n');

    output.push_str("## Timeline\n\n");
    for seg in &analysis.segments {
        output.push_str(&format!(
            "[{}] {:<17} {} - {}\n",
            format_timestamp(seg.segment.start_seconds),
            seg.label.as_str(),
            seg.segment.text,
            seg.analysis
        ));
    }

    output
}

/// Format a master template as human-readable markdown
pub fn format_template_readable(template: &MasterTemplate) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", template.title));
    output.push_str(&format!("**Target audience:** {}\n\n", template.target_audience));

    output.push_str("## Blueprint\n\n");
    for (i, section) in template.structure.iter().enumerate() {
        output.push_str(&format!(
            "### {}. {} ({})\n\n",
            i + 1,
            section.section,
            section.duration_percent
        ));
        output.push_str(&format!("{}\n\n", section.description));
        for phrase in &section.example_phrases {
            output.push_str(&format!("> {}\n", phrase));
        }
        if !section.example_phrases.is_empty() {
            output.push('\n');
        }
    }

    output.push_str("## Winning Formula\n\n");
    output.push_str(&template.winning_formula);
    output.push_str("\n\n");

    output.push_str("## Tips\n\n");
    for (i, tip) in template.tips.iter().enumerate() {
        output.push_str(&format!("{}. {}\n", i + 1, tip));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Segment, TemplateSection};

    fn analyzed(index: u32, start: f64, label: SegmentLabel) -> AnalyzedSegment {
        AnalyzedSegment {
            segment: Segment {
                index,
                start_time: String::new(),
                end_time: String::new(),
                text: format!("line {index}"),
                start_seconds: start,
                end_seconds: start + 2.0,
            },
            label,
            analysis: "why".into(),
        }
    }

    #[test]
    fn timestamp_is_minutes_and_seconds() {
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(125.7), "02:05");
    }

    #[test]
    fn distribution_follows_label_order() {
        let segments = vec![
            analyzed(1, 0.0, SegmentLabel::Cta),
            analyzed(2, 2.0, SegmentLabel::Hook),
            analyzed(3, 4.0, SegmentLabel::Cta),
        ];
        assert_eq!(
            label_distribution(&segments),
            vec![(SegmentLabel::Hook, 1), (SegmentLabel::Cta, 2)]
        );
    }

    #[test]
    fn analysis_report_lists_timeline() {
        let analysis = ScriptAnalysis {
            segments: vec![analyzed(1, 61.0, SegmentLabel::Hook)],
            summary: "A short script".into(),
            pacing_score: 70,
            hook_score: 90,
            dominant_tone: "Energetic".into(),
            writing_style: None,
            key_patterns: vec!["Open loop".into()],
        };
        let text = format_analysis_readable(&analysis);
        assert!(text.contains("**Pacing:** 70/100"));
        assert!(text.contains("• Open loop"));
        assert!(text.contains("[01:01] HOOK"));
        assert!(text.contains("HOOK: 1 segments (100%)"));
    }

    #[test]
    fn template_report_numbers_sections_and_tips() {
        let template = MasterTemplate {
            title: "Formula".into(),
            target_audience: "Creators".into(),
            structure: vec![TemplateSection {
                section: SegmentLabel::Hook,
                duration_percent: "10%".into(),
                description: "Open with a question".into(),
                example_phrases: vec!["Did you know?".into()],
            }],
            winning_formula: "Hook, value, ask".into(),
            tips: vec!["Keep it short".into()],
        };
        let text = format_template_readable(&template);
        assert!(text.starts_with("# Formula"));
        assert!(text.contains("### 1. HOOK (10%)"));
        assert!(text.contains("> Did you know?"));
        assert!(text.contains("1. Keep it short"));
    }
}
