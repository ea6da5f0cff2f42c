use std::fmt::Write;

use crate::types::{OutputLanguage, ScriptAnalysis, Segment, SegmentLabel};

/// Character budget for the transcript sent to the global pass.
pub const MAX_GLOBAL_CHARS: usize = 300_000;

fn language_instruction(language: OutputLanguage) -> String {
    format!(
        r#"IMPORTANT LANGUAGE RULE:
- Provide all analysis, summaries, reasons, and descriptions in **{lang}**.
- However, keep all direct quotes, script segments, examples, and references to the specific words used in the transcript in their **ORIGINAL LANGUAGE** (do not translate the script content itself)."#,
        lang = language.display_name()
    )
}

/// Join segment texts with single spaces and cut to [`MAX_GLOBAL_CHARS`].
pub fn full_transcript_text(segments: &[Segment]) -> String {
    let joined = segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    match joined.char_indices().nth(MAX_GLOBAL_CHARS) {
        Some((cut, _)) => joined[..cut].to_string(),
        None => joined,
    }
}

pub fn global_analysis_prompt(transcript_text: &str, language: OutputLanguage) -> String {
    format!(
        r#"Analyze the following video script transcript.
{lang_rule}

Provide a high-level strategic analysis:
1. Summary of the content.
2. Pacing score (0-100).
3. Hook score (0-100) based on the opening.
4. Dominant tone/voice.
5. Key recurring patterns or psychological triggers used.
6. Writing Style & Voice Analysis:
   - Tone Keywords (3-5 adjectives).
   - Voice Description (The persona).
   - Instructional Directive (How should a voice actor perform this? e.g., "Speak like a fast-paced energetic friend").
   - Rhetorical Devices used (Metaphors, Repetition, etc.).
   - Complexity Level (Simple/Moderate/Complex).

TRANSCRIPT:
"{transcript_text}""#,
        lang_rule = language_instruction(language),
    )
}

/// Render one segment the way the labeling prompt lists it.
pub fn render_segment_line(segment: &Segment) -> String {
    format!(
        "ID:{} [{} - {}] {}",
        segment.index, segment.start_time, segment.end_time, segment.text
    )
}

pub fn batch_labels_prompt(
    batch: &[Segment],
    context_summary: &str,
    language: OutputLanguage,
) -> String {
    let segments_text = batch
        .iter()
        .map(render_segment_line)
        .collect::<Vec<_>>()
        .join("\n");
    let labels = SegmentLabel::ALL
        .iter()
        .map(SegmentLabel::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"You are a video script analyst. I will provide a batch of script segments.
Context: The script is about: "{context_summary}".
{lang_rule}

For EACH segment provided below, identify its structural role (label) and provide a very brief reason (analysis).
Return an object whose "segments" array holds one entry per segment, with its ID as "index".
The "analysis" field must be written in {lang} and use at most 10 words.

Labels allowed: {labels}.

Segments to Analyze:
{segments_text}"#,
        lang_rule = language_instruction(language),
        lang = language.display_name(),
    )
}

pub fn master_template_prompt(analyses: &[ScriptAnalysis], language: OutputLanguage) -> String {
    let mut context = String::new();
    for (i, analysis) in analyses.iter().enumerate() {
        if i > 0 {
            context.push_str("---\n");
        }
        let voice = analysis
            .writing_style
            .as_ref()
            .map(|style| style.instructional_directive.as_str())
            .filter(|directive| !directive.trim().is_empty())
            .unwrap_or("N/A");
        let _ = write!(
            context,
            "Script {}:\nSummary: {}\nPatterns: {}\nTone: {}\nVoice Instruction: {}\n",
            i + 1,
            analysis.summary,
            analysis.key_patterns.join(", "),
            analysis.dominant_tone,
            voice
        );
    }

    format!(
        r#"Based on the analysis of these {count} high-performing video scripts,
generate a "Master Template" or a "Winning Formula".

{lang_rule}

Context Data:
{context}
Create a JSON response with a structure for a new script (ordered sections with their share of the duration, a description and example phrases), a winning formula description, and tips."#,
        count = analyses.len(),
        lang_rule = language_instruction(language),
    )
}
