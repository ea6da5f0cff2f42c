//! Decoding of model responses.
//!
//! The model is asked for a schema but nothing enforces it, so everything
//! here tolerates markdown fences, wrapped arrays and out-of-range numbers.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::{
    error::Result,
    types::{MasterTemplate, SegmentLabel, TemplateSection, WritingStyle},
};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response contains no array of results")]
    NoArray,
}

/// Remove a surrounding ```` ``` ```` / ```` ```json ```` fence, if any.
pub fn strip_code_fences(text: &str) -> &str {
    let mut cleaned = text.trim();

    if let Some(rest) = cleaned.strip_prefix("```") {
        let rest = match rest.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
            _ => rest,
        };
        cleaned = rest.trim_start();
    }

    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest.trim_end();
    }

    cleaned
}

/// Find the result sequence in a labeling response.
///
/// Accepts a bare array, or an object whose first array-valued property (in
/// document order) holds the results.
pub fn locate_result_array(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(map) => map.into_iter().find_map(|(_, v)| match v {
            Value::Array(items) => Some(items),
            _ => None,
        }),
        _ => None,
    }
}

/// Decode a labeling response into its raw entries.
pub fn decode_label_entries(text: &str) -> std::result::Result<Vec<Value>, DecodeError> {
    let value: Value = serde_json::from_str(strip_code_fences(text))?;
    locate_result_array(value).ok_or(DecodeError::NoArray)
}

/// Global-pass fields of a [`crate::types::ScriptAnalysis`].
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalAnalysis {
    pub summary: String,
    pub pacing_score: u8,
    pub hook_score: u8,
    pub dominant_tone: String,
    pub key_patterns: Vec<String>,
    pub writing_style: Option<WritingStyle>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGlobalAnalysis {
    summary: String,
    pacing_score: f64,
    hook_score: f64,
    #[serde(default)]
    dominant_tone: Option<String>,
    #[serde(default)]
    key_patterns: Option<Vec<String>>,
    #[serde(default)]
    writing_style: Option<WritingStyle>,
}

/// Round and clamp a score into 0..=100, warning when it was out of range.
pub fn clamp_score(field: &'static str, raw: f64) -> u8 {
    let rounded = raw.round();
    if !(0.0..=100.0).contains(&rounded) {
        tracing::warn!(field, raw, "score outside 0..=100, clamping");
    }
    rounded.clamp(0.0, 100.0) as u8
}

pub fn decode_global_analysis(text: &str) -> Result<GlobalAnalysis> {
    let raw: RawGlobalAnalysis = serde_json::from_str(strip_code_fences(text))?;

    Ok(GlobalAnalysis {
        summary: raw.summary,
        pacing_score: clamp_score("pacingScore", raw.pacing_score),
        hook_score: clamp_score("hookScore", raw.hook_score),
        dominant_tone: raw.dominant_tone.unwrap_or_default(),
        key_patterns: raw.key_patterns.unwrap_or_default(),
        writing_style: raw.writing_style,
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTemplate {
    title: String,
    #[serde(default)]
    target_audience: Option<String>,
    #[serde(default)]
    structure: Option<Vec<RawTemplateSection>>,
    #[serde(default)]
    winning_formula: Option<String>,
    #[serde(default)]
    tips: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTemplateSection {
    #[serde(default)]
    section: Option<String>,
    #[serde(default)]
    duration_percent: Option<Value>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    example_phrases: Option<Vec<String>>,
}

fn duration_share(value: Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => format!("{n}%"),
        _ => String::new(),
    }
}

impl From<RawTemplateSection> for TemplateSection {
    fn from(raw: RawTemplateSection) -> Self {
        let section = match raw.section.as_deref().map(str::parse::<SegmentLabel>) {
            Some(Ok(label)) => label,
            _ => {
                tracing::warn!(section = ?raw.section, "unknown template section label, using OTHER");
                SegmentLabel::Other
            }
        };

        TemplateSection {
            section,
            duration_percent: duration_share(raw.duration_percent),
            description: raw.description.unwrap_or_default(),
            example_phrases: raw.example_phrases.unwrap_or_default(),
        }
    }
}

pub fn decode_master_template(text: &str) -> Result<MasterTemplate> {
    let raw: RawTemplate = serde_json::from_str(strip_code_fences(text))?;

    Ok(MasterTemplate {
        title: raw.title,
        target_audience: raw.target_audience.unwrap_or_default(),
        structure: raw
            .structure
            .unwrap_or_default()
            .into_iter()
            .map(TemplateSection::from)
            .collect(),
        winning_formula: raw.winning_formula.unwrap_or_default(),
        tips: raw.tips.unwrap_or_default(),
    })
}
