use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structural role of a transcript segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SegmentLabel {
    Hook,
    Setup,
    MainContent,
    PatternInterrupt,
    Ending,
    Cta,
    Other,
}

impl SegmentLabel {
    pub const ALL: [SegmentLabel; 7] = [
        SegmentLabel::Hook,
        SegmentLabel::Setup,
        SegmentLabel::MainContent,
        SegmentLabel::PatternInterrupt,
        SegmentLabel::Ending,
        SegmentLabel::Cta,
        SegmentLabel::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentLabel::Hook => "HOOK",
            SegmentLabel::Setup => "SETUP",
            SegmentLabel::MainContent => "MAIN_CONTENT",
            SegmentLabel::PatternInterrupt => "PATTERN_INTERRUPT",
            SegmentLabel::Ending => "ENDING",
            SegmentLabel::Cta => "CTA",
            SegmentLabel::Other => "OTHER",
        }
    }
}

impl fmt::Display for SegmentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown segment label: {0}")]
pub struct UnknownLabel(pub String);

impl FromStr for SegmentLabel {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SegmentLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

/// Language of the prose fields the model writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputLanguage {
    En,
    #[default]
    Vi,
}

impl OutputLanguage {
    pub fn code(&self) -> &'static str {
        match self {
            OutputLanguage::En => "en",
            OutputLanguage::Vi => "vi",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OutputLanguage::En => "English",
            OutputLanguage::Vi => "Vietnamese",
        }
    }
}

impl FromStr for OutputLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(OutputLanguage::En),
            "vi" => Ok(OutputLanguage::Vi),
            other => Err(format!("unsupported output language: {other} (expected en or vi)")),
        }
    }
}

/// One timestamped unit of transcript text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub index: u32,
    /// "HH:MM:SS,mmm"
    pub start_time: String,
    pub end_time: String,
    pub text: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedSegment {
    #[serde(flatten)]
    pub segment: Segment,
    pub label: SegmentLabel,
    /// Short rationale for the label.
    pub analysis: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WritingStyle {
    #[serde(default)]
    pub tone_keywords: Vec<String>,
    #[serde(default)]
    pub voice_description: String,
    /// How a voice actor should perform the script.
    #[serde(default)]
    pub instructional_directive: String,
    #[serde(default)]
    pub rhetorical_devices: Vec<String>,
    #[serde(default)]
    pub complexity_level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptAnalysis {
    pub segments: Vec<AnalyzedSegment>,
    pub summary: String,
    /// 0..=100
    pub pacing_score: u8,
    /// 0..=100
    pub hook_score: u8,
    pub dominant_tone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writing_style: Option<WritingStyle>,
    pub key_patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSection {
    pub section: SegmentLabel,
    pub duration_percent: String,
    pub description: String,
    pub example_phrases: Vec<String>,
}

/// Cross-script formula synthesized from several analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterTemplate {
    pub title: String,
    pub target_audience: String,
    pub structure: Vec<TemplateSection>,
    pub winning_formula: String,
    pub tips: Vec<String>,
}

/// Configuration snapshot for a single analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub model: String,
    pub language: OutputLanguage,
    /// 0 means unlimited.
    pub duration_limit_minutes: u32,
}
