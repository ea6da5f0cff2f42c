//! ScriptAlchemy Core Library
//!
//! Parses subtitle transcripts, labels their structure with an LLM in
//! bounded batches, and synthesizes a master template across scripts.

pub mod batching;
pub mod error;
pub mod format;
pub mod llm;
pub mod pipeline;
pub mod provider;
pub mod reconcile;
pub mod template;
pub mod transcript;
pub mod types;

// Re-export commonly used items at crate root
pub use batching::{BATCH_SIZE, apply_duration_limit, chunk_segments};
pub use error::{AlchemyError, Result};
pub use format::{format_analysis_readable, format_template_readable, format_timestamp};
pub use llm::{HttpLlmClient, LlmClient, StructuredRequest};
pub use pipeline::{AnalysisPhase, AnalysisProgress, run_analysis};
pub use provider::{Provider, ProviderConfig};
pub use reconcile::reconcile_batch;
pub use template::build_master_template;
pub use transcript::{convert_freeform, parse_any, parse_transcript};
pub use types::{
    AnalysisConfig, AnalyzedSegment, MasterTemplate, OutputLanguage, ScriptAnalysis, Segment,
    SegmentLabel, TemplateSection, WritingStyle,
};
