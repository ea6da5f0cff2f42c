//! Two-phase analysis of a single transcript.
//!
//! A run moves through `Idle -> GlobalAnalysis -> BatchAnalysis(i/N) ->
//! Finalizing -> Done`, or ends in `Failed`. Batches are sent one at a time
//! and in order; a batch that fails degrades to fallback labels instead of
//! aborting the run.

use crate::{
    batching::{BATCH_SIZE, apply_duration_limit, chunk_segments},
    error::{AlchemyError, Result},
    llm::{
        client::{LlmClient, StructuredRequest},
        decode::{GlobalAnalysis, decode_global_analysis, decode_label_entries},
        prompts::{batch_labels_prompt, full_transcript_text, global_analysis_prompt},
        schema::{global_analysis_schema, segment_labels_schema},
    },
    reconcile::{ANALYSIS_ERROR, fallback_segment, reconcile_batch},
    types::{AnalysisConfig, AnalyzedSegment, OutputLanguage, ScriptAnalysis, Segment},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisPhase {
    Idle,
    GlobalAnalysis,
    /// 1-based batch number out of `total`.
    BatchAnalysis {
        batch: usize,
        total: usize,
    },
    Finalizing,
    Done,
    Failed,
}

impl AnalysisPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AnalysisPhase::Done | AnalysisPhase::Failed)
    }
}

/// Progress notice delivered to the caller before each phase starts.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisProgress {
    pub phase: AnalysisPhase,
    pub message: String,
}

/// Localized message for phases that report progress.
pub fn progress_message(phase: &AnalysisPhase, language: OutputLanguage) -> Option<String> {
    let message = match (phase, language) {
        (AnalysisPhase::GlobalAnalysis, OutputLanguage::En) => {
            "Analyzing global structure, tone & writing style...".to_string()
        }
        (AnalysisPhase::GlobalAnalysis, OutputLanguage::Vi) => {
            "Đang phân tích cấu trúc tổng thể...".to_string()
        }
        (AnalysisPhase::BatchAnalysis { batch, total }, OutputLanguage::En) => {
            format!("Analyzing segments batch {batch}/{total}...")
        }
        (AnalysisPhase::BatchAnalysis { batch, total }, OutputLanguage::Vi) => {
            format!("Đang phân tích chi tiết phần {batch}/{total}...")
        }
        (AnalysisPhase::Finalizing, OutputLanguage::En) => "Finalizing report...".to_string(),
        (AnalysisPhase::Finalizing, OutputLanguage::Vi) => {
            "Đang hoàn thiện báo cáo...".to_string()
        }
        _ => return None,
    };
    Some(message)
}

struct AnalysisRun<'a, F> {
    client: &'a dyn LlmClient,
    config: &'a AnalysisConfig,
    phase: AnalysisPhase,
    on_progress: F,
}

impl<'a, F> AnalysisRun<'a, F>
where
    F: FnMut(AnalysisProgress) + Send,
{
    fn advance(&mut self, phase: AnalysisPhase) {
        tracing::debug!(from = ?self.phase, to = ?phase, "analysis phase transition");
        self.phase = phase;

        if let Some(message) = progress_message(&self.phase, self.config.language) {
            (self.on_progress)(AnalysisProgress {
                phase: self.phase.clone(),
                message,
            });
        }
    }

    async fn execute(&mut self, segments: &[Segment]) -> Result<ScriptAnalysis> {
        if segments.is_empty() {
            return Err(AlchemyError::InvalidFormat {
                reason: "transcript has no segments".to_string(),
            });
        }
        let segments = apply_duration_limit(segments, self.config.duration_limit_minutes)?;

        self.advance(AnalysisPhase::GlobalAnalysis);
        let global = global_pass(self.client, self.config, &segments).await?;

        let batches = chunk_segments(&segments, BATCH_SIZE);
        let total = batches.len();
        let mut analyzed = Vec::with_capacity(segments.len());

        for (i, batch) in batches.into_iter().enumerate() {
            self.advance(AnalysisPhase::BatchAnalysis {
                batch: i + 1,
                total,
            });
            let labeled =
                batch_pass(self.client, self.config, batch, &global.summary, i + 1, total).await;
            analyzed.extend(labeled);
        }

        self.advance(AnalysisPhase::Finalizing);

        Ok(ScriptAnalysis {
            segments: analyzed,
            summary: global.summary,
            pacing_score: global.pacing_score,
            hook_score: global.hook_score,
            dominant_tone: global.dominant_tone,
            writing_style: global.writing_style,
            key_patterns: global.key_patterns,
        })
    }
}

async fn global_pass(
    client: &dyn LlmClient,
    config: &AnalysisConfig,
    segments: &[Segment],
) -> Result<GlobalAnalysis> {
    let transcript_text = full_transcript_text(segments);
    tracing::info!(
        segments = segments.len(),
        chars = transcript_text.len(),
        model = %config.model,
        "running global analysis"
    );

    let request = StructuredRequest {
        model: config.model.clone(),
        prompt: global_analysis_prompt(&transcript_text, config.language),
        schema: global_analysis_schema(),
    };

    let text = client
        .generate_structured(&request)
        .await
        .map_err(into_global_failure)?;

    decode_global_analysis(&text).map_err(into_global_failure)
}

async fn batch_pass(
    client: &dyn LlmClient,
    config: &AnalysisConfig,
    batch: &[Segment],
    summary: &str,
    number: usize,
    total: usize,
) -> Vec<AnalyzedSegment> {
    tracing::info!(batch = number, total, segments = batch.len(), "labeling batch");

    let request = StructuredRequest {
        model: config.model.clone(),
        prompt: batch_labels_prompt(batch, summary, config.language),
        schema: segment_labels_schema(),
    };

    match client.generate_structured(&request).await {
        Ok(text) => match decode_label_entries(&text) {
            Ok(entries) => reconcile_batch(batch, &entries),
            Err(e) => {
                tracing::warn!(batch = number, total, error = %e, "batch response unusable, using fallback labels");
                reconcile_batch(batch, &[])
            }
        },
        Err(e) => {
            tracing::warn!(batch = number, total, error = %e, "batch request failed, using fallback labels");
            batch
                .iter()
                .map(|segment| fallback_segment(segment, ANALYSIS_ERROR))
                .collect()
        }
    }
}

fn into_global_failure(error: AlchemyError) -> AlchemyError {
    match error {
        e @ AlchemyError::MissingApiKey { .. } => e,
        e => AlchemyError::GlobalAnalysisFailed {
            reason: e.to_string(),
        },
    }
}

/// Analyze one transcript.
///
/// Applies the duration limit from `config`, runs the global pass, then labels
/// the segments batch by batch. `on_progress` is called before each phase.
/// Global-pass failures abort the run; batch failures only degrade labels.
pub async fn run_analysis<F>(
    client: &dyn LlmClient,
    segments: &[Segment],
    config: &AnalysisConfig,
    on_progress: F,
) -> Result<ScriptAnalysis>
where
    F: FnMut(AnalysisProgress) + Send,
{
    let mut run = AnalysisRun {
        client,
        config,
        phase: AnalysisPhase::Idle,
        on_progress,
    };

    let result = run.execute(segments).await;
    match &result {
        Ok(analysis) => {
            run.advance(AnalysisPhase::Done);
            tracing::info!(
                segments = analysis.segments.len(),
                pacing = analysis.pacing_score,
                hook = analysis.hook_score,
                "analysis complete"
            );
        }
        Err(e) => {
            run.advance(AnalysisPhase::Failed);
            tracing::warn!(error = %e, "analysis failed");
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_messages_are_localized() {
        let phase = AnalysisPhase::BatchAnalysis { batch: 2, total: 3 };
        assert_eq!(
            progress_message(&phase, OutputLanguage::En).as_deref(),
            Some("Analyzing segments batch 2/3...")
        );
        assert_eq!(
            progress_message(&phase, OutputLanguage::Vi).as_deref(),
            Some("Đang phân tích chi tiết phần 2/3...")
        );
    }

    #[test]
    fn terminal_phases_are_silent() {
        for phase in [AnalysisPhase::Idle, AnalysisPhase::Done, AnalysisPhase::Failed] {
            assert_eq!(progress_message(&phase, OutputLanguage::En), None);
        }
        assert!(AnalysisPhase::Failed.is_terminal());
        assert!(!AnalysisPhase::GlobalAnalysis.is_terminal());
    }

    #[test]
    fn missing_key_is_not_rewrapped() {
        let err = into_global_failure(AlchemyError::MissingApiKey {
            provider_name: "Gemini".into(),
            env_var: "GEMINI_API_KEY".into(),
        });
        assert!(matches!(err, AlchemyError::MissingApiKey { .. }));

        let err = into_global_failure(AlchemyError::InvalidApiResponse {
            reason: "boom".into(),
        });
        assert!(matches!(err, AlchemyError::GlobalAnalysisFailed { .. }));
    }
}
