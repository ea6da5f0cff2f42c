use anyhow::Result;
use uuid::Uuid;

use scriptalchemy_core::{
    AnalysisConfig, LlmClient, MasterTemplate, OutputLanguage, ScriptAnalysis, Segment,
    build_master_template, run_analysis,
};

use crate::store::{ProcessingStatus, Store};

const INITIAL_PROGRESS: &str = "Initializing...";

/// Something that happened to a file while the queue was drained.
pub enum QueueEvent<'a> {
    Started { filename: &'a str },
    Progress { filename: &'a str, message: &'a str },
    Completed { filename: &'a str, analysis: &'a ScriptAnalysis },
    Failed { filename: &'a str, error: &'a str },
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct QueueSummary {
    pub completed: usize,
    pub failed: usize,
}

fn with_limit_suffix(message: &str, limit_minutes: u32) -> String {
    if limit_minutes > 0 {
        format!("{message} (First {limit_minutes} mins)")
    } else {
        message.to_string()
    }
}

/// Analyze every queued file, one at a time, in insertion order.
///
/// The store is saved after each state change so an interrupted run leaves
/// the remaining files queued.
pub async fn process_queue<R>(
    store: &mut Store,
    client: &dyn LlmClient,
    config: &AnalysisConfig,
    mut report: R,
) -> Result<QueueSummary>
where
    R: FnMut(QueueEvent<'_>) + Send,
{
    let mut summary = QueueSummary::default();

    while let Some(id) = store.next_queued() {
        let Some((filename, segments)) = start_file(store, id) else {
            break;
        };
        store.save().await?;
        report(QueueEvent::Started {
            filename: &filename,
        });

        let result = run_analysis(client, &segments, config, |progress| {
            let message = with_limit_suffix(&progress.message, config.duration_limit_minutes);
            report(QueueEvent::Progress {
                filename: &filename,
                message: &message,
            });
            if let Some(file) = store.file_mut(id) {
                file.processing_progress = Some(message);
            }
        })
        .await;

        let Some(file) = store.file_mut(id) else {
            continue;
        };
        file.processing_progress = None;
        match result {
            Ok(analysis) => {
                report(QueueEvent::Completed {
                    filename: &filename,
                    analysis: &analysis,
                });
                file.status = ProcessingStatus::Completed;
                file.error = None;
                file.analysis = Some(analysis);
                summary.completed += 1;
            }
            Err(e) => {
                let message = e.to_string();
                report(QueueEvent::Failed {
                    filename: &filename,
                    error: &message,
                });
                file.status = ProcessingStatus::Error;
                file.error = Some(message);
                summary.failed += 1;
            }
        }
        store.save().await?;
    }

    Ok(summary)
}

fn start_file(store: &mut Store, id: Uuid) -> Option<(String, Vec<Segment>)> {
    let file = store.file_mut(id)?;
    file.status = ProcessingStatus::Processing;
    file.processing_progress = Some(INITIAL_PROGRESS.to_string());
    tracing::info!(file = %file.filename, segments = file.parsed_segments.len(), "processing file");
    Some((file.filename.clone(), file.parsed_segments.clone()))
}

/// Build and store a master template from every completed analysis.
///
/// Returns `Ok(None)` without contacting the model when nothing has been
/// analyzed yet.
pub async fn generate_template(
    store: &mut Store,
    client: &dyn LlmClient,
    model: &str,
    language: OutputLanguage,
) -> Result<Option<MasterTemplate>> {
    let analyses = store.completed_analyses();
    if analyses.is_empty() {
        tracing::info!("no completed analyses, skipping template generation");
        return Ok(None);
    }

    let template = build_master_template(client, &analyses, model, language).await?;
    store.set_template(template.clone());
    store.save().await?;
    Ok(Some(template))
}
