//! On-disk state of the CLI.
//!
//! Each storage key is one JSON file under the store root. A missing file
//! means "no value"; an unreadable one is logged and treated the same way.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::fs;
use uuid::Uuid;

use scriptalchemy_core::{
    AnalysisConfig, MasterTemplate, OutputLanguage, Provider, ScriptAnalysis, Segment, parse_any,
};

const FILES_KEY: &str = "files.json";
const ACTIVE_ID_KEY: &str = "active_id.json";
const TEMPLATE_KEY: &str = "master_template.json";
const SETTINGS_KEY: &str = "settings.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Queued,
    Processing,
    Completed,
    Error,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Queued => "queued",
            ProcessingStatus::Processing => "processing",
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptFile {
    pub id: Uuid,
    pub filename: String,
    pub content: String,
    /// Milliseconds since the Unix epoch.
    pub upload_date: u64,
    pub status: ProcessingStatus,
    pub parsed_segments: Vec<Segment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ScriptAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_progress: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub provider: Provider,
    /// `None` uses the provider's default model.
    pub model: Option<String>,
    /// Minutes from the start to analyze; 0 means the whole transcript.
    pub analysis_limit: u32,
    pub output_language: OutputLanguage,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: Provider::Gemini,
            model: None,
            analysis_limit: 0,
            output_language: OutputLanguage::Vi,
        }
    }
}

impl Settings {
    pub fn effective_model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.provider.config().model.to_string())
    }

    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            model: self.effective_model(),
            language: self.output_language,
            duration_limit_minutes: self.analysis_limit,
        }
    }
}

pub struct Store {
    root: PathBuf,
    pub files: Vec<ScriptFile>,
    pub active_id: Option<Uuid>,
    pub template: Option<MasterTemplate>,
    pub settings: Settings,
}

pub fn default_store_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("scriptalchemy")
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

async fn read_key<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let json = match fs::read_to_string(path).await {
        Ok(json) => json,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };

    match serde_json::from_str(&json) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable stored value");
            Ok(None)
        }
    }
}

async fn write_key<T: Serialize>(path: &Path, value: Option<&T>) -> Result<()> {
    match value {
        Some(value) => {
            let pretty_json = serde_json::to_string_pretty(value)?;
            fs::write(path, pretty_json)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
        }
        None => match fs::remove_file(path).await {
            Err(e) if e.kind() != ErrorKind::NotFound => {
                return Err(e).with_context(|| format!("removing {}", path.display()));
            }
            _ => {}
        },
    }
    Ok(())
}

impl Store {
    /// Load the store at `root`, creating the directory if needed.
    ///
    /// Files left in `processing` by an interrupted run are put back in the
    /// queue.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .with_context(|| format!("creating store directory {}", root.display()))?;

        let mut files: Vec<ScriptFile> = read_key(&root.join(FILES_KEY)).await?.unwrap_or_default();
        for file in files
            .iter_mut()
            .filter(|f| f.status == ProcessingStatus::Processing)
        {
            tracing::info!(file = %file.filename, "re-queueing interrupted file");
            file.status = ProcessingStatus::Queued;
            file.processing_progress = None;
        }

        Ok(Self {
            active_id: read_key(&root.join(ACTIVE_ID_KEY)).await?,
            template: read_key(&root.join(TEMPLATE_KEY)).await?,
            settings: read_key(&root.join(SETTINGS_KEY)).await?.unwrap_or_default(),
            files,
            root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn save(&self) -> Result<()> {
        write_key(&self.root.join(FILES_KEY), Some(&self.files)).await?;
        write_key(&self.root.join(ACTIVE_ID_KEY), self.active_id.as_ref()).await?;
        write_key(&self.root.join(TEMPLATE_KEY), self.template.as_ref()).await?;
        write_key(&self.root.join(SETTINGS_KEY), Some(&self.settings)).await?;
        Ok(())
    }

    /// Parse and queue a transcript. A file that cannot be parsed is not added.
    pub fn add_file(
        &mut self,
        filename: impl Into<String>,
        content: String,
    ) -> scriptalchemy_core::Result<&ScriptFile> {
        let filename = filename.into();
        let parsed_segments = parse_any(&content)?;
        tracing::debug!(file = %filename, segments = parsed_segments.len(), "queued file");

        self.files.push(ScriptFile {
            id: Uuid::new_v4(),
            filename,
            content,
            upload_date: now_millis(),
            status: ProcessingStatus::Queued,
            parsed_segments,
            analysis: None,
            error: None,
            processing_progress: None,
        });
        Ok(&self.files[self.files.len() - 1])
    }

    pub fn remove_file(&mut self, id: Uuid) -> Option<ScriptFile> {
        let position = self.files.iter().position(|f| f.id == id)?;
        if self.active_id == Some(id) {
            self.active_id = None;
        }
        Some(self.files.remove(position))
    }

    /// Resolve a full id or an unambiguous id prefix.
    pub fn resolve(&self, query: &str) -> Option<Uuid> {
        let query = query.trim().to_ascii_lowercase();
        if query.is_empty() {
            return None;
        }
        let mut matches = self
            .files
            .iter()
            .filter(|f| f.id.to_string().starts_with(&query));
        let first = matches.next()?;
        match matches.next() {
            Some(_) => None,
            None => Some(first.id),
        }
    }

    pub fn file(&self, id: Uuid) -> Option<&ScriptFile> {
        self.files.iter().find(|f| f.id == id)
    }

    pub fn file_mut(&mut self, id: Uuid) -> Option<&mut ScriptFile> {
        self.files.iter_mut().find(|f| f.id == id)
    }

    pub fn set_active(&mut self, id: Uuid) -> bool {
        let known = self.file(id).is_some();
        if known {
            self.active_id = Some(id);
        }
        known
    }

    pub fn active_file(&self) -> Option<&ScriptFile> {
        self.active_id.and_then(|id| self.file(id))
    }

    pub fn next_queued(&self) -> Option<Uuid> {
        self.files
            .iter()
            .find(|f| f.status == ProcessingStatus::Queued)
            .map(|f| f.id)
    }

    /// Put an errored file back in the queue.
    pub fn retry(&mut self, id: Uuid) -> bool {
        match self.file_mut(id) {
            Some(file) if file.status == ProcessingStatus::Error => {
                file.status = ProcessingStatus::Queued;
                file.error = None;
                true
            }
            _ => false,
        }
    }

    pub fn completed_analyses(&self) -> Vec<ScriptAnalysis> {
        self.files
            .iter()
            .filter(|f| f.status == ProcessingStatus::Completed)
            .filter_map(|f| f.analysis.clone())
            .collect()
    }

    pub fn set_template(&mut self, template: MasterTemplate) {
        self.template = Some(template);
    }

    pub fn clear_template(&mut self) -> bool {
        self.template.take().is_some()
    }
}
