#![allow(dead_code)]

use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use scriptalchemy_core::{
    AlchemyError, AnalysisConfig, LlmClient, OutputLanguage, Result, Segment, StructuredRequest,
    transcript::format_srt_time,
};

type Responder = dyn Fn(&StructuredRequest, usize) -> Result<String> + Send + Sync;

/// Fake client whose answers are computed from the request and the call number.
pub struct FakeLlm {
    respond: Box<Responder>,
    calls: AtomicUsize,
    pub requests: Mutex<Vec<StructuredRequest>>,
}

impl FakeLlm {
    pub fn new(
        respond: impl Fn(&StructuredRequest, usize) -> Result<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            respond: Box::new(respond),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn schemas(&self) -> Vec<&'static str> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.schema.name)
            .collect()
    }

    pub fn prompt(&self, call: usize) -> String {
        self.requests.lock().unwrap()[call].prompt.clone()
    }
}

#[async_trait]
impl LlmClient for FakeLlm {
    async fn generate_structured(&self, request: &StructuredRequest) -> Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        (self.respond)(request, n)
    }
}

pub fn service_error(reason: &str) -> AlchemyError {
    AlchemyError::InvalidApiResponse {
        reason: reason.to_string(),
    }
}

/// `count` two-second segments starting at zero, indexed from 1.
pub fn segments(count: u32) -> Vec<Segment> {
    (1..=count)
        .map(|i| {
            let start = u64::from(i - 1) * 2;
            Segment {
                index: i,
                start_time: format_srt_time(start),
                end_time: format_srt_time(start + 2),
                text: format!("line number {i}"),
                start_seconds: start as f64,
                end_seconds: (start + 2) as f64,
            }
        })
        .collect()
}

pub fn config(language: OutputLanguage, limit: u32) -> AnalysisConfig {
    AnalysisConfig {
        model: "test-model".to_string(),
        language,
        duration_limit_minutes: limit,
    }
}

/// Segment ids listed in a labeling prompt.
pub fn prompt_ids(prompt: &str) -> Vec<u32> {
    prompt
        .lines()
        .filter_map(|line| {
            line.trim()
                .strip_prefix("ID:")?
                .split_whitespace()
                .next()?
                .parse()
                .ok()
        })
        .collect()
}

pub const GLOBAL_JSON: &str = r#"{
  "summary": "A tutorial about sourdough",
  "pacingScore": 78,
  "hookScore": 91,
  "dominantTone": "Warm",
  "keyPatterns": ["Open loop", "Callback"],
  "writingStyle": {
    "toneKeywords": ["warm", "playful"],
    "voiceDescription": "A baker friend",
    "instructionalDirective": "Speak like a patient friend",
    "rhetoricalDevices": ["Repetition"],
    "complexityLevel": "Simple"
  }
}"#;

/// A labeling answer giving every listed segment `label`.
pub fn label_all(prompt: &str, label: &str) -> String {
    let entries: Vec<serde_json::Value> = prompt_ids(prompt)
        .into_iter()
        .map(|id| serde_json::json!({"index": id, "label": label, "analysis": format!("reason {id}")}))
        .collect();
    serde_json::to_string(&entries).unwrap()
}
