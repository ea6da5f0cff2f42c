mod common;

use common::{FakeLlm, service_error};
use scriptalchemy_core::{
    AlchemyError, OutputLanguage, ScriptAnalysis, SegmentLabel, WritingStyle,
    build_master_template,
};

fn analysis(summary: &str, directive: Option<&str>) -> ScriptAnalysis {
    ScriptAnalysis {
        segments: Vec::new(),
        summary: summary.to_string(),
        pacing_score: 70,
        hook_score: 80,
        dominant_tone: "Upbeat".to_string(),
        writing_style: directive.map(|d| WritingStyle {
            instructional_directive: d.to_string(),
            ..WritingStyle::default()
        }),
        key_patterns: vec!["Open loop".to_string()],
    }
}

const TEMPLATE_JSON: &str = r#"```json
{
  "title": "The Curiosity Ladder",
  "targetAudience": "Home cooks",
  "structure": [
    {"section": "HOOK", "durationPercent": "10%", "description": "Ask a question", "examplePhrases": ["Ever wondered why?"]},
    {"section": "MAIN_CONTENT", "durationPercent": 70, "description": "Teach", "examplePhrases": []},
    {"section": "OUTRO", "durationPercent": "20%", "description": "Wrap up", "examplePhrases": []}
  ],
  "winningFormula": "Question, payoff, ask",
  "tips": ["Cut silences", "Show the result first"]
}
```"#;

#[tokio::test]
async fn builds_template_from_all_analyses() {
    let client = FakeLlm::new(|_, _| Ok(TEMPLATE_JSON.to_string()));
    let analyses = vec![
        analysis("Bread basics", Some("Speak like a patient friend")),
        analysis("Pasta from scratch", None),
    ];

    let template = build_master_template(&client, &analyses, "test-model", OutputLanguage::En)
        .await
        .unwrap();

    assert_eq!(template.title, "The Curiosity Ladder");
    let sections: Vec<SegmentLabel> = template.structure.iter().map(|s| s.section).collect();
    assert_eq!(
        sections,
        vec![SegmentLabel::Hook, SegmentLabel::MainContent, SegmentLabel::Other]
    );
    assert_eq!(template.structure[1].duration_percent, "70%");
    assert_eq!(template.tips.len(), 2);

    assert_eq!(client.schemas(), vec!["master_template"]);
    let prompt = client.prompt(0);
    assert!(prompt.contains("Script 1:\nSummary: Bread basics"));
    assert!(prompt.contains("Script 2:\nSummary: Pasta from scratch"));
    assert!(prompt.contains("Voice Instruction: Speak like a patient friend"));
    assert!(prompt.contains("Voice Instruction: N/A"));
}

#[tokio::test]
async fn request_failure_becomes_template_error() {
    let client = FakeLlm::new(|_, _| Err(service_error("HTTP 401")));

    let err = build_master_template(
        &client,
        &[analysis("Bread basics", None)],
        "test-model",
        OutputLanguage::Vi,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AlchemyError::TemplateFailed { .. }));
    assert!(err.to_string().contains("verify the API key"));
}

#[tokio::test]
async fn undecodable_template_is_an_error() {
    let client = FakeLlm::new(|_, _| Ok("{\"tips\": []}".to_string()));

    let err = build_master_template(
        &client,
        &[analysis("Bread basics", None)],
        "test-model",
        OutputLanguage::En,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AlchemyError::TemplateFailed { .. }));
}

#[tokio::test]
async fn no_analyses_means_no_request() {
    let client = FakeLlm::new(|_, _| Ok(TEMPLATE_JSON.to_string()));

    let err = build_master_template(&client, &[], "test-model", OutputLanguage::En)
        .await
        .unwrap_err();

    assert!(matches!(err, AlchemyError::TemplateFailed { .. }));
    assert_eq!(client.call_count(), 0);
}
