use crate::{
    error::{AlchemyError, Result},
    llm::{
        client::{LlmClient, StructuredRequest},
        decode::decode_master_template,
        prompts::master_template_prompt,
        schema::master_template_schema,
    },
    types::{MasterTemplate, OutputLanguage, ScriptAnalysis},
};

/// Synthesize one master template from completed analyses.
///
/// Any request or decode failure is reported as a single
/// [`AlchemyError::TemplateFailed`]; no partial template is returned.
pub async fn build_master_template(
    client: &dyn LlmClient,
    analyses: &[ScriptAnalysis],
    model: &str,
    language: OutputLanguage,
) -> Result<MasterTemplate> {
    if analyses.is_empty() {
        return Err(AlchemyError::TemplateFailed {
            reason: "no completed analyses to aggregate".to_string(),
        });
    }

    tracing::info!(scripts = analyses.len(), model, "generating master template");

    let request = StructuredRequest {
        model: model.to_string(),
        prompt: master_template_prompt(analyses, language),
        schema: master_template_schema(),
    };

    let result = client
        .generate_structured(&request)
        .await
        .and_then(|text| decode_master_template(&text));

    result.map_err(|e| {
        tracing::warn!(error = %e, "master template generation failed");
        AlchemyError::TemplateFailed {
            reason: e.to_string(),
        }
    })
}
