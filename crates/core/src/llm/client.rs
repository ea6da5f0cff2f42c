use std::time::Duration;

use async_trait::async_trait;

use crate::{
    error::{AlchemyError, Result},
    llm::schema::ResponseSchema,
    provider::Provider,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

static SYSTEM_PROMPT: &str = "You are a video script analyst. \
Respond ONLY with valid JSON matching the requested schema, no explanation.";

/// A prompt plus the shape the answer must take.
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub model: String,
    pub prompt: String,
    pub schema: ResponseSchema,
}

/// External text-generation capability.
///
/// Implementations return the raw response text, which may still be wrapped
/// in markdown code fences.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate_structured(&self, request: &StructuredRequest) -> Result<String>;
}

/// Client for OpenAI-compatible chat-completions endpoints.
pub struct HttpLlmClient {
    client: reqwest::Client,
    provider: Provider,
    api_key: String,
}

impl HttpLlmClient {
    /// Build a client, reading the provider's API key from the environment.
    pub fn new(provider: Provider) -> Result<Self> {
        let api_key = provider.validate_api_key()?;
        Self::with_api_key(provider, api_key)
    }

    pub fn with_api_key(provider: Provider, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            provider,
            api_key,
        })
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn generate_structured(&self, request: &StructuredRequest) -> Result<String> {
        let config = self.provider.config();
        let model = if request.model.trim().is_empty() {
            config.model
        } else {
            request.model.as_str()
        };

        tracing::debug!(
            provider = self.provider.name(),
            model,
            schema = request.schema.name,
            prompt_len = request.prompt.len(),
            "sending structured request"
        );

        let response = self
            .client
            .post(config.api_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({
                "model": model,
                "messages": [
                    {
                        "role": "system",
                        "content": SYSTEM_PROMPT,
                    },
                    {
                        "role": "user",
                        "content": &request.prompt,
                    },
                ],
                "response_format": {
                    "type": "json_schema",
                    "json_schema": {
                        "name": request.schema.name,
                        "schema": &request.schema.schema,
                        "strict": false,
                    },
                },
                "temperature": 0.3,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AlchemyError::InvalidApiResponse {
                reason: format!("{} returned {}: {}", self.provider.name(), status, body),
            });
        }

        let response = response.json::<serde_json::Value>().await?;

        let content = response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| AlchemyError::InvalidApiResponse {
                reason: format!("missing message content: {:?}", response),
            })?;

        tracing::debug!(chars = content.len(), "structured response received");
        Ok(content.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_key_builds_a_client() {
        let client = HttpLlmClient::with_api_key(Provider::Openai, "sk-test".into()).unwrap();
        assert_eq!(client.provider(), Provider::Openai);
    }
}
