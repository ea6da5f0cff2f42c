use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlchemyError {
    #[error("Missing API key: {env_var} environment variable is not set for {provider_name}")]
    MissingApiKey {
        provider_name: String,
        env_var: String,
    },

    #[error("Invalid transcript format: {reason}")]
    InvalidFormat { reason: String },

    #[error("No timestamp markers like [0:00] found in the transcript")]
    NoTimestampMarkers,

    #[error("No segments found within the first {limit_minutes} minutes")]
    NoSegmentsInRange { limit_minutes: u32 },

    #[error("Global analysis failed: {reason}")]
    GlobalAnalysisFailed { reason: String },

    #[error("Master template generation failed, verify the API key: {reason}")]
    TemplateFailed { reason: String },

    #[error("Invalid API response: {reason}")]
    InvalidApiResponse { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl AlchemyError {
    /// True for errors that come from the user's input rather than the service.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            AlchemyError::InvalidFormat { .. } | AlchemyError::NoTimestampMarkers
        )
    }
}

pub type Result<T> = std::result::Result<T, AlchemyError>;
