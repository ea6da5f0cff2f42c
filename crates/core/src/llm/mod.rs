pub mod client;
pub mod decode;
pub mod prompts;
pub mod schema;

pub use client::{HttpLlmClient, LlmClient, StructuredRequest};
pub use decode::{DecodeError, GlobalAnalysis, locate_result_array, strip_code_fences};
pub use schema::ResponseSchema;
