//! Language model gateway
//!
//! The pipeline reaches the text-generation service through the
//! [`LanguageModel`] trait: one request in, one completion out, no
//! streaming. Keeping the seam here lets tests substitute an in-process
//! fake for the network client.

pub mod openai;

pub use openai::OpenAiGateway;

use crate::Result;
use async_trait::async_trait;

/// A single generation request
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Instruction framing for the model
    pub system_prompt: String,

    /// The content under analysis
    pub user_prompt: String,

    /// Completion length cap
    pub max_tokens: u32,

    /// Sampling temperature; enrichment uses low values, synthesis higher
    pub temperature: f32,
}

/// Stateless request/response text-generation service.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a completion for the request.
    ///
    /// Fails with [`crate::Error::Gateway`] on network, auth, or quota
    /// failures; a timed-out call is a gateway failure like any other.
    async fn generate(&self, request: GenerationRequest) -> Result<String>;
}
