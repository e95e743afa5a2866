//! Request and response bodies of the Gemini `generateContent` endpoint.

use serde::{Deserialize, Serialize};

use crate::models::GroundingChunk;

#[derive(Debug, Serialize)]
pub(crate) struct GenerateContentRequest<'a> {
    pub contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
}

impl<'a> GenerateContentRequest<'a> {
    pub fn new(prompt: &'a str, grounded: bool) -> Self {
        Self {
            contents: vec![Content { role: "user", parts: vec![RequestPart { text: prompt }] }],
            tools: if grounded { vec![Tool::default()] } else { Vec::new() },
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct Content<'a> {
    pub role: &'static str,
    pub parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RequestPart<'a> {
    pub text: &'a str,
}

/// Enables Google Search grounding.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Tool {
    pub google_search: GoogleSearch,
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct GoogleSearch {}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let content = candidate.content.as_ref()?;
        Some(content.parts.iter().filter_map(|p| p.text.as_deref()).collect())
    }

    /// Web grounding chunks of the first candidate that carry a uri.
    pub fn web_chunks(&self) -> Vec<GroundingChunk> {
        self.candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(|m| {
                m.grounding_chunks
                    .iter()
                    .filter(|c| c.web.as_ref().is_some_and(|w| w.has_uri()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Why the provider returned nothing, if it said.
    pub fn block_reason(&self) -> Option<String> {
        self.prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
            .or_else(|| self.candidates.first().and_then(|c| c.finish_reason.clone()))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<ResponseContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResponseContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Error envelope returned on non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(default)]
    pub error: ApiError,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}
