//! Data models for analysis requests and parsed responses.
//!
//! Wire-facing models use `#[serde(rename_all = "camelCase")]` to match the
//! JSON API and the model provider's naming.

mod analysis;
mod content;

pub use analysis::{AnalysisReport, AnalysisRequest, AnalysisType, AnalysisTypeOption};
pub use content::{CardKind, CitationRecord, ContentBlock, ContentCard, GroundingChunk, ListKind};
