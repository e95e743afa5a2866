//! Campaign Analyst
//!
//! LLM-backed marketing campaign analysis. A campaign description goes to a
//! Gemini model with a fixed analyst prompt; the loosely formatted markdown
//! answer is parsed into cards, rendered for the browser or terminal, and
//! exported as a branded, paginated PDF.
//!
//! # Features
//!
//! - **Eight analysis types**, three of them grounded with web search
//! - **Tolerant parser**: cards, sub-headings, lists and an embedded
//!   `[SOURCES:<json>]` citation block; malformed input degrades, never fails
//! - **PDF export**: rasterised view, brand header, page slicing
//! - **Cached, retrying client** built on reqwest middleware
//!
//! # Example
//!
//! ```no_run
//! use campaign_analyst::{AnalysisService, Config};
//! use campaign_analyst::models::{AnalysisRequest, AnalysisType};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let service = AnalysisService::new(Config::from_env()?);
//!     let report = service
//!         .run(AnalysisRequest {
//!             analysis_type: AnalysisType::BiddingStrategies,
//!             context: "Search CPC up 30% since March".to_string(),
//!         })
//!         .await?;
//!     println!("{} cards", report.cards.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod parser;
pub mod preferences;
pub mod prompt;
pub mod render;
pub mod server;
pub mod service;
pub mod theme;

pub use client::GeminiClient;
pub use config::Config;
pub use error::{AnalysisError, ClientError, ExportError};
pub use export::Exporter;
pub use service::AnalysisService;
