//! Analysis orchestration: validation, single-flight guard, lazy client,
//! prompt, model call, parse.

use tokio::sync::{Mutex, OnceCell};

use crate::client::GeminiClient;
use crate::config::Config;
use crate::error::{AnalysisError, AnalysisResult, ClientResult};
use crate::models::{AnalysisReport, AnalysisRequest};
use crate::parser::parse_analysis;
use crate::prompt::build_prompt;

/// Runs analyses against the model, one at a time.
#[derive(Debug)]
pub struct AnalysisService {
    config: Config,
    client: OnceCell<GeminiClient>,
    in_flight: Mutex<()>,
}

impl AnalysisService {
    /// Create a service. The model client is built on first use.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config, client: OnceCell::new(), in_flight: Mutex::new(()) }
    }

    /// Service configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The shared client, constructed on first call. Fails closed without
    /// an API key and retries construction on the next call.
    async fn client(&self) -> ClientResult<&GeminiClient> {
        self.client
            .get_or_try_init(|| async {
                tracing::debug!(model = %self.config.model, "Initializing model client");
                GeminiClient::new(&self.config)
            })
            .await
    }

    /// Run one analysis.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::EmptyContext`] for blank input, [`AnalysisError::Busy`]
    /// while another analysis is running, [`AnalysisError::Client`] for
    /// provider failures.
    pub async fn run(&self, request: AnalysisRequest) -> AnalysisResult<AnalysisReport> {
        if request.context.trim().is_empty() {
            return Err(AnalysisError::EmptyContext);
        }

        let Ok(_in_flight) = self.in_flight.try_lock() else {
            tracing::warn!("Analysis rejected: another analysis is in progress");
            return Err(AnalysisError::Busy);
        };

        let analysis_type = request.analysis_type;
        tracing::info!(%analysis_type, context_len = request.context.len(), "Running analysis");

        let client = self.client().await?;
        let prompt = build_prompt(analysis_type, &request.context);
        let raw_text = client.generate(&prompt, analysis_type.uses_search_grounding()).await?;
        let cards = parse_analysis(&raw_text);

        tracing::info!(%analysis_type, cards = cards.len(), "Analysis complete");
        Ok(AnalysisReport { analysis_type, raw_text, cards })
    }
}
