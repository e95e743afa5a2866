//! Analysis categories, requests and reports.

use serde::{Deserialize, Serialize};

use super::ContentCard;

/// The category of analysis the user asks for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisType {
    /// Real-time performance analysis.
    #[default]
    PerformanceAnalysis,
    /// Audience targeting optimization.
    TargetingOptimization,
    /// Bidding strategy recommendations.
    BiddingStrategies,
    /// Ad copy and messaging optimization.
    MessagingOptimization,
    /// Forecasts and market trends.
    PredictiveAnalytics,
    /// Prioritised action items.
    ActionableRecommendations,
    /// Attribution across channels.
    CrossChannelAttribution,
    /// Competitor landscape.
    CompetitiveIntelligence,
}

impl AnalysisType {
    /// Every analysis type, in display order.
    pub const ALL: [Self; 8] = [
        Self::PerformanceAnalysis,
        Self::TargetingOptimization,
        Self::BiddingStrategies,
        Self::MessagingOptimization,
        Self::PredictiveAnalytics,
        Self::ActionableRecommendations,
        Self::CrossChannelAttribution,
        Self::CompetitiveIntelligence,
    ];

    /// Human-readable name, used in the prompt and the selector.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::PerformanceAnalysis => "Real-Time Performance Analysis",
            Self::TargetingOptimization => "AI-Enhanced Targeting Optimization",
            Self::BiddingStrategies => "Intelligent Bidding Strategies",
            Self::MessagingOptimization => "Dynamic Messaging Optimization",
            Self::PredictiveAnalytics => "Predictive Analytics Engine",
            Self::ActionableRecommendations => "Actionable Recommendations System",
            Self::CrossChannelAttribution => "Cross-Channel Attribution",
            Self::CompetitiveIntelligence => "Competitive Intelligence",
        }
    }

    /// Wire name (`PERFORMANCE_ANALYSIS`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PerformanceAnalysis => "PERFORMANCE_ANALYSIS",
            Self::TargetingOptimization => "TARGETING_OPTIMIZATION",
            Self::BiddingStrategies => "BIDDING_STRATEGIES",
            Self::MessagingOptimization => "MESSAGING_OPTIMIZATION",
            Self::PredictiveAnalytics => "PREDICTIVE_ANALYTICS",
            Self::ActionableRecommendations => "ACTIONABLE_RECOMMENDATIONS",
            Self::CrossChannelAttribution => "CROSS_CHANNEL_ATTRIBUTION",
            Self::CompetitiveIntelligence => "COMPETITIVE_INTELLIGENCE",
        }
    }

    /// Whether the request should be grounded with web search.
    ///
    /// Types that benefit from recent market data use search grounding.
    #[must_use]
    pub const fn uses_search_grounding(self) -> bool {
        matches!(
            self,
            Self::CompetitiveIntelligence | Self::PerformanceAnalysis | Self::PredictiveAnalytics
        )
    }

    /// Selector options for all types.
    #[must_use]
    pub fn options() -> Vec<AnalysisTypeOption> {
        Self::ALL
            .iter()
            .map(|t| AnalysisTypeOption { value: *t, label: t.display_name() })
            .collect()
    }
}

impl std::fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for AnalysisType {
    type Err = String;

    /// Accepts the wire name, case-insensitively, with `-` or `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_").to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| format!("unknown analysis type: {s}"))
    }
}

/// One entry of the analysis type selector.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisTypeOption {
    /// Wire value.
    pub value: AnalysisType,
    /// Display label.
    pub label: &'static str,
}

/// A request to run one analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    /// Which analysis to run.
    #[serde(default)]
    pub analysis_type: AnalysisType,

    /// Free-form campaign context typed by the user.
    pub context: String,
}

/// A finished analysis: the raw model text and its parsed cards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Which analysis was run.
    pub analysis_type: AnalysisType,

    /// Model output, including any embedded sources block.
    pub raw_text: String,

    /// Parsed cards (citation card last, if any).
    pub cards: Vec<ContentCard>,
}

impl AnalysisReport {
    /// Returns true when the response contained nothing renderable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_name_roundtrip() {
        for t in AnalysisType::ALL {
            let json = serde_json::to_value(t).unwrap();
            assert_eq!(json, serde_json::json!(t.as_str()));
            assert_eq!(t.as_str().parse::<AnalysisType>().unwrap(), t);
        }
    }

    #[test]
    fn test_from_str_is_lenient() {
        assert_eq!(
            "competitive-intelligence".parse::<AnalysisType>().unwrap(),
            AnalysisType::CompetitiveIntelligence
        );
        assert!("nonsense".parse::<AnalysisType>().is_err());
    }

    #[test]
    fn test_search_grounding_types() {
        let grounded: Vec<_> =
            AnalysisType::ALL.into_iter().filter(|t| t.uses_search_grounding()).collect();
        assert_eq!(
            grounded,
            vec![
                AnalysisType::PerformanceAnalysis,
                AnalysisType::PredictiveAnalytics,
                AnalysisType::CompetitiveIntelligence,
            ]
        );
    }

    #[test]
    fn test_request_deserializes_camel_case() {
        let req: AnalysisRequest = serde_json::from_value(serde_json::json!({
            "analysisType": "BIDDING_STRATEGIES",
            "context": "Search campaign, $5k/month"
        }))
        .unwrap();
        assert_eq!(req.analysis_type, AnalysisType::BiddingStrategies);
        assert_eq!(req.context, "Search campaign, $5k/month");
    }

    #[test]
    fn test_options_cover_all_types() {
        let options = AnalysisType::options();
        assert_eq!(options.len(), 8);
        assert_eq!(options[0].label, "Real-Time Performance Analysis");
    }
}
