//! Search engine configuration.

use store_indexer_shared::{HybridWeights, RankingStrategy};

/// Tunables of the search engine.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Weighted strategy table of the keyword recommendation query.
    pub strategies: Vec<RankingStrategy>,
    /// Field boosts and vector weight of the hybrid query.
    pub hybrid_weights: HybridWeights,
    /// Default cap for recommend, semantic, hybrid and name searches.
    pub default_limit: usize,
    /// Default cap for autocomplete suggestions.
    pub suggest_limit: usize,
    /// Cap on stores returned by a geo-distance search.
    pub geo_max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            strategies: RankingStrategy::recommend_defaults(),
            hybrid_weights: HybridWeights::default(),
            default_limit: 20,
            suggest_limit: 10,
            geo_max_results: 500,
        }
    }
}
