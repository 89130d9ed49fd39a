//! Query building and execution against the store index.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::config::SearchConfig;
use crate::geo::{haversine_km, round2};
use store_indexer_embedding::EmbeddingClient;
use store_indexer_repository::opensearch::queries::{self, HitOrder};
use store_indexer_repository::{SearchError, SearchHit, SearchIndexProvider};
use store_indexer_shared::{Cursor, Page, StoreMapResult, StoreSearchResult, StoreSuggestion};

/// Stateless store search over the index.
///
/// Every public search method returns plain results. Errors from the index
/// or the embedding provider are logged and degrade to an empty list;
/// hybrid search degrades to keyword recommendation first.
pub struct SearchEngine {
    index: Arc<dyn SearchIndexProvider>,
    embedder: Arc<dyn EmbeddingClient>,
    config: SearchConfig,
}

impl SearchEngine {
    /// Create a new search engine with the default configuration.
    pub fn new(index: Arc<dyn SearchIndexProvider>, embedder: Arc<dyn EmbeddingClient>) -> Self {
        Self::with_config(index, embedder, SearchConfig::default())
    }

    /// Create a new search engine with custom configuration.
    pub fn with_config(
        index: Arc<dyn SearchIndexProvider>,
        embedder: Arc<dyn EmbeddingClient>,
        config: SearchConfig,
    ) -> Self {
        Self {
            index,
            embedder,
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Keyword recommendation over the store name.
    ///
    /// Five weighted strategies (exact, prefix, n-gram, full-text, fuzzy) are
    /// combined in one disjunctive query and their scores summed.
    ///
    /// # Arguments
    ///
    /// * `keyword` - Search keyword; blank or absent returns nothing without querying
    /// * `limit` - Maximum number of results
    #[instrument(skip(self))]
    pub async fn recommend(&self, keyword: Option<&str>, limit: usize) -> Vec<StoreSearchResult> {
        let Some(keyword) = normalize(keyword) else {
            return Vec::new();
        };

        self.recommend_hits(keyword, limit, HitOrder::Relevance)
            .await
            .unwrap_or_else(|e| {
                error!(keyword = %keyword, error = %e, "Recommendation search failed");
                Vec::new()
            })
    }

    /// Autocomplete suggestions from a name prefix.
    ///
    /// Duplicate suggestions are dropped, keeping the first occurrence.
    #[instrument(skip(self))]
    pub async fn suggest(&self, keyword: Option<&str>, limit: usize) -> Vec<StoreSuggestion> {
        let Some(keyword) = normalize(keyword) else {
            return Vec::new();
        };

        let query = queries::build_suggest_query(keyword, limit);
        match self.index.search(&query).await {
            Ok(hits) => {
                let mut seen = HashSet::new();
                hits.iter()
                    .map(|hit| StoreSuggestion::from_document(&hit.document))
                    .filter(|suggestion| seen.insert(suggestion.clone()))
                    .take(limit)
                    .collect()
            }
            Err(e) => {
                error!(keyword = %keyword, error = %e, "Suggestion search failed");
                Vec::new()
            }
        }
    }

    /// Pure vector similarity search.
    ///
    /// Every document with an embedding is scored by `cosine + 1.0` against
    /// the keyword's embedding. If no embedding can be produced for the
    /// keyword, nothing is returned.
    #[instrument(skip(self))]
    pub async fn semantic(&self, keyword: Option<&str>, limit: usize) -> Vec<StoreSearchResult> {
        let Some(keyword) = normalize(keyword) else {
            return Vec::new();
        };

        self.semantic_hits(keyword, limit, HitOrder::Relevance)
            .await
            .unwrap_or_else(|e| {
                error!(keyword = %keyword, error = %e, "Semantic search failed");
                Vec::new()
            })
    }

    /// Hybrid lexical and vector search.
    ///
    /// The lexical score of name, name n-grams, description and address is
    /// summed with the weighted cosine similarity. If the keyword cannot be
    /// embedded, or the hybrid query fails, the result is exactly that of
    /// `recommend` for the same keyword.
    #[instrument(skip(self))]
    pub async fn hybrid(&self, keyword: Option<&str>, limit: usize) -> Vec<StoreSearchResult> {
        let Some(keyword) = normalize(keyword) else {
            return Vec::new();
        };

        self.hybrid_hits(keyword, limit, HitOrder::Relevance)
            .await
            .unwrap_or_else(|e| {
                error!(keyword = %keyword, error = %e, "Hybrid search failed");
                Vec::new()
            })
    }

    /// Stores within `radius_km` of a point, nearest first.
    ///
    /// The distance of each store is the one computed by the index engine
    /// for sorting. Only when a hit carries no sort value is it computed
    /// here with the haversine formula. Distances are rounded to two
    /// decimal places.
    #[instrument(skip(self))]
    pub async fn by_location(&self, lat: f64, lon: f64, radius_km: f64) -> Vec<StoreMapResult> {
        let query = queries::build_geo_query(lat, lon, radius_km, self.config.geo_max_results);

        match self.index.search(&query).await {
            Ok(hits) => hits
                .iter()
                .map(|hit| {
                    let distance = hit.first_sort_f64().unwrap_or_else(|| {
                        let location = hit.document.location;
                        haversine_km(lat, lon, location.lat, location.lon)
                    });
                    StoreMapResult::from_document(&hit.document, round2(distance))
                })
                .collect(),
            Err(e) => {
                error!(lat = lat, lon = lon, radius_km = radius_km, error = %e, "Location search failed");
                Vec::new()
            }
        }
    }

    /// Typo-tolerant search on the store name alone.
    #[instrument(skip(self))]
    pub async fn search_by_name(&self, name: Option<&str>) -> Vec<StoreSearchResult> {
        let Some(name) = normalize(name) else {
            return Vec::new();
        };

        let query = queries::build_name_query(name, self.config.default_limit);
        match self.execute(&query).await {
            Ok(results) => results,
            Err(e) => {
                error!(name = %name, error = %e, "Name search failed");
                Vec::new()
            }
        }
    }

    /// One keyset page of keyword recommendations.
    ///
    /// Pages are ordered by store id descending, score second, so that
    /// following `next_cursor` visits every matching store exactly once.
    pub async fn recommend_page(
        &self,
        keyword: Option<&str>,
        cursor: &Cursor,
    ) -> Page<StoreSearchResult> {
        let Some(keyword) = normalize(keyword) else {
            return Page::empty();
        };

        match self
            .recommend_hits(keyword, cursor.page_size, HitOrder::keyset(cursor.last_id))
            .await
        {
            Ok(results) => Page::from_items(results, cursor),
            Err(e) => {
                error!(keyword = %keyword, error = %e, "Recommendation page failed");
                Page::empty()
            }
        }
    }

    /// One keyset page of semantic results.
    pub async fn semantic_page(
        &self,
        keyword: Option<&str>,
        cursor: &Cursor,
    ) -> Page<StoreSearchResult> {
        let Some(keyword) = normalize(keyword) else {
            return Page::empty();
        };

        match self
            .semantic_hits(keyword, cursor.page_size, HitOrder::keyset(cursor.last_id))
            .await
        {
            Ok(results) => Page::from_items(results, cursor),
            Err(e) => {
                error!(keyword = %keyword, error = %e, "Semantic page failed");
                Page::empty()
            }
        }
    }

    /// One keyset page of hybrid results.
    pub async fn hybrid_page(&self, keyword: Option<&str>, cursor: &Cursor) -> Page<StoreSearchResult> {
        let Some(keyword) = normalize(keyword) else {
            return Page::empty();
        };

        match self
            .hybrid_hits(keyword, cursor.page_size, HitOrder::keyset(cursor.last_id))
            .await
        {
            Ok(results) => Page::from_items(results, cursor),
            Err(e) => {
                error!(keyword = %keyword, error = %e, "Hybrid page failed");
                Page::empty()
            }
        }
    }

    async fn recommend_hits(
        &self,
        keyword: &str,
        size: usize,
        order: HitOrder,
    ) -> Result<Vec<StoreSearchResult>, SearchError> {
        let query =
            queries::build_recommend_query(&self.config.strategies, keyword, size, order);
        let results = self.execute(&query).await?;
        info!(keyword = %keyword, hits = results.len(), "Recommendation search completed");
        Ok(results)
    }

    async fn semantic_hits(
        &self,
        keyword: &str,
        size: usize,
        order: HitOrder,
    ) -> Result<Vec<StoreSearchResult>, SearchError> {
        let Some(vector) = self.query_vector(keyword).await else {
            return Ok(Vec::new());
        };

        let query = queries::build_semantic_query(&vector, size, order);
        let results = self.execute(&query).await?;
        info!(keyword = %keyword, hits = results.len(), "Semantic search completed");
        Ok(results)
    }

    async fn hybrid_hits(
        &self,
        keyword: &str,
        size: usize,
        order: HitOrder,
    ) -> Result<Vec<StoreSearchResult>, SearchError> {
        let Some(vector) = self.query_vector(keyword).await else {
            warn!(keyword = %keyword, "No query embedding, falling back to keyword recommendation");
            return self.recommend_hits(keyword, size, order).await;
        };

        let query = queries::build_hybrid_query(
            &self.config.hybrid_weights,
            keyword,
            &vector,
            size,
            order,
        );
        match self.execute(&query).await {
            Ok(results) => {
                info!(keyword = %keyword, hits = results.len(), "Hybrid search completed");
                Ok(results)
            }
            Err(e) => {
                warn!(keyword = %keyword, error = %e, "Hybrid query failed, falling back to keyword recommendation");
                self.recommend_hits(keyword, size, order).await
            }
        }
    }

    /// Embed the keyword, or `None` if the provider failed or returned nothing.
    async fn query_vector(&self, keyword: &str) -> Option<Vec<f32>> {
        match self.embedder.embed(keyword).await {
            Ok(vector) if !vector.is_empty() => Some(vector),
            Ok(_) => {
                warn!(keyword = %keyword, "Empty query embedding");
                None
            }
            Err(e) => {
                warn!(keyword = %keyword, error = %e, "Failed to embed query");
                None
            }
        }
    }

    async fn execute(&self, query: &Value) -> Result<Vec<StoreSearchResult>, SearchError> {
        let hits = self.index.search(query).await?;
        Ok(hits.iter().map(to_search_result).collect())
    }
}

fn to_search_result(hit: &SearchHit) -> StoreSearchResult {
    StoreSearchResult::from_document(&hit.document, hit.score.unwrap_or(0.0))
}

/// Trim the keyword; blank or absent becomes `None`.
fn normalize(keyword: Option<&str>) -> Option<&str> {
    keyword.map(str::trim).filter(|k| !k.is_empty())
}
