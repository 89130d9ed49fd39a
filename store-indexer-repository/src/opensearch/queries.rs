//! OpenSearch query builders.
//!
//! This module provides functions that build complete search request bodies
//! for every read path: weighted keyword recommendation, prefix suggestions,
//! fuzzy name lookup, pure-semantic and hybrid scoring, and geo-distance
//! search. Scored queries are either ordered by relevance, or, when they
//! serve a keyset page, by store id descending with a `store_id < last_id`
//! filter.

use serde_json::{json, Value};

use store_indexer_shared::{HybridWeights, MatchKind, RankingStrategy, StoreId};

/// Name sub-field searched by prefix suggestions.
pub const AUTOCOMPLETE_FIELD: &str = "name.autocomplete";

/// Painless source scoring a document by `cosine + 1.0`.
///
/// Documents without an embedding score zero instead of failing the script.
const COSINE_SCRIPT: &str =
    "doc['embedding'].size() == 0 ? 0 : cosineSimilarity(params.query_vector, doc['embedding']) + 1.0";

/// Ordering of a scored query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOrder {
    /// Score descending, store id descending on ties.
    Relevance,
    /// Store id descending, so that consecutive pages never overlap.
    /// `before_id` is the last id of the previous page, `None` for the first.
    Keyset { before_id: Option<StoreId> },
}

impl HitOrder {
    /// Keyset ordering for the page following `before_id`.
    pub fn keyset(before_id: Option<StoreId>) -> Self {
        Self::Keyset { before_id }
    }

    fn sort(&self) -> Value {
        match self {
            Self::Relevance => json!([
                { "_score": { "order": "desc" } },
                { "store_id": { "order": "desc" } }
            ]),
            Self::Keyset { .. } => json!([
                { "store_id": { "order": "desc" } },
                { "_score": { "order": "desc" } }
            ]),
        }
    }

    /// Add the `store_id < before_id` filter to a bool query body.
    fn apply_filter(&self, bool_query: &mut Value) {
        let Self::Keyset {
            before_id: Some(before_id),
        } = self
        else {
            return;
        };
        let clause = json!({ "range": { "store_id": { "lt": before_id } } });

        match bool_query.get_mut("filter").and_then(Value::as_array_mut) {
            Some(filters) => filters.push(clause),
            None => bool_query["filter"] = json!([clause]),
        }
    }
}

/// Build the `should` clause for one ranking strategy.
///
/// | kind      | clause                                         |
/// |-----------|------------------------------------------------|
/// | Exact     | `term` on `name.keyword`                       |
/// | Prefix    | `match` on `name.autocomplete`                 |
/// | Ngram     | `match` on `name.ngram`                        |
/// | FullText  | `match` on `name`                              |
/// | Fuzzy     | `match` on `name`, AUTO fuzziness, prefix 1    |
pub fn strategy_clause(strategy: &RankingStrategy, keyword: &str) -> Value {
    let boost = strategy.boost;
    match strategy.kind {
        MatchKind::Exact => json!({
            "term": { "name.keyword": { "value": keyword, "boost": boost } }
        }),
        MatchKind::Prefix => json!({
            "match": { AUTOCOMPLETE_FIELD: { "query": keyword, "boost": boost } }
        }),
        MatchKind::Ngram => json!({
            "match": { "name.ngram": { "query": keyword, "boost": boost } }
        }),
        MatchKind::FullText => json!({
            "match": { "name": { "query": keyword, "boost": boost } }
        }),
        MatchKind::Fuzzy => json!({
            "match": {
                "name": {
                    "query": keyword,
                    "fuzziness": "AUTO",
                    "prefix_length": 1,
                    "boost": boost
                }
            }
        }),
    }
}

/// Build the keyword recommendation query.
///
/// One `should` clause per strategy, at least one must match, and the engine
/// sums the scores of the matching clauses.
///
/// # Arguments
///
/// * `strategies` - Weighted strategy table, usually `RankingStrategy::recommend_defaults()`
/// * `keyword` - Trimmed, non-blank keyword
/// * `size` - Maximum number of hits
/// * `order` - Relevance order, or keyset order with its cursor
pub fn build_recommend_query(
    strategies: &[RankingStrategy],
    keyword: &str,
    size: usize,
    order: HitOrder,
) -> Value {
    let should: Vec<Value> = strategies
        .iter()
        .map(|strategy| strategy_clause(strategy, keyword))
        .collect();

    let mut bool_query = json!({
        "should": should,
        "minimum_should_match": 1
    });
    order.apply_filter(&mut bool_query);

    json!({
        "query": { "bool": bool_query },
        "sort": order.sort(),
        "track_scores": true,
        "size": size
    })
}

/// Build the autocomplete suggestion query (prefix match on the name only).
pub fn build_suggest_query(keyword: &str, size: usize) -> Value {
    json!({
        "query": {
            "match": { AUTOCOMPLETE_FIELD: { "query": keyword } }
        },
        "size": size
    })
}

/// Build the typo-tolerant lookup by store name.
pub fn build_name_query(name: &str, size: usize) -> Value {
    json!({
        "query": {
            "match": {
                "name": {
                    "query": name,
                    "fuzziness": "AUTO",
                    "prefix_length": 1,
                    "max_expansions": 50
                }
            }
        },
        "size": size
    })
}

/// Build the pure-semantic query.
///
/// Every document carrying an embedding is scored by `cosine + 1.0` against
/// the query vector; lexical relevance plays no part.
pub fn build_semantic_query(query_vector: &[f32], size: usize, order: HitOrder) -> Value {
    let mut bool_query = json!({
        "filter": [ { "exists": { "field": "embedding" } } ]
    });
    order.apply_filter(&mut bool_query);

    json!({
        "query": {
            "script_score": {
                "query": { "bool": bool_query },
                "script": {
                    "source": COSINE_SCRIPT,
                    "params": { "query_vector": query_vector }
                }
            }
        },
        "sort": order.sort(),
        "track_scores": true,
        "size": size
    })
}

/// Build the hybrid query.
///
/// The lexical disjunction is wrapped in a `function_score` whose single
/// script function computes the weighted cosine similarity. Both the score
/// mode and the boost mode are `sum`, so the final score is
/// `lexical + weight * (cosine + 1.0)`.
pub fn build_hybrid_query(
    weights: &HybridWeights,
    keyword: &str,
    query_vector: &[f32],
    size: usize,
    order: HitOrder,
) -> Value {
    let mut bool_query = json!({
        "should": [
            { "match": { "name": { "query": keyword, "boost": weights.name } } },
            { "match": { "name.ngram": { "query": keyword, "boost": weights.name_ngram } } },
            { "match": { "description": { "query": keyword, "boost": weights.description } } },
            { "match": { "address": { "query": keyword, "boost": weights.address } } }
        ],
        "minimum_should_match": 1
    });
    order.apply_filter(&mut bool_query);

    json!({
        "query": {
            "function_score": {
                "query": { "bool": bool_query },
                "functions": [
                    {
                        "script_score": {
                            "script": {
                                "source": COSINE_SCRIPT,
                                "params": { "query_vector": query_vector }
                            }
                        },
                        "weight": weights.vector
                    }
                ],
                "score_mode": "sum",
                "boost_mode": "sum"
            }
        },
        "sort": order.sort(),
        "track_scores": true,
        "size": size
    })
}

/// Build the geo-distance query.
///
/// Filters to stores within `radius_km` of the center and sorts by distance
/// ascending. The distance in kilometers is returned as the first sort value
/// of every hit.
pub fn build_geo_query(lat: f64, lon: f64, radius_km: f64, size: usize) -> Value {
    json!({
        "query": {
            "bool": {
                "filter": {
                    "geo_distance": {
                        "distance": format!("{}km", radius_km),
                        "location": { "lat": lat, "lon": lon }
                    }
                }
            }
        },
        "sort": [
            {
                "_geo_distance": {
                    "location": { "lat": lat, "lon": lon },
                    "order": "asc",
                    "unit": "km",
                    "distance_type": "arc"
                }
            }
        ],
        "size": size
    })
}
