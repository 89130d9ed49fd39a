//! Ranking configuration for lexical and hybrid search.
//!
//! Keyword recommendation is an ordered table of `(MatchKind, boost)` pairs.
//! Each entry becomes one `should` clause over the store name and the index
//! engine sums the scores of the clauses that match.

use serde::{Deserialize, Serialize};

/// The kind of name match a ranking strategy performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Whole-value equality on the untokenized name.
    Exact,
    /// Edge n-gram (autocomplete) match.
    Prefix,
    /// Infix n-gram match.
    Ngram,
    /// Analyzed full-text match.
    FullText,
    /// Typo-tolerant match; edit distance scales with term length and the
    /// first character must match.
    Fuzzy,
}

/// One weighted strategy of the recommendation query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingStrategy {
    pub kind: MatchKind,
    pub boost: f32,
}

impl RankingStrategy {
    pub const fn new(kind: MatchKind, boost: f32) -> Self {
        Self { kind, boost }
    }

    /// The default recommendation table, strongest signal first.
    pub fn recommend_defaults() -> Vec<Self> {
        vec![
            Self::new(MatchKind::Exact, 10.0),
            Self::new(MatchKind::Prefix, 5.0),
            Self::new(MatchKind::Ngram, 3.0),
            Self::new(MatchKind::FullText, 2.0),
            Self::new(MatchKind::Fuzzy, 1.0),
        ]
    }
}

/// Field boosts and vector weight of the hybrid query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HybridWeights {
    pub name: f32,
    pub name_ngram: f32,
    pub address: f32,
    pub description: f32,
    /// Weight applied to `cosine + 1.0` before it is summed with the lexical score.
    pub vector: f32,
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            name: 3.0,
            name_ngram: 2.0,
            address: 1.5,
            description: 1.0,
            vector: 5.0,
        }
    }
}
