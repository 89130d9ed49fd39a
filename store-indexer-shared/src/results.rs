//! Response shapes returned by the search engine and owner listings.

use serde::{Deserialize, Serialize};

use crate::document::StoreDocument;
use crate::pagination::KeysetItem;
use crate::store::{StoreCategory, StoreId, StoreRecord};

/// A ranked search hit with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSearchResult {
    pub id: StoreId,
    pub name: String,
    pub address: String,
    pub neighborhood: String,
    pub category: StoreCategory,
    pub image_url: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Relevance score as computed by the index engine.
    pub score: f32,
}

impl StoreSearchResult {
    pub fn from_document(document: &StoreDocument, score: f32) -> Self {
        Self {
            id: document.store_id,
            name: document.name.clone(),
            address: document.address.clone(),
            neighborhood: document.neighborhood.clone(),
            category: document.category,
            image_url: document.image_url.clone(),
            latitude: document.location.lat,
            longitude: document.location.lon,
            score,
        }
    }
}

/// An autocomplete suggestion.
///
/// Two suggestions are equal when both id and name match, which is what
/// suggestion de-duplication keys on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreSuggestion {
    pub id: StoreId,
    pub name: String,
}

impl StoreSuggestion {
    pub fn from_document(document: &StoreDocument) -> Self {
        Self {
            id: document.store_id,
            name: document.name.clone(),
        }
    }
}

/// A store found by a geo-distance search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreMapResult {
    pub id: StoreId,
    pub name: String,
    pub address: String,
    pub neighborhood: String,
    pub category: StoreCategory,
    pub latitude: f64,
    pub longitude: f64,
    pub image_url: String,
    /// Distance from the query center in kilometers, two decimal places.
    pub distance_km: f64,
}

impl StoreMapResult {
    pub fn from_document(document: &StoreDocument, distance_km: f64) -> Self {
        Self {
            id: document.store_id,
            name: document.name.clone(),
            address: document.address.clone(),
            neighborhood: document.neighborhood.clone(),
            category: document.category,
            latitude: document.location.lat,
            longitude: document.location.lon,
            image_url: document.image_url.clone(),
            distance_km,
        }
    }
}

/// A row of an owner-scoped store listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSummary {
    pub id: StoreId,
    pub name: String,
    pub category: StoreCategory,
    pub latitude: f64,
    pub longitude: f64,
    pub image_url: String,
}

impl From<&StoreRecord> for StoreSummary {
    fn from(store: &StoreRecord) -> Self {
        Self {
            id: store.id,
            name: store.name.clone(),
            category: store.category,
            latitude: store.latitude,
            longitude: store.longitude,
            image_url: store.image_url.clone(),
        }
    }
}

impl KeysetItem for StoreSearchResult {
    fn keyset_id(&self) -> StoreId {
        self.id
    }
}

impl KeysetItem for StoreSummary {
    fn keyset_id(&self) -> StoreId {
        self.id
    }
}
