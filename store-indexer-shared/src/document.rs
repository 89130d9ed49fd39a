//! The search-index mirror of a store record.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{StoreCategory, StoreId, StoreRecord};

/// Dimensionality of the embeddings produced by the default model.
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1536;

/// A latitude/longitude pair in the index's `geo_point` object form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Denormalized copy of a store's display fields, as stored in the index.
///
/// The index document id is always the decimal string of `store_id`, so
/// writing the same store twice overwrites rather than appends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    /// Store primary key.
    pub store_id: StoreId,
    /// Owner member id.
    pub owner_id: i64,
    /// Owner display name, when known at sync time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub description: String,
    pub business_number: String,
    #[serde(default)]
    pub address: String,
    pub neighborhood: String,
    /// Geo point used by distance filters and sorts.
    pub location: GeoPoint,
    pub image_url: String,
    pub category: StoreCategory,
    #[serde(default)]
    pub weekday_open_time: Option<String>,
    #[serde(default)]
    pub weekday_close_time: Option<String>,
    #[serde(default)]
    pub weekend_open_time: Option<String>,
    #[serde(default)]
    pub weekend_close_time: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Semantic embedding of name, description and address.
    ///
    /// `None` when embedding generation failed or was short-changed by the
    /// provider; the document is still indexed for lexical search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl StoreDocument {
    /// Build a document from a store record.
    ///
    /// # Arguments
    ///
    /// * `store` - The source record
    /// * `owner_name` - Owner display name (not available on the bulk path)
    /// * `embedding` - Embedding vector, if one was generated
    pub fn from_record(
        store: &StoreRecord,
        owner_name: Option<String>,
        embedding: Option<Vec<f32>>,
    ) -> Self {
        Self {
            store_id: store.id,
            owner_id: store.owner_id,
            owner_name,
            name: store.name.clone(),
            phone: store.phone.clone(),
            description: store.description.clone(),
            business_number: store.business_number.clone(),
            address: store.address.clone(),
            neighborhood: store.neighborhood.clone(),
            location: GeoPoint::new(store.latitude, store.longitude),
            image_url: store.image_url.clone(),
            category: store.category,
            weekday_open_time: store.weekday_open_time.map(format_time),
            weekday_close_time: store.weekday_close_time.map(format_time),
            weekend_open_time: store.weekend_open_time.map(format_time),
            weekend_close_time: store.weekend_close_time.map(format_time),
            created_at: store.created_at,
            updated_at: store.updated_at,
            embedding,
        }
    }

    /// The index document id for this store.
    pub fn document_id(&self) -> String {
        document_id(self.store_id)
    }

    /// Number of embedding dimensions carried, zero when absent.
    pub fn embedding_len(&self) -> usize {
        self.embedding.as_ref().map_or(0, Vec::len)
    }
}

/// The index document id for a store id.
pub fn document_id(store_id: StoreId) -> String {
    store_id.to_string()
}

fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record() -> StoreRecord {
        StoreRecord {
            id: 42,
            owner_id: 9,
            name: "Corner Cafe".to_string(),
            phone: "010-0000-0000".to_string(),
            description: "Hand drip coffee".to_string(),
            business_number: "111-22-33333".to_string(),
            address: "1 Main St".to_string(),
            neighborhood: "Hapjeong".to_string(),
            latitude: 37.55,
            longitude: 126.91,
            image_url: "https://img.example/42.png".to_string(),
            category: StoreCategory::Cafe,
            weekday_open_time: NaiveTime::from_hms_opt(8, 30, 0),
            weekday_close_time: NaiveTime::from_hms_opt(21, 0, 0),
            weekend_open_time: None,
            weekend_close_time: None,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_from_record_copies_display_fields() {
        let store = record();
        let doc = StoreDocument::from_record(&store, Some("kim".to_string()), None);

        assert_eq!(doc.document_id(), "42");
        assert_eq!(doc.store_id, store.id);
        assert_eq!(doc.owner_name.as_deref(), Some("kim"));
        assert_eq!(doc.location, GeoPoint::new(37.55, 126.91));
        assert_eq!(doc.weekday_open_time.as_deref(), Some("08:30:00"));
        assert!(doc.weekend_open_time.is_none());
        assert_eq!(doc.embedding_len(), 0);
    }

    #[test]
    fn test_serialization_omits_missing_embedding() {
        let doc = StoreDocument::from_record(&record(), None, None);
        let value = serde_json::to_value(&doc).unwrap();

        assert!(value.get("embedding").is_none());
        assert!(value.get("owner_name").is_none());
        assert_eq!(value["category"], "CAFE");
        assert_eq!(value["location"]["lat"], 37.55);
    }

    #[test]
    fn test_serialization_keeps_embedding() {
        let doc = StoreDocument::from_record(&record(), None, Some(vec![0.5, -0.25]));
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["embedding"].as_array().unwrap().len(), 2);
    }
}
