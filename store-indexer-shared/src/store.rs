//! System-of-record store types.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary key of a store in the system-of-record.
pub type StoreId = i64;

/// Business category of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoreCategory {
    Cafe,
    Food,
    Convenience,
}

impl StoreCategory {
    /// The upper-case label used in the index and in exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cafe => "CAFE",
            Self::Food => "FOOD",
            Self::Convenience => "CONVENIENCE",
        }
    }
}

impl fmt::Display for StoreCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A store row as owned by the system-of-record.
///
/// Records with a `deleted_at` timestamp are soft-deleted: they are logically
/// absent from every read path and must never be present in the search index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreRecord {
    /// Primary key.
    pub id: StoreId,
    /// The member that owns the store.
    pub owner_id: i64,
    /// Display name of the store.
    pub name: String,
    /// Contact phone number.
    pub phone: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Business registration number.
    pub business_number: String,
    /// Street address.
    #[serde(default)]
    pub address: String,
    /// Neighborhood label used for regional grouping.
    pub neighborhood: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Storefront image URL.
    pub image_url: String,
    /// Business category.
    pub category: StoreCategory,
    /// Weekday opening time.
    pub weekday_open_time: Option<NaiveTime>,
    /// Weekday closing time.
    pub weekday_close_time: Option<NaiveTime>,
    /// Weekend opening time.
    pub weekend_open_time: Option<NaiveTime>,
    /// Weekend closing time.
    pub weekend_close_time: Option<NaiveTime>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker.
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl StoreRecord {
    /// Whether the record carries a soft-delete marker.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serializes_upper_case() {
        let json = serde_json::to_string(&StoreCategory::Convenience).unwrap();
        assert_eq!(json, "\"CONVENIENCE\"");

        let parsed: StoreCategory = serde_json::from_str("\"CAFE\"").unwrap();
        assert_eq!(parsed, StoreCategory::Cafe);
        assert_eq!(parsed.to_string(), "CAFE");
    }

    #[test]
    fn test_record_from_export_line() {
        let line = r#"{
            "id": 7,
            "owner_id": 3,
            "name": "Blue Bottle",
            "phone": "02-123-4567",
            "business_number": "123-45-67890",
            "neighborhood": "Seongsu",
            "latitude": 37.54,
            "longitude": 127.05,
            "image_url": "https://img.example/7.png",
            "category": "CAFE",
            "weekday_open_time": "09:00:00",
            "weekday_close_time": "22:00:00",
            "weekend_open_time": null,
            "weekend_close_time": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-02T00:00:00Z"
        }"#;

        let record: StoreRecord = serde_json::from_str(line).unwrap();

        assert_eq!(record.id, 7);
        assert_eq!(record.description, "");
        assert_eq!(record.address, "");
        assert!(!record.is_deleted());
        assert_eq!(
            record.weekday_open_time,
            NaiveTime::from_hms_opt(9, 0, 0)
        );
    }
}
