//! JSON-lines export reader.
//!
//! Reads store rows from a file holding one serialized `StoreRecord` per
//! line, as produced by a table export of the system-of-record. The export
//! is append-only: when an id appears on several lines, the last line is the
//! current state of that store for every read. The active stream makes one
//! pass to find each id's last line and a second pass to yield rows, so
//! memory is bounded by the number of distinct ids rather than rows.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::{future, StreamExt};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::LinesStream;
use tracing::{debug, instrument};

use crate::errors::SourceError;
use crate::interfaces::{StoreSource, StoreStream};
use store_indexer_shared::{StoreId, StoreRecord};

/// A `StoreSource` backed by a JSON-lines export file.
///
/// Blank lines are ignored. Soft-deleted rows are kept out of the active
/// stream but remain visible to `find_by_id`. A row superseded by a later
/// line for the same id is ignored everywhere.
#[derive(Debug, Clone)]
pub struct JsonlStoreSource {
    path: PathBuf,
}

impl JsonlStoreSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn open(&self) -> Result<File, SourceError> {
        File::open(&self.path).await.map_err(|e| {
            SourceError::unavailable(format!("{}: {}", self.path.display(), e))
        })
    }

    /// Stream every non-blank row, deleted or not, tagged with its line number.
    async fn numbered_rows(&self) -> Result<BoxStream<'static, NumberedRow>, SourceError> {
        let file = self.open().await?;
        let lines = LinesStream::new(BufReader::new(file).lines());

        let rows = lines.enumerate().filter_map(|(index, line)| {
            let line_number = index + 1;
            future::ready(decode_line(line_number, line).map(|row| (line_number, row)))
        });

        Ok(rows.boxed())
    }

    /// Visit every decodable row in file order, stopping at the first read error.
    async fn for_each_row<F>(&self, mut visit: F) -> Result<(), SourceError>
    where
        F: FnMut(usize, StoreRecord),
    {
        let mut rows = self.numbered_rows().await?;

        while let Some((line, row)) = rows.next().await {
            match row {
                Ok(record) => visit(line, record),
                Err(e) if e.is_row_error() => {
                    debug!(error = %e, "Skipping undecodable row");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    /// Line number of the last decodable row for each id.
    async fn latest_lines(&self) -> Result<HashMap<StoreId, usize>, SourceError> {
        let mut latest = HashMap::new();
        self.for_each_row(|line, record| {
            latest.insert(record.id, line);
        })
        .await?;
        Ok(latest)
    }

    /// The current row for each id, deleted or not.
    async fn latest_rows(&self) -> Result<HashMap<StoreId, StoreRecord>, SourceError> {
        let mut latest = HashMap::new();
        self.for_each_row(|_, record| {
            latest.insert(record.id, record);
        })
        .await?;
        Ok(latest)
    }
}

type NumberedRow = (usize, Result<StoreRecord, SourceError>);

/// Decode one line of the export.
///
/// Returns `None` for blank lines.
fn decode_line(
    line_number: usize,
    line: std::io::Result<String>,
) -> Option<Result<StoreRecord, SourceError>> {
    let line = match line {
        Ok(line) => line,
        Err(e) => return Some(Err(SourceError::read(e.to_string()))),
    };

    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    Some(
        serde_json::from_str::<StoreRecord>(trimmed)
            .map_err(|e| SourceError::decode(line_number, e.to_string())),
    )
}

#[async_trait]
impl StoreSource for JsonlStoreSource {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn stream_active(&self) -> Result<StoreStream<'_>, SourceError> {
        let latest = self.latest_lines().await?;
        let rows = self.numbered_rows().await?;

        let active = rows.filter_map(move |(line, row)| {
            let row = match row {
                Ok(record) if latest.get(&record.id) != Some(&line) => None,
                Ok(record) if record.is_deleted() => None,
                other => Some(other),
            };
            future::ready(row)
        });

        Ok(active.boxed())
    }

    async fn find_by_id(&self, store_id: StoreId) -> Result<Option<StoreRecord>, SourceError> {
        let mut found = None;
        self.for_each_row(|_, record| {
            if record.id == store_id {
                found = Some(record);
            }
        })
        .await?;
        Ok(found)
    }

    async fn find_by_owner(
        &self,
        owner_id: i64,
        before_id: Option<StoreId>,
        limit: usize,
    ) -> Result<Vec<StoreRecord>, SourceError> {
        let mut rows: Vec<StoreRecord> = self
            .latest_rows()
            .await?
            .into_values()
            .filter(|record| {
                record.owner_id == owner_id
                    && !record.is_deleted()
                    && before_id.map_or(true, |before| record.id < before)
            })
            .collect();

        rows.sort_by(|a, b| b.id.cmp(&a.id));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn count_active(&self) -> Result<u64, SourceError> {
        let mut rows = self.stream_active().await?;
        let mut count = 0;

        while let Some(row) = rows.next().await {
            match row {
                Ok(_) => count += 1,
                Err(e) if e.is_row_error() => {}
                Err(e) => return Err(e),
            }
        }

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn row(id: StoreId, owner_id: i64, deleted: bool) -> String {
        let deleted_at = if deleted {
            "\"2024-06-01T00:00:00Z\""
        } else {
            "null"
        };
        format!(
            r#"{{"id":{id},"owner_id":{owner_id},"name":"Store {id}","phone":"010","description":"","business_number":"1","address":"Addr","neighborhood":"N","latitude":37.5,"longitude":127.0,"image_url":"u","category":"FOOD","created_at":"2024-05-01T00:00:00Z","updated_at":"2024-05-01T00:00:00Z","deleted_at":{deleted_at}}}"#
        )
    }

    fn export(lines: &[String]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[tokio::test]
    async fn test_stream_active_skips_deleted_and_blank_rows() {
        let file = export(&[
            row(1, 10, false),
            String::new(),
            row(2, 10, true),
            row(3, 11, false),
        ]);
        let source = JsonlStoreSource::new(file.path());

        let rows: Vec<_> = source.stream_active().await.unwrap().collect().await;

        let ids: Vec<StoreId> = rows.into_iter().map(|r| r.unwrap().id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(source.count_active().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_stream_yields_decode_errors_with_line_numbers() {
        let file = export(&[row(1, 10, false), "{not json".to_string(), row(3, 10, false)]);
        let source = JsonlStoreSource::new(file.path());

        let rows: Vec<_> = source.stream_active().await.unwrap().collect().await;

        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_ok());
        match &rows[1] {
            Err(SourceError::Decode { line, .. }) => assert_eq!(*line, 2),
            other => panic!("expected decode error, got {:?}", other),
        }
        assert!(rows[2].is_ok());
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let source = JsonlStoreSource::new("/nonexistent/stores.jsonl");

        let result = source.stream_active().await;
        assert!(matches!(result, Err(SourceError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_find_by_id_includes_deleted_rows() {
        let file = export(&[row(1, 10, false), row(2, 10, true)]);
        let source = JsonlStoreSource::new(file.path());

        let deleted = source.find_by_id(2).await.unwrap().unwrap();
        assert!(deleted.is_deleted());
        assert!(source.find_by_id(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_last_line_wins_for_repeated_ids() {
        let file = export(&[
            row(1, 10, false),
            row(2, 10, false),
            row(1, 10, true),
            row(3, 11, false),
            row(2, 10, false),
        ]);
        let source = JsonlStoreSource::new(file.path());

        let rows: Vec<_> = source.stream_active().await.unwrap().collect().await;
        let ids: Vec<StoreId> = rows.into_iter().map(|r| r.unwrap().id).collect();
        assert_eq!(ids, vec![3, 2]);

        assert_eq!(source.count_active().await.unwrap(), 2);
        assert!(source.find_by_id(1).await.unwrap().unwrap().is_deleted());

        let owned: Vec<StoreId> = source
            .find_by_owner(10, None, 10)
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(owned, vec![2]);
    }

    #[tokio::test]
    async fn test_reassigned_owner_follows_last_line() {
        let file = export(&[row(4, 10, false), row(4, 11, false)]);
        let source = JsonlStoreSource::new(file.path());

        assert!(source.find_by_owner(10, None, 10).await.unwrap().is_empty());
        assert_eq!(source.find_by_owner(11, None, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_find_by_owner_is_keyset_ordered() {
        let lines: Vec<String> = (1..=5).map(|id| row(id, 10, false)).collect();
        let file = export(&lines);
        let source = JsonlStoreSource::new(file.path());

        let first: Vec<StoreId> = source
            .find_by_owner(10, None, 2)
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(first, vec![5, 4]);

        let second: Vec<StoreId> = source
            .find_by_owner(10, Some(4), 2)
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(second, vec![3, 2]);

        assert!(source.find_by_owner(99, None, 2).await.unwrap().is_empty());
    }
}
