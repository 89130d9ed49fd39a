//! Administrative and search commands.
//!
//! Each command runs against a set of initialized `Dependencies` and
//! returns the text to print on success.

use clap::{Args, Subcommand};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{Dependencies, IndexingError};
use store_indexer_pipeline::{StaleCheckOutcome, SyncOutcome};
use store_indexer_shared::{Cursor, StoreId};

/// Index maintenance commands.
#[derive(Debug, Clone, Subcommand)]
pub enum AdminCommand {
    /// Index every active store from the system-of-record
    Reindex,
    /// Delete every document, then reindex
    FullReindex,
    /// Delete every document from the index
    DeleteAll,
    /// Compare active store and indexed document counts
    Check,
    /// Reindex only if the counts differ
    SyncIfStale,
    /// Re-read one store and index it, or delete it if it is gone
    SyncStore {
        id: StoreId,
        /// Owner display name to store on the document
        #[arg(long)]
        owner_name: Option<String>,
    },
    /// Remove one store's document from the index
    DeleteStore { id: StoreId },
    /// Create the index and its alias if missing
    EnsureIndex,
}

/// Keyset page options shared by the paginated searches.
#[derive(Debug, Clone, Args)]
pub struct PageArgs {
    /// Maximum number of results
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
    /// Return a keyset page instead of a plain list
    #[arg(long)]
    pub paged: bool,
    /// Last store id of the previous page (implies --paged)
    #[arg(long)]
    pub after: Option<StoreId>,
}

impl PageArgs {
    fn cursor(&self) -> Option<Cursor> {
        (self.paged || self.after.is_some()).then(|| Cursor::new(self.after, Some(self.limit)))
    }
}

/// Read-only search commands. Results are printed as JSON.
#[derive(Debug, Clone, Subcommand)]
pub enum SearchCommand {
    /// Weighted keyword recommendation
    Recommend {
        keyword: Option<String>,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Autocomplete suggestions
    Suggest {
        keyword: Option<String>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Pure vector similarity search
    Semantic {
        keyword: Option<String>,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Lexical and vector search combined
    Hybrid {
        keyword: Option<String>,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Stores within a radius, nearest first
    Nearby {
        #[arg(allow_hyphen_values = true)]
        lat: f64,
        #[arg(allow_hyphen_values = true)]
        lon: f64,
        #[arg(long, default_value_t = 5.0)]
        radius_km: f64,
    },
    /// Typo-tolerant search on the store name
    ByName { name: Option<String> },
    /// An owner's stores, newest first
    OwnerStores {
        owner_id: i64,
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long)]
        after: Option<StoreId>,
    },
}

/// Run an administrative command.
///
/// # Returns
///
/// * `Ok(String)` - Success text to print
/// * `Err(IndexingError)` - The underlying pipeline or index error
#[instrument(skip(deps))]
pub async fn run_admin(deps: &Dependencies, command: AdminCommand) -> Result<String, IndexingError> {
    match command {
        AdminCommand::Reindex => {
            deps.index.ensure_index_exists().await?;
            let report = deps.pipeline.reindex_all().await?;
            Ok(report.to_string())
        }
        AdminCommand::FullReindex => {
            deps.index.ensure_index_exists().await?;
            let report = deps.pipeline.full_reindex().await?;
            Ok(format!("Full reindex complete. {}", report))
        }
        AdminCommand::DeleteAll => {
            let deleted = deps.pipeline.delete_all_from_index().await?;
            Ok(format!("Deleted {} document(s) from the index", deleted))
        }
        AdminCommand::Check => {
            let consistency = deps.pipeline.check_consistency().await?;
            Ok(consistency.to_string())
        }
        AdminCommand::SyncIfStale => {
            deps.index.ensure_index_exists().await?;
            match deps.pipeline.reindex_if_out_of_sync().await? {
                StaleCheckOutcome::InSync(consistency) => {
                    Ok(format!("Nothing to do, {}", consistency))
                }
                StaleCheckOutcome::Reindexed { before, report } => {
                    Ok(format!("Was {}. {}", before, report))
                }
            }
        }
        AdminCommand::SyncStore { id, owner_name } => {
            sync_store(deps, id, owner_name.as_deref()).await
        }
        AdminCommand::DeleteStore { id } => {
            let outcome = deps.sync.delete_one(id).await;
            describe_outcome(id, outcome)
        }
        AdminCommand::EnsureIndex => {
            deps.index.ensure_index_exists().await?;
            let documents = deps.index.count_documents().await?;
            Ok(format!("Index ready with {} document(s)", documents))
        }
    }
}

/// Bring one store's document in line with the system-of-record.
async fn sync_store(
    deps: &Dependencies,
    id: StoreId,
    owner_name: Option<&str>,
) -> Result<String, IndexingError> {
    let outcome = match deps.source.find_by_id(id).await? {
        Some(store) if !store.is_deleted() => {
            deps.index.ensure_index_exists().await?;
            deps.sync.index_one(&store, owner_name).await
        }
        Some(_) => {
            info!(store_id = id, "Store is soft-deleted, removing its document");
            deps.sync.delete_one(id).await
        }
        None => {
            warn!(store_id = id, "Store not found in the system-of-record, removing its document");
            deps.sync.delete_one(id).await
        }
    };
    describe_outcome(id, outcome)
}

fn describe_outcome(id: StoreId, outcome: SyncOutcome) -> Result<String, IndexingError> {
    match outcome {
        SyncOutcome::Indexed { embedded: true } => Ok(format!("Indexed store {}", id)),
        SyncOutcome::Indexed { embedded: false } => {
            Ok(format!("Indexed store {} without an embedding", id))
        }
        SyncOutcome::Deleted => Ok(format!("Removed store {} from the index", id)),
        SyncOutcome::Failed => Err(IndexingError::SyncFailed(id)),
    }
}

/// Run a search command and render its result as pretty JSON.
#[instrument(skip(deps))]
pub async fn run_search(
    deps: &Dependencies,
    command: SearchCommand,
) -> Result<String, IndexingError> {
    let engine = &deps.search;
    match command {
        SearchCommand::Recommend { keyword, page } => match page.cursor() {
            Some(cursor) => to_json(&engine.recommend_page(keyword.as_deref(), &cursor).await),
            None => to_json(&engine.recommend(keyword.as_deref(), page.limit).await),
        },
        SearchCommand::Suggest { keyword, limit } => {
            to_json(&engine.suggest(keyword.as_deref(), limit).await)
        }
        SearchCommand::Semantic { keyword, page } => match page.cursor() {
            Some(cursor) => to_json(&engine.semantic_page(keyword.as_deref(), &cursor).await),
            None => to_json(&engine.semantic(keyword.as_deref(), page.limit).await),
        },
        SearchCommand::Hybrid { keyword, page } => match page.cursor() {
            Some(cursor) => to_json(&engine.hybrid_page(keyword.as_deref(), &cursor).await),
            None => to_json(&engine.hybrid(keyword.as_deref(), page.limit).await),
        },
        SearchCommand::Nearby {
            lat,
            lon,
            radius_km,
        } => to_json(&engine.by_location(lat, lon, radius_km).await),
        SearchCommand::ByName { name } => to_json(&engine.search_by_name(name.as_deref()).await),
        SearchCommand::OwnerStores {
            owner_id,
            limit,
            after,
        } => {
            let page = deps
                .paginator
                .owner_stores(owner_id, &Cursor::new(after, Some(limit)))
                .await?;
            to_json(&page)
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, IndexingError> {
    Ok(serde_json::to_string_pretty(value)?)
}
