//! System-of-record implementations.

mod jsonl;

pub use jsonl::JsonlStoreSource;
