//! Document persistence for CreateMate.
//!
//! Documents are JSON objects grouped into named collections. Queries are
//! field equality matches, updates merge fields the way `$set` does.

/// Document helpers: ids, query matching and updates.
pub mod document;
/// JSON-file backend.
pub mod file;
/// In-memory backend.
pub mod memory;
/// The `DocumentStore` trait.
pub mod store;

pub use createmate_core::Document;
pub use document::{apply_update, matches_query, to_document, validate_collection};
pub use file::FileDocumentStore;
pub use memory::InMemoryDocumentStore;
pub use store::DocumentStore;
