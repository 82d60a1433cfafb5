use createmate_core::{CreateMateResult, Document};
use async_trait::async_trait;

/// A collection-oriented JSON document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert `document` and return its `_id`.
    async fn insert(&self, collection: &str, document: Document) -> CreateMateResult<String>;

    async fn find_one(&self, collection: &str, query: &Document)
        -> CreateMateResult<Option<Document>>;

    /// All matching documents in insertion order.
    async fn find(&self, collection: &str, query: &Document) -> CreateMateResult<Vec<Document>>;

    /// Apply `update` to the first match. Returns the number of documents modified.
    async fn update_one(
        &self,
        collection: &str,
        query: &Document,
        update: &Document,
    ) -> CreateMateResult<u64>;

    /// Remove the first match. Returns the number of documents deleted.
    async fn delete_one(&self, collection: &str, query: &Document) -> CreateMateResult<u64>;

    /// Names of collections holding at least one document, sorted.
    async fn collections(&self) -> CreateMateResult<Vec<String>>;
}
