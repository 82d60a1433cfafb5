use crate::document::{apply_update, ensure_id, matches_query, validate_collection};
use crate::store::DocumentStore;
use async_trait::async_trait;
use createmate_core::{CreateMateResult, Document};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local store. Contents are lost on restart.
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl InMemoryDocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Number of documents in `collection`.
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, collection: &str, mut document: Document) -> CreateMateResult<String> {
        validate_collection(collection)?;
        let id = ensure_id(&mut document);
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(document);
        Ok(id)
    }

    async fn find_one(
        &self,
        collection: &str,
        query: &Document,
    ) -> CreateMateResult<Option<Document>> {
        validate_collection(collection)?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| matches_query(d, query)).cloned()))
    }

    async fn find(&self, collection: &str, query: &Document) -> CreateMateResult<Vec<Document>> {
        validate_collection(collection)?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| matches_query(d, query))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update_one(
        &self,
        collection: &str,
        query: &Document,
        update: &Document,
    ) -> CreateMateResult<u64> {
        validate_collection(collection)?;
        let mut collections = self.collections.write().await;
        let Some(document) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| matches_query(d, query)))
        else {
            return Ok(0);
        };
        Ok(u64::from(apply_update(document, update)?))
    }

    async fn delete_one(&self, collection: &str, query: &Document) -> CreateMateResult<u64> {
        validate_collection(collection)?;
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        match docs.iter().position(|d| matches_query(d, query)) {
            Some(index) => {
                docs.remove(index);
                if docs.is_empty() {
                    collections.remove(collection);
                }
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn collections(&self) -> CreateMateResult<Vec<String>> {
        let mut names: Vec<String> = self.collections.read().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = InMemoryDocumentStore::new();
        let id = store
            .insert("schedules", doc(json!({"posting_days": ["Monday"]})))
            .await
            .unwrap();

        let found = store
            .find_one("schedules", &doc(json!({"_id": id})))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found["posting_days"], json!(["Monday"]));
        assert_eq!(store.count("schedules").await, 1);
        assert!(store
            .find_one("feedback", &Document::new())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_first_match_only() {
        let store = InMemoryDocumentStore::new();
        for _ in 0..2 {
            store
                .insert("feedback", doc(json!({"liked": false})))
                .await
                .unwrap();
        }
        let modified = store
            .update_one(
                "feedback",
                &doc(json!({"liked": false})),
                &doc(json!({"$set": {"liked": true}})),
            )
            .await
            .unwrap();
        assert_eq!(modified, 1);

        let liked = store
            .find("feedback", &doc(json!({"liked": true})))
            .await
            .unwrap();
        assert_eq!(liked.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_drops_empty_collection() {
        let store = InMemoryDocumentStore::new();
        store
            .insert("user_inputs", doc(json!({"area_of_interest": "AI"})))
            .await
            .unwrap();
        assert_eq!(store.collections().await.unwrap(), vec!["user_inputs"]);

        let deleted = store
            .delete_one("user_inputs", &doc(json!({"area_of_interest": "AI"})))
            .await
            .unwrap();
        assert_eq!(deleted, 1);
        assert!(store.collections().await.unwrap().is_empty());
        assert_eq!(
            store.delete_one("user_inputs", &Document::new()).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_invalid_collection_rejected() {
        let store = InMemoryDocumentStore::new();
        assert!(store.insert("no/slashes", Document::new()).await.is_err());
    }
}
