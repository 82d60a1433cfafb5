use crate::document::{apply_update, ensure_id, matches_query, validate_collection};
use crate::store::DocumentStore;
use async_trait::async_trait;
use createmate_core::{CreateMateError, CreateMateResult, Document};
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::debug;

/// Stores each collection as a JSON array in `<dir>/<collection>.json`.
///
/// Every write rewrites the whole collection file while holding the store
/// lock, so concurrent writers never interleave.
pub struct FileDocumentStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl FileDocumentStore {
    /// Open a store rooted at `dir`, creating it if needed.
    pub async fn new(dir: PathBuf) -> CreateMateResult<Self> {
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{collection}.json"))
    }

    async fn load(&self, collection: &str) -> CreateMateResult<Vec<Document>> {
        let path = self.collection_path(collection);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = tokio::fs::read_to_string(&path).await?;
        serde_json::from_str(&data).map_err(|e| {
            CreateMateError::Storage(format!(
                "Failed to parse {}: {e}",
                path.display()
            ))
        })
    }

    async fn save(&self, collection: &str, documents: &[Document]) -> CreateMateResult<()> {
        let path = self.collection_path(collection);
        if documents.is_empty() {
            if path.exists() {
                tokio::fs::remove_file(&path).await?;
            }
            return Ok(());
        }
        let tmp = self.dir.join(format!(".{collection}.json.tmp"));
        tokio::fs::write(&tmp, serde_json::to_string_pretty(documents)?).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!(collection, documents = documents.len(), "Collection written");
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn insert(&self, collection: &str, mut document: Document) -> CreateMateResult<String> {
        validate_collection(collection)?;
        let _guard = self.lock.lock().await;
        let mut documents = self.load(collection).await?;
        let id = ensure_id(&mut document);
        documents.push(document);
        self.save(collection, &documents).await?;
        Ok(id)
    }

    async fn find_one(
        &self,
        collection: &str,
        query: &Document,
    ) -> CreateMateResult<Option<Document>> {
        validate_collection(collection)?;
        let _guard = self.lock.lock().await;
        Ok(self
            .load(collection)
            .await?
            .into_iter()
            .find(|d| matches_query(d, query)))
    }

    async fn find(&self, collection: &str, query: &Document) -> CreateMateResult<Vec<Document>> {
        validate_collection(collection)?;
        let _guard = self.lock.lock().await;
        Ok(self
            .load(collection)
            .await?
            .into_iter()
            .filter(|d| matches_query(d, query))
            .collect())
    }

    async fn update_one(
        &self,
        collection: &str,
        query: &Document,
        update: &Document,
    ) -> CreateMateResult<u64> {
        validate_collection(collection)?;
        let _guard = self.lock.lock().await;
        let mut documents = self.load(collection).await?;
        let Some(document) = documents.iter_mut().find(|d| matches_query(d, query)) else {
            return Ok(0);
        };
        if !apply_update(document, update)? {
            return Ok(0);
        }
        self.save(collection, &documents).await?;
        Ok(1)
    }

    async fn delete_one(&self, collection: &str, query: &Document) -> CreateMateResult<u64> {
        validate_collection(collection)?;
        let _guard = self.lock.lock().await;
        let mut documents = self.load(collection).await?;
        let Some(index) = documents.iter().position(|d| matches_query(d, query)) else {
            return Ok(0);
        };
        documents.remove(index);
        self.save(collection, &documents).await?;
        Ok(1)
    }

    async fn collections(&self) -> CreateMateResult<Vec<String>> {
        let _guard = self.lock.lock().await;
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if let Some(name) = entry.file_name().to_str() {
                if let Some(stem) = name.strip_suffix(".json") {
                    if validate_collection(stem).is_ok() {
                        names.push(stem.to_string());
                    }
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
