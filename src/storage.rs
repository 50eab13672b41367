use std::path::{Path, PathBuf};
use dashmap::DashMap;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use crate::error::StoreError;

pub type Document = serde_json::Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldUpdate {
    Set(Value),
    Increment(i64),
    /// Appends each value not already present in the array.
    ArrayUnion(Vec<Value>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DocumentOperation {
    SetDocument { collection: String, id: String, document: Document },
    UpdateFields { collection: String, id: String, updates: Vec<(String, FieldUpdate)> },
}

pub trait DocumentStore {
    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;
    async fn set_document(&self, collection: &str, id: &str, document: Document) -> Result<(), StoreError>;
    /// Fails with [`StoreError::NotFound`] when the document does not exist.
    async fn update_fields(&self, collection: &str, id: &str, updates: Vec<(String, FieldUpdate)>) -> Result<(), StoreError>;
}

pub fn apply_updates(document: &mut Document, updates: &[(String, FieldUpdate)]) {
    for (field, update) in updates {
        match update {
            FieldUpdate::Set(value) => {
                document.insert(field.clone(), value.clone());
            }
            FieldUpdate::Increment(delta) => {
                let current = document.get(field).and_then(Value::as_i64).unwrap_or(0);
                document.insert(field.clone(), Value::from(current + delta));
            }
            FieldUpdate::ArrayUnion(values) => {
                let entry = document.entry(field.clone()).or_insert_with(|| Value::Array(vec![]));
                if !entry.is_array() {
                    *entry = Value::Array(vec![]);
                }
                if let Value::Array(items) = entry {
                    for value in values {
                        if !items.contains(value) {
                            items.push(value.clone());
                        }
                    }
                }
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: DashMap<(String, String), Document>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn contains(&self, collection: &str, id: &str) -> bool {
        self.documents.contains_key(&(collection.to_string(), id.to_string()))
    }

    fn apply(&self, operation: DocumentOperation) -> Result<(), StoreError> {
        match operation {
            DocumentOperation::SetDocument { collection, id, document } => {
                self.documents.insert((collection, id), document);
                Ok(())
            }
            DocumentOperation::UpdateFields { collection, id, updates } => {
                match self.documents.get_mut(&(collection.clone(), id.clone())) {
                    Some(mut kvp) => {
                        apply_updates(kvp.value_mut(), &updates);
                        Ok(())
                    }
                    None => Err(StoreError::NotFound { collection, id }),
                }
            }
        }
    }
}

impl DocumentStore for InMemoryDocumentStore {
    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let document = self.documents.get(&(collection.to_string(), id.to_string())).map(|x| x.value().clone());
        Ok(document)
    }

    async fn set_document(&self, collection: &str, id: &str, document: Document) -> Result<(), StoreError> {
        self.apply(DocumentOperation::SetDocument { collection: collection.to_string(), id: id.to_string(), document })
    }

    async fn update_fields(&self, collection: &str, id: &str, updates: Vec<(String, FieldUpdate)>) -> Result<(), StoreError> {
        self.apply(DocumentOperation::UpdateFields { collection: collection.to_string(), id: id.to_string(), updates })
    }
}

/// Documents kept in memory and persisted as a JSON-lines log of operations,
/// replayed on open.
pub struct FileDocumentStore {
    db_path: PathBuf,
    documents: InMemoryDocumentStore,
    wal_lock: Mutex<()>,
}

impl FileDocumentStore {
    pub async fn open(db_path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(StoreError::Io)?;
        }
        if !tokio::fs::try_exists(db_path).await.map_err(StoreError::Io)? {
            tokio::fs::write(db_path, "").await.map_err(StoreError::Io)?;
        }

        info!("Replaying document log from {}...", db_path.display());
        let documents = InMemoryDocumentStore::new();
        let file_str = tokio::fs::read_to_string(db_path).await.map_err(StoreError::Io)?;
        let lines: Vec<&str> = file_str.split('\n').filter(|x| !x.trim().is_empty()).collect();
        let mut replayed = 0;
        for (index, line) in lines.iter().enumerate() {
            let operation: DocumentOperation = match serde_json::from_str(line) {
                Ok(x) => x,
                Err(e) if index + 1 == lines.len() => {
                    warn!("Dropping unfinished last log entry: {}", e);
                    let valid_len = file_str.trim_end().rfind('\n').map_or(0, |x| x + 1);
                    tokio::fs::write(db_path, &file_str[..valid_len]).await.map_err(StoreError::Io)?;
                    break;
                }
                Err(e) => return Err(StoreError::Serialization(e)),
            };
            if let Err(e) = documents.apply(operation) {
                warn!("Skipping log entry: {}", e);
                continue;
            }
            replayed += 1;
        }
        info!("Replayed {} operations, {} documents", replayed, documents.len());

        Ok(Self { db_path: db_path.to_path_buf(), documents, wal_lock: Mutex::new(()) })
    }

    async fn write_wal(&self, operation: &DocumentOperation) -> Result<(), StoreError> {
        let serialized_operation = serde_json::to_string(operation).map_err(StoreError::Serialization)?;
        let line = format!("{}\n", serialized_operation);
        let mut file = tokio::fs::OpenOptions::new().append(true).open(&self.db_path).await
            .map_err(StoreError::Io)?;
        file.write_all(line.as_bytes()).await.map_err(StoreError::Io)?;
        file.flush().await.map_err(StoreError::Io)?;
        Ok(())
    }

    async fn commit(&self, operation: DocumentOperation) -> Result<(), StoreError> {
        let _guard = self.wal_lock.lock().await;
        if let DocumentOperation::UpdateFields { collection, id, .. } = &operation {
            if !self.documents.contains(collection, id) {
                return Err(StoreError::NotFound { collection: collection.clone(), id: id.clone() });
            }
        }
        self.write_wal(&operation).await?;
        self.documents.apply(operation)
    }
}

impl DocumentStore for FileDocumentStore {
    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.documents.get_document(collection, id).await
    }

    async fn set_document(&self, collection: &str, id: &str, document: Document) -> Result<(), StoreError> {
        self.commit(DocumentOperation::SetDocument { collection: collection.to_string(), id: id.to_string(), document }).await
    }

    async fn update_fields(&self, collection: &str, id: &str, updates: Vec<(String, FieldUpdate)>) -> Result<(), StoreError> {
        self.commit(DocumentOperation::UpdateFields { collection: collection.to_string(), id: id.to_string(), updates }).await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use super::*;

    fn doc(value: Value) -> Document {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_apply_updates() {
        let mut document = doc(json!({ "totalLikes": 2, "likeEvents": ["a"] }));
        apply_updates(&mut document, &[
            ("totalLikes".to_string(), FieldUpdate::Increment(1)),
            ("likeEvents".to_string(), FieldUpdate::ArrayUnion(vec![json!("a"), json!("b")])),
            ("counter".to_string(), FieldUpdate::Increment(5)),
            ("heart".to_string(), FieldUpdate::Set(json!("red"))),
        ]);
        assert_eq!(Value::Object(document), json!({
            "totalLikes": 3,
            "likeEvents": ["a", "b"],
            "counter": 5,
            "heart": "red",
        }));
    }

    #[tokio::test]
    async fn test_in_memory_update_missing_document() {
        let store = InMemoryDocumentStore::new();
        let result = store.update_fields("photoLikes", "nope", vec![("x".to_string(), FieldUpdate::Increment(1))]).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_in_memory_collections_are_separate() {
        let store = InMemoryDocumentStore::new();
        store.set_document("a", "1", doc(json!({ "v": 1 }))).await.unwrap();
        store.set_document("b", "1", doc(json!({ "v": 2 }))).await.unwrap();
        assert_eq!(store.get_document("a", "1").await.unwrap().unwrap()["v"], json!(1));
        assert_eq!(store.get_document("b", "1").await.unwrap().unwrap()["v"], json!(2));
        assert_eq!(store.get_document("c", "1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_replays_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("documents.jsonl");
        {
            let store = FileDocumentStore::open(&path).await.unwrap();
            store.set_document("photoLikes", "k1", doc(json!({ "totalLikes": 1 }))).await.unwrap();
            store.update_fields("photoLikes", "k1", vec![("totalLikes".to_string(), FieldUpdate::Set(json!(2)))]).await.unwrap();
            let missing = store.update_fields("photoLikes", "k2", vec![("totalLikes".to_string(), FieldUpdate::Increment(1))]).await;
            assert!(matches!(missing, Err(StoreError::NotFound { .. })));
        }
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);

        let store = FileDocumentStore::open(&path).await.unwrap();
        let document = store.get_document("photoLikes", "k1").await.unwrap().unwrap();
        assert_eq!(document["totalLikes"], json!(2));
        assert_eq!(store.get_document("photoLikes", "k2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_rejects_corrupt_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("documents.jsonl");
        std::fs::write(&path, "{not json}\n{\"SetDocument\":{\"collection\":\"a\",\"id\":\"1\",\"document\":{}}}\n").unwrap();
        let result = FileDocumentStore::open(&path).await;
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_file_store_drops_unfinished_last_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("documents.jsonl");
        {
            let store = FileDocumentStore::open(&path).await.unwrap();
            store.set_document("photoLikes", "k1", doc(json!({ "totalLikes": 1 }))).await.unwrap();
        }
        let mut contents = std::fs::read_to_string(&path).unwrap();
        contents.push_str("{\"UpdateFields\":{\"collection\":\"photoLi");
        std::fs::write(&path, &contents).unwrap();

        let store = FileDocumentStore::open(&path).await.unwrap();
        assert_eq!(store.get_document("photoLikes", "k1").await.unwrap().unwrap()["totalLikes"], json!(1));
        store.update_fields("photoLikes", "k1", vec![("totalLikes".to_string(), FieldUpdate::Set(json!(2)))]).await.unwrap();

        let store = FileDocumentStore::open(&path).await.unwrap();
        assert_eq!(store.get_document("photoLikes", "k1").await.unwrap().unwrap()["totalLikes"], json!(2));
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 2);
    }
}
