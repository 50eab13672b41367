use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use chrono::Utc;
use log::{debug, error, info};
use serde_json::Value;
use crate::entities::{LikeEvent, LikeRecord, LikeSummary};
use crate::error::StoreError;
use crate::storage::{Document, DocumentStore, FieldUpdate};
use crate::utils::key_utils::PhotoKey;

pub const LIKES_COLLECTION: &str = "photoLikes";

pub struct LikeAggregator<S: DocumentStore> {
    store: S,
    store_timeout: Duration,
}

impl<S: DocumentStore> LikeAggregator<S> {
    pub fn new(store: S, store_timeout: Duration) -> Self {
        Self { store, store_timeout }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn bounded<T>(&self, operation: impl Future<Output = Result<T, StoreError>>) -> Result<T, StoreError> {
        tokio::time::timeout(self.store_timeout, operation).await
            .map_err(|_| StoreError::Timeout)?
    }

    async fn read_record(&self, photo_id: &str) -> Result<Option<LikeRecord>, StoreError> {
        let document = self.bounded(self.store.get_document(LIKES_COLLECTION, photo_id)).await?;
        document
            .map(|x| serde_json::from_value::<LikeRecord>(Value::Object(x)))
            .transpose()
            .map_err(StoreError::Serialization)
    }

    async fn create_record(&self, record: &LikeRecord) -> Result<(), StoreError> {
        let document = match serde_json::to_value(record).map_err(StoreError::Serialization)? {
            Value::Object(map) => map,
            _ => Document::new(),
        };
        self.bounded(self.store.set_document(LIKES_COLLECTION, &record.photo_id, document)).await
    }

    async fn append_like(&self, photo_id: &str, new_total: u64, event: &LikeEvent) -> Result<(), StoreError> {
        let event = serde_json::to_value(event).map_err(StoreError::Serialization)?;
        let updates = vec![
            ("totalLikes".to_string(), FieldUpdate::Set(Value::from(new_total))),
            ("likeEvents".to_string(), FieldUpdate::ArrayUnion(vec![event])),
            ("lastUpdated".to_string(), FieldUpdate::Set(Value::from(Utc::now().to_rfc3339()))),
        ];
        self.bounded(self.store.update_fields(LIKES_COLLECTION, photo_id, updates)).await
    }

    /// Records one like for `photo_url` and returns the new total. Every call
    /// counts, repeat likes from the same actor included.
    ///
    /// The read and the write are separate store calls. Two clients liking
    /// the same photo at the same moment can both read `n` and both write
    /// `n + 1`, so one like goes missing from the total while both events
    /// stay in the log. The total never decreases and never holds an invalid
    /// value. Stores with an atomic increment can close the gap with
    /// [`FieldUpdate::Increment`].
    ///
    /// Store failures are logged and never returned: the result is then the
    /// last total read, or 0 when nothing could be read.
    pub async fn toggle_like(&self, photo_url: &str, actor_id: &str) -> u64 {
        let photo_id = PhotoKey::derive(photo_url);
        debug!("like {} as {} (id {})", photo_url, actor_id, photo_id);

        let existing = match self.read_record(&photo_id).await {
            Ok(x) => x,
            Err(e) => {
                error!("Failed to read likes for {}: {}", photo_url, e);
                return 0;
            }
        };

        let event = LikeEvent::new(actor_id);
        match existing {
            None => {
                let record = LikeRecord::first_like(&photo_id, photo_url, event);
                match self.create_record(&record).await {
                    Ok(()) => {
                        info!("First like for {}", photo_url);
                        1
                    }
                    Err(e) => {
                        error!("Failed to create likes for {}: {}", photo_url, e);
                        0
                    }
                }
            }
            Some(record) => {
                let new_total = record.total_likes + 1;
                match self.append_like(&photo_id, new_total, &event).await {
                    Ok(()) => {
                        info!("Like added for {}, new count: {}", photo_url, new_total);
                        new_total
                    }
                    Err(e) => {
                        error!("Failed to add like for {}: {}", photo_url, e);
                        record.total_likes
                    }
                }
            }
        }
    }

    pub async fn get_likes(&self, photo_url: &str, actor_id: &str) -> LikeSummary {
        let photo_id = PhotoKey::derive(photo_url);
        match self.read_record(&photo_id).await {
            Ok(Some(record)) => LikeSummary {
                total_likes: record.total_likes,
                liked: record.liked_by(actor_id),
            },
            Ok(None) => LikeSummary::default(),
            Err(e) => {
                error!("Failed to get likes for {}: {}", photo_url, e);
                LikeSummary::default()
            }
        }
    }

    pub async fn get_many_likes(&self, photo_urls: &[String], actor_id: &str) -> HashMap<String, LikeSummary> {
        let summaries = futures::future::join_all(photo_urls.iter().map(|x| self.get_likes(x, actor_id))).await;
        photo_urls.iter().cloned().zip(summaries).collect()
    }
}
