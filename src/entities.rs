use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::utils::time_utils::deserialize_timestamp;

pub const ANONYMOUS_ACTOR: &str = "anonymous";

/// One gallery slot. Exactly one of `exists` and `is_placeholder` is set.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PhotoDescriptor {
    pub id: String,
    pub url: String,
    pub name: String,
    pub group_label: String,
    pub file_name: String,
    pub path: String,
    pub exists: bool,
    pub is_placeholder: bool,
    /// Accepted without a definitive answer from the object store.
    #[serde(default)]
    pub unverified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_checked: Option<DateTime<Utc>>,
}

impl PhotoDescriptor {
    /// Slot number carried in the id suffix (`month_3_2`, `month_3_placeholder_2`).
    pub fn slot_number(&self) -> Option<usize> {
        self.id.rsplit('_').next()?.parse().ok()
    }
}

/// Resolved slots of one subcategory.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GallerySection {
    pub key: String,
    pub display_name: String,
    pub photos: Vec<PhotoDescriptor>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LikeEvent {
    pub id: Uuid,
    pub actor_id: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub liked_at: DateTime<Utc>,
}

impl LikeEvent {
    pub fn new(actor_id: &str) -> Self {
        Self { id: Uuid::new_v4(), actor_id: actor_id.to_string(), liked_at: Utc::now() }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LikeRecord {
    #[serde(default)]
    pub photo_id: String,
    #[serde(default)]
    pub photo_url: String,
    #[serde(default)]
    pub total_likes: u64,
    #[serde(default)]
    pub like_events: Vec<LikeEvent>,
    /// Actor ids written by the older one-like-per-actor layout.
    #[serde(default, rename = "likes", skip_serializing_if = "Vec::is_empty")]
    pub legacy_likers: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub last_updated: DateTime<Utc>,
}

impl LikeRecord {
    pub fn first_like(photo_id: &str, photo_url: &str, event: LikeEvent) -> Self {
        let now = event.liked_at;
        Self {
            photo_id: photo_id.to_string(),
            photo_url: photo_url.to_string(),
            total_likes: 1,
            like_events: vec![event],
            legacy_likers: vec![],
            created_at: now,
            last_updated: now,
        }
    }

    pub fn liked_by(&self, actor_id: &str) -> bool {
        self.like_events.iter().any(|x| x.actor_id == actor_id)
            || self.legacy_likers.iter().any(|x| x == actor_id)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LikeSummary {
    pub total_likes: u64,
    pub liked: bool,
}
