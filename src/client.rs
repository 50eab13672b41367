use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use crate::catalog::{Catalog, CategoryKind};
use crate::entities::{GallerySection, LikeSummary, PhotoDescriptor};
use crate::error::GalleryError;
use crate::likes::LikeAggregator;
use crate::probe::ObjectProbe;
use crate::resolver::PhotoResolver;
use crate::storage::DocumentStore;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub probe_timeout: Duration,
    pub store_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(5),
            store_timeout: Duration::from_secs(10),
        }
    }
}

/// Entry point for the gallery pages. Built once at startup and shared by
/// reference; holds no state besides its collaborators.
pub struct GalleryClient<P: ObjectProbe, S: DocumentStore> {
    resolver: PhotoResolver<P>,
    likes: LikeAggregator<S>,
}

impl<P: ObjectProbe, S: DocumentStore> GalleryClient<P, S> {
    pub fn new(probe: P, store: S, catalog: Catalog, cfg: ClientConfig) -> Self {
        Self {
            resolver: PhotoResolver::new(probe, Arc::new(catalog), cfg.probe_timeout),
            likes: LikeAggregator::new(store, cfg.store_timeout),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        self.resolver.catalog()
    }

    pub async fn get_photos(&self, kind: CategoryKind, display_name: &str) -> Result<Vec<PhotoDescriptor>, GalleryError> {
        self.resolver.get_photos(kind, display_name).await
    }

    pub async fn get_gallery(&self, kind: CategoryKind) -> Result<Vec<GallerySection>, GalleryError> {
        self.resolver.get_gallery(kind).await
    }

    pub async fn toggle_like(&self, photo_url: &str, actor_id: &str) -> u64 {
        self.likes.toggle_like(photo_url, actor_id).await
    }

    pub async fn get_likes(&self, photo_url: &str, actor_id: &str) -> LikeSummary {
        self.likes.get_likes(photo_url, actor_id).await
    }

    pub async fn get_many_likes(&self, photo_urls: &[String], actor_id: &str) -> HashMap<String, LikeSummary> {
        self.likes.get_many_likes(photo_urls, actor_id).await
    }
}
