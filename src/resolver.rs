use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use log::{debug, info, warn};
use crate::catalog::{Catalog, CategoryKind};
use crate::entities::{GallerySection, PhotoDescriptor};
use crate::error::GalleryError;
use crate::probe::{ObjectProbe, ProbeOutcome};

const PLACEHOLDER_SIZE: &str = "500x400";

pub struct PhotoResolver<P: ObjectProbe> {
    probe: P,
    catalog: Arc<Catalog>,
    probe_timeout: Duration,
}

impl<P: ObjectProbe> PhotoResolver<P> {
    pub fn new(probe: P, catalog: Arc<Catalog>, probe_timeout: Duration) -> Self {
        Self { probe, catalog, probe_timeout }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Resolves the gallery slots of one subcategory: real photos first, then
    /// placeholders, exactly `target_slot_count` entries in total.
    ///
    /// Only an unconfigured category kind is returned as an error. Anything
    /// else that goes wrong while resolving yields a full set of placeholders.
    pub async fn get_photos(&self, kind: CategoryKind, display_name: &str) -> Result<Vec<PhotoDescriptor>, GalleryError> {
        let slots = self.catalog.target_slot_count(kind, display_name)?;
        match self.resolve(kind, display_name, slots).await {
            Ok(photos) => Ok(photos),
            Err(e) => {
                warn!("Failed to resolve photos for {}/{}: {}", kind, display_name, e);
                self.placeholders(kind, display_name, 0)
            }
        }
    }

    /// Resolves every subcategory of `kind` concurrently, in table order.
    pub async fn get_gallery(&self, kind: CategoryKind) -> Result<Vec<GallerySection>, GalleryError> {
        let category = self.catalog.category(kind)?;
        let resolved = futures::future::join_all(
            category.items.iter().map(|x| self.get_photos(kind, &x.display_name))
        ).await;

        let mut sections = Vec::with_capacity(category.items.len());
        for (item, photos) in category.items.iter().zip(resolved) {
            sections.push(GallerySection {
                key: item.key.clone(),
                display_name: item.display_name.clone(),
                photos: photos?,
            });
        }
        Ok(sections)
    }

    async fn resolve(&self, kind: CategoryKind, display_name: &str, slots: usize) -> Result<Vec<PhotoDescriptor>, GalleryError> {
        let key = self.catalog.subcategory_key(kind, display_name)?;
        let candidates = self.catalog.candidate_file_names(kind, slots)?;
        debug!("Resolving {}/{} ({} slots, {} candidates)", kind, key, slots, candidates.len());

        let mut photos = Vec::with_capacity(slots);
        for file_name in candidates {
            if photos.len() >= slots {
                break;
            }
            let url = self.catalog.object_url(kind, &key, &file_name)?;
            reqwest::Url::parse(&url)
                .map_err(|e| GalleryError::InvalidObjectUrl { url: url.clone(), reason: e.to_string() })?;

            let outcome = self.probe_bounded(&url).await;
            if !outcome.counts_as_found() {
                continue;
            }
            let n = photos.len() + 1;
            debug!("Found photo {} for {}: {} ({:?})", n, display_name, file_name, outcome);
            photos.push(PhotoDescriptor {
                id: format!("{key}_{n}"),
                url,
                name: format!("{display_name} - Photo {n}"),
                group_label: display_name.to_string(),
                path: self.catalog.storage_path(kind, &key, &file_name)?,
                file_name,
                exists: true,
                is_placeholder: false,
                unverified: outcome == ProbeOutcome::Indeterminate,
                upload_path: None,
                last_checked: Some(Utc::now()),
            });
        }

        let found = photos.len();
        info!("Found {} real photos for {}/{}", found, kind, display_name);
        if found < slots {
            photos.extend(self.placeholders(kind, display_name, found)?);
        }
        photos.truncate(slots);
        Ok(photos)
    }

    async fn probe_bounded(&self, url: &str) -> ProbeOutcome {
        match tokio::time::timeout(self.probe_timeout, self.probe.probe(url, self.probe_timeout)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                debug!("probe {} exceeded {:?}", url, self.probe_timeout);
                ProbeOutcome::NotFound
            }
        }
    }

    /// Placeholders for slots `start_index + 1 ..= target_slot_count`. Each
    /// one names the bucket path a real photo should be uploaded to.
    pub fn placeholders(&self, kind: CategoryKind, display_name: &str, start_index: usize) -> Result<Vec<PhotoDescriptor>, GalleryError> {
        let category = self.catalog.category(kind)?;
        let slots = self.catalog.target_slot_count(kind, display_name)?;
        let key = self.catalog.subcategory_key(kind, display_name)?;
        let host = self.catalog.placeholder_host.trim_end_matches('/');

        let mut placeholders = Vec::with_capacity(slots.saturating_sub(start_index));
        for n in (start_index + 1)..=slots {
            let text = format!("\u{1F4F8} {display_name}\nPhoto {n}\nUpload to storage bucket");
            let upload_path = self.catalog.upload_path(kind, &key, n)?;
            placeholders.push(PhotoDescriptor {
                id: format!("{key}_placeholder_{n}"),
                url: format!(
                    "{host}/{PLACEHOLDER_SIZE}/{}/{}?text={}",
                    category.placeholder.background,
                    category.placeholder.foreground,
                    urlencoding::encode(&text)
                ),
                name: format!("{display_name} - Photo {n}"),
                group_label: display_name.to_string(),
                file_name: format!("photo_{n}.jpg"),
                path: upload_path.clone(),
                exists: false,
                is_placeholder: true,
                unverified: false,
                upload_path: Some(upload_path),
                last_checked: None,
            });
        }
        Ok(placeholders)
    }
}
