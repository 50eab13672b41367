//! Static gallery table: where each category lives in the bucket, how many
//! slots it renders and which filenames are probed for each slot.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::str::FromStr;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use crate::error::GalleryError;
use crate::utils::str_utils::StringExtensions;

pub const DEFAULT_BUCKET_URL: &str = "https://storage.googleapis.com/baby-birthday-photos";
pub const DEFAULT_PLACEHOLDER_HOST: &str = "https://via.placeholder.com";
pub const DEFAULT_SLOT_COUNT: usize = 2;

/// Filename templates, probed in this order. `{n}` is the slot number and
/// `{hint}` the category's name hint.
pub const DEFAULT_CANDIDATE_PATTERNS: &[&str] = &[
    "photo_{n}.jpg",
    "photo{n}.jpg",
    "{n}.jpg",
    "{hint}_{n}.jpg",
    "{hint}{n}.jpg",
    "img_{n}.jpg",
    "img{n}.jpg",
    "image_{n}.jpg",
    "image{n}.jpg",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum)]
pub enum CategoryKind {
    #[serde(rename = "monthlyJourney", alias = "babyJourney")]
    #[value(name = "monthly-journey", alias = "babyJourney")]
    MonthlyJourney,
    #[serde(rename = "momentCategory", alias = "bestPhotos")]
    #[value(name = "moment-category", alias = "bestPhotos")]
    MomentCategory,
}

impl Display for CategoryKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryKind::MonthlyJourney => write!(f, "monthly-journey"),
            CategoryKind::MomentCategory => write!(f, "moment-category"),
        }
    }
}

impl FromStr for CategoryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "monthly-journey" | "monthlyJourney" | "babyJourney" => Ok(CategoryKind::MonthlyJourney),
            "moment-category" | "momentCategory" | "bestPhotos" => Ok(CategoryKind::MomentCategory),
            other => Err(format!("unknown category kind: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategoryItem {
    pub key: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_count: Option<usize>,
}

impl SubcategoryItem {
    pub fn new(key: &str, display_name: &str) -> Self {
        Self { key: key.to_string(), display_name: display_name.to_string(), slot_count: None }
    }

    pub fn with_slot_count(mut self, slot_count: usize) -> Self {
        self.slot_count = Some(slot_count);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholderStyle {
    pub background: String,
    pub foreground: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryConfig {
    pub path: String,
    #[serde(default = "default_slot_count")]
    pub slot_count: usize,
    pub name_hint: String,
    pub placeholder: PlaceholderStyle,
    #[serde(default = "default_candidate_patterns")]
    pub candidate_patterns: Vec<String>,
    pub items: Vec<SubcategoryItem>,
}

impl CategoryConfig {
    pub fn find_item(&self, display_name: &str) -> Option<&SubcategoryItem> {
        self.items.iter().find(|x| x.display_name == display_name)
    }
}

fn default_slot_count() -> usize {
    DEFAULT_SLOT_COUNT
}

fn default_candidate_patterns() -> Vec<String> {
    DEFAULT_CANDIDATE_PATTERNS.iter().map(|x| x.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub bucket_url: String,
    pub placeholder_host: String,
    pub categories: HashMap<CategoryKind, CategoryConfig>,
}

impl Default for Catalog {
    fn default() -> Self {
        let months = std::iter::once(SubcategoryItem::new("newborn", "Newborn"))
            .chain((1..=12).map(|m| SubcategoryItem::new(&format!("month_{m}"), &format!("Month {m}"))))
            .collect();
        let monthly_journey = CategoryConfig {
            path: "baby-journey".to_string(),
            slot_count: DEFAULT_SLOT_COUNT,
            name_hint: "kashvi".to_string(),
            placeholder: PlaceholderStyle { background: "FFE5F1".to_string(), foreground: "FF6B9D".to_string() },
            candidate_patterns: default_candidate_patterns(),
            items: months,
        };
        let moment_category = CategoryConfig {
            path: "best-photos".to_string(),
            slot_count: DEFAULT_SLOT_COUNT,
            name_hint: "best".to_string(),
            placeholder: PlaceholderStyle { background: "F0F8FF".to_string(), foreground: "667eea".to_string() },
            candidate_patterns: default_candidate_patterns(),
            items: vec![
                SubcategoryItem::new("precious_smiles", "Precious Smiles"),
                SubcategoryItem::new("first_steps", "First Steps"),
                SubcategoryItem::new("family_moments", "Family Moments").with_slot_count(6),
                SubcategoryItem::new("milestone_celebrations", "Milestone Celebrations"),
                SubcategoryItem::new("adorable_poses", "Adorable Poses"),
                SubcategoryItem::new("sweet_dreams", "Sweet Dreams"),
            ],
        };

        let mut categories = HashMap::new();
        categories.insert(CategoryKind::MonthlyJourney, monthly_journey);
        categories.insert(CategoryKind::MomentCategory, moment_category);
        Self {
            bucket_url: DEFAULT_BUCKET_URL.to_string(),
            placeholder_host: DEFAULT_PLACEHOLDER_HOST.to_string(),
            categories,
        }
    }
}

impl Catalog {
    pub fn from_json_str(json: &str) -> Result<Self, GalleryError> {
        let catalog: Catalog = serde_json::from_str(json).map_err(GalleryError::CatalogParseError)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, GalleryError> {
        let json = std::fs::read_to_string(path).map_err(GalleryError::CatalogIOError)?;
        Self::from_json_str(&json)
    }

    fn validate(&self) -> Result<(), GalleryError> {
        if self.bucket_url.trim().is_empty() {
            return Err(GalleryError::InvalidCatalog("bucketUrl is empty".to_string()));
        }
        for (kind, category) in &self.categories {
            if category.path.trim().is_empty() {
                return Err(GalleryError::InvalidCatalog(format!("{kind}: path is empty")));
            }
            let duplicate = category.items.iter().map(|x| &x.key).duplicates().next();
            if let Some(key) = duplicate {
                return Err(GalleryError::InvalidCatalog(format!("{kind}: duplicate key {key}")));
            }
        }
        Ok(())
    }

    pub fn category(&self, kind: CategoryKind) -> Result<&CategoryConfig, GalleryError> {
        self.categories.get(&kind).ok_or(GalleryError::UnknownCategory(kind))
    }

    /// Table key for a display name. Names missing from the table are
    /// lowercased with whitespace runs turned into underscores, so ad hoc
    /// subcategories still land on a predictable bucket path.
    pub fn subcategory_key(&self, kind: CategoryKind, display_name: &str) -> Result<String, GalleryError> {
        let category = self.category(kind)?;
        let key = match category.find_item(display_name) {
            Some(item) => item.key.clone(),
            None => display_name.to_storage_key(),
        };
        Ok(key)
    }

    pub fn target_slot_count(&self, kind: CategoryKind, display_name: &str) -> Result<usize, GalleryError> {
        let category = self.category(kind)?;
        let slots = category.find_item(display_name)
            .and_then(|x| x.slot_count)
            .unwrap_or(category.slot_count);
        Ok(slots)
    }

    pub fn candidate_file_names(&self, kind: CategoryKind, slots: usize) -> Result<Vec<String>, GalleryError> {
        let category = self.category(kind)?;
        let names = category.candidate_patterns.iter()
            .flat_map(|pattern| (1..=slots).map(move |n| {
                pattern.replace("{n}", &n.to_string()).replace("{hint}", &category.name_hint)
            }))
            .unique()
            .collect();
        Ok(names)
    }

    pub fn object_url(&self, kind: CategoryKind, key: &str, file_name: &str) -> Result<String, GalleryError> {
        let storage_path = self.storage_path(kind, key, file_name)?;
        Ok(format!("{}/{}", self.bucket_url.trim_end_matches('/'), storage_path))
    }

    pub fn storage_path(&self, kind: CategoryKind, key: &str, file_name: &str) -> Result<String, GalleryError> {
        let category = self.category(kind)?;
        Ok(format!("{}/{}/{}", category.path.trim_matches('/'), key, file_name))
    }

    /// Where an administrator should upload a real photo for slot `n` (1-based).
    pub fn upload_path(&self, kind: CategoryKind, key: &str, n: usize) -> Result<String, GalleryError> {
        self.storage_path(kind, key, &format!("photo_{n}.jpg"))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn test_subcategory_key_from_table() {
        let catalog = Catalog::default();
        assert_eq!(catalog.subcategory_key(CategoryKind::MonthlyJourney, "Month 3").unwrap(), "month_3");
        assert_eq!(catalog.subcategory_key(CategoryKind::MonthlyJourney, "Newborn").unwrap(), "newborn");
        assert_eq!(catalog.subcategory_key(CategoryKind::MomentCategory, "Sweet Dreams").unwrap(), "sweet_dreams");
    }

    #[test]
    fn test_subcategory_key_fallback() {
        let catalog = Catalog::default();
        assert_eq!(catalog.subcategory_key(CategoryKind::MonthlyJourney, "Month 13").unwrap(), "month_13");
        assert_eq!(catalog.subcategory_key(CategoryKind::MomentCategory, "Bath  Time Fun").unwrap(), "bath_time_fun");
    }

    #[test]
    fn test_target_slot_count() {
        let catalog = Catalog::default();
        assert_eq!(catalog.target_slot_count(CategoryKind::MonthlyJourney, "Month 3").unwrap(), 2);
        assert_eq!(catalog.target_slot_count(CategoryKind::MomentCategory, "Family Moments").unwrap(), 6);
        assert_eq!(catalog.target_slot_count(CategoryKind::MomentCategory, "Unlisted").unwrap(), 2);
    }

    #[test]
    fn test_candidate_order() {
        let catalog = Catalog::default();
        let names = catalog.candidate_file_names(CategoryKind::MonthlyJourney, 2).unwrap();
        assert_eq!(&names[..6], &["photo_1.jpg", "photo_2.jpg", "photo1.jpg", "photo2.jpg", "1.jpg", "2.jpg"]);
        assert!(names.contains(&"kashvi_2.jpg".to_string()));
        assert_eq!(names.last().unwrap(), "image2.jpg");
        assert_eq!(names.len(), DEFAULT_CANDIDATE_PATTERNS.len() * 2);
    }

    #[test]
    fn test_urls_and_paths() {
        let catalog = Catalog::default();
        assert_eq!(
            catalog.object_url(CategoryKind::MonthlyJourney, "month_3", "photo_1.jpg").unwrap(),
            "https://storage.googleapis.com/baby-birthday-photos/baby-journey/month_3/photo_1.jpg"
        );
        assert_eq!(
            catalog.upload_path(CategoryKind::MomentCategory, "first_steps", 2).unwrap(),
            "best-photos/first_steps/photo_2.jpg"
        );
    }

    #[test]
    fn test_unknown_category_is_an_error() {
        let mut catalog = Catalog::default();
        catalog.categories.remove(&CategoryKind::MomentCategory);
        let result = catalog.subcategory_key(CategoryKind::MomentCategory, "First Steps");
        assert!(matches!(result, Err(GalleryError::UnknownCategory(CategoryKind::MomentCategory))));
    }

    #[test]
    fn test_json_roundtrip_and_aliases() {
        let json = r#"{
            "bucketUrl": "https://example.test/bucket",
            "placeholderHost": "https://placeholder.test",
            "categories": {
                "babyJourney": {
                    "path": "journey",
                    "nameHint": "kid",
                    "placeholder": { "background": "000000", "foreground": "FFFFFF" },
                    "items": [{ "key": "m1", "displayName": "Month 1", "slotCount": 3 }]
                }
            }
        }"#;
        let catalog = Catalog::from_json_str(json).unwrap();
        let category = catalog.category(CategoryKind::MonthlyJourney).unwrap();
        assert_eq!(category.slot_count, DEFAULT_SLOT_COUNT);
        assert_eq!(category.candidate_patterns.len(), DEFAULT_CANDIDATE_PATTERNS.len());
        assert_eq!(catalog.target_slot_count(CategoryKind::MonthlyJourney, "Month 1").unwrap(), 3);
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let mut catalog = Catalog::default();
        let category = catalog.categories.get_mut(&CategoryKind::MonthlyJourney).unwrap();
        category.items.push(SubcategoryItem::new("month_1", "Month One"));
        let json = serde_json::to_string(&catalog).unwrap();
        assert!(matches!(Catalog::from_json_str(&json), Err(GalleryError::InvalidCatalog(_))));
    }

    #[test]
    fn test_category_kind_parsing() {
        assert_eq!("bestPhotos".parse::<CategoryKind>().unwrap(), CategoryKind::MomentCategory);
        assert_eq!("monthly-journey".parse::<CategoryKind>().unwrap(), CategoryKind::MonthlyJourney);
        assert!("albums".parse::<CategoryKind>().is_err());
    }
}
