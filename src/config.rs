use std::path::PathBuf;
use std::time::Duration;
use clap::Args;
use log::{info, LevelFilter};
use crate::catalog::Catalog;
use crate::client::ClientConfig;

#[derive(Args, Debug)]
pub struct FlatConfig {
    #[arg(long, env = "MILESTONE_CATALOG", help = "JSON file replacing the built-in gallery table")]
    catalog: Option<PathBuf>,

    #[arg(long, env = "MILESTONE_BUCKET_URL", help = "Public base URL of the photo bucket")]
    bucket_url: Option<String>,

    #[arg(long, env = "MILESTONE_STORE_PATH", help = "Document log file for likes [default: ~/.milestone/documents.jsonl]")]
    store_path: Option<PathBuf>,

    #[arg(long, env = "MILESTONE_PROBE_TIMEOUT", default_value = "5s", help = "Timeout of one photo existence check")]
    probe_timeout: humantime::Duration,

    #[arg(long, env = "MILESTONE_PROBE_RETRIES", default_value_t = 1, help = "Retries after a failed connection")]
    probe_retries: u32,

    #[arg(long, env = "MILESTONE_PROBE_BACKOFF", default_value = "200ms", help = "Pause between connection retries")]
    probe_backoff: humantime::Duration,

    #[arg(long, env = "MILESTONE_STORE_TIMEOUT", default_value = "10s", help = "Timeout of one document store call")]
    store_timeout: humantime::Duration,

    #[arg(long, env = "MILESTONE_LOG", default_value = "info", help = "Log level (off, error, warn, info, debug, trace)")]
    log_level: String,
}

#[derive(Debug)]
pub struct Config {
    pub gallery: GalleryConfiguration,
    pub probe: ProbeConfiguration,
    pub store: StoreConfiguration,
    pub log_level: LevelFilter,
}

#[derive(Debug)]
pub struct GalleryConfiguration {
    pub catalog_path: Option<PathBuf>, // MILESTONE_CATALOG
    pub bucket_url: Option<String>, // MILESTONE_BUCKET_URL
}

#[derive(Debug)]
pub struct ProbeConfiguration {
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

#[derive(Debug)]
pub struct StoreConfiguration {
    pub path: PathBuf, // MILESTONE_STORE_PATH
    pub timeout: Duration,
}

impl From<FlatConfig> for Config {
    fn from(value: FlatConfig) -> Self {
        Config {
            gallery: GalleryConfiguration {
                catalog_path: value.catalog,
                bucket_url: value.bucket_url,
            },
            probe: ProbeConfiguration {
                timeout: value.probe_timeout.into(),
                max_retries: value.probe_retries,
                retry_backoff: value.probe_backoff.into(),
            },
            store: StoreConfiguration {
                path: value.store_path.unwrap_or_else(default_store_path),
                timeout: value.store_timeout.into(),
            },
            log_level: value.log_level.parse().unwrap_or(LevelFilter::Info),
        }
    }
}

fn default_store_path() -> PathBuf {
    home::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".milestone")
        .join("documents.jsonl")
}

impl Config {
    pub fn load_catalog(&self) -> anyhow::Result<Catalog> {
        let mut catalog = match &self.gallery.catalog_path {
            Some(path) => {
                info!("catalog: {}", path.display());
                Catalog::from_json_file(path)?
            }
            None => Catalog::default(),
        };
        if let Some(bucket_url) = &self.gallery.bucket_url {
            catalog.bucket_url = bucket_url.clone();
        }
        info!("bucket: {}", catalog.bucket_url);
        Ok(catalog)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            probe_timeout: self.probe.timeout,
            store_timeout: self.store.timeout,
        }
    }
}
