use std::error::Error;
use std::time::Duration;
use log::{debug, warn};
use reqwest::{Client, ClientBuilder, StatusCode};
use reqwest::header::CACHE_CONTROL;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Found,
    NotFound,
    /// The store could not be asked, e.g. the request was blocked by a
    /// cross-origin policy on the public bucket.
    Indeterminate,
}

impl ProbeOutcome {
    /// Indeterminate counts as found: a bucket that refuses cross-origin
    /// checks still serves its images to the page, so a blocked check means
    /// "probably there" and hiding it behind a placeholder would hide real
    /// content.
    pub fn counts_as_found(self) -> bool {
        matches!(self, ProbeOutcome::Found | ProbeOutcome::Indeterminate)
    }
}

#[async_trait::async_trait]
pub trait ObjectProbe: Send + Sync {
    async fn probe(&self, url: &str, timeout: Duration) -> ProbeOutcome;
}

#[derive(Clone)]
pub struct HttpProbe {
    http_client: Client,
    max_retries: u32,
    retry_backoff: Duration,
}

impl HttpProbe {
    pub fn new(max_retries: u32, retry_backoff: Duration) -> anyhow::Result<Self> {
        let http_client = ClientBuilder::new()
            .use_rustls_tls()
            .build()?;
        Ok(Self { http_client, max_retries, retry_backoff })
    }
}

#[async_trait::async_trait]
impl ObjectProbe for HttpProbe {
    async fn probe(&self, url: &str, timeout: Duration) -> ProbeOutcome {
        let mut attempt = 0;
        loop {
            let result = self.http_client.head(url)
                .header(CACHE_CONTROL, "no-cache")
                .timeout(timeout)
                .send()
                .await;
            let e = match result {
                Ok(response) => {
                    let outcome = classify_status(response.status());
                    debug!("probe {} -> {} ({:?})", url, response.status(), outcome);
                    return outcome;
                }
                Err(e) => e.without_url(),
            };
            if mentions_cross_origin(&e) {
                debug!("probe {} blocked by cross-origin policy, assuming present", url);
                return ProbeOutcome::Indeterminate;
            }
            if e.is_timeout() {
                debug!("probe {} timed out after {:?}", url, timeout);
                return ProbeOutcome::NotFound;
            }
            if e.is_connect() && attempt < self.max_retries {
                attempt += 1;
                debug!("probe {} failed to connect (attempt {}): {}", url, attempt, e);
                tokio::time::sleep(self.retry_backoff).await;
                continue;
            }
            warn!("probe {} failed: {}", url, e);
            return ProbeOutcome::NotFound;
        }
    }
}

pub fn classify_status(status: StatusCode) -> ProbeOutcome {
    if status.is_success() {
        ProbeOutcome::Found
    } else {
        ProbeOutcome::NotFound
    }
}

const CROSS_ORIGIN_PHRASES: [&str; 4] = [
    "cors policy",
    "cors request",
    "cross-origin request blocked",
    "cross-origin resource sharing",
];

/// Looks for a cross-origin rejection anywhere in the source chain. Messages
/// must not carry the request URL, or a path like `corsica_trip` would match.
pub fn mentions_cross_origin(err: &(dyn Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        let message = e.to_string().to_lowercase();
        if CROSS_ORIGIN_PHRASES.iter().any(|x| message.contains(x)) {
            return true;
        }
        current = e.source();
    }
    false
}
