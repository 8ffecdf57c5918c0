//! Image Lookup Adapter: best-effort thumbnail enrichment against an
//! external metadata-extraction service. Fire-and-forget — every failure
//! degrades to "no image" and nothing here ever blocks core logic.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// Public microlink.io endpoint the original build queried.
pub const MICROLINK_ENDPOINT: &str = "https://api.microlink.io";

/// Boundary contract for the optional thumbnail lookup.
#[async_trait]
pub trait ImageLookup: Send + Sync {
    /// Resolve a product page URL to an image URL, or `None` when the
    /// lookup fails for any reason.
    async fn fetch_product_image(&self, url: &str) -> Option<String>;
}

/// Client for the microlink metadata API. The base URL is injectable so
/// tests can point it at a stub.
pub struct MicrolinkClient {
    http: reqwest::Client,
    base_url: String,
}

impl MicrolinkClient {
    pub fn new() -> Self {
        Self::with_base_url(MICROLINK_ENDPOINT)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        MicrolinkClient {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for MicrolinkClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageLookup for MicrolinkClient {
    async fn fetch_product_image(&self, url: &str) -> Option<String> {
        if url.trim().is_empty() {
            return None;
        }

        let response = match self
            .http
            .get(&self.base_url)
            .query(&[("url", url)])
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                debug!(
                    target: "liste_achats",
                    event = "image_lookup_failed",
                    error = %err,
                );
                return None;
            }
        };

        if !response.status().is_success() {
            debug!(
                target: "liste_achats",
                event = "image_lookup_status",
                status = %response.status(),
            );
            return None;
        }

        let body: Value = response.json().await.ok()?;
        body.get("data")?
            .get("image")?
            .get("url")?
            .as_str()
            .map(str::to_string)
    }
}

/// Token counter guarding a draft or item against stale lookup results.
///
/// Every new edit (or new lookup) calls [`Generation::begin`], which
/// invalidates all previously issued tokens. A background completion only
/// applies its result if its token is still current, so a slow response
/// can never overwrite a newer edit.
#[derive(Debug, Default)]
pub struct Generation(AtomicU64);

impl Generation {
    /// Start a new generation and return its token.
    pub fn begin(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether `token` is still the latest generation.
    pub fn is_current(&self, token: u64) -> bool {
        self.0.load(Ordering::SeqCst) == token
    }
}
