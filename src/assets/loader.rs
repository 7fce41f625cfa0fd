use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt as _;

use crate::assets::cache::{CacheStats, SingleFlightCache};
use crate::assets::data_url::decode_data_url;
use crate::assets::decode::{DecodedImage, decode_image};
use crate::assets::reference::AssetRef;
use crate::assets::system_font::find_system_font;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Why an asset could not be made ready to draw.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// Transport-level failure.
    #[error("network error: {0}")]
    Network(String),
    /// Non-success HTTP status.
    #[error("http error: status {status}")]
    Http {
        /// Response status code.
        status: u16,
    },
    /// The fetch exceeded [`LoaderConfig::timeout`].
    #[error("timed out")]
    Timeout,
    /// The reference cannot be fetched as written.
    #[error("invalid reference: {0}")]
    InvalidReference(String),
    /// Local file read failure.
    #[error("io error: {0}")]
    Io(String),
    /// Bytes were fetched but are not a decodable image.
    #[error("decode error: {0}")]
    Decode(String),
    /// The load was abandoned before completing, e.g. the runtime shut down under it.
    #[error("cancelled")]
    Cancelled,
    /// No template font and no usable system font.
    #[error("no system font available")]
    NoSystemFont,
}

impl LoadError {
    fn from_join(err: tokio::task::JoinError, what: &str) -> Self {
        if err.is_cancelled() {
            LoadError::Cancelled
        } else {
            LoadError::Decode(format!("{what} task panicked"))
        }
    }
}

impl From<reqwest::Error> for LoadError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return LoadError::Timeout;
        }
        if let Some(status) = err.status() {
            return LoadError::Http {
                status: status.as_u16(),
            };
        }
        LoadError::Network(err.to_string())
    }
}

/// Loader configuration.
#[derive(Clone, Debug)]
pub struct LoaderConfig {
    /// Upper bound for one remote fetch. `ADFRAME_FETCH_TIMEOUT_MS` overrides the default.
    pub timeout: Duration,
    /// User agent sent with remote fetches.
    pub user_agent: String,
    /// Directory that [`AssetRef::File`] paths are resolved against.
    pub assets_root: PathBuf,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        let timeout = std::env::var("ADFRAME_FETCH_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_TIMEOUT);
        Self {
            timeout,
            user_agent: format!("adframe/{}", env!("CARGO_PKG_VERSION")),
            assets_root: PathBuf::from("."),
        }
    }
}

impl LoaderConfig {
    /// Return a config rooted at `root` for file references.
    pub fn with_assets_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.assets_root = root.into();
        self
    }
}

/// Source of raw asset bytes.
///
/// Implementations must resolve every call exactly once (success or error).
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Fetch the encoded bytes behind `asset`.
    async fn fetch(&self, asset: &AssetRef) -> Result<Vec<u8>, LoadError>;
}

/// Fetcher for remote URLs (`reqwest`), `data:` URLs and files under the assets root.
pub struct DefaultFetcher {
    client: reqwest::Client,
    config: LoaderConfig,
}

impl DefaultFetcher {
    /// Build a fetcher with its own HTTP client.
    pub fn new(config: LoaderConfig) -> Result<Self, LoadError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| LoadError::Network(format!("build http client: {e}")))?;
        Ok(Self { client, config })
    }

    async fn fetch_remote(&self, url: &url::Url) -> Result<Vec<u8>, LoadError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Http {
                status: status.as_u16(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl AssetFetcher for DefaultFetcher {
    async fn fetch(&self, asset: &AssetRef) -> Result<Vec<u8>, LoadError> {
        match asset {
            AssetRef::Remote(url) => {
                tokio::time::timeout(self.config.timeout, self.fetch_remote(url))
                    .await
                    .map_err(|_| LoadError::Timeout)?
            }
            AssetRef::Inline(data) => decode_data_url(data).map(|p| p.bytes),
            AssetRef::File(rel) => {
                let path = self.config.assets_root.join(rel);
                tokio::fs::read(&path)
                    .await
                    .map_err(|e| LoadError::Io(format!("read '{}': {e}", path.display())))
            }
        }
    }
}

/// Resolves asset references into ready-to-draw images and font bytes.
///
/// Clones share one fetcher and one content-addressed cache. Concurrent requests for the same
/// reference join a single in-flight fetch; successful results are reused by later render passes.
#[derive(Clone)]
pub struct AssetLoader {
    fetcher: Arc<dyn AssetFetcher>,
    images: Arc<SingleFlightCache<Arc<DecodedImage>>>,
    fonts: Arc<SingleFlightCache<Arc<Vec<u8>>>>,
    system_font: Arc<tokio::sync::OnceCell<Result<Arc<Vec<u8>>, LoadError>>>,
}

impl AssetLoader {
    /// Create a loader over a custom fetcher.
    pub fn new(fetcher: Arc<dyn AssetFetcher>) -> Self {
        Self {
            fetcher,
            images: Arc::new(SingleFlightCache::new()),
            fonts: Arc::new(SingleFlightCache::new()),
            system_font: Arc::new(tokio::sync::OnceCell::new()),
        }
    }

    /// Create a loader over [`DefaultFetcher`].
    pub fn with_config(config: LoaderConfig) -> Result<Self, LoadError> {
        Ok(Self::new(Arc::new(DefaultFetcher::new(config)?)))
    }

    /// Load and decode an image.
    #[tracing::instrument(skip_all, fields(kind = asset.kind(), asset = %asset))]
    pub async fn load(&self, asset: &AssetRef) -> Result<Arc<DecodedImage>, LoadError> {
        let fetcher = Arc::clone(&self.fetcher);
        let owned = asset.clone();
        let out = self
            .images
            .get_or_load(asset, move || {
                async move {
                    let bytes = fetcher.fetch(&owned).await?;
                    let decoded = tokio::task::spawn_blocking(move || decode_image(&bytes))
                        .await
                        .map_err(|e| LoadError::from_join(e, "decode"))??;
                    tracing::debug!(
                        width = decoded.width,
                        height = decoded.height,
                        "decoded image"
                    );
                    Ok::<_, LoadError>(Arc::new(decoded))
                }
                .boxed()
            })
            .await;
        if let Err(e) = &out {
            tracing::warn!(error = %e, "image load failed");
        }
        out
    }

    /// Load raw font bytes.
    #[tracing::instrument(skip_all, fields(kind = asset.kind(), asset = %asset))]
    pub async fn load_font(&self, asset: &AssetRef) -> Result<Arc<Vec<u8>>, LoadError> {
        let fetcher = Arc::clone(&self.fetcher);
        let owned = asset.clone();
        let out = self
            .fonts
            .get_or_load(asset, move || {
                async move {
                    let bytes = fetcher.fetch(&owned).await?;
                    if bytes.is_empty() {
                        return Err(LoadError::Decode("font file is empty".to_owned()));
                    }
                    Ok::<_, LoadError>(Arc::new(bytes))
                }
                .boxed()
            })
            .await;
        if let Err(e) = &out {
            tracing::warn!(error = %e, "font load failed");
        }
        out
    }

    /// Fallback face for templates that name no font.
    ///
    /// Resolved once per loader (including failure) with [`find_system_font`].
    pub async fn default_font(&self) -> Result<Arc<Vec<u8>>, LoadError> {
        self.system_font
            .get_or_init(|| async {
                let out = tokio::task::spawn_blocking(find_system_font)
                    .await
                    .map_err(|e| LoadError::from_join(e, "font lookup"))
                    .and_then(|r| r)
                    .map(Arc::new);
                if let Err(e) = &out {
                    tracing::warn!(error = %e, "no fallback font, text layers will be skipped");
                }
                out
            })
            .await
            .clone()
    }

    /// Drop a cached image or font for `asset`. Returns `true` if anything was cached.
    pub fn evict(&self, asset: &AssetRef) -> bool {
        let a = self.images.evict(asset);
        let b = self.fonts.evict(asset);
        a || b
    }

    /// Drop every cached asset.
    pub fn clear_cache(&self) {
        self.images.clear();
        self.fonts.clear();
    }

    /// Number of cached (or in-flight) fonts.
    pub fn cached_fonts(&self) -> usize {
        self.fonts.len()
    }

    /// Number of cached (or in-flight) images.
    pub fn cached_images(&self) -> usize {
        self.images.len()
    }

    /// Image cache counters.
    pub fn image_stats(&self) -> CacheStats {
        self.images.stats()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
