use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::time::Duration;

use greenlight_sync_core::CatalogEntry;

use crate::CatalogSource;
use crate::error::CatalogError;
use crate::types::{self, ProductsResponse, SiglsItem};

const SIGLS_URL: &str = "https://catalog.gamepass.com/sigls/v2";
const PRODUCTS_URL: &str = "https://displaycatalog.mp.microsoft.com/v7.0/products";

/// Collection id of the streamable Game Pass catalog in the sigls feed.
const GAME_PASS_COLLECTION: &str = "fdd9e2a7-0fee-49f6-ad69-4354098401ff";

/// Correlation vector the display-catalog endpoint expects on every call.
const MS_CV: &str = "DGU1mcuYo0WMMp+F.1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Options for [`CatalogClient`].
#[derive(Debug, Clone)]
pub struct CatalogClientOptions {
    /// Storefront market (e.g., "GB", "US").
    pub market: String,
    /// Language for titles and descriptions (e.g., "en-us").
    pub language: String,
    /// sigls collection id to enumerate.
    pub collection_id: String,
    /// Process-wide cap on concurrent asset downloads.
    pub max_inflight: usize,
}

impl Default for CatalogClientOptions {
    fn default() -> Self {
        Self {
            market: "GB".to_string(),
            language: "en-us".to_string(),
            collection_id: GAME_PASS_COLLECTION.to_string(),
            max_inflight: 8,
        }
    }
}

/// HTTP client for the Game Pass catalog endpoints.
///
/// The catalog is fetched in two phases: the sigls feed yields the ids of
/// every streamable title, then the display-catalog batch endpoint yields
/// per-title metadata and media URLs. Asset downloads share one semaphore
/// so total in-flight requests stay bounded regardless of worker count.
pub struct CatalogClient {
    http: reqwest::Client,
    options: CatalogClientOptions,
    inflight: Arc<Semaphore>,
}

impl CatalogClient {
    pub fn new(options: CatalogClientOptions) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let inflight = Arc::new(Semaphore::new(options.max_inflight.max(1)));
        Ok(Self {
            http,
            options,
            inflight,
        })
    }

    /// Phase 1: enumerate the ids of every game in the collection.
    async fn fetch_ids(&self) -> Result<Vec<String>, CatalogError> {
        let resp = self
            .http
            .get(SIGLS_URL)
            .query(&[
                ("id", self.options.collection_id.as_str()),
                ("language", self.options.language.as_str()),
                ("market", self.options.market.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
            });
        }

        let items: Vec<SiglsItem> = resp
            .json()
            .await
            .map_err(|e| CatalogError::Parse(format!("id feed: {e}")))?;
        let ids: Vec<String> = items.into_iter().filter_map(|item| item.id).collect();

        // An empty feed means a provider glitch, not an emptied catalog.
        // Surfacing it as a parse error keeps a bad response from wiping
        // the local library with a remove-everything plan.
        if ids.is_empty() {
            return Err(CatalogError::Parse(
                "id feed contained no game ids".to_string(),
            ));
        }
        Ok(ids)
    }

    /// Phase 2: batch-fetch metadata for the given product ids.
    async fn fetch_products(&self, ids: &[String]) -> Result<Vec<CatalogEntry>, CatalogError> {
        let big_ids = ids.join(",");
        let resp = self
            .http
            .get(PRODUCTS_URL)
            .query(&[
                ("bigIds", big_ids.as_str()),
                ("market", self.options.market.as_str()),
                ("languages", self.options.language.as_str()),
                ("MS-CV", MS_CV),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
            });
        }

        let products: ProductsResponse = resp
            .json()
            .await
            .map_err(|e| CatalogError::Parse(format!("products: {e}")))?;

        let mut entries: Vec<CatalogEntry> = products
            .products
            .into_iter()
            .filter_map(types::entry_from_product)
            .collect();

        // The batch endpoint does not preserve request order; sort for a
        // deterministic catalog sequence across runs.
        entries.sort_by(|a, b| a.sort_title.cmp(&b.sort_title).then(a.id.cmp(&b.id)));
        Ok(entries)
    }
}

impl CatalogSource for CatalogClient {
    async fn fetch(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        let ids = self.fetch_ids().await?;
        log::debug!("Catalog id feed listed {} games", ids.len());
        let entries = self.fetch_products(&ids).await?;
        if entries.len() < ids.len() {
            log::debug!(
                "{} of {} catalog products lacked an id or title and were skipped",
                ids.len() - entries.len(),
                ids.len(),
            );
        }
        Ok(entries)
    }

    async fn fetch_asset(&self, url: &str) -> Result<Vec<u8>, CatalogError> {
        // The semaphore is never closed, so acquire can't fail in practice.
        let _permit = self.inflight.acquire().await.ok();

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
            });
        }
        let bytes = resp.bytes().await?;
        Ok(bytes.to_vec())
    }
}
