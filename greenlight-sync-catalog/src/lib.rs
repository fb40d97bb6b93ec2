//! Catalog fetcher for the Xbox cloud-gaming game list.
//!
//! Talks to the public Game Pass catalog endpoints (the id feed plus the
//! display-catalog batch endpoint), maps the provider's wire format into
//! [`CatalogEntry`] values and caches the mapped result on disk so
//! repeated syncs within a day don't hammer the provider.

pub mod cache;
pub mod client;
pub mod error;
pub mod types;

pub use cache::CatalogCache;
pub use client::{CatalogClient, CatalogClientOptions};
pub use error::CatalogError;

use greenlight_sync_core::CatalogEntry;

/// Seam between the sync engine and the remote provider.
///
/// The engine only ever sees the full entry list and raw asset bytes;
/// the provider's two-phase fetch and response shape stay behind this
/// trait, and tests substitute an in-memory source.
#[allow(async_fn_in_trait)]
pub trait CatalogSource {
    /// Fetch the complete current catalog. No diffing happens here.
    async fn fetch(&self) -> Result<Vec<CatalogEntry>, CatalogError>;

    /// Download one media asset, returning its raw bytes.
    async fn fetch_asset(&self, url: &str) -> Result<Vec<u8>, CatalogError>;
}
