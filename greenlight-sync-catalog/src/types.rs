//! Wire types for the Game Pass catalog endpoints.
//!
//! The provider's schema is versioned externally; everything here is
//! `Option`-heavy on purpose so a missing field degrades to a sparse
//! [`CatalogEntry`] instead of a parse failure.

use chrono::NaiveDate;
use serde::Deserialize;

use greenlight_sync_core::CatalogEntry;

/// One item of the sigls id feed. The feed's first element is a metadata
/// blob without an `id` key and is skipped.
#[derive(Debug, Deserialize)]
pub struct SiglsItem {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductsResponse {
    #[serde(default)]
    pub products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Product {
    pub product_id: Option<String>,
    #[serde(default)]
    pub localized_properties: Vec<LocalizedProperties>,
    #[serde(default)]
    pub market_properties: Vec<MarketProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LocalizedProperties {
    pub product_title: Option<String>,
    pub short_description: Option<String>,
    pub developer_name: Option<String>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(rename = "CMSVideos", default)]
    pub cms_videos: Vec<CmsVideo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductImage {
    pub image_purpose: Option<String>,
    pub uri: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CmsVideo {
    #[serde(rename = "DASH")]
    pub dash: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MarketProperties {
    pub original_release_date: Option<String>,
}

/// Map one product into a [`CatalogEntry`].
///
/// Returns `None` for products without an id or title — those can't be
/// synced or displayed. Image purposes map as the provider uses them:
/// `Logo` is the marquee (with `Poster` backfilling a missing logo),
/// `Poster` is the box cover (`BoxArt` as fallback), `TitledHeroArt` is
/// the fanart with `SuperHeroArt` as fallback.
pub fn entry_from_product(product: Product) -> Option<CatalogEntry> {
    let id = product.product_id?;
    let localized = product.localized_properties.into_iter().next()?;
    let title = localized.product_title?;

    let mut logo = None;
    let mut poster = None;
    let mut box_art = None;
    let mut titled_hero = None;
    let mut super_hero = None;
    for image in localized.images {
        let Some(uri) = image.uri else { continue };
        match image.image_purpose.as_deref() {
            Some("Logo") => logo = Some(uri),
            Some("Poster") => poster = Some(uri),
            Some("BoxArt") => box_art = Some(uri),
            Some("TitledHeroArt") => titled_hero = Some(uri),
            Some("SuperHeroArt") => super_hero = Some(uri),
            _ => {}
        }
    }

    let video = localized.cms_videos.into_iter().find_map(|v| v.dash);

    let release_date = product
        .market_properties
        .into_iter()
        .next()
        .and_then(|m| m.original_release_date)
        .and_then(|d| normalize_release_date(&d));

    Some(CatalogEntry {
        sort_title: sort_title_for(&title),
        title,
        id,
        release_date,
        description: localized.short_description,
        developer: localized.developer_name,
        logo_url: logo.or_else(|| poster.clone()).map(normalize_url),
        cover_url: poster.or(box_art).map(normalize_url),
        fanart_url: titled_hero.or(super_hero).map(normalize_url),
        video_url: video.map(normalize_url),
    })
}

/// The provider serves protocol-relative image URLs.
fn normalize_url(url: String) -> String {
    if let Some(rest) = url.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        url
    }
}

/// Normalize an ISO-8601 release date to YYYYMMDD. Unparsable dates are
/// dropped rather than surfaced as errors.
pub fn normalize_release_date(raw: &str) -> Option<String> {
    let date_part = raw.split('T').next()?;
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(date) => Some(date.format("%Y%m%d").to_string()),
        Err(e) => {
            log::debug!("Unparsable release date '{}': {}", raw, e);
            None
        }
    }
}

/// Sort title: the display title with a leading English article dropped.
pub fn sort_title_for(title: &str) -> String {
    for article in ["The ", "A ", "An "] {
        if let Some(rest) = title.strip_prefix(article) {
            if !rest.is_empty() {
                return rest.to_string();
            }
        }
    }
    title.to_string()
}

#[cfg(test)]
#[path = "tests/types_tests.rs"]
mod tests;
