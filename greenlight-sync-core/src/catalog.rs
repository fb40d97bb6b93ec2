use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::asset::AssetKind;

/// A single game from the remote catalog.
///
/// Immutable once fetched; one per remote game per sync pass. The media
/// URLs are optional — many titles ship without a video, some without a
/// logo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Stable provider product id (e.g., "9NBLGGH4TNMP"), unique per game.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Title used for alphabetical ordering (leading article stripped).
    pub sort_title: String,
    /// Release date normalized to YYYYMMDD, when the provider has one.
    pub release_date: Option<String>,
    /// Short description shown in the frontend.
    pub description: Option<String>,
    /// Developer name.
    pub developer: Option<String>,
    pub logo_url: Option<String>,
    pub cover_url: Option<String>,
    pub fanart_url: Option<String>,
    pub video_url: Option<String>,
}

impl CatalogEntry {
    /// The media URL for an asset kind, if the catalog has one.
    pub fn url_for(&self, kind: AssetKind) -> Option<&str> {
        match kind {
            AssetKind::Logo => self.logo_url.as_deref(),
            AssetKind::Cover => self.cover_url.as_deref(),
            AssetKind::Fanart => self.fanart_url.as_deref(),
            AssetKind::Video => self.video_url.as_deref(),
        }
    }

    /// Content fingerprint over every field, used to detect metadata
    /// changes without re-downloading unchanged assets.
    ///
    /// Fields are fed to the digest in a fixed order with a separator
    /// byte between them, so shifting content between adjacent fields
    /// cannot produce a collision.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha1::new();
        for field in [
            Some(self.id.as_str()),
            Some(self.title.as_str()),
            Some(self.sort_title.as_str()),
            self.release_date.as_deref(),
            self.description.as_deref(),
            self.developer.as_deref(),
            self.logo_url.as_deref(),
            self.cover_url.as_deref(),
            self.fanart_url.as_deref(),
            self.video_url.as_deref(),
        ] {
            hasher.update([field.is_some() as u8]);
            hasher.update(field.unwrap_or("").as_bytes());
            hasher.update([0u8]);
        }
        format!("{:x}", hasher.finalize())
    }
}
