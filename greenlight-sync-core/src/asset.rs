use serde::{Deserialize, Serialize};

/// Asset kinds downloaded for each game and referenced from the gamelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    /// Logo / marquee image shown in wheel-style views
    Logo,
    /// Front box art
    Cover,
    /// Background artwork
    Fanart,
    /// Gameplay or promotional video
    Video,
}

impl AssetKind {
    /// All kinds, in the order they are stored and reported.
    pub const ALL: [AssetKind; 4] = [
        AssetKind::Logo,
        AssetKind::Cover,
        AssetKind::Fanart,
        AssetKind::Video,
    ];

    /// Subdirectory under the assets base directory.
    pub fn subdir(&self) -> &'static str {
        match self {
            AssetKind::Logo => "logos",
            AssetKind::Cover => "covers",
            AssetKind::Fanart => "fanart",
            AssetKind::Video => "videos",
        }
    }

    /// Gamelist tag this kind is written under.
    pub fn gamelist_tag(&self) -> &'static str {
        match self {
            AssetKind::Logo => "marquee",
            AssetKind::Cover => "cover",
            AssetKind::Fanart => "fanart",
            AssetKind::Video => "video",
        }
    }

    /// File extension for this asset kind.
    pub fn extension(&self) -> &'static str {
        match self {
            AssetKind::Video => "mp4",
            _ => "png",
        }
    }

    /// Parse a kind from its CLI/config name. Accepts the subdirectory
    /// name and common singular forms.
    pub fn from_name(name: &str) -> Option<AssetKind> {
        match name {
            "logos" | "logo" | "marquees" | "marquee" => Some(AssetKind::Logo),
            "covers" | "cover" => Some(AssetKind::Cover),
            "fanart" => Some(AssetKind::Fanart),
            "videos" | "video" => Some(AssetKind::Video),
            _ => None,
        }
    }
}

/// Configuration for which asset kinds to download.
#[derive(Debug, Clone)]
pub struct AssetSelection {
    pub kinds: Vec<AssetKind>,
}

impl Default for AssetSelection {
    fn default() -> Self {
        Self {
            kinds: AssetKind::ALL.to_vec(),
        }
    }
}

impl AssetSelection {
    /// Everything except videos (the slow, large downloads).
    pub fn without_videos() -> Self {
        Self {
            kinds: vec![AssetKind::Logo, AssetKind::Cover, AssetKind::Fanart],
        }
    }

    /// Parse from a list of names (e.g., "logos,covers,videos").
    /// Unknown names are ignored.
    pub fn from_names(names: &[String]) -> Self {
        let kinds = names
            .iter()
            .filter_map(|n| AssetKind::from_name(n))
            .collect();
        Self { kinds }
    }

    pub fn contains(&self, kind: AssetKind) -> bool {
        self.kinds.contains(&kind)
    }
}
