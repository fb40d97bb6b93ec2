use std::path::Path;

use tempfile::TempDir;

use greenlight_sync_core::CatalogEntry;

use super::*;

#[test]
fn asset_path_layout() {
    let base = Path::new("/data/assets");
    assert_eq!(
        asset_path(base, AssetKind::Logo, "g1"),
        Path::new("/data/assets/logos/g1.png")
    );
    assert_eq!(
        asset_path(base, AssetKind::Video, "g1"),
        Path::new("/data/assets/videos/g1.mp4")
    );
}

#[test]
fn clean_assets_removes_only_named_kinds() {
    let tmp = TempDir::new().unwrap();

    let logo = tmp.path().join("logos").join("g1.png");
    let video = tmp.path().join("videos").join("g1.mp4");
    std::fs::create_dir_all(logo.parent().unwrap()).unwrap();
    std::fs::create_dir_all(video.parent().unwrap()).unwrap();
    std::fs::write(&logo, b"png").unwrap();
    std::fs::write(&video, b"mp4").unwrap();

    let entry = CatalogEntry {
        id: "g1".to_string(),
        title: "Game".to_string(),
        sort_title: "Game".to_string(),
        release_date: None,
        description: None,
        developer: None,
        logo_url: None,
        cover_url: None,
        fanart_url: None,
        video_url: None,
    };
    let mut asset_paths = BTreeMap::new();
    asset_paths.insert(AssetKind::Logo, logo.clone());
    asset_paths.insert(AssetKind::Video, video.clone());
    let record = LocalGameRecord::from_entry(&entry, asset_paths, tmp.path().join("g1.sh"));

    let mut records = BTreeMap::new();
    records.insert("g1".to_string(), record);

    let removed = clean_assets(&records, &[AssetKind::Video]);
    assert_eq!(removed, 1);
    assert!(logo.exists());
    assert!(!video.exists());

    // Cleaning again is a quiet no-op
    assert_eq!(clean_assets(&records, &[AssetKind::Video]), 0);
}
