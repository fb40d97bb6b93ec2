use std::time::Duration;

use tempfile::TempDir;

use greenlight_sync_catalog::CatalogCache;
use greenlight_sync_core::CatalogEntry;

fn entry(id: &str) -> CatalogEntry {
    CatalogEntry {
        id: id.to_string(),
        title: format!("Game {id}"),
        sort_title: format!("Game {id}"),
        release_date: None,
        description: None,
        developer: None,
        logo_url: None,
        cover_url: None,
        fanart_url: None,
        video_url: None,
    }
}

#[test]
fn roundtrips_within_ttl() {
    let tmp = TempDir::new().unwrap();
    let cache = CatalogCache::new(tmp.path().join("catalog-cache.json"), Duration::from_secs(600));

    assert!(cache.load_fresh().is_none(), "empty cache must miss");

    let entries = vec![entry("g1"), entry("g2")];
    cache.store(&entries).unwrap();
    assert_eq!(cache.load_fresh().unwrap(), entries);
}

#[test]
fn zero_ttl_is_always_stale() {
    let tmp = TempDir::new().unwrap();
    let cache = CatalogCache::new(tmp.path().join("catalog-cache.json"), Duration::ZERO);
    cache.store(&[entry("g1")]).unwrap();
    assert!(cache.load_fresh().is_none());
}

#[test]
fn corrupt_cache_is_a_miss_not_an_error() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("catalog-cache.json");
    std::fs::write(&path, "{not json").unwrap();
    let cache = CatalogCache::new(&path, Duration::from_secs(600));
    assert!(cache.load_fresh().is_none());
}

#[test]
fn store_creates_parent_dirs_and_leaves_no_temp_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("nested").join("dir").join("catalog-cache.json");
    let cache = CatalogCache::new(&path, Duration::from_secs(600));
    cache.store(&[entry("g1")]).unwrap();
    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());
}
