use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use super::*;

fn entry(id: &str, title: &str) -> CatalogEntry {
    CatalogEntry {
        id: id.to_string(),
        title: title.to_string(),
        sort_title: title.to_string(),
        release_date: None,
        description: None,
        developer: None,
        logo_url: None,
        cover_url: None,
        fanart_url: None,
        video_url: None,
    }
}

fn record_for(e: &CatalogEntry) -> LocalGameRecord {
    LocalGameRecord::from_entry(e, BTreeMap::new(), PathBuf::from(format!("/tmp/{}.sh", e.id)))
}

fn state(entries: &[CatalogEntry]) -> BTreeMap<String, LocalGameRecord> {
    entries
        .iter()
        .map(|e| (e.id.clone(), record_for(e)))
        .collect()
}

#[test]
fn empty_state_adds_everything() {
    let entries = vec![entry("g1", "A"), entry("g2", "B")];
    let plan = compute_plan(&entries, &BTreeMap::new(), &HashSet::new());
    assert_eq!(plan.to_add, vec!["g1", "g2"]);
    assert!(plan.to_update.is_empty());
    assert!(plan.to_remove.is_empty());
    assert_eq!(plan.work_len(), 2);
}

#[test]
fn unchanged_catalog_yields_empty_plan() {
    let entries = vec![entry("g1", "A"), entry("g2", "B")];
    let existing = state(&entries);
    let plan = compute_plan(&entries, &existing, &HashSet::new());
    assert!(plan.is_empty());
}

#[test]
fn disappeared_ids_are_removed() {
    let old = vec![entry("g1", "A"), entry("g2", "B")];
    let existing = state(&old);
    let new = vec![entry("g1", "A")];
    let plan = compute_plan(&new, &existing, &HashSet::new());
    assert!(plan.to_add.is_empty());
    assert!(plan.to_update.is_empty());
    assert_eq!(plan.to_remove, vec!["g2"]);
}

#[test]
fn changed_fingerprint_updates() {
    let old = vec![entry("g1", "A")];
    let existing = state(&old);
    let mut changed = entry("g1", "A");
    changed.title = "A: Remastered".to_string();
    let plan = compute_plan(&[changed], &existing, &HashSet::new());
    assert_eq!(plan.to_update, vec!["g1"]);
    assert!(plan.to_add.is_empty());
    assert!(plan.to_remove.is_empty());
}

#[test]
fn sets_are_disjoint_across_arbitrary_diff() {
    // C1 = {g1, g2, g3}, C2 = {g2 (changed), g3 (same), g4}
    let c1 = vec![entry("g1", "A"), entry("g2", "B"), entry("g3", "C")];
    let existing = state(&c1);
    let mut g2 = entry("g2", "B");
    g2.developer = Some("Somebody".to_string());
    let c2 = vec![g2, entry("g3", "C"), entry("g4", "D")];

    let plan = compute_plan(&c2, &existing, &HashSet::new());
    assert_eq!(plan.to_add, vec!["g4"]);
    assert_eq!(plan.to_update, vec!["g2"]);
    assert_eq!(plan.to_remove, vec!["g1"]);

    let mut all: Vec<&String> = plan
        .to_add
        .iter()
        .chain(&plan.to_update)
        .chain(&plan.to_remove)
        .collect();
    all.sort();
    all.dedup();
    assert_eq!(all.len(), 3, "an id appeared in more than one set");
}

#[test]
fn refresh_forces_update_despite_matching_fingerprint() {
    let entries = vec![entry("g1", "A"), entry("g2", "B")];
    let existing = state(&entries);
    let refresh: HashSet<String> = ["g2".to_string()].into();
    let plan = compute_plan(&entries, &existing, &refresh);
    assert!(plan.to_add.is_empty());
    assert_eq!(plan.to_update, vec!["g2"]);
}

#[test]
fn refresh_of_unknown_id_has_no_effect() {
    let entries = vec![entry("g1", "A")];
    let refresh: HashSet<String> = ["g9".to_string()].into();
    let plan = compute_plan(&entries, &BTreeMap::new(), &refresh);
    assert_eq!(plan.to_add, vec!["g1"]);
    assert!(plan.to_update.is_empty());
}
