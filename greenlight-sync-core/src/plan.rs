use std::collections::{BTreeMap, HashSet};

use crate::catalog::CatalogEntry;
use crate::record::LocalGameRecord;

/// The add/update/remove diff computed at the start of each sync run.
///
/// The three sets are disjoint: every id appears in exactly one of them
/// or in none (unchanged). Discarded after the run completes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    /// Ids present remotely but not locally, in catalog order.
    pub to_add: Vec<String>,
    /// Ids present on both sides whose fingerprint differs (or that were
    /// explicitly marked for refresh), in catalog order.
    pub to_update: Vec<String>,
    /// Ids present locally but gone from the remote catalog, sorted.
    pub to_remove: Vec<String>,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_update.is_empty() && self.to_remove.is_empty()
    }

    /// Number of games that need downloading (adds plus updates).
    pub fn work_len(&self) -> usize {
        self.to_add.len() + self.to_update.len()
    }
}

/// Diff the fetched catalog against the persisted records.
///
/// `refresh` lists ids that must be re-synced even when their fingerprint
/// matches — the orchestrator puts games with missing local files (and
/// force-redownload targets) there.
pub fn compute_plan(
    entries: &[CatalogEntry],
    existing: &BTreeMap<String, LocalGameRecord>,
    refresh: &HashSet<String>,
) -> SyncPlan {
    let mut plan = SyncPlan::default();
    let mut seen: HashSet<&str> = HashSet::with_capacity(entries.len());

    for entry in entries {
        seen.insert(entry.id.as_str());
        match existing.get(&entry.id) {
            None => plan.to_add.push(entry.id.clone()),
            Some(record) => {
                if record.last_synced_hash != entry.fingerprint()
                    || refresh.contains(&entry.id)
                {
                    plan.to_update.push(entry.id.clone());
                }
            }
        }
    }

    // BTreeMap iteration keeps removals sorted by id.
    for id in existing.keys() {
        if !seen.contains(id.as_str()) {
            plan.to_remove.push(id.clone());
        }
    }

    plan
}

#[cfg(test)]
#[path = "tests/plan_tests.rs"]
mod tests;
