//! Core data model for the Game Pass catalog sync engine.
//!
//! Pure types only: catalog entries, local sync records, asset kinds and
//! the add/update/remove plan computation. No I/O happens in this crate.

pub mod asset;
pub mod catalog;
pub mod plan;
pub mod record;

pub use asset::{AssetKind, AssetSelection};
pub use catalog::CatalogEntry;
pub use plan::{SyncPlan, compute_plan};
pub use record::LocalGameRecord;
