//! The catalog sync engine.
//!
//! [`sync`] is the single orchestration entry point: fetch the remote
//! catalog, diff it against persisted state, process added and changed
//! games through a bounded worker pool (asset downloads plus launch-script
//! generation), merge the result into the frontend's gamelist and persist
//! the new state — atomically, idempotently, and safe to interrupt.

pub mod assets;
pub mod config;
pub mod error;
pub mod events;
pub mod scripts;
pub mod settings;
pub mod store;
pub mod sync;

pub use assets::clean_assets;
pub use config::SyncConfig;
pub use error::{AssetError, SyncError};
pub use events::{SyncEvent, SyncStage, drive_with_events};
pub use store::StateStore;
pub use sync::{CancelFlag, GameFailure, PartialGame, SyncReport, sync};
