//! ES-DE metadata output: the per-system `gamelist.xml` and the
//! `es_systems.xml` custom-system entry.
//!
//! The gamelist writer merges: managed nodes (those whose `<path>` stem
//! is a game id this sync tracks) are rebuilt or removed, everything else
//! in the file is preserved. All writes go through a temp file and an
//! atomic rename.

pub mod error;
pub mod gamelist;
pub mod systems;

pub use error::GamelistError;
pub use gamelist::{GameNode, apply_diff, parse_gamelist};
pub use systems::ensure_system_entry;
