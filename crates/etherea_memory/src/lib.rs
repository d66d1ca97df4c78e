//! Preference stores for the EI engine's `last_emotion` snapshots.

mod memory;
mod sqlite;

pub use memory::InMemoryPreferences;
pub use sqlite::SqlitePreferences;
