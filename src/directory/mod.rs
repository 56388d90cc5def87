//! Session directory: Slack ids to human-readable names
//!
//! The directory is loaded eagerly before the event stream starts and is
//! treated as a snapshot for the rest of the session:
//! - Channels, users and DM channels are paged to exhaustion
//! - Lookups never fail; unknown ids resolve to themselves
//! - No rename or membership events are applied after loading

mod loader;
mod snapshot;
mod types;

pub use loader::{DirectorySource, load_directory};
pub use snapshot::{Directory, DirectoryBuilder};
pub use types::{DirectoryEntry, ImChannel, Page};
