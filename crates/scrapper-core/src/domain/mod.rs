//! Domain types for hosted-repository mirroring.

mod discovered;
mod location;

pub use discovered::DiscoveredFiles;
pub use location::{DEFAULT_BRANCH, EntryKind, LISTING_HOST, RAW_HOST, RemoteLocation};
