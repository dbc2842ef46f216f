// Version history of the live CV: capped snapshots with restore and delete.

pub mod handlers;
pub mod store;

pub use store::{Version, VersionLedger, VersionStore, DEFAULT_MAX_VERSIONS};
