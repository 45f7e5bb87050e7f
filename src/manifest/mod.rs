//! Manifest module for the bead deployment tool.
//!
//! The manifest is the only durable state: one JSON document per project
//! directory, read in full before each operation and written in full after.

mod local;
mod store;
mod types;

pub use local::{LocalManifestStore, MANIFEST_FILE};
pub use store::ManifestStore;
pub use types::{Host, Manifest, ManifestStage, PORT_RANGE};
