//! # idiomatch
//!
//! Library side of the idiomatch binary: pattern manifests, file loading and
//! the report types printed by the CLI.

pub mod loader;
pub mod manifest;
pub mod report;

pub use loader::{decode_store, load_manifest, load_store};
pub use manifest::{Alternative, ConstraintEntry, Manifest};
pub use report::{CheckReport, SearchReport, StoreSummary};
