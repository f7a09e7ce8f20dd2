//! # Store Formats
//!
//! Pure byte-level transformations of relation stores. Reading and writing
//! files is left to the application.
//!
//! - `persistence`: packed binary format (magic header + postcard payload)
//! - JSON interchange goes through `SerializableStore` and `serde_json`

pub mod persistence;

pub use persistence::{PackedHeader, is_packed, store_from_bytes, store_to_bytes};

use crate::{IdiomError, RelationStore, SerializableStore};

/// Parse and validate a store from its JSON interchange form.
pub fn store_from_json(text: &str) -> Result<RelationStore, IdiomError> {
    let serializable: SerializableStore = serde_json::from_str(text)
        .map_err(|e| IdiomError::SerializationError(format!("Invalid store JSON: {e}")))?;
    RelationStore::try_from(serializable)
}

/// Render a store in its JSON interchange form.
pub fn store_to_json(store: &RelationStore) -> Result<String, IdiomError> {
    serde_json::to_string_pretty(&SerializableStore::from(store))
        .map_err(|e| IdiomError::SerializationError(e.to_string()))
}
