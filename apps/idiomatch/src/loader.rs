//! # File Loading
//!
//! Reads stores and manifests from disk. Stores are accepted in the packed
//! binary format or as JSON; the format is recognised by its magic bytes.

use crate::manifest::Manifest;
use idiomatch_core::{IdiomError, RelationStore, is_packed, store_from_bytes, store_from_json};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum store file size (512 MB).
pub const MAX_STORE_FILE_SIZE: u64 = 512 * 1024 * 1024;

/// Maximum manifest file size (1 MB).
pub const MAX_MANIFEST_FILE_SIZE: u64 = 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), IdiomError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| IdiomError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(IdiomError::SerializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve `path` to an existing regular file.
pub fn validate_file_path(path: &Path) -> Result<PathBuf, IdiomError> {
    let canonical = path.canonicalize().map_err(|e| {
        IdiomError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(IdiomError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Resolve an output path whose parent directory must exist.
pub fn validate_output_path(path: &Path) -> Result<PathBuf, IdiomError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        IdiomError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(IdiomError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| IdiomError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

// =============================================================================
// LOADERS
// =============================================================================

/// Decode a store from file contents in either format.
pub fn decode_store(bytes: &[u8]) -> Result<RelationStore, IdiomError> {
    if is_packed(bytes) {
        return store_from_bytes(bytes);
    }
    let text = std::str::from_utf8(bytes)
        .map_err(|e| IdiomError::SerializationError(format!("Store is neither packed nor UTF-8: {e}")))?;
    store_from_json(text)
}

/// Load and validate a store file.
pub fn load_store(path: &Path) -> Result<RelationStore, IdiomError> {
    let path = validate_file_path(path)?;
    validate_file_size(&path, MAX_STORE_FILE_SIZE)?;
    let bytes = std::fs::read(&path)
        .map_err(|e| IdiomError::IoError(format!("Failed to read store: {}", e)))?;
    let store = decode_store(&bytes)?;
    tracing::info!(
        path = %path.display(),
        nodes = store.node_count(),
        "store loaded"
    );
    Ok(store)
}

/// Load and parse a pattern manifest.
pub fn load_manifest(path: &Path) -> Result<Manifest, IdiomError> {
    let path = validate_file_path(path)?;
    validate_file_size(&path, MAX_MANIFEST_FILE_SIZE)?;
    let text = std::fs::read_to_string(&path)
        .map_err(|e| IdiomError::IoError(format!("Failed to read manifest: {}", e)))?;
    Manifest::from_toml_str(&text)
}
