//! # Packed Store Format
//!
//! Binary serialization for relation stores.
//! File I/O operations are in the app layer.
//!
//! Format: Header (5 bytes) + postcard-serialized store data.
//! - 4 bytes: Magic ("IDLM")
//! - 1 byte: Version
//!
//! The payload size is checked before deserialization, and the decoded store
//! goes through the same validation as a store built in memory.

use crate::{IdiomError, RelationStore, SerializableStore, primitives};

/// Maximum accepted size of a packed store.
pub const MAX_PACKED_SIZE: usize = 512 * 1024 * 1024; // 512 MB

const HEADER_SIZE: usize = 5;

// =============================================================================
// FILE HEADER
// =============================================================================

/// The header that precedes all packed store data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl PackedHeader {
    /// Header for the current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *primitives::MAGIC_BYTES,
            version: primitives::FORMAT_VERSION,
        }
    }

    pub fn validate(&self) -> Result<(), IdiomError> {
        if &self.magic != primitives::MAGIC_BYTES {
            return Err(IdiomError::SerializationError(
                "Invalid magic bytes".to_string(),
            ));
        }
        if self.version != primitives::FORMAT_VERSION {
            return Err(IdiomError::SerializationError(format!(
                "Unsupported version: {} (expected {})",
                self.version,
                primitives::FORMAT_VERSION
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IdiomError> {
        let Some(header) = bytes.get(..HEADER_SIZE) else {
            return Err(IdiomError::SerializationError(
                "Header too short".to_string(),
            ));
        };
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&header[..4]);
        Ok(Self {
            magic,
            version: header[4],
        })
    }
}

impl Default for PackedHeader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// SERIALIZATION FUNCTIONS
// =============================================================================

/// Check whether `bytes` start with the packed store magic.
#[must_use]
pub fn is_packed(bytes: &[u8]) -> bool {
    bytes.starts_with(primitives::MAGIC_BYTES)
}

/// Serialize a store to bytes (header + payload).
pub fn store_to_bytes(store: &RelationStore) -> Result<Vec<u8>, IdiomError> {
    let payload = postcard::to_stdvec(&SerializableStore::from(store))
        .map_err(|e| IdiomError::SerializationError(e.to_string()))?;

    let mut result = Vec::with_capacity(HEADER_SIZE + payload.len());
    result.extend_from_slice(&PackedHeader::new().to_bytes());
    result.extend_from_slice(&payload);
    Ok(result)
}

/// Deserialize and validate a store from bytes.
pub fn store_from_bytes(bytes: &[u8]) -> Result<RelationStore, IdiomError> {
    if bytes.len() > MAX_PACKED_SIZE {
        return Err(IdiomError::SerializationError(format!(
            "Data size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_PACKED_SIZE
        )));
    }

    let header = PackedHeader::from_bytes(bytes)?;
    header.validate()?;

    let serializable: SerializableStore = postcard::from_bytes(&bytes[HEADER_SIZE..])
        .map_err(|e| IdiomError::SerializationError(format!("Failed to decode store data: {e}")))?;
    RelationStore::try_from(serializable)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NodeRef, NodeUniverse, PredicateSet, Relation};

    fn sample_store() -> RelationStore {
        let universe = NodeUniverse::from_labels(vec!["a".into(), "b".into(), "c".into()]);
        let mut store = RelationStore::new(universe).expect("store");
        store
            .insert_relation(Relation::from_edges("next", 3, &[(0, 1), (1, 2)]).expect("relation"))
            .expect("insert");
        store
            .insert_predicate(PredicateSet::new("last", vec![NodeRef::new(2)]))
            .expect("insert");
        store
    }

    #[test]
    fn header_roundtrip() {
        let header = PackedHeader::new();
        let restored = PackedHeader::from_bytes(&header.to_bytes()).expect("parse header");
        assert_eq!(restored, header);
    }

    #[test]
    fn packing_is_deterministic() {
        let store = sample_store();
        let first = store_to_bytes(&store).expect("pack");
        let restored = store_from_bytes(&first).expect("unpack");
        let second = store_to_bytes(&restored).expect("repack");
        assert_eq!(first, second);
        assert!(is_packed(&first));
    }

    #[test]
    fn restored_store_answers_queries() {
        let restored = store_from_bytes(&store_to_bytes(&sample_store()).expect("pack"))
            .expect("unpack");
        let next = restored.relation("next").expect("relation");
        assert_eq!(next.predecessors(NodeRef::new(2), 0), &[NodeRef::new(1)]);
        assert_eq!(restored.universe().label(NodeRef::new(0)), Some("a"));
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = store_to_bytes(&sample_store()).expect("pack");
        bytes[0] = b'X';
        assert!(store_from_bytes(&bytes).is_err());
    }

    #[test]
    fn rejects_future_version() {
        let mut bytes = store_to_bytes(&sample_store()).expect("pack");
        bytes[4] = primitives::FORMAT_VERSION + 1;
        assert!(store_from_bytes(&bytes).is_err());
    }

    #[test]
    fn rejects_truncated_data() {
        assert!(store_from_bytes(b"IDL").is_err());
        let bytes = store_to_bytes(&sample_store()).expect("pack");
        assert!(store_from_bytes(&bytes[..bytes.len() - 3]).is_err());
    }
}
