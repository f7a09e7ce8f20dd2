//! # Engine Primitives
//!
//! Hardcoded limits and format constants for the idiomatch engine.
//! These are compiled into the binary and are immutable at runtime.

/// Largest node universe the engine can address.
///
/// The two highest `u32` values are reserved for the `ABSENT` and `UNBOUND`
/// sentinels of `NodeRef`.
pub const MAX_UNIVERSE_SIZE: usize = (u32::MAX - 1) as usize;

/// Maximum number of ranks a ranked relation may declare.
///
/// Operand data flow uses ranks 0..4 and successor control flow 0..4;
/// eight leaves room for wider instructions.
pub const MAX_RANKS: usize = 8;

/// Default solution cap used by the CLI when none is given.
pub const DEFAULT_MAX_SOLUTIONS: usize = 1000;

/// Most missing indices a solution array may have before it renders as an
/// object with `"[i]"` keys instead of an array padded with nulls.
pub const MAX_INDEX_GAP: usize = 64;

/// Magic bytes for the packed store format header.
///
/// - File Header = Magic Bytes ("IDLM") + Version (u8) before payload.
pub const MAGIC_BYTES: &[u8; 4] = b"IDLM";

/// Current serialization format version.
///
/// Increment this when making breaking changes to the serialization format.
pub const FORMAT_VERSION: u8 = 1;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeRef;

    #[test]
    fn universe_limit_stays_below_sentinels() {
        assert_eq!(MAX_UNIVERSE_SIZE, NodeRef::ABSENT.index());
    }

    #[test]
    fn magic_bytes_correct() {
        assert_eq!(MAGIC_BYTES, b"IDLM");
    }
}
