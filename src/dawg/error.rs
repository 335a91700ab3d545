//! Error types for dictionary compilation.

use thiserror::Error;

/// Fatal conditions that abort a dictionary build.
///
/// Words rejected by the normalizer are not errors; they are dropped before the
/// trie is built.
#[derive(Debug, Error)]
pub enum CompileError {
    /// An I/O error while reading the word list or writing the output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value does not fit its bit field in the binary record.
    #[error("{field} = {value} does not fit in {bits} bits at slot {slot} (reached via \"{word}\")")]
    FieldOverflow {
        /// Name of the record field.
        field: &'static str,
        /// Array slot whose record could not be encoded.
        slot: u32,
        /// The value that overflowed.
        value: i64,
        /// Width of the field in bits.
        bits: u32,
        /// A word passing through the offending slot.
        word: String,
    },

    /// The rank computations disagree for a word.
    #[error(
        "rank mismatch for \"{word}\": expected {expected}, trie {naive:?}, \
         tracking {tracking:?}, dawg {dawg:?}, array {compact:?}"
    )]
    RankMismatch {
        /// The word being checked.
        word: String,
        /// Its position in the sorted, deduplicated word list.
        expected: u32,
        /// Rank from summing sibling counts in the trie.
        naive: Option<u32>,
        /// Rank from the trie's cached per-edge offsets.
        tracking: Option<u32>,
        /// Rank from summing sibling counts in the DAWG.
        dawg: Option<u32>,
        /// Rank from the compacted array.
        compact: Option<u32>,
    },

    /// The requested binary format cannot represent the array layout.
    #[error("{format} cannot encode an array in the {layout} layout")]
    LayoutMismatch {
        /// The requested format.
        format: &'static str,
        /// The layout of the array.
        layout: &'static str,
    },

    /// An encoded buffer is truncated or internally inconsistent.
    #[error("malformed dictionary: {0}")]
    Malformed(String),
}

/// A convenience `Result` type alias using [`CompileError`].
pub type Result<T> = std::result::Result<T, CompileError>;
