use dotbit_types::TypesError;

use crate::chain::ChainType;

/// A malformed address, lock-args blob or display string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    /// The blob ended where a tag byte was expected.
    #[error("lock args truncated: expected a chain tag at offset {offset}")]
    MissingTag { offset: usize },

    /// The tag is not in the length table.
    #[error("unrecognized chain tag 0x{tag:02x} at offset {offset}")]
    UnknownTag { tag: u8, offset: usize },

    /// Fewer bytes remain than the tag's payload length requires.
    #[error("{chain} payload needs {expected} bytes, only {available} remain")]
    ShortPayload {
        chain: ChainType,
        expected: usize,
        available: usize,
    },

    /// Bytes left over after the manager segment.
    #[error("{len} trailing byte(s) after the manager address")]
    TrailingData { len: usize },

    /// A payload whose length does not match its chain type.
    #[error("{chain} payload must be {expected} bytes, got {actual}")]
    InvalidLength {
        chain: ChainType,
        expected: usize,
        actual: usize,
    },

    /// A display string that does not parse for its chain.
    #[error("invalid {chain} address '{value}': {message}")]
    InvalidDisplay {
        chain: ChainType,
        value: String,
        message: String,
    },

    /// A native display form needs a contract code hash the registry lacks.
    #[error("contract '{contract}' is not in the registry")]
    MissingContract { contract: String },

    /// A script that carries no recognizable owner address.
    #[error("script with code hash {code_hash} has no owner address")]
    UnsupportedScript { code_hash: String },

    #[error(transparent)]
    Types(#[from] TypesError),
}
