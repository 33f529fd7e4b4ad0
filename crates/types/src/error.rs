/// Errors raised while building or parsing ledger types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypesError {
    /// A hex string could not be decoded.
    #[error("invalid hex '{value}': {message}")]
    InvalidHex { value: String, message: String },

    /// A fixed-size value had the wrong byte length.
    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// An unknown hash type byte or name.
    #[error("unknown script hash type: {0}")]
    UnknownHashType(String),

    /// An unknown contract name in configuration.
    #[error("unknown contract name: {0}")]
    UnknownContract(String),

    /// Two contracts were registered under the same code hash.
    #[error("code hash {code_hash} registered for both {first} and {second}")]
    AmbiguousCodeHash {
        code_hash: String,
        first: String,
        second: String,
    },
}
