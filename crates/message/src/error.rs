use dotbit_address::AddressError;
use dotbit_types::{TypesError, H256};

use crate::lookup::LookupError;
use crate::witness::WitnessError;

/// Errors that abort a compilation. None of them is retried here and none
/// produces a partial summary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// Bad tag, short buffer or trailing bytes in lock args, or an address
    /// that cannot be rendered.
    #[error("malformed address: {0}")]
    MalformedAddress(#[from] AddressError),

    /// An input's previous output could not be fetched.
    #[error("input {index} ({tx_hash}:{out_index}) unresolved: {source}")]
    UnresolvedInput {
        index: usize,
        tx_hash: H256,
        out_index: u32,
        source: LookupError,
    },

    /// Classification matched conflicting facts or contracts.
    #[error("ambiguous classification: {message}")]
    ClassificationAmbiguous { message: String },

    /// A fact the action's message needs was not found.
    #[error("missing fact '{fact}': {context}")]
    MissingFact { fact: String, context: String },

    /// The action witness names an action outside the known set.
    #[error("unsupported action '{0}'")]
    UnsupportedAction(String),

    /// The witness decoder failed.
    #[error("witness decode failed: {0}")]
    Witness(#[from] WitnessError),

    /// Capacity or token arithmetic left its valid range.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The outputs token map could not be fetched.
    #[error("token map unavailable: {0}")]
    TokenMap(LookupError),
}

impl CompileError {
    pub(crate) fn missing(fact: &str, context: impl Into<String>) -> Self {
        CompileError::MissingFact {
            fact: fact.to_string(),
            context: context.into(),
        }
    }

    pub(crate) fn ambiguous(message: impl Into<String>) -> Self {
        CompileError::ClassificationAmbiguous {
            message: message.into(),
        }
    }
}

impl From<TypesError> for CompileError {
    fn from(err: TypesError) -> Self {
        match err {
            TypesError::AmbiguousCodeHash { .. } => CompileError::ambiguous(err.to_string()),
            other => CompileError::MalformedAddress(AddressError::Types(other)),
        }
    }
}
