//! Decoded witness records.
//!
//! The binary record format of the protocol's witnesses is owned by an
//! external decoder. This module fixes the decoded fields the compiler
//! consumes and the [`WitnessDecoder`] seam that supplies them.

use std::fmt;

use serde::{Deserialize, Serialize};

use dotbit_types::bytes::hex_bytes;
use dotbit_types::{Script, Transaction};

// ──────────────────────────────────────────────
// Decoded records
// ──────────────────────────────────────────────

/// Which side of the transaction a record is read from: `Old` for the
/// version spent by an input, `New` for the version created by an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Old,
    New,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Old => f.write_str("old"),
            DataType::New => f.write_str("new"),
        }
    }
}

/// The action witness: action name plus raw params.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionData {
    pub action: String,
    #[serde(with = "hex_bytes", default)]
    pub params: Vec<u8>,
}

/// Parameters of a transfer approval on an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferApprovalParams {
    #[serde(default)]
    pub platform_lock: Option<Script>,
    #[serde(default)]
    pub protected_until: u64,
    /// Unix timestamp after which the approval can be fulfilled.
    pub sealed_until: u64,
    #[serde(default)]
    pub delay_count_remain: u8,
    /// Lock the account moves to when the approval is fulfilled.
    pub to_lock: Script,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AccountApproval {
    Transfer(TransferApprovalParams),
    /// An approval kind this compiler has no message for.
    #[serde(other)]
    Unknown,
}

/// Witness fields of an account cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCellFacts {
    /// Index of the account cell among the inputs (old) or outputs (new).
    pub index: usize,
    pub account: String,
    pub status: u8,
    #[serde(with = "hex_bytes")]
    pub records_hash: Vec<u8>,
    #[serde(default)]
    pub approval: Option<AccountApproval>,
}

/// Witness fields of an account sale cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleCellFacts {
    pub account: String,
    /// Price in shannons.
    pub price: u64,
}

/// Witness fields of an offer cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferCellFacts {
    pub account: String,
    /// Price in shannons.
    pub price: u64,
}

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WitnessError {
    /// The transaction carries no such record.
    #[error("no {data_type} {record} witness in transaction")]
    NotFound { record: String, data_type: DataType },

    /// The action witness is absent.
    #[error("no action witness in transaction")]
    NoAction,

    /// A record or cell payload failed to decode.
    #[error("malformed {record}: {message}")]
    Malformed { record: String, message: String },
}

// ──────────────────────────────────────────────
// Decoder seam
// ──────────────────────────────────────────────

/// Typed extraction of witness records from a transaction.
pub trait WitnessDecoder: Send + Sync {
    fn action(&self, tx: &Transaction) -> Result<ActionData, WitnessError>;

    fn account_cell(
        &self,
        tx: &Transaction,
        data_type: DataType,
    ) -> Result<AccountCellFacts, WitnessError>;

    fn account_sale_cell(
        &self,
        tx: &Transaction,
        data_type: DataType,
    ) -> Result<SaleCellFacts, WitnessError>;

    fn offer_cell(
        &self,
        tx: &Transaction,
        data_type: DataType,
    ) -> Result<OfferCellFacts, WitnessError>;

    /// Token amount held by a DP cell: a little-endian u64 at the start of
    /// the cell data.
    fn token_value(&self, data: &[u8]) -> Result<u64, WitnessError> {
        let bytes: [u8; 8] = data
            .get(..8)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| WitnessError::Malformed {
                record: "dp cell data".to_string(),
                message: format!("need 8 bytes, got {}", data.len()),
            })?;
        Ok(u64::from_le_bytes(bytes))
    }
}

/// Old and new versions of one record kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Versioned<T> {
    #[serde(default)]
    pub old: Option<T>,
    #[serde(default)]
    pub new: Option<T>,
}

impl<T> Default for Versioned<T> {
    fn default() -> Self {
        Versioned {
            old: None,
            new: None,
        }
    }
}

impl<T: Clone> Versioned<T> {
    fn get(&self, data_type: DataType, record: &str) -> Result<T, WitnessError> {
        let value = match data_type {
            DataType::Old => &self.old,
            DataType::New => &self.new,
        };
        value.clone().ok_or_else(|| WitnessError::NotFound {
            record: record.to_string(),
            data_type,
        })
    }
}

/// Pre-decoded witness records, as carried by a transaction fixture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessFacts {
    #[serde(default)]
    pub action: Option<ActionData>,
    #[serde(default)]
    pub account_cell: Versioned<AccountCellFacts>,
    #[serde(default)]
    pub account_sale_cell: Versioned<SaleCellFacts>,
    #[serde(default)]
    pub offer_cell: Versioned<OfferCellFacts>,
}

/// A decoder that answers from records decoded ahead of time.
#[derive(Debug, Clone, Default)]
pub struct StaticWitnessDecoder {
    facts: WitnessFacts,
}

impl StaticWitnessDecoder {
    pub fn new(facts: WitnessFacts) -> Self {
        Self { facts }
    }

    /// A decoder holding only the action witness.
    pub fn with_action(action: &str) -> Self {
        Self::new(WitnessFacts {
            action: Some(ActionData {
                action: action.to_string(),
                params: vec![],
            }),
            ..Default::default()
        })
    }
}

impl WitnessDecoder for StaticWitnessDecoder {
    fn action(&self, _tx: &Transaction) -> Result<ActionData, WitnessError> {
        self.facts.action.clone().ok_or(WitnessError::NoAction)
    }

    fn account_cell(
        &self,
        _tx: &Transaction,
        data_type: DataType,
    ) -> Result<AccountCellFacts, WitnessError> {
        self.facts.account_cell.get(data_type, "account cell")
    }

    fn account_sale_cell(
        &self,
        _tx: &Transaction,
        data_type: DataType,
    ) -> Result<SaleCellFacts, WitnessError> {
        self.facts.account_sale_cell.get(data_type, "account sale cell")
    }

    fn offer_cell(
        &self,
        _tx: &Transaction,
        data_type: DataType,
    ) -> Result<OfferCellFacts, WitnessError> {
        self.facts.offer_cell.get(data_type, "offer cell")
    }
}
