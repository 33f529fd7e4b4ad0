//! Per-cell classification against the contract registry.
//!
//! Every cell of one side of the transaction (spent inputs or created
//! outputs) is matched by its type script. Matching yields a display
//! [`CellLineItem`] and a [`SubjectFacts`] contribution; contributions are
//! merged in cell order into one value per side. The output side then
//! overrides the input side's subject account, so a cell that renames the
//! subject (a redeclared reverse record) is read as its new name.

use serde::Serialize;
use tracing::debug;

use dotbit_types::{Cell, ContractName, ContractRegistry, Script, Transaction};

use crate::error::CompileError;
use crate::numeric::capacity_to_str;
use crate::witness::{DataType, WitnessDecoder, WitnessError};

/// Bytes shown before a long value is cut off with `...`.
pub const MAX_SHOWN_BYTES: usize = 20;

const EXPIRED_AT_RANGE: std::ops::Range<usize> = 72..80;

/// `0x` + hex of at most [`MAX_SHOWN_BYTES`] bytes.
pub fn abbreviate(bytes: &[u8]) -> String {
    if bytes.len() > MAX_SHOWN_BYTES {
        format!("0x{}...", hex::encode(&bytes[..MAX_SHOWN_BYTES]))
    } else {
        format!("0x{}", hex::encode(bytes))
    }
}

/// Description of a script whose contract is known.
pub fn describe_named_script(script: &Script, name: ContractName) -> String {
    format!("{},{},{}", name, script.hash_type, abbreviate(&script.args))
}

/// Description of a script outside the protocol's contracts.
pub fn describe_script(script: &Script) -> String {
    format!(
        "{},{},{}",
        abbreviate(script.code_hash.as_bytes()),
        script.hash_type,
        abbreviate(&script.args)
    )
}

/// One row of the input or output listing shown to the signer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CellLineItem {
    pub capacity: String,
    pub data: String,
    pub extra_data: String,
    pub lock: String,
    #[serde(rename = "type")]
    pub type_: String,
}

// ──────────────────────────────────────────────
// Subject facts
// ──────────────────────────────────────────────

/// The account a transaction acts on, as seen so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubjectAccount {
    #[default]
    Unknown,
    Known(String),
    /// Two cells named different accounts.
    Conflict { first: String, second: String },
}

impl SubjectAccount {
    fn merge(self, other: SubjectAccount) -> SubjectAccount {
        match (self, other) {
            (SubjectAccount::Unknown, x) | (x, SubjectAccount::Unknown) => x,
            (c @ SubjectAccount::Conflict { .. }, _) | (_, c @ SubjectAccount::Conflict { .. }) => c,
            (SubjectAccount::Known(a), SubjectAccount::Known(b)) => {
                if a == b {
                    SubjectAccount::Known(a)
                } else {
                    SubjectAccount::Conflict {
                        first: a,
                        second: b,
                    }
                }
            }
        }
    }
}

/// Facts gathered from classified cells that action messages draw on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectFacts {
    pub account: SubjectAccount,
    /// Price from an account sale cell, in shannons.
    pub sale_price: Option<u64>,
    pub offers: usize,
}

impl SubjectFacts {
    /// Combine with facts from a later cell. A later sale price replaces an
    /// earlier one, so output-side prices win over input-side ones.
    pub fn merge(self, later: SubjectFacts) -> SubjectFacts {
        SubjectFacts {
            account: self.account.merge(later.account),
            sale_price: later.sale_price.or(self.sale_price),
            offers: self.offers + later.offers,
        }
    }

    /// Lay output-side facts over input-side ones. Account conflicts only
    /// count within a side; across sides the output account replaces the
    /// input account unless the outputs name none.
    pub fn with_outputs(self, outputs: SubjectFacts) -> SubjectFacts {
        let account = match outputs.account {
            SubjectAccount::Unknown => self.account,
            named => named,
        };
        SubjectFacts {
            account,
            sale_price: outputs.sale_price.or(self.sale_price),
            offers: self.offers + outputs.offers,
        }
    }

    pub fn with_account(account: impl Into<String>) -> Self {
        SubjectFacts {
            account: SubjectAccount::Known(account.into()),
            ..Default::default()
        }
    }

    /// The single subject account; unknown or conflicting accounts fail.
    pub fn account(&self) -> Result<&str, CompileError> {
        match &self.account {
            SubjectAccount::Known(a) => Ok(a),
            SubjectAccount::Unknown => Err(CompileError::missing(
                "account",
                "no account, reverse record or similar cell names an account",
            )),
            SubjectAccount::Conflict { first, second } => Err(CompileError::ambiguous(format!(
                "cells name two accounts: {} and {}",
                first, second
            ))),
        }
    }

    pub fn sale_price(&self) -> Result<u64, CompileError> {
        self.sale_price
            .ok_or_else(|| CompileError::missing("sale price", "no account sale cell"))
    }
}

// ──────────────────────────────────────────────
// Classifier
// ──────────────────────────────────────────────

pub struct CellClassifier<'a> {
    registry: &'a dyn ContractRegistry,
    decoder: &'a dyn WitnessDecoder,
    tx: &'a Transaction,
}

impl<'a> CellClassifier<'a> {
    pub fn new(
        registry: &'a dyn ContractRegistry,
        decoder: &'a dyn WitnessDecoder,
        tx: &'a Transaction,
    ) -> Self {
        CellClassifier {
            registry,
            decoder,
            tx,
        }
    }

    /// Classify one side of the transaction. Cells without a type script and
    /// balance cells produce no line item.
    pub fn classify_side(
        &self,
        cells: &[Cell],
        side: DataType,
    ) -> Result<(Vec<CellLineItem>, SubjectFacts), CompileError> {
        cells.iter().enumerate().try_fold(
            (Vec::new(), SubjectFacts::default()),
            |(mut items, facts), (index, cell)| {
                let (item, found) = self.classify_cell(cell, side)?;
                if let Some(item) = item {
                    items.push(item);
                } else {
                    debug!(%side, index, "cell omitted from listing");
                }
                Ok((items, facts.merge(found)))
            },
        )
    }

    pub fn classify_cell(
        &self,
        cell: &Cell,
        side: DataType,
    ) -> Result<(Option<CellLineItem>, SubjectFacts), CompileError> {
        let Some(type_script) = cell.type_script() else {
            return Ok((None, SubjectFacts::default()));
        };
        let type_name = self.registry.name_for_code_hash(&type_script.code_hash);
        if type_name == Some(ContractName::BalanceCellType) {
            return Ok((None, SubjectFacts::default()));
        }

        let lock = cell.lock();
        let mut item = CellLineItem {
            capacity: format!("{} CKB", capacity_to_str(cell.capacity())),
            data: abbreviate(&cell.data),
            extra_data: String::new(),
            lock: match self.registry.name_for_code_hash(&lock.code_hash) {
                Some(name) => describe_named_script(lock, name),
                None => describe_script(lock),
            },
            type_: match type_name {
                Some(name) => describe_named_script(type_script, name),
                None => describe_script(type_script),
            },
        };

        let mut facts = SubjectFacts::default();
        match type_name {
            Some(ContractName::DidCellType) => {
                item.type_ = describe_script(type_script);
            }
            Some(ContractName::AccountSaleCellType) => {
                let sale = self.decoder.account_sale_cell(self.tx, side)?;
                facts.sale_price = Some(sale.price);
            }
            Some(ContractName::AccountCellType) => {
                let account = self.decoder.account_cell(self.tx, side)?;
                let expired_at = expired_at(&cell.data)?;
                item.data = format!(
                    "{{ account: {}, expired_at: {} }}",
                    account.account, expired_at
                );
                item.extra_data = format!(
                    "{{ status: {}, records_hash: 0x{} }}",
                    account.status,
                    hex::encode(&account.records_hash)
                );
                facts.account = SubjectAccount::Known(account.account);
            }
            Some(ContractName::ReverseRecordCellType) => {
                let account = String::from_utf8(cell.data.clone()).map_err(|e| {
                    WitnessError::Malformed {
                        record: "reverse record cell data".to_string(),
                        message: e.to_string(),
                    }
                })?;
                facts.account = SubjectAccount::Known(account);
            }
            Some(ContractName::OfferCellType) => {
                facts.offers = 1;
            }
            _ => {}
        }
        debug!(%side, contract = ?type_name, "classified cell");
        Ok((Some(item), facts))
    }
}

/// Expiry timestamp of an account cell: little-endian u64 at bytes 72..80.
fn expired_at(data: &[u8]) -> Result<u64, WitnessError> {
    data.get(EXPIRED_AT_RANGE)
        .and_then(|b| <[u8; 8]>::try_from(b).ok())
        .map(u64::from_le_bytes)
        .ok_or_else(|| WitnessError::Malformed {
            record: "account cell data".to_string(),
            message: format!("need {} bytes, got {}", EXPIRED_AT_RANGE.end, data.len()),
        })
}
