use serde::Serialize;

use crate::classify::CellLineItem;

/// The action witness as shown to the signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionInfo {
    pub action: String,
    /// Action params, `0x`-prefixed hex.
    pub params: String,
}

/// What a signer reviews before approving a transaction.
///
/// Capacities are rendered strings (`"10 CKB"`); the summary is built once
/// per compilation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionSummary {
    /// EVM chain id of the typed-data signing domain.
    pub chain_id: u64,
    pub inputs_capacity: String,
    pub outputs_capacity: String,
    pub fee: String,
    pub inputs: Vec<CellLineItem>,
    pub outputs: Vec<CellLineItem>,
    pub action: ActionInfo,
    pub message: String,
}
