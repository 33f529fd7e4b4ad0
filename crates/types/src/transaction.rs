use serde::{Deserialize, Serialize};

use crate::bytes::{hex_bytes, hex_bytes_vec, H256};
use crate::script::Script;

/// Reference to a previous transaction output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub tx_hash: H256,
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellInput {
    pub previous_output: OutPoint,
    #[serde(default)]
    pub since: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellOutput {
    /// Capacity in shannons (1 CKB = 10^8 shannons).
    pub capacity: u64,
    pub lock: Script,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<Script>,
}

/// A cell: an output together with its data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub output: CellOutput,
    #[serde(with = "hex_bytes", default)]
    pub data: Vec<u8>,
}

impl Cell {
    pub fn capacity(&self) -> u64 {
        self.output.capacity
    }

    pub fn lock(&self) -> &Script {
        &self.output.lock
    }

    pub fn type_script(&self) -> Option<&Script> {
        self.output.type_.as_ref()
    }
}

/// An assembled, unsigned transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub inputs: Vec<CellInput>,
    pub outputs: Vec<CellOutput>,
    #[serde(with = "hex_bytes_vec", default)]
    pub outputs_data: Vec<Vec<u8>>,
    #[serde(with = "hex_bytes_vec", default)]
    pub witnesses: Vec<Vec<u8>>,
}

impl Transaction {
    /// The output at `index` paired with its data. Missing data reads as empty.
    pub fn output_cell(&self, index: usize) -> Option<Cell> {
        let output = self.outputs.get(index)?;
        Some(Cell {
            output: output.clone(),
            data: self.outputs_data.get(index).cloned().unwrap_or_default(),
        })
    }

    pub fn output_cells(&self) -> Vec<Cell> {
        (0..self.outputs.len())
            .filter_map(|i| self.output_cell(i))
            .collect()
    }

    /// Sum of output capacities, or `None` on overflow.
    pub fn outputs_capacity(&self) -> Option<u64> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, o| acc.checked_add(o.capacity))
    }
}
