//! DP token cells and the outputs token map.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use dotbit_address::LockArgsCodec;
use dotbit_types::{Cell, ContractName, ContractRegistry, Transaction};

use crate::lookup::LookupError;
use crate::witness::WitnessDecoder;

/// Whether `cell` is typed by the DP token contract.
pub fn is_token_cell(registry: &dyn ContractRegistry, cell: &Cell) -> bool {
    cell.type_script()
        .is_some_and(|t| registry.is_contract(ContractName::DpCellType, &t.code_hash))
}

/// Supplies DP amounts held by each owner across a transaction's outputs,
/// keyed by the owner's raw payload in lowercase hex.
#[async_trait]
pub trait TokenMapProvider: Send + Sync {
    async fn outputs_token_map(&self, tx: &Transaction)
        -> Result<HashMap<String, u64>, LookupError>;
}

/// Builds the map from the transaction's own DP outputs.
pub struct DerivedTokenMap {
    registry: Arc<dyn ContractRegistry>,
    codec: LockArgsCodec,
    decoder: Arc<dyn WitnessDecoder>,
}

impl DerivedTokenMap {
    pub fn new(
        registry: Arc<dyn ContractRegistry>,
        codec: LockArgsCodec,
        decoder: Arc<dyn WitnessDecoder>,
    ) -> Self {
        DerivedTokenMap {
            registry,
            codec,
            decoder,
        }
    }
}

#[async_trait]
impl TokenMapProvider for DerivedTokenMap {
    async fn outputs_token_map(
        &self,
        tx: &Transaction,
    ) -> Result<HashMap<String, u64>, LookupError> {
        let mut map: HashMap<String, u64> = HashMap::new();
        for cell in tx.output_cells() {
            if !is_token_cell(self.registry.as_ref(), &cell) {
                continue;
            }
            let (owner, _) = self
                .codec
                .decode(&cell.lock().args)
                .map_err(|e| LookupError::Backend(format!("dp output owner: {}", e)))?;
            let value = self
                .decoder
                .token_value(&cell.data)
                .map_err(|e| LookupError::Backend(e.to_string()))?;
            let entry = map.entry(owner.payload_key()).or_insert(0);
            *entry = entry
                .checked_add(value)
                .ok_or_else(|| LookupError::Backend("dp output total overflows".to_string()))?;
        }
        Ok(map)
    }
}

/// A fixed outputs token map.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenMap {
    amounts: HashMap<String, u64>,
}

impl StaticTokenMap {
    pub fn new(amounts: HashMap<String, u64>) -> Self {
        StaticTokenMap { amounts }
    }
}

#[async_trait]
impl TokenMapProvider for StaticTokenMap {
    async fn outputs_token_map(
        &self,
        _tx: &Transaction,
    ) -> Result<HashMap<String, u64>, LookupError> {
        Ok(self.amounts.clone())
    }
}
