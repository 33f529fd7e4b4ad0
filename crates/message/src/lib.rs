//! dotbit-message: turns an assembled, unsigned transaction into the
//! summary a signer reviews.
//!
//! [`MessageCompiler::compile`] resolves every input cell, totals the
//! capacities, lists the typed cells on both sides and composes one
//! sentence for the declared [`ProtocolAction`]. Anything it cannot account
//! for is an error; no partial summary is ever returned.

pub mod action;
pub mod aggregate;
pub mod classify;
pub mod dispatch;
pub mod error;
pub mod formatter;
pub mod lookup;
pub mod numeric;
pub mod resolve;
pub mod summary;
pub mod token;
pub mod witness;

use std::sync::Arc;

use tracing::debug;

use dotbit_address::{AddressFormat, LengthTable, LockArgsCodec};
use dotbit_types::{ContractRegistry, NetType, Transaction};

pub use action::ProtocolAction;
pub use aggregate::GroupedAmounts;
pub use classify::{CellClassifier, CellLineItem, SubjectAccount, SubjectFacts};
pub use error::CompileError;
pub use formatter::{FullAddressFormatter, ScriptAddressFormatter};
pub use lookup::{CellLookup, LookupError, StaticCellLookup};
pub use summary::{ActionInfo, TransactionSummary};
pub use token::{DerivedTokenMap, StaticTokenMap, TokenMapProvider};
pub use witness::{DataType, StaticWitnessDecoder, WitnessDecoder, WitnessError, WitnessFacts};

use dispatch::{compose_message, DispatchContext};
use numeric::{capacity_to_str, checked_total};

/// Compiles transactions for one network and one contract deployment.
#[derive(Clone)]
pub struct MessageCompiler {
    format: AddressFormat,
    registry: Arc<dyn ContractRegistry>,
    lookup: Arc<dyn CellLookup>,
    decoder: Arc<dyn WitnessDecoder>,
    script_formatter: Arc<dyn ScriptAddressFormatter>,
    /// `None` derives the map from the transaction's own DP outputs.
    token_map: Option<Arc<dyn TokenMapProvider>>,
}

impl MessageCompiler {
    pub fn new(
        net: NetType,
        registry: Arc<dyn ContractRegistry>,
        lookup: Arc<dyn CellLookup>,
        decoder: Arc<dyn WitnessDecoder>,
    ) -> Self {
        MessageCompiler {
            format: AddressFormat::new(net, LockArgsCodec::default(), Arc::clone(&registry)),
            registry,
            lookup,
            decoder,
            script_formatter: Arc::new(FullAddressFormatter),
            token_map: None,
        }
    }

    /// Use `table` for every lock-args encode and decode.
    pub fn with_length_table(mut self, table: LengthTable) -> Self {
        self.format = AddressFormat::new(
            self.format.net(),
            LockArgsCodec::new(table),
            Arc::clone(&self.registry),
        );
        self
    }

    pub fn with_script_formatter(mut self, formatter: Arc<dyn ScriptAddressFormatter>) -> Self {
        self.script_formatter = formatter;
        self
    }

    pub fn with_token_map(mut self, provider: Arc<dyn TokenMapProvider>) -> Self {
        self.token_map = Some(provider);
        self
    }

    pub fn address_format(&self) -> &AddressFormat {
        &self.format
    }

    /// Build the signer-facing summary of `tx`.
    ///
    /// An `evm_chain_id` of 0 selects the network default: 1 on mainnet,
    /// 17000 on the testnets.
    pub async fn compile(
        &self,
        tx: &Transaction,
        evm_chain_id: u64,
    ) -> Result<TransactionSummary, CompileError> {
        let net = self.format.net();
        let chain_id = match evm_chain_id {
            0 => net.default_evm_chain_id(),
            id => id,
        };

        let action_data = self.decoder.action(tx)?;
        let action: ProtocolAction = action_data.action.parse()?;
        debug!(%action, %net, chain_id, "compiling transaction");

        let input_cells = resolve::resolve_inputs(Arc::clone(&self.lookup), &tx.inputs).await?;

        let inputs_capacity = checked_total(input_cells.iter().map(|c| c.capacity()), "inputs")?;
        let outputs_capacity = tx
            .outputs_capacity()
            .ok_or_else(|| CompileError::InvalidAmount("outputs total overflows u64".to_string()))?;
        let fee = inputs_capacity.checked_sub(outputs_capacity).ok_or_else(|| {
            CompileError::InvalidAmount(format!(
                "outputs ({} shannons) exceed inputs ({} shannons)",
                outputs_capacity, inputs_capacity
            ))
        })?;

        let classifier = CellClassifier::new(self.registry.as_ref(), self.decoder.as_ref(), tx);
        let (inputs, input_facts) = classifier.classify_side(&input_cells, DataType::Old)?;
        let (outputs, output_facts) =
            classifier.classify_side(&tx.output_cells(), DataType::New)?;
        let facts = input_facts.with_outputs(output_facts);

        let derived;
        let token_map: &dyn TokenMapProvider = match &self.token_map {
            Some(provider) => provider.as_ref(),
            None => {
                derived = DerivedTokenMap::new(
                    Arc::clone(&self.registry),
                    self.format.codec().clone(),
                    Arc::clone(&self.decoder),
                );
                &derived
            }
        };

        let ctx = DispatchContext {
            tx,
            input_cells: &input_cells,
            facts: &facts,
            format: &self.format,
            decoder: self.decoder.as_ref(),
            script_formatter: self.script_formatter.as_ref(),
            token_map,
        };
        let message = compose_message(action, &ctx).await?;

        Ok(TransactionSummary {
            chain_id,
            inputs_capacity: format!("{} CKB", capacity_to_str(inputs_capacity)),
            outputs_capacity: format!("{} CKB", capacity_to_str(outputs_capacity)),
            fee: format!("{} CKB", capacity_to_str(fee)),
            inputs,
            outputs,
            action: ActionInfo {
                action: action_data.action,
                params: format!("0x{}", hex::encode(&action_data.params)),
            },
            message,
        })
    }
}
