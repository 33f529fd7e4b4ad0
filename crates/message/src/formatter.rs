//! Display addresses for locks that are not das-lock.

use dotbit_address::display::full_address;
use dotbit_address::{AddressError, ChainType};
use dotbit_types::{NetType, Script};

/// Renders an arbitrary lock script as a human-facing address.
pub trait ScriptAddressFormatter: Send + Sync {
    fn script_to_address(&self, net: NetType, script: &Script) -> Result<String, AddressError>;
}

/// Full-format (bech32m) ledger addresses: `ckb1…` on mainnet, `ckt1…` on
/// the testnets.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullAddressFormatter;

impl ScriptAddressFormatter for FullAddressFormatter {
    fn script_to_address(&self, net: NetType, script: &Script) -> Result<String, AddressError> {
        full_address(net.address_hrp(), script).map_err(|message| AddressError::InvalidDisplay {
            chain: ChainType::Ckb,
            value: script.code_hash.to_string(),
            message,
        })
    }
}
