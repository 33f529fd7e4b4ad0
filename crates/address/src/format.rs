//! Conversion between the hex and display forms of chain addresses.

use std::sync::Arc;

use dotbit_types::{ContractName, ContractRegistry, HashType, NetType, Script};

use crate::address::{AddressHex, AddressNormal, ChainAddress};
use crate::chain::ChainType;
use crate::codec::LockArgsCodec;
use crate::display::{self, ParsedCkbAddress};
use crate::error::AddressError;

const TRON_VERSION: u8 = 0x41;
const DOGE_VERSION: u8 = 0x1e;
const BITCOIN_P2PKH_VERSION: u8 = 0x00;

/// Address formatter bound to one network and one contract registry.
///
/// The registry supplies the code hashes needed to rebuild native scripts:
/// the default single-sig and multisig locks for `ckb`/`ckb-multisig`
/// payloads, and the das-lock for `web-authn` payloads.
#[derive(Clone)]
pub struct AddressFormat {
    net: NetType,
    codec: LockArgsCodec,
    registry: Arc<dyn ContractRegistry>,
}

impl AddressFormat {
    pub fn new(net: NetType, codec: LockArgsCodec, registry: Arc<dyn ContractRegistry>) -> Self {
        AddressFormat {
            net,
            codec,
            registry,
        }
    }

    pub fn net(&self) -> NetType {
        self.net
    }

    pub fn codec(&self) -> &LockArgsCodec {
        &self.codec
    }

    pub fn registry(&self) -> &dyn ContractRegistry {
        self.registry.as_ref()
    }

    // ── hex → display ────────────────────────────────────────────────

    pub fn hex_to_normal(&self, addr: &ChainAddress) -> Result<AddressNormal, AddressError> {
        let chain = addr.chain_type();
        let payload = addr.payload();
        let address_normal = match chain {
            ChainType::Eth | ChainType::Eth712 => display::eip55(payload),
            ChainType::Tron => display::base58check_encode(TRON_VERSION, payload),
            ChainType::Doge => display::base58check_encode(DOGE_VERSION, payload),
            ChainType::Bitcoin => display::base58check_encode(BITCOIN_P2PKH_VERSION, payload),
            ChainType::Ed25519 => format!("0x{}", hex::encode(payload)),
            ChainType::Ckb | ChainType::CkbMultisig | ChainType::WebAuthn => {
                let script = self.native_script(addr)?;
                self.script_to_full_address(&script)?
            }
        };
        Ok(AddressNormal {
            chain_type: chain,
            address_normal,
        })
    }

    /// Full-format ledger address of any script on this network.
    pub fn script_to_full_address(&self, script: &Script) -> Result<String, AddressError> {
        display::full_address(self.net.address_hrp(), script).map_err(|message| {
            AddressError::InvalidDisplay {
                chain: ChainType::Ckb,
                value: script.code_hash.to_string(),
                message,
            }
        })
    }

    /// The ledger script a native payload stands for.
    fn native_script(&self, addr: &ChainAddress) -> Result<Script, AddressError> {
        match addr.chain_type() {
            ChainType::Ckb => self.contract_script(
                ContractName::Secp256k1Blake160,
                addr.payload().to_vec(),
            ),
            ChainType::CkbMultisig => self.contract_script(
                ContractName::Secp256k1Multisig,
                addr.payload().to_vec(),
            ),
            ChainType::WebAuthn => {
                let args = self.codec.encode(addr, addr)?;
                self.contract_script(ContractName::DasLock, args)
            }
            other => Err(AddressError::InvalidDisplay {
                chain: other,
                value: addr.to_tagged_hex(),
                message: "not a native chain type".to_string(),
            }),
        }
    }

    fn contract_script(&self, name: ContractName, args: Vec<u8>) -> Result<Script, AddressError> {
        let code_hash = self
            .registry
            .code_hash_for(name)
            .ok_or_else(|| AddressError::MissingContract {
                contract: name.to_string(),
            })?;
        Ok(Script::new(code_hash, HashType::Type, args))
    }

    // ── display → hex ────────────────────────────────────────────────

    pub fn normal_to_hex(
        &self,
        chain: ChainType,
        value: &str,
    ) -> Result<ChainAddress, AddressError> {
        let invalid = |message: String| AddressError::InvalidDisplay {
            chain,
            value: value.to_string(),
            message,
        };
        let table = self.codec.table();
        match chain {
            ChainType::Eth | ChainType::Eth712 => {
                let payload = display::parse_evm(value).map_err(invalid)?;
                ChainAddress::new(chain, payload, table)
            }
            ChainType::Tron => {
                let payload = display::base58check_decode(value, TRON_VERSION).map_err(invalid)?;
                ChainAddress::new(chain, payload, table)
            }
            ChainType::Doge => {
                let payload = display::base58check_decode(value, DOGE_VERSION).map_err(invalid)?;
                ChainAddress::new(chain, payload, table)
            }
            ChainType::Bitcoin => {
                let payload = display::base58check_decode(value, BITCOIN_P2PKH_VERSION)
                    .map_err(invalid)?;
                ChainAddress::new(chain, payload, table)
            }
            ChainType::Ed25519 => {
                let body = value
                    .strip_prefix("0x")
                    .ok_or_else(|| invalid("missing 0x prefix".to_string()))?;
                let payload = hex::decode(body).map_err(|e| invalid(e.to_string()))?;
                ChainAddress::new(chain, payload, table)
            }
            ChainType::Ckb | ChainType::CkbMultisig | ChainType::WebAuthn => {
                let parsed = display::parse_ckb_address(value).map_err(invalid)?;
                let (hrp, script) = match parsed {
                    ParsedCkbAddress::Full { hrp, script } => (hrp, script),
                    ParsedCkbAddress::Short {
                        hrp,
                        code_hash_index,
                        args,
                    } => {
                        let name = match code_hash_index {
                            0x00 => ContractName::Secp256k1Blake160,
                            0x01 => ContractName::Secp256k1Multisig,
                            other => {
                                return Err(invalid(format!(
                                    "unknown short-format code hash index {}",
                                    other
                                )))
                            }
                        };
                        (hrp, self.contract_script(name, args)?)
                    }
                };
                if hrp != self.net.address_hrp() {
                    return Err(invalid(format!(
                        "address prefix '{}' does not belong to {}",
                        hrp, self.net
                    )));
                }
                let (owner, _) = self.script_to_hex(&script)?;
                if owner.chain_type() != chain {
                    return Err(invalid(format!(
                        "address holds a {} owner",
                        owner.chain_type()
                    )));
                }
                Ok(owner)
            }
        }
    }

    // ── scripts and lock args ────────────────────────────────────────

    /// The owner (and manager, for das-lock) carried by a lock script.
    pub fn script_to_hex(
        &self,
        script: &Script,
    ) -> Result<(ChainAddress, Option<ChainAddress>), AddressError> {
        let table = self.codec.table();
        match self.registry.name_for_code_hash(&script.code_hash) {
            Some(ContractName::DasLock) => {
                let (owner, manager) = self.codec.decode(&script.args)?;
                Ok((owner, Some(manager)))
            }
            Some(ContractName::Secp256k1Blake160) => Ok((
                ChainAddress::new(ChainType::Ckb, script.args.clone(), table)?,
                None,
            )),
            Some(ContractName::Secp256k1Multisig) => Ok((
                ChainAddress::new(ChainType::CkbMultisig, script.args.clone(), table)?,
                None,
            )),
            _ => Err(AddressError::UnsupportedScript {
                code_hash: script.code_hash.to_string(),
            }),
        }
    }

    /// Decode das-lock args into owner and manager hex forms.
    pub fn args_to_hex(&self, args: &[u8]) -> Result<(AddressHex, AddressHex), AddressError> {
        let (owner, manager) = self.codec.decode(args)?;
        Ok((owner.to_address_hex(), manager.to_address_hex()))
    }

    /// Decode das-lock args into owner and manager display forms.
    pub fn args_to_normal(
        &self,
        args: &[u8],
    ) -> Result<(AddressNormal, AddressNormal), AddressError> {
        let (owner, manager) = self.codec.decode(args)?;
        Ok((self.hex_to_normal(&owner)?, self.hex_to_normal(&manager)?))
    }

    /// Build das-lock args from two display addresses.
    pub fn normal_to_args(
        &self,
        owner: (ChainType, &str),
        manager: (ChainType, &str),
    ) -> Result<Vec<u8>, AddressError> {
        let owner = self.normal_to_hex(owner.0, owner.1)?;
        let manager = self.normal_to_hex(manager.0, manager.1)?;
        self.codec.encode(&owner, &manager)
    }
}
