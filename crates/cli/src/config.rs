//! Deployment configuration read from TOML.
//!
//! ```toml
//! net = "testnet2"
//! evm_chain_id = 0
//!
//! [contracts]
//! das-lock = "0x…"
//! dp-cell-type = "0x…"
//!
//! [address_lengths]
//! bitcoin = 20
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use dotbit_address::{ChainType, LengthTable};
use dotbit_types::{ContractName, NetType, StaticContractRegistry, TypesError, H256};

#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("config file not found: {}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid contract table: {0}")]
    Registry(#[from] TypesError),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CliConfig {
    #[serde(default)]
    pub net: NetType,
    /// 0 lets the compiler pick the network default.
    #[serde(default)]
    pub evm_chain_id: u64,
    /// Deployed code hash (type id) per contract.
    #[serde(default)]
    pub contracts: BTreeMap<ContractName, H256>,
    #[serde(default)]
    pub address_lengths: BTreeMap<ChainType, usize>,
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path` when given, otherwise the empty default (mainnet, no
    /// contracts, default lengths).
    pub fn load_optional(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn registry(&self) -> Result<StaticContractRegistry, ConfigError> {
        Ok(StaticContractRegistry::new(
            self.contracts.iter().map(|(name, hash)| (*name, *hash)),
        )?)
    }

    pub fn length_table(&self) -> LengthTable {
        LengthTable::with_overrides(&self.address_lengths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let text = format!(
            r#"
net = "testnet2"
evm_chain_id = 17000

[contracts]
das-lock = "0x{}"
dp-cell-type = "0x{}"

[address_lengths]
bitcoin = 21
"#,
            "11".repeat(32),
            "22".repeat(32)
        );
        let config: CliConfig = toml::from_str(&text).unwrap();
        assert_eq!(config.net, NetType::Testnet2);
        assert_eq!(config.evm_chain_id, 17000);
        assert_eq!(config.registry().unwrap().len(), 2);
        assert_eq!(config.length_table().payload_len(ChainType::Bitcoin), Some(21));
    }

    #[test]
    fn empty_config_defaults_to_mainnet() {
        let config: CliConfig = toml::from_str("").unwrap();
        assert_eq!(config.net, NetType::Mainnet);
        assert!(config.registry().unwrap().is_empty());
        assert_eq!(config.length_table(), LengthTable::default());
    }

    #[test]
    fn shared_code_hash_is_rejected() {
        let hash = format!("0x{}", "33".repeat(32));
        let text = format!(
            "[contracts]\naccount-cell-type = \"{}\"\noffer-cell-type = \"{}\"\n",
            hash, hash
        );
        let config: CliConfig = toml::from_str(&text).unwrap();
        assert!(matches!(config.registry(), Err(ConfigError::Registry(_))));
    }

    #[test]
    fn unknown_keys_fail() {
        assert!(toml::from_str::<CliConfig>("network = \"mainnet\"").is_err());
    }
}
