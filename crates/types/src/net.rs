use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Network selector, fixed for the lifetime of one compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetType {
    #[default]
    Mainnet,
    Testnet2,
    Testnet3,
}

impl NetType {
    pub fn is_mainnet(self) -> bool {
        self == NetType::Mainnet
    }

    /// Human-readable part of full CKB addresses on this network.
    pub fn address_hrp(self) -> &'static str {
        if self.is_mainnet() {
            "ckb"
        } else {
            "ckt"
        }
    }

    /// EVM chain id used for the signing domain when the caller passes 0.
    pub fn default_evm_chain_id(self) -> u64 {
        if self.is_mainnet() {
            1
        } else {
            17000
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NetType::Mainnet => "mainnet",
            NetType::Testnet2 => "testnet2",
            NetType::Testnet3 => "testnet3",
        }
    }
}

impl fmt::Display for NetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" => Ok(NetType::Mainnet),
            "testnet2" => Ok(NetType::Testnet2),
            "testnet3" => Ok(NetType::Testnet3),
            other => Err(format!("unknown net type '{}'", other)),
        }
    }
}
