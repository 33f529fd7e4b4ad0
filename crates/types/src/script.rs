use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bytes::{hex_bytes, H256};
use crate::error::TypesError;

/// How a script's code hash is matched against cell deps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashType {
    Data,
    Type,
    Data1,
    Data2,
}

impl HashType {
    /// The single byte used for this hash type in serialized scripts and
    /// full addresses.
    pub fn as_byte(self) -> u8 {
        match self {
            HashType::Data => 0x00,
            HashType::Type => 0x01,
            HashType::Data1 => 0x02,
            HashType::Data2 => 0x04,
        }
    }

    pub fn from_byte(b: u8) -> Result<Self, TypesError> {
        match b {
            0x00 => Ok(HashType::Data),
            0x01 => Ok(HashType::Type),
            0x02 => Ok(HashType::Data1),
            0x04 => Ok(HashType::Data2),
            other => Err(TypesError::UnknownHashType(format!("0x{:02x}", other))),
        }
    }
}

impl fmt::Display for HashType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02x}", self.as_byte())
    }
}

/// A lock or type script.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Script {
    pub code_hash: H256,
    pub hash_type: HashType,
    #[serde(with = "hex_bytes")]
    pub args: Vec<u8>,
}

impl Script {
    pub fn new(code_hash: H256, hash_type: HashType, args: Vec<u8>) -> Self {
        Script {
            code_hash,
            hash_type,
            args,
        }
    }
}
