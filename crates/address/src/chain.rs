//! Chain tags and the tag → payload-length table.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The chain an address segment belongs to. The discriminant is the tag
/// byte written in front of the payload in lock args.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum ChainType {
    Ckb = 0,
    CkbMultisig = 1,
    Eth = 3,
    Tron = 4,
    Eth712 = 5,
    Ed25519 = 6,
    Doge = 7,
    WebAuthn = 8,
    Bitcoin = 9,
}

impl ChainType {
    pub const ALL: [ChainType; 9] = [
        ChainType::Ckb,
        ChainType::CkbMultisig,
        ChainType::Eth,
        ChainType::Tron,
        ChainType::Eth712,
        ChainType::Ed25519,
        ChainType::Doge,
        ChainType::WebAuthn,
        ChainType::Bitcoin,
    ];

    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<ChainType> {
        ChainType::ALL.into_iter().find(|c| c.tag() == tag)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChainType::Ckb => "ckb",
            ChainType::CkbMultisig => "ckb-multisig",
            ChainType::Eth => "eth",
            ChainType::Tron => "tron",
            ChainType::Eth712 => "eth712",
            ChainType::Ed25519 => "ed25519",
            ChainType::Doge => "doge",
            ChainType::WebAuthn => "web-authn",
            ChainType::Bitcoin => "bitcoin",
        }
    }

    /// Chain types whose display form is a full ledger address.
    pub fn is_native(self) -> bool {
        matches!(
            self,
            ChainType::Ckb | ChainType::CkbMultisig | ChainType::WebAuthn
        )
    }
}

impl fmt::Display for ChainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ChainType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(tag) = s.parse::<u8>() {
            return ChainType::from_tag(tag).ok_or_else(|| format!("unknown chain tag {}", tag));
        }
        ChainType::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown chain type '{}'", s))
    }
}

/// Payload length per chain tag.
///
/// Encode and decode both read this table; a chain type missing from it is
/// treated as an unrecognized tag. The default matches the deployed
/// protocol, and a deployment may override entries from configuration when
/// a new address variant is rolled out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LengthTable {
    lengths: BTreeMap<ChainType, usize>,
}

impl Default for LengthTable {
    fn default() -> Self {
        let lengths = ChainType::ALL
            .into_iter()
            .map(|c| {
                let len = match c {
                    ChainType::Ed25519 => 32,
                    _ => 20,
                };
                (c, len)
            })
            .collect();
        LengthTable { lengths }
    }
}

impl LengthTable {
    /// An empty table; every tag is unrecognized until inserted.
    pub fn empty() -> Self {
        LengthTable {
            lengths: BTreeMap::new(),
        }
    }

    /// The default table with `overrides` applied on top.
    pub fn with_overrides(overrides: &BTreeMap<ChainType, usize>) -> Self {
        let mut table = LengthTable::default();
        for (chain, len) in overrides {
            table.lengths.insert(*chain, *len);
        }
        table
    }

    pub fn insert(&mut self, chain: ChainType, len: usize) {
        self.lengths.insert(chain, len);
    }

    pub fn payload_len(&self, chain: ChainType) -> Option<usize> {
        self.lengths.get(&chain).copied()
    }

    /// Resolve a raw tag byte to its chain type and payload length.
    pub fn lookup_tag(&self, tag: u8) -> Option<(ChainType, usize)> {
        let chain = ChainType::from_tag(tag)?;
        self.payload_len(chain).map(|len| (chain, len))
    }
}
