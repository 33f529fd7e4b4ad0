//! Known protocol contracts and the registry mapping code hashes to them.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bytes::H256;
use crate::error::TypesError;

/// Contracts whose scripts the message compiler recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContractName {
    /// The protocol's multi-chain lock (owner + manager in args).
    DasLock,
    /// Ledger-native single-signature lock.
    Secp256k1Blake160,
    /// Ledger-native multisig lock.
    Secp256k1Multisig,
    AccountCellType,
    AccountSaleCellType,
    BalanceCellType,
    DidCellType,
    OfferCellType,
    ReverseRecordCellType,
    DpCellType,
}

impl ContractName {
    pub const ALL: [ContractName; 10] = [
        ContractName::DasLock,
        ContractName::Secp256k1Blake160,
        ContractName::Secp256k1Multisig,
        ContractName::AccountCellType,
        ContractName::AccountSaleCellType,
        ContractName::BalanceCellType,
        ContractName::DidCellType,
        ContractName::OfferCellType,
        ContractName::ReverseRecordCellType,
        ContractName::DpCellType,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContractName::DasLock => "das-lock",
            ContractName::Secp256k1Blake160 => "secp256k1-blake160",
            ContractName::Secp256k1Multisig => "secp256k1-multisig",
            ContractName::AccountCellType => "account-cell-type",
            ContractName::AccountSaleCellType => "account-sale-cell-type",
            ContractName::BalanceCellType => "balance-cell-type",
            ContractName::DidCellType => "did-cell-type",
            ContractName::OfferCellType => "offer-cell-type",
            ContractName::ReverseRecordCellType => "reverse-record-cell-type",
            ContractName::DpCellType => "dp-cell-type",
        }
    }
}

impl fmt::Display for ContractName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractName {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContractName::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| TypesError::UnknownContract(s.to_string()))
    }
}

/// Resolves script code hashes to contract names and back.
pub trait ContractRegistry: Send + Sync {
    fn name_for_code_hash(&self, code_hash: &H256) -> Option<ContractName>;

    fn code_hash_for(&self, name: ContractName) -> Option<H256>;

    /// Whether `code_hash` is the deployed code hash of `name`.
    fn is_contract(&self, name: ContractName, code_hash: &H256) -> bool {
        self.name_for_code_hash(code_hash) == Some(name)
    }
}

/// A registry built from a fixed name → code hash table (usually config).
#[derive(Debug, Clone, Default)]
pub struct StaticContractRegistry {
    by_name: BTreeMap<ContractName, H256>,
    by_hash: HashMap<H256, ContractName>,
}

impl StaticContractRegistry {
    /// Build the registry. A code hash shared by two contracts is rejected,
    /// since classification by that hash would be ambiguous.
    pub fn new(
        entries: impl IntoIterator<Item = (ContractName, H256)>,
    ) -> Result<Self, TypesError> {
        let mut registry = StaticContractRegistry::default();
        for (name, code_hash) in entries {
            if let Some(existing) = registry.by_hash.get(&code_hash) {
                if *existing != name {
                    return Err(TypesError::AmbiguousCodeHash {
                        code_hash: code_hash.to_string(),
                        first: existing.to_string(),
                        second: name.to_string(),
                    });
                }
            }
            if let Some(previous) = registry.by_name.insert(name, code_hash) {
                registry.by_hash.remove(&previous);
            }
            registry.by_hash.insert(code_hash, name);
        }
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl ContractRegistry for StaticContractRegistry {
    fn name_for_code_hash(&self, code_hash: &H256) -> Option<ContractName> {
        self.by_hash.get(code_hash).copied()
    }

    fn code_hash_for(&self, name: ContractName) -> Option<H256> {
        self.by_name.get(&name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_both_directions() {
        let reg = StaticContractRegistry::new([
            (ContractName::DasLock, H256([1; 32])),
            (ContractName::AccountCellType, H256([2; 32])),
        ])
        .unwrap();
        assert_eq!(
            reg.name_for_code_hash(&H256([2; 32])),
            Some(ContractName::AccountCellType)
        );
        assert_eq!(reg.code_hash_for(ContractName::DasLock), Some(H256([1; 32])));
        assert!(reg.is_contract(ContractName::DasLock, &H256([1; 32])));
        assert!(!reg.is_contract(ContractName::DpCellType, &H256([1; 32])));
        assert_eq!(reg.name_for_code_hash(&H256([9; 32])), None);
    }

    #[test]
    fn shared_code_hash_is_rejected() {
        let err = StaticContractRegistry::new([
            (ContractName::OfferCellType, H256([3; 32])),
            (ContractName::DpCellType, H256([3; 32])),
        ])
        .unwrap_err();
        assert!(matches!(err, TypesError::AmbiguousCodeHash { .. }));
    }

    #[test]
    fn names_parse_from_config_strings() {
        for name in ContractName::ALL {
            assert_eq!(name.as_str().parse::<ContractName>().unwrap(), name);
        }
        assert!("nope".parse::<ContractName>().is_err());
    }
}
