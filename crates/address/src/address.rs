use serde::Serialize;

use dotbit_types::bytes::{decode_hex, encode_hex};

use crate::chain::{ChainType, LengthTable};
use crate::error::AddressError;

/// A chain-tagged address payload whose length matches its chain's entry
/// in the [`LengthTable`] it was built against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChainAddress {
    chain_type: ChainType,
    payload: Vec<u8>,
}

impl ChainAddress {
    pub fn new(
        chain_type: ChainType,
        payload: Vec<u8>,
        table: &LengthTable,
    ) -> Result<Self, AddressError> {
        let expected = table
            .payload_len(chain_type)
            .ok_or(AddressError::UnknownTag {
                tag: chain_type.tag(),
                offset: 0,
            })?;
        if payload.len() != expected {
            return Err(AddressError::InvalidLength {
                chain: chain_type,
                expected,
                actual: payload.len(),
            });
        }
        Ok(ChainAddress {
            chain_type,
            payload,
        })
    }

    /// Parse the tagged binary form of a single segment. The whole slice
    /// must be consumed.
    pub fn from_tagged_bytes(bytes: &[u8], table: &LengthTable) -> Result<Self, AddressError> {
        let (&tag, payload) = bytes
            .split_first()
            .ok_or(AddressError::MissingTag { offset: 0 })?;
        let (chain, _) = table
            .lookup_tag(tag)
            .ok_or(AddressError::UnknownTag { tag, offset: 0 })?;
        ChainAddress::new(chain, payload.to_vec(), table)
    }

    /// Parse the tagged hex form (`0x` + hex of tag and payload).
    pub fn from_tagged_hex(value: &str, table: &LengthTable) -> Result<Self, AddressError> {
        ChainAddress::from_tagged_bytes(&decode_hex(value)?, table)
    }

    pub fn chain_type(&self) -> ChainType {
        self.chain_type
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// `tag ++ payload`.
    pub fn to_tagged_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.payload.len());
        out.push(self.chain_type.tag());
        out.extend_from_slice(&self.payload);
        out
    }

    pub fn to_tagged_hex(&self) -> String {
        encode_hex(&self.to_tagged_bytes())
    }

    /// Lowercase hex of the payload alone, without prefix. Used as a map key
    /// when matching owners by raw payload.
    pub fn payload_key(&self) -> String {
        hex::encode(&self.payload)
    }

    pub fn to_address_hex(&self) -> AddressHex {
        AddressHex {
            chain_type: self.chain_type,
            address_hex: encode_hex(&self.payload),
        }
    }
}

/// An address payload as `0x`-prefixed hex, carried with its chain type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressHex {
    pub chain_type: ChainType,
    pub address_hex: String,
}

/// An address in its chain's human display form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressNormal {
    pub chain_type: ChainType,
    pub address_normal: String,
}
