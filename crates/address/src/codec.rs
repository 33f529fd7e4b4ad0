//! Owner/manager lock-args codec.

use tracing::debug;

use crate::address::ChainAddress;
use crate::chain::LengthTable;
use crate::error::AddressError;

/// Result of a lenient decode: the two segments plus how many bytes were
/// left after the manager segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedArgs {
    pub owner: ChainAddress,
    pub manager: ChainAddress,
    pub trailing: usize,
}

/// Encodes and decodes `owner ++ manager` lock args against one length table.
#[derive(Debug, Clone, Default)]
pub struct LockArgsCodec {
    table: LengthTable,
}

impl LockArgsCodec {
    pub fn new(table: LengthTable) -> Self {
        LockArgsCodec { table }
    }

    pub fn table(&self) -> &LengthTable {
        &self.table
    }

    /// Tagged binary of `owner` followed by `manager`.
    ///
    /// Each address is checked against this codec's table, so an address
    /// built against a different table cannot produce undecodable args.
    pub fn encode(
        &self,
        owner: &ChainAddress,
        manager: &ChainAddress,
    ) -> Result<Vec<u8>, AddressError> {
        let mut out = Vec::with_capacity(2 + owner.payload().len() + manager.payload().len());
        for addr in [owner, manager] {
            let checked = ChainAddress::new(addr.chain_type(), addr.payload().to_vec(), &self.table)?;
            out.extend_from_slice(&checked.to_tagged_bytes());
        }
        Ok(out)
    }

    /// Decode args that must hold exactly two segments.
    pub fn decode(&self, blob: &[u8]) -> Result<(ChainAddress, ChainAddress), AddressError> {
        let decoded = self.decode_lenient(blob)?;
        if decoded.trailing != 0 {
            return Err(AddressError::TrailingData {
                len: decoded.trailing,
            });
        }
        Ok((decoded.owner, decoded.manager))
    }

    /// Decode two segments and report, rather than reject, any leftover bytes.
    pub fn decode_lenient(&self, blob: &[u8]) -> Result<DecodedArgs, AddressError> {
        let (owner, offset) = self.read_segment(blob, 0)?;
        let (manager, offset) = self.read_segment(blob, offset)?;
        let trailing = blob.len() - offset;
        if trailing != 0 {
            debug!(trailing, total = blob.len(), "lock args carry trailing bytes");
        }
        Ok(DecodedArgs {
            owner,
            manager,
            trailing,
        })
    }

    fn read_segment(
        &self,
        blob: &[u8],
        offset: usize,
    ) -> Result<(ChainAddress, usize), AddressError> {
        let tag = *blob.get(offset).ok_or(AddressError::MissingTag { offset })?;
        let (chain, len) = self
            .table
            .lookup_tag(tag)
            .ok_or(AddressError::UnknownTag { tag, offset })?;
        let start = offset + 1;
        let available = blob.len() - start;
        if available < len {
            return Err(AddressError::ShortPayload {
                chain,
                expected: len,
                available,
            });
        }
        let end = start + len;
        let addr = ChainAddress::new(chain, blob[start..end].to_vec(), &self.table)?;
        Ok((addr, end))
    }
}
