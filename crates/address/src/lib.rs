//! dotbit-address: the owner/manager lock-args codec.
//!
//! A das-lock script's args carry two tagged address segments back to back,
//! `tag ++ payload ++ tag ++ payload`, with no length prefix. The payload
//! length of each segment is looked up from the tag in a [`LengthTable`];
//! the same table drives both [`LockArgsCodec::encode`] and
//! [`LockArgsCodec::decode`].
//!
//! [`AddressFormat`] layers the per-chain display forms on top: checksummed
//! hex for EVM chains, base58check for Tron/Dogecoin/Bitcoin, and full CKB
//! addresses for the ledger-native chain types.

pub mod address;
pub mod chain;
pub mod codec;
pub mod display;
pub mod error;
pub mod format;

pub use address::{AddressHex, AddressNormal, ChainAddress};
pub use chain::{ChainType, LengthTable};
pub use codec::{DecodedArgs, LockArgsCodec};
pub use error::AddressError;
pub use format::AddressFormat;
