//! dotbit-types: ledger-side data shared by the address codec and the
//! message compiler.
//!
//! Cells, scripts and transactions are plain read-only values here. Their
//! wire encoding belongs to the ledger; this crate only carries the decoded
//! shape plus a JSON form (hex strings with a `0x` prefix) used by fixtures
//! and the CLI.

pub mod bytes;
pub mod contract;
pub mod error;
pub mod net;
pub mod script;
pub mod transaction;

pub use bytes::H256;
pub use contract::{ContractName, ContractRegistry, StaticContractRegistry};
pub use error::TypesError;
pub use net::NetType;
pub use script::{HashType, Script};
pub use transaction::{Cell, CellInput, CellOutput, OutPoint, Transaction};
