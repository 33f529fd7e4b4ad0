//! Resolution of transaction inputs to the cells they spend.

use std::collections::HashMap;

use async_trait::async_trait;

use dotbit_types::{Cell, OutPoint};

/// Errors from an external cell lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// The out point does not name a live or historical cell.
    #[error("cell not found")]
    NotFound,

    /// The backing data source failed (RPC error, timeout, ...).
    #[error("lookup backend error: {0}")]
    Backend(String),
}

/// Resolves an input's previous output.
///
/// Implementations may hit a remote node; the compiler calls them
/// concurrently, one call per input, and never retries.
#[async_trait]
pub trait CellLookup: Send + Sync {
    async fn lookup_input_cell(&self, out_point: &OutPoint) -> Result<Cell, LookupError>;
}

/// A lookup over a fixed set of cells.
///
/// Useful for tests and for replaying a transaction whose inputs were
/// fetched ahead of time.
#[derive(Debug, Clone, Default)]
pub struct StaticCellLookup {
    cells: HashMap<OutPoint, Cell>,
}

impl StaticCellLookup {
    pub fn new(cells: HashMap<OutPoint, Cell>) -> Self {
        Self { cells }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, out_point: OutPoint, cell: Cell) {
        self.cells.insert(out_point, cell);
    }
}

#[async_trait]
impl CellLookup for StaticCellLookup {
    async fn lookup_input_cell(&self, out_point: &OutPoint) -> Result<Cell, LookupError> {
        self.cells.get(out_point).cloned().ok_or(LookupError::NotFound)
    }
}
