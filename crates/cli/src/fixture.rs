//! JSON transaction fixtures: a transaction together with the cells its
//! inputs spend and its witness records decoded ahead of time.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use dotbit_message::{StaticCellLookup, WitnessFacts};
use dotbit_types::{Cell, OutPoint, Transaction};

#[derive(Debug, thiserror::Error)]
pub(crate) enum FixtureError {
    #[error("transaction file not found: {}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ResolvedInput {
    pub out_point: OutPoint,
    pub cell: Cell,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TxFixture {
    pub transaction: Transaction,
    #[serde(default)]
    pub input_cells: Vec<ResolvedInput>,
    #[serde(default)]
    pub witness: WitnessFacts,
}

impl TxFixture {
    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let text = std::fs::read_to_string(path).map_err(|source| FixtureError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| FixtureError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn cell_lookup(&self) -> StaticCellLookup {
        let mut lookup = StaticCellLookup::empty();
        for input in &self.input_cells {
            lookup.insert(input.out_point.clone(), input.cell.clone());
        }
        lookup
    }
}
