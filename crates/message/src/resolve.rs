//! Concurrent resolution of a transaction's inputs.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use dotbit_types::{Cell, CellInput};

use crate::error::CompileError;
use crate::lookup::{CellLookup, LookupError};

/// Fetch the cell spent by every input, one task per input.
///
/// Each task fills its own slot of an index-addressed slab, so the result
/// keeps input order whatever order lookups finish in. The first failure
/// aborts the tasks still running.
pub async fn resolve_inputs(
    lookup: Arc<dyn CellLookup>,
    inputs: &[CellInput],
) -> Result<Vec<Cell>, CompileError> {
    let mut slab: Vec<Option<Cell>> = vec![None; inputs.len()];
    let mut tasks = JoinSet::new();
    let mut task_index = HashMap::with_capacity(inputs.len());

    for (index, input) in inputs.iter().enumerate() {
        let lookup = Arc::clone(&lookup);
        let out_point = input.previous_output.clone();
        let handle = tasks.spawn(async move {
            let result = lookup.lookup_input_cell(&out_point).await;
            (index, result)
        });
        task_index.insert(handle.id(), index);
    }

    while let Some(joined) = tasks.join_next().await {
        let (index, result) = match joined {
            Ok(done) => done,
            Err(e) => {
                // Every spawned task id is recorded above.
                let index = task_index[&e.id()];
                (index, Err(LookupError::Backend(format!("lookup task failed: {}", e))))
            }
        };
        match result {
            Ok(cell) => slab[index] = Some(cell),
            Err(source) => {
                let out_point = &inputs[index].previous_output;
                warn!(
                    index,
                    tx_hash = %out_point.tx_hash,
                    out_index = out_point.index,
                    error = %source,
                    "input lookup failed"
                );
                tasks.abort_all();
                return Err(CompileError::UnresolvedInput {
                    index,
                    tx_hash: out_point.tx_hash,
                    out_index: out_point.index,
                    source,
                });
            }
        }
    }

    debug!(inputs = inputs.len(), "inputs resolved");
    slab.into_iter()
        .enumerate()
        .map(|(index, cell)| {
            cell.ok_or_else(|| {
                let out_point = &inputs[index].previous_output;
                CompileError::UnresolvedInput {
                    index,
                    tx_hash: out_point.tx_hash,
                    out_index: out_point.index,
                    source: LookupError::NotFound,
                }
            })
        })
        .collect()
}
