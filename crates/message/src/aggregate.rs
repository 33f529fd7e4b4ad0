//! Order-preserving grouped sums.

use std::collections::HashMap;

use crate::error::CompileError;

/// Amounts summed per key, remembering the order in which keys first
/// appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedAmounts {
    order: Vec<String>,
    totals: HashMap<String, u64>,
}

impl GroupedAmounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to `key`'s group, opening the group at the end of the
    /// order if it is new.
    pub fn add(&mut self, key: String, amount: u64) -> Result<(), CompileError> {
        match self.totals.get_mut(&key) {
            Some(total) => {
                *total = total.checked_add(amount).ok_or_else(|| {
                    CompileError::InvalidAmount(format!("total for {} overflows u64", key))
                })?;
            }
            None => {
                self.totals.insert(key.clone(), amount);
                self.order.push(key);
            }
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.totals.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Groups in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.order
            .iter()
            .map(|k| (k.as_str(), self.totals.get(k).copied().unwrap_or_default()))
    }

    /// `key(amount UNIT), key(amount UNIT), ...` with amounts rendered by
    /// `render`.
    pub fn render(&self, unit: &str, render: impl Fn(u64) -> String) -> String {
        self.iter()
            .map(|(key, amount)| format!("{}({} {})", key, render(amount), unit))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
