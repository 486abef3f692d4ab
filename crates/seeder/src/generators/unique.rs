//! Run-scoped uniqueness tracking for generated values.

use std::collections::HashSet;

use crate::errors::SeedError;

/// Values already handed out for one field during the current run.
#[derive(Debug)]
pub struct UniqueValues {
    field: &'static str,
    max_attempts: usize,
    seen: HashSet<String>,
}

impl UniqueValues {
    pub fn new(field: &'static str, max_attempts: usize) -> Self {
        Self {
            field,
            max_attempts,
            seen: HashSet::new(),
        }
    }

    /// Calls `make` until it yields a value not seen before in this run.
    ///
    /// Gives up with [`SeedError::GenerationExhausted`] after `max_attempts`
    /// collisions in a row.
    pub fn claim_with(&mut self, mut make: impl FnMut() -> String) -> Result<String, SeedError> {
        for _ in 0..self.max_attempts {
            let candidate = make();
            if !self.seen.contains(&candidate) {
                self.seen.insert(candidate.clone());
                return Ok(candidate);
            }
        }

        Err(SeedError::GenerationExhausted {
            field: self.field,
            attempts: self.max_attempts,
        })
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
