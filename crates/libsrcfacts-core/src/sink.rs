use std::sync::{Mutex, PoisonError};

use crate::error::SrcFactsError;
use crate::types::{Relation, Tuple};

/// Destination for emitted facts
pub trait TupleSink: Send + Sync {
    fn emit(&self, tuple: Tuple) -> Result<(), SrcFactsError>;

    fn emit_all(&self, tuples: Vec<Tuple>) -> Result<(), SrcFactsError> {
        for tuple in tuples {
            self.emit(tuple)?;
        }
        Ok(())
    }
}

/// Sink that keeps every tuple in memory, in emission order
#[derive(Debug, Default)]
pub struct MemorySink {
    tuples: Mutex<Vec<Tuple>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tuples(&self) -> Vec<Tuple> {
        self.tuples.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn of_relation(&self, relation: Relation) -> Vec<Tuple> {
        self.tuples
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|t| t.relation() == relation)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tuples.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TupleSink for MemorySink {
    fn emit(&self, tuple: Tuple) -> Result<(), SrcFactsError> {
        self.tuples
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tuple);
        Ok(())
    }
}
