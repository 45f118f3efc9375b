//! Batch accumulation for dispatch
//!
//! Mapped records are grouped into bounded batches. Each batch keeps a
//! parallel list of reconciliation keys in the same order as its records.

use crate::domain::{BatchKey, NormalizedRecord};

/// A bounded, ordered group of records sent as one payload
#[derive(Debug, Clone, Default)]
pub struct Batch {
    records: Vec<NormalizedRecord>,
    keys: Vec<BatchKey>,
}

impl Batch {
    /// Records in extraction order
    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    /// Reconciliation keys, parallel to [`Batch::records`]
    pub fn keys(&self) -> &[BatchKey] {
        &self.keys
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Accumulates records until a batch is full
pub struct BatchAccumulator {
    max_batch_size: usize,
    current: Batch,
}

impl BatchAccumulator {
    /// Create a new accumulator
    ///
    /// A `max_batch_size` of zero is treated as one.
    pub fn new(max_batch_size: usize) -> Self {
        let max_batch_size = max_batch_size.max(1);
        Self {
            max_batch_size,
            current: Batch {
                records: Vec::with_capacity(max_batch_size),
                keys: Vec::with_capacity(max_batch_size),
            },
        }
    }

    /// Appends a record and its key
    pub fn add(&mut self, record: NormalizedRecord, key: BatchKey) {
        self.current.records.push(record);
        self.current.keys.push(key);
    }

    /// Whether the current batch has reached the size limit
    pub fn is_full(&self) -> bool {
        self.current.len() >= self.max_batch_size
    }

    /// Number of records waiting
    pub fn len(&self) -> usize {
        self.current.len()
    }

    /// Whether nothing is waiting
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Takes the current batch, leaving an empty one behind
    pub fn drain(&mut self) -> Batch {
        std::mem::replace(
            &mut self.current,
            Batch {
                records: Vec::with_capacity(self.max_batch_size),
                keys: Vec::with_capacity(self.max_batch_size),
            },
        )
    }
}
