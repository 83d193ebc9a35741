//! Batch-scoped duplicate suppression.
//!
//! One key set lives for the whole batch run, so a transaction repeated in a
//! second document is caught as well. The set is passed explicitly: a plain
//! [`Deduplicator`] behind `&mut` for sequential runs, or a
//! [`SharedDeduplicator`] when documents are processed on several threads.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::record::TransactionRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupOutcome {
    Accepted,
    DuplicateRejected,
}

/// Anything that can admit or reject a record by its dedup key.
pub trait KeyLedger {
    fn admit(&mut self, record: &TransactionRecord) -> DedupOutcome;
}

#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
    rejected: usize,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the key if new; otherwise count a rejection.
    pub fn add(&mut self, record: &TransactionRecord) -> DedupOutcome {
        if self.seen.insert(record.dedup_key().to_string()) {
            DedupOutcome::Accepted
        } else {
            self.rejected += 1;
            DedupOutcome::DuplicateRejected
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    /// Number of distinct keys accepted so far.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }
}

impl KeyLedger for Deduplicator {
    fn admit(&mut self, record: &TransactionRecord) -> DedupOutcome {
        self.add(record)
    }
}

/// A [`Deduplicator`] whose check-and-insert runs under one mutex, so two
/// threads can never both accept the same key.
#[derive(Debug, Default)]
pub struct SharedDeduplicator {
    inner: Mutex<Deduplicator>,
}

impl SharedDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, record: &TransactionRecord) -> DedupOutcome {
        self.lock().add(record)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn rejected(&self) -> usize {
        self.lock().rejected()
    }

    pub fn into_inner(self) -> Deduplicator {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> MutexGuard<'_, Deduplicator> {
        // The key set stays consistent even if a holder panicked mid-batch.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<Deduplicator> for SharedDeduplicator {
    fn from(inner: Deduplicator) -> Self {
        Self {
            inner: Mutex::new(inner),
        }
    }
}

impl KeyLedger for &SharedDeduplicator {
    fn admit(&mut self, record: &TransactionRecord) -> DedupOutcome {
        self.add(record)
    }
}
