//! Batch runs: many documents against one dedup key set.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use ledgerline_core::{
    BalanceFact, BatchTotals, Deduplicator, DocumentWarning, SharedDeduplicator, TransactionRecord,
};
use serde::Serialize;
use tracing::info;

use crate::processor::{DocumentReport, RuleBook, process_document};
use crate::types::{ProcessOptions, SourceDocument};

/// Per-document reports in input order plus batch totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchOutput {
    pub documents: Vec<DocumentReport>,
    pub totals: BatchTotals,
}

impl BatchOutput {
    fn from_reports(documents: Vec<DocumentReport>) -> Self {
        let mut totals = BatchTotals::default();
        for doc in &documents {
            totals.absorb(doc.counts, doc.sums, doc.has_warnings());
        }
        info!(
            files = totals.files_processed,
            transactions = totals.counts.transactions_accepted,
            duplicates = totals.counts.duplicates_rejected,
            skipped = totals.counts.skipped(),
            warned = totals.documents_with_warnings,
            "batch complete"
        );
        Self { documents, totals }
    }

    /// Accepted transactions, document by document, in line order.
    pub fn transactions(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.documents.iter().flat_map(|d| d.transactions.iter())
    }

    pub fn balances(&self) -> impl Iterator<Item = &BalanceFact> {
        self.documents.iter().flat_map(|d| d.balances.iter())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DocumentWarning> {
        self.documents.iter().flat_map(|d| d.warnings.iter())
    }
}

/// Process documents one after another with a fresh key set.
pub fn process_batch(
    rulebook: &RuleBook,
    documents: &[SourceDocument],
    options: &ProcessOptions,
) -> BatchOutput {
    let mut dedup = Deduplicator::new();
    process_batch_with(rulebook, documents, options, &mut dedup)
}

/// Like [`process_batch`], but against a caller-owned key set so several
/// calls can share one dedup scope.
pub fn process_batch_with(
    rulebook: &RuleBook,
    documents: &[SourceDocument],
    options: &ProcessOptions,
    dedup: &mut Deduplicator,
) -> BatchOutput {
    let reports = documents
        .iter()
        .map(|doc| process_document(rulebook, doc, options, dedup))
        .collect();
    BatchOutput::from_reports(reports)
}

/// Process documents on `workers` scoped threads sharing one key set.
///
/// Reports come back in input order. Which copy of a cross-document
/// duplicate is accepted depends on scheduling; the totals do not.
pub fn process_batch_parallel(
    rulebook: &RuleBook,
    documents: &[SourceDocument],
    options: &ProcessOptions,
    workers: usize,
) -> BatchOutput {
    let workers = workers.clamp(1, documents.len().max(1));
    let shared = SharedDeduplicator::new();
    let next = AtomicUsize::new(0);
    let (shared, next) = (&shared, &next);

    let mut indexed: Vec<(usize, DocumentReport)> = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(move || {
                    let mut ledger = shared;
                    let mut done = Vec::new();
                    loop {
                        let idx = next.fetch_add(1, Ordering::Relaxed);
                        let Some(doc) = documents.get(idx) else {
                            break;
                        };
                        done.push((idx, process_document(rulebook, doc, options, &mut ledger)));
                    }
                    done
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    });

    indexed.sort_by_key(|(idx, _)| *idx);
    BatchOutput::from_reports(indexed.into_iter().map(|(_, report)| report).collect())
}
