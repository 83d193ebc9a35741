//! ledgerline-ingest: turns extracted statement text into deduplicated
//! transaction records and balance facts.
//!
//! Lines flow through [`LineClassifier`] → [`extract`] → [`DateNormalizer`]
//! → [`TransactionRecord`](ledgerline_core::TransactionRecord) →
//! [`KeyLedger`](ledgerline_core::KeyLedger). Summary lines go to
//! [`balance`] instead.

pub mod balance;
pub mod batch;
pub mod classifier;
pub mod dates;
pub mod detect;
pub mod extract;
pub mod parsers;
pub mod period;
pub mod processor;
pub mod rules;
pub mod types;

pub use batch::{BatchOutput, process_batch, process_batch_parallel, process_batch_with};
pub use classifier::{Classification, LineClassifier};
pub use dates::{DEFAULT_ROLLOVER_MONTHS, DateNormalizer, YearPolicy};
pub use detect::{Detection, detect_statement_type};
pub use period::PeriodScanner;
pub use processor::{DocumentReport, RuleBook, StatementContext, process_document};
pub use rules::{Layout, Rule, RuleKind, SignConvention};
pub use types::{ProcessOptions, SourceDocument, TypeSelection};
