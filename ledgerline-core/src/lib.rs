//! ledgerline-core: record types, deduplication and error kinds shared by the
//! statement parsing engine and its collaborators.

pub mod balance;
pub mod counts;
pub mod dedup;
pub mod error;
pub mod record;
pub mod statement;

pub use balance::{BalanceFact, BalanceLabel, SummaryKind};
pub use counts::{AmountSums, BatchTotals, DocumentCounts};
pub use dedup::{DedupOutcome, Deduplicator, KeyLedger, SharedDeduplicator};
pub use error::{DocumentWarning, LineError, PeriodParseError};
pub use record::{TransactionFields, TransactionRecord, dedup_key};
pub use statement::{Direction, StatementPeriod, StatementType, month_from_name, month_index};
