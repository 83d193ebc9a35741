//! ledgerline-report: CSV/JSON export, debit-total validation and the
//! processing summary printed after a batch run.

pub mod export;
pub mod summary;
pub mod validation;

pub use export::{write_balances_csv, write_csv, write_json, write_transactions_csv};
pub use summary::{render_summary, render_validation};
pub use validation::{DebitValidation, ValidationStatus, ValidationTally, validate_batch, validate_debits};
