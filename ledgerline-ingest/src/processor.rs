//! Per-document orchestration: classify each line, route transactions
//! through extraction, date normalization, record building and dedup, and
//! summary lines through balance extraction.
//!
//! A bad line is counted and skipped; it never aborts the document.

use anyhow::Result;
use ledgerline_core::{
    AmountSums, BalanceFact, DedupOutcome, DocumentCounts, DocumentWarning, KeyLedger, LineError,
    StatementPeriod, StatementType, SummaryKind, TransactionFields, TransactionRecord,
};
use regex::Captures;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::balance::extract_balance;
use crate::classifier::{Classification, LineClassifier};
use crate::dates::{DateNormalizer, YearPolicy};
use crate::detect::detect_statement_type;
use crate::extract::extract_fields;
use crate::period::PeriodScanner;
use crate::rules::Layout;
use crate::types::{ProcessOptions, SourceDocument, TypeSelection};

/// Compiled rule tables and period patterns, built once per run and shared
/// by every document (and thread).
#[derive(Debug, Clone)]
pub struct RuleBook {
    credit_card: LineClassifier,
    current_account: LineClassifier,
    periods: PeriodScanner,
}

impl RuleBook {
    pub fn new() -> Result<Self> {
        Ok(Self {
            credit_card: LineClassifier::new(StatementType::CreditCard)?,
            current_account: LineClassifier::new(StatementType::CurrentAccount)?,
            periods: PeriodScanner::new()?,
        })
    }

    pub fn classifier(&self, statement_type: StatementType) -> &LineClassifier {
        match statement_type {
            StatementType::CreditCard => &self.credit_card,
            StatementType::CurrentAccount => &self.current_account,
        }
    }

    pub fn periods(&self) -> &PeriodScanner {
        &self.periods
    }
}

/// Per-document working state. The dedup key set is not part of it: it is
/// scoped to the batch and passed alongside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementContext {
    pub statement_type: StatementType,
    pub period: Option<StatementPeriod>,
    pub year_policy: YearPolicy,
}

impl StatementContext {
    /// Pick the statement type and period for a document: declared period
    /// first, then one found in the text, then the configured fallback year.
    pub fn resolve(rulebook: &RuleBook, doc: &SourceDocument, options: &ProcessOptions) -> Self {
        let statement_type = match options.statement_type {
            TypeSelection::CreditCard => StatementType::CreditCard,
            TypeSelection::CurrentAccount => StatementType::CurrentAccount,
            TypeSelection::Auto => detect_statement_type(&doc.lines).statement_type,
        };

        let period = doc
            .period
            .or_else(|| {
                let found = rulebook.periods().scan(&doc.lines);
                if let Some(p) = found {
                    debug!(document = %doc.name, period = %p, "inferred statement period");
                }
                found
            })
            .or_else(|| options.fallback_year.and_then(StatementPeriod::year));

        Self {
            statement_type,
            period,
            year_policy: options.year_policy,
        }
    }

    pub fn dates(&self) -> DateNormalizer {
        DateNormalizer::new(self.period, self.year_policy)
    }
}

/// Everything one document produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentReport {
    pub name: String,
    pub statement_type: StatementType,
    pub period: Option<StatementPeriod>,
    pub counts: DocumentCounts,
    pub sums: AmountSums,
    pub warnings: Vec<DocumentWarning>,
    pub transactions: Vec<TransactionRecord>,
    pub balances: Vec<BalanceFact>,
}

impl DocumentReport {
    fn new(name: &str, context: &StatementContext) -> Self {
        Self {
            name: name.to_string(),
            statement_type: context.statement_type,
            period: context.period,
            counts: DocumentCounts::default(),
            sums: AmountSums::default(),
            warnings: Vec::new(),
            transactions: Vec::new(),
            balances: Vec::new(),
        }
    }

    /// First balance fact of the given kind.
    pub fn balance(&self, kind: SummaryKind) -> Option<&BalanceFact> {
        self.balances.iter().find(|b| b.kind == kind)
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Process one document against a batch-scoped key ledger.
pub fn process_document<L: KeyLedger>(
    rulebook: &RuleBook,
    doc: &SourceDocument,
    options: &ProcessOptions,
    ledger: &mut L,
) -> DocumentReport {
    let context = StatementContext::resolve(rulebook, doc, options);
    let mut processor = StatementProcessor {
        classifier: rulebook.classifier(context.statement_type),
        dates: context.dates(),
        context,
        source: &doc.name,
        report: DocumentReport::new(&doc.name, &context),
        pending: None,
    };

    if context.period.is_none() {
        processor.report.warnings.push(DocumentWarning::NoStatementPeriod {
            document: doc.name.clone(),
        });
    }

    for (idx, line) in doc.lines.iter().enumerate() {
        processor.line(idx + 1, line, ledger);
    }
    processor.flush(ledger);
    processor.finish(options.min_lines_for_format_check)
}

/// A transaction waiting for possible continuation lines.
struct Pending {
    line_no: usize,
    fields: TransactionFields,
    details: Vec<String>,
}

struct StatementProcessor<'a> {
    classifier: &'a LineClassifier,
    context: StatementContext,
    dates: DateNormalizer,
    source: &'a str,
    report: DocumentReport,
    pending: Option<Pending>,
}

impl StatementProcessor<'_> {
    fn line<L: KeyLedger>(&mut self, line_no: usize, line: &str, ledger: &mut L) {
        self.report.counts.lines_seen += 1;

        let classification = self.classifier.classify(line);
        if let Classification::Continuation(text) = classification {
            self.attach_detail(text);
            return;
        }

        self.flush(ledger);

        match classification {
            Classification::Transaction {
                pattern_id,
                layout,
                captures,
            } => match self.prepare(pattern_id, &layout, &captures) {
                Ok(fields) => {
                    self.pending = Some(Pending {
                        line_no,
                        fields,
                        details: Vec::new(),
                    })
                }
                Err(err) => self.skip(line_no, pattern_id, err),
            },
            Classification::Balance {
                pattern_id,
                kind,
                captures,
            } => match extract_balance(kind, pattern_id, &captures, &self.dates, self.source) {
                Ok(fact) => {
                    self.report.counts.balance_facts += 1;
                    self.report.balances.push(fact);
                }
                Err(err) => self.skip(line_no, pattern_id, err),
            },
            Classification::Continuation(_) | Classification::Ignored => {}
        }
    }

    fn prepare(
        &self,
        pattern_id: &str,
        layout: &Layout,
        captures: &Captures<'_>,
    ) -> Result<TransactionFields, LineError> {
        let raw = extract_fields(layout, captures)?;
        let transaction_date = self.dates.normalize(raw.transaction_token)?;
        let posting_date = if raw.posting_token == raw.transaction_token {
            transaction_date
        } else {
            self.dates.normalize(raw.posting_token)?
        };

        Ok(TransactionFields {
            raw_date: raw.transaction_token.to_string(),
            posting_date,
            transaction_date,
            description: raw.description,
            amount: raw.amount,
            direction: raw.direction,
            statement_type: self.context.statement_type,
            source_document: self.source.to_string(),
            pattern_id: pattern_id.to_string(),
        })
    }

    fn attach_detail(&mut self, text: &str) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if text != "*" && text.chars().count() > 1 {
            pending.details.push(text);
        }
    }

    /// Build, dedup and accept the pending transaction, if any.
    fn flush<L: KeyLedger>(&mut self, ledger: &mut L) {
        let Some(Pending {
            line_no,
            mut fields,
            details,
        }) = self.pending.take()
        else {
            return;
        };

        if !details.is_empty() {
            fields.description = format!("{} | {}", fields.description, details.join(" | "));
        }
        let pattern_id = fields.pattern_id.clone();

        let record = match TransactionRecord::build(fields) {
            Ok(record) => record,
            Err(err) => return self.skip(line_no, &pattern_id, err),
        };

        match ledger.admit(&record) {
            DedupOutcome::Accepted => {
                self.report.counts.transactions_accepted += 1;
                self.report.sums.add(&record);
                self.report.transactions.push(record);
            }
            DedupOutcome::DuplicateRejected => {
                self.report.counts.duplicates_rejected += 1;
                debug!(
                    document = self.source,
                    line = line_no,
                    key = record.dedup_key(),
                    "duplicate transaction rejected"
                );
            }
        }
    }

    fn skip(&mut self, line_no: usize, pattern_id: &str, err: LineError) {
        debug!(
            document = self.source,
            line = line_no,
            pattern = pattern_id,
            error = %err,
            "skipping line"
        );
        self.report.counts.record_error(&err);
    }

    fn finish(mut self, min_lines_for_format_check: usize) -> DocumentReport {
        let counts = self.report.counts;
        if counts.lines_seen >= min_lines_for_format_check
            && counts.transactions_accepted == 0
            && counts.duplicates_rejected == 0
        {
            self.report.warnings.push(DocumentWarning::UnsupportedStatementFormat {
                document: self.report.name.clone(),
                lines_seen: counts.lines_seen,
            });
        }

        for warning in &self.report.warnings {
            warn!("{warning}");
        }
        info!(
            document = %self.report.name,
            statement_type = %self.report.statement_type,
            lines = counts.lines_seen,
            transactions = counts.transactions_accepted,
            duplicates = counts.duplicates_rejected,
            skipped = counts.skipped(),
            balances = counts.balance_facts,
            "processed statement"
        );
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ledgerline_core::{BalanceLabel, Deduplicator, Direction};
    use rust_decimal::Decimal;

    fn card_options() -> ProcessOptions {
        ProcessOptions {
            statement_type: TypeSelection::CreditCard,
            ..ProcessOptions::default()
        }
    }

    fn account_options() -> ProcessOptions {
        ProcessOptions {
            statement_type: TypeSelection::CurrentAccount,
            ..ProcessOptions::default()
        }
    }

    fn jan_2024(lines: &[&str]) -> SourceDocument {
        SourceDocument::new("jan.txt", lines.iter().map(|l| l.to_string()).collect())
            .with_period(StatementPeriod::month(2024, 1).unwrap())
    }

    fn run(doc: &SourceDocument, options: &ProcessOptions) -> DocumentReport {
        let rulebook = RuleBook::new().unwrap();
        let mut dedup = Deduplicator::new();
        process_document(&rulebook, doc, options, &mut dedup)
    }

    #[test]
    fn test_end_to_end_duplicate_payment() {
        let doc = jan_2024(&[
            "15/01 15/01 PAYMENT RECEIVED 500.00 CR",
            "15/01 15/01 PAYMENT RECEIVED 500.00 CR",
        ]);
        let report = run(&doc, &card_options());

        assert_eq!(report.transactions.len(), 1);
        assert_eq!(report.counts.duplicates_rejected, 1);
        let t = &report.transactions[0];
        assert_eq!(t.posting_date(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(t.transaction_date(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(t.description(), "PAYMENT RECEIVED");
        assert_eq!(t.amount(), Decimal::new(50000, 2));
        assert_eq!(t.direction(), Direction::Credit);
        assert_eq!(t.source_document(), "jan.txt");
        assert_eq!(t.pattern_id(), "cc.posting_and_transaction_date");
    }

    #[test]
    fn test_wrap_around_year() {
        let doc = jan_2024(&["02/01 31/12 HOTEL PENANG 320.00"]);
        let report = run(&doc, &card_options());
        let t = &report.transactions[0];
        assert_eq!(t.transaction_date(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert_eq!(t.posting_date(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(t.raw_date(), "31/12");
    }

    #[test]
    fn test_zero_and_text_amounts_are_malformed() {
        let doc = jan_2024(&[
            "15/01 15/01 GRAB RIDE 0.00",
            "15/01 15/01 GRAB RIDE ABC",
            "16/01 16/01 GRAB RIDE 12.00",
        ]);
        let report = run(&doc, &card_options());
        assert_eq!(report.counts.transactions_accepted, 1);
        assert_eq!(report.counts.malformed_skipped, 2);
        assert!(report.transactions.iter().all(|t| t.amount() > Decimal::ZERO));
    }

    #[test]
    fn test_invalid_dates_are_counted_separately() {
        let doc = jan_2024(&["32/01 32/01 GRAB RIDE 12.00", "15/13 15/13 GRAB RIDE 12.00"]);
        let report = run(&doc, &card_options());
        assert_eq!(report.counts.invalid_dates_skipped, 2);
        assert_eq!(report.counts.malformed_skipped, 0);
        assert_eq!(report.counts.skipped(), 2);
    }

    #[test]
    fn test_hundred_lines_ten_malformed() {
        let mut lines = Vec::new();
        for i in 0..100 {
            if i % 10 == 0 {
                lines.push(format!("{:02}/01 {:02}/01 BAD ROW {i} N/A", i % 28 + 1, i % 28 + 1));
            } else {
                lines.push(format!(
                    "{:02}/01 {:02}/01 MERCHANT NUMBER {i} {}.50",
                    i % 28 + 1,
                    i % 28 + 1,
                    i + 1
                ));
            }
        }
        let doc = SourceDocument::new("bulk.txt", lines)
            .with_period(StatementPeriod::month(2024, 1).unwrap());
        let report = run(&doc, &card_options());
        assert_eq!(report.counts.lines_seen, 100);
        assert_eq!(report.counts.transactions_accepted, 90);
        assert_eq!(report.counts.skipped(), 10);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_balance_lines_are_collected_not_deduplicated() {
        let doc = jan_2024(&[
            "YOUR PREVIOUS STATEMENT BALANCE 2,345.67",
            "YOUR PREVIOUS STATEMENT BALANCE 2,345.67",
            "15/01 15/01 PAYMENT RECEIVED 500.00 CR",
        ]);
        let report = run(&doc, &card_options());
        assert_eq!(report.balances.len(), 2);
        assert_eq!(report.counts.balance_facts, 2);
        assert_eq!(report.counts.duplicates_rejected, 0);
        assert!(report.balance(SummaryKind::OpeningBalance).is_some());
        assert!(report.balance(SummaryKind::ClosingBalance).is_none());
    }

    #[test]
    fn test_zero_summaries_are_facts() {
        let doc = jan_2024(&[
            "NEW BALANCE 0.00",
            "TOTAL DEBIT THIS MONTH 0.00",
            "15/01 15/01 PAYMENT RECEIVED 500.00 CR",
        ]);
        let report = run(&doc, &card_options());
        assert_eq!(report.counts.balance_facts, 2);
        assert_eq!(report.counts.malformed_skipped, 0);
        assert_eq!(report.balance(SummaryKind::ClosingBalance).unwrap().amount, Decimal::ZERO);
        assert_eq!(report.balance(SummaryKind::TotalDebit).unwrap().amount, Decimal::ZERO);
    }

    #[test]
    fn test_subtotal_does_not_shadow_closing_balance() {
        let doc = jan_2024(&["SUB TOTAL/JUMLAH 503.70", "TOTAL CURRENT BALANCE 1,000.00"]);
        let report = run(&doc, &card_options());
        let closing: Vec<_> = report
            .balances
            .iter()
            .filter(|b| b.label == BalanceLabel::Closing)
            .collect();
        assert_eq!(closing.len(), 1);
        assert_eq!(closing[0].amount, Decimal::new(100000, 2));
        assert_eq!(report.balance(SummaryKind::Subtotal).unwrap().label, BalanceLabel::Other);
    }

    #[test]
    fn test_oversized_amounts_are_malformed() {
        let doc = jan_2024(&[
            "15/01 15/01 BIG TICKET 79,228,162,514,264,337,593,543,950,335",
            "16/01 16/01 BIG TICKET 79,228,162,514,264,337,593,543,950,335",
            "17/01 17/01 GRAB RIDE 12.00",
        ]);
        let report = run(&doc, &card_options());
        assert_eq!(report.counts.malformed_skipped, 2);
        assert_eq!(report.counts.transactions_accepted, 1);
        assert_eq!(report.sums.debit, Decimal::new(1200, 2));
    }

    #[test]
    fn test_current_account_details_are_appended() {
        let doc = SourceDocument::new(
            "mar.txt",
            vec![
                "01/03 TRANSFER FROM A/C 1,200.00+ 6,200.00".to_string(),
                "      ALI BIN ABU".to_string(),
                "      *".to_string(),
                "      DUITNOW 8812345Q".to_string(),
                "".to_string(),
                "      ORPHAN DETAIL".to_string(),
                "05/03 SALE DEBIT 45.90- 6,154.10".to_string(),
            ],
        )
        .with_period(StatementPeriod::month(2024, 3).unwrap());
        let report = run(&doc, &account_options());

        assert_eq!(report.transactions.len(), 2);
        assert_eq!(
            report.transactions[0].description(),
            "TRANSFER FROM A/C | ALI BIN ABU | DUITNOW 8812345Q"
        );
        assert_eq!(report.transactions[0].direction(), Direction::Credit);
        assert_eq!(report.transactions[1].description(), "SALE DEBIT");
        assert_eq!(report.transactions[1].direction(), Direction::Debit);
        assert_eq!(report.sums.credit, Decimal::new(120000, 2));
        assert_eq!(report.sums.debit, Decimal::new(4590, 2));
    }

    #[test]
    fn test_unsupported_format_warning() {
        let lines: Vec<String> = (0..12).map(|i| format!("Some prose line number {i}")).collect();
        let doc = SourceDocument::new("letter.txt", lines)
            .with_period(StatementPeriod::month(2024, 1).unwrap());
        let report = run(&doc, &card_options());
        assert_eq!(
            report.warnings,
            vec![DocumentWarning::UnsupportedStatementFormat {
                document: "letter.txt".to_string(),
                lines_seen: 12,
            }]
        );
    }

    #[test]
    fn test_short_document_is_not_flagged() {
        let doc = jan_2024(&["hello", "world"]);
        assert!(run(&doc, &card_options()).warnings.is_empty());
    }

    #[test]
    fn test_missing_period_skips_dates_and_warns() {
        let doc = SourceDocument::new(
            "noperiod.txt",
            vec!["15/01 15/01 PAYMENT RECEIVED 500.00 CR".to_string()],
        );
        let report = run(&doc, &card_options());
        assert_eq!(report.counts.invalid_dates_skipped, 1);
        assert!(report.warnings.contains(&DocumentWarning::NoStatementPeriod {
            document: "noperiod.txt".to_string()
        }));

        let with_fallback = ProcessOptions {
            fallback_year: Some(2024),
            ..card_options()
        };
        let report = run(&doc, &with_fallback);
        assert_eq!(report.counts.transactions_accepted, 1);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_period_inferred_from_text() {
        let doc = SourceDocument::from_text(
            "jan.txt",
            "MAYBANK CREDIT CARD STATEMENT JANUARY 2024\n15/01 15/01 PAYMENT RECEIVED 500.00 CR\n",
        );
        let report = run(&doc, &ProcessOptions::default());
        assert_eq!(report.statement_type, StatementType::CreditCard);
        assert_eq!(report.period, StatementPeriod::month(2024, 1));
        assert_eq!(report.counts.transactions_accepted, 1);
    }
}
