//! Plain-text processing and validation summaries.

use ledgerline_ingest::BatchOutput;

use crate::validation::{DebitValidation, ValidationStatus, ValidationTally};

const DESCRIPTION_WIDTH: usize = 35;

pub fn render_summary(output: &BatchOutput, samples: usize) -> String {
    let totals = &output.totals;
    let counts = &totals.counts;
    let mut s = String::new();

    s.push_str(&format!(
        "Processed {} file(s): {} transactions, {} duplicates, {} skipped ({} malformed, {} invalid dates), {} balance facts\n",
        totals.files_processed,
        counts.transactions_accepted,
        counts.duplicates_rejected,
        counts.skipped(),
        counts.malformed_skipped,
        counts.invalid_dates_skipped,
        counts.balance_facts,
    ));

    for doc in &output.documents {
        let period = doc
            .period
            .map(|p| p.to_string())
            .unwrap_or_else(|| "no period".to_string());
        s.push_str(&format!(
            "  {:<30} {:<16} {:<24} {} transactions\n",
            doc.name,
            doc.statement_type.as_str(),
            period,
            doc.counts.transactions_accepted
        ));
        for warning in &doc.warnings {
            s.push_str(&format!("    warning: {}\n", warning));
        }
    }

    if counts.transactions_accepted == 0 {
        s.push_str("No transactions found.\n");
        return s;
    }

    s.push_str(&format!(
        "\nSummary: {} transactions | Credits: {} | Debits: {}\n",
        counts.transactions_accepted, totals.sums.credit, totals.sums.debit
    ));

    s.push_str("Sample transactions:\n");
    for t in output.transactions().take(samples) {
        s.push_str(&format!(
            "  {} | {:<38} | {:>10} {}\n",
            t.transaction_date(),
            shorten(t.description()),
            t.amount().to_string(),
            t.direction()
        ));
    }
    if counts.transactions_accepted > samples {
        s.push_str(&format!(
            "  ... and {} more transactions\n",
            counts.transactions_accepted - samples
        ));
    }
    s
}

pub fn render_validation(results: &[DebitValidation]) -> String {
    if results.is_empty() {
        return String::new();
    }

    let mut s = String::from("Validation summary:\n");
    for v in results {
        let detail = match v.status {
            ValidationStatus::Pass => format!(
                "(diff {})",
                v.difference.unwrap_or_default()
            ),
            ValidationStatus::Fail => format!(
                "(expected {}, got {})",
                v.expected.unwrap_or_default(),
                v.calculated
            ),
            ValidationStatus::NoTotal => "(no total debit line found)".to_string(),
            ValidationStatus::NoDebits => "(no debit transactions)".to_string(),
        };
        s.push_str(&format!("  {:<35} {:<9} {}\n", v.document, v.status.as_str(), detail));
    }

    let tally: ValidationTally = results.iter().collect();
    s.push_str(&format!(
        "{} passed, {} failed, {} no total, {} no debits\n",
        tally.passed, tally.failed, tally.no_total, tally.no_debits
    ));
    if tally.failed > 0 {
        s.push_str(&format!("{} file(s) failed validation; review them manually\n", tally.failed));
    }
    s
}

fn shorten(description: &str) -> String {
    if description.chars().count() <= DESCRIPTION_WIDTH {
        return description.to_string();
    }
    let head: String = description.chars().take(DESCRIPTION_WIDTH).collect();
    format!("{head}...")
}
