//! Field extraction from a classified transaction line.

use std::str::FromStr;

use ledgerline_core::{Direction, LineError};
use regex::Captures;
use rust_decimal::Decimal;

use crate::rules::Layout;

/// Shortest description kept after cleaning.
const MIN_DESCRIPTION_LEN: usize = 3;

/// Raw, not yet date-normalized fields of one transaction line.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFields<'l> {
    pub posting_token: &'l str,
    pub transaction_token: &'l str,
    pub description: String,
    pub amount: Decimal,
    pub direction: Direction,
}

pub fn extract_fields<'l>(layout: &Layout, captures: &Captures<'l>) -> Result<RawFields<'l>, LineError> {
    let group = |name: &str| {
        captures
            .name(name)
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
    };

    let transaction_token = group("txn").ok_or_else(|| LineError::malformed("missing date"))?;
    let posting_token = group("post").unwrap_or(transaction_token);

    let raw_desc = group("desc").ok_or_else(|| LineError::malformed("missing description"))?;
    let description = clean_description(raw_desc, layout.strip_reference);
    validate_description(&description)?;

    let amount_token = group("amount").ok_or_else(|| LineError::malformed("missing amount"))?;
    let (amount, sign) = parse_amount(amount_token)?;

    let direction = group("marker")
        .and_then(marker_direction)
        .or_else(|| sign.and_then(|s| layout.signs.direction(s)))
        .or(layout.default_direction)
        .ok_or_else(|| LineError::malformed(format!("no direction for amount `{amount_token}`")))?;

    Ok(RawFields {
        posting_token,
        transaction_token,
        description,
        amount,
        direction,
    })
}

pub fn marker_direction(marker: &str) -> Option<Direction> {
    match marker.trim().to_ascii_uppercase().as_str() {
        "CR" => Some(Direction::Credit),
        "DR" => Some(Direction::Debit),
        _ => None,
    }
}

/// Digits allowed before the decimal point. Keeps per-document sums well
/// inside `Decimal`'s range.
const MAX_INTEGER_DIGITS: usize = 15;
const MAX_FRACTION_DIGITS: usize = 2;

/// Parse an amount token such as `1,234.56`, `45.90-` or `-12.00`.
///
/// Returns the positive magnitude and the sign character, if any. Zero and
/// non-numeric tokens are malformed.
pub fn parse_amount(token: &str) -> Result<(Decimal, Option<char>), LineError> {
    let (amount, sign) = parse_magnitude(token)?;
    if amount.is_zero() {
        return Err(LineError::malformed(format!("zero amount `{}`", token.trim())));
    }
    Ok((amount, sign))
}

/// Like [`parse_amount`] but accepts zero, as printed on summary lines
/// (`NEW BALANCE 0.00`).
pub fn parse_magnitude(token: &str) -> Result<(Decimal, Option<char>), LineError> {
    let token = token.trim();
    let non_numeric = || LineError::malformed(format!("non-numeric amount `{token}`"));

    let (body, sign) = match token.chars().last() {
        Some(c @ ('+' | '-')) => (&token[..token.len() - 1], Some(c)),
        _ => match token.strip_prefix('-') {
            Some(rest) => (rest, Some('-')),
            None => (token, None),
        },
    };
    let body = body.trim();

    let (int_part, frac_part) = match body.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (body, None),
    };
    let well_formed = int_part.starts_with(|c: char| c.is_ascii_digit())
        && int_part.chars().all(|c| c.is_ascii_digit() || c == ',')
        && frac_part.is_none_or(|frac| {
            !frac.is_empty() && frac.chars().all(|c| c.is_ascii_digit())
        });
    if !well_formed {
        return Err(non_numeric());
    }

    if frac_part.is_some_and(|frac| frac.len() > MAX_FRACTION_DIGITS) {
        return Err(LineError::malformed(format!(
            "more than {MAX_FRACTION_DIGITS} decimal places in `{token}`"
        )));
    }
    let digits = int_part.trim_start_matches(['0', ',']).chars().filter(char::is_ascii_digit).count();
    if digits > MAX_INTEGER_DIGITS {
        return Err(LineError::malformed(format!("amount out of range `{token}`")));
    }

    let amount = Decimal::from_str(&body.replace(',', "")).map_err(|_| non_numeric())?;
    Ok((amount, sign))
}

/// Collapse whitespace, trim, and drop trailing filler (`*`) and, when the
/// layout says so, trailing reference codes.
pub fn clean_description(raw: &str, strip_reference: bool) -> String {
    let mut tokens: Vec<&str> = raw.split_whitespace().collect();
    loop {
        match tokens.last().copied() {
            Some(t) if tokens.len() > 1 && t.chars().all(|c| c == '*') => {
                tokens.pop();
            }
            Some(_) if strip_reference && strip_trailing_reference(&mut tokens) => {}
            _ => break,
        }
    }
    tokens.join(" ")
}

fn validate_description(description: &str) -> Result<(), LineError> {
    if description.chars().count() < MIN_DESCRIPTION_LEN {
        return Err(LineError::malformed(format!(
            "description too short: `{description}`"
        )));
    }
    if !description.chars().any(char::is_alphabetic) {
        return Err(LineError::malformed(format!(
            "description has no text: `{description}`"
        )));
    }
    Ok(())
}

fn strip_trailing_reference(tokens: &mut Vec<&str>) -> bool {
    let n = tokens.len();
    if n < 2 {
        return false;
    }

    // REF:8812345 as a single token
    if let Some((label, code)) = tokens[n - 1].split_once([':', '#']) {
        if is_reference_label(label) && is_reference_code(code) {
            tokens.pop();
            return true;
        }
    }

    // REF 8812345 / REF NO: 8812345
    if n < 3 || !is_reference_code(tokens[n - 1]) {
        return false;
    }
    let mut label_at = n - 2;
    if label_at >= 2 && is_number_word(tokens[label_at]) {
        label_at -= 1;
    }
    if !is_reference_label(tokens[label_at]) {
        return false;
    }
    tokens.truncate(label_at);
    true
}

fn is_reference_label(token: &str) -> bool {
    matches!(
        token.trim_end_matches(['.', ':', '#']).to_ascii_uppercase().as_str(),
        "REF" | "REFNO" | "REFERENCE"
    )
}

fn is_number_word(token: &str) -> bool {
    token.trim_end_matches(['.', ':', '#']).eq_ignore_ascii_case("NO")
}

fn is_reference_code(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit())
        && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::SignConvention;
    use regex::Regex;

    const CARD: Layout = Layout {
        signs: SignConvention::MinusIsCredit,
        default_direction: Some(Direction::Debit),
        strip_reference: true,
    };

    const ACCOUNT: Layout = Layout {
        signs: SignConvention::PlusIsCredit,
        default_direction: None,
        strip_reference: false,
    };

    fn caps<'l>(re: &Regex, line: &'l str) -> Captures<'l> {
        re.captures(line).unwrap()
    }

    fn card_re() -> Regex {
        Regex::new(r"^(?P<post>\S+)\s+(?P<txn>\S+)\s+(?P<desc>.+?)\s+(?P<amount>\S+?)\s*(?P<marker>CR)?\s*$")
            .unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.56").unwrap(), (Decimal::new(123456, 2), None));
        assert_eq!(parse_amount("45.90-").unwrap(), (Decimal::new(4590, 2), Some('-')));
        assert_eq!(parse_amount("300.00+").unwrap(), (Decimal::new(30000, 2), Some('+')));
        assert_eq!(parse_amount("-12.00").unwrap(), (Decimal::new(1200, 2), Some('-')));
        assert_eq!(parse_amount("15").unwrap(), (Decimal::new(15, 0), None));
    }

    #[test]
    fn test_parse_amount_rejects_zero_and_text() {
        for token in ["0.00", "0", "abc", "12.3.4", "1,00.", ".50", "N/A", "", "12.5O", "1.005"] {
            assert!(
                matches!(parse_amount(token), Err(LineError::MalformedLine { .. })),
                "expected malformed: {token:?}"
            );
        }
    }

    #[test]
    fn test_summary_magnitude_allows_zero() {
        assert_eq!(parse_magnitude("0.00").unwrap(), (Decimal::ZERO, None));
        assert_eq!(parse_magnitude("0.00-").unwrap(), (Decimal::ZERO, Some('-')));
        assert!(parse_magnitude(",.00").is_err());
    }

    #[test]
    fn test_amount_digit_limits() {
        assert_eq!(
            parse_amount("999,999,999,999,999.99").unwrap().0,
            Decimal::new(99_999_999_999_999_999, 2)
        );
        assert_eq!(parse_amount("0001.50").unwrap().0, Decimal::new(150, 2));
        assert!(parse_amount("1,000,000,000,000,000.00").is_err());
        assert!(parse_amount("79,228,162,514,264,337,593,543,950,335").is_err());
        assert!(parse_amount("12.345").is_err());
        assert_eq!(parse_amount("12.5").unwrap().0, Decimal::new(125, 1));
    }

    #[test]
    fn test_clean_description() {
        assert_eq!(clean_description("  GRAB*FOOD   KL  *** ", true), "GRAB*FOOD KL");
        assert_eq!(clean_description("SHOPEE REF 88123ABC", true), "SHOPEE");
        assert_eq!(clean_description("SHOPEE REF NO: 88123", true), "SHOPEE");
        assert_eq!(clean_description("SHOPEE REF:88123", true), "SHOPEE");
        assert_eq!(clean_description("SHOPEE REF 88123", false), "SHOPEE REF 88123");
        assert_eq!(clean_description("7-ELEVEN 12345", true), "7-ELEVEN 12345");
        assert_eq!(clean_description("REF 12345", true), "REF 12345");
    }

    #[test]
    fn test_extract_card_credit() {
        let re = card_re();
        let c = caps(&re, "15/01 14/01 PAYMENT  RECEIVED 500.00 CR");
        let f = extract_fields(&CARD, &c).unwrap();
        assert_eq!(f.posting_token, "15/01");
        assert_eq!(f.transaction_token, "14/01");
        assert_eq!(f.description, "PAYMENT RECEIVED");
        assert_eq!(f.amount, Decimal::new(50000, 2));
        assert_eq!(f.direction, Direction::Credit);
    }

    #[test]
    fn test_extract_card_defaults_to_debit() {
        let re = card_re();
        let c = caps(&re, "15/01 14/01 GRAB*FOOD 23.40");
        assert_eq!(extract_fields(&CARD, &c).unwrap().direction, Direction::Debit);

        let c = caps(&re, "15/01 14/01 REFUND SHOP -23.40");
        assert_eq!(extract_fields(&CARD, &c).unwrap().direction, Direction::Credit);
    }

    #[test]
    fn test_single_date_reused_for_posting() {
        let re = Regex::new(r"^(?P<txn>\S+)\s+(?P<desc>.+?)\s+(?P<amount>\S+)$").unwrap();
        let c = caps(&re, "05/03 SALE DEBIT 45.90-");
        let f = extract_fields(&ACCOUNT, &c).unwrap();
        assert_eq!(f.posting_token, "05/03");
        assert_eq!(f.transaction_token, "05/03");
        assert_eq!(f.direction, Direction::Debit);
    }

    #[test]
    fn test_account_without_direction_is_malformed() {
        let re = Regex::new(r"^(?P<txn>\S+)\s+(?P<desc>.+?)\s+(?P<amount>\S+)$").unwrap();
        let c = caps(&re, "06/03 SALARY 5,000.00");
        assert!(matches!(
            extract_fields(&ACCOUNT, &c),
            Err(LineError::MalformedLine { .. })
        ));
    }

    #[test]
    fn test_short_or_numeric_description_is_malformed() {
        let re = card_re();
        assert!(extract_fields(&CARD, &caps(&re, "15/01 14/01 AB 5.00")).is_err());
        assert!(extract_fields(&CARD, &caps(&re, "15/01 14/01 15/01 5.00")).is_err());
    }
}
