//! Parsing of the human-typed row-count and selectivity lists.
//!
//! Row counts accept decimal `k`/`M`/`G` suffixes (`10k`, `1M`, `2G`).
//! Selectivities accept a ratio (`0.1`), a percentage (`10%`) or an
//! absolute cardinality (`500`).

use crate::error::{Error, Result};
use crate::selectivity::Selectivity;

pub fn parse_row_count(input: &str) -> Result<u64> {
    let s = input.trim();
    let invalid = |reason: &str| Error::RowCount {
        input: input.to_string(),
        reason: reason.to_string(),
    };
    if s.is_empty() {
        return Err(invalid("empty value"));
    }

    let (digits, factor) = match s.char_indices().last() {
        Some((i, 'k' | 'K')) => (&s[..i], 1_000u64),
        Some((i, 'm' | 'M')) => (&s[..i], 1_000_000),
        Some((i, 'g' | 'G')) => (&s[..i], 1_000_000_000),
        _ => (s, 1),
    };
    let base: u64 = digits
        .trim()
        .parse()
        .map_err(|_| invalid("expected a whole number with an optional k/M/G suffix"))?;
    let rows = base
        .checked_mul(factor)
        .ok_or_else(|| invalid("value is too large"))?;
    if rows == 0 {
        return Err(invalid("must be positive"));
    }
    Ok(rows)
}

pub fn parse_selectivity(input: &str) -> Result<Selectivity> {
    let s = input.trim();
    let invalid = |reason: &str| Error::Selectivity {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    if let Some(pct) = s.strip_suffix('%') {
        let v: f64 = pct
            .trim()
            .parse()
            .map_err(|_| invalid("expected a number before '%'"))?;
        if !(v > 0.0 && v < 100.0) {
            return Err(invalid("percentages must lie strictly between 0 and 100"));
        }
        return Ok(Selectivity::Ratio(v / 100.0));
    }

    let v: f64 = s
        .parse()
        .map_err(|_| invalid("expected a ratio, a percentage or a row count"))?;
    Selectivity::try_from(v).map_err(|e| match e {
        Error::Selectivity { reason, .. } => invalid(&reason),
        other => other,
    })
}

/// Parse a comma-separated list with `parse_one`, rejecting empty lists.
pub fn parse_list<T>(input: &str, parse_one: impl Fn(&str) -> Result<T>) -> Result<Vec<T>> {
    let items: Vec<T> = input
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| parse_one(part))
        .collect::<Result<_>>()?;
    if items.is_empty() {
        return Err(Error::Config(format!("empty list '{input}'")));
    }
    Ok(items)
}
