use crate::error::ValidationError;

use super::{Aggregation, Comparison, SCALE};

const FRACTION_DIGITS: usize = 4;

// Two-character operators first so `<=` is not read as `<`.
const OPERATORS: [(&str, Comparison); 5] = [
    ("<=", Comparison::Le),
    (">=", Comparison::Ge),
    ("==", Comparison::Eq),
    ("<", Comparison::Lt),
    (">", Comparison::Gt),
];

fn invalid(metric: &str, expression: &str, reason: &'static str) -> ValidationError {
    ValidationError::InvalidThreshold {
        metric: metric.to_owned(),
        expression: expression.to_owned(),
        reason,
    }
}

pub(super) fn parse_expression(
    metric: &str,
    expression: &str,
) -> Result<(Aggregation, Comparison, u64), ValidationError> {
    let trimmed = expression.trim();
    let op_start = trimmed
        .find(['<', '>', '='])
        .ok_or_else(|| invalid(metric, expression, "missing comparison operator"))?;
    let (lhs, rest) = trimmed.split_at(op_start);
    let (comparison, rhs) = OPERATORS
        .iter()
        .find_map(|&(op, comparison)| rest.strip_prefix(op).map(|rhs| (comparison, rhs)))
        .ok_or_else(|| invalid(metric, expression, "unsupported comparison operator"))?;

    let aggregation = parse_aggregation(lhs.trim())
        .ok_or_else(|| invalid(metric, expression, "unknown aggregation"))?;
    let limit = parse_fixed(rhs.trim())
        .map_err(|_| invalid(metric, expression, "value is not a decimal number"))?;
    Ok((aggregation, comparison, limit))
}

fn parse_aggregation(value: &str) -> Option<Aggregation> {
    match value {
        "avg" => Some(Aggregation::Avg),
        "min" => Some(Aggregation::Min),
        "max" => Some(Aggregation::Max),
        "med" => Some(Aggregation::Med),
        "rate" => Some(Aggregation::Rate),
        "count" => Some(Aggregation::Count),
        other => {
            let inner = other.strip_prefix("p(")?.strip_suffix(')')?;
            let percentile: f64 = inner.trim().parse().ok()?;
            (0.0..=100.0)
                .contains(&percentile)
                .then_some(Aggregation::Percentile(percentile))
        }
    }
}

/// Parse a non-negative decimal with up to four fractional digits into
/// fixed point (`"0.01"` -> `100`, `"800"` -> `8_000_000`).
///
/// # Errors
///
/// Returns an error if the value is empty, negative, has more than four
/// fractional digits or overflows.
pub fn parse_fixed(value: &str) -> Result<u64, ValidationError> {
    let invalid = || ValidationError::InvalidDecimal {
        value: value.to_owned(),
    };
    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().all(|ch| ch.is_ascii_digit())
        || !fraction.chars().all(|ch| ch.is_ascii_digit())
        || fraction.len() > FRACTION_DIGITS
    {
        return Err(invalid());
    }

    let whole_value: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let mut fraction_value: u64 = if fraction.is_empty() {
        0
    } else {
        fraction.parse().map_err(|_| invalid())?
    };
    for _ in fraction.len()..FRACTION_DIGITS {
        fraction_value = fraction_value.checked_mul(10).ok_or_else(invalid)?;
    }

    whole_value
        .checked_mul(SCALE)
        .and_then(|scaled| scaled.checked_add(fraction_value))
        .ok_or_else(invalid)
}
