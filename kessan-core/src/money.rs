//! Integer yen parsing and percentage-fee rounding.
//!
//! Every amount in the pipeline is an `i64` count of yen. Nothing here touches
//! floating point.

use thiserror::Error;

/// Largest absolute amount accepted for a single cell (1 trillion yen).
pub const MAX_ABS_YEN: i64 = 1_000_000_000_000;

/// 100% expressed in basis points.
pub const FULL_RATE_BP: i64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("empty value")]
    Empty,
    #[error("not a number")]
    NotANumber,
    #[error("fractional yen")]
    Fractional,
    #[error("out of range")]
    OutOfRange,
}

/// Parse a yen amount as exported: `"1,280"`, `"¥1,280"`, `"1280円"`,
/// `"-300"`, `"1280.00"`. A backslash counts as a yen sign, which is how
/// Shift_JIS text renders it.
pub fn parse_yen(raw: &str) -> Result<i64, AmountError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(*c, ',' | '，' | '¥' | '￥' | '\\' | '円') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Err(AmountError::Empty);
    }

    let (negative, unsigned) = split_sign(&cleaned);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (unsigned, None),
    };

    if !is_digits(int_part) {
        return Err(AmountError::NotANumber);
    }
    if let Some(frac) = frac_part {
        if !is_digits(frac) {
            return Err(AmountError::NotANumber);
        }
        if frac.bytes().any(|b| b != b'0') {
            return Err(AmountError::Fractional);
        }
    }

    let value: i64 = int_part.parse().map_err(|_| AmountError::OutOfRange)?;
    if value > MAX_ABS_YEN {
        return Err(AmountError::OutOfRange);
    }
    Ok(if negative { -value } else { value })
}

/// Parse a percentage (`"10%"`, `"3.6"`, `"3.60 %"`) into basis points.
///
/// At most two decimal places survive; a rate above 100% is rejected.
pub fn parse_rate_bp(raw: &str) -> Result<i64, AmountError> {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let cleaned = cleaned
        .strip_suffix('%')
        .or_else(|| cleaned.strip_suffix('％'))
        .unwrap_or(&cleaned);
    if cleaned.is_empty() {
        return Err(AmountError::Empty);
    }

    let (int_part, frac_part) = cleaned.split_once('.').unwrap_or((cleaned, ""));
    if !is_digits(int_part) || !(frac_part.is_empty() || is_digits(frac_part)) {
        return Err(AmountError::NotANumber);
    }
    if frac_part.len() > 2 && frac_part[2..].bytes().any(|b| b != b'0') {
        return Err(AmountError::Fractional);
    }

    let whole: i64 = int_part.parse().map_err(|_| AmountError::OutOfRange)?;
    let mut hundredths = 0;
    for (i, b) in frac_part.bytes().take(2).enumerate() {
        let digit = i64::from(b - b'0');
        hundredths += if i == 0 { digit * 10 } else { digit };
    }

    let bp = whole
        .checked_mul(100)
        .and_then(|v| v.checked_add(hundredths))
        .ok_or(AmountError::OutOfRange)?;
    if bp > FULL_RATE_BP {
        return Err(AmountError::OutOfRange);
    }
    Ok(bp)
}

/// `amount × rate_bp / 10000`, rounded to the nearest yen with ties away
/// from zero.
///
/// Rounding only happens here; it shifts monthly totals by at most half a
/// yen per transaction.
pub fn apply_rate(amount: i64, rate_bp: i64) -> Result<i64, AmountError> {
    let numerator = i128::from(amount) * i128::from(rate_bp);
    let denominator = i128::from(FULL_RATE_BP);

    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    let rounded = if remainder.abs() * 2 >= denominator {
        quotient + numerator.signum()
    } else {
        quotient
    };

    i64::try_from(rounded).map_err(|_| AmountError::OutOfRange)
}

fn split_sign(s: &str) -> (bool, &str) {
    if let Some(rest) = s.strip_prefix(|c: char| c == '-' || c == '−' || c == '－') {
        (true, rest)
    } else {
        (false, s.strip_prefix('+').unwrap_or(s))
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
