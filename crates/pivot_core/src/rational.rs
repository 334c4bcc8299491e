//! Parsing and formatting of exact rational values.
//!
//! Accepted text: an optional sign followed by a decimal (`1.25`, `-0,5`, `.5`)
//! or a fraction of two decimals (`3/4`, `-1/2`, `1,5/2`). A comma is read as the
//! decimal separator.

use crate::error::AlgebraError;
use crate::matrix::{Matrix, Vector};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

/// Builds a rational from an integer.
pub fn int(value: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(value))
}

/// Builds the reduced fraction `numer / denom`. Panics if `denom` is zero.
pub fn ratio(numer: i64, denom: i64) -> BigRational {
    BigRational::new(BigInt::from(numer), BigInt::from(denom))
}

pub fn parse_rational(text: &str) -> Result<BigRational, AlgebraError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(parse_error(text, "empty input"));
    }

    match trimmed.split_once('/') {
        None => parse_decimal(trimmed, text),
        Some((numer, denom)) => {
            if denom.contains('/') {
                return Err(parse_error(text, "more than one '/'"));
            }
            let numer = parse_decimal(numer.trim(), text)?;
            let denom = parse_decimal(denom.trim(), text)?;
            if denom.is_zero() {
                return Err(parse_error(text, "zero denominator"));
            }
            Ok(numer / denom)
        }
    }
}

fn parse_decimal(text: &str, original: &str) -> Result<BigRational, AlgebraError> {
    let normalized = text.replace(',', ".");
    let (negative, body) = match normalized.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, normalized.strip_prefix('+').unwrap_or(&normalized)),
    };

    let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(parse_error(original, "missing digits"));
    }
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return Err(parse_error(original, "unexpected character"));
    }

    let digits = format!("{int_part}{frac_part}");
    let numer: BigInt = digits
        .parse()
        .map_err(|_| parse_error(original, "invalid digits"))?;
    let denom = num_traits::pow(BigInt::from(10u32), frac_part.len());
    let value = BigRational::new(numer, denom);
    Ok(if negative { -value } else { value })
}

fn parse_error(input: &str, reason: &str) -> AlgebraError {
    AlgebraError::Parse {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

pub fn parse_vector<S: AsRef<str>>(cells: &[S]) -> Result<Vector, AlgebraError> {
    cells.iter().map(|cell| parse_rational(cell.as_ref())).collect()
}

/// Parses a grid of cells into a matrix. Ragged or empty grids are shape errors.
pub fn parse_matrix<S: AsRef<str>>(rows: &[Vec<S>]) -> Result<Matrix, AlgebraError> {
    let parsed = rows
        .iter()
        .map(|row| parse_vector(row))
        .collect::<Result<Vec<_>, _>>()?;
    Matrix::from_rows(parsed)
}

/// `3`, `-2`, `3/2`, `-1/2`.
pub fn format_rational(value: &BigRational) -> String {
    if value.is_integer() {
        value.numer().to_string()
    } else {
        format!("{}/{}", value.numer(), value.denom())
    }
}

/// Like [`format_rational`], wrapped in parentheses when negative.
pub fn format_operand(value: &BigRational) -> String {
    if value.is_negative() {
        format!("({})", format_rational(value))
    } else {
        format_rational(value)
    }
}

pub fn format_vector(values: &[BigRational]) -> String {
    let cells: Vec<String> = values.iter().map(format_rational).collect();
    format!("[{}]", cells.join(", "))
}

/// Decimal approximation with `digits` fractional digits.
pub fn format_decimal(value: &BigRational, digits: usize) -> String {
    format!("{:.*}", digits, to_f64(value))
}

pub fn to_f64(value: &BigRational) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integers_and_signs() {
        assert_eq!(parse_rational("42").unwrap(), int(42));
        assert_eq!(parse_rational(" -7 ").unwrap(), int(-7));
        assert_eq!(parse_rational("+3").unwrap(), int(3));
    }

    #[test]
    fn parses_decimals_with_either_separator() {
        assert_eq!(parse_rational("1.5").unwrap(), ratio(3, 2));
        assert_eq!(parse_rational("1,5").unwrap(), ratio(3, 2));
        assert_eq!(parse_rational("-0,25").unwrap(), ratio(-1, 4));
        assert_eq!(parse_rational(".5").unwrap(), ratio(1, 2));
        assert_eq!(parse_rational("2.").unwrap(), int(2));
    }

    #[test]
    fn parses_fractions_and_reduces() {
        assert_eq!(parse_rational("6/4").unwrap(), ratio(3, 2));
        assert_eq!(parse_rational("-1/2").unwrap(), ratio(-1, 2));
        assert_eq!(parse_rational("1/-2").unwrap(), ratio(-1, 2));
        assert_eq!(parse_rational("1,5/3").unwrap(), ratio(1, 2));
    }

    #[test]
    fn rejects_malformed_text() {
        for bad in ["", "abc", "1/0", "1/2/3", "1.2.3", "-", "2x", "1e5"] {
            let err = parse_rational(bad).expect_err("should fail");
            assert!(
                matches!(err, AlgebraError::Parse { .. }),
                "unexpected error for {bad:?}: {err}"
            );
        }
    }

    #[test]
    fn parse_matrix_rejects_ragged_rows() {
        let rows = vec![vec!["1", "2"], vec!["3"]];
        let err = parse_matrix(&rows).expect_err("ragged");
        assert!(matches!(err, AlgebraError::Shape(_)));
    }

    #[test]
    fn formats_integers_fractions_and_operands() {
        assert_eq!(format_rational(&int(-3)), "-3");
        assert_eq!(format_rational(&ratio(3, 2)), "3/2");
        assert_eq!(format_operand(&int(-1)), "(-1)");
        assert_eq!(format_operand(&int(2)), "2");
        assert_eq!(format_vector(&[int(3), ratio(-1, 2)]), "[3, -1/2]");
        assert_eq!(format_decimal(&ratio(1, 3), 3), "0.333");
    }
}
