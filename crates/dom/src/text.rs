//! String to number conversion shared by the evaluator and the binding layer.

/// Converts a string to a number the way XPath's `number()` does, extended with the
/// spelled-out infinities.
///
/// Accepts an optionally signed decimal with an optional fraction and exponent, and
/// `Infinity` / `+Infinity` / `-Infinity`. Surrounding whitespace is ignored and the sign
/// of zero is kept. Everything else, including the empty string, is `NaN`.
pub fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        "" => return f64::NAN,
        _ => {}
    }

    let well_formed = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        && trimmed.chars().any(|c| c.is_ascii_digit());
    if !well_formed {
        return f64::NAN;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_forms() {
        assert_eq!(parse_number("42"), 42.0);
        assert_eq!(parse_number("  -3.5 "), -3.5);
        assert_eq!(parse_number("+7"), 7.0);
        assert_eq!(parse_number(".25"), 0.25);
        assert_eq!(parse_number("1e3"), 1000.0);
    }

    #[test]
    fn test_infinities_and_signed_zero() {
        assert_eq!(parse_number("Infinity"), f64::INFINITY);
        assert_eq!(parse_number("+Infinity"), f64::INFINITY);
        assert_eq!(parse_number("-Infinity"), f64::NEG_INFINITY);
        let negative_zero = parse_number("-0");
        assert_eq!(negative_zero, 0.0);
        assert!(negative_zero.is_sign_negative());
        assert!(parse_number("0").is_sign_positive());
    }

    #[test]
    fn test_rejected_inputs_are_nan() {
        for input in ["", "   ", "abc", "inf", "nan", "infinity", "1,5", "12px", "e", "--1"] {
            assert!(parse_number(input).is_nan(), "{input:?} should be NaN");
        }
    }
}
