//! Numeric literal formatting.
//!
//! Literal formatting is the main correctness lever of the generated code:
//! the target's literal parser must reconstruct a value close enough that no
//! comparison or sign decision changes. By default doubles use the shortest
//! representation that round-trips exactly. With an explicit precision `p`
//! (significant digits, 1..=17) values are rounded, and the relative error
//! is bounded by `0.5 * 10^(1 - p)`.

use crate::error::{PortError, Result};
use crate::language::LanguageDefinition;

/// Largest supported precision; 17 significant digits round-trip any f64.
pub const MAX_PRECISION: usize = 17;

/// Relative tolerance guaranteed for a given precision (0 for exact output).
pub fn tolerance(precision: Option<usize>) -> f64 {
    match precision {
        None => 0.0,
        Some(p) => 0.5 * 10f64.powi(1 - p.clamp(1, MAX_PRECISION) as i32),
    }
}

/// Format a double as a literal every supported target parses as floating point.
pub fn format_double(
    value: f64,
    precision: Option<usize>,
    language: &LanguageDefinition,
) -> Result<String> {
    if !value.is_finite() {
        return Err(overflow(language, value.to_string(), "value is not finite"));
    }
    let text = match precision {
        // `{:?}` keeps a decimal point or an exponent, so no target reads
        // the literal as an integer.
        None => format!("{:?}", value),
        Some(p) => {
            if p == 0 || p > MAX_PRECISION {
                return Err(PortError::malformed(
                    "options.precision",
                    format!("precision must be within 1..={}, got {}", MAX_PRECISION, p),
                ));
            }
            format!("{:.*e}", p - 1, value)
        }
    };
    let parsed: f64 = text
        .parse()
        .map_err(|_| overflow(language, text.clone(), "literal does not parse back"))?;
    if !parsed.is_finite() {
        return Err(overflow(language, text, "rounding overflows the double range"));
    }
    Ok(text)
}

/// Format an integer, checking it fits the target's native integer type.
pub fn format_int(value: i64, language: &LanguageDefinition) -> Result<String> {
    if let Some(bits) = language.int_bits {
        let fits = if bits >= 64 {
            true
        } else if bits == 53 {
            value.unsigned_abs() <= (1u64 << 53)
        } else {
            let max = (1i64 << (bits - 1)) - 1;
            let min = -(1i64 << (bits - 1));
            (min..=max).contains(&value)
        };
        if !fits {
            return Err(overflow(
                language,
                value.to_string(),
                &format!("exceeds the {}-bit integer range", bits),
            ));
        }
    }
    Ok(value.to_string())
}

fn overflow(language: &LanguageDefinition, value: String, reason: &str) -> PortError {
    PortError::LiteralOverflow {
        language: language.key.clone(),
        value,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::registry;

    fn go() -> &'static LanguageDefinition {
        registry().get("go").unwrap()
    }

    #[test]
    fn test_shortest_roundtrip() {
        assert_eq!(format_double(0.1, None, go()).unwrap(), "0.1");
        assert_eq!(format_double(2.0, None, go()).unwrap(), "2.0");
        assert_eq!(format_double(-0.5, None, go()).unwrap(), "-0.5");
        let tiny = format_double(1e-9, None, go()).unwrap();
        assert_eq!(tiny.parse::<f64>().unwrap(), 1e-9);
    }

    #[test]
    fn test_every_shortest_literal_roundtrips() {
        for v in [1.0 / 3.0, std::f64::consts::PI, 123456.789e10, -7.25e-300, f64::MAX] {
            let text = format_double(v, None, go()).unwrap();
            assert_eq!(text.parse::<f64>().unwrap(), v, "{}", text);
        }
    }

    #[test]
    fn test_fixed_precision_within_tolerance() {
        let v = 1.0 / 3.0;
        let text = format_double(v, Some(4), go()).unwrap();
        assert_eq!(text, "3.333e-1");
        let back: f64 = text.parse().unwrap();
        assert!(((back - v) / v).abs() <= tolerance(Some(4)));
    }

    #[test]
    fn test_rounding_overflow_detected() {
        let err = format_double(f64::MAX, Some(2), go()).unwrap_err();
        assert!(matches!(err, PortError::LiteralOverflow { .. }));
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(format_double(f64::NAN, None, go()).is_err());
        assert!(format_double(f64::INFINITY, None, go()).is_err());
    }

    #[test]
    fn test_invalid_precision() {
        assert!(matches!(
            format_double(1.0, Some(0), go()).unwrap_err(),
            PortError::MalformedValue { .. }
        ));
        assert!(format_double(1.0, Some(18), go()).is_err());
    }

    #[test]
    fn test_int_width() {
        let c = registry().get("c").unwrap();
        let js = registry().get("js").unwrap();
        let ruby = registry().get("ruby").unwrap();
        assert_eq!(format_int(-1, c).unwrap(), "-1");
        assert_eq!(format_int(i32::MAX as i64, c).unwrap(), "2147483647");
        assert!(format_int(1 << 40, c).is_err());
        assert!(format_int(1 << 40, js).is_ok());
        assert!(format_int(1 << 60, js).is_err());
        assert!(format_int(i64::MAX, go()).is_ok());
        assert!(format_int(i64::MIN, ruby).is_ok());
    }

    #[test]
    fn test_tolerance() {
        assert_eq!(tolerance(None), 0.0);
        assert!((tolerance(Some(3)) - 0.005).abs() < 1e-12);
    }
}
