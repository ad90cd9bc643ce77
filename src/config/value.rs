//! Conversion of raw strings into typed field values.

use std::fmt;
use std::num::IntErrorKind;

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The coercion applied to a field, derived from its Rust type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Signed,
    Unsigned,
    String,
    Float,
    Bool,
    Custom,
    Unsupported,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Signed => "signed integer",
            FieldKind::Unsigned => "unsigned integer",
            FieldKind::String => "string",
            FieldKind::Float => "float",
            FieldKind::Bool => "boolean",
            FieldKind::Custom => "custom",
            FieldKind::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ValueError {
    #[error("invalid {kind} value '{value}'")]
    Invalid { kind: FieldKind, value: String },

    #[error("value '{0}' would overflow type")]
    Overflow(String),

    #[error("attempted to parse unsupported type '{0}' (hint: it doesn't implement ValueParser)")]
    Unsupported(&'static str),

    #[error(transparent)]
    Custom(BoxError),
}

/// Types that can build themselves from the text of a configuration value.
///
/// Implementing this is enough for a type to be used as a record field.
///
/// ```
/// use flatconf::ValueParser;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Level(u8);
///
/// impl ValueParser for Level {
///     fn parse_config_value(raw: &str) -> Result<Self, flatconf::BoxError> {
///         match raw {
///             "low" => Ok(Level(1)),
///             "high" => Ok(Level(9)),
///             other => Err(format!("unknown level '{other}'").into()),
///         }
///     }
/// }
/// ```
pub trait ValueParser: Sized {
    fn parse_config_value(raw: &str) -> Result<Self, BoxError>;
}

/// A record field that can be assigned from a raw configuration value.
///
/// Implemented for the integer, float, `bool` and `String` types, and for
/// every [`ValueParser`].
pub trait FieldValue {
    fn kind(&self) -> FieldKind;

    fn type_name(&self) -> &'static str;

    /// Parses `raw` and stores it, leaving the field untouched on error.
    fn assign(&mut self, raw: &str) -> Result<(), ValueError>;
}

impl<T: ValueParser> FieldValue for T {
    fn kind(&self) -> FieldKind {
        FieldKind::Custom
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn assign(&mut self, raw: &str) -> Result<(), ValueError> {
        *self = T::parse_config_value(raw).map_err(ValueError::Custom)?;
        Ok(())
    }
}

impl FieldValue for String {
    fn kind(&self) -> FieldKind {
        FieldKind::String
    }

    fn type_name(&self) -> &'static str {
        "String"
    }

    fn assign(&mut self, raw: &str) -> Result<(), ValueError> {
        raw.clone_into(self);
        Ok(())
    }
}

impl FieldValue for bool {
    fn kind(&self) -> FieldKind {
        FieldKind::Bool
    }

    fn type_name(&self) -> &'static str {
        "bool"
    }

    fn assign(&mut self, raw: &str) -> Result<(), ValueError> {
        *self = parse_bool(raw)?;
        Ok(())
    }
}

macro_rules! impl_integer_field {
    ($kind:expr, $($ty:ty),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                fn kind(&self) -> FieldKind {
                    $kind
                }

                fn type_name(&self) -> &'static str {
                    stringify!($ty)
                }

                fn assign(&mut self, raw: &str) -> Result<(), ValueError> {
                    let wide = parse_integer(raw, $kind)?;
                    *self = <$ty>::try_from(wide)
                        .map_err(|_| ValueError::Overflow(raw.to_string()))?;
                    Ok(())
                }
            }
        )*
    };
}

impl_integer_field!(FieldKind::Signed, i8, i16, i32, i64, i128, isize);
impl_integer_field!(FieldKind::Unsigned, u8, u16, u32, u64, usize);

// u128 does not fit the signed intermediate, so it parses on its own.
impl FieldValue for u128 {
    fn kind(&self) -> FieldKind {
        FieldKind::Unsigned
    }

    fn type_name(&self) -> &'static str {
        "u128"
    }

    fn assign(&mut self, raw: &str) -> Result<(), ValueError> {
        let literal = IntLiteral::split(raw, FieldKind::Unsigned)?;
        *self = literal.magnitude(raw, FieldKind::Unsigned)?;
        Ok(())
    }
}

impl FieldValue for f64 {
    fn kind(&self) -> FieldKind {
        FieldKind::Float
    }

    fn type_name(&self) -> &'static str {
        "f64"
    }

    fn assign(&mut self, raw: &str) -> Result<(), ValueError> {
        *self = parse_float(raw)?;
        Ok(())
    }
}

impl FieldValue for f32 {
    fn kind(&self) -> FieldKind {
        FieldKind::Float
    }

    fn type_name(&self) -> &'static str {
        "f32"
    }

    fn assign(&mut self, raw: &str) -> Result<(), ValueError> {
        let value = parse_float(raw)?;
        if value.is_finite() && value.abs() > f64::from(f32::MAX) {
            return Err(ValueError::Overflow(raw.to_string()));
        }
        *self = value as f32;
        Ok(())
    }
}

/// Parses the boolean spellings `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn parse_bool(raw: &str) -> Result<bool, ValueError> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ValueError::Invalid {
            kind: FieldKind::Bool,
            value: raw.to_string(),
        }),
    }
}

/// Parses a float literal as `f64`.
///
/// Decimal literals and hexadecimal ones with a binary exponent (`0x1.8p3`)
/// are accepted. A finite literal whose magnitude is beyond `f64` is an
/// overflow rather than infinity; `inf` and `infinity` themselves are accepted.
pub fn parse_float(raw: &str) -> Result<f64, ValueError> {
    let invalid = || ValueError::Invalid {
        kind: FieldKind::Float,
        value: raw.to_string(),
    };

    let value: f64 = match hex_float(raw) {
        Some(parsed) => parsed.ok_or_else(invalid)?,
        None => raw.parse().map_err(|_| invalid())?,
    };

    if value.is_infinite() {
        let unsigned = raw.trim_start_matches(|c: char| c == '+' || c == '-');
        let spelled_out =
            unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity");
        if !spelled_out {
            return Err(ValueError::Overflow(raw.to_string()));
        }
    }

    Ok(value)
}

/// Evaluates a hexadecimal float such as `-0x1.8p-3`.
///
/// Returns `None` when `raw` has no `0x` prefix, and `Some(None)` when it has
/// one but is malformed. The `p` exponent is required.
fn hex_float(raw: &str) -> Option<Option<f64>> {
    let (negative, rest) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let body = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X"))?;
    Some(hex_float_magnitude(body).map(|v| if negative { -v } else { v }))
}

fn hex_float_magnitude(body: &str) -> Option<f64> {
    let (mantissa, exponent) = body.split_once(|c: char| c == 'p' || c == 'P')?;
    let exponent: i64 = exponent.parse().ok()?;
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }

    let mut value = 0.0_f64;
    for c in whole.chars().chain(fraction.chars()) {
        value = value * 16.0 + f64::from(c.to_digit(16)?);
    }
    if value == 0.0 {
        return Some(0.0);
    }

    let fraction_bits = i64::try_from(fraction.len()).ok()?.checked_mul(4)?;
    let mut scale = exponent.checked_sub(fraction_bits)?.clamp(-4000, 4000);
    // Applied in steps so an intermediate power of two stays finite and normal.
    while scale != 0 {
        let step = scale.clamp(-1000, 1000);
        value *= 2.0_f64.powi(step as i32);
        scale -= step;
    }
    Some(value)
}

/// Parses an integer literal with an optional sign and base prefix.
///
/// Accepted prefixes are `0x`, `0o`, `0b` (either case) and a bare leading `0`
/// for octal. Underscores may separate digits. Unsigned kinds reject any sign.
/// The result is widened to `i128`; callers narrow it to the field's width.
pub fn parse_integer(raw: &str, kind: FieldKind) -> Result<i128, ValueError> {
    let literal = IntLiteral::split(raw, kind)?;
    let magnitude = literal.magnitude(raw, kind)?;

    if literal.negative {
        // i128::MIN has no positive counterpart.
        if magnitude == i128::MIN.unsigned_abs() {
            return Ok(i128::MIN);
        }
        i128::try_from(magnitude)
            .map(|m| -m)
            .map_err(|_| ValueError::Overflow(raw.to_string()))
    } else {
        i128::try_from(magnitude).map_err(|_| ValueError::Overflow(raw.to_string()))
    }
}

struct IntLiteral<'a> {
    negative: bool,
    radix: u32,
    digits: &'a str,
    /// Whether a base prefix was stripped, including the legacy octal `0`.
    prefixed: bool,
}

impl<'a> IntLiteral<'a> {
    fn split(raw: &'a str, kind: FieldKind) -> Result<Self, ValueError> {
        let invalid = || ValueError::Invalid {
            kind,
            value: raw.to_string(),
        };

        let (negative, rest) = match raw.as_bytes().first() {
            Some(b'+' | b'-') if kind == FieldKind::Unsigned => return Err(invalid()),
            Some(b'-') => (true, &raw[1..]),
            Some(b'+') => (false, &raw[1..]),
            _ => (false, raw),
        };

        let prefix = rest.get(..2).map(str::to_ascii_lowercase);
        let (radix, digits, prefixed) = match prefix.as_deref() {
            Some("0x") => (16, &rest[2..], true),
            Some("0o") => (8, &rest[2..], true),
            Some("0b") => (2, &rest[2..], true),
            _ if rest.len() > 1 && rest.starts_with('0') => (8, &rest[1..], true),
            _ => (10, rest, false),
        };

        if digits.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            negative,
            radix,
            digits,
            prefixed,
        })
    }

    fn magnitude(&self, raw: &str, kind: FieldKind) -> Result<u128, ValueError> {
        let invalid = || ValueError::Invalid {
            kind,
            value: raw.to_string(),
        };

        if !self.underscores_ok() {
            return Err(invalid());
        }

        let cleaned: String = self.digits.chars().filter(|&c| c != '_').collect();
        if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_digit(self.radix)) {
            return Err(invalid());
        }

        u128::from_str_radix(&cleaned, self.radix).map_err(|e| match e.kind() {
            IntErrorKind::PosOverflow => ValueError::Overflow(raw.to_string()),
            _ => invalid(),
        })
    }

    /// Underscores must sit between digits, or directly after a base prefix.
    fn underscores_ok(&self) -> bool {
        let mut previous_was_digit = self.prefixed;
        for c in self.digits.chars() {
            if c == '_' {
                if !previous_was_digit {
                    return false;
                }
                previous_was_digit = false;
            } else {
                previous_was_digit = true;
            }
        }
        !self.digits.ends_with('_')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assigned<T: FieldValue + Default>(raw: &str) -> Result<T, ValueError> {
        let mut value = T::default();
        value.assign(raw)?;
        Ok(value)
    }

    #[test]
    fn test_decimal_integers() {
        assert_eq!(assigned::<i32>("42").unwrap(), 42);
        assert_eq!(assigned::<i32>("-42").unwrap(), -42);
        assert_eq!(assigned::<i32>("+7").unwrap(), 7);
        assert_eq!(assigned::<u16>("0").unwrap(), 0);
    }

    #[test]
    fn test_prefixed_integers() {
        assert_eq!(assigned::<i64>("0x1F").unwrap(), 31);
        assert_eq!(assigned::<i64>("0X1f").unwrap(), 31);
        assert_eq!(assigned::<i64>("0o17").unwrap(), 15);
        assert_eq!(assigned::<i64>("017").unwrap(), 15);
        assert_eq!(assigned::<i64>("0b101").unwrap(), 5);
        assert_eq!(assigned::<i64>("-0x10").unwrap(), -16);
        assert_eq!(assigned::<u32>("1_000_000").unwrap(), 1_000_000);
        assert_eq!(assigned::<u32>("0x_ff").unwrap(), 255);
    }

    #[test]
    fn test_legacy_octal_underscore() {
        assert_eq!(assigned::<i64>("0_17").unwrap(), 15);
        assert_eq!(assigned::<u8>("0_7_7").unwrap(), 63);
        assert!(matches!(assigned::<i64>("0_"), Err(ValueError::Invalid { .. })));
        assert!(matches!(assigned::<i64>("0__7"), Err(ValueError::Invalid { .. })));
    }

    #[test]
    fn test_malformed_integers() {
        for raw in ["", "abc", "12abc", "0x", "09", "1__0", "_1", "1_", "1.5", "- 1"] {
            assert!(
                matches!(assigned::<i64>(raw), Err(ValueError::Invalid { .. })),
                "expected '{raw}' to be rejected"
            );
        }
    }

    #[test]
    fn test_unsigned_rejects_sign() {
        assert!(matches!(
            assigned::<u32>("-1"),
            Err(ValueError::Invalid {
                kind: FieldKind::Unsigned,
                ..
            })
        ));
        assert!(assigned::<u32>("+1").is_err());
    }

    #[test]
    fn test_integer_overflow() {
        assert!(matches!(assigned::<i8>("128"), Err(ValueError::Overflow(_))));
        assert_eq!(assigned::<i8>("-128").unwrap(), i8::MIN);
        assert!(matches!(assigned::<u8>("0x100"), Err(ValueError::Overflow(_))));
        assert!(matches!(
            assigned::<i64>("9223372036854775808"),
            Err(ValueError::Overflow(_))
        ));
        assert!(matches!(
            assigned::<u128>("0x1_0000_0000_0000_0000_0000_0000_0000_0000"),
            Err(ValueError::Overflow(_))
        ));
        assert_eq!(assigned::<u128>(&u128::MAX.to_string()).unwrap(), u128::MAX);
        assert_eq!(assigned::<i128>(&i128::MIN.to_string()).unwrap(), i128::MIN);
    }

    #[test]
    fn test_failed_assign_leaves_value() {
        let mut port: u16 = 8080;
        assert!(port.assign("70000").is_err());
        assert_eq!(port, 8080);
    }

    #[test]
    fn test_floats_are_written() {
        assert_eq!(assigned::<f64>("2.5").unwrap(), 2.5);
        assert_eq!(assigned::<f64>("-1e3").unwrap(), -1000.0);
        assert_eq!(assigned::<f32>("0.25").unwrap(), 0.25);
        assert!(assigned::<f64>("inf").unwrap().is_infinite());
        assert!(assigned::<f32>("-infinity").unwrap().is_infinite());
    }

    #[test]
    fn test_float_errors() {
        assert!(matches!(
            assigned::<f64>("fast"),
            Err(ValueError::Invalid {
                kind: FieldKind::Float,
                ..
            })
        ));
        assert!(matches!(assigned::<f64>("1e400"), Err(ValueError::Overflow(_))));
        assert!(matches!(assigned::<f32>("1e39"), Err(ValueError::Overflow(_))));
        assert_eq!(assigned::<f64>("1e39").unwrap(), 1e39);
    }

    #[test]
    fn test_hex_floats() {
        assert_eq!(assigned::<f64>("0x1p-2").unwrap(), 0.25);
        assert_eq!(assigned::<f64>("0x1.8p1").unwrap(), 3.0);
        assert_eq!(assigned::<f32>("-0X.8p0").unwrap(), -0.5);
        assert_eq!(assigned::<f64>("0xAp+4").unwrap(), 160.0);
        assert_eq!(assigned::<f64>("0x0p9999").unwrap(), 0.0);
        assert_eq!(assigned::<f64>("0x1p-1074").unwrap(), f64::from_bits(1));

        for raw in ["0x1", "0x1p", "0x.p1", "0xgp1", "0x1.8"] {
            assert!(
                matches!(assigned::<f64>(raw), Err(ValueError::Invalid { .. })),
                "expected '{raw}' to be rejected"
            );
        }
        assert!(matches!(assigned::<f64>("0x1p2000"), Err(ValueError::Overflow(_))));
        assert!(matches!(assigned::<f32>("0x1p200"), Err(ValueError::Overflow(_))));
    }

    #[test]
    fn test_bools() {
        for raw in ["1", "t", "T", "TRUE", "true", "True"] {
            assert!(assigned::<bool>(raw).unwrap());
        }
        for raw in ["0", "f", "F", "FALSE", "false", "False"] {
            assert!(!assigned::<bool>(raw).unwrap());
        }
        assert!(matches!(
            assigned::<bool>("yes"),
            Err(ValueError::Invalid {
                kind: FieldKind::Bool,
                ..
            })
        ));
    }

    #[test]
    fn test_string_is_verbatim() {
        assert_eq!(assigned::<String>("  a#b ").unwrap(), "  a#b ");
    }

    #[derive(Debug, Default, PartialEq)]
    struct Level(u8);

    impl ValueParser for Level {
        fn parse_config_value(raw: &str) -> Result<Self, BoxError> {
            match raw {
                "low" => Ok(Level(1)),
                "high" => Ok(Level(9)),
                other => Err(format!("unknown level '{other}'").into()),
            }
        }
    }

    #[test]
    fn test_custom_parser() {
        let mut level = Level(0);
        assert_eq!(level.kind(), FieldKind::Custom);
        level.assign("high").unwrap();
        assert_eq!(level, Level(9));

        let err = level.assign("medium").unwrap_err();
        assert!(matches!(err, ValueError::Custom(_)));
        assert_eq!(err.to_string(), "unknown level 'medium'");
        assert_eq!(level, Level(9));
    }
}
