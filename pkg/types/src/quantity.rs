use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while parsing a quantity string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("quantity must not be empty")]
    Empty,
    #[error("quantity '{0}' has no numeric part")]
    MissingNumber(String),
    #[error("quantity '{value}' has unknown suffix '{suffix}'")]
    UnknownSuffix { value: String, suffix: String },
    #[error("quantity '{0}' is out of range")]
    OutOfRange(String),
}

/// How a quantity renders its unit suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QuantityFormat {
    /// Powers of 1000: k, M, G, T, P, E.
    #[default]
    DecimalSi,
    /// Powers of 1024: Ki, Mi, Gi, Ti, Pi, Ei.
    BinarySi,
}

/// A Kubernetes-style resource quantity ("2", "500m", "4Gi", "1.5k").
///
/// The value is held exactly in milli-units. Sub-milli inputs ("n", "u")
/// are rounded up to the next milli-unit. Equality and ordering only look
/// at the value; the format only affects rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct Quantity {
    millis: i128,
    format: QuantityFormat,
}

const BINARY_SUFFIXES: [(&str, u32); 6] = [
    ("Ki", 1),
    ("Mi", 2),
    ("Gi", 3),
    ("Ti", 4),
    ("Pi", 5),
    ("Ei", 6),
];

const DECIMAL_SUFFIXES: [(&str, u32); 6] = [
    ("k", 1),
    ("M", 2),
    ("G", 3),
    ("T", 4),
    ("P", 5),
    ("E", 6),
];

impl Quantity {
    pub const ZERO: Quantity = Quantity {
        millis: 0,
        format: QuantityFormat::DecimalSi,
    };

    /// A whole-unit decimal quantity.
    pub fn from_units(units: i64) -> Self {
        Self {
            millis: units as i128 * 1000,
            format: QuantityFormat::DecimalSi,
        }
    }

    /// A decimal quantity expressed in milli-units.
    pub fn from_millis(millis: i128) -> Self {
        Self {
            millis,
            format: QuantityFormat::DecimalSi,
        }
    }

    pub fn millis(&self) -> i128 {
        self.millis
    }

    pub fn format(&self) -> QuantityFormat {
        self.format
    }

    pub fn is_zero(&self) -> bool {
        self.millis == 0
    }

    /// Multiply by a replica count, saturating instead of overflowing.
    pub fn scaled(self, factor: u32) -> Self {
        Self {
            millis: self.millis.saturating_mul(factor as i128),
            format: self.format,
        }
    }
}

/// Returns `(numerator, denominator)` converting one suffixed unit into milli-units.
fn suffix_scale(suffix: &str) -> Option<(i128, i128, QuantityFormat)> {
    match suffix {
        "" => return Some((1000, 1, QuantityFormat::DecimalSi)),
        "m" => return Some((1, 1, QuantityFormat::DecimalSi)),
        "u" => return Some((1, 1000, QuantityFormat::DecimalSi)),
        "n" => return Some((1, 1_000_000, QuantityFormat::DecimalSi)),
        _ => {}
    }
    if let Some((_, exp)) = BINARY_SUFFIXES.iter().find(|(s, _)| *s == suffix) {
        return Some((1024_i128.pow(*exp) * 1000, 1, QuantityFormat::BinarySi));
    }
    if let Some((_, exp)) = DECIMAL_SUFFIXES.iter().find(|(s, _)| *s == suffix) {
        return Some((1000_i128.pow(*exp) * 1000, 1, QuantityFormat::DecimalSi));
    }
    None
}

/// Decimal exponent suffix such as `e3` or `E-2`. A bare `E` is exa.
fn exponent(suffix: &str) -> Option<i32> {
    let digits = suffix.strip_prefix(['e', 'E'])?;
    let unsigned = digits.strip_prefix(['+', '-']).unwrap_or(digits);
    if unsigned.is_empty() || !unsigned.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.strip_prefix('+').unwrap_or(digits).parse().ok()
}

impl FromStr for Quantity {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if value.is_empty() {
            return Err(QuantityError::Empty);
        }

        let (negative, body) = match value.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, value.strip_prefix('+').unwrap_or(value)),
        };

        let split = body
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(body.len());
        let (number, suffix) = body.split_at(split);

        let (whole, fraction) = match number.split_once('.') {
            Some((w, f)) => (w, f),
            None => (number, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(QuantityError::MissingNumber(value.to_string()));
        }
        if fraction.contains('.') {
            return Err(QuantityError::MissingNumber(value.to_string()));
        }

        let out_of_range = || QuantityError::OutOfRange(value.to_string());

        let (numerator, denominator, format) = match (suffix_scale(suffix), exponent(suffix)) {
            (Some(scale), _) => scale,
            (None, Some(exp)) => {
                let power = 10_i128
                    .checked_pow(exp.unsigned_abs())
                    .ok_or_else(out_of_range)?;
                if exp >= 0 {
                    let numerator = power.checked_mul(1000).ok_or_else(out_of_range)?;
                    (numerator, 1, QuantityFormat::DecimalSi)
                } else {
                    (1000, power, QuantityFormat::DecimalSi)
                }
            }
            (None, None) => {
                return Err(QuantityError::UnknownSuffix {
                    value: value.to_string(),
                    suffix: suffix.to_string(),
                });
            }
        };

        let digits = format!("{}{}", whole, fraction);
        let mantissa: i128 = digits.parse().map_err(|_| out_of_range())?;
        let fraction_scale = 10_i128
            .checked_pow(fraction.len() as u32)
            .ok_or_else(out_of_range)?;

        let scaled = mantissa.checked_mul(numerator).ok_or_else(out_of_range)?;
        let divisor = fraction_scale
            .checked_mul(denominator)
            .ok_or_else(out_of_range)?;
        // Round up to the next milli-unit.
        let mut millis = scaled / divisor;
        if scaled % divisor != 0 {
            millis += 1;
        }

        Ok(Self {
            millis: if negative { -millis } else { millis },
            format,
        })
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.millis % 1000 != 0 {
            return write!(f, "{}m", self.millis);
        }
        let units = self.millis / 1000;
        if units == 0 {
            return write!(f, "0");
        }

        let (base, suffixes): (i128, &[(&str, u32)]) = match self.format {
            QuantityFormat::BinarySi => (1024, &BINARY_SUFFIXES),
            QuantityFormat::DecimalSi => (1000, &DECIMAL_SUFFIXES),
        };
        for (suffix, exp) in suffixes.iter().rev() {
            let unit = base.pow(*exp);
            if units % unit == 0 {
                return write!(f, "{}{}", units / unit, suffix);
            }
        }
        write!(f, "{}", units)
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.millis == other.millis
    }
}

impl Eq for Quantity {}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quantity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.millis.cmp(&other.millis)
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Quantity) -> Quantity {
        // A zero left-hand side adopts the other side's format.
        let format = if self.millis == 0 {
            rhs.format
        } else {
            self.format
        };
        Quantity {
            millis: self.millis.saturating_add(rhs.millis),
            format,
        }
    }
}

impl AddAssign for Quantity {
    fn add_assign(&mut self, rhs: Quantity) {
        *self = *self + rhs;
    }
}

impl Mul<u32> for Quantity {
    type Output = Quantity;

    fn mul(self, rhs: u32) -> Quantity {
        self.scaled(rhs)
    }
}

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Quantity>>(iter: I) -> Quantity {
        iter.fold(Quantity::ZERO, |acc, q| acc + q)
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Quantities arrive either as strings or as bare integers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawQuantity {
    Text(String),
    Integer(i64),
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawQuantity::deserialize(deserializer)? {
            RawQuantity::Text(s) => s.parse().map_err(serde::de::Error::custom),
            RawQuantity::Integer(i) => Ok(Quantity::from_units(i)),
        }
    }
}
