//! Arbitrary-magnitude decimal numbers for the economy.
//!
//! Quantities in this game routinely exceed what an `f64` can hold once the
//! multipliers compound, so every resource is a `Decimal`: an `f64` mantissa
//! paired with a base-10 exponent.
//!
//! The exponent is always a multiple of [`CHUNK`]. Anything below `1e100`
//! therefore lives at exponent 0 as a plain `f64`, and arithmetic there is
//! exactly `f64` arithmetic (`2^5 * 1.5 == 48`, `log10(1e9) == 9`). Larger
//! values are carried in chunks of `1e100`.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseDecimalError;

/// Exponent granularity.
const CHUNK: i64 = 100;
const CHUNK_SCALE: f64 = 1e100;

/// Above this `log10`, `f64` results are computed in log space instead.
const F64_SAFE_LOG10: f64 = 300.0;

/// Values at or above this print in exponent form.
const PLAIN_FORMAT_LIMIT: f64 = 1e21;

/// Largest exponent a `Decimal` carries. Results past it saturate to
/// [`Decimal::MAX`]; parsing refuses them.
const MAX_EXPONENT: i64 = 1_000_000_000_000_000;
const MAX_MANTISSA: f64 = 9.99999999999999e99;

/// Invariants:
/// - `exponent` is a multiple of [`CHUNK`] and never negative.
/// - `exponent > 0` implies `1 <= |mantissa| < 1e100`.
/// - `exponent == 0` implies `|mantissa| < 1e100`.
/// - `exponent <= MAX_EXPONENT`.
/// - zero is always `{ 0.0, 0 }`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decimal {
    mantissa: f64,
    exponent: i64,
}

impl Decimal {
    pub const ZERO: Decimal = Decimal {
        mantissa: 0.0,
        exponent: 0,
    };
    pub const ONE: Decimal = Decimal {
        mantissa: 1.0,
        exponent: 0,
    };
    /// The largest finite value.
    pub const MAX: Decimal = Decimal {
        mantissa: MAX_MANTISSA,
        exponent: MAX_EXPONENT,
    };

    /// Build from a plain float.
    pub fn new(value: f64) -> Self {
        Self::normalize(value, 0)
    }

    fn normalize(mut mantissa: f64, mut exponent: i64) -> Self {
        if !mantissa.is_finite() {
            // Kept as-is so callers can detect the fault with `is_finite`.
            return Decimal {
                mantissa,
                exponent: 0,
            };
        }
        if mantissa == 0.0 {
            return Self::ZERO;
        }
        while mantissa.abs() >= CHUNK_SCALE {
            mantissa /= CHUNK_SCALE;
            exponent += CHUNK;
        }
        while exponent > 0 && mantissa.abs() < 1.0 {
            mantissa *= CHUNK_SCALE;
            exponent -= CHUNK;
        }
        while exponent < 0 {
            mantissa /= CHUNK_SCALE;
            exponent += CHUNK;
            if mantissa == 0.0 {
                return Self::ZERO;
            }
        }
        if exponent > MAX_EXPONENT {
            return Self::saturated(mantissa);
        }
        Decimal { mantissa, exponent }
    }

    fn saturated(sign: f64) -> Self {
        Decimal {
            mantissa: MAX_MANTISSA.copysign(sign),
            exponent: MAX_EXPONENT,
        }
    }

    /// `10^log10`. Saturates to [`Decimal::MAX`] past the exponent range.
    pub fn from_log10(log10: f64) -> Self {
        if log10.is_nan() {
            return Self::new(f64::NAN);
        }
        if log10 < F64_SAFE_LOG10 {
            return Self::new(10f64.powf(log10));
        }
        if log10 >= (MAX_EXPONENT + CHUNK) as f64 {
            return Self::MAX;
        }
        let exponent = (log10 / CHUNK as f64).floor() as i64 * CHUNK;
        Self::normalize(10f64.powf(log10 - exponent as f64), exponent)
    }

    /// `10^exponent`, rounded the same way as parsing `"1e<exponent>"`.
    /// Infinite past the exponent range.
    pub fn pow10(exponent: i64) -> Self {
        if exponent >= MAX_EXPONENT + CHUNK {
            return Self::new(f64::INFINITY);
        }
        if exponent < CHUNK {
            return Self::new(format!("1e{exponent}").parse().unwrap_or(f64::NAN));
        }
        let chunk = exponent / CHUNK * CHUNK;
        let mantissa = format!("1e{}", exponent - chunk).parse().unwrap_or(f64::NAN);
        Self::normalize(mantissa, chunk)
    }

    /// `base^exponent` for a non-negative `base`.
    pub fn powf(base: f64, exponent: f64) -> Self {
        if exponent == 0.0 {
            return Self::ONE;
        }
        if base == 0.0 {
            return Self::ZERO;
        }
        let log10 = exponent * base.log10();
        if log10.abs() < F64_SAFE_LOG10 {
            Self::new(base.powf(exponent))
        } else {
            Self::from_log10(log10)
        }
    }

    /// Base-10 logarithm. Only meaningful for positive values.
    pub fn log10(self) -> f64 {
        self.mantissa.log10() + self.exponent as f64
    }

    pub fn floor(self) -> Self {
        if self.exponent > 0 {
            // Already far past the last representable fractional digit.
            self
        } else {
            Self::normalize(self.mantissa.floor(), 0)
        }
    }

    /// Lossy conversion; saturates to infinity beyond `f64` range.
    pub fn to_f64(self) -> f64 {
        if self.exponent == 0 {
            self.mantissa
        } else {
            self.mantissa * 10f64.powf(self.exponent as f64)
        }
    }

    pub fn is_zero(self) -> bool {
        self.mantissa == 0.0
    }

    pub fn is_finite(self) -> bool {
        self.mantissa.is_finite()
    }

    pub fn is_negative(self) -> bool {
        self.mantissa < 0.0
    }

    pub fn max(self, other: Self) -> Self {
        if other > self {
            other
        } else {
            self
        }
    }

    pub fn min(self, other: Self) -> Self {
        if other < self {
            other
        } else {
            self
        }
    }
}

impl Default for Decimal {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<f64> for Decimal {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<u32> for Decimal {
    fn from(value: u32) -> Self {
        Self::new(value as f64)
    }
}

impl Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal {
            mantissa: -self.mantissa,
            exponent: self.exponent,
        }
    }
}

impl Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        if !self.is_finite() || !rhs.is_finite() {
            return Decimal::new(self.mantissa + rhs.mantissa);
        }
        if self.is_zero() {
            return rhs;
        }
        if rhs.is_zero() {
            return self;
        }
        let (big, small) = if self.exponent >= rhs.exponent {
            (self, rhs)
        } else {
            (rhs, self)
        };
        match (big.exponent - small.exponent) / CHUNK {
            0 => Decimal::normalize(big.mantissa + small.mantissa, big.exponent),
            1 => Decimal::normalize(big.mantissa + small.mantissa / CHUNK_SCALE, big.exponent),
            // The smaller operand is below f64 precision of the larger one.
            _ => big,
        }
    }
}

impl Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Decimal) -> Decimal {
        self + (-rhs)
    }
}

impl Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Decimal {
        Decimal::normalize(self.mantissa * rhs.mantissa, self.exponent + rhs.exponent)
    }
}

impl Mul<f64> for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: f64) -> Decimal {
        self * Decimal::new(rhs)
    }
}

impl Div for Decimal {
    type Output = Decimal;

    fn div(self, rhs: Decimal) -> Decimal {
        Decimal::normalize(self.mantissa / rhs.mantissa, self.exponent - rhs.exponent)
    }
}

impl AddAssign for Decimal {
    fn add_assign(&mut self, rhs: Decimal) {
        *self = *self + rhs;
    }
}

impl SubAssign for Decimal {
    fn sub_assign(&mut self, rhs: Decimal) {
        *self = *self - rhs;
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Decimal) -> Option<Ordering> {
        if !self.is_finite() || !other.is_finite() {
            return self.mantissa.partial_cmp(&other.mantissa);
        }
        let sign = |d: &Decimal| -> i8 {
            if d.mantissa > 0.0 {
                1
            } else if d.mantissa < 0.0 {
                -1
            } else {
                0
            }
        };
        let (a, b) = (sign(self), sign(other));
        if a != b {
            return Some(a.cmp(&b));
        }
        let by_exponent = self.exponent.cmp(&other.exponent);
        let by_exponent = if a < 0 {
            by_exponent.reverse()
        } else {
            by_exponent
        };
        match by_exponent {
            Ordering::Equal => self.mantissa.partial_cmp(&other.mantissa),
            ord => Some(ord),
        }
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exponent == 0 {
            if self.mantissa.abs() < PLAIN_FORMAT_LIMIT || !self.is_finite() {
                write!(f, "{}", self.mantissa)
            } else {
                write!(f, "{:e}", self.mantissa)
            }
        } else {
            let formatted = format!("{:e}", self.mantissa);
            match formatted.split_once('e') {
                Some((digits, exp)) => {
                    let exp: i64 = exp.parse().map_err(|_| fmt::Error)?;
                    write!(f, "{}e{}", digits, exp + self.exponent)
                }
                None => Err(fmt::Error),
            }
        }
    }
}

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = || ParseDecimalError(s.to_string());
        let (digits, exp) = match text.find(|c: char| c == 'e' || c == 'E') {
            Some(i) => (
                &text[..i],
                text[i + 1..].parse::<i64>().map_err(|_| invalid())?,
            ),
            None => (text, 0),
        };
        let leading: f64 = digits.parse().map_err(|_| invalid())?;
        if !leading.is_finite() {
            return Err(invalid());
        }
        if leading == 0.0 {
            return Ok(Decimal::ZERO);
        }

        let magnitude = (leading.abs().log10().floor() as i64)
            .checked_add(exp)
            .ok_or_else(invalid)?;
        let value = if magnitude < CHUNK {
            let value: f64 = format!("{digits}e{exp}").parse().map_err(|_| invalid())?;
            Decimal::new(value)
        } else {
            if magnitude >= MAX_EXPONENT + CHUNK {
                return Err(invalid());
            }
            let exponent = magnitude / CHUNK * CHUNK;
            let shift = exp.checked_sub(exponent).ok_or_else(invalid)?;
            let mantissa: f64 = format!("{digits}e{shift}")
                .parse()
                .map_err(|_| invalid())?;
            Decimal::normalize(mantissa, exponent)
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(invalid())
        }
    }
}

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct DecimalVisitor;

impl<'de> Visitor<'de> for DecimalVisitor {
    type Value = Decimal;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal number or numeric string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Decimal, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Decimal, E> {
        if v.is_finite() {
            Ok(Decimal::new(v))
        } else {
            Err(E::custom(ParseDecimalError(v.to_string())))
        }
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Decimal, E> {
        Ok(Decimal::new(v as f64))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Decimal, E> {
        Ok(Decimal::new(v as f64))
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        deserializer.deserialize_any(DecimalVisitor)
    }
}
