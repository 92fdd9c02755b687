//! Human-readable quantities: distance and mass with the largest fitting
//! unit, at four significant figures.

use crate::decimal::Decimal;

/// Significant figures shown for every formatted quantity.
pub const SIGNIFICANT_DIGITS: usize = 4;

/// Distance units in meters, ascending.
pub const DISTANCE_UNITS: &[(f64, &str)] = &[
    (1.0, "m"),
    (1e3, "km"),
    (1.496e11, "AU"),
    (9.461e15, "ly"),
    (3.086e22, "Mpc"),
];

/// Mass units in grams, ascending.
pub const MASS_UNITS: &[(f64, &str)] = &[
    (1.0, "g"),
    (1e3, "kg"),
    (1e6, "t"),
    (5.972e27, "M⊕"),
    (1.989e33, "M☉"),
];

/// Exponents outside `[-7, digits)` switch to exponent notation.
const MIN_FIXED_EXPONENT: i64 = -7;

/// Format `value` with `digits` significant figures, in plain notation when
/// the exponent is small and `1.234e+25` notation otherwise.
pub fn to_precision(value: Decimal, digits: usize) -> String {
    let digits = digits.max(1);
    if !value.is_finite() {
        return value.to_string();
    }
    if value.is_zero() {
        return format!("{:.*}", digits - 1, 0.0);
    }

    let sign = if value.is_negative() { "-" } else { "" };
    let magnitude = if value.is_negative() { -value } else { value };
    let log10 = magnitude.log10();

    let (mantissa, exponent) = if log10.abs() < 300.0 {
        split_scientific(magnitude.to_f64(), digits)
    } else {
        let mut exponent = log10.floor() as i64;
        let mut mantissa = round_to(10f64.powf(log10 - exponent as f64), digits - 1);
        if mantissa >= 10.0 {
            mantissa /= 10.0;
            exponent += 1;
        }
        (mantissa, exponent)
    };

    if exponent < MIN_FIXED_EXPONENT || exponent >= digits as i64 {
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        return format!(
            "{sign}{mantissa:.prec$}e{exp_sign}{}",
            exponent.abs(),
            prec = digits - 1
        );
    }
    let decimals = (digits as i64 - 1 - exponent).max(0) as usize;
    format!("{sign}{:.*}", decimals, magnitude.to_f64())
}

/// Mantissa and exponent after rounding to `digits` significant figures.
fn split_scientific(value: f64, digits: usize) -> (f64, i64) {
    let formatted = format!("{:.*e}", digits - 1, value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => (
            mantissa.parse().unwrap_or(value),
            exponent.parse().unwrap_or(0),
        ),
        None => (value, 0),
    }
}

fn round_to(value: f64, decimals: usize) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

fn format_with_units(value: Decimal, units: &[(f64, &str)]) -> String {
    let (scale, name) = units
        .iter()
        .rev()
        .find(|(scale, _)| value >= Decimal::new(*scale))
        .unwrap_or(&units[0]);
    let scaled = value / Decimal::new(*scale);
    format!("{} {}", to_precision(scaled, SIGNIFICANT_DIGITS), name)
}

/// `1234` becomes `"1.234 km"`.
pub fn format_distance(meters: Decimal) -> String {
    format_with_units(meters, DISTANCE_UNITS)
}

/// `2500000` becomes `"2.500 t"`.
pub fn format_mass(grams: Decimal) -> String {
    format_with_units(grams, MASS_UNITS)
}

/// Multiplier or divisor preview such as `"48.00x"`.
pub fn format_multiplier(value: Decimal) -> String {
    format!("{}x", to_precision(value, SIGNIFICANT_DIGITS))
}
