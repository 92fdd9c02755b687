//! Multiplier, rate and cost formulas. Pure functions of the state.

use crate::decimal::Decimal;

use super::state::{EconomyState, UpgradeKind, UNIT_COLLAPSE_THRESHOLD};

/// Velocity level past which each level is worth 1.5x instead of 2x.
const VELOCITY_SOFTCAP: u32 = 5;
/// Scale points past which the bonus grows with the square root of the excess.
const SCALE_POINT_SOFTCAP: f64 = 5.0;
/// Acceleration level past which each level adds 0.1 instead of 0.25.
const ACCELERATION_SOFTCAP: u32 = 10;

/// `2^level`, softcapped to `2^5 * 1.5^(level-5)` past level 5.
pub fn velocity_term(level: u32) -> Decimal {
    if level <= VELOCITY_SOFTCAP {
        Decimal::powf(2.0, level as f64)
    } else {
        Decimal::powf(2.0, VELOCITY_SOFTCAP as f64)
            * Decimal::powf(1.5, (level - VELOCITY_SOFTCAP) as f64)
    }
}

/// `1.5^sp`, softcapped to `1.5^5 * 1.5^sqrt(sp-5)` past 5 points.
pub fn scale_point_term(scale_points: Decimal) -> Decimal {
    let softcap = Decimal::new(SCALE_POINT_SOFTCAP);
    if scale_points <= softcap {
        return Decimal::powf(1.5, scale_points.to_f64());
    }
    let excess = scale_points - softcap;
    let root = match excess.to_f64() {
        e if e.is_finite() => e.sqrt(),
        // past f64 range; take the root in log space
        _ => 10f64.powf(excess.log10() / 2.0),
    };
    Decimal::powf(1.5, SCALE_POINT_SOFTCAP) * Decimal::powf(1.5, root)
}

/// `3^level`. Not softcapped.
pub fn mass_velocity_term(level: u32) -> Decimal {
    Decimal::powf(3.0, level as f64)
}

/// `6^level` with enhanced dimensions, `4^level` otherwise.
pub fn dimension_term(level: u32, enhanced: bool) -> Decimal {
    let base = if enhanced { 6.0 } else { 4.0 };
    Decimal::powf(base, level as f64)
}

fn state_dimension_term(state: &EconomyState) -> Decimal {
    dimension_term(state.dimension_level, state.enhanced_dimensions_unlocked)
}

/// Everything that scales distance gain: velocity, scale points, mass
/// velocity and dimensions, in that order.
pub fn total_distance_multiplier(state: &EconomyState) -> Decimal {
    velocity_term(state.level(UpgradeKind::Velocity))
        * scale_point_term(state.scale_points)
        * mass_velocity_term(state.level(UpgradeKind::MassVelocity))
        * state_dimension_term(state)
}

/// Acceleration in m/s² for the given upgrade level.
pub fn acceleration(level: u32) -> Decimal {
    if level <= ACCELERATION_SOFTCAP {
        Decimal::new(0.25 * level as f64)
    } else {
        Decimal::new(2.5 + 0.1 * (level - ACCELERATION_SOFTCAP) as f64)
    }
}

/// Divisor applied to velocity and acceleration costs: `2^sqrt(level)`.
pub fn compression_cost_divisor(level: u32) -> Decimal {
    if level == 0 {
        Decimal::ONE
    } else {
        Decimal::powf(2.0, (level as f64).sqrt())
    }
}

/// Divisor after one more compression level, for previews.
pub fn next_compression_divisor(level: u32) -> Decimal {
    compression_cost_divisor(level.saturating_add(1))
}

/// Mass gain multiplier: 3x with triple mass, times the dimension term.
pub fn mass_multiplier(state: &EconomyState) -> Decimal {
    let triple = if state.triple_mass_unlocked { 3.0 } else { 1.0 };
    state_dimension_term(state) * triple
}

/// What the next level of `kind` actually costs right now.
pub fn discounted_cost(state: &EconomyState, kind: UpgradeKind) -> Decimal {
    let cost = state.upgrade(kind).cost;
    if kind.is_compressible() {
        cost / compression_cost_divisor(state.level(UpgradeKind::Compression))
    } else {
        cost
    }
}

/// Effective distance gained per second.
pub fn distance_rate(state: &EconomyState) -> Decimal {
    state.distance_per_second * total_distance_multiplier(state)
}

/// Effective mass gained per second; zero while mass is locked.
pub fn mass_rate(state: &EconomyState) -> Decimal {
    if state.mass_unlocked {
        state.mass_per_second * mass_multiplier(state)
    } else {
        Decimal::ZERO
    }
}

/// Scale points a Unit Collapse would grant at `distance`:
/// `floor(log10(distance) - 8)`, or zero below the threshold.
pub fn unit_collapse_gain(distance: Decimal) -> Decimal {
    if distance < Decimal::new(UNIT_COLLAPSE_THRESHOLD) {
        return Decimal::ZERO;
    }
    // `log10` can land a hair off an integer; settle the digit count by
    // comparing against the powers of ten themselves.
    let mut digits = distance.log10().floor() as i64;
    if Decimal::pow10(digits + 1) <= distance {
        digits += 1;
    } else if Decimal::pow10(digits) > distance {
        digits -= 1;
    }
    Decimal::new((digits - 8) as f64).max(Decimal::ZERO)
}
