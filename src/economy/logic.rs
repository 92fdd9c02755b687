//! Economy logic: the simulation step, purchases, unlocks and the two
//! prestige resets. All functions are pure state transitions.
//!
//! Every action checks its preconditions first and returns `false` without
//! touching the state when they are not met.

use crate::decimal::Decimal;
use crate::error::SimulationFault;

use super::actions::{Action, ScaleUnlock};
use super::formula;
use super::state::{
    EconomyState, Upgrade, UpgradeKind, ACCELERATION_GATE_LEVEL, BASE_MASS_PER_SECOND,
    COMPRESSION_GATE_LEVEL, DIMENSION_COLLAPSE_THRESHOLD, DIMENSION_COST_INCREMENT,
};

/// Advance the economy by one fixed step of `dt` seconds.
///
/// Nothing is committed if any resulting resource would be non-finite or
/// negative.
pub fn step(state: &mut EconomyState, dt: f64) -> Result<(), SimulationFault> {
    let acceleration = formula::acceleration(state.level(UpgradeKind::Acceleration));
    let distance_per_second = state.distance_per_second + acceleration * dt;
    let distance = state.distance
        + distance_per_second * formula::total_distance_multiplier(state) * dt;
    let mass = if state.mass_unlocked {
        state.mass + state.mass_per_second * formula::mass_multiplier(state) * dt
    } else {
        state.mass
    };

    ensure_valid("distance_per_second", distance_per_second)?;
    ensure_valid("distance", distance)?;
    ensure_valid("mass", mass)?;

    state.distance_per_second = distance_per_second;
    state.distance = distance;
    state.mass = mass;

    if state.auto_upgrade_unlocked {
        auto_upgrade(state);
    }
    refresh_unlocks(state);
    Ok(())
}

fn ensure_valid(field: &'static str, value: Decimal) -> Result<(), SimulationFault> {
    if value.is_finite() && !value.is_negative() {
        Ok(())
    } else {
        Err(SimulationFault::NonFinite { field })
    }
}

/// Try each upgrade once, in purchase order.
fn auto_upgrade(state: &mut EconomyState) {
    for kind in UpgradeKind::all() {
        buy_upgrade(state, *kind);
    }
}

/// Recompute the upgrade gates that follow from levels and flags.
pub fn refresh_unlocks(state: &mut EconomyState) {
    if state.level(UpgradeKind::Velocity) >= ACCELERATION_GATE_LEVEL {
        state.upgrade_mut(UpgradeKind::Acceleration).unlocked = true;
    }
    if state.level(UpgradeKind::Acceleration) >= COMPRESSION_GATE_LEVEL {
        state.upgrade_mut(UpgradeKind::Compression).unlocked = true;
    }
    let mass_unlocked = state.mass_unlocked;
    state.upgrade_mut(UpgradeKind::MassVelocity).unlocked = mass_unlocked;
}

/// Try to buy one level of an upgrade. Returns true if successful.
pub fn buy_upgrade(state: &mut EconomyState, kind: UpgradeKind) -> bool {
    if !state.upgrade(kind).unlocked {
        return false;
    }
    let Some(next_level) = state.level(kind).checked_add(1) else {
        return false;
    };
    let cost = formula::discounted_cost(state, kind);
    let currency = kind.currency();
    if state.balance(currency) < cost {
        return false;
    }

    *state.balance_mut(currency) -= cost;
    let upgrade = state.upgrade_mut(kind);
    upgrade.level = next_level;
    upgrade.cost = upgrade.cost * kind.cost_multiplier();
    refresh_unlocks(state);
    true
}

pub fn is_unlocked(state: &EconomyState, unlock: ScaleUnlock) -> bool {
    match unlock {
        ScaleUnlock::MassGeneration => state.mass_generation_unlocked,
        ScaleUnlock::AutoUpgrade => state.auto_upgrade_unlocked,
        ScaleUnlock::TripleMass => state.triple_mass_unlocked,
        ScaleUnlock::PersistentMass => state.persistent_mass_upgrades,
        ScaleUnlock::DimensionCollapse => state.dimension_collapse_unlocked,
        ScaleUnlock::EnhancedDimensions => state.enhanced_dimensions_unlocked,
    }
}

/// Whether the flags an unlock depends on are already set.
pub fn prerequisites_met(state: &EconomyState, unlock: ScaleUnlock) -> bool {
    match unlock {
        ScaleUnlock::AutoUpgrade | ScaleUnlock::TripleMass | ScaleUnlock::PersistentMass => {
            state.mass_generation_unlocked
        }
        ScaleUnlock::EnhancedDimensions => state.dimensions_tab_unlocked,
        ScaleUnlock::MassGeneration | ScaleUnlock::DimensionCollapse => true,
    }
}

/// Whether `unlock` would succeed right now.
pub fn can_unlock(state: &EconomyState, unlock: ScaleUnlock) -> bool {
    let balance = if unlock.paid_with_mass() {
        state.mass
    } else {
        state.scale_points
    };
    !is_unlocked(state, unlock)
        && prerequisites_met(state, unlock)
        && balance >= Decimal::new(unlock.cost())
}

/// Buy a one-time unlock. Returns true if successful.
pub fn unlock(state: &mut EconomyState, unlock: ScaleUnlock) -> bool {
    if !can_unlock(state, unlock) {
        return false;
    }
    let cost = Decimal::new(unlock.cost());
    if unlock.paid_with_mass() {
        state.mass -= cost;
    } else {
        state.scale_points -= cost;
    }

    match unlock {
        ScaleUnlock::MassGeneration => {
            state.mass_generation_unlocked = true;
            state.mass_unlocked = true;
            state.mass_per_second = Decimal::new(BASE_MASS_PER_SECOND);
        }
        ScaleUnlock::AutoUpgrade => state.auto_upgrade_unlocked = true,
        ScaleUnlock::TripleMass => state.triple_mass_unlocked = true,
        ScaleUnlock::PersistentMass => state.persistent_mass_upgrades = true,
        ScaleUnlock::DimensionCollapse => state.dimension_collapse_unlocked = true,
        ScaleUnlock::EnhancedDimensions => state.enhanced_dimensions_unlocked = true,
    }
    refresh_unlocks(state);
    true
}

/// Buy one dimension level with dimension points. Returns true if successful.
pub fn buy_dimension(state: &mut EconomyState) -> bool {
    let Some(next_level) = state.dimension_level.checked_add(1) else {
        return false;
    };
    if state.dimension_points < state.dimension_cost {
        return false;
    }
    state.dimension_points -= state.dimension_cost;
    state.dimension_level = next_level;
    state.dimension_cost += Decimal::new(DIMENSION_COST_INCREMENT);
    true
}

/// A single field (or field group) restored to its default by a prestige.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetField {
    Distance,
    DistancePerSecond,
    VelocityUpgrade,
    AccelerationUpgrade,
    CompressionUpgrade,
    Mass,
    /// Mass velocity level and cost, skipped while persistent mass upgrades are owned.
    MassVelocityUnlessPersistent,
    MassVelocityUpgrade,
    ScalePoints,
    MassPerSecond,
    MassUnlocked,
    MassGenerationUnlock,
    AutoUpgradeUnlock,
    TripleMassUnlock,
    PersistentMassUnlock,
}

/// What a Unit Collapse resets, in order.
pub const UNIT_COLLAPSE_RESETS: &[ResetField] = &[
    ResetField::Distance,
    ResetField::DistancePerSecond,
    ResetField::VelocityUpgrade,
    ResetField::AccelerationUpgrade,
    ResetField::CompressionUpgrade,
    ResetField::Mass,
    ResetField::MassVelocityUnlessPersistent,
];

/// What a Dimension Collapse resets, in order: everything a Unit Collapse
/// resets, then the tier-2 unlocks and their currency.
pub const DIMENSION_COLLAPSE_RESETS: &[ResetField] = &[
    ResetField::Distance,
    ResetField::DistancePerSecond,
    ResetField::VelocityUpgrade,
    ResetField::AccelerationUpgrade,
    ResetField::CompressionUpgrade,
    ResetField::Mass,
    ResetField::MassVelocityUnlessPersistent,
    ResetField::MassVelocityUpgrade,
    ResetField::ScalePoints,
    ResetField::MassPerSecond,
    ResetField::MassUnlocked,
    ResetField::MassGenerationUnlock,
    ResetField::AutoUpgradeUnlock,
    ResetField::TripleMassUnlock,
    ResetField::PersistentMassUnlock,
];

fn reset_field(state: &mut EconomyState, field: ResetField) {
    match field {
        ResetField::Distance => state.distance = Decimal::ZERO,
        ResetField::DistancePerSecond => state.distance_per_second = Decimal::ONE,
        ResetField::VelocityUpgrade => reset_upgrade(state, UpgradeKind::Velocity),
        ResetField::AccelerationUpgrade => reset_upgrade(state, UpgradeKind::Acceleration),
        ResetField::CompressionUpgrade => reset_upgrade(state, UpgradeKind::Compression),
        ResetField::Mass => state.mass = Decimal::ZERO,
        ResetField::MassVelocityUnlessPersistent => {
            if !state.persistent_mass_upgrades {
                reset_upgrade(state, UpgradeKind::MassVelocity);
            }
        }
        ResetField::MassVelocityUpgrade => reset_upgrade(state, UpgradeKind::MassVelocity),
        ResetField::ScalePoints => state.scale_points = Decimal::ZERO,
        ResetField::MassPerSecond => state.mass_per_second = Decimal::ZERO,
        ResetField::MassUnlocked => state.mass_unlocked = false,
        ResetField::MassGenerationUnlock => state.mass_generation_unlocked = false,
        ResetField::AutoUpgradeUnlock => state.auto_upgrade_unlocked = false,
        ResetField::TripleMassUnlock => state.triple_mass_unlocked = false,
        ResetField::PersistentMassUnlock => state.persistent_mass_upgrades = false,
    }
}

fn reset_upgrade(state: &mut EconomyState, kind: UpgradeKind) {
    *state.upgrade_mut(kind) = Upgrade::new(kind);
}

fn apply_resets(state: &mut EconomyState, fields: &[ResetField]) {
    for field in fields {
        reset_field(state, *field);
    }
    refresh_unlocks(state);
}

/// Whether a Unit Collapse would succeed right now.
pub fn can_unit_collapse(state: &EconomyState) -> bool {
    !formula::unit_collapse_gain(state.distance).is_zero()
}

/// Perform a Unit Collapse. Returns the scale points gained (zero if the
/// distance threshold is not reached, in which case nothing changes).
pub fn unit_collapse(state: &mut EconomyState) -> Decimal {
    let gain = formula::unit_collapse_gain(state.distance);
    if gain.is_zero() {
        return Decimal::ZERO;
    }
    state.scale_points += gain;
    state.scale_upgrades_unlocked = true;
    state.unit_collapses = state.unit_collapses.saturating_add(1);
    apply_resets(state, UNIT_COLLAPSE_RESETS);
    gain
}

/// Whether a Dimension Collapse would succeed right now.
pub fn can_dimension_collapse(state: &EconomyState) -> bool {
    state.dimension_collapse_unlocked
        && state.distance >= Decimal::new(DIMENSION_COLLAPSE_THRESHOLD)
}

/// Perform a Dimension Collapse for a flat single dimension point.
/// Returns true if successful.
pub fn dimension_collapse(state: &mut EconomyState) -> bool {
    if !can_dimension_collapse(state) {
        return false;
    }
    state.dimension_points += Decimal::ONE;
    state.dimensions_tab_unlocked = true;
    state.dimension_collapses = state.dimension_collapses.saturating_add(1);
    apply_resets(state, DIMENSION_COLLAPSE_RESETS);
    true
}

/// Dispatch a named action. Returns true if the state changed.
pub fn perform(state: &mut EconomyState, action: Action) -> bool {
    match action {
        Action::Buy(kind) => buy_upgrade(state, kind),
        Action::Unlock(which) => unlock(state, which),
        Action::BuyDimension => buy_dimension(state),
        Action::UnitCollapse => !unit_collapse(state).is_zero(),
        Action::DimensionCollapse => dimension_collapse(state),
    }
}

/// Resources credited by an offline catch-up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OfflineGain {
    pub seconds: f64,
    pub distance: Decimal,
    pub mass: Decimal,
}

/// Project `seconds` of absence forward in one go at the current rates.
/// Velocity does not grow during the absence; acceleration is not integrated.
pub fn apply_offline_progress(state: &mut EconomyState, seconds: f64) -> OfflineGain {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let distance = formula::distance_rate(state) * seconds;
    let mass = formula::mass_rate(state) * seconds;
    state.distance += distance;
    state.mass += mass;
    OfflineGain {
        seconds,
        distance,
        mass,
    }
}
