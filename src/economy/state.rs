/// Economy state definitions: resources, upgrade tracks, unlock flags, settings.

use crate::decimal::Decimal;

/// Distance needed for a Unit Collapse (1e6 km).
pub const UNIT_COLLAPSE_THRESHOLD: f64 = 1e9;
/// Distance needed for a Dimension Collapse (one light year).
pub const DIMENSION_COLLAPSE_THRESHOLD: f64 = 9.461e15;

/// Velocity level at which the acceleration upgrade unlocks.
pub const ACCELERATION_GATE_LEVEL: u32 = 5;
/// Acceleration level at which the compression upgrade unlocks.
pub const COMPRESSION_GATE_LEVEL: u32 = 5;

/// Starting cost of the first dimension, in dimension points.
pub const DIMENSION_BASE_COST: f64 = 1.0;
/// Flat amount added to the dimension cost per purchase.
pub const DIMENSION_COST_INCREMENT: f64 = 1.0;

/// Mass produced per second once mass generation is bought (1 g/s).
pub const BASE_MASS_PER_SECOND: f64 = 1.0;

pub const TICK_RATE_MIN: u32 = 10;
pub const TICK_RATE_MAX: u32 = 60;
pub const DEFAULT_TICK_RATE: u32 = 60;
pub const AUTO_SAVE_INTERVAL_MIN: u32 = 1;
pub const AUTO_SAVE_INTERVAL_MAX: u32 = 60;
pub const DEFAULT_AUTO_SAVE_INTERVAL: u32 = 5;

/// Which resource an upgrade is paid with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Currency {
    Distance,
    Mass,
}

/// The four repeatable upgrade tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpgradeKind {
    Velocity,
    Acceleration,
    Compression,
    MassVelocity,
}

impl UpgradeKind {
    /// All kinds, in auto-upgrade purchase order.
    pub fn all() -> &'static [UpgradeKind] {
        &[
            UpgradeKind::Velocity,
            UpgradeKind::Acceleration,
            UpgradeKind::Compression,
            UpgradeKind::MassVelocity,
        ]
    }

    pub fn index(&self) -> usize {
        match self {
            UpgradeKind::Velocity => 0,
            UpgradeKind::Acceleration => 1,
            UpgradeKind::Compression => 2,
            UpgradeKind::MassVelocity => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            UpgradeKind::Velocity => "Velocity",
            UpgradeKind::Acceleration => "Acceleration",
            UpgradeKind::Compression => "Distance Compression",
            UpgradeKind::MassVelocity => "Mass Velocity",
        }
    }

    /// Cost of level 1.
    pub fn base_cost(&self) -> Decimal {
        match self {
            UpgradeKind::Velocity => Decimal::new(10.0),
            UpgradeKind::Acceleration => Decimal::new(1000.0),
            UpgradeKind::Compression => Decimal::new(1e7),
            UpgradeKind::MassVelocity => Decimal::new(100.0),
        }
    }

    /// Factor applied to the stored cost after each purchase.
    pub fn cost_multiplier(&self) -> f64 {
        match self {
            UpgradeKind::Velocity => 2.5,
            UpgradeKind::Acceleration => 3.0,
            UpgradeKind::Compression => 5.0,
            UpgradeKind::MassVelocity => 3.0,
        }
    }

    pub fn currency(&self) -> Currency {
        match self {
            UpgradeKind::MassVelocity => Currency::Mass,
            _ => Currency::Distance,
        }
    }

    /// Whether the compression divisor applies to this upgrade's cost.
    pub fn is_compressible(&self) -> bool {
        matches!(self, UpgradeKind::Velocity | UpgradeKind::Acceleration)
    }
}

/// One upgrade track: its level, the undiscounted cost of the next level,
/// and whether it can be bought at all.
#[derive(Clone, Debug, PartialEq)]
pub struct Upgrade {
    pub kind: UpgradeKind,
    pub level: u32,
    pub cost: Decimal,
    pub unlocked: bool,
}

impl Upgrade {
    pub fn new(kind: UpgradeKind) -> Self {
        Self {
            kind,
            level: 0,
            cost: kind.base_cost(),
            // Velocity is available from the start; the rest are gated.
            unlocked: kind == UpgradeKind::Velocity,
        }
    }
}

/// Runtime-adjustable, persisted settings.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// Simulation steps per second, within `[TICK_RATE_MIN, TICK_RATE_MAX]`.
    pub tick_rate: u32,
    /// Seconds between automatic saves, within the auto-save bounds.
    pub auto_save_interval: u32,
}

impl Settings {
    pub fn new() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            auto_save_interval: DEFAULT_AUTO_SAVE_INTERVAL,
        }
    }

    pub fn set_tick_rate(&mut self, rate: u32) {
        self.tick_rate = rate.clamp(TICK_RATE_MIN, TICK_RATE_MAX);
    }

    pub fn set_auto_save_interval(&mut self, seconds: u32) {
        self.auto_save_interval = seconds.clamp(AUTO_SAVE_INTERVAL_MIN, AUTO_SAVE_INTERVAL_MAX);
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

/// Full state of the economy. Only the step and the action functions in
/// `logic` mutate it.
#[derive(Clone, Debug, PartialEq)]
pub struct EconomyState {
    /// Primary resource, in meters.
    pub distance: Decimal,
    /// Base velocity before multipliers, in m/s.
    pub distance_per_second: Decimal,
    /// Tier-1 meta-currency from Unit Collapse.
    pub scale_points: Decimal,

    /// Secondary resource, in grams.
    pub mass: Decimal,
    pub mass_per_second: Decimal,
    pub mass_unlocked: bool,

    /// Tier-2 meta-currency from Dimension Collapse.
    pub dimension_points: Decimal,
    pub dimension_level: u32,
    pub dimension_cost: Decimal,

    /// Upgrade tracks, indexed by `UpgradeKind::index()`.
    pub upgrades: [Upgrade; 4],

    pub scale_upgrades_unlocked: bool,
    pub mass_generation_unlocked: bool,
    pub auto_upgrade_unlocked: bool,
    pub triple_mass_unlocked: bool,
    pub persistent_mass_upgrades: bool,
    pub dimension_collapse_unlocked: bool,
    pub dimensions_tab_unlocked: bool,
    pub enhanced_dimensions_unlocked: bool,

    /// Lifetime statistics; no reset touches these.
    pub unit_collapses: u32,
    pub dimension_collapses: u32,

    pub settings: Settings,
}

impl EconomyState {
    pub fn new() -> Self {
        Self {
            distance: Decimal::ZERO,
            distance_per_second: Decimal::ONE, // Start at 1 m/s
            scale_points: Decimal::ZERO,
            mass: Decimal::ZERO,
            mass_per_second: Decimal::ZERO,
            mass_unlocked: false,
            dimension_points: Decimal::ZERO,
            dimension_level: 0,
            dimension_cost: Decimal::new(DIMENSION_BASE_COST),
            upgrades: [
                Upgrade::new(UpgradeKind::Velocity),
                Upgrade::new(UpgradeKind::Acceleration),
                Upgrade::new(UpgradeKind::Compression),
                Upgrade::new(UpgradeKind::MassVelocity),
            ],
            scale_upgrades_unlocked: false,
            mass_generation_unlocked: false,
            auto_upgrade_unlocked: false,
            triple_mass_unlocked: false,
            persistent_mass_upgrades: false,
            dimension_collapse_unlocked: false,
            dimensions_tab_unlocked: false,
            enhanced_dimensions_unlocked: false,
            unit_collapses: 0,
            dimension_collapses: 0,
            settings: Settings::new(),
        }
    }

    pub fn upgrade(&self, kind: UpgradeKind) -> &Upgrade {
        &self.upgrades[kind.index()]
    }

    pub fn upgrade_mut(&mut self, kind: UpgradeKind) -> &mut Upgrade {
        &mut self.upgrades[kind.index()]
    }

    pub fn level(&self, kind: UpgradeKind) -> u32 {
        self.upgrade(kind).level
    }

    /// Balance of the given currency.
    pub fn balance(&self, currency: Currency) -> Decimal {
        match currency {
            Currency::Distance => self.distance,
            Currency::Mass => self.mass,
        }
    }

    pub fn balance_mut(&mut self, currency: Currency) -> &mut Decimal {
        match currency {
            Currency::Distance => &mut self.distance,
            Currency::Mass => &mut self.mass,
        }
    }
}

impl Default for EconomyState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let state = EconomyState::new();
        assert_eq!(state.distance, Decimal::ZERO);
        assert_eq!(state.distance_per_second, Decimal::ONE);
        assert_eq!(state.dimension_cost, Decimal::ONE);
        assert!(state.upgrade(UpgradeKind::Velocity).unlocked);
        assert!(!state.upgrade(UpgradeKind::Acceleration).unlocked);
        assert!(!state.upgrade(UpgradeKind::Compression).unlocked);
        assert!(!state.upgrade(UpgradeKind::MassVelocity).unlocked);
        assert_eq!(state.settings.tick_rate, 60);
        assert_eq!(state.settings.auto_save_interval, 5);
    }

    #[test]
    fn upgrade_slots_match_kind_index() {
        let state = EconomyState::new();
        for kind in UpgradeKind::all() {
            assert_eq!(state.upgrade(*kind).kind, *kind);
            assert_eq!(state.upgrade(*kind).cost, kind.base_cost());
        }
    }

    #[test]
    fn only_velocity_and_acceleration_are_compressible() {
        assert!(UpgradeKind::Velocity.is_compressible());
        assert!(UpgradeKind::Acceleration.is_compressible());
        assert!(!UpgradeKind::Compression.is_compressible());
        assert!(!UpgradeKind::MassVelocity.is_compressible());
        assert_eq!(UpgradeKind::MassVelocity.currency(), Currency::Mass);
    }

    #[test]
    fn settings_are_clamped() {
        let mut settings = Settings::new();
        settings.set_tick_rate(5);
        assert_eq!(settings.tick_rate, 10);
        settings.set_tick_rate(500);
        assert_eq!(settings.tick_rate, 60);
        settings.set_tick_rate(30);
        assert_eq!(settings.tick_rate, 30);
        settings.set_auto_save_interval(0);
        assert_eq!(settings.auto_save_interval, 1);
        settings.set_auto_save_interval(120);
        assert_eq!(settings.auto_save_interval, 60);
    }

    #[test]
    fn balance_by_currency() {
        let mut state = EconomyState::new();
        *state.balance_mut(Currency::Mass) = Decimal::new(7.0);
        assert_eq!(state.balance(Currency::Mass), Decimal::new(7.0));
        assert_eq!(state.balance(Currency::Distance), Decimal::ZERO);
    }
}
