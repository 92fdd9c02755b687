//! Named actions of the economy.
//!
//! Every mutation a player (or the playtest bot) can request is one of
//! these. Each has a stable kebab-case name and a default key binding.

use std::fmt;
use std::str::FromStr;

use super::state::UpgradeKind;

/// One-time unlocks bought with scale points (or mass, for enhanced dimensions).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScaleUnlock {
    MassGeneration,
    AutoUpgrade,
    TripleMass,
    PersistentMass,
    DimensionCollapse,
    EnhancedDimensions,
}

impl ScaleUnlock {
    pub fn all() -> &'static [ScaleUnlock] {
        &[
            ScaleUnlock::MassGeneration,
            ScaleUnlock::AutoUpgrade,
            ScaleUnlock::TripleMass,
            ScaleUnlock::PersistentMass,
            ScaleUnlock::DimensionCollapse,
            ScaleUnlock::EnhancedDimensions,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScaleUnlock::MassGeneration => "Mass Generation",
            ScaleUnlock::AutoUpgrade => "Auto Upgrade",
            ScaleUnlock::TripleMass => "Triple Mass",
            ScaleUnlock::PersistentMass => "Persistent Mass Upgrades",
            ScaleUnlock::DimensionCollapse => "Dimension Collapse",
            ScaleUnlock::EnhancedDimensions => "Enhanced Dimensions",
        }
    }

    /// Price in scale points, or in grams of mass for enhanced dimensions.
    pub fn cost(&self) -> f64 {
        match self {
            ScaleUnlock::MassGeneration => 1.0,
            ScaleUnlock::AutoUpgrade => 1.0,
            ScaleUnlock::TripleMass => 5.0,
            ScaleUnlock::PersistentMass => 15.0,
            ScaleUnlock::DimensionCollapse => 25.0,
            ScaleUnlock::EnhancedDimensions => 1_000_000.0,
        }
    }

    pub fn paid_with_mass(&self) -> bool {
        matches!(self, ScaleUnlock::EnhancedDimensions)
    }
}

/// Every state-changing request the engine accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Buy(UpgradeKind),
    Unlock(ScaleUnlock),
    BuyDimension,
    UnitCollapse,
    DimensionCollapse,
}

impl Action {
    pub fn all() -> &'static [Action] {
        &[
            Action::Buy(UpgradeKind::Velocity),
            Action::Buy(UpgradeKind::Acceleration),
            Action::Buy(UpgradeKind::Compression),
            Action::Buy(UpgradeKind::MassVelocity),
            Action::Unlock(ScaleUnlock::MassGeneration),
            Action::Unlock(ScaleUnlock::AutoUpgrade),
            Action::Unlock(ScaleUnlock::TripleMass),
            Action::Unlock(ScaleUnlock::PersistentMass),
            Action::Unlock(ScaleUnlock::DimensionCollapse),
            Action::Unlock(ScaleUnlock::EnhancedDimensions),
            Action::BuyDimension,
            Action::UnitCollapse,
            Action::DimensionCollapse,
        ]
    }

    /// Stable identifier used by external callers.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Buy(UpgradeKind::Velocity) => "buy-velocity",
            Action::Buy(UpgradeKind::Acceleration) => "buy-acceleration",
            Action::Buy(UpgradeKind::Compression) => "buy-compression",
            Action::Buy(UpgradeKind::MassVelocity) => "buy-mass-velocity",
            Action::Unlock(ScaleUnlock::MassGeneration) => "unlock-mass-generation",
            Action::Unlock(ScaleUnlock::AutoUpgrade) => "unlock-auto-upgrade",
            Action::Unlock(ScaleUnlock::TripleMass) => "unlock-triple-mass",
            Action::Unlock(ScaleUnlock::PersistentMass) => "unlock-persistent-mass",
            Action::Unlock(ScaleUnlock::DimensionCollapse) => "unlock-dimension-collapse",
            Action::Unlock(ScaleUnlock::EnhancedDimensions) => "unlock-enhanced-dimensions",
            Action::BuyDimension => "buy-dimension",
            Action::UnitCollapse => "unit-collapse",
            Action::DimensionCollapse => "dimension-collapse",
        }
    }

    /// Default keyboard binding in the browser host.
    pub fn key(&self) -> char {
        match self {
            Action::Buy(UpgradeKind::Velocity) => '1',
            Action::Buy(UpgradeKind::Acceleration) => '2',
            Action::Buy(UpgradeKind::Compression) => '3',
            Action::Buy(UpgradeKind::MassVelocity) => '4',
            Action::Unlock(ScaleUnlock::MassGeneration) => 'm',
            Action::Unlock(ScaleUnlock::AutoUpgrade) => 'a',
            Action::Unlock(ScaleUnlock::TripleMass) => 't',
            Action::Unlock(ScaleUnlock::PersistentMass) => 'k',
            Action::Unlock(ScaleUnlock::DimensionCollapse) => 'u',
            Action::Unlock(ScaleUnlock::EnhancedDimensions) => 'e',
            Action::BuyDimension => 'b',
            Action::UnitCollapse => 'p',
            Action::DimensionCollapse => 'd',
        }
    }

    pub fn from_key(key: char) -> Option<Action> {
        Action::all().iter().copied().find(|a| a.key() == key)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::all()
            .iter()
            .copied()
            .find(|a| a.name() == s)
            .ok_or_else(|| format!("unknown action: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_roundtrip() {
        for action in Action::all() {
            assert_eq!(action.name().parse::<Action>().unwrap(), *action);
        }
        assert!("buy-everything".parse::<Action>().is_err());
    }

    #[test]
    fn thirteen_distinct_actions() {
        let all = Action::all();
        assert_eq!(all.len(), 13);
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.name(), b.name());
                assert_ne!(a.key(), b.key());
            }
        }
    }

    #[test]
    fn key_lookup() {
        assert_eq!(Action::from_key('p'), Some(Action::UnitCollapse));
        assert_eq!(Action::from_key('1'), Some(Action::Buy(UpgradeKind::Velocity)));
        assert_eq!(Action::from_key('z'), None);
    }

    #[test]
    fn only_enhanced_dimensions_costs_mass() {
        for unlock in ScaleUnlock::all() {
            assert_eq!(
                unlock.paid_with_mass(),
                *unlock == ScaleUnlock::EnhancedDimensions
            );
        }
    }
}
