//! Scale Collapse economy: distance, mass and dimensions, with two prestige
//! tiers on top.
//!
//! [`Engine`] owns the state and is the only public way to change it. Hosts
//! call [`Engine::frame`] once per animation frame, read [`Engine::snapshot`]
//! to render, and forward player input to [`Engine::perform`].

pub mod actions;
pub mod formula;
pub mod logic;
pub mod save;
pub mod state;
pub mod units;

#[cfg(test)]
mod simulator;

use serde::Serialize;

use crate::decimal::Decimal;
use crate::diag;
use crate::error::{ImportError, StorageError};
use crate::time::GameTime;

use actions::{Action, ScaleUnlock};
use logic::OfflineGain;
use save::{SaveStorage, SAVE_VERSION};
use state::{EconomyState, UpgradeKind};

/// One upgrade track as the host sees it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeView {
    pub action: &'static str,
    pub name: &'static str,
    pub level: u32,
    /// Price of the next level after the compression discount.
    pub cost: Decimal,
    pub unlocked: bool,
    pub affordable: bool,
}

/// One scale unlock as the host sees it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockView {
    pub action: &'static str,
    pub name: &'static str,
    pub cost: f64,
    pub paid_with_mass: bool,
    pub owned: bool,
    /// Prerequisites met; the unlock can be shown.
    pub available: bool,
    pub affordable: bool,
}

/// Read-only view of everything a renderer or bot needs to decide what to do.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub distance: Decimal,
    pub distance_per_second: Decimal,
    /// Effective distance per second after all multipliers.
    pub distance_rate: Decimal,
    pub acceleration: Decimal,
    pub total_distance_multiplier: Decimal,

    pub mass: Decimal,
    pub mass_per_second: Decimal,
    pub mass_rate: Decimal,
    pub mass_multiplier: Decimal,
    pub mass_unlocked: bool,

    pub scale_points: Decimal,
    pub pending_scale_points: Decimal,
    pub scale_upgrades_unlocked: bool,

    pub dimension_points: Decimal,
    pub dimension_level: u32,
    pub dimension_cost: Decimal,
    pub dimensions_tab_unlocked: bool,

    pub compression_divisor: Decimal,
    pub next_compression_divisor: Decimal,

    pub upgrades: [UpgradeView; 4],
    pub unlocks: Vec<UnlockView>,

    pub can_prestige: bool,
    pub can_dimension_collapse: bool,
    pub can_buy_dimension: bool,

    pub unit_collapses: u32,
    pub dimension_collapses: u32,
    pub tick_rate: u32,
    pub auto_save_interval: u32,
}

impl Snapshot {
    pub fn upgrade(&self, kind: UpgradeKind) -> &UpgradeView {
        &self.upgrades[kind.index()]
    }

    pub fn unlock(&self, which: ScaleUnlock) -> Option<&UnlockView> {
        let action = Action::Unlock(which).name();
        self.unlocks.iter().find(|u| u.action == action)
    }
}

/// Build the query view of a state.
pub fn snapshot(state: &EconomyState) -> Snapshot {
    let upgrade_view = |kind: UpgradeKind| {
        let upgrade = state.upgrade(kind);
        let cost = formula::discounted_cost(state, kind);
        UpgradeView {
            action: Action::Buy(kind).name(),
            name: kind.name(),
            level: upgrade.level,
            cost,
            unlocked: upgrade.unlocked,
            affordable: upgrade.unlocked && state.balance(kind.currency()) >= cost,
        }
    };
    let compression_level = state.level(UpgradeKind::Compression);

    Snapshot {
        distance: state.distance,
        distance_per_second: state.distance_per_second,
        distance_rate: formula::distance_rate(state),
        acceleration: formula::acceleration(state.level(UpgradeKind::Acceleration)),
        total_distance_multiplier: formula::total_distance_multiplier(state),
        mass: state.mass,
        mass_per_second: state.mass_per_second,
        mass_rate: formula::mass_rate(state),
        mass_multiplier: formula::mass_multiplier(state),
        mass_unlocked: state.mass_unlocked,
        scale_points: state.scale_points,
        pending_scale_points: formula::unit_collapse_gain(state.distance),
        scale_upgrades_unlocked: state.scale_upgrades_unlocked,
        dimension_points: state.dimension_points,
        dimension_level: state.dimension_level,
        dimension_cost: state.dimension_cost,
        dimensions_tab_unlocked: state.dimensions_tab_unlocked,
        compression_divisor: formula::compression_cost_divisor(compression_level),
        next_compression_divisor: formula::next_compression_divisor(compression_level),
        upgrades: [
            upgrade_view(UpgradeKind::Velocity),
            upgrade_view(UpgradeKind::Acceleration),
            upgrade_view(UpgradeKind::Compression),
            upgrade_view(UpgradeKind::MassVelocity),
        ],
        unlocks: ScaleUnlock::all()
            .iter()
            .map(|which| UnlockView {
                action: Action::Unlock(*which).name(),
                name: which.name(),
                cost: which.cost(),
                paid_with_mass: which.paid_with_mass(),
                owned: logic::is_unlocked(state, *which),
                available: logic::prerequisites_met(state, *which),
                affordable: logic::can_unlock(state, *which),
            })
            .collect(),
        can_prestige: logic::can_unit_collapse(state),
        can_dimension_collapse: logic::can_dimension_collapse(state),
        can_buy_dimension: state.dimension_points >= state.dimension_cost,
        unit_collapses: state.unit_collapses,
        dimension_collapses: state.dimension_collapses,
        tick_rate: state.settings.tick_rate,
        auto_save_interval: state.settings.auto_save_interval,
    }
}

/// Owning context for one game: state, clock and save slot.
pub struct Engine<S: SaveStorage> {
    state: EconomyState,
    time: GameTime,
    storage: S,
    /// Wall-clock ms of the last save attempt, None before the first frame.
    last_save_ms: Option<f64>,
    offline_gain: Option<OfflineGain>,
}

impl<S: SaveStorage> Engine<S> {
    /// A new game that ignores whatever is in `storage` until the next save.
    pub fn new(storage: S) -> Self {
        let state = EconomyState::new();
        let time = GameTime::new(state.settings.tick_rate);
        Self {
            state,
            time,
            storage,
            last_save_ms: None,
            offline_gain: None,
        }
    }

    /// Load the stored game, if any, and credit the time since it was saved.
    /// A save that cannot be read is reported and deleted.
    pub fn start(storage: S, now_ms: f64) -> Self {
        let mut engine = Self::new(storage);
        engine.load(now_ms);
        engine
    }

    fn load(&mut self, now_ms: f64) {
        let loaded = match save::load(&self.storage) {
            Ok(Some(loaded)) => loaded,
            Ok(None) => return,
            Err(e) => {
                diag::warn(&format!("Scale Collapse: discarding unreadable save: {e}"));
                self.storage.clear();
                return;
            }
        };
        if loaded.version < SAVE_VERSION {
            diag::info(&format!(
                "Scale Collapse: migrating save (saved={}, current={SAVE_VERSION})",
                loaded.version
            ));
        }
        self.replace_state(loaded.state);

        if let Some(saved_at) = loaded.last_time {
            let gain = logic::apply_offline_progress(&mut self.state, (now_ms - saved_at) / 1000.0);
            if gain.seconds > 0.0 {
                diag::info(&format!(
                    "Scale Collapse: offline for {:.0}s, gained {} and {}",
                    gain.seconds,
                    units::format_distance(gain.distance),
                    units::format_mass(gain.mass)
                ));
            }
            self.offline_gain = Some(gain);
        }
    }

    fn replace_state(&mut self, state: EconomyState) {
        self.time.set_tick_rate(state.settings.tick_rate);
        self.time.reset();
        self.state = state;
        self.offline_gain = None;
    }

    pub fn state(&self) -> &EconomyState {
        &self.state
    }

    pub fn snapshot(&self) -> Snapshot {
        snapshot(&self.state)
    }

    /// What the last load credited for time spent away.
    pub fn offline_gain(&self) -> Option<&OfflineGain> {
        self.offline_gain.as_ref()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Apply a named action. Every successful action is saved immediately.
    pub fn perform(&mut self, action: Action, now_ms: f64) -> bool {
        if !logic::perform(&mut self.state, action) {
            return false;
        }
        match action {
            Action::UnitCollapse if self.state.unit_collapses == 1 => {
                diag::info("Scale Collapse: first Unit Collapse");
            }
            Action::DimensionCollapse if self.state.dimension_collapses == 1 => {
                diag::info("Scale Collapse: first Dimension Collapse");
            }
            _ => {}
        }
        self.save(now_ms);
        true
    }

    /// Advance the simulation to `now_ms` and run the autosave timer.
    /// Returns the number of steps simulated.
    ///
    /// A step that faults is reported and the rest of this frame's steps are
    /// dropped; the next frame carries on from the last good state.
    pub fn frame(&mut self, now_ms: f64) -> u32 {
        let steps = self.time.update(now_ms);
        let dt = self.time.dt();
        let mut simulated = 0;
        for _ in 0..steps {
            if let Err(fault) = logic::step(&mut self.state, dt) {
                diag::warn(&format!("Scale Collapse: simulation step skipped: {fault}"));
                break;
            }
            simulated += 1;
        }
        self.autosave(now_ms);
        simulated
    }

    fn autosave(&mut self, now_ms: f64) {
        let interval_ms = self.state.settings.auto_save_interval as f64 * 1000.0;
        match self.last_save_ms {
            None => self.last_save_ms = Some(now_ms),
            Some(last) if now_ms - last >= interval_ms => self.save(now_ms),
            Some(_) => {}
        }
    }

    /// Write the current state to storage. Failures are reported, not returned.
    pub fn save(&mut self, now_ms: f64) {
        self.last_save_ms = Some(now_ms);
        if let Err(e) = save::store(&mut self.storage, &self.state, now_ms) {
            diag::warn(&format!("Scale Collapse: save failed: {e}"));
        }
    }

    pub fn set_tick_rate(&mut self, rate: u32, now_ms: f64) {
        self.state.settings.set_tick_rate(rate);
        self.time.set_tick_rate(self.state.settings.tick_rate);
        self.save(now_ms);
    }

    pub fn set_auto_save_interval(&mut self, seconds: u32, now_ms: f64) {
        self.state.settings.set_auto_save_interval(seconds);
        self.save(now_ms);
    }

    /// Save, then hand back the stored blob for the player to keep.
    pub fn export_save(&mut self, now_ms: f64) -> Result<String, StorageError> {
        self.last_save_ms = Some(now_ms);
        save::store(&mut self.storage, &self.state, now_ms)?;
        self.storage
            .read()
            .ok_or_else(|| StorageError("save missing right after writing it".into()))
    }

    /// Replace the game with a pasted save. Nothing changes on error.
    pub fn import_save(&mut self, text: &str, now_ms: f64) -> Result<(), ImportError> {
        let state = save::import_blob(text)?;
        save::store(&mut self.storage, &state, now_ms)?;
        self.last_save_ms = Some(now_ms);
        self.replace_state(state);
        diag::info("Scale Collapse: save imported");
        Ok(())
    }

    /// Wipe the stored save and start over.
    pub fn hard_reset(&mut self) {
        self.storage.clear();
        self.replace_state(EconomyState::new());
        self.last_save_ms = None;
        diag::info("Scale Collapse: hard reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use save::MemoryStorage;

    fn d(v: f64) -> Decimal {
        Decimal::new(v)
    }

    /// Storage whose writes always fail.
    #[derive(Default)]
    struct ReadOnlyStorage {
        blob: Option<String>,
    }

    impl SaveStorage for ReadOnlyStorage {
        fn read(&self) -> Option<String> {
            self.blob.clone()
        }

        fn write(&mut self, _blob: &str) -> Result<(), StorageError> {
            Err(StorageError("quota exceeded".into()))
        }

        fn clear(&mut self) {
            self.blob = None;
        }
    }

    #[test]
    fn start_without_save_is_a_new_game() {
        let engine = Engine::start(MemoryStorage::new(), 0.0);
        assert_eq!(*engine.state(), EconomyState::new());
        assert!(engine.offline_gain().is_none());
    }

    #[test]
    fn frame_advances_at_tick_rate() {
        let mut engine = Engine::new(MemoryStorage::new());
        engine.set_tick_rate(10, 0.0);
        assert_eq!(engine.frame(0.0), 0);
        assert_eq!(engine.frame(1000.0), 10);
        assert!((engine.state().distance.to_f64() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn frame_caps_catch_up_steps() {
        let mut engine = Engine::new(MemoryStorage::new());
        engine.frame(0.0);
        assert_eq!(engine.frame(3_600_000.0), crate::time::MAX_STEPS_PER_FRAME);
    }

    #[test]
    fn frame_survives_a_faulting_step() {
        let mut engine = Engine::new(MemoryStorage::new());
        engine.set_tick_rate(10, 0.0);
        engine.frame(0.0);
        engine.state.distance_per_second = d(f64::INFINITY);
        assert_eq!(engine.frame(500.0), 0);
        assert_eq!(engine.state().distance, Decimal::ZERO);
        // still faulting, but the loop keeps being driven
        assert_eq!(engine.frame(1000.0), 0);
        engine.state.distance_per_second = Decimal::ONE;
        assert_eq!(engine.frame(1100.0), 1);
    }

    #[test]
    fn successful_actions_save_immediately() {
        let mut engine = Engine::new(MemoryStorage::new());
        assert!(!engine.perform(Action::Buy(UpgradeKind::Velocity), 0.0));
        assert!(engine.storage().read().is_none());
        engine.state.distance = d(10.0);
        assert!(engine.perform(Action::Buy(UpgradeKind::Velocity), 0.0));
        let stored = save::load(engine.storage()).unwrap().unwrap();
        assert_eq!(stored.state.level(UpgradeKind::Velocity), 1);
    }

    #[test]
    fn autosave_follows_interval() {
        let mut engine = Engine::new(MemoryStorage::new());
        engine.frame(0.0);
        engine.frame(4_000.0);
        assert!(engine.storage().read().is_none());
        engine.frame(5_000.0);
        assert!(engine.storage().read().is_some());

        engine.set_auto_save_interval(1, 5_000.0);
        engine.storage.clear();
        engine.frame(5_500.0);
        assert!(engine.storage().read().is_none());
        engine.frame(6_000.0);
        assert!(engine.storage().read().is_some());
    }

    #[test]
    fn failed_save_does_not_stop_the_game() {
        let mut engine = Engine::new(ReadOnlyStorage::default());
        engine.state.distance = d(10.0);
        assert!(engine.perform(Action::Buy(UpgradeKind::Velocity), 0.0));
        assert!(engine.export_save(0.0).is_err());
    }

    #[test]
    fn reload_applies_offline_progress() {
        let mut engine = Engine::new(MemoryStorage::new());
        engine.state.upgrade_mut(UpgradeKind::Velocity).level = 1;
        engine.save(1_000.0);
        let storage = engine.storage().clone();

        let restarted = Engine::start(storage, 101_000.0);
        let gain = restarted.offline_gain().unwrap();
        assert_eq!(gain.seconds, 100.0);
        // 1 m/s x 2 x 100 s
        assert_eq!(restarted.state().distance, d(200.0));
    }

    #[test]
    fn reload_with_zero_elapsed_is_identity() {
        let mut engine = Engine::new(MemoryStorage::new());
        engine.state.distance = d(777.0);
        engine.state.scale_points = d(3.0);
        engine.state.settings.set_tick_rate(25);
        engine.save(5_000.0);
        let restarted = Engine::start(engine.storage().clone(), 5_000.0);
        assert_eq!(restarted.state(), engine.state());
        assert_eq!(restarted.time.tick_rate(), 25);
    }

    #[test]
    fn corrupt_save_is_discarded() {
        let engine = Engine::start(MemoryStorage::with_blob("garbage!!"), 0.0);
        assert_eq!(*engine.state(), EconomyState::new());
        assert!(engine.storage().read().is_none());
    }

    #[test]
    fn export_then_import_restores_game() {
        let mut engine = Engine::new(MemoryStorage::new());
        engine.state.distance = d(5e9);
        engine.perform(Action::UnitCollapse, 0.0);
        let blob = engine.export_save(0.0).unwrap();

        let mut other = Engine::new(MemoryStorage::new());
        other.import_save(&blob, 10.0).unwrap();
        assert_eq!(other.state(), engine.state());
        assert!(other.storage().read().is_some());
    }

    #[test]
    fn failed_import_leaves_everything_alone() {
        let mut engine = Engine::new(MemoryStorage::new());
        engine.state.distance = d(42.0);
        engine.save(0.0);
        let before_blob = engine.storage().read();
        let before_state = engine.state().clone();

        assert!(matches!(
            engine.import_save("not a save at all", 1.0),
            Err(ImportError::InvalidEncoding)
        ));
        assert!(matches!(engine.import_save("", 1.0), Err(ImportError::Empty)));
        assert_eq!(engine.storage().read(), before_blob);
        assert_eq!(*engine.state(), before_state);
    }

    #[test]
    fn hard_reset_clears_everything() {
        let mut engine = Engine::new(MemoryStorage::new());
        engine.state.distance = d(5e9);
        engine.perform(Action::UnitCollapse, 0.0);
        engine.hard_reset();
        assert_eq!(*engine.state(), EconomyState::new());
        assert!(engine.storage().read().is_none());
    }

    #[test]
    fn snapshot_reports_affordability() {
        let mut engine = Engine::new(MemoryStorage::new());
        let snap = engine.snapshot();
        assert!(!snap.can_prestige);
        assert!(!snap.upgrade(UpgradeKind::Velocity).affordable);
        assert_eq!(snap.upgrade(UpgradeKind::Velocity).cost, d(10.0));

        engine.state.distance = d(1e10);
        let snap = engine.snapshot();
        assert!(snap.can_prestige);
        assert_eq!(snap.pending_scale_points, d(2.0));
        assert!(snap.upgrade(UpgradeKind::Velocity).affordable);
        assert!(!snap.upgrade(UpgradeKind::Acceleration).affordable);
        assert!(!snap.can_dimension_collapse);

        let mass_gen = snap.unlock(ScaleUnlock::MassGeneration).unwrap();
        assert!(mass_gen.available);
        assert!(!mass_gen.affordable);
        let auto = snap.unlock(ScaleUnlock::AutoUpgrade).unwrap();
        assert!(!auto.available);
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let json = serde_json::to_string(&snapshot(&EconomyState::new())).unwrap();
        assert!(json.contains("\"canPrestige\":false"));
        assert!(json.contains("\"canDimensionCollapse\":false"));
        assert!(json.contains("\"action\":\"buy-velocity\""));
    }
}
