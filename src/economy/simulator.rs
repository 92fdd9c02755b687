//! Playtest simulator: drives the engine the way the autoplay bot does and
//! checks that early progression stays within reach.
//! Run with: cargo test simulate_ -- --nocapture

use crate::decimal::Decimal;

use super::actions::{Action, ScaleUnlock};
use super::save::MemoryStorage;
use super::state::UpgradeKind;
use super::{Engine, Snapshot};

/// The bot's single move for this frame. It always commits to the first
/// matching goal, even when that purchase is not affordable yet.
fn bot_action(snap: &Snapshot) -> Option<Action> {
    let velocity = snap.upgrade(UpgradeKind::Velocity);
    let accel = snap.upgrade(UpgradeKind::Acceleration);
    let compression = snap.upgrade(UpgradeKind::Compression);

    if velocity.level < 5 {
        return Some(Action::Buy(UpgradeKind::Velocity));
    }
    if accel.unlocked && accel.level < 5 {
        return Some(Action::Buy(UpgradeKind::Acceleration));
    }
    if compression.unlocked && compression.level < 3 {
        return Some(Action::Buy(UpgradeKind::Compression));
    }
    if snap.can_prestige {
        return Some(Action::UnitCollapse);
    }
    if snap.scale_points >= Decimal::ONE && !snap.mass_unlocked {
        return Some(Action::Unlock(ScaleUnlock::MassGeneration));
    }
    if snap.mass_unlocked && snap.mass >= Decimal::new(100.0) {
        return Some(Action::Buy(UpgradeKind::MassVelocity));
    }
    if snap.can_dimension_collapse {
        return Some(Action::DimensionCollapse);
    }
    None
}

#[derive(Debug, Default)]
struct Milestones {
    velocity_5: Option<f64>,
    acceleration_5: Option<f64>,
    compression_3: Option<f64>,
    first_unit_collapse: Option<f64>,
}

/// Play for up to `max_seconds` of game time at `tick_rate`, one bot move per
/// frame, stopping at the first Unit Collapse.
fn simulate(tick_rate: u32, max_seconds: f64) -> Milestones {
    let mut engine = Engine::new(MemoryStorage::new());
    engine.set_tick_rate(tick_rate, 0.0);
    let frame_ms = 1000.0 / tick_rate as f64;
    let frames = (max_seconds * tick_rate as f64) as u64;
    let mut milestones = Milestones::default();

    engine.frame(0.0);
    for i in 1..=frames {
        let now = i as f64 * frame_ms;
        engine.frame(now);

        let snap = engine.snapshot();
        assert!(!snap.distance.is_negative() && snap.distance.is_finite());

        let Some(action) = bot_action(&snap) else {
            continue;
        };
        if !engine.perform(action, now) {
            continue;
        }
        let seconds = now / 1000.0;
        let snap = engine.snapshot();
        if milestones.velocity_5.is_none() && snap.upgrade(UpgradeKind::Velocity).level >= 5 {
            milestones.velocity_5 = Some(seconds);
        }
        if milestones.acceleration_5.is_none()
            && snap.upgrade(UpgradeKind::Acceleration).level >= 5
        {
            milestones.acceleration_5 = Some(seconds);
        }
        if milestones.compression_3.is_none() && snap.upgrade(UpgradeKind::Compression).level >= 3
        {
            milestones.compression_3 = Some(seconds);
        }
        if action == Action::UnitCollapse {
            milestones.first_unit_collapse = Some(seconds);
            assert_eq!(snap.scale_points, Decimal::ONE);
            break;
        }
    }
    milestones
}

#[test]
fn simulate_first_unit_collapse_within_three_hours() {
    let m = simulate(10, 3.0 * 3600.0);
    println!("{m:#?}");

    let velocity_5 = m.velocity_5.expect("velocity 5 reached");
    let acceleration_5 = m.acceleration_5.expect("acceleration 5 reached");
    let compression_3 = m.compression_3.expect("compression 3 reached");
    let collapse = m.first_unit_collapse.expect("first Unit Collapse reached");

    assert!(velocity_5 < acceleration_5);
    assert!(acceleration_5 < compression_3);
    assert!(compression_3 < collapse);
    // velocity 5 costs 10 + 25 + 62.5 + 156.25 + 390.625 meters
    assert!(velocity_5 < 120.0, "velocity 5 took {velocity_5}s");
}
