//! Scale Collapse: an incremental game about going faster, then folding the
//! distance you covered into bigger units of measure.
//!
//! The library holds the whole economy engine and is target-independent.
//! The `scale-collapse` binary hosts it in the browser.

pub mod decimal;
pub mod diag;
pub mod economy;
pub mod error;
pub mod time;

pub use decimal::Decimal;
pub use economy::actions::{Action, ScaleUnlock};
pub use economy::save::{MemoryStorage, SaveStorage};
pub use economy::state::{EconomyState, UpgradeKind};
pub use economy::{Engine, Snapshot};

#[cfg(target_arch = "wasm32")]
pub use economy::save::LocalStorage;
