//! Scale Collapse のセーブ/ロード、エクスポート/インポート。
//!
//! ## 保存形式
//!
//! 中身はフラットな camelCase の JSON オブジェクト 1 つ。巨大な数値は文字列で、
//! レベル・フラグ・設定はそのままの値で持つ。
//!
//! - v2 (現行): JSON を標準 base64 で包んだもの。
//! - v1 (旧形式): 素の JSON。`version` フィールド自体が存在しない。
//!
//! `decode_blob` は先頭が `{` なら旧形式として読む。どちらの形式でも、
//! 欠けているフィールドは新規ゲームの値で埋まる。
//!
//! 数値が壊れているセーブ (負・非有限・コスト 0) は丸ごと拒否し、
//! 設定値だけは範囲内に丸めて受け入れる。

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::decimal::Decimal;
use crate::error::{ImportError, LoadError, StorageError};

use super::logic;
use super::state::{EconomyState, Settings, Upgrade, UpgradeKind, DEFAULT_TICK_RATE};

/// localStorage のキー。
pub const STORAGE_KEY: &str = "scaleSave";

pub const SAVE_VERSION: u32 = 2;

pub const MIN_COMPATIBLE_VERSION: u32 = 1;

/// 保存対象の全フィールド。フィールド名は保存キーと一致させる。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SaveData {
    pub version: u32,

    pub distance: Decimal,
    pub distance_per_second: Decimal,
    pub scale_points: Decimal,
    pub scale_upgrades_unlocked: bool,

    // 速度アップグレード
    pub upgrade_level: u32,
    pub upgrade_cost: Decimal,
    pub accel_level: u32,
    pub accel_cost: Decimal,
    pub accel_unlocked: bool,
    pub compression_level: u32,
    pub compression_cost: Decimal,
    pub compression_unlocked: bool,

    pub mass: Decimal,
    pub mass_per_second: Decimal,
    pub mass_unlocked: bool,
    pub mass_velocity_level: u32,
    pub mass_velocity_cost: Decimal,

    pub mass_generation_unlocked: bool,
    pub auto_upgrade_unlocked: bool,
    pub triple_mass_unlocked: bool,
    pub persistent_mass_upgrades: bool,
    pub dimension_collapse_unlocked: bool,
    pub dimensions_tab_unlocked: bool,
    pub enhanced_dimensions_unlocked: bool,

    pub dimension_points: Decimal,
    pub dimension_level: u32,
    pub dimension_cost: Decimal,

    pub unit_collapses: u32,
    pub dimension_collapses: u32,

    #[serde(deserialize_with = "lenient_tick_rate")]
    pub tick_rate: u32,
    pub auto_save_interval: u32,

    /// 保存時刻 (epoch ミリ秒)。オフライン進行の計算に使う。
    pub last_time: Option<f64>,
}

impl Default for SaveData {
    /// 新規ゲーム。`version` が無いセーブは旧形式 (v1) 扱いになる。
    fn default() -> Self {
        let mut save = extract_save(&EconomyState::new(), None);
        save.version = 1;
        save
    }
}

/// 古いセーブは tick rate を文字列や 0 で持っていることがある。
/// 正の数として読めなければデフォルト値にする。
fn lenient_tick_rate<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    let rate = match &value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(match rate {
        Some(rate) if rate.is_finite() && rate > 0.0 => rate as u32,
        _ => DEFAULT_TICK_RATE,
    })
}

/// 状態から保存データを作る。
pub fn extract_save(state: &EconomyState, now_ms: Option<f64>) -> SaveData {
    let velocity = state.upgrade(UpgradeKind::Velocity);
    let accel = state.upgrade(UpgradeKind::Acceleration);
    let compression = state.upgrade(UpgradeKind::Compression);
    let mass_velocity = state.upgrade(UpgradeKind::MassVelocity);
    SaveData {
        version: SAVE_VERSION,
        distance: state.distance,
        distance_per_second: state.distance_per_second,
        scale_points: state.scale_points,
        scale_upgrades_unlocked: state.scale_upgrades_unlocked,
        upgrade_level: velocity.level,
        upgrade_cost: velocity.cost,
        accel_level: accel.level,
        accel_cost: accel.cost,
        accel_unlocked: accel.unlocked,
        compression_level: compression.level,
        compression_cost: compression.cost,
        compression_unlocked: compression.unlocked,
        mass: state.mass,
        mass_per_second: state.mass_per_second,
        mass_unlocked: state.mass_unlocked,
        mass_velocity_level: mass_velocity.level,
        mass_velocity_cost: mass_velocity.cost,
        mass_generation_unlocked: state.mass_generation_unlocked,
        auto_upgrade_unlocked: state.auto_upgrade_unlocked,
        triple_mass_unlocked: state.triple_mass_unlocked,
        persistent_mass_upgrades: state.persistent_mass_upgrades,
        dimension_collapse_unlocked: state.dimension_collapse_unlocked,
        dimensions_tab_unlocked: state.dimensions_tab_unlocked,
        enhanced_dimensions_unlocked: state.enhanced_dimensions_unlocked,
        dimension_points: state.dimension_points,
        dimension_level: state.dimension_level,
        dimension_cost: state.dimension_cost,
        unit_collapses: state.unit_collapses,
        dimension_collapses: state.dimension_collapses,
        tick_rate: state.settings.tick_rate,
        auto_save_interval: state.settings.auto_save_interval,
        last_time: now_ms,
    }
}

fn checked(field: &'static str, value: Decimal) -> Result<Decimal, LoadError> {
    if value.is_finite() && !value.is_negative() {
        Ok(value)
    } else {
        Err(LoadError::InvalidValue { field })
    }
}

fn checked_cost(field: &'static str, value: Decimal) -> Result<Decimal, LoadError> {
    let value = checked(field, value)?;
    if value.is_zero() {
        Err(LoadError::InvalidValue { field })
    } else {
        Ok(value)
    }
}

fn restore_upgrade(
    kind: UpgradeKind,
    level: u32,
    cost: Decimal,
    unlocked: bool,
    field: &'static str,
) -> Result<Upgrade, LoadError> {
    Ok(Upgrade {
        kind,
        level,
        cost: checked_cost(field, cost)?,
        unlocked: unlocked || kind == UpgradeKind::Velocity,
    })
}

/// 保存データから状態を丸ごと組み立てる。
/// 設定は範囲内に丸め、負・非有限の値やコスト 0 はエラーにする。
pub fn apply_save(save: &SaveData) -> Result<EconomyState, LoadError> {
    if save.version < MIN_COMPATIBLE_VERSION {
        return Err(LoadError::Incompatible {
            version: save.version,
            min: MIN_COMPATIBLE_VERSION,
        });
    }

    let mut settings = Settings::new();
    settings.set_tick_rate(save.tick_rate);
    settings.set_auto_save_interval(save.auto_save_interval);

    let mut state = EconomyState {
        distance: checked("distance", save.distance)?,
        distance_per_second: checked("distancePerSecond", save.distance_per_second)?,
        scale_points: checked("scalePoints", save.scale_points)?,
        mass: checked("mass", save.mass)?,
        mass_per_second: checked("massPerSecond", save.mass_per_second)?,
        mass_unlocked: save.mass_unlocked,
        dimension_points: checked("dimensionPoints", save.dimension_points)?,
        dimension_level: save.dimension_level,
        dimension_cost: checked_cost("dimensionCost", save.dimension_cost)?,
        upgrades: [
            restore_upgrade(
                UpgradeKind::Velocity,
                save.upgrade_level,
                save.upgrade_cost,
                true,
                "upgradeCost",
            )?,
            restore_upgrade(
                UpgradeKind::Acceleration,
                save.accel_level,
                save.accel_cost,
                save.accel_unlocked,
                "accelCost",
            )?,
            restore_upgrade(
                UpgradeKind::Compression,
                save.compression_level,
                save.compression_cost,
                save.compression_unlocked,
                "compressionCost",
            )?,
            restore_upgrade(
                UpgradeKind::MassVelocity,
                save.mass_velocity_level,
                save.mass_velocity_cost,
                save.mass_unlocked,
                "massVelocityCost",
            )?,
        ],
        scale_upgrades_unlocked: save.scale_upgrades_unlocked,
        mass_generation_unlocked: save.mass_generation_unlocked,
        auto_upgrade_unlocked: save.auto_upgrade_unlocked,
        triple_mass_unlocked: save.triple_mass_unlocked,
        persistent_mass_upgrades: save.persistent_mass_upgrades,
        dimension_collapse_unlocked: save.dimension_collapse_unlocked,
        dimensions_tab_unlocked: save.dimensions_tab_unlocked,
        enhanced_dimensions_unlocked: save.enhanced_dimensions_unlocked,
        unit_collapses: save.unit_collapses,
        dimension_collapses: save.dimension_collapses,
        settings,
    };
    logic::refresh_unlocks(&mut state);
    Ok(state)
}

/// 現行形式 (base64 JSON) に書き出す。
pub fn encode_blob(save: &SaveData) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(save)?;
    Ok(STANDARD.encode(json))
}

/// 現行形式・旧形式どちらの保存文字列も読む。
pub fn decode_blob(blob: &str) -> Result<SaveData, LoadError> {
    let blob = blob.trim();
    if blob.starts_with('{') {
        return Ok(serde_json::from_str(blob)?);
    }
    let bytes = STANDARD.decode(blob)?;
    let json = String::from_utf8(bytes)?;
    Ok(serde_json::from_str(&json)?)
}

/// 貼り付けられたテキストを読む。素の JSON を先に試し、だめなら base64 JSON。
/// 保存時刻は使わない (インポートにオフライン進行は付かない)。
pub fn import_blob(text: &str) -> Result<EconomyState, ImportError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ImportError::Empty);
    }
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) => {
            let bytes = STANDARD
                .decode(text)
                .map_err(|_| ImportError::InvalidEncoding)?;
            let json = String::from_utf8(bytes).map_err(|_| ImportError::InvalidEncoding)?;
            serde_json::from_str(&json).map_err(|_| ImportError::InvalidEncoding)?
        }
    };
    let save: SaveData =
        serde_json::from_value(value).map_err(|e| ImportError::InvalidStructure(e.to_string()))?;
    apply_save(&save).map_err(|e| ImportError::InvalidStructure(e.to_string()))
}

/// ストレージから読み戻したセーブ。
#[derive(Debug)]
pub struct LoadedSave {
    pub state: EconomyState,
    pub version: u32,
    pub last_time: Option<f64>,
}

/// セーブ文字列 1 つの置き場所。
pub trait SaveStorage {
    fn read(&self) -> Option<String>;
    fn write(&mut self, blob: &str) -> Result<(), StorageError>;
    fn clear(&mut self);
}

/// 現行形式でストレージに書き込む。
pub fn store<S: SaveStorage>(
    storage: &mut S,
    state: &EconomyState,
    now_ms: f64,
) -> Result<(), StorageError> {
    let blob = encode_blob(&extract_save(state, Some(now_ms)))
        .map_err(|e| StorageError(e.to_string()))?;
    storage.write(&blob)
}

/// 保存済みのセーブを読む。`Ok(None)` はセーブ無し。
pub fn load<S: SaveStorage>(storage: &S) -> Result<Option<LoadedSave>, LoadError> {
    let blob = match storage.read() {
        Some(blob) => blob,
        None => return Ok(None),
    };
    let save = decode_blob(&blob)?;
    let state = apply_save(&save)?;
    Ok(Some(LoadedSave {
        state,
        version: save.version,
        last_time: save.last_time,
    }))
}

/// ネイティブ実行とテスト用のメモリ内ストレージ。
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    blob: Option<String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Some(blob.into()),
        }
    }
}

impl SaveStorage for MemoryStorage {
    fn read(&self) -> Option<String> {
        self.blob.clone()
    }

    fn write(&mut self, blob: &str) -> Result<(), StorageError> {
        self.blob = Some(blob.to_string());
        Ok(())
    }

    fn clear(&mut self) {
        self.blob = None;
    }
}

/// ブラウザの localStorage ([`STORAGE_KEY`])。
#[cfg(target_arch = "wasm32")]
#[derive(Clone, Debug, Default)]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

#[cfg(target_arch = "wasm32")]
impl SaveStorage for LocalStorage {
    fn read(&self) -> Option<String> {
        Self::storage()?.get_item(STORAGE_KEY).ok()?
    }

    fn write(&mut self, blob: &str) -> Result<(), StorageError> {
        let storage =
            Self::storage().ok_or_else(|| StorageError("localStorage unavailable".into()))?;
        storage
            .set_item(STORAGE_KEY, blob)
            .map_err(|e| StorageError(format!("{e:?}")))
    }

    fn clear(&mut self) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(STORAGE_KEY);
        }
    }
}
