//! TOML-based engine configuration.
//!
//! Holds every tunable of the engine:
//! - Mining session length, reward rate and tick period
//! - Boost cap, ad extension and coin packages
//! - Cooldown windows per repeatable action
//! - Hashrate, reward tables and conversion terms
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{ConfigError, CoreError, ValidationError};
use crate::timer::CooldownKind;

/// Longest duration any setting may hold: one year.
pub const MAX_DURATION_SECS: u64 = 365 * 24 * 60 * 60;

/// Mining session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiningConfig {
    #[serde(default = "default_base_duration_secs")]
    pub base_duration_secs: u64,
    /// Coins earned by one full base-length session.
    #[serde(default = "default_coins_per_session")]
    pub coins_per_session: f64,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

/// A coin-priced time boost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostPackage {
    pub cost: u64,
    pub extension_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoostConfig {
    #[serde(default = "default_boost_cap_secs")]
    pub cap_secs: u64,
    #[serde(default = "default_ad_extension_secs")]
    pub ad_extension_secs: u64,
    #[serde(default = "default_packages")]
    pub packages: Vec<BoostPackage>,
}

/// Cooldown windows, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CooldownConfig {
    #[serde(default = "default_mystery_box_secs")]
    pub mystery_box_secs: u64,
    #[serde(default = "default_ad_cooldown_secs")]
    pub time_boost_ad_secs: u64,
    #[serde(default = "default_ad_cooldown_secs")]
    pub hashrate_ad_secs: u64,
    #[serde(default = "default_daily_bonus_secs")]
    pub daily_bonus_secs: u64,
    #[serde(default = "default_flip_reset_secs")]
    pub flip_reset_secs: u64,
}

/// Displayed mining speed in Gh/s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashrateConfig {
    #[serde(default = "default_hashrate_initial")]
    pub initial: u32,
    #[serde(default = "default_hashrate_max")]
    pub max: u32,
    #[serde(default = "default_hashrate_step")]
    pub step: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardsConfig {
    #[serde(default = "default_reward_min")]
    pub mystery_box_min: u64,
    #[serde(default = "default_reward_max")]
    pub mystery_box_max: u64,
    #[serde(default = "default_reward_min")]
    pub flip_min: u64,
    #[serde(default = "default_reward_max")]
    pub flip_max: u64,
    #[serde(default = "default_flip_cards")]
    pub flip_cards: usize,
    /// Daily bonus table, one entry per streak day.
    #[serde(default = "default_daily")]
    pub daily: Vec<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Converted units per coin.
    #[serde(default = "default_conversion_rate")]
    pub rate: f64,
    #[serde(default = "default_minimum_coins")]
    pub minimum_coins: u64,
}

/// Engine configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub mining: MiningConfig,
    #[serde(default)]
    pub boost: BoostConfig,
    #[serde(default)]
    pub cooldowns: CooldownConfig,
    #[serde(default)]
    pub hashrate: HashrateConfig,
    #[serde(default)]
    pub rewards: RewardsConfig,
    #[serde(default)]
    pub conversion: ConversionConfig,
}

// Default functions
fn default_base_duration_secs() -> u64 {
    3 * 60
}
fn default_coins_per_session() -> f64 {
    1.0
}
fn default_tick_ms() -> u64 {
    1000
}
fn default_boost_cap_secs() -> u64 {
    2 * 60 * 60
}
fn default_ad_extension_secs() -> u64 {
    30 * 60
}
fn default_packages() -> Vec<BoostPackage> {
    vec![
        BoostPackage {
            cost: 250,
            extension_secs: 60 * 60,
        },
        BoostPackage {
            cost: 400,
            extension_secs: 2 * 60 * 60,
        },
    ]
}
fn default_mystery_box_secs() -> u64 {
    3 * 60 * 60
}
fn default_ad_cooldown_secs() -> u64 {
    2 * 60 * 60
}
fn default_daily_bonus_secs() -> u64 {
    24 * 60 * 60
}
fn default_flip_reset_secs() -> u64 {
    30 * 60
}
fn default_hashrate_initial() -> u32 {
    30
}
fn default_hashrate_max() -> u32 {
    100
}
fn default_hashrate_step() -> u32 {
    10
}
fn default_reward_min() -> u64 {
    10
}
fn default_reward_max() -> u64 {
    200
}
fn default_flip_cards() -> usize {
    4
}
fn default_daily() -> Vec<u64> {
    vec![100, 200, 300, 400, 500, 600, 700]
}
fn default_conversion_rate() -> f64 {
    0.00006
}
fn default_minimum_coins() -> u64 {
    2500
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            base_duration_secs: default_base_duration_secs(),
            coins_per_session: default_coins_per_session(),
            tick_ms: default_tick_ms(),
        }
    }
}

impl Default for BoostConfig {
    fn default() -> Self {
        Self {
            cap_secs: default_boost_cap_secs(),
            ad_extension_secs: default_ad_extension_secs(),
            packages: default_packages(),
        }
    }
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            mystery_box_secs: default_mystery_box_secs(),
            time_boost_ad_secs: default_ad_cooldown_secs(),
            hashrate_ad_secs: default_ad_cooldown_secs(),
            daily_bonus_secs: default_daily_bonus_secs(),
            flip_reset_secs: default_flip_reset_secs(),
        }
    }
}

impl Default for HashrateConfig {
    fn default() -> Self {
        Self {
            initial: default_hashrate_initial(),
            max: default_hashrate_max(),
            step: default_hashrate_step(),
        }
    }
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            mystery_box_min: default_reward_min(),
            mystery_box_max: default_reward_max(),
            flip_min: default_reward_min(),
            flip_max: default_reward_max(),
            flip_cards: default_flip_cards(),
            daily: default_daily(),
        }
    }
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            rate: default_conversion_rate(),
            minimum_coins: default_minimum_coins(),
        }
    }
}

impl MiningConfig {
    pub fn base_duration_ms(&self) -> u64 {
        self.base_duration_secs.saturating_mul(1000)
    }

    /// Coins accrued per second of mining.
    pub fn rate_per_second(&self) -> f64 {
        if self.base_duration_secs == 0 {
            return 0.0;
        }
        self.coins_per_session / self.base_duration_secs as f64
    }
}

impl BoostConfig {
    pub fn cap_ms(&self) -> u64 {
        self.cap_secs.saturating_mul(1000)
    }

    pub fn ad_extension_ms(&self) -> u64 {
        self.ad_extension_secs.saturating_mul(1000)
    }
}

impl CooldownConfig {
    pub fn window_ms(&self, kind: CooldownKind) -> u64 {
        let secs = match kind {
            CooldownKind::MysteryBox => self.mystery_box_secs,
            CooldownKind::TimeBoostAd => self.time_boost_ad_secs,
            CooldownKind::HashrateAd => self.hashrate_ad_secs,
            CooldownKind::DailyBonus => self.daily_bonus_secs,
            CooldownKind::FlipReset => self.flip_reset_secs,
        };
        secs.saturating_mul(1000)
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, CoreError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// fails validation, or if the default config cannot be written.
    pub fn load() -> Result<Self, CoreError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults there if it is missing.
    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to the data directory.
    pub fn save(&self) -> Result<(), CoreError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), CoreError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key. The change is validated but not
    /// saved; call [`Config::save`] afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting config is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<(), ValidationError> {
        fn invalid(field: &str, message: &str) -> ValidationError {
            ValidationError::InvalidValue {
                field: field.to_string(),
                message: message.to_string(),
            }
        }

        if self.mining.base_duration_secs == 0 {
            return Err(invalid("mining.base_duration_secs", "must be positive"));
        }
        let durations = [
            ("mining.base_duration_secs", self.mining.base_duration_secs),
            ("boost.cap_secs", self.boost.cap_secs),
            ("boost.ad_extension_secs", self.boost.ad_extension_secs),
            ("cooldowns.mystery_box_secs", self.cooldowns.mystery_box_secs),
            ("cooldowns.time_boost_ad_secs", self.cooldowns.time_boost_ad_secs),
            ("cooldowns.hashrate_ad_secs", self.cooldowns.hashrate_ad_secs),
            ("cooldowns.daily_bonus_secs", self.cooldowns.daily_bonus_secs),
            ("cooldowns.flip_reset_secs", self.cooldowns.flip_reset_secs),
        ];
        if let Some((field, _)) = durations.iter().find(|(_, secs)| *secs > MAX_DURATION_SECS) {
            return Err(invalid(field, "must not exceed one year"));
        }
        if self
            .boost
            .packages
            .iter()
            .any(|p| p.extension_secs > MAX_DURATION_SECS)
        {
            return Err(invalid("boost.packages", "extensions must not exceed one year"));
        }
        if !(self.mining.coins_per_session.is_finite() && self.mining.coins_per_session >= 0.0) {
            return Err(invalid("mining.coins_per_session", "must be a non-negative number"));
        }
        if self.mining.tick_ms == 0 || self.mining.tick_ms > MAX_DURATION_SECS.saturating_mul(1000) {
            return Err(invalid("mining.tick_ms", "must be positive and at most one year"));
        }
        if self.boost.cap_secs < self.mining.base_duration_secs {
            return Err(invalid(
                "boost.cap_secs",
                "must not be shorter than mining.base_duration_secs",
            ));
        }
        if self.boost.ad_extension_secs == 0
            || self.boost.packages.iter().any(|p| p.extension_secs == 0)
        {
            return Err(invalid("boost", "extensions must be positive"));
        }
        if self.hashrate.initial > self.hashrate.max {
            return Err(invalid("hashrate.initial", "must not exceed hashrate.max"));
        }
        if self.rewards.mystery_box_min > self.rewards.mystery_box_max {
            return Err(invalid("rewards.mystery_box_min", "must not exceed mystery_box_max"));
        }
        if self.rewards.flip_min > self.rewards.flip_max {
            return Err(invalid("rewards.flip_min", "must not exceed flip_max"));
        }
        if self.rewards.flip_cards == 0 {
            return Err(invalid("rewards.flip_cards", "must be positive"));
        }
        if self.rewards.daily.len() != 7 {
            return Err(invalid("rewards.daily", "must list exactly 7 days"));
        }
        if !(self.conversion.rate.is_finite() && self.conversion.rate >= 0.0) {
            return Err(invalid("conversion.rate", "must be a non-negative number"));
        }
        Ok(())
    }
}
