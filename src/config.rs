/// External configuration loader.
///
/// Reads `lodechase.toml` from the executable's directory (or CWD).
/// Falls back to defaults if the file is missing, incomplete or invalid.

use serde::Deserialize;
use std::ops::RangeInclusive;
use std::path::PathBuf;

use crate::error::ConfigError;

const CONFIG_FILE: &str = "lodechase.toml";

// ── Public Config Struct ──

#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    pub speed: SpeedConfig,
    pub gold: GoldConfig,
    /// Fixed RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
    pub levels_dir: PathBuf,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
    pub hole_open_ticks: u32,  // phase 1: fully open, guards can fall in
    pub hole_close_ticks: u32, // phase 2: brick growing back
}

#[derive(Clone, Debug, PartialEq)]
pub struct GoldConfig {
    /// Cell crossings a guard carries gold before dropping it, inclusive.
    pub hold_min: i32,
    pub hold_max: i32,
}

impl GoldConfig {
    pub fn holds(&self) -> RangeInclusive<i32> {
        self.hold_min..=self.hold_max
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    gold: TomlGold,
    #[serde(default)]
    sim: TomlSim,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_hole_open")]
    hole_open_ticks: u32,
    #[serde(default = "default_hole_close")]
    hole_close_ticks: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGold {
    #[serde(default = "default_hold_min")]
    hold_min: i32,
    #[serde(default = "default_hold_max")]
    hold_max: i32,
}

#[derive(Deserialize, Debug, Default)]
struct TomlSim {
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 43 }  // ~23 ticks/s
fn default_hole_open() -> u32 { 179 }  // includes the 12-tick dig
fn default_hole_close() -> u32 { 23 }
fn default_hold_min() -> i32 { 11 }
fn default_hold_max() -> i32 { 36 }
fn default_levels_dir() -> String { "levels".into() }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            tick_rate_ms: default_tick_rate(),
            hole_open_ticks: default_hole_open(),
            hole_close_ticks: default_hole_close(),
        }
    }
}

impl Default for TomlGold {
    fn default() -> Self {
        TomlGold { hold_min: default_hold_min(), hold_max: default_hold_max() }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { levels_dir: default_levels_dir() }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig::from_toml(TomlConfig::default(), &[])
    }
}

// ── Loading ──

impl SimConfig {
    /// Load config from `lodechase.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// A missing file, a parse error or invalid values fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let cfg = SimConfig::from_toml(load_toml(&search_dirs), &search_dirs);
        match cfg.validate() {
            Ok(()) => cfg,
            Err(e) => {
                log::warn!("{e}; using default settings");
                SimConfig::default()
            }
        }
    }

    /// Parse a config from TOML text. Relative paths are kept as given.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let toml_cfg: TomlConfig = toml::from_str(text)?;
        let cfg = SimConfig::from_toml(toml_cfg, &[]);
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gold.hold_min > self.gold.hold_max {
            return Err(ConfigError::GoldHoldRange { min: self.gold.hold_min, max: self.gold.hold_max });
        }
        if self.speed.tick_rate_ms == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        Ok(())
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let levels_dir_str = &toml_cfg.general.levels_dir;
        let levels_dir = if PathBuf::from(levels_dir_str).is_absolute() {
            PathBuf::from(levels_dir_str)
        } else {
            search_dirs
                .iter()
                .map(|d| d.join(levels_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(levels_dir_str))
        };

        SimConfig {
            speed: SpeedConfig {
                tick_rate_ms: toml_cfg.speed.tick_rate_ms,
                hole_open_ticks: toml_cfg.speed.hole_open_ticks,
                hole_close_ticks: toml_cfg.speed.hole_close_ticks,
            },
            gold: GoldConfig { hold_min: toml_cfg.gold.hold_min, hold_max: toml_cfg.gold.hold_max },
            seed: toml_cfg.sim.seed,
            levels_dir,
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                Ok(cfg) => {
                    log::info!("loaded {}", path.display());
                    return cfg;
                }
                Err(e) => {
                    log::warn!("{CONFIG_FILE} parse error: {e}; using default settings");
                    return TomlConfig::default();
                }
            },
            Err(e) => log::warn!("could not read {}: {e}", path.display()),
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_gives_defaults() {
        let cfg = SimConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, SimConfig::default());
        assert_eq!(cfg.speed.tick_rate_ms, 43);
        assert_eq!(cfg.gold.holds(), 11..=36);
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.levels_dir, PathBuf::from("levels"));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = SimConfig::from_toml_str("[speed]\nhole_close_ticks = 8\n[sim]\nseed = 42\n").unwrap();
        assert_eq!(cfg.speed.hole_close_ticks, 8);
        assert_eq!(cfg.speed.hole_open_ticks, 179);
        assert_eq!(cfg.seed, Some(42));
    }

    #[test]
    fn inverted_hold_range_is_rejected() {
        let err = SimConfig::from_toml_str("[gold]\nhold_min = 40\nhold_max = 10\n").unwrap_err();
        assert!(matches!(err, ConfigError::GoldHoldRange { min: 40, max: 10 }));
    }

    #[test]
    fn zero_tick_rate_is_rejected() {
        let err = SimConfig::from_toml_str("[speed]\ntick_rate_ms = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ZeroTickRate));
    }

    #[test]
    fn malformed_text_is_a_parse_error() {
        let err = SimConfig::from_toml_str("[speed\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
