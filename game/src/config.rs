use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::board::{BOARD_HEIGHT, BOARD_WIDTH, check_dimensions};
use crate::catalog::{ColorMode, PieceCatalog, PieceKind};
use crate::error::ConfigError;

pub const DROP_INTERVAL_MS_DEFAULT: u64 = 1_000;
pub const COUNTDOWN_SECS_DEFAULT: u32 = 3;
pub const GAME_OVER_DELAY_MS_DEFAULT: u64 = 2_000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    #[serde(default = "default_drop_interval_ms")]
    pub drop_interval_ms: u64,
    /// 0 starts the game immediately.
    #[serde(default = "default_countdown_secs")]
    pub countdown_secs: u32,
    #[serde(default = "default_game_over_delay_ms")]
    pub game_over_delay_ms: u64,
    /// Keep a lookahead piece for the host's preview.
    #[serde(default = "default_true")]
    pub preview_next: bool,
    #[serde(default)]
    pub color_mode: ColorMode,
    #[serde(default = "default_pieces")]
    pub pieces: Vec<PieceKind>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            drop_interval_ms: default_drop_interval_ms(),
            countdown_secs: default_countdown_secs(),
            game_over_delay_ms: default_game_over_delay_ms(),
            preview_next: true,
            color_mode: ColorMode::default(),
            pieces: default_pieces(),
        }
    }
}

impl EngineConfig {
    /// The minimal variant: no countdown, no preview, random colours.
    pub fn classic() -> Self {
        Self {
            countdown_secs: 0,
            preview_next: false,
            ..Self::default()
        }
    }

    pub fn drop_interval(&self) -> Duration {
        Duration::from_millis(self.drop_interval_ms)
    }

    pub fn game_over_delay(&self) -> Duration {
        Duration::from_millis(self.game_over_delay_ms)
    }

    pub fn catalog(&self) -> Result<PieceCatalog, ConfigError> {
        PieceCatalog::new(self.pieces.clone(), self.color_mode)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_dimensions(self.width, self.height)?;
        if self.drop_interval_ms == 0 {
            return Err(ConfigError::ZeroDropInterval);
        }
        let shape_size = self.catalog()?.max_shape_size();
        if self.width < shape_size || self.height < shape_size {
            return Err(ConfigError::BoardTooSmall {
                width: self.width,
                height: self.height,
                shape_size,
            });
        }
        Ok(())
    }
}

fn default_width() -> usize {
    BOARD_WIDTH
}

fn default_height() -> usize {
    BOARD_HEIGHT
}

fn default_drop_interval_ms() -> u64 {
    DROP_INTERVAL_MS_DEFAULT
}

fn default_countdown_secs() -> u32 {
    COUNTDOWN_SECS_DEFAULT
}

fn default_game_over_delay_ms() -> u64 {
    GAME_OVER_DELAY_MS_DEFAULT
}

fn default_true() -> bool {
    true
}

fn default_pieces() -> Vec<PieceKind> {
    PieceKind::ALL.to_vec()
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Self {
        Self::resolve(|key| std::env::var_os(key))
    }

    /// `TETRIS_CONFIG_PATH` wins outright; otherwise `tetris/config.json`
    /// under `XDG_CONFIG_HOME`, then `$HOME/.config`, then the working dir.
    fn resolve<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        if let Some(explicit) = var("TETRIS_CONFIG_PATH") {
            return Self::new(explicit);
        }

        let mut path = var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| var("HOME").map(|home| PathBuf::from(home).join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        path.push("tetris");
        path.push("config.json");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Defaults when the file does not exist; a file that exists but cannot
    /// be read, parsed or validated is an error.
    pub fn load(&self) -> Result<EngineConfig, ConfigError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("no config at {}, using defaults", self.path.display());
                return Ok(EngineConfig::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let config: EngineConfig =
            serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
                path: self.path.clone(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`ConfigStore::load`], but logs and falls back to the defaults.
    pub fn load_or_default(&self) -> EngineConfig {
        self.load().unwrap_or_else(|err| {
            log::warn!("{err}; falling back to default config");
            EngineConfig::default()
        })
    }

    pub fn save(&self, config: &EngineConfig) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(config)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, text)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    fn unique_path(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!(
            "tetris_config_{tag}_{}_{nanos}.json",
            std::process::id()
        ))
    }

    fn resolve_with(vars: &[(&str, &str)]) -> PathBuf {
        let vars: HashMap<String, OsString> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), OsString::from(v)))
            .collect();
        ConfigStore::resolve(|key| vars.get(key).cloned())
            .path()
            .to_path_buf()
    }

    #[test]
    fn config_path_resolution_order() {
        let all = [
            ("TETRIS_CONFIG_PATH", "/etc/custom.json"),
            ("XDG_CONFIG_HOME", "/xdg"),
            ("HOME", "/home/ada"),
        ];
        assert_eq!(resolve_with(&all), PathBuf::from("/etc/custom.json"));
        assert_eq!(
            resolve_with(&all[1..]),
            PathBuf::from("/xdg/tetris/config.json")
        );
        assert_eq!(
            resolve_with(&all[2..]),
            PathBuf::from("/home/ada/.config/tetris/config.json")
        );
        assert_eq!(resolve_with(&[]), PathBuf::from("./tetris/config.json"));
    }

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.drop_interval(), Duration::from_millis(1000));
        assert_eq!(config.game_over_delay(), Duration::from_secs(2));
        assert!(EngineConfig::classic().validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_configs() {
        let zero = EngineConfig {
            width: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            zero.validate(),
            Err(ConfigError::InvalidDimensions { .. })
        ));

        let huge = EngineConfig {
            width: usize::MAX / 2,
            ..EngineConfig::default()
        };
        assert!(matches!(
            huge.validate(),
            Err(ConfigError::InvalidDimensions { .. })
        ));
        let tall = EngineConfig {
            height: crate::board::MAX_BOARD_DIMENSION + 1,
            ..EngineConfig::default()
        };
        assert!(tall.validate().is_err());

        let narrow = EngineConfig {
            width: 3,
            ..EngineConfig::default()
        };
        assert!(matches!(
            narrow.validate(),
            Err(ConfigError::BoardTooSmall { shape_size: 4, .. })
        ));

        // Without the I piece a 3-wide board is fine.
        let narrow_no_i = EngineConfig {
            width: 3,
            pieces: vec![PieceKind::T, PieceKind::O],
            ..EngineConfig::default()
        };
        assert!(narrow_no_i.validate().is_ok());

        let stalled = EngineConfig {
            drop_interval_ms: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(stalled.validate(), Err(ConfigError::ZeroDropInterval)));

        let empty = EngineConfig {
            pieces: Vec::new(),
            ..EngineConfig::default()
        };
        assert!(matches!(empty.validate(), Err(ConfigError::EmptyCatalog)));
    }

    #[test]
    fn serde_defaults_fill_missing_fields() {
        let parsed: EngineConfig =
            serde_json::from_str(r#"{"width":12,"color_mode":"palette"}"#).expect("parse");
        assert_eq!(parsed.width, 12);
        assert_eq!(parsed.height, BOARD_HEIGHT);
        assert_eq!(parsed.color_mode, ColorMode::Palette);
        assert_eq!(parsed.pieces, PieceKind::ALL.to_vec());
        assert!(parsed.preview_next);
    }

    #[test]
    fn negative_dimensions_do_not_parse() {
        assert!(serde_json::from_str::<EngineConfig>(r#"{"width":-10}"#).is_err());
    }

    #[test]
    fn store_round_trips_and_defaults_when_missing() {
        let path = unique_path("roundtrip");
        let store = ConfigStore::new(&path);
        assert_eq!(store.load().expect("missing file"), EngineConfig::default());

        let config = EngineConfig {
            countdown_secs: 0,
            drop_interval_ms: 250,
            ..EngineConfig::default()
        };
        store.save(&config).expect("save");
        assert_eq!(store.load().expect("load"), config);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn store_reports_parse_and_validation_errors() {
        let path = unique_path("broken");
        let store = ConfigStore::new(&path);

        fs::write(&path, "{ nope").expect("write");
        assert!(matches!(store.load(), Err(ConfigError::Parse { .. })));
        assert_eq!(store.load_or_default(), EngineConfig::default());

        fs::write(&path, r#"{"height":0}"#).expect("write");
        assert!(matches!(
            store.load(),
            Err(ConfigError::InvalidDimensions { .. })
        ));

        let _ = fs::remove_file(&path);
    }
}
