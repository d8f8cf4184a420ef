use std::env;
use std::path::PathBuf;

use chrono::Duration;
use chrono_tz::Tz;

use super::redis::REDIS_URL_DEFAULT;
use super::store::{FileStore, MemoryStore, RedisStore, StateStore};

/* Settings are read once at startup from the environment.
 * A .env file is honoured through dotenv in main.
 */

const NICK_DEFAULT: &str = "chanbot";
const NETWORK_DEFAULT: &str = "twitch";
const CHANNELS_DEFAULT: &str = "frustbox";
const COMMAND_SYMBOL_DEFAULT: &str = "+";
const STATE_DIR_DEFAULT: &str = ".";
const REPEAT_WINDOW_SECS_DEFAULT: i64 = 30;
const TIME_ZONE_DEFAULT: &str = "UTC";

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum StorageKind {
    File(PathBuf),
    Redis(String),
    Memory,
}

impl StorageKind {
    pub fn open(&self) -> Box<dyn StateStore> {
        match self {
            StorageKind::File(dir) => Box::new(FileStore::new(dir.clone())),
            StorageKind::Redis(url) => Box::new(RedisStore::new(url)),
            StorageKind::Memory => Box::new(MemoryStore::new()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub nick: String,
    pub network: String,
    pub channels: Vec<String>,
    pub command_symbol: String,
    pub storage: StorageKind,
    pub repeat_window: Duration,
    pub time_zone: Tz,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            nick: NICK_DEFAULT.to_string(),
            network: NETWORK_DEFAULT.to_string(),
            channels: vec![CHANNELS_DEFAULT.to_string()],
            command_symbol: COMMAND_SYMBOL_DEFAULT.to_string(),
            storage: StorageKind::File(PathBuf::from(STATE_DIR_DEFAULT)),
            repeat_window: Duration::seconds(REPEAT_WINDOW_SECS_DEFAULT),
            time_zone: Tz::UTC,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Settings, ConfigError> {
        Settings::from_lookup(|name| env::var(name).ok())
    }

    // Builds settings from any variable source, unset variables take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Settings, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str, default: &str| -> String {
            lookup(name)
                .map(|value| value.trim().to_string())
                .unwrap_or_else(|| default.to_string())
        };

        let nick = get("BOT_NICK", NICK_DEFAULT);
        if nick.is_empty() {
            return Err(ConfigError::Empty("BOT_NICK"));
        }

        let network = get("BOT_NETWORK", NETWORK_DEFAULT);

        let channels: Vec<String> = get("BOT_CHANNELS", CHANNELS_DEFAULT)
            .split(',')
            .map(|channel| channel.trim().trim_start_matches('#').to_string())
            .filter(|channel| !channel.is_empty())
            .collect();
        if channels.is_empty() {
            return Err(ConfigError::Empty("BOT_CHANNELS"));
        }

        let command_symbol = get("BOT_COMMAND_SYMBOL", COMMAND_SYMBOL_DEFAULT);
        if command_symbol.is_empty() {
            return Err(ConfigError::Empty("BOT_COMMAND_SYMBOL"));
        }

        let storage = match get("BOT_STORAGE", "file").to_lowercase().as_str() {
            "file" => StorageKind::File(PathBuf::from(get("BOT_STATE_DIR", STATE_DIR_DEFAULT))),
            "redis" => StorageKind::Redis(get("REDIS_URL", REDIS_URL_DEFAULT)),
            "memory" => StorageKind::Memory,
            other => {
                return Err(ConfigError::InvalidValue {
                    name: "BOT_STORAGE",
                    value: other.to_string(),
                })
            }
        };

        let window = get(
            "BOT_REPEAT_WINDOW_SECS",
            &REPEAT_WINDOW_SECS_DEFAULT.to_string(),
        );
        let repeat_window = window
            .parse::<i64>()
            .ok()
            .filter(|secs| *secs >= 0)
            .and_then(Duration::try_seconds);
        let repeat_window = match repeat_window {
            Some(duration) => duration,
            None => {
                return Err(ConfigError::InvalidValue {
                    name: "BOT_REPEAT_WINDOW_SECS",
                    value: window,
                })
            }
        };

        let zone = get("BOT_TIME_ZONE", TIME_ZONE_DEFAULT);
        let time_zone = zone.parse::<Tz>().map_err(|_| ConfigError::InvalidValue {
            name: "BOT_TIME_ZONE",
            value: zone.clone(),
        })?;

        Ok(Settings {
            nick,
            network,
            channels,
            command_symbol,
            storage,
            repeat_window,
            time_zone,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings_from(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(settings_from(&[]).unwrap(), Settings::default());
    }

    #[test]
    fn test_full_settings() {
        let settings = settings_from(&[
            ("BOT_NICK", "timerbot"),
            ("BOT_CHANNELS", "#frustbox, lorgon,,"),
            ("BOT_COMMAND_SYMBOL", "!"),
            ("BOT_STORAGE", "redis"),
            ("REDIS_URL", "redis://cache/"),
            ("BOT_REPEAT_WINDOW_SECS", "0"),
            ("BOT_TIME_ZONE", "Europe/Berlin"),
        ])
        .unwrap();

        assert_eq!(settings.nick, "timerbot");
        assert_eq!(settings.channels, vec!["frustbox", "lorgon"]);
        assert_eq!(settings.command_symbol, "!");
        assert_eq!(
            settings.storage,
            StorageKind::Redis("redis://cache/".to_string())
        );
        assert_eq!(settings.repeat_window, Duration::zero());
        assert_eq!(settings.time_zone, chrono_tz::Europe::Berlin);
    }

    #[test]
    fn test_invalid_settings() {
        assert_eq!(
            settings_from(&[("BOT_STORAGE", "floppy")]),
            Err(ConfigError::InvalidValue {
                name: "BOT_STORAGE",
                value: "floppy".to_string()
            })
        );
        assert!(settings_from(&[("BOT_TIME_ZONE", "Mars/Olympus")]).is_err());
        assert!(settings_from(&[("BOT_REPEAT_WINDOW_SECS", "-3")]).is_err());
        assert_eq!(
            settings_from(&[("BOT_REPEAT_WINDOW_SECS", "99999999999999999")]),
            Err(ConfigError::InvalidValue {
                name: "BOT_REPEAT_WINDOW_SECS",
                value: "99999999999999999".to_string()
            })
        );
        assert_eq!(
            settings_from(&[("BOT_CHANNELS", " , ")]),
            Err(ConfigError::Empty("BOT_CHANNELS"))
        );
    }
}
