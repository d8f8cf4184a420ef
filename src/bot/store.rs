use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use super::processor::BotState;
use super::redis::{load_bot_state, save_bot_state, test_redis_connection, CrudError};

/* Store persists bot state between restarts.
 * A bot saves its whole state after each mutating command and loads it once on startup.
 * Each backend keeps one blob per bot name.
 */

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("File error: {0}")]
    IoError(std::io::Error),
    #[error("Serialization error: {0}")]
    SerdeError(serde_json::Error),
    #[error("Redis error: {0}")]
    CrudError(CrudError),
}

impl From<std::io::Error> for StoreError {
    fn from(io_error: std::io::Error) -> StoreError {
        StoreError::IoError(io_error)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(serde_error: serde_json::Error) -> StoreError {
        StoreError::SerdeError(serde_error)
    }
}

impl From<CrudError> for StoreError {
    fn from(crud_error: CrudError) -> StoreError {
        StoreError::CrudError(crud_error)
    }
}

pub trait StateStore: Send {
    fn load(&mut self, bot_name: &str) -> Result<Option<BotState>, StoreError>;
    fn save(&mut self, bot_name: &str, state: &BotState) -> Result<(), StoreError>;
}

/* One JSON file per bot inside a directory. */
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> FileStore {
        FileStore { dir: dir.into() }
    }

    fn path(&self, bot_name: &str) -> PathBuf {
        self.dir.join(format!("{bot_name}.json"))
    }
}

impl StateStore for FileStore {
    fn load(&mut self, bot_name: &str) -> Result<Option<BotState>, StoreError> {
        let blob = match fs::read_to_string(self.path(bot_name)) {
            Ok(blob) => blob,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&blob)?))
    }

    fn save(&mut self, bot_name: &str, state: &BotState) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;

        // The rename replaces the previous file atomically
        let path = self.path(bot_name);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(state)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

pub struct RedisStore {
    url: String,
}

impl RedisStore {
    // Connection failures are only logged here, every load and save reconnects.
    pub fn new(url: &str) -> RedisStore {
        match test_redis_connection(url) {
            Ok(true) => log::info!("Connected to redis at {}", url),
            Ok(false) => log::warn!("Redis at {} answered unexpectedly", url),
            Err(err) => log::warn!("Redis at {} is not reachable: {}", url, err),
        }
        RedisStore {
            url: url.to_string(),
        }
    }
}

impl StateStore for RedisStore {
    fn load(&mut self, bot_name: &str) -> Result<Option<BotState>, StoreError> {
        Ok(load_bot_state(&self.url, bot_name)?)
    }

    fn save(&mut self, bot_name: &str, state: &BotState) -> Result<(), StoreError> {
        Ok(save_bot_state(&self.url, bot_name, state)?)
    }
}

/* Keeps state for the lifetime of the process only. */
#[derive(Default)]
pub struct MemoryStore {
    states: HashMap<String, BotState>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

impl StateStore for MemoryStore {
    fn load(&mut self, bot_name: &str) -> Result<Option<BotState>, StoreError> {
        Ok(self.states.get(bot_name).cloned())
    }

    fn save(&mut self, bot_name: &str, state: &BotState) -> Result<(), StoreError> {
        self.states.insert(bot_name.to_string(), state.clone());
        Ok(())
    }
}
