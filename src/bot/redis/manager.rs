use redis::RedisError;

use super::{
    connect::connect,
    state::{get_state, get_state_exists, set_state},
};
use crate::bot::processor::BotState;

#[derive(thiserror::Error, Debug)]
pub enum CrudError {
    #[error("Redis operation error: {0}")]
    RedisError(RedisError),
    #[error("Stored state is malformed: {0}")]
    SerdeError(serde_json::Error),
}

// Implement the From trait to convert from RedisError to CrudError
impl From<RedisError> for CrudError {
    fn from(redis_error: RedisError) -> CrudError {
        CrudError::RedisError(redis_error)
    }
}

// Implement the From trait to convert from serde_json::Error to CrudError
impl From<serde_json::Error> for CrudError {
    fn from(serde_error: serde_json::Error) -> CrudError {
        CrudError::SerdeError(serde_error)
    }
}

/* Redis Manager
 * Manager exposes whole-state operations on top of the key level CRUD functions.
 * No other module should call the CRUD functions directly.
 */

/* Saves the complete state of a bot.
 */
pub fn save_bot_state(url: &str, bot_name: &str, state: &BotState) -> Result<(), CrudError> {
    let mut con = connect(url)?;

    let blob = serde_json::to_string(state)?;
    set_state(&mut con, bot_name, &blob)?;
    Ok(())
}

/* Loads the state of a bot.
 * Returns None if the bot has never been saved.
 */
pub fn load_bot_state(url: &str, bot_name: &str) -> Result<Option<BotState>, CrudError> {
    let mut con = connect(url)?;

    if !get_state_exists(&mut con, bot_name)? {
        return Ok(None);
    }

    match get_state(&mut con, bot_name)? {
        Some(blob) => Ok(Some(serde_json::from_str(&blob)?)),
        None => Ok(None),
    }
}
