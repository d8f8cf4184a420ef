use redis::{Commands, Connection, RedisResult};

/* Bot State CRUD Operations
 * A bot's state is a single serialized blob, stored under one key per bot name.
 * Has set, exists, get, and delete operations.
 */

const BOT_STATE_KEY: &str = "bot_state";

// Stores the state blob of a bot, replacing any previous one
pub fn set_state(con: &mut Connection, bot_name: &str, blob: &str) -> RedisResult<()> {
    con.set(format!("{BOT_STATE_KEY}:{bot_name}"), blob)
}

// Checks if a bot has stored state
pub fn get_state_exists(con: &mut Connection, bot_name: &str) -> RedisResult<bool> {
    con.exists(format!("{BOT_STATE_KEY}:{bot_name}"))
}

// Gets the state blob of a bot, if any
pub fn get_state(con: &mut Connection, bot_name: &str) -> RedisResult<Option<String>> {
    con.get(format!("{BOT_STATE_KEY}:{bot_name}"))
}

// Deletes the state of a bot
#[cfg(test)]
pub fn delete_state(con: &mut Connection, bot_name: &str) -> RedisResult<()> {
    con.del(format!("{BOT_STATE_KEY}:{bot_name}"))
}

#[cfg(test)]
mod tests {
    use super::{delete_state, get_state, get_state_exists, set_state};
    use crate::bot::redis::connect::{connect, REDIS_URL_DEFAULT};

    #[test]
    #[ignore = "requires a running redis server"]
    fn test_set_get_state() {
        let mut con = connect(REDIS_URL_DEFAULT).unwrap();

        let bot_name = "state_test_twitch_frustbox";
        set_state(&mut con, bot_name, "{\"muted\":true}").unwrap();
        assert!(get_state_exists(&mut con, bot_name).unwrap());
        assert_eq!(
            get_state(&mut con, bot_name).unwrap(),
            Some("{\"muted\":true}".to_string())
        );

        delete_state(&mut con, bot_name).unwrap();
    }

    #[test]
    #[ignore = "requires a running redis server"]
    fn test_get_missing_state() {
        let mut con = connect(REDIS_URL_DEFAULT).unwrap();

        let bot_name = "state_test_missing";
        assert!(!get_state_exists(&mut con, bot_name).unwrap());
        assert_eq!(get_state(&mut con, bot_name).unwrap(), None);
    }

    #[test]
    #[ignore = "requires a running redis server"]
    fn test_delete_state() {
        let mut con = connect(REDIS_URL_DEFAULT).unwrap();

        let bot_name = "state_test_delete";
        set_state(&mut con, bot_name, "{}").unwrap();
        delete_state(&mut con, bot_name).unwrap();
        assert!(!get_state_exists(&mut con, bot_name).unwrap());
    }
}
