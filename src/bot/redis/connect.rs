use redis::{Client, Commands, Connection, RedisResult};

pub const REDIS_URL_DEFAULT: &str = "redis://127.0.0.1/";

pub fn connect(url: &str) -> RedisResult<Connection> {
    let client = Client::open(url)?;
    client.get_connection()
}

// Tests connection to Redis
pub fn test_redis_connection(url: &str) -> RedisResult<bool> {
    let mut con = connect(url)?;
    let _: () = con.set("chanbot_ping", 42)?;
    let res: i32 = con.get("chanbot_ping")?;
    let _: () = con.del("chanbot_ping")?;

    Ok(res == 42)
}
