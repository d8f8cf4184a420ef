// Exported functions
pub use self::connect::test_redis_connection;
pub use self::manager::{load_bot_state, save_bot_state};

// Exported structs and types
pub use self::connect::REDIS_URL_DEFAULT;
pub use self::manager::CrudError;

// Submodules
mod connect;
mod manager;
mod state;
