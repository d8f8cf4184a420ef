// bot/mod.rs

// Exported functions
pub use self::console::run_console;

// Exported structs and types
pub use self::config::{ConfigError, Settings, StorageKind};
pub use self::console::{Console, ConsoleHost};
pub use self::dispatcher::{Bot, BotError};
pub use self::host::ChatHost;
pub use self::processor::{
    BotState, Counter, PreviousResponse, Split, Tier, Timer, Timers, User, DEFAULT_CHARM,
};
pub use self::store::{FileStore, MemoryStore, RedisStore, StateStore, StoreError};

// Declare submodules
mod config;
mod console;
mod dispatcher;
mod handler;
mod host;
mod processor;
mod redis;
mod store;
