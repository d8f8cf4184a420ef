/* Processor holds the bot's domain logic.
 * Handlers parse chat input and craft replies, processor types own the rules:
 * who may do what, how timers measure time, and what the bot remembers.
 */

// Exported functions
pub use self::permissions::is_valid_nick;
pub use self::timer::format_duration;

// Exported structs and types
pub use self::permissions::{PermissionLists, Roster, Tier, User};
pub use self::state::{BotState, Counter, PreviousResponse, DEFAULT_CHARM};
pub use self::timer::{Split, Timer, TimerError, Timers};

// Submodules
mod permissions;
mod state;
mod timer;
