use super::dispatcher::CommandSet;

// Exported functions
pub use self::utils::partition;

// Exported structs and types
pub use self::context::Context;

/* All builtin command sets, in registration order.
 * Fallbacks run in this order too: custom replies before counters.
 */
pub fn command_sets() -> Vec<CommandSet> {
    vec![
        general::command_set(),
        permissions::command_set(),
        twitch::command_set(),
        fun::command_set(),
        timer::command_set(),
        custom::command_set(),
        counter::command_set(),
    ]
}

// Submodules
mod constants;
mod context;
mod counter;
mod custom;
mod fun;
mod general;
mod permissions;
mod timer;
mod twitch;
mod utils;
