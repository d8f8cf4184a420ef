/* Replies shared by several handlers. */

pub const INVALID_NICK_MESSAGE: &str = "That is not a valid nick.";
pub const NO_HELP_MESSAGE: &str = "Not a valid command or no help available.";
pub const COMMAND_EXISTS_MESSAGE: &str = "That command already exists.";
pub const NO_ACTIVE_TIMER_MESSAGE: &str = "No timer is active and no timer name given.";
