use crate::bot::{
    dispatcher::{CommandSet, CommandSpec, HandlerResult},
    processor::Tier,
};

use super::Context;

/* Twitch specific commands.
 * The streamer owning the channel is handled by the permission rules, not here.
 */

pub fn command_set() -> CommandSet {
    CommandSet::new(
        "twitch",
        vec![CommandSpec::simple(
            "chatters",
            Tier::Everyone,
            "Return the number of viewers in chat.",
            action_chatters,
        )],
    )
}

fn action_chatters(ctx: &mut Context<'_>, _args: &str) -> HandlerResult {
    let count = ctx.nicklist_len();
    ctx.say(&format!("There are {count} chatters."));
    Ok(())
}
