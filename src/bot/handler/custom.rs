use crate::bot::{
    dispatcher::{BotError, CommandSet, CommandSpec, HandlerResult},
    processor::{BotState, Tier},
};

use super::{constants::COMMAND_EXISTS_MESSAGE, utils::partition, Context};

/* Custom replies: named commands that answer with a fixed text.
 * Their names share the command namespace and are matched after all builtins.
 */

pub fn command_set() -> CommandSet {
    let mut set = CommandSet::new(
        "custom",
        vec![
            CommandSpec::simple(
                "set",
                Tier::Op,
                "Define a custom reply message. Ops only. Syntax: {symbol}set <name> <reply>",
                action_set,
            ),
            CommandSpec::simple(
                "unset",
                Tier::Op,
                "Remove a custom reply message. Ops only. Syntax: {symbol}unset <name>",
                action_unset,
            ),
        ],
    );
    set.fallback = Some(reply_fallback);
    set.dynamic_names = Some(reply_names);
    set
}

fn reply_names(state: &BotState) -> Vec<String> {
    state.custom_replies.keys().cloned().collect()
}

fn reply_fallback(ctx: &mut Context<'_>, command: &str) -> Result<bool, BotError> {
    let Some(reply) = ctx.state.custom_replies.get(command).cloned() else {
        return Ok(false);
    };
    ctx.say(&reply);
    Ok(true)
}

fn action_set(ctx: &mut Context<'_>, args: &str) -> HandlerResult {
    let (name, text) = partition(args);
    if name.is_empty() || text.is_empty() {
        ctx.usage("{symbol}set <name> <text>");
        return Ok(());
    }

    // Existing custom replies may be overwritten, other commands may not
    if !ctx.state.custom_replies.contains_key(name) && ctx.registry.is_known(name, ctx.state) {
        ctx.say(COMMAND_EXISTS_MESSAGE);
        return Ok(());
    }

    ctx.state
        .custom_replies
        .insert(name.to_string(), text.to_string());
    ctx.mark_changed();
    log::info!(
        "Custom - User {} set reply {} in {}",
        ctx.sender.nick,
        name,
        ctx.channel
    );
    ctx.say(&format!("Command \"{name}\" has been set to \"{text}\"."));
    Ok(())
}

fn action_unset(ctx: &mut Context<'_>, args: &str) -> HandlerResult {
    let (name, rest) = partition(args);
    if name.is_empty() || !rest.is_empty() {
        ctx.usage("{symbol}unset <name>");
        return Ok(());
    }

    if ctx.state.custom_replies.remove(name).is_none() {
        ctx.say(&format!(
            "Command \"{name}\" does not exist or is not a custom command."
        ));
        return Ok(());
    }

    ctx.mark_changed();
    log::info!(
        "Custom - User {} removed reply {} in {}",
        ctx.sender.nick,
        name,
        ctx.channel
    );
    ctx.say(&format!("Command \"{name}\" has been removed."));
    Ok(())
}
