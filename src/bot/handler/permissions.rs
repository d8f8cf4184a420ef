use crate::bot::{
    dispatcher::{CommandSet, CommandSpec, HandlerResult},
    processor::{is_valid_nick, Tier},
};

use super::{
    constants::INVALID_NICK_MESSAGE,
    utils::{join_or_none, partition},
    Context,
};

/* Commands that manage the permission lists.
 * Owners appoint ops, ops appoint regulars and manage the blacklist.
 */

pub fn command_set() -> CommandSet {
    CommandSet::new(
        "permissions",
        vec![
            CommandSpec::simple(
                "ops",
                Tier::Everyone,
                "Return a list of nicks that can use op commands.",
                action_ops,
            ),
            CommandSpec::simple(
                "op",
                Tier::Owner,
                "Add nick to list of ops. Owner only. Syntax: {symbol}op <nick>",
                action_op,
            ),
            CommandSpec::simple(
                "deop",
                Tier::Owner,
                "Remove nick from list of ops. Owner only. Syntax: {symbol}deop <nick>",
                action_deop,
            ),
            CommandSpec::simple("amiop", Tier::Everyone, "Tells you if you are an op.", action_amiop),
            CommandSpec::simple(
                "regulars",
                Tier::Regular,
                "Print a list of regulars. Regulars only.",
                action_regulars,
            ),
            CommandSpec::simple(
                "regular",
                Tier::Op,
                "Add nick to list of regulars. Ops only. Syntax: {symbol}regular <nick>",
                action_regular,
            ),
            CommandSpec::simple(
                "deregular",
                Tier::Op,
                "Remove nick from list of regulars. Ops only. Syntax: {symbol}deregular <nick>",
                action_deregular,
            ),
            CommandSpec::simple(
                "amiregular",
                Tier::Everyone,
                "Tells you if you are a regular.",
                action_amiregular,
            ),
            CommandSpec::simple(
                "ignore",
                Tier::Op,
                "Add a nick to the blacklist, preventing that person from interacting with the bot. Ops only. Syntax: {symbol}ignore <nick>",
                action_ignore,
            ),
            CommandSpec::simple(
                "unignore",
                Tier::Op,
                "Remove a nick from the blacklist, allowing that person to interact with the bot. Ops only. Syntax: {symbol}unignore <nick>",
                action_unignore,
            ),
        ],
    )
}

/* Utilities */

// Reads the single nick argument, replying if it is not a valid nick.
fn nick_argument<'b>(ctx: &mut Context<'_>, args: &'b str) -> Option<&'b str> {
    let (nick, _) = partition(args);
    if is_valid_nick(nick) {
        Some(nick)
    } else {
        ctx.say(INVALID_NICK_MESSAGE);
        None
    }
}

fn action_ops(ctx: &mut Context<'_>, _args: &str) -> HandlerResult {
    let ops = join_or_none(ctx.op_nicks());
    ctx.say(&format!("Ops: {ops}"));
    Ok(())
}

fn action_op(ctx: &mut Context<'_>, args: &str) -> HandlerResult {
    let Some(nick) = nick_argument(ctx, args) else {
        return Ok(());
    };

    if !ctx.state.permissions.ops.insert(nick.to_string()) {
        ctx.say(&format!("{nick} is already op."));
        return Ok(());
    }

    ctx.mark_changed();
    log::info!("Op - User {} made {} op in {}", ctx.sender.nick, nick, ctx.channel);
    ctx.say(&format!("Ok, {nick} is now op."));
    Ok(())
}

fn action_deop(ctx: &mut Context<'_>, args: &str) -> HandlerResult {
    let Some(nick) = nick_argument(ctx, args) else {
        return Ok(());
    };

    if !ctx.state.permissions.ops.remove(nick) {
        ctx.say(&format!("{nick} is not op."));
        return Ok(());
    }

    ctx.mark_changed();
    log::info!("Deop - User {} removed op {} in {}", ctx.sender.nick, nick, ctx.channel);
    ctx.say(&format!("Ok, {nick} is no longer op."));
    Ok(())
}

fn action_amiop(ctx: &mut Context<'_>, _args: &str) -> HandlerResult {
    let nick = ctx.sender.nick.clone();
    if ctx.can_use(&Tier::Op) {
        ctx.say(&format!("{nick}, you are an op."));
    } else {
        ctx.say(&format!("Sorry, {nick}, you are not."));
    }
    Ok(())
}

fn action_regulars(ctx: &mut Context<'_>, _args: &str) -> HandlerResult {
    let regulars = join_or_none(&ctx.state.permissions.regulars);
    ctx.say(&format!("Regulars: {regulars}"));
    Ok(())
}

fn action_regular(ctx: &mut Context<'_>, args: &str) -> HandlerResult {
    let Some(nick) = nick_argument(ctx, args) else {
        return Ok(());
    };

    if !ctx.state.permissions.regulars.insert(nick.to_string()) {
        ctx.say(&format!("{nick} is already a regular."));
        return Ok(());
    }

    ctx.mark_changed();
    log::info!(
        "Regular - User {} made {} a regular in {}",
        ctx.sender.nick,
        nick,
        ctx.channel
    );
    ctx.say(&format!("OK, {nick} is a regular."));
    Ok(())
}

fn action_deregular(ctx: &mut Context<'_>, args: &str) -> HandlerResult {
    let Some(nick) = nick_argument(ctx, args) else {
        return Ok(());
    };

    if !ctx.state.permissions.regulars.remove(nick) {
        ctx.say(&format!("{nick} is not a regular."));
        return Ok(());
    }

    ctx.mark_changed();
    log::info!(
        "Deregular - User {} removed regular {} in {}",
        ctx.sender.nick,
        nick,
        ctx.channel
    );
    ctx.say(&format!("OK, {nick} is no longer a regular."));
    Ok(())
}

fn action_amiregular(ctx: &mut Context<'_>, _args: &str) -> HandlerResult {
    let nick = ctx.sender.nick.clone();
    if ctx.can_use(&Tier::Regular) {
        ctx.say(&format!("{nick}, you are a regular."));
    } else {
        ctx.say(&format!("Sorry, {nick}, you are not a regular."));
    }
    Ok(())
}

/* Ignore command.
 * Anyone with a tier of their own is protected from the blacklist.
 */
fn action_ignore(ctx: &mut Context<'_>, args: &str) -> HandlerResult {
    let Some(nick) = nick_argument(ctx, args) else {
        return Ok(());
    };

    if ctx.nick_can_use(nick, &Tier::Owner) {
        ctx.say(&format!("I would never do that. {nick} is my master."));
        return Ok(());
    }
    if ctx.nick_can_use(nick, &Tier::Op) {
        ctx.say(&format!("{nick} is an op."));
        return Ok(());
    }
    if ctx.nick_can_use(nick, &Tier::Regular) {
        ctx.say(&format!("{nick} is a regular."));
        return Ok(());
    }

    if !ctx.state.permissions.blacklist.insert(nick.to_string()) {
        ctx.say(&format!("{nick} is already blacklisted."));
        return Ok(());
    }

    ctx.mark_changed();
    log::info!("Ignore - User {} blacklisted {} in {}", ctx.sender.nick, nick, ctx.channel);
    ctx.say(&format!("Ok, I'll ignore {nick}."));
    Ok(())
}

fn action_unignore(ctx: &mut Context<'_>, args: &str) -> HandlerResult {
    let Some(nick) = nick_argument(ctx, args) else {
        return Ok(());
    };

    if !ctx.state.permissions.blacklist.remove(nick) {
        ctx.say(&format!("{nick} is not blacklisted."));
        return Ok(());
    }

    ctx.mark_changed();
    log::info!(
        "Unignore - User {} removed {} from the blacklist in {}",
        ctx.sender.nick,
        nick,
        ctx.channel
    );
    ctx.say(&format!("Ok, I'll no longer ignore {nick}."));
    Ok(())
}
