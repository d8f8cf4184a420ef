use crate::bot::{
    dispatcher::{Action, BotError, CommandKind, CommandSet, CommandSpec, DefaultAction, HandlerResult},
    processor::{BotState, Counter, Tier},
};

use super::{utils::partition, Context};

/* Counters: commands that count how often they have been called.
 * Calling a counter by name increments it and replies with its template.
 */

const COUNTER_HELP: &str = "Performs counter related actions. Syntax: {symbol}counter <action> <name>; where possible actions are: list, new, del, set, add, reply. See {symbol}help counter <action>";

pub fn command_set() -> CommandSet {
    let actions = vec![
        Action {
            name: "list",
            tier: Tier::Everyone,
            help: "Show a list of counters. Syntax: {symbol}counter list",
            handler: counter_list,
        },
        Action {
            name: "new",
            tier: Tier::Op,
            help: "Create a new counter. Ops only. Syntax: {symbol}counter new <name> [reply]",
            handler: counter_new,
        },
        Action {
            name: "del",
            tier: Tier::Op,
            help: "Remove a counter. Ops only. Syntax: {symbol}counter del <name>",
            handler: counter_del,
        },
        Action {
            name: "set",
            tier: Tier::Op,
            help: "Set a counter to a value. Ops only. Syntax: {symbol}counter set <name> <integer>",
            handler: counter_set,
        },
        Action {
            name: "add",
            tier: Tier::Op,
            help: "Add a value to the counter. Ops only. Syntax: {symbol}counter add <name> <integer>",
            handler: counter_add,
        },
        Action {
            name: "reply",
            tier: Tier::Op,
            help: "Change the reply of a counter without changing the value. Ops only. Syntax: {symbol}counter reply <name> <text>",
            handler: counter_reply,
        },
    ];

    let mut set = CommandSet::new(
        "counter",
        vec![CommandSpec {
            name: "counter",
            tier: Tier::Everyone,
            help: COUNTER_HELP,
            kind: CommandKind::Actions {
                actions,
                default: DefaultAction::Usage("{symbol}counter <action>"),
            },
        }],
    );
    set.fallback = Some(increment_fallback);
    set.dynamic_names = Some(counter_names);
    set
}

fn counter_names(state: &BotState) -> Vec<String> {
    state.counters.keys().cloned().collect()
}

fn increment_fallback(ctx: &mut Context<'_>, command: &str) -> Result<bool, BotError> {
    let Some(counter) = ctx.state.counters.get_mut(command) else {
        return Ok(false);
    };
    counter.add(1);
    let reply = counter.render();

    ctx.mark_changed();
    ctx.say(&reply);
    Ok(true)
}

// Parses "<name> <integer>", replying with the usage template on failure.
fn name_and_value<'t>(ctx: &mut Context<'_>, args: &'t str, usage: &str) -> Option<(&'t str, i64)> {
    let (name, rest) = partition(args);
    let (value, _) = partition(rest);
    match value.parse::<i64>() {
        Ok(value) if !name.is_empty() => Some((name, value)),
        _ => {
            ctx.usage(usage);
            None
        }
    }
}

fn counter_list(ctx: &mut Context<'_>, _args: &str) -> HandlerResult {
    let names = counter_names(ctx.state).join(", ");
    ctx.say(&format!("I know these counters: {names}"));
    Ok(())
}

fn counter_new(ctx: &mut Context<'_>, args: &str) -> HandlerResult {
    let (name, reply) = partition(args);
    if name.is_empty() {
        ctx.usage("{symbol}counter new <name> [reply]");
        return Ok(());
    }

    if ctx.registry.is_known(name, ctx.state) {
        ctx.say("This command already exists.");
        return Ok(());
    }

    let reply = if reply.is_empty() { None } else { Some(reply) };
    ctx.state
        .counters
        .insert(name.to_string(), Counter::new(name, reply));
    ctx.mark_changed();
    log::info!(
        "Counter - User {} created counter {} in {}",
        ctx.sender.nick,
        name,
        ctx.channel
    );
    ctx.say(&format!("Counter \"{name}\" has been created."));
    Ok(())
}

fn counter_del(ctx: &mut Context<'_>, args: &str) -> HandlerResult {
    let (name, _) = partition(args);
    if name.is_empty() {
        ctx.usage("{symbol}counter del <name>");
        return Ok(());
    }

    if ctx.state.counters.remove(name).is_none() {
        ctx.say(&format!("Counter \"{name}\" does not exist."));
        return Ok(());
    }

    ctx.mark_changed();
    log::info!(
        "Counter - User {} removed counter {} in {}",
        ctx.sender.nick,
        name,
        ctx.channel
    );
    ctx.say(&format!("Counter \"{name}\" has been removed."));
    Ok(())
}

fn counter_set(ctx: &mut Context<'_>, args: &str) -> HandlerResult {
    let Some((name, value)) = name_and_value(ctx, args, "{symbol}counter set <name> <integer>")
    else {
        return Ok(());
    };

    let Some(counter) = ctx.state.counters.get_mut(name) else {
        ctx.say(&format!("Counter \"{name}\" does not exist."));
        return Ok(());
    };
    let value = counter.set(value);

    ctx.mark_changed();
    ctx.say(&format!("Counter \"{name}\" is now: {value}"));
    Ok(())
}

fn counter_add(ctx: &mut Context<'_>, args: &str) -> HandlerResult {
    let Some((name, amount)) = name_and_value(ctx, args, "{symbol}counter add <name> <integer>")
    else {
        return Ok(());
    };

    let Some(counter) = ctx.state.counters.get_mut(name) else {
        ctx.say(&format!("Counter \"{name}\" does not exist."));
        return Ok(());
    };
    let value = counter.add(amount);

    ctx.mark_changed();
    ctx.say(&format!("Counter \"{name}\" is now: {value}"));
    Ok(())
}

fn counter_reply(ctx: &mut Context<'_>, args: &str) -> HandlerResult {
    let (name, reply) = partition(args);
    if name.is_empty() || reply.is_empty() {
        ctx.usage("{symbol}counter reply <name> <text>");
        return Ok(());
    }

    let Some(counter) = ctx.state.counters.get_mut(name) else {
        ctx.say(&format!("Counter \"{name}\" does not exist."));
        return Ok(());
    };
    counter.reply = reply.to_string();

    ctx.mark_changed();
    ctx.say(&format!("Counter \"{name}\" has been updated."));
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::bot::{
        config::Settings, dispatcher::Bot, host::testing::TestHost, store::MemoryStore,
    };

    fn test_bot() -> Bot {
        let settings = Settings {
            repeat_window: chrono::Duration::zero(),
            ..Settings::default()
        };
        Bot::new("frustbox", settings, Box::new(MemoryStore::new())).unwrap()
    }

    #[test]
    fn test_counter_increments_on_call() {
        let mut bot = test_bot();
        let mut host = TestHost::new();

        bot.handle_line(&mut host, "@lorgon", "+counter new deaths").unwrap();
        assert_eq!(host.last(), Some("Counter \"deaths\" has been created."));

        assert!(bot.handle_line(&mut host, "viewer", "+deaths").unwrap());
        assert_eq!(host.last(), Some("Counter deaths: 1"));
        assert!(bot.handle_line(&mut host, "viewer", "+deaths").unwrap());
        assert_eq!(host.last(), Some("Counter deaths: 2"));
        assert_eq!(bot.state().counters["deaths"].value, 2);
    }

    #[test]
    fn test_counter_custom_reply() {
        let mut bot = test_bot();
        let mut host = TestHost::new();

        bot.handle_line(&mut host, "@lorgon", "+counter new deaths Died {} times")
            .unwrap();
        bot.handle_line(&mut host, "viewer", "+deaths").unwrap();
        assert_eq!(host.last(), Some("Died 1 times"));

        bot.handle_line(&mut host, "@lorgon", "+counter reply deaths RIP x{}")
            .unwrap();
        assert_eq!(host.last(), Some("Counter \"deaths\" has been updated."));
        bot.handle_line(&mut host, "viewer", "+deaths").unwrap();
        assert_eq!(host.last(), Some("RIP x2"));
    }

    #[test]
    fn test_counter_set_and_add_floor_at_zero() {
        let mut bot = test_bot();
        let mut host = TestHost::new();
        bot.handle_line(&mut host, "@lorgon", "+counter new deaths").unwrap();

        bot.handle_line(&mut host, "@lorgon", "+counter set deaths 10").unwrap();
        assert_eq!(host.last(), Some("Counter \"deaths\" is now: 10"));
        bot.handle_line(&mut host, "@lorgon", "+counter add deaths -3").unwrap();
        assert_eq!(host.last(), Some("Counter \"deaths\" is now: 7"));
        bot.handle_line(&mut host, "@lorgon", "+counter add deaths -30").unwrap();
        assert_eq!(host.last(), Some("Counter \"deaths\" is now: 0"));
        bot.handle_line(&mut host, "@lorgon", "+counter set deaths -5").unwrap();
        assert_eq!(host.last(), Some("Counter \"deaths\" is now: 0"));

        bot.handle_line(&mut host, "@lorgon", "+counter set deaths many").unwrap();
        assert_eq!(
            host.last(),
            Some("Invalid syntax: +counter set <name> <integer>")
        );
        bot.handle_line(&mut host, "@lorgon", "+counter add ghosts 1").unwrap();
        assert_eq!(host.last(), Some("Counter \"ghosts\" does not exist."));
    }

    #[test]
    fn test_counter_new_rejects_known_names() {
        let mut bot = test_bot();
        let mut host = TestHost::new();

        bot.handle_line(&mut host, "@lorgon", "+counter new timer").unwrap();
        assert_eq!(host.last(), Some("This command already exists."));

        bot.handle_line(&mut host, "@lorgon", "+counter new deaths").unwrap();
        bot.handle_line(&mut host, "@lorgon", "+counter new deaths").unwrap();
        assert_eq!(host.last(), Some("This command already exists."));

        bot.handle_line(&mut host, "@lorgon", "+set discord hi").unwrap();
        bot.handle_line(&mut host, "@lorgon", "+counter new discord").unwrap();
        assert_eq!(host.last(), Some("This command already exists."));
    }

    #[test]
    fn test_counter_list_and_del() {
        let mut bot = test_bot();
        let mut host = TestHost::new();
        bot.handle_line(&mut host, "@lorgon", "+counter new deaths").unwrap();
        bot.handle_line(&mut host, "@lorgon", "+counter new bonks").unwrap();

        bot.handle_line(&mut host, "viewer", "+counter list").unwrap();
        assert_eq!(host.last(), Some("I know these counters: bonks, deaths"));

        bot.handle_line(&mut host, "@lorgon", "+counter del bonks").unwrap();
        assert_eq!(host.last(), Some("Counter \"bonks\" has been removed."));
        bot.handle_line(&mut host, "@lorgon", "+counter del bonks").unwrap();
        assert_eq!(host.last(), Some("Counter \"bonks\" does not exist."));
        assert!(!bot.handle_line(&mut host, "viewer", "+bonks").unwrap());
    }

    #[test]
    fn test_counter_without_action() {
        let mut bot = test_bot();
        let mut host = TestHost::new();

        bot.handle_line(&mut host, "viewer", "+counter").unwrap();
        assert_eq!(host.last(), Some("Invalid syntax: +counter <action>"));
        bot.handle_line(&mut host, "viewer", "+counter bump").unwrap();
        assert_eq!(host.last(), Some("bump is not a valid action."));
    }

    #[test]
    fn test_counter_actions_require_op() {
        let mut bot = test_bot();
        let mut host = TestHost::new();

        bot.handle_line(&mut host, "%helper", "+counter new deaths").unwrap();
        assert!(host.last().is_none());
        assert!(bot.state().counters.is_empty());
    }
}
