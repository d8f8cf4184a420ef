use crate::bot::{
    dispatcher::{CommandSet, CommandSpec, HandlerResult},
    processor::Tier,
};

use super::{constants::NO_HELP_MESSAGE, utils::partition, Context};

/* Basic commands. Just enough to make the bot somewhat useful. */

pub fn command_set() -> CommandSet {
    CommandSet::new(
        "general",
        vec![
            CommandSpec::simple(
                "mute",
                Tier::Op,
                "Mute the bot, it will stop talking but still execute things. Ops only.",
                action_mute,
            ),
            CommandSpec::simple("unmute", Tier::Op, "Unmute the bot. Ops only.", action_unmute),
            CommandSpec::simple(
                "commands",
                Tier::Everyone,
                "Show a list of known commands.",
                action_commands,
            ),
            CommandSpec::simple(
                "help",
                Tier::Everyone,
                "Print help for a given command. Syntax: {symbol}help <command>",
                action_help,
            ),
        ],
    )
}

/* Mute command.
 * The bot announces it, even though it is about to go quiet.
 */
fn action_mute(ctx: &mut Context<'_>, _args: &str) -> HandlerResult {
    ctx.state.muted = true;
    ctx.mark_changed();
    log::info!("Mute - User {} muted the bot in {}", ctx.sender.nick, ctx.channel);
    ctx.say_forced("I'll shut up.");
    Ok(())
}

fn action_unmute(ctx: &mut Context<'_>, _args: &str) -> HandlerResult {
    ctx.state.muted = false;
    ctx.mark_changed();
    log::info!("Unmute - User {} unmuted the bot in {}", ctx.sender.nick, ctx.channel);
    ctx.say("I can speak!");
    Ok(())
}

fn action_commands(ctx: &mut Context<'_>, _args: &str) -> HandlerResult {
    let commands = ctx.registry.list_commands(ctx.state).join(", ");
    ctx.say(&format!("Known commands: {commands}"));
    Ok(())
}

/* Help command.
 * Without arguments it explains itself. For commands with actions,
 * a second word selects the action to explain.
 */
fn action_help(ctx: &mut Context<'_>, args: &str) -> HandlerResult {
    let (command, rest) = partition(args);
    let command = if command.is_empty() { "help" } else { command };
    let (action, _) = partition(rest);

    let help = match ctx.registry.get(command) {
        Some(spec) if spec.has_actions() && !action.is_empty() => match spec.action(action) {
            Some(found) => found.help.to_string(),
            None => format!("{action} is not a valid action."),
        },
        Some(spec) => spec.help.to_string(),
        None => NO_HELP_MESSAGE.to_string(),
    };

    let text = ctx.with_symbol(&help);
    ctx.say(&text);
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
    fn test_help_defaults_to_itself() {
        let mut bot = test_bot();
        let mut host = TestHost::new();

        bot.handle_line(&mut host, "viewer", "+help").unwrap();
        assert_eq!(
            host.last(),
            Some("Print help for a given command. Syntax: +help <command>")
        );
    }

    #[test]
    fn test_help_for_commands_and_actions() {
        let mut bot = test_bot();
        let mut host = TestHost::new();

        bot.handle_line(&mut host, "viewer", "+help unmute").unwrap();
        assert_eq!(host.last(), Some("Unmute the bot. Ops only."));

        bot.handle_line(&mut host, "viewer", "+help timer split").unwrap();
        assert_eq!(
            host.last(),
            Some("Create a split for the named or active timer. Regulars only. Syntax: +timer split <split name> [timer name]")
        );

        bot.handle_line(&mut host, "viewer", "+help timer dance").unwrap();
        assert_eq!(host.last(), Some("dance is not a valid action."));

        bot.handle_line(&mut host, "viewer", "+help nothing").unwrap();
        assert_eq!(host.last(), Some("Not a valid command or no help available."));
    }

    #[test]
    fn test_commands_lists_dynamic_names() {
        let mut bot = test_bot();
        let mut host = TestHost::new();

        bot.handle_line(&mut host, "@lorgon", "+set discord join us").unwrap();
        bot.handle_line(&mut host, "@lorgon", "+counter new deaths").unwrap();
        bot.handle_line(&mut host, "viewer", "+commands").unwrap();

        let reply = host.last().unwrap();
        assert!(reply.starts_with("Known commands: amiop, amiregular, chatters, commands,"));
        assert!(reply.ends_with("unset, discord, deaths"));
    }
}
