use crate::bot::{
    dispatcher::{CommandSet, CommandSpec, HandlerResult},
    processor::{is_valid_nick, Tier},
};

use super::{utils::partition, Context};

/* Some simple fun commands.
 * The "good luck charm" is a nick whose presence in chat is considered bad luck.
 */

pub fn command_set() -> CommandSet {
    CommandSet::new(
        "fun",
        vec![
            CommandSpec::simple(
                "luck",
                Tier::Everyone,
                "Check if the \"good luck charm\" is in chat.",
                action_luck,
            ),
            CommandSpec::simple(
                "setcharm",
                Tier::Op,
                "Set a new user as good luck charm. Ops only. Syntax: {symbol}setcharm <nick>",
                action_setcharm,
            ),
        ],
    )
}

fn action_luck(ctx: &mut Context<'_>, _args: &str) -> HandlerResult {
    let charm = ctx.state.charm.clone();
    if ctx.nick_in_chat(&charm) || ctx.sender.nick == charm {
        ctx.say(&format!(
            "Oh NO! {charm} is here. Better save regularly. kurtCone"
        ));
    } else {
        ctx.say("Rejoice! You're safe, the kurtCone has been dodged.");
    }
    Ok(())
}

fn action_setcharm(ctx: &mut Context<'_>, args: &str) -> HandlerResult {
    let (nick, _) = partition(args);
    if !is_valid_nick(nick) {
        ctx.say("That is not a valid nickname.");
        return Ok(());
    }

    ctx.state.charm = nick.to_string();
    ctx.mark_changed();
    ctx.say(&format!("{nick} is now the \"good luck\" charm."));
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::bot::{
        config::Settings, dispatcher::Bot, host::testing::TestHost, processor::DEFAULT_CHARM,
        store::MemoryStore,
    };

    fn test_bot() -> Bot {
        let settings = Settings {
            repeat_window: chrono::Duration::zero(),
            ..Settings::default()
        };
        Bot::new("frustbox", settings, Box::new(MemoryStore::new())).unwrap()
    }

    #[test]
    fn test_luck_checks_nicklist() {
        let mut bot = test_bot();
        let mut host = TestHost::new();

        bot.handle_line(&mut host, "viewer", "+luck").unwrap();
        assert_eq!(
            host.last(),
            Some("Rejoice! You're safe, the kurtCone has been dodged.")
        );

        let mut host = TestHost::new().with_user("", DEFAULT_CHARM);
        bot.handle_line(&mut host, "viewer", "+luck").unwrap();
        assert_eq!(
            host.last(),
            Some("Oh NO! ConeDodger240 is here. Better save regularly. kurtCone")
        );
    }

    #[test]
    fn test_setcharm() {
        let mut bot = test_bot();
        let mut host = TestHost::new();

        bot.handle_line(&mut host, "@lorgon", "+setcharm jinx").unwrap();
        assert_eq!(host.last(), Some("jinx is now the \"good luck\" charm."));
        assert_eq!(bot.state().charm, "jinx");

        // The charm asking counts as being in chat
        bot.handle_line(&mut host, "jinx", "+luck").unwrap();
        assert_eq!(
            host.last(),
            Some("Oh NO! jinx is here. Better save regularly. kurtCone")
        );
    }
}
