use chrono::{DateTime, Utc};

use crate::bot::{
    config::Settings,
    dispatcher::CommandRegistry,
    host::ChatHost,
    processor::{BotState, PermissionLists, Roster, Tier, User},
};

/* Context is what a handler sees of the bot while it runs one command.
 * All replies go through say, which honours the mute flag and the repeat window.
 * Handlers call mark_changed after mutating state, the dispatcher then saves it.
 */
pub struct Context<'a> {
    pub state: &'a mut BotState,
    pub sender: &'a User,
    pub settings: &'a Settings,
    pub channel: &'a str,
    pub registry: &'a CommandRegistry,
    host: &'a mut dyn ChatHost,
    now: DateTime<Utc>,
    changed: bool,
}

impl<'a> Context<'a> {
    pub fn new(
        state: &'a mut BotState,
        host: &'a mut dyn ChatHost,
        sender: &'a User,
        settings: &'a Settings,
        channel: &'a str,
        registry: &'a CommandRegistry,
        now: DateTime<Utc>,
    ) -> Context<'a> {
        Context {
            state,
            sender,
            settings,
            channel,
            registry,
            host,
            now,
            changed: false,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn mark_changed(&mut self) {
        self.changed = true;
    }

    pub fn changed(&self) -> bool {
        self.changed
    }

    /* Replies */

    pub fn say(&mut self, text: &str) -> bool {
        self.send(text, false)
    }

    // Speaks even when muted or repeating.
    pub fn say_forced(&mut self, text: &str) -> bool {
        self.send(text, true)
    }

    // Replies "Invalid syntax: ..." with the command symbol filled in.
    pub fn usage(&mut self, template: &str) -> bool {
        let text = format!("Invalid syntax: {}", self.with_symbol(template));
        self.say(&text)
    }

    pub fn with_symbol(&self, template: &str) -> String {
        template.replace("{symbol}", &self.settings.command_symbol)
    }

    fn send(&mut self, text: &str, force: bool) -> bool {
        if !force {
            if self.state.muted {
                log::debug!("Muted, not saying: {}", text);
                return false;
            }
            if self
                .state
                .is_repeat(text, self.now, self.settings.repeat_window)
            {
                log::debug!("Not repeating: {}", text);
                return false;
            }
        }

        self.state.record_response(text, self.now);
        self.host.say(text);
        true
    }

    /* Permissions */

    // Runs `f` with the permission lists and what the host knows about the channel.
    fn with_roster<T>(&self, f: impl FnOnce(&PermissionLists, &Roster) -> T) -> T {
        let nicklist = self.host.nicklist();
        let own_nick = self.host.own_nick();
        let roster = Roster {
            own_nick: &own_nick,
            streamer: self.channel,
            nicklist: &nicklist,
        };
        f(&self.state.permissions, &roster)
    }

    // Whether the sender of the current message has at least the given tier.
    pub fn can_use(&self, required: &Tier) -> bool {
        self.with_roster(|permissions, roster| permissions.can_use(self.sender, required, roster))
    }

    pub fn nick_can_use(&self, nick: &str, required: &Tier) -> bool {
        let user = User::from_nick(nick);
        self.with_roster(|permissions, roster| permissions.can_use(&user, required, roster))
    }

    pub fn op_nicks(&self) -> Vec<String> {
        self.with_roster(|permissions, roster| permissions.op_nicks(roster))
    }

    /* Channel */

    pub fn nicklist_len(&self) -> usize {
        self.host.nicklist().len()
    }

    pub fn nick_in_chat(&self, nick: &str) -> bool {
        self.host.nick_in_chat(nick)
    }
}
