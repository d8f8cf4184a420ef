use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::{
    config::Settings,
    handler::{command_sets, partition, Context},
    host::ChatHost,
    processor::{BotState, Tier, User},
    store::{StateStore, StoreError},
};

/* Dispatcher is the entry point of the bot.
 * It receives chat lines from the host, finds the command they name and runs its handler
 * if the sender's tier allows it.
 * Commands come from independent command sets, merged into one registry at startup.
 * State is saved through the store after every command that changed it.
 */

/* Types */
pub type HandlerResult = Result<(), BotError>;
pub type Handler = fn(&mut Context<'_>, &str) -> HandlerResult;
// Tries to handle a message no builtin command matched. Returns true if it did.
pub type Fallback = fn(&mut Context<'_>, &str) -> Result<bool, BotError>;
// Names of commands that exist only in state, e.g. custom replies.
pub type DynamicNames = fn(&BotState) -> Vec<String>;

#[derive(thiserror::Error, Debug)]
pub enum BotError {
    #[error("Store error: {0}")]
    StoreError(StoreError),
    #[error("Command \"{0}\" is registered more than once")]
    DuplicateCommand(String),
    #[error("IO error: {0}")]
    IoError(std::io::Error),
}

impl From<std::io::Error> for BotError {
    fn from(io_error: std::io::Error) -> BotError {
        BotError::IoError(io_error)
    }
}

impl From<StoreError> for BotError {
    fn from(store_error: StoreError) -> BotError {
        BotError::StoreError(store_error)
    }
}

pub struct Action {
    pub name: &'static str,
    pub tier: Tier,
    pub help: &'static str,
    pub handler: Handler,
}

// What a command with actions does when called without one.
pub enum DefaultAction {
    Run(&'static str),
    Usage(&'static str),
}

pub enum CommandKind {
    Simple(Handler),
    Actions {
        actions: Vec<Action>,
        default: DefaultAction,
    },
}

pub struct CommandSpec {
    pub name: &'static str,
    pub tier: Tier,
    pub help: &'static str,
    pub kind: CommandKind,
}

impl CommandSpec {
    pub fn simple(name: &'static str, tier: Tier, help: &'static str, handler: Handler) -> Self {
        CommandSpec {
            name,
            tier,
            help,
            kind: CommandKind::Simple(handler),
        }
    }

    pub fn action(&self, name: &str) -> Option<&Action> {
        match &self.kind {
            CommandKind::Actions { actions, .. } => actions.iter().find(|a| a.name == name),
            CommandKind::Simple(_) => None,
        }
    }

    pub fn has_actions(&self) -> bool {
        matches!(self.kind, CommandKind::Actions { .. })
    }
}

/* A group of commands contributed by one feature. */
pub struct CommandSet {
    pub name: &'static str,
    pub commands: Vec<CommandSpec>,
    pub fallback: Option<Fallback>,
    pub dynamic_names: Option<DynamicNames>,
}

impl CommandSet {
    pub fn new(name: &'static str, commands: Vec<CommandSpec>) -> CommandSet {
        CommandSet {
            name,
            commands,
            fallback: None,
            dynamic_names: None,
        }
    }
}

pub struct CommandRegistry {
    commands: BTreeMap<&'static str, CommandSpec>,
    fallbacks: Vec<(&'static str, Fallback)>,
    dynamic_names: Vec<DynamicNames>,
}

impl CommandRegistry {
    // Merges command sets in order. A name registered twice is an error.
    pub fn from_sets(sets: Vec<CommandSet>) -> Result<CommandRegistry, BotError> {
        let mut registry = CommandRegistry {
            commands: BTreeMap::new(),
            fallbacks: Vec::new(),
            dynamic_names: Vec::new(),
        };

        for set in sets {
            log::debug!(
                "Registering command set {} with {} commands",
                set.name,
                set.commands.len()
            );
            for spec in set.commands {
                if registry.commands.contains_key(spec.name) {
                    return Err(BotError::DuplicateCommand(spec.name.to_string()));
                }
                registry.commands.insert(spec.name, spec);
            }
            if let Some(fallback) = set.fallback {
                registry.fallbacks.push((set.name, fallback));
            }
            if let Some(names) = set.dynamic_names {
                registry.dynamic_names.push(names);
            }
        }

        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.get(name)
    }

    // Builtin names sorted, followed by the dynamic names of each set.
    pub fn list_commands(&self, state: &BotState) -> Vec<String> {
        let mut names: Vec<String> = self.commands.keys().map(|name| name.to_string()).collect();
        for dynamic in &self.dynamic_names {
            names.extend(dynamic(state));
        }
        names
    }

    pub fn is_known(&self, name: &str, state: &BotState) -> bool {
        self.commands.contains_key(name) || self.list_commands(state).iter().any(|n| n == name)
    }
}

pub struct Bot {
    name: String,
    channel: String,
    settings: Settings,
    state: BotState,
    registry: CommandRegistry,
    store: Box<dyn StateStore>,
}

impl Bot {
    /* Creates the bot for one channel and restores its saved state, if any.
     */
    pub fn new(
        channel: &str,
        settings: Settings,
        mut store: Box<dyn StateStore>,
    ) -> Result<Bot, BotError> {
        let name = format!("{}_{}", settings.network, channel);
        let registry = CommandRegistry::from_sets(command_sets())?;

        let state = match store.load(&name)? {
            Some(state) => {
                log::info!("Loaded state for bot {}", name);
                state
            }
            None => {
                log::info!("No saved state for bot {}, starting fresh", name);
                BotState::default()
            }
        };

        Ok(Bot {
            name,
            channel: channel.to_string(),
            settings,
            state,
            registry,
            store,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn state(&self) -> &BotState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut BotState {
        &mut self.state
    }

    /* Entry point for a raw chat line.
     * Lines not starting with the command symbol are ignored.
     */
    pub fn handle_line(
        &mut self,
        host: &mut dyn ChatHost,
        prefix: &str,
        text: &str,
    ) -> Result<bool, BotError> {
        let message = match text.trim().strip_prefix(self.settings.command_symbol.as_str()) {
            Some(message) => message.trim().to_string(),
            None => return Ok(false),
        };
        let sender = User::parse(prefix);
        self.dispatch(host, &sender, &message)
    }

    pub fn dispatch(
        &mut self,
        host: &mut dyn ChatHost,
        sender: &User,
        message: &str,
    ) -> Result<bool, BotError> {
        self.dispatch_at(host, sender, message, Utc::now())
    }

    /* Runs a command message (without the symbol) as if received at `now`.
     * Returns true if a command, custom reply or counter handled it.
     */
    pub fn dispatch_at(
        &mut self,
        host: &mut dyn ChatHost,
        sender: &User,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, BotError> {
        if self.state.permissions.is_blacklisted(&sender.nick) {
            log::debug!("User {} is blacklisted: {}", sender.nick, message);
            return Ok(false);
        }

        let (command, args) = partition(message);
        if command.is_empty() {
            return Ok(false);
        }

        let mut ctx = Context::new(
            &mut self.state,
            host,
            sender,
            &self.settings,
            &self.channel,
            &self.registry,
            now,
        );

        let handled = match self.registry.get(command) {
            Some(spec) => {
                run_command(&mut ctx, spec, args)?;
                true
            }
            None => {
                let mut handled = false;
                for (set_name, fallback) in &self.registry.fallbacks {
                    if fallback(&mut ctx, command)? {
                        log::debug!("Command {} handled by {}", command, set_name);
                        handled = true;
                        break;
                    }
                }
                if !handled {
                    log::debug!("Command \"{}\" does not exist.", command);
                }
                handled
            }
        };

        if ctx.changed() {
            self.save();
        }

        Ok(handled)
    }

    // Failing to save is logged, the bot keeps running with its in-memory state.
    fn save(&mut self) {
        match self.store.save(&self.name, &self.state) {
            Ok(()) => log::debug!("Saved state for bot {}", self.name),
            Err(err) => log::error!("Failed to save state for bot {}: {}", self.name, err),
        }
    }
}

fn run_command(ctx: &mut Context<'_>, spec: &CommandSpec, args: &str) -> HandlerResult {
    if !ctx.can_use(&spec.tier) {
        log::debug!(
            "User {} lacks permission for command {}",
            ctx.sender.nick,
            spec.name
        );
        return Ok(());
    }

    match &spec.kind {
        CommandKind::Simple(handler) => handler(ctx, args),
        CommandKind::Actions { actions, default } => {
            let (action, rest) = partition(args);
            let action = if action.is_empty() {
                match default {
                    DefaultAction::Run(name) => *name,
                    DefaultAction::Usage(usage) => {
                        ctx.usage(usage);
                        return Ok(());
                    }
                }
            } else {
                action
            };

            match actions.iter().find(|a| a.name == action) {
                Some(found) if ctx.can_use(&found.tier) => (found.handler)(ctx, rest),
                Some(_) => {
                    log::debug!(
                        "User {} lacks permission for {} {}",
                        ctx.sender.nick,
                        spec.name,
                        action
                    );
                    Ok(())
                }
                None => {
                    ctx.say(&format!("{action} is not a valid action."));
                    Ok(())
                }
            }
        }
    }
}
