use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use super::{
    config::Settings,
    dispatcher::{Bot, BotError},
    host::ChatHost,
    processor::User,
};

/* Console is a stand-in chat client for running the bot locally.
 * Each stdin line is one chat message: "[#channel] <nick>: <text>",
 * where the nick may carry role prefixes such as "@lorgon".
 * The channel may be left out when only one channel is configured.
 * Replies are written to stdout as "[#channel] <text>".
 */

static LINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:#(?P<channel>\S+)\s+)?(?P<sender>[^\s:]+):\s*(?P<text>.*)$")
        .expect("valid console line pattern")
});

#[derive(Debug, PartialEq)]
pub struct ConsoleLine {
    pub channel: Option<String>,
    pub sender: String,
    pub text: String,
}

pub fn parse_line(line: &str) -> Option<ConsoleLine> {
    let caps = LINE_PATTERN.captures(line.trim())?;
    Some(ConsoleLine {
        channel: caps.name("channel").map(|m| m.as_str().to_string()),
        sender: caps["sender"].to_string(),
        text: caps["text"].to_string(),
    })
}

/* ConsoleHost is the channel as seen from the console.
 * It learns the nicklist from the senders of the lines it has seen.
 */
pub struct ConsoleHost {
    channel: String,
    own_nick: String,
    users: Vec<User>,
    outbox: Vec<String>,
}

impl ConsoleHost {
    pub fn new(channel: &str, own_nick: &str) -> ConsoleHost {
        ConsoleHost {
            channel: channel.to_string(),
            own_nick: own_nick.to_string(),
            users: Vec::new(),
            outbox: Vec::new(),
        }
    }

    // Adds the user to the nicklist, or updates its prefix.
    pub fn see(&mut self, user: &User) {
        match self.users.iter_mut().find(|known| known.nick == user.nick) {
            Some(known) => known.prefix = user.prefix.clone(),
            None => self.users.push(user.clone()),
        }
    }

    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.outbox)
    }
}

impl ChatHost for ConsoleHost {
    fn say(&mut self, text: &str) {
        self.outbox.push(format!("[#{}] {}", self.channel, text));
    }

    fn nicklist(&self) -> Vec<User> {
        self.users.clone()
    }

    fn own_nick(&self) -> String {
        self.own_nick.clone()
    }
}

/* One bot and host per configured channel. */
pub struct Console {
    channels: BTreeMap<String, (Bot, ConsoleHost)>,
}

impl Console {
    pub fn new(settings: &Settings) -> Result<Console, BotError> {
        let mut channels = BTreeMap::new();
        for channel in &settings.channels {
            let bot = Bot::new(channel, settings.clone(), settings.storage.open())?;
            log::info!("Joined #{} as {}", channel, bot.name());
            let host = ConsoleHost::new(channel, &settings.nick);
            channels.insert(channel.clone(), (bot, host));
        }
        Ok(Console { channels })
    }

    fn resolve_channel(&self, channel: Option<&str>) -> Option<String> {
        match channel {
            Some(channel) => {
                let channel = channel.trim_start_matches('#');
                self.channels.contains_key(channel).then(|| channel.to_string())
            }
            None if self.channels.len() == 1 => self.channels.keys().next().cloned(),
            None => None,
        }
    }

    /* Feeds one console line to the bot of its channel.
     * Returns what the bot said in reply.
     */
    pub fn handle(&mut self, line: &str) -> Vec<String> {
        let Some(parsed) = parse_line(line) else {
            log::warn!("Ignoring malformed line: {}", line);
            return Vec::new();
        };
        let Some(channel) = self.resolve_channel(parsed.channel.as_deref()) else {
            log::warn!("No such channel for line: {}", line);
            return Vec::new();
        };
        let Some((bot, host)) = self.channels.get_mut(&channel) else {
            return Vec::new();
        };

        let sender = User::parse(&parsed.sender);
        host.see(&sender);
        if let Err(err) = bot.handle_line(host, &parsed.sender, &parsed.text) {
            log::error!("Error handling \"{}\" in #{}: {}", parsed.text, channel, err);
        }
        host.drain()
    }
}

pub async fn run_console(settings: Settings) -> Result<(), BotError> {
    let mut console = Console::new(&settings)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        for reply in console.handle(&line) {
            stdout.write_all(reply.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
        }
        stdout.flush().await?;
    }

    log::info!("Input closed, shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::config::StorageKind;

    fn settings(channels: &[&str]) -> Settings {
        Settings {
            channels: channels.iter().map(|c| c.to_string()).collect(),
            storage: StorageKind::Memory,
            ..Settings::default()
        }
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(
            parse_line("#frustbox @lorgon: +timer new run"),
            Some(ConsoleLine {
                channel: Some("frustbox".to_string()),
                sender: "@lorgon".to_string(),
                text: "+timer new run".to_string(),
            })
        );
        assert_eq!(
            parse_line("viewer: hello there"),
            Some(ConsoleLine {
                channel: None,
                sender: "viewer".to_string(),
                text: "hello there".to_string(),
            })
        );
        assert_eq!(parse_line("no separator here"), None);
    }

    #[test]
    fn test_host_learns_nicklist() {
        let mut host = ConsoleHost::new("frustbox", "chanbot");
        host.see(&User::parse("lorgon"));
        host.see(&User::parse("@lorgon"));
        host.see(&User::parse("viewer"));

        assert_eq!(
            host.nicklist(),
            vec![User::new("@", "lorgon"), User::new("", "viewer")]
        );
        assert!(host.nick_in_chat("viewer"));
    }

    #[test]
    fn test_console_single_channel() {
        let mut console = Console::new(&settings(&["frustbox"])).unwrap();

        assert_eq!(
            console.handle("@lorgon: +counter new deaths"),
            vec!["[#frustbox] Counter \"deaths\" has been created."]
        );
        assert_eq!(
            console.handle("#frustbox viewer: +deaths"),
            vec!["[#frustbox] Counter deaths: 1"]
        );
        assert!(console.handle("viewer: just chatting").is_empty());
        assert!(console.handle("#elsewhere viewer: +deaths").is_empty());
    }

    #[test]
    fn test_console_channels_are_separate() {
        let mut console = Console::new(&settings(&["frustbox", "lorgon"])).unwrap();

        // Without a channel the line is ambiguous
        assert!(console.handle("@lorgon: +counter new deaths").is_empty());

        console.handle("#frustbox @lorgon: +counter new deaths");
        assert!(console.handle("#lorgon viewer: +deaths").is_empty());
        assert_eq!(
            console.handle("#frustbox viewer: +chatters"),
            vec!["[#frustbox] There are 2 chatters."]
        );
    }
}
