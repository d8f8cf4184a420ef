use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/* Permissions decide who may run which command.
 * A user's tier is derived from the persisted nick lists, the sender's channel prefix
 * and what the host knows about the channel (own nick, streamer, nicklist).
 * Tiers are ordered, so checking "at least op" also admits owners.
 */

static SENDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([~&@%+]*)(.*)$").expect("valid sender pattern"));

static NICK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_\[\]\\^{}|`][A-Za-z0-9_\-\[\]\\^{}|`]{0,29}$").expect("valid nick pattern")
});

const OWNER_PREFIXES: &[char] = &['~'];
const OP_PREFIXES: &[char] = &['@', '&'];
const REGULAR_PREFIXES: &[char] = &['%'];

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Everyone,
    Regular,
    Op,
    Owner,
}

// A chat participant, as seen in a single message or nicklist entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub prefix: String,
    pub nick: String,
}

impl User {
    pub fn new(prefix: &str, nick: &str) -> User {
        User {
            prefix: prefix.to_string(),
            nick: nick.to_string(),
        }
    }

    // A user known only by nick, e.g. the argument of +op.
    pub fn from_nick(nick: &str) -> User {
        User::new("", nick)
    }

    // Splits a host prefix such as "@frustbox" into role symbols and nick.
    pub fn parse(raw: &str) -> User {
        let raw = raw.trim();
        match SENDER_PATTERN.captures(raw) {
            Some(caps) => User::new(caps[1].trim(), caps[2].trim()),
            None => User::from_nick(raw),
        }
    }

    fn has_prefix(&self, symbols: &[char]) -> bool {
        self.prefix.chars().any(|c| symbols.contains(&c))
    }
}

// Returns true if the given text looks like a valid chat nick.
pub fn is_valid_nick(nick: &str) -> bool {
    NICK_PATTERN.is_match(nick)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionLists {
    pub owners: BTreeSet<String>,
    pub ops: BTreeSet<String>,
    pub regulars: BTreeSet<String>,
    pub blacklist: BTreeSet<String>,
}

/* What the host knows about the channel right now.
 * Owned by the caller for the duration of a single permission check.
 */
pub struct Roster<'a> {
    pub own_nick: &'a str,
    pub streamer: &'a str,
    pub nicklist: &'a [User],
}

impl Roster<'_> {
    fn is_channel_op(&self, nick: &str) -> bool {
        self.nicklist
            .iter()
            .any(|user| user.nick == nick && user.has_prefix(&['@']))
    }

    // Nicks the host reports as channel operators.
    pub fn channel_ops(&self) -> Vec<String> {
        self.nicklist
            .iter()
            .filter(|user| user.has_prefix(&['@']))
            .map(|user| user.nick.clone())
            .collect()
    }
}

impl PermissionLists {
    pub fn is_blacklisted(&self, nick: &str) -> bool {
        self.blacklist.contains(nick)
    }

    pub fn tier_of(&self, user: &User, roster: &Roster) -> Tier {
        let nick = user.nick.as_str();

        if self.owners.contains(nick)
            || nick == roster.own_nick
            || nick == roster.streamer
            || user.has_prefix(OWNER_PREFIXES)
        {
            Tier::Owner
        } else if self.ops.contains(nick)
            || user.has_prefix(OP_PREFIXES)
            || roster.is_channel_op(nick)
        {
            Tier::Op
        } else if self.regulars.contains(nick) || user.has_prefix(REGULAR_PREFIXES) {
            Tier::Regular
        } else {
            Tier::Everyone
        }
    }

    pub fn can_use(&self, user: &User, required: &Tier, roster: &Roster) -> bool {
        self.tier_of(user, roster) >= *required
    }

    // Everyone who can use op commands, listed once each.
    pub fn op_nicks(&self, roster: &Roster) -> Vec<String> {
        let mut nicks: BTreeSet<String> = self.ops.clone();
        nicks.extend(roster.channel_ops());
        nicks.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster<'a>(nicklist: &'a [User]) -> Roster<'a> {
        Roster {
            own_nick: "chanbot",
            streamer: "frustbox",
            nicklist,
        }
    }

    #[test]
    fn test_parse_sender_prefix() {
        assert_eq!(User::parse("@lorgon"), User::new("@", "lorgon"));
        assert_eq!(User::parse(" ~frustbox "), User::new("~", "frustbox"));
        assert_eq!(User::parse("viewer"), User::new("", "viewer"));
        assert_eq!(User::parse("%+helper"), User::new("%+", "helper"));
    }

    #[test]
    fn test_valid_nicks() {
        assert!(is_valid_nick("ConeDodger240"));
        assert!(is_valid_nick("[away]_guy"));
        assert!(!is_valid_nick(""));
        assert!(!is_valid_nick("two words"));
        assert!(!is_valid_nick("9lives"));
    }

    #[test]
    fn test_tiers_from_lists() {
        let mut lists = PermissionLists::default();
        lists.owners.insert("boss".to_string());
        lists.ops.insert("mod".to_string());
        lists.regulars.insert("reg".to_string());
        let nicklist = vec![];
        let roster = roster(&nicklist);

        assert_eq!(lists.tier_of(&User::from_nick("boss"), &roster), Tier::Owner);
        assert_eq!(lists.tier_of(&User::from_nick("mod"), &roster), Tier::Op);
        assert_eq!(lists.tier_of(&User::from_nick("reg"), &roster), Tier::Regular);
        assert_eq!(lists.tier_of(&User::from_nick("anon"), &roster), Tier::Everyone);
    }

    #[test]
    fn test_tiers_from_host() {
        let lists = PermissionLists::default();
        let nicklist = vec![User::new("@", "chanop"), User::new("", "viewer")];
        let roster = roster(&nicklist);

        // The bot itself and the streamer own the channel
        assert_eq!(lists.tier_of(&User::from_nick("chanbot"), &roster), Tier::Owner);
        assert_eq!(lists.tier_of(&User::from_nick("frustbox"), &roster), Tier::Owner);

        // Prefix symbols on the message
        assert_eq!(lists.tier_of(&User::new("~", "someone"), &roster), Tier::Owner);
        assert_eq!(lists.tier_of(&User::new("@", "someone"), &roster), Tier::Op);
        assert_eq!(lists.tier_of(&User::new("%", "someone"), &roster), Tier::Regular);
        assert_eq!(lists.tier_of(&User::new("+", "someone"), &roster), Tier::Everyone);

        // Operator status from the nicklist applies to bare nicks too
        assert_eq!(lists.tier_of(&User::from_nick("chanop"), &roster), Tier::Op);
        assert_eq!(lists.tier_of(&User::from_nick("viewer"), &roster), Tier::Everyone);
    }

    #[test]
    fn test_tier_monotonicity() {
        let mut lists = PermissionLists::default();
        lists.owners.insert("boss".to_string());
        lists.ops.insert("mod".to_string());
        let nicklist = vec![];
        let roster = roster(&nicklist);

        for required in [Tier::Everyone, Tier::Regular, Tier::Op, Tier::Owner] {
            if lists.can_use(&User::from_nick("mod"), &required, &roster) {
                assert!(lists.can_use(&User::from_nick("boss"), &required, &roster));
            }
        }
        assert!(lists.can_use(&User::from_nick("boss"), &Tier::Regular, &roster));
        assert!(lists.can_use(&User::from_nick("mod"), &Tier::Regular, &roster));
        assert!(!lists.can_use(&User::from_nick("mod"), &Tier::Owner, &roster));
    }

    #[test]
    fn test_op_nicks_merges_nicklist() {
        let mut lists = PermissionLists::default();
        lists.ops.insert("mod".to_string());
        let nicklist = vec![User::new("@", "chanop"), User::new("@", "mod")];
        let roster = roster(&nicklist);

        assert_eq!(lists.op_nicks(&roster), vec!["chanop", "mod"]);
    }
}
