use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{permissions::PermissionLists, timer::Timers};

/* BotState is everything a bot remembers between restarts.
 * It is saved as a single blob after every mutating command.
 * Fields missing from an older blob fall back to their defaults.
 */

pub const DEFAULT_CHARM: &str = "ConeDodger240";
pub const COUNTER_PLACEHOLDER: &str = "{}";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    pub value: i64,
    pub reply: String,
}

impl Counter {
    pub fn new(name: &str, reply: Option<&str>) -> Counter {
        let reply = match reply {
            Some(text) => text.to_string(),
            None => format!("Counter {name}: {COUNTER_PLACEHOLDER}"),
        };
        Counter { value: 0, reply }
    }

    // Adds to the value, never going below zero.
    pub fn add(&mut self, amount: i64) -> i64 {
        self.value = self.value.saturating_add(amount).max(0);
        self.value
    }

    pub fn set(&mut self, value: i64) -> i64 {
        self.value = value.max(0);
        self.value
    }

    pub fn render(&self) -> String {
        self.reply
            .replacen(COUNTER_PLACEHOLDER, &self.value.to_string(), 1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviousResponse {
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotState {
    pub permissions: PermissionLists,
    pub muted: bool,
    pub previous_response: Option<PreviousResponse>,
    pub timers: Timers,
    pub active_timer: Option<String>,
    pub counters: BTreeMap<String, Counter>,
    pub custom_replies: BTreeMap<String, String>,
    pub charm: String,
}

impl Default for BotState {
    fn default() -> Self {
        BotState {
            permissions: PermissionLists::default(),
            muted: false,
            previous_response: None,
            timers: Timers::default(),
            active_timer: None,
            counters: BTreeMap::new(),
            custom_replies: BTreeMap::new(),
            charm: DEFAULT_CHARM.to_string(),
        }
    }
}

impl BotState {
    /* Returns true if `text` repeats the previous response within `window`.
     * A zero window never suppresses anything.
     */
    pub fn is_repeat(&self, text: &str, now: DateTime<Utc>, window: Duration) -> bool {
        if window <= Duration::zero() {
            return false;
        }
        match &self.previous_response {
            Some(previous) => previous.text == text && now - previous.sent_at < window,
            None => false,
        }
    }

    pub fn record_response(&mut self, text: &str, now: DateTime<Utc>) {
        self.previous_response = Some(PreviousResponse {
            text: text.to_string(),
            sent_at: now,
        });
    }

    // Falls back to the active timer when no name is given.
    pub fn resolve_timer_name(&self, name: &str) -> Option<String> {
        if name.is_empty() {
            self.active_timer.clone()
        } else {
            Some(name.to_string())
        }
    }
}
