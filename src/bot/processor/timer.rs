use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/* Timer is a stopwatch with named split times.
 * All operations take the current time explicitly, the caller owns the clock.
 * Elapsed time is never stored for a running timer, it is derived from the start time.
 */

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum TimerError {
    #[error("Timer is not running")]
    NotRunning,
    #[error("Timer has not been started yet")]
    NotStarted,
    #[error("Split \"{0}\" already exists")]
    SplitExists(String),
    #[error("Split \"{0}\" does not exist")]
    NoSuchSplit(String),
    #[error("Adjustment is out of range")]
    OutOfRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    pub name: String,
    pub elapsed_ms: i64,
}

impl Split {
    pub fn elapsed(&self) -> Duration {
        Duration::milliseconds(self.elapsed_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    pub name: String,
    pub running: bool,
    pub start_time: Option<DateTime<Utc>>,
    pub stop_time: Option<DateTime<Utc>>,
    pub splits: Vec<Split>,
}

impl Timer {
    pub fn new(name: &str) -> Timer {
        Timer {
            name: name.to_string(),
            running: false,
            start_time: None,
            stop_time: None,
            splits: Vec::new(),
        }
    }

    /* Logic */

    pub fn start(&mut self, now: DateTime<Utc>) {
        self.start_time = Some(now);
        self.stop_time = None;
        self.running = true;
    }

    pub fn stop(&mut self, now: DateTime<Utc>) -> Result<Duration, TimerError> {
        if !self.running {
            return Err(TimerError::NotRunning);
        }
        self.stop_time = Some(now);
        self.running = false;
        self.elapsed(now).ok_or(TimerError::NotStarted)
    }

    // Starts over from zero and forgets all splits.
    pub fn restart(&mut self, now: DateTime<Utc>) {
        self.splits.clear();
        self.start(now);
    }

    // Adds seconds to the elapsed time by moving the start time back.
    pub fn adjust(&mut self, seconds: i64) -> Result<(), TimerError> {
        let start = self.start_time.ok_or(TimerError::NotStarted)?;
        self.start_time = Some(shift_back(start, seconds)?);
        Ok(())
    }

    // Sets the elapsed time to exactly the given number of seconds.
    pub fn set(&mut self, seconds: i64, now: DateTime<Utc>) -> Result<(), TimerError> {
        let reference = if self.running {
            now
        } else {
            self.stop_time.ok_or(TimerError::NotStarted)?
        };
        self.start_time = Some(shift_back(reference, seconds)?);
        Ok(())
    }

    pub fn split(&mut self, name: &str, now: DateTime<Utc>) -> Result<Duration, TimerError> {
        if !self.running {
            return Err(TimerError::NotRunning);
        }
        if self.has_split(name) {
            return Err(TimerError::SplitExists(name.to_string()));
        }

        let elapsed = self.elapsed(now).ok_or(TimerError::NotStarted)?;
        self.splits.push(Split {
            name: name.to_string(),
            elapsed_ms: elapsed.num_milliseconds(),
        });
        Ok(elapsed)
    }

    // Records an existing split again at the current elapsed time.
    pub fn resplit(&mut self, name: &str, now: DateTime<Utc>) -> Result<Duration, TimerError> {
        if !self.running {
            return Err(TimerError::NotRunning);
        }
        let elapsed = self.elapsed(now).ok_or(TimerError::NotStarted)?;
        let split = self.split_mut(name)?;
        split.elapsed_ms = elapsed.num_milliseconds();
        Ok(elapsed)
    }

    pub fn remove_split(&mut self, name: &str) -> Result<(), TimerError> {
        let index = self
            .splits
            .iter()
            .position(|split| split.name == name)
            .ok_or_else(|| TimerError::NoSuchSplit(name.to_string()))?;
        self.splits.remove(index);
        Ok(())
    }

    // Renames a split in place, keeping its position.
    pub fn rename_split(&mut self, old_name: &str, new_name: &str) -> Result<(), TimerError> {
        if self.has_split(new_name) {
            return Err(TimerError::SplitExists(new_name.to_string()));
        }
        self.split_mut(old_name)?.name = new_name.to_string();
        Ok(())
    }

    pub fn adjust_split(&mut self, name: &str, seconds: i64) -> Result<Duration, TimerError> {
        let split = self.split_mut(name)?;
        let elapsed_ms = seconds
            .checked_mul(1000)
            .and_then(|delta| split.elapsed_ms.checked_add(delta))
            .ok_or(TimerError::OutOfRange)?;
        let elapsed = Duration::try_milliseconds(elapsed_ms).ok_or(TimerError::OutOfRange)?;
        split.elapsed_ms = elapsed_ms;
        Ok(elapsed)
    }

    /* Information */

    pub fn elapsed(&self, now: DateTime<Utc>) -> Option<Duration> {
        let start = self.start_time?;
        if self.running {
            Some(now - start)
        } else {
            self.stop_time.map(|stop| stop - start)
        }
    }

    pub fn is_stopped(&self) -> bool {
        !self.running && self.stop_time.is_some()
    }

    pub fn has_split(&self, name: &str) -> bool {
        self.splits.iter().any(|split| split.name == name)
    }

    // "name: time" pairs in recording order, or None without splits.
    pub fn splits_string(&self) -> Option<String> {
        if self.splits.is_empty() {
            return None;
        }
        let parts: Vec<String> = self
            .splits
            .iter()
            .map(|split| format!("{}: {}", split.name, format_duration(split.elapsed())))
            .collect();
        Some(parts.join(", "))
    }

    fn split_mut(&mut self, name: &str) -> Result<&mut Split, TimerError> {
        self.splits
            .iter_mut()
            .find(|split| split.name == name)
            .ok_or_else(|| TimerError::NoSuchSplit(name.to_string()))
    }
}

// Moves a point in time back by `seconds`, failing outside the representable range.
fn shift_back(time: DateTime<Utc>, seconds: i64) -> Result<DateTime<Utc>, TimerError> {
    Duration::try_seconds(seconds)
        .and_then(|shift| time.checked_sub_signed(shift))
        .ok_or(TimerError::OutOfRange)
}

// Formats a duration as H:MM:SS.mmm, with a leading '-' when negative.
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.num_milliseconds();
    let sign = if total_ms < 0 { "-" } else { "" };
    let total_ms = total_ms.abs();

    let millis = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let secs = total_secs % 60;
    let mins = (total_secs / 60) % 60;
    let hours = total_secs / 3600;

    format!("{sign}{hours}:{mins:02}:{secs:02}.{millis:03}")
}

/* Timers keeps timers in creation order, unique by name. */
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timers(Vec<Timer>);

impl Timers {
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|timer| timer.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Timer> {
        self.0.iter().find(|timer| timer.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Timer> {
        self.0.iter_mut().find(|timer| timer.name == name)
    }

    // Returns false without inserting if the name is taken.
    pub fn insert(&mut self, timer: Timer) -> bool {
        if self.contains(&timer.name) {
            return false;
        }
        self.0.push(timer);
        true
    }

    pub fn remove(&mut self, name: &str) -> Option<Timer> {
        let index = self.0.iter().position(|timer| timer.name == name)?;
        Some(self.0.remove(index))
    }

    pub fn rename(&mut self, old_name: &str, new_name: &str) -> bool {
        if self.contains(new_name) {
            return false;
        }
        match self.get_mut(old_name) {
            Some(timer) => {
                timer.name = new_name.to_string();
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Timer> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
