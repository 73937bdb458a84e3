// ABOUTME: Timing inputs for the agent ping gate and the running-state watch.
// ABOUTME: WatchTime parses the "start-end" millisecond window used by update settings.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// How long to wait for an agent to answer `ping`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingPolicy {
    /// Total time before the agent is considered unreachable.
    pub timeout: Duration,
    /// Pause between failed pings.
    pub delay: Duration,
}

impl PingPolicy {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

    pub fn new(timeout: Duration, delay: Duration) -> Self {
        Self { timeout, delay }
    }
}

impl Default for PingPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT, Self::DEFAULT_DELAY)
    }
}

/// Window in which a started instance must report `running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchTime {
    pub start: Duration,
    pub end: Duration,
}

impl WatchTime {
    pub fn new(start: Duration, end: Duration) -> Result<Self, WatchTimeError> {
        if end < start {
            return Err(WatchTimeError::EndBeforeStart {
                start: start.as_millis(),
                end: end.as_millis(),
            });
        }
        Ok(Self { start, end })
    }

    /// Time spent polling after the start offset.
    pub fn window(&self) -> Duration {
        self.end.saturating_sub(self.start)
    }
}

impl Default for WatchTime {
    fn default() -> Self {
        Self {
            start: Duration::ZERO,
            end: Duration::from_millis(300_000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WatchTimeError {
    #[error("watch time must look like 'start-end' in milliseconds, got '{0}'")]
    Format(String),

    #[error("watch time end ({end}ms) is before start ({start}ms)")]
    EndBeforeStart { start: u128, end: u128 },
}

impl FromStr for WatchTime {
    type Err = WatchTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let format_err = || WatchTimeError::Format(s.to_string());
        let (start, end) = s.split_once('-').ok_or_else(format_err)?;
        let start: u64 = start.trim().parse().map_err(|_| format_err())?;
        let end: u64 = end.trim().parse().map_err(|_| format_err())?;
        WatchTime::new(Duration::from_millis(start), Duration::from_millis(end))
    }
}

impl fmt::Display for WatchTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.as_millis(), self.end.as_millis())
    }
}

impl Serialize for WatchTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WatchTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// How `start` waits for the instance to converge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePolicy {
    #[serde(default)]
    pub watch_time: WatchTime,

    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(1)
}

impl Default for UpdatePolicy {
    fn default() -> Self {
        Self {
            watch_time: WatchTime::default(),
            poll_interval: default_poll_interval(),
        }
    }
}
