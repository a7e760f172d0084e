use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the request queue does with a write that arrives while it is at capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Discard the incoming entry; the writer still sees success.
    #[default]
    DropNewest,
    /// Discard the oldest queued entry to make room for the incoming one.
    DropOldest,
    /// Refuse the write with `SinkError::QueueFull`.
    Reject,
}

impl OverflowPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverflowPolicy::DropNewest => "drop_newest",
            OverflowPolicy::DropOldest => "drop_oldest",
            OverflowPolicy::Reject => "reject",
        }
    }
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverflowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "drop_newest" => Ok(OverflowPolicy::DropNewest),
            "drop_oldest" => Ok(OverflowPolicy::DropOldest),
            "reject" => Ok(OverflowPolicy::Reject),
            _ => Err(format!(
                "Invalid overflow policy '{s}'. Valid values: drop_newest, drop_oldest, reject"
            )),
        }
    }
}

/// Result of a successful push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The entry was queued. `displaced` is true when the oldest entry was
    /// dropped to make room.
    Enqueued { sequence: u64, displaced: bool },
    /// The queue was full and the entry was discarded.
    Dropped,
}
