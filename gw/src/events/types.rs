//! Payloads carried on the outward channels

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::subsystem::{Decision, TargetId};

/// Which coordinator produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    GameEvents,
    Overlay,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::GameEvents => "game-events",
            Source::Overlay => "overlay",
        }
    }
}

/// Free-form log message with an ordered argument list
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(rename = "ts")]
    pub timestamp: DateTime<Utc>,
    pub source: Source,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
}

impl LogEntry {
    pub fn new(source: Source, message: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            timestamp: Utc::now(),
            source,
            message: message.into(),
            args,
        }
    }

    /// Message followed by each argument as compact JSON
    pub fn render(&self) -> String {
        let mut line = self.message.clone();
        for arg in &self.args {
            line.push(' ');
            match arg {
                Value::String(s) => line.push_str(s),
                other => line.push_str(&other.to_string()),
            }
        }
        line
    }
}

/// A monitored game was detected and capture was enabled
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetLaunch {
    pub target: TargetId,
}

/// Info update or game event forwarded from the game-events package
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    pub target: TargetId,
    pub args: Vec<Value>,
}

/// A package finished loading and the coordinator bound to it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageReady {
    pub source: Source,
    pub version: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameExit {
    pub info: Value,
}

/// A game launched; the receiver may veto or confirm overlay injection
#[derive(Clone, Debug)]
pub struct InjectionRequest {
    pub decision: Decision,
    pub info: Value,
}

impl InjectionRequest {
    pub fn inject(&self) {
        self.decision.accept();
    }

    pub fn decline(&self) {
        self.decision.decline();
    }
}
