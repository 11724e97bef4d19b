use crate::error::AugmentError;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Stage of a file inside the dropbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileState {
    Incoming,
    Processing,
    Archived,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub state: FileState,
    pub discovered_at: DateTime<Local>,
}

impl FileEntry {
    pub fn discovered(name: impl Into<String>, at: DateTime<Local>) -> Self {
        Self {
            name: name.into(),
            state: FileState::Incoming,
            discovered_at: at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(flatten)]
    pub metrics: Map<String, Value>,
}

impl ComponentHealth {
    pub fn new(status: ComponentStatus) -> Self {
        Self {
            status,
            metrics: Map::new(),
        }
    }

    pub fn with_metric(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metrics.insert(key.to_string(), value.into());
        self
    }

    pub fn metric(&self, key: &str) -> Option<&Value> {
        self.metrics.get(key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub timestamp: DateTime<Local>,
    pub status: HealthStatus,
    pub components: BTreeMap<String, ComponentHealth>,
}

impl HealthSnapshot {
    pub fn files_pending(&self) -> u64 {
        self.components
            .get("dropbox")
            .and_then(|c| c.metric("files_pending"))
            .and_then(Value::as_u64)
            .unwrap_or(0)
    }

    pub fn logs_size_mb(&self) -> f64 {
        self.components
            .get("logs")
            .and_then(|c| c.metric("size_mb"))
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
        };
        f.write_str(label)
    }
}

impl FromStr for Severity {
    type Err = AugmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "critical" => Ok(Severity::Critical),
            _ => Err(AugmentError::InvalidSeverity(s.to_string())),
        }
    }
}

/// A timestamped alert, written as one JSON line to the flare log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flare {
    pub timestamp: DateTime<Local>,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeReport {
    pub timestamp: DateTime<Local>,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    pub results: String,
}
