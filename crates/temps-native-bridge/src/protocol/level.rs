//! Severity levels and their projection onto the native vocabulary

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of an event or breadcrumb.
///
/// `Critical` and `Log` only exist in-process; the native agent understands
/// the remaining five.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Fatal,
    Critical,
    Error,
    Warning,
    Log,
    Info,
    Debug,
}

impl Level {
    /// Project the level onto the native vocabulary.
    ///
    /// Lossy and one-way: `critical` becomes `fatal`, `log` becomes `debug`.
    pub fn normalize(self) -> Self {
        match self {
            Level::Critical => Level::Fatal,
            Level::Log => Level::Debug,
            other => other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Fatal => "fatal",
            Level::Critical => "critical",
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Log => "log",
            Level::Info => "info",
            Level::Debug => "debug",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
