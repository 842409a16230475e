//! Session configuration.
//!
//! Reads optional overrides from environment variables.

use std::env;

/// Number of history entries kept when nothing else is configured
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Environment variable overriding [`SessionConfig::history_limit`]
pub const HISTORY_LIMIT_VAR: &str = "VEIL_HISTORY_LIMIT";

/// Configuration for a [`Session`](crate::Session).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Maximum number of history entries kept, newest first. Zero disables history.
    pub history_limit: usize,
}

impl SessionConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self {
            history_limit: parse_history_limit(env::var(HISTORY_LIMIT_VAR).ok().as_deref()),
        }
    }

    /// Set the history limit
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

fn parse_history_limit(value: Option<&str>) -> usize {
    match value.map(str::trim) {
        None | Some("") => DEFAULT_HISTORY_LIMIT,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(
                value = raw,
                "Ignoring invalid {}, using {}",
                HISTORY_LIMIT_VAR,
                DEFAULT_HISTORY_LIMIT
            );
            DEFAULT_HISTORY_LIMIT
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keeps_ten_entries() {
        assert_eq!(SessionConfig::default().history_limit, 10);
    }

    #[test]
    fn test_parse_history_limit() {
        assert_eq!(parse_history_limit(None), DEFAULT_HISTORY_LIMIT);
        assert_eq!(parse_history_limit(Some("")), DEFAULT_HISTORY_LIMIT);
        assert_eq!(parse_history_limit(Some(" 25 ")), 25);
        assert_eq!(parse_history_limit(Some("0")), 0);
        assert_eq!(parse_history_limit(Some("-3")), DEFAULT_HISTORY_LIMIT);
        assert_eq!(parse_history_limit(Some("lots")), DEFAULT_HISTORY_LIMIT);
    }

    #[test]
    fn test_builder() {
        let config = SessionConfig::default().with_history_limit(3);
        assert_eq!(config.history_limit, 3);
    }
}
