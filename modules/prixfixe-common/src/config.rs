use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::PrixFixeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Worker configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Outbox
    pub database_url: Option<String>,

    // Search
    pub search_url: Option<String>,

    // Dispatch
    pub worker_concurrency: usize,
    pub message_deadline: Option<Duration>,

    // Replay
    pub households_file: Option<PathBuf>,

    // Logging
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            search_url: None,
            worker_concurrency: 8,
            message_deadline: None,
            households_file: None,
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, PrixFixeError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PrixFixeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let worker_concurrency = match non_empty(&lookup, "WORKER_CONCURRENCY") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(0) | Err(_) => {
                    return Err(PrixFixeError::Config(format!(
                        "WORKER_CONCURRENCY must be a positive integer, got {raw:?}"
                    )))
                }
                Ok(n) => n,
            },
            None => defaults.worker_concurrency,
        };

        let message_deadline = non_empty(&lookup, "MESSAGE_DEADLINE_MS")
            .map(|raw| {
                raw.parse::<u64>().map(Duration::from_millis).map_err(|_| {
                    PrixFixeError::Config(format!(
                        "MESSAGE_DEADLINE_MS must be a number of milliseconds, got {raw:?}"
                    ))
                })
            })
            .transpose()?;

        let log_format = match non_empty(&lookup, "LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(PrixFixeError::Config(format!(
                    "LOG_FORMAT must be \"pretty\" or \"json\", got {other:?}"
                )))
            }
        };

        Ok(Self {
            database_url: non_empty(&lookup, "DATABASE_URL"),
            search_url: non_empty(&lookup, "SEARCH_URL").map(|u| u.trim_end_matches('/').to_string()),
            worker_concurrency,
            message_deadline,
            households_file: non_empty(&lookup, "HOUSEHOLDS_FILE").map(PathBuf::from),
            log_format,
        })
    }

    /// Log the configuration with credentials stripped from URLs.
    pub fn log_redacted(&self) {
        let unset = || "(unset)".to_string();
        let database_url = self.database_url.as_deref().map(redact_url).unwrap_or_else(unset);
        let search_url = self.search_url.as_deref().map(redact_url).unwrap_or_else(unset);
        tracing::info!(
            database_url = %database_url,
            search_url = %search_url,
            worker_concurrency = self.worker_concurrency,
            message_deadline_ms = self.message_deadline.map(|d| d.as_millis() as u64),
            households_file = ?self.households_file,
            log_format = ?self.log_format,
            "Loaded configuration"
        );
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.trim().is_empty())
}

/// Replace the userinfo section of a URL (`user:pass@`) with `***@`.
pub fn redact_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.to_string();
    };
    let rest = &url[scheme_end + 3..];
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => format!("{}***@{}", &url[..scheme_end + 3], &rest[at + 1..]),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, PrixFixeError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.worker_concurrency, 8);
        assert!(config.database_url.is_none());
        assert!(config.search_url.is_none());
        assert!(config.message_deadline.is_none());
        assert!(config.households_file.is_none());
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn values_are_parsed() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/prixfixe"),
            ("SEARCH_URL", "http://search:9200/"),
            ("WORKER_CONCURRENCY", "32"),
            ("MESSAGE_DEADLINE_MS", "1500"),
            ("HOUSEHOLDS_FILE", "/etc/prixfixe/households.json"),
            ("LOG_FORMAT", "json"),
        ])
        .unwrap();
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/prixfixe"));
        assert_eq!(config.search_url.as_deref(), Some("http://search:9200"));
        assert_eq!(config.worker_concurrency, 32);
        assert_eq!(config.message_deadline, Some(Duration::from_millis(1500)));
        assert_eq!(
            config.households_file,
            Some(PathBuf::from("/etc/prixfixe/households.json"))
        );
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn invalid_values_are_config_errors() {
        assert!(matches!(
            load(&[("WORKER_CONCURRENCY", "0")]),
            Err(PrixFixeError::Config(_))
        ));
        assert!(matches!(
            load(&[("WORKER_CONCURRENCY", "many")]),
            Err(PrixFixeError::Config(_))
        ));
        assert!(matches!(
            load(&[("MESSAGE_DEADLINE_MS", "soon")]),
            Err(PrixFixeError::Config(_))
        ));
        assert!(matches!(
            load(&[("LOG_FORMAT", "xml")]),
            Err(PrixFixeError::Config(_))
        ));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = load(&[("DATABASE_URL", "  "), ("WORKER_CONCURRENCY", "")]).unwrap();
        assert!(config.database_url.is_none());
        assert_eq!(config.worker_concurrency, 8);
    }

    #[test]
    fn redact_url_strips_credentials() {
        assert_eq!(
            redact_url("postgres://user:hunter2@db:5432/prixfixe"),
            "postgres://***@db:5432/prixfixe"
        );
        assert_eq!(redact_url("http://search:9200"), "http://search:9200");
        assert_eq!(redact_url("not a url"), "not a url");
    }
}
