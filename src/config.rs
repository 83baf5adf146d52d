//! Engine configuration.
//!
//! Loaded from a YAML file. A missing file yields the defaults, so the
//! engine runs with zero configuration. `${VAR}` references are expanded
//! from the environment before parsing, with `${VAR:-default}` fallback
//! syntax and `$$` as an escaped `$`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("environment variable '{0}' is not set")]
    MissingEnvVar(String),

    #[error("unclosed variable reference '${{' (missing '}}')")]
    UnclosedVarReference,
}

/// An authentication method advertised by `initialize`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthMethodConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory holding one snapshot file per session.
    pub sessions_dir: PathBuf,
    /// Number of most recent history messages passed to the model.
    pub history_window: usize,
    /// Per tool execution timeout in seconds; absent means unbounded.
    pub tool_timeout_secs: Option<u64>,
    /// Permission wait timeout in seconds; absent means wait forever.
    pub permission_timeout_secs: Option<u64>,
    /// Authentication methods accepted by `authenticate`. Empty means
    /// authentication is not required.
    pub auth_methods: Vec<AuthMethodConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sessions_dir: PathBuf::from("sessions"),
            history_window: 40,
            tool_timeout_secs: None,
            permission_timeout_secs: None,
            auth_methods: Vec::new(),
        }
    }
}

impl EngineConfig {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        let expanded = expand_env_vars(&contents)?;
        Ok(serde_yaml::from_str(&expanded)?)
    }

    pub fn tool_timeout(&self) -> Option<Duration> {
        self.tool_timeout_secs.map(Duration::from_secs)
    }

    pub fn permission_timeout(&self) -> Option<Duration> {
        self.permission_timeout_secs.map(Duration::from_secs)
    }
}

/// Expand `${VAR}` and `${VAR:-default}` references; `$$` escapes `$`.
///
/// No nested expansion. An unset variable without a default is an error,
/// as is an unclosed `${`.
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('$') {
        result.push_str(&rest[..pos]);
        rest = &rest[pos + 1..];

        if let Some(tail) = rest.strip_prefix('$') {
            result.push('$');
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix('{') {
            let end = tail.find('}').ok_or(ConfigError::UnclosedVarReference)?;
            let reference = &tail[..end];
            let (name, default) = match reference.split_once(":-") {
                Some((name, default)) => (name, Some(default)),
                None => (reference, None),
            };
            match std::env::var(name) {
                Ok(value) => result.push_str(&value),
                Err(_) => match default {
                    Some(default) => result.push_str(default),
                    None => return Err(ConfigError::MissingEnvVar(name.to_string())),
                },
            }
            rest = &tail[end + 1..];
        } else {
            result.push('$');
        }
    }
    result.push_str(rest);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.sessions_dir, PathBuf::from("sessions"));
        assert_eq!(config.history_window, 40);
        assert!(config.tool_timeout().is_none());
        assert!(config.permission_timeout().is_none());
        assert!(config.auth_methods.is_empty());
    }

    #[tokio::test]
    async fn missing_file_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.yaml");
        let config = EngineConfig::load(&missing).await.unwrap();
        assert_eq!(config.history_window, 40);
    }

    #[tokio::test]
    async fn partial_yaml_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
sessions_dir: "/var/lib/tether/sessions"
tool_timeout_secs: 30
"#
        )
        .unwrap();

        let config = EngineConfig::load(file.path()).await.unwrap();
        assert_eq!(
            config.sessions_dir,
            PathBuf::from("/var/lib/tether/sessions")
        );
        assert_eq!(config.tool_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.history_window, 40);
    }

    #[tokio::test]
    async fn auth_methods_parse() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
auth_methods:
  - id: api_key
    name: "API key"
    description: "Static API key"
  - id: none
    name: "No authentication"
"#
        )
        .unwrap();

        let config = EngineConfig::load(file.path()).await.unwrap();
        assert_eq!(config.auth_methods.len(), 2);
        assert_eq!(config.auth_methods[0].id, "api_key");
        assert!(config.auth_methods[1].description.is_none());
    }

    #[tokio::test]
    async fn invalid_yaml_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "history_window: [not a number").unwrap();
        assert!(EngineConfig::load(file.path()).await.is_err());
    }

    #[test]
    fn expand_required_var() {
        // SAFETY: Single-threaded test
        unsafe { std::env::set_var("TETHER_TEST_DIR", "/data") };
        let result = expand_env_vars("sessions_dir: ${TETHER_TEST_DIR}/sessions").unwrap();
        assert_eq!(result, "sessions_dir: /data/sessions");
        unsafe { std::env::remove_var("TETHER_TEST_DIR") };
    }

    #[test]
    fn expand_missing_var_errors() {
        // SAFETY: Single-threaded test
        unsafe { std::env::remove_var("TETHER_TEST_MISSING") };
        match expand_env_vars("dir: ${TETHER_TEST_MISSING}") {
            Err(ConfigError::MissingEnvVar(name)) => assert_eq!(name, "TETHER_TEST_MISSING"),
            other => panic!("expected MissingEnvVar, got {other:?}"),
        }
    }

    #[test]
    fn expand_default_and_escape() {
        // SAFETY: Single-threaded test
        unsafe { std::env::remove_var("TETHER_TEST_UNSET") };
        let result = expand_env_vars("a: ${TETHER_TEST_UNSET:-fallback} b: $$5 c: $5").unwrap();
        assert_eq!(result, "a: fallback b: $5 c: $5");
    }

    #[test]
    fn expand_unclosed_reference_errors() {
        assert!(matches!(
            expand_env_vars("dir: ${UNCLOSED"),
            Err(ConfigError::UnclosedVarReference)
        ));
    }
}
