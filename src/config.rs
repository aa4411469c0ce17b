use std::path::Path;

use serde::Deserialize;

use crate::error::SetupError;

pub const DEFAULT_PORT: &str = "80";
pub const DEFAULT_MAX_CONNECTIONS: usize = 16;
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Smallest per-connection line buffer we accept. Anything shorter cannot
/// hold a realistic request line.
pub const MIN_BUFFER_SIZE: usize = 16;

/// Pattern flavor of a redirect rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Syntax {
    /// POSIX basic regular expressions (`-r`).
    #[default]
    Basic,
    /// POSIX extended regular expressions (`-e`).
    Extended,
}

/// One `(pattern, destination)` pair, before compilation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RuleConfig {
    pub pattern: String,
    #[serde(default)]
    pub syntax: Syntax,
    pub destination: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address to bind; `None` binds the wildcard address.
    pub bind: Option<String>,
    pub port: String,
    #[serde(alias = "destination")]
    pub default_destination: String,
    /// Evaluated in order, first match wins.
    pub rules: Vec<RuleConfig>,
    pub max_connections: usize,
    pub buffer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: None,
            port: DEFAULT_PORT.to_string(),
            default_destination: String::new(),
            rules: Vec::new(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl Config {
    /// Configuration redirecting everything to a single destination.
    pub fn with_destination(destination: impl Into<String>) -> Self {
        Self {
            default_destination: destination.into(),
            ..Self::default()
        }
    }

    pub fn from_yaml_str(source: &str) -> Result<Self, SetupError> {
        serde_yaml::from_str(source).map_err(|e| SetupError::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SetupError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| SetupError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&source)
    }

    pub fn validate(&self) -> Result<(), SetupError> {
        if self.default_destination.is_empty() {
            return Err(SetupError::Config("no destination specified".into()));
        }
        if self.port.is_empty() {
            return Err(SetupError::Config("port must not be empty".into()));
        }
        if self.max_connections == 0 {
            return Err(SetupError::Config(
                "max_connections must be at least 1".into(),
            ));
        }
        if self.buffer_size < MIN_BUFFER_SIZE {
            return Err(SetupError::Config(format!(
                "buffer_size must be at least {}",
                MIN_BUFFER_SIZE
            )));
        }
        if let Some(rule) = self.rules.iter().find(|r| r.destination.is_empty()) {
            return Err(SetupError::Config(format!(
                "missing destination for pattern `{}`",
                rule.pattern
            )));
        }
        Ok(())
    }

    /// Bind address as shown in logs and errors.
    pub fn display_bind(&self) -> &str {
        self.bind.as_deref().unwrap_or("*")
    }
}
