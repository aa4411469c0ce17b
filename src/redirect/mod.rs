//! Redirect destinations.
//!
//! A [`Redirector`] owns the default destination and the ordered rule list.
//! Everything is compiled and rendered once at startup and only read
//! afterwards, so the event loop can hand out precomputed response bytes.

pub mod pattern;

use bytes::Bytes;
use regex::bytes::Regex;

use crate::config::{Config, RuleConfig};
use crate::error::SetupError;
use crate::http::request::RequestHead;
use crate::http::response::Response;
use crate::http::writer::serialize_response;

/// A redirect target with its 301 response already on the wire format.
#[derive(Debug, Clone)]
pub struct Destination {
    location: String,
    response: Bytes,
}

impl Destination {
    pub fn new(location: impl Into<String>) -> Self {
        let location = location.into();
        let response = serialize_response(&Response::redirect(location.clone()));
        Self { location, response }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Full response bytes. Cloning is a reference count bump.
    pub fn response(&self) -> Bytes {
        self.response.clone()
    }
}

/// A compiled `(pattern, destination)` pair.
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: String,
    regex: Regex,
    destination: Destination,
}

impl Rule {
    pub fn compile(config: &RuleConfig) -> Result<Self, SetupError> {
        let regex = pattern::compile(&config.pattern, config.syntax).map_err(|source| {
            SetupError::Pattern {
                pattern: config.pattern.clone(),
                source,
            }
        })?;

        Ok(Self {
            pattern: config.pattern.clone(),
            regex,
            destination: Destination::new(config.destination.clone()),
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn matches(&self, routing_key: &[u8]) -> bool {
        self.regex.is_match(routing_key)
    }
}

#[derive(Debug, Clone)]
pub struct Redirector {
    rules: Vec<Rule>,
    default: Destination,
}

impl Redirector {
    /// Redirects everything to one place; no matching at all.
    pub fn fixed(destination: impl Into<String>) -> Self {
        Self {
            rules: Vec::new(),
            default: Destination::new(destination),
        }
    }

    pub fn new(rules: Vec<Rule>, default: impl Into<String>) -> Self {
        Self {
            rules,
            default: Destination::new(default),
        }
    }

    /// Compiles every rule of `config`, failing on the first bad pattern.
    pub fn from_config(config: &Config) -> Result<Self, SetupError> {
        let rules = config
            .rules
            .iter()
            .map(Rule::compile)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(rules, config.default_destination.clone()))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn default_destination(&self) -> &Destination {
        &self.default
    }

    pub fn is_routing(&self) -> bool {
        !self.rules.is_empty()
    }

    /// First rule matching `routing_key`, in configuration order, or the
    /// default.
    pub fn route(&self, routing_key: &[u8]) -> &Destination {
        self.rules
            .iter()
            .find(|rule| rule.matches(routing_key))
            .map(Rule::destination)
            .unwrap_or(&self.default)
    }

    /// Destination for a finished request. Requests without a head (boundary
    /// mode) and redirectors without rules go straight to the default.
    pub fn resolve(&self, head: Option<&RequestHead>) -> &Destination {
        match head {
            Some(head) if self.is_routing() => self.route(&head.routing_key()),
            _ => &self.default,
        }
    }
}
