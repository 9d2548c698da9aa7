//! crates/namelog/src/config.rs
//! Registry configuration: defaults for new loggers and per-name directives.
//!
//! Directives use a `RUST_LOG`-like grammar: comma separated tokens where a
//! bare token (`warn`, `2`) sets the default threshold and `name=level`
//! sets the initial threshold of one logger. Level names are checked
//! against a level set only when a [`Registry`](crate::Registry) is built.

use std::env;

use serde::{Deserialize, Serialize};

use crate::error::{LogError, LogResult};
use crate::sink::Format;

/// Environment variable holding directives.
pub const ENV_DIRECTIVES: &str = "NAMELOG";
/// Environment variable switching the global override on.
pub const ENV_ENABLE_ALL: &str = "NAMELOG_ALL";
/// Environment variable selecting the console format.
pub const ENV_FORMAT: &str = "NAMELOG_FORMAT";

/// Initial threshold for one logger name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    /// Logger name the directive applies to.
    pub name: String,
    /// Level name or decimal rank.
    pub level: String,
}

impl Directive {
    /// Create a directive.
    pub fn new(name: impl Into<String>, level: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: level.into(),
        }
    }
}

/// Registry configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Own enabled flag of loggers created without an explicit value.
    pub default_enabled: bool,
    /// Initial state of the global override.
    pub enabled_all: bool,
    /// Default threshold as a level name or rank. `None` means the lowest rank.
    pub default_level: Option<String>,
    /// Per-name initial thresholds.
    pub directives: Vec<Directive>,
    /// Rendering of the default console sink.
    pub format: Format,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_enabled: true,
            enabled_all: false,
            default_level: None,
            directives: Vec::new(),
            format: Format::Text,
        }
    }
}

impl Config {
    /// Configuration read from [`ENV_DIRECTIVES`], [`ENV_ENABLE_ALL`] and
    /// [`ENV_FORMAT`]. Unset variables keep their defaults.
    pub fn from_env() -> LogResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> LogResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(spec) = lookup(ENV_DIRECTIVES) {
            config.apply_directives(&spec)?;
        }
        if let Some(flag) = lookup(ENV_ENABLE_ALL) {
            config.enabled_all = parse_bool(&flag)?;
        }
        if let Some(format) = lookup(ENV_FORMAT) {
            config.format = format.parse()?;
        }
        Ok(config)
    }

    /// Apply a comma separated directive list.
    pub fn apply_directives(&mut self, spec: &str) -> LogResult<()> {
        spec.split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .try_for_each(|token| self.apply_directive(token))
    }

    /// Apply one directive token (`warn`, `3`, `db=error`).
    pub fn apply_directive(&mut self, token: &str) -> LogResult<()> {
        match parse_directive(token)? {
            (None, level) => self.default_level = Some(level.to_owned()),
            (Some(name), level) => {
                // Later directives for one name override earlier ones.
                self.directives.retain(|directive| directive.name != name);
                self.directives.push(Directive::new(name, level));
            }
        }
        Ok(())
    }
}

/// Split a token like "db=error" into (Some("db"), "error") or "warn" into (None, "warn").
fn parse_directive(token: &str) -> LogResult<(Option<&str>, &str)> {
    let token = token.trim();
    if token.is_empty() {
        return Err(LogError::InvalidDirective("empty directive".to_owned()));
    }

    match token.split_once('=') {
        Some((name, level)) => {
            let (name, level) = (name.trim(), level.trim());
            if name.is_empty() || level.is_empty() || level.contains('=') {
                return Err(LogError::InvalidDirective(token.to_owned()));
            }
            Ok((Some(name), level))
        }
        None => Ok((None, token)),
    }
}

fn parse_bool(value: &str) -> LogResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(LogError::InvalidDirective(format!("not a boolean: {other}"))),
    }
}
