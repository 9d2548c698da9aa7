#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `namelog` provides named loggers: callers obtain a [`Logger`] by name
//! from a [`Registry`], attach one [`Sink`], set a severity threshold and
//! emit calls that are forwarded as [`Payload`] values when filtering
//! allows it.
//!
//! # Design
//!
//! A [`Registry`] owns the name to logger table together with a
//! [`GlobalState`] shared by all of its loggers: a global override that
//! enables every logger, and an optional exclusivity holder that silences
//! every other logger. A call at rank `r` emits iff the override is on or
//! the logger is enabled, the logger's threshold is at most `r`, and no
//! other logger holds exclusivity.
//!
//! Independent registries can be built with [`Registry::new`] or
//! [`Registry::with_config`]. The process-wide registry is installed once
//! through [`init`] or [`init_from_env`], or built with defaults on first
//! use of [`registry`], [`create`], [`find`] or [`global`].
//!
//! # Invariants
//!
//! - `create` on a registered name returns the registered logger; options
//!   of later calls are ignored.
//! - At most one logger of a registry holds exclusivity; a second claim
//!   leaves the first holder in place.
//! - Payloads of one logger reach its sink in call order.
//! - The logger named `"global"` exists as soon as the registry does.
//!
//! # Errors
//!
//! Filtering never fails. [`LogError`] is returned by the explicit entry
//! points: [`Registry::require`], [`Logger::try_only`],
//! [`Logger::try_write`], [`Logger::emit`] and configuration parsing.
//!
//! # Examples
//!
//! ```
//! use namelog::{LoggerOptions, MemorySink, Registry, args, levels};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let registry = Registry::new();
//! let sink = Arc::new(MemorySink::new());
//! let a = registry.create("a", LoggerOptions::new().stream(sink.clone()));
//! let b = registry.create("b", LoggerOptions::new().stream(sink.clone()));
//!
//! a.only();
//! b.error(["x"]);
//! a.error(args!["y", 2]);
//!
//! let emitted = sink.take();
//! assert_eq!(emitted.len(), 1);
//! assert_eq!(emitted[0].name, "a");
//! assert_eq!(emitted[0].level, levels::ERROR);
//! assert_eq!(emitted[0].data, json!(["y", 2]));
//! ```

use std::sync::{Arc, OnceLock};

pub mod config;
mod error;
mod global;
pub mod levels;
mod logger;
mod macros;
mod payload;
mod registry;
mod sink;
#[cfg(feature = "subscriber")]
#[cfg_attr(docsrs, doc(cfg(feature = "subscriber")))]
mod tracing_bridge;

pub use config::{Config, Directive};
pub use error::{LogError, LogResult};
pub use global::{GlobalState, Holder};
pub use levels::{Level, LevelSet, Rank};
pub use logger::{Emission, Logger, LoggerId};
pub use payload::{Payload, now_ms};
pub use registry::{GLOBAL, LoggerOptions, Registry};
pub use sink::{ConsoleSink, Format, MemorySink, Sink, WriterSink};
#[cfg(feature = "subscriber")]
pub use tracing_bridge::{NamedLoggerLayer, init_tracing};

/// Re-exported so [`args!`] works without a direct `serde_json` dependency.
pub use serde_json::Value;

static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Install `registry` as the process-wide registry.
///
/// Fails with [`LogError::AlreadyInitialized`] once a process-wide
/// registry exists, including one built lazily by [`registry`].
pub fn init(registry: Registry) -> LogResult<()> {
    REGISTRY
        .set(registry)
        .map_err(|_| LogError::AlreadyInitialized)
}

/// Build the process-wide registry from the environment.
///
/// See [`Config::from_env`] for the variables read.
pub fn init_from_env() -> LogResult<()> {
    let config = Config::from_env()?;
    init(Registry::with_config(LevelSet::default(), &config)?)
}

/// The process-wide registry, built with defaults on first use.
pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

/// [`Registry::create`] on the process-wide registry.
pub fn create(name: &str, options: LoggerOptions) -> Arc<Logger> {
    registry().create(name, options)
}

/// [`Registry::find`] on the process-wide registry.
pub fn find(name: &str) -> Option<Arc<Logger>> {
    registry().find(name)
}

/// The default logger of the process-wide registry.
pub fn global() -> Arc<Logger> {
    registry().global()
}
