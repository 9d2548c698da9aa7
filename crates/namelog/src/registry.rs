//! crates/namelog/src/registry.rs
//! Name to logger table and the context its loggers share.
//!
//! # Invariants
//!
//! - Entries are never removed or replaced: `create` on a registered name
//!   returns the existing logger and ignores the options it was given.
//! - A logger named [`GLOBAL`] exists from construction onwards.
//! - All loggers of one registry share one [`GlobalState`]; loggers of
//!   different registries never see each other's exclusivity or override.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::config::Config;
use crate::error::{LogError, LogResult};
use crate::global::GlobalState;
use crate::levels::{LevelSet, Rank};
use crate::logger::{Logger, LoggerId};
use crate::sink::{ConsoleSink, Sink};

/// Name of the default logger every registry carries.
pub const GLOBAL: &str = "global";

/// State shared by a registry and each of its loggers.
#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) levels: LevelSet,
    pub(crate) global: GlobalState,
}

#[derive(Clone, Default)]
enum StreamChoice {
    #[default]
    Default,
    Attach(Arc<dyn Sink>),
    Detached,
}

/// Options applied when `create` registers a new logger.
///
/// Unset fields fall back to the registry defaults: enabled per
/// [`Config::default_enabled`], threshold from a matching directive or the
/// configured default level, and a [`ConsoleSink`].
#[derive(Clone, Default)]
pub struct LoggerOptions {
    enabled: Option<bool>,
    level: Option<Rank>,
    stream: StreamChoice,
}

impl LoggerOptions {
    /// Options with every field left to the registry defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial value of the logger's own enabled flag.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Initial threshold rank.
    #[must_use]
    pub fn level(mut self, rank: Rank) -> Self {
        self.level = Some(rank);
        self
    }

    /// Sink to attach.
    #[must_use]
    pub fn stream(mut self, stream: Arc<dyn Sink>) -> Self {
        self.stream = StreamChoice::Attach(stream);
        self
    }

    /// Start with no sink attached.
    #[must_use]
    pub fn detached(mut self) -> Self {
        self.stream = StreamChoice::Detached;
        self
    }
}

impl fmt::Debug for LoggerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stream = match self.stream {
            StreamChoice::Default => "default",
            StreamChoice::Attach(_) => "attached",
            StreamChoice::Detached => "detached",
        };
        f.debug_struct("LoggerOptions")
            .field("enabled", &self.enabled)
            .field("level", &self.level)
            .field("stream", &stream)
            .finish()
    }
}

/// Registry of named loggers.
///
/// ```
/// use namelog::{LoggerOptions, Registry};
///
/// let registry = Registry::new();
/// let first = registry.create("svc", LoggerOptions::new().level(2));
/// let second = registry.create("svc", LoggerOptions::new().level(3));
///
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// assert_eq!(second.threshold(), 2);
/// assert!(registry.find("missing").is_none());
/// ```
pub struct Registry {
    shared: Arc<Shared>,
    loggers: DashMap<String, Arc<Logger>>,
    next_id: AtomicU64,
    default_enabled: bool,
    default_level: Rank,
    directives: HashMap<String, Rank>,
    console: ConsoleSink,
}

impl Registry {
    /// Registry over the default level set and default configuration.
    pub fn new() -> Self {
        let levels = LevelSet::default();
        let default_level = levels.lowest();
        Self::assemble(
            levels,
            &Config::default(),
            default_level,
            HashMap::new(),
        )
    }

    /// Registry over `levels`, configured by `config`.
    ///
    /// Every level named by the configuration must exist in `levels`;
    /// otherwise construction fails with [`LogError::InvalidLevel`].
    pub fn with_config(levels: LevelSet, config: &Config) -> LogResult<Self> {
        let default_level = match &config.default_level {
            Some(token) => levels.resolve(token)?,
            None => levels.lowest(),
        };
        let directives = config
            .directives
            .iter()
            .map(|directive| Ok((directive.name.clone(), levels.resolve(&directive.level)?)))
            .collect::<LogResult<HashMap<_, _>>>()?;

        Ok(Self::assemble(levels, config, default_level, directives))
    }

    fn assemble(
        levels: LevelSet,
        config: &Config,
        default_level: Rank,
        directives: HashMap<String, Rank>,
    ) -> Self {
        let console = ConsoleSink::with_levels(levels.clone()).with_format(config.format);
        let registry = Self {
            shared: Arc::new(Shared {
                levels,
                global: GlobalState::new(config.enabled_all),
            }),
            loggers: DashMap::new(),
            next_id: AtomicU64::new(1),
            default_enabled: config.default_enabled,
            default_level,
            directives,
            console,
        };
        registry.create(GLOBAL, LoggerOptions::new());
        registry
    }

    /// Return the logger registered under `name`, registering a new one
    /// built from `options` on a miss.
    ///
    /// Options are ignored when the name is already taken.
    pub fn create(&self, name: &str, options: LoggerOptions) -> Arc<Logger> {
        if let Some(existing) = self.loggers.get(name) {
            return Arc::clone(existing.value());
        }

        // The entry lock makes concurrent creates of one name agree.
        let entry = self
            .loggers
            .entry(name.to_owned())
            .or_insert_with(|| self.build(name, options));
        Arc::clone(entry.value())
    }

    fn build(&self, name: &str, options: LoggerOptions) -> Arc<Logger> {
        let id = LoggerId::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed));
        let enabled = options.enabled.unwrap_or(self.default_enabled);
        let threshold = options
            .level
            .or_else(|| self.directives.get(name).copied())
            .unwrap_or(self.default_level);
        let stream: Option<Arc<dyn Sink>> = match options.stream {
            StreamChoice::Default => Some(Arc::new(self.console.clone())),
            StreamChoice::Attach(stream) => Some(stream),
            StreamChoice::Detached => None,
        };

        tracing::debug!(
            target: "namelog::registry",
            logger = name,
            %id,
            enabled,
            threshold,
            "logger created"
        );
        Arc::new(Logger::new(
            id,
            name.to_owned(),
            Arc::clone(&self.shared),
            enabled,
            threshold,
            stream,
        ))
    }

    /// Logger registered under `name`. A miss is a normal outcome.
    pub fn find(&self, name: &str) -> Option<Arc<Logger>> {
        self.loggers.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Like [`find`](Self::find) but reports a miss as [`LogError::NotFound`].
    pub fn require(&self, name: &str) -> LogResult<Arc<Logger>> {
        self.find(name)
            .ok_or_else(|| LogError::NotFound(name.to_owned()))
    }

    /// The default logger named [`GLOBAL`].
    pub fn global(&self) -> Arc<Logger> {
        self.create(GLOBAL, LoggerOptions::new())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.loggers.iter().map(|entry| entry.key().clone()).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered loggers, the default one included.
    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    /// Always `false`: the default logger is registered at construction.
    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }

    /// Level set loggers of this registry filter against.
    pub fn levels(&self) -> &LevelSet {
        &self.shared.levels
    }

    /// Enablement state shared by this registry's loggers.
    pub fn state(&self) -> &GlobalState {
        &self.shared.global
    }

    /// Threshold applied when neither options nor a directive set one.
    pub fn default_level(&self) -> Rank {
        self.default_level
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("names", &self.names())
            .field("levels", &self.shared.levels)
            .field("state", &self.shared.global)
            .field("default_level", &self.default_level)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Directive;
    use crate::levels::{ERROR, INFO, Level, WARN};
    use crate::sink::MemorySink;

    #[test]
    fn global_logger_exists_from_construction() {
        let registry = Registry::new();
        assert_eq!(registry.len(), 1);
        let global = registry.find(GLOBAL).expect("global registered");
        assert!(Arc::ptr_eq(&global, &registry.global()));
        assert_eq!(global.name(), GLOBAL);
    }

    #[test]
    fn create_is_idempotent_and_first_writer_wins() {
        let registry = Registry::new();
        let first = registry.create("svc", LoggerOptions::new().level(WARN).enabled(false));
        let second = registry.create("svc", LoggerOptions::new().level(ERROR).enabled(true));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.threshold(), WARN);
        assert!(!second.is_enabled_locally());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn defaults_apply_when_options_are_empty() {
        let registry = Registry::new();
        let logger = registry.create("plain", LoggerOptions::new());
        assert!(logger.is_enabled_locally());
        assert_eq!(logger.threshold(), INFO);
        assert!(logger.has_stream());
    }

    #[test]
    fn detached_option_leaves_no_sink() {
        let registry = Registry::new();
        let logger = registry.create("quiet", LoggerOptions::new().detached());
        assert!(!logger.has_stream());
    }

    #[test]
    fn find_and_require() {
        let registry = Registry::new();
        assert!(registry.find("svc").is_none());
        assert_eq!(
            registry.require("svc").unwrap_err(),
            LogError::NotFound("svc".to_owned())
        );

        let created = registry.create("svc", LoggerOptions::new());
        assert!(Arc::ptr_eq(&registry.require("svc").unwrap(), &created));
    }

    #[test]
    fn ids_are_unique() {
        let registry = Registry::new();
        let a = registry.create("a", LoggerOptions::new());
        let b = registry.create("b", LoggerOptions::new());
        assert_ne!(a.id(), b.id());
        assert_ne!(a.id(), registry.global().id());
    }

    #[test]
    fn names_are_sorted() {
        let registry = Registry::new();
        registry.create("zeta", LoggerOptions::new());
        registry.create("alpha", LoggerOptions::new());
        assert_eq!(registry.names(), ["alpha", "global", "zeta"]);
    }

    #[test]
    fn config_drives_defaults_and_directives() {
        let config = Config {
            default_enabled: false,
            enabled_all: true,
            default_level: Some("warn".to_owned()),
            directives: vec![Directive::new("db", "error")],
            ..Config::default()
        };
        let registry = Registry::with_config(LevelSet::default(), &config).unwrap();

        assert!(registry.state().enabled_all());
        assert_eq!(registry.default_level(), WARN);

        let db = registry.create("db", LoggerOptions::new());
        assert_eq!(db.threshold(), ERROR);
        assert!(!db.is_enabled_locally());

        let explicit = registry.create("explicit-db", LoggerOptions::new().level(INFO));
        assert_eq!(explicit.threshold(), INFO);

        let other = registry.create("other", LoggerOptions::new());
        assert_eq!(other.threshold(), WARN);
    }

    #[test]
    fn unknown_configured_level_is_fatal() {
        let config = Config {
            default_level: Some("verbose".to_owned()),
            ..Config::default()
        };
        let err = Registry::with_config(LevelSet::default(), &config).unwrap_err();
        assert!(matches!(err, LogError::InvalidLevel(_)));

        let config = Config {
            directives: vec![Directive::new("db", "loud")],
            ..Config::default()
        };
        assert!(Registry::with_config(LevelSet::default(), &config).is_err());
    }

    #[test]
    fn custom_levels_set_default_threshold() {
        let levels = LevelSet::new([Level::new("debug", 0), Level::new("fatal", 9)]).unwrap();
        let registry = Registry::with_config(levels, &Config::default()).unwrap();
        assert_eq!(registry.global().threshold(), 0);
    }

    #[test]
    fn registries_do_not_share_state() {
        let left = Registry::new();
        let right = Registry::new();
        let sink = Arc::new(MemorySink::new());

        left.create("a", LoggerOptions::new()).only();
        let b = right.create("b", LoggerOptions::new().stream(sink.clone()));
        b.error(["still here"]);

        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn concurrent_create_agrees_on_one_instance() {
        let registry = Arc::new(Registry::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    registry.create("shared", LoggerOptions::new().level(i))
                })
            })
            .collect();

        let loggers: Vec<Arc<Logger>> = handles
            .into_iter()
            .map(|handle| handle.join().expect("thread"))
            .collect();
        assert!(loggers.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
        assert_eq!(registry.len(), 2);
    }
}
