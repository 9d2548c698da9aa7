//! crates/namelog/src/logger.rs
//! Named logger: local enablement, threshold and sink, filtered against the
//! registry-wide [`GlobalState`](crate::GlobalState).
//!
//! # Filtering
//!
//! A call at rank `r` emits iff
//!
//! - the global override is on **or** the logger is enabled, and
//! - the logger's threshold is `<= r`, and
//! - no logger holds exclusivity, or this logger holds it.
//!
//! Filtered calls are silent no-ops. The `try_*` variants report the
//! outcome explicitly.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{LogError, LogResult};
use crate::levels::{LevelSet, Rank};
use crate::payload::Payload;
use crate::registry::Shared;
use crate::sink::Sink;

/// Registry-unique logger identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LoggerId(u64);

impl LoggerId {
    pub(crate) const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw identifier value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LoggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of [`Logger::try_write`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emission {
    /// The payload was delivered to the sink.
    Emitted,
    /// Filtering suppressed the call.
    Filtered,
}

struct LoggerState {
    enabled: bool,
    threshold: Rank,
    stream: Option<Arc<dyn Sink>>,
}

/// Named logger handed out by a [`Registry`](crate::Registry).
///
/// Mutators return `&Self` so calls chain:
///
/// ```
/// use namelog::{LoggerOptions, MemorySink, Registry, levels};
/// use std::sync::Arc;
///
/// let registry = Registry::new();
/// let sink = Arc::new(MemorySink::new());
/// let svc = registry.create("svc", LoggerOptions::new().level(levels::WARN).stream(sink.clone()));
///
/// svc.log(["a"]).warn(["b"]).error(["c"]);
///
/// let ranks: Vec<u32> = sink.take().iter().map(|p| p.level).collect();
/// assert_eq!(ranks, [levels::WARN, levels::ERROR]);
/// ```
pub struct Logger {
    id: LoggerId,
    name: String,
    state: Mutex<LoggerState>,
    shared: Arc<Shared>,
}

impl Logger {
    pub(crate) fn new(
        id: LoggerId,
        name: String,
        shared: Arc<Shared>,
        enabled: bool,
        threshold: Rank,
        stream: Option<Arc<dyn Sink>>,
    ) -> Self {
        Self {
            id,
            name,
            state: Mutex::new(LoggerState {
                enabled,
                threshold,
                stream,
            }),
            shared,
        }
    }

    /// Name the logger is registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registry-unique identifier.
    pub fn id(&self) -> LoggerId {
        self.id
    }

    /// Current threshold rank.
    pub fn threshold(&self) -> Rank {
        self.lock_state().threshold
    }

    /// The logger's own enabled flag, ignoring global state.
    pub fn is_enabled_locally(&self) -> bool {
        self.lock_state().enabled
    }

    /// Whether a sink is attached.
    pub fn has_stream(&self) -> bool {
        self.lock_state().stream.is_some()
    }

    /// The attached sink.
    pub fn stream(&self) -> Option<Arc<dyn Sink>> {
        self.lock_state().stream.clone()
    }

    /// Level set of the owning registry.
    pub fn levels(&self) -> &LevelSet {
        &self.shared.levels
    }

    /// Whether a call at `rank` would emit right now.
    pub fn is_enabled(&self, rank: Rank) -> bool {
        let global = &self.shared.global;
        if !global.permits(self.id) {
            return false;
        }
        let state = self.lock_state();
        (global.enabled_all() || state.enabled) && state.threshold <= rank
    }

    /// Attach `stream`, replacing the current sink, and return `stream`.
    ///
    /// The outgoing sink is notified through [`Sink::pipe`] before the
    /// switch; `stream` is installed whatever that call returns. Piping the
    /// sink that is already attached changes nothing.
    ///
    /// Calls made on the thread that piped never reach the outgoing sink
    /// afterwards. A write racing on another thread may still deliver to it,
    /// since delivery happens outside the logger lock.
    pub fn pipe(&self, stream: Arc<dyn Sink>) -> Arc<dyn Sink> {
        // Hand off outside the lock so the outgoing sink may still log.
        if let Some(current) = self.stream() {
            if same_sink(&current, &stream) {
                return stream;
            }
            let _ = current.pipe(Arc::clone(&stream));
        }
        self.lock_state().stream = Some(Arc::clone(&stream));
        stream
    }

    /// Detach and return the current sink. Later writes are no-ops.
    pub fn unpipe(&self) -> Option<Arc<dyn Sink>> {
        self.lock_state().stream.take()
    }

    /// Emit `data` unchanged at `rank` when filtering allows it.
    pub fn write(&self, rank: Rank, data: impl Into<Value>) -> &Self {
        let _ = self.dispatch(rank, || data.into());
        self
    }

    /// Like [`write`](Self::write) but reports the outcome.
    pub fn try_write(&self, rank: Rank, data: impl Into<Value>) -> LogResult<Emission> {
        self.dispatch(rank, || data.into())
    }

    /// Emit `data` at the lowest configured rank.
    pub fn log_data(&self, data: impl Into<Value>) -> &Self {
        self.write(self.shared.levels.lowest(), data)
    }

    /// Emit `args` as an ordered JSON array at `rank`.
    pub fn at<I>(&self, rank: Rank, args: I) -> &Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let _ = self.dispatch(rank, || collect_args(args));
        self
    }

    /// Emit `args` at the level called `level`.
    pub fn emit<I>(&self, level: &str, args: I) -> LogResult<&Self>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let rank = self.shared.levels.rank_of(level)?;
        Ok(self.at(rank, args))
    }

    /// Emit `args` at `info`.
    pub fn info<I>(&self, args: I) -> &Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.named("info", args)
    }

    /// Emit `args` at `log`.
    pub fn log<I>(&self, args: I) -> &Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.named("log", args)
    }

    /// Emit `args` at `warn`.
    pub fn warn<I>(&self, args: I) -> &Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.named("warn", args)
    }

    /// Emit `args` at `error`.
    pub fn error<I>(&self, args: I) -> &Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.named("error", args)
    }

    /// Turn the logger's own flag on.
    pub fn enable(&self) -> &Self {
        self.lock_state().enabled = true;
        self
    }

    /// Turn the logger's own flag off.
    pub fn disable(&self) -> &Self {
        self.lock_state().enabled = false;
        self
    }

    /// Claim exclusivity unless another logger already holds it.
    pub fn only(&self) -> &Self {
        let _ = self.try_only();
        self
    }

    /// Claim exclusivity, reporting [`LogError::ExclusivityDenied`] when
    /// another logger holds it.
    pub fn try_only(&self) -> LogResult<&Self> {
        match self.shared.global.claim(self.id, &self.name) {
            Ok(()) => {
                tracing::debug!(target: "namelog::global", logger = %self.name, "exclusivity claimed");
                Ok(self)
            }
            Err(error) => {
                tracing::debug!(target: "namelog::global", logger = %self.name, %error, "exclusivity denied");
                Err(error)
            }
        }
    }

    /// Clear exclusivity, whoever holds it.
    pub fn all(&self) -> &Self {
        if let Some(previous) = self.shared.global.release() {
            tracing::debug!(
                target: "namelog::global",
                logger = %self.name,
                holder = %previous.name,
                "exclusivity cleared"
            );
        }
        self
    }

    /// Turn the global override on: every logger emits regardless of its own flag.
    pub fn enable_all(&self) -> &Self {
        self.shared.global.set_enabled_all(true);
        self
    }

    /// Turn the global override off.
    pub fn disable_all(&self) -> &Self {
        self.shared.global.set_enabled_all(false);
        self
    }

    /// Set the threshold rank.
    pub fn level(&self, rank: Rank) -> &Self {
        self.lock_state().threshold = rank;
        self
    }

    /// Set the threshold by level name.
    pub fn set_level(&self, level: &str) -> LogResult<&Self> {
        let rank = self.shared.levels.rank_of(level)?;
        Ok(self.level(rank))
    }

    fn named<I>(&self, level: &str, args: I) -> &Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        match self.shared.levels.rank_of(level) {
            Ok(rank) => self.at(rank, args),
            Err(_) => {
                tracing::trace!(target: "namelog::logger", logger = %self.name, level, "level not configured");
                self
            }
        }
    }

    fn dispatch(&self, rank: Rank, data: impl FnOnce() -> Value) -> LogResult<Emission> {
        if !self.is_enabled(rank) {
            tracing::trace!(target: "namelog::logger", logger = %self.name, rank, "suppressed");
            return Ok(Emission::Filtered);
        }

        // Deliver outside the lock so a sink may log through this logger.
        let Some(stream) = self.stream() else {
            tracing::trace!(target: "namelog::logger", logger = %self.name, rank, "no sink attached");
            return Err(LogError::SinkUnavailable(self.name.clone()));
        };
        stream.write(&Payload::new(rank, self.name.as_str(), data()));
        Ok(Emission::Emitted)
    }

    fn lock_state(&self) -> MutexGuard<'_, LoggerState> {
        self.state
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock_state();
        f.debug_struct("Logger")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("enabled", &state.enabled)
            .field("threshold", &state.threshold)
            .field("has_stream", &state.stream.is_some())
            .finish()
    }
}

fn collect_args<I>(args: I) -> Value
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    Value::Array(args.into_iter().map(Into::into).collect())
}

// Compare data pointers only; vtable pointers may differ across codegen units.
fn same_sink(a: &Arc<dyn Sink>, b: &Arc<dyn Sink>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
