//! crates/namelog/src/tracing_bridge.rs
//! Bridge from the tracing crate into named loggers.
//!
//! [`NamedLoggerLayer`] is a tracing-subscriber layer that turns each event
//! into a call on the registry logger named after the event's target, so
//! code instrumented with `tracing` macros goes through the same
//! enablement, threshold and exclusivity rules as direct logger calls.
//!
//! # Mapping
//!
//! - `ERROR`, `WARN` and `INFO` map to the `error`, `warn` and `info`
//!   levels of the registry; `DEBUG` and `TRACE` are dropped.
//! - The event message becomes the first argument. Remaining fields, if
//!   any, follow as one JSON object.
//! - Events under the crate's own `namelog` targets are ignored.
//!
//! # Usage
//!
//! ```rust,ignore
//! use namelog::init_tracing;
//!
//! init_tracing().expect("no other subscriber installed");
//! tracing::warn!(target: "svc", "disk almost full");
//! ```

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::TryInitError;

use crate::registry::{LoggerOptions, Registry};

const OWN_TARGET: &str = "namelog";

enum RegistryRef {
    Process,
    Owned(Arc<Registry>),
}

/// A tracing layer that forwards events to named loggers.
pub struct NamedLoggerLayer {
    registry: RegistryRef,
}

impl NamedLoggerLayer {
    /// Layer forwarding into the process-wide registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            registry: RegistryRef::Process,
        }
    }

    /// Layer forwarding into `registry`.
    #[must_use]
    pub fn with_registry(registry: Arc<Registry>) -> Self {
        Self {
            registry: RegistryRef::Owned(registry),
        }
    }

    fn registry(&self) -> &Registry {
        match &self.registry {
            RegistryRef::Process => crate::registry(),
            RegistryRef::Owned(registry) => registry.as_ref(),
        }
    }

    /// Map a tracing level to a level name of the registry.
    const fn level_name(level: &Level) -> Option<&'static str> {
        match *level {
            Level::ERROR => Some("error"),
            Level::WARN => Some("warn"),
            Level::INFO => Some("info"),
            _ => None,
        }
    }

    fn is_own_target(target: &str) -> bool {
        target == OWN_TARGET
            || target
                .strip_prefix(OWN_TARGET)
                .is_some_and(|rest| rest.starts_with("::"))
    }
}

impl Default for NamedLoggerLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Layer<S> for NamedLoggerLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let target = metadata.target();
        if Self::is_own_target(target) {
            return;
        }
        let Some(level) = Self::level_name(metadata.level()) else {
            return;
        };

        let registry = self.registry();
        let Ok(rank) = registry.levels().rank_of(level) else {
            return;
        };
        let logger = registry.create(target, LoggerOptions::new());
        if !logger.is_enabled(rank) {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        logger.at(rank, visitor.into_args());
    }
}

/// Visitor collecting the message and the remaining fields of an event.
#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Map<String, Value>,
}

impl FieldVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = Some(match value {
                Value::String(text) => text,
                other => other.to_string(),
            });
        } else {
            self.fields.insert(field.name().to_owned(), value);
        }
    }

    fn into_args(self) -> Vec<Value> {
        let mut args = Vec::with_capacity(2);
        args.push(Value::String(self.message.unwrap_or_default()));
        if !self.fields.is_empty() {
            args.push(Value::Object(self.fields));
        }
        args
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.insert(field, Value::String(format!("{value:?}")));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::String(value.to_owned()));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }
}

/// Install a global tracing subscriber forwarding into the process-wide registry.
pub fn init_tracing() -> Result<(), TryInitError> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(NamedLoggerLayer::new())
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::{ERROR, INFO, WARN};
    use crate::sink::MemorySink;
    use serde_json::json;
    use tracing_subscriber::layer::SubscriberExt;

    fn capture(registry: &Arc<Registry>, body: impl FnOnce()) {
        let subscriber =
            tracing_subscriber::registry().with(NamedLoggerLayer::with_registry(Arc::clone(registry)));
        tracing::subscriber::with_default(subscriber, body);
    }

    #[test]
    fn level_mapping() {
        assert_eq!(NamedLoggerLayer::level_name(&Level::ERROR), Some("error"));
        assert_eq!(NamedLoggerLayer::level_name(&Level::WARN), Some("warn"));
        assert_eq!(NamedLoggerLayer::level_name(&Level::INFO), Some("info"));
        assert_eq!(NamedLoggerLayer::level_name(&Level::DEBUG), None);
        assert_eq!(NamedLoggerLayer::level_name(&Level::TRACE), None);
    }

    #[test]
    fn own_targets_are_recognized() {
        assert!(NamedLoggerLayer::is_own_target("namelog"));
        assert!(NamedLoggerLayer::is_own_target("namelog::registry"));
        assert!(!NamedLoggerLayer::is_own_target("namelogger"));
        assert!(!NamedLoggerLayer::is_own_target("svc"));
    }

    #[test]
    fn events_reach_the_logger_named_after_the_target() {
        let registry = Arc::new(Registry::new());
        let sink = Arc::new(MemorySink::new());
        registry.create("svc", LoggerOptions::new().stream(sink.clone()));

        capture(&registry, || {
            tracing::info!(target: "svc", "started");
            tracing::warn!(target: "svc", used = 93_u64, "disk");
            tracing::error!(target: "svc", "failed");
            tracing::debug!(target: "svc", "dropped");
        });

        let payloads = sink.take();
        let ranks: Vec<u32> = payloads.iter().map(|p| p.level).collect();
        assert_eq!(ranks, [INFO, WARN, ERROR]);
        assert_eq!(payloads[0].data, json!(["started"]));
        assert_eq!(payloads[1].data, json!(["disk", {"used": 93}]));
    }

    #[test]
    fn filtering_applies_to_bridged_events() {
        let registry = Arc::new(Registry::new());
        let sink = Arc::new(MemorySink::new());
        registry.create("svc", LoggerOptions::new().level(WARN).stream(sink.clone()));
        registry.create("other", LoggerOptions::new().detached()).only();

        capture(&registry, || {
            tracing::error!(target: "svc", "silenced by exclusivity");
        });
        assert!(sink.is_empty());

        registry.global().all();
        capture(&registry, || {
            tracing::info!(target: "svc", "below threshold");
            tracing::error!(target: "svc", "delivered");
        });
        assert_eq!(sink.take().len(), 1);
    }

    #[test]
    fn targets_are_registered_on_first_forwarded_event() {
        let registry = Arc::new(Registry::new());

        capture(&registry, || {
            tracing::debug!(target: "fresh", "dropped before lookup");
        });
        assert!(registry.find("fresh").is_none());

        capture(&registry, || {
            tracing::error!(target: "fresh", "registers the logger");
        });
        let fresh = registry.find("fresh").expect("registered by the bridge");
        assert!(fresh.has_stream());
    }
}
