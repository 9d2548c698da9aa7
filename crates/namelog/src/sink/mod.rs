//! crates/namelog/src/sink/mod.rs
//! Sink capability consumed by loggers, plus the bundled implementations.
//!
//! A logger owns at most one sink. Every emitted call hands the sink a
//! borrowed [`Payload`]; sinks deliver synchronously, so payloads from one
//! logger arrive in call order.

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LogError;
use crate::levels::LevelSet;
use crate::payload::Payload;

mod console;
mod memory;
mod writer;

pub use console::ConsoleSink;
pub use memory::MemorySink;
pub use writer::WriterSink;

/// Consumer of emitted payloads.
pub trait Sink: Send + Sync {
    /// Deliver one payload.
    fn write(&self, payload: &Payload);

    /// Hand off to `next`, which replaces this sink on the logger.
    ///
    /// Called on the outgoing sink; the logger installs `next` regardless
    /// of the returned handle. The default flushes so nothing written
    /// before the switch is left buffered, then returns `next`.
    fn pipe(&self, next: Arc<dyn Sink>) -> Arc<dyn Sink> {
        self.flush();
        next
    }

    /// Flush buffered output.
    fn flush(&self) {}
}

impl<F> Sink for F
where
    F: Fn(&Payload) + Send + Sync,
{
    fn write(&self, payload: &Payload) {
        self(payload);
    }
}

/// Rendering used by text-oriented sinks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// `<timestamp> <level> [<name>] <args...>`
    #[default]
    Text,
    /// One JSON object per payload.
    Json,
}

impl FromStr for Format {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(LogError::InvalidDirective(format!("unknown format: {other}"))),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Json => "json",
        })
    }
}

/// Render `payload` into `writer`.
pub(crate) fn render<W: Write + ?Sized>(
    writer: &mut W,
    payload: &Payload,
    levels: &LevelSet,
    format: Format,
    newline: bool,
) -> io::Result<()> {
    match format {
        Format::Json => serde_json::to_writer(&mut *writer, payload).map_err(io::Error::from)?,
        Format::Text => {
            write!(writer, "{} ", payload.timestamp)?;
            match levels.name_of(payload.level) {
                Some(name) => write!(writer, "{name}")?,
                None => write!(writer, "level{}", payload.level)?,
            }
            write!(writer, " [{}]", payload.name)?;
            match &payload.data {
                Value::Array(args) => {
                    for arg in args {
                        writer.write_all(b" ")?;
                        write_text_value(writer, arg)?;
                    }
                }
                other => {
                    writer.write_all(b" ")?;
                    write_text_value(writer, other)?;
                }
            }
        }
    }

    if newline {
        writer.write_all(b"\n")?;
    }
    Ok(())
}

// Strings print bare; everything else prints as JSON.
fn write_text_value<W: Write + ?Sized>(writer: &mut W, value: &Value) -> io::Result<()> {
    match value {
        Value::String(text) => writer.write_all(text.as_bytes()),
        other => write!(writer, "{other}"),
    }
}
