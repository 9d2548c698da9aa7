use std::fmt;
use std::io::Write;
use std::mem;
use std::sync::{Mutex, MutexGuard};

use super::{Format, Sink, render};
use crate::levels::LevelSet;
use crate::payload::Payload;

/// Sink that renders payloads into an [`std::io::Write`] target.
///
/// The writer sits behind a mutex so one sink can serve a logger shared
/// across threads. Write failures are reported through `tracing` and never
/// reach the logging call site.
///
/// # Examples
///
/// ```
/// use namelog::{Format, Payload, Sink, WriterSink};
/// use serde_json::json;
///
/// let sink = WriterSink::new(Vec::new()).with_format(Format::Text);
/// sink.write(&Payload { timestamp: 1, level: 2, name: "svc".into(), data: json!(["b"]) });
///
/// assert_eq!(sink.into_inner(), b"1 warn [svc] b\n".to_vec());
/// ```
pub struct WriterSink<W> {
    writer: Mutex<W>,
    levels: LevelSet,
    format: Format,
    newline: bool,
}

impl<W> WriterSink<W> {
    /// Creates a text sink that appends a newline after each payload.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            levels: LevelSet::default(),
            format: Format::default(),
            newline: true,
        }
    }

    /// Selects the rendering format.
    #[must_use]
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Whether each rendered payload is terminated with a newline.
    #[must_use]
    pub fn with_newline(mut self, newline: bool) -> Self {
        self.newline = newline;
        self
    }

    /// Level names used by text rendering.
    #[must_use]
    pub fn with_levels(mut self, levels: LevelSet) -> Self {
        self.levels = levels;
        self
    }

    /// Returns `true` when payloads end with a newline.
    #[must_use]
    pub const fn appends_newline(&self) -> bool {
        self.newline
    }

    /// Returns the rendering format.
    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Replaces the underlying writer, returning the previous one.
    #[must_use = "the returned writer contains payloads rendered before the replacement"]
    pub fn replace_writer(&self, mut writer: W) -> W {
        mem::swap(&mut *self.lock_writer(), &mut writer);
        writer
    }

    /// Consumes the sink and returns the wrapped writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    fn lock_writer(&self) -> MutexGuard<'_, W> {
        self.writer
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }
}

impl<W> Sink for WriterSink<W>
where
    W: Write + Send,
{
    fn write(&self, payload: &Payload) {
        let mut writer = self.lock_writer();
        if let Err(error) = render(&mut *writer, payload, &self.levels, self.format, self.newline) {
            tracing::warn!(target: "namelog::sink", logger = %payload.name, %error, "sink write failed");
        }
    }

    fn flush(&self) {
        if let Err(error) = self.lock_writer().flush() {
            tracing::warn!(target: "namelog::sink", %error, "sink flush failed");
        }
    }
}

impl<W> fmt::Debug for WriterSink<W>
where
    W: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterSink")
            .field("writer", &*self.lock_writer())
            .field("format", &self.format)
            .field("newline", &self.newline)
            .finish_non_exhaustive()
    }
}
