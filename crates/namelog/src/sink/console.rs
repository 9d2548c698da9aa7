use std::io::{self, Write};

use super::{Format, Sink, render};
use crate::levels::{LevelSet, Rank, WARN};
use crate::payload::Payload;

/// Default sink: low ranks to stdout, `warn` and above to stderr.
#[derive(Clone, Debug)]
pub struct ConsoleSink {
    levels: LevelSet,
    format: Format,
    stderr_from: Rank,
}

impl ConsoleSink {
    /// Console sink for the default level set.
    pub fn new() -> Self {
        Self::with_levels(LevelSet::default())
    }

    /// Console sink naming levels from `levels`.
    ///
    /// The stderr split follows the set's `warn` level when it has one and
    /// its highest rank otherwise.
    pub fn with_levels(levels: LevelSet) -> Self {
        let stderr_from = levels
            .rank_of("warn")
            .unwrap_or_else(|_| levels.highest());
        Self {
            levels,
            format: Format::default(),
            stderr_from,
        }
    }

    /// Selects the rendering format.
    #[must_use]
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Lowest rank routed to stderr.
    pub fn stderr_from(&self) -> Rank {
        self.stderr_from
    }

    /// Whether a payload at `rank` goes to stderr.
    pub fn routes_to_stderr(&self, rank: Rank) -> bool {
        rank >= self.stderr_from
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn write(&self, payload: &Payload) {
        let result = if self.routes_to_stderr(payload.level) {
            render(
                &mut io::stderr().lock(),
                payload,
                &self.levels,
                self.format,
                true,
            )
        } else {
            render(
                &mut io::stdout().lock(),
                payload,
                &self.levels,
                self.format,
                true,
            )
        };
        if let Err(error) = result {
            tracing::warn!(target: "namelog::sink", logger = %payload.name, %error, "console write failed");
        }
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
    }
}
