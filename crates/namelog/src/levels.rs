//! crates/namelog/src/levels.rs
//! Named severity levels and the ordered set a registry filters against.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LogError, LogResult};

/// Integer rank used in threshold comparisons. Higher is more severe.
pub type Rank = u32;

/// Rank of the `info` level in the default set.
pub const INFO: Rank = 1;
/// Rank of the `log` level in the default set (alias of `info`).
pub const LOG: Rank = 1;
/// Rank of the `warn` level in the default set.
pub const WARN: Rank = 2;
/// Rank of the `error` level in the default set.
pub const ERROR: Rank = 3;

/// A named severity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Level {
    /// Name used by [`Logger::emit`](crate::Logger::emit) and directives.
    pub name: String,
    /// Rank compared against logger thresholds.
    pub rank: Rank,
}

impl Level {
    /// Create a level.
    pub fn new(name: impl Into<String>, rank: Rank) -> Self {
        Self {
            name: name.into(),
            rank,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.rank)
    }
}

/// Ordered collection of levels.
///
/// Levels are kept sorted by rank. Several names may share one rank
/// (`info` and `log` in the default set); the first declared name is the
/// canonical one returned by [`name_of`](Self::name_of).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Level>", into = "Vec<Level>")]
pub struct LevelSet {
    levels: Vec<Level>,
}

impl LevelSet {
    /// Build a validated custom set.
    ///
    /// The set must be non-empty and every name must be non-empty and
    /// unique. Violations are reported as [`LogError::InvalidLevel`] so a
    /// broken configuration fails at construction time.
    pub fn new<I>(levels: I) -> LogResult<Self>
    where
        I: IntoIterator<Item = Level>,
    {
        let mut collected: Vec<Level> = Vec::new();
        for level in levels {
            let name = level.name.trim();
            if name.is_empty() {
                return Err(LogError::InvalidLevel("empty level name".to_owned()));
            }
            if collected.iter().any(|existing| existing.name == name) {
                return Err(LogError::InvalidLevel(format!("duplicate level name: {name}")));
            }
            collected.push(Level::new(name, level.rank));
        }

        if collected.is_empty() {
            return Err(LogError::InvalidLevel("empty level set".to_owned()));
        }

        // Stable sort keeps declaration order among aliases.
        collected.sort_by_key(|level| level.rank);
        Ok(Self { levels: collected })
    }

    /// Rank registered under `name`.
    pub fn rank_of(&self, name: &str) -> LogResult<Rank> {
        self.levels
            .iter()
            .find(|level| level.name == name)
            .map(|level| level.rank)
            .ok_or_else(|| LogError::InvalidLevel(format!("unknown level: {name}")))
    }

    /// Resolve a level name or a decimal rank.
    pub fn resolve(&self, token: &str) -> LogResult<Rank> {
        let token = token.trim();
        if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
            return token
                .parse::<Rank>()
                .map_err(|_| LogError::InvalidLevel(format!("rank out of range: {token}")));
        }
        self.rank_of(token)
    }

    /// Canonical name for `rank`, if any level carries it.
    pub fn name_of(&self, rank: Rank) -> Option<&str> {
        self.levels
            .iter()
            .find(|level| level.rank == rank)
            .map(|level| level.name.as_str())
    }

    /// Lowest configured rank. Writes without an explicit level use it.
    pub fn lowest(&self) -> Rank {
        self.levels.first().map_or(INFO, |level| level.rank)
    }

    /// Highest configured rank.
    pub fn highest(&self) -> Rank {
        self.levels.last().map_or(ERROR, |level| level.rank)
    }

    /// Whether a level named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.levels.iter().any(|level| level.name == name)
    }

    /// Iterate levels in rank order.
    pub fn iter(&self) -> impl Iterator<Item = &Level> {
        self.levels.iter()
    }

    /// Number of configured names, aliases included.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Always `false` for a validated set.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl Default for LevelSet {
    fn default() -> Self {
        Self {
            levels: vec![
                Level::new("info", INFO),
                Level::new("log", LOG),
                Level::new("warn", WARN),
                Level::new("error", ERROR),
            ],
        }
    }
}

impl TryFrom<Vec<Level>> for LevelSet {
    type Error = LogError;

    fn try_from(levels: Vec<Level>) -> LogResult<Self> {
        Self::new(levels)
    }
}

impl From<LevelSet> for Vec<Level> {
    fn from(set: LevelSet) -> Self {
        set.levels
    }
}
