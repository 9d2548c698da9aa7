//! crates/namelog/src/global.rs
//! Process-wide enablement shared by a registry and all of its loggers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::error::{LogError, LogResult};
use crate::logger::LoggerId;

/// Logger currently holding exclusivity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Holder {
    /// Identifier of the holding logger.
    pub id: LoggerId,
    /// Name of the holding logger.
    pub name: String,
}

/// Global enable override plus the optional exclusivity holder.
///
/// At most one logger holds exclusivity at a time. Claims are resolved
/// under a single lock, so concurrent `only()` calls cannot both succeed.
#[derive(Debug, Default)]
pub struct GlobalState {
    enabled_all: AtomicBool,
    only: Mutex<Option<Holder>>,
}

impl GlobalState {
    /// Create state with the given override flag and no holder.
    pub fn new(enabled_all: bool) -> Self {
        Self {
            enabled_all: AtomicBool::new(enabled_all),
            only: Mutex::new(None),
        }
    }

    /// Whether the process-wide override is on.
    pub fn enabled_all(&self) -> bool {
        self.enabled_all.load(Ordering::Acquire)
    }

    /// Set the process-wide override.
    pub fn set_enabled_all(&self, enabled: bool) {
        self.enabled_all.store(enabled, Ordering::Release);
    }

    /// Claim exclusivity for `id`.
    ///
    /// Succeeds when nobody holds it or `id` already does. Otherwise the
    /// current holder is kept and [`LogError::ExclusivityDenied`] returned.
    pub fn claim(&self, id: LoggerId, name: &str) -> LogResult<()> {
        let mut only = self.lock_only();
        match only.as_ref() {
            None => {
                *only = Some(Holder {
                    id,
                    name: name.to_owned(),
                });
                Ok(())
            }
            Some(holder) if holder.id == id => Ok(()),
            Some(holder) => Err(LogError::ExclusivityDenied {
                requested: name.to_owned(),
                holder: holder.name.clone(),
                holder_id: holder.id,
            }),
        }
    }

    /// Clear exclusivity regardless of who holds it. Returns the previous holder.
    pub fn release(&self) -> Option<Holder> {
        self.lock_only().take()
    }

    /// Current holder, if any.
    pub fn holder(&self) -> Option<Holder> {
        self.lock_only().clone()
    }

    /// Whether exclusivity lets `id` emit.
    pub fn permits(&self, id: LoggerId) -> bool {
        self.lock_only()
            .as_ref()
            .is_none_or(|holder| holder.id == id)
    }

    fn lock_only(&self) -> MutexGuard<'_, Option<Holder>> {
        self.only
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }
}
