use std::sync::{Mutex, MutexGuard};

use super::Sink;
use crate::payload::Payload;

/// Sink that keeps every payload in memory, in delivery order.
#[derive(Debug, Default)]
pub struct MemorySink {
    payloads: Mutex<Vec<Payload>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the captured payloads.
    pub fn snapshot(&self) -> Vec<Payload> {
        self.lock().clone()
    }

    /// Drain the captured payloads.
    pub fn take(&self) -> Vec<Payload> {
        self.lock().drain(..).collect()
    }

    /// Number of captured payloads.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been captured.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Discard captured payloads.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Payload>> {
        self.payloads
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }
}

impl Sink for MemorySink {
    fn write(&self, payload: &Payload) {
        self.lock().push(payload.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn captures_in_order_and_drains() {
        let sink = MemorySink::new();
        sink.write(&Payload::new(1, "a", json!(["first"])));
        sink.write(&Payload::new(2, "a", json!(["second"])));

        assert_eq!(sink.len(), 2);
        let drained = sink.take();
        assert_eq!(drained[0].data, json!(["first"]));
        assert_eq!(drained[1].data, json!(["second"]));
        assert!(sink.is_empty());
    }

    #[test]
    fn snapshot_does_not_drain() {
        let sink = MemorySink::new();
        sink.write(&Payload::new(1, "a", json!(null)));
        assert_eq!(sink.snapshot().len(), 1);
        assert_eq!(sink.len(), 1);
        sink.clear();
        assert!(sink.is_empty());
    }
}
