//! crates/namelog/src/payload.rs
//! Record delivered to a sink for every emitted call.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::levels::Rank;

/// Structured record built per emitted call. Not retained by the logger.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    /// Milliseconds since the Unix epoch at emission time.
    pub timestamp: u64,
    /// Rank of the call.
    pub level: Rank,
    /// Name of the emitting logger.
    pub name: String,
    /// Caller data. Level methods deliver a JSON array of their arguments.
    pub data: Value,
}

impl Payload {
    /// Build a payload stamped with the current time.
    pub fn new(level: Rank, name: impl Into<String>, data: Value) -> Self {
        Self {
            timestamp: now_ms(),
            level,
            name: name.into(),
            data,
        }
    }

    /// Arguments of a level-method call, or `None` when `data` is not an array.
    pub fn args(&self) -> Option<&[Value]> {
        self.data.as_array().map(Vec::as_slice)
    }
}

/// Current timestamp in milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_stamps_current_time() {
        let before = now_ms();
        let payload = Payload::new(2, "svc", json!(["b"]));
        let after = now_ms();

        assert!(payload.timestamp >= before && payload.timestamp <= after);
        assert_eq!(payload.level, 2);
        assert_eq!(payload.name, "svc");
    }

    #[test]
    fn args_exposes_array_data() {
        let payload = Payload::new(1, "svc", json!(["x", "y"]));
        assert_eq!(payload.args(), Some(&[json!("x"), json!("y")][..]));

        let raw = Payload::new(1, "svc", json!({"k": 1}));
        assert!(raw.args().is_none());
    }

    #[test]
    fn serializes_with_documented_field_names() {
        let payload = Payload {
            timestamp: 7,
            level: 3,
            name: "db".to_owned(),
            data: json!(["boom"]),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({"timestamp": 7, "level": 3, "name": "db", "data": ["boom"]})
        );
    }
}
