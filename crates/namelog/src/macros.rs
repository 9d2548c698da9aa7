//! crates/namelog/src/macros.rs
//! Argument-list helper for the level methods.

/// Build an ordered argument list from values of mixed types.
///
/// Each argument is converted with `Value::from`, so anything
/// `serde_json::Value` converts from is accepted.
///
/// # Example
/// ```
/// use namelog::{args, Value};
///
/// let list = args!["disk", 93, true];
/// assert_eq!(list, vec![Value::from("disk"), Value::from(93), Value::from(true)]);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($arg)),+]
    };
}
