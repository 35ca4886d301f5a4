//! YAML documents in the "safe dump" dialect.
//!
//! Documents are emitted with a YAML 1.1 safe-dump layout (two-space indent,
//! block collections, sequences indented under their key, an 80 column fold
//! width) so the text handed to users matches what other tooling around the
//! cluster produces. Parsing goes through `serde_yml` into an ordered
//! `serde_json::Value`.

mod emitter;
mod resolve;
mod scalar;


use serde::Serialize;
use serde_json::Value;

pub use emitter::Emitter;

/// Serializes a JSON value as a YAML document terminated by a newline.
pub fn to_string(value: &Value) -> String {
    Emitter::default().dump(value)
}

/// Serializes any `Serialize` type through its JSON representation.
pub fn to_string_from<T: Serialize>(value: &T) -> serde_json::Result<String> {
    Ok(to_string(&serde_json::to_value(value)?))
}

/// Parses a YAML document into an ordered JSON value.
pub fn from_str(text: &str) -> Result<Value, serde_yml::Error> {
    serde_yml::from_str::<Value>(text)
}
