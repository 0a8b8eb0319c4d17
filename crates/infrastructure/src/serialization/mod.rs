//! JSON encoding of the files Authgate writes.
//!
//! Storage and settings files use 2-space indentation, sorted keys and a
//! trailing newline so they stay readable when inspected by hand.

mod json;

pub use json::{SerializationError, from_json_bytes, to_json_stable};
