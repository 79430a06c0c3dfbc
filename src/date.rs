//! Timestamp type used for `/CreationDate`, `/ModDate`, and the trailer `/ID`
//! generation input — a thin re-export of the `time` crate (no wasm target in this
//! engine's scope, so no polyfill is needed).

pub use time::OffsetDateTime;
