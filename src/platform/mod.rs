//! Platform abstraction layer
//!
//! Browser events arrive in canvas pixel coordinates and are reduced here to
//! simulation [`Command`](crate::sim::Command)s, so the wasm glue stays thin
//! and the mapping is testable natively.

pub mod input;

pub use input::InputMapper;
