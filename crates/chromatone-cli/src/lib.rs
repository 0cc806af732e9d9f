//! Chromatone CLI library.
//!
//! Command implementations live here so integration tests can drive them
//! directly; `main.rs` only parses arguments and dispatches.

pub mod commands;
pub mod wav;
