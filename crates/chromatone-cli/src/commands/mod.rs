//! Command implementations.

pub mod demo;
pub mod features;
pub mod render;
