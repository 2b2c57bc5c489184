// LogMerge - platform/mod.rs
//
// Platform abstraction layer: config locations and file reading.
// Must NOT depend on: app.

pub mod config;
pub mod fs;
