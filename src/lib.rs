// LogMerge - lib.rs
//
// Library entry point: the parsing/normalisation engine plus the run
// orchestration the binary drives. Exposed for integration testing and
// programmatic use.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
