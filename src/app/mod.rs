// LogMerge - app/mod.rs
//
// Application layer: run orchestration over the core engine.

pub mod pipeline;
