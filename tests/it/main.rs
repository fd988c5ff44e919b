//! Single test binary entry point.
//!
//! This consolidates all tests into a single binary, reducing linking overhead.
//!
//! Structure:
//! - helpers: Engine builder, recording callbacks and pointer helpers
//! - integration: Multi-component workflow tests driven through the engine
//! - unit: Single-component unit tests

mod integration;
mod unit;
