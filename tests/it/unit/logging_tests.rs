//! Unit tests for tracing setup.
//!
//! The global subscriber outlives a single test, so everything that depends on
//! install order lives in one test.

use flowcanvas::error::EngineError;
use flowcanvas::logging::{init_tracing, init_tracing_once};

#[test]
fn test_second_install_is_rejected() {
    init_tracing_once("flowcanvas=debug");
    init_tracing_once("flowcanvas=debug");

    let result = init_tracing("warn");
    assert!(matches!(result, Err(EngineError::Logging(_))));

    tracing::info!(target: "flowcanvas", "Subscriber installed");
}
