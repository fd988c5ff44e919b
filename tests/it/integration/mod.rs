//! Integration tests for flowcanvas.
//!
//! These tests drive a full [`flowcanvas::Engine`] through its event queue
//! and verify what reaches the host callbacks and the render surface.

mod execution_flow_tests;
mod render_flow_tests;
