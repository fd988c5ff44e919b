//! Unit tests for flowcanvas.

mod logging_tests;
mod perf_tests;
mod settings_tests;
mod settings_watcher_tests;
mod viewport_tests;
