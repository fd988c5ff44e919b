//! Performance instrumentation for render passes and hot input paths.
//!
//! - `profile_scope!` times a block; compiled out unless the `profiling`
//!   feature is enabled.
//! - [`FrameMonitor`] keeps the last few render passes with their draw counts
//!   and warns about passes that blow the frame budget.

use crate::constants::TARGET_FRAME_MS;
use crate::render::RenderStats;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::warn;
#[cfg(feature = "profiling")]
use tracing::trace;

/// Passes kept for the rolling average
const WINDOW: usize = 60;

/// A pass slower than this many frame budgets is reported
const SLOW_PASS_FACTOR: f64 = 2.0;

// ============================================================================
// Profiling Macros (zero-cost when disabled)
// ============================================================================

/// Profile a scope with the given name. Zero-cost when profiling is disabled.
///
/// # Example
/// ```ignore
/// fn draw_nodes() {
///     profile_scope!("draw_nodes");
///     // ... rendering code ...
/// }
/// ```
#[macro_export]
macro_rules! profile_scope {
    ($name:expr) => {
        #[cfg(feature = "profiling")]
        let _timer = $crate::perf::ScopedTimer::for_profiling($name);
        #[cfg(not(feature = "profiling"))]
        let _ = $name;
    };
    ($name:expr, $threshold_ms:expr) => {
        #[cfg(feature = "profiling")]
        let _timer = $crate::perf::ScopedTimer::new($name, $threshold_ms);
        #[cfg(not(feature = "profiling"))]
        let _ = ($name, $threshold_ms);
    };
}

pub use profile_scope;

// ============================================================================
// Frame Monitor
// ============================================================================

/// One recorded render pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassSample {
    pub elapsed_ms: f64,
    pub stats: RenderStats,
}

impl PassSample {
    fn is_slow(&self) -> bool {
        self.elapsed_ms > TARGET_FRAME_MS * SLOW_PASS_FACTOR
    }
}

/// Rolling window of render passes.
#[derive(Debug, Clone, Default)]
pub struct FrameMonitor {
    window: VecDeque<PassSample>,
    window_ms: f64,
    passes: u64,
    slow_passes: u64,
}

impl FrameMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pass that took `elapsed`. Returns its duration in milliseconds.
    pub fn record(&mut self, elapsed: Duration, stats: RenderStats) -> f64 {
        let sample = PassSample {
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
            stats,
        };
        if self.window.len() == WINDOW {
            if let Some(old) = self.window.pop_front() {
                self.window_ms -= old.elapsed_ms;
            }
        }
        self.window_ms += sample.elapsed_ms;
        self.window.push_back(sample);
        self.passes += 1;

        if sample.is_slow() {
            self.slow_passes += 1;
            warn!(
                elapsed_ms = format!("{:.2}", sample.elapsed_ms),
                nodes = stats.nodes,
                links = stats.links,
                "Slow render pass"
            );
        }
        sample.elapsed_ms
    }

    /// Run and time one render pass.
    pub fn measure(&mut self, pass: impl FnOnce() -> RenderStats) -> RenderStats {
        let started = Instant::now();
        let stats = pass();
        self.record(started.elapsed(), stats);
        stats
    }

    pub fn total_frames(&self) -> u64 {
        self.passes
    }

    pub fn last(&self) -> Option<&PassSample> {
        self.window.back()
    }

    /// Mean pass time over the window, 0 when nothing was recorded.
    pub fn average_frame_time(&self) -> f64 {
        match self.window.len() {
            0 => 0.0,
            n => self.window_ms / n as f64,
        }
    }

    pub fn max_frame_time(&self) -> f64 {
        self.window
            .iter()
            .map(|s| s.elapsed_ms)
            .fold(0.0, f64::max)
    }

    /// Share of all passes that were slow, in percent.
    pub fn slow_frame_percentage(&self) -> f64 {
        if self.passes == 0 {
            0.0
        } else {
            100.0 * self.slow_passes as f64 / self.passes as f64
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ============================================================================
// Scoped Timer
// ============================================================================

/// A scoped timer that logs its duration on drop if it exceeds a threshold.
pub struct ScopedTimer {
    name: &'static str,
    start: Instant,
    threshold_ms: f64,
}

impl ScopedTimer {
    pub fn new(name: &'static str, threshold_ms: f64) -> Self {
        Self {
            name,
            start: Instant::now(),
            threshold_ms,
        }
    }

    /// Timer for `profile_scope!` (1ms threshold).
    pub fn for_profiling(name: &'static str) -> Self {
        Self::new(name, 1.0)
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed_ms();
        if elapsed_ms <= self.threshold_ms {
            return;
        }

        #[cfg(feature = "profiling")]
        trace!("[PERF] {}: {:.2}ms", self.name, elapsed_ms);

        #[cfg(not(feature = "profiling"))]
        warn!(
            operation = self.name,
            elapsed_ms = format!("{:.2}", elapsed_ms),
            threshold_ms = format!("{:.2}", self.threshold_ms),
            "Slow operation"
        );
    }
}
