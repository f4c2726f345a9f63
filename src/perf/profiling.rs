/// Instrumentation for the scan converter and the bounding hierarchy
/// Counters compile away unless the `profiling` feature is enabled
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe performance counters for function call tracking
pub struct FunctionCounters {
    // Triangle setup
    pub triangles_submitted: AtomicU64,
    pub triangles_clip_rejected: AtomicU64,
    pub triangles_degenerate: AtomicU64,
    pub triangles_rasterized: AtomicU64,
    pub interpolation_restarts: AtomicU64,

    // Span / pixel work
    pub spans_drawn: AtomicU64,
    pub pixels_written: AtomicU64,
    pub depth_test_passed: AtomicU64,
    pub depth_test_failed: AtomicU64,

    // Framebuffer counters
    pub framebuffer_clear_calls: AtomicU64,

    // Bounding hierarchy
    pub bhv_nodes_visited: AtomicU64,
    pub bhv_nodes_culled: AtomicU64,
}

impl FunctionCounters {
    pub const fn new() -> Self {
        Self {
            triangles_submitted: AtomicU64::new(0),
            triangles_clip_rejected: AtomicU64::new(0),
            triangles_degenerate: AtomicU64::new(0),
            triangles_rasterized: AtomicU64::new(0),
            interpolation_restarts: AtomicU64::new(0),
            spans_drawn: AtomicU64::new(0),
            pixels_written: AtomicU64::new(0),
            depth_test_passed: AtomicU64::new(0),
            depth_test_failed: AtomicU64::new(0),
            framebuffer_clear_calls: AtomicU64::new(0),
            bhv_nodes_visited: AtomicU64::new(0),
            bhv_nodes_culled: AtomicU64::new(0),
        }
    }

    fn all(&self) -> [&AtomicU64; 12] {
        [
            &self.triangles_submitted,
            &self.triangles_clip_rejected,
            &self.triangles_degenerate,
            &self.triangles_rasterized,
            &self.interpolation_restarts,
            &self.spans_drawn,
            &self.pixels_written,
            &self.depth_test_passed,
            &self.depth_test_failed,
            &self.framebuffer_clear_calls,
            &self.bhv_nodes_visited,
            &self.bhv_nodes_culled,
        ]
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        for counter in self.all() {
            counter.store(0, Ordering::Relaxed);
        }
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            triangles_submitted: self.triangles_submitted.load(Ordering::Relaxed),
            triangles_clip_rejected: self.triangles_clip_rejected.load(Ordering::Relaxed),
            triangles_degenerate: self.triangles_degenerate.load(Ordering::Relaxed),
            triangles_rasterized: self.triangles_rasterized.load(Ordering::Relaxed),
            interpolation_restarts: self.interpolation_restarts.load(Ordering::Relaxed),
            spans_drawn: self.spans_drawn.load(Ordering::Relaxed),
            pixels_written: self.pixels_written.load(Ordering::Relaxed),
            depth_test_passed: self.depth_test_passed.load(Ordering::Relaxed),
            depth_test_failed: self.depth_test_failed.load(Ordering::Relaxed),
            framebuffer_clear_calls: self.framebuffer_clear_calls.load(Ordering::Relaxed),
            bhv_nodes_visited: self.bhv_nodes_visited.load(Ordering::Relaxed),
            bhv_nodes_culled: self.bhv_nodes_culled.load(Ordering::Relaxed),
        }
    }
}

impl Default for FunctionCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of counter values at a point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub triangles_submitted: u64,
    pub triangles_clip_rejected: u64,
    pub triangles_degenerate: u64,
    pub triangles_rasterized: u64,
    pub interpolation_restarts: u64,
    pub spans_drawn: u64,
    pub pixels_written: u64,
    pub depth_test_passed: u64,
    pub depth_test_failed: u64,
    pub framebuffer_clear_calls: u64,
    pub bhv_nodes_visited: u64,
    pub bhv_nodes_culled: u64,
}

impl CounterSnapshot {
    /// Log the formatted report at info level
    pub fn log_report(&self) {
        log::info!("{}", self);
    }
}

impl fmt::Display for CounterSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Performance Counters Report ===")?;
        writeln!(f, "Triangle Setup:")?;
        writeln!(f, "  submitted:                  {:12}", self.triangles_submitted)?;
        writeln!(f, "  clip rejected:              {:12}", self.triangles_clip_rejected)?;
        writeln!(f, "  degenerate:                 {:12}", self.triangles_degenerate)?;
        writeln!(f, "  rasterized:                 {:12}", self.triangles_rasterized)?;
        writeln!(f, "  interpolation restarts:     {:12}", self.interpolation_restarts)?;

        writeln!(f, "Pixel Operations:")?;
        writeln!(f, "  spans drawn:                {:12}", self.spans_drawn)?;
        writeln!(f, "  pixels written:             {:12}", self.pixels_written)?;
        writeln!(f, "  depth test passed:          {:12}", self.depth_test_passed)?;
        writeln!(f, "  depth test failed:          {:12}", self.depth_test_failed)?;
        let tested = self.depth_test_passed + self.depth_test_failed;
        if tested > 0 {
            let pass_rate = (self.depth_test_passed as f64 / tested as f64) * 100.0;
            writeln!(f, "  depth test pass rate:       {:11.2}%", pass_rate)?;
        }
        writeln!(f, "  framebuffer clears:         {:12}", self.framebuffer_clear_calls)?;

        writeln!(f, "Bounding Hierarchy:")?;
        writeln!(f, "  nodes visited:              {:12}", self.bhv_nodes_visited)?;
        write!(f, "  nodes culled:               {:12}", self.bhv_nodes_culled)
    }
}

/// Global function counters instance
pub static FUNCTION_COUNTERS: FunctionCounters = FunctionCounters::new();

/// Increment a field of [`FUNCTION_COUNTERS`] (only when profiling feature is enabled)
#[macro_export]
macro_rules! count_call {
    ($field:ident) => {
        #[cfg(feature = "profiling")]
        {
            $crate::perf::FUNCTION_COUNTERS
                .$field
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        }
    };
}

/// Add to a field of [`FUNCTION_COUNTERS`] (only when profiling feature is enabled)
#[macro_export]
macro_rules! count_add {
    ($field:ident, $value:expr) => {
        #[cfg(feature = "profiling")]
        {
            $crate::perf::FUNCTION_COUNTERS
                .$field
                .fetch_add($value as u64, std::sync::atomic::Ordering::Relaxed);
        }
    };
}
