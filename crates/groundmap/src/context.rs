//! Build context providing logging, profiling, and progress tracking
//!
//! Baking a large scene takes long enough that the host wants to show a
//! loading bar, so every stage of [`GroundMap::build_with_context`] reports
//! through here.
//!
//! [`GroundMap::build_with_context`]: crate::GroundMap::build_with_context

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use web_time::Instant;

/// Stages of ground map baking, used as timer keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildStage {
    /// Whole build
    Total,
    /// Boundary edge extraction from the bitmap
    EdgeExtraction,
    /// Collinear vertex collapse
    Simplification,
    /// Visibility shortcut edges
    Visibility,
}

/// Progress information for long-running operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressInfo {
    /// Current step number
    pub current: usize,
    /// Total number of steps
    pub total: usize,
    /// Description of current operation
    pub description: String,
}

impl ProgressInfo {
    /// Completed fraction in `[0, 1]`
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.current as f64 / self.total as f64
        }
    }
}

/// Accumulated time for one stage
#[derive(Debug, Clone, Copy)]
pub struct TimerEntry {
    pub duration: Duration,
    /// Number of times this timer was stopped
    pub count: usize,
}

const MAX_LOG_ENTRIES: usize = 1000;

type ProgressCallback = Box<dyn FnMut(&ProgressInfo) + Send>;

/// Context for ground map builds
#[derive(Default)]
pub struct BuildContext {
    logs: Vec<String>,
    active_timers: HashMap<BuildStage, Instant>,
    timers: HashMap<BuildStage, TimerEntry>,
    progress: Option<ProgressInfo>,
    progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("logs", &self.logs.len())
            .field("timers", &self.timers)
            .field("progress", &self.progress)
            .field("has_progress_callback", &self.progress_callback.is_some())
            .finish()
    }
}

impl BuildContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context that forwards every progress update to `callback`
    pub fn with_progress_callback(callback: impl FnMut(&ProgressInfo) + Send + 'static) -> Self {
        Self {
            progress_callback: Some(Box::new(callback)),
            ..Self::default()
        }
    }

    /// Records a message and mirrors it to the `log` facade
    pub fn log_info(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{message}");
        self.logs.push(message);
        if self.logs.len() > MAX_LOG_ENTRIES {
            self.logs.remove(0);
        }
    }

    pub fn start_timer(&mut self, stage: BuildStage) {
        self.active_timers.insert(stage, Instant::now());
    }

    /// Stops a timer and adds the elapsed time to the stage total
    pub fn stop_timer(&mut self, stage: BuildStage) {
        if let Some(start_time) = self.active_timers.remove(&stage) {
            let entry = self.timers.entry(stage).or_insert(TimerEntry {
                duration: Duration::ZERO,
                count: 0,
            });
            entry.duration += start_time.elapsed();
            entry.count += 1;
        }
    }

    pub fn timer_duration(&self, stage: BuildStage) -> Option<Duration> {
        self.timers.get(&stage).map(|entry| entry.duration)
    }

    pub fn timer_count(&self, stage: BuildStage) -> usize {
        self.timers.get(&stage).map(|entry| entry.count).unwrap_or(0)
    }

    /// Updates progress information and notifies the callback, if any
    pub fn set_progress(&mut self, current: usize, total: usize, description: impl Into<String>) {
        let info = ProgressInfo {
            current,
            total,
            description: description.into(),
        };
        log::trace!("progress {}/{}: {}", info.current, info.total, info.description);
        if let Some(callback) = self.progress_callback.as_mut() {
            callback(&info);
        }
        self.progress = Some(info);
    }

    pub fn progress(&self) -> Option<&ProgressInfo> {
        self.progress.as_ref()
    }

    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    /// Writes the per-stage timings to the `log` facade, slowest first
    pub fn log_timer_summary(&self) {
        let mut sorted: Vec<_> = self.timers.iter().collect();
        sorted.sort_by(|a, b| b.1.duration.cmp(&a.1.duration));

        for (stage, entry) in sorted {
            log::info!(
                "{:16} {:8.2}ms ({} calls)",
                format!("{stage:?}"),
                entry.duration.as_secs_f64() * 1000.0,
                entry.count
            );
        }
    }
}
