//! End-to-end accessibility runs
//!
//! Shared stages live in [`prepare`]: geometry fixing, draping and weighting.
//! [`run_dual_origin`] and [`run_multi_threshold`] drive the two operating
//! modes over an already weighted graph. Progress, warnings and cancellation
//! go through a [`Feedback`] implementation.

mod dual_origin;
mod multi_threshold;
mod prepare;

pub use dual_origin::{DualOriginRequest, DualOriginRun, run_dual_origin};
pub use multi_threshold::{
    BudgetFailure, MultiThresholdRequest, MultiThresholdRun, run_multi_threshold, strategy_for,
};
pub use prepare::{PreparedNetwork, fix_geometry, prepare_network};

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};

/// Severity of a user-visible message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Info,
    Warning,
}

/// Non-fatal condition met during a run
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
}

impl Diagnostic {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            message: message.into(),
        }
    }

    pub fn is_warning(&self) -> bool {
        self.level == DiagnosticLevel::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            DiagnosticLevel::Info => write!(f, "{}", self.message),
            DiagnosticLevel::Warning => write!(f, "warning: {}", self.message),
        }
    }
}

/// Receives messages and progress, and tells a run when to stop
///
/// Called from worker threads.
pub trait Feedback: Sync {
    fn report(&self, diagnostic: &Diagnostic);

    /// `done` of `total` units of work finished
    fn progress(&self, done: usize, total: usize);

    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Cooperative cancellation flag shared between the caller and a run
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Forwards everything to the `log` facade
#[derive(Debug, Clone, Default)]
pub struct LogFeedback {
    token: CancellationToken,
}

impl LogFeedback {
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Feedback for LogFeedback {
    fn report(&self, diagnostic: &Diagnostic) {
        match diagnostic.level {
            DiagnosticLevel::Info => info!("{}", diagnostic.message),
            DiagnosticLevel::Warning => warn!("{}", diagnostic.message),
        }
    }

    fn progress(&self, done: usize, total: usize) {
        info!("Progress: {done}/{total}");
    }

    fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Reports a diagnostic and keeps it for the run output
pub(crate) fn emit(feedback: &dyn Feedback, diagnostics: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
    feedback.report(&diagnostic);
    diagnostics.push(diagnostic);
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    use super::*;

    /// Records everything and cancels itself after a number of progress calls
    #[derive(Default)]
    pub(crate) struct RecordingFeedback {
        pub(crate) reports: Mutex<Vec<Diagnostic>>,
        pub(crate) progress_calls: AtomicUsize,
        pub(crate) cancel_after: Option<usize>,
        pub(crate) token: CancellationToken,
    }

    impl Feedback for RecordingFeedback {
        fn report(&self, diagnostic: &Diagnostic) {
            self.reports.lock().unwrap().push(diagnostic.clone());
        }

        fn progress(&self, _done: usize, _total: usize) {
            let calls = self.progress_calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.cancel_after.is_some_and(|limit| calls >= limit) {
                self.token.cancel();
            }
        }

        fn is_cancelled(&self) -> bool {
            self.token.is_cancelled()
        }
    }
}
