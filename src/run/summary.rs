//! Aggregating per-file results into a suite outcome

use crate::discovery::TestFile;
use crate::error::{Error, Result};
use crate::run::classify::FailureKind;
use crate::run::execution::TestResult;
use crate::timing::PhaseTimer;
use std::path::PathBuf;

/// Result of one test file within a run
#[derive(Debug, Clone, PartialEq)]
pub struct FileOutcome {
    pub file: TestFile,
    pub result: TestResult,
    /// Path of the XML report written for this file
    pub report: PathBuf,
}

/// Running totals across the files of a suite
#[derive(Debug, Default)]
pub struct Aggregator {
    total_passed: usize,
    total_failed: usize,
    files: Vec<FileOutcome>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one file's result into the totals and log it
    ///
    /// Both counters are plain per-file sums; a file with failures still
    /// contributes its passed cases.
    pub fn record(&mut self, file: &TestFile, result: &TestResult, report: PathBuf) {
        tracing::info!(
            "  {} test{}: {} passed, {} failed",
            result.tried,
            if result.tried == 1 { "" } else { "s" },
            result.passed,
            result.failed
        );

        if result.failed > 0 {
            log_failures(result);
        }

        self.total_passed = self.total_passed.saturating_add(result.passed);
        self.total_failed = self.total_failed.saturating_add(result.failed);
        self.files.push(FileOutcome {
            file: file.clone(),
            result: result.clone(),
            report,
        });
    }

    pub fn total_passed(&self) -> usize {
        self.total_passed
    }

    pub fn total_failed(&self) -> usize {
        self.total_failed
    }

    /// Log the grand totals and close the run
    pub fn finish(self, timings: PhaseTimer) -> SuiteOutcome {
        let outcome = SuiteOutcome {
            total_passed: self.total_passed,
            total_failed: self.total_failed,
            files: self.files,
            timings,
        };
        tracing::info!("");
        tracing::info!("{}", outcome.summary_line());
        tracing::info!("");
        outcome
    }
}

fn log_failures(result: &TestResult) {
    tracing::info!("");
    for (case, failure) in result.failures() {
        match failure.kind {
            FailureKind::Unclassified => tracing::error!(
                "{}() FAILED: Unhandled exception thrown in test code: {}",
                case.name,
                failure.message
            ),
            _ => tracing::error!("{}() FAILED: {}", case.name, failure.message),
        }
        for frame in &failure.stack_frames {
            tracing::error!("{}", frame);
        }
    }
    tracing::info!("");
}

/// Final state of a completed suite run
#[derive(Debug, Clone)]
pub struct SuiteOutcome {
    pub total_passed: usize,
    pub total_failed: usize,
    /// Per-file results in execution order
    pub files: Vec<FileOutcome>,
    /// Time spent in each phase of the run
    pub timings: PhaseTimer,
}

impl SuiteOutcome {
    /// Whether every test passed
    pub fn is_success(&self) -> bool {
        self.total_failed == 0
    }

    /// Human-readable totals line
    pub fn summary_line(&self) -> String {
        let mut line = format!("Total tests passed: {}", self.total_passed);
        if self.total_failed > 0 {
            line.push_str(&format!(", total tests FAILED: {}", self.total_failed));
        }
        line
    }

    /// Turn failed tests into an error, keeping infrastructure errors distinct
    pub fn into_result(self) -> Result<SuiteOutcome> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::TestsFailed {
                failed: self.total_failed,
            })
        }
    }

    pub fn file(&self, module: &str) -> Option<&FileOutcome> {
        self.files.iter().find(|f| f.file.module == module)
    }
}
