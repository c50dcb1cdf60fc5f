//! # scriptsuite-rs
//!
//! A Rust crate for running suites of test scripts through an embedded
//! script interpreter.
//!
//! Each discovered script runs in its own scope chained to a shared base
//! scope holding the test framework and global fixtures. A shared runner
//! script drives the framework and leaves its counters in the scope; the
//! results are logged and written as one JUnit XML report per script.
//!
//! The crate does not ship a script engine. Anything implementing
//! [`Interpreter`] can drive a suite.

pub mod discovery;
pub mod error;
pub mod interpreter;
pub mod report;
pub mod run;
pub mod scope;
pub mod timing;
pub mod value;

pub use discovery::TestFile;
pub use error::{Error, Result};
pub use interpreter::{Interpreter, ScriptError, ScriptErrorKind, ScriptRef};
pub use run::{
    CaseDetail, FailureInfo, FailureKind, FileOutcome, RunParams, SuiteOutcome, TestResult,
};
pub use scope::{BaseScope, Scope};
pub use value::{HostObject, Object, Value};

// Re-export for advanced users who need direct access
pub use run::{run_suite, run_test};

use std::path::PathBuf;

/// Builder for configuring and running a script test suite
///
/// # Examples
///
/// ```no_run
/// use scriptsuite_rs::{suite, Interpreter};
///
/// fn run_js_suite<I: Interpreter>(engine: I) -> scriptsuite_rs::Result<()> {
///     let outcome = suite::run("src/test/js", engine)
///         .framework("classpath:/js/jsUnitCore.js")
///         .fixture("src/test/globals.js")
///         .report_dir("target/surefire-reports")
///         .execute()?;
///
///     println!("{}", outcome.summary_line());
///     outcome.into_result().map(|_| ())
/// }
/// ```
pub struct Builder<I> {
    dir: PathBuf,
    params: RunParams,
    interpreter: I,
}

impl<I: Interpreter> Builder<I> {
    /// Create a new builder for the given suite directory
    fn new(dir: impl Into<PathBuf>, interpreter: I) -> Self {
        Self {
            dir: dir.into(),
            params: RunParams::new(),
            interpreter,
        }
    }

    /// Replace all parameters at once
    pub fn params(mut self, params: RunParams) -> Self {
        self.params = params;
        self
    }

    /// Set the directory that receives the XML reports
    ///
    /// Everything already in it is deleted when the run starts.
    pub fn report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.params = self.params.report_dir(dir);
        self
    }

    /// Set the directory that relative fixture paths are resolved against
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.params = self.params.base_dir(dir);
        self
    }

    /// Replace the file suffixes that mark a test script
    pub fn suffixes<It, S>(mut self, suffixes: It) -> Self
    where
        It: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = self.params.suffixes(suffixes);
        self
    }

    /// Add a framework script, loaded into the base scope before fixtures
    ///
    /// `classpath:` references are looked up with
    /// [`Interpreter::load_resource`]; anything else is a file path.
    pub fn framework(mut self, reference: impl Into<String>) -> Self {
        self.params = self.params.framework(reference);
        self
    }

    /// Add a global fixture script shared by every test
    pub fn fixture(mut self, reference: impl Into<String>) -> Self {
        self.params = self.params.fixture(reference);
        self
    }

    /// Set the runner script executed against every test scope
    pub fn runner(mut self, reference: impl Into<String>) -> Self {
        self.params = self.params.runner(reference);
        self
    }

    /// Set the marker that identifies framework frames in stack traces
    pub fn internal_marker(mut self, marker: impl Into<String>) -> Self {
        self.params = self.params.internal_marker(marker);
        self
    }

    /// Only run the given files, named by relative path or module name
    pub fn files<It, S>(mut self, files: It) -> Self
    where
        It: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = self.params.files(files);
        self
    }

    /// Execute every test script in the configured directory
    ///
    /// # Returns
    /// The suite outcome, including failed tests. Infrastructure problems
    /// (missing directory, unloadable fixture, unreadable test file, report
    /// I/O) are returned as errors. Use [`SuiteOutcome::into_result`] to
    /// treat failed tests as an error too.
    pub fn execute(mut self) -> Result<SuiteOutcome> {
        run_suite(&mut self.interpreter, &self.dir, &self.params)
    }
}

/// Create a new suite builder for the given directory
///
/// This is the main entry point for running a suite.
pub mod suite {
    use super::*;

    /// Create a new suite builder for the given directory and interpreter
    pub fn run<I: Interpreter>(dir: impl Into<PathBuf>, interpreter: I) -> Builder<I> {
        Builder::new(dir, interpreter)
    }
}
