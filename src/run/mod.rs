//! Test execution module

pub mod classify;
pub mod execution;
pub mod fixtures;
pub mod params;
pub mod summary;

// Re-export public types
pub use classify::{classify, FailureInfo, FailureKind};
pub use execution::{CaseDetail, TestResult};
pub use params::RunParams;
pub use summary::{Aggregator, FileOutcome, SuiteOutcome};

use crate::discovery::{self, TestFile};
use crate::error::Result;
use crate::interpreter::Interpreter;
use crate::report::ReportWriter;
use crate::scope::BaseScope;
use crate::timing::PhaseTimer;
use std::path::Path;

/// Run a single test file with a freshly loaded base scope and runner
pub fn run_test<I: Interpreter>(
    interpreter: &mut I,
    suite_root: &Path,
    script_path: &Path,
    params: &RunParams,
) -> Result<TestResult> {
    let base = fixtures::load_base_scope(interpreter, params, &mut PhaseTimer::new())?;
    let runner = fixtures::compile_runner(interpreter, params)?;
    let suffix = params
        .suffixes
        .iter()
        .find(|s| script_path.to_string_lossy().ends_with(s.as_str()))
        .map(String::as_str)
        .unwrap_or("");
    let file = TestFile::new(suite_root, script_path, suffix);
    execution::run_test_file(interpreter, &base, &runner, &file, &params.internal_marker)
}

/// Run every test file under `suite_root`
///
/// The report directory is emptied first, so a run that aborts never leaves
/// an earlier run's reports behind. Discovery and fixture loading follow; any
/// infrastructure error aborts the run. Failed test cases do not: they are
/// counted in the returned [`SuiteOutcome`].
pub fn run_suite<I: Interpreter>(
    interpreter: &mut I,
    suite_root: &Path,
    params: &RunParams,
) -> Result<SuiteOutcome> {
    let mut timings = PhaseTimer::new();

    let mut reports = ReportWriter::new(&params.report_dir);
    reports.check_outside(suite_root)?;
    reports.prepare()?;

    let files = discovery::discover(suite_root, &params.suffixes)?;
    let files = discovery::select(files, &params.files, suite_root)?;

    tracing::info!("Running test suite in {}", suite_root.display());

    let base: BaseScope = fixtures::load_base_scope(interpreter, params, &mut timings)?;
    let runner = fixtures::compile_runner(interpreter, params)?;

    let mut aggregator = Aggregator::new();
    timings.time("running test suite", || -> Result<()> {
        for file in &files {
            tracing::info!("Running test {}", file.module);
            let result = execution::run_test_file(
                interpreter,
                &base,
                &runner,
                file,
                &params.internal_marker,
            )?;
            let report = reports.write(file, &result)?;
            aggregator.record(file, &result, report);
        }
        Ok(())
    })?;

    Ok(aggregator.finish(timings))
}
