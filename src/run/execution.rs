//! Running one test file and reading back its results

use crate::discovery::TestFile;
use crate::error::{Error, Result};
use crate::interpreter::Interpreter;
use crate::run::classify::{classify, FailureInfo};
use crate::scope::{BaseScope, Scope};
use crate::value::{Object, Value};
use std::fs;

/// Outcome of a single test function
#[derive(Debug, Clone, PartialEq)]
pub struct CaseDetail {
    pub name: String,
    pub elapsed_millis: f64,
    pub failure: Option<FailureInfo>,
}

impl CaseDetail {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// Counters and per-case details the runner left in a test scope
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestResult {
    pub tried: usize,
    pub passed: usize,
    pub failed: usize,
    /// Cases in the order the runner recorded them
    pub cases: Vec<CaseDetail>,
}

impl TestResult {
    pub fn case(&self, name: &str) -> Option<&CaseDetail> {
        self.cases.iter().find(|c| c.name == name)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&CaseDetail, &FailureInfo)> {
        self.cases
            .iter()
            .filter_map(|c| c.failure.as_ref().map(|f| (c, f)))
    }

    /// Sum of case times in milliseconds
    pub fn total_millis(&self) -> f64 {
        self.cases.iter().map(|c| c.elapsed_millis).sum()
    }

    /// Read the runner's bookkeeping out of `scope`
    ///
    /// `tried` is not checked against `passed + failed`; the runner's counts
    /// are taken as given.
    pub fn from_scope(scope: &Scope, module: &str, internal_marker: &str) -> Result<Self> {
        let tried = read_count(scope, module, "tried")?;
        let passed = read_count(scope, module, "passed")?;
        let failed = read_count(scope, module, "failed")?;

        let details = match scope.get("details") {
            Some(Value::Object(details)) => details,
            Some(other) => {
                return Err(Error::malformed(
                    module,
                    format!("'details' is a {}, expected an object", other.type_name()),
                ))
            }
            None => return Err(Error::malformed(module, "'details' is not defined")),
        };

        let cases = details
            .iter()
            .map(|(name, detail)| read_case(module, name, detail, internal_marker))
            .collect::<Result<Vec<_>>>()?;

        Ok(TestResult {
            tried,
            passed,
            failed,
            cases,
        })
    }
}

fn read_count(scope: &Scope, module: &str, name: &str) -> Result<usize> {
    match scope.get(name) {
        Some(value) => value.as_count().ok_or_else(|| {
            Error::malformed(
                module,
                format!("'{}' is {} ({}), expected a count", name, value, value.type_name()),
            )
        }),
        None => Err(Error::malformed(module, format!("'{}' is not defined", name))),
    }
}

fn read_case(
    module: &str,
    name: &str,
    detail: &Value,
    internal_marker: &str,
) -> Result<CaseDetail> {
    let detail: &Object = detail.as_object().ok_or_else(|| {
        Error::malformed(module, format!("details for '{}' is not an object", name))
    })?;

    let elapsed_millis = detail
        .get("time")
        .and_then(Value::as_number)
        .filter(|t| t.is_finite())
        .ok_or_else(|| {
            Error::malformed(module, format!("details for '{}' has no numeric 'time'", name))
        })?;

    let flagged = detail.get("failure").is_some_and(Value::is_truthy);
    let exception = detail.get("exception").filter(|e| !e.is_nullish());

    let failure = match (flagged, exception) {
        (_, Some(exception)) => Some(classify(exception, internal_marker)),
        (true, None) => Some(classify(&Value::Undefined, internal_marker)),
        (false, None) => None,
    };

    Ok(CaseDetail {
        name: name.to_string(),
        elapsed_millis,
        failure,
    })
}

/// Run one test file in a fresh scope chained to `base`
///
/// Failures inside test cases come back as data in the [`TestResult`]. An
/// unreadable file, an engine error while loading it or while running the
/// runner, and malformed runner output are returned as errors.
pub fn run_test_file<I: Interpreter>(
    interpreter: &mut I,
    base: &BaseScope,
    runner: &I::Script,
    file: &TestFile,
    internal_marker: &str,
) -> Result<TestResult> {
    let mut scope = base.new_scope();

    let content = fs::read_to_string(&file.path)
        .map_err(|e| Error::execution_error(&file.module, Error::Io(e)))?;

    let in_file = |source: &str, e| {
        Error::execution_error(&file.module, Error::from_script(&file.relative, source, e))
    };

    let source = interpreter
        .prepare_source(&file.relative, content.clone())
        .map_err(|e| in_file(content.as_str(), e))?;

    interpreter
        .execute(&source, &file.relative, &mut scope)
        .map_err(|e| in_file(source.as_str(), e))?;

    interpreter
        .exec_compiled(runner, &mut scope)
        .map_err(|e| Error::execution_error(&file.module, Error::Script(e)))?;

    TestResult::from_scope(&scope, &file.module, internal_marker)
}
