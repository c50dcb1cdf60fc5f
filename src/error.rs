//! Error types for scriptsuite-rs

use crate::interpreter::ScriptError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for scriptsuite operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for scriptsuite operations
///
/// Every variant is an infrastructure failure that aborts the run. Assertion
/// failures and runtime errors raised inside a test case are not errors at
/// this level; they are reported as [`crate::FailureInfo`] data.
#[derive(Error, Debug)]
pub enum Error {
    /// Regex error
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error reported by the script interpreter
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// The suite root is missing or unreadable, or its files cannot be reported apart
    #[error("Cannot discover tests in {}: {message}", .root.display())]
    Discovery { root: PathBuf, message: String },

    /// A framework script, global fixture or the runner could not be loaded
    #[error("Cannot load {fixture}: {message}")]
    FixtureLoad { fixture: String, message: String },

    /// A test file could not be read or its top-level code failed in the engine
    #[error("Error executing test {module}: {source}")]
    Execution {
        module: String,
        #[source]
        source: Box<Error>,
    },

    /// The runner left missing or mistyped bookkeeping in the test scope
    #[error("Malformed runner output for {module}: {message}")]
    MalformedRunnerOutput { module: String, message: String },

    /// A report file could not be created or written
    #[error("Cannot write report {}: {message}", .path.display())]
    Report { path: PathBuf, message: String },

    /// The suite ran to completion but some tests failed
    #[error("{} failed", count_tests(.failed))]
    TestsFailed { failed: usize },

    /// Script error with the surrounding source lines
    #[error("Error in {script_file} at line {line_num}:\n{context}")]
    ScriptContext {
        script_file: String,
        line_num: usize,
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a discovery error
    pub fn discovery_error(root: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Discovery {
            root: root.into(),
            message: message.into(),
        }
    }

    /// Create a fixture load error
    pub fn fixture_error(fixture: impl Into<String>, message: impl ToString) -> Self {
        Error::FixtureLoad {
            fixture: fixture.into(),
            message: message.to_string(),
        }
    }

    /// Wrap an error as a fatal execution failure for one test module
    pub fn execution_error(module: impl Into<String>, source: Error) -> Self {
        Error::Execution {
            module: module.into(),
            source: Box::new(source),
        }
    }

    /// Create a malformed runner output error
    pub fn malformed(module: impl Into<String>, message: impl Into<String>) -> Self {
        Error::MalformedRunnerOutput {
            module: module.into(),
            message: message.into(),
        }
    }

    /// Create a report error
    pub fn report_error(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Error::Report {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create a script error with context
    pub fn script_error(
        script_file: impl Into<String>,
        line_num: usize,
        script_content: &str,
        source: Error,
    ) -> Self {
        let context = generate_error_context(script_content, line_num);
        Error::ScriptContext {
            script_file: script_file.into(),
            line_num,
            context,
            source: Box::new(source),
        }
    }

    /// Attach source context to an interpreter error when it carries a line number
    pub fn from_script(script_file: &str, script_content: &str, err: ScriptError) -> Self {
        match err.line {
            Some(line) if line > 0 => {
                Error::script_error(script_file, line, script_content, Error::Script(err))
            }
            _ => Error::Script(err),
        }
    }
}

fn count_tests(count: &usize) -> String {
    format!("{} test{}", count, if *count == 1 { "" } else { "s" })
}

/// Generate error context showing surrounding lines
fn generate_error_context(script_content: &str, error_line: usize) -> String {
    let lines: Vec<&str> = script_content.lines().collect();
    let mut context = String::new();

    let start = error_line.saturating_sub(3).max(1);
    let end = (error_line + 2).min(lines.len());

    for line_num in start..=end {
        let line_content = lines.get(line_num - 1).unwrap_or(&"");

        if line_num == error_line {
            context.push_str(&format!("> {} | {}\n", line_num, line_content));
        } else {
            context.push_str(&format!("  {} | {}\n", line_num, line_content));
        }
    }

    context.trim_end().to_string()
}
