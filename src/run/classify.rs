//! Failure classification for exceptions captured by the runner

use crate::value::{Object, Value};
use std::fmt;

/// Property marking an assertion-library exception
pub const ASSERTION_MARKER: &str = "isJsUnitException";
/// Human-readable message of an assertion exception
pub const ASSERTION_MESSAGE: &str = "jsUnitMessage";
/// Properties marking an exception raised by the engine itself
pub const ENGINE_MARKERS: &[&str] = &["engineException", "rhinoException"];
/// Multi-line stack trace attached by the runner
pub const STACK_TRACE: &str = "stackTrace";

/// Default marker tagging frames from framework-injected sources
pub const DEFAULT_INTERNAL_MARKER: &str = "classpath:";

/// How a test case failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    AssertionFailure,
    RuntimeError,
    Unclassified,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::AssertionFailure => write!(f, "AssertionFailure"),
            FailureKind::RuntimeError => write!(f, "RuntimeError"),
            FailureKind::Unclassified => write!(f, "Unclassified"),
        }
    }
}

/// A classified failure of one test case
#[derive(Debug, Clone, PartialEq)]
pub struct FailureInfo {
    pub kind: FailureKind,
    /// Value of the report's `type` attribute: the error name for runtime errors
    pub type_name: String,
    pub message: String,
    /// Stack frames from user code, outermost last
    pub stack_frames: Vec<String>,
}

/// Shape of a captured exception value
#[derive(Debug)]
enum Captured<'a> {
    Assertion { message: &'a str },
    Runtime { name: &'a str, message: &'a str },
    Unclassified { raw: &'a Value },
}

impl<'a> Captured<'a> {
    fn decode(value: &'a Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Captured::Unclassified { raw: value };
        };

        if let Some(message) = decode_assertion(obj) {
            return Captured::Assertion { message };
        }
        if let Some((name, message)) = decode_runtime(obj) {
            return Captured::Runtime { name, message };
        }
        Captured::Unclassified { raw: value }
    }
}

fn decode_assertion(obj: &Object) -> Option<&str> {
    if !obj.get(ASSERTION_MARKER)?.is_truthy() {
        return None;
    }
    obj.get_str(ASSERTION_MESSAGE)
}

fn decode_runtime(obj: &Object) -> Option<(&str, &str)> {
    let marked = ENGINE_MARKERS
        .iter()
        .any(|m| obj.get(m).is_some_and(|v| !v.is_nullish()));
    if !marked {
        return None;
    }
    Some((obj.get_str("name")?, obj.get_str("message")?))
}

/// Classify a captured exception value
///
/// Never fails: a value missing the fields of one shape falls back to the
/// next, ending at [`FailureKind::Unclassified`].
pub fn classify(exception: &Value, internal_marker: &str) -> FailureInfo {
    let (kind, type_name, message) = match Captured::decode(exception) {
        Captured::Assertion { message } => (
            FailureKind::AssertionFailure,
            FailureKind::AssertionFailure.to_string(),
            message.to_string(),
        ),
        Captured::Runtime { name, message } => (
            FailureKind::RuntimeError,
            name.to_string(),
            format!("{}: {}", name, message),
        ),
        Captured::Unclassified { raw } => {
            let mut message = raw.to_string();
            if message.is_empty() {
                message = "<empty exception>".to_string();
            }
            (
                FailureKind::Unclassified,
                FailureKind::Unclassified.to_string(),
                message,
            )
        }
    };

    let stack_frames = exception
        .as_object()
        .and_then(|obj| obj.get_str(STACK_TRACE))
        .map(|trace| filter_stack(trace, internal_marker))
        .unwrap_or_default();

    FailureInfo {
        kind,
        type_name,
        message,
        stack_frames,
    }
}

/// Split a stack trace and drop frames tagged with `internal_marker`
pub fn filter_stack(trace: &str, internal_marker: &str) -> Vec<String> {
    trace
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .filter(|line| internal_marker.is_empty() || !line.contains(internal_marker))
        .map(str::to_string)
        .collect()
}
