//! The script engine capability the suite runner depends on
//!
//! The runner never names a concrete engine. Anything that can execute
//! source against a [`Scope`], compile a reusable script and look up bundled
//! resources can drive a suite.

use crate::scope::Scope;
use std::fmt;
use thiserror::Error;

/// Prefix marking a logical resource id rather than a filesystem path
pub const CLASSPATH_PREFIX: &str = "classpath:";

/// What went wrong inside the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptErrorKind {
    Syntax,
    Runtime,
}

impl fmt::Display for ScriptErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptErrorKind::Syntax => write!(f, "syntax error"),
            ScriptErrorKind::Runtime => write!(f, "runtime error"),
        }
    }
}

/// A structured engine error
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind} in {origin}: {message}")]
pub struct ScriptError {
    pub kind: ScriptErrorKind,
    pub message: String,
    /// Name the source was executed under
    pub origin: String,
    /// 1-based line, when the engine knows it
    pub line: Option<usize>,
}

impl ScriptError {
    pub fn new(
        kind: ScriptErrorKind,
        message: impl Into<String>,
        origin: impl Into<String>,
        line: Option<usize>,
    ) -> Self {
        ScriptError {
            kind,
            message: message.into(),
            origin: origin.into(),
            line,
        }
    }

    pub fn syntax(message: impl Into<String>, origin: impl Into<String>, line: usize) -> Self {
        Self::new(ScriptErrorKind::Syntax, message, origin, Some(line))
    }

    pub fn runtime(message: impl Into<String>, origin: impl Into<String>) -> Self {
        Self::new(ScriptErrorKind::Runtime, message, origin, None)
    }
}

/// Script engine used to run a suite
///
/// Implementations keep whatever engine state they need in `self`; all
/// per-test state lives in the [`Scope`] passed to each call.
pub trait Interpreter {
    /// A compiled, reusable script
    type Script;

    /// Execute `source` against `scope`
    ///
    /// `origin` names the source in stack traces and error messages.
    fn execute(&mut self, source: &str, origin: &str, scope: &mut Scope)
        -> Result<(), ScriptError>;

    /// Compile `source` once for repeated execution
    fn compile(&mut self, source: &str, origin: &str) -> Result<Self::Script, ScriptError>;

    /// Execute a compiled script against `scope`
    fn exec_compiled(&mut self, script: &Self::Script, scope: &mut Scope)
        -> Result<(), ScriptError>;

    /// Look up a bundled resource by id (the part after `classpath:`)
    fn load_resource(&self, id: &str) -> anyhow::Result<Vec<u8>>;

    /// Turn file contents into executable source
    ///
    /// Engines that accept a secondary dialect transpile here, keyed on the
    /// origin's extension. The default passes the source through.
    fn prepare_source(&mut self, origin: &str, source: String) -> Result<String, ScriptError> {
        let _ = origin;
        Ok(source)
    }
}

/// Where a fixture, framework or runner script comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptRef {
    /// A bundled resource, looked up through [`Interpreter::load_resource`]
    Resource(String),
    /// A file on disk
    File(std::path::PathBuf),
}

impl ScriptRef {
    /// Parse a reference, recognizing the `classpath:` prefix
    pub fn parse(reference: &str) -> Self {
        match reference.strip_prefix(CLASSPATH_PREFIX) {
            Some(id) => ScriptRef::Resource(id.to_string()),
            None => ScriptRef::File(reference.into()),
        }
    }
}

impl fmt::Display for ScriptRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptRef::Resource(id) => write!(f, "{}{}", CLASSPATH_PREFIX, id),
            ScriptRef::File(path) => write!(f, "{}", path.display()),
        }
    }
}
