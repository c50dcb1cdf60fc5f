//! Configuration parameters for suite execution

use crate::run::classify::DEFAULT_INTERNAL_MARKER;
use std::path::PathBuf;

/// Default location of the shared runner script
pub const DEFAULT_RUNNER: &str = "classpath:/js/testrunner.js";

/// Default report directory
pub const DEFAULT_REPORT_DIR: &str = "target/surefire-reports";

/// Environment variable overriding the report directory
pub const REPORT_DIR_ENV: &str = "SCRIPTSUITE_REPORT_DIR";

/// Configuration parameters for running a suite
#[derive(Debug, Clone)]
pub struct RunParams {
    /// File name suffixes that mark a test script
    pub suffixes: Vec<String>,
    /// Directory receiving one `TEST-<module>.xml` per test file
    pub report_dir: PathBuf,
    /// Directory that relative fixture paths are resolved against
    pub base_dir: PathBuf,
    /// Framework scripts loaded into the base scope before the fixtures
    pub framework: Vec<String>,
    /// Global fixture scripts loaded into the base scope, in order
    pub fixtures: Vec<String>,
    /// Runner script executed against every test scope
    pub runner: String,
    /// Stack frames containing this marker are dropped from failure reports
    pub internal_marker: String,
    /// Restrict the run to these files (relative path or module name)
    pub files: Vec<String>,
}

impl RunParams {
    /// Create a new RunParams with default settings
    pub fn new() -> Self {
        // Check SCRIPTSUITE_REPORT_DIR environment variable
        let report_dir = std::env::var(REPORT_DIR_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_DIR));

        RunParams {
            suffixes: vec![".js".to_string(), ".coffee".to_string()],
            report_dir,
            base_dir: PathBuf::from("."),
            framework: Vec::new(),
            fixtures: Vec::new(),
            runner: DEFAULT_RUNNER.to_string(),
            internal_marker: DEFAULT_INTERNAL_MARKER.to_string(),
            files: Vec::new(),
        }
    }

    /// Set the report directory
    pub fn report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.report_dir = dir.into();
        self
    }

    /// Set the directory relative fixture paths resolve against
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// Replace the accepted test file suffixes
    pub fn suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suffixes = suffixes.into_iter().map(Into::into).collect();
        self
    }

    /// Add a framework script
    pub fn framework(mut self, reference: impl Into<String>) -> Self {
        self.framework.push(reference.into());
        self
    }

    /// Add a global fixture script
    pub fn fixture(mut self, reference: impl Into<String>) -> Self {
        self.fixtures.push(reference.into());
        self
    }

    /// Set the runner script
    pub fn runner(mut self, reference: impl Into<String>) -> Self {
        self.runner = reference.into();
        self
    }

    /// Set the marker identifying framework stack frames
    pub fn internal_marker(mut self, marker: impl Into<String>) -> Self {
        self.internal_marker = marker.into();
        self
    }

    /// Only run the given files
    pub fn files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }
}

impl Default for RunParams {
    fn default() -> Self {
        Self::new()
    }
}
