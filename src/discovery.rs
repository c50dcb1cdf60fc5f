//! Test discovery

use crate::error::{Error, Result};
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A discovered test script
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestFile {
    /// Full path to the script
    pub path: PathBuf,
    /// Path relative to the suite root, `/`-separated
    pub relative: String,
    /// Report module name, e.g. `a/b/c.js` becomes `a.b.c`
    pub module: String,
}

impl TestFile {
    /// Build a test file entry from its path under `root`
    pub fn new(root: &Path, path: &Path, suffix: &str) -> Self {
        let relative = match path.strip_prefix(root) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
            _ => PathBuf::from(path.file_name().unwrap_or(path.as_os_str())),
        };
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let module = module_name(&relative, suffix);

        TestFile {
            path: path.to_path_buf(),
            relative,
            module,
        }
    }

    /// File name of the report for this module
    pub fn report_file_name(&self) -> String {
        format!("TEST-{}.xml", self.module)
    }
}

/// Derive the dotted module name from a relative path
pub fn module_name(relative: &str, suffix: &str) -> String {
    let stem = relative.strip_suffix(suffix).unwrap_or(relative);
    stem.replace(['/', '\\'], ".")
}

/// Build a matcher for file names ending in any of `suffixes`
pub fn suffix_matcher(root: &Path, suffixes: &[String]) -> Result<Regex> {
    if suffixes.is_empty() {
        return Err(Error::discovery_error(root, "no test file suffixes configured"));
    }
    let alternatives: Vec<String> = suffixes.iter().map(|s| regex::escape(s)).collect();
    Ok(Regex::new(&format!("({})$", alternatives.join("|")))?)
}

/// Recursively collect test scripts under `root`, sorted by path
///
/// An empty result is not an error; a missing or unreadable root is, and so
/// are two files that would write the same report.
pub fn discover(root: &Path, suffixes: &[String]) -> Result<Vec<TestFile>> {
    if !root.exists() {
        return Err(Error::discovery_error(root, "directory does not exist"));
    }

    let matcher = suffix_matcher(root, suffixes)?;
    let mut test_files = Vec::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|e| Error::discovery_error(root, e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(file_name) = entry.file_name().to_str() {
            if let Some(m) = matcher.find(file_name) {
                test_files.push(TestFile::new(root, entry.path(), m.as_str()));
            }
        }
    }

    // Sort test files for consistent execution order
    test_files.sort_by(|a, b| a.relative.cmp(&b.relative));
    check_module_names(root, &test_files)?;

    tracing::debug!(root = %root.display(), count = test_files.len(), "discovered test files");
    Ok(test_files)
}

/// Reject files whose module names, and so report names, collide
///
/// `foo.js` and `foo.coffee`, or `a/b.c.js` and `a/b/c.js`, would otherwise
/// overwrite each other's report.
fn check_module_names(root: &Path, files: &[TestFile]) -> Result<()> {
    let mut seen: HashMap<&str, &TestFile> = HashMap::new();
    for file in files {
        if let Some(first) = seen.insert(file.module.as_str(), file) {
            return Err(Error::discovery_error(
                root,
                format!(
                    "{} and {} both map to module {} ({})",
                    first.relative,
                    file.relative,
                    file.module,
                    file.report_file_name()
                ),
            ));
        }
    }
    Ok(())
}

/// Keep only the files named in `selected` (relative path or module name)
pub fn select(files: Vec<TestFile>, selected: &[String], root: &Path) -> Result<Vec<TestFile>> {
    if selected.is_empty() {
        return Ok(files);
    }

    for wanted in selected {
        let wanted = wanted.replace('\\', "/");
        if !files.iter().any(|f| f.relative == wanted || f.module == wanted) {
            return Err(Error::discovery_error(
                root,
                format!("Test file not found: {}", wanted),
            ));
        }
    }

    Ok(files
        .into_iter()
        .filter(|f| {
            selected
                .iter()
                .map(|s| s.replace('\\', "/"))
                .any(|s| f.relative == s || f.module == s)
        })
        .collect())
}
