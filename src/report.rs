//! JUnit-compatible XML reports, one document per test file

use crate::discovery::TestFile;
use crate::error::{Error, Result};
use crate::run::execution::TestResult;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Timestamp layout of the `testsuite` element
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Writes `TEST-<module>.xml` files into a report directory
///
/// The directory is emptied before anything is written, so reports from an
/// earlier run never sit next to the current ones.
#[derive(Debug)]
pub struct ReportWriter {
    dir: PathBuf,
    prepared: bool,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ReportWriter {
            dir: dir.into(),
            prepared: false,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Refuse a report directory that is, or contains, the suite root
    ///
    /// [`prepare`](Self::prepare) deletes everything below the directory,
    /// test sources included.
    pub fn check_outside(&self, suite_root: &Path) -> Result<()> {
        let dir = resolve(&self.dir);
        let root = resolve(suite_root);
        if root.starts_with(&dir) {
            return Err(Error::report_error(
                &self.dir,
                format!("report directory contains the suite root {}", suite_root.display()),
            ));
        }
        Ok(())
    }

    /// Create the report directory and delete everything already in it
    pub fn prepare(&mut self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| Error::report_error(&self.dir, e))?;

        let entries = fs::read_dir(&self.dir).map_err(|e| Error::report_error(&self.dir, e))?;
        for entry in entries {
            let path = entry.map_err(|e| Error::report_error(&self.dir, e))?.path();
            let removed = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            removed.map_err(|e| Error::report_error(&path, e))?;
        }

        self.prepared = true;
        Ok(())
    }

    /// Write the report for one test file, returning its path
    pub fn write(&mut self, file: &TestFile, result: &TestResult) -> Result<PathBuf> {
        if !self.prepared {
            self.prepare()?;
        }

        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        let xml = render(&file.module, result, &timestamp);
        let path = self.dir.join(file.report_file_name());

        fs::write(&path, xml).map_err(|e| Error::report_error(&path, e))?;
        tracing::debug!("wrote report {}", path.display());
        Ok(path)
    }
}

fn resolve(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Render the XML document for one module
pub fn render(module: &str, result: &TestResult, timestamp: &str) -> String {
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");

    let total_seconds: f64 = result.cases.iter().map(|c| c.elapsed_millis / 1000.0).sum();
    let _ = writeln!(
        xml,
        "<testsuite tests=\"{}\" failures=\"{}\" name=\"{}\" timestamp=\"{}\" time=\"{:.3}\">",
        result.tried,
        result.failed,
        escape_attr(module),
        escape_attr(timestamp),
        total_seconds
    );

    for case in &result.cases {
        let open = format!(
            "  <testcase classname=\"{}\" name=\"{}\" time=\"{:.3}\"",
            escape_attr(module),
            escape_attr(&case.name),
            case.elapsed_millis / 1000.0
        );
        match &case.failure {
            None => {
                let _ = writeln!(xml, "{}/>", open);
            }
            Some(failure) => {
                let mut body = format!("{}\n", failure.message);
                for frame in &failure.stack_frames {
                    body.push_str(frame);
                    body.push('\n');
                }
                let _ = writeln!(xml, "{}>", open);
                let _ = writeln!(
                    xml,
                    "    <failure type=\"{}\" message=\"{}\">{}</failure>",
                    escape_attr(&failure.type_name),
                    escape_attr(&failure.message),
                    escape_text(&body)
                );
                xml.push_str("  </testcase>\n");
            }
        }
    }

    xml.push_str("</testsuite>\n");
    xml
}

/// Escape text for use inside an attribute value
pub fn escape_attr(text: &str) -> String {
    escape(text, true)
}

/// Escape character data; line breaks are kept as-is
pub fn escape_text(text: &str) -> String {
    escape(text, false)
}

fn escape(text: &str, attribute: bool) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if attribute => escaped.push_str("&quot;"),
            '\n' if attribute => escaped.push_str("&#10;"),
            '\r' if attribute => escaped.push_str("&#13;"),
            '\t' if attribute => escaped.push_str("&#9;"),
            '\n' | '\r' | '\t' => escaped.push(ch),
            // Other control characters are not allowed in XML 1.0
            c if (c as u32) < 0x20 => {}
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::classify::{FailureInfo, FailureKind};
    use crate::run::execution::CaseDetail;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn case(name: &str, millis: f64, failure: Option<FailureInfo>) -> CaseDetail {
        CaseDetail {
            name: name.to_string(),
            elapsed_millis: millis,
            failure,
        }
    }

    fn assertion(message: &str, frames: &[&str]) -> FailureInfo {
        FailureInfo {
            kind: FailureKind::AssertionFailure,
            type_name: "AssertionFailure".to_string(),
            message: message.to_string(),
            stack_frames: frames.iter().map(|f| f.to_string()).collect(),
        }
    }

    fn two_of_three() -> TestResult {
        TestResult {
            tried: 3,
            passed: 2,
            failed: 1,
            cases: vec![
                case("testOne", 12.0, None),
                case(
                    "testTwo",
                    3.25,
                    Some(assertion("expected 1, got 2", &["at testTwo (bar.js:4)"])),
                ),
                case("testThree", 0.0, None),
            ],
        }
    }

    #[test]
    fn test_render_document() {
        let xml = render("sub.bar", &two_of_three(), "2026-10-16T09:30:00");
        let expected = [
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>",
            concat!(
                "<testsuite tests=\"3\" failures=\"1\" name=\"sub.bar\" ",
                "timestamp=\"2026-10-16T09:30:00\" time=\"0.015\">"
            ),
            "  <testcase classname=\"sub.bar\" name=\"testOne\" time=\"0.012\"/>",
            "  <testcase classname=\"sub.bar\" name=\"testTwo\" time=\"0.003\">",
            concat!(
                "    <failure type=\"AssertionFailure\" message=\"expected 1, got 2\">",
                "expected 1, got 2"
            ),
            "at testTwo (bar.js:4)",
            "</failure>",
            "  </testcase>",
            "  <testcase classname=\"sub.bar\" name=\"testThree\" time=\"0.000\"/>",
            "</testsuite>",
            "",
        ]
        .join("\n");
        assert_eq!(xml, expected);
    }

    #[test]
    fn test_exactly_one_failing_testcase() {
        let xml = render("bar", &two_of_three(), "2026-10-16T09:30:00");
        assert!(xml.contains("tests=\"3\" failures=\"1\""));
        assert_eq!(xml.matches("<testcase ").count(), 3);
        assert_eq!(xml.matches("<failure ").count(), 1);
    }

    #[test]
    fn test_escapes_markup() {
        assert_eq!(escape_attr("a < b && \"c\""), "a &lt; b &amp;&amp; &quot;c&quot;");
        assert_eq!(escape_attr("two\nlines"), "two&#10;lines");
        assert_eq!(escape_text("two\nlines \"quoted\""), "two\nlines \"quoted\"");
        assert_eq!(escape_attr("bell\u{7}"), "bell");

        let result = TestResult {
            tried: 1,
            passed: 0,
            failed: 1,
            cases: vec![case("test<x>", 1.0, Some(assertion("<b>bold</b>", &[])))],
        };
        let xml = render("m", &result, "t");
        assert!(xml.contains("name=\"test&lt;x&gt;\""));
        assert!(xml.contains("message=\"&lt;b&gt;bold&lt;/b&gt;\""));
    }

    #[test]
    fn test_prepare_clears_stale_reports() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("reports");
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("stale.xml"), "<old/>").unwrap();
        fs::write(dir.join("nested").join("older.xml"), "<old/>").unwrap();

        let mut writer = ReportWriter::new(&dir);
        writer.prepare().unwrap();

        assert!(dir.is_dir());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[test]
    fn test_write_creates_missing_dir_and_names_file() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("suite");
        let dir = temp_dir.path().join("target").join("reports");
        let file = TestFile::new(&root, &root.join("a").join("b.js"), ".js");

        let mut writer = ReportWriter::new(&dir);
        let path = writer.write(&file, &two_of_three()).unwrap();

        assert_eq!(path, dir.join("TEST-a.b.xml"));
        let xml = fs::read_to_string(path).unwrap();
        assert!(xml.contains("name=\"a.b\""));
    }

    #[test]
    fn test_check_outside_refuses_suite_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("js");
        fs::create_dir_all(&root).unwrap();

        let same = ReportWriter::new(&root);
        assert!(matches!(same.check_outside(&root), Err(Error::Report { .. })));

        let parent = ReportWriter::new(temp_dir.path());
        let err = parent.check_outside(&root).unwrap_err();
        assert!(err.to_string().contains("contains the suite root"));

        let sibling = ReportWriter::new(temp_dir.path().join("reports"));
        assert!(sibling.check_outside(&root).is_ok());

        let nested = ReportWriter::new(root.join("reports"));
        assert!(nested.check_outside(&root).is_ok());
    }

    #[test]
    fn test_write_into_file_path_fails() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "not a dir").unwrap();

        let mut writer = ReportWriter::new(&blocker);
        let root = temp_dir.path();
        let file = TestFile::new(root, &root.join("x.js"), ".js");
        let err = writer.write(&file, &TestResult::default()).unwrap_err();
        assert!(matches!(err, Error::Report { .. }));
    }
}
