//! In-memory interpreter for integration tests
//!
//! Understands a tiny line language, enough to drive a suite:
//!
//! ```text
//! let NAME = LITERAL
//! fn NAME: STMT; STMT; ...
//! throw ERRORNAME message words      (top level: aborts the script)
//! @run_tests                         (runner: calls every test* function)
//! @malformed                         (runner: leaves broken counters)
//! ```
//!
//! Statements inside functions: `assert_eq A B`, `assert_unbound NAME`,
//! `throw ERRORNAME message words`, `raise LITERAL`, `set NAME LITERAL`,
//! `pass`. Files ending in `.coffee` may write `NAME -> BODY` for functions.

#![allow(dead_code)]

use scriptsuite_rs::{HostObject, Interpreter, Object, Scope, ScriptError, Value};
use std::any::Any;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Milliseconds the fake runner records for every case
pub const CASE_MILLIS: f64 = 12.0;

pub const RUNNER_ID: &str = "js/testrunner.js";
pub const FRAMEWORK_ID: &str = "js/jsUnitCore.js";

#[derive(Debug, Clone)]
enum Stmt {
    AssertEq(String, String),
    AssertUnbound(String),
    Throw(String, String),
    Raise(String),
    Set(String, String),
    Pass,
}

#[derive(Debug, Clone)]
struct Line {
    number: usize,
    stmt: Stmt,
}

#[derive(Debug, Clone)]
enum Item {
    Let(String, String),
    Fn(String, Vec<Line>),
    Top(Line),
    RunTests,
    Malformed,
}

/// A compiled fake script
#[derive(Debug, Clone)]
pub struct FakeScript {
    origin: String,
    items: Vec<Item>,
}

/// A function value living in a scope
#[derive(Debug, Clone)]
struct FakeFn {
    name: String,
    origin: String,
    body: Vec<Line>,
}

impl HostObject for FakeFn {
    fn class_name(&self) -> &str {
        "Function"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Default)]
pub struct FakeInterpreter {
    resources: HashMap<String, String>,
    /// Origins passed to `execute`, in call order
    pub executed: Vec<String>,
    /// Number of `compile` calls
    pub compiled: usize,
}

impl FakeInterpreter {
    /// An interpreter bundling the default runner and a framework script
    pub fn new() -> Self {
        FakeInterpreter::default()
            .with_resource(RUNNER_ID, "@run_tests\n")
            .with_resource(FRAMEWORK_ID, "let frameworkLoaded = true\n")
    }

    pub fn with_resource(mut self, id: &str, source: &str) -> Self {
        self.resources.insert(id.to_string(), source.to_string());
        self
    }
}

impl Interpreter for FakeInterpreter {
    type Script = FakeScript;

    fn execute(
        &mut self,
        source: &str,
        origin: &str,
        scope: &mut Scope,
    ) -> Result<(), ScriptError> {
        self.executed.push(origin.to_string());
        let script = parse(source, origin)?;
        run(&script, scope)
    }

    fn compile(&mut self, source: &str, origin: &str) -> Result<FakeScript, ScriptError> {
        self.compiled += 1;
        parse(source, origin)
    }

    fn exec_compiled(&mut self, script: &FakeScript, scope: &mut Scope) -> Result<(), ScriptError> {
        run(script, scope)
    }

    fn load_resource(&self, id: &str) -> anyhow::Result<Vec<u8>> {
        match self.resources.get(id) {
            Some(source) => Ok(source.clone().into_bytes()),
            None => anyhow::bail!("no such resource: {}", id),
        }
    }

    fn prepare_source(&mut self, origin: &str, source: String) -> Result<String, ScriptError> {
        if !origin.ends_with(".coffee") {
            return Ok(source);
        }
        let lines: Vec<String> = source
            .lines()
            .map(|line| match line.split_once("->") {
                Some((name, body)) => format!("fn {}: {}", name.trim(), body.trim()),
                None => line.to_string(),
            })
            .collect();
        Ok(lines.join("\n"))
    }
}

fn parse(source: &str, origin: &str) -> Result<FakeScript, ScriptError> {
    let mut items = Vec::new();

    for (index, raw) in source.lines().enumerate() {
        let number = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }

        let item = if line == "@run_tests" {
            Item::RunTests
        } else if line == "@malformed" {
            Item::Malformed
        } else if let Some(rest) = line.strip_prefix("let ") {
            let (name, literal) = rest
                .split_once('=')
                .ok_or_else(|| ScriptError::syntax("missing = in let", origin, number))?;
            Item::Let(name.trim().to_string(), literal.trim().to_string())
        } else if let Some(rest) = line.strip_prefix("fn ") {
            let (name, body) = rest
                .split_once(':')
                .ok_or_else(|| ScriptError::syntax("missing : in fn", origin, number))?;
            let body = body
                .split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| parse_stmt(s, origin, number))
                .collect::<Result<Vec<_>, _>>()?;
            Item::Fn(name.trim().to_string(), body)
        } else {
            Item::Top(parse_stmt(line, origin, number)?)
        };
        items.push(item);
    }

    Ok(FakeScript {
        origin: origin.to_string(),
        items,
    })
}

fn parse_stmt(text: &str, origin: &str, number: usize) -> Result<Line, ScriptError> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let stmt = match words.as_slice() {
        ["assert_eq", a, b] => Stmt::AssertEq(a.to_string(), b.to_string()),
        ["assert_unbound", name] => Stmt::AssertUnbound(name.to_string()),
        ["throw", name, message @ ..] => Stmt::Throw(name.to_string(), message.join(" ")),
        ["raise", literal] => Stmt::Raise(literal.to_string()),
        ["set", name, literal] => Stmt::Set(name.to_string(), literal.to_string()),
        ["pass"] => Stmt::Pass,
        _ => {
            return Err(ScriptError::syntax(
                format!("unexpected statement '{}'", text),
                origin,
                number,
            ))
        }
    };
    Ok(Line { number, stmt })
}

fn literal(text: &str, scope: &Scope) -> Value {
    match text {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        "undefined" => Value::Undefined,
        _ => {
            if let Ok(n) = text.parse::<f64>() {
                Value::Number(n)
            } else if let Some(s) = text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
                Value::String(s.to_string())
            } else {
                scope.get(text).cloned().unwrap_or_default()
            }
        }
    }
}

fn run(script: &FakeScript, scope: &mut Scope) -> Result<(), ScriptError> {
    for item in &script.items {
        match item {
            Item::Let(name, text) => {
                let value = literal(text, scope);
                scope.set(name.as_str(), value);
            }
            Item::Fn(name, body) => scope.set(
                name.as_str(),
                Value::host(FakeFn {
                    name: name.clone(),
                    origin: script.origin.clone(),
                    body: body.clone(),
                }),
            ),
            Item::Top(line) => {
                if let Err(thrown) = exec_line(line, "<top>", &script.origin, scope) {
                    return Err(ScriptError::runtime(thrown.to_string(), &script.origin));
                }
            }
            Item::RunTests => run_tests(scope),
            Item::Malformed => {
                scope.set("tried", "lots");
                scope.set("passed", 0i64);
                scope.set("failed", 0i64);
                scope.set("details", Object::new());
            }
        }
    }
    Ok(())
}

fn trace(function: &str, origin: &str, number: usize, runner: &str) -> String {
    format!(
        "at {} ({}:{})\nat runTests ({}:3)\n",
        function, origin, number, runner
    )
}

fn exec_line(line: &Line, function: &str, origin: &str, scope: &mut Scope) -> Result<(), Value> {
    let runner = format!("classpath:{}", RUNNER_ID);
    match &line.stmt {
        Stmt::AssertEq(expected, actual) => {
            let expected = literal(expected, scope).to_string();
            let actual = literal(actual, scope).to_string();
            if expected != actual {
                return Err(Value::Object(
                    Object::new()
                        .with("isJsUnitException", true)
                        .with("jsUnitMessage", format!("expected {}, got {}", expected, actual))
                        .with("stackTrace", trace(function, origin, line.number, &runner)),
                ));
            }
        }
        Stmt::AssertUnbound(name) => {
            if scope.has(name) {
                return Err(Value::Object(
                    Object::new()
                        .with("isJsUnitException", true)
                        .with("jsUnitMessage", format!("{} is bound", name))
                        .with("stackTrace", trace(function, origin, line.number, &runner)),
                ));
            }
        }
        Stmt::Throw(name, message) => {
            return Err(Value::Object(
                Object::new()
                    .with("name", name.as_str())
                    .with("message", message.as_str())
                    .with("engineException", true)
                    .with("stackTrace", trace(function, origin, line.number, &runner)),
            ));
        }
        Stmt::Raise(text) => return Err(literal(text, scope)),
        Stmt::Set(name, text) => {
            let value = literal(text, scope);
            scope.set(name.as_str(), value);
        }
        Stmt::Pass => {}
    }
    Ok(())
}

fn function(scope: &Scope, name: &str) -> Option<FakeFn> {
    match scope.get(name) {
        Some(Value::Host(host)) => host.as_any().downcast_ref::<FakeFn>().cloned(),
        _ => None,
    }
}

fn call(function: &FakeFn, scope: &mut Scope) -> Result<(), Value> {
    for line in &function.body {
        exec_line(line, &function.name, &function.origin, scope)?;
    }
    Ok(())
}

fn run_tests(scope: &mut Scope) {
    let tests: Vec<FakeFn> = scope
        .names()
        .iter()
        .filter(|name| name.starts_with("test"))
        .filter_map(|name| function(scope, name))
        .collect();

    let mut passed = 0usize;
    let mut failed = 0usize;
    let mut details = Object::new();

    for test in &tests {
        let mut outcome = Ok(());
        if let Some(set_up) = function(scope, "setUp") {
            outcome = call(&set_up, scope);
        }
        if outcome.is_ok() {
            outcome = call(test, scope);
        }
        if let Some(tear_down) = function(scope, "tearDown") {
            let _ = call(&tear_down, scope);
        }

        let detail = match outcome {
            Ok(()) => {
                passed += 1;
                Object::new().with("success", true).with("time", CASE_MILLIS)
            }
            Err(exception) => {
                failed += 1;
                Object::new()
                    .with("failure", true)
                    .with("exception", exception)
                    .with("time", CASE_MILLIS)
            }
        };
        details.insert(test.name.as_str(), detail);
    }

    scope.set("tried", tests.len());
    scope.set("passed", passed);
    scope.set("failed", failed);
    scope.set("details", details);
}

/// Write `files` (relative path, contents) under `root`
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (relative, contents) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }
}

/// Route `tracing` output through the test harness
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
