//! Loading the shared base scope and the runner script

use crate::error::{Error, Result};
use crate::interpreter::{Interpreter, ScriptRef, CLASSPATH_PREFIX};
use crate::run::params::RunParams;
use crate::scope::{BaseScope, Scope};
use crate::timing::PhaseTimer;
use std::fs;
use std::path::Path;

/// Source text of a script plus the origin name it executes under
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSource {
    pub origin: String,
    pub source: String,
}

/// Look up a bundled resource, retrying without a leading `/`
pub fn load_resource<I: Interpreter + ?Sized>(interpreter: &I, id: &str) -> Result<LoadedSource> {
    tracing::debug!("loading resource {}", id);

    let (id, bytes) = match interpreter.load_resource(id) {
        Ok(bytes) => (id, bytes),
        Err(first) => match id.strip_prefix('/') {
            Some(stripped) => {
                tracing::debug!("Resource not found {}, retrying as {}", id, stripped);
                let bytes = interpreter.load_resource(stripped).map_err(|e| {
                    Error::fixture_error(
                        format!("{}{}", CLASSPATH_PREFIX, id),
                        format!("cannot load resource: {}", e),
                    )
                })?;
                (stripped, bytes)
            }
            None => {
                return Err(Error::fixture_error(
                    format!("{}{}", CLASSPATH_PREFIX, id),
                    format!("cannot load resource: {}", first),
                ))
            }
        },
    };

    let source = String::from_utf8(bytes).map_err(|e| {
        Error::fixture_error(format!("{}{}", CLASSPATH_PREFIX, id), e)
    })?;

    Ok(LoadedSource {
        origin: format!("{}{}", CLASSPATH_PREFIX, id),
        source,
    })
}

/// Read a script reference, resolving relative paths against `base_dir`
pub fn read_script<I: Interpreter + ?Sized>(
    interpreter: &I,
    reference: &ScriptRef,
    base_dir: &Path,
) -> Result<LoadedSource> {
    match reference {
        ScriptRef::Resource(id) => load_resource(interpreter, id),
        ScriptRef::File(path) => {
            let path = if path.is_absolute() {
                path.clone()
            } else {
                base_dir.join(path)
            };
            let source = fs::read_to_string(&path)
                .map_err(|e| Error::fixture_error(path.display().to_string(), e))?;
            Ok(LoadedSource {
                origin: path.display().to_string(),
                source,
            })
        }
    }
}

/// Build the base scope from the framework scripts and global fixtures
///
/// Scripts run in the order given, framework first. Any failure aborts the
/// run before a single test executes.
pub fn load_base_scope<I: Interpreter>(
    interpreter: &mut I,
    params: &RunParams,
    timings: &mut PhaseTimer,
) -> Result<BaseScope> {
    let mut scope = Scope::new();

    timings.time("loading environment", || {
        load_scripts(interpreter, &params.framework, &params.base_dir, &mut scope)
    })?;
    timings.time("loading global scripts", || {
        load_scripts(interpreter, &params.fixtures, &params.base_dir, &mut scope)
    })?;

    Ok(BaseScope::freeze(scope))
}

fn load_scripts<I: Interpreter>(
    interpreter: &mut I,
    references: &[String],
    base_dir: &Path,
    scope: &mut Scope,
) -> Result<()> {
    for reference in references {
        let script_ref = ScriptRef::parse(reference);
        tracing::info!("Loading {}", script_ref);

        let loaded = read_script(&*interpreter, &script_ref, base_dir)?;
        let source = interpreter
            .prepare_source(&loaded.origin, loaded.source)
            .map_err(|e| Error::fixture_error(reference.as_str(), e))?;
        interpreter
            .execute(&source, &loaded.origin, scope)
            .map_err(|e| Error::fixture_error(reference.as_str(), e))?;
    }
    Ok(())
}

/// Compile the runner script once for the whole run
pub fn compile_runner<I: Interpreter>(
    interpreter: &mut I,
    params: &RunParams,
) -> Result<I::Script> {
    let script_ref = ScriptRef::parse(&params.runner);
    let loaded = read_script(&*interpreter, &script_ref, &params.base_dir)?;
    let source = interpreter
        .prepare_source(&loaded.origin, loaded.source)
        .map_err(|e| Error::fixture_error(params.runner.as_str(), e))?;
    interpreter
        .compile(&source, &loaded.origin)
        .map_err(|e| Error::fixture_error(params.runner.as_str(), e))
}
