// Copyright 2026 Evonet Contributors
// SPDX-License-Identifier: Apache-2.0

/*!
Compiler bridge: compile generated source into an executable artifact
and run it as a subprocess.

All artifact state is table-driven and mutex-guarded so a population can
share one bridge across its worker threads. Artifact names are bare
identifiers; the bridge owns the mapping from name to on-disk path and
rejects names that would address outside its working directory.
*/

use std::path::{Path, PathBuf};
use std::process::Command;

use ahash::AHashMap;
use parking_lot::Mutex;
use tracing::debug;

use crate::{CodegenError, CodegenResult};

/// Format one runtime input as a subprocess argument.
///
/// Six fractional digits, the same precision the emitter uses for
/// literals inside the generated source.
pub fn format_arg(value: f64) -> String {
    format!("{value:.6}")
}

/// Contract for turning generated source into a runnable program.
///
/// Implementations must be safe to share across worker threads; the
/// population calls `compile` and `execute` concurrently for distinct
/// artifact names.
pub trait CompilerBridge: Send + Sync {
    /// Compile `source` into an executable registered under `name`,
    /// replacing any previous artifact of the same name.
    fn compile(&self, name: &str, source: &str, keep_source: bool) -> CodegenResult<()>;

    /// Whether an artifact named `name` is currently registered.
    fn has(&self, name: &str) -> bool;

    /// Run the artifact with one argument per input and parse its
    /// stdout as whitespace-separated numbers.
    fn execute(&self, name: &str, inputs: &[f64]) -> CodegenResult<Vec<f64>>;

    /// Drop the artifact. Returns whether it was registered.
    fn remove(&self, name: &str) -> bool;

    /// Drop every artifact.
    fn clear(&self);
}

fn validate_name(name: &str) -> CodegenResult<()> {
    if name.is_empty() || name.contains(['/', '\\', '.']) {
        return Err(CodegenError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Bridge backed by the system C compiler.
pub struct CcBridge {
    workdir: PathBuf,
    compiler: String,
    artifacts: Mutex<AHashMap<String, PathBuf>>,
}

impl CcBridge {
    /// Create a bridge that compiles into `workdir`. The directory is
    /// created if missing and must resolve inside the process's current
    /// directory tree; anything outside is rejected.
    pub fn new(workdir: impl AsRef<Path>) -> CodegenResult<Self> {
        let workdir = workdir.as_ref();
        std::fs::create_dir_all(workdir)?;
        let workdir = workdir.canonicalize()?;
        let root = std::env::current_dir()?.canonicalize()?;
        if !workdir.starts_with(&root) {
            return Err(CodegenError::WorkdirEscape(workdir));
        }
        Ok(Self {
            workdir,
            compiler: "cc".to_string(),
            artifacts: Mutex::new(AHashMap::new()),
        })
    }

    fn artifact_path(&self, name: &str) -> CodegenResult<PathBuf> {
        validate_name(name)?;
        Ok(self.workdir.join(name))
    }
}

impl CompilerBridge for CcBridge {
    fn compile(&self, name: &str, source: &str, keep_source: bool) -> CodegenResult<()> {
        let binary = self.artifact_path(name)?;
        let unit = binary.with_extension("c");
        std::fs::write(&unit, source)?;

        let output = Command::new(&self.compiler)
            .arg("-O2")
            .arg("-o")
            .arg(&binary)
            .arg(&unit)
            .arg("-lm")
            .output()?;
        if !keep_source {
            let _ = std::fs::remove_file(&unit);
        }
        if !output.status.success() {
            return Err(CodegenError::CompileFailed {
                name: name.to_string(),
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!(artifact = name, "compiled network program");
        self.artifacts.lock().insert(name.to_string(), binary);
        Ok(())
    }

    fn has(&self, name: &str) -> bool {
        self.artifacts.lock().contains_key(name)
    }

    fn execute(&self, name: &str, inputs: &[f64]) -> CodegenResult<Vec<f64>> {
        let binary = {
            let artifacts = self.artifacts.lock();
            artifacts
                .get(name)
                .cloned()
                .ok_or_else(|| CodegenError::NotCompiled(name.to_string()))?
        };

        let output = Command::new(&binary)
            .args(inputs.iter().map(|value| format_arg(*value)))
            .output()?;
        if !output.status.success() {
            return Err(CodegenError::ExecuteFailed {
                name: name.to_string(),
                detail: format!("exit status {}", output.status),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout
            .split_whitespace()
            .map(|token| {
                token
                    .parse::<f64>()
                    .map_err(|_| CodegenError::OutputParse(token.to_string()))
            })
            .collect()
    }

    fn remove(&self, name: &str) -> bool {
        match self.artifacts.lock().remove(name) {
            Some(binary) => {
                let _ = std::fs::remove_file(&binary);
                let _ = std::fs::remove_file(binary.with_extension("c"));
                true
            }
            None => false,
        }
    }

    fn clear(&self) {
        let mut artifacts = self.artifacts.lock();
        for binary in artifacts.values() {
            let _ = std::fs::remove_file(binary);
            let _ = std::fs::remove_file(binary.with_extension("c"));
        }
        artifacts.clear();
    }
}

/// In-memory bridge for tests: records compiled sources and executed
/// argument vectors, returning scripted outputs.
#[derive(Default)]
pub struct MockBridge {
    sources: Mutex<AHashMap<String, String>>,
    scripts: Mutex<AHashMap<String, Vec<f64>>>,
    executions: Mutex<Vec<(String, Vec<String>)>>,
}

impl MockBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the output vector `execute` returns for `name`.
    /// Unscripted artifacts return a single zero.
    pub fn script(&self, name: &str, outputs: Vec<f64>) {
        self.scripts.lock().insert(name.to_string(), outputs);
    }

    pub fn compiled_source(&self, name: &str) -> Option<String> {
        self.sources.lock().get(name).cloned()
    }

    /// Every `execute` call so far, as (artifact, formatted args).
    pub fn executions(&self) -> Vec<(String, Vec<String>)> {
        self.executions.lock().clone()
    }

    pub fn compile_count(&self) -> usize {
        self.sources.lock().len()
    }
}

impl CompilerBridge for MockBridge {
    fn compile(&self, name: &str, source: &str, _keep_source: bool) -> CodegenResult<()> {
        validate_name(name)?;
        self.sources
            .lock()
            .insert(name.to_string(), source.to_string());
        Ok(())
    }

    fn has(&self, name: &str) -> bool {
        self.sources.lock().contains_key(name)
    }

    fn execute(&self, name: &str, inputs: &[f64]) -> CodegenResult<Vec<f64>> {
        if !self.has(name) {
            return Err(CodegenError::NotCompiled(name.to_string()));
        }
        let args = inputs.iter().map(|value| format_arg(*value)).collect();
        self.executions.lock().push((name.to_string(), args));
        Ok(self
            .scripts
            .lock()
            .get(name)
            .cloned()
            .unwrap_or_else(|| vec![0.0]))
    }

    fn remove(&self, name: &str) -> bool {
        self.scripts.lock().remove(name);
        self.sources.lock().remove(name).is_some()
    }

    fn clear(&self) {
        self.sources.lock().clear();
        self.scripts.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_formatting_uses_six_decimals() {
        assert_eq!(format_arg(1.0), "1.000000");
        assert_eq!(format_arg(0.0), "0.000000");
        assert_eq!(format_arg(-0.5), "-0.500000");
    }

    #[test]
    fn names_with_separators_or_extensions_are_rejected() {
        for bad in ["", "a/b", "a\\b", "network.exe", "../escape"] {
            assert!(matches!(
                validate_name(bad),
                Err(CodegenError::InvalidName(_))
            ));
        }
        assert!(validate_name("network-7").is_ok());
    }

    #[test]
    fn mock_execute_requires_compile_first() {
        let bridge = MockBridge::new();
        assert!(matches!(
            bridge.execute("network-1", &[1.0]),
            Err(CodegenError::NotCompiled(_))
        ));

        bridge.compile("network-1", "int main() {}", false).unwrap();
        bridge.script("network-1", vec![0.25, 0.75]);
        let outputs = bridge.execute("network-1", &[1.0, 0.0]).unwrap();
        assert_eq!(outputs, vec![0.25, 0.75]);
        assert_eq!(
            bridge.executions(),
            vec![(
                "network-1".to_string(),
                vec!["1.000000".to_string(), "0.000000".to_string()]
            )]
        );
    }

    #[test]
    fn mock_remove_reports_presence() {
        let bridge = MockBridge::new();
        bridge.compile("network-1", "", false).unwrap();
        assert!(bridge.has("network-1"));
        assert!(bridge.remove("network-1"));
        assert!(!bridge.remove("network-1"));
        assert!(!bridge.has("network-1"));
    }

    #[test]
    fn cc_bridge_rejects_a_workdir_outside_the_process_tree() {
        // tempdir() lands under the system temp root, not under cwd
        let outside = tempfile::tempdir().unwrap();
        assert!(matches!(
            CcBridge::new(outside.path()),
            Err(CodegenError::WorkdirEscape(_))
        ));
    }

    #[test]
    fn cc_bridge_tracks_artifacts_in_its_workdir() {
        let cwd = std::env::current_dir().unwrap();
        let dir = tempfile::tempdir_in(cwd).unwrap();
        let bridge = CcBridge::new(dir.path()).unwrap();
        assert!(!bridge.has("network-1"));
        assert!(!bridge.remove("network-1"));
        assert!(matches!(
            bridge.execute("network-1", &[]),
            Err(CodegenError::NotCompiled(_))
        ));
        assert!(matches!(
            bridge.compile("nested/name", "", false),
            Err(CodegenError::InvalidName(_))
        ));
    }
}
