//! Host adapter that drives a Python interpreter
//!
//! The introspection script is embedded in the binary, written to a
//! temporary file for each call and run with the configured interpreter.
//! Requests travel over stdin and snapshots come back over stdout, both as
//! JSON.

use std::io::Write;
use std::process::{Command, Stdio};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{HostError, HostRuntime};
use crate::config::BuiltinTypeSpec;
use crate::snapshot::HostSnapshot;

const INTROSPECT_SCRIPT: &str = include_str!("introspect.py");

#[derive(Serialize)]
struct LoadRequest<'a> {
    modules: &'a [String],
    builtin_types: &'a [BuiltinTypeSpec],
}

#[derive(Deserialize)]
struct ScanResponse {
    scanned: Vec<String>,
}

/// A live Python interpreter used as the reference runtime
#[derive(Debug, Clone)]
pub struct PythonHost {
    command: String,
}

impl PythonHost {
    /// Use `command` (e.g. `python3` or an absolute path) as the interpreter
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Run the introspection script in `mode` and return its stdout
    fn run(&self, mode: &str, request: &[u8]) -> Result<Vec<u8>, HostError> {
        let mut script = tempfile::Builder::new()
            .prefix("docgen-introspect-")
            .suffix(".py")
            .tempfile()?;
        script.write_all(INTROSPECT_SCRIPT.as_bytes())?;
        script.flush()?;

        debug!(command = %self.command, mode, "starting host interpreter");
        let mut child = Command::new(&self.command)
            .arg(script.path())
            .arg(mode)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| HostError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        // The script reads the whole request before producing any output.
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(request)?;
        }
        let output = child.wait_with_output()?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(HostError::ProcessFailed {
                command: format!("{} {mode}", self.command),
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }
        if !stderr.trim().is_empty() {
            debug!(mode, "host stderr: {}", stderr.trim());
        }

        Ok(output.stdout)
    }

    fn decode<T: DeserializeOwned>(&self, mode: &str, stdout: &[u8]) -> Result<T, HostError> {
        serde_json::from_slice(stdout).map_err(|source| HostError::Json {
            origin: format!("`{} {mode}`", self.command),
            source,
        })
    }
}

impl Default for PythonHost {
    fn default() -> Self {
        Self::new("python3")
    }
}

impl HostRuntime for PythonHost {
    fn scan_modules(&mut self) -> Result<Vec<String>, HostError> {
        let stdout = self.run("scan", b"{}")?;
        let response: ScanResponse = self.decode("scan", &stdout)?;
        debug!(count = response.scanned.len(), "host scanner finished");
        Ok(response.scanned)
    }

    fn load_modules(
        &mut self,
        modules: &[String],
        builtin_types: &[BuiltinTypeSpec],
    ) -> Result<HostSnapshot, HostError> {
        let request = serde_json::to_vec(&LoadRequest {
            modules,
            builtin_types,
        })
        .map_err(|source| HostError::Json {
            origin: "load request".to_string(),
            source,
        })?;

        let stdout = self.run("load", &request)?;
        let snapshot: HostSnapshot = self.decode("load", &stdout)?;
        info!(
            host = snapshot.host.as_deref().unwrap_or("unknown"),
            objects = snapshot.objects.len(),
            "loaded host object graph"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{AttrValue, ModuleState, ObjectGraph};

    /// The default interpreter, if one can be started on this machine
    fn live_host() -> Option<PythonHost> {
        let host = PythonHost::default();
        let available = Command::new(host.command())
            .arg("--version")
            .output()
            .is_ok_and(|output| output.status.success());
        if !available {
            eprintln!("python3 not available, skipping live host test");
        }
        available.then_some(host)
    }

    #[test]
    fn missing_interpreter_is_a_spawn_error() {
        let mut host = PythonHost::new("docgen-no-such-interpreter");
        let err = host.scan_modules().unwrap_err();
        assert!(matches!(err, HostError::Spawn { ref command, .. } if command == "docgen-no-such-interpreter"));
    }

    #[test]
    fn embedded_script_knows_both_modes() {
        assert!(INTROSPECT_SCRIPT.contains("\"scan\": scan"));
        assert!(INTROSPECT_SCRIPT.contains("\"load\": load"));
    }

    #[test]
    fn load_request_shape() {
        let modules = vec!["math".to_string()];
        let types = vec![BuiltinTypeSpec::new("none", "type(None)")];
        let json = serde_json::to_value(LoadRequest {
            modules: &modules,
            builtin_types: &types,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "modules": ["math"],
                "builtin_types": [{"label": "none", "expr": "type(None)"}]
            })
        );
    }

    #[test]
    fn default_interpreter() {
        assert_eq!(PythonHost::default().command(), "python3");
    }

    #[test]
    fn live_scan_reports_stdlib_modules() {
        let Some(mut host) = live_host() else {
            return;
        };
        let scanned = host.scan_modules().unwrap();
        assert!(scanned.iter().any(|name| name == "json"));
        assert!(scanned.iter().any(|name| name == "json.decoder"));
    }

    #[test]
    fn live_load_records_every_slot_kind() {
        let Some(mut host) = live_host() else {
            return;
        };
        let modules: Vec<String> = ["math", "json", "no_such_mod"].map(String::from).to_vec();
        let snapshot = host
            .load_modules(&modules, &[BuiltinTypeSpec::new("none", "type(None)")])
            .unwrap();

        assert!(snapshot.host.is_some());
        assert_eq!(
            snapshot.modules.iter().map(|slot| slot.name.as_str()).collect::<Vec<_>>(),
            vec!["math", "json", "no_such_mod"]
        );
        assert_eq!(snapshot.module("json").map(|slot| &slot.state), Some(&ModuleState::Source));
        assert!(matches!(
            snapshot.module("no_such_mod").map(|slot| &slot.state),
            Some(ModuleState::Failed { error }) if error.starts_with("ModuleNotFoundError")
        ));

        let Some(&ModuleState::Loaded { object: math }) = snapshot.module("math").map(|slot| &slot.state) else {
            panic!("math was not loaded: {:?}", snapshot.module("math"));
        };
        let graph = ObjectGraph::new(&snapshot);
        let math_object = graph.get(math).unwrap();
        assert!(math_object.is_module);
        assert_eq!(math_object.module, Some(math));
        assert!(math_object.doc.is_some());

        let sqrt = math_object
            .attrs
            .as_deref()
            .unwrap()
            .iter()
            .find(|attr| attr.name == "sqrt")
            .map(|attr| attr.value.clone());
        let Some(AttrValue::Object(sqrt)) = sqrt else {
            panic!("math.sqrt missing: {sqrt:?}");
        };
        let sqrt = graph.get(sqrt).unwrap();
        assert!(sqrt.is_builtin);
        assert_eq!(sqrt.module, Some(math));
        assert!(sqrt.attrs.is_none());

        let none = &snapshot.builtin_types[0];
        assert_eq!((none.label.as_str(), none.name.as_str()), ("none", "NoneType"));
        assert!(graph.get(none.object).is_some());
        assert!(graph.builtins().is_some());
    }
}
