//! Host runtime adapters
//!
//! A [`HostRuntime`] answers the two questions the generator asks of the
//! reference interpreter: which modules exist, and what the object graph
//! behind a set of modules looks like. The answer to the second is a
//! [`HostSnapshot`]; everything downstream works on that snapshot alone.

mod python;

pub use python::PythonHost;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::BuiltinTypeSpec;
use crate::snapshot::HostSnapshot;

/// Errors raised while talking to a host runtime
#[derive(Error, Debug)]
pub enum HostError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid snapshot JSON from {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to start host `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("host `{command}` exited with {status}: {stderr}")]
    ProcessFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("module `{0}` was requested but is missing from the snapshot")]
    MissingModule(String),
}

/// Source of module names and object-graph snapshots
pub trait HostRuntime {
    /// Raw module names as reported by the host's module scanner
    ///
    /// Names that fail to scan are still reported. Dotted submodules and
    /// package initializers may be present; see
    /// [`crate::allowlist::top_level_modules`].
    fn scan_modules(&mut self) -> Result<Vec<String>, HostError>;

    /// Load `modules` and the requested built-in types and describe the
    /// reachable object graph
    ///
    /// The returned snapshot holds one module slot per requested name.
    fn load_modules(
        &mut self,
        modules: &[String],
        builtin_types: &[BuiltinTypeSpec],
    ) -> Result<HostSnapshot, HostError>;
}

/// A host backed by a previously recorded snapshot
#[derive(Debug, Clone)]
pub struct SnapshotHost {
    snapshot: HostSnapshot,
    origin: Option<PathBuf>,
}

impl SnapshotHost {
    pub fn new(snapshot: HostSnapshot) -> Self {
        Self {
            snapshot,
            origin: None,
        }
    }

    /// Replay a snapshot file written by `--dump-snapshot`
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, HostError> {
        let path = path.as_ref();
        Ok(Self {
            snapshot: HostSnapshot::from_path(path)?,
            origin: Some(path.to_path_buf()),
        })
    }

    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }
}

impl HostRuntime for SnapshotHost {
    fn scan_modules(&mut self) -> Result<Vec<String>, HostError> {
        Ok(self.snapshot.scanned.clone())
    }

    /// Serve the recorded snapshot
    ///
    /// Requested modules must all have a recorded slot. Built-in types are
    /// served as recorded, since their expressions cannot be re-evaluated.
    fn load_modules(
        &mut self,
        modules: &[String],
        _builtin_types: &[BuiltinTypeSpec],
    ) -> Result<HostSnapshot, HostError> {
        if let Some(missing) = modules.iter().find(|name| self.snapshot.module(name).is_none()) {
            return Err(HostError::MissingModule(missing.clone()));
        }
        Ok(self.snapshot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::SnapshotBuilder;

    #[test]
    fn replays_recorded_snapshot() {
        let mut b = SnapshotBuilder::new();
        let math = b.module("math", None);
        b.scanned(&["math", "json"]).loaded("math", math);
        let snapshot = b.build();

        let mut host = SnapshotHost::new(snapshot.clone());
        assert_eq!(host.scan_modules().unwrap(), vec!["math", "json"]);
        assert_eq!(host.load_modules(&["math".to_string()], &[]).unwrap(), snapshot);
        assert!(host.origin().is_none());
    }

    #[test]
    fn unrecorded_module_is_an_error() {
        let mut host = SnapshotHost::new(HostSnapshot::default());
        let err = host.load_modules(&["zlib".to_string()], &[]).unwrap_err();
        assert!(matches!(err, HostError::MissingModule(name) if name == "zlib"));
    }

    #[test]
    fn replay_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("snap.json");
        std::fs::write(&path, r#"{"scanned": ["_ast"], "builtins": null}"#).unwrap();

        let mut host = SnapshotHost::from_path(&path).unwrap();
        assert_eq!(host.origin(), Some(path.as_path()));
        assert_eq!(host.scan_modules().unwrap(), vec!["_ast"]);

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(SnapshotHost::from_path(&path), Err(HostError::Json { .. })));
    }
}
