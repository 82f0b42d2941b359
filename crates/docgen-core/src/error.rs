//! Error types for documentation extraction

use thiserror::Error;

use crate::allowlist::AllowlistError;
use crate::config::ConfigError;
use crate::host::HostError;
use crate::snapshot::ObjectId;

/// A violated assumption about the host object model
///
/// None of these are recoverable: skipping past one would silently drop or
/// corrupt records in the generated table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("in module `{module}`: attribute `{name}` of `{path}` is missing on the host")]
    UnexpectedMissingAttribute {
        module: String,
        path: String,
        name: String,
    },

    #[error("in module `{module}`: resolving attribute `{name}` of `{path}` raised: {error}")]
    AttributeRaised {
        module: String,
        path: String,
        name: String,
        error: String,
    },

    #[error("in module `{module}`: cannot classify `{path}` = {repr} (category `{category}`)")]
    Unclassifiable {
        module: String,
        path: String,
        repr: String,
        category: String,
    },

    #[error("in module `{module}`: `{path}` refers to object {id} missing from the snapshot")]
    UnknownObject {
        module: String,
        path: String,
        id: ObjectId,
    },

    #[error("in module `{module}`: object {id} at `{path}` was not expanded by the host")]
    UnexpandedObject {
        module: String,
        path: String,
        id: ObjectId,
    },

    #[error("in module `{module}`: traversal depth limit {limit} exceeded at `{path}`")]
    DepthExceeded {
        module: String,
        path: String,
        limit: usize,
    },

    #[error("path `{path}` was emitted more than once")]
    DuplicatePath { path: String },

    #[error("snapshot does not identify the built-in namespace module")]
    MissingBuiltins,
}

/// Errors that can occur while generating a documentation table
#[derive(Error, Debug)]
pub enum DocgenError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("allowlist error: {0}")]
    Allowlist(#[from] AllowlistError),

    #[error("host error: {0}")]
    Host(#[from] HostError),

    #[error("integrity violation: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used across the crate
pub type Result<T, E = DocgenError> = std::result::Result<T, E>;
