//! Documentation table extraction for a reimplemented runtime.
//!
//! This crate provides:
//! - A serde snapshot model of the host interpreter's object graph, and the
//!   adapters that produce one (a live Python host, or a recorded file)
//! - Allowlist resolution from the target runtime's source tree
//! - Entity classification and the depth-first graph traversal
//! - Escaping and rendering of the records as a Rust array literal
//!
//! A run is driven by [`DocGenerator`]:
//!
//! ```no_run
//! use std::path::Path;
//! use docgen_core::{write_table, DocGenerator, DocgenConfig, PythonHost};
//!
//! let generator = DocGenerator::for_runtime_root(DocgenConfig::default(), Path::new("../runtime"))?;
//! let mut host = PythonHost::default();
//! let generation = generator.generate(&mut host, &mut std::io::stderr())?;
//! write_table(&mut std::io::stdout(), &generation.records)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod allowlist;
mod classify;
mod config;
mod driver;
mod error;
mod escape;
mod host;
mod record;
mod serialize;
mod snapshot;
mod traverse;

pub mod testutil;

pub use allowlist::{normalize, top_level_modules, Allowlist, AllowlistError};
pub use classify::{
    classify, has_doc_slot, is_denied_attribute, is_documentable, Classification,
    DENIED_ATTRIBUTES, DESCRIPTOR_CATEGORIES, TOLERATED_MISSING_ATTRIBUTE,
};
pub use config::{BuiltinTypeSpec, ConfigError, DocgenConfig};
pub use driver::{DocGenerator, Generation, RunSummary, BUILTINS_SEGMENT};
pub use error::{DocgenError, IntegrityError, Result};
pub use escape::{escape, escape_text};
pub use host::{HostError, HostRuntime, PythonHost, SnapshotHost};
pub use record::{DocRecord, QualifiedPath};
pub use serialize::{quote, render_table, write_table};
pub use snapshot::{
    AttrValue, BuiltinTypeEntry, ContainerKind, HostAttr, HostObject, HostSnapshot, ModuleSlot,
    ModuleState, ObjectGraph, ObjectId,
};
pub use traverse::{traverse, Owner, Traversal, DEFAULT_MAX_DEPTH};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
