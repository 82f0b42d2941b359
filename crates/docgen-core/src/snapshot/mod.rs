//! Host object-graph snapshots
//!
//! The traversal never talks to a live interpreter. Instead the host runtime
//! describes the objects it can reach (kind flags, documentation text,
//! declaring module, ordered attribute list) and the traverser walks that
//! description. A snapshot is plain serde data so it can be recorded to disk
//! and replayed.

mod graph;

pub use graph::ObjectGraph;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::host::HostError;

/// Host identity of an object
///
/// Two attributes resolving to the same id are the same object, regardless
/// of the names they were reached through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Exact container type of an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    /// The object's type is exactly the plain metatype
    Type,
    /// The object's type is exactly the module type
    Module,
}

/// Reflection facts about a single host object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostObject {
    /// Name of the object's runtime type
    pub category: String,

    /// Short printable representation, for diagnostics only
    #[serde(default)]
    pub repr: String,

    #[serde(default)]
    pub is_module: bool,

    #[serde(default)]
    pub is_class: bool,

    /// Implemented at the runtime's native layer (built-in function or method)
    #[serde(default)]
    pub is_builtin: bool,

    #[serde(default)]
    pub callable: bool,

    /// The object's type is a subclass of the metatype
    #[serde(default)]
    pub metatype: bool,

    #[serde(default)]
    pub container: Option<ContainerKind>,

    /// Documentation attribute, present only when it is literal text
    #[serde(default)]
    pub doc: Option<String>,

    /// Identity of the module the host reports as declaring this object
    #[serde(default)]
    pub module: Option<ObjectId>,

    /// Ordered attribute names and their resolutions; `None` when the host
    /// did not expand this object
    #[serde(default)]
    pub attrs: Option<Vec<HostAttr>>,
}

/// One entry of an object's attribute listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostAttr {
    pub name: String,
    pub value: AttrValue,
}

/// Outcome of resolving `item.name` on the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrValue {
    Object(ObjectId),
    /// Resolution failed with the generic attribute-missing error
    Missing,
    /// Resolution failed with any other error
    Raised(String),
}

/// Load outcome of one requested module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleSlot {
    pub name: String,
    #[serde(flatten)]
    pub state: ModuleState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModuleState {
    /// Imported; the module object is the traversal root
    Loaded { object: ObjectId },
    /// Imported, but it carries the compiled-artifact-cache marker and is
    /// documented by other means
    Source,
    /// The import raised; the captured error stands in for the module
    Failed { error: String },
}

/// A built-in iterator or view type seeded under the `builtins` path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuiltinTypeEntry {
    /// Configuration label the type was requested under
    pub label: String,
    /// Runtime name of the type, used as the path segment
    pub name: String,
    pub object: ObjectId,
}

/// Everything the traversal needs from one host run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostSnapshot {
    /// Host interpreter version string
    #[serde(default)]
    pub host: Option<String>,

    /// Raw module names reported by the host's module scanner, in order
    #[serde(default)]
    pub scanned: Vec<String>,

    /// One slot per requested module, in request order
    #[serde(default)]
    pub modules: Vec<ModuleSlot>,

    /// The built-in namespace module
    pub builtins: Option<ObjectId>,

    #[serde(default)]
    pub builtin_types: Vec<BuiltinTypeEntry>,

    #[serde(default)]
    pub objects: HashMap<ObjectId, HostObject>,
}

impl HostSnapshot {
    /// Read a recorded snapshot from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, HostError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|source| HostError::Json {
            origin: path.display().to_string(),
            source,
        })
    }

    /// Write this snapshot to disk as JSON
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), HostError> {
        let path = path.as_ref();
        let json = serde_json::to_string(self).map_err(|source| HostError::Json {
            origin: path.display().to_string(),
            source,
        })?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Slot recorded for a module name, if it was requested
    pub fn module(&self, name: &str) -> Option<&ModuleSlot> {
        self.modules.iter().find(|slot| slot.name == name)
    }
}
