//! Entity classification
//!
//! Decides, from the reflection facts of a [`HostObject`], whether an object
//! carries a documentation record and how the traverser treats it as an
//! attribute.

use crate::snapshot::{ContainerKind, HostObject};

/// Descriptor categories that are treated as opaque leaves even when they are
/// neither callable nor plain instances
pub const DESCRIPTOR_CATEGORIES: [&str; 2] = ["getset_descriptor", "member_descriptor"];

/// Bookkeeping attribute names that never carry documentable content
pub const DENIED_ATTRIBUTES: [&str; 7] = [
    "__class__",
    "__dict__",
    "__doc__",
    "__objclass__",
    "__name__",
    "__qualname__",
    "__annotations__",
];

/// The only attribute name allowed to fail resolution with the generic
/// attribute-missing error
pub const TOLERATED_MISSING_ATTRIBUTE: &str = "__abstractmethods__";

/// How the traverser treats an object reached as an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Recursed into as a new traversal root
    Container(ContainerKind),
    /// Leaf; yields a record only when `builtin` is set
    OpaqueCallable { builtin: bool },
    /// Matches no rule; reaching one is an integrity violation
    Unclassifiable,
}

/// Whether an object yields a record for itself: it must be a module, a
/// type or a built-in callable, and its documentation must be literal text.
pub fn is_documentable(object: &HostObject) -> bool {
    has_doc_slot(object) && object.doc.is_some()
}

/// Module, type or built-in callable, regardless of documentation
pub fn has_doc_slot(object: &HostObject) -> bool {
    object.is_module || object.is_class || object.is_builtin
}

/// Classify an attribute value
pub fn classify(object: &HostObject) -> Classification {
    if let Some(kind) = object.container {
        return Classification::Container(kind);
    }

    if object.callable
        || !object.metatype
        || DESCRIPTOR_CATEGORIES.contains(&object.category.as_str())
    {
        return Classification::OpaqueCallable {
            builtin: object.is_builtin,
        };
    }

    Classification::Unclassifiable
}

/// Whether an attribute name is structural bookkeeping
pub fn is_denied_attribute(name: &str) -> bool {
    DENIED_ATTRIBUTES.contains(&name)
}
