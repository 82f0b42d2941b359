//! Test utilities for docgen
//!
//! [`SnapshotBuilder`] assembles host snapshots by hand so the traversal and
//! the driver can be exercised without a host interpreter.

use crate::snapshot::{
    AttrValue, BuiltinTypeEntry, ContainerKind, HostAttr, HostObject, HostSnapshot, ModuleSlot,
    ModuleState, ObjectId,
};

/// Incremental builder for [`HostSnapshot`] graphs
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    snapshot: HostSnapshot,
    next_id: u64,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, object: HostObject) -> ObjectId {
        self.next_id += 1;
        let id = ObjectId(self.next_id);
        self.snapshot.objects.insert(id, object);
        id
    }

    /// An expanded module that declares itself
    pub fn module(&mut self, name: &str, doc: Option<&str>) -> ObjectId {
        let id = self.insert(HostObject {
            category: "module".to_string(),
            repr: format!("<module '{name}'>"),
            is_module: true,
            container: Some(ContainerKind::Module),
            doc: doc.map(str::to_string),
            attrs: Some(Vec::new()),
            ..HostObject::default()
        });
        self.object_mut(id).module = Some(id);
        id
    }

    /// An expanded plain class
    pub fn class(&mut self, name: &str, doc: Option<&str>, module: Option<ObjectId>) -> ObjectId {
        self.insert(HostObject {
            category: "type".to_string(),
            repr: format!("<class '{name}'>"),
            is_class: true,
            callable: true,
            metatype: true,
            container: Some(ContainerKind::Type),
            doc: doc.map(str::to_string),
            module,
            attrs: Some(Vec::new()),
            ..HostObject::default()
        })
    }

    /// A native function declared by `module`
    pub fn builtin(&mut self, name: &str, doc: Option<&str>, module: Option<ObjectId>) -> ObjectId {
        self.insert(HostObject {
            category: "builtin_function_or_method".to_string(),
            repr: format!("<built-in function {name}>"),
            is_builtin: true,
            callable: true,
            doc: doc.map(str::to_string),
            module,
            ..HostObject::default()
        })
    }

    /// A native method bound to a class, with no declaring module
    pub fn builtin_method(&mut self, name: &str, doc: Option<&str>) -> ObjectId {
        self.builtin(name, doc, None)
    }

    /// An ordinary function implemented in the host language
    pub fn function(&mut self, name: &str, doc: Option<&str>, module: Option<ObjectId>) -> ObjectId {
        self.insert(HostObject {
            category: "function".to_string(),
            repr: format!("<function {name}>"),
            callable: true,
            doc: doc.map(str::to_string),
            module,
            ..HostObject::default()
        })
    }

    /// A plain data value
    pub fn value(&mut self, category: &str, repr: &str, module: Option<ObjectId>) -> ObjectId {
        self.insert(HostObject {
            category: category.to_string(),
            repr: repr.to_string(),
            module,
            ..HostObject::default()
        })
    }

    pub fn object_mut(&mut self, id: ObjectId) -> &mut HostObject {
        self.snapshot
            .objects
            .get_mut(&id)
            .unwrap_or_else(|| panic!("unknown object {id}"))
    }

    fn push_attr(&mut self, owner: ObjectId, name: &str, value: AttrValue) {
        self.object_mut(owner)
            .attrs
            .get_or_insert_with(Vec::new)
            .push(HostAttr {
                name: name.to_string(),
                value,
            });
    }

    /// Append `owner.name = target` to the attribute listing
    pub fn attr(&mut self, owner: ObjectId, name: &str, target: ObjectId) -> &mut Self {
        self.push_attr(owner, name, AttrValue::Object(target));
        self
    }

    /// Append an attribute whose resolution reports it missing
    pub fn missing_attr(&mut self, owner: ObjectId, name: &str) -> &mut Self {
        self.push_attr(owner, name, AttrValue::Missing);
        self
    }

    /// Append an attribute whose resolution raises
    pub fn raised_attr(&mut self, owner: ObjectId, name: &str, error: &str) -> &mut Self {
        self.push_attr(owner, name, AttrValue::Raised(error.to_string()));
        self
    }

    pub fn scanned(&mut self, names: &[&str]) -> &mut Self {
        self.snapshot.scanned = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn loaded(&mut self, name: &str, object: ObjectId) -> &mut Self {
        self.slot(name, ModuleState::Loaded { object })
    }

    pub fn source(&mut self, name: &str) -> &mut Self {
        self.slot(name, ModuleState::Source)
    }

    pub fn failed(&mut self, name: &str, error: &str) -> &mut Self {
        self.slot(
            name,
            ModuleState::Failed {
                error: error.to_string(),
            },
        )
    }

    fn slot(&mut self, name: &str, state: ModuleState) -> &mut Self {
        self.snapshot.modules.push(ModuleSlot {
            name: name.to_string(),
            state,
        });
        self
    }

    pub fn builtins(&mut self, object: ObjectId) -> &mut Self {
        self.snapshot.builtins = Some(object);
        self
    }

    pub fn builtin_type(&mut self, label: &str, name: &str, object: ObjectId) -> &mut Self {
        self.snapshot.builtin_types.push(BuiltinTypeEntry {
            label: label.to_string(),
            name: name.to_string(),
            object,
        });
        self
    }

    /// Copy of the snapshot built so far
    pub fn snapshot(&self) -> HostSnapshot {
        self.snapshot.clone()
    }

    pub fn build(self) -> HostSnapshot {
        self.snapshot
    }
}
