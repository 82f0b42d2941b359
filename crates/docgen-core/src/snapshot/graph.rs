//! Read-only object index used by the traverser

use super::{HostObject, HostSnapshot, ObjectId};

/// Borrowed view over the objects of a [`HostSnapshot`]
#[derive(Debug, Clone, Copy)]
pub struct ObjectGraph<'a> {
    snapshot: &'a HostSnapshot,
}

impl<'a> ObjectGraph<'a> {
    pub fn new(snapshot: &'a HostSnapshot) -> Self {
        Self { snapshot }
    }

    /// Look up an object by identity
    pub fn get(&self, id: ObjectId) -> Option<&'a HostObject> {
        self.snapshot.objects.get(&id)
    }

    /// The built-in namespace module
    pub fn builtins(&self) -> Option<ObjectId> {
        self.snapshot.builtins
    }
}
