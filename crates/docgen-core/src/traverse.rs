//! Object-graph traversal
//!
//! Walks a root object depth-first and yields one [`DocRecord`] per
//! documentable entity, in attribute-listing order. Recursion is replaced by
//! an explicit stack of frames, each owning the path it was reached through,
//! so error reports always carry the full path without unwinding.
//!
//! There is no visited set. Termination rests on the structural rules applied
//! to every attribute:
//!
//! 1. bookkeeping names are skipped;
//! 2. when the item is the owning module itself, attributes declared by any
//!    other module are skipped;
//! 3. an attribute that is the item itself is skipped;
//! 4. modules are only entered from modules, never from types.
//!
//! A depth limit turns a pathological cycle into an error rather than a hang.

use crate::classify::{
    classify, is_denied_attribute, is_documentable, Classification, TOLERATED_MISSING_ATTRIBUTE,
};
use crate::error::IntegrityError;
use crate::record::{DocRecord, QualifiedPath};
use crate::snapshot::{AttrValue, HostAttr, HostObject, ObjectGraph, ObjectId};

/// Default limit on nested containers below a traversal root
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// The module a traversal documents on behalf of
#[derive(Debug, Clone, Copy)]
pub struct Owner<'a> {
    pub id: ObjectId,
    pub name: &'a str,
}

struct Frame<'a> {
    item: ObjectId,
    object: &'a HostObject,
    attrs: &'a [HostAttr],
    path: QualifiedPath,
    next: usize,
}

/// Lazy depth-first traversal of one root
///
/// Yields `Ok` records until the root is exhausted. The first integrity
/// violation is yielded as `Err` and ends the traversal.
pub struct Traversal<'a> {
    graph: ObjectGraph<'a>,
    owner: Owner<'a>,
    max_depth: usize,
    root: Option<(ObjectId, QualifiedPath)>,
    stack: Vec<Frame<'a>>,
    finished: bool,
}

/// Traverse `item`, reached through `path`, on behalf of `owner`
pub fn traverse<'a>(
    graph: ObjectGraph<'a>,
    owner: Owner<'a>,
    path: QualifiedPath,
    item: ObjectId,
) -> Traversal<'a> {
    Traversal {
        graph,
        owner,
        max_depth: DEFAULT_MAX_DEPTH,
        root: Some((item, path)),
        stack: Vec::new(),
        finished: false,
    }
}

impl<'a> Traversal<'a> {
    /// Override the nesting limit
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn step(&mut self) -> Result<Option<DocRecord>, IntegrityError> {
        if let Some((item, path)) = self.root.take() {
            if let Some(record) = self.enter(item, path)? {
                return Ok(Some(record));
            }
        }

        loop {
            let Some(frame) = self.stack.last_mut() else {
                return Ok(None);
            };
            let attrs = frame.attrs;
            let Some(attr) = attrs.get(frame.next) else {
                self.stack.pop();
                continue;
            };
            frame.next += 1;

            let name = attr.name.as_str();
            if is_denied_attribute(name) {
                continue;
            }

            let item = frame.item;
            let item_is_module = frame.object.is_module;
            let path = frame.path.child(name);

            let id = match &attr.value {
                AttrValue::Object(id) => *id,
                AttrValue::Missing if name == TOLERATED_MISSING_ATTRIBUTE => continue,
                AttrValue::Missing => {
                    return Err(IntegrityError::UnexpectedMissingAttribute {
                        module: self.owner.name.to_string(),
                        path: frame.path.dotted(),
                        name: name.to_string(),
                    });
                }
                AttrValue::Raised(error) => {
                    return Err(IntegrityError::AttributeRaised {
                        module: self.owner.name.to_string(),
                        path: frame.path.dotted(),
                        name: name.to_string(),
                        error: error.clone(),
                    });
                }
            };

            let object = self.lookup(id, &path)?;

            if item == self.owner.id && object.module != Some(self.owner.id) {
                continue;
            }
            if id == item {
                continue;
            }
            if !item_is_module && object.is_module {
                continue;
            }

            match classify(object) {
                Classification::Container(_) => {
                    if let Some(record) = self.enter(id, path)? {
                        return Ok(Some(record));
                    }
                }
                Classification::OpaqueCallable { builtin: true } => {
                    return Ok(Some(DocRecord::new(path, object.doc.clone())));
                }
                Classification::OpaqueCallable { builtin: false } => {}
                Classification::Unclassifiable => {
                    return Err(IntegrityError::Unclassifiable {
                        module: self.owner.name.to_string(),
                        path: path.dotted(),
                        repr: object.repr.clone(),
                        category: object.category.clone(),
                    });
                }
            }
        }
    }

    /// Push a frame for `id` and return its own record, if it has one
    fn enter(
        &mut self,
        id: ObjectId,
        path: QualifiedPath,
    ) -> Result<Option<DocRecord>, IntegrityError> {
        // The root frame does not count towards the limit
        if self.stack.len() > self.max_depth {
            return Err(IntegrityError::DepthExceeded {
                module: self.owner.name.to_string(),
                path: path.dotted(),
                limit: self.max_depth,
            });
        }

        let object = self.lookup(id, &path)?;
        let attrs = object
            .attrs
            .as_deref()
            .ok_or_else(|| IntegrityError::UnexpandedObject {
                module: self.owner.name.to_string(),
                path: path.dotted(),
                id,
            })?;

        let record = is_documentable(object).then(|| DocRecord::new(path.clone(), object.doc.clone()));
        self.stack.push(Frame {
            item: id,
            object,
            attrs,
            path,
            next: 0,
        });
        Ok(record)
    }

    fn lookup(&self, id: ObjectId, path: &QualifiedPath) -> Result<&'a HostObject, IntegrityError> {
        self.graph.get(id).ok_or_else(|| IntegrityError::UnknownObject {
            module: self.owner.name.to_string(),
            path: path.dotted(),
            id,
        })
    }
}

impl Iterator for Traversal<'_> {
    type Item = Result<DocRecord, IntegrityError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.step() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}
