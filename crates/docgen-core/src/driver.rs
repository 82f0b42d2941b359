//! Top-level generation driver
//!
//! Ties the pieces together for one run: scan the host, filter against the
//! allowlist, load the survivors, traverse every loaded module and the
//! configured built-in types, and hand back the complete record list. No
//! output is produced here beyond the skip notices, so a failed run leaves
//! nothing half-written.

use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::allowlist::{top_level_modules, Allowlist};
use crate::config::DocgenConfig;
use crate::error::{IntegrityError, Result};
use crate::host::{HostError, HostRuntime};
use crate::record::{DocRecord, QualifiedPath};
use crate::snapshot::{HostSnapshot, ModuleState, ObjectGraph};
use crate::traverse::{traverse, Owner};

/// Path segment the built-in types are documented under
pub const BUILTINS_SEGMENT: &str = "builtins";

/// Counters reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Modules walked by the traverser
    pub traversed: usize,
    /// Scanned modules rejected by the allowlist
    pub skipped: usize,
    /// Modules whose import failed
    pub failed: usize,
    /// Modules implemented in source and not traversed
    pub source_only: usize,
    /// Records emitted, built-in types included
    pub records: usize,
}

/// Result of a complete run
#[derive(Debug)]
pub struct Generation {
    pub records: Vec<DocRecord>,
    /// The snapshot the records were taken from, with the raw scanner output
    pub snapshot: HostSnapshot,
    pub summary: RunSummary,
}

/// Generates the documentation table for one target runtime
#[derive(Debug, Clone)]
pub struct DocGenerator {
    config: DocgenConfig,
    allowlist: Allowlist,
}

impl DocGenerator {
    pub fn new(config: DocgenConfig, allowlist: Allowlist) -> Self {
        Self { config, allowlist }
    }

    /// Resolve the allowlist from the target runtime's source tree
    ///
    /// # Errors
    ///
    /// Returns an error if one of the configured globs is malformed.
    pub fn for_runtime_root(config: DocgenConfig, root: &Path) -> Result<Self> {
        let allowlist = Allowlist::resolve(root, &config.stdlib_globs, &config.denied_modules)?;
        if allowlist.is_empty() {
            warn!(root = %root.display(), "allowlist is empty; every module will be skipped");
        } else {
            debug!(modules = allowlist.len(), "resolved allowlist");
        }
        Ok(Self::new(config, allowlist))
    }

    pub fn allowlist(&self) -> &Allowlist {
        &self.allowlist
    }

    /// Run the whole pipeline against `host`
    ///
    /// One `skipping: <name>` line is written to `diagnostics` for every
    /// scanned module the allowlist rejects.
    ///
    /// # Errors
    ///
    /// Host failures, integrity violations and diagnostic write failures
    /// abort the run.
    pub fn generate<H>(&self, host: &mut H, diagnostics: &mut dyn Write) -> Result<Generation>
    where
        H: HostRuntime + ?Sized,
    {
        let scanned = host.scan_modules()?;
        let mut eligible = Vec::new();
        let mut skipped = 0;

        for name in top_level_modules(&scanned) {
            if self.allowlist.permits(&name) {
                eligible.push(name);
            } else {
                writeln!(diagnostics, "skipping: {name}")?;
                skipped += 1;
            }
        }

        let mut snapshot = host.load_modules(&eligible, &self.config.builtin_types)?;
        snapshot.scanned = scanned;

        let (records, mut summary) = self.collect_records(&snapshot, &eligible)?;
        summary.skipped = skipped;

        info!(
            traversed = summary.traversed,
            skipped = summary.skipped,
            failed = summary.failed,
            source_only = summary.source_only,
            records = summary.records,
            "documentation table complete"
        );

        Ok(Generation {
            records,
            snapshot,
            summary,
        })
    }

    /// Traverse `modules` and the recorded built-in types of `snapshot`
    ///
    /// `modules` must already be filtered by the allowlist; each needs a
    /// slot in the snapshot.
    ///
    /// # Errors
    ///
    /// Returns the first integrity violation, or a host error for a module
    /// without a slot.
    pub fn collect_records(
        &self,
        snapshot: &HostSnapshot,
        modules: &[String],
    ) -> Result<(Vec<DocRecord>, RunSummary)> {
        let graph = ObjectGraph::new(snapshot);
        let mut records = Vec::new();
        let mut summary = RunSummary::default();

        for name in modules {
            let slot = snapshot
                .module(name)
                .ok_or_else(|| HostError::MissingModule(name.clone()))?;

            match &slot.state {
                ModuleState::Failed { error } => {
                    warn!(module = %name, "import failed: {error}");
                    summary.failed += 1;
                }
                ModuleState::Source => {
                    debug!(module = %name, "implemented in source; not traversed");
                    summary.source_only += 1;
                }
                ModuleState::Loaded { object } => {
                    let before = records.len();
                    let owner = Owner { id: *object, name };
                    for record in traverse(graph, owner, QualifiedPath::root(name.as_str()), *object)
                        .with_max_depth(self.config.max_depth)
                    {
                        records.push(record?);
                    }
                    debug!(module = %name, records = records.len() - before, "traversed");
                    summary.traversed += 1;
                }
            }
        }

        self.collect_builtin_types(graph, snapshot, &mut records)?;

        ensure_unique(&records)?;
        summary.records = records.len();
        Ok((records, summary))
    }

    fn collect_builtin_types(
        &self,
        graph: ObjectGraph<'_>,
        snapshot: &HostSnapshot,
        records: &mut Vec<DocRecord>,
    ) -> Result<()> {
        if snapshot.builtin_types.is_empty() {
            return Ok(());
        }
        let builtins = graph.builtins().ok_or(IntegrityError::MissingBuiltins)?;
        let owner = Owner {
            id: builtins,
            name: BUILTINS_SEGMENT,
        };

        for entry in &snapshot.builtin_types {
            let path = QualifiedPath::root(BUILTINS_SEGMENT).child(entry.name.as_str());
            let object = graph
                .get(entry.object)
                .ok_or_else(|| IntegrityError::UnknownObject {
                    module: BUILTINS_SEGMENT.to_string(),
                    path: path.dotted(),
                    id: entry.object,
                })?;

            // Undocumented types are seeded explicitly; documented ones emit
            // themselves on entry.
            if object.doc.is_none() {
                records.push(DocRecord::new(path.clone(), None));
            }
            for record in traverse(graph, owner, path, entry.object)
                .with_max_depth(self.config.max_depth)
            {
                records.push(record?);
            }
            debug!(label = %entry.label, name = %entry.name, "traversed builtin type");
        }
        Ok(())
    }
}

fn ensure_unique(records: &[DocRecord]) -> std::result::Result<(), IntegrityError> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        let dotted = record.path.dotted();
        if !seen.insert(dotted.clone()) {
            return Err(IntegrityError::DuplicatePath { path: dotted });
        }
    }
    Ok(())
}
