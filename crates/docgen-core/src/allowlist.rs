//! Module allowlist resolution.
//!
//! The allowlist is the set of standard-library modules the target runtime
//! implements, derived from the file names found in its source tree. Module
//! names reported by the host scanner are filtered against it.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use thiserror::Error;
use tracing::debug;

/// Suffix the host scanner uses for a package's initializer.
const PACKAGE_INIT_SUFFIX: &str = ".__init__";

/// Marker appended to a package name while scanning.
const PACKAGE_MARKER: &str = " (package)";

/// Errors that can occur while resolving the allowlist.
#[derive(Error, Debug)]
pub enum AllowlistError {
    #[error("glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

/// Normalized names of the modules the target runtime implements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allowlist {
    names: BTreeSet<String>,
}

impl Allowlist {
    /// Collect the allowlist from the files matching `patterns` below `root`.
    ///
    /// Each match contributes its base name without a leading underscore and
    /// without its last extension. `denied` names are removed afterwards
    /// whether or not they were found. Patterns that match nothing are not
    /// an error; they simply contribute no names.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern is not a valid glob.
    pub fn resolve(
        root: &Path,
        patterns: &[String],
        denied: &[String],
    ) -> Result<Self, AllowlistError> {
        let base = glob::Pattern::escape(&root.to_string_lossy());
        let mut names = BTreeSet::new();

        for pattern in patterns {
            let full = format!("{}/{}", base.trim_end_matches('/'), pattern);
            let mut matched = 0usize;
            for entry in glob::glob(&full)? {
                match entry {
                    Ok(path) => {
                        if let Some(name) = module_name_of(&path) {
                            names.insert(name);
                            matched += 1;
                        }
                    }
                    Err(e) => debug!(path = %e.path().display(), "unreadable allowlist entry: {}", e.error()),
                }
            }
            debug!(pattern = %full, matched, "scanned allowlist pattern");
        }

        for name in denied {
            names.remove(name.as_str());
        }

        Ok(Self { names })
    }

    /// Build an allowlist from already normalized names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a scanned module name is implemented by the target runtime.
    ///
    /// Comparison is case-sensitive after stripping a single leading
    /// underscore from `module`.
    #[must_use]
    pub fn permits(&self, module: &str) -> bool {
        self.names.contains(normalize(module))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// Strip a single leading underscore.
#[must_use]
pub fn normalize(name: &str) -> &str {
    name.strip_prefix('_').unwrap_or(name)
}

fn module_name_of(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    let name = normalize(file_name);
    let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
    Some(stem.to_string())
}

/// Reduce raw scanner output to unique top-level module names.
///
/// A package initializer `pkg.__init__` is first tagged as `pkg (package)`,
/// dotted submodule names are dropped, and the tag is then removed again so
/// the package counts under its bare name. First occurrence wins.
pub fn top_level_modules<S: AsRef<str>>(scanned: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut modules = Vec::new();

    for raw in scanned {
        let raw = raw.as_ref();
        let tagged = match raw.strip_suffix(PACKAGE_INIT_SUFFIX) {
            Some(package) => format!("{package}{PACKAGE_MARKER}"),
            None => raw.to_string(),
        };
        if tagged.contains('.') || tagged.is_empty() {
            continue;
        }
        let bare = tagged
            .strip_suffix(PACKAGE_MARKER)
            .map_or(tagged.as_str(), |name| name)
            .to_string();
        if seen.insert(bare.clone()) {
            modules.push(bare);
        }
    }

    modules
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    fn runtime_tree() -> tempfile::TempDir {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("Lib/json")).unwrap();
        fs::create_dir_all(root.join("vm/src/stdlib")).unwrap();
        fs::create_dir_all(root.join("stdlib/src")).unwrap();
        fs::write(root.join("Lib/this.py"), "").unwrap();
        fs::write(root.join("Lib/antigravity.py"), "").unwrap();
        fs::write(root.join("Lib/_weakrefset.py"), "").unwrap();
        fs::write(root.join("vm/src/stdlib/operator.rs"), "").unwrap();
        fs::write(root.join("stdlib/src/math.rs"), "").unwrap();
        fs::write(root.join("stdlib/src/__future__.rs"), "").unwrap();
        dir
    }

    #[test]
    fn resolves_from_all_locations() {
        let dir = runtime_tree();
        let config = crate::config::DocgenConfig::default();
        let allowlist =
            Allowlist::resolve(dir.path(), &config.stdlib_globs, &config.denied_modules).unwrap();

        let names: Vec<&str> = allowlist.iter().collect();
        assert_eq!(names, vec!["_future__", "json", "math", "operator", "weakrefset"]);
        assert!(!allowlist.permits("this"));
        assert!(!allowlist.permits("antigravity"));
    }

    #[test]
    fn missing_tree_gives_empty_allowlist() {
        let dir = tempfile::TempDir::new().unwrap();
        let allowlist = Allowlist::resolve(
            &dir.path().join("absent"),
            &strings(&["Lib/*"]),
            &strings(&["this", "antigravity"]),
        )
        .unwrap();
        assert!(allowlist.is_empty());
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = Allowlist::resolve(dir.path(), &strings(&["Lib/[*"]), &[]);
        assert!(matches!(result, Err(AllowlistError::Glob(_))));
    }

    #[test]
    fn permits_strips_one_underscore() {
        let allowlist = Allowlist::from_names(["operator", "_future__", "math"]);
        assert!(allowlist.permits("_operator"));
        assert!(allowlist.permits("operator"));
        assert!(allowlist.permits("__future__"));
        assert!(!allowlist.permits("__operator"));
        assert!(!allowlist.permits("Math"));
    }

    #[test]
    fn extension_and_underscore_are_stripped() {
        assert_eq!(module_name_of(Path::new("/x/_sre.rs")).as_deref(), Some("sre"));
        assert_eq!(module_name_of(Path::new("/x/json")).as_deref(), Some("json"));
        assert_eq!(
            module_name_of(Path::new("/x/lib2to3.tar.gz")).as_deref(),
            Some("lib2to3.tar")
        );
    }

    #[test]
    fn scanner_output_is_collapsed() {
        let scanned = strings(&[
            "math",
            "json.__init__",
            "json.decoder",
            "_ast",
            "json",
            "math",
            "email.mime.text",
        ]);
        assert_eq!(top_level_modules(&scanned), strings(&["math", "json", "_ast"]));
    }
}
