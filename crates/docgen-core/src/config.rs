//! Run configuration (`docgen.toml`) parsing.
//!
//! Every field has a default, so an empty file (or no file at all) describes
//! the standard run against a target runtime checkout.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::traverse::DEFAULT_MAX_DEPTH;

/// Errors that can occur when loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("builtin type label `{0}` is listed more than once")]
    DuplicateBuiltinType(String),

    #[error("max_depth must be at least 1")]
    ZeroDepth,
}

/// A built-in type documented under the synthetic `builtins` path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuiltinTypeSpec {
    /// Name used in logs and snapshots.
    pub label: String,

    /// Host expression evaluating to the type object.
    pub expr: String,
}

impl BuiltinTypeSpec {
    pub fn new(label: impl Into<String>, expr: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            expr: expr.into(),
        }
    }
}

/// The complete run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocgenConfig {
    /// Host interpreter command.
    pub python: String,

    /// Glob patterns, relative to the target runtime root, whose file names
    /// make up the module allowlist.
    pub stdlib_globs: Vec<String>,

    /// Module names that are never documented.
    pub denied_modules: Vec<String>,

    /// Built-in iterator and view types, in emission order.
    pub builtin_types: Vec<BuiltinTypeSpec>,

    /// Limit on nested containers below one traversal root.
    pub max_depth: usize,
}

impl Default for DocgenConfig {
    fn default() -> Self {
        Self {
            python: "python3".to_string(),
            stdlib_globs: ["Lib/*", "vm/src/stdlib/*", "stdlib/src/*"]
                .into_iter()
                .map(String::from)
                .collect(),
            denied_modules: vec!["this".to_string(), "antigravity".to_string()],
            builtin_types: default_builtin_types(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

fn default_builtin_types() -> Vec<BuiltinTypeSpec> {
    [
        ("bytearray_iterator", "type(bytearray().__iter__())"),
        ("bytes_iterator", "type(bytes().__iter__())"),
        ("dict_keyiterator", "type(dict().__iter__())"),
        ("dict_valueiterator", "type(dict().values().__iter__())"),
        ("dict_itemiterator", "type(dict().items().__iter__())"),
        ("dict_values", "type(dict().values())"),
        ("dict_items", "type(dict().items())"),
        ("set_iterator", "type(set().__iter__())"),
        ("list_iterator", "type(list().__iter__())"),
        ("range_iterator", "type(range(0).__iter__())"),
        ("str_iterator", "type(str().__iter__())"),
        ("tuple_iterator", "type(tuple().__iter__())"),
        ("none", "type(None)"),
        ("function", "type(lambda: None)"),
    ]
    .into_iter()
    .map(|(label, expr)| BuiltinTypeSpec::new(label, expr))
    .collect()
}

impl DocgenConfig {
    /// Load a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// fails validation.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or fails validation.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        let mut seen = std::collections::HashSet::new();
        for spec in &self.builtin_types {
            if !seen.insert(spec.label.as_str()) {
                return Err(ConfigError::DuplicateBuiltinType(spec.label.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_default() {
        let config = DocgenConfig::parse("").unwrap();
        assert_eq!(config, DocgenConfig::default());
        assert_eq!(config.python, "python3");
        assert_eq!(config.builtin_types.len(), 14);
        assert_eq!(config.builtin_types[12].expr, "type(None)");
        assert_eq!(config.max_depth, 256);
    }

    #[test]
    fn partial_override() {
        let toml = r#"
python = "/opt/cpython/bin/python3.12"
denied_modules = ["this"]

[[builtin_types]]
label = "none"
expr = "type(None)"
"#;
        let config = DocgenConfig::parse(toml).unwrap();
        assert_eq!(config.python, "/opt/cpython/bin/python3.12");
        assert_eq!(config.denied_modules, vec!["this"]);
        assert_eq!(config.builtin_types, vec![BuiltinTypeSpec::new("none", "type(None)")]);
        assert_eq!(config.stdlib_globs.len(), 3);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = DocgenConfig::parse("pyhton = \"python3\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn validation() {
        assert!(matches!(
            DocgenConfig::parse("max_depth = 0"),
            Err(ConfigError::ZeroDepth)
        ));

        let toml = r#"
[[builtin_types]]
label = "x"
expr = "type(None)"

[[builtin_types]]
label = "x"
expr = "type(1)"
"#;
        assert!(matches!(
            DocgenConfig::parse(toml),
            Err(ConfigError::DuplicateBuiltinType(label)) if label == "x"
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("docgen.toml");
        std::fs::write(&path, "max_depth = 32\n").unwrap();

        let config = DocgenConfig::from_path(&path).unwrap();
        assert_eq!(config.max_depth, 32);

        let missing = DocgenConfig::from_path(dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
