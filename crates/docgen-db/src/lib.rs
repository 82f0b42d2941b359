//! Lookup table over a generated documentation artifact.
//!
//! The artifact is a Rust array literal of `(path, Option<doc>)` pairs. A
//! runtime usually `include!`s it and hands the entries to
//! [`Database::from_entries`]; tools that only have the file on disk use
//! [`Database::parse`].

use std::borrow::Cow;
use std::collections::HashMap;

use thiserror::Error;

/// Lookup of a path that has no entry at all.
///
/// Distinct from a known entry without documentation, which is `Ok(None)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no documentation entry for `{0}`")]
pub struct NotFound(pub String);

/// Errors that can occur when parsing an artifact.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: expected {expected}")]
    Expected { line: usize, expected: &'static str },

    #[error("line {line}: invalid escape sequence `{escape}`")]
    InvalidEscape { line: usize, escape: String },

    #[error("line {line}: unterminated string literal")]
    Unterminated { line: usize },

    #[error("line {line}: duplicate path `{path}`")]
    Duplicate { line: usize, path: String },

    #[error("artifact is missing its closing `]`")]
    MissingClose,
}

/// Result of a lookup: the documentation text, if the entity has any.
pub type Lookup<'d> = Result<Option<&'d str>, NotFound>;

/// Documentation entries keyed by dotted path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Database<'a> {
    inner: HashMap<Cow<'a, str>, Option<Cow<'a, str>>>,
}

impl<'a> Database<'a> {
    /// Build a database from borrowed entries, typically the `include!`d
    /// artifact. Later duplicates replace earlier ones.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        let entries = entries.into_iter();
        let mut inner = HashMap::with_capacity(entries.size_hint().0);
        for (path, doc) in entries {
            inner.insert(Cow::Borrowed(path), doc.map(Cow::Borrowed));
        }
        Self { inner }
    }

    /// Documentation for a dotted path such as `math.sqrt`.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`] if the path has no entry.
    pub fn try_path(&self, path: &str) -> Lookup<'_> {
        self.inner
            .get(path)
            .map(Option::as_deref)
            .ok_or_else(|| NotFound(path.to_string()))
    }

    /// Documentation for `item` declared in `module`.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`] if `module.item` has no entry.
    pub fn try_module_item(&self, module: &str, item: &str) -> Lookup<'_> {
        self.try_path(&format!("{module}.{item}"))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// All entries, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.inner
            .iter()
            .map(|(path, doc)| (path.as_ref(), doc.as_deref()))
    }
}

impl Database<'static> {
    /// Parse the text of a generated artifact.
    ///
    /// # Errors
    ///
    /// Returns an error naming the offending line if the text is not a
    /// well-formed artifact or lists a path twice.
    pub fn parse(artifact: &str) -> Result<Self, ParseError> {
        let mut lines = artifact
            .lines()
            .enumerate()
            .map(|(index, text)| (index + 1, text.trim()))
            .filter(|(_, text)| !text.is_empty());

        match lines.next() {
            Some((_, "[")) => {}
            Some((line, _)) => return Err(ParseError::Expected { line, expected: "`[`" }),
            None => return Err(ParseError::Expected { line: 1, expected: "`[`" }),
        }

        let mut inner = HashMap::new();
        for (line, text) in lines {
            if text == "]" {
                return Ok(Self { inner });
            }
            let (path, doc) = Cursor::new(text, line).entry()?;
            if inner.contains_key(path.as_str()) {
                return Err(ParseError::Duplicate { line, path });
            }
            inner.insert(Cow::Owned(path), doc.map(Cow::Owned));
        }
        Err(ParseError::MissingClose)
    }
}

struct Cursor<'s> {
    rest: &'s str,
    line: usize,
}

impl<'s> Cursor<'s> {
    fn new(text: &'s str, line: usize) -> Self {
        Self { rest: text, line }
    }

    /// `("path", None),` or `("path", Some("doc")),`
    fn entry(mut self) -> Result<(String, Option<String>), ParseError> {
        self.eat("(", "`(`")?;
        let path = self.string()?;
        self.eat(",", "`,` after the path")?;
        let doc = if self.try_eat("None") {
            None
        } else {
            self.eat("Some(", "`None` or `Some(`")?;
            let doc = self.string()?;
            self.eat(")", "`)` closing `Some`")?;
            Some(doc)
        };
        self.eat(")", "`)` closing the entry")?;
        self.eat(",", "`,` after the entry")?;
        if !self.rest.trim_start().is_empty() {
            return Err(self.expected("end of line"));
        }
        Ok((path, doc))
    }

    fn expected(&self, expected: &'static str) -> ParseError {
        ParseError::Expected {
            line: self.line,
            expected,
        }
    }

    fn try_eat(&mut self, token: &str) -> bool {
        let trimmed = self.rest.trim_start();
        match trimmed.strip_prefix(token) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    fn eat(&mut self, token: &str, expected: &'static str) -> Result<(), ParseError> {
        if self.try_eat(token) {
            Ok(())
        } else {
            Err(self.expected(expected))
        }
    }

    /// A Rust string literal, unescaped
    fn string(&mut self) -> Result<String, ParseError> {
        self.eat("\"", "a string literal")?;
        let line = self.line;
        let mut out = String::new();
        let text = self.rest;
        let mut chars = text.char_indices();

        while let Some((index, c)) = chars.next() {
            match c {
                '"' => {
                    self.rest = &text[index + 1..];
                    return Ok(out);
                }
                '\\' => {
                    let (_, escape) = chars.next().ok_or(ParseError::Unterminated { line })?;
                    let invalid = |text: &str| ParseError::InvalidEscape {
                        line,
                        escape: format!("\\{text}"),
                    };
                    match escape {
                        'n' => out.push('\n'),
                        'r' => out.push('\r'),
                        't' => out.push('\t'),
                        '0' => out.push('\0'),
                        '\\' | '"' | '\'' => out.push(escape),
                        'x' => {
                            let digits: String = chars.by_ref().take(2).map(|(_, d)| d).collect();
                            let value = u8::from_str_radix(&digits, 16)
                                .ok()
                                .filter(|v| v.is_ascii() && digits.len() == 2)
                                .ok_or_else(|| invalid(&format!("x{digits}")))?;
                            out.push(char::from(value));
                        }
                        'u' => {
                            let mut digits = String::new();
                            match chars.next() {
                                Some((_, '{')) => {}
                                _ => return Err(invalid("u")),
                            }
                            loop {
                                match chars.next() {
                                    Some((_, '}')) => break,
                                    Some((_, d)) if d.is_ascii_hexdigit() && digits.len() < 6 => {
                                        digits.push(d);
                                    }
                                    _ => return Err(invalid(&format!("u{{{digits}"))),
                                }
                            }
                            let decoded = u32::from_str_radix(&digits, 16)
                                .ok()
                                .and_then(char::from_u32)
                                .ok_or_else(|| invalid(&format!("u{{{digits}}}")))?;
                            out.push(decoded);
                        }
                        other => return Err(invalid(&other.to_string())),
                    }
                }
                c => out.push(c),
            }
        }

        Err(ParseError::Unterminated { line })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTIFACT: &str = r#"[
    ("array", Some("This module defines an object type which can efficiently represent\nan array of basic values.")),
    ("array._array_reconstructor", Some("Internal. Used for pickling support.")),
    ("array.array.__sizeof__", None),
    ("math.sqrt", Some("Return the square root of x.")),
]
"#;

    #[test]
    fn module_item_lookup() {
        let db = Database::parse(ARTIFACT).unwrap();
        let doc = db.try_module_item("array", "_array_reconstructor").unwrap();
        assert_eq!(doc, Some("Internal. Used for pickling support."));
        assert_eq!(db.len(), 4);
    }

    #[test]
    fn known_but_undocumented_differs_from_unknown() {
        let db = Database::parse(ARTIFACT).unwrap();
        assert_eq!(db.try_path("array.array.__sizeof__"), Ok(None));
        assert_eq!(
            db.try_path("array.array.nope"),
            Err(NotFound("array.array.nope".to_string()))
        );
    }

    #[test]
    fn escapes_are_decoded() {
        let db = Database::parse(ARTIFACT).unwrap();
        let doc = db.try_path("array").unwrap().unwrap();
        assert!(doc.contains("represent\nan array"));

        let text = "[\n    (\"s\", Some(\"a \\\"q\\\" \\\\ \\t \\x41 \\u{e9} \\u{1f600}\")),\n]\n";
        let db = Database::parse(text).unwrap();
        assert_eq!(db.try_path("s"), Ok(Some("a \"q\" \\ \t A \u{e9} \u{1f600}")));
    }

    #[test]
    fn from_entries_borrows() {
        let entries = [("math", Some("Math.")), ("math.floor", None)];
        let db = Database::from_entries(entries);
        assert_eq!(db.try_path("math"), Ok(Some("Math.")));
        assert_eq!(db.try_module_item("math", "floor"), Ok(None));
        assert!(!db.is_empty());

        let mut paths: Vec<&str> = db.iter().map(|(path, _)| path).collect();
        paths.sort_unstable();
        assert_eq!(paths, vec!["math", "math.floor"]);
    }

    #[test]
    fn empty_artifact() {
        let db = Database::parse("[\n]\n").unwrap();
        assert!(db.is_empty());
    }

    #[test]
    fn malformed_lines_report_their_number() {
        let err = Database::parse("[\n    (\"a\", None),\n    (\"b\" None),\n]\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::Expected {
                line: 3,
                expected: "`,` after the path"
            }
        );

        let err = Database::parse("[\n    (\"a\", Some(\"oops)),\n]\n").unwrap_err();
        assert_eq!(err, ParseError::Unterminated { line: 2 });

        let err = Database::parse("[\n    (\"a\", Some(\"\\q\")),\n]\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidEscape { line: 2, .. }));

        assert_eq!(
            Database::parse("[\n    (\"a\", None),\n"),
            Err(ParseError::MissingClose)
        );
        assert!(matches!(
            Database::parse("(\"a\", None),"),
            Err(ParseError::Expected { line: 1, .. })
        ));
    }

    #[test]
    fn duplicate_paths_are_rejected() {
        let err = Database::parse("[\n    (\"a\", None),\n    (\"a\", Some(\"x\")),\n]\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::Duplicate {
                line: 3,
                path: "a".to_string()
            }
        );
    }
}
