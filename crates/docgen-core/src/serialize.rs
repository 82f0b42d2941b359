//! Rendering of documentation records as a Rust array literal
//!
//! The artifact is meant to be `include!`d by the target runtime:
//!
//! ```text
//! [
//!     ("math", Some("Mathematical functions.")),
//!     ("math.sqrt", None),
//! ]
//! ```

use std::io::{self, Write};

use crate::escape::escape;
use crate::record::DocRecord;

/// Quote `text` as a Rust string literal
///
/// Backslashes, double quotes and non-printable characters are escaped;
/// printable Unicode is kept as is.
pub fn quote(text: &str) -> String {
    format!("{text:?}")
}

/// Write the records, one per line, in the given order
pub fn write_table<W: Write>(out: &mut W, records: &[DocRecord]) -> io::Result<()> {
    writeln!(out, "[")?;
    for record in records {
        let path = quote(&record.path.dotted());
        match escape(record.doc.as_deref()) {
            Some(doc) => writeln!(out, "    ({path}, Some({})),", quote(&doc))?,
            None => writeln!(out, "    ({path}, None),")?,
        }
    }
    writeln!(out, "]")
}

/// [`write_table`] into a string
pub fn render_table(records: &[DocRecord]) -> String {
    let mut buf = Vec::new();
    write_table(&mut buf, records).expect("writing to a Vec cannot fail");
    String::from_utf8_lossy(&buf).into_owned()
}
