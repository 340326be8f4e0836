use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// The text being lexed, parsed, and evaluated, plus where it came from.
///
/// A `Source` is immutable once built and is shared (via `Rc`) by every
/// [`crate::Span`] that points into it, so spans outlive any one pipeline
/// stage without copying the program text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub contents: String,
    pub path: PathBuf,
}

impl Source {
    /// Wraps a string that did not come from a file, e.g. a REPL line.
    pub fn source(contents: &str) -> Rc<Source> {
        Rc::new(Source { contents: contents.to_string(), path: PathBuf::from("source") })
    }

    /// Reads a source file from disk.
    pub fn file(path: &Path) -> io::Result<Rc<Source>> {
        let contents = fs::read_to_string(path)?;
        Ok(Rc::new(Source { contents, path: path.to_path_buf() }))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
