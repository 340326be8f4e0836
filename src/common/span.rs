use std::fmt;
use std::rc::Rc;

use crate::common::source::Source;

/// A contiguous range of bytes inside a [`Source`].
///
/// `Span` is how every diagnostic in this crate locates itself: the lexer
/// stamps one on each token, the parser combines children's spans into
/// their parent's, and the evaluator's errors point back through the AST
/// to the original text.
#[derive(Debug, Clone)]
pub struct Span {
    pub source: Option<Rc<Source>>,
    pub offset: usize,
    pub length: usize,
}

impl PartialEq for Span {
    fn eq(&self, other: &Span) -> bool {
        self.offset == other.offset && self.length == other.length
    }
}

impl Eq for Span {}

impl Span {
    pub fn new(source: &Rc<Source>, offset: usize, length: usize) -> Span {
        Span { source: Some(Rc::clone(source)), offset, length }
    }

    /// A zero-length span at `offset`, used for end-of-input errors.
    pub fn point(source: &Rc<Source>, offset: usize) -> Span {
        Span::new(source, offset, 0)
    }

    /// A span with no associated source, for synthetic values that were
    /// never read from text (e.g. the result of `quote`).
    pub fn empty() -> Span {
        Span { source: None, offset: 0, length: 0 }
    }

    pub fn is_empty(&self) -> bool { self.length == 0 }

    /// The smallest span covering both `a` and `b`. Both must share a
    /// source (or both be sourceless); mixing is a programmer error.
    pub fn combine(a: &Span, b: &Span) -> Span {
        let source = a.source.clone().or_else(|| b.source.clone());
        let start = a.offset.min(b.offset);
        let end = (a.offset + a.length).max(b.offset + b.length);
        Span { source, offset: start, length: end - start }
    }

    pub fn join(spans: &[Span]) -> Option<Span> {
        spans.iter().cloned().reduce(|a, b| Span::combine(&a, &b))
    }

    /// The literal text this span covers.
    pub fn contents(&self) -> &str {
        match &self.source {
            Some(source) => &source.contents[self.offset..self.offset + self.length],
            None => "",
        }
    }

    /// (line, column) of `self.offset`, both 1-indexed.
    fn line_col(&self) -> (usize, usize) {
        match &self.source {
            None => (1, 1),
            Some(source) => {
                let mut line = 1;
                let mut col = 1;
                for c in source.contents[..self.offset.min(source.contents.len())].chars() {
                    if c == '\n' {
                        line += 1;
                        col = 1;
                    } else {
                        col += 1;
                    }
                }
                (line, col)
            },
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let source = match &self.source {
            Some(s) => s,
            None => return write!(f, "<unknown location>"),
        };

        let (line, col) = self.line_col();
        let line_text = source.contents.lines().nth(line - 1).unwrap_or("");
        let gutter = format!("{} | ", line);
        writeln!(f, "In {}:{}:{}", source, line, col)?;
        writeln!(f, "{}{}", gutter, line_text)?;
        let underline_len = self.length.max(1);
        write!(
            f,
            "{}{}{}",
            " ".repeat(gutter.len() + col - 1),
            "^".repeat(underline_len),
            ""
        )
    }
}

/// An item paired with the span of source text it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<T> {
    pub item: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(item: T, span: Span) -> Spanned<T> { Spanned { item, span } }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Spanned<U> {
        Spanned { item: f(self.item), span: self.span }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn combination() {
        let source = Source::source("(+ 1 2)");
        let a = Span::new(&source, 0, 2);
        let b = Span::new(&source, 3, 1);
        let combined = Span::combine(&a, &b);
        assert_eq!(combined.offset, 0);
        assert_eq!(combined.length, 4);
    }

    #[test]
    fn span_and_contents() {
        let source = Source::source("(+ 1 2)");
        let span = Span::new(&source, 1, 1);
        assert_eq!(span.contents(), "+");
    }
}
