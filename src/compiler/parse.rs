use std::collections::HashMap;
use std::rc::Rc;

use crate::common::source::Source;
use crate::common::span::{Span, Spanned};
use crate::compiler::syntax::Syntax;
use crate::compiler::token::{Category, Token};

/// The ephemeral tree a `bind` pass produces, consumed by the matching
/// `emit` pass and then discarded. Per spec.md §9's redesign note this
/// replaces the original's uniform n-ary cell with a shape-typed enum:
/// a `Seq`/`Any`/`Many` node's shape always matches the combinator that
/// produced it, so `emit` never has to guess how to walk a child.
#[derive(Debug, Clone)]
pub enum BindingTree {
    /// The index and span of a single token, produced by an atomic or
    /// symbol combinator.
    Leaf(usize, Span),
    /// One child per label in a `seq` combinator, in order.
    Seq(Vec<BindingTree>),
    /// Which branch of an `any` combinator matched, and its subtree.
    Any(usize, Box<BindingTree>),
    /// Zero or more repetitions of a `many0`/`many1` combinator's item.
    Many(Vec<BindingTree>),
}

/// Builds a value out of the children a `Seq` or `Many` combinator bound.
pub type Combine<V> = fn(&Grammar<V>, Vec<V>) -> V;
/// Builds a value out of the single token a `Atomic`/`Symbol` combinator bound.
pub type AtomEmit<V> = fn(&Spanned<Token>) -> V;

pub enum Kind<V> {
    /// Accepts one token of `category`.
    Atomic { category: Category, emit: AtomEmit<V> },
    /// Accepts one `IDENTIFIER` token whose lexeme is exactly `lexeme`.
    Symbol { lexeme: &'static str, emit: AtomEmit<V> },
    /// Accepts each of `parts` in order, then folds their values with
    /// `combine`.
    Seq { parts: Vec<&'static str>, combine: Combine<V> },
    /// Accepts whichever of `options` binds first, trying them in order.
    Any { options: Vec<&'static str> },
    /// Zero or more repetitions of `item`, folded with `combine`.
    Many0 { item: &'static str, combine: Combine<V> },
    /// One or more repetitions of `item`, folded with `combine`.
    Many1 { item: &'static str, combine: Combine<V> },
}

pub struct Combinator<V> {
    pub label: &'static str,
    pub kind: Kind<V>,
}

/// A label-addressed registry of combinators, resolved at `bind` time so
/// combinators can refer to each other before all of them exist —
/// required for the grammar's mutual recursion (`DATUM` contains `LIST`
/// contains `DATUM`).
pub struct Grammar<V> {
    combinators: HashMap<&'static str, Combinator<V>>,
}

impl<V: Clone> Grammar<V> {
    pub fn new() -> Grammar<V> { Grammar { combinators: HashMap::new() } }

    pub fn register(&mut self, combinator: Combinator<V>) {
        self.combinators.insert(combinator.label, combinator);
    }

    fn get(&self, label: &str) -> &Combinator<V> {
        self.combinators
            .get(label)
            .unwrap_or_else(|| panic!("grammar bug: no combinator registered for {:?}", label))
    }

    /// Tries to bind `label` against `tokens` starting at `start`.
    /// Returns the subtree and the offset just past what it consumed, or
    /// `None` on failure -- binding never aborts the whole parse, a
    /// failed `bind` just means the caller (an enclosing `any`/`many0`)
    /// tries something else or stops.
    pub fn bind(
        &self,
        tokens: &[Spanned<Token>],
        start: usize,
        label: &str,
    ) -> Option<(BindingTree, usize)> {
        match &self.get(label).kind {
            Kind::Atomic { category, .. } => {
                let token = tokens.get(start)?;
                if token.item.category == *category {
                    Some((BindingTree::Leaf(start, token.span.clone()), start + 1))
                } else {
                    None
                }
            },
            Kind::Symbol { lexeme, .. } => {
                let token = tokens.get(start)?;
                if token.item.category == Category::Identifier && token.item.lexeme == *lexeme {
                    Some((BindingTree::Leaf(start, token.span.clone()), start + 1))
                } else {
                    None
                }
            },
            Kind::Seq { parts, .. } => {
                let mut pos = start;
                let mut children = Vec::with_capacity(parts.len());
                for part in parts {
                    let (child, next) = self.bind(tokens, pos, part)?;
                    children.push(child);
                    pos = next;
                }
                Some((BindingTree::Seq(children), pos))
            },
            Kind::Any { options } => {
                for (index, option) in options.iter().enumerate() {
                    if let Some((child, next)) = self.bind(tokens, start, option) {
                        return Some((BindingTree::Any(index, Box::new(child)), next));
                    }
                }
                None
            },
            Kind::Many0 { item, .. } => {
                let mut pos = start;
                let mut children = Vec::new();
                while let Some((child, next)) = self.bind(tokens, pos, item) {
                    children.push(child);
                    pos = next;
                }
                Some((BindingTree::Many(children), pos))
            },
            Kind::Many1 { item, .. } => {
                let mut pos = start;
                let mut children = Vec::new();
                while let Some((child, next)) = self.bind(tokens, pos, item) {
                    children.push(child);
                    pos = next;
                }
                if children.is_empty() { None } else { Some((BindingTree::Many(children), pos)) }
            },
        }
    }

    /// Converts a binding tree produced by `bind(tokens, _, label)` back
    /// into a semantic value. Must only be called with a tree that came
    /// from the combinator named `label` -- mismatches are a grammar bug,
    /// not a user-facing error, and panic.
    pub fn emit(&self, tokens: &[Spanned<Token>], label: &str, tree: &BindingTree) -> V {
        match (&self.get(label).kind, tree) {
            (Kind::Atomic { emit, .. }, BindingTree::Leaf(index, span)) => {
                emit(&Spanned::new(tokens[*index].item.clone(), span.clone()))
            },
            (Kind::Symbol { emit, .. }, BindingTree::Leaf(index, span)) => {
                emit(&Spanned::new(tokens[*index].item.clone(), span.clone()))
            },
            (Kind::Seq { parts, combine }, BindingTree::Seq(children)) => {
                let values = parts
                    .iter()
                    .zip(children)
                    .map(|(part, child)| self.emit(tokens, part, child))
                    .collect();
                combine(self, values)
            },
            (Kind::Any { options }, BindingTree::Any(index, child)) => {
                self.emit(tokens, options[*index], child)
            },
            (Kind::Many0 { item, combine }, BindingTree::Many(children)) => {
                let values = children.iter().map(|child| self.emit(tokens, item, child)).collect();
                combine(self, values)
            },
            (Kind::Many1 { item, combine }, BindingTree::Many(children)) => {
                let values = children.iter().map(|child| self.emit(tokens, item, child)).collect();
                combine(self, values)
            },
            _ => panic!("grammar bug: binding tree shape does not match combinator {:?}", label),
        }
    }

    /// Binds `root` at offset 0; in strict mode (the only mode this crate
    /// uses) requires the whole token stream to be consumed, then emits.
    pub fn parse(
        &self,
        tokens: &[Spanned<Token>],
        root: &'static str,
        source: &Rc<Source>,
    ) -> Result<V, Syntax> {
        let (tree, end) = self.bind(tokens, 0, root).ok_or_else(|| {
            Syntax::error(
                &format!("Could not parse {} starting here", root),
                &start_span(tokens, source),
            )
        })?;

        if end != tokens.len() {
            let span = tokens.get(end).map(|t| t.span.clone()).unwrap_or_else(|| {
                Span::point(source, source.contents.len())
            });
            return Err(Syntax::error("Unexpected trailing input after a complete form", &span));
        }

        Ok(self.emit(tokens, root, &tree))
    }
}

fn start_span(tokens: &[Spanned<Token>], source: &Rc<Source>) -> Span {
    tokens.first().map(|t| t.span.clone()).unwrap_or_else(|| Span::point(source, 0))
}

// -- constructors, replacing the original's NULL-terminated varargs
// (spec.md §9) with plain slice-taking builders --

pub fn atomic<V>(label: &'static str, category: Category, emit: AtomEmit<V>) -> Combinator<V> {
    Combinator { label, kind: Kind::Atomic { category, emit } }
}

pub fn symbol<V>(label: &'static str, lexeme: &'static str, emit: AtomEmit<V>) -> Combinator<V> {
    Combinator { label, kind: Kind::Symbol { lexeme, emit } }
}

pub fn seq<V>(label: &'static str, parts: &[&'static str], combine: Combine<V>) -> Combinator<V> {
    Combinator { label, kind: Kind::Seq { parts: parts.to_vec(), combine } }
}

pub fn any<V>(label: &'static str, options: &[&'static str]) -> Combinator<V> {
    Combinator { label, kind: Kind::Any { options: options.to_vec() } }
}

pub fn many0<V>(label: &'static str, item: &'static str, combine: Combine<V>) -> Combinator<V> {
    Combinator { label, kind: Kind::Many0 { item, combine } }
}

pub fn many1<V>(label: &'static str, item: &'static str, combine: Combine<V>) -> Combinator<V> {
    Combinator { label, kind: Kind::Many1 { item, combine } }
}
