//! Fail-closed denylist applied to expression source before compilation.
//!
//! The grammar already has no way to express calls, indexing or object
//! construction. The guard exists so that authors get a precise
//! "unsafe pattern" diagnostic for such constructs instead of a generic parse
//! error, and so that a condition containing them is rejected even if the
//! grammar grows later.

use std::fmt;

use crate::ast::Span;
use crate::lexer::{self, Token};

const INVOCATION: &[&str] = &["eval", "Function", "new", "fetch", "Reflect", "Proxy"];
const SCHEDULING: &[&str] = &[
    "setTimeout",
    "setInterval",
    "setImmediate",
    "requestAnimationFrame",
    "queueMicrotask",
];
const GLOBALS: &[&str] = &[
    "require",
    "import",
    "module",
    "exports",
    "global",
    "globalThis",
    "window",
    "document",
    "process",
    "this",
    "self",
];
const PROTOTYPE: &[&str] = &["prototype", "__proto__", "constructor"];
const KEYWORDS: &[&str] = &["delete", "void", "with", "debugger"];

/// Category of a denied construct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// Function or constructor invocation keyword.
    Invocation(String),
    /// Timer or scheduling primitive.
    Scheduling(String),
    /// Module or global-object reference.
    GlobalReference(String),
    /// Prototype or constructor access.
    PrototypeAccess(String),
    /// `delete`, `void`, `with` or `debugger`.
    Keyword(String),
    /// A backslash escape.
    EscapeSequence,
    /// `[` or `]`.
    IndexedAccess,
    /// `{` or `}`.
    ObjectLiteral,
    /// `;`.
    StatementSeparator,
    /// `` ` `` or `$`.
    Interpolation,
}

/// A denied construct and where it occurs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// What was found.
    pub kind: ViolationKind,
    /// Byte range in the source.
    pub span: Span,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invocation(w) => write!(f, "invocation keyword `{w}`"),
            Self::Scheduling(w) => write!(f, "scheduling primitive `{w}`"),
            Self::GlobalReference(w) => write!(f, "global reference `{w}`"),
            Self::PrototypeAccess(w) => write!(f, "prototype access `{w}`"),
            Self::Keyword(w) => write!(f, "keyword `{w}`"),
            Self::EscapeSequence => write!(f, "escape sequence"),
            Self::IndexedAccess => write!(f, "indexed access"),
            Self::ObjectLiteral => write!(f, "object literal"),
            Self::StatementSeparator => write!(f, "statement separator"),
            Self::Interpolation => write!(f, "template interpolation"),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expression contains unsafe pattern: {}", self.kind)
    }
}

fn classify_word(word: &str) -> Option<ViolationKind> {
    let owned = || word.to_string();
    if INVOCATION.contains(&word) {
        Some(ViolationKind::Invocation(owned()))
    } else if SCHEDULING.contains(&word) {
        Some(ViolationKind::Scheduling(owned()))
    } else if GLOBALS.contains(&word) {
        Some(ViolationKind::GlobalReference(owned()))
    } else if PROTOTYPE.contains(&word) {
        Some(ViolationKind::PrototypeAccess(owned()))
    } else if KEYWORDS.contains(&word) {
        Some(ViolationKind::Keyword(owned()))
    } else {
        None
    }
}

fn classify_char(c: char) -> Option<ViolationKind> {
    match c {
        '\\' => Some(ViolationKind::EscapeSequence),
        '[' | ']' => Some(ViolationKind::IndexedAccess),
        '{' | '}' => Some(ViolationKind::ObjectLiteral),
        ';' => Some(ViolationKind::StatementSeparator),
        '`' | '$' => Some(ViolationKind::Interpolation),
        _ => None,
    }
}

/// Scan `source` and return every denied construct, in source order.
///
/// Characters are checked everywhere, including inside string literals.
/// Words are checked only where the lexer sees an identifier, so an item id
/// such as `"new_key"` or a quoted `"eval"` is data, not a violation.
pub fn inspect(source: &str) -> Vec<Violation> {
    let mut violations: Vec<Violation> = source
        .char_indices()
        .filter_map(|(i, c)| {
            classify_char(c).map(|kind| Violation {
                kind,
                span: i..i + c.len_utf8(),
            })
        })
        .collect();

    let (tokens, _) = lexer::lex(source);
    violations.extend(tokens.into_iter().filter_map(|(token, span)| match token {
        Token::Ident(word) => classify_word(&word).map(|kind| Violation { kind, span }),
        _ => None,
    }));

    violations.sort_by_key(|v| v.span.start);
    violations
}

/// True when `source` contains no denied construct.
pub fn approve(source: &str) -> bool {
    inspect(source).is_empty()
}
