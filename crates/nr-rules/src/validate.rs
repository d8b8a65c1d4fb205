//! Authoring-time checks for a single expression.
//!
//! Nothing here runs on the evaluation path. The engine compiles conditions
//! with [`crate::compile_expression`]; these checks add the messages content
//! authors need to fix a broken expression.

use std::ops::Range;

use serde::Serialize;

use crate::diagnostics::Diagnostic;
use crate::lexer::{self, Token};
use crate::{guard, parser};

/// Outcome of [`validate_expression`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    /// True when the expression compiles.
    pub valid: bool,
    /// First error message, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Check an expression without any game state.
///
/// Returns the first error found; warnings do not make an expression invalid.
pub fn validate_expression(source: &str) -> Validation {
    match check_expression(source).into_iter().find(Diagnostic::is_error) {
        Some(diag) => Validation {
            valid: false,
            error: Some(diag.message),
        },
        None => Validation {
            valid: true,
            error: None,
        },
    }
}

/// Check an expression and report every problem with its source span.
///
/// Stages run in order and the first failing stage ends the check:
/// parenthesis balance over the lexed tokens, the unsafe-pattern guard,
/// lexing, incomplete trailing constructs, then the full parse.
pub fn check_expression(source: &str) -> Vec<Diagnostic> {
    if source.trim().is_empty() {
        return vec![Diagnostic::error(0..source.len(), "empty expression")];
    }

    let (tokens, lex_errors) = lexer::lex(source);

    let diags = check_parens(&tokens);
    if !diags.is_empty() {
        return diags;
    }

    let diags: Vec<Diagnostic> = guard::inspect(source)
        .into_iter()
        .map(Diagnostic::from)
        .collect();
    if !diags.is_empty() {
        return diags;
    }

    if !lex_errors.is_empty() {
        return lex_errors.into_iter().map(Diagnostic::from).collect();
    }

    let diags = check_incomplete(&tokens);
    if !diags.is_empty() {
        return diags;
    }

    match parser::parse(&tokens) {
        Ok(expr) if expr.node.is_literal() => vec![
            Diagnostic::warning(expr.span.clone(), "expression does not reference any game state")
                .with_label("this always evaluates the same way"),
        ],
        Ok(_) => Vec::new(),
        Err(errors) => errors.into_iter().map(Diagnostic::from).collect(),
    }
}

fn check_parens(tokens: &[(Token, Range<usize>)]) -> Vec<Diagnostic> {
    let mut open = Vec::new();
    let mut diags = Vec::new();

    for (token, span) in tokens {
        match token {
            Token::LParen => open.push(span.clone()),
            Token::RParen if open.pop().is_none() => diags.push(
                Diagnostic::error(span.clone(), "unbalanced parentheses")
                    .with_label("unmatched `)`"),
            ),
            _ => {}
        }
    }
    diags.extend(open.into_iter().map(|span| {
        Diagnostic::error(span, "unbalanced parentheses").with_label("unclosed `(`")
    }));
    diags.sort_by_key(|d| d.span.start);
    diags
}

/// True when the identifier at `idx` follows `inventory.`.
fn is_inventory_member(tokens: &[(Token, Range<usize>)], idx: usize) -> bool {
    matches!(
        idx.checked_sub(2).and_then(|start| tokens.get(start..idx)),
        Some([(Token::Ident(owner), _), (Token::Dot, _)]) if owner == "inventory"
    )
}

fn check_incomplete(tokens: &[(Token, Range<usize>)]) -> Vec<Diagnostic> {
    let mut diags = Vec::new();

    for (idx, (token, span)) in tokens.iter().enumerate() {
        let next = tokens.get(idx + 1).map(|(t, _)| t);
        match token {
            Token::Dot if !matches!(next, Some(Token::Ident(_))) => diags.push(
                Diagnostic::error(
                    span.clone(),
                    "incomplete property access: `.` must be followed by a name",
                )
                .with_label("name expected after this"),
            ),
            Token::Ident(name) if name == "includes" && is_inventory_member(tokens, idx) => {
                let arg = tokens.get(idx + 2).map(|(t, _)| t);
                let closed = tokens.get(idx + 3).map(|(t, _)| t);
                let complete = matches!(next, Some(Token::LParen))
                    && matches!(arg, Some(Token::Str(_)))
                    && matches!(closed, Some(Token::RParen));
                if !complete {
                    diags.push(
                        Diagnostic::error(
                            span.clone(),
                            "incomplete function call: `includes` takes one quoted item id",
                        )
                        .with_label("expected `includes('item_id')`"),
                    );
                }
            }
            _ => {}
        }
    }

    if let Some((last, span)) = tokens.last()
        && last.is_operator()
    {
        diags.push(
            Diagnostic::error(
                span.clone(),
                format!("incomplete expression: trailing operator `{last}`"),
            )
            .with_label("operand expected after this"),
        );
    }

    diags.sort_by_key(|d| d.span.start);
    diags
}
