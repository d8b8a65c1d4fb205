//! Rewrites state references into literals.
//!
//! Substitution is a tree rewrite, so a value that happens to look like a
//! variable name (a location called `"day"`, say) is never substituted twice.

use nr_core::{AttributeValue, GameStateSnapshot};

use crate::ast::{Expr, Literal, Spanned, VarRef};

/// Resolve one reference against the snapshot.
///
/// Attributes missing from the snapshot resolve to `0`.
pub fn resolve(var: &VarRef, state: &GameStateSnapshot) -> Literal {
    match var {
        VarRef::Attribute(name) => match state.attribute(name) {
            Some(AttributeValue::Number(n)) => Literal::Number(*n),
            Some(AttributeValue::Text(s)) => Literal::Str(s.clone()),
            None => Literal::Number(0.0),
        },
        VarRef::InventoryLength => Literal::Number(state.inventory.len() as f64),
        VarRef::Flag(name) => Literal::Bool(state.flag(name)),
        VarRef::Day => Literal::Number(f64::from(state.day)),
        VarRef::Time => Literal::Number(state.time),
        VarRef::Location => Literal::Str(state.location.clone()),
    }
}

/// Produce a copy of `expr` in which every state reference is a literal.
pub fn substitute(expr: &Spanned<Expr>, state: &GameStateSnapshot) -> Spanned<Expr> {
    let node = match &expr.node {
        Expr::Literal(lit) => Expr::Literal(lit.clone()),
        Expr::Var(var) => Expr::Literal(resolve(var, state)),
        Expr::Includes(item) => Expr::Literal(Literal::Bool(state.has_item(item))),
        Expr::Unary(op, inner) => Expr::Unary(*op, Box::new(substitute(inner, state))),
        Expr::Binary(op, lhs, rhs) => Expr::Binary(
            *op,
            Box::new(substitute(lhs, state)),
            Box::new(substitute(rhs, state)),
        ),
    };
    Spanned {
        node,
        span: expr.span.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile_expression;

    fn state() -> GameStateSnapshot {
        GameStateSnapshot::new()
            .with_attribute("health", 85)
            .with_attribute("hunger", 80)
            .with_attribute("sanity", 85)
            .with_attribute("profession", "student")
            .with_item("golden_key")
            .with_item("food")
            .with_flag("rule2_followed", true)
            .with_day(1)
            .with_time(100.0)
            .with_location("dormitory")
    }

    fn literal_text(source: &str) -> String {
        let expr = compile_expression(source).unwrap();
        let out = substitute(&expr, &state());
        assert!(out.node.is_literal());
        out.node.to_string()
    }

    #[test]
    fn attributes_become_numbers() {
        insta::assert_snapshot!(literal_text("sanity > 60 && hunger > 50"), @"85 > 60 && 80 > 50");
    }

    #[test]
    fn inventory_forms() {
        insta::assert_snapshot!(
            literal_text(r#"inventory.length >= 2 && inventory.includes("golden_key") && !inventory.includes("rope")"#),
            @"2 >= 2 && true && !false"
        );
    }

    #[test]
    fn flags_default_to_false() {
        insta::assert_snapshot!(
            literal_text("flags.rule2_followed || flags.rule1_broken"),
            @"true || false"
        );
    }

    #[test]
    fn state_fields_and_strings() {
        insta::assert_snapshot!(
            literal_text("day >= 7 || time > 50 && location == 'dormitory' && profession != 'doctor'"),
            @r#"1 >= 7 || 100 > 50 && "dormitory" == "dormitory" && "student" != "doctor""#
        );
    }

    #[test]
    fn missing_attribute_is_zero() {
        assert_eq!(
            resolve(&VarRef::Attribute("charisma".to_string()), &state()),
            Literal::Number(0.0)
        );
        insta::assert_snapshot!(literal_text("luck > 10"), @"0 > 10");
    }

    #[test]
    fn spans_are_preserved() {
        let expr = compile_expression("day >= 7").unwrap();
        let out = substitute(&expr, &state());
        assert_eq!(out.span, expr.span);
    }
}
