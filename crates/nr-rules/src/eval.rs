//! Tree-walking evaluator for literal expressions.

use std::cmp::Ordering;

use crate::ast::{BinaryOp, Expr, Literal, Spanned, UnaryOp};
use crate::error::{EvalError, EvalResult};

/// A runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A number.
    Number(f64),
    /// A boolean.
    Bool(bool),
    /// A string.
    Str(String),
}

impl Value {
    /// Truthiness: non-zero, non-NaN numbers and non-empty strings are true.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Bool(b) => *b,
            Value::Str(s) => !s.is_empty(),
        }
    }

    /// Type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Bool(_) => "boolean",
            Value::Str(_) => "string",
        }
    }
}

impl From<&Literal> for Value {
    fn from(lit: &Literal) -> Self {
        match lit {
            Literal::Number(n) => Value::Number(*n),
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Str(s) => Value::Str(s.clone()),
        }
    }
}

/// Evaluate a literal expression tree.
///
/// Fails with [`EvalError::Unresolved`] if the tree still contains state
/// references; run it through [`crate::substitute::substitute`] first.
pub fn evaluate(expr: &Spanned<Expr>) -> EvalResult<Value> {
    match &expr.node {
        Expr::Literal(lit) => Ok(Value::from(lit)),
        Expr::Var(var) => Err(EvalError::Unresolved(var.to_string())),
        Expr::Includes(item) => Err(EvalError::Unresolved(format!(
            "inventory.includes({item:?})"
        ))),
        Expr::Unary(op, inner) => {
            let value = evaluate(inner)?;
            match (op, value) {
                (UnaryOp::Not, v) => Ok(Value::Bool(!v.truthy())),
                (UnaryOp::Neg, Value::Number(n)) => Ok(Value::Number(-n)),
                (UnaryOp::Neg, v) => Err(EvalError::UnaryMismatch {
                    op: op.symbol(),
                    operand: v.type_name(),
                }),
            }
        }
        Expr::Binary(BinaryOp::And, lhs, rhs) => {
            if !evaluate(lhs)?.truthy() {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(evaluate(rhs)?.truthy()))
        }
        Expr::Binary(BinaryOp::Or, lhs, rhs) => {
            if evaluate(lhs)?.truthy() {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(evaluate(rhs)?.truthy()))
        }
        Expr::Binary(op, lhs, rhs) => {
            let left = evaluate(lhs)?;
            let right = evaluate(rhs)?;
            apply(*op, left, right)
        }
    }
}

/// Evaluate and reduce to a boolean by truthiness.
pub fn evaluate_bool(expr: &Spanned<Expr>) -> EvalResult<bool> {
    evaluate(expr).map(|v| v.truthy())
}

fn mismatch(op: BinaryOp, left: &Value, right: &Value) -> EvalError {
    EvalError::TypeMismatch {
        op: op.symbol(),
        left: left.type_name(),
        right: right.type_name(),
    }
}

fn apply(op: BinaryOp, left: Value, right: Value) -> EvalResult<Value> {
    match op {
        // `evaluate` short-circuits these before getting here.
        BinaryOp::And => Ok(Value::Bool(left.truthy() && right.truthy())),
        BinaryOp::Or => Ok(Value::Bool(left.truthy() || right.truthy())),
        BinaryOp::Eq | BinaryOp::Ne => {
            let equal = match (&left, &right) {
                (Value::Number(a), Value::Number(b)) => a == b,
                (Value::Bool(a), Value::Bool(b)) => a == b,
                (Value::Str(a), Value::Str(b)) => a == b,
                _ => return Err(mismatch(op, &left, &right)),
            };
            Ok(Value::Bool(if op == BinaryOp::Eq { equal } else { !equal }))
        }
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ordering = match (&left, &right) {
                (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
                (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
                _ => return Err(mismatch(op, &left, &right)),
            };
            // NaN compares false against everything.
            let Some(ordering) = ordering else {
                return Ok(Value::Bool(false));
            };
            let result = match op {
                BinaryOp::Lt => ordering == Ordering::Less,
                BinaryOp::Le => ordering != Ordering::Greater,
                BinaryOp::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            };
            Ok(Value::Bool(result))
        }
        BinaryOp::Add => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
            (l, r) => Err(mismatch(op, &l, &r)),
        },
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
            let (Value::Number(a), Value::Number(b)) = (&left, &right) else {
                return Err(mismatch(op, &left, &right));
            };
            let (a, b) = (*a, *b);
            match op {
                BinaryOp::Sub => Ok(Value::Number(a - b)),
                BinaryOp::Mul => Ok(Value::Number(a * b)),
                _ if b == 0.0 => Err(EvalError::DivisionByZero),
                BinaryOp::Div => Ok(Value::Number(a / b)),
                _ => Ok(Value::Number(a % b)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile_expression;

    fn eval_src(source: &str) -> EvalResult<Value> {
        evaluate(&compile_expression(source).unwrap())
    }

    #[test]
    fn arithmetic_and_comparison() {
        assert_eq!(eval_src("1 + 2 * 3").unwrap(), Value::Number(7.0));
        assert_eq!(eval_src("(1 + 2) * 3 == 9").unwrap(), Value::Bool(true));
        assert_eq!(eval_src("7 % 4 >= 3").unwrap(), Value::Bool(true));
        assert_eq!(eval_src("-2 < -1").unwrap(), Value::Bool(true));
    }

    #[test]
    fn string_comparison() {
        assert_eq!(eval_src("'roof' == 'roof'").unwrap(), Value::Bool(true));
        assert_eq!(eval_src("'a' < 'b'").unwrap(), Value::Bool(true));
        assert_eq!(eval_src("'a' + 'b' == 'ab'").unwrap(), Value::Bool(true));
    }

    #[test]
    fn logical_operators_short_circuit() {
        // The right-hand side would fault if evaluated.
        assert_eq!(eval_src("false && 1 / 0 > 0").unwrap(), Value::Bool(false));
        assert_eq!(eval_src("true || 'x' > 1").unwrap(), Value::Bool(true));
        assert_eq!(eval_src("!0").unwrap(), Value::Bool(true));
    }

    #[test]
    fn type_mismatch_is_an_error() {
        assert_eq!(
            eval_src("'student' > 3").unwrap_err(),
            EvalError::TypeMismatch {
                op: ">",
                left: "string",
                right: "number"
            }
        );
        assert!(matches!(
            eval_src("-'x'").unwrap_err(),
            EvalError::UnaryMismatch { op: "-", .. }
        ));
        assert!(eval_src("true == 1").is_err());
    }

    #[test]
    fn division_by_zero_is_an_error() {
        assert_eq!(eval_src("1 / 0").unwrap_err(), EvalError::DivisionByZero);
        assert_eq!(eval_src("1 % 0").unwrap_err(), EvalError::DivisionByZero);
    }

    #[test]
    fn unresolved_reference_is_an_error() {
        let err = eval_src("health > 0").unwrap_err();
        assert_eq!(err, EvalError::Unresolved("attributes.health".to_string()));
    }

    #[test]
    fn truthiness() {
        assert!(Value::Number(2.0).truthy());
        assert!(!Value::Number(0.0).truthy());
        assert!(!Value::Number(f64::NAN).truthy());
        assert!(Value::Str("x".to_string()).truthy());
        assert!(!Value::Str(String::new()).truthy());
        assert!(evaluate_bool(&compile_expression("3").unwrap()).unwrap());
    }
}
