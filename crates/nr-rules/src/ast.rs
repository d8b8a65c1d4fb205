use std::fmt;

/// Source span as a byte range.
pub type Span = std::ops::Range<usize>;

/// An AST node with source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    /// The wrapped AST node.
    pub node: T,
    /// The byte range of this node in the source text.
    pub span: Span,
}

/// A condition expression.
///
/// The node set is closed: anything outside it cannot be parsed, so there is
/// no way to express calls, assignment or indexing.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A constant.
    Literal(Literal),
    /// A reference into the game state.
    Var(VarRef),
    /// `inventory.includes("<item>")`.
    Includes(String),
    /// A prefix operator.
    Unary(UnaryOp, Box<Spanned<Expr>>),
    /// An infix operator.
    Binary(BinaryOp, Box<Spanned<Expr>>, Box<Spanned<Expr>>),
}

/// A literal constant.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// A number.
    Number(f64),
    /// `true` or `false`.
    Bool(bool),
    /// A string.
    Str(String),
}

/// A reference to one field of the game state snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VarRef {
    /// An attribute, bare (`health`) or prefixed (`attributes.health`).
    Attribute(String),
    /// `inventory.length`.
    InventoryLength,
    /// `flags.<name>`.
    Flag(String),
    /// `day`.
    Day,
    /// `time`.
    Time,
    /// `location`.
    Location,
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `!`
    Not,
    /// `-`
    Neg,
}

/// Infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `||`
    Or,
    /// `&&`
    And,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
}

impl BinaryOp {
    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq | BinaryOp::Ne => 3,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 4,
            BinaryOp::Add | BinaryOp::Sub => 5,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 6,
        }
    }

    /// Source symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
        }
    }
}

impl UnaryOp {
    /// Source symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
        }
    }
}

impl Expr {
    /// Visit every state reference in the tree, left to right.
    ///
    /// `inventory.includes(..)` is reported as `None` with the item id.
    pub fn visit_refs<'e>(&'e self, f: &mut impl FnMut(Option<&'e VarRef>, Option<&'e str>)) {
        match self {
            Expr::Literal(_) => {}
            Expr::Var(var) => f(Some(var), None),
            Expr::Includes(item) => f(None, Some(item)),
            Expr::Unary(_, inner) => inner.node.visit_refs(f),
            Expr::Binary(_, lhs, rhs) => {
                lhs.node.visit_refs(f);
                rhs.node.visit_refs(f);
            }
        }
    }

    /// All variable references in the tree, left to right.
    pub fn references(&self) -> Vec<&VarRef> {
        let mut out = Vec::new();
        self.visit_refs(&mut |var, _| {
            if let Some(var) = var {
                out.push(var);
            }
        });
        out
    }

    /// True when the tree contains only literals and operators.
    pub fn is_literal(&self) -> bool {
        let mut literal = true;
        self.visit_refs(&mut |_, _| literal = false);
        literal
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Binary(op, _, _) => op.precedence(),
            Expr::Unary(..) => 7,
            _ => 8,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{n}"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Str(s) => write!(f, "{s:?}"),
        }
    }
}

impl fmt::Display for VarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarRef::Attribute(name) => write!(f, "attributes.{name}"),
            VarRef::InventoryLength => write!(f, "inventory.length"),
            VarRef::Flag(name) => write!(f, "flags.{name}"),
            VarRef::Day => write!(f, "day"),
            VarRef::Time => write!(f, "time"),
            VarRef::Location => write!(f, "location"),
        }
    }
}

/// Renders with the fewest parentheses that preserve the tree shape.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(lit) => write!(f, "{lit}"),
            Expr::Var(var) => write!(f, "{var}"),
            Expr::Includes(item) => write!(f, "inventory.includes({item:?})"),
            Expr::Unary(op, inner) => {
                if inner.node.precedence() < 7 {
                    write!(f, "{}({})", op.symbol(), inner.node)
                } else {
                    write!(f, "{}{}", op.symbol(), inner.node)
                }
            }
            Expr::Binary(op, lhs, rhs) => {
                let prec = op.precedence();
                if lhs.node.precedence() < prec {
                    write!(f, "({})", lhs.node)?;
                } else {
                    write!(f, "{}", lhs.node)?;
                }
                write!(f, " {} ", op.symbol())?;
                // Operators are left-associative, so an equal-precedence right
                // child needs parentheses.
                if rhs.node.precedence() <= prec {
                    write!(f, "({})", rhs.node)
                } else {
                    write!(f, "{}", rhs.node)
                }
            }
        }
    }
}
