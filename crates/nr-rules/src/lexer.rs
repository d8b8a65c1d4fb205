use logos::Logos;
use std::fmt;

/// Token type for condition expressions.
///
/// Keywords are not distinguished here: `true`, `day`, `inventory` and friends
/// are all `Token::Ident`, and the parser decides what they mean.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Numeric literal.
    Number(f64),
    /// Single- or double-quoted string literal, quotes stripped.
    Str(String),
    /// Bare identifier.
    Ident(String),
    /// Member access `.`.
    Dot,
    /// Comma separator `,`.
    Comma,
    /// Left parenthesis `(`.
    LParen,
    /// Right parenthesis `)`.
    RParen,
    /// Logical and `&&`.
    AndAnd,
    /// Logical or `||`.
    OrOr,
    /// Logical not `!`.
    Bang,
    /// Equality `==` (also `===`).
    EqEq,
    /// Inequality `!=` (also `!==`).
    NotEq,
    /// Less than `<`.
    Lt,
    /// Less than or equal `<=`.
    Le,
    /// Greater than `>`.
    Gt,
    /// Greater than or equal `>=`.
    Ge,
    /// Addition `+`.
    Plus,
    /// Subtraction or negation `-`.
    Minus,
    /// Multiplication `*`.
    Star,
    /// Division `/`.
    Slash,
    /// Remainder `%`.
    Percent,
}

impl Token {
    /// True for tokens that need an operand on their right.
    pub fn is_operator(&self) -> bool {
        matches!(
            self,
            Token::AndAnd
                | Token::OrOr
                | Token::Bang
                | Token::EqEq
                | Token::NotEq
                | Token::Lt
                | Token::Le
                | Token::Gt
                | Token::Ge
                | Token::Plus
                | Token::Minus
                | Token::Star
                | Token::Slash
                | Token::Percent
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{n}"),
            Token::Str(s) => write!(f, "\"{s}\""),
            Token::Ident(w) => write!(f, "{w}"),
            Token::Dot => write!(f, "."),
            Token::Comma => write!(f, ","),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::AndAnd => write!(f, "&&"),
            Token::OrOr => write!(f, "||"),
            Token::Bang => write!(f, "!"),
            Token::EqEq => write!(f, "=="),
            Token::NotEq => write!(f, "!="),
            Token::Lt => write!(f, "<"),
            Token::Le => write!(f, "<="),
            Token::Gt => write!(f, ">"),
            Token::Ge => write!(f, ">="),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
        }
    }
}

/// Internal logos token, converted to owned `Token` after lexing.
///
/// String literals cannot contain backslashes, so escape sequences never lex.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum RawToken {
    #[token(".")]
    Dot,

    #[token(",")]
    Comma,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("&&")]
    AndAnd,

    #[token("||")]
    OrOr,

    #[token("!")]
    Bang,

    #[token("==")]
    #[token("===")]
    EqEq,

    #[token("!=")]
    #[token("!==")]
    NotEq,

    #[token("<")]
    Lt,

    #[token("<=")]
    Le,

    #[token(">")]
    Gt,

    #[token(">=")]
    Ge,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,

    #[regex(r#""[^"\\\n]*""#)]
    #[regex(r"'[^'\\\n]*'")]
    Str,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
}

/// A lexer error with source location.
#[derive(Debug, Clone)]
pub struct LexError {
    /// Byte range of the erroneous input in the source.
    pub span: std::ops::Range<usize>,
    /// Human-readable description of the lexer error.
    pub message: String,
}

/// Lex an expression into a sequence of `(Token, Span)` pairs.
///
/// Lexing continues past errors so that diagnostics can report every bad
/// character at once.
pub fn lex(source: &str) -> (Vec<(Token, std::ops::Range<usize>)>, Vec<LexError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(raw) => {
                let token = match raw {
                    RawToken::Dot => Token::Dot,
                    RawToken::Comma => Token::Comma,
                    RawToken::LParen => Token::LParen,
                    RawToken::RParen => Token::RParen,
                    RawToken::AndAnd => Token::AndAnd,
                    RawToken::OrOr => Token::OrOr,
                    RawToken::Bang => Token::Bang,
                    RawToken::EqEq => Token::EqEq,
                    RawToken::NotEq => Token::NotEq,
                    RawToken::Lt => Token::Lt,
                    RawToken::Le => Token::Le,
                    RawToken::Gt => Token::Gt,
                    RawToken::Ge => Token::Ge,
                    RawToken::Plus => Token::Plus,
                    RawToken::Minus => Token::Minus,
                    RawToken::Star => Token::Star,
                    RawToken::Slash => Token::Slash,
                    RawToken::Percent => Token::Percent,
                    RawToken::Number => {
                        let raw = lexer.slice();
                        match raw.parse::<f64>() {
                            Ok(n) => Token::Number(n),
                            Err(_) => {
                                errors.push(LexError {
                                    span: span.clone(),
                                    message: format!("invalid number literal: {raw}"),
                                });
                                continue;
                            }
                        }
                    }
                    RawToken::Str => {
                        let slice = lexer.slice();
                        Token::Str(slice[1..slice.len() - 1].to_string())
                    }
                    RawToken::Ident => Token::Ident(lexer.slice().to_string()),
                };
                tokens.push((token, span));
            }
            Err(()) => {
                errors.push(LexError {
                    span: span.clone(),
                    message: format!("unexpected character: {:?}", &source[span.clone()]),
                });
            }
        }
    }

    (tokens, errors)
}
