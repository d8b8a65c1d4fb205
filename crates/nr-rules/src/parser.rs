use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;
use nr_core::ATTRIBUTE_SCHEMA;

use crate::ast::*;
use crate::lexer::Token;

type Span = SimpleSpan;

/// Deepest parenthesized grouping the parser accepts.
pub const MAX_NESTING: usize = 8;

/// Most operators, prefix and infix together, in one expression.
pub const MAX_OPERATORS: usize = 64;

/// Parse error with source span.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Byte range the error points at.
    pub span: std::ops::Range<usize>,
    /// Human-readable description.
    pub message: String,
}

fn to_ast_span(s: Span) -> crate::ast::Span {
    s.into_range()
}

fn spanned<T>(node: T, span: Span) -> Spanned<T> {
    Spanned {
        node,
        span: to_ast_span(span),
    }
}

fn binary(op: BinaryOp, lhs: Spanned<Expr>, rhs: Spanned<Expr>) -> Spanned<Expr> {
    let span = lhs.span.start..rhs.span.end;
    Spanned {
        node: Expr::Binary(op, Box::new(lhs), Box::new(rhs)),
        span,
    }
}

/// Build the expression parser.
///
/// Precedence, loosest first: `||`, `&&`, equality, ordering, additive,
/// multiplicative, prefix. All infix levels are left-associative.
fn expression_parser<'a, I>()
-> impl Parser<'a, I, Spanned<Expr>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = Span>,
{
    recursive(|expr| {
        // -- Helpers --

        let kw = |k: &'static str| select! { Token::Ident(ref w) if w.as_str() == k => () }.labelled(k);
        let ident = select! { Token::Ident(w) => w }.labelled("identifier");
        let number = select! { Token::Number(n) => n }.labelled("number");
        let string_lit = select! { Token::Str(s) => s }.labelled("string");

        // -- Literals --

        let literal = choice((
            number.map(Literal::Number),
            string_lit.clone().map(Literal::Str),
            kw("true").to(Literal::Bool(true)),
            kw("false").to(Literal::Bool(false)),
        ))
        .map(Expr::Literal);

        // -- State references --

        // attributes.<name>
        let attribute = kw("attributes")
            .ignore_then(just(Token::Dot))
            .ignore_then(ident.clone())
            .map(VarRef::Attribute);

        // flags.<name>
        let flag = kw("flags")
            .ignore_then(just(Token::Dot))
            .ignore_then(ident)
            .map(VarRef::Flag);

        // inventory.length | inventory.includes("<item>")
        let inventory = kw("inventory").ignore_then(just(Token::Dot)).ignore_then(choice((
            kw("length").to(Expr::Var(VarRef::InventoryLength)),
            kw("includes")
                .ignore_then(string_lit.delimited_by(just(Token::LParen), just(Token::RParen)))
                .map(Expr::Includes),
        )));

        let state_field = choice((
            kw("day").to(VarRef::Day),
            kw("time").to(VarRef::Time),
            kw("location").to(VarRef::Location),
        ));

        let bare_attribute = select! {
            Token::Ident(ref w) if ATTRIBUTE_SCHEMA.contains(&w.as_str()) => VarRef::Attribute(w.clone())
        }
        .labelled("attribute");

        let variable = choice((attribute, flag, state_field, bare_attribute)).map(Expr::Var);

        // -- Operands --

        let atom = choice((literal, inventory, variable))
            .map_with(|node, e| spanned(node, e.span()))
            .or(expr.delimited_by(just(Token::LParen), just(Token::RParen)))
            .labelled("operand");

        // -- Operators --

        let prefix_op = choice((
            just(Token::Bang).to(UnaryOp::Not),
            just(Token::Minus).to(UnaryOp::Neg),
        ))
        .map_with(|op, e| (op, to_ast_span(e.span())));

        let unary = prefix_op
            .repeated()
            .foldr(atom, |(op, op_span): (UnaryOp, crate::ast::Span), rhs: Spanned<Expr>| {
                let span = op_span.start..rhs.span.end;
                Spanned {
                    node: Expr::Unary(op, Box::new(rhs)),
                    span,
                }
            })
            .boxed();

        let product = unary.clone().foldl(
            choice((
                just(Token::Star).to(BinaryOp::Mul),
                just(Token::Slash).to(BinaryOp::Div),
                just(Token::Percent).to(BinaryOp::Rem),
            ))
            .then(unary)
            .repeated(),
            |lhs, (op, rhs)| binary(op, lhs, rhs),
        );

        let sum = product.clone().foldl(
            choice((
                just(Token::Plus).to(BinaryOp::Add),
                just(Token::Minus).to(BinaryOp::Sub),
            ))
            .then(product)
            .repeated(),
            |lhs, (op, rhs)| binary(op, lhs, rhs),
        );

        let ordering = sum.clone().foldl(
            choice((
                just(Token::Le).to(BinaryOp::Le),
                just(Token::Ge).to(BinaryOp::Ge),
                just(Token::Lt).to(BinaryOp::Lt),
                just(Token::Gt).to(BinaryOp::Gt),
            ))
            .then(sum)
            .repeated(),
            |lhs, (op, rhs)| binary(op, lhs, rhs),
        );

        let equality = ordering.clone().foldl(
            choice((
                just(Token::EqEq).to(BinaryOp::Eq),
                just(Token::NotEq).to(BinaryOp::Ne),
            ))
            .then(ordering)
            .repeated(),
            |lhs, (op, rhs)| binary(op, lhs, rhs),
        );

        let conjunction = equality.clone().foldl(
            just(Token::AndAnd).to(BinaryOp::And).then(equality).repeated(),
            |lhs, (op, rhs)| binary(op, lhs, rhs),
        );

        conjunction
            .clone()
            .foldl(
                just(Token::OrOr).to(BinaryOp::Or).then(conjunction).repeated(),
                |lhs, (op, rhs)| binary(op, lhs, rhs),
            )
            .labelled("expression")
            .boxed()
    })
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse a token stream into an expression tree.
pub fn parse(tokens: &[(Token, std::ops::Range<usize>)]) -> Result<Spanned<Expr>, Vec<ParseError>> {
    check_limits(tokens).map_err(|e| vec![e])?;

    let token_iter = tokens
        .iter()
        .map(|(tok, span)| (tok.clone(), Span::from(span.clone())));

    let len = tokens.last().map_or(0, |(_, s)| s.end);
    let eoi: Span = (len..len).into();
    let stream = Stream::from_iter(token_iter).map(eoi, |(t, s): (_, _)| (t, s));

    let (output, errors) = expression_parser()
        .then_ignore(end())
        .parse(stream)
        .into_output_errors();

    if let Some(ast) = output
        && errors.is_empty()
    {
        return Ok(ast);
    }

    Err(errors
        .into_iter()
        .map(|e| {
            let span = e.span();
            ParseError {
                span: span.into_range(),
                message: e.to_string(),
            }
        })
        .collect())
}

/// Reject token streams that would build a tree too deep to parse or walk.
///
/// The parentheses of `includes(...)` are a call, not a grouping, and do not
/// count toward [`MAX_NESTING`].
fn check_limits(tokens: &[(Token, std::ops::Range<usize>)]) -> Result<(), ParseError> {
    let mut groups: Vec<bool> = Vec::new();
    let mut depth = 0usize;
    let mut operators = 0usize;

    for (idx, (token, span)) in tokens.iter().enumerate() {
        match token {
            Token::LParen => {
                let call = idx
                    .checked_sub(1)
                    .and_then(|prev| tokens.get(prev))
                    .is_some_and(|(t, _)| matches!(t, Token::Ident(w) if w == "includes"));
                groups.push(!call);
                if !call {
                    depth += 1;
                    if depth > MAX_NESTING {
                        return Err(ParseError {
                            span: span.clone(),
                            message: format!(
                                "expression nests too deeply: more than {MAX_NESTING} levels of parentheses"
                            ),
                        });
                    }
                }
            }
            Token::RParen => {
                if groups.pop() == Some(true) {
                    depth -= 1;
                }
            }
            t if t.is_operator() => {
                operators += 1;
                if operators > MAX_OPERATORS {
                    return Err(ParseError {
                        span: span.clone(),
                        message: format!(
                            "expression is too long: more than {MAX_OPERATORS} operators"
                        ),
                    });
                }
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer;

    fn parse_source(source: &str) -> Result<Spanned<Expr>, Vec<ParseError>> {
        let (tokens, lex_errors) = lexer::lex(source);
        assert!(lex_errors.is_empty(), "lex errors: {lex_errors:?}");
        parse(&tokens)
    }

    fn render(source: &str) -> String {
        parse_source(source).unwrap().node.to_string()
    }

    #[test]
    fn parse_bare_attributes() {
        let ast = parse_source("sanity > 60 && hunger > 50").unwrap();
        match &ast.node {
            Expr::Binary(BinaryOp::And, lhs, rhs) => {
                assert!(matches!(
                    &lhs.node,
                    Expr::Binary(BinaryOp::Gt, a, _)
                        if a.node == Expr::Var(VarRef::Attribute("sanity".to_string()))
                ));
                assert!(matches!(&rhs.node, Expr::Binary(BinaryOp::Gt, ..)));
            }
            other => panic!("expected conjunction, got {other:?}"),
        }
        assert_eq!(ast.span, 0..26);
    }

    #[test]
    fn prefixed_and_bare_attributes_agree() {
        let bare = parse_source("health <= 0").unwrap();
        let prefixed = parse_source("attributes.health <= 0").unwrap();
        assert_eq!(bare.node.references(), prefixed.node.references());
    }

    #[test]
    fn parse_inventory_forms() {
        let ast = parse_source(r#"inventory.includes("golden_key")"#).unwrap();
        assert_eq!(ast.node, Expr::Includes("golden_key".to_string()));

        let ast = parse_source("inventory.length >= 3").unwrap();
        assert!(matches!(
            &ast.node,
            Expr::Binary(BinaryOp::Ge, lhs, _) if lhs.node == Expr::Var(VarRef::InventoryLength)
        ));
    }

    #[test]
    fn parse_flags_and_state_fields() {
        let ast = parse_source("flags.rule1_broken || location == 'roof' || time > 20").unwrap();
        let refs = ast.node.references();
        assert_eq!(
            refs,
            vec![
                &VarRef::Flag("rule1_broken".to_string()),
                &VarRef::Location,
                &VarRef::Time,
            ]
        );
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(render("1 + 2 * 3 > 6"), "1 + 2 * 3 > 6");
        assert_eq!(render("(1 + 2) * 3"), "(1 + 2) * 3");
        assert_eq!(render("10 - 4 - 3"), "10 - 4 - 3");
        assert_eq!(render("day >= 7 || day < 2 && luck > 50"), "day >= 7 || day < 2 && attributes.luck > 50");
        assert_eq!(render("(day >= 7 || day < 2) && luck > 50"), "(day >= 7 || day < 2) && attributes.luck > 50");
    }

    #[test]
    fn prefix_operators() {
        assert_eq!(render("!flags.met_guard"), "!flags.met_guard");
        assert_eq!(render("!(day > 3)"), "!(day > 3)");
        let ast = parse_source("-health < 0").unwrap();
        assert!(matches!(
            &ast.node,
            Expr::Binary(BinaryOp::Lt, lhs, _) if matches!(lhs.node, Expr::Unary(UnaryOp::Neg, _))
        ));
    }

    #[test]
    fn boolean_literals() {
        assert_eq!(
            parse_source("true").unwrap().node,
            Expr::Literal(Literal::Bool(true))
        );
    }

    #[test]
    fn unknown_bare_identifier_fails() {
        assert!(parse_source("mana > 3").is_err());
    }

    #[test]
    fn arbitrary_member_call_fails() {
        assert!(parse_source("inventory.push(\"x\")").is_err());
        assert!(parse_source("flags.x(1)").is_err());
    }

    #[test]
    fn trailing_operator_fails() {
        let errors = parse_source("day >= 7 &&").unwrap_err();
        assert!(!errors.is_empty());
    }

    #[test]
    fn empty_input_fails() {
        assert!(parse(&[]).is_err());
    }

    fn nested(levels: usize) -> String {
        format!("{}day >= 1{}", "(".repeat(levels), ")".repeat(levels))
    }

    #[test]
    fn nesting_up_to_the_limit_parses() {
        assert_eq!(render(&nested(MAX_NESTING)), "day >= 1");
    }

    #[test]
    fn deeper_nesting_is_rejected() {
        let errors = parse_source(&nested(MAX_NESTING + 1)).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].span, MAX_NESTING..MAX_NESTING + 1);
        assert!(errors[0].message.starts_with("expression nests too deeply"));

        let errors = parse_source(&nested(1000)).unwrap_err();
        assert!(errors[0].message.starts_with("expression nests too deeply"));
    }

    #[test]
    fn includes_call_is_not_a_grouping() {
        let source = format!(
            "{}inventory.includes('key'){}",
            "(".repeat(MAX_NESTING),
            ")".repeat(MAX_NESTING)
        );
        assert!(parse_source(&source).is_ok());
    }

    #[test]
    fn operator_count_is_bounded() {
        let chain = |n: usize| vec!["day"; n + 1].join(" + ");
        assert!(parse_source(&format!("{} > 1", chain(MAX_OPERATORS - 1))).is_ok());

        let errors = parse_source(&format!("{} > 1", chain(MAX_OPERATORS))).unwrap_err();
        assert!(errors[0].message.starts_with("expression is too long"));

        let errors = parse_source(&format!("{}flags.x", "!".repeat(500))).unwrap_err();
        assert!(errors[0].message.starts_with("expression is too long"));
    }
}
