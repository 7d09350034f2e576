//! Expression parsing
//!
//! Recursive descent over an expression string. Each production returns the
//! parsed tree and the unparsed remainder. Operator precedence is not
//! encoded as grammar levels: `parse_binary` builds a left-leaning tree one
//! operator at a time and re-associates on the fly, walking into the left
//! tree's right spine whenever the new operator binds tighter.

use crate::error::{ParseError, ParseErrorKind, ParseResult};
use crate::model::{BinaryExpression, BinaryOp, Expression, UnaryOp};

use super::patterns::{
    EXPR_BINARY_OP, EXPR_FUNCTION_CLOSE, EXPR_FUNCTION_OPEN, EXPR_FUNCTION_SEPARATOR,
    EXPR_GROUP_CLOSE, EXPR_GROUP_OPEN, EXPR_IDENTIFIER, EXPR_IDENTIFIER_EX,
    EXPR_IDENTIFIER_EX_UNESCAPE, EXPR_NUMBER, EXPR_STRING, EXPR_STRING_DOUBLE,
    EXPR_STRING_DOUBLE_UNESCAPE, EXPR_STRING_UNESCAPE, EXPR_UNARY_OP,
};

/// Binary operator precedence, loosest to tightest
///
/// Same-rank operators associate left: a new operator only descends into a
/// left subtree whose operator ranks strictly lower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Precedence {
    /// `||`
    Or,
    /// `&&`
    And,
    /// `==`, `!=`
    Equality,
    /// `<=`, `<`, `>=`, `>`
    Comparison,
    /// `+`, `-`
    Additive,
    /// `*`, `/`, `%`
    Multiplicative,
    /// `**`
    Exponent,
}

impl BinaryOp {
    pub(crate) fn precedence(self) -> Precedence {
        match self {
            BinaryOp::Exponent => Precedence::Exponent,
            BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Modulo => Precedence::Multiplicative,
            BinaryOp::Add | BinaryOp::Subtract => Precedence::Additive,
            BinaryOp::LessEqual | BinaryOp::Less | BinaryOp::GreaterEqual | BinaryOp::Greater => {
                Precedence::Comparison
            }
            BinaryOp::Equal | BinaryOp::NotEqual => Precedence::Equality,
            BinaryOp::And => Precedence::And,
            BinaryOp::Or => Precedence::Or,
        }
    }
}

/// Parse a complete expression
///
/// Rejects trailing non-whitespace with a `Syntax error` pointing at the
/// first unconsumed position.
pub fn parse(text: &str) -> ParseResult<Expression> {
    let parser = ExprParser { text };
    let (expr, rest) = parser.parse_binary(text)?;
    if !rest.trim_start().is_empty() {
        return Err(parser.syntax_error(rest));
    }
    Ok(expr)
}

/// Expression parser over a single expression string
///
/// Holds the full text so errors can report columns relative to its start.
struct ExprParser<'a> {
    text: &'a str,
}

impl<'a> ExprParser<'a> {
    /// Byte offset of a remainder slice within the full text
    fn offset_of(&self, rest: &str) -> usize {
        self.text.len() - rest.len()
    }

    /// Syntax error pointing at the first non-whitespace of the remainder
    fn syntax_error(&self, rest: &str) -> ParseError {
        let skipped = rest.len() - rest.trim_start().len();
        ParseError::new(
            ParseErrorKind::Syntax,
            self.text,
            self.offset_of(rest) + skipped + 1,
        )
    }

    /// Unmatched parenthesis error pointing at an opening parenthesis
    ///
    /// `open_end` is the offset just past the `(` within `rest`.
    fn unmatched_parenthesis(&self, rest: &str, open_end: usize) -> ParseError {
        ParseError::new(
            ParseErrorKind::UnmatchedParenthesis,
            self.text,
            self.offset_of(rest) + open_end,
        )
    }

    // ==================== Binary Expressions ====================

    /// Parse a chain of binary operators left to right, re-associating each
    /// new operator by precedence
    fn parse_binary<'t>(&self, text: &'t str) -> ParseResult<(Expression, &'t str)> {
        let (mut left, mut rest) = self.parse_unary(text)?;

        while let Some(caps) = EXPR_BINARY_OP.captures(rest) {
            let op = BinaryOp::from_token(&caps[1]).expect("operator matched by pattern");
            let op_end = caps.get(0).expect("whole match").end();
            let (right, next) = self.parse_unary(&rest[op_end..])?;
            left = combine_binary(op, left, right);
            rest = next;
        }

        Ok((left, rest))
    }

    // ==================== Unary Expressions ====================

    /// Parse a unary-level expression
    ///
    /// Alternatives, in order: group, number, prefix unary, call, strings,
    /// identifier, bracketed identifier. Number comes before unary so a
    /// leading sign followed by a digit belongs to the literal: `-3` is the
    /// number -3 while `-x` is a negated variable.
    fn parse_unary<'t>(&self, text: &'t str) -> ParseResult<(Expression, &'t str)> {
        // Group
        if let Some(open) = EXPR_GROUP_OPEN.find(text) {
            let (expr, rest) = self.parse_binary(&text[open.end()..])?;
            let Some(close) = EXPR_GROUP_CLOSE.find(rest) else {
                return Err(self.unmatched_parenthesis(text, open.end()));
            };
            return Ok((Expression::group(expr), &rest[close.end()..]));
        }

        // Number
        if let Some(caps) = EXPR_NUMBER.captures(text) {
            let token = caps.get(1).expect("number group");
            let value: f64 = match token.as_str().parse() {
                Ok(value) => value,
                Err(_) => return Err(self.syntax_error(text)),
            };
            let end = caps.get(0).expect("whole match").end();
            return Ok((Expression::number(value), &text[end..]));
        }

        // Prefix unary
        if let Some(caps) = EXPR_UNARY_OP.captures(text) {
            let op = match &caps[1] {
                "!" => UnaryOp::Not,
                _ => UnaryOp::Negate,
            };
            let end = caps.get(0).expect("whole match").end();
            let (expr, rest) = self.parse_unary(&text[end..])?;
            return Ok((Expression::unary(op, expr), rest));
        }

        // Call
        if let Some(caps) = EXPR_FUNCTION_OPEN.captures(text) {
            let name = caps[1].to_string();
            let open_end = caps.get(0).expect("whole match").end();
            return self.parse_call_args(text, name, open_end);
        }

        // String
        if let Some(caps) = EXPR_STRING.captures(text) {
            let value = EXPR_STRING_UNESCAPE.replace_all(&caps[1], "$1").into_owned();
            let end = caps.get(0).expect("whole match").end();
            return Ok((Expression::String(value), &text[end..]));
        }
        if let Some(caps) = EXPR_STRING_DOUBLE.captures(text) {
            let value = EXPR_STRING_DOUBLE_UNESCAPE
                .replace_all(&caps[1], "$1")
                .into_owned();
            let end = caps.get(0).expect("whole match").end();
            return Ok((Expression::String(value), &text[end..]));
        }

        // Identifier
        if let Some(caps) = EXPR_IDENTIFIER.captures(text) {
            let end = caps.get(0).expect("whole match").end();
            return Ok((Expression::variable(caps[1].to_string()), &text[end..]));
        }

        // Bracketed identifier
        if let Some(caps) = EXPR_IDENTIFIER_EX.captures(text) {
            let name = EXPR_IDENTIFIER_EX_UNESCAPE
                .replace_all(&caps[1], "$1")
                .into_owned();
            let end = caps.get(0).expect("whole match").end();
            return Ok((Expression::variable(name), &text[end..]));
        }

        Err(self.syntax_error(text))
    }

    /// Parse a call's argument list after the opening parenthesis
    fn parse_call_args<'t>(
        &self,
        text: &'t str,
        name: String,
        open_end: usize,
    ) -> ParseResult<(Expression, &'t str)> {
        let mut rest = &text[open_end..];
        let mut args = Vec::new();

        if let Some(close) = EXPR_FUNCTION_CLOSE.find(rest) {
            return Ok((Expression::call(name, args), &rest[close.end()..]));
        }

        loop {
            let (arg, next) = self.parse_binary(rest)?;
            args.push(arg);
            rest = next;

            if let Some(separator) = EXPR_FUNCTION_SEPARATOR.find(rest) {
                rest = &rest[separator.end()..];
                continue;
            }
            let Some(close) = EXPR_FUNCTION_CLOSE.find(rest) else {
                return Err(self.unmatched_parenthesis(text, open_end));
            };
            return Ok((Expression::call(name, args), &rest[close.end()..]));
        }
    }
}

/// Combine a new `(op, right)` with a previously built left tree
///
/// Descends the left tree's right spine while the visited operator ranks
/// strictly lower than `op`, inserting the new node at the insertion point;
/// same-rank operators stay at the top, which keeps them left-associative.
fn combine_binary(op: BinaryOp, left: Expression, right: Expression) -> Expression {
    match left {
        Expression::Binary(node) if node.op.precedence() < op.precedence() => {
            let BinaryExpression {
                op: left_op,
                left: left_left,
                right: spine,
            } = *node;
            Expression::binary(left_op, left_left, combine_binary(op, spine, right))
        }
        left => Expression::binary(op, left, right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_order() {
        assert!(BinaryOp::Or.precedence() < BinaryOp::And.precedence());
        assert!(BinaryOp::And.precedence() < BinaryOp::Equal.precedence());
        assert!(BinaryOp::NotEqual.precedence() < BinaryOp::Less.precedence());
        assert!(BinaryOp::Greater.precedence() < BinaryOp::Add.precedence());
        assert!(BinaryOp::Subtract.precedence() < BinaryOp::Multiply.precedence());
        assert!(BinaryOp::Modulo.precedence() < BinaryOp::Exponent.precedence());
    }

    #[test]
    fn test_same_rank_stays_left() {
        assert_eq!(BinaryOp::Add.precedence(), BinaryOp::Subtract.precedence());

        // a - b + c keeps the subtraction on the left
        let expr = parse("a - b + c").unwrap();
        assert_eq!(
            expr,
            Expression::binary(
                BinaryOp::Add,
                Expression::binary(
                    BinaryOp::Subtract,
                    Expression::variable("a"),
                    Expression::variable("b")
                ),
                Expression::variable("c")
            )
        );
    }

    #[test]
    fn test_reassociation_descends_right_spine() {
        // 1 + 2 * 3 ** 4: each tighter operator lands deeper on the right
        let expr = parse("1 + 2 * 3 ** 4").unwrap();
        assert_eq!(
            expr,
            Expression::binary(
                BinaryOp::Add,
                Expression::number(1.0),
                Expression::binary(
                    BinaryOp::Multiply,
                    Expression::number(2.0),
                    Expression::binary(
                        BinaryOp::Exponent,
                        Expression::number(3.0),
                        Expression::number(4.0)
                    )
                )
            )
        );
    }
}
