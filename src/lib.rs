//! linescript_parser
//!
//! Parser for LineScript, a small line-oriented embedded scripting language.
//! Each non-continued source line maps to at most one statement, and block
//! constructs (function, if/else, while, foreach) are compiled by the parser
//! itself into a flat sequence of labeled jumps, so parsing doubles as a
//! lowering pass.
//!
//! The parser produces a serializable model tree of statements and
//! expressions for downstream execution or serialization. It performs no
//! evaluation, no include resolution, and no semantic checks on identifier
//! scopes.
//!
//! # Example
//!
//! ```
//! use linescript_parser::{parse_script, Statement};
//!
//! let script = parse_script("x = 1 + 2 * 3").unwrap();
//!
//! assert_eq!(script.statements.len(), 1);
//! assert!(matches!(&script.statements[0], Statement::Expr(_)));
//! ```

pub mod error;
pub mod model;
pub mod parser;

// Re-exports
pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use model::{
    BinaryExpression, BinaryOp, ExprStatement, Expression, FunctionExpression,
    FunctionStatement, JumpStatement, ReturnStatement, Script, Statement, UnaryExpression,
    UnaryOp,
};

/// Parse script source into a [`Script`]
///
/// Line numbers in error reports start at 1.
///
/// # Example
///
/// ```
/// use linescript_parser::parse_script;
///
/// let script = parse_script("greeting = 'hello'").unwrap();
/// assert_eq!(script.statements.len(), 1);
/// ```
pub fn parse_script(source: &str) -> ParseResult<Script> {
    parser::parse_script_parts([source], 1)
}

/// Parse script source given as an ordered sequence of parts
///
/// Parts are concatenated logically; line indices run across all parts and
/// `start_line_number` is added to them in error reports.
pub fn parse_script_parts<I, S>(parts: I, start_line_number: usize) -> ParseResult<Script>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parser::parse_script_parts(parts, start_line_number)
}

/// Parse a standalone expression
///
/// Any trailing non-whitespace raises a `Syntax error` at the first
/// unconsumed position.
///
/// # Example
///
/// ```
/// use linescript_parser::{parse_expression, Expression};
///
/// let expr = parse_expression("min(width, 100)").unwrap();
/// assert!(matches!(expr, Expression::Function(_)));
/// ```
pub fn parse_expression(text: &str) -> ParseResult<Expression> {
    parser::parse_expression(text)
}

/// Get version information
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        let script = parse_script("").unwrap();
        assert!(script.statements.is_empty());
    }

    #[test]
    fn test_parse_comments_only() {
        let script = parse_script("# just a comment\n\n   # another\n").unwrap();
        assert!(script.statements.is_empty());
    }

    #[test]
    fn test_parse_expression_trailing() {
        let err = parse_expression("1 + 2 asdf").unwrap_err();
        assert_eq!(err.error, ParseErrorKind::Syntax);
        assert_eq!(err.column_number, 7);
    }

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
