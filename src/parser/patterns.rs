//! Compiled line and expression token patterns
//!
//! Statement dispatch tests the line patterns in the order they appear here;
//! first match wins. Expression token patterns each consume leading
//! whitespace with `\s*`.

use once_cell::sync::Lazy;
use regex::Regex;

// ==================== Line Structure ====================

/// Physical line separator
pub(crate) static LINE_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n").unwrap());

/// Trailing continuation marker: `\` plus optional whitespace
pub(crate) static CONTINUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\\s*$").unwrap());

// ==================== Line Patterns ====================

/// Comment or blank line
pub(crate) static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(?:#.*)?$").unwrap());

/// `name = expr`
pub(crate) static ASSIGNMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.*)$").unwrap());

/// `[async] function name(arg, ...)`
pub(crate) static FUNCTION_BEGIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(async\s+)?function\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(\s*([A-Za-z_][A-Za-z0-9_]*(?:\s*,\s*[A-Za-z_][A-Za-z0-9_]*)*)?\s*\)\s*$",
    )
    .unwrap()
});

/// Argument separator inside a function definition's parentheses
pub(crate) static FUNCTION_ARG_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*,\s*").unwrap());

/// `endfunction`
pub(crate) static FUNCTION_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*endfunction\s*$").unwrap());

/// `if expr then`
pub(crate) static IF_BEGIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*if\s+(.*?)\s+then\s*$").unwrap());

/// `else if expr then`
pub(crate) static ELSE_IF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*else\s+if\s+(.*?)\s+then\s*$").unwrap());

/// `else then`
pub(crate) static ELSE_THEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*else\s+then\s*$").unwrap());

/// `endif`
pub(crate) static IF_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*endif\s*$").unwrap());

/// `while expr do`
pub(crate) static WHILE_BEGIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*while\s+(.*?)\s+do\s*$").unwrap());

/// `endwhile`
pub(crate) static WHILE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*endwhile\s*$").unwrap());

/// `foreach value[, index] in values do`
pub(crate) static FOREACH_BEGIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*foreach\s+([A-Za-z_][A-Za-z0-9_]*)(?:\s*,\s*([A-Za-z_][A-Za-z0-9_]*))?\s+in\s+(.*?)\s+do\s*$",
    )
    .unwrap()
});

/// `endforeach`
pub(crate) static FOREACH_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*endforeach\s*$").unwrap());

/// `break`
pub(crate) static BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*break\s*$").unwrap());

/// `continue`
pub(crate) static CONTINUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*continue\s*$").unwrap());

/// `name:`
pub(crate) static LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*:\s*$").unwrap());

/// `jump name` or `jumpif (expr) name`
pub(crate) static JUMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*jump(?:if\s*\((.*)\))?\s+([A-Za-z_][A-Za-z0-9_]*)\s*$").unwrap());

/// `return [expr]`
pub(crate) static RETURN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*return(?:\s+(.+?))?\s*$").unwrap());

/// `include 'url'` with `\'` and `\\` escapes
pub(crate) static INCLUDE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*include\s+'((?:\\'|[^'])*)'").unwrap());

/// Unescape for single-quoted include URLs
pub(crate) static INCLUDE_UNESCAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\([\\'])").unwrap());

/// `include "url"` with `\"` and `\\` escapes
pub(crate) static INCLUDE_DOUBLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*include\s+"((?:\\"|[^"])*)""#).unwrap());

/// Unescape for double-quoted include URLs
pub(crate) static INCLUDE_DOUBLE_UNESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\\([\\"])"#).unwrap());

// ==================== Expression Tokens ====================

/// Binary operators, longest alternatives first
pub(crate) static EXPR_BINARY_OP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\*\*|\*|/|%|\+|-|<=|<|>=|>|==|!=|&&|\|\|)").unwrap()
});

/// Prefix unary operators
pub(crate) static EXPR_UNARY_OP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(!|-)").unwrap());

/// Group open parenthesis
pub(crate) static EXPR_GROUP_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\(").unwrap());

/// Group close parenthesis
pub(crate) static EXPR_GROUP_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\)").unwrap());

/// Call open: identifier directly followed by `(`
pub(crate) static EXPR_FUNCTION_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap());

/// Call argument separator
pub(crate) static EXPR_FUNCTION_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*,").unwrap());

/// Call close parenthesis
pub(crate) static EXPR_FUNCTION_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\)").unwrap());

/// Signed decimal number with optional fraction and signed exponent
pub(crate) static EXPR_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([+-]?\d+(?:\.\d*)?(?:e[+-]\d+)?)").unwrap());

/// Single-quoted string with `\'` and `\\` escapes
pub(crate) static EXPR_STRING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*'((?:\\'|[^'])*)'").unwrap());

/// Unescape for single-quoted strings
pub(crate) static EXPR_STRING_UNESCAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\([\\'])").unwrap());

/// Double-quoted string with `\"` and `\\` escapes
pub(crate) static EXPR_STRING_DOUBLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*"((?:\\"|[^"])*)""#).unwrap());

/// Unescape for double-quoted strings
pub(crate) static EXPR_STRING_DOUBLE_UNESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\\([\\"])"#).unwrap());

/// Plain identifier
pub(crate) static EXPR_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)").unwrap());

/// Bracketed identifier: any characters except `]`, with `\]` and `\\`
/// escapes; surrounding whitespace inside the brackets is stripped
pub(crate) static EXPR_IDENTIFIER_EX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\[\s*((?:\\\]|[^\]])*?)\s*\]").unwrap());

/// Unescape for bracketed identifiers
pub(crate) static EXPR_IDENTIFIER_EX_UNESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\([\\\]])").unwrap());
