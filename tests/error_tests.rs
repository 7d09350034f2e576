//! Parse error rendering tests

use linescript_parser::{parse_script, ParseError, ParseErrorKind};
use pretty_assertions::assert_eq;

#[test]
fn test_dangling_block_rendering() {
    let err = parse_script("while true do").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Missing endwhile statement, line number 1:\nwhile true do\n^"
    );
}

#[test]
fn test_expression_error_rendering() {
    let err = parse_script("x = 1 + * 2").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Syntax error, line number 1:\nx = 1 + * 2\n        ^"
    );
}

#[test]
fn test_caret_follows_indentation() {
    let err = parse_script("y = 1\n    x = (2\n").unwrap_err();
    assert_eq!(err.error, ParseErrorKind::UnmatchedParenthesis);
    assert_eq!(
        err.to_string(),
        "Unmatched parenthesis, line number 2:\n    x = (2\n        ^"
    );
}

#[test]
fn test_long_line_is_windowed() {
    // A long argument list pushes the offending column past the window
    let args: Vec<String> = (0..40).map(|i| format!("arg{i}")).collect();
    let line = format!("x = f({}, *)", args.join(", "));
    let err = parse_script(&line).unwrap_err();
    assert_eq!(err.error, ParseErrorKind::Syntax);
    assert_eq!(err.line, line);

    let rendered = err.to_string();
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("... "), "unwindowed: {rendered}");
    // The caret lands on the offending `*` within the window
    let caret = lines[2].len();
    assert_eq!(&lines[1][caret - 1..caret], "*");
}

#[test]
fn test_stored_fields_are_originals() {
    let line = format!("x = {}", "9".repeat(300));
    let err = parse_script(&format!("{line} oops")).unwrap_err();
    // The stored line and column are untruncated even though the rendering
    // is windowed
    assert_eq!(err.line, format!("{line} oops"));
    assert_eq!(err.column_number, line.len() + 2);
}

#[test]
fn test_prefix_line() {
    let err = ParseError::new(ParseErrorKind::Syntax, "jump !", 6)
        .with_line_number(12)
        .with_prefix("Included from 'main.ls'");
    assert_eq!(
        err.to_string(),
        "Included from 'main.ls'\nSyntax error, line number 12:\njump !\n     ^"
    );
}
