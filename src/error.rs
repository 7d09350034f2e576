//! Parse error types

use std::fmt;

use thiserror::Error;

/// Maximum rendered width of the offending line before windowing
const LINE_LENGTH_MAX: usize = 120;

/// Parse error descriptions
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Function definition inside another function definition
    #[error("Nested function definition")]
    NestedFunction,

    /// `endfunction` with no function definition open
    #[error("No matching function definition")]
    NoMatchingFunction,

    /// `else if`, `else`, or `endif` with no if-then block open
    #[error("No matching if-then statement")]
    NoMatchingIf,

    /// `endwhile` with no while-do block open
    #[error("No matching while-do statement")]
    NoMatchingWhile,

    /// `endforeach` with no foreach block open
    #[error("No matching foreach statement")]
    NoMatchingForeach,

    /// `else if` after the block's `else then`
    #[error("Else-if-then statement following else-then statement")]
    ElseIfAfterElse,

    /// Second `else then` in one if-then block
    #[error("Multiple else-then statements")]
    MultipleElse,

    /// `break` with no enclosing loop
    #[error("Break statement outside of loop")]
    BreakOutsideLoop,

    /// `continue` with no enclosing loop
    #[error("Continue statement outside of loop")]
    ContinueOutsideLoop,

    /// Block or function definition left open at end of input
    #[error("Missing end{kind} statement")]
    MissingBlockEnd { kind: &'static str },

    /// Group or call expression missing its closing parenthesis
    #[error("Unmatched parenthesis")]
    UnmatchedParenthesis,

    /// Unparseable expression text
    #[error("Syntax error")]
    Syntax,
}

/// A parse failure
///
/// Carries the description, the offending line text as entered (untrimmed),
/// the 1-based column, and optionally the line number and a message prefix
/// line. `Display` renders the caret display; the stored `line` and
/// `column_number` are always the originals, not the windowed rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Error description
    pub error: ParseErrorKind,
    /// Offending line text
    pub line: String,
    /// Column of the offending position, 1-based
    pub column_number: usize,
    /// Line number of the offending line, when known
    pub line_number: Option<usize>,
    /// Message prefix line, when any
    pub prefix: Option<String>,
}

impl ParseError {
    /// Create a parse error at a column of a line
    pub fn new(error: ParseErrorKind, line: impl Into<String>, column_number: usize) -> Self {
        Self {
            error,
            line: line.into(),
            column_number,
            line_number: None,
            prefix: None,
        }
    }

    /// Set the line number
    pub fn with_line_number(mut self, line_number: usize) -> Self {
        self.line_number = Some(line_number);
        self
    }

    /// Set the message prefix line
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// The offending line windowed to the rendered width, with the caret
    /// column adjusted into the window
    fn line_view(&self) -> (String, usize) {
        let chars: Vec<char> = self.line.chars().collect();
        let column = self.column_number.max(1);
        if chars.len() <= LINE_LENGTH_MAX {
            return (self.line.clone(), column);
        }

        // Window the line on the caret column
        let left = column as isize - 1 - (LINE_LENGTH_MAX / 2) as isize;
        let right = left + LINE_LENGTH_MAX as isize;
        if left < 0 {
            let view: String = chars[..LINE_LENGTH_MAX].iter().collect();
            (format!("{view} ..."), column)
        } else if right > chars.len() as isize {
            let start = chars.len() - LINE_LENGTH_MAX;
            let view: String = chars[start..].iter().collect();
            (format!("... {view}"), column - start + 4)
        } else {
            let view: String = chars[left as usize..right as usize].iter().collect();
            (format!("... {view} ..."), column - left as usize + 4)
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line_view, caret_column) = self.line_view();
        if let Some(prefix) = &self.prefix {
            writeln!(f, "{prefix}")?;
        }
        match self.line_number {
            Some(line_number) => writeln!(f, "{}, line number {}:", self.error, line_number)?,
            None => writeln!(f, "{}:", self.error)?,
        }
        writeln!(f, "{line_view}")?;
        write!(f, "{}^", " ".repeat(caret_column - 1))
    }
}

impl std::error::Error for ParseError {}

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic() {
        let err = ParseError::new(ParseErrorKind::Syntax, "x = 1 + * 2", 9);
        assert_eq!(
            err.to_string(),
            "Syntax error:\nx = 1 + * 2\n        ^"
        );
    }

    #[test]
    fn test_render_line_number() {
        let err = ParseError::new(
            ParseErrorKind::MissingBlockEnd { kind: "while" },
            "while true do",
            1,
        )
        .with_line_number(3);
        assert_eq!(
            err.to_string(),
            "Missing endwhile statement, line number 3:\nwhile true do\n^"
        );
    }

    #[test]
    fn test_render_prefix() {
        let err = ParseError::new(ParseErrorKind::Syntax, "bad", 1)
            .with_prefix("Included from 'lib.ls'");
        assert_eq!(
            err.to_string(),
            "Included from 'lib.ls'\nSyntax error:\nbad\n^"
        );
    }

    #[test]
    fn test_render_truncated_left_window() {
        let line: String = "x".repeat(200);
        let err = ParseError::new(ParseErrorKind::Syntax, line.clone(), 10);
        let rendered = err.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[1], format!("{} ...", &line[..120]));
        assert_eq!(lines[2], format!("{}^", " ".repeat(9)));
        // The stored values are untouched
        assert_eq!(err.line.len(), 200);
        assert_eq!(err.column_number, 10);
    }

    #[test]
    fn test_render_truncated_right_window() {
        let line: String = "y".repeat(200);
        let err = ParseError::new(ParseErrorKind::Syntax, line.clone(), 195);
        let rendered = err.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[1], format!("... {}", &line[80..]));
        // 195 - 80 + 4 = 119
        assert_eq!(lines[2], format!("{}^", " ".repeat(118)));
    }

    #[test]
    fn test_render_truncated_both_windows() {
        let line: String = "z".repeat(300);
        let err = ParseError::new(ParseErrorKind::Syntax, line.clone(), 150);
        let rendered = err.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        // Window centered on the caret: columns 90..=209
        assert_eq!(lines[1], format!("... {} ...", &line[89..209]));
        // 150 - 89 + 4 = 65
        assert_eq!(lines[2], format!("{}^", " ".repeat(64)));
    }

    #[test]
    fn test_kind_descriptions() {
        assert_eq!(
            ParseErrorKind::NestedFunction.to_string(),
            "Nested function definition"
        );
        assert_eq!(
            ParseErrorKind::ElseIfAfterElse.to_string(),
            "Else-if-then statement following else-then statement"
        );
        assert_eq!(
            ParseErrorKind::MissingBlockEnd { kind: "foreach" }.to_string(),
            "Missing endforeach statement"
        );
    }
}
