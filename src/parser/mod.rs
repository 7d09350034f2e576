//! Statement parser
//!
//! Splits input into logical lines (joining `\` continuations), dispatches
//! each effective line against an ordered set of line patterns, and lowers
//! block constructs into flat label/jump sequences as it goes.
//!
//! Dispatch tests the patterns in a fixed order; the first match wins:
//! comment, assignment, function begin/end, if/else-if/else/endif,
//! while/endwhile, foreach/endforeach, break, continue, label, jump,
//! return, include, and finally the bare-expression fallthrough.

pub(crate) mod blocks;
pub(crate) mod expressions;
mod patterns;

use crate::error::{ParseError, ParseErrorKind, ParseResult};
use crate::model::{
    ExprStatement, Expression, FunctionStatement, JumpStatement, ReturnStatement, Script,
    Statement,
};

use blocks::BlockContext;

/// Parse script source into a [`Script`]
///
/// `parts` are concatenated logically: each part is split on `\r?\n` and the
/// resulting lines are processed as one sequence. `start_line_number`
/// (normally 1) is added to zero-based line indices in error reports.
pub fn parse_script_parts<I, S>(parts: I, start_line_number: usize) -> ParseResult<Script>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parts: Vec<S> = parts.into_iter().collect();
    let mut lines: Vec<&str> = Vec::new();
    for part in &parts {
        lines.extend(patterns::LINE_SPLIT.split(part.as_ref()));
    }

    let mut parser = Parser::new(start_line_number);
    parser.parse_lines(&lines)?;
    parser.finish()
}

/// Parse a standalone expression
///
/// Rejects trailing non-whitespace.
pub fn parse_expression(text: &str) -> ParseResult<Expression> {
    expressions::parse(text)
}

/// Script statement parser
///
/// All state is local to one invocation: the statement sink, the open
/// function definition, the block stack, and the synthetic label counter.
#[derive(Debug)]
pub(crate) struct Parser {
    start_line_number: usize,
    script: Script,
    function_def: Option<FunctionDef>,
    blocks: Vec<BlockContext>,
    label_index: usize,
}

/// An open function definition
///
/// While one is open, parsed statements append to its body instead of the
/// script's top level.
#[derive(Debug)]
struct FunctionDef {
    name: String,
    args: Vec<String>,
    is_async: bool,
    statements: Vec<Statement>,
    /// Block stack depth at the definition's opening line; blocks opened
    /// inside the body must close before `endfunction`
    block_depth: usize,
    line: String,
    line_index: usize,
}

impl Parser {
    fn new(start_line_number: usize) -> Self {
        Self {
            start_line_number,
            script: Script::default(),
            function_def: None,
            blocks: Vec::new(),
            label_index: 0,
        }
    }

    // ==================== Line Assembly ====================

    /// Process physical lines, joining continuation chains into effective
    /// lines
    ///
    /// A continued statement reports the index of its first physical line.
    /// A chain left open at end of input never terminates and is never
    /// dispatched.
    fn parse_lines(&mut self, lines: &[&str]) -> ParseResult<()> {
        let mut fragments: Vec<String> = Vec::new();
        let mut start_index = 0;

        for (index, line) in lines.iter().enumerate() {
            if let Some(continuation) = patterns::CONTINUATION.find(line) {
                let fragment = &line[..continuation.start()];
                if fragments.is_empty() {
                    start_index = index;
                    fragments.push(fragment.trim_end().to_string());
                } else {
                    fragments.push(fragment.trim().to_string());
                }
                continue;
            }

            if fragments.is_empty() {
                self.parse_line(line, index)?;
            } else {
                fragments.push(line.trim().to_string());
                let joined = fragments.join(" ");
                fragments.clear();
                self.parse_line(&joined, start_index)?;
            }
        }

        Ok(())
    }

    /// End-of-input checks and handoff of the parsed script
    fn finish(self) -> ParseResult<Script> {
        if let Some(context) = self.blocks.last() {
            return Err(self.missing_block_end(context));
        }
        if let Some(function_def) = &self.function_def {
            return Err(ParseError::new(
                ParseErrorKind::MissingBlockEnd { kind: "function" },
                &function_def.line,
                1,
            )
            .with_line_number(self.line_number(function_def.line_index)));
        }
        Ok(self.script)
    }

    // ==================== Line Dispatch ====================

    /// Dispatch one effective line against the line patterns in order
    fn parse_line(&mut self, line: &str, line_index: usize) -> ParseResult<()> {
        // Comment / blank
        if patterns::COMMENT.is_match(line) {
            return Ok(());
        }

        // Assignment
        if let Some(caps) = patterns::ASSIGNMENT.captures(line) {
            let expr_text = caps.get(2).expect("expression group");
            let expr = self.parse_expression_in_line(line, line_index, expr_text.start())?;
            self.emit(Statement::Expr(ExprStatement {
                name: Some(caps[1].to_string()),
                expr,
            }));
            return Ok(());
        }

        // Function begin
        if let Some(caps) = patterns::FUNCTION_BEGIN.captures(line) {
            if self.function_def.is_some() {
                return Err(self.error(ParseErrorKind::NestedFunction, line, line_index));
            }
            let args = caps
                .get(3)
                .map(|args| {
                    patterns::FUNCTION_ARG_SPLIT
                        .split(args.as_str())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            self.function_def = Some(FunctionDef {
                name: caps[2].to_string(),
                args,
                is_async: caps.get(1).is_some(),
                statements: Vec::new(),
                block_depth: self.blocks.len(),
                line: line.to_string(),
                line_index,
            });
            return Ok(());
        }

        // Function end
        if patterns::FUNCTION_END.is_match(line) {
            let Some(function_def) = self.function_def.take() else {
                return Err(self.error(ParseErrorKind::NoMatchingFunction, line, line_index));
            };
            if self.blocks.len() > function_def.block_depth {
                let context = self.blocks.last().expect("non-empty block stack");
                return Err(self.missing_block_end(context));
            }
            self.script
                .statements
                .push(Statement::Function(FunctionStatement {
                    name: function_def.name,
                    args: function_def.args,
                    statements: function_def.statements,
                    is_async: function_def.is_async,
                }));
            return Ok(());
        }

        // If-then begin
        if let Some(caps) = patterns::IF_BEGIN.captures(line) {
            let expr_text = caps.get(1).expect("condition group");
            let expr = self.parse_expression_in_line(line, line_index, expr_text.start())?;
            self.open_if(expr, line, line_index);
            return Ok(());
        }

        // Else-if-then
        if let Some(caps) = patterns::ELSE_IF.captures(line) {
            let expr_text = caps.get(1).expect("condition group");
            let expr = self.parse_expression_in_line(line, line_index, expr_text.start())?;
            return self.else_if(expr, line, line_index);
        }

        // Else-then
        if patterns::ELSE_THEN.is_match(line) {
            return self.else_then(line, line_index);
        }

        // If-then end
        if patterns::IF_END.is_match(line) {
            return self.close_if(line, line_index);
        }

        // While-do begin
        if let Some(caps) = patterns::WHILE_BEGIN.captures(line) {
            let expr_text = caps.get(1).expect("condition group");
            let expr = self.parse_expression_in_line(line, line_index, expr_text.start())?;
            self.open_while(expr, line, line_index);
            return Ok(());
        }

        // While-do end
        if patterns::WHILE_END.is_match(line) {
            return self.close_while(line, line_index);
        }

        // Foreach begin
        if let Some(caps) = patterns::FOREACH_BEGIN.captures(line) {
            let values_text = caps.get(3).expect("values group");
            let values_expr = self.parse_expression_in_line(line, line_index, values_text.start())?;
            let index_name = caps.get(2).map(|index| index.as_str().to_string());
            self.open_foreach(caps[1].to_string(), index_name, values_expr, line, line_index);
            return Ok(());
        }

        // Foreach end
        if patterns::FOREACH_END.is_match(line) {
            return self.close_foreach(line, line_index);
        }

        // Break
        if patterns::BREAK.is_match(line) {
            return self.parse_break(line, line_index);
        }

        // Continue
        if patterns::CONTINUE.is_match(line) {
            return self.parse_continue(line, line_index);
        }

        // Label
        if let Some(caps) = patterns::LABEL.captures(line) {
            self.emit(Statement::Label(caps[1].to_string()));
            return Ok(());
        }

        // Jump
        if let Some(caps) = patterns::JUMP.captures(line) {
            let expr = match caps.get(1) {
                Some(expr_text) => {
                    Some(self.parse_expression_in_line(line, line_index, expr_text.start())?)
                }
                None => None,
            };
            self.emit(Statement::Jump(JumpStatement {
                label: caps[2].to_string(),
                expr,
            }));
            return Ok(());
        }

        // Return
        if let Some(caps) = patterns::RETURN.captures(line) {
            let expr = match caps.get(1) {
                Some(expr_text) => {
                    Some(self.parse_expression_in_line(line, line_index, expr_text.start())?)
                }
                None => None,
            };
            self.emit(Statement::Return(ReturnStatement { expr }));
            return Ok(());
        }

        // Include
        if let Some(caps) = patterns::INCLUDE.captures(line) {
            let url = patterns::INCLUDE_UNESCAPE
                .replace_all(&caps[1], "$1")
                .into_owned();
            self.emit(Statement::Include(url));
            return Ok(());
        }
        if let Some(caps) = patterns::INCLUDE_DOUBLE.captures(line) {
            let url = patterns::INCLUDE_DOUBLE_UNESCAPE
                .replace_all(&caps[1], "$1")
                .into_owned();
            self.emit(Statement::Include(url));
            return Ok(());
        }

        // Bare expression
        let expr = self.parse_expression_in_line(line, line_index, 0)?;
        self.emit(Statement::Expr(ExprStatement { name: None, expr }));
        Ok(())
    }

    // ==================== Statement Emission ====================

    /// Append a statement to the current sink: the open function body, or
    /// the script's top level
    fn emit(&mut self, statement: Statement) {
        match &mut self.function_def {
            Some(function_def) => function_def.statements.push(statement),
            None => self.script.statements.push(statement),
        }
    }

    /// Number of statements in the current sink
    fn sink_len(&self) -> usize {
        match &self.function_def {
            Some(function_def) => function_def.statements.len(),
            None => self.script.statements.len(),
        }
    }

    /// Whether statements currently append to a function body
    fn in_function(&self) -> bool {
        self.function_def.is_some()
    }

    /// Allocate the next synthetic label counter value
    fn next_label_index(&mut self) -> usize {
        let index = self.label_index;
        self.label_index += 1;
        index
    }

    // ==================== Error Helpers ====================

    fn line_number(&self, line_index: usize) -> usize {
        self.start_line_number + line_index
    }

    /// Statement-structure error at column 1 of the line
    fn error(&self, error: ParseErrorKind, line: &str, line_index: usize) -> ParseError {
        ParseError::new(error, line, 1).with_line_number(self.line_number(line_index))
    }

    /// Error for a block left open, reported at its opening line
    fn missing_block_end(&self, context: &BlockContext) -> ParseError {
        ParseError::new(
            ParseErrorKind::MissingBlockEnd {
                kind: context.kind(),
            },
            context.line(),
            1,
        )
        .with_line_number(self.line_number(context.line_index()))
    }

    /// Parse an expression embedded in a line at the given byte offset
    ///
    /// Expression errors are rethrown with the column re-based so the caret
    /// points into the source line rather than the expression substring.
    fn parse_expression_in_line(
        &self,
        line: &str,
        line_index: usize,
        offset: usize,
    ) -> ParseResult<Expression> {
        expressions::parse(&line[offset..]).map_err(|error| {
            ParseError::new(error.error, line, offset + error.column_number)
                .with_line_number(self.line_number(line_index))
        })
    }
}
