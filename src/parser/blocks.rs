//! Block contexts and block-to-jump lowering
//!
//! Each open `if`/`while`/`foreach` pushes a context holding the labels and
//! metadata its closing line needs. Opening a block emits its header
//! statements, closing it pops the context and emits the footer; the result
//! is a flat sequence of labels and jumps.

use crate::error::{ParseErrorKind, ParseResult};
use crate::model::{
    BinaryOp, Expression, ExprStatement, JumpStatement, Statement, UnaryOp,
};

use super::Parser;

/// An open block on the block stack
#[derive(Debug)]
pub(crate) enum BlockContext {
    If(IfContext),
    While(WhileContext),
    Foreach(ForeachContext),
}

/// Open if-then block
#[derive(Debug)]
pub(crate) struct IfContext {
    /// Position of the last emitted conditional jump, for retargeting at
    /// `endif`
    jump_index: usize,
    /// Whether that jump was emitted into a function body
    in_function: bool,
    /// Label of the last emitted conditional jump
    jump_label: String,
    done_label: String,
    has_else: bool,
    line: String,
    line_index: usize,
}

/// Open while-do block
#[derive(Debug)]
pub(crate) struct WhileContext {
    loop_label: String,
    done_label: String,
    /// Loop condition, re-emitted as the backward jump's condition
    expr: Expression,
    line: String,
    line_index: usize,
}

/// Open foreach block
#[derive(Debug)]
pub(crate) struct ForeachContext {
    loop_label: String,
    continue_label: String,
    done_label: String,
    index_var: String,
    length_var: String,
    /// Set when a `continue` statement targets this block
    has_continue: bool,
    line: String,
    line_index: usize,
}

impl BlockContext {
    /// Block kind as it appears in `end<kind>`
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            BlockContext::If(_) => "if",
            BlockContext::While(_) => "while",
            BlockContext::Foreach(_) => "foreach",
        }
    }

    /// The block's opening line text
    pub(crate) fn line(&self) -> &str {
        match self {
            BlockContext::If(context) => &context.line,
            BlockContext::While(context) => &context.line,
            BlockContext::Foreach(context) => &context.line,
        }
    }

    /// The block's opening line index
    pub(crate) fn line_index(&self) -> usize {
        match self {
            BlockContext::If(context) => context.line_index,
            BlockContext::While(context) => context.line_index,
            BlockContext::Foreach(context) => context.line_index,
        }
    }
}

impl Parser {
    // ==================== If-Then Blocks ====================

    /// Open an if-then block: emit the guard jump and push the context
    pub(crate) fn open_if(&mut self, expr: Expression, line: &str, line_index: usize) {
        let n = self.next_label_index();
        let if_label = format!("__scriptIf{n}");
        let done_label = format!("__scriptDone{n}");

        self.emit(Statement::Jump(JumpStatement {
            label: if_label.clone(),
            expr: Some(Expression::unary(UnaryOp::Not, expr)),
        }));
        self.blocks.push(BlockContext::If(IfContext {
            jump_index: self.sink_len() - 1,
            in_function: self.in_function(),
            jump_label: if_label,
            done_label,
            has_else: false,
            line: line.to_string(),
            line_index,
        }));
    }

    /// Handle `else if expr then`: close the previous arm and open the next
    pub(crate) fn else_if(
        &mut self,
        expr: Expression,
        line: &str,
        line_index: usize,
    ) -> ParseResult<()> {
        let mut context = self.pop_if_context(line, line_index)?;
        if context.has_else {
            return Err(self.error(ParseErrorKind::ElseIfAfterElse, line, line_index));
        }

        let n = self.next_label_index();
        let next_label = format!("__scriptIf{n}");

        self.emit(Statement::Jump(JumpStatement {
            label: context.done_label.clone(),
            expr: None,
        }));
        self.emit(Statement::Label(context.jump_label.clone()));
        self.emit(Statement::Jump(JumpStatement {
            label: next_label.clone(),
            expr: Some(Expression::unary(UnaryOp::Not, expr)),
        }));

        context.jump_index = self.sink_len() - 1;
        context.in_function = self.in_function();
        context.jump_label = next_label;
        self.blocks.push(BlockContext::If(context));
        Ok(())
    }

    /// Handle `else then`: close the previous arm and flag the context
    pub(crate) fn else_then(&mut self, line: &str, line_index: usize) -> ParseResult<()> {
        let mut context = self.pop_if_context(line, line_index)?;
        if context.has_else {
            return Err(self.error(ParseErrorKind::MultipleElse, line, line_index));
        }
        context.has_else = true;

        self.emit(Statement::Jump(JumpStatement {
            label: context.done_label.clone(),
            expr: None,
        }));
        self.emit(Statement::Label(context.jump_label.clone()));

        self.blocks.push(BlockContext::If(context));
        Ok(())
    }

    /// Close an if-then block
    ///
    /// With no else arm the last arm's guard jump has nowhere to land yet;
    /// it is retargeted in place to the done label.
    pub(crate) fn close_if(&mut self, line: &str, line_index: usize) -> ParseResult<()> {
        let context = self.pop_if_context(line, line_index)?;

        if !context.has_else {
            let sink = if context.in_function {
                self.function_def
                    .as_mut()
                    .map(|function_def| &mut function_def.statements)
            } else {
                Some(&mut self.script.statements)
            };
            if let Some(Statement::Jump(jump)) =
                sink.and_then(|statements| statements.get_mut(context.jump_index))
            {
                jump.label.clone_from(&context.done_label);
            }
        }

        self.emit(Statement::Label(context.done_label));
        Ok(())
    }

    // ==================== While-Do Blocks ====================

    /// Open a while-do block: emit the guard jump and the loop label
    pub(crate) fn open_while(&mut self, expr: Expression, line: &str, line_index: usize) {
        let n = self.next_label_index();
        let loop_label = format!("__scriptLoop{n}");
        let done_label = format!("__scriptDone{n}");

        self.emit(Statement::Jump(JumpStatement {
            label: done_label.clone(),
            expr: Some(Expression::unary(UnaryOp::Not, expr.clone())),
        }));
        self.emit(Statement::Label(loop_label.clone()));

        self.blocks.push(BlockContext::While(WhileContext {
            loop_label,
            done_label,
            expr,
            line: line.to_string(),
            line_index,
        }));
    }

    /// Close a while-do block: re-test the condition and jump back
    pub(crate) fn close_while(&mut self, line: &str, line_index: usize) -> ParseResult<()> {
        let context = match self.blocks.pop() {
            Some(BlockContext::While(context)) => context,
            _ => return Err(self.error(ParseErrorKind::NoMatchingWhile, line, line_index)),
        };

        self.emit(Statement::Jump(JumpStatement {
            label: context.loop_label,
            expr: Some(context.expr),
        }));
        self.emit(Statement::Label(context.done_label));
        Ok(())
    }

    // ==================== Foreach Blocks ====================

    /// Open a foreach block
    ///
    /// The values expression is captured into a synthetic variable along
    /// with its length; the loop body sees the current element assigned to
    /// `value_name` each iteration.
    pub(crate) fn open_foreach(
        &mut self,
        value_name: String,
        index_name: Option<String>,
        values_expr: Expression,
        line: &str,
        line_index: usize,
    ) {
        let n = self.next_label_index();
        let loop_label = format!("__scriptLoop{n}");
        let continue_label = format!("__scriptContinue{n}");
        let done_label = format!("__scriptDone{n}");
        let values_var = format!("__scriptValues{n}");
        let length_var = format!("__scriptLength{n}");
        let index_var = index_name.unwrap_or_else(|| format!("__scriptIndex{n}"));

        self.emit(Statement::Expr(ExprStatement {
            name: Some(values_var.clone()),
            expr: values_expr,
        }));
        self.emit(Statement::Expr(ExprStatement {
            name: Some(length_var.clone()),
            expr: Expression::call("arrayLength", vec![Expression::variable(values_var.clone())]),
        }));
        self.emit(Statement::Jump(JumpStatement {
            label: done_label.clone(),
            expr: Some(Expression::unary(
                UnaryOp::Not,
                Expression::variable(length_var.clone()),
            )),
        }));
        self.emit(Statement::Expr(ExprStatement {
            name: Some(index_var.clone()),
            expr: Expression::number(0.0),
        }));
        self.emit(Statement::Label(loop_label.clone()));
        self.emit(Statement::Expr(ExprStatement {
            name: Some(value_name),
            expr: Expression::call(
                "arrayGet",
                vec![
                    Expression::variable(values_var),
                    Expression::variable(index_var.clone()),
                ],
            ),
        }));

        self.blocks.push(BlockContext::Foreach(ForeachContext {
            loop_label,
            continue_label,
            done_label,
            index_var,
            length_var,
            has_continue: false,
            line: line.to_string(),
            line_index,
        }));
    }

    /// Close a foreach block: advance the index and jump back while in range
    pub(crate) fn close_foreach(&mut self, line: &str, line_index: usize) -> ParseResult<()> {
        let context = match self.blocks.pop() {
            Some(BlockContext::Foreach(context)) => context,
            _ => return Err(self.error(ParseErrorKind::NoMatchingForeach, line, line_index)),
        };

        if context.has_continue {
            self.emit(Statement::Label(context.continue_label));
        }
        self.emit(Statement::Expr(ExprStatement {
            name: Some(context.index_var.clone()),
            expr: Expression::binary(
                BinaryOp::Add,
                Expression::variable(context.index_var.clone()),
                Expression::number(1.0),
            ),
        }));
        self.emit(Statement::Jump(JumpStatement {
            label: context.loop_label,
            expr: Some(Expression::binary(
                BinaryOp::Less,
                Expression::variable(context.index_var),
                Expression::variable(context.length_var),
            )),
        }));
        self.emit(Statement::Label(context.done_label));
        Ok(())
    }

    // ==================== Break / Continue ====================

    /// Handle `break`: jump to the innermost loop's done label
    ///
    /// If-then contexts are skipped so a break always leaves the loop.
    pub(crate) fn parse_break(&mut self, line: &str, line_index: usize) -> ParseResult<()> {
        let target = self.blocks.iter().rev().find_map(|context| match context {
            BlockContext::If(_) => None,
            BlockContext::While(context) => Some(context.done_label.clone()),
            BlockContext::Foreach(context) => Some(context.done_label.clone()),
        });
        let Some(label) = target else {
            return Err(self.error(ParseErrorKind::BreakOutsideLoop, line, line_index));
        };

        self.emit(Statement::Jump(JumpStatement { label, expr: None }));
        Ok(())
    }

    /// Handle `continue`: jump to the innermost loop's continue label
    pub(crate) fn parse_continue(&mut self, line: &str, line_index: usize) -> ParseResult<()> {
        let mut target = None;
        for context in self.blocks.iter_mut().rev() {
            match context {
                BlockContext::If(_) => {}
                BlockContext::While(context) => {
                    // A while loop re-enters at the loop label
                    target = Some(context.loop_label.clone());
                    break;
                }
                BlockContext::Foreach(context) => {
                    context.has_continue = true;
                    target = Some(context.continue_label.clone());
                    break;
                }
            }
        }
        let Some(label) = target else {
            return Err(self.error(ParseErrorKind::ContinueOutsideLoop, line, line_index));
        };

        self.emit(Statement::Jump(JumpStatement { label, expr: None }));
        Ok(())
    }

    // ==================== Context Helpers ====================

    /// Pop the top context, requiring an if-then block
    fn pop_if_context(&mut self, line: &str, line_index: usize) -> ParseResult<IfContext> {
        match self.blocks.pop() {
            Some(BlockContext::If(context)) => Ok(context),
            _ => Err(self.error(ParseErrorKind::NoMatchingIf, line, line_index)),
        }
    }
}
