//! Script model types
//!
//! The parser's output is a tree of statements and expressions. Every node
//! serializes in the externally tagged form, so each statement and each
//! expression becomes a single-key object whose key is the variant name —
//! the language's canonical document form. Downstream consumers dispatch on
//! that key.

use serde::{Deserialize, Serialize};

/// A parsed script: the top-level statement list, in source order after
/// block lowering.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Script {
    pub statements: Vec<Statement>,
}

/// A script statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Statement {
    /// Assignment (with `name`) or bare expression
    Expr(ExprStatement),
    /// Function definition
    Function(FunctionStatement),
    /// Jump target
    Label(String),
    /// Unconditional or conditional jump
    Jump(JumpStatement),
    /// Return from a function
    Return(ReturnStatement),
    /// Include of another script by URL
    Include(String),
}

/// Expression statement, an assignment when `name` is present
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExprStatement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub expr: Expression,
}

/// Function definition statement
///
/// Function definitions never nest: `statements` contains no `Function`
/// statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionStatement {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    pub statements: Vec<Statement>,
    #[serde(
        rename = "async",
        default,
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub is_async: bool,
}

/// Jump statement, conditional when `expr` is present
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JumpStatement {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr: Option<Expression>,
}

/// Return statement with optional value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStatement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr: Option<Expression>,
}

/// An expression tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expression {
    /// Number literal
    Number(f64),
    /// String literal, already unescaped
    String(String),
    /// Variable reference
    Variable(String),
    /// Parenthesized expression, preserved in the model
    Group(Box<Expression>),
    /// Unary operator expression
    Unary(Box<UnaryExpression>),
    /// Binary operator expression
    Binary(Box<BinaryExpression>),
    /// Function call
    Function(FunctionExpression),
}

/// Unary operator expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryExpression {
    pub op: UnaryOp,
    pub expr: Expression,
}

/// Binary operator expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpression {
    pub op: BinaryOp,
    pub left: Expression,
    pub right: Expression,
}

/// Function call expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionExpression {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Expression>,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    #[serde(rename = "!")]
    Not,
    #[serde(rename = "-")]
    Negate,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    #[serde(rename = "**")]
    Exponent,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
    #[serde(rename = "%")]
    Modulo,
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "<=")]
    LessEqual,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = ">=")]
    GreaterEqual,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "||")]
    Or,
}

impl Expression {
    /// Create a number literal expression
    pub fn number(value: f64) -> Self {
        Expression::Number(value)
    }

    /// Create a variable reference expression
    pub fn variable(name: impl Into<String>) -> Self {
        Expression::Variable(name.into())
    }

    /// Create a group expression
    pub fn group(expr: Expression) -> Self {
        Expression::Group(Box::new(expr))
    }

    /// Create a unary operator expression
    pub fn unary(op: UnaryOp, expr: Expression) -> Self {
        Expression::Unary(Box::new(UnaryExpression { op, expr }))
    }

    /// Create a binary operator expression
    pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
        Expression::Binary(Box::new(BinaryExpression { op, left, right }))
    }

    /// Create a function call expression
    pub fn call(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::Function(FunctionExpression {
            name: name.into(),
            args,
        })
    }
}

impl UnaryOp {
    /// Operator token text
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Negate => "-",
        }
    }
}

impl BinaryOp {
    /// Operator token text
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Exponent => "**",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Less => "<",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Greater => ">",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    /// Look up the operator for a token
    pub fn from_token(token: &str) -> Option<Self> {
        let op = match token {
            "**" => BinaryOp::Exponent,
            "*" => BinaryOp::Multiply,
            "/" => BinaryOp::Divide,
            "%" => BinaryOp::Modulo,
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Subtract,
            "<=" => BinaryOp::LessEqual,
            "<" => BinaryOp::Less,
            ">=" => BinaryOp::GreaterEqual,
            ">" => BinaryOp::Greater,
            "==" => BinaryOp::Equal,
            "!=" => BinaryOp::NotEqual,
            "&&" => BinaryOp::And,
            "||" => BinaryOp::Or,
            _ => return None,
        };
        Some(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_statement_serialized_shape() {
        let stmt = Statement::Expr(ExprStatement {
            name: Some("x".to_string()),
            expr: Expression::number(1.0),
        });
        assert_eq!(
            serde_json::to_value(&stmt).unwrap(),
            json!({"expr": {"name": "x", "expr": {"number": 1.0}}})
        );

        let stmt = Statement::Label("lbl".to_string());
        assert_eq!(serde_json::to_value(&stmt).unwrap(), json!({"label": "lbl"}));

        let stmt = Statement::Jump(JumpStatement {
            label: "lbl".to_string(),
            expr: None,
        });
        assert_eq!(
            serde_json::to_value(&stmt).unwrap(),
            json!({"jump": {"label": "lbl"}})
        );

        let stmt = Statement::Return(ReturnStatement { expr: None });
        assert_eq!(serde_json::to_value(&stmt).unwrap(), json!({"return": {}}));

        let stmt = Statement::Include("lib.ls".to_string());
        assert_eq!(
            serde_json::to_value(&stmt).unwrap(),
            json!({"include": "lib.ls"})
        );
    }

    #[test]
    fn test_function_statement_optional_fields() {
        let stmt = Statement::Function(FunctionStatement {
            name: "f".to_string(),
            args: Vec::new(),
            statements: Vec::new(),
            is_async: false,
        });
        // Empty args and false async are omitted
        assert_eq!(
            serde_json::to_value(&stmt).unwrap(),
            json!({"function": {"name": "f", "statements": []}})
        );

        let stmt = Statement::Function(FunctionStatement {
            name: "f".to_string(),
            args: vec!["a".to_string(), "b".to_string()],
            statements: Vec::new(),
            is_async: true,
        });
        assert_eq!(
            serde_json::to_value(&stmt).unwrap(),
            json!({"function": {"name": "f", "args": ["a", "b"], "statements": [], "async": true}})
        );
    }

    #[test]
    fn test_expression_serialized_shape() {
        let expr = Expression::binary(
            BinaryOp::Add,
            Expression::number(1.0),
            Expression::unary(UnaryOp::Negate, Expression::variable("x")),
        );
        assert_eq!(
            serde_json::to_value(&expr).unwrap(),
            json!({"binary": {
                "op": "+",
                "left": {"number": 1.0},
                "right": {"unary": {"op": "-", "expr": {"variable": "x"}}}
            }})
        );

        let expr = Expression::call("f", Vec::new());
        assert_eq!(
            serde_json::to_value(&expr).unwrap(),
            json!({"function": {"name": "f"}})
        );

        let expr = Expression::group(Expression::String("a'b".to_string()));
        assert_eq!(
            serde_json::to_value(&expr).unwrap(),
            json!({"group": {"string": "a'b"}})
        );
    }

    #[test]
    fn test_model_round_trip() {
        let script = Script {
            statements: vec![
                Statement::Expr(ExprStatement {
                    name: None,
                    expr: Expression::call("log", vec![Expression::number(2.0)]),
                }),
                Statement::Function(FunctionStatement {
                    name: "f".to_string(),
                    args: vec!["a".to_string()],
                    statements: vec![Statement::Return(ReturnStatement {
                        expr: Some(Expression::variable("a")),
                    })],
                    is_async: false,
                }),
            ],
        };
        let value = serde_json::to_value(&script).unwrap();
        let back: Script = serde_json::from_value(value).unwrap();
        assert_eq!(back, script);
    }

    #[test]
    fn test_binary_op_tokens() {
        for op in [
            BinaryOp::Exponent,
            BinaryOp::Multiply,
            BinaryOp::Divide,
            BinaryOp::Modulo,
            BinaryOp::Add,
            BinaryOp::Subtract,
            BinaryOp::LessEqual,
            BinaryOp::Less,
            BinaryOp::GreaterEqual,
            BinaryOp::Greater,
            BinaryOp::Equal,
            BinaryOp::NotEqual,
            BinaryOp::And,
            BinaryOp::Or,
        ] {
            assert_eq!(BinaryOp::from_token(op.as_str()), Some(op));
        }
        assert_eq!(BinaryOp::from_token("="), None);
    }
}
