// Abstract Syntax Tree for lambda bodies

use serde::{Deserialize, Serialize};

/// AST Node types
///
/// One node per construct a lambda body may contain. There are no
/// statement, assignment or declaration nodes: the parser rejects them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AstNode {
    /// String literal (e.g., "hello", 'world')
    String(String),

    /// Number literal
    Number(f64),

    /// Boolean literal
    Boolean(bool),

    /// Null literal
    Null,

    /// Undefined literal
    Undefined,

    /// Bare name; resolves only when it is the lambda parameter
    Identifier(String),

    /// Member access (e.g., x.value)
    Member {
        object: Box<AstNode>,
        property: String,
    },

    /// Indexed access (e.g., x.items[0], x["key"])
    Index {
        object: Box<AstNode>,
        index: Box<AstNode>,
    },

    /// Array constructor
    Array(Vec<AstNode>),

    /// Binary operation
    Binary {
        op: BinaryOp,
        lhs: Box<AstNode>,
        rhs: Box<AstNode>,
    },

    /// Unary operation
    Unary {
        op: UnaryOp,
        operand: Box<AstNode>,
    },

    /// Conditional expression (? :)
    Conditional {
        condition: Box<AstNode>,
        then_branch: Box<AstNode>,
        else_branch: Box<AstNode>,
    },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,

    // Comparison
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,

    // Logical
    And,
    Or,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Negation (-)
    Negate,

    /// Logical NOT (!)
    Not,
}

impl BinaryOp {
    /// Source symbol, used in error messages
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::LessThan => "<",
            BinaryOp::LessThanOrEqual => "<=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterThanOrEqual => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

impl AstNode {
    /// Create a string literal node
    pub fn string(s: impl Into<String>) -> Self {
        AstNode::String(s.into())
    }

    /// Create a number literal node
    pub fn number(n: f64) -> Self {
        AstNode::Number(n)
    }

    /// Create a boolean literal node
    pub fn boolean(b: bool) -> Self {
        AstNode::Boolean(b)
    }

    /// Create an identifier node
    pub fn identifier(name: impl Into<String>) -> Self {
        AstNode::Identifier(name.into())
    }

    /// Create a member access node
    pub fn member(object: AstNode, property: impl Into<String>) -> Self {
        AstNode::Member {
            object: Box::new(object),
            property: property.into(),
        }
    }

    /// Create a binary operation node
    pub fn binary(op: BinaryOp, lhs: AstNode, rhs: AstNode) -> Self {
        AstNode::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Nesting depth of the tree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        1 + match self {
            AstNode::String(_)
            | AstNode::Number(_)
            | AstNode::Boolean(_)
            | AstNode::Null
            | AstNode::Undefined
            | AstNode::Identifier(_) => 0,
            AstNode::Member { object, .. } => object.depth(),
            AstNode::Index { object, index } => object.depth().max(index.depth()),
            AstNode::Array(elements) => elements.iter().map(AstNode::depth).max().unwrap_or(0),
            AstNode::Binary { lhs, rhs, .. } => lhs.depth().max(rhs.depth()),
            AstNode::Unary { operand, .. } => operand.depth(),
            AstNode::Conditional {
                condition,
                then_branch,
                else_branch,
            } => condition
                .depth()
                .max(then_branch.depth())
                .max(else_branch.depth()),
        }
    }
}
