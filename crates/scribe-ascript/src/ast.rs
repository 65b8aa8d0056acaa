//! AScript syntax tree.
//!
//! Every node records a [`Location`]: the inclusive range of indices into the token sequence it
//! was parsed from. The highlighting visitor maps those indices back to source spans.

use std::fmt;

/// Inclusive range of token indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub start: usize,
    pub end: usize,
}

impl Location {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Location of a single token.
    pub const fn token(index: usize) -> Self {
        Self {
            start: index,
            end: index,
        }
    }

    /// Location spanning `self` through `other`.
    pub const fn to(self, other: Location) -> Self {
        Self {
            start: self.start,
            end: other.end,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tokens {}..={}", self.start, self.end)
    }
}

/// Root of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl Program {
    /// Function declarations at the top level, in source order.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.statements.iter().filter_map(|stmt| match &stmt.kind {
            StmtKind::FuncDeclaration(decl) => Some(decl),
            _ => None,
        })
    }
}

/// A name in the source (one identifier token).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// `var name = expr;`
    VarDeclaration { symbol: Symbol, expr: Expr },
    /// `name = expr;`
    Assignment { symbol: Symbol, expr: Expr },
    /// `if cond { .. } else ..`
    If {
        condition: Expr,
        then_block: Block,
        else_clause: Option<ElseClause>,
    },
    /// `while cond { .. }`
    While { condition: Expr, block: Block },
    Block(Block),
    /// `print expr;`
    Print(Expr),
    /// `return expr?;`
    Return(Option<Expr>),
    FuncDeclaration(FunctionDecl),
    ProcDeclaration(FunctionDecl),
    /// `name(args);`
    ProcCall { symbol: Symbol, arguments: Vec<Expr> },
}

/// `{ statements }`; `location.start` is `{`, `location.end` is `}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub location: Location,
}

/// `else` followed by a block or another `if`.
#[derive(Debug, Clone, PartialEq)]
pub struct ElseClause {
    /// Index of the `else` token.
    pub keyword: usize,
    /// Either a [`StmtKind::Block`] or a [`StmtKind::If`].
    pub body: Box<Stmt>,
}

/// Shared shape of `func` and `proc` declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub symbol: Symbol,
    pub parameters: Vec<Parameter>,
    pub block: Block,
}

/// `name: type`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub symbol: Symbol,
    pub ty: ParamType,
    /// Index of the type token.
    pub type_location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Bool,
    String,
    Number,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        /// Index of the operator token.
        op_token: usize,
        right: Box<Expr>,
    },
    /// The operator is the first token of the expression.
    Unary { op: UnaryOp, expr: Box<Expr> },
    Call { symbol: Symbol, arguments: Vec<Expr> },
    Boolean(bool),
    /// Number literal as written.
    Number(String),
    String(String),
    Symbol(Symbol),
    /// `( expr )`
    Grouping(Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
}

impl BinaryOp {
    /// Binding power; higher binds tighter. All operators are left associative.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Equal | BinaryOp::NotEqual => 3,
            BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual => 4,
            BinaryOp::Add | BinaryOp::Subtract => 5,
            BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Remainder => 6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
}
