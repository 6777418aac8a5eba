//! AST node types for the routine-source grammar (an ES-module subset).
//!
//! Every node carries a [`Span`] for error reporting. Large recursive types
//! are boxed to keep enum sizes reasonable. The node vocabulary mirrors
//! what the classifier needs to see: export/import syntax, function bodies,
//! `return` statements, and the expression shapes that tag pointer-like
//! returns ([`ExprKind::syntax_name`]).

use crate::Span;

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A complete routine-source module.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub items: Vec<Item>,
    pub span: Span,
}

/// A top-level item.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub kind: ItemKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    /// `import ... from "module"` — recorded, never resolved.
    Import(ImportDecl),
    /// `export function name(...) { ... }`
    ExportFunction(FunctionDecl),
    /// `export let/const/var ...`
    ExportVar(VarDecl),
    /// A non-exported top-level statement.
    Stmt(Stmt),
}

/// An import declaration. Only the module specifier is kept; the analysis
/// never follows imports.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub source: String,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Identifiers & Functions
// ══════════════════════════════════════════════════════════════════════════════

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// `function name(params) { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Ident,
    pub params: Vec<Ident>,
    pub body: Block,
    pub span: Span,
}

/// `{ stmt* }`
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// `let x = 1, y;`
    Var(VarDecl),
    /// An expression statement.
    Expr(Expr),
    /// `return expr?;`
    Return(Option<Expr>),
    /// `if (cond) then else other?`
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    /// `for (init?; test?; update?) body`
    For {
        init: Option<Box<ForInit>>,
        test: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },
    /// `for (decl in|of right) body`
    ForEach {
        kind: ForEachKind,
        decl: Box<ForInit>,
        right: Expr,
        body: Box<Stmt>,
    },
    /// `while (cond) body`
    While { cond: Expr, body: Box<Stmt> },
    /// `do body while (cond);`
    DoWhile { body: Box<Stmt>, cond: Expr },
    /// A nested block.
    Block(Block),
    /// A nested function declaration.
    Function(FunctionDecl),
    Break,
    Continue,
    Empty,
}

/// `var` / `let` / `const`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Var,
    Let,
    Const,
}

/// A variable declaration with one or more declarators.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub kind: VarKind,
    pub declarators: Vec<Declarator>,
    pub span: Span,
}

/// `name = init?`
#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub name: Ident,
    pub init: Option<Expr>,
    pub span: Span,
}

/// The init slot of a `for` head.
#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    Var(VarDecl),
    Expr(Expr),
}

/// `for-in` vs `for-of`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForEachKind {
    In,
    Of,
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Ident(String),
    Number(f64),
    Str(String),
    /// A template literal, captured raw and never interpreted.
    Template(String),
    Bool(bool),
    Null,
    This,
    Array(Vec<Expr>),
    Object(Vec<Property>),
    Function {
        name: Option<Ident>,
        params: Vec<Ident>,
        body: Block,
    },
    Arrow {
        params: Vec<Ident>,
        body: ArrowBody,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Update {
        op: UpdateOp,
        prefix: bool,
        target: Box<Expr>,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        other: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    New {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Member {
        object: Box<Expr>,
        property: MemberKey,
    },
    Sequence(Vec<Expr>),
}

impl ExprKind {
    /// The ESTree-style node-type name for this expression shape.
    ///
    /// Interface tables tag pointer-like returns with exactly these strings,
    /// so they stay byte-compatible with what an ESTree-based analyzer
    /// produces. Plain literals collapse to `"Literal"`.
    pub fn syntax_name(&self) -> &'static str {
        match self {
            Self::Ident(_) => "Identifier",
            Self::Number(_) | Self::Str(_) | Self::Bool(_) | Self::Null => "Literal",
            Self::Template(_) => "TemplateLiteral",
            Self::This => "ThisExpression",
            Self::Array(_) => "ArrayExpression",
            Self::Object(_) => "ObjectExpression",
            Self::Function { .. } => "FunctionExpression",
            Self::Arrow { .. } => "ArrowFunctionExpression",
            Self::Unary { .. } => "UnaryExpression",
            Self::Update { .. } => "UpdateExpression",
            Self::Binary { .. } => "BinaryExpression",
            Self::Logical { .. } => "LogicalExpression",
            Self::Assign { .. } => "AssignmentExpression",
            Self::Conditional { .. } => "ConditionalExpression",
            Self::Call { .. } => "CallExpression",
            Self::New { .. } => "NewExpression",
            Self::Member { .. } => "MemberExpression",
            Self::Sequence(_) => "SequenceExpression",
        }
    }
}

/// Member access key: `obj.name` or `obj[expr]`.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberKey {
    Ident(Ident),
    Computed(Box<Expr>),
}

/// One `key: value` entry of an object literal. Shorthand entries carry the
/// identifier expression as their value.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub key: Ident,
    pub value: Expr,
    pub span: Span,
}

/// Arrow function body: expression or block form.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrowBody {
    Expr(Box<Expr>),
    Block(Block),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Minus,
    Plus,
    Not,
    BitNot,
    Typeof,
    Void,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Inc,
    Dec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Shl,
    Shr,
    UShr,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    BitAnd,
    BitOr,
    BitXor,
    In,
    InstanceOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Shl,
    Shr,
    UShr,
    BitAnd,
    BitOr,
    BitXor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_names_match_estree() {
        assert_eq!(ExprKind::Ident("out".into()).syntax_name(), "Identifier");
        assert_eq!(ExprKind::Number(1.0).syntax_name(), "Literal");
        assert_eq!(ExprKind::Null.syntax_name(), "Literal");
        assert_eq!(
            ExprKind::Array(Vec::new()).syntax_name(),
            "ArrayExpression"
        );
        assert_eq!(
            ExprKind::New {
                callee: Box::new(Expr::new(ExprKind::Ident("T".into()), Span::point(0))),
                args: Vec::new(),
            }
            .syntax_name(),
            "NewExpression"
        );
    }
}
