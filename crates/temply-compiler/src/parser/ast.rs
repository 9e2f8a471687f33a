//! Syntax tree of a parsed template.
//!
//! Closed enums: the visitors match them exhaustively. Every node records the
//! 1-based source line it starts on.

use temply_core::Literal;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Template {
    pub body: Vec<Stmt>,
}

/// Assignment and loop targets.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Name(String),
    Tuple(Vec<String>),
}

impl Target {
    pub fn names(&self) -> Vec<&str> {
        match self {
            Target::Name(name) => vec![name.as_str()],
            Target::Tuple(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

/// Declared parameters of a macro or call block; defaults align to the end.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Params {
    pub names: Vec<String>,
    pub defaults: Vec<Expr>,
}

impl Params {
    /// Each parameter with its default expression, if any.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Expr>)> {
        let required = self.names.len() - self.defaults.len();
        self.names.iter().enumerate().map(move |(i, name)| {
            let default = i.checked_sub(required).map(|j| &self.defaults[j]);
            (name.as_str(), default)
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Template data and `{{ … }}` expressions.
    Output { nodes: Vec<Expr>, line: u32 },
    /// `elif` is an `If` nested as the only statement of `else_body`.
    If {
        test: Expr,
        body: Vec<Stmt>,
        else_body: Option<Vec<Stmt>>,
        line: u32,
    },
    For {
        target: Target,
        iter: Expr,
        filter: Option<Expr>,
        body: Vec<Stmt>,
        else_body: Option<Vec<Stmt>>,
        recursive: bool,
        line: u32,
    },
    Assign {
        target: Target,
        value: Expr,
        line: u32,
    },
    /// `{% set x %}…{% endset %}`
    AssignBlock {
        name: String,
        body: Vec<Stmt>,
        line: u32,
    },
    Macro {
        name: String,
        params: Params,
        body: Vec<Stmt>,
        line: u32,
    },
    CallBlock {
        call: Expr,
        params: Params,
        body: Vec<Stmt>,
        line: u32,
    },
    Import {
        template: Expr,
        alias: String,
        with_context: bool,
        line: u32,
    },
    FromImport {
        template: Expr,
        /// `(name, alias)`
        names: Vec<(String, Option<String>)>,
        with_context: bool,
        line: u32,
    },
    Include {
        template: Expr,
        ignore_missing: bool,
        with_context: bool,
        line: u32,
    },
    Extends { template: Expr, line: u32 },
    Block {
        name: String,
        body: Vec<Stmt>,
        scoped: bool,
        line: u32,
    },
    With {
        targets: Vec<(String, Expr)>,
        body: Vec<Stmt>,
        line: u32,
    },
    /// `{% do expr %}`
    ExprStmt { expr: Expr, line: u32 },
    Continue { line: u32 },
    Break { line: u32 },
}

impl Stmt {
    pub fn line(&self) -> u32 {
        match self {
            Stmt::Output { line, .. }
            | Stmt::If { line, .. }
            | Stmt::For { line, .. }
            | Stmt::Assign { line, .. }
            | Stmt::AssignBlock { line, .. }
            | Stmt::Macro { line, .. }
            | Stmt::CallBlock { line, .. }
            | Stmt::Import { line, .. }
            | Stmt::FromImport { line, .. }
            | Stmt::Include { line, .. }
            | Stmt::Extends { line, .. }
            | Stmt::Block { line, .. }
            | Stmt::With { line, .. }
            | Stmt::ExprStmt { line, .. }
            | Stmt::Continue { line }
            | Stmt::Break { line } => *line,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    And,
    Or,
}

impl BinOp {
    /// `+` and `-` require operands of related kinds.
    pub fn is_additive(self) -> bool {
        matches!(self, BinOp::Add | BinOp::Sub)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    LtEq,
    Gt,
    GtEq,
    In,
    NotIn,
}

impl CmpOp {
    pub fn is_membership(self) -> bool {
        matches!(self, CmpOp::In | CmpOp::NotIn)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    pub key: String,
    pub value: Expr,
}

/// Arguments of a call, filter or test.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Args {
    pub args: Vec<Expr>,
    pub kwargs: Vec<Keyword>,
    /// `*args`
    pub dyn_args: Option<Box<Expr>>,
    /// `**kwargs`
    pub dyn_kwargs: Option<Box<Expr>>,
}

impl Args {
    pub fn kwarg(&self, key: &str) -> Option<&Expr> {
        self.kwargs.iter().find(|k| k.key == key).map(|k| &k.value)
    }

    /// Every argument expression, positional first.
    pub fn exprs(&self) -> impl Iterator<Item = &Expr> {
        self.args
            .iter()
            .chain(self.kwargs.iter().map(|k| &k.value))
            .chain(self.dyn_args.as_deref())
            .chain(self.dyn_kwargs.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Const {
        value: Literal,
        line: u32,
    },
    TemplateData {
        text: String,
        line: u32,
    },
    Name {
        name: String,
        line: u32,
    },
    Getattr {
        node: Box<Expr>,
        attr: String,
        line: u32,
    },
    Getitem {
        node: Box<Expr>,
        arg: Box<Expr>,
        line: u32,
    },
    /// Only appears as the argument of `Getitem`.
    Slice {
        start: Option<Box<Expr>>,
        stop: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
        line: u32,
    },
    Filter {
        node: Box<Expr>,
        name: String,
        args: Args,
        line: u32,
    },
    Test {
        node: Box<Expr>,
        name: String,
        args: Args,
        negated: bool,
        line: u32,
    },
    Compare {
        expr: Box<Expr>,
        ops: Vec<(CmpOp, Expr)>,
        line: u32,
    },
    BinExpr {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        line: u32,
    },
    /// `a ~ b ~ c`
    Concat {
        nodes: Vec<Expr>,
        line: u32,
    },
    Unary {
        op: UnaryOp,
        node: Box<Expr>,
        line: u32,
    },
    CondExpr {
        test: Box<Expr>,
        expr1: Box<Expr>,
        expr2: Option<Box<Expr>>,
        line: u32,
    },
    Call {
        node: Box<Expr>,
        args: Args,
        line: u32,
    },
    List {
        items: Vec<Expr>,
        line: u32,
    },
    Tuple {
        items: Vec<Expr>,
        line: u32,
    },
    Dict {
        items: Vec<(Expr, Expr)>,
        line: u32,
    },
}

impl Expr {
    pub fn line(&self) -> u32 {
        match self {
            Expr::Const { line, .. }
            | Expr::TemplateData { line, .. }
            | Expr::Name { line, .. }
            | Expr::Getattr { line, .. }
            | Expr::Getitem { line, .. }
            | Expr::Slice { line, .. }
            | Expr::Filter { line, .. }
            | Expr::Test { line, .. }
            | Expr::Compare { line, .. }
            | Expr::BinExpr { line, .. }
            | Expr::Concat { line, .. }
            | Expr::Unary { line, .. }
            | Expr::CondExpr { line, .. }
            | Expr::Call { line, .. }
            | Expr::List { line, .. }
            | Expr::Tuple { line, .. }
            | Expr::Dict { line, .. } => *line,
        }
    }

    /// Value of a string constant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Expr::Const { value, .. } => value.as_str(),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Expr::Name { name, .. } => Some(name),
            _ => None,
        }
    }
}
