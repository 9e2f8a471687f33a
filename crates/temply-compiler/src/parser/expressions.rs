//! Expression productions, lowest precedence first.
//!
//! ```text
//! tuple     = expr ("," expr)* [","]
//! expr      = or ("if" or ["else" expr])*
//! or        = and ("or" and)*
//! and       = not ("and" not)*
//! not       = "not" not | compare
//! compare   = add (cmp_op add)*
//! add       = concat (("+" | "-") concat)*
//! concat    = mul ("~" mul)*
//! mul       = pow (("*" | "/" | "//" | "%") pow)*
//! pow       = unary ("**" unary)*
//! unary     = ("-" | "+") unary | primary postfix* filter*
//! ```

use temply_core::Literal;

use super::ast::{Args, BinOp, CmpOp, Expr, Keyword, UnaryOp};
use super::core::Parser;
use super::lexer::TokenKind;
use crate::Result;

/// Names that never start an operand.
const OPERATOR_KEYWORDS: &[&str] = &["and", "or", "not", "in", "is", "if", "else"];

impl Parser<'_> {
    /// An expression, or a tuple if commas follow.
    pub(super) fn parse_tuple(&mut self) -> Result<Expr> {
        let line = self.line();
        let first = self.parse_expression()?;
        if !self.currently_is(TokenKind::Comma) {
            return Ok(first);
        }

        let mut items = vec![first];
        while self.eat(TokenKind::Comma) {
            if self.at_tuple_end() {
                break;
            }
            items.push(self.parse_expression()?);
        }
        Ok(Expr::Tuple { items, line })
    }

    fn at_tuple_end(&self) -> bool {
        matches!(
            self.current(),
            None | Some(
                TokenKind::VariableEnd
                    | TokenKind::BlockEnd
                    | TokenKind::RParen
                    | TokenKind::RBracket
            )
        )
    }

    pub(super) fn parse_expression(&mut self) -> Result<Expr> {
        self.enter_recursion()?;
        let result = self.parse_condexpr();
        self.exit_recursion();
        result
    }

    fn parse_condexpr(&mut self) -> Result<Expr> {
        let line = self.line();
        let mut expr1 = self.parse_or()?;
        while self.eat_keyword("if") {
            let test = self.parse_or()?;
            let expr2 = if self.eat_keyword("else") {
                Some(Box::new(self.parse_expression()?))
            } else {
                None
            };
            expr1 = Expr::CondExpr {
                test: Box::new(test),
                expr1: Box::new(expr1),
                expr2,
                line,
            };
        }
        Ok(expr1)
    }

    pub(super) fn parse_or(&mut self) -> Result<Expr> {
        let line = self.line();
        let mut left = self.parse_and()?;
        while self.eat_keyword("or") {
            let right = self.parse_and()?;
            left = binary(BinOp::Or, left, right, line);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let line = self.line();
        let mut left = self.parse_not()?;
        while self.eat_keyword("and") {
            let right = self.parse_not()?;
            left = binary(BinOp::And, left, right, line);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr> {
        if !self.at_keyword("not") {
            return self.parse_compare();
        }
        let line = self.line();
        self.bump();
        self.enter_recursion()?;
        let node = self.parse_not();
        self.exit_recursion();
        Ok(Expr::Unary {
            op: UnaryOp::Not,
            node: Box::new(node?),
            line,
        })
    }

    fn parse_compare(&mut self) -> Result<Expr> {
        let line = self.line();
        let expr = self.parse_add()?;
        let mut ops = Vec::new();
        loop {
            let op = match self.current() {
                Some(TokenKind::Eq) => CmpOp::Eq,
                Some(TokenKind::Ne) => CmpOp::Ne,
                Some(TokenKind::Lt) => CmpOp::Lt,
                Some(TokenKind::LtEq) => CmpOp::LtEq,
                Some(TokenKind::Gt) => CmpOp::Gt,
                Some(TokenKind::GtEq) => CmpOp::GtEq,
                Some(TokenKind::Name) if self.current_text() == "in" => CmpOp::In,
                Some(TokenKind::Name)
                    if self.current_text() == "not"
                        && self.nth(1) == Some(TokenKind::Name)
                        && self.nth_text(1) == "in" =>
                {
                    self.bump();
                    CmpOp::NotIn
                }
                _ => break,
            };
            self.bump();
            ops.push((op, self.parse_add()?));
        }

        if ops.is_empty() {
            return Ok(expr);
        }
        Ok(Expr::Compare {
            expr: Box::new(expr),
            ops,
            line,
        })
    }

    fn parse_add(&mut self) -> Result<Expr> {
        let line = self.line();
        let mut left = self.parse_concat()?;
        loop {
            let op = match self.current() {
                Some(TokenKind::Add) => BinOp::Add,
                Some(TokenKind::Sub) => BinOp::Sub,
                _ => break,
            };
            self.bump();
            let right = self.parse_concat()?;
            left = binary(op, left, right, line);
        }
        Ok(left)
    }

    fn parse_concat(&mut self) -> Result<Expr> {
        let line = self.line();
        let first = self.parse_mul()?;
        if !self.currently_is(TokenKind::Tilde) {
            return Ok(first);
        }
        let mut nodes = vec![first];
        while self.eat(TokenKind::Tilde) {
            nodes.push(self.parse_mul()?);
        }
        Ok(Expr::Concat { nodes, line })
    }

    fn parse_mul(&mut self) -> Result<Expr> {
        let line = self.line();
        let mut left = self.parse_pow()?;
        loop {
            let op = match self.current() {
                Some(TokenKind::Mul) => BinOp::Mul,
                Some(TokenKind::Div) => BinOp::Div,
                Some(TokenKind::FloorDiv) => BinOp::FloorDiv,
                Some(TokenKind::Mod) => BinOp::Mod,
                _ => break,
            };
            self.bump();
            let right = self.parse_pow()?;
            left = binary(op, left, right, line);
        }
        Ok(left)
    }

    fn parse_pow(&mut self) -> Result<Expr> {
        let line = self.line();
        let mut left = self.parse_unary(true)?;
        while self.eat(TokenKind::Pow) {
            let right = self.parse_unary(true)?;
            left = binary(BinOp::Pow, left, right, line);
        }
        Ok(left)
    }

    fn parse_unary(&mut self, with_filter: bool) -> Result<Expr> {
        let line = self.line();
        let op = match self.current() {
            Some(TokenKind::Sub) => Some(UnaryOp::Neg),
            Some(TokenKind::Add) => Some(UnaryOp::Pos),
            _ => None,
        };

        let mut node = match op {
            Some(op) => {
                self.bump();
                self.enter_recursion()?;
                let operand = self.parse_unary(false);
                self.exit_recursion();
                Expr::Unary {
                    op,
                    node: Box::new(operand?),
                    line,
                }
            }
            None => self.parse_primary()?,
        };

        node = self.parse_postfix(node)?;
        if with_filter {
            node = self.parse_filter_expr(node)?;
        }
        Ok(node)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let line = self.line();
        match self.current() {
            Some(TokenKind::Name) => {
                let text = self.current_text();
                if OPERATOR_KEYWORDS.contains(&text) {
                    return Err(self.error_here(format!("unexpected keyword `{text}`")));
                }
                self.bump();
                let value = match text {
                    "true" | "True" => Literal::Boolean(true),
                    "false" | "False" => Literal::Boolean(false),
                    "none" | "None" => Literal::None,
                    name => {
                        return Ok(Expr::Name {
                            name: name.to_string(),
                            line,
                        });
                    }
                };
                Ok(Expr::Const { value, line })
            }
            Some(TokenKind::String) => {
                let mut value = String::new();
                while self.currently_is(TokenKind::String) {
                    value.push_str(&unescape(self.current_text()));
                    self.bump();
                }
                Ok(Expr::Const {
                    value: Literal::String(value),
                    line,
                })
            }
            Some(TokenKind::Integer) => {
                let digits = self.current_text().replace('_', "");
                let Ok(value) = digits.parse::<i64>() else {
                    return Err(self.error_here("integer literal out of range"));
                };
                self.bump();
                Ok(Expr::Const {
                    value: Literal::Integer(value),
                    line,
                })
            }
            Some(TokenKind::Float) => {
                let digits = self.current_text().replace('_', "");
                let Ok(value) = digits.parse::<f64>() else {
                    return Err(self.error_here("malformed float literal"));
                };
                self.bump();
                Ok(Expr::Const {
                    value: Literal::Number(value),
                    line,
                })
            }
            Some(TokenKind::LParen) => self.parse_parenthesised(),
            Some(TokenKind::LBracket) => {
                self.bump();
                let items = self.parse_items(TokenKind::RBracket)?;
                Ok(Expr::List { items, line })
            }
            Some(TokenKind::LBrace) => self.parse_dict(),
            _ => Err(self.unexpected("an expression")),
        }
    }

    /// `()`, `(a)` or `(a, b)`.
    fn parse_parenthesised(&mut self) -> Result<Expr> {
        let line = self.line();
        self.expect(TokenKind::LParen)?;
        if self.eat(TokenKind::RParen) {
            return Ok(Expr::Tuple {
                items: Vec::new(),
                line,
            });
        }
        let first = self.parse_expression()?;
        if self.eat(TokenKind::RParen) {
            return Ok(first);
        }

        let mut items = vec![first];
        while self.eat(TokenKind::Comma) {
            if self.currently_is(TokenKind::RParen) {
                break;
            }
            items.push(self.parse_expression()?);
        }
        self.expect(TokenKind::RParen)?;
        Ok(Expr::Tuple { items, line })
    }

    /// Comma-separated expressions up to `close`, trailing comma allowed.
    fn parse_items(&mut self, close: TokenKind) -> Result<Vec<Expr>> {
        let mut items = Vec::new();
        while !self.currently_is(close) {
            if !items.is_empty() {
                self.expect(TokenKind::Comma)?;
                if self.currently_is(close) {
                    break;
                }
            }
            items.push(self.parse_expression()?);
        }
        self.expect(close)?;
        Ok(items)
    }

    fn parse_dict(&mut self) -> Result<Expr> {
        let line = self.line();
        self.expect(TokenKind::LBrace)?;
        let mut items = Vec::new();
        while !self.currently_is(TokenKind::RBrace) {
            if !items.is_empty() {
                self.expect(TokenKind::Comma)?;
                if self.currently_is(TokenKind::RBrace) {
                    break;
                }
            }
            let key = self.parse_expression()?;
            self.expect(TokenKind::Colon)?;
            let value = self.parse_expression()?;
            items.push((key, value));
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Expr::Dict { items, line })
    }

    fn parse_postfix(&mut self, mut node: Expr) -> Result<Expr> {
        loop {
            node = match self.current() {
                Some(TokenKind::Dot) => self.parse_dot(node)?,
                Some(TokenKind::LBracket) => self.parse_subscript(node)?,
                Some(TokenKind::LParen) => self.parse_call(node)?,
                _ => return Ok(node),
            };
        }
    }

    /// `.attr` or `.0`
    fn parse_dot(&mut self, node: Expr) -> Result<Expr> {
        let line = self.line();
        self.expect(TokenKind::Dot)?;
        match self.current() {
            Some(TokenKind::Name) => Ok(Expr::Getattr {
                node: Box::new(node),
                attr: self.expect_ident()?,
                line,
            }),
            Some(TokenKind::Integer) => {
                let arg = self.parse_primary()?;
                Ok(Expr::Getitem {
                    node: Box::new(node),
                    arg: Box::new(arg),
                    line,
                })
            }
            _ => Err(self.unexpected("an attribute name")),
        }
    }

    fn parse_subscript(&mut self, node: Expr) -> Result<Expr> {
        let line = self.line();
        self.expect(TokenKind::LBracket)?;
        let mut args = Vec::new();
        while !self.currently_is(TokenKind::RBracket) {
            if !args.is_empty() {
                self.expect(TokenKind::Comma)?;
                if self.currently_is(TokenKind::RBracket) {
                    break;
                }
            }
            args.push(self.parse_subscribed()?);
        }
        self.expect(TokenKind::RBracket)?;

        let arg = match args.len() {
            0 => return Err(self.error_here("empty subscript")),
            1 => args.remove(0),
            _ => Expr::Tuple { items: args, line },
        };
        Ok(Expr::Getitem {
            node: Box::new(node),
            arg: Box::new(arg),
            line,
        })
    }

    /// A subscript key or a `start:stop:step` slice.
    fn parse_subscribed(&mut self) -> Result<Expr> {
        let line = self.line();
        let start = if self.currently_is(TokenKind::Colon) {
            None
        } else {
            let key = self.parse_expression()?;
            if !self.currently_is(TokenKind::Colon) {
                return Ok(key);
            }
            Some(Box::new(key))
        };
        self.expect(TokenKind::Colon)?;

        let stop = if self.at_slice_bound_end() {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        let step = if self.eat(TokenKind::Colon) && !self.at_slice_bound_end() {
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };
        Ok(Expr::Slice {
            start,
            stop,
            step,
            line,
        })
    }

    fn at_slice_bound_end(&self) -> bool {
        matches!(
            self.current(),
            Some(TokenKind::RBracket | TokenKind::Comma | TokenKind::Colon)
        )
    }

    fn parse_call(&mut self, node: Expr) -> Result<Expr> {
        let line = self.line();
        let args = self.parse_call_args()?;
        Ok(Expr::Call {
            node: Box::new(node),
            args,
            line,
        })
    }

    /// `(a, b, key=value, *args, **kwargs)`
    fn parse_call_args(&mut self) -> Result<Args> {
        self.expect(TokenKind::LParen)?;
        let mut args = Args::default();
        let mut first = true;
        while !self.currently_is(TokenKind::RParen) {
            if !first {
                self.expect(TokenKind::Comma)?;
                if self.currently_is(TokenKind::RParen) {
                    break;
                }
            }
            first = false;

            if self.eat(TokenKind::Mul) {
                args.dyn_args = Some(Box::new(self.parse_expression()?));
            } else if self.eat(TokenKind::Pow) {
                args.dyn_kwargs = Some(Box::new(self.parse_expression()?));
            } else if self.currently_is(TokenKind::Name) && self.nth(1) == Some(TokenKind::Assign) {
                let key = self.expect_ident()?;
                self.bump();
                let value = self.parse_expression()?;
                args.kwargs.push(Keyword { key, value });
            } else {
                if !args.kwargs.is_empty() || args.dyn_args.is_some() || args.dyn_kwargs.is_some() {
                    return Err(self.error_here("positional argument follows keyword argument"));
                }
                args.args.push(self.parse_expression()?);
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(args)
    }

    /// `|filter(...)` chains and `is [not] test` suffixes.
    fn parse_filter_expr(&mut self, mut node: Expr) -> Result<Expr> {
        loop {
            node = if self.currently_is(TokenKind::Pipe) {
                self.parse_filter(node)?
            } else if self.at_keyword("is") {
                self.parse_test(node)?
            } else if self.currently_is(TokenKind::LParen) {
                self.parse_call(node)?
            } else {
                return Ok(node);
            };
        }
    }

    fn parse_filter(&mut self, node: Expr) -> Result<Expr> {
        let line = self.line();
        self.expect(TokenKind::Pipe)?;
        let mut name = self.expect_ident()?;
        while self.eat(TokenKind::Dot) {
            name.push('.');
            name.push_str(&self.expect_ident()?);
        }
        let args = if self.currently_is(TokenKind::LParen) {
            self.parse_call_args()?
        } else {
            Args::default()
        };
        Ok(Expr::Filter {
            node: Box::new(node),
            name,
            args,
            line,
        })
    }

    fn parse_test(&mut self, node: Expr) -> Result<Expr> {
        let line = self.line();
        self.expect_keyword("is")?;
        let negated = self.eat_keyword("not");
        let mut name = self.expect_ident()?;
        while self.eat(TokenKind::Dot) {
            name.push('.');
            name.push_str(&self.expect_ident()?);
        }

        let args = if self.currently_is(TokenKind::LParen) {
            self.parse_call_args()?
        } else if self.at_test_argument() {
            let arg = self.parse_primary()?;
            let arg = self.parse_postfix(arg)?;
            Args {
                args: vec![arg],
                ..Args::default()
            }
        } else {
            Args::default()
        };

        Ok(Expr::Test {
            node: Box::new(node),
            name,
            args,
            negated,
            line,
        })
    }

    /// `x is divisibleby 3` takes one argument without parentheses.
    fn at_test_argument(&self) -> bool {
        match self.current() {
            Some(TokenKind::Name) => !OPERATOR_KEYWORDS.contains(&self.current_text()),
            Some(
                TokenKind::String
                | TokenKind::Integer
                | TokenKind::Float
                | TokenKind::LBracket
                | TokenKind::LBrace,
            ) => true,
            _ => false,
        }
    }
}

fn binary(op: BinOp, left: Expr, right: Expr, line: u32) -> Expr {
    Expr::BinExpr {
        op,
        left: Box::new(left),
        right: Box::new(right),
        line,
    }
}

/// Contents of a quoted string literal with escapes resolved.
fn unescape(quoted: &str) -> String {
    let inner = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(c @ ('\\' | '\'' | '"')) => out.push(c),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
