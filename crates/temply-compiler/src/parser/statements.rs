//! Statement productions: template bodies and `{% … %}` tags.

use super::ast::{Expr, Params, Stmt, Target};
use super::core::Parser;
use super::lexer::TokenKind;
use crate::{Error, Result};

/// Tags the language has but inference does not model.
const UNSUPPORTED_TAGS: &[&str] = &["filter", "autoescape", "trans", "pluralize"];

impl Parser<'_> {
    /// Parses statements until a `{% <end> %}` tag with one of the given
    /// keywords. Consumes the opening delimiter and the keyword, leaving the rest
    /// of that tag to the caller. An empty `end` set runs to end of input.
    pub(super) fn parse_body(&mut self, end: &[&str]) -> Result<(Vec<Stmt>, Option<String>)> {
        let mut body = Vec::new();
        let mut output: Vec<Expr> = Vec::new();
        let mut output_line = 0;

        loop {
            match self.current() {
                None => {
                    flush_output(&mut body, &mut output, output_line);
                    if end.is_empty() {
                        return Ok((body, None));
                    }
                    return Err(self.unexpected(&format!("`{{% {} %}}`", end[end.len() - 1])));
                }
                Some(TokenKind::Data) => {
                    if output.is_empty() {
                        output_line = self.line();
                    }
                    let line = self.line();
                    let token = self.bump();
                    let text = self.source[token.span].to_string();
                    output.push(Expr::TemplateData { text, line });
                }
                Some(TokenKind::VariableBegin) => {
                    if output.is_empty() {
                        output_line = self.line();
                    }
                    self.bump();
                    output.push(self.parse_tuple()?);
                    self.expect(TokenKind::VariableEnd)?;
                }
                Some(TokenKind::BlockBegin) => {
                    flush_output(&mut body, &mut output, output_line);
                    let keyword = self.nth_text(1);
                    if self.nth(1) == Some(TokenKind::Name) && end.contains(&keyword) {
                        self.pos += 2;
                        return Ok((body, Some(keyword.to_string())));
                    }
                    body.push(self.parse_statement()?);
                }
                Some(_) => return Err(self.unexpected("template data or a tag")),
            }
        }
    }

    fn parse_statement(&mut self) -> Result<Stmt> {
        self.enter_recursion()?;
        let result = self.parse_statement_inner();
        self.exit_recursion();
        result
    }

    fn parse_statement_inner(&mut self) -> Result<Stmt> {
        self.expect(TokenKind::BlockBegin)?;
        let line = self.line();
        if !self.currently_is(TokenKind::Name) {
            return Err(self.unexpected("a tag name"));
        }
        let span = self.current_span();
        let keyword = self.current_text();
        self.bump();

        match keyword {
            "if" => self.parse_if(line),
            "for" => self.parse_for(line),
            "set" => self.parse_set(line),
            "macro" => self.parse_macro(line),
            "call" => self.parse_call_block(line),
            "import" => self.parse_import(line),
            "from" => self.parse_from_import(line),
            "include" => self.parse_include(line),
            "extends" => {
                let template = self.parse_expression()?;
                self.expect(TokenKind::BlockEnd)?;
                Ok(Stmt::Extends { template, line })
            }
            "block" => self.parse_block(line),
            "with" => self.parse_with(line),
            "do" => {
                let expr = self.parse_tuple()?;
                self.expect(TokenKind::BlockEnd)?;
                Ok(Stmt::ExprStmt { expr, line })
            }
            "continue" => {
                self.expect(TokenKind::BlockEnd)?;
                Ok(Stmt::Continue { line })
            }
            "break" => {
                self.expect(TokenKind::BlockEnd)?;
                Ok(Stmt::Break { line })
            }
            name if UNSUPPORTED_TAGS.contains(&name) => Err(Error::UnsupportedConstruct {
                kind: "statement",
                name: name.to_string(),
                line,
            }),
            name if name.starts_with("end") || name == "else" || name == "elif" => {
                Err(self.error_at(format!("unexpected `{name}`"), span))
            }
            name => Err(self.error_at(format!("unknown tag `{name}`"), span)),
        }
    }

    fn parse_if(&mut self, line: u32) -> Result<Stmt> {
        let test = self.parse_or()?;
        self.expect(TokenKind::BlockEnd)?;
        let (body, end) = self.parse_body(&["elif", "else", "endif"])?;

        let else_body = match end.as_deref() {
            Some("elif") => {
                let line = self.line();
                self.enter_recursion()?;
                let nested = self.parse_if(line);
                self.exit_recursion();
                Some(vec![nested?])
            }
            Some("else") => {
                self.expect(TokenKind::BlockEnd)?;
                let (else_body, _) = self.parse_body(&["endif"])?;
                self.expect(TokenKind::BlockEnd)?;
                Some(else_body)
            }
            _ => {
                self.expect(TokenKind::BlockEnd)?;
                None
            }
        };

        Ok(Stmt::If {
            test,
            body,
            else_body,
            line,
        })
    }

    fn parse_for(&mut self, line: u32) -> Result<Stmt> {
        let target = self.parse_target()?;
        self.expect_keyword("in")?;
        let iter = self.parse_or()?;
        let filter = if self.eat_keyword("if") {
            Some(self.parse_or()?)
        } else {
            None
        };
        let recursive = self.eat_keyword("recursive");
        self.expect(TokenKind::BlockEnd)?;

        let (body, end) = self.parse_body(&["else", "endfor"])?;
        let else_body = if end.as_deref() == Some("else") {
            self.expect(TokenKind::BlockEnd)?;
            let (else_body, _) = self.parse_body(&["endfor"])?;
            Some(else_body)
        } else {
            None
        };
        self.expect(TokenKind::BlockEnd)?;

        Ok(Stmt::For {
            target,
            iter,
            filter,
            body,
            else_body,
            recursive,
            line,
        })
    }

    /// `name`, `a, b` or `(a, b)`.
    fn parse_target(&mut self) -> Result<Target> {
        let parenthesised = self.eat(TokenKind::LParen);
        let mut names = vec![self.parse_target_name()?];
        while self.eat(TokenKind::Comma) {
            if !self.currently_is(TokenKind::Name) || self.at_keyword("in") {
                break;
            }
            names.push(self.parse_target_name()?);
        }
        if parenthesised {
            self.expect(TokenKind::RParen)?;
        }

        if names.len() == 1 && !parenthesised {
            return Ok(Target::Name(names.remove(0)));
        }
        Ok(Target::Tuple(names))
    }

    fn parse_target_name(&mut self) -> Result<String> {
        let line = self.line();
        let name = self.expect_ident()?;
        if self.currently_is(TokenKind::Dot) {
            self.bump();
            let attr = self.expect_ident()?;
            return Err(Error::UnsupportedConstruct {
                kind: "assignment target",
                name: format!("{name}.{attr}"),
                line,
            });
        }
        Ok(name)
    }

    fn parse_set(&mut self, line: u32) -> Result<Stmt> {
        let target = self.parse_target()?;

        if self.eat(TokenKind::Assign) {
            let value = self.parse_tuple()?;
            self.expect(TokenKind::BlockEnd)?;
            return Ok(Stmt::Assign {
                target,
                value,
                line,
            });
        }

        let Target::Name(name) = target else {
            return Err(self.unexpected("`=`"));
        };
        if self.currently_is(TokenKind::Pipe) {
            return Err(Error::UnsupportedConstruct {
                kind: "statement",
                name: "filtered set block".to_string(),
                line,
            });
        }
        self.expect(TokenKind::BlockEnd)?;
        let (body, _) = self.parse_body(&["endset"])?;
        self.expect(TokenKind::BlockEnd)?;
        Ok(Stmt::AssignBlock { name, body, line })
    }

    fn parse_macro(&mut self, line: u32) -> Result<Stmt> {
        let name = self.expect_ident()?;
        let params = self.parse_signature()?;
        self.expect(TokenKind::BlockEnd)?;
        let (body, _) = self.parse_body(&["endmacro"])?;
        self.expect(TokenKind::BlockEnd)?;
        Ok(Stmt::Macro {
            name,
            params,
            body,
            line,
        })
    }

    /// `(a, b, c=default)`
    fn parse_signature(&mut self) -> Result<Params> {
        let mut params = Params::default();
        self.expect(TokenKind::LParen)?;
        while !self.currently_is(TokenKind::RParen) {
            if !params.names.is_empty() {
                self.expect(TokenKind::Comma)?;
                if self.currently_is(TokenKind::RParen) {
                    break;
                }
            }
            let span = self.current_span();
            let name = self.expect_ident()?;
            if self.eat(TokenKind::Assign) {
                params.defaults.push(self.parse_expression()?);
            } else if !params.defaults.is_empty() {
                return Err(self.error_at("non-default argument follows default argument", span));
            }
            params.names.push(name);
        }
        self.expect(TokenKind::RParen)?;
        Ok(params)
    }

    fn parse_call_block(&mut self, line: u32) -> Result<Stmt> {
        let params = if self.currently_is(TokenKind::LParen) {
            self.parse_signature()?
        } else {
            Params::default()
        };
        let span = self.current_span();
        let call = self.parse_expression()?;
        if !matches!(call, Expr::Call { .. }) {
            return Err(self.error_at("expected a call", span));
        }
        self.expect(TokenKind::BlockEnd)?;
        let (body, _) = self.parse_body(&["endcall"])?;
        self.expect(TokenKind::BlockEnd)?;
        Ok(Stmt::CallBlock {
            call,
            params,
            body,
            line,
        })
    }

    fn parse_import(&mut self, line: u32) -> Result<Stmt> {
        let template = self.parse_expression()?;
        self.expect_keyword("as")?;
        let alias = self.expect_ident()?;
        let with_context = self.parse_context_modifier(false);
        self.expect(TokenKind::BlockEnd)?;
        Ok(Stmt::Import {
            template,
            alias,
            with_context,
            line,
        })
    }

    fn parse_from_import(&mut self, line: u32) -> Result<Stmt> {
        let template = self.parse_expression()?;
        self.expect_keyword("import")?;

        let mut names = Vec::new();
        loop {
            if self.at_context_modifier() {
                break;
            }
            let name = self.expect_ident()?;
            let alias = if self.eat_keyword("as") {
                Some(self.expect_ident()?)
            } else {
                None
            };
            names.push((name, alias));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        if names.is_empty() {
            return Err(self.unexpected("a name to import"));
        }

        let with_context = self.parse_context_modifier(false);
        self.expect(TokenKind::BlockEnd)?;
        Ok(Stmt::FromImport {
            template,
            names,
            with_context,
            line,
        })
    }

    fn parse_include(&mut self, line: u32) -> Result<Stmt> {
        let template = self.parse_expression()?;
        let ignore_missing = self.at_keyword("ignore") && self.nth_text(1) == "missing";
        if ignore_missing {
            self.pos += 2;
        }
        let with_context = self.parse_context_modifier(true);
        self.expect(TokenKind::BlockEnd)?;
        Ok(Stmt::Include {
            template,
            ignore_missing,
            with_context,
            line,
        })
    }

    fn at_context_modifier(&self) -> bool {
        (self.at_keyword("with") || self.at_keyword("without"))
            && self.nth(1) == Some(TokenKind::Name)
            && self.nth_text(1) == "context"
    }

    fn parse_context_modifier(&mut self, default: bool) -> bool {
        if !self.at_context_modifier() {
            return default;
        }
        let with = self.at_keyword("with");
        self.pos += 2;
        with
    }

    fn parse_block(&mut self, line: u32) -> Result<Stmt> {
        let name = self.expect_ident()?;
        let mut scoped = false;
        loop {
            if self.eat_keyword("scoped") {
                scoped = true;
            } else if !self.eat_keyword("required") {
                break;
            }
        }
        self.expect(TokenKind::BlockEnd)?;
        let (body, _) = self.parse_body(&["endblock"])?;

        if self.currently_is(TokenKind::Name) {
            let span = self.current_span();
            let closing = self.expect_ident()?;
            if closing != name {
                let message = format!("`endblock {closing}` closes block `{name}`");
                return Err(self.error_at(message, span));
            }
        }
        self.expect(TokenKind::BlockEnd)?;
        Ok(Stmt::Block {
            name,
            body,
            scoped,
            line,
        })
    }

    fn parse_with(&mut self, line: u32) -> Result<Stmt> {
        let mut targets = Vec::new();
        while !self.currently_is(TokenKind::BlockEnd) {
            if !targets.is_empty() {
                self.expect(TokenKind::Comma)?;
            }
            let name = self.expect_ident()?;
            self.expect(TokenKind::Assign)?;
            targets.push((name, self.parse_expression()?));
        }
        self.expect(TokenKind::BlockEnd)?;
        let (body, _) = self.parse_body(&["endwith"])?;
        self.expect(TokenKind::BlockEnd)?;
        Ok(Stmt::With {
            targets,
            body,
            line,
        })
    }
}

fn flush_output(body: &mut Vec<Stmt>, output: &mut Vec<Expr>, line: u32) {
    if output.is_empty() {
        return;
    }
    body.push(Stmt::Output {
        nodes: std::mem::take(output),
        line,
    });
}
