//! Statement visitor.
//!
//! Every handler returns the requirements of its statement as a dictionary.

use std::rc::Rc;

use temply_core::merge::definedness;
use temply_core::{ScalarKind, Variable, merge, merge_branches, merge_with};

use super::context::{Context, Scope};
use super::{Inference, Macro, MacroEntry};
use crate::parser::{Expr, Params, Stmt, Target};
use crate::{Error, Result};

/// Names every macro body can read without a caller passing them.
const MACRO_IMPLICITS: &[&str] = &["caller", "varargs", "kwargs"];

impl Context<'_> {
    pub(crate) fn visit_stmt(&self, scope: &mut Scope, stmt: &Stmt) -> Result<Variable> {
        match stmt {
            Stmt::Output { nodes, .. } => {
                let mut requirements = Variable::dictionary();
                for node in nodes {
                    let node_requirements = self.requirements(scope, node)?;
                    requirements = merge(&requirements, &node_requirements)?;
                }
                Ok(requirements)
            }
            Stmt::If {
                test,
                body,
                else_body,
                ..
            } => self.visit_if(scope, test, body, else_body.as_deref()),
            Stmt::For {
                target,
                iter,
                filter,
                body,
                else_body,
                line,
                ..
            } => self.visit_for(scope, target, iter, filter.as_ref(), body, else_body.as_deref(), *line),
            Stmt::Assign { target, value, .. } => {
                scope.assign(target, Some(value));
                Ok(Variable::dictionary())
            }
            Stmt::AssignBlock { name, body, .. } => {
                let requirements = self.visit_block(scope, body)?;
                scope.assign(&Target::Name(name.clone()), None);
                Ok(requirements)
            }
            Stmt::Macro {
                name, params, body, ..
            } => self.visit_macro(scope, name, params, body),
            Stmt::CallBlock {
                call, params, body, ..
            } => {
                let call_requirements = self.requirements(scope, call)?;
                let mut body_requirements = self.visit_block(scope, body)?;
                for name in &params.names {
                    body_requirements.remove(name);
                }
                Ok(merge(&call_requirements, &body_requirements)?)
            }
            Stmt::Import {
                template,
                alias,
                with_context,
                line,
            } => {
                let path = reference_path(template, *line)?;
                let imported = self.engine.infer_reference(path, self.chain())?;
                scope
                    .macros
                    .insert(alias.clone(), MacroEntry::Namespace(imported.macros));
                Ok(context_requirements(imported.requirements, *with_context))
            }
            Stmt::FromImport {
                template,
                names,
                with_context,
                line,
            } => {
                let path = reference_path(template, *line)?;
                let imported = self.engine.infer_reference(path, self.chain())?;
                for (name, alias) in names {
                    let Some(entry) = imported.macros.get(name) else {
                        return Err(Error::InvalidExpression {
                            message: format!("`{path}` does not define `{name}`"),
                            line: *line,
                        });
                    };
                    let bound = alias.as_ref().unwrap_or(name);
                    scope.macros.insert(bound.clone(), entry.clone());
                }
                Ok(context_requirements(imported.requirements, *with_context))
            }
            Stmt::Include {
                template,
                ignore_missing,
                with_context,
                line,
            } => {
                let path = reference_path(template, *line)?;
                match self.engine.infer_reference(path, self.chain()) {
                    Ok(Inference { requirements, .. }) => {
                        Ok(context_requirements(requirements, *with_context))
                    }
                    Err(Error::TemplateNotFound(_)) if *ignore_missing => {
                        tracing::debug!(template = path, "skipping missing include");
                        Ok(Variable::dictionary())
                    }
                    Err(err) => Err(err),
                }
            }
            Stmt::Extends { template, line } => {
                let path = reference_path(template, *line)?;
                Ok(self.engine.infer_reference(path, self.chain())?.requirements)
            }
            Stmt::Block { body, .. } => self.visit_block(scope, body),
            Stmt::With { targets, body, .. } => {
                let mut requirements = self.visit_block(scope, body)?;
                for (name, value) in targets {
                    let predicted = requirements.remove(name).unwrap_or_default();
                    let value_requirements = self.with_predicted(predicted).requirements(scope, value)?;
                    requirements = merge(&requirements, &value_requirements)?;
                }
                Ok(requirements)
            }
            Stmt::ExprStmt { expr, .. } => self
                .with_predicted(Variable::unknown())
                .requirements(scope, expr),
            Stmt::Continue { .. } | Stmt::Break { .. } => Ok(Variable::dictionary()),
        }
    }

    fn visit_if(
        &self,
        scope: &mut Scope,
        test: &Expr,
        body: &[Stmt],
        else_body: Option<&[Stmt]>,
    ) -> Result<Variable> {
        let test_requirements = self.truthy().requirements(scope, test)?;

        let mut then_scope = scope.clone();
        let then = self.visit_shared(&mut then_scope, body)?;
        let then = merge_with(&test_requirements, &then, Some(definedness))?;

        let merged = match else_body {
            Some(else_body) => {
                let mut else_scope = scope.clone();
                let otherwise = self.visit_shared(&mut else_scope, else_body)?;
                let otherwise = merge_with(&test_requirements, &otherwise, Some(definedness))?;
                scope.absorb(else_scope);
                merge_branches(&then, &otherwise)?
            }
            None => then,
        };
        scope.absorb(then_scope);

        Ok(merge_with(&test_requirements, &merged, Some(definedness))?)
    }

    #[allow(clippy::too_many_arguments)]
    fn visit_for(
        &self,
        scope: &mut Scope,
        target: &Target,
        iter: &Expr,
        filter: Option<&Expr>,
        body: &[Stmt],
        else_body: Option<&[Stmt]>,
        line: u32,
    ) -> Result<Variable> {
        let mut requirements = self.visit_block(scope, body)?;
        if let Some(filter) = filter {
            let filter_requirements = self.truthy().requirements(scope, filter)?;
            requirements = merge(&requirements, &filter_requirements)?;
        }
        requirements.remove("loop");

        let item = match target {
            Target::Name(name) => requirements.remove(name).unwrap_or_default(),
            Target::Tuple(names) => Variable::tuple(
                names
                    .iter()
                    .map(|name| requirements.remove(name).unwrap_or_default())
                    .collect(),
            ),
        };

        let predicted = Variable::list(item).at_line(line);
        let iter_requirements = self.with_predicted(predicted).requirements(scope, iter)?;
        requirements = merge(&requirements, &iter_requirements)?;

        if let Some(else_body) = else_body {
            let else_requirements = self.visit_block(scope, else_body)?;
            requirements = merge(&requirements, &else_requirements)?;
        }
        Ok(requirements)
    }

    fn visit_macro(
        &self,
        scope: &mut Scope,
        name: &str,
        params: &Params,
        body: &[Stmt],
    ) -> Result<Variable> {
        // Registered up front so the body can call itself.
        let mut body_macros = scope.macros.clone();
        body_macros.insert(name, MacroEntry::Macro(Rc::new(placeholder(name, params))));
        let (mut requirements, _) = self
            .with_predicted(Variable::scalar(ScalarKind::Scalar))
            .visit_fresh(&body_macros, body)?;

        let mut signature = Macro {
            name: name.to_string(),
            args: Vec::new(),
            kwargs: Vec::new(),
            catch_varargs: requirements.get("varargs").is_some(),
            catch_kwargs: requirements.get("kwargs").is_some(),
        };
        let mut defaults_requirements = Variable::dictionary();
        let unknown = self.fresh(Variable::unknown());

        for (param, default) in params.iter() {
            let mut shape = match default {
                Some(default) => {
                    let (rtype, default_requirements) = unknown.visit_expr(scope, default)?;
                    defaults_requirements = merge(&defaults_requirements, &default_requirements)?;
                    Variable::new(rtype.shape)
                }
                None => Variable::unknown(),
            };
            if let Some(used) = requirements.get(param) {
                shape = merge(&shape, used)?;
            }
            match default {
                Some(_) => signature.kwargs.push((param.to_string(), shape)),
                None => signature.args.push((param.to_string(), shape)),
            }
        }

        tracing::trace!(
            name,
            args = signature.args.len(),
            kwargs = signature.kwargs.len(),
            "registered macro"
        );
        scope
            .macros
            .insert(name, MacroEntry::Macro(Rc::new(signature)));

        for param in params.names.iter().map(String::as_str).chain(MACRO_IMPLICITS.iter().copied()) {
            requirements.remove(param);
        }
        Ok(merge(&requirements, &defaults_requirements)?)
    }
}

/// Signature used while the macro's own body is being visited.
fn placeholder(name: &str, params: &Params) -> Macro {
    let mut signature = Macro {
        name: name.to_string(),
        args: Vec::new(),
        kwargs: Vec::new(),
        catch_varargs: true,
        catch_kwargs: true,
    };
    for (param, default) in params.iter() {
        let entry = (param.to_string(), Variable::unknown());
        match default {
            Some(_) => signature.kwargs.push(entry),
            None => signature.args.push(entry),
        }
    }
    signature
}

/// Template references must be constant strings.
fn reference_path(template: &Expr, line: u32) -> Result<&str> {
    template.as_str().ok_or_else(|| Error::UnsupportedConstruct {
        kind: "template reference",
        name: "non-constant path".to_string(),
        line,
    })
}

fn context_requirements(requirements: Variable, with_context: bool) -> Variable {
    if with_context {
        requirements
    } else {
        Variable::dictionary()
    }
}
