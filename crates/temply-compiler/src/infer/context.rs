//! Propagation state for the visitors.
//!
//! [`Context`] is what flows down the tree: the shape predicted for the
//! current expression, the shape a bare name reports, and the chain of
//! templates being inferred. [`Scope`] is what flows sideways between the
//! statements of a block: registered macros and pending assignments.

use std::cell::Cell;
use std::rc::Rc;

use temply_core::merge::checked;
use temply_core::{ScalarKind, Variable, merge, merge_with};

use super::MacroTable;
use crate::engine::Engine;
use crate::parser::{Expr, Stmt, Target};
use crate::{Error, Result};

#[derive(Clone)]
pub(crate) struct Context<'e> {
    pub(crate) engine: &'e Engine,
    pub(crate) predicted: Variable,
    /// Shape reported as the value of a bare name.
    pub(crate) returns: Variable,
    chain: Rc<Vec<String>>,
    order: Rc<Cell<u32>>,
}

impl<'e> Context<'e> {
    /// Context for a template body: everything it renders is a scalar.
    pub(crate) fn root(engine: &'e Engine, chain: Vec<String>) -> Self {
        Self {
            engine,
            predicted: Variable::scalar(ScalarKind::Scalar),
            returns: Variable::unknown(),
            chain: Rc::new(chain),
            order: Rc::new(Cell::new(0)),
        }
    }

    pub(crate) fn with_predicted(&self, predicted: Variable) -> Self {
        Self {
            predicted,
            ..self.clone()
        }
    }

    pub(crate) fn with_returns(&self, returns: Variable) -> Self {
        Self {
            returns,
            ..self.clone()
        }
    }

    /// Context for an operand whose value shape matters on its own: names
    /// report Unknown rather than the enclosing filter's result.
    pub(crate) fn fresh(&self, predicted: Variable) -> Self {
        Self {
            predicted,
            returns: Variable::unknown(),
            ..self.clone()
        }
    }

    /// Prediction for a truth test: any value, and the template copes with
    /// its absence.
    pub(crate) fn truthy(&self) -> Self {
        let mut predicted = Variable::unknown();
        predicted.meta.checked_as_defined = true;
        self.with_predicted(predicted)
    }

    /// Fails unless the predicted shape accepts `actual`.
    pub(crate) fn expect(&self, actual: &Variable, line: u32) -> Result<()> {
        match merge(&self.predicted, actual) {
            Ok(_) => Ok(()),
            Err(_) => Err(Error::UnexpectedExpression {
                expected: Box::new(self.predicted.clone()),
                actual: Box::new(actual.clone()),
                line,
            }),
        }
    }

    /// Predicted shape for an entry named `label` seen on `line`.
    pub(crate) fn entry(&self, label: &str, line: u32) -> Variable {
        self.predicted
            .clone()
            .with_label(label)
            .at_line(line)
            .with_order(self.next_order())
    }

    /// Monotonic counter recording the order names are first seen in.
    pub(crate) fn next_order(&self) -> u32 {
        let order = self.order.get();
        self.order.set(order + 1);
        order
    }

    pub(crate) fn chain(&self) -> &[String] {
        &self.chain
    }

    /// Requirements of `expr`, discarding its value shape.
    pub(crate) fn requirements(&self, scope: &mut Scope, expr: &Expr) -> Result<Variable> {
        Ok(self.visit_expr(scope, expr)?.1)
    }

    /// Visits a block with its own assignments and macro registrations, then
    /// resolves the assignments against the block's requirements. Returns the
    /// requirements and the block's final scope.
    pub(crate) fn visit_fresh(&self, macros: &MacroTable, body: &[Stmt]) -> Result<(Variable, Scope)> {
        let mut scope = Scope {
            macros: macros.clone(),
            assigned: Vec::new(),
        };
        let requirements = self.visit_shared(&mut scope, body)?;
        let requirements = self.resolve_assigned(&mut scope, requirements)?;
        Ok((requirements, scope))
    }

    /// A block whose macros stay local to it.
    pub(crate) fn visit_block(&self, scope: &Scope, body: &[Stmt]) -> Result<Variable> {
        Ok(self.visit_fresh(&scope.macros, body)?.0)
    }

    /// Visits statements in the enclosing scope.
    pub(crate) fn visit_shared(&self, scope: &mut Scope, body: &[Stmt]) -> Result<Variable> {
        let mut requirements = Variable::dictionary();
        for stmt in body {
            let stmt_requirements = self.visit_stmt(scope, stmt)?;
            requirements = merge(&requirements, &stmt_requirements)?;
        }
        Ok(requirements)
    }

    /// Replaces names bound by `set` with the requirements of their values,
    /// latest assignment first.
    fn resolve_assigned(&self, scope: &mut Scope, mut requirements: Variable) -> Result<Variable> {
        let pending = scope.assigned.clone();
        for assigned in pending.iter().rev() {
            let predicted = match &assigned.target {
                Target::Name(name) => match requirements.remove(name) {
                    Some(shape) => shape,
                    None => continue,
                },
                Target::Tuple(names) => {
                    if !names.iter().any(|n| requirements.get(n).is_some()) {
                        continue;
                    }
                    let items = names
                        .iter()
                        .map(|n| requirements.remove(n).unwrap_or_default())
                        .collect();
                    Variable::tuple(items)
                }
            };

            let ctx = self.with_predicted(predicted);
            let mut resolved = Variable::unknown();
            for expr in &assigned.exprs {
                let expr_requirements = ctx.requirements(scope, expr)?;
                resolved = merge(&resolved, &expr_requirements)?;
            }
            requirements = merge_with(&requirements, &resolved, Some(checked))?;
        }
        Ok(requirements)
    }
}

/// A `set` target and every value assigned to it in the block.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Pending {
    pub(crate) target: Target,
    pub(crate) exprs: Vec<Expr>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Scope {
    pub(crate) macros: MacroTable,
    pub(crate) assigned: Vec<Pending>,
}

impl Scope {
    /// Records `target = value`; repeated assignments to one name accumulate.
    pub(crate) fn assign(&mut self, target: &Target, value: Option<&Expr>) {
        if let Target::Name(name) = target
            && let Some(pending) = self.pending_mut(name)
        {
            pending.exprs.extend(value.cloned());
            return;
        }
        self.assigned.push(Pending {
            target: target.clone(),
            exprs: value.into_iter().cloned().collect(),
        });
    }

    pub(crate) fn pending(&self, name: &str) -> Option<&Pending> {
        self.assigned
            .iter()
            .find(|p| matches!(&p.target, Target::Name(n) if n == name))
    }

    pub(crate) fn pending_mut(&mut self, name: &str) -> Option<&mut Pending> {
        self.assigned
            .iter_mut()
            .find(|p| matches!(&p.target, Target::Name(n) if n == name))
    }

    /// Takes over what a branch visited from a copy of this scope added.
    pub(crate) fn absorb(&mut self, branch: Scope) {
        self.macros.extend(&branch.macros);
        for pending in branch.assigned {
            let existing = self.assigned.iter_mut().find(|p| p.target == pending.target);
            match existing {
                Some(existing) => {
                    for expr in pending.exprs {
                        if !existing.exprs.contains(&expr) {
                            existing.exprs.push(expr);
                        }
                    }
                }
                None => self.assigned.push(pending),
            }
        }
    }
}
