//! Expression visitor.
//!
//! Every handler returns `(rtype, requirements)`: the shape of the value the
//! expression produces and what it needs from the context. The prediction in
//! [`Context`] is the shape the enclosing node wants the value to have.

use temply_core::merge::{checked, definedness};
use temply_core::{
    Literal, ScalarKind, Shape, Variable, alternatives, merge, merge_rtypes, merge_with,
};

use super::context::{Context, Scope};
use crate::parser::{BinOp, CmpOp, Expr, UnaryOp};
use crate::{Error, Result};

impl Context<'_> {
    pub(crate) fn visit_expr(&self, scope: &mut Scope, expr: &Expr) -> Result<(Variable, Variable)> {
        match expr {
            Expr::Const { value, line } => {
                if *value != Literal::None {
                    self.expect(&Variable::scalar(ScalarKind::Scalar), *line)?;
                }
                let rtype = Variable::literal(value.clone()).at_line(*line);
                Ok((rtype, Variable::dictionary()))
            }
            Expr::TemplateData { .. } => Ok((
                Variable::scalar(ScalarKind::Scalar),
                Variable::dictionary(),
            )),
            Expr::Name { name, line } => {
                let requirements = Variable::dictionary_of([(name.clone(), self.entry(name, *line))]);
                Ok((self.returns.clone().at_line(*line), requirements))
            }
            Expr::Getattr { node, attr, line } => {
                let predicted =
                    Variable::dictionary_of([(attr.clone(), self.entry(attr, *line))]).at_line(*line);
                self.with_predicted(predicted).visit_expr(scope, node)
            }
            Expr::Getitem { node, arg, line } => self.visit_getitem(scope, node, arg, *line),
            Expr::Slice {
                start, stop, step, ..
            } => {
                let bounds = self.fresh(Variable::integer());
                let mut requirements = Variable::dictionary();
                for bound in [start, stop, step].into_iter().flatten() {
                    requirements = merge(&requirements, &bounds.requirements(scope, bound)?)?;
                }
                Ok((Variable::list(Variable::unknown()), requirements))
            }
            Expr::Filter {
                node,
                name,
                args,
                line,
            } => self.visit_filter(scope, node, name, args, *line),
            Expr::Test {
                node,
                name,
                args,
                line,
                ..
            } => self.visit_test(scope, node, name, args, *line),
            Expr::Compare { expr, ops, line } => self.visit_compare(scope, expr, ops, *line),
            Expr::BinExpr {
                op,
                left,
                right,
                line,
            } => self.visit_bin_expr(scope, *op, left, right, *line),
            Expr::Concat { nodes, line } => {
                self.expect(&Variable::string(), *line)?;
                let operand = self.fresh(Variable::scalar(ScalarKind::Scalar));
                let mut requirements = Variable::dictionary();
                for node in nodes {
                    requirements = merge(&requirements, &operand.requirements(scope, node)?)?;
                }
                Ok((Variable::string().at_line(*line), requirements))
            }
            Expr::Unary { op, node, line } => match op {
                UnaryOp::Not => {
                    let requirements = self.requirements(scope, node)?;
                    Ok((Variable::boolean().at_line(*line), requirements))
                }
                UnaryOp::Neg | UnaryOp::Pos => {
                    self.expect(&Variable::number(), *line)?;
                    let requirements = self.fresh(Variable::number()).requirements(scope, node)?;
                    Ok((Variable::number().at_line(*line), requirements))
                }
            },
            Expr::CondExpr {
                test,
                expr1,
                expr2,
                ..
            } => self.visit_cond_expr(scope, test, expr1, expr2.as_deref()),
            Expr::Call { node, args, line } => self.visit_call(scope, node, args, *line),
            Expr::List { items, line } => self.visit_list(scope, items, *line),
            Expr::Tuple { items, line } => self.visit_tuple(scope, items, *line),
            Expr::Dict { items, line } => {
                let mut entries = Vec::with_capacity(items.len());
                for (key, value) in items {
                    let Some(key) = key.as_str() else {
                        return Err(Error::InvalidExpression {
                            message: "dictionary keys must be constant strings".to_string(),
                            line: key.line(),
                        });
                    };
                    entries.push((key, value));
                }
                self.visit_dict_items(scope, entries, *line)
            }
        }
    }

    fn visit_getitem(
        &self,
        scope: &mut Scope,
        node: &Expr,
        arg: &Expr,
        line: u32,
    ) -> Result<(Variable, Variable)> {
        let (predicted, key_requirements) = match arg {
            Expr::Const {
                value: Literal::String(key),
                ..
            } => (
                Variable::dictionary_of([(key.clone(), self.entry(key, line))]),
                Variable::dictionary(),
            ),
            Expr::Const {
                value: Literal::Integer(_),
                ..
            } => (
                Variable::list(self.predicted.clone().at_line(line)),
                Variable::dictionary(),
            ),
            Expr::Const { value, .. } => {
                return Err(Error::UnsupportedConstruct {
                    kind: "subscript",
                    name: value.to_string(),
                    line,
                });
            }
            Expr::Slice { .. } => {
                let predicted = match self.predicted.shape {
                    Shape::List(_) => self.predicted.clone(),
                    _ => Variable::list(Variable::unknown()),
                };
                (predicted, self.requirements(scope, arg)?)
            }
            Expr::Tuple { .. } => {
                return Err(Error::UnsupportedConstruct {
                    kind: "subscript",
                    name: "tuple".to_string(),
                    line,
                });
            }
            key => {
                let value = self.predicted.clone().at_line(line).with_order(self.next_order());
                let key_requirements = self.fresh(Variable::string()).requirements(scope, key)?;
                (Variable::additional_properties(value), key_requirements)
            }
        };

        let (rtype, requirements) = self
            .with_predicted(predicted.at_line(line))
            .visit_expr(scope, node)?;
        Ok((rtype, merge(&requirements, &key_requirements)?))
    }

    fn visit_compare(
        &self,
        scope: &mut Scope,
        expr: &Expr,
        ops: &[(CmpOp, Expr)],
        line: u32,
    ) -> Result<(Variable, Variable)> {
        self.expect(&Variable::boolean(), line)?;
        let (left_rtype, mut requirements) = self.fresh(Variable::unknown()).visit_expr(scope, expr)?;

        let mut reconciled = left_rtype.skeleton();
        let mut element = None;
        for (op, right) in ops {
            let predicted = match right {
                Expr::Name { .. } | Expr::Getattr { .. } if op.is_membership() => {
                    Variable::additional_properties(Variable::unknown())
                }
                _ => Variable::unknown(),
            };
            let (right_rtype, right_requirements) = self.fresh(predicted).visit_expr(scope, right)?;
            requirements = merge(&requirements, &right_requirements)?;
            if op.is_membership() {
                element = Some(right_rtype.list_item().skeleton());
            } else {
                reconciled = merge_rtypes(&reconciled, &right_rtype.skeleton(), false)?;
            }
        }

        let predicted = match element {
            Some(element) if !element.is_unknown() => element,
            _ => reconciled,
        };
        let revisited = self.fresh(predicted).requirements(scope, expr)?;
        Ok((
            Variable::boolean().at_line(line),
            merge(&requirements, &revisited)?,
        ))
    }

    fn visit_bin_expr(
        &self,
        scope: &mut Scope,
        op: BinOp,
        left: &Expr,
        right: &Expr,
        line: u32,
    ) -> Result<(Variable, Variable)> {
        if op.is_logical() {
            let (left_rtype, left_requirements) = self.visit_expr(scope, left)?;
            let (right_rtype, right_requirements) = self.visit_expr(scope, right)?;
            let rtype = merge_rtypes(&left_rtype, &right_rtype, false)
                .unwrap_or_else(|_| Variable::unknown());
            let requirements =
                merge_with(&left_requirements, &right_requirements, Some(definedness))?;
            return Ok((rtype.at_line(line), requirements));
        }

        let (left_rtype, _) = self.visit_expr(scope, left)?;
        let (right_rtype, _) = self.visit_expr(scope, right)?;
        let rtype = merge_rtypes(&left_rtype, &right_rtype, op.is_additive())?;

        // Both operands are revisited expecting the reconciled operand shape.
        let predicted = if rtype.is_unknown() {
            self.predicted.clone()
        } else {
            Variable::new(rtype.shape.clone())
        };
        let operand = self.with_predicted(predicted);
        let left_requirements = operand.requirements(scope, left)?;
        let right_requirements = operand.requirements(scope, right)?;
        let requirements = merge_with(&left_requirements, &right_requirements, Some(definedness))?;
        Ok((Variable::new(rtype.shape).at_line(line), requirements))
    }

    fn visit_cond_expr(
        &self,
        scope: &mut Scope,
        test: &Expr,
        expr1: &Expr,
        expr2: Option<&Expr>,
    ) -> Result<(Variable, Variable)> {
        let test_requirements = self.truthy().requirements(scope, test)?;
        let (mut rtype, then_requirements) = self.visit_expr(scope, expr1)?;
        let mut requirements = merge_with(&test_requirements, &then_requirements, Some(checked))?;

        if let Some(expr2) = expr2 {
            let (else_rtype, else_requirements) = self.visit_expr(scope, expr2)?;
            let revisited = self
                .with_predicted(Variable::new(else_rtype.shape.clone()))
                .requirements(scope, expr1)?;
            requirements = merge_with(&requirements, &revisited, Some(checked))?;
            requirements = merge(&requirements, &else_requirements)?;
            rtype = merge_rtypes(&rtype, &else_rtype, false)
                .unwrap_or_else(|_| alternatives(&rtype, &else_rtype));
        }
        Ok((rtype, requirements))
    }

    fn visit_list(&self, scope: &mut Scope, items: &[Expr], line: u32) -> Result<(Variable, Variable)> {
        self.expect(&Variable::list(Variable::unknown()), line)?;
        let element = self.fresh(self.predicted.list_item());

        let mut requirements = Variable::dictionary();
        let mut item_rtype: Option<Variable> = None;
        for item in items {
            let (rtype, item_requirements) = element.visit_expr(scope, item)?;
            requirements = merge(&requirements, &item_requirements)?;
            item_rtype = Some(match item_rtype {
                None => rtype,
                Some(prev) => {
                    merge_rtypes(&prev, &rtype, false).unwrap_or_else(|_| alternatives(&prev, &rtype))
                }
            });
        }

        let rtype = Variable::list(item_rtype.unwrap_or_default())
            .at_line(line)
            .constant();
        Ok((rtype, requirements))
    }

    fn visit_tuple(&self, scope: &mut Scope, items: &[Expr], line: u32) -> Result<(Variable, Variable)> {
        if !matches!(self.predicted.shape, Shape::List(_)) {
            self.expect(&Variable::tuple(vec![Variable::unknown(); items.len()]), line)?;
        }

        let mut requirements = Variable::dictionary();
        let mut rtypes = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let predicted = match &self.predicted.shape {
                Shape::Tuple(positions) if positions.len() == items.len() => positions[i].clone(),
                Shape::List(element) => (**element).clone(),
                _ => Variable::unknown(),
            };
            let (rtype, item_requirements) = self.fresh(predicted).visit_expr(scope, item)?;
            requirements = merge(&requirements, &item_requirements)?;
            rtypes.push(rtype);
        }
        Ok((Variable::tuple(rtypes).at_line(line).constant(), requirements))
    }

    /// Dictionary built from constant keys: each value is visited with the
    /// prediction for its key.
    pub(super) fn visit_dict_items<'a>(
        &self,
        scope: &mut Scope,
        items: impl IntoIterator<Item = (&'a str, &'a Expr)>,
        line: u32,
    ) -> Result<(Variable, Variable)> {
        self.expect(&Variable::dictionary(), line)?;

        let mut rtype = Variable::dictionary();
        let mut requirements = Variable::dictionary();
        for (key, value) in items {
            let predicted = self.predicted.get(key).cloned().unwrap_or_default();
            let (value_rtype, value_requirements) = self.fresh(predicted).visit_expr(scope, value)?;
            requirements = merge(&requirements, &value_requirements)?;
            if let Some(entries) = rtype.as_dictionary_mut() {
                entries.insert(key.to_string(), value_rtype);
            }
        }
        Ok((rtype.at_line(line).constant(), requirements))
    }
}
