//! Calls: macros, builtin globals and methods on context values.

use temply_core::{Shape, Variable, merge};

use super::context::{Context, Scope};
use super::Macro;
use crate::parser::{Args, Expr};
use crate::{Error, Result};

/// String methods that return a string.
const STRING_METHODS: &[&str] = &[
    "strip",
    "lstrip",
    "rstrip",
    "upper",
    "lower",
    "title",
    "capitalize",
    "replace",
    "format",
    "center",
    "ljust",
    "rjust",
    "zfill",
];

/// String methods that return something else.
const STRING_QUERIES: &[&str] = &["startswith", "endswith", "find", "count", "isdigit"];

/// List methods; their results are not tracked.
const LIST_METHODS: &[&str] = &["append", "extend", "insert", "pop", "remove", "index"];

/// Globals whose arguments are unconstrained and whose result is opaque.
const OPAQUE_GLOBALS: &[&str] = &["lipsum", "cycler", "joiner"];

impl Context<'_> {
    pub(super) fn visit_call(
        &self,
        scope: &mut Scope,
        node: &Expr,
        args: &Args,
        line: u32,
    ) -> Result<(Variable, Variable)> {
        match node {
            Expr::Name { name, .. } => {
                if let Some(signature) = scope.macros.get_macro(name).cloned() {
                    return self.call_macro(scope, &signature, args, line);
                }
                match name.as_str() {
                    "dict" | "namespace" => self.visit_dict_call(scope, name, args, line),
                    "range" => {
                        let requirements = self.argument_requirements(scope, args, Variable::integer())?;
                        Ok((Variable::list(Variable::integer()).at_line(line), requirements))
                    }
                    "loop" => {
                        let predicted = Variable::list(Variable::unknown());
                        Ok((Variable::unknown(), self.argument_requirements(scope, args, predicted)?))
                    }
                    "caller" | "super" => Ok((
                        Variable::unknown(),
                        self.argument_requirements(scope, args, Variable::unknown())?,
                    )),
                    global if OPAQUE_GLOBALS.contains(&global) => Ok((
                        Variable::unknown(),
                        self.argument_requirements(scope, args, Variable::unknown())?,
                    )),
                    _ => Err(Error::UnsupportedConstruct {
                        kind: "function",
                        name: name.clone(),
                        line,
                    }),
                }
            }
            Expr::Getattr {
                node: receiver,
                attr,
                ..
            } => self.visit_method_call(scope, receiver, attr, args, line),
            _ => Err(Error::UnsupportedConstruct {
                kind: "call",
                name: "computed callee".to_string(),
                line,
            }),
        }
    }

    /// Requirements of every argument, each visited with `predicted`.
    pub(super) fn argument_requirements(
        &self,
        scope: &mut Scope,
        args: &Args,
        predicted: Variable,
    ) -> Result<Variable> {
        let ctx = self.fresh(predicted);
        let mut requirements = Variable::dictionary();
        for arg in args.exprs() {
            requirements = merge(&requirements, &ctx.requirements(scope, arg)?)?;
        }
        Ok(requirements)
    }

    fn visit_method_call(
        &self,
        scope: &mut Scope,
        receiver: &Expr,
        method: &str,
        args: &Args,
        line: u32,
    ) -> Result<(Variable, Variable)> {
        if let Expr::Name { name, .. } = receiver {
            if let Some(namespace) = scope.macros.get_namespace(name) {
                let Some(signature) = namespace.get_macro(method).cloned() else {
                    return Err(Error::InvalidExpression {
                        message: format!("`{name}` has no macro `{method}`"),
                        line,
                    });
                };
                return self.call_macro(scope, &signature, args, line);
            }
            match (name.as_str(), method) {
                ("self", _) => return Ok((Variable::unknown(), Variable::dictionary())),
                ("loop", "cycle") => {
                    let requirements = self.argument_requirements(scope, args, Variable::unknown())?;
                    return Ok((Variable::unknown(), requirements));
                }
                _ => {}
            }
            // `x.update(...)` on a name set in this block adds to its values.
            if method == "update"
                && let Some(pending) = scope.pending_mut(name)
            {
                pending.exprs.extend(args.args.iter().cloned());
                return self.fresh(Variable::unknown()).visit_expr(scope, receiver);
            }
        }

        let (receiver_predicted, rtype) = match method {
            "split" | "rsplit" | "splitlines" => {
                (Variable::string(), Variable::list(Variable::string()))
            }
            m if STRING_METHODS.contains(&m) => (Variable::string(), Variable::string()),
            m if STRING_QUERIES.contains(&m) => (Variable::string(), Variable::unknown()),
            "items" => {
                let value = pair_value(&self.predicted);
                let pair = Variable::tuple(vec![Variable::string(), value.clone()]);
                (
                    Variable::additional_properties(value),
                    Variable::list(pair),
                )
            }
            "keys" => (
                Variable::additional_properties(Variable::unknown()),
                Variable::list(Variable::string()),
            ),
            "values" => {
                let value = self.predicted.list_item();
                (
                    Variable::additional_properties(value.clone()),
                    Variable::list(value),
                )
            }
            "get" => {
                let mut value = self.predicted.clone().at_line(line);
                value.meta.used_with_default = true;
                let receiver = match args.args.first().and_then(Expr::as_str) {
                    Some(key) => Variable::dictionary_of([(key, value.with_label(key))]),
                    None => Variable::additional_properties(value),
                };
                (receiver, Variable::unknown())
            }
            "update" => (Variable::dictionary(), Variable::unknown()),
            m if LIST_METHODS.contains(&m) => {
                (Variable::list(Variable::unknown()), Variable::unknown())
            }
            _ => {
                return Err(Error::UnsupportedConstruct {
                    kind: "method",
                    name: method.to_string(),
                    line,
                });
            }
        };

        let arg_requirements = self.argument_requirements(scope, args, Variable::unknown())?;
        let receiver_requirements = self
            .fresh(receiver_predicted.at_line(line))
            .requirements(scope, receiver)?;
        Ok((
            rtype.at_line(line),
            merge(&receiver_requirements, &arg_requirements)?,
        ))
    }

    /// `dict(...)` and `namespace(...)`: keyword arguments become entries.
    fn visit_dict_call(
        &self,
        scope: &mut Scope,
        name: &str,
        args: &Args,
        line: u32,
    ) -> Result<(Variable, Variable)> {
        if args.args.len() > 1 {
            return Err(Error::InvalidExpression {
                message: format!("{name}() takes at most one positional argument"),
                line,
            });
        }

        let unknown = self.fresh(Variable::unknown());
        let mut requirements = Variable::dictionary();
        for base in args.args.iter().chain(args.dyn_kwargs.as_deref()) {
            let assigned = base
                .as_name()
                .and_then(|n| scope.pending(n))
                .map(|pending| pending.exprs.clone());
            let base_requirements = match assigned {
                Some(exprs) => {
                    let mut resolved = Variable::dictionary();
                    for expr in &exprs {
                        resolved = merge(&resolved, &unknown.requirements(scope, expr)?)?;
                    }
                    resolved
                }
                None => unknown.requirements(scope, base)?,
            };
            requirements = merge(&requirements, &base_requirements)?;
        }

        let entries = args.kwargs.iter().map(|k| (k.key.as_str(), &k.value));
        let (rtype, entry_requirements) = self.visit_dict_items(scope, entries, line)?;
        Ok((rtype, merge(&requirements, &entry_requirements)?))
    }

    /// Binds call arguments to macro parameters; each argument is revisited
    /// expecting its value merged with the parameter's shape.
    fn call_macro(
        &self,
        scope: &mut Scope,
        signature: &Macro,
        args: &Args,
        line: u32,
    ) -> Result<(Variable, Variable)> {
        let invalid = |message: String| Error::InvalidExpression { message, line };
        let name = &signature.name;

        let mut bound: Vec<(&Expr, Option<&Variable>)> = Vec::new();
        let mut filled: Vec<&str> = Vec::new();
        let mut positional = signature.positional();
        for arg in &args.args {
            match positional.next() {
                Some((param, shape)) => {
                    filled.push(param);
                    bound.push((arg, Some(shape)));
                }
                None if signature.catch_varargs => bound.push((arg, None)),
                None => {
                    return Err(invalid(format!(
                        "too many positional arguments for macro `{name}`"
                    )));
                }
            }
        }
        for kwarg in &args.kwargs {
            if filled.contains(&kwarg.key.as_str()) {
                return Err(invalid(format!(
                    "macro `{name}` got multiple values for `{}`",
                    kwarg.key
                )));
            }
            match signature.param(&kwarg.key) {
                Some(shape) => {
                    filled.push(&kwarg.key);
                    bound.push((&kwarg.value, Some(shape)));
                }
                None if signature.catch_kwargs => bound.push((&kwarg.value, None)),
                None => {
                    return Err(invalid(format!(
                        "macro `{name}` has no parameter `{}`",
                        kwarg.key
                    )));
                }
            }
        }
        if args.dyn_args.is_none()
            && args.dyn_kwargs.is_none()
            && let Some((missing, _)) = signature
                .args
                .iter()
                .find(|(param, _)| !filled.contains(&param.as_str()))
        {
            return Err(invalid(format!(
                "missing argument `{missing}` for macro `{name}`"
            )));
        }

        let unknown = self.fresh(Variable::unknown());
        let mut requirements = Variable::dictionary();
        for (arg, shape) in bound {
            let (rtype, _) = unknown.visit_expr(scope, arg)?;
            let expected = match shape {
                Some(shape) => merge(&rtype, shape)?,
                None => rtype,
            };
            let arg_requirements = self
                .fresh(Variable::new(expected.shape))
                .requirements(scope, arg)?;
            requirements = merge(&requirements, &arg_requirements)?;
        }
        if let Some(dyn_args) = &args.dyn_args {
            let predicted = Variable::list(Variable::unknown());
            requirements = merge(&requirements, &self.fresh(predicted).requirements(scope, dyn_args)?)?;
        }
        if let Some(dyn_kwargs) = &args.dyn_kwargs {
            let predicted = Variable::additional_properties(Variable::unknown());
            requirements = merge(&requirements, &self.fresh(predicted).requirements(scope, dyn_kwargs)?)?;
        }

        tracing::trace!(name = name.as_str(), line, "matched macro call");
        Ok((Variable::unknown(), requirements))
    }
}

/// Value shape of the `(key, value)` pairs a prediction iterates over.
pub(super) fn pair_value(predicted: &Variable) -> Variable {
    match predicted.list_item().shape {
        Shape::Tuple(mut items) if items.len() == 2 => items.remove(1),
        _ => Variable::unknown(),
    }
}
