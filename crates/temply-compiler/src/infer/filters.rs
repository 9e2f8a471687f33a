//! Filters and tests.
//!
//! A filter decides what it predicts for its input and what a bare name at
//! the bottom of that input reports as its value. Filter arguments only
//! contribute their own requirements.

use temply_core::{ScalarKind, Shape, Variable, merge};

use super::calls::pair_value;
use super::context::{Context, Scope};
use crate::parser::{Args, Expr};
use crate::{Error, Result};

const STRING_FILTERS: &[&str] = &[
    "capitalize",
    "center",
    "e",
    "escape",
    "forceescape",
    "format",
    "indent",
    "lower",
    "replace",
    "safe",
    "string",
    "striptags",
    "title",
    "trim",
    "truncate",
    "upper",
    "urlencode",
    "urlize",
    "wordwrap",
];

const ITEM_FILTERS: &[&str] = &["first", "last", "sum", "min", "max", "random"];

const LIST_FILTERS: &[&str] = &[
    "batch",
    "groupby",
    "list",
    "map",
    "reject",
    "rejectattr",
    "reverse",
    "select",
    "selectattr",
    "slice",
    "sort",
    "unique",
];

impl Context<'_> {
    fn is_string_filter(&self, name: &str) -> bool {
        STRING_FILTERS.contains(&name)
            || name.starts_with("escape_")
            || self.engine.config().is_string_filter(name)
    }

    pub(super) fn visit_filter(
        &self,
        scope: &mut Scope,
        node: &Expr,
        name: &str,
        args: &Args,
        line: u32,
    ) -> Result<(Variable, Variable)> {
        let attribute = args.kwarg("attribute").and_then(Expr::as_str);
        let scalar = Variable::scalar(ScalarKind::Scalar);

        let (predicted, returns) = match name {
            n if self.is_string_filter(n) => {
                self.expect(&scalar, line)?;
                (Variable::string(), Some(Variable::string()))
            }
            "abs" | "round" => {
                self.expect(&Variable::number(), line)?;
                (Variable::number(), Some(Variable::number()))
            }
            "int" => {
                self.expect(&Variable::integer(), line)?;
                (scalar, Some(Variable::integer()))
            }
            "float" => {
                self.expect(&Variable::number(), line)?;
                (scalar, Some(Variable::number()))
            }
            "filesizeformat" => {
                self.expect(&Variable::string(), line)?;
                (Variable::number(), Some(Variable::string()))
            }
            "wordcount" => {
                self.expect(&Variable::integer(), line)?;
                (Variable::string(), Some(Variable::integer()))
            }
            "length" | "count" => {
                self.expect(&Variable::integer(), line)?;
                (Variable::list(Variable::unknown()), Some(Variable::integer()))
            }
            n if ITEM_FILTERS.contains(&n) => {
                let item = match attribute {
                    Some(attr) => Variable::dictionary_of([(attr, Variable::number())]),
                    None => self.predicted.clone(),
                };
                (Variable::list(item), None)
            }
            "join" => {
                self.expect(&Variable::string(), line)?;
                let item = match attribute {
                    Some(attr) => Variable::dictionary_of([(attr, Variable::string())]),
                    None => Variable::string(),
                };
                (Variable::list(item), Some(Variable::string()))
            }
            "dictsort" => {
                self.expect(&Variable::list(Variable::unknown()), line)?;
                (Variable::dictionary(), None)
            }
            "items" => {
                self.expect(&Variable::list(Variable::unknown()), line)?;
                (Variable::additional_properties(pair_value(&self.predicted)), None)
            }
            n if LIST_FILTERS.contains(&n) => (self.list_filter(scope, n, args, line)?, None),
            "default" | "d" => {
                let mut predicted = self.predicted.clone();
                predicted.meta.used_with_default = true;
                (predicted, None)
            }
            "tojson" | "pprint" => {
                self.expect(&Variable::string(), line)?;
                (Variable::unknown(), Some(Variable::string()))
            }
            "attr" => {
                let Some(attr) = args.args.first().and_then(Expr::as_str) else {
                    return Err(Error::InvalidExpression {
                        message: "attr() needs a constant attribute name".to_string(),
                        line,
                    });
                };
                (Variable::dictionary_of([(attr, self.entry(attr, line))]), None)
            }
            "xmlattr" => {
                self.expect(&Variable::string(), line)?;
                (Variable::dictionary(), Some(Variable::string()))
            }
            _ => {
                return Err(Error::UnsupportedConstruct {
                    kind: "filter",
                    name: name.to_string(),
                    line,
                });
            }
        };

        let mut input = self.with_predicted(predicted.at_line(line));
        if let Some(returns) = returns {
            input = input.with_returns(returns);
        }
        let (rtype, requirements) = input.visit_expr(scope, node)?;
        let arg_requirements = self.argument_requirements(scope, args, Variable::unknown())?;
        Ok((rtype, merge(&requirements, &arg_requirements)?))
    }

    /// Input prediction of a filter that maps a list to a list.
    fn list_filter(&self, scope: &mut Scope, name: &str, args: &Args, line: u32) -> Result<Variable> {
        // Rendering a list is fine; only the element shape is constrained.
        let outer = match self.predicted.shape {
            Shape::Scalar(_) => Variable::unknown(),
            _ => self.predicted.clone(),
        };
        self.with_predicted(outer.clone())
            .expect(&Variable::list(Variable::unknown()), line)?;

        let attribute = args.kwarg("attribute").and_then(Expr::as_str);
        let first_arg = args.args.first().and_then(Expr::as_str);
        let predicted = match name {
            "map" => match attribute {
                Some(attr) => Variable::list(Variable::dictionary_of([(
                    attr,
                    outer.list_item().with_label(attr),
                )])),
                None => Variable::list(Variable::unknown()),
            },
            "groupby" => match first_arg.or(attribute) {
                Some(attr) => Variable::list(Variable::dictionary_of([(attr, Variable::unknown())])),
                None => Variable::list(Variable::unknown()),
            },
            "batch" | "slice" => match outer.list_item().shape {
                Shape::List(item) => Variable::list(*item),
                _ => Variable::list(Variable::unknown()),
            },
            "selectattr" | "rejectattr" => {
                let item = match first_arg {
                    Some(attr) => {
                        let value = self.narrowed_value(scope, name, args)?;
                        Variable::dictionary_of([(attr, value.with_label(attr))])
                    }
                    None => Variable::unknown(),
                };
                merge(&Variable::list(item), &outer)?
            }
            _ => {
                let item = match attribute {
                    Some(attr) if matches!(name, "sort" | "unique") => {
                        Variable::dictionary_of([(attr, Variable::unknown())])
                    }
                    _ => Variable::unknown(),
                };
                merge(&Variable::list(item), &outer)?
            }
        };
        Ok(predicted)
    }

    /// `selectattr('a', 'eq', value)` pins the attribute to the value's kind.
    fn narrowed_value(&self, scope: &mut Scope, name: &str, args: &Args) -> Result<Variable> {
        let test = args.args.get(1).and_then(Expr::as_str);
        match (name, test, args.args.get(2)) {
            ("selectattr", Some("eq" | "==" | "equalto"), Some(value)) => {
                let (rtype, _) = self.fresh(Variable::unknown()).visit_expr(scope, value)?;
                Ok(rtype.skeleton())
            }
            _ => Ok(Variable::unknown()),
        }
    }

    pub(super) fn visit_test(
        &self,
        scope: &mut Scope,
        node: &Expr,
        name: &str,
        args: &Args,
        line: u32,
    ) -> Result<(Variable, Variable)> {
        self.expect(&Variable::boolean(), line)?;

        let predicted = match name {
            "defined" => {
                let mut predicted = Variable::unknown();
                predicted.meta.checked_as_defined = true;
                predicted
            }
            "undefined" => {
                let mut predicted = Variable::unknown();
                predicted.meta.checked_as_undefined = true;
                predicted
            }
            "eq" | "equalto" | "==" | "ne" | "!=" | "sameas" => match args.args.first() {
                Some(arg) => self.fresh(Variable::unknown()).visit_expr(scope, arg)?.0.skeleton(),
                None => Variable::unknown(),
            },
            "none" | "callable" | "in" | "lt" | "le" | "gt" | "ge" | "<" | "<=" | ">" | ">="
            | "lessthan" | "greaterthan" => Variable::unknown(),
            "string" | "lower" | "upper" | "escaped" => Variable::string(),
            "number" | "float" => Variable::number(),
            "integer" | "divisibleby" | "even" | "odd" => Variable::integer(),
            "boolean" | "true" | "false" => Variable::boolean(),
            "mapping" => Variable::dictionary(),
            "iterable" | "sequence" => Variable::list(Variable::unknown()),
            _ => {
                return Err(Error::UnsupportedConstruct {
                    kind: "test",
                    name: name.to_string(),
                    line,
                });
            }
        };

        let (_, requirements) = self
            .with_predicted(predicted.at_line(line))
            .with_returns(Variable::boolean())
            .visit_expr(scope, node)?;
        let arg_requirements = self.argument_requirements(scope, args, Variable::unknown())?;
        Ok((
            Variable::boolean().at_line(line),
            merge(&requirements, &arg_requirements)?,
        ))
    }
}
