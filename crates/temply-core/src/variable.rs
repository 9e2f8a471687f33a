//! The inferred shape of a template value.
//!
//! A [`Variable`] pairs a [`Shape`] (what the value looks like) with [`Meta`]
//! (where it was seen and how its definedness was tested). Trees are plain owned
//! values: merging builds a new tree and never mutates its inputs.

use std::fmt;

use indexmap::IndexMap;

/// Leaf kinds, ordered from the generic `Scalar` to its subtypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScalarKind {
    Scalar,
    Boolean,
    Number,
    Integer,
    String,
}

impl ScalarKind {
    /// Every value of `self` is also a value of `other`.
    pub fn is_subtype_of(self, other: ScalarKind) -> bool {
        self == other
            || other == ScalarKind::Scalar
            || (self == ScalarKind::Integer && other == ScalarKind::Number)
    }

    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Scalar => "scalar",
            ScalarKind::Boolean => "boolean",
            ScalarKind::Number => "number",
            ScalarKind::Integer => "integer",
            ScalarKind::String => "string",
        }
    }

    /// JSON-Schema `type` keyword. Generic scalars render as strings.
    pub fn json_type(self) -> &'static str {
        match self {
            ScalarKind::Scalar | ScalarKind::String => "string",
            ScalarKind::Boolean => "boolean",
            ScalarKind::Number => "number",
            ScalarKind::Integer => "integer",
        }
    }
}

/// A literal observed in template source.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    String(String),
    Boolean(bool),
    Integer(i64),
    Number(f64),
    None,
}

impl Literal {
    /// Scalar kind of the literal; `none` carries no kind.
    pub fn kind(&self) -> Option<ScalarKind> {
        match self {
            Literal::String(_) => Some(ScalarKind::String),
            Literal::Boolean(_) => Some(ScalarKind::Boolean),
            Literal::Integer(_) => Some(ScalarKind::Integer),
            Literal::Number(_) => Some(ScalarKind::Number),
            Literal::None => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "{s:?}"),
            Literal::Boolean(b) => write!(f, "{b}"),
            Literal::Integer(n) => write!(f, "{n}"),
            Literal::Number(n) => write!(f, "{n}"),
            Literal::None => f.write_str("none"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Shape {
    /// Bottom of the lattice: nothing is known yet.
    #[default]
    Unknown,
    Scalar(ScalarKind),
    Dictionary(IndexMap<String, Variable>),
    List(Box<Variable>),
    Tuple(Vec<Variable>),
    /// Map with arbitrary keys and uniform values.
    AdditionalProperties(Box<Variable>),
    /// Alternatives, kept deduplicated and sorted by canonical key.
    AnyOf(Vec<Variable>),
}

/// Bookkeeping carried alongside every shape.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Meta {
    pub label: Option<String>,
    /// Sorted, deduplicated source lines.
    pub linenos: Vec<u32>,
    pub constant: bool,
    pub may_be_defined: bool,
    pub used_with_default: bool,
    pub checked_as_defined: bool,
    pub checked_as_undefined: bool,
    pub value: Option<Literal>,
    /// First-seen position. Merges keep the left operand's.
    pub order_nr: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Variable {
    pub shape: Shape,
    pub meta: Meta,
}

impl Variable {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            meta: Meta::default(),
        }
    }

    pub fn unknown() -> Self {
        Self::new(Shape::Unknown)
    }

    pub fn scalar(kind: ScalarKind) -> Self {
        Self::new(Shape::Scalar(kind))
    }

    pub fn string() -> Self {
        Self::scalar(ScalarKind::String)
    }

    pub fn boolean() -> Self {
        Self::scalar(ScalarKind::Boolean)
    }

    pub fn integer() -> Self {
        Self::scalar(ScalarKind::Integer)
    }

    pub fn number() -> Self {
        Self::scalar(ScalarKind::Number)
    }

    /// An empty dictionary.
    pub fn dictionary() -> Self {
        Self::new(Shape::Dictionary(IndexMap::new()))
    }

    pub fn dictionary_of<K: Into<String>>(entries: impl IntoIterator<Item = (K, Variable)>) -> Self {
        Self::new(Shape::Dictionary(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    pub fn list(item: Variable) -> Self {
        Self::new(Shape::List(Box::new(item)))
    }

    pub fn tuple(items: Vec<Variable>) -> Self {
        Self::new(Shape::Tuple(items))
    }

    pub fn additional_properties(item: Variable) -> Self {
        Self::new(Shape::AdditionalProperties(Box::new(item)))
    }

    /// Builds a union, dropping structural duplicates. A single survivor is
    /// returned as is.
    pub fn any_of(members: Vec<Variable>) -> Self {
        let mut members = crate::merge::dedupe_members(members);
        if members.len() == 1 {
            return members.remove(0);
        }
        Self::new(Shape::AnyOf(members))
    }

    /// A literal value: its scalar kind (or Unknown for `none`), marked constant.
    pub fn literal(value: Literal) -> Self {
        let mut var = match value.kind() {
            Some(kind) => Self::scalar(kind),
            None => Self::unknown(),
        };
        var.meta.constant = true;
        var.meta.value = Some(value);
        var
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.meta.label = Some(label.into());
        self
    }

    pub fn at_line(mut self, line: u32) -> Self {
        if let Err(pos) = self.meta.linenos.binary_search(&line) {
            self.meta.linenos.insert(pos, line);
        }
        self
    }

    pub fn with_order(mut self, order_nr: u32) -> Self {
        self.meta.order_nr = Some(order_nr);
        self
    }

    pub fn constant(mut self) -> Self {
        self.meta.constant = true;
        self
    }

    /// An entry is required unless something suggests the template copes with
    /// its absence.
    pub fn is_required(&self) -> bool {
        !(self.meta.may_be_defined
            || self.meta.used_with_default
            || self.meta.checked_as_defined
            || self.meta.checked_as_undefined)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self.shape, Shape::Unknown)
    }

    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self.shape {
            Shape::Scalar(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&IndexMap<String, Variable>> {
        match &self.shape {
            Shape::Dictionary(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_dictionary_mut(&mut self) -> Option<&mut IndexMap<String, Variable>> {
        match &mut self.shape {
            Shape::Dictionary(entries) => Some(entries),
            _ => None,
        }
    }

    /// Entry of a dictionary shape.
    pub fn get(&self, key: &str) -> Option<&Variable> {
        self.as_dictionary()?.get(key)
    }

    /// Removes an entry of a dictionary shape, keeping the order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<Variable> {
        self.as_dictionary_mut()?.shift_remove(key)
    }

    /// Element shape of a list, Unknown otherwise.
    pub fn list_item(&self) -> Variable {
        match &self.shape {
            Shape::List(item) => (**item).clone(),
            _ => Variable::unknown(),
        }
    }

    /// Same leaf kind with fresh metadata; containers collapse to Unknown.
    pub fn skeleton(&self) -> Variable {
        match self.shape {
            Shape::Scalar(kind) => Variable::scalar(kind),
            _ => Variable::unknown(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.shape {
            Shape::Unknown => "unknown",
            Shape::Scalar(kind) => kind.name(),
            Shape::Dictionary(_) => "dictionary",
            Shape::List(_) => "list",
            Shape::Tuple(_) => "tuple",
            Shape::AdditionalProperties(_) => "map",
            Shape::AnyOf(_) => "any of",
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.shape {
            Shape::Unknown | Shape::Scalar(_) => f.write_str(self.kind_name()),
            Shape::Dictionary(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
            Shape::List(item) => write!(f, "list[{item}]"),
            Shape::Tuple(items) => {
                f.write_str("tuple[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Shape::AdditionalProperties(item) => write!(f, "map[{item}]"),
            Shape::AnyOf(members) => {
                f.write_str("any of[")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{member}")?;
                }
                f.write_str("]")
            }
        }
    }
}
