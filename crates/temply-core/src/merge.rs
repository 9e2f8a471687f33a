//! The merge lattice.
//!
//! Combines two observations of the same value into one shape. Rules, in
//! priority order:
//! - Unknown ∪ x → x
//! - scalar ∪ scalar → the more specific kind, if one is a subtype of the other
//! - map ∪ map → map of merged items; map ∪ dictionary → the dictionary, every
//!   entry checked as undefined
//! - anyOf ∪ anyOf → deduplicated union; anyOf ∪ x → x merged into every
//!   member, a conflict if any member rejects it (unchanged if every member
//!   already subsumes x)
//! - dictionary ∪ dictionary → key union, shared keys merged
//! - list ∪ list → list of merged items
//! - tuple ∪ tuple of equal arity → positional merge
//! - anything else → [`MergeConflict`]

use indexmap::IndexMap;
use thiserror::Error;

use crate::schema::canonical_key;
use crate::variable::{Meta, Shape, Variable};

/// Two shapes for the same value cannot be reconciled.
#[derive(Clone, Debug, Error)]
#[error("cannot merge {left} ({}) with {right} ({})", lines(.left), lines(.right))]
pub struct MergeConflict {
    pub left: Box<Variable>,
    pub right: Box<Variable>,
}

impl MergeConflict {
    fn new(left: &Variable, right: &Variable) -> Self {
        Self {
            left: Box::new(left.clone()),
            right: Box::new(right.clone()),
        }
    }

    /// First source line either side was seen on.
    pub fn line(&self) -> Option<u32> {
        let left = self.left.meta.linenos.first();
        let right = self.right.meta.linenos.first();
        match (left, right) {
            (Some(l), Some(r)) => Some(*l.min(r)),
            (l, r) => l.or(r).copied(),
        }
    }
}

fn lines(var: &Variable) -> String {
    match var.meta.linenos.as_slice() {
        [] => "no source line".to_string(),
        [line] => format!("line {line}"),
        many => {
            let joined: Vec<String> = many.iter().map(u32::to_string).collect();
            format!("lines {}", joined.join(", "))
        }
    }
}

/// Post-processing hook applied to every merge result, after the default
/// metadata combination. Receives `(left, right, result)`.
pub type Combiner = fn(&Variable, &Variable, &mut Variable);

/// A value checked as defined on the left stays checked as defined.
pub fn checked(left: &Variable, _right: &Variable, result: &mut Variable) {
    if left.meta.checked_as_defined {
        result.meta.checked_as_defined = true;
    }
}

/// Definedness for boolean expressions and branches: the left operand decides
/// `checked_as_defined`; `checked_as_undefined` needs both sides.
pub fn definedness(left: &Variable, right: &Variable, result: &mut Variable) {
    result.meta.checked_as_defined = left.meta.checked_as_defined;
    result.meta.checked_as_undefined =
        left.meta.checked_as_undefined && right.meta.checked_as_undefined;
}

pub fn merge(left: &Variable, right: &Variable) -> Result<Variable, MergeConflict> {
    merge_with(left, right, None)
}

/// Merge with an optional combiner. The combiner is passed down into
/// dictionary entries, union members and map items, but not into list or
/// tuple items.
pub fn merge_with(
    left: &Variable,
    right: &Variable,
    combiner: Option<Combiner>,
) -> Result<Variable, MergeConflict> {
    let shape = match (&left.shape, &right.shape) {
        (Shape::Unknown, other) | (other, Shape::Unknown) => other.clone(),

        (Shape::Scalar(a), Shape::Scalar(b)) => {
            if a.is_subtype_of(*b) {
                Shape::Scalar(*a)
            } else if b.is_subtype_of(*a) {
                Shape::Scalar(*b)
            } else {
                return Err(MergeConflict::new(left, right));
            }
        }

        (Shape::AdditionalProperties(a), Shape::AdditionalProperties(b)) => {
            Shape::AdditionalProperties(Box::new(merge_with(a, b, combiner)?))
        }
        (Shape::AdditionalProperties(_), Shape::Dictionary(entries)) => {
            let mut entries = entries.clone();
            for value in entries.values_mut() {
                value.meta.checked_as_undefined = true;
            }
            Shape::Dictionary(entries)
        }

        (Shape::AnyOf(a), Shape::AnyOf(b)) => {
            let members = a.iter().chain(b.iter()).cloned().collect();
            Shape::AnyOf(dedupe_members(members))
        }
        (Shape::AnyOf(members), _) => merge_into_members(members, left, right, combiner)?,
        (_, Shape::AnyOf(_)) | (_, Shape::AdditionalProperties(_)) => {
            return merge_with(right, left, combiner);
        }

        (Shape::Dictionary(a), Shape::Dictionary(b)) => {
            Shape::Dictionary(merge_entries(a, b, combiner)?)
        }

        (Shape::List(a), Shape::List(b)) => Shape::List(Box::new(merge(a, b)?)),

        (Shape::Tuple(a), Shape::Tuple(b)) if a.len() == b.len() => {
            let items = a
                .iter()
                .zip(b)
                .map(|(x, y)| merge(x, y))
                .collect::<Result<_, _>>()?;
            Shape::Tuple(items)
        }

        _ => return Err(MergeConflict::new(left, right)),
    };

    let mut result = Variable {
        shape,
        meta: combine_meta(&left.meta, &right.meta),
    };
    if let Some(combiner) = combiner {
        combiner(left, right, &mut result);
    }
    Ok(result)
}

/// Fold a sequence of shapes, starting from Unknown.
pub fn merge_all<'a>(
    vars: impl IntoIterator<Item = &'a Variable>,
) -> Result<Variable, MergeConflict> {
    vars.into_iter()
        .try_fold(Variable::unknown(), |acc, var| merge(&acc, var))
}

/// Reconcile the value shapes of two operands.
///
/// Additive operators (`+`, `-`) only combine operands of related kinds: the
/// same scalar kind up to subtyping, the same container kind, or Unknown.
pub fn merge_rtypes(
    left: &Variable,
    right: &Variable,
    additive: bool,
) -> Result<Variable, MergeConflict> {
    if additive && !related(left, right) {
        return Err(MergeConflict::new(left, right));
    }
    merge(left, right)
}

fn related(left: &Variable, right: &Variable) -> bool {
    match (&left.shape, &right.shape) {
        (Shape::Unknown, _) | (_, Shape::Unknown) => true,
        (Shape::Scalar(a), Shape::Scalar(b)) => a.is_subtype_of(*b) || b.is_subtype_of(*a),
        (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
    }
}

/// Merge the requirements of two exclusive branches (`if`/`else`).
///
/// Top-level keys are unioned. Below the top level, shapes that disagree are
/// kept side by side as an AnyOf instead of failing: dictionaries with the
/// same key set merge entry by entry, other dictionaries and conflicting
/// kinds become alternatives.
pub fn merge_branches(left: &Variable, right: &Variable) -> Result<Variable, MergeConflict> {
    match (&left.shape, &right.shape) {
        (Shape::Dictionary(a), Shape::Dictionary(b)) => {
            let mut entries = IndexMap::with_capacity(a.len().max(b.len()));
            for (key, value) in a {
                let value = match b.get(key) {
                    Some(other) => merge_alternatives(value, other)?,
                    None => value.clone(),
                };
                entries.insert(key.clone(), value);
            }
            for (key, value) in b {
                if !a.contains_key(key) {
                    entries.insert(key.clone(), value.clone());
                }
            }
            Ok(Variable {
                shape: Shape::Dictionary(entries),
                meta: combine_meta(&left.meta, &right.meta),
            })
        }
        _ => merge_alternatives(left, right),
    }
}

fn merge_alternatives(left: &Variable, right: &Variable) -> Result<Variable, MergeConflict> {
    match (&left.shape, &right.shape) {
        (Shape::Unknown, _) | (_, Shape::Unknown) => merge(left, right),
        (Shape::Dictionary(a), Shape::Dictionary(b)) => {
            if a.len() != b.len() || a.keys().any(|k| !b.contains_key(k)) {
                return Ok(alternatives(left, right));
            }
            let mut entries = IndexMap::with_capacity(a.len());
            for (key, value) in a {
                let other = &b[key];
                entries.insert(key.clone(), merge_alternatives(value, other)?);
            }
            Ok(Variable {
                shape: Shape::Dictionary(entries),
                meta: combine_meta(&left.meta, &right.meta),
            })
        }
        _ => Ok(merge(left, right).unwrap_or_else(|_| alternatives(left, right))),
    }
}

/// Keep both shapes as members of one AnyOf.
pub fn alternatives(left: &Variable, right: &Variable) -> Variable {
    let mut members = Vec::new();
    for side in [left, right] {
        match &side.shape {
            Shape::AnyOf(inner) => members.extend(inner.iter().cloned()),
            _ => members.push(side.clone()),
        }
    }
    let mut result = Variable::any_of(members);
    result.meta = combine_meta(&left.meta, &right.meta);
    result
}

/// Structural equality: same canonical schema.
pub fn same_structure(left: &Variable, right: &Variable) -> bool {
    canonical_key(left) == canonical_key(right)
}

/// Drop members whose canonical key was already seen, then sort by key.
pub fn dedupe_members(members: Vec<Variable>) -> Vec<Variable> {
    let mut keyed: IndexMap<String, Variable> = IndexMap::new();
    for member in members {
        keyed.entry(canonical_key(&member)).or_insert(member);
    }
    keyed.sort_keys();
    keyed.into_values().collect()
}

fn merge_into_members(
    members: &[Variable],
    union: &Variable,
    other: &Variable,
    combiner: Option<Combiner>,
) -> Result<Shape, MergeConflict> {
    let mut merged = Vec::with_capacity(members.len());
    let mut subsumed = true;
    for member in members {
        let result = merge_with(member, other, combiner)?;
        subsumed &= same_structure(&result, member);
        merged.push(result);
    }

    if subsumed {
        return Ok(union.shape.clone());
    }

    let mut merged = dedupe_members(merged);
    if merged.len() == 1 {
        return Ok(merged.remove(0).shape);
    }
    Ok(Shape::AnyOf(merged))
}

fn merge_entries(
    left: &IndexMap<String, Variable>,
    right: &IndexMap<String, Variable>,
    combiner: Option<Combiner>,
) -> Result<IndexMap<String, Variable>, MergeConflict> {
    let mut entries = IndexMap::with_capacity(left.len().max(right.len()));
    for (key, value) in left {
        let value = match right.get(key) {
            Some(other) => merge_with(value, other, combiner)?,
            None => value.clone(),
        };
        entries.insert(key.clone(), value);
    }
    for (key, value) in right {
        if !left.contains_key(key) {
            entries.insert(key.clone(), value.clone());
        }
    }
    Ok(entries)
}

fn combine_meta(left: &Meta, right: &Meta) -> Meta {
    let mut linenos = left.linenos.clone();
    linenos.extend_from_slice(&right.linenos);
    linenos.sort_unstable();
    linenos.dedup();

    let label = left
        .label
        .clone()
        .filter(|l| !l.is_empty())
        .or_else(|| right.label.clone().filter(|l| !l.is_empty()));

    Meta {
        label,
        linenos,
        constant: left.constant,
        may_be_defined: left.may_be_defined,
        used_with_default: left.used_with_default && right.used_with_default,
        checked_as_defined: left.checked_as_defined && right.checked_as_defined,
        checked_as_undefined: left.checked_as_undefined && right.checked_as_undefined,
        value: if left.value == right.value {
            left.value.clone()
        } else {
            None
        },
        order_nr: left.order_nr,
    }
}
