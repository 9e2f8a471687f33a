//! Macro signatures and the copy-on-write macro table.

use std::collections::HashMap;
use std::rc::Rc;

use temply_core::Variable;

/// Signature of a template macro with inferred parameter shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct Macro {
    pub name: String,
    /// Parameters without defaults, in declaration order.
    pub args: Vec<(String, Variable)>,
    /// Parameters with defaults, in declaration order.
    pub kwargs: Vec<(String, Variable)>,
    /// The body reads `varargs`: extra positional arguments are accepted.
    pub catch_varargs: bool,
    /// The body reads `kwargs`: unknown keyword arguments are accepted.
    pub catch_kwargs: bool,
}

impl Macro {
    pub fn param(&self, name: &str) -> Option<&Variable> {
        self.args
            .iter()
            .chain(&self.kwargs)
            .find(|(n, _)| n == name)
            .map(|(_, shape)| shape)
    }

    /// Parameters in positional order: required first, then defaulted.
    pub fn positional(&self) -> impl Iterator<Item = &(String, Variable)> {
        self.args.iter().chain(&self.kwargs)
    }
}

#[derive(Debug, Clone)]
pub enum MacroEntry {
    Macro(Rc<Macro>),
    /// `import 'x' as ns`: the imported template's macros.
    Namespace(MacroTable),
}

/// Name → macro bindings visible in a block.
///
/// Clones share storage; [`insert`](Self::insert) copies on write, so a
/// nested block can register macros without touching its parent.
#[derive(Debug, Clone, Default)]
pub struct MacroTable {
    entries: Rc<HashMap<String, MacroEntry>>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&MacroEntry> {
        self.entries.get(name)
    }

    pub fn get_macro(&self, name: &str) -> Option<&Rc<Macro>> {
        match self.entries.get(name)? {
            MacroEntry::Macro(m) => Some(m),
            MacroEntry::Namespace(_) => None,
        }
    }

    pub fn get_namespace(&self, name: &str) -> Option<&MacroTable> {
        match self.entries.get(name)? {
            MacroEntry::Namespace(table) => Some(table),
            MacroEntry::Macro(_) => None,
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, entry: MacroEntry) {
        Rc::make_mut(&mut self.entries).insert(name.into(), entry);
    }

    /// Adds every binding of `other`, replacing same-named ones.
    pub fn extend(&mut self, other: &MacroTable) {
        if Rc::ptr_eq(&self.entries, &other.entries) || other.is_empty() {
            return;
        }
        let entries = Rc::make_mut(&mut self.entries);
        for (name, entry) in other.entries.iter() {
            entries.insert(name.clone(), entry.clone());
        }
    }

    /// Bound names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
