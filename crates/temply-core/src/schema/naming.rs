//! Definition names for `$defs`.

use std::collections::HashMap;

/// Outcome of claiming a definition name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) enum Claim {
    /// A structurally identical definition already owns this name.
    Existing(String),
    /// The name is free (possibly after appending a counter).
    Fresh(String),
}

/// Tracks which structure owns each definition name.
#[derive(Debug, Default)]
pub(super) struct DefinitionNames {
    owners: HashMap<String, String>,
}

impl DefinitionNames {
    /// Claim `base` for the structure identified by `key`. A counter suffix
    /// (`__2`, `__3`, ...) is added only when a different structure already
    /// owns the name.
    pub(super) fn claim(&mut self, base: &str, key: &str) -> Claim {
        if let Some(owner) = self.owners.get(base) {
            if owner == key {
                return Claim::Existing(base.to_string());
            }
        } else {
            self.owners.insert(base.to_string(), key.to_string());
            return Claim::Fresh(base.to_string());
        }

        let mut counter = 2;
        loop {
            let name = format!("{base}__{counter}");
            match self.owners.get(&name) {
                Some(owner) if owner == key => return Claim::Existing(name),
                Some(_) => counter += 1,
                None => {
                    self.owners.insert(name.clone(), key.to_string());
                    return Claim::Fresh(name);
                }
            }
        }
    }
}

/// Base definition name for a dotted path, optionally tagged with the mode.
pub(super) fn definition_name(path: &[String], root_title: &str, mode_tag: Option<&str>) -> String {
    let base = if path.is_empty() {
        root_title.to_string()
    } else {
        path.join(".")
    };
    match mode_tag {
        Some(tag) => format!("{base}-{tag}"),
        None => base,
    }
}
