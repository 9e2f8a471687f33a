//! Inference settings.

/// Default bound on parser nesting. Each level costs a dozen descent frames,
/// so this stays well inside a debug build's main-thread stack.
pub const DEFAULT_RECURSION_LIMIT: u32 = 64;

#[derive(Clone, Debug)]
pub struct InferConfig {
    /// Filters beyond the built-in table that take and return strings.
    pub(crate) string_filters: Vec<String>,
    pub(crate) recursion_limit: u32,
}

impl Default for InferConfig {
    fn default() -> Self {
        Self {
            string_filters: Vec::new(),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }
}

impl InferConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn string_filter(mut self, name: impl Into<String>) -> Self {
        self.string_filters.push(name.into());
        self
    }

    pub fn string_filters<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.string_filters.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn recursion_limit(mut self, value: u32) -> Self {
        self.recursion_limit = value;
        self
    }

    pub(crate) fn is_string_filter(&self, name: &str) -> bool {
        self.string_filters.iter().any(|f| f == name)
    }
}
