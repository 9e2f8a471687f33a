//! Configuration for schema emission.

/// Which side of the rendering contract the schema describes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SchemaMode {
    /// What the template consumes: optional keys stay optional.
    #[default]
    Input,
    /// What a caller renders: every key is present.
    Output,
}

impl SchemaMode {
    pub fn title(self) -> &'static str {
        match self {
            SchemaMode::Input => "Input",
            SchemaMode::Output => "Output",
        }
    }
}

/// Order of keys under `properties`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PropertyOrder {
    #[default]
    Alphabetical,
    /// By first reference in the template, then by name.
    FirstSeen,
}

#[derive(Clone, Debug)]
pub struct SchemaConfig {
    pub(crate) mode: SchemaMode,
    /// Suffix definition names with `-Input`/`-Output`.
    pub(crate) tag_modes: bool,
    /// Title of the root object.
    pub(crate) title: String,
    pub(crate) property_order: PropertyOrder,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            mode: SchemaMode::default(),
            tag_modes: false,
            title: "Schema".to_string(),
            property_order: PropertyOrder::default(),
        }
    }
}

impl SchemaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, value: SchemaMode) -> Self {
        self.mode = value;
        self
    }

    pub fn tag_modes(mut self, value: bool) -> Self {
        self.tag_modes = value;
        self
    }

    pub fn title(mut self, value: impl Into<String>) -> Self {
        self.title = value.into();
        self
    }

    pub fn property_order(mut self, value: PropertyOrder) -> Self {
        self.property_order = value;
        self
    }
}
