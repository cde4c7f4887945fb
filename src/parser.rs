//! Parser descriptors.
//!
//! A [`ParserDescriptor`] is what the registry stores for each parser type:
//! its identity, whether it hosts sub-plugins, the format specification used
//! for signature scanning and a factory producing fresh parser instances.

use crate::specification::FormatSpecification;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A parser instance.
///
/// Decoding itself is the concern of the individual parser implementations;
/// the registry only needs to know what an instance calls itself.
pub trait Parser: Send {
    /// The name of the parser, matching its descriptor.
    fn name(&self) -> &str;
}

/// Factory producing a fresh parser instance.
///
/// # Example
/// ```rust,ignore
/// let factory: ParserFactoryFn = Arc::new(|| Box::new(SqliteParser::default()));
/// ```
pub type ParserFactoryFn = Arc<dyn Fn() -> Box<dyn Parser> + Send + Sync>;

/// Plugin capability of a parser type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParserKind {
    /// Handles its format directly.
    #[default]
    Plain,
    /// Delegates to named sub-plugins, in the order listed.
    PluginBearing { plugins: Vec<String> },
}

/// A plugin entry as reported by a plugin list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginEntry {
    pub name: String,
    pub description: String,
}

/// The plugins a registry-style parser manages for its artifact domain
/// (e.g. the Windows Registry key plugins).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PluginList {
    entries: Vec<PluginEntry>,
}

impl PluginList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_plugin(&mut self, name: impl Into<String>, description: impl Into<String>) {
        self.entries.push(PluginEntry {
            name: name.into(),
            description: description.into(),
        });
    }

    pub fn entries(&self) -> &[PluginEntry] {
        &self.entries
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&PluginEntry> {
        self.entries
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Registry entry describing one parser type.
///
/// # Example
/// ```rust,ignore
/// use parser_registry::{FormatSpecification, ParserDescriptor};
///
/// let mut spec = FormatSpecification::new("sqlite");
/// spec.add_new_signature(b"SQLite format 3".to_vec(), Some(0))?;
///
/// let descriptor = ParserDescriptor::new("sqlite", || Box::new(SqliteParser::default()))
///     .with_description("Parser for SQLite database files.")
///     .with_plugins(&["chrome_history", "firefox_history"])
///     .with_format_specification(spec);
/// ```
#[derive(Clone)]
pub struct ParserDescriptor {
    name: String,
    description: String,
    kind: ParserKind,
    format_specification: Option<FormatSpecification>,
    plugin_list: Option<PluginList>,
    factory: ParserFactoryFn,
}

impl ParserDescriptor {
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Parser> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: String::new(),
            kind: ParserKind::Plain,
            format_specification: None,
            plugin_list: None,
            factory: Arc::new(factory),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark the parser as plugin-bearing with the given sub-plugin names.
    pub fn with_plugins<S: AsRef<str>>(mut self, plugins: &[S]) -> Self {
        self.kind = ParserKind::PluginBearing {
            plugins: plugins.iter().map(|p| p.as_ref().to_string()).collect(),
        };
        self
    }

    pub fn with_format_specification(mut self, specification: FormatSpecification) -> Self {
        self.format_specification = Some(specification);
        self
    }

    pub fn with_plugin_list(mut self, plugin_list: PluginList) -> Self {
        self.plugin_list = Some(plugin_list);
        self
    }

    /// The name as given at construction.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The lowercase name used as the registry key.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> &ParserKind {
        &self.kind
    }

    pub fn supports_plugins(&self) -> bool {
        matches!(self.kind, ParserKind::PluginBearing { .. })
    }

    /// Sub-plugin names, empty for plain parsers.
    pub fn plugin_names(&self) -> &[String] {
        match &self.kind {
            ParserKind::PluginBearing { plugins } => plugins,
            ParserKind::Plain => &[],
        }
    }

    /// The format specification, if the parser declares at least one signature.
    pub fn format_specification(&self) -> Option<&FormatSpecification> {
        self.format_specification
            .as_ref()
            .filter(|specification| !specification.is_empty())
    }

    pub fn plugin_list(&self) -> Option<&PluginList> {
        self.plugin_list.as_ref()
    }

    /// Create a fresh parser instance.
    pub fn instantiate(&self) -> Box<dyn Parser> {
        (self.factory)()
    }
}

impl fmt::Debug for ParserDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("kind", &self.kind)
            .field("format_specification", &self.format_specification)
            .field("plugin_list", &self.plugin_list)
            .finish_non_exhaustive()
    }
}
