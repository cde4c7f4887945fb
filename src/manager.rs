//! The parsers manager.
//!
//! Owns the parser registry, the preset catalog and the configuration for
//! one pipeline, and exposes registration, selection and scanner construction
//! as methods. Build it once at startup, register every parser, then share it
//! (e.g. behind an `Arc`) for read-only queries.
//!
//! # Example
//!
//! ```rust,ignore
//! use parser_registry::{ParsersManager, ParserDescriptor, FormatSpecification};
//!
//! let mut manager = ParsersManager::new();
//!
//! let mut spec = FormatSpecification::new("winevtx");
//! spec.add_new_signature(b"ElfFile\x00".to_vec(), Some(0))?;
//! manager.register_parser(
//!     ParserDescriptor::new("winevtx", || Box::new(WinEvtxParser::default()))
//!         .with_format_specification(spec),
//! )?;
//!
//! let (scanner, remainder) = manager.scanner_for_filter(Some("win7,-filestat"))?;
//! let hits = scanner.scan(&data);
//! ```

use crate::config::ManagerConfig;
use crate::error::Result;
use crate::filter::{FilterResolver, ResolvedFilter};
use crate::parser::{Parser, ParserDescriptor, PluginList};
use crate::presets::{PresetCatalog, StaticPresetCatalog};
use crate::registry::ParserRegistry;
use crate::scanner::{AhoCorasickMatcher, CompiledScanner, ScannerConfig};
use crate::selector::{ParserSelector, SelectedParser, SpecificationSplit};
use crate::specification::SpecificationStore;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Name of the parser hosting the Windows Registry plugins.
pub const WINDOWS_REGISTRY_PARSER: &str = "winreg";

pub struct ParsersManager {
    registry: ParserRegistry,
    presets: Box<dyn PresetCatalog>,
    config: ManagerConfig,
}

impl Default for ParsersManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ParsersManager {
    /// Create a manager with the built-in presets and default configuration.
    pub fn new() -> Self {
        Self::with_presets(StaticPresetCatalog::builtin())
    }

    pub fn with_presets<C: PresetCatalog + 'static>(presets: C) -> Self {
        Self {
            registry: ParserRegistry::new(),
            presets: Box::new(presets),
            config: ManagerConfig::default(),
        }
    }

    /// Replace the configuration after validating it.
    pub fn with_config(mut self, config: ManagerConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    pub fn presets(&self) -> &dyn PresetCatalog {
        self.presets.as_ref()
    }

    pub fn register_parser(
        &mut self,
        descriptor: ParserDescriptor,
    ) -> Result<Arc<ParserDescriptor>> {
        self.registry.register(descriptor)
    }

    /// Register in order; earlier registrations are kept if a later one fails.
    pub fn register_parsers<I>(&mut self, descriptors: I) -> Result<()>
    where
        I: IntoIterator<Item = ParserDescriptor>,
    {
        self.registry.register_all(descriptors)?;
        info!(parsers = self.registry.len(), "parser registration complete");
        Ok(())
    }

    pub fn deregister_parser(&mut self, name: &str) -> Result<Arc<ParserDescriptor>> {
        self.registry.deregister(name)
    }

    pub fn parser(&self, name: &str) -> Option<&Arc<ParserDescriptor>> {
        self.registry.lookup(name)
    }

    fn selector(&self) -> ParserSelector<'_> {
        ParserSelector::with_config(
            &self.registry,
            self.presets.as_ref(),
            self.config.filter.clone(),
        )
    }

    /// Resolve a filter expression into include and exclude name lists.
    pub fn filter_lists_from_string(&self, expression: &str) -> ResolvedFilter {
        FilterResolver::with_config(
            &self.registry,
            self.presets.as_ref(),
            self.config.filter.clone(),
        )
        .resolve(expression)
    }

    pub fn select_parsers(&self, filter: Option<&str>) -> Vec<SelectedParser> {
        self.selector().select_parsers(filter)
    }

    pub fn select_parser_names(&self, filter: Option<&str>) -> Vec<String> {
        self.selector().select_parser_names(filter)
    }

    pub fn select_parser_instances(
        &self,
        filter: Option<&str>,
    ) -> BTreeMap<String, Box<dyn Parser>> {
        self.selector().select_parser_instances(filter)
    }

    pub fn build_specification_store(&self, filter: Option<&str>) -> Result<SpecificationSplit> {
        self.selector().build_specification_store(filter)
    }

    /// One rule per signature of the store.
    pub fn build_scanner_config(&self, store: &SpecificationStore) -> ScannerConfig {
        ScannerConfig::from_store(store)
    }

    /// Compile a store into a ready-to-query scanner using the configured
    /// scanner settings.
    pub fn build_scanner(&self, store: &SpecificationStore) -> Result<CompiledScanner> {
        let mut matcher = AhoCorasickMatcher::with_settings(self.config.scanner.clone());
        self.build_scanner_config(store).apply_to(&mut matcher)?;
        matcher.compile()
    }

    /// Select parsers, build their specification store and compile a scanner.
    ///
    /// Returns the scanner and the names of selected parsers without
    /// signatures.
    pub fn scanner_for_filter(
        &self,
        filter: Option<&str>,
    ) -> Result<(CompiledScanner, Vec<String>)> {
        let split = self.build_specification_store(filter)?;
        let scanner = self.build_scanner(&split.store)?;
        info!(
            rules = scanner.rule_count(),
            remainder = split.remainder.len(),
            "scanner ready"
        );
        Ok((scanner, split.remainder))
    }

    /// The plugin list of a named parser, `None` if the parser is not
    /// registered or manages no plugin list.
    pub fn plugin_list(&self, parser_name: &str) -> Option<&PluginList> {
        self.registry.lookup(parser_name)?.plugin_list()
    }

    /// The Windows Registry plugins, if the registry parser is registered.
    pub fn windows_registry_plugins(&self) -> Option<&PluginList> {
        self.plugin_list(WINDOWS_REGISTRY_PARSER)
    }
}
