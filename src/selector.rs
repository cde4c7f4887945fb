//! Parser selection.
//!
//! Combines the registry with the filter resolver to produce the set of
//! parsers a filter expression selects, and splits a selection into a
//! [`SpecificationStore`] (parsers with signatures) and a remainder list
//! (parsers that must be tried without signature scanning).

use crate::config::FilterConfig;
use crate::error::Result;
use crate::filter::FilterResolver;
use crate::parser::{Parser, ParserDescriptor};
use crate::presets::PresetCatalog;
use crate::registry::ParserRegistry;
use crate::specification::SpecificationStore;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// A selected parser.
pub type SelectedParser = (String, Arc<ParserDescriptor>);

/// Parsers with a format specification go into the store, all others into
/// the remainder list.
#[derive(Debug, Clone, Default)]
pub struct SpecificationSplit {
    pub store: SpecificationStore,
    pub remainder: Vec<String>,
}

pub struct ParserSelector<'a> {
    registry: &'a ParserRegistry,
    resolver: FilterResolver<'a>,
}

impl<'a> ParserSelector<'a> {
    pub fn new(registry: &'a ParserRegistry, catalog: &'a dyn PresetCatalog) -> Self {
        Self::with_config(registry, catalog, FilterConfig::default())
    }

    pub fn with_config(
        registry: &'a ParserRegistry,
        catalog: &'a dyn PresetCatalog,
        config: FilterConfig,
    ) -> Self {
        Self {
            registry,
            resolver: FilterResolver::with_config(registry, catalog, config),
        }
    }

    /// Select the registered parsers matching a filter expression.
    ///
    /// `None` or an empty expression selects every registered parser. The
    /// result is a snapshot sorted by name, so calling again with the same
    /// expression on an unchanged registry yields the same list.
    pub fn select_parsers(&self, filter: Option<&str>) -> Vec<SelectedParser> {
        let mut selected: Vec<SelectedParser> = match filter.filter(|f| !f.is_empty()) {
            None => self.registry.all(),
            Some(expression) => {
                let resolved = self.resolver.resolve(expression);
                let matcher = resolved.to_matcher();
                self.registry
                    .iter()
                    .filter(|(name, _)| matcher.allows(name))
                    .map(|(name, descriptor)| (name.to_string(), Arc::clone(descriptor)))
                    .collect()
            }
        };

        selected.sort_by(|a, b| a.0.cmp(&b.0));
        selected
    }

    /// Names of the selected parsers, sorted.
    pub fn select_parser_names(&self, filter: Option<&str>) -> Vec<String> {
        self.select_parsers(filter)
            .into_iter()
            .map(|(name, _)| name)
            .collect()
    }

    /// One fresh parser instance per selected parser, keyed by name.
    pub fn select_parser_instances(
        &self,
        filter: Option<&str>,
    ) -> BTreeMap<String, Box<dyn Parser>> {
        self.select_parsers(filter)
            .into_iter()
            .map(|(name, descriptor)| {
                let instance = descriptor.instantiate();
                (name, instance)
            })
            .collect()
    }

    /// Split the selected parsers into a specification store and a remainder.
    ///
    /// Every selected parser ends up in exactly one of the two, under its
    /// registry name. Stored specifications are re-keyed to that name and
    /// their signature identifiers namespaced under it (see
    /// [`owned_by`](crate::specification::FormatSpecification::owned_by)), so
    /// distinct parsers never collide.
    ///
    /// # Errors
    /// Fails only if one specification namespaces two of its own signatures
    /// to the same identifier.
    pub fn build_specification_store(
        &self,
        filter: Option<&str>,
    ) -> Result<SpecificationSplit> {
        let mut split = SpecificationSplit::default();

        for (name, descriptor) in self.select_parsers(filter) {
            match descriptor.format_specification() {
                Some(specification) => split
                    .store
                    .add_specification(specification.owned_by(&name))?,
                None => split.remainder.push(name),
            }
        }

        debug!(
            specifications = split.store.len(),
            signatures = split.store.signature_count(),
            remainder = split.remainder.len(),
            "built specification store"
        );
        Ok(split)
    }
}
