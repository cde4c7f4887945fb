//! Parser filter expressions.
//!
//! A filter expression is a comma-separated list of tokens. A token prefixed
//! with `-` excludes, any other token includes. Tokens are resolved, first
//! match wins, as:
//!
//! 1. a registered parser name, followed by its sub-plugin names if it hosts plugins,
//! 2. a preset category, expanded to the parser names it lists,
//! 3. otherwise the literal token.
//!
//! Unresolved tokens are kept so that plugin or parser names not registered at
//! resolution time can still be referenced. Resolution never fails.
//!
//! ```rust,ignore
//! let resolver = FilterResolver::new(&registry, &catalog);
//! let filter = resolver.resolve("webhist,-chrome_cache");
//! assert!(filter.excludes.contains(&"chrome_cache".to_string()));
//! ```

use crate::config::FilterConfig;
use crate::parser::ParserKind;
use crate::presets::PresetCatalog;
use crate::registry::ParserRegistry;
use std::collections::HashSet;
use tracing::debug;

/// Include and exclude names resolved from a filter expression.
///
/// Names are lowercase and kept in first-seen order. Duplicates are allowed
/// and a name may appear in both lists; exclusion takes precedence at
/// selection time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedFilter {
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
}

impl ResolvedFilter {
    /// Whether a registered parser name passes the filter.
    pub fn allows(&self, name: &str) -> bool {
        if self.excludes.iter().any(|excluded| excluded == name) {
            return false;
        }
        self.includes.is_empty() || self.includes.iter().any(|included| included == name)
    }

    /// Build a set-backed matcher for repeated membership checks.
    pub fn to_matcher(&self) -> FilterMatcher<'_> {
        FilterMatcher {
            includes: self.includes.iter().map(String::as_str).collect(),
            excludes: self.excludes.iter().map(String::as_str).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }
}

/// Hash-set view of a [`ResolvedFilter`].
#[derive(Debug, Clone)]
pub struct FilterMatcher<'a> {
    includes: HashSet<&'a str>,
    excludes: HashSet<&'a str>,
}

impl FilterMatcher<'_> {
    pub fn allows(&self, name: &str) -> bool {
        if self.excludes.contains(name) {
            return false;
        }
        self.includes.is_empty() || self.includes.contains(name)
    }
}

/// Resolves filter expressions against a registry and a preset catalog.
pub struct FilterResolver<'a> {
    registry: &'a ParserRegistry,
    catalog: &'a dyn PresetCatalog,
    config: FilterConfig,
}

impl<'a> FilterResolver<'a> {
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
            catalog,
            config,
        }
    }

    /// Split a filter expression into include and exclude name lists.
    ///
    /// An empty expression yields empty lists.
    pub fn resolve(&self, expression: &str) -> ResolvedFilter {
        let mut filter = ResolvedFilter::default();

        for token in expression.split(self.config.separator) {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }

            let (active, token) = match token.strip_prefix(self.config.negation_marker) {
                Some(stripped) => (&mut filter.excludes, stripped),
                None => (&mut filter.includes, token),
            };

            let name = token.to_lowercase();
            self.expand_token(name, active);
        }

        debug!(
            expression,
            includes = filter.includes.len(),
            excludes = filter.excludes.len(),
            "resolved parser filter"
        );
        filter
    }

    fn expand_token(&self, name: String, active: &mut Vec<String>) {
        if let Some(descriptor) = self.registry.lookup(&name) {
            active.push(name);
            if let ParserKind::PluginBearing { plugins } = descriptor.kind() {
                active.extend(plugins.iter().cloned());
            }
        } else if let Some(parsers) = self.catalog.parsers_for_category(&name) {
            active.extend(parsers);
        } else {
            debug!(token = %name, "filter token matches no parser or preset, kept as literal");
            active.push(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{Parser, ParserDescriptor};
    use crate::presets::StaticPresetCatalog;

    struct StubParser;

    impl Parser for StubParser {
        fn name(&self) -> &str {
            "stub"
        }
    }

    fn registry() -> ParserRegistry {
        let mut registry = ParserRegistry::new();
        registry
            .register_all(vec![
                ParserDescriptor::new("foo", || Box::new(StubParser)),
                ParserDescriptor::new("bar", || Box::new(StubParser)),
                ParserDescriptor::new("P", || Box::new(StubParser)).with_plugins(&["a", "b"]),
            ])
            .unwrap();
        registry
    }

    fn catalog() -> StaticPresetCatalog {
        let mut catalog = StaticPresetCatalog::new();
        catalog.add_category("browsers", ["chrome", "firefox"]);
        catalog
    }

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_include_and_exclude() {
        let registry = registry();
        let catalog = catalog();
        let filter = FilterResolver::new(&registry, &catalog).resolve("foo,-bar");

        assert_eq!(filter.includes, strings(&["foo"]));
        assert_eq!(filter.excludes, strings(&["bar"]));
    }

    #[test]
    fn test_plugin_bearing_parser_expands() {
        let registry = registry();
        let catalog = catalog();
        let filter = FilterResolver::new(&registry, &catalog).resolve("p");

        assert_eq!(filter.includes, strings(&["p", "a", "b"]));
        assert!(filter.excludes.is_empty());
    }

    #[test]
    fn test_excluded_plugin_bearing_parser_expands() {
        let registry = registry();
        let catalog = catalog();
        let filter = FilterResolver::new(&registry, &catalog).resolve("-P");

        assert!(filter.includes.is_empty());
        assert_eq!(filter.excludes, strings(&["p", "a", "b"]));
    }

    #[test]
    fn test_preset_expands() {
        let registry = registry();
        let catalog = catalog();
        let filter = FilterResolver::new(&registry, &catalog).resolve("browsers");

        assert_eq!(filter.includes, strings(&["chrome", "firefox"]));
    }

    #[test]
    fn test_registered_parser_wins_over_preset() {
        let registry = registry();
        let mut catalog = catalog();
        catalog.add_category("foo", ["not_used"]);

        let filter = FilterResolver::new(&registry, &catalog).resolve("foo");
        assert_eq!(filter.includes, strings(&["foo"]));
    }

    #[test]
    fn test_unknown_token_kept_literally() {
        let registry = registry();
        let catalog = catalog();
        let filter = FilterResolver::new(&registry, &catalog).resolve("Not_Yet_Loaded");

        assert_eq!(filter.includes, strings(&["not_yet_loaded"]));
    }

    #[test]
    fn test_whitespace_case_and_empty_tokens() {
        let registry = registry();
        let catalog = catalog();
        let filter = FilterResolver::new(&registry, &catalog).resolve(" FOO , ,, - Bar ,");

        assert_eq!(filter.includes, strings(&["foo"]));
        // The marker is stripped before the remaining token is lowercased, inner
        // whitespace is preserved.
        assert_eq!(filter.excludes, strings(&[" bar"]));
    }

    #[test]
    fn test_empty_expression() {
        let registry = registry();
        let catalog = catalog();
        let filter = FilterResolver::new(&registry, &catalog).resolve("");

        assert!(filter.is_empty());
        assert!(filter.allows("anything"));
    }

    #[test]
    fn test_duplicates_and_overlap_preserved() {
        let registry = registry();
        let catalog = catalog();
        let filter = FilterResolver::new(&registry, &catalog).resolve("foo,foo,-foo");

        assert_eq!(filter.includes, strings(&["foo", "foo"]));
        assert_eq!(filter.excludes, strings(&["foo"]));
        assert!(!filter.allows("foo"));
        assert!(!filter.to_matcher().allows("foo"));
    }

    #[test]
    fn test_custom_syntax() {
        let registry = registry();
        let catalog = catalog();
        let config = FilterConfig {
            separator: ';',
            negation_marker: '!',
        };
        let filter = FilterResolver::with_config(&registry, &catalog, config).resolve("foo;!bar");

        assert_eq!(filter.includes, strings(&["foo"]));
        assert_eq!(filter.excludes, strings(&["bar"]));
    }

    #[test]
    fn test_allows() {
        let filter = ResolvedFilter {
            includes: strings(&["foo", "bar"]),
            excludes: strings(&["bar"]),
        };

        assert!(filter.allows("foo"));
        assert!(!filter.allows("bar"));
        assert!(!filter.allows("baz"));

        let matcher = filter.to_matcher();
        assert!(matcher.allows("foo"));
        assert!(!matcher.allows("bar"));
        assert!(!matcher.allows("baz"));
    }

    #[test]
    fn test_excludes_only_allows_rest() {
        let filter = ResolvedFilter {
            includes: Vec::new(),
            excludes: strings(&["bar"]),
        };

        assert!(filter.allows("foo"));
        assert!(!filter.allows("bar"));
    }
}
