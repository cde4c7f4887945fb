//! Configuration for the parsers manager.
//!
//! Groups the settings for filter-expression parsing and scanner
//! construction. Every section has sensible defaults, builder methods, and can
//! be loaded from YAML:
//!
//! ```yaml
//! filter:
//!   separator: ","
//!   negation_marker: "-"
//! scanner:
//!   ascii_case_insensitive: false
//!   max_rules: 4096
//! ```

use crate::error::{Result, RegistryError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Filter expression syntax.
///
/// # Examples
///
/// ```rust
/// use parser_registry::FilterConfig;
///
/// let config = FilterConfig::default();
/// assert_eq!(config.separator, ',');
/// assert_eq!(config.negation_marker, '-');
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Separates tokens in a filter expression.
    ///
    /// **Default**: `,`
    pub separator: char,

    /// Prefix marking a token as an exclusion.
    ///
    /// **Default**: `-`
    pub negation_marker: char,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            separator: ',',
            negation_marker: '-',
        }
    }
}

/// Scanner construction settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerSettings {
    /// Match ASCII letters in signature patterns case-insensitively.
    ///
    /// Binary signatures are normally exact, so this is off by default.
    pub ascii_case_insensitive: bool,

    /// Upper bound on the number of rules a scanner may hold (None for no limit).
    ///
    /// **Default**: 65536
    pub max_rules: Option<usize>,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            ascii_case_insensitive: false,
            max_rules: Some(65_536),
        }
    }
}

/// Complete parsers manager configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Filter expression syntax
    pub filter: FilterConfig,
    /// Scanner construction settings
    pub scanner: ScannerSettings,
}

impl ManagerConfig {
    /// Create a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration for text-heavy formats where signatures should match
    /// regardless of ASCII case, with no cap on the rule count.
    pub fn permissive() -> Self {
        Self {
            scanner: ScannerSettings {
                ascii_case_insensitive: true,
                max_rules: None,
            },
            ..Default::default()
        }
    }

    /// Parse and validate a configuration from YAML. Missing sections take
    /// their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: ManagerConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Check the settings are usable together.
    pub fn validate(&self) -> Result<()> {
        let filter = &self.filter;
        if filter.separator == filter.negation_marker {
            return Err(RegistryError::Config(format!(
                "separator and negation marker must differ, both are '{}'",
                filter.separator
            )));
        }
        if filter.separator.is_whitespace() || filter.negation_marker.is_whitespace() {
            return Err(RegistryError::Config(
                "separator and negation marker must not be whitespace".to_string(),
            ));
        }
        if self.scanner.max_rules == Some(0) {
            return Err(RegistryError::Config(
                "max_rules must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        self.filter.separator = separator;
        self
    }

    pub fn with_negation_marker(mut self, marker: char) -> Self {
        self.filter.negation_marker = marker;
        self
    }

    pub fn with_case_insensitive_scanning(mut self, enable: bool) -> Self {
        self.scanner.ascii_case_insensitive = enable;
        self
    }

    pub fn with_max_rules(mut self, max_rules: usize) -> Self {
        self.scanner.max_rules = Some(max_rules);
        self
    }

    pub fn without_rule_limit(mut self) -> Self {
        self.scanner.max_rules = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ManagerConfig::default();

        assert_eq!(config.filter.separator, ',');
        assert_eq!(config.filter.negation_marker, '-');
        assert!(!config.scanner.ascii_case_insensitive);
        assert_eq!(config.scanner.max_rules, Some(65_536));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_permissive_config() {
        let config = ManagerConfig::permissive();

        assert!(config.scanner.ascii_case_insensitive);
        assert_eq!(config.scanner.max_rules, None);
        assert_eq!(config.filter, FilterConfig::default());
    }

    #[test]
    fn test_builder_methods() {
        let config = ManagerConfig::new()
            .with_separator(';')
            .with_negation_marker('!')
            .with_case_insensitive_scanning(true)
            .with_max_rules(128);

        assert_eq!(config.filter.separator, ';');
        assert_eq!(config.filter.negation_marker, '!');
        assert!(config.scanner.ascii_case_insensitive);
        assert_eq!(config.scanner.max_rules, Some(128));

        let config = config.without_rule_limit();
        assert_eq!(config.scanner.max_rules, None);
    }

    #[test]
    fn test_validate_rejects_conflicting_markers() {
        let config = ManagerConfig::new().with_negation_marker(',');
        assert!(matches!(config.validate(), Err(RegistryError::Config(_))));

        let config = ManagerConfig::new().with_separator(' ');
        assert!(matches!(config.validate(), Err(RegistryError::Config(_))));

        let config = ManagerConfig::new().with_max_rules(0);
        assert!(matches!(config.validate(), Err(RegistryError::Config(_))));
    }

    #[test]
    fn test_from_yaml_partial() {
        let config = ManagerConfig::from_yaml_str(
            r#"
filter:
  negation_marker: "!"
"#,
        )
        .unwrap();

        assert_eq!(config.filter.separator, ',');
        assert_eq!(config.filter.negation_marker, '!');
        assert_eq!(config.scanner, ScannerSettings::default());
    }

    #[test]
    fn test_from_yaml_invalid_combination() {
        let result = ManagerConfig::from_yaml_str("filter:\n  separator: \"-\"\n");
        assert!(matches!(result, Err(RegistryError::Config(_))));
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "scanner:\n  ascii_case_insensitive: true\n  max_rules: 10"
        )
        .unwrap();

        let config = ManagerConfig::from_yaml_file(file.path()).unwrap();
        assert!(config.scanner.ascii_case_insensitive);
        assert_eq!(config.scanner.max_rules, Some(10));
    }
}
