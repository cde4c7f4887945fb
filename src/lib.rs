//! # Parser Registry
//!
//! Parser registration, filter-expression resolution and signature scanner
//! construction for a forensic artifact-parsing pipeline.
//!
//! Every parser is described by a [`ParserDescriptor`]: a case-insensitive
//! name, an optional set of sub-plugins and an optional
//! [`FormatSpecification`] listing the byte signatures that identify its
//! format. Descriptors live in a [`ParserRegistry`]. A filter expression such
//! as `"win7,-filestat"` selects a subset of the registry, and the signatures
//! of the selected parsers are compiled into one multi-pattern scanner that
//! classifies an input in a single pass.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use parser_registry::{FormatSpecification, ParserDescriptor, ParsersManager};
//!
//! let mut manager = ParsersManager::new();
//!
//! let mut spec = FormatSpecification::new("sqlite");
//! spec.add_new_signature(b"SQLite format 3\x00".to_vec(), Some(0))?;
//!
//! manager.register_parsers(vec![
//!     ParserDescriptor::new("sqlite", || Box::new(SqliteParser::default()))
//!         .with_plugins(&["chrome_history", "firefox_history"])
//!         .with_format_specification(spec),
//!     ParserDescriptor::new("syslog", || Box::new(SyslogParser::default())),
//! ])?;
//!
//! // Parsers with signatures go into the scanner, the rest are returned.
//! let (scanner, remainder) = manager.scanner_for_filter(Some("sqlite,syslog"))?;
//! assert_eq!(remainder, vec!["syslog".to_string()]);
//!
//! for hit in scanner.scan(&data) {
//!     println!("{} at {}", hit.identifier, hit.position);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Filter Expressions
//!
//! Comma-separated tokens, `-` prefix to exclude. Each token names a
//! registered parser (plugin-bearing parsers pull in their plugins), a preset
//! category, or is kept literally. Exclusions always win over inclusions.
//!
//! ## Offsets
//!
//! A signature offset of `None` is unanchored, a non-negative offset is
//! measured from the start of the data and a negative offset from the end.
//! See [`OffsetPolarity`].

pub mod config;
pub mod error;
pub mod filter;
pub mod manager;
pub mod parser;
pub mod presets;
pub mod registry;
pub mod scanner;
pub mod selector;
pub mod specification;

// Primary interface
pub use manager::{ParsersManager, WINDOWS_REGISTRY_PARSER};

// Configuration and errors
pub use config::{FilterConfig, ManagerConfig, ScannerSettings};
pub use error::{RegistryError, Result};

// Registry and descriptors
pub use parser::{Parser, ParserDescriptor, ParserFactoryFn, ParserKind, PluginEntry, PluginList};
pub use presets::{PresetCatalog, StaticPresetCatalog};
pub use registry::ParserRegistry;

// Filtering and selection
pub use filter::{FilterMatcher, FilterResolver, ResolvedFilter};
pub use selector::{ParserSelector, SelectedParser, SpecificationSplit};

// Signatures and scanning
pub use scanner::{
    build_scanner, AhoCorasickMatcher, CompiledScanner, OffsetPolarity, ScanRule, ScannerConfig,
    SignatureHit, SignatureMatcher,
};
pub use specification::{FormatSpecification, Signature, SpecificationStore};
