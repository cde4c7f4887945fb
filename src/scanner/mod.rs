//! Signature scanner configuration.
//!
//! Turns a [`SpecificationStore`] into one rule per signature, resolving the
//! signed offset of each signature into an unsigned offset plus an
//! [`OffsetPolarity`]:
//!
//! | Signature offset | Polarity | Emitted offset |
//! |------------------|----------|----------------|
//! | `None` | `NoOffset` | 0 |
//! | `< 0` | `RelativeFromEnd` | absolute value |
//! | `>= 0` | `RelativeFromStart` | unchanged |
//!
//! The rules are handed to a matching engine through the [`SignatureMatcher`]
//! trait. [`ScannerConfig`] records them as plain data; [`AhoCorasickMatcher`]
//! compiles them into a single multi-pattern automaton.
//!
//! ```rust,ignore
//! let config = ScannerConfig::from_store(&store);
//! let mut matcher = AhoCorasickMatcher::new();
//! config.apply_to(&mut matcher)?;
//! let scanner = matcher.compile()?;
//! for hit in scanner.scan(&data) {
//!     let spec = store.specification_by_signature(&hit.identifier);
//! }
//! ```

pub mod aho;

pub use aho::{AhoCorasickMatcher, CompiledScanner, SignatureHit};

use crate::error::Result;
use crate::specification::{Signature, SpecificationStore};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where a signature pattern is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OffsetPolarity {
    /// Unanchored, the pattern may occur anywhere.
    NoOffset,
    /// The pattern starts `offset` bytes from the start of the data.
    RelativeFromStart,
    /// The pattern starts `offset` bytes before the end of the data.
    RelativeFromEnd,
}

impl OffsetPolarity {
    /// Resolve a signed signature offset into an unsigned offset and polarity.
    pub fn resolve(offset: Option<i64>) -> (u64, Self) {
        match offset {
            None => (0, Self::NoOffset),
            Some(offset) if offset < 0 => (offset.unsigned_abs(), Self::RelativeFromEnd),
            Some(offset) => (offset.unsigned_abs(), Self::RelativeFromStart),
        }
    }

    /// Absolute position a pattern must start at in data of `len` bytes, or
    /// `None` when unanchored or the anchor falls outside the data.
    pub fn anchor(self, offset: u64, len: usize) -> Option<usize> {
        let len = len as u64;
        let position = match self {
            Self::NoOffset => return None,
            Self::RelativeFromStart => offset,
            Self::RelativeFromEnd => len.checked_sub(offset)?,
        };
        if position > len {
            return None;
        }
        usize::try_from(position).ok()
    }
}

/// The input shape of a matching engine.
///
/// Implemented by anything that accepts signature rules. The scanner builder
/// only configures a matcher, it never runs one.
pub trait SignatureMatcher {
    fn add_signature(
        &mut self,
        identifier: &str,
        offset: u64,
        pattern: &[u8],
        polarity: OffsetPolarity,
    ) -> Result<()>;
}

/// One scanner rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanRule {
    pub identifier: String,
    pub offset: u64,
    pub pattern: Vec<u8>,
    pub polarity: OffsetPolarity,
}

impl ScanRule {
    pub fn from_signature(signature: &Signature) -> Self {
        let (offset, polarity) = OffsetPolarity::resolve(signature.offset);
        Self {
            identifier: signature.identifier.clone(),
            offset,
            pattern: signature.pattern.clone(),
            polarity,
        }
    }
}

/// The rules for every signature of a specification store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerConfig {
    rules: Vec<ScanRule>,
}

impl ScannerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one rule per signature in the store.
    ///
    /// Specifications are visited in identifier order and signatures in
    /// declaration order. Identical patterns from different parsers are kept
    /// as separate rules.
    pub fn from_store(store: &SpecificationStore) -> Self {
        let rules: Vec<ScanRule> = store
            .sorted_specifications()
            .into_iter()
            .flat_map(|specification| specification.signatures.iter())
            .map(ScanRule::from_signature)
            .collect();

        debug!(
            specifications = store.len(),
            rules = rules.len(),
            "built scanner configuration"
        );
        Self { rules }
    }

    /// Feed every rule, in order, to a matcher.
    pub fn apply_to<M: SignatureMatcher + ?Sized>(&self, matcher: &mut M) -> Result<()> {
        for rule in &self.rules {
            matcher.add_signature(&rule.identifier, rule.offset, &rule.pattern, rule.polarity)?;
        }
        Ok(())
    }

    pub fn rules(&self) -> &[ScanRule] {
        &self.rules
    }

    pub fn get(&self, identifier: &str) -> Option<&ScanRule> {
        self.rules.iter().find(|rule| rule.identifier == identifier)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Serialize the rules as JSON for inspection.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl SignatureMatcher for ScannerConfig {
    fn add_signature(
        &mut self,
        identifier: &str,
        offset: u64,
        pattern: &[u8],
        polarity: OffsetPolarity,
    ) -> Result<()> {
        self.rules.push(ScanRule {
            identifier: identifier.to_string(),
            offset,
            pattern: pattern.to_vec(),
            polarity,
        });
        Ok(())
    }
}

/// Configure any matcher with every signature of a store.
pub fn build_scanner<M: SignatureMatcher + ?Sized>(
    store: &SpecificationStore,
    matcher: &mut M,
) -> Result<()> {
    ScannerConfig::from_store(store).apply_to(matcher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specification::FormatSpecification;

    fn store() -> SpecificationStore {
        let mut store = SpecificationStore::new();

        let mut trailer = FormatSpecification::new("trailer");
        trailer.add_new_signature(b"TAIL".to_vec(), Some(-4)).unwrap();
        store.add_specification(trailer).unwrap();

        let mut header = FormatSpecification::new("header");
        header.add_new_signature(b"HEAD".to_vec(), Some(10)).unwrap();
        header.add_new_signature(b"ANYWHERE".to_vec(), None).unwrap();
        store.add_specification(header).unwrap();

        store
    }

    #[test]
    fn test_resolve_polarity() {
        assert_eq!(OffsetPolarity::resolve(None), (0, OffsetPolarity::NoOffset));
        assert_eq!(
            OffsetPolarity::resolve(Some(-4)),
            (4, OffsetPolarity::RelativeFromEnd)
        );
        assert_eq!(
            OffsetPolarity::resolve(Some(10)),
            (10, OffsetPolarity::RelativeFromStart)
        );
        assert_eq!(
            OffsetPolarity::resolve(Some(0)),
            (0, OffsetPolarity::RelativeFromStart)
        );
        assert_eq!(
            OffsetPolarity::resolve(Some(i64::MIN)),
            (1u64 << 63, OffsetPolarity::RelativeFromEnd)
        );
    }

    #[test]
    fn test_anchor() {
        assert_eq!(OffsetPolarity::NoOffset.anchor(0, 100), None);
        assert_eq!(OffsetPolarity::RelativeFromStart.anchor(10, 100), Some(10));
        assert_eq!(OffsetPolarity::RelativeFromStart.anchor(101, 100), None);
        assert_eq!(OffsetPolarity::RelativeFromEnd.anchor(4, 100), Some(96));
        assert_eq!(OffsetPolarity::RelativeFromEnd.anchor(101, 100), None);
    }

    #[test]
    fn test_from_store_emits_one_rule_per_signature() {
        let config = ScannerConfig::from_store(&store());

        assert_eq!(config.len(), 3);
        let identifiers: Vec<&str> = config
            .rules()
            .iter()
            .map(|r| r.identifier.as_str())
            .collect();
        assert_eq!(identifiers, vec!["header:0", "header:1", "trailer:0"]);

        let trailer = config.get("trailer:0").unwrap();
        assert_eq!(trailer.polarity, OffsetPolarity::RelativeFromEnd);
        assert_eq!(trailer.offset, 4);

        let head = config.get("header:0").unwrap();
        assert_eq!(head.polarity, OffsetPolarity::RelativeFromStart);
        assert_eq!(head.offset, 10);

        let anywhere = config.get("header:1").unwrap();
        assert_eq!(anywhere.polarity, OffsetPolarity::NoOffset);
        assert_eq!(anywhere.pattern, b"ANYWHERE".to_vec());
    }

    #[test]
    fn test_identical_patterns_not_deduplicated() {
        let mut store = SpecificationStore::new();
        for name in ["zip", "openxml"] {
            let mut spec = FormatSpecification::new(name);
            spec.add_new_signature(b"PK\x03\x04".to_vec(), Some(0)).unwrap();
            store.add_specification(spec).unwrap();
        }

        let config = ScannerConfig::from_store(&store);
        assert_eq!(config.len(), 2);
        assert_eq!(config.rules()[0].pattern, config.rules()[1].pattern);
    }

    #[test]
    fn test_empty_store() {
        let config = ScannerConfig::from_store(&SpecificationStore::new());
        assert!(config.is_empty());
    }

    #[test]
    fn test_apply_to_and_build_scanner() {
        let store = store();
        let mut recorded = ScannerConfig::new();
        build_scanner(&store, &mut recorded).unwrap();

        assert_eq!(recorded, ScannerConfig::from_store(&store));
    }

    #[test]
    fn test_to_json() {
        let json = ScannerConfig::from_store(&store()).to_json().unwrap();
        assert!(json.contains("\"RelativeFromEnd\""));
        assert!(json.contains("\"trailer:0\""));

        let parsed: ScannerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 3);
    }
}
