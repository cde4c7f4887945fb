//! Format specifications and the specification store.
//!
//! A [`FormatSpecification`] collects the byte signatures that identify the
//! format a single parser handles. The [`SpecificationStore`] aggregates the
//! specifications of many parsers so they can be fed to one scanner.

use crate::error::{Result, RegistryError};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A single byte signature.
///
/// The offset anchors the pattern:
/// - `None` - unanchored, may match anywhere in the stream
/// - negative - anchored to the end of the stream, magnitude is the distance from the end
/// - non-negative - anchored to the start of the stream
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    pub identifier: String,
    pub pattern: Vec<u8>,
    pub offset: Option<i64>,
}

impl Signature {
    pub fn new(
        identifier: impl Into<String>,
        pattern: impl Into<Vec<u8>>,
        offset: Option<i64>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            pattern: pattern.into(),
            offset,
        }
    }
}

/// The signatures identifying one parser's format.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormatSpecification {
    /// Identifier of the format, normally the owning parser name.
    pub identifier: String,
    pub signatures: Vec<Signature>,
}

impl FormatSpecification {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            signatures: Vec::new(),
        }
    }

    /// Add a signature with an explicit identifier.
    pub fn add_signature(
        &mut self,
        identifier: impl Into<String>,
        pattern: impl Into<Vec<u8>>,
        offset: Option<i64>,
    ) -> Result<&mut Self> {
        let signature = Signature::new(identifier, pattern, offset);
        if signature.pattern.is_empty() {
            return Err(RegistryError::EmptyPattern(signature.identifier));
        }
        if self
            .signatures
            .iter()
            .any(|existing| existing.identifier == signature.identifier)
        {
            return Err(RegistryError::DuplicateSignature(signature.identifier));
        }
        self.signatures.push(signature);
        Ok(self)
    }

    /// Add a signature whose identifier is derived from the specification
    /// identifier and the signature's position, e.g. `"olecf:0"`.
    pub fn add_new_signature(
        &mut self,
        pattern: impl Into<Vec<u8>>,
        offset: Option<i64>,
    ) -> Result<&mut Self> {
        let identifier = format!("{}:{}", self.identifier, self.signatures.len());
        self.add_signature(identifier, pattern, offset)
    }

    pub fn signature_count(&self) -> usize {
        self.signatures.len()
    }

    /// A copy identified by a parser's registry key, with every signature
    /// identifier namespaced under that key.
    ///
    /// An identifier prefixed with the current specification identifier has
    /// that prefix replaced (`"OLECF:0"` becomes `"olecf:0"`), any other
    /// identifier gains the key as prefix (`"magic"` becomes `"zip:magic"`).
    pub fn owned_by(&self, parser_key: &str) -> Self {
        let prefix = format!("{}:", self.identifier);
        let signatures = self
            .signatures
            .iter()
            .map(|signature| {
                let local = signature
                    .identifier
                    .strip_prefix(prefix.as_str())
                    .unwrap_or(signature.identifier.as_str());
                Signature {
                    identifier: format!("{parser_key}:{local}"),
                    pattern: signature.pattern.clone(),
                    offset: signature.offset,
                }
            })
            .collect();

        Self {
            identifier: parser_key.to_string(),
            signatures,
        }
    }

    /// A specification without signatures cannot identify anything.
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

/// Aggregate of format specifications keyed by identifier.
///
/// Also indexes every signature identifier so scanner hits can be mapped back
/// to the specification (and therefore the parser) that declared them.
#[derive(Debug, Clone, Default)]
pub struct SpecificationStore {
    specifications: HashMap<String, FormatSpecification>,
    signature_index: HashMap<String, String>,
}

impl SpecificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a specification.
    ///
    /// Fails if a specification with the same identifier is already stored or
    /// if one of its signature identifiers is already in use. The store is left
    /// unchanged on failure.
    pub fn add_specification(&mut self, specification: FormatSpecification) -> Result<()> {
        if self.specifications.contains_key(&specification.identifier) {
            return Err(RegistryError::DuplicateSpecification(
                specification.identifier,
            ));
        }

        let mut seen = HashSet::new();
        for signature in &specification.signatures {
            if self.signature_index.contains_key(&signature.identifier)
                || !seen.insert(signature.identifier.as_str())
            {
                return Err(RegistryError::DuplicateSignature(
                    signature.identifier.clone(),
                ));
            }
        }

        for signature in &specification.signatures {
            self.signature_index
                .insert(signature.identifier.clone(), specification.identifier.clone());
        }
        self.specifications
            .insert(specification.identifier.clone(), specification);
        Ok(())
    }

    pub fn get(&self, identifier: &str) -> Option<&FormatSpecification> {
        self.specifications.get(identifier)
    }

    /// Look up the specification that declared a signature identifier.
    pub fn specification_by_signature(
        &self,
        signature_identifier: &str,
    ) -> Option<&FormatSpecification> {
        self.signature_index
            .get(signature_identifier)
            .and_then(|identifier| self.specifications.get(identifier))
    }

    /// Iterate over the specifications. Order is unspecified.
    pub fn specifications(&self) -> impl Iterator<Item = &FormatSpecification> {
        self.specifications.values()
    }

    /// Specifications sorted by identifier.
    pub fn sorted_specifications(&self) -> Vec<&FormatSpecification> {
        let mut specifications: Vec<_> = self.specifications.values().collect();
        specifications.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        specifications
    }

    pub fn identifiers(&self) -> Vec<&str> {
        let mut identifiers: Vec<&str> =
            self.specifications.keys().map(String::as_str).collect();
        identifiers.sort_unstable();
        identifiers
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.specifications.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.specifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specifications.is_empty()
    }

    /// Total number of signatures across all specifications.
    pub fn signature_count(&self) -> usize {
        self.signature_index.len()
    }
}
