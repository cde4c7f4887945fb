//! The parser registry.
//!
//! Maps lowercase parser names to their descriptors. The registry is an
//! ordinary value owned by whoever bootstraps the pipeline; mutation requires
//! `&mut self`, so registration happens in a single-threaded setup phase
//! before the registry is shared for reads.

use crate::error::{Result, RegistryError};
use crate::parser::ParserDescriptor;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct ParserRegistry {
    parsers: HashMap<String, Arc<ParserDescriptor>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parser descriptor under its lowercase name.
    ///
    /// Returns the shared handle stored in the registry.
    ///
    /// # Errors
    /// [`RegistryError::DuplicateParser`] if the name is already registered.
    pub fn register(&mut self, descriptor: ParserDescriptor) -> Result<Arc<ParserDescriptor>> {
        let key = descriptor.key();
        if self.parsers.contains_key(&key) {
            return Err(RegistryError::DuplicateParser(descriptor.name().to_string()));
        }

        debug!(parser = %key, plugins = descriptor.plugin_names().len(), "registered parser");
        let descriptor = Arc::new(descriptor);
        self.parsers.insert(key, Arc::clone(&descriptor));
        Ok(descriptor)
    }

    /// Register descriptors in order, stopping at the first duplicate.
    ///
    /// Descriptors registered before the failure stay registered.
    pub fn register_all<I>(&mut self, descriptors: I) -> Result<()>
    where
        I: IntoIterator<Item = ParserDescriptor>,
    {
        for descriptor in descriptors {
            self.register(descriptor)?;
        }
        Ok(())
    }

    /// Remove a parser by name (case-insensitive).
    ///
    /// # Errors
    /// [`RegistryError::ParserNotFound`] if the name is not registered.
    pub fn deregister(&mut self, name: &str) -> Result<Arc<ParserDescriptor>> {
        let key = name.to_lowercase();
        let removed = self
            .parsers
            .remove(&key)
            .ok_or_else(|| RegistryError::ParserNotFound(name.to_string()))?;

        debug!(parser = %key, "deregistered parser");
        Ok(removed)
    }

    /// Remove the parser registered under the descriptor's name.
    pub fn deregister_descriptor(
        &mut self,
        descriptor: &ParserDescriptor,
    ) -> Result<Arc<ParserDescriptor>> {
        self.deregister(descriptor.name())
    }

    /// Case-insensitive lookup.
    pub fn lookup(&self, name: &str) -> Option<&Arc<ParserDescriptor>> {
        self.parsers.get(&name.to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parsers.contains_key(&name.to_lowercase())
    }

    /// Snapshot of every (name, descriptor) pair. Order is unspecified.
    pub fn all(&self) -> Vec<(String, Arc<ParserDescriptor>)> {
        self.parsers
            .iter()
            .map(|(name, descriptor)| (name.clone(), Arc::clone(descriptor)))
            .collect()
    }

    /// Iterate without taking a snapshot.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<ParserDescriptor>)> {
        self.parsers
            .iter()
            .map(|(name, descriptor)| (name.as_str(), descriptor))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.parsers.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}
