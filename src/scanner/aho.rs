//! Aho-Corasick backed signature matcher.
//!
//! All patterns are compiled into one automaton and searched in a single
//! overlapping pass. Anchoring is checked per hit: a rule anchored to the start
//! or end of the data only reports a hit beginning exactly at its anchor.
//! Identical patterns are stored once in the automaton and mapped back to every
//! rule that declared them.

use super::{OffsetPolarity, ScanRule, SignatureMatcher};
use crate::config::ScannerSettings;
use crate::error::{Result, RegistryError};
use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Collects signature rules and compiles them into a [`CompiledScanner`].
#[derive(Debug, Clone, Default)]
pub struct AhoCorasickMatcher {
    rules: Vec<ScanRule>,
    settings: ScannerSettings,
}

impl AhoCorasickMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: ScannerSettings) -> Self {
        Self {
            rules: Vec::new(),
            settings,
        }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Build the automaton.
    pub fn compile(self) -> Result<CompiledScanner> {
        let mut patterns: Vec<Vec<u8>> = Vec::new();
        let mut pattern_ids: HashMap<Vec<u8>, usize> = HashMap::new();
        let mut pattern_to_rules: Vec<Vec<usize>> = Vec::new();

        for (rule_index, rule) in self.rules.iter().enumerate() {
            let pattern_id = *pattern_ids.entry(rule.pattern.clone()).or_insert_with(|| {
                patterns.push(rule.pattern.clone());
                pattern_to_rules.push(Vec::new());
                patterns.len() - 1
            });
            pattern_to_rules[pattern_id].push(rule_index);
        }

        let automaton = AhoCorasickBuilder::new()
            .match_kind(MatchKind::Standard)
            .ascii_case_insensitive(self.settings.ascii_case_insensitive)
            .build(&patterns)
            .map_err(|e| {
                RegistryError::MatcherBuild(format!("Failed to build AhoCorasick automaton: {e}"))
            })?;

        debug!(
            rules = self.rules.len(),
            patterns = patterns.len(),
            "compiled signature scanner"
        );

        Ok(CompiledScanner {
            automaton,
            rules: self.rules,
            pattern_to_rules,
        })
    }
}

impl SignatureMatcher for AhoCorasickMatcher {
    fn add_signature(
        &mut self,
        identifier: &str,
        offset: u64,
        pattern: &[u8],
        polarity: OffsetPolarity,
    ) -> Result<()> {
        if pattern.is_empty() {
            return Err(RegistryError::EmptyPattern(identifier.to_string()));
        }
        if let Some(limit) = self.settings.max_rules {
            if self.rules.len() >= limit {
                return Err(RegistryError::TooManyRules {
                    count: self.rules.len() + 1,
                    limit,
                });
            }
        }

        self.rules.push(ScanRule {
            identifier: identifier.to_string(),
            offset,
            pattern: pattern.to_vec(),
            polarity,
        });
        Ok(())
    }
}

/// A signature reported by [`CompiledScanner::scan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHit {
    pub identifier: String,
    /// Byte position the pattern starts at.
    pub position: usize,
    pub polarity: OffsetPolarity,
}

/// A compiled multi-pattern signature scanner.
#[derive(Debug, Clone)]
pub struct CompiledScanner {
    automaton: AhoCorasick,
    rules: Vec<ScanRule>,
    pattern_to_rules: Vec<Vec<usize>>,
}

impl CompiledScanner {
    /// Report every signature present in `data`, ordered by position and then
    /// by rule order.
    pub fn scan(&self, data: &[u8]) -> Vec<SignatureHit> {
        if self.rules.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<(usize, usize)> = Vec::new();

        for found in self.automaton.find_overlapping_iter(data) {
            let position = found.start();
            for &rule_index in &self.pattern_to_rules[found.pattern().as_usize()] {
                let rule = &self.rules[rule_index];
                let anchored = match rule.polarity {
                    OffsetPolarity::NoOffset => true,
                    polarity => polarity.anchor(rule.offset, data.len()) == Some(position),
                };
                if anchored {
                    hits.push((position, rule_index));
                }
            }
        }

        hits.sort_unstable();
        hits.dedup();
        hits.into_iter()
            .map(|(position, rule_index)| {
                let rule = &self.rules[rule_index];
                SignatureHit {
                    identifier: rule.identifier.clone(),
                    position,
                    polarity: rule.polarity,
                }
            })
            .collect()
    }

    /// Identifiers of the signatures present in `data`, each reported once.
    pub fn matching_identifiers(&self, data: &[u8]) -> BTreeSet<String> {
        self.scan(data)
            .into_iter()
            .map(|hit| hit.identifier)
            .collect()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Number of distinct patterns in the automaton.
    pub fn pattern_count(&self) -> usize {
        self.pattern_to_rules.len()
    }
}
