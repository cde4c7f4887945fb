//! Parser presets.
//!
//! A preset (category) is a named group of parser names usable as a filter
//! shorthand, e.g. `webhist` for every browser history parser. The filter
//! resolver consumes presets through the read-only [`PresetCatalog`] trait.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Read-only source of preset categories.
pub trait PresetCatalog: Send + Sync {
    /// Every known category name.
    fn category_names(&self) -> BTreeSet<String>;

    /// The parser names of a category in declaration order, or `None` if the
    /// category is unknown.
    fn parsers_for_category(&self, category: &str) -> Option<Vec<String>>;

    fn contains_category(&self, category: &str) -> bool {
        self.parsers_for_category(category).is_some()
    }
}

/// Categories shipped with the crate. Members naming another category are
/// expanded on lookup.
const BUILTIN_PRESETS: &[(&str, &[&str])] = &[
    (
        "webhist",
        &[
            "chrome_cache",
            "chrome_cookies",
            "chrome_extension_activity",
            "chrome_history",
            "firefox_cache",
            "firefox_cookies",
            "firefox_downloads",
            "firefox_history",
            "java_idx",
            "msie_webcache",
            "msiecf",
            "opera_global",
            "opera_typed_history",
            "safari_history",
        ],
    ),
    (
        "win_gen",
        &[
            "bencode",
            "esedb",
            "filestat",
            "google_drive",
            "java_idx",
            "lnk",
            "mcafee_protection",
            "olecf",
            "openxml",
            "prefetch",
            "skydrive_log",
            "skydrive_log_error",
            "skype",
            "symantec_scanlog",
            "webhist",
            "winfirewall",
            "winjob",
            "winreg",
        ],
    ),
    (
        "winxp",
        &[
            "recycle_bin_info2",
            "win_gen",
            "winevt",
        ],
    ),
    (
        "win7",
        &[
            "recycle_bin",
            "custom_destinations",
            "olecf_automatic_destinations",
            "win_gen",
            "winevtx",
        ],
    ),
    (
        "linux",
        &[
            "bencode",
            "filestat",
            "google_drive",
            "java_idx",
            "olecf",
            "openxml",
            "pls_recall",
            "popularity_contest",
            "selinux",
            "skype",
            "syslog",
            "utmp",
            "webhist",
            "xchatlog",
            "xchatscrollback",
            "zeitgeist",
        ],
    ),
    (
        "macosx",
        &[
            "appusage",
            "asl_log",
            "bencode",
            "bsm_log",
            "cups_ipp",
            "filestat",
            "google_drive",
            "java_idx",
            "ls_quarantine",
            "mac_appfirewall_log",
            "mac_document_versions",
            "mac_keychain",
            "mac_securityd",
            "mackeeper_cache",
            "macwifi",
            "olecf",
            "openxml",
            "plist",
            "skype",
            "utmpx",
            "webhist",
        ],
    ),
    (
        "android",
        &[
            "android_app_usage",
            "android_calls",
            "android_sms",
        ],
    ),
];

/// A fixed mapping of category name to parser names.
///
/// Category names are stored lowercase, matching the case normalization of
/// filter tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticPresetCatalog {
    categories: BTreeMap<String, Vec<String>>,
}

impl StaticPresetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The presets shipped with the crate.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for &(category, parsers) in BUILTIN_PRESETS {
            catalog.add_category(category, parsers.iter().copied());
        }
        catalog
    }

    /// Parse a catalog from YAML of the form
    /// `categories: { name: [parser, ...] }`.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let parsed: StaticPresetCatalog = serde_yaml::from_str(yaml)?;
        let mut catalog = Self::new();
        for (category, parsers) in parsed.categories {
            catalog.add_category(&category, parsers);
        }
        Ok(catalog)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Add or replace a category.
    pub fn add_category<I, S>(&mut self, category: &str, parsers: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories.insert(
            category.to_lowercase(),
            parsers.into_iter().map(Into::into).collect(),
        );
        self
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl PresetCatalog for StaticPresetCatalog {
    fn category_names(&self) -> BTreeSet<String> {
        self.categories.keys().cloned().collect()
    }

    /// Members naming another category are expanded in place.
    fn parsers_for_category(&self, category: &str) -> Option<Vec<String>> {
        let category = category.to_lowercase();
        if !self.categories.contains_key(&category) {
            return None;
        }

        let mut parsers = Vec::new();
        let mut visiting = BTreeSet::new();
        self.expand_category(&category, &mut visiting, &mut parsers);
        Some(parsers)
    }
}

impl StaticPresetCatalog {
    fn expand_category(
        &self,
        category: &str,
        visiting: &mut BTreeSet<String>,
        parsers: &mut Vec<String>,
    ) {
        // A category referencing itself, directly or not, contributes nothing further.
        if !visiting.insert(category.to_string()) {
            return;
        }
        if let Some(members) = self.categories.get(category) {
            for member in members {
                if self.categories.contains_key(member) {
                    self.expand_category(member, visiting, parsers);
                } else {
                    parsers.push(member.clone());
                }
            }
        }
        visiting.remove(category);
    }
}
