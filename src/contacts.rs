use std::collections::BTreeMap;

use serde::Serialize;

/// Key used by the generic e-mail fallback.
pub const EMAIL_KEY: &str = "Email";

/// Key of the synthetic entry used when nothing at all was found.
pub const ERROR_KEY: &str = "Error";

/// Detail stored under [`ERROR_KEY`].
pub const NOT_FOUND_MESSAGE: &str = "Couldn't find any contact details.";

/// Contact details keyed by provider / role name.
///
/// Names are unique; inserting an existing name replaces its detail.
/// Iteration is in name order so output is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ContactDetails {
    entries: BTreeMap<String, String>,
}

impl ContactDetails {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, detail: impl Into<String>) {
        self.entries.insert(name.into(), detail.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Width of the longest name, used to align the detail column.
    pub fn name_width(&self) -> usize {
        self.entries.keys().map(|k| k.len()).max().unwrap_or(0)
    }

    /// The mapping that stands in for "nothing found".
    pub fn not_found() -> Self {
        let mut details = Self::new();
        details.insert(ERROR_KEY, NOT_FOUND_MESSAGE);
        details
    }

    /// True when this is the synthetic "nothing found" mapping.
    pub fn is_not_found(&self) -> bool {
        self.len() == 1 && self.get(ERROR_KEY) == Some(NOT_FOUND_MESSAGE)
    }

    /// Replace an empty mapping with [`ContactDetails::not_found`].
    pub fn or_not_found(self) -> Self {
        if self.is_empty() {
            Self::not_found()
        } else {
            self
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ContactDetails {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut details = Self::new();
        for (k, v) in iter {
            details.insert(k, v);
        }
        details
    }
}
