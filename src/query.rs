//! Read-only lookup over decoded version information.

use alloc::vec::Vec;

use crate::version::*;

/// Read-only view over a [`VersionInfo`] for looking up string values by language and codepage.
#[derive(Debug, Clone, Copy)]
pub struct VersionQuery<'a> {
    info: &'a VersionInfo,
}
impl<'a> VersionQuery<'a> {
    pub fn new(info: &'a VersionInfo) -> Self { Self { info } }

    /// Look up the string value of `key` in the table of the given language and codepage.
    pub fn lookup(&self, translation: Translation, key: &str) -> Option<&'a str> {
        self.info.strings.get(&translation)?.get(key).map(|value| value.as_str())
    }

    /// Look up the string value of `key` in the first table that has it, in [`VersionQuery::all_pairs`] order.
    pub fn lookup_any(&self, key: &str) -> Option<(Translation, &'a str)> {
        self.all_pairs()
            .into_iter()
            .find_map(|translation| self.lookup(translation, key).map(|value| (translation, value)))
    }

    /// Returns all language and codepage pairs.
    ///
    /// This is the declared translation table in order, or the order in which string tables
    /// were encountered if no translation table is present.
    pub fn all_pairs(&self) -> Vec<Translation> {
        if !self.info.translations.is_empty() {
            self.info.translations.clone()
        } else {
            self.info.strings.keys().copied().collect()
        }
    }

    /// Returns `true` if the pair is declared in the translation table or has a string table.
    pub fn has_pair(&self, translation: Translation) -> bool {
        self.info.translations.contains(&translation) || self.info.strings.contains_key(&translation)
    }

    /// Returns the key and value pairs of the given language and codepage in buffer order.
    pub fn strings(&self, translation: Translation) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.info
            .strings
            .get(&translation)
            .into_iter()
            .flat_map(|table| table.iter().map(|(key, value)| (key.as_str(), value.as_str())))
    }
}
