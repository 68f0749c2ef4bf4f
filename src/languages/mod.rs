//! Language registry.
//!
//! The table is assembled once at startup from the built-in descriptors plus
//! any `[[languages]]` entries in the configuration, and is read-only from
//! then on. Share it behind an `Arc`; lookups need no locking.

mod builtin;
mod descriptor;
pub mod template;

pub use builtin::builtin_languages;
pub use descriptor::{CommandTemplate, LanguageDescriptor, LanguageKind};

use std::collections::HashMap;

use crate::config::types::LanguageConfig;
use crate::error::{Result, RunboxError};

#[derive(Debug)]
pub struct LanguageRegistry {
    languages: Vec<LanguageDescriptor>,
    /// Lowercased id/alias -> index into `languages`
    index: HashMap<String, usize>,
}

impl LanguageRegistry {
    /// Build a registry from descriptors in registration order.
    ///
    /// Fails if a descriptor is incomplete or a name is claimed twice.
    pub fn new(languages: Vec<LanguageDescriptor>) -> Result<Self> {
        let mut index = HashMap::new();

        for (pos, lang) in languages.iter().enumerate() {
            if lang.id.trim().is_empty() {
                return Err(RunboxError::Config(
                    "language descriptor with an empty id".to_string(),
                ));
            }
            if lang.run.is_empty() {
                return Err(RunboxError::Config(format!(
                    "language '{}' has no run command",
                    lang.id
                )));
            }
            for name in lang.names() {
                if let Some(&other) = index.get(&name.to_lowercase()) {
                    let other: &LanguageDescriptor = &languages[other];
                    return Err(RunboxError::Config(format!(
                        "name '{}' is claimed by both '{}' and '{}'",
                        name, other.id, lang.id
                    )));
                }
                index.insert(name.to_lowercase(), pos);
            }
        }

        Ok(Self { languages, index })
    }

    /// The built-in table with configured languages merged in.
    ///
    /// A configured language whose id matches an existing one replaces it in
    /// place; all others are appended.
    pub fn with_overrides(extra: Vec<LanguageConfig>) -> Result<Self> {
        let mut languages = builtin_languages();

        for config in extra {
            let lang = LanguageDescriptor::from(config);
            match languages
                .iter()
                .position(|l| l.id.eq_ignore_ascii_case(&lang.id))
            {
                Some(pos) => languages[pos] = lang,
                None => languages.push(lang),
            }
        }

        Self::new(languages)
    }

    pub fn resolve(&self, name: &str) -> Option<&LanguageDescriptor> {
        self.index
            .get(&name.trim().to_lowercase())
            .map(|&pos| &self.languages[pos])
    }

    /// All descriptors in registration order.
    pub fn list(&self) -> &[LanguageDescriptor] {
        &self.languages
    }

    /// Display lines for a "supported languages" listing.
    pub fn summaries(&self) -> Vec<String> {
        self.languages.iter().map(LanguageDescriptor::summary).collect()
    }
}
