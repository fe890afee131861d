//! Language table: configured codes and the locales they map to.
//!
//! # Responsibilities
//! - Resolve literal or deferred language sources once, at construction
//! - Normalize flat code lists and code → locale mappings into one ordered table
//! - Validate that the table is non-empty and contains the default code
//!
//! # Design Decisions
//! - Table order is the order of first occurrence; duplicates overwrite (last wins)
//! - Immutable once built; supported codes never change at runtime

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::ConfigError;

/// A configuration value that is either known up front or produced by a resolver.
///
/// Resolvers run exactly once, when the table is built.
pub enum Deferred<T> {
    Literal(T),
    Resolver(Box<dyn FnOnce() -> T + Send>),
}

impl<T> Deferred<T> {
    /// Wrap a zero-argument resolver.
    pub fn resolver<F>(f: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        Deferred::Resolver(Box::new(f))
    }

    /// Produce the concrete value, invoking the resolver if there is one.
    pub fn resolve(self) -> T {
        match self {
            Deferred::Literal(value) => value,
            Deferred::Resolver(f) => f(),
        }
    }
}

impl<T> From<T> for Deferred<T> {
    fn from(value: T) -> Self {
        Deferred::Literal(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deferred::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Deferred::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}

/// One raw configured language entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawLanguage {
    /// A bare code, used as its own locale.
    Code(String),
    /// A code mapped to a locale.
    Mapped { code: String, locale: String },
}

/// Languages as configured, before normalization.
///
/// Accepts a list (`["en", { ua = "uk" }]`) or a mapping (`{ en = "en_US", ua = "uk" }`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct RawLanguages {
    entries: Vec<RawLanguage>,
}

impl RawLanguages {
    /// A flat list of codes.
    pub fn codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: codes.into_iter().map(|c| RawLanguage::Code(c.into())).collect(),
        }
    }

    /// Append a code → locale entry.
    pub fn with_locale(mut self, code: impl Into<String>, locale: impl Into<String>) -> Self {
        self.entries.push(RawLanguage::Mapped {
            code: code.into(),
            locale: locale.into(),
        });
        self
    }

    /// Append a bare code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.entries.push(RawLanguage::Code(code.into()));
        self
    }

    pub fn entries(&self) -> &[RawLanguage] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push_keyed(&mut self, key: &str, value: &Value) -> Result<(), ConfigError> {
        let locale = value
            .as_str()
            .ok_or_else(|| ConfigError::InvalidLocale(key.to_string()))?;

        // Numeric keys come from positional list entries: the value is the code.
        if key.parse::<u64>().is_ok() {
            self.entries.push(RawLanguage::Code(locale.to_string()));
        } else {
            self.entries.push(RawLanguage::Mapped {
                code: key.to_string(),
                locale: locale.to_string(),
            });
        }
        Ok(())
    }
}

impl TryFrom<Value> for RawLanguages {
    type Error = ConfigError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let mut raw = RawLanguages::default();
        match value {
            Value::Array(items) => {
                for item in items {
                    match item {
                        Value::String(code) => raw.entries.push(RawLanguage::Code(code)),
                        Value::Object(map) => {
                            for (key, value) in &map {
                                raw.push_keyed(key, value)?;
                            }
                        }
                        _ => return Err(ConfigError::LanguagesShape),
                    }
                }
            }
            Value::Object(map) => {
                for (key, value) in &map {
                    raw.push_keyed(key, value)?;
                }
            }
            _ => return Err(ConfigError::LanguagesShape),
        }
        Ok(raw)
    }
}

impl From<RawLanguages> for Value {
    fn from(raw: RawLanguages) -> Self {
        Value::Array(
            raw.entries
                .into_iter()
                .map(|entry| match entry {
                    RawLanguage::Code(code) => Value::String(code),
                    RawLanguage::Mapped { code, locale } => {
                        let mut map = serde_json::Map::new();
                        map.insert(code, Value::String(locale));
                        Value::Object(map)
                    }
                })
                .collect(),
        )
    }
}

/// Canonical, validated code → locale table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageTable {
    entries: Vec<(String, String)>,
    default_code: String,
}

impl LanguageTable {
    /// Resolve, normalize and validate the configured languages.
    pub fn build(
        languages: Deferred<RawLanguages>,
        default_language: Deferred<String>,
    ) -> Result<Self, ConfigError> {
        let raw = languages.resolve();
        let default_code = default_language.resolve();

        let entries = Self::normalize(&raw);
        Self::validate(&entries, &default_code)?;

        Ok(Self {
            entries,
            default_code,
        })
    }

    /// Collapse raw entries into ordered `(code, locale)` pairs.
    pub fn normalize(raw: &RawLanguages) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = Vec::with_capacity(raw.entries.len());
        for entry in &raw.entries {
            let (code, locale) = match entry {
                RawLanguage::Code(code) => (code, code),
                RawLanguage::Mapped { code, locale } => (code, locale),
            };
            match entries.iter_mut().find(|(c, _)| c == code) {
                Some(existing) => existing.1 = locale.clone(),
                None => entries.push((code.clone(), locale.clone())),
            }
        }
        entries
    }

    fn validate(entries: &[(String, String)], default_code: &str) -> Result<(), ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::LanguagesEmpty);
        }
        if !entries.iter().any(|(code, _)| code == default_code) {
            return Err(ConfigError::DefaultLanguageMissing(default_code.to_string()));
        }
        Ok(())
    }

    /// Codes in table order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(code, _)| code.as_str())
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.iter().any(|(c, _)| c == code)
    }

    /// Locale for a configured code.
    pub fn locale(&self, code: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, locale)| locale.as_str())
    }

    pub fn default_code(&self) -> &str {
        &self.default_code
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
