//! Rule descriptors.
//!
//! A configured rule is either a shorthand (`"POST,PUT post/<id>" → "post/update"`) or a
//! structured [`RuleSpec`]. Both are turned into `RuleSpec` before compilation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Matches `<name>` and `<name:regex>` placeholders.
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(\w+)(?::([^>]+))?>").expect("placeholder regex is valid")
});

/// HTTP verbs a rule can be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl Verb {
    pub const ALL: [Verb; 7] = [
        Verb::Get,
        Verb::Head,
        Verb::Post,
        Verb::Put,
        Verb::Patch,
        Verb::Delete,
        Verb::Options,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Head => "HEAD",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
            Verb::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verb::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("unknown verb `{}`", s))
    }
}

/// Whether a rule parses requests, creates URLs, or both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleMode {
    #[default]
    Both,
    ParsingOnly,
    CreationOnly,
}

impl RuleMode {
    pub fn is_both(&self) -> bool {
        *self == RuleMode::Both
    }
}

/// Structured rule: URL shape → route.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    /// Slash-separated pattern with `<name>` / `<name:regex>` placeholders.
    pub pattern: String,

    /// Target route (handler id).
    pub route: String,

    /// Verbs this rule applies to; empty means any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verbs: Vec<Verb>,

    #[serde(default, skip_serializing_if = "RuleMode::is_both")]
    pub mode: RuleMode,

    /// Absolute URL prefix with its own placeholders, e.g. `http://<lang>.example.com`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Overrides the global URL suffix for this rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

impl RuleSpec {
    pub fn new(pattern: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            route: route.into(),
            verbs: Vec::new(),
            mode: RuleMode::Both,
            host: None,
            suffix: None,
        }
    }

    pub fn with_verbs(mut self, verbs: impl IntoIterator<Item = Verb>) -> Self {
        self.verbs = verbs.into_iter().collect();
        self
    }

    pub fn with_mode(mut self, mode: RuleMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn is_parsing_only(&self) -> bool {
        self.mode == RuleMode::ParsingOnly
    }

    /// True when the pattern or the host declares a placeholder called `name`.
    pub fn declares(&self, name: &str) -> bool {
        has_placeholder(&self.pattern, name)
            || self.host.as_deref().is_some_and(|h| has_placeholder(h, name))
    }
}

/// Shorthand rule: `key` is `"[VERB,...] pattern"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShorthandRule {
    pub key: String,
    pub route: String,
}

/// A rule as configured.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRule {
    Structured(RuleSpec),
    Shorthand(ShorthandRule),
}

impl RawRule {
    pub fn shorthand(key: impl Into<String>, route: impl Into<String>) -> Self {
        RawRule::Shorthand(ShorthandRule {
            key: key.into(),
            route: route.into(),
        })
    }
}

impl From<RuleSpec> for RawRule {
    fn from(spec: RuleSpec) -> Self {
        RawRule::Structured(spec)
    }
}

/// A placeholder found in a pattern or host template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    pub name: &'a str,
    pub regex: Option<&'a str>,
    /// Byte range of the whole `<...>` token.
    pub start: usize,
    pub end: usize,
}

/// All placeholders in `template`, in order.
pub fn placeholders(template: &str) -> Vec<Placeholder<'_>> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            Some(Placeholder {
                name: name.as_str(),
                regex: caps.get(2).map(|m| m.as_str()),
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

pub fn has_placeholder(template: &str, name: &str) -> bool {
    placeholders(template).iter().any(|p| p.name == name)
}
