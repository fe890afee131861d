//! Rule augmentation: inject a language placeholder into every eligible rule.
//!
//! # Responsibilities
//! - Expand shorthand rules (`"POST,PUT post/<id>"`) into structured descriptors
//! - Prefix each eligible pattern with `<param:(code1|code2|...)>`
//! - Compile the result through the pattern engine, preserving rule order
//!
//! # Design Decisions
//! - A rule is left alone when its pattern or host already declares the language
//!   placeholder, or when the pattern is an absolute URL
//! - Injection is idempotent

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ConfigError;
use crate::language::LanguageTable;
use crate::routing::UrlRule;
use crate::rules::spec::{RawRule, RuleMode, RuleSpec, Verb};

static SHORTHAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^((?:(?:GET|HEAD|POST|PUT|PATCH|DELETE|OPTIONS),)*(?:GET|HEAD|POST|PUT|PATCH|DELETE|OPTIONS))\s+(.*)$",
    )
    .expect("shorthand regex is valid")
});

/// Turn a shorthand `key → route` entry into a structured rule.
///
/// Rules whose verbs exclude GET never create URLs.
pub fn expand_shorthand(key: &str, route: &str) -> RuleSpec {
    let Some(caps) = SHORTHAND.captures(key) else {
        return RuleSpec::new(key, route);
    };

    let verbs: Vec<Verb> = caps[1]
        .split(',')
        .filter_map(|v| v.parse().ok())
        .collect();
    let pattern = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

    without_get_parsing_only(RuleSpec::new(pattern, route).with_verbs(verbs))
}

/// Structured form of a configured rule, without language injection.
///
/// Rules whose verbs exclude GET never create URLs, whichever form they came in.
pub fn expand(rule: &RawRule) -> RuleSpec {
    match rule {
        RawRule::Structured(spec) => without_get_parsing_only(spec.clone()),
        RawRule::Shorthand(short) => expand_shorthand(&short.key, &short.route),
    }
}

fn without_get_parsing_only(spec: RuleSpec) -> RuleSpec {
    if spec.verbs.is_empty() || spec.verbs.contains(&Verb::Get) {
        spec
    } else {
        spec.with_mode(RuleMode::ParsingOnly)
    }
}

/// Rewrites rules so they capture the language segment.
#[derive(Debug, Clone)]
pub struct RuleAugmenter {
    param: String,
    segment: String,
}

impl RuleAugmenter {
    pub fn new(table: &LanguageTable, language_param: &str) -> Self {
        let codes: Vec<String> = table.codes().map(regex::escape).collect();
        Self {
            param: language_param.to_string(),
            segment: format!("<{}:({})>", language_param, codes.join("|")),
        }
    }

    /// The placeholder segment injected in front of patterns.
    pub fn segment(&self) -> &str {
        &self.segment
    }

    /// Prefix the pattern with the language segment unless the rule is already
    /// language-aware or targets an absolute URL.
    pub fn inject_language(&self, mut spec: RuleSpec) -> RuleSpec {
        if spec.declares(&self.param) || spec.pattern.contains("://") {
            return spec;
        }

        let rest = spec.pattern.trim_matches('/');
        spec.pattern = if rest.is_empty() {
            self.segment.clone()
        } else {
            format!("{}/{}", self.segment, rest)
        };
        spec
    }

    /// Expand and inject every rule, order preserved.
    pub fn augment(&self, rules: &[RawRule]) -> Vec<RuleSpec> {
        rules
            .iter()
            .map(|rule| self.inject_language(expand(rule)))
            .collect()
    }

    /// Augment and compile every rule.
    pub fn build(&self, rules: &[RawRule]) -> Result<Vec<UrlRule>, ConfigError> {
        self.augment(rules).iter().map(UrlRule::compile).collect()
    }
}
