//! Error taxonomy.
//!
//! - [`ConfigError`]: construction time, never recovered.
//! - [`RouteError`]: request time, the caller turns it into a 404-equivalent outcome.
//!
//! Cache failures have their own type in [`crate::rules::cache`] and are always
//! downgraded to a cache miss.

use thiserror::Error;

/// Errors raised while building the language table or the rule set.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Language routing needs path-based (pretty) URLs.
    #[error("pretty URLs have to be enabled for language routing")]
    PrettyUrlsDisabled,

    /// The configured language source is neither a list nor a mapping.
    #[error("languages have to be a list or a mapping")]
    LanguagesShape,

    /// No languages configured.
    #[error("languages have to contain at least 1 item")]
    LanguagesEmpty,

    /// The default language code is not one of the configured codes.
    #[error("default language `{0}` has to exist in languages")]
    DefaultLanguageMissing(String),

    /// A mapping entry whose locale is not a string.
    #[error("locale for language `{0}` has to be a string")]
    InvalidLocale(String),

    /// A rule descriptor the pattern engine cannot compile.
    #[error("invalid rule `{pattern}`: {reason}")]
    InvalidRule { pattern: String, reason: String },

    /// Any other rejected option.
    #[error("invalid option: {0}")]
    InvalidOption(String),
}

/// Errors raised while parsing a request or creating a URL.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// Attempted to bind a language code that is not configured.
    #[error("unsupported language `{0}`")]
    InvalidLanguage(String),

    /// The request cannot be served (unsupported or suppressed language in the URL).
    #[error("not found: {0}")]
    NotFound(String),

    /// No rule can create a URL for the route (strict mode only).
    #[error("no rule can create a URL for route `{0}`")]
    NoRoute(String),
}

impl RouteError {
    /// True for errors that map onto an HTTP 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RouteError::NotFound(_) | RouteError::InvalidLanguage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::DefaultLanguageMissing("en".into());
        assert_eq!(err.to_string(), "default language `en` has to exist in languages");

        let err = ConfigError::InvalidRule {
            pattern: "post/<id:(>".into(),
            reason: "unclosed group".into(),
        };
        assert!(err.to_string().contains("post/<id:(>"));

        assert!(RouteError::NotFound("x".into()).is_not_found());
        assert!(!RouteError::NoRoute("post/view".into()).is_not_found());
    }
}
