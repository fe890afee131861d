//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the language table resolves (non-empty, default is a member)
//! - Validate URL settings (host info parses, suffix shape)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use crate::config::schema::RouterConfig;
use crate::language::LanguageTable;

/// A single semantic problem, tagged with the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !config.pretty_urls {
        errors.push(ValidationError::new(
            "pretty_urls",
            "language routing requires path-based URLs",
        ));
    }

    let param = &config.language_param;
    if param.is_empty() || !param.chars().all(|c| c.is_alphanumeric() || c == '_') {
        errors.push(ValidationError::new(
            "language_param",
            format!("`{}` is not a word identifier", param),
        ));
    }

    if config.default_language.is_empty() {
        errors.push(ValidationError::new("default_language", "must not be empty"));
    }

    if let Err(e) = LanguageTable::build(
        config.languages.clone().into(),
        config.default_language.clone().into(),
    ) {
        errors.push(ValidationError::new("languages", e.to_string()));
    }

    if config.exclude.iter().any(|e| e.trim_matches('/').is_empty()) {
        errors.push(ValidationError::new("exclude", "entries must not be empty"));
    }

    if let Some(suffix) = &config.urls.suffix {
        if suffix.contains('/') && suffix != "/" {
            errors.push(ValidationError::new(
                "urls.suffix",
                format!("`{}` must not contain '/'", suffix),
            ));
        }
    }

    if let Some(host) = &config.urls.host_info {
        match url::Url::parse(host) {
            Ok(url) if url.has_host() && url.path() == "/" => {}
            Ok(_) => errors.push(ValidationError::new(
                "urls.host_info",
                format!("`{}` must be scheme://authority without a path", host),
            )),
            Err(e) => errors.push(ValidationError::new(
                "urls.host_info",
                format!("`{}`: {}", host, e),
            )),
        }
    }

    if config.server.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "server.bind_address",
            format!("`{}` is not a socket address", config.server.bind_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
