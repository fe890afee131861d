//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.

use serde::{Deserialize, Serialize};

use crate::language::RawLanguages;
use crate::rules::RawRule;

/// Root configuration for the language router.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Supported languages: codes, or code → locale mappings.
    pub languages: RawLanguages,

    /// Code used when the URL carries none.
    pub default_language: String,

    /// Name of the placeholder / parameter carrying the language code.
    pub language_param: String,

    /// Show the default language in generated URLs.
    pub show_default: bool,

    /// First route segments that bypass language handling in URL creation.
    pub exclude: Vec<String>,

    /// Separates cache entries of routers built from different configurations.
    pub cache_key_suffix: Option<String>,

    /// Inject the language placeholder into configured rules.
    pub auto_language_rules: bool,

    /// Path-based URLs. Language routing requires them.
    pub pretty_urls: bool,

    /// URL creation and parsing settings.
    pub urls: UrlConfig,

    /// Route rules, in match-priority order.
    pub rules: Vec<RawRule>,

    /// Augmented-rule cache settings.
    pub cache: CacheConfig,

    /// Demo server settings.
    pub server: ServerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            languages: RawLanguages::default(),
            default_language: "en".to_string(),
            language_param: "language".to_string(),
            show_default: false,
            exclude: vec!["gii".to_string(), "debug".to_string()],
            cache_key_suffix: None,
            auto_language_rules: true,
            pretty_urls: true,
            urls: UrlConfig::default(),
            rules: Vec::new(),
            cache: CacheConfig::default(),
            server: ServerConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// URL creation and parsing settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UrlConfig {
    /// Path prefix of the application (e.g., "/app").
    pub base_url: String,

    /// Path of the entry script (e.g., "/app/index.php").
    pub script_url: String,

    /// Prefix URLs with `script_url` instead of `base_url`.
    pub show_script_name: bool,

    /// Suffix appended to generated paths and required on parsed ones (e.g., ".html").
    pub suffix: Option<String>,

    /// Origin used for absolute URLs and host rules (e.g., "http://www.example.com").
    pub host_info: Option<String>,

    /// Only configured rules parse and create URLs.
    pub strict: bool,
}

impl Default for UrlConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            script_url: String::new(),
            show_script_name: true,
            suffix: None,
            host_info: None,
            strict: false,
        }
    }
}

/// Augmented-rule cache settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the cache.
    pub enabled: bool,

    /// Directory for the file-backed store; in-memory when unset.
    pub dir: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
        }
    }
}

/// Demo server settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::RawLanguage;
    use crate::rules::{RuleSpec, Verb};

    #[test]
    fn test_defaults() {
        let config = RouterConfig::default();
        assert_eq!(config.default_language, "en");
        assert_eq!(config.language_param, "language");
        assert!(!config.show_default);
        assert_eq!(config.exclude, vec!["gii", "debug"]);
        assert!(config.urls.show_script_name);
    }

    #[test]
    fn test_parse_toml() {
        let config: RouterConfig = toml::from_str(
            r#"
            languages = ["en", { ua = "uk" }, "ru"]
            show_default = true

            [urls]
            suffix = ".html"

            [[rules]]
            key = "POST post/<id>"
            route = "post/create"

            [[rules]]
            pattern = "post/<id>/<title>"
            route = "post/view"
            verbs = ["GET"]
            "#,
        )
        .unwrap();

        assert_eq!(
            config.languages.entries()[1],
            RawLanguage::Mapped { code: "ua".into(), locale: "uk".into() }
        );
        assert!(config.show_default);
        assert_eq!(config.urls.suffix.as_deref(), Some(".html"));
        assert_eq!(config.rules[0], RawRule::shorthand("POST post/<id>", "post/create"));
        assert_eq!(
            config.rules[1],
            RawRule::Structured(RuleSpec::new("post/<id>/<title>", "post/view").with_verbs([Verb::Get]))
        );
    }

    #[test]
    fn test_languages_table_form_keeps_order() {
        let config: RouterConfig = toml::from_str(
            r#"
            [languages]
            ua = "uk"
            en = "en_US"
            "#,
        )
        .unwrap();
        let codes: Vec<_> = config
            .languages
            .entries()
            .iter()
            .map(|e| match e {
                RawLanguage::Mapped { code, .. } => code.as_str(),
                RawLanguage::Code(code) => code.as_str(),
            })
            .collect();
        assert_eq!(codes, vec!["ua", "en"]);
    }

    #[test]
    fn test_languages_wrong_shape() {
        assert!(toml::from_str::<RouterConfig>("languages = 5").is_err());
    }
}
