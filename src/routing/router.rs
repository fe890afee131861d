//! Language-aware routing.
//!
//! # Responsibilities
//! - Build the effective rule set once per configuration ([`LanguageRoutes`])
//! - Track the current language of one request ([`LanguageRouter`])
//! - Inject or suppress the language when creating URLs
//! - Validate the language found in parsed URLs and publish its locale
//!
//! # Design Decisions
//! - `LanguageRoutes` is immutable and shared (`Arc`); `LanguageRouter` is request-scoped
//! - The current language binds lazily to the default on first read
//! - Language errors surface as `RouteError::NotFound`, never as silent fallbacks

use axum::http::Method;
use std::sync::Arc;

use crate::config::schema::RouterConfig;
use crate::error::{ConfigError, RouteError};
use crate::language::{Deferred, LanguageTable, LocaleSink, RawLanguages};
use crate::routing::engine::{RouteMatch, RuleEngine};
use crate::routing::matcher::UrlRule;
use crate::routing::params::Params;
use crate::rules::cache::{self, CacheOutcome, CacheStore, RuleCache};
use crate::rules::{expand, RuleAugmenter};

/// Request data consumed by [`LanguageRouter::parse`].
#[derive(Debug, Clone)]
pub struct PathRequest {
    /// Path below the base URL; a leading slash is ignored.
    pub path_info: String,
    pub method: Method,
    /// `scheme://authority` of the request, for host rules.
    pub host_info: Option<String>,
}

impl PathRequest {
    pub fn new(path_info: impl Into<String>, method: Method) -> Self {
        Self {
            path_info: path_info.into(),
            method,
            host_info: None,
        }
    }

    pub fn get(path_info: impl Into<String>) -> Self {
        Self::new(path_info, Method::GET)
    }

    pub fn with_host(mut self, host_info: impl Into<String>) -> Self {
        self.host_info = Some(host_info.into());
        self
    }
}

/// Successful outcome of [`LanguageRouter::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Route(RouteMatch),
    /// The caller must redirect to `location`; parsing ends here.
    Redirect { location: String },
}

/// Shared, immutable routing state for one configuration.
#[derive(Debug)]
pub struct LanguageRoutes {
    table: LanguageTable,
    engine: RuleEngine,
    language_param: String,
    show_default: bool,
    exclude: Vec<String>,
    digest: String,
    cache_outcome: CacheOutcome,
}

impl LanguageRoutes {
    /// Build from a configuration with literal languages.
    pub fn build(config: &RouterConfig, store: Option<Arc<dyn CacheStore>>) -> Result<Self, ConfigError> {
        Self::build_with(
            config,
            config.languages.clone().into(),
            config.default_language.clone().into(),
            store,
        )
    }

    /// Build with languages and default language supplied separately, possibly as
    /// resolvers. The configuration's own `languages`/`default_language` are ignored.
    pub fn build_with(
        config: &RouterConfig,
        languages: Deferred<RawLanguages>,
        default_language: Deferred<String>,
        store: Option<Arc<dyn CacheStore>>,
    ) -> Result<Self, ConfigError> {
        if !config.pretty_urls {
            return Err(ConfigError::PrettyUrlsDisabled);
        }

        let table = LanguageTable::build(languages, default_language)?;

        let param = config.language_param.as_str();
        if param.is_empty() || !param.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(ConfigError::InvalidOption(format!(
                "language_param `{}` has to be a word identifier",
                param
            )));
        }

        if config.rules.is_empty() {
            tracing::warn!("No routing rules configured; only fallback routes will resolve");
        }

        let originals = config
            .rules
            .iter()
            .map(|rule| UrlRule::compile(&expand(rule)))
            .collect::<Result<Vec<_>, _>>()?;

        let (compiled, digest, cache_outcome) = if config.auto_language_rules {
            let augmenter = RuleAugmenter::new(&table, param);
            let store = if config.cache.enabled { store } else { None };
            let rule_cache = RuleCache::new(store, config.cache_key_suffix.as_deref());
            let augmented = rule_cache.resolve(&config.rules, &table, &augmenter, param)?;

            let mut compiled = augmented.rules;
            if !config.show_default {
                // Un-augmented rules keep default-language URLs (no segment) working.
                compiled.extend(originals);
            }
            (compiled, augmented.digest, augmented.outcome)
        } else {
            let digest = cache::digest(&config.rules, &table, param);
            (originals, digest, CacheOutcome::Disabled)
        };

        tracing::info!(
            languages = table.len(),
            default_language = %table.default_code(),
            rules = compiled.len(),
            cache = ?cache_outcome,
            digest = %&digest[..digest.len().min(12)],
            "Language routes built"
        );

        Ok(Self {
            engine: RuleEngine::new(compiled, &config.urls),
            table,
            language_param: param.to_string(),
            show_default: config.show_default,
            exclude: config.exclude.clone(),
            digest,
            cache_outcome,
        })
    }

    /// A fresh request-scoped router.
    pub fn router(self: &Arc<Self>, locale: Arc<dyn LocaleSink>) -> LanguageRouter {
        LanguageRouter {
            routes: Arc::clone(self),
            locale,
            current: None,
        }
    }

    pub fn table(&self) -> &LanguageTable {
        &self.table
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    pub fn language_param(&self) -> &str {
        &self.language_param
    }

    pub fn show_default(&self) -> bool {
        self.show_default
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn cache_outcome(&self) -> CacheOutcome {
        self.cache_outcome
    }

    /// Where an empty path is sent when the default language is shown.
    pub fn landing_url(&self) -> String {
        format!("{}/{}", self.engine.prefix(), self.table.default_code())
    }

    fn is_excluded(&self, route: &str) -> bool {
        let first = route.trim_matches('/').split('/').next().unwrap_or_default();
        self.exclude.iter().any(|e| e.trim_matches('/') == first)
    }
}

/// Request-scoped router holding the current language.
#[derive(Clone)]
pub struct LanguageRouter {
    routes: Arc<LanguageRoutes>,
    locale: Arc<dyn LocaleSink>,
    current: Option<String>,
}

impl LanguageRouter {
    pub fn routes(&self) -> &LanguageRoutes {
        &self.routes
    }

    /// Current language code, binding the default on first read.
    pub fn current_language(&mut self) -> &str {
        let routes = &self.routes;
        self.current
            .get_or_insert_with(|| routes.table.default_code().to_string())
    }

    /// Bind a configured language code. Unknown codes leave the state unchanged.
    pub fn set_current_language(&mut self, code: &str) -> Result<(), RouteError> {
        if !self.routes.table.contains(code) {
            return Err(RouteError::InvalidLanguage(code.to_string()));
        }
        self.current = Some(code.to_string());
        Ok(())
    }

    /// Locale of the current language.
    pub fn current_locale(&mut self) -> String {
        let code = self.current_language().to_string();
        self.routes.table.locale(&code).unwrap_or(&code).to_string()
    }

    pub fn is_current_default(&mut self) -> bool {
        let default = self.routes.table.default_code().to_string();
        self.current_language() == default
    }

    /// Create a URL for `route`.
    ///
    /// Without an explicit language parameter the current language is used. An empty
    /// language value means "no language". The default language is left out unless
    /// `show_default` is set.
    pub fn generate(&mut self, route: &str, params: &Params) -> Result<String, RouteError> {
        let params = self.language_params(route, params);
        self.routes.engine.create_url(route, &params)
    }

    /// Like [`generate`](Self::generate), but absolute.
    pub fn generate_absolute(
        &mut self,
        route: &str,
        params: &Params,
        scheme: Option<&str>,
    ) -> Result<String, RouteError> {
        let params = self.language_params(route, params);
        self.routes.engine.create_absolute_url(route, &params, scheme)
    }

    fn language_params(&mut self, route: &str, params: &Params) -> Params {
        if self.routes.is_excluded(route) {
            return params.clone();
        }

        let param = self.routes.language_param.clone();
        let mut params = params.clone();
        if !params.contains(&param) {
            let current = self.current_language().to_string();
            params.insert(param.as_str(), current);
        }

        let suppress = match params.get(&param) {
            Some(code) => {
                code.is_empty()
                    || (!self.routes.show_default && code == self.routes.table.default_code())
            }
            None => false,
        };
        if suppress {
            params.remove(&param);
        }
        params
    }

    /// Resolve a request.
    ///
    /// `Ok(None)` means no rule matched. A language in the URL becomes the current
    /// language; unsupported codes and an explicit default (while hidden) are
    /// `RouteError::NotFound`. The resolved locale is pushed to the locale sink.
    pub fn parse(&mut self, request: &PathRequest) -> Result<Option<Parsed>, RouteError> {
        let routes = Arc::clone(&self.routes);

        if routes.show_default && request.path_info.trim_matches('/').is_empty() {
            let location = routes.landing_url();
            tracing::debug!(location = %location, "Redirecting to default language");
            return Ok(Some(Parsed::Redirect { location }));
        }

        let Some(matched) = routes.engine.parse(
            &request.path_info,
            &request.method,
            request.host_info.as_deref(),
        ) else {
            return Ok(None);
        };

        if let Some(code) = matched.params.get(&routes.language_param) {
            if self.set_current_language(code).is_err() {
                tracing::warn!(language = %code, "Unsupported language in URL");
                return Err(RouteError::NotFound(format!("unsupported language `{}`", code)));
            }
            if !routes.show_default && code == routes.table.default_code() {
                return Err(RouteError::NotFound(
                    "default language must not appear explicitly in the URL".to_string(),
                ));
            }
        }

        let locale = self.current_locale();
        tracing::debug!(route = %matched.route, locale = %locale, "Request language resolved");
        self.locale.set_locale(&locale);

        Ok(Some(Parsed::Route(matched)))
    }
}

impl std::fmt::Debug for LanguageRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageRouter")
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::{DiscardLocale, SharedLocale};
    use crate::rules::RuleSpec;

    fn config() -> RouterConfig {
        RouterConfig {
            languages: RawLanguages::default().with_locale("ua", "uk").with_code("en").with_code("ru"),
            ..RouterConfig::default()
        }
    }

    fn router(config: &RouterConfig) -> LanguageRouter {
        Arc::new(LanguageRoutes::build(config, None).unwrap()).router(Arc::new(DiscardLocale))
    }

    #[test]
    fn test_current_binds_default_lazily() {
        let mut r = router(&config());
        assert!(r.current.is_none());
        assert_eq!(r.current_language(), "en");
        assert_eq!(r.current.as_deref(), Some("en"));
        assert!(r.is_current_default());
    }

    #[test]
    fn test_set_current_rejects_unknown() {
        let mut r = router(&config());
        r.set_current_language("ua").unwrap();
        assert_eq!(
            r.set_current_language("de"),
            Err(RouteError::InvalidLanguage("de".into()))
        );
        assert_eq!(r.current_language(), "ua");
        assert_eq!(r.current_locale(), "uk");
    }

    #[test]
    fn test_generate_suppresses_default_and_empty() {
        let mut r = router(&config());
        let params = Params::new().with("id", 1);
        assert_eq!(r.generate("post/view", &params).unwrap(), "/post/view?id=1");
        assert_eq!(
            r.generate("post/view", &params.clone().with("language", "")).unwrap(),
            "/post/view?id=1"
        );
        assert_eq!(
            r.generate("post/view", &params.clone().with("language", "ru")).unwrap(),
            "/post/view?id=1&language=ru"
        );
    }

    #[test]
    fn test_parse_publishes_locale() {
        let mut cfg = config();
        cfg.rules = vec![RuleSpec::new("post/<id>", "post/view").into()];
        let routes = Arc::new(LanguageRoutes::build(&cfg, None).unwrap());
        let locale = SharedLocale::new();
        let mut r = routes.router(Arc::new(locale.clone()));

        let parsed = r.parse(&PathRequest::get("ua/post/3")).unwrap();
        let Some(Parsed::Route(m)) = parsed else {
            panic!("expected a route, got {:?}", parsed);
        };
        assert_eq!(m.route, "post/view");
        assert_eq!(m.params.get("language"), Some("ua"));
        assert_eq!(locale.get().as_deref(), Some("uk"));
    }

    #[test]
    fn test_invalid_language_param_name() {
        let mut cfg = config();
        cfg.language_param = "lang-code".into();
        assert!(matches!(
            LanguageRoutes::build(&cfg, None),
            Err(ConfigError::InvalidOption(_))
        ));
    }

    #[test]
    fn test_exclude_entries_ignore_slashes() {
        let mut cfg = config();
        cfg.exclude = vec!["/gii/".into()];
        let mut r = router(&cfg);
        r.set_current_language("ru").unwrap();
        assert_eq!(r.generate("gii/model", &Params::new()).unwrap(), "/gii/model");
        assert_eq!(r.generate("debug/view", &Params::new()).unwrap(), "/debug/view?language=ru");
    }
}
