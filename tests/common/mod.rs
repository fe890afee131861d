//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use lang_router::config::RouterConfig;
use lang_router::language::{DiscardLocale, RawLanguages};
use lang_router::routing::{LanguageRouter, LanguageRoutes};
use lang_router::rules::{CacheStore, RawRule};

/// `ua → uk`, `en`, `ru`; default `en`.
pub fn languages() -> RawLanguages {
    RawLanguages::default()
        .with_locale("ua", "uk")
        .with_code("en")
        .with_code("ru")
}

/// Config with the standard languages, `base_url = "/"` and no script name.
pub fn config() -> RouterConfig {
    let mut config = RouterConfig {
        languages: languages(),
        ..RouterConfig::default()
    };
    config.urls.base_url = "/".into();
    config.urls.script_url = String::new();
    config
}

pub fn config_with_rules(rules: Vec<RawRule>) -> RouterConfig {
    RouterConfig {
        rules,
        ..config()
    }
}

pub fn routes(config: &RouterConfig) -> Arc<LanguageRoutes> {
    Arc::new(LanguageRoutes::build(config, None).unwrap())
}

pub fn routes_cached(config: &RouterConfig, store: Arc<dyn CacheStore>) -> Arc<LanguageRoutes> {
    Arc::new(LanguageRoutes::build(config, Some(store)).unwrap())
}

pub fn router(config: &RouterConfig) -> LanguageRouter {
    routes(config).router(Arc::new(DiscardLocale))
}
