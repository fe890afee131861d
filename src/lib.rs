//! Language-aware URL routing.
//!
//! Prefixes routes with a language segment (`/ru/post/1`), resolves the language of
//! incoming requests and keeps generated links in the current language.

pub mod config;
pub mod error;
pub mod http;
pub mod language;
pub mod observability;
pub mod routing;
pub mod rules;

pub use config::schema::RouterConfig;
pub use error::{ConfigError, RouteError};
pub use routing::{LanguageRouter, LanguageRoutes, Params, Parsed, PathRequest};
