//! Request middleware.

pub mod language;

pub use language::{language_layer, language_middleware, ResolvedRoute};
