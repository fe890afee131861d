//! HTTP integration subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request
//!     → server.rs (Axum setup, TraceLayer)
//!     → middleware/language.rs (path info, LanguageRouter::parse)
//!         → 302 to the landing URL
//!         → 404 on unknown or hidden-default language, or no match
//!         → ResolvedRoute + LanguageRouter in request extensions
//!     → handler
//! ```

pub mod middleware;
pub mod server;

pub use middleware::{language_layer, ResolvedRoute};
pub use server::build_app;
