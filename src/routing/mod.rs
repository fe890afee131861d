//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     RuleSpec[] (augmented + original)
//!     → matcher.rs (compile patterns to anchored regexes)
//!     → engine.rs (ordered rules + URL settings, immutable)
//!     → router.rs LanguageRoutes (shared via Arc)
//!
//! Incoming request (path, verb, host):
//!     → router.rs LanguageRouter::parse (landing redirect, language checks)
//!     → engine.rs (first matching rule, or fallback)
//!     → Return: Route, Redirect, NoMatch or NotFound
//!
//! Link generation (route, params):
//!     → router.rs (inject / suppress language)
//!     → engine.rs (first rule able to render, or fallback)
//! ```
//!
//! # Design Decisions
//! - Rules compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same rule
//! - First match wins (configuration order)

pub mod engine;
pub mod matcher;
pub mod params;
pub mod router;

pub use engine::{RouteMatch, RuleEngine};
pub use matcher::UrlRule;
pub use params::Params;
pub use router::{LanguageRouter, LanguageRoutes, Parsed, PathRequest};
