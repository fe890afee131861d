//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!       (route builds, cache outcomes, rejected languages, redirects)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout, filtered by level)
//! ```
//!
//! # Design Decisions
//! - Structured fields over formatted messages
//! - Per-request events at debug/trace, build-time events at info

pub mod logging;

pub use logging::init_logging;
