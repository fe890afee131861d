//! Language subsystem.
//!
//! # Data Flow
//! ```text
//! languages (list | mapping | resolver) + default (code | resolver)
//!     → table.rs (resolve, normalize, validate)
//!     → LanguageTable (immutable, shared)
//!
//! After every successful parse:
//!     current code → table locale → locale.rs sink
//! ```

pub mod locale;
pub mod table;

pub use locale::{DiscardLocale, LocaleSink, SharedLocale};
pub use table::{Deferred, LanguageTable, RawLanguage, RawLanguages};
