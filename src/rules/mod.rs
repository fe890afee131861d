//! Rule subsystem.
//!
//! # Data Flow
//! ```text
//! RawRule[] (shorthand | structured)
//!     → cache.rs (digest rules + languages, look up stored entry)
//!     → augment.rs on miss (expand shorthand, inject language segment)
//!     → RuleSpec[] (augmented, order = match priority)
//!     → routing engine compiles them
//! ```

pub mod augment;
pub mod cache;
pub mod spec;

pub use augment::{expand, expand_shorthand, RuleAugmenter};
pub use cache::{
    AugmentedRules, CacheEntry, CacheError, CacheOutcome, CacheStore, FileCache, MemoryCache,
    RuleCache, open_store,
};
pub use spec::{RawRule, RuleMode, RuleSpec, ShorthandRule, Verb};
