//! Locale propagation.
//!
//! The router never writes a global directly; it pushes the resolved locale into an
//! injected [`LocaleSink`] after every successful parse.

use std::sync::{Arc, RwLock};

/// Receiver for the locale resolved by a successful parse.
pub trait LocaleSink: Send + Sync {
    fn set_locale(&self, locale: &str);
}

/// A settable locale slot that can be shared by clones.
#[derive(Debug, Clone, Default)]
pub struct SharedLocale {
    inner: Arc<RwLock<Option<String>>>,
}

impl SharedLocale {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last locale written, if any.
    pub fn get(&self) -> Option<String> {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl LocaleSink for SharedLocale {
    fn set_locale(&self, locale: &str) {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(locale.to_string());
    }
}

/// Sink that drops every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardLocale;

impl LocaleSink for DiscardLocale {
    fn set_locale(&self, _locale: &str) {}
}
