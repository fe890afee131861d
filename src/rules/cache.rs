//! Content-addressed cache for augmented rules.
//!
//! # Responsibilities
//! - Digest the raw rules and language table
//! - Reuse a stored augmented rule set when its digest matches
//! - Recompute and write back on miss, mismatch or unreadable entry
//!
//! # Design Decisions
//! - Cache failures are never fatal; they degrade to a miss
//! - Concurrent writers on one key are fine: last write wins, a wrong entry
//!   self-heals on the next digest check
//! - This is the only module that talks to the cache store

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::config::schema::CacheConfig;
use crate::error::ConfigError;
use crate::language::LanguageTable;
use crate::routing::UrlRule;
use crate::rules::augment::RuleAugmenter;
use crate::rules::spec::{RawRule, RuleSpec};

/// Cache key shared by every router; a suffix separates independent instances.
pub const CACHE_KEY_PREFIX: &str = "lang_router::rules";

/// Errors reported by a cache store.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

/// Key-value store used to persist augmented rules.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    fn set(&self, key: &str, value: String) -> Result<(), CacheError>;
}

/// Process-wide in-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    inner: Arc<DashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.inner.get(key).map(|r| r.value().clone()))
    }

    fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        self.inner.insert(key.to_string(), value);
        Ok(())
    }
}

/// One JSON file per key under a directory; survives restarts.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", hex_digest(key.as_bytes())))
    }
}

impl CacheStore for FileCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::Io(e)),
        }
    }

    fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

/// Stored pair: augmented rules and the digest of the inputs they came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub rules: Vec<RuleSpec>,
    pub digest: String,
}

/// How the augmented rule set was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Stored entry reused.
    Hit,
    /// No usable entry; recomputed and stored.
    Miss,
    /// Entry present but for different inputs; recomputed and overwritten.
    Stale,
    /// No store configured; recomputed.
    Disabled,
}

/// Result of [`RuleCache::resolve`].
#[derive(Debug, Clone)]
pub struct AugmentedRules {
    pub rules: Vec<UrlRule>,
    pub digest: String,
    pub outcome: CacheOutcome,
}

/// Bumped whenever augmentation output changes for the same input.
const RULE_FORMAT: u32 = 2;

#[derive(Serialize)]
struct DigestInput<'a> {
    format: u32,
    rules: &'a [RawRule],
    languages: &'a [(String, String)],
    param: &'a str,
}

/// Digest of everything augmentation depends on. Order-sensitive.
pub fn digest(rules: &[RawRule], table: &LanguageTable, language_param: &str) -> String {
    let input = DigestInput {
        format: RULE_FORMAT,
        rules,
        languages: table.entries(),
        param: language_param,
    };
    // Plain strings and enums: serialization cannot fail.
    let bytes = serde_json::to_vec(&input).unwrap_or_default();
    hex_digest(&bytes)
}

fn hex_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Store selected by configuration: file-backed when a directory is set, in-memory
/// otherwise, none when disabled.
pub fn open_store(config: &CacheConfig) -> Option<Arc<dyn CacheStore>> {
    if !config.enabled {
        return None;
    }
    Some(match &config.dir {
        Some(dir) => Arc::new(FileCache::new(dir)),
        None => Arc::new(MemoryCache::new()),
    })
}

/// Cache front for [`RuleAugmenter`].
#[derive(Clone)]
pub struct RuleCache {
    store: Option<Arc<dyn CacheStore>>,
    key: String,
}

impl RuleCache {
    pub fn new(store: Option<Arc<dyn CacheStore>>, key_suffix: Option<&str>) -> Self {
        Self {
            store,
            key: format!("{}{}", CACHE_KEY_PREFIX, key_suffix.unwrap_or_default()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the stored entry. Unreadable or malformed entries count as absent.
    pub fn load(&self) -> Option<CacheEntry> {
        let store = self.store.as_ref()?;
        let raw = match store.get(&self.key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Rule cache read failed");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Discarding malformed rule cache entry");
                None
            }
        }
    }

    /// Write an entry back. Failures are logged and ignored.
    pub fn store(&self, rules: &[RuleSpec], digest: &str) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        let entry = CacheEntry {
            rules: rules.to_vec(),
            digest: digest.to_string(),
        };
        let result = serde_json::to_string(&entry)
            .map_err(|e| CacheError::Unavailable(e.to_string()))
            .and_then(|value| store.set(&self.key, value));
        if let Err(e) = result {
            tracing::warn!(key = %self.key, error = %e, "Rule cache write failed");
        }
    }

    /// Compiled augmented rules for `rules`, from the store when the digest matches.
    ///
    /// A stored entry that no longer compiles counts as a miss. Only rules that fail
    /// to compile after a fresh augmentation are an error.
    pub fn resolve(
        &self,
        rules: &[RawRule],
        table: &LanguageTable,
        augmenter: &RuleAugmenter,
        language_param: &str,
    ) -> Result<AugmentedRules, ConfigError> {
        let digest = digest(rules, table, language_param);

        if self.store.is_none() {
            return Ok(AugmentedRules {
                rules: augmenter.build(rules)?,
                digest,
                outcome: CacheOutcome::Disabled,
            });
        }

        let outcome = match self.load() {
            Some(entry) if entry.digest == digest => {
                match entry.rules.iter().map(UrlRule::compile).collect::<Result<Vec<_>, _>>() {
                    Ok(compiled) => {
                        tracing::debug!(key = %self.key, "Rule cache hit");
                        return Ok(AugmentedRules {
                            rules: compiled,
                            digest,
                            outcome: CacheOutcome::Hit,
                        });
                    }
                    Err(e) => {
                        tracing::warn!(key = %self.key, error = %e, "Discarding uncompilable rule cache entry");
                        CacheOutcome::Miss
                    }
                }
            }
            Some(_) => CacheOutcome::Stale,
            None => CacheOutcome::Miss,
        };

        tracing::debug!(key = %self.key, ?outcome, "Rebuilding augmented rules");
        let compiled = augmenter.build(rules)?;
        let specs: Vec<RuleSpec> = compiled.iter().map(|r| r.spec().clone()).collect();
        self.store(&specs, &digest);

        Ok(AugmentedRules {
            rules: compiled,
            digest,
            outcome,
        })
    }
}
