//! Compiled rule cache
//!
//! Compilation is pure, so rule sets can be shared by content. The cache is
//! keyed by a hash of the rule lines and keeps the lines themselves, so a
//! hit is only taken when the content really is the same. Racing inserts
//! of the same content only waste a compilation.
//!
//! Entries are never evicted on their own. A long-lived owner that reloads
//! its rule file should call [`RuleCache::clear`] afterwards.

use crate::acl::rules::{RuleSet, compile};
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::trace;

#[derive(Debug)]
struct CacheEntry {
    lines: Vec<String>,
    set: Arc<RuleSet>,
}

impl CacheEntry {
    fn holds<S: AsRef<str>>(&self, lines: &[S]) -> bool {
        self.lines.len() == lines.len()
            && self
                .lines
                .iter()
                .zip(lines)
                .all(|(cached, line)| cached == line.as_ref())
    }
}

/// Thread-safe cache of compiled rule sets
#[derive(Debug, Default)]
pub struct RuleCache {
    entries: RwLock<HashMap<u64, CacheEntry>>,
}

impl RuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_entries(&self) -> RwLockReadGuard<'_, HashMap<u64, CacheEntry>> {
        self.entries.read().unwrap_or_else(|poisoned| {
            tracing::warn!("rule cache lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, HashMap<u64, CacheEntry>> {
        self.entries.write().unwrap_or_else(|poisoned| {
            tracing::warn!("rule cache lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Return the compiled form of `lines`, compiling on first use
    pub fn get_or_compile<S: AsRef<str>>(&self, lines: &[S]) -> Arc<RuleSet> {
        let key = content_key(lines);

        if let Some(entry) = self.read_entries().get(&key)
            && entry.holds(lines)
        {
            trace!(key, "Rule cache hit");
            return Arc::clone(&entry.set);
        }

        let compiled = Arc::new(compile(lines));
        trace!(key, "Rule cache miss");

        let mut entries = self.write_entries();
        // Another thread may have compiled the same content meanwhile
        if let Some(entry) = entries.get(&key)
            && entry.holds(lines)
        {
            return Arc::clone(&entry.set);
        }

        entries.insert(
            key,
            CacheEntry {
                lines: lines.iter().map(|l| l.as_ref().to_string()).collect(),
                set: Arc::clone(&compiled),
            },
        );
        compiled
    }

    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_entries().is_empty()
    }

    /// Drop every cached rule set, e.g. after the rule file changed
    pub fn clear(&self) {
        self.write_entries().clear();
    }
}

fn content_key<S: AsRef<str>>(lines: &[S]) -> u64 {
    let mut hasher = DefaultHasher::new();
    lines.len().hash(&mut hasher);
    for line in lines {
        line.as_ref().hash(&mut hasher);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_same_content_shares_rule_set() {
        let cache = RuleCache::new();
        let first = cache.get_or_compile(&["* @ALL 1"]);
        let second = cache.get_or_compile(&vec!["* @ALL 1".to_string()]);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_different_content_is_separate() {
        let cache = RuleCache::new();
        let a = cache.get_or_compile(&["* @ALL 1"]);
        let b = cache.get_or_compile(&["* @ALL 2"]);

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_line_boundaries_matter() {
        assert_ne!(content_key(&["ab", "c"]), content_key(&["a", "bc"]));
    }

    #[test]
    fn test_clear() {
        let cache = RuleCache::new();
        cache.get_or_compile(&["* @ALL 1"]);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_population() {
        let cache = Arc::new(RuleCache::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.get_or_compile(&["* @ALL 1", "wiki:* @user 8"]))
            })
            .collect();

        let sets: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(cache.len(), 1);
        assert!(sets.iter().all(|s| s.len() == 2));
    }

    #[test]
    fn test_colliding_key_is_recompiled() {
        let cache = RuleCache::new();
        let original = cache.get_or_compile(&["* @ALL 1"]);

        // Plant different content under the key of the lines above
        let key = content_key(&["* @ALL 1"]);
        cache.write_entries().insert(
            key,
            CacheEntry {
                lines: vec!["* @ALL 8".to_string()],
                set: Arc::new(compile(&["* @ALL 8"])),
            },
        );

        let again = cache.get_or_compile(&["* @ALL 1"]);
        assert!(!Arc::ptr_eq(&original, &again));
        assert_eq!(again.rules()[0].permission.level(), 1);
        assert_eq!(cache.len(), 1);
    }
}
