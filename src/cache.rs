//! Suffix cache.
//!
//! Holds the TLD and public suffix sets for the lifetime of its owner. Sets
//! are swapped in whole, so readers never see a partially loaded set.

use std::sync::Arc;

use log::debug;
use parking_lot::{Mutex, RwLock};

use crate::error::Result;
use crate::loader::SuffixLoader;
use crate::types::{RetryPolicy, SuffixKind, SuffixSet};

pub struct SuffixCache {
    tlds: RwLock<Arc<SuffixSet>>,
    suffixes: RwLock<Arc<SuffixSet>>,
    // One per kind: concurrent misses on a kind trigger a single fetch,
    // while the other kind loads independently
    tld_load_lock: Mutex<()>,
    suffix_load_lock: Mutex<()>,
}

impl SuffixCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            tlds: RwLock::new(Arc::new(SuffixSet::new())),
            suffixes: RwLock::new(Arc::new(SuffixSet::new())),
            tld_load_lock: Mutex::new(()),
            suffix_load_lock: Mutex::new(()),
        }
    }

    fn load_lock(&self, kind: SuffixKind) -> &Mutex<()> {
        match kind {
            SuffixKind::Tld => &self.tld_load_lock,
            SuffixKind::PublicSuffix => &self.suffix_load_lock,
        }
    }

    fn slot(&self, kind: SuffixKind) -> &RwLock<Arc<SuffixSet>> {
        match kind {
            SuffixKind::Tld => &self.tlds,
            SuffixKind::PublicSuffix => &self.suffixes,
        }
    }

    /// Current set for `kind` (possibly empty)
    pub fn get(&self, kind: SuffixKind) -> Arc<SuffixSet> {
        self.slot(kind).read().clone()
    }

    pub fn is_loaded(&self, kind: SuffixKind) -> bool {
        !self.slot(kind).read().is_empty()
    }

    /// Replace the set for `kind` wholesale
    pub fn replace(&self, kind: SuffixKind, set: SuffixSet) -> Arc<SuffixSet> {
        let set = Arc::new(set);
        *self.slot(kind).write() = set.clone();
        set
    }

    /// Return the cached set, loading it first if it is empty.
    pub fn get_or_load(
        &self,
        kind: SuffixKind,
        loader: &dyn SuffixLoader,
        policy: &RetryPolicy,
    ) -> Result<Arc<SuffixSet>> {
        // Fast path: already loaded
        let current = self.get(kind);
        if !current.is_empty() {
            return Ok(current);
        }

        let _lock = self.load_lock(kind).lock();

        // Double-check: another thread may have loaded it while we waited
        let current = self.get(kind);
        if !current.is_empty() {
            debug!("{} set loaded by another caller", kind);
            return Ok(current);
        }

        self.load_locked(kind, loader, policy)
    }

    /// Load the set for `kind` unconditionally, replacing the cached one on success.
    ///
    /// On failure the cached set is left untouched.
    pub fn refresh(
        &self,
        kind: SuffixKind,
        loader: &dyn SuffixLoader,
        policy: &RetryPolicy,
    ) -> Result<Arc<SuffixSet>> {
        let _lock = self.load_lock(kind).lock();
        self.load_locked(kind, loader, policy)
    }

    fn load_locked(
        &self,
        kind: SuffixKind,
        loader: &dyn SuffixLoader,
        policy: &RetryPolicy,
    ) -> Result<Arc<SuffixSet>> {
        let _span = tracing::debug_span!("load_suffix_set", kind = %kind).entered();
        let set = loader.load(kind, policy)?;
        Ok(self.replace(kind, set))
    }
}

impl Default for SuffixCache {
    fn default() -> Self {
        Self::new()
    }
}
