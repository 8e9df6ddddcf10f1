//! Idempotency registries for the intercept pipeline.
//!
//! Two sets behind one lock: download ids already being handled (the claim
//! gate both capture hooks race on) and canonical URLs of verified
//! replacements that must pass through untouched. A periodic sweep bounds
//! memory over long-lived sessions.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::canon::CanonicalUrl;
use crate::host::DownloadId;

#[derive(Debug, Default)]
struct Sets {
    processed: HashSet<DownloadId>,
    safe: HashSet<CanonicalUrl>,
}

/// Shared registry of in-flight interceptions and verified replacements.
#[derive(Debug)]
pub struct InterceptRegistry {
    sets: Mutex<Sets>,
    max_processed: usize,
}

impl InterceptRegistry {
    pub fn new(max_processed: usize) -> Self {
        Self {
            sets: Mutex::new(Sets::default()),
            max_processed,
        }
    }

    /// Claims a download id. Returns false when another hook got there
    /// first; exactly one caller per id ever sees true.
    pub fn claim(&self, id: DownloadId) -> bool {
        self.sets.lock().unwrap().processed.insert(id)
    }

    /// Releases a claimed id once the original download is gone and the
    /// host may reuse it.
    pub fn release(&self, id: DownloadId) {
        self.sets.lock().unwrap().processed.remove(&id);
    }

    /// Marks a canonical URL as a verified replacement about to be issued.
    pub fn mark_safe(&self, url: &CanonicalUrl) {
        self.sets.lock().unwrap().safe.insert(url.clone());
    }

    pub fn is_safe(&self, url: &CanonicalUrl) -> bool {
        self.sets.lock().unwrap().safe.contains(url)
    }

    pub fn unmark_safe(&self, url: &CanonicalUrl) {
        self.sets.lock().unwrap().safe.remove(url);
    }

    /// Clears both sets once the processed set outgrows its bound.
    /// Returns true when a clear happened.
    pub fn sweep(&self) -> bool {
        let mut sets = self.sets.lock().unwrap();
        if sets.processed.len() <= self.max_processed {
            return false;
        }
        sets.processed.clear();
        sets.safe.clear();
        true
    }
}
