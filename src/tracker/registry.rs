// src/tracker/registry.rs
// =============================================================================
// The URL tracker: the shared worklist of an export run.
//
// Two parties talk to it:
// - The export driver resets it, pops URLs to fetch, and reads the final
//   discovery order for the report
// - The page renderer registers every page link it emits while rendering
//   a page the driver asked for
//
// Internally the worklist keeps three views of the same data:
// - discovered: every URL in first-seen order (never shrinks during a run)
// - seen:       the same URLs as a HashSet, for O(1) duplicate checks
// - pending:    URLs discovered but not yet handed to the driver
//
// The run reaches its fixpoint when `pending` is empty: every URL that was
// ever registered has been popped exactly once.
// =============================================================================

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Worklist {
    discovered: Vec<String>,
    seen: HashSet<String>,
    pending: VecDeque<String>,
}

impl Worklist {
    // Adds a URL unless it was seen before
    // Returns true when the URL is new
    fn push(&mut self, url: &str) -> bool {
        if self.seen.contains(url) {
            return false;
        }
        self.seen.insert(url.to_string());
        self.discovered.push(url.to_string());
        self.pending.push_back(url.to_string());
        true
    }
}

/// Handle to the shared worklist.
///
/// Cloning the handle is cheap and every clone sees the same worklist, so
/// the driver and the render server can each hold one.
#[derive(Debug, Clone, Default)]
pub struct UrlTracker {
    inner: Arc<Mutex<Worklist>>,
}

impl UrlTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a page URL produced while rendering.
    ///
    /// Does nothing unless `marker_present` is true, i.e. the render was
    /// requested by the export driver. Returns true when the URL was new.
    pub fn register(&self, marker_present: bool, url: &str) -> bool {
        if !marker_present {
            return false;
        }
        let added = self.lock().push(url);
        if added {
            tracing::debug!(url, "discovered page");
        }
        added
    }

    /// Clears the worklist and seeds it with a single URL.
    pub fn reset(&self, seed: &str) {
        let mut worklist = self.lock();
        *worklist = Worklist::default();
        worklist.push(seed);
    }

    /// Takes the next URL that still has to be fetched.
    pub fn next_pending(&self) -> Option<String> {
        self.lock().pending.pop_front()
    }

    /// All URLs tracked so far, in discovery order.
    pub fn discovered(&self) -> Vec<String> {
        self.lock().discovered.clone()
    }

    /// Number of distinct URLs tracked so far.
    pub fn len(&self) -> usize {
        self.lock().discovered.len()
    }

    // Poisoning is recovered from: every write leaves the worklist usable
    fn lock(&self) -> MutexGuard<'_, Worklist> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
