//! Per-thread pool of reusable connection handles.

use tracing::trace;

use crate::client::Handle;
use crate::{TransportConfig, Url, UrlMap};

/// Handles checked out for one batch.
#[derive(Debug, Default)]
pub(crate) struct Acquired {
    /// Handles bound to the batch's URLs.
    pub(crate) handles: Vec<Handle>,
    /// URLs for which no handle could be created.
    pub(crate) unallocated: Vec<(Url, reqwest::Error)>,
}

/// Idle handles owned by a single thread, keyed by the URL they were last
/// bound to.
///
/// Never shared across threads, so no locking is involved.
#[derive(Debug, Default)]
pub(crate) struct HandlePool {
    available: UrlMap<Handle>,
    created: usize,
}

impl HandlePool {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Checks out one handle per URL.
    ///
    /// Handles are chosen in three tiers: an idle handle already bound to the
    /// same URL, then any idle handle rebound to the URL, then a new handle.
    pub(crate) fn acquire<'a>(
        &mut self,
        urls: impl IntoIterator<Item = &'a Url>,
        config: &TransportConfig,
    ) -> Acquired {
        let mut acquired = Acquired::default();
        let mut unmatched = Vec::new();

        for url in urls {
            match self.available.remove(url) {
                Some(handle) => {
                    trace!(%url, id = handle.id(), "reusing bound handle");
                    acquired.handles.push(handle);
                }
                None => unmatched.push(url),
            }
        }

        for url in unmatched {
            if let Some(mut handle) = self.take_any() {
                trace!(%url, id = handle.id(), "rebinding idle handle");
                handle.rebind(url.clone());
                acquired.handles.push(handle);
                continue;
            }

            match Handle::new(self.created, url.clone(), config) {
                Ok(handle) => {
                    trace!(%url, id = handle.id(), "created handle");
                    self.created += 1;
                    acquired.handles.push(handle);
                }
                Err(e) => acquired.unallocated.push((url.clone(), e)),
            }
        }

        acquired
    }

    /// Returns handles to the idle pool regardless of how their transfers
    /// ended.
    pub(crate) fn release(&mut self, handles: impl IntoIterator<Item = Handle>) {
        for mut handle in handles {
            handle.clear();
            self.available.insert(handle.url().clone(), handle);
        }
    }

    /// Number of idle handles.
    pub(crate) fn idle(&self) -> usize {
        self.available.len()
    }

    /// Number of handles this pool has ever created.
    pub(crate) const fn created(&self) -> usize {
        self.created
    }

    fn take_any(&mut self) -> Option<Handle> {
        let url = self.available.keys().next()?.clone();
        self.available.remove(&url)
    }
}
