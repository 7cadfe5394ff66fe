//! Paginated fetching with explicit cancellation.
//!
//! Every list in the storefront (shop grid, lookbook gallery) is "load page 1,
//! then load more". [`Paginator`] does that once for any [`PageSource`].
//!
//! Cancellation is explicit: callers pass a [`CancelToken`] to each load.
//! [`RequestSlot`] implements "a new request supersedes the one in flight" by
//! cancelling the previous token whenever a new one is handed out.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

use crate::api::Pagination;

// =============================================================================
// Cancellation
// =============================================================================

/// Cloneable cancellation handle. Clones share state.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

/// Marker error for an operation stopped by its [`CancelToken`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation cancelled")]
pub struct Cancelled;

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tx: Arc::new(watch::Sender::new(false)),
        }
    }

    /// Signal cancellation to everyone holding a clone.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once the token is cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this only returns on cancel.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Drive `future` unless the token is cancelled first.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if cancellation wins; `future` is dropped.
    pub async fn run<F: Future>(&self, future: F) -> Result<F::Output, Cancelled> {
        if self.is_cancelled() {
            return Err(Cancelled);
        }
        tokio::select! {
            biased;
            () = self.cancelled() => Err(Cancelled),
            output = future => Ok(output),
        }
    }
}

/// Holds the token of the request currently in flight for one consumer.
#[derive(Debug, Default)]
pub struct RequestSlot {
    current: Mutex<Option<CancelToken>>,
}

impl RequestSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel whatever is in flight and hand out a token for the next request.
    pub fn begin(&self) -> CancelToken {
        let token = CancelToken::new();
        let previous = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(token.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }
        token
    }

    /// Cancel the in-flight request, if any (consumer teardown).
    pub fn cancel(&self) {
        if let Some(token) = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            token.cancel();
        }
    }
}

// =============================================================================
// Pages
// =============================================================================

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number.
    pub page: u32,
    pub total_pages: u32,
    pub total: u64,
}

impl<T> Page<T> {
    /// Build a page from list items and optional pagination metadata.
    ///
    /// Without metadata the list is treated as the only page.
    #[must_use]
    pub fn from_parts(items: Vec<T>, pagination: Option<Pagination>, requested_page: u32) -> Self {
        match pagination {
            Some(p) => Self {
                items,
                page: p.current_page,
                total_pages: p.total_pages,
                total: p.total,
            },
            None => {
                let total = u64::try_from(items.len()).unwrap_or(u64::MAX);
                Self {
                    items,
                    page: requested_page,
                    total_pages: requested_page,
                    total,
                }
            }
        }
    }
}

/// Something that serves numbered pages.
pub trait PageSource {
    type Item: Send;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch page `page` (1-based) of `page_size` items.
    fn fetch_page(
        &self,
        page: u32,
        page_size: u32,
    ) -> impl Future<Output = Result<Page<Self::Item>, Self::Error>> + Send;
}

/// Errors from [`Paginator::load_more`].
#[derive(Debug, Error)]
pub enum PageError<E: std::error::Error + 'static> {
    #[error("request cancelled")]
    Cancelled,
    #[error(transparent)]
    Source(E),
}

/// What a call to [`Paginator::load_more`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Appended this many items.
    Loaded(usize),
    /// Nothing left to load.
    Exhausted,
}

/// Accumulates pages from a [`PageSource`].
pub struct Paginator<S: PageSource> {
    source: S,
    page_size: u32,
    next_page: u32,
    total_pages: Option<u32>,
    total: Option<u64>,
    items: Vec<S::Item>,
}

impl<S: PageSource> Paginator<S> {
    /// Start at page 1.
    pub fn new(source: S, page_size: u32) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            next_page: 1,
            total_pages: None,
            total: None,
            items: Vec::new(),
        }
    }

    /// Everything loaded so far, in page order.
    pub fn items(&self) -> &[S::Item] {
        &self.items
    }

    /// Consume the paginator, keeping the loaded items.
    pub fn into_items(self) -> Vec<S::Item> {
        self.items
    }

    /// The page the next `load_more` will request.
    pub const fn next_page(&self) -> u32 {
        self.next_page
    }

    /// Total pages, once the first page is in.
    pub const fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    /// Total items reported by the source, once the first page is in.
    pub const fn total(&self) -> Option<u64> {
        self.total
    }

    /// Whether another page may exist.
    pub fn has_more(&self) -> bool {
        self.total_pages.is_none_or(|total| self.next_page <= total)
    }

    /// Forget everything and start from page 1 again (e.g. filter changed).
    pub fn reset(&mut self) {
        self.next_page = 1;
        self.total_pages = None;
        self.total = None;
        self.items.clear();
    }

    /// Fetch the next page and append it.
    ///
    /// A cancelled load leaves the paginator exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns `PageError::Cancelled` if `cancel` fires before the page is
    /// applied, or `PageError::Source` if the source fails.
    pub async fn load_more(
        &mut self,
        cancel: &CancelToken,
    ) -> Result<LoadOutcome, PageError<S::Error>> {
        if !self.has_more() {
            return Ok(LoadOutcome::Exhausted);
        }

        let requested = self.next_page;
        let page = cancel
            .run(self.source.fetch_page(requested, self.page_size))
            .await
            .map_err(|Cancelled| PageError::Cancelled)?
            .map_err(PageError::Source)?;

        if cancel.is_cancelled() {
            debug!(page = requested, "discarding page fetched after cancellation");
            return Err(PageError::Cancelled);
        }

        let loaded = page.items.len();
        self.items.extend(page.items);
        self.total_pages = Some(page.total_pages);
        self.total = Some(page.total);
        self.next_page = requested + 1;

        // An empty page means the source ran dry, whatever the metadata says.
        if loaded == 0 {
            self.total_pages = Some(requested.saturating_sub(1));
        }

        Ok(LoadOutcome::Loaded(loaded))
    }
}
