//! Cursor-driven pagination
//!
//! The [`Paginator`] issues an initial request, then follows `nextPageToken`
//! until the result limit is reached or a page arrives without a token.
//! The limit is checked only between pages, so the returned sequence may
//! exceed it by up to one page minus one item; callers needing an exact
//! count truncate themselves.

use crate::api::{ApiError, RawItem, RequestDescriptor, RequestExecutor};

/// Upper bound on the number of items a paginated call collects
///
/// `None` means unbounded. A bound of zero fetches the first page only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResultLimit(Option<usize>);

impl ResultLimit {
    /// Follow continuation tokens until the listing is exhausted
    pub const UNBOUNDED: Self = Self(None);

    /// Fetch the first page and stop
    pub const FIRST_PAGE: Self = Self(Some(0));

    pub fn at_most(limit: usize) -> Self {
        Self(Some(limit))
    }

    pub fn get(&self) -> Option<usize> {
        self.0
    }

    /// Returns true if another page should be requested after `collected` items
    pub fn wants_more(&self, collected: usize) -> bool {
        match self.0 {
            None => true,
            Some(limit) => collected < limit,
        }
    }
}

impl From<Option<usize>> for ResultLimit {
    fn from(limit: Option<usize>) -> Self {
        Self(limit)
    }
}

/// Walks a cursor-paginated endpoint
pub struct Paginator<E> {
    executor: E,
}

impl<E: RequestExecutor> Paginator<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn into_executor(self) -> E {
        self.executor
    }

    /// Collects items from `initial` and its continuations
    ///
    /// # Arguments
    ///
    /// * `initial` - The first request; continuations are derived from it
    /// * `extract` - Maps a raw item to an output item; `None` skips the item
    /// * `limit` - Stop requesting pages once this many items are collected
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<T>)` - Items in the order the pages delivered them
    /// * `Err(ApiError)` - A terminal failure from the executor
    pub async fn paginate<T, F>(
        &self,
        initial: RequestDescriptor,
        extract: F,
        limit: ResultLimit,
    ) -> Result<Vec<T>, ApiError>
    where
        F: Fn(&RawItem) -> Option<T>,
    {
        let mut collected = Vec::new();
        let mut request = initial;
        let mut pages = 0usize;

        loop {
            let page = self.executor.execute(&request).await?;
            pages += 1;
            collected.extend(page.items.iter().filter_map(&extract));

            if !limit.wants_more(collected.len()) {
                tracing::debug!(
                    "Reached limit on {} after {} pages ({} items)",
                    request.endpoint(),
                    pages,
                    collected.len()
                );
                break;
            }

            match page.next_token() {
                Some(token) => request = request.continuation(token),
                None => {
                    tracing::debug!(
                        "Found all {} results after {} pages ({} items)",
                        request.endpoint(),
                        pages,
                        collected.len()
                    );
                    break;
                }
            }
        }

        Ok(collected)
    }
}
