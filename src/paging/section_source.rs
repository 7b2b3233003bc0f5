use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};

use super::{LoadResult, Page, PageError, PageSource, PagingState, anchored_key};
use crate::catalog::{ItemRef, SectionItem, SubResourceFetcher};

pub const DEFAULT_SECTION_CHUNK_SIZE: usize = 5;

/// Page-index-keyed chunks over a reference list that is already known in full.
///
/// Page `p` covers `refs[p * chunk .. min((p + 1) * chunk, len)]`. Items that
/// fail to load are logged and left out of the page; the page only fails when
/// every item in its chunk failed.
pub struct SectionPageSource {
    refs: Arc<[ItemRef]>,
    fetcher: SubResourceFetcher,
    chunk_size: usize,
}

impl SectionPageSource {
    pub fn new(refs: Arc<[ItemRef]>, fetcher: SubResourceFetcher, chunk_size: usize) -> Self {
        Self {
            refs,
            fetcher,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Item window for a page index.
    pub fn window(&self, page: usize) -> (usize, usize) {
        let start = page.saturating_mul(self.chunk_size).min(self.refs.len());
        let end = (start + self.chunk_size).min(self.refs.len());
        (start, end)
    }
}

#[async_trait]
impl PageSource for SectionPageSource {
    type Key = usize;
    type Value = SectionItem;

    // The chunk size is fixed; `load_size` is ignored.
    async fn load(&self, key: Option<usize>, _load_size: usize) -> LoadResult<usize, SectionItem> {
        let page = key.unwrap_or(0);
        let (start, end) = self.window(page);

        let results = self.fetcher.fetch(&self.refs, start, end).await;
        let attempted = results.len();

        let mut items = Vec::with_capacity(attempted);
        let mut first_error = None;
        for (item_ref, result) in self.refs[start..end].iter().zip(results) {
            match result {
                Ok(item) => items.push(item),
                Err(e) => {
                    warn!("Dropping '{}' ({}): {e}", item_ref.name, item_ref.resource_uri);
                    first_error.get_or_insert(e);
                }
            }
        }

        if items.is_empty() {
            if let Some(first) = first_error {
                warn!("Section page {page}: all {attempted} items failed");
                return Err(PageError::AllItemsFailed { attempted, first });
            }
        }

        debug!(
            "Section page {page} ({start}..{end} of {}): {} of {attempted} loaded",
            self.refs.len(),
            items.len()
        );

        Ok(Page {
            items,
            prev_key: if page > 0 { Some(page - 1) } else { None },
            next_key: if end < self.refs.len() { Some(page + 1) } else { None },
        })
    }

    fn refresh_key(&self, state: &PagingState<'_, usize, SectionItem>) -> Option<usize> {
        anchored_key(state, 1)
    }
}
