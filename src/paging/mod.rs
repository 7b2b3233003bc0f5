//! # Paging
//!
//! One generic contract, "load page `key` of size `n` and tell me the keys
//! around it", with two strategies:
//!
//! - [`CharacterPageSource`]: offset keys against the remote character list.
//! - [`SectionPageSource`]: page-index keys over an in-memory reference list,
//!   each page fanning out to the [`SubResourceFetcher`](crate::catalog::SubResourceFetcher).
//!
//! A [`Pager`] drives one source instance and publishes what it has loaded.

pub mod character_source;
pub mod pager;
pub mod section_source;

use std::fmt::Debug;

use async_trait::async_trait;
use thiserror::Error;

use crate::catalog::DataError;

pub use character_source::{CharacterPageSource, MAX_CHARACTER_PAGE_SIZE};
pub use pager::{LoadState, Pager, PagingConfig, PagingSnapshot};
pub use section_source::{DEFAULT_SECTION_CHUNK_SIZE, SectionPageSource};

/// One loaded page.
///
/// `prev_key` is `None` only on the first page; `next_key` is `None` only when
/// nothing follows.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<K, V> {
    pub items: Vec<V>,
    pub prev_key: Option<K>,
    pub next_key: Option<K>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error(transparent)]
    Data(#[from] DataError),
    /// Every item of a sub-section page failed; `first` is the first item's error.
    #[error("all {attempted} items failed to load: {first}")]
    AllItemsFailed { attempted: usize, first: DataError },
}

pub type LoadResult<K, V> = Result<Page<K, V>, PageError>;

/// The loaded pages plus the position the user is looking at.
#[derive(Debug)]
pub struct PagingState<'a, K, V> {
    pub pages: &'a [Page<K, V>],
    pub anchor_position: Option<usize>,
}

impl<K, V> PagingState<'_, K, V> {
    /// The page containing item `position`, or the last page if the position
    /// is past the end.
    pub fn closest_page_to_position(&self, position: usize) -> Option<&Page<K, V>> {
        let mut seen = 0;
        for page in self.pages {
            seen += page.items.len();
            if position < seen {
                return Some(page);
            }
        }
        self.pages.last()
    }
}

/// Key to reload around the anchor: the closest page's own key, recovered from
/// its neighbours' keys. `step` is the key distance between adjacent pages.
///
/// `next - step` is tried first since a following page is always a full step
/// away. Only the last page falls back to `prev + step`.
pub(crate) fn anchored_key<V>(state: &PagingState<'_, usize, V>, step: usize) -> Option<usize> {
    let anchor = state.anchor_position?;
    let page = state.closest_page_to_position(anchor)?;
    page.next_key
        .map(|next| next.saturating_sub(step))
        .or_else(|| page.prev_key.map(|prev| prev + step))
}

#[async_trait]
pub trait PageSource: Send + Sync {
    type Key: Copy + PartialEq + Debug + Send + Sync + 'static;
    type Value: Clone + Debug + Send + Sync + 'static;

    /// Loads one page. `key = None` means the first page.
    async fn load(
        &self,
        key: Option<Self::Key>,
        load_size: usize,
    ) -> LoadResult<Self::Key, Self::Value>;

    /// Key to reload from after invalidation. `None` reloads from the start.
    fn refresh_key(&self, state: &PagingState<'_, Self::Key, Self::Value>) -> Option<Self::Key>;
}
