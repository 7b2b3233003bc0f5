//! Upward interface of the data layer.
//!
//! Views never build page sources themselves; they ask the repository for a
//! pager over the character list or over one section's reference list.

use std::sync::Arc;

use log::debug;

use crate::catalog::{CatalogApi, ItemRef, SubResourceFetcher};
use crate::paging::{
    CharacterPageSource, DEFAULT_SECTION_CHUNK_SIZE, MAX_CHARACTER_PAGE_SIZE, Pager, PagingConfig,
    SectionPageSource,
};

pub type CharacterPager = Pager<CharacterPageSource>;
pub type SectionPager = Pager<SectionPageSource>;

#[derive(Clone)]
pub struct CatalogRepository {
    api: Arc<dyn CatalogApi>,
    fetcher: SubResourceFetcher,
    section_chunk_size: usize,
}

impl CatalogRepository {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self::with_chunk_size(api, DEFAULT_SECTION_CHUNK_SIZE)
    }

    pub fn with_chunk_size(api: Arc<dyn CatalogApi>, section_chunk_size: usize) -> Self {
        let fetcher = SubResourceFetcher::new(Arc::clone(&api));
        Self {
            api,
            fetcher,
            section_chunk_size: section_chunk_size.max(1),
        }
    }

    /// A pager over the character list, `limit` per page, whose first page
    /// contains `offset`.
    ///
    /// Offsets are rounded down to a page boundary so every page, including
    /// the ones prepended later, starts at a multiple of the page size.
    pub fn characters(&self, offset: usize, limit: usize) -> CharacterPager {
        let page_size = limit.clamp(1, MAX_CHARACTER_PAGE_SIZE);
        let aligned = offset - offset % page_size;
        if aligned != offset {
            debug!("Character offset {offset} aligned down to {aligned}");
        }
        debug!("New character pager: offset={aligned} page_size={page_size}");
        Pager::new(
            CharacterPageSource::new(Arc::clone(&self.api), page_size),
            PagingConfig {
                page_size,
                initial_key: (aligned > 0).then_some(aligned),
            },
        )
    }

    /// A pager over one section's item references, fetched chunk by chunk.
    pub fn section_info(&self, items: Arc<[ItemRef]>) -> SectionPager {
        debug!(
            "New section pager over {} items, chunk size {}",
            items.len(),
            self.section_chunk_size
        );
        Pager::new(
            SectionPageSource::new(items, self.fetcher.clone(), self.section_chunk_size),
            PagingConfig {
                page_size: self.section_chunk_size,
                initial_key: None,
            },
        )
    }
}
