use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};

use super::{LoadResult, Page, PageSource, PagingState, anchored_key};
use crate::catalog::{CatalogApi, CharacterRef};

/// The catalog API refuses `limit` values above this.
pub const MAX_CHARACTER_PAGE_SIZE: usize = 20;

/// Offset-keyed pages of the top-level character list.
pub struct CharacterPageSource {
    api: Arc<dyn CatalogApi>,
    page_size: usize,
}

impl CharacterPageSource {
    pub fn new(api: Arc<dyn CatalogApi>, page_size: usize) -> Self {
        Self {
            api,
            page_size: clamp_limit(page_size),
        }
    }
}

fn clamp_limit(requested: usize) -> usize {
    requested.clamp(1, MAX_CHARACTER_PAGE_SIZE)
}

#[async_trait]
impl PageSource for CharacterPageSource {
    type Key = usize;
    type Value = CharacterRef;

    async fn load(&self, key: Option<usize>, load_size: usize) -> LoadResult<usize, CharacterRef> {
        let offset = key.unwrap_or(0);
        let limit = clamp_limit(load_size);

        let batch = match self.api.characters(offset, limit).await {
            Ok(batch) => batch,
            Err(e) => {
                warn!("Character page at offset {offset} failed: {e}");
                return Err(e.into());
            }
        };

        let returned = batch.characters.len();
        let next_key = if offset + returned >= batch.total {
            None
        } else {
            Some(offset + limit)
        };
        let prev_key = if offset == 0 {
            None
        } else {
            Some(offset.saturating_sub(limit))
        };
        debug!(
            "Character page offset={offset} limit={limit} returned={returned} total={} next={next_key:?}",
            batch.total
        );

        Ok(Page {
            items: batch.characters,
            prev_key,
            next_key,
        })
    }

    fn refresh_key(&self, state: &PagingState<'_, usize, CharacterRef>) -> Option<usize> {
        anchored_key(state, self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DataError;
    use crate::paging::PageError;
    use crate::test_support::StubCatalog;

    fn source(stub: StubCatalog) -> (Arc<StubCatalog>, CharacterPageSource) {
        let stub = Arc::new(stub);
        (stub.clone(), CharacterPageSource::new(stub, MAX_CHARACTER_PAGE_SIZE))
    }

    #[tokio::test]
    async fn test_first_page_has_no_prev_key() {
        let (_, src) = source(StubCatalog::new().with_characters(45));
        let page = src.load(None, 20).await.unwrap();
        assert_eq!(page.items.len(), 20);
        assert_eq!(page.prev_key, None);
        assert_eq!(page.next_key, Some(20));
    }

    #[tokio::test]
    async fn test_middle_page_keys() {
        let (_, src) = source(StubCatalog::new().with_characters(45));
        let page = src.load(Some(20), 20).await.unwrap();
        assert_eq!(page.prev_key, Some(0));
        assert_eq!(page.next_key, Some(40));
        assert_eq!(page.items[0].id, 20);
    }

    #[tokio::test]
    async fn test_last_page_has_no_next_key() {
        let (_, src) = source(StubCatalog::new().with_characters(45));
        let page = src.load(Some(40), 20).await.unwrap();
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.prev_key, Some(20));
        assert_eq!(page.next_key, None);
    }

    #[tokio::test]
    async fn test_exact_multiple_ends_without_next_key() {
        let (_, src) = source(StubCatalog::new().with_characters(40));
        let page = src.load(Some(20), 20).await.unwrap();
        assert_eq!(page.next_key, None);
    }

    #[tokio::test]
    async fn test_next_and_prev_key_properties_across_offsets() {
        let total = 57;
        let (_, src) = source(StubCatalog::new().with_characters(total));
        for limit in [1usize, 7, 20] {
            for offset in (0..total).step_by(limit) {
                let page = src.load(Some(offset), limit).await.unwrap();
                let returned = page.items.len();
                if offset + returned >= total {
                    assert_eq!(page.next_key, None, "offset={offset} limit={limit}");
                } else {
                    assert_eq!(
                        page.next_key,
                        Some(offset + limit),
                        "offset={offset} limit={limit}"
                    );
                }
                if offset == 0 {
                    assert_eq!(page.prev_key, None);
                } else {
                    assert_eq!(page.prev_key, Some(offset - limit));
                }
            }
        }
    }

    #[tokio::test]
    async fn test_requested_size_is_capped_at_api_limit() {
        let (stub, src) = source(StubCatalog::new().with_characters(100));
        let page = src.load(None, 50).await.unwrap();
        assert_eq!(page.items.len(), 20);
        assert_eq!(page.next_key, Some(20));
        assert_eq!(stub.character_calls(), vec![(0, 20)]);
    }

    #[tokio::test]
    async fn test_zero_size_requests_one_item() {
        let (stub, src) = source(StubCatalog::new().with_characters(3));
        src.load(None, 0).await.unwrap();
        assert_eq!(stub.character_calls(), vec![(0, 1)]);
    }

    #[tokio::test]
    async fn test_error_surfaces_as_failed_page_without_retry() {
        let (stub, src) = source(
            StubCatalog::new()
                .with_characters(45)
                .with_character_failure(20, DataError::RequestTimeout),
        );
        let result = src.load(Some(20), 20).await;
        assert_eq!(result, Err(PageError::Data(DataError::RequestTimeout)));
        assert_eq!(stub.character_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_catalog_is_single_empty_page() {
        let (_, src) = source(StubCatalog::new());
        let page = src.load(None, 20).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.prev_key, None);
        assert_eq!(page.next_key, None);
    }

    #[tokio::test]
    async fn test_refresh_key_recovers_anchor_page_offset() {
        let (_, src) = source(StubCatalog::new().with_characters(60));
        let pages = vec![
            src.load(Some(0), 20).await.unwrap(),
            src.load(Some(20), 20).await.unwrap(),
            src.load(Some(40), 20).await.unwrap(),
        ];
        let state = |anchor| PagingState {
            pages: &pages,
            anchor_position: anchor,
        };
        assert_eq!(src.refresh_key(&state(Some(5))), Some(0));
        assert_eq!(src.refresh_key(&state(Some(25))), Some(20));
        assert_eq!(src.refresh_key(&state(Some(59))), Some(40));
        assert_eq!(src.refresh_key(&state(None)), None);
    }

    #[tokio::test]
    async fn test_refresh_key_for_unaligned_page_is_its_own_offset() {
        let (_, src) = source(StubCatalog::new().with_characters(60));
        let page = src.load(Some(5), 20).await.unwrap();
        assert_eq!(page.prev_key, Some(0));
        assert_eq!(page.next_key, Some(25));

        let pages = vec![page];
        let state = PagingState {
            pages: &pages,
            anchor_position: Some(0),
        };
        assert_eq!(src.refresh_key(&state), Some(5));
    }
}
