//! The pager screen: one section of the selected character, page by page.
//!
//! Owns a single [`ActivePager`] that follows the section list published in
//! the [`SelectionStore`]. Each new list gets a fresh pager; the previous one
//! is cancelled.

use std::sync::{Arc, Mutex, PoisonError};

use futures::Stream;
use log::debug;
use tokio::task::JoinHandle;

use super::active::{ActivePager, Slot};
use super::detail::SectionSnapshot;
use super::repository::CatalogRepository;
use super::selection::{SectionSelection, SelectionStore};
use crate::paging::SectionPageSource;

pub struct SectionPagerView {
    repository: CatalogRepository,
    shown: Mutex<SectionSelection>,
    active: ActivePager<SectionPageSource>,
}

impl SectionPagerView {
    pub fn new(repository: CatalogRepository) -> Self {
        Self {
            repository,
            shown: Mutex::new(None),
            active: ActivePager::new(),
        }
    }

    /// Shows `items`, or nothing. Showing the list already on screen is a no-op.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn show(&self, items: SectionSelection) {
        let mut shown = self.shown.lock().unwrap_or_else(PoisonError::into_inner);
        let unchanged = match (shown.as_ref(), items.as_ref()) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }
        *shown = items.clone();

        match items {
            Some(items) => {
                debug!("Section view: {} items", items.len());
                self.active.replace(Some(self.repository.section_info(items)));
            }
            None => self.active.clear(),
        }
    }

    pub fn current(&self) -> Slot<SectionPageSource> {
        self.active.current()
    }

    pub fn snapshots(&self) -> impl Stream<Item = Option<SectionSnapshot>> + Send + use<> {
        self.active.snapshots()
    }

    /// Shows every section list published in `store` until aborted.
    pub fn follow(self: &Arc<Self>, store: &SelectionStore) -> JoinHandle<()> {
        let this = Arc::clone(self);
        let mut rx = store.watch_section();
        tokio::spawn(async move {
            loop {
                let items = rx.borrow_and_update().clone();
                this.show(items);
                if rx.changed().await.is_err() {
                    break;
                }
            }
        })
    }
}
