//! # Detail Aggregator
//!
//! Turns the selected character into four independent section pagers.
//!
//! ```text
//!               select(c)
//! SelectionStore ───────► DetailAggregator
//!                           ├── comics  ─► ActivePager ─► Pager<SectionPageSource>
//!                           ├── series  ─► ActivePager ─► ...
//!                           ├── stories ─► ActivePager ─► ...
//!                           └── events  ─► ActivePager ─► ...
//! ```
//!
//! A new selection tears down all four previous pagers before building the
//! new ones, so results for the old character are never published. A section
//! whose reference list is empty gets no pager at all and issues no request.

use std::sync::{Arc, Mutex, PoisonError};

use futures::Stream;
use log::{debug, info};
use tokio::task::JoinHandle;

use super::active::{ActivePager, Slot};
use super::repository::CatalogRepository;
use super::selection::SelectionStore;
use crate::catalog::{CharacterRef, SectionItem, SectionType};
use crate::paging::{PagingSnapshot, SectionPageSource};

pub type SectionSnapshot = PagingSnapshot<usize, SectionItem>;

pub struct DetailAggregator {
    repository: CatalogRepository,
    applied: Mutex<Option<i64>>,
    sections: [ActivePager<SectionPageSource>; 4],
}

impl DetailAggregator {
    pub fn new(repository: CatalogRepository) -> Self {
        Self {
            repository,
            applied: Mutex::new(None),
            sections: std::array::from_fn(|_| ActivePager::new()),
        }
    }

    /// Id of the character whose sections are currently published.
    pub fn selected_id(&self) -> Option<i64> {
        *self.applied.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Rebuilds every section for `character`. Selecting the character that is
    /// already applied changes nothing.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn select(&self, character: Option<&CharacterRef>) {
        let mut applied = self.applied.lock().unwrap_or_else(PoisonError::into_inner);
        let id = character.map(|c| c.id);
        if *applied == id {
            return;
        }
        *applied = id;

        match character {
            Some(c) => info!("Loading sections for character {} ({})", c.id, c.name),
            None => debug!("Selection cleared, tearing down sections"),
        }

        for kind in SectionType::ALL {
            let slot = &self.sections[kind.index()];
            let items = character.map(|c| c.section_items(kind)).unwrap_or_default();
            if items.is_empty() {
                slot.clear();
            } else {
                slot.replace(Some(self.repository.section_info(items.into())));
            }
        }
    }

    pub fn current(&self, kind: SectionType) -> Slot<SectionPageSource> {
        self.sections[kind.index()].current()
    }

    /// The current section pager's snapshots, following every new selection.
    /// `None` means the section has nothing to show.
    pub fn section(
        &self,
        kind: SectionType,
    ) -> impl Stream<Item = Option<SectionSnapshot>> + Send + use<> {
        self.sections[kind.index()].snapshots()
    }

    /// Applies every character selection from `store` until aborted.
    pub fn follow(self: &Arc<Self>, store: &SelectionStore) -> JoinHandle<()> {
        let this = Arc::clone(self);
        let mut rx = store.watch_character();
        tokio::spawn(async move {
            loop {
                let selected = rx.borrow_and_update().clone();
                this.select(selected.as_ref());
                if rx.changed().await.is_err() {
                    break;
                }
            }
        })
    }
}
