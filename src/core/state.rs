//! # Application State
//!
//! Core state for the catalog browser. No terminal types here; presentation
//! lives in the `shell` adapter.
//!
//! ```text
//! App
//! ├── repository: CatalogRepository          // builds pagers
//! ├── selection: SelectionStore              // open character / section
//! ├── characters: Arc<CharacterPager>        // the list screen
//! ├── detail: Arc<DetailAggregator>          // four section pagers
//! ├── section_view: Arc<SectionPagerView>    // the pager screen
//! ├── route: Route                           // which screen is shown
//! └── status_message: String                 // status line text
//! ```
//!
//! Navigation changes only happen through `update(app, action)` in action.rs.

use std::sync::Arc;

use log::debug;
use tokio::task::AbortHandle;

use super::detail::DetailAggregator;
use super::repository::{CatalogRepository, CharacterPager};
use super::section_view::SectionPagerView;
use super::selection::SelectionStore;
use crate::catalog::SectionType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Detail,
    Section(SectionType),
}

pub struct App {
    pub repository: CatalogRepository,
    pub selection: SelectionStore,
    pub characters: Arc<CharacterPager>,
    pub detail: Arc<DetailAggregator>,
    pub section_view: Arc<SectionPagerView>,
    pub route: Route,
    pub status_message: String,
    followers: Vec<AbortHandle>,
}

impl App {
    pub fn new(repository: CatalogRepository, page_size: usize) -> Self {
        Self {
            characters: Arc::new(repository.characters(0, page_size)),
            detail: Arc::new(DetailAggregator::new(repository.clone())),
            section_view: Arc::new(SectionPagerView::new(repository.clone())),
            selection: SelectionStore::new(),
            repository,
            route: Route::Home,
            status_message: String::from("Welcome to Comicdex!"),
            followers: Vec::new(),
        }
    }

    /// Wires the views to the selection store and loads the first page.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self) {
        if !self.followers.is_empty() {
            return;
        }
        debug!("Starting followers");
        self.followers.push(self.detail.follow(&self.selection).abort_handle());
        self.followers
            .push(self.section_view.follow(&self.selection).abort_handle());
        self.characters.spawn_refresh();
    }

    /// Applies the current selection to the views right away instead of
    /// waiting for the followers to wake up. Idempotent.
    pub fn sync_views(&self) {
        self.detail.select(self.selection.selected_character().as_ref());
        self.section_view.show(self.selection.selected_section());
    }
}

impl Drop for App {
    fn drop(&mut self) {
        for handle in self.followers.drain(..) {
            handle.abort();
        }
        self.characters.cancel();
    }
}
