//! # Selection Store
//!
//! The one place that knows which character is open and which section list
//! the pager screen shows. Both values are replay-latest: a subscriber that
//! arrives late sees the current value first and never the history.
//!
//! ```text
//! list screen ──select(c)──────────┐
//!                                  ▼
//!                       ┌────────────────────┐
//! detail screen ──────► │   SelectionStore   │ ──► DetailAggregator
//!   select_section(..)  │ character, section │ ──► section pager view
//!                       └────────────────────┘
//! ```

use std::sync::Arc;

use log::debug;
use tokio::sync::watch;

use crate::catalog::{CharacterRef, ItemRef};

pub type SectionSelection = Option<Arc<[ItemRef]>>;

#[derive(Clone)]
pub struct SelectionStore {
    character: Arc<watch::Sender<Option<CharacterRef>>>,
    section: Arc<watch::Sender<SectionSelection>>,
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionStore {
    pub fn new() -> Self {
        let (character, _) = watch::channel(None);
        let (section, _) = watch::channel(None);
        Self {
            character: Arc::new(character),
            section: Arc::new(section),
        }
    }

    /// Publishes the selected character. `None` clears it.
    pub fn select(&self, character: Option<CharacterRef>) {
        debug!(
            "Selected character: {:?}",
            character.as_ref().map(|c| (c.id, c.name.as_str()))
        );
        self.character.send_replace(character);
    }

    /// Publishes the reference list the section pager should show.
    pub fn select_section(&self, items: impl Into<Arc<[ItemRef]>>) {
        let items = items.into();
        debug!("Selected section with {} items", items.len());
        self.section.send_replace(Some(items));
    }

    pub fn clear_section(&self) {
        self.section.send_replace(None);
    }

    pub fn selected_character(&self) -> Option<CharacterRef> {
        self.character.borrow().clone()
    }

    pub fn selected_section(&self) -> SectionSelection {
        self.section.borrow().clone()
    }

    pub fn watch_character(&self) -> watch::Receiver<Option<CharacterRef>> {
        self.character.subscribe()
    }

    pub fn watch_section(&self) -> watch::Receiver<SectionSelection> {
        self.section.subscribe()
    }
}
