//! Single-slot holder for "the pager currently on screen".
//!
//! Replacing the pager cancels the old one before the new one is published,
//! so a slow response for a previous selection can never reach the view.

use std::sync::{Arc, Mutex, PoisonError};

use futures::Stream;
use log::debug;
use tokio::sync::watch;
use tokio::task::AbortHandle;

use crate::paging::{PageSource, Pager, PagingSnapshot};

pub type Slot<S> = Option<Arc<Pager<S>>>;

pub struct ActivePager<S: PageSource> {
    slot: watch::Sender<Slot<S>>,
    refresh_task: Mutex<Option<AbortHandle>>,
}

impl<S: PageSource + 'static> Default for ActivePager<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PageSource + 'static> ActivePager<S> {
    pub fn new() -> Self {
        let (slot, _) = watch::channel(None);
        Self {
            slot,
            refresh_task: Mutex::new(None),
        }
    }

    pub fn current(&self) -> Slot<S> {
        self.slot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Slot<S>> {
        self.slot.subscribe()
    }

    /// Cancels the current pager, then publishes `next` and starts its first
    /// refresh. `None` leaves the slot empty.
    ///
    /// Must be called from within a Tokio runtime when `next` is `Some`.
    pub fn replace(&self, next: Option<Pager<S>>) -> Slot<S> {
        let next = next.map(Arc::new);
        let mut task = self
            .refresh_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(old) = self.slot.borrow().as_ref() {
            debug!("Tearing down previous pager");
            old.cancel();
        }
        if let Some(handle) = task.take() {
            handle.abort();
        }

        *task = next
            .as_ref()
            .and_then(|pager| pager.spawn_refresh())
            .map(|handle| handle.abort_handle());
        self.slot.send_replace(next.clone());
        next
    }

    pub fn clear(&self) {
        self.replace(None);
    }

    /// Snapshots of whichever pager is current, switching when it is replaced.
    ///
    /// Yields `None` while the slot is empty. Ends when this holder is dropped.
    pub fn snapshots(
        &self,
    ) -> impl Stream<Item = Option<PagingSnapshot<S::Key, S::Value>>> + Send + use<S> {
        let latest = Latest::<S> {
            slot: self.slot.subscribe(),
            pager: None,
            started: false,
        };
        futures::stream::unfold(latest, |mut latest| async move {
            let item = latest.next().await?;
            Some((item, latest))
        })
    }
}

impl<S: PageSource> Drop for ActivePager<S> {
    fn drop(&mut self) {
        if let Some(pager) = self.slot.borrow().as_ref() {
            pager.cancel();
        }
        let task = self
            .refresh_task
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = task.take() {
            handle.abort();
        }
    }
}

struct Latest<S: PageSource> {
    slot: watch::Receiver<Slot<S>>,
    pager: Option<watch::Receiver<PagingSnapshot<S::Key, S::Value>>>,
    started: bool,
}

enum Wake {
    Slot(bool),
    Pager(bool),
}

impl<S: PageSource> Latest<S> {
    async fn next(&mut self) -> Option<Option<PagingSnapshot<S::Key, S::Value>>> {
        if !self.started {
            self.started = true;
            self.switch();
            return Some(self.current());
        }
        loop {
            let wake = match self.pager.as_mut() {
                Some(pager) => tokio::select! {
                    r = self.slot.changed() => Wake::Slot(r.is_ok()),
                    r = pager.changed() => Wake::Pager(r.is_ok()),
                },
                None => Wake::Slot(self.slot.changed().await.is_ok()),
            };
            match wake {
                Wake::Slot(false) => return None,
                Wake::Slot(true) => {
                    self.switch();
                    return Some(self.current());
                }
                Wake::Pager(true) => return Some(self.current()),
                // The pager went away; wait for the slot to move on.
                Wake::Pager(false) => self.pager = None,
            }
        }
    }

    fn switch(&mut self) {
        let pager = self.slot.borrow_and_update().clone();
        self.pager = pager.map(|p| p.subscribe());
    }

    fn current(&mut self) -> Option<PagingSnapshot<S::Key, S::Value>> {
        self.pager
            .as_mut()
            .map(|rx| rx.borrow_and_update().clone())
    }
}
