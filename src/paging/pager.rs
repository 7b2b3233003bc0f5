//! # Pager
//!
//! Runs one [`PageSource`] instance and owns its page list.
//!
//! ```text
//!           refresh / load_next / load_prev
//!   Idle ──────────────► Loading ──┬──► Loaded ──► Loading ...
//!                                  └──► Failed(PageError)
//! ```
//!
//! Refresh, prepend and append each have their own [`LoadState`], so a failed
//! append shows up as an inline error while the loaded pages stay put, and a
//! failed first refresh shows up as a full-screen error.
//!
//! State is published through a `watch` channel: late subscribers see the
//! latest snapshot only. After [`Pager::cancel`] nothing is applied any more;
//! in-flight results are dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use futures::Stream;
use log::debug;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::{LoadResult, Page, PageError, PageSource, PagingState};

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    Failed(PageError),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn error(&self) -> Option<&PageError> {
        match self {
            LoadState::Failed(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Refresh,
    Prepend,
    Append,
}

#[derive(Debug, Clone, Copy)]
pub struct PagingConfig<K> {
    pub page_size: usize,
    /// Key of the first load. `None` is the source's own first page.
    pub initial_key: Option<K>,
}

/// Everything a view needs to render one paged list.
#[derive(Debug, Clone)]
pub struct PagingSnapshot<K, V> {
    pub pages: Vec<Page<K, V>>,
    pub refresh: LoadState,
    pub prepend: LoadState,
    pub append: LoadState,
    pub anchor_position: Option<usize>,
}

impl<K, V> Default for PagingSnapshot<K, V> {
    fn default() -> Self {
        Self {
            pages: Vec::new(),
            refresh: LoadState::Idle,
            prepend: LoadState::Idle,
            append: LoadState::Idle,
            anchor_position: None,
        }
    }
}

impl<K: Copy, V> PagingSnapshot<K, V> {
    pub fn items(&self) -> impl Iterator<Item = &V> {
        self.pages.iter().flat_map(|p| p.items.iter())
    }

    pub fn item_count(&self) -> usize {
        self.pages.iter().map(|p| p.items.len()).sum()
    }

    pub fn next_key(&self) -> Option<K> {
        self.pages.last().and_then(|p| p.next_key)
    }

    pub fn prev_key(&self) -> Option<K> {
        self.pages.first().and_then(|p| p.prev_key)
    }

    /// True once a page with no successor has been loaded.
    pub fn end_reached(&self) -> bool {
        !self.pages.is_empty() && self.next_key().is_none()
    }

    pub fn is_loading(&self) -> bool {
        self.refresh.is_loading() || self.prepend.is_loading() || self.append.is_loading()
    }

    /// Nothing loaded and the last refresh failed.
    pub fn full_screen_error(&self) -> Option<&PageError> {
        if self.pages.is_empty() {
            self.refresh.error()
        } else {
            None
        }
    }

    fn state_mut(&mut self, direction: Direction) -> &mut LoadState {
        match direction {
            Direction::Refresh => &mut self.refresh,
            Direction::Prepend => &mut self.prepend,
            Direction::Append => &mut self.append,
        }
    }
}

/// A load that has been marked `Loading` and is waiting for its result.
struct Ticket<K> {
    direction: Direction,
    key: Option<K>,
    epoch: u64,
}

pub struct Pager<S: PageSource> {
    source: S,
    config: PagingConfig<S::Key>,
    state: watch::Sender<PagingSnapshot<S::Key, S::Value>>,
    /// Bumped by every applied refresh; older prepends/appends are stale.
    epoch: AtomicU64,
    cancelled: AtomicBool,
}

impl<S: PageSource> Pager<S> {
    pub fn new(source: S, config: PagingConfig<S::Key>) -> Self {
        let (state, _) = watch::channel(PagingSnapshot::default());
        Self {
            source,
            config,
            state,
            epoch: AtomicU64::new(0),
            cancelled: AtomicBool::new(false),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn snapshot(&self) -> PagingSnapshot<S::Key, S::Value> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PagingSnapshot<S::Key, S::Value>> {
        self.state.subscribe()
    }

    /// Snapshots as a stream: the current one first, then every change.
    /// Ends when the pager is dropped.
    pub fn stream(&self) -> impl Stream<Item = PagingSnapshot<S::Key, S::Value>> + Send + use<S> {
        let rx = self.state.subscribe();
        futures::stream::unfold((rx, true), |(mut rx, first)| async move {
            if !first && rx.changed().await.is_err() {
                return None;
            }
            let snapshot = rx.borrow_and_update().clone();
            Some((snapshot, (rx, false)))
        })
    }

    /// Records the position the user is looking at, for the next refresh.
    pub fn set_anchor(&self, position: usize) {
        self.state.send_modify(|s| s.anchor_position = Some(position));
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Stops applying results. In-flight loads finish but are discarded.
    pub fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!("Pager cancelled");
        self.state.send_if_modified(|s| {
            let mut changed = false;
            for direction in [Direction::Refresh, Direction::Prepend, Direction::Append] {
                let state = s.state_mut(direction);
                if state.is_loading() {
                    *state = LoadState::Idle;
                    changed = true;
                }
            }
            changed
        });
    }

    /// Reloads around the anchor (or from the initial key) and replaces all pages.
    pub async fn refresh(&self) -> LoadState {
        match self.begin(Direction::Refresh) {
            Some(ticket) => self.complete(ticket).await,
            None => self.current(Direction::Refresh),
        }
    }

    /// Appends the page after the last one. No-op at the end of the list.
    pub async fn load_next(&self) -> LoadState {
        match self.begin(Direction::Append) {
            Some(ticket) => self.complete(ticket).await,
            None => self.current(Direction::Append),
        }
    }

    /// Prepends the page before the first one. No-op at the start of the list.
    pub async fn load_prev(&self) -> LoadState {
        match self.begin(Direction::Prepend) {
            Some(ticket) => self.complete(ticket).await,
            None => self.current(Direction::Prepend),
        }
    }

    /// Waits until no direction is loading and returns that snapshot.
    pub async fn settled(&self) -> PagingSnapshot<S::Key, S::Value> {
        let mut rx = self.state.subscribe();
        loop {
            {
                let snapshot = rx.borrow_and_update();
                if !snapshot.is_loading() {
                    return snapshot.clone();
                }
            }
            if rx.changed().await.is_err() {
                return self.snapshot();
            }
        }
    }

    fn current(&self, direction: Direction) -> LoadState {
        let s = self.state.borrow();
        match direction {
            Direction::Refresh => s.refresh.clone(),
            Direction::Prepend => s.prepend.clone(),
            Direction::Append => s.append.clone(),
        }
    }

    /// Marks `direction` as loading and works out its key, or returns `None`
    /// when there is nothing to do.
    fn begin(&self, direction: Direction) -> Option<Ticket<S::Key>> {
        if self.is_cancelled() {
            return None;
        }
        let mut ticket = None;
        self.state.send_if_modified(|s| {
            if s.state_mut(direction).is_loading() {
                return false;
            }
            let key = match direction {
                Direction::Refresh => {
                    if s.pages.is_empty() {
                        self.config.initial_key
                    } else {
                        let state = PagingState {
                            pages: &s.pages,
                            anchor_position: s.anchor_position,
                        };
                        self.source.refresh_key(&state).or(self.config.initial_key)
                    }
                }
                // Nothing loaded yet: the first refresh has to come first.
                Direction::Append => match s.next_key() {
                    Some(key) if !s.pages.is_empty() => Some(key),
                    _ => return false,
                },
                Direction::Prepend => match s.prev_key() {
                    Some(key) if !s.pages.is_empty() => Some(key),
                    _ => return false,
                },
            };
            *s.state_mut(direction) = LoadState::Loading;
            ticket = Some(Ticket {
                direction,
                key,
                epoch: self.epoch.load(Ordering::SeqCst),
            });
            true
        });
        ticket
    }

    async fn complete(&self, ticket: Ticket<S::Key>) -> LoadState {
        debug!("{:?} load with key {:?}", ticket.direction, ticket.key);
        let result = self.source.load(ticket.key, self.config.page_size).await;
        self.apply(ticket, result)
    }

    fn apply(&self, ticket: Ticket<S::Key>, result: LoadResult<S::Key, S::Value>) -> LoadState {
        if self.is_cancelled() {
            debug!("Discarding {:?} result of a cancelled pager", ticket.direction);
            return LoadState::Idle;
        }
        let direction = ticket.direction;
        let stale = direction != Direction::Refresh
            && self.epoch.load(Ordering::SeqCst) != ticket.epoch;

        let mut outcome = LoadState::Idle;
        self.state.send_modify(|s| {
            if stale {
                debug!("Discarding {direction:?} page loaded before the last refresh");
                *s.state_mut(direction) = LoadState::Idle;
                return;
            }
            outcome = match result {
                Ok(page) => {
                    match direction {
                        Direction::Refresh => {
                            self.epoch.fetch_add(1, Ordering::SeqCst);
                            s.pages = vec![page];
                            // A fresh page list invalidates the edge states.
                            s.prepend = LoadState::Idle;
                            s.append = LoadState::Idle;
                        }
                        Direction::Prepend => s.pages.insert(0, page),
                        Direction::Append => s.pages.push(page),
                    }
                    LoadState::Loaded
                }
                Err(e) => LoadState::Failed(e),
            };
            *s.state_mut(direction) = outcome.clone();
        });
        outcome
    }
}

impl<S: PageSource + 'static> Pager<S> {
    /// Marks the refresh as loading right away and runs it on a new task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn_refresh(self: &Arc<Self>) -> Option<JoinHandle<LoadState>> {
        let ticket = self.begin(Direction::Refresh)?;
        let pager = Arc::clone(self);
        Some(tokio::spawn(async move { pager.complete(ticket).await }))
    }
}
