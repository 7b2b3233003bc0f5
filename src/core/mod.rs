//! # Core Application Logic
//!
//! Browser business logic on top of the paging layer. It knows nothing about
//! any specific terminal or UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • App (state)          │
//!                    │  • Action → update()    │
//!                    │  • SelectionStore       │
//!                    │  • DetailAggregator     │
//!                    └───────────┬─────────────┘
//!                                │
//!                ┌───────────────┴───────────────┐
//!                ▼                               ▼
//!         ┌────────────┐                  ┌────────────┐
//!         │   shell    │                  │   paging   │
//!         │  adapter   │                  │  catalog   │
//!         └────────────┘                  └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: the `App` struct and the current `Route`
//! - [`action`]: the `Action` enum and the `update()` reducer
//! - [`selection`]: shared replay-latest selection
//! - [`detail`]: four section pagers for the selected character
//! - [`section_view`]: the single-section pager screen
//! - [`active`]: cancel-and-replace slot for the pager on screen
//! - [`repository`]: builds pagers for the views
//! - [`config`]: layered configuration

pub mod action;
pub mod active;
pub mod config;
pub mod detail;
pub mod repository;
pub mod section_view;
pub mod selection;
pub mod state;
