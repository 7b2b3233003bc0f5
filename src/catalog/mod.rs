//! # Catalog
//!
//! Everything that talks to the remote comic catalog.
//!
//! ```text
//! RequestSigner ──► MarvelClient ──► CatalogApi (trait) ──► SubResourceFetcher
//!    (ts/hash)       (reqwest)          ▲
//!                                       └── stubbed in tests
//! ```
//!
//! ## Modules
//!
//! - [`signer`]: per-request `ts`/`apikey`/`hash` parameters
//! - [`error`]: `DataError` and the `Envelope<T>` result type
//! - [`types`]: wire DTOs and the domain types built from them
//! - [`client`]: the `CatalogApi` seam and its HTTP implementation
//! - [`fetcher`]: order-preserving fan-out over item references

pub mod client;
pub mod error;
pub mod fetcher;
pub mod signer;
pub mod types;

pub use client::{CatalogApi, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, MarvelClient};
pub use error::{DataError, Envelope};
pub use fetcher::SubResourceFetcher;
pub use signer::{Clock, FixedClock, RequestSigner, Signature, SystemClock};
pub use types::{
    CharacterBatch, CharacterRef, ItemRef, RelatedLink, ResourceList, ResourceRefs, SectionItem,
    SectionType, Thumbnail,
};
