use std::sync::Arc;

use futures::future::join_all;
use log::{debug, warn};

use super::client::CatalogApi;
use super::error::Envelope;
use super::types::{ItemRef, SectionItem};

/// Fans out one request per item reference and gathers the results.
///
/// Requests for a window run concurrently on the calling task. The output has
/// one envelope per reference, in input order, whatever order they complete in.
/// A failed item never fails its neighbours, and nothing is retried.
#[derive(Clone)]
pub struct SubResourceFetcher {
    api: Arc<dyn CatalogApi>,
}

impl SubResourceFetcher {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self { api }
    }

    /// Fetches `refs[start..end]`. An out-of-range window is clamped to the list.
    pub async fn fetch(
        &self,
        refs: &[ItemRef],
        start: usize,
        end: usize,
    ) -> Vec<Envelope<SectionItem>> {
        let end_clamped = end.min(refs.len());
        let start_clamped = start.min(end_clamped);
        if (start_clamped, end_clamped) != (start, end) {
            warn!(
                "fetch window {start}..{end} outside 0..{}, using {start_clamped}..{end_clamped}",
                refs.len()
            );
        }

        let window = &refs[start_clamped..end_clamped];
        debug!("Fetching {} sub-resources ({start_clamped}..{end_clamped})", window.len());

        // join_all keeps results positionally aligned with its input.
        join_all(window.iter().map(|item| self.api.section_item(item))).await
    }
}
