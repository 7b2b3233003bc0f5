//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::catalog::{
    CatalogApi, CharacterBatch, CharacterRef, DataError, Envelope, ItemRef, ResourceList,
    ResourceRefs, SectionItem, SectionType, Thumbnail,
};
use crate::core::repository::CatalogRepository;
use crate::core::state::App;

/// `n` item references whose URIs the stub knows how to answer.
pub fn item_refs(prefix: &str, n: usize) -> Vec<ItemRef> {
    (0..n)
        .map(|i| ItemRef::new(format!("{prefix} #{i}"), format!("stub://{prefix}/{i}")))
        .collect()
}

/// What the stub returns for `stub://{prefix}/{index}`.
pub fn section_item(prefix: &str, index: usize) -> SectionItem {
    SectionItem {
        id: index as i64,
        name: format!("{prefix} #{index}"),
        image_url: Some(format!("stub://img/{prefix}/{index}.jpg")),
    }
}

/// Prefix used for a character's items in one section, e.g. `c7-comics`.
pub fn section_prefix(character_id: i64, section: SectionType) -> String {
    format!("c{character_id}-{}", section.label().to_ascii_lowercase())
}

/// A character with `counts[section]` item references per section.
pub fn character(id: i64, counts: &[(SectionType, usize)]) -> CharacterRef {
    let list = |section: SectionType| {
        let n = counts
            .iter()
            .find(|(s, _)| *s == section)
            .map(|(_, n)| *n)
            .unwrap_or(0);
        ResourceList {
            collection_uri: format!("stub://c{id}/{}", section.label()),
            items: item_refs(&section_prefix(id, section), n),
        }
    };
    CharacterRef {
        id,
        name: format!("Character {id}"),
        description: String::new(),
        thumbnail: Thumbnail::default(),
        resources: ResourceRefs {
            comics: list(SectionType::Comics),
            series: list(SectionType::Series),
            stories: list(SectionType::Stories),
            events: list(SectionType::Events),
        },
        related_links: Vec::new(),
    }
}

fn parse_stub_uri(uri: &str) -> Option<(String, usize)> {
    let rest = uri.strip_prefix("stub://")?;
    let (prefix, index) = rest.rsplit_once('/')?;
    Some((prefix.to_string(), index.parse().ok()?))
}

/// In-memory catalog with per-URI delays, failures and gates.
#[derive(Default)]
pub struct StubCatalog {
    delays: HashMap<String, Duration>,
    failures: HashMap<String, DataError>,
    gates: HashMap<String, Arc<Notify>>,
    characters: Vec<CharacterRef>,
    character_failures: HashMap<usize, DataError>,
    calls: Mutex<Vec<String>>,
    completed: Mutex<Vec<String>>,
    character_calls: Mutex<Vec<(usize, usize)>>,
    started: Notify,
}

impl StubCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, uri: &str, delay: Duration) -> Self {
        self.delays.insert(uri.to_string(), delay);
        self
    }

    pub fn with_failure(mut self, uri: &str, error: DataError) -> Self {
        self.failures.insert(uri.to_string(), error);
        self
    }

    /// The request for `uri` blocks until the returned gate is notified.
    pub fn with_gate(mut self, uri: &str) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gates.insert(uri.to_string(), gate.clone());
        (self, gate)
    }

    /// Serves `total` generated characters with ids `0..total`.
    pub fn with_characters(mut self, total: usize) -> Self {
        self.characters = (0..total as i64).map(|id| character(id, &[])).collect();
        self
    }

    pub fn with_character_failure(mut self, offset: usize, error: DataError) -> Self {
        self.character_failures.insert(offset, error);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn completion_order(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }

    pub fn character_calls(&self) -> Vec<(usize, usize)> {
        self.character_calls.lock().unwrap().clone()
    }

    /// Waits until at least `n` section-item requests have started.
    pub async fn wait_for_calls(&self, n: usize) {
        loop {
            let notified = self.started.notified();
            if self.call_count() >= n {
                return;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl CatalogApi for StubCatalog {
    async fn characters(&self, offset: usize, limit: usize) -> Envelope<CharacterBatch> {
        self.character_calls.lock().unwrap().push((offset, limit));
        if let Some(err) = self.character_failures.get(&offset) {
            return Err(err.clone());
        }
        let start = offset.min(self.characters.len());
        let end = (offset + limit).min(self.characters.len());
        Ok(CharacterBatch {
            offset,
            limit,
            total: self.characters.len(),
            characters: self.characters[start..end].to_vec(),
        })
    }

    async fn section_item(&self, item: &ItemRef) -> Envelope<SectionItem> {
        let uri = item.resource_uri.clone();
        self.calls.lock().unwrap().push(uri.clone());
        self.started.notify_waiters();

        if let Some(gate) = self.gates.get(&uri) {
            gate.notified().await;
        }
        if let Some(delay) = self.delays.get(&uri) {
            tokio::time::sleep(*delay).await;
        }
        self.completed.lock().unwrap().push(uri.clone());

        if let Some(err) = self.failures.get(&uri) {
            return Err(err.clone());
        }
        let (prefix, index) = parse_stub_uri(&uri).ok_or(DataError::Unknown)?;
        Ok(section_item(&prefix, index))
    }
}

/// An `App` over the stub with the default page size.
pub fn test_app(stub: Arc<StubCatalog>) -> App {
    App::new(CatalogRepository::new(stub), 20)
}
