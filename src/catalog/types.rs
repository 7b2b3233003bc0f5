//! Wire types for the catalog API and the domain types the rest of the crate uses.
//!
//! DTOs mirror the JSON loosely: every field has a default so a sparse or
//! slightly different payload still decodes. Mapping to domain types happens
//! once, at the client boundary.

use serde::Deserialize;

use super::error::{DataError, Envelope};

// ============================================================================
// Wire Types
// ============================================================================

/// Outer envelope shared by every endpoint: `{code, status, data: {...}}`.
#[derive(Deserialize, Debug)]
pub struct DataWrapper<T> {
    #[serde(default)]
    pub data: DataContainer<T>,
}

#[derive(Deserialize, Debug)]
pub struct DataContainer<T> {
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub results: Vec<T>,
}

impl<T> Default for DataContainer<T> {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 0,
            total: 0,
            results: Vec::new(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct CharacterDto {
    pub id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<ImageDto>,
    pub comics: ResourceListDto,
    pub series: ResourceListDto,
    pub stories: ResourceListDto,
    pub events: ResourceListDto,
    pub urls: Vec<Option<UrlDto>>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ResourceListDto {
    #[serde(rename = "collectionURI")]
    pub collection_uri: Option<String>,
    pub items: Vec<Option<ResourceSummaryDto>>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ResourceSummaryDto {
    pub name: Option<String>,
    #[serde(rename = "resourceURI")]
    pub resource_uri: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ImageDto {
    pub path: String,
    pub extension: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct UrlDto {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

/// A comic, series, story or event as returned by its own `resourceURI`.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct SectionItemDto {
    pub id: i64,
    pub title: Option<String>,
    pub thumbnail: Option<ImageDto>,
}

// ============================================================================
// Domain Types
// ============================================================================

/// The four sub-sections shown on a character's detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionType {
    Comics,
    Series,
    Stories,
    Events,
}

impl SectionType {
    pub const ALL: [SectionType; 4] = [
        SectionType::Comics,
        SectionType::Series,
        SectionType::Stories,
        SectionType::Events,
    ];

    /// Stable position in [`SectionType::ALL`].
    pub fn index(self) -> usize {
        match self {
            SectionType::Comics => 0,
            SectionType::Series => 1,
            SectionType::Stories => 2,
            SectionType::Events => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SectionType::Comics => "Comics",
            SectionType::Series => "Series",
            SectionType::Stories => "Stories",
            SectionType::Events => "Events",
        }
    }

    /// Parses a user-typed section name ("comics", "comic", "Series", ...).
    pub fn parse(input: &str) -> Option<SectionType> {
        match input.trim().to_ascii_lowercase().as_str() {
            "comics" | "comic" => Some(SectionType::Comics),
            "series" => Some(SectionType::Series),
            "stories" | "story" => Some(SectionType::Stories),
            "events" | "event" => Some(SectionType::Events),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Thumbnail {
    pub path: String,
    pub extension: String,
}

impl Thumbnail {
    /// Full image URL, or `None` when the API gave no image.
    pub fn url(&self) -> Option<String> {
        if self.path.is_empty() {
            None
        } else {
            Some(format!("{}.{}", self.path, self.extension))
        }
    }
}

/// A lightweight pointer to a sub-resource that has not been fetched yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRef {
    pub name: String,
    pub resource_uri: String,
}

impl ItemRef {
    pub fn new(name: impl Into<String>, resource_uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource_uri: resource_uri.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceList {
    pub collection_uri: String,
    pub items: Vec<ItemRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceRefs {
    pub comics: ResourceList,
    pub series: ResourceList,
    pub stories: ResourceList,
    pub events: ResourceList,
}

impl ResourceRefs {
    pub fn get(&self, section: SectionType) -> &ResourceList {
        match section {
            SectionType::Comics => &self.comics,
            SectionType::Series => &self.series,
            SectionType::Stories => &self.stories,
            SectionType::Events => &self.events,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedLink {
    pub kind: String,
    pub url: String,
}

/// A character as listed by the top-level endpoint. Identity is `id`.
#[derive(Debug, Clone)]
pub struct CharacterRef {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub thumbnail: Thumbnail,
    pub resources: ResourceRefs,
    pub related_links: Vec<RelatedLink>,
}

impl PartialEq for CharacterRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CharacterRef {}

impl CharacterRef {
    pub fn section_items(&self, section: SectionType) -> &[ItemRef] {
        &self.resources.get(section).items
    }
}

/// The fetched, display-ready form of an [`ItemRef`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionItem {
    pub id: i64,
    pub name: String,
    pub image_url: Option<String>,
}

/// One response of the character list endpoint, already mapped.
#[derive(Debug, Clone)]
pub struct CharacterBatch {
    pub offset: usize,
    pub limit: usize,
    pub total: usize,
    pub characters: Vec<CharacterRef>,
}

// ============================================================================
// Mapping
// ============================================================================

impl From<ImageDto> for Thumbnail {
    fn from(dto: ImageDto) -> Self {
        Thumbnail {
            path: dto.path,
            extension: dto.extension,
        }
    }
}

impl From<ResourceListDto> for ResourceList {
    fn from(dto: ResourceListDto) -> Self {
        ResourceList {
            collection_uri: dto.collection_uri.unwrap_or_default(),
            items: dto
                .items
                .into_iter()
                .flatten()
                .filter_map(|item| {
                    // An item without a URI cannot be fetched; drop it here.
                    let uri = item.resource_uri.filter(|u| !u.is_empty())?;
                    Some(ItemRef {
                        name: item.name.unwrap_or_default(),
                        resource_uri: uri,
                    })
                })
                .collect(),
        }
    }
}

impl From<CharacterDto> for CharacterRef {
    fn from(dto: CharacterDto) -> Self {
        CharacterRef {
            id: dto.id,
            name: dto.name.unwrap_or_default(),
            description: dto.description.unwrap_or_default(),
            thumbnail: dto.thumbnail.map(Thumbnail::from).unwrap_or_default(),
            resources: ResourceRefs {
                comics: dto.comics.into(),
                series: dto.series.into(),
                stories: dto.stories.into(),
                events: dto.events.into(),
            },
            related_links: dto
                .urls
                .into_iter()
                .flatten()
                .map(|u| RelatedLink {
                    kind: u.kind,
                    url: u.url,
                })
                .collect(),
        }
    }
}

impl From<DataWrapper<CharacterDto>> for CharacterBatch {
    fn from(wrapper: DataWrapper<CharacterDto>) -> Self {
        let data = wrapper.data;
        CharacterBatch {
            offset: data.offset,
            limit: data.limit,
            total: data.total,
            characters: data.results.into_iter().map(CharacterRef::from).collect(),
        }
    }
}

impl SectionItem {
    /// Takes the first result of a single-item envelope. An empty result set
    /// is not the shape we asked for, so it counts as a decode failure.
    pub fn from_wrapper(wrapper: DataWrapper<SectionItemDto>) -> Envelope<SectionItem> {
        let dto = wrapper
            .data
            .results
            .into_iter()
            .next()
            .ok_or(DataError::Serialization)?;
        Ok(SectionItem {
            id: dto.id,
            name: dto.title.unwrap_or_default(),
            image_url: dto.thumbnail.map(Thumbnail::from).and_then(|t| t.url()),
        })
    }
}
