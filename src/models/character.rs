use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::DataSource;

/// Popularity used when an upstream provides no signal at all.
pub const DEFAULT_POPULARITY: u32 = 50;

/// Canonical, source-agnostic character record.
///
/// `name` is never empty: adapters drop upstream entries without a usable
/// name rather than emit one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterRecord {
    /// Primary identifier; the AniList id when known, else the MAL id.
    pub id: i64,
    pub source_ids: SourceIds,
    pub name: String,
    pub native_name: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub series: Option<SeriesRef>,
    pub popularity: u32,
    /// Upstream favourites count, only populated by detail fetches.
    pub favorites: Option<u32>,
    /// Narrative role in the primary series ("Main", "Supporting", ...).
    pub role: Option<String>,
    pub base_attributes: BaseAttributes,
    pub data_source: DataSource,
}

impl CharacterRecord {
    /// Lowercased name, the key records are correlated across sources by.
    #[must_use]
    pub fn merge_key(&self) -> String {
        self.name.to_lowercase()
    }

    #[must_use]
    pub fn series_name(&self) -> Option<&str> {
        self.series.as_ref().map(|s| s.name.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceIds {
    pub mal_id: Option<i64>,
    pub anilist_id: Option<i64>,
}

/// Reference to the series a character primarily appears in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesRef {
    pub id: i64,
    pub name: String,
    pub image_url: Option<String>,
    pub genres: BTreeSet<String>,
}

/// Raw upstream stats. Zero means "the source had nothing"; placeholders are
/// deliberately not injected here so that merging stays idempotent. The
/// battle engine synthesizes values when these are absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseAttributes {
    pub strength: u32,
    pub speed: u32,
    pub intelligence: u32,
}

impl BaseAttributes {
    /// Per-attribute maximum across two sources.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self {
            strength: self.strength.max(other.strength),
            speed: self.speed.max(other.speed),
            intelligence: self.intelligence.max(other.intelligence),
        }
    }
}
