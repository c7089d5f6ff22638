use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{DataSource, SourceIds};

/// Canonical, source-agnostic series record.
///
/// `score` is kept on a 0-100 scale: AniList reports averageScore that way
/// already, Jikan's 0-10 score is multiplied by ten at the adapter boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesRecord {
    pub id: i64,
    pub source_ids: SourceIds,
    pub name: String,
    pub image_url: Option<String>,
    pub popularity: u32,
    pub year: Option<i32>,
    pub genres: BTreeSet<String>,
    pub score: Option<u32>,
    pub data_source: DataSource,
}

impl SeriesRecord {
    #[must_use]
    pub fn merge_key(&self) -> String {
        self.name.to_lowercase()
    }
}
