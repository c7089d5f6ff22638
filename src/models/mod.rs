pub mod character;
pub mod series;

pub use character::{BaseAttributes, CharacterRecord, SeriesRef, SourceIds};
pub use series::SeriesRecord;

use serde::{Deserialize, Serialize};

/// Which upstream(s) a normalized record was assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataSource {
    SingleAnilist,
    SingleJikan,
    Unified,
}

/// Result of anime-from-character detection.
#[derive(Debug, Clone, Serialize)]
pub struct Detection {
    pub character_name: String,
    pub series: Option<DetectedSeries>,
    /// Name-similarity score in `[0, 1]`.
    pub confidence: f64,
    pub source: DataSource,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetectedSeries {
    pub id: i64,
    pub name: String,
    pub image_url: Option<String>,
}
