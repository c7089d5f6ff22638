//! Jikan REST adapter (source B, MyAnimeList data).

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use super::queue::RequestQueue;
use super::transport::{ApiRequest, Transport};
use crate::config::SourceConfig;
use crate::error::ClientError;
use crate::matching;
use crate::models::character::DEFAULT_POPULARITY;
use crate::models::{
    CharacterRecord, DataSource, DetectedSeries, Detection, SeriesRecord, SeriesRef, SourceIds,
};

const UNKNOWN_SERIES: &str = "Unknown Anime";

#[derive(Deserialize)]
struct JikanResponse<T> {
    data: Option<T>,
}

#[derive(Deserialize)]
struct Images {
    jpg: Option<JpgImage>,
}

#[derive(Deserialize)]
struct JpgImage {
    image_url: Option<String>,
}

#[derive(Deserialize)]
struct MalCharacter {
    mal_id: i64,
    name: Option<String>,
    images: Option<Images>,
    about: Option<String>,
    favorites: Option<u32>,
    #[serde(default)]
    anime: Vec<MalAnimeRole>,
}

#[derive(Deserialize)]
struct MalAnimeRole {
    role: Option<String>,
    anime: Option<MalAnimeStub>,
}

#[derive(Deserialize)]
struct MalAnimeStub {
    mal_id: i64,
    title: Option<String>,
    images: Option<Images>,
}

#[derive(Deserialize)]
struct MalAnime {
    mal_id: i64,
    title: Option<String>,
    images: Option<Images>,
    score: Option<f64>,
    year: Option<i32>,
    #[serde(default)]
    genres: Vec<MalGenre>,
}

#[derive(Deserialize)]
struct MalGenre {
    name: String,
}

#[derive(Clone)]
pub struct JikanClient {
    queue: RequestQueue,
    base_url: String,
}

impl JikanClient {
    #[must_use]
    pub fn new(config: &SourceConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            queue: RequestQueue::new(
                transport,
                config.rate_per_minute,
                Duration::from_secs(config.retry_cooldown_secs),
            ),
            base_url: config.base_url.clone(),
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: String) -> Result<T, ClientError> {
        let response = self.queue.enqueue(ApiRequest::Get { url }).await?;
        let parsed: JikanResponse<T> = response.json()?;

        parsed
            .data
            .ok_or_else(|| ClientError::upstream("Jikan response carried no data"))
    }

    /// Searches characters by name. Best-effort: upstream failures are
    /// logged and reported as an empty list, and blank queries short-circuit
    /// without a network call.
    pub async fn search_characters(&self, query: &str) -> Vec<CharacterRecord> {
        match self.try_search_characters(query).await {
            Ok(records) => records,
            Err(ClientError::InvalidQuery(_)) => Vec::new(),
            Err(err) => {
                warn!(query, error = %err, "Jikan character search failed");
                Vec::new()
            }
        }
    }

    async fn try_search_characters(
        &self,
        query: &str,
    ) -> Result<Vec<CharacterRecord>, ClientError> {
        if query.trim().is_empty() {
            return Err(ClientError::InvalidQuery("empty search query".to_string()));
        }

        let url = format!(
            "{}/characters?q={}&limit=10",
            self.base_url,
            urlencoding::encode(query)
        );

        let characters: Vec<MalCharacter> = self.get(url).await?;

        Ok(characters.into_iter().filter_map(map_character).collect())
    }

    /// Searches anime series by name. Best-effort, like character search.
    pub async fn search_series(&self, query: &str) -> Vec<SeriesRecord> {
        match self.try_search_series(query).await {
            Ok(records) => records,
            Err(ClientError::InvalidQuery(_)) => Vec::new(),
            Err(err) => {
                warn!(query, error = %err, "Jikan series search failed");
                Vec::new()
            }
        }
    }

    async fn try_search_series(&self, query: &str) -> Result<Vec<SeriesRecord>, ClientError> {
        if query.trim().is_empty() {
            return Err(ClientError::InvalidQuery("empty search query".to_string()));
        }

        let url = format!(
            "{}/anime?q={}&limit=10",
            self.base_url,
            urlencoding::encode(query)
        );

        let series: Vec<MalAnime> = self.get(url).await?;

        Ok(series.into_iter().map(map_series_record).collect())
    }

    /// Fetches full character details by MAL id. Propagates failure.
    pub async fn get_character_details(&self, mal_id: i64) -> Result<CharacterRecord, ClientError> {
        let url = format!("{}/characters/{}/full", self.base_url, mal_id);

        let character: MalCharacter = self.get(url).await?;

        map_character(character)
            .ok_or_else(|| ClientError::upstream("character payload without a name"))
    }

    /// Detection built directly on MAL search: the closest-named character's
    /// primary series, with the similarity as confidence. No threshold is
    /// applied here; callers gate on confidence, and a weak guess can still
    /// serve as a last resort.
    pub async fn detect_anime_from_character(&self, character_name: &str) -> Option<Detection> {
        if character_name.trim().is_empty() {
            return None;
        }

        let candidates = self.search_characters(character_name).await;
        let (best, confidence) =
            matching::best_match(character_name, &candidates, |c| c.name.as_str())?;

        Some(Detection {
            character_name: best.name.clone(),
            series: best.series.as_ref().map(|s| DetectedSeries {
                id: s.id,
                name: s.name.clone(),
                image_url: s.image_url.clone(),
            }),
            confidence,
            source: DataSource::SingleJikan,
        })
    }
}

fn image_url(images: Option<Images>) -> Option<String> {
    images.and_then(|i| i.jpg).and_then(|j| j.image_url)
}

fn map_character(character: MalCharacter) -> Option<CharacterRecord> {
    let name = character.name.filter(|n| !n.is_empty())?;

    let (series, role) = character
        .anime
        .into_iter()
        .next()
        .map_or((None, None), |appearance| {
            let series = appearance.anime.map(|a| SeriesRef {
                id: a.mal_id,
                name: a
                    .title
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| UNKNOWN_SERIES.to_string()),
                image_url: image_url(a.images),
                genres: Default::default(),
            });
            (series, appearance.role)
        });

    Some(CharacterRecord {
        id: character.mal_id,
        source_ids: SourceIds {
            mal_id: Some(character.mal_id),
            anilist_id: None,
        },
        name,
        native_name: None,
        image_url: image_url(character.images),
        description: character.about,
        series,
        popularity: character.favorites.unwrap_or(DEFAULT_POPULARITY),
        favorites: character.favorites,
        role,
        base_attributes: Default::default(),
        data_source: DataSource::SingleJikan,
    })
}

fn map_series_record(anime: MalAnime) -> SeriesRecord {
    // MAL scores are 0-10; the canonical record keeps 0-100 like AniList.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let score = anime
        .score
        .filter(|s| *s > 0.0)
        .map(|s| (s * 10.0).round() as u32);

    SeriesRecord {
        id: anime.mal_id,
        source_ids: SourceIds {
            mal_id: Some(anime.mal_id),
            anilist_id: None,
        },
        name: anime
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNKNOWN_SERIES.to_string()),
        image_url: image_url(anime.images),
        popularity: score.unwrap_or(80),
        year: anime.year,
        genres: anime.genres.into_iter().map(|g| g.name).collect(),
        score,
        data_source: DataSource::SingleJikan,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn character_mapping_extracts_primary_series() {
        let character: MalCharacter = serde_json::from_value(serde_json::json!({
            "mal_id": 417,
            "name": "Lelouch Lamperouge",
            "favorites": 174000,
            "about": "The exiled prince of Britannia.",
            "anime": [
                {
                    "role": "Main",
                    "anime": { "mal_id": 1575, "title": "Code Geass" }
                }
            ]
        }))
        .unwrap();

        let record = map_character(character).unwrap();
        assert_eq!(record.id, 417);
        assert_eq!(record.source_ids.mal_id, Some(417));
        assert_eq!(record.popularity, 174_000);
        assert_eq!(record.role.as_deref(), Some("Main"));
        assert_eq!(record.series_name(), Some("Code Geass"));
        assert_eq!(record.data_source, DataSource::SingleJikan);
    }

    #[test]
    fn character_without_name_is_dropped() {
        let character: MalCharacter =
            serde_json::from_value(serde_json::json!({ "mal_id": 1 })).unwrap();
        assert!(map_character(character).is_none());
    }

    #[test]
    fn character_without_favorites_gets_midrange_popularity() {
        let character: MalCharacter = serde_json::from_value(serde_json::json!({
            "mal_id": 2,
            "name": "Background Villager C"
        }))
        .unwrap();

        let record = map_character(character).unwrap();
        assert_eq!(record.popularity, DEFAULT_POPULARITY);
        assert_eq!(record.favorites, None);
        assert!(record.series.is_none());
    }

    #[test]
    fn series_score_is_rescaled_to_percent() {
        let anime: MalAnime = serde_json::from_value(serde_json::json!({
            "mal_id": 1575,
            "title": "Code Geass",
            "score": 8.7,
            "year": 2006,
            "genres": [{ "name": "Drama" }, { "name": "Mecha" }]
        }))
        .unwrap();

        let record = map_series_record(anime);
        assert_eq!(record.score, Some(87));
        assert_eq!(record.popularity, 87);
        assert_eq!(record.year, Some(2006));
        assert!(record.genres.contains("Mecha"));
    }
}
