//! AniList GraphQL adapter (source A).

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
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
struct GraphQlResponse<T> {
    data: Option<T>,
}

#[derive(Deserialize)]
struct Title {
    romaji: Option<String>,
    english: Option<String>,
}

impl Title {
    fn display(&self) -> Option<String> {
        self.english.clone().or_else(|| self.romaji.clone())
    }
}

#[derive(Deserialize)]
struct CoverImage {
    large: Option<String>,
    medium: Option<String>,
}

impl CoverImage {
    fn best(self) -> Option<String> {
        self.large.or(self.medium)
    }
}

#[derive(Deserialize)]
struct Media {
    id: i64,
    title: Title,
    #[serde(rename = "coverImage")]
    cover_image: Option<CoverImage>,
    genres: Option<Vec<String>>,
    #[serde(rename = "averageScore")]
    average_score: Option<u32>,
    popularity: Option<u32>,
    #[serde(rename = "seasonYear")]
    season_year: Option<i32>,
}

#[derive(Clone)]
pub struct AnilistClient {
    queue: RequestQueue,
    base_url: String,
}

impl AnilistClient {
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

    async fn query<T: serde::de::DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, ClientError> {
        let request = ApiRequest::Post {
            url: self.base_url.clone(),
            body: json!({ "query": query, "variables": variables }),
        };

        let response = self.queue.enqueue(request).await?;
        let parsed: GraphQlResponse<T> = response.json()?;

        parsed
            .data
            .ok_or_else(|| ClientError::upstream("GraphQL response carried no data"))
    }

    /// Searches characters by name. Best-effort: upstream failures are
    /// logged and reported as an empty list, and blank queries short-circuit
    /// without a network call.
    pub async fn search_characters(&self, query: &str) -> Vec<CharacterRecord> {
        match self.try_search_characters(query).await {
            Ok(records) => records,
            Err(ClientError::InvalidQuery(_)) => Vec::new(),
            Err(err) => {
                warn!(query, error = %err, "AniList character search failed");
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

        let gql_query = r"
            query ($search: String) {
                Page(page: 1, perPage: 10) {
                    characters(search: $search) {
                        id
                        name { full native }
                        image { large medium }
                        description
                        media(sort: POPULARITY_DESC, perPage: 1) {
                            nodes {
                                id
                                title { romaji english }
                                genres
                                coverImage { large medium }
                            }
                        }
                    }
                }
            }
        ";

        #[derive(Deserialize)]
        struct Data {
            #[serde(rename = "Page")]
            page: Page,
        }

        #[derive(Deserialize)]
        struct Page {
            characters: Vec<Character>,
        }

        #[derive(Deserialize)]
        struct Character {
            id: i64,
            name: Name,
            image: Option<Image>,
            description: Option<String>,
            media: Option<MediaConnection>,
        }

        #[derive(Deserialize)]
        struct Name {
            full: Option<String>,
            native: Option<String>,
        }

        #[derive(Deserialize)]
        struct Image {
            large: Option<String>,
            medium: Option<String>,
        }

        #[derive(Deserialize)]
        struct MediaConnection {
            nodes: Vec<Media>,
        }

        let data: Data = self.query(gql_query, json!({ "search": query })).await?;

        let records = data
            .page
            .characters
            .into_iter()
            .filter_map(|c| {
                let name = c.name.full.filter(|n| !n.is_empty())?;
                let series = c
                    .media
                    .and_then(|m| m.nodes.into_iter().next())
                    .map(map_series_ref);

                Some(CharacterRecord {
                    id: c.id,
                    source_ids: SourceIds {
                        mal_id: None,
                        anilist_id: Some(c.id),
                    },
                    name,
                    native_name: c.name.native,
                    image_url: c.image.and_then(|i| i.large.or(i.medium)),
                    description: c.description,
                    series,
                    popularity: DEFAULT_POPULARITY,
                    favorites: None,
                    role: None,
                    base_attributes: Default::default(),
                    data_source: DataSource::SingleAnilist,
                })
            })
            .collect();

        Ok(records)
    }

    /// Searches anime series by name. Best-effort, like character search.
    pub async fn search_series(&self, query: &str) -> Vec<SeriesRecord> {
        match self.try_search_series(query).await {
            Ok(records) => records,
            Err(ClientError::InvalidQuery(_)) => Vec::new(),
            Err(err) => {
                warn!(query, error = %err, "AniList series search failed");
                Vec::new()
            }
        }
    }

    async fn try_search_series(&self, query: &str) -> Result<Vec<SeriesRecord>, ClientError> {
        if query.trim().is_empty() {
            return Err(ClientError::InvalidQuery("empty search query".to_string()));
        }

        let gql_query = r"
            query ($search: String) {
                Page(page: 1, perPage: 10) {
                    media(search: $search, type: ANIME) {
                        id
                        title { romaji english }
                        coverImage { large medium }
                        genres
                        averageScore
                        popularity
                        seasonYear
                    }
                }
            }
        ";

        #[derive(Deserialize)]
        struct Data {
            #[serde(rename = "Page")]
            page: Page,
        }

        #[derive(Deserialize)]
        struct Page {
            media: Vec<Media>,
        }

        let data: Data = self.query(gql_query, json!({ "search": query })).await?;

        Ok(data.page.media.into_iter().map(map_series_record).collect())
    }

    /// Fetches full character details by AniList id.
    ///
    /// Unlike the searches this propagates failure: callers need to tell
    /// "not found" apart from "nothing matched".
    pub async fn get_character_details(&self, id: i64) -> Result<CharacterRecord, ClientError> {
        let gql_query = r"
            query ($id: Int) {
                Character(id: $id) {
                    id
                    name { full native }
                    image { large }
                    description
                    favourites
                    media(sort: POPULARITY_DESC) {
                        edges {
                            node {
                                id
                                title { romaji english }
                                coverImage { large medium }
                                genres
                            }
                            role
                        }
                    }
                }
            }
        ";

        #[derive(Deserialize)]
        struct Data {
            #[serde(rename = "Character")]
            character: Option<Character>,
        }

        #[derive(Deserialize)]
        struct Character {
            id: i64,
            name: Name,
            image: Option<Image>,
            description: Option<String>,
            favourites: Option<u32>,
            media: Option<MediaEdges>,
        }

        #[derive(Deserialize)]
        struct Name {
            full: Option<String>,
            native: Option<String>,
        }

        #[derive(Deserialize)]
        struct Image {
            large: Option<String>,
        }

        #[derive(Deserialize)]
        struct MediaEdges {
            edges: Vec<MediaEdge>,
        }

        #[derive(Deserialize)]
        struct MediaEdge {
            node: Media,
            role: Option<String>,
        }

        let data: Data = self.query(gql_query, json!({ "id": id })).await?;
        let character = data
            .character
            .ok_or_else(|| ClientError::not_found(format!("AniList character {id}")))?;

        let name = character
            .name
            .full
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ClientError::upstream("character payload without a name"))?;

        let favourites = character.favourites;
        let (series, role) = character
            .media
            .and_then(|m| m.edges.into_iter().next())
            .map_or((None, None), |edge| {
                (Some(map_series_ref(edge.node)), edge.role)
            });

        Ok(CharacterRecord {
            id: character.id,
            source_ids: SourceIds {
                mal_id: None,
                anilist_id: Some(character.id),
            },
            name,
            native_name: character.name.native,
            image_url: character.image.and_then(|i| i.large),
            description: character.description,
            series,
            popularity: favourites.unwrap_or(0),
            favorites: favourites,
            role,
            base_attributes: Default::default(),
            data_source: DataSource::SingleAnilist,
        })
    }

    /// Fetches full series details by AniList id.
    pub async fn get_series_details(&self, id: i64) -> Result<SeriesRecord, ClientError> {
        let gql_query = r"
            query ($id: Int) {
                Media(id: $id, type: ANIME) {
                    id
                    title { romaji english }
                    coverImage { large medium }
                    genres
                    averageScore
                    popularity
                    seasonYear
                }
            }
        ";

        #[derive(Deserialize)]
        struct Data {
            #[serde(rename = "Media")]
            media: Option<Media>,
        }

        let data: Data = self.query(gql_query, json!({ "id": id })).await?;

        data.media
            .map(map_series_record)
            .ok_or_else(|| ClientError::not_found(format!("AniList media {id}")))
    }

    /// Name-similarity detection over search results. Accepts the best
    /// candidate only above 0.7 similarity and with an identified series.
    pub async fn detect_anime_from_character(&self, character_name: &str) -> Option<Detection> {
        if character_name.trim().is_empty() {
            return None;
        }

        let candidates = self.search_characters(character_name).await;
        let (best, confidence) =
            matching::best_match(character_name, &candidates, |c| c.name.as_str())?;

        if confidence <= 0.7 {
            return None;
        }

        let series = best.series.as_ref()?;
        Some(Detection {
            character_name: best.name.clone(),
            series: Some(DetectedSeries {
                id: series.id,
                name: series.name.clone(),
                image_url: series.image_url.clone(),
            }),
            confidence,
            source: DataSource::SingleAnilist,
        })
    }
}

fn map_series_ref(media: Media) -> SeriesRef {
    SeriesRef {
        id: media.id,
        name: media
            .title
            .display()
            .unwrap_or_else(|| UNKNOWN_SERIES.to_string()),
        image_url: media.cover_image.and_then(CoverImage::best),
        genres: media.genres.unwrap_or_default().into_iter().collect(),
    }
}

fn map_series_record(media: Media) -> SeriesRecord {
    SeriesRecord {
        id: media.id,
        source_ids: SourceIds {
            mal_id: None,
            anilist_id: Some(media.id),
        },
        name: media
            .title
            .display()
            .unwrap_or_else(|| UNKNOWN_SERIES.to_string()),
        image_url: media.cover_image.and_then(CoverImage::best),
        popularity: media.popularity.unwrap_or(0),
        year: media.season_year,
        genres: media.genres.unwrap_or_default().into_iter().collect(),
        score: media.average_score,
        data_source: DataSource::SingleAnilist,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_record_mapping_defaults() {
        let media: Media = serde_json::from_value(serde_json::json!({
            "id": 101,
            "title": { "romaji": "Shingeki no Kyojin", "english": null }
        }))
        .unwrap();

        let record = map_series_record(media);
        assert_eq!(record.name, "Shingeki no Kyojin");
        assert_eq!(record.popularity, 0);
        assert_eq!(record.score, None);
        assert_eq!(record.data_source, DataSource::SingleAnilist);
        assert!(record.genres.is_empty());
    }

    #[test]
    fn title_prefers_english() {
        let title = Title {
            romaji: Some("Shingeki no Kyojin".to_string()),
            english: Some("Attack on Titan".to_string()),
        };
        assert_eq!(title.display().as_deref(), Some("Attack on Titan"));
    }

    #[test]
    fn unnamed_series_falls_back_to_unknown() {
        let media: Media = serde_json::from_value(serde_json::json!({
            "id": 7,
            "title": {}
        }))
        .unwrap();

        assert_eq!(map_series_ref(media).name, UNKNOWN_SERIES);
    }
}
