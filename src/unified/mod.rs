//! Unification layer: fans queries out to both sources, merges, caches.

pub mod cache;
pub mod merge;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::clients::{AnilistClient, HttpTransport, JikanClient, Transport};
use crate::config::Config;
use crate::models::{CharacterRecord, Detection, SeriesRecord};
use cache::ResponseCache;

/// Client over both upstreams, the only component that touches the caches.
///
/// Holds its own queue and cache state; construct one per logical consumer
/// and share it by reference or `Arc`.
pub struct UnifiedClient {
    anilist: AnilistClient,
    jikan: JikanClient,
    characters: ResponseCache<Vec<CharacterRecord>>,
    series: ResponseCache<Vec<SeriesRecord>>,
    details: ResponseCache<CharacterRecord>,
}

impl UnifiedClient {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new());
        Self::with_transports(config, Arc::clone(&transport), transport)
    }

    /// Constructor with injected transports, one per upstream. This is the
    /// seam tests use to script responses.
    #[must_use]
    pub fn with_transports(
        config: &Config,
        anilist_transport: Arc<dyn Transport>,
        jikan_transport: Arc<dyn Transport>,
    ) -> Self {
        let ttl = Duration::from_secs(config.cache.ttl_secs);
        let capacity = config.cache.max_entries;

        Self {
            anilist: AnilistClient::new(&config.anilist, anilist_transport),
            jikan: JikanClient::new(&config.jikan, jikan_transport),
            characters: ResponseCache::new(ttl, capacity),
            series: ResponseCache::new(ttl, capacity),
            details: ResponseCache::new(ttl, capacity),
        }
    }

    /// Searches both sources concurrently and merges by lowercased name.
    ///
    /// Never fails: a source that errors contributes an empty list, and an
    /// empty query short-circuits without touching the network. Results are
    /// sorted by popularity descending (stable) and cached for the TTL.
    pub async fn search_characters(&self, query: &str) -> Vec<CharacterRecord> {
        let normalized = query.trim().to_lowercase();
        if normalized.is_empty() {
            return Vec::new();
        }

        let cache_key = format!("search:{normalized}");
        if let Some(cached) = self.characters.get(&cache_key) {
            return cached;
        }

        let (from_anilist, from_jikan) = tokio::join!(
            self.anilist.search_characters(query),
            self.jikan.search_characters(query),
        );

        debug!(
            query,
            anilist = from_anilist.len(),
            jikan = from_jikan.len(),
            "merging character search results"
        );

        // Merge map keyed by lowercased name. Insertion order is kept so the
        // popularity sort below stays stable across runs.
        let mut order: Vec<(Option<CharacterRecord>, Option<CharacterRecord>)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for record in from_anilist {
            let key = record.merge_key();
            if let Some(&i) = index.get(&key) {
                // Duplicate names within one source: first entry wins.
                if order[i].0.is_none() {
                    order[i].0 = Some(record);
                }
            } else {
                index.insert(key, order.len());
                order.push((Some(record), None));
            }
        }

        for record in from_jikan {
            let key = record.merge_key();
            if let Some(&i) = index.get(&key) {
                if order[i].1.is_none() {
                    order[i].1 = Some(record);
                }
            } else {
                index.insert(key, order.len());
                order.push((None, Some(record)));
            }
        }

        let mut merged: Vec<CharacterRecord> = order
            .into_iter()
            .filter_map(|(a, b)| merge::merge_characters(a, b))
            .collect();

        merged.sort_by_key(|r| std::cmp::Reverse(r.popularity));

        self.characters.insert(cache_key, merged.clone());
        merged
    }

    /// Searches both sources for anime series; same merge/cache shape as
    /// [`Self::search_characters`].
    pub async fn search_series(&self, query: &str) -> Vec<SeriesRecord> {
        let normalized = query.trim().to_lowercase();
        if normalized.is_empty() {
            return Vec::new();
        }

        let cache_key = format!("search:{normalized}");
        if let Some(cached) = self.series.get(&cache_key) {
            return cached;
        }

        let (from_anilist, from_jikan) = tokio::join!(
            self.anilist.search_series(query),
            self.jikan.search_series(query),
        );

        let mut order: Vec<(Option<SeriesRecord>, Option<SeriesRecord>)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for record in from_anilist {
            let key = record.merge_key();
            if let Some(&i) = index.get(&key) {
                if order[i].0.is_none() {
                    order[i].0 = Some(record);
                }
            } else {
                index.insert(key, order.len());
                order.push((Some(record), None));
            }
        }

        for record in from_jikan {
            let key = record.merge_key();
            if let Some(&i) = index.get(&key) {
                if order[i].1.is_none() {
                    order[i].1 = Some(record);
                }
            } else {
                index.insert(key, order.len());
                order.push((None, Some(record)));
            }
        }

        let mut merged: Vec<SeriesRecord> = order
            .into_iter()
            .filter_map(|(a, b)| merge::merge_series(a, b))
            .collect();

        merged.sort_by_key(|r| std::cmp::Reverse(r.popularity));

        self.series.insert(cache_key, merged.clone());
        merged
    }

    /// Enriches a record with detail fetches from every source it carries an
    /// id for, in parallel. Best-effort: individual failures degrade to that
    /// source contributing nothing, and if neither source yields details the
    /// input record comes back unchanged.
    pub async fn get_character_details(&self, record: &CharacterRecord) -> CharacterRecord {
        let mal_id = record.source_ids.mal_id;
        let anilist_id = record.source_ids.anilist_id.or_else(|| {
            // Records seeded purely from AniList search carry their id in
            // `id` as well; fall back to it when untagged.
            (record.source_ids.mal_id.is_none()).then_some(record.id)
        });

        let cache_key = format!(
            "details:{}:{}",
            mal_id.map(|i| i.to_string()).unwrap_or_default(),
            anilist_id.map(|i| i.to_string()).unwrap_or_default(),
        );
        if let Some(cached) = self.details.get(&cache_key) {
            return cached;
        }

        let jikan_details = async {
            match mal_id {
                Some(id) => match self.jikan.get_character_details(id).await {
                    Ok(details) => Some(details),
                    Err(err) => {
                        warn!(mal_id = id, error = %err, "Jikan detail fetch failed");
                        None
                    }
                },
                None => None,
            }
        };

        let anilist_details = async {
            match anilist_id {
                Some(id) => match self.anilist.get_character_details(id).await {
                    Ok(details) => Some(details),
                    Err(err) => {
                        warn!(anilist_id = id, error = %err, "AniList detail fetch failed");
                        None
                    }
                },
                None => None,
            }
        };

        let (jikan, anilist) = tokio::join!(jikan_details, anilist_details);

        match merge::merge_characters(anilist, jikan) {
            Some(merged) => {
                self.details.insert(cache_key, merged.clone());
                merged
            }
            None => record.clone(),
        }
    }

    /// Identifies the anime a character name most plausibly belongs to.
    ///
    /// Jikan's native detection is consulted first and accepted outright
    /// above 0.7 confidence. Otherwise an AniList name-similarity scan runs;
    /// failing that, any low-confidence Jikan guess is returned as a last
    /// resort, else `None`.
    pub async fn detect_anime_from_character(&self, character_name: &str) -> Option<Detection> {
        if character_name.trim().is_empty() {
            return None;
        }

        let jikan_detection = self.jikan.detect_anime_from_character(character_name).await;

        if let Some(detection) = &jikan_detection
            && detection.confidence > 0.7
        {
            return jikan_detection;
        }

        if let Some(detection) = self.anilist.detect_anime_from_character(character_name).await {
            return Some(detection);
        }

        jikan_detection
    }
}
