//! Field-by-field merge policy for records that name the same entity.
//!
//! "A" is always the AniList-sourced record and "B" the Jikan-sourced one:
//! preference fields are keyed on source role, not argument position. Fields
//! combined with `max`/union are commutative; merging a record with nothing
//! returns it unchanged, and merging a record with itself changes nothing, so
//! repeated merges are safe.

use crate::models::{CharacterRecord, DataSource, SeriesRecord, SeriesRef, SourceIds};

/// Merges character records from the two sources.
///
/// Returns `None` only when both inputs are absent. No attribute
/// placeholders are generated here: synthesizing stats is the scoring
/// stage's job, and injecting them at merge time would break idempotence.
#[must_use]
pub fn merge_characters(
    anilist: Option<CharacterRecord>,
    jikan: Option<CharacterRecord>,
) -> Option<CharacterRecord> {
    let (a, b) = match (anilist, jikan) {
        (None, None) => return None,
        (Some(a), None) => return Some(a),
        (None, Some(b)) => return Some(b),
        (Some(a), Some(b)) => (a, b),
    };

    // Longer description wins, ties favor AniList.
    let description = match (&a.description, &b.description) {
        (Some(da), Some(db)) if db.len() > da.len() => b.description.clone(),
        (Some(_), _) => a.description.clone(),
        (None, other) => other.clone(),
    };

    let series = merge_series_ref(a.series, b.series);

    Some(CharacterRecord {
        id: a.id,
        source_ids: SourceIds {
            mal_id: b.source_ids.mal_id.or(a.source_ids.mal_id),
            anilist_id: a.source_ids.anilist_id.or(b.source_ids.anilist_id),
        },
        name: a.name,
        native_name: a.native_name.or(b.native_name),
        image_url: a.image_url.or(b.image_url),
        description,
        series,
        popularity: a.popularity.max(b.popularity),
        favorites: match (a.favorites, b.favorites) {
            (Some(fa), Some(fb)) => Some(fa.max(fb)),
            (fa, fb) => fa.or(fb),
        },
        role: a.role.or(b.role),
        base_attributes: a.base_attributes.max(b.base_attributes),
        data_source: DataSource::Unified,
    })
}

fn merge_series_ref(a: Option<SeriesRef>, b: Option<SeriesRef>) -> Option<SeriesRef> {
    match (a, b) {
        (Some(mut a), Some(b)) => {
            // AniList keeps the series identity; genre sets are unioned.
            a.genres.extend(b.genres);
            Some(a)
        }
        (a, b) => a.or(b),
    }
}

/// Merges series records from the two sources.
#[must_use]
pub fn merge_series(
    anilist: Option<SeriesRecord>,
    jikan: Option<SeriesRecord>,
) -> Option<SeriesRecord> {
    let (a, b) = match (anilist, jikan) {
        (None, None) => return None,
        (Some(a), None) => return Some(a),
        (None, Some(b)) => return Some(b),
        (Some(a), Some(b)) => (a, b),
    };

    let mut genres = a.genres;
    genres.extend(b.genres);

    Some(SeriesRecord {
        id: a.id,
        source_ids: SourceIds {
            mal_id: b.source_ids.mal_id.or(a.source_ids.mal_id),
            anilist_id: a.source_ids.anilist_id.or(b.source_ids.anilist_id),
        },
        name: a.name,
        image_url: a.image_url.or(b.image_url),
        popularity: a.popularity.max(b.popularity),
        year: a.year.or(b.year),
        genres,
        score: a.score.or(b.score),
        data_source: DataSource::Unified,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BaseAttributes;

    fn anilist_char(name: &str, popularity: u32) -> CharacterRecord {
        CharacterRecord {
            id: 100,
            source_ids: SourceIds {
                mal_id: None,
                anilist_id: Some(100),
            },
            name: name.to_string(),
            native_name: Some("ナルト".to_string()),
            image_url: Some("https://anilist.example/naruto.png".to_string()),
            description: Some("A ninja from the Hidden Leaf.".to_string()),
            series: Some(SeriesRef {
                id: 20,
                name: "Naruto".to_string(),
                image_url: None,
                genres: ["Action".to_string()].into_iter().collect(),
            }),
            popularity,
            favorites: None,
            role: None,
            base_attributes: BaseAttributes::default(),
            data_source: DataSource::SingleAnilist,
        }
    }

    fn jikan_char(name: &str, popularity: u32) -> CharacterRecord {
        CharacterRecord {
            id: 17,
            source_ids: SourceIds {
                mal_id: Some(17),
                anilist_id: None,
            },
            name: name.to_string(),
            native_name: None,
            image_url: Some("https://mal.example/naruto.jpg".to_string()),
            description: Some(
                "A ninja from the Hidden Leaf village who dreams of becoming Hokage.".to_string(),
            ),
            series: Some(SeriesRef {
                id: 20,
                name: "Naruto".to_string(),
                image_url: None,
                genres: ["Shounen".to_string()].into_iter().collect(),
            }),
            popularity,
            favorites: Some(popularity),
            role: Some("Main".to_string()),
            base_attributes: BaseAttributes::default(),
            data_source: DataSource::SingleJikan,
        }
    }

    #[test]
    fn merge_with_nothing_is_identity() {
        let a = anilist_char("Naruto Uzumaki", 900);
        let merged = merge_characters(Some(a.clone()), None).unwrap();
        assert_eq!(merged.id, a.id);
        assert_eq!(merged.name, a.name);
        assert_eq!(merged.popularity, a.popularity);
        assert_eq!(merged.data_source, DataSource::SingleAnilist);

        assert!(merge_characters(None, None).is_none());
    }

    #[test]
    fn merge_with_self_is_idempotent() {
        let a = anilist_char("Naruto Uzumaki", 900);
        let merged = merge_characters(Some(a.clone()), Some(a.clone())).unwrap();

        assert_eq!(merged.id, a.id);
        assert_eq!(merged.name, a.name);
        assert_eq!(merged.native_name, a.native_name);
        assert_eq!(merged.image_url, a.image_url);
        assert_eq!(merged.description, a.description);
        assert_eq!(merged.popularity, a.popularity);
        assert_eq!(merged.base_attributes, a.base_attributes);
        // Only the provenance tag is allowed to differ.
        assert_eq!(merged.data_source, DataSource::Unified);
    }

    #[test]
    fn popularity_takes_the_maximum_regardless_of_side() {
        let a = anilist_char("Naruto Uzumaki", 300);
        let b = jikan_char("Naruto Uzumaki", 80_000);

        let ab = merge_characters(Some(a.clone()), Some(b.clone())).unwrap();
        assert_eq!(ab.popularity, 80_000);

        // Swapping which source carries the larger value changes nothing.
        let a_hi = anilist_char("Naruto Uzumaki", 80_000);
        let b_lo = jikan_char("Naruto Uzumaki", 300);
        let ba = merge_characters(Some(a_hi), Some(b_lo)).unwrap();
        assert_eq!(ba.popularity, 80_000);
    }

    #[test]
    fn preference_fields_follow_source_role() {
        let a = anilist_char("Naruto Uzumaki", 900);
        let b = jikan_char("naruto uzumaki", 900);

        let merged = merge_characters(Some(a), Some(b)).unwrap();
        // AniList spelling and image win; the longer Jikan bio wins.
        assert_eq!(merged.name, "Naruto Uzumaki");
        assert!(merged.image_url.unwrap().contains("anilist"));
        assert!(merged.description.unwrap().contains("Hokage"));
        assert_eq!(merged.role.as_deref(), Some("Main"));
    }

    #[test]
    fn genres_are_unioned() {
        let a = anilist_char("Naruto Uzumaki", 1);
        let b = jikan_char("Naruto Uzumaki", 1);

        let merged = merge_characters(Some(a), Some(b)).unwrap();
        let genres = merged.series.unwrap().genres;
        assert!(genres.contains("Action"));
        assert!(genres.contains("Shounen"));
    }

    #[test]
    fn both_ids_survive_the_merge() {
        let merged = merge_characters(
            Some(anilist_char("Naruto Uzumaki", 1)),
            Some(jikan_char("Naruto Uzumaki", 1)),
        )
        .unwrap();

        assert_eq!(merged.id, 100);
        assert_eq!(merged.source_ids.anilist_id, Some(100));
        assert_eq!(merged.source_ids.mal_id, Some(17));
    }

    #[test]
    fn series_merge_prefers_anilist_year_and_score() {
        let a = SeriesRecord {
            id: 20,
            source_ids: SourceIds {
                mal_id: None,
                anilist_id: Some(20),
            },
            name: "Naruto".to_string(),
            image_url: None,
            popularity: 250_000,
            year: Some(2002),
            genres: ["Action".to_string()].into_iter().collect(),
            score: Some(79),
            data_source: DataSource::SingleAnilist,
        };
        let b = SeriesRecord {
            id: 20,
            source_ids: SourceIds {
                mal_id: Some(20),
                anilist_id: None,
            },
            name: "Naruto".to_string(),
            image_url: Some("https://mal.example/naruto.jpg".to_string()),
            popularity: 84,
            year: Some(2003),
            genres: ["Shounen".to_string()].into_iter().collect(),
            score: Some(84),
            data_source: DataSource::SingleJikan,
        };

        let merged = merge_series(Some(a), Some(b)).unwrap();
        assert_eq!(merged.year, Some(2002));
        assert_eq!(merged.score, Some(79));
        assert_eq!(merged.popularity, 250_000);
        assert!(merged.genres.contains("Shounen"));
        assert_eq!(merged.data_source, DataSource::Unified);
    }
}
