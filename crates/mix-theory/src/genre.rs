//! Genre families and cross-genre compatibility.
//!
//! Free-text genre tags (as returned for an artist by a music catalog) are
//! matched against a fixed registry of families by substring. Each family
//! carries characteristic energy, danceability and valence values used to
//! estimate how well two unrelated families blend.

use serde::Serialize;

/// A broad genre family with its representative genre substrings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreFamily {
    /// Stable identifier, e.g. `"hip_hop"`.
    pub key: &'static str,
    /// Display name, e.g. `"Hip Hop"`.
    pub name: &'static str,
    pub genres: &'static [&'static str],
    pub energy: f64,
    pub danceability: f64,
    pub valence: f64,
}

impl GenreFamily {
    fn matches(&self, normalized_tag: &str) -> bool {
        self.genres
            .iter()
            .any(|g| normalized_tag.contains(g) || g.contains(normalized_tag))
    }

    /// 1 minus the mean absolute difference of the three characteristics.
    pub fn similarity(&self, other: &GenreFamily) -> f64 {
        let energy = (self.energy - other.energy).abs();
        let danceability = (self.danceability - other.danceability).abs();
        let valence = (self.valence - other.valence).abs();
        1.0 - (energy + danceability + valence) / 3.0
    }
}

/// Registry in lookup order; the first matching family wins.
pub static GENRE_FAMILIES: &[GenreFamily] = &[
    GenreFamily {
        key: "electronic",
        name: "Electronic",
        genres: &[
            "house", "techno", "trance", "dubstep", "drum and bass", "drum & bass",
            "ambient", "synthwave", "electro", "progressive house", "deep house",
            "tech house", "minimal", "garage", "breakbeat", "downtempo",
            "electronic", "edm", "electronic dance music",
        ],
        energy: 0.8,
        danceability: 0.9,
        valence: 0.7,
    },
    GenreFamily {
        key: "rock",
        name: "Rock",
        genres: &[
            "rock", "alternative", "indie", "punk", "metal", "grunge",
            "progressive rock", "hard rock", "soft rock", "classic rock",
            "indie rock", "alternative rock", "post-rock", "math rock",
            "garage rock", "psychedelic rock", "folk rock",
        ],
        energy: 0.7,
        danceability: 0.6,
        valence: 0.6,
    },
    GenreFamily {
        key: "pop",
        name: "Pop",
        genres: &[
            "pop", "dance pop", "indie pop", "synthpop", "electropop",
            "bubblegum pop", "teen pop", "power pop", "art pop",
            "dream pop", "shoegaze", "new wave", "post-punk",
        ],
        energy: 0.7,
        danceability: 0.8,
        valence: 0.8,
    },
    GenreFamily {
        key: "hip_hop",
        name: "Hip Hop",
        genres: &[
            "hip hop", "rap", "trap", "drill", "conscious hip hop",
            "gangsta rap", "alternative hip hop", "underground hip hop",
            "old school hip hop", "new school hip hop", "southern hip hop",
            "west coast hip hop", "east coast hip hop",
        ],
        energy: 0.6,
        danceability: 0.7,
        valence: 0.5,
    },
    GenreFamily {
        key: "jazz",
        name: "Jazz",
        genres: &[
            "jazz", "bebop", "fusion", "smooth jazz", "acid jazz",
            "free jazz", "modal jazz", "cool jazz", "hard bop",
            "post-bop", "jazz fusion", "latin jazz", "afro-cuban jazz",
        ],
        energy: 0.5,
        danceability: 0.6,
        valence: 0.7,
    },
    GenreFamily {
        key: "classical",
        name: "Classical",
        genres: &[
            "classical", "orchestral", "chamber", "baroque", "romantic",
            "modern classical", "contemporary classical", "opera",
            "symphony", "concerto", "sonata", "chamber music",
        ],
        energy: 0.4,
        danceability: 0.3,
        valence: 0.6,
    },
    GenreFamily {
        key: "country",
        name: "Country",
        genres: &[
            "country", "folk", "bluegrass", "country pop", "alt-country",
            "country rock", "honky tonk", "outlaw country", "country blues",
            "western", "cowboy", "americana",
        ],
        energy: 0.5,
        danceability: 0.5,
        valence: 0.7,
    },
    GenreFamily {
        key: "r_b",
        name: "R&B",
        genres: &[
            "r&b", "soul", "funk", "neo soul", "contemporary r&b",
            "rhythm and blues", "urban contemporary", "quiet storm",
            "new jack swing", "hip hop soul", "alternative r&b",
        ],
        energy: 0.6,
        danceability: 0.8,
        valence: 0.7,
    },
    GenreFamily {
        key: "reggae",
        name: "Reggae",
        genres: &[
            "reggae", "dancehall", "ska", "rocksteady", "dub",
            "roots reggae", "lovers rock", "ragga", "reggaeton",
        ],
        energy: 0.6,
        danceability: 0.8,
        valence: 0.8,
    },
    GenreFamily {
        key: "blues",
        name: "Blues",
        genres: &[
            "blues", "delta blues", "chicago blues", "electric blues",
            "rhythm and blues", "soul blues", "country blues",
            "acoustic blues", "blues rock",
        ],
        energy: 0.5,
        danceability: 0.5,
        valence: 0.4,
    },
    GenreFamily {
        key: "latin",
        name: "Latin",
        genres: &[
            "latin", "salsa", "merengue", "bachata", "cumbia",
            "reggaeton", "latin pop", "latin rock", "latin jazz",
            "flamenco", "tango", "bolero", "ranchera",
        ],
        energy: 0.7,
        danceability: 0.9,
        valence: 0.8,
    },
    GenreFamily {
        key: "world",
        name: "World",
        genres: &[
            "world", "world music", "ethnic", "traditional",
            "african", "asian", "middle eastern", "celtic",
            "indian classical", "gamelan", "klezmer",
        ],
        energy: 0.5,
        danceability: 0.6,
        valence: 0.6,
    },
];

/// Neutral score when either side has no genre information.
const NO_GENRES_SCORE: f64 = 0.5;
/// Floor for genres that are identifiable but unrelated.
const UNRELATED_SCORE: f64 = 0.3;
const SHARED_FAMILY_TIER: f64 = 0.7;

/// Case-insensitive family lookup. A tag matches when it contains, or is
/// contained by, one of the family's genre substrings.
pub fn find_family(tag: &str) -> Option<&'static GenreFamily> {
    let normalized = tag.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }
    GENRE_FAMILIES.iter().find(|f| f.matches(&normalized))
}

/// Distinct families for a tag list, in first-seen order.
pub fn families_for<S: AsRef<str>>(tags: &[S]) -> Vec<&'static GenreFamily> {
    let mut families: Vec<&'static GenreFamily> = Vec::new();
    for family in tags.iter().filter_map(|t| find_family(t.as_ref())) {
        if !families.iter().any(|f| f.key == family.key) {
            families.push(family);
        }
    }
    families
}

fn shares_exact_tag<S: AsRef<str>>(a: &[S], b: &[S]) -> bool {
    a.iter()
        .any(|x| b.iter().any(|y| x.as_ref() == y.as_ref()))
}

/// Three-tier genre score: 1.0 for a shared tag, 0.7 for a shared family,
/// 0.3 otherwise. 0.5 when either list is empty.
pub fn tiered_genre_score<S: AsRef<str>>(a: &[S], b: &[S]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return NO_GENRES_SCORE;
    }
    if shares_exact_tag(a, b) {
        return 1.0;
    }

    let families_b = families_for(b);
    let shared = families_for(a)
        .iter()
        .any(|fa| families_b.iter().any(|fb| fa.key == fb.key));

    if shared {
        SHARED_FAMILY_TIER
    } else {
        UNRELATED_SCORE
    }
}

/// Continuous genre score based on family characteristics.
///
/// 0.5 when either list is empty, 1.0 for a shared tag or shared family,
/// 0.3 when either side matches no family. Otherwise the best
/// [`GenreFamily::similarity`] across all family pairs.
pub fn genre_compatibility<S: AsRef<str>>(a: &[S], b: &[S]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return NO_GENRES_SCORE;
    }
    if shares_exact_tag(a, b) {
        return 1.0;
    }

    let families_a = families_for(a);
    let families_b = families_for(b);
    if families_a.is_empty() || families_b.is_empty() {
        return UNRELATED_SCORE;
    }

    if families_a
        .iter()
        .any(|fa| families_b.iter().any(|fb| fa.key == fb.key))
    {
        return 1.0;
    }

    families_a
        .iter()
        .flat_map(|fa| families_b.iter().map(move |fb| fa.similarity(fb)))
        .fold(0.0_f64, f64::max)
}

/// Genres worth exploring from the current ones: every genre of the matched
/// families, plus the leading three of any family with similar energy and
/// danceability (both within 0.3).
pub fn genre_recommendations<S: AsRef<str>>(tags: &[S]) -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::new();
    let mut push = |genre: &'static str| {
        if !out.contains(&genre) {
            out.push(genre);
        }
    };

    for family in families_for(tags) {
        family.genres.iter().for_each(|g| push(*g));

        for other in GENRE_FAMILIES.iter().filter(|o| o.key != family.key) {
            let energy = (family.energy - other.energy).abs();
            let danceability = (family.danceability - other.danceability).abs();
            if energy < 0.3 && danceability < 0.3 {
                other.genres.iter().take(3).for_each(|g| push(*g));
            }
        }
    }

    out
}

/// Lowercase, strip punctuation, collapse whitespace.
pub fn normalize_genre(tag: &str) -> String {
    let cleaned: String = tag
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Family name when the tag belongs to one, otherwise the title-cased tag.
pub fn display_name(tag: &str) -> String {
    let normalized = normalize_genre(tag);
    if let Some(family) = find_family(&normalized) {
        return family.name.to_string();
    }

    normalized
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
