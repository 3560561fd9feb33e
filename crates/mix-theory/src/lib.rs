pub mod camelot;
pub mod genre;
pub mod tempo;

pub use camelot::{
    compatible_keys, harmonic_relation, harmonic_score, is_harmonic_match, is_relative, key_name,
    next_key, parse_camelot, previous_key, to_camelot, CamelotKey, CamelotLabel,
    HarmonicRelation, Mode, Polarity,
};
pub use genre::{
    display_name, families_for, find_family, genre_compatibility, genre_recommendations,
    normalize_genre, tiered_genre_score, GenreFamily, GENRE_FAMILIES,
};
pub use tempo::{
    bpm_drift, compatible_bpms, crossfade_seconds, is_harmonic_bpm, optimal_bpm,
    tempo_at, tempo_compatibility, TempoClass, TempoCompatibility, TempoCurve,
    DEFAULT_BPM_TOLERANCE, MAX_BPM_WINDOW,
};

/// Errors from music theory operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid Camelot key: {0:?}")]
    InvalidCamelot(String),

    #[error("Camelot position {0} outside 1-12")]
    PositionOutOfRange(u8),
}

pub type Result<T> = std::result::Result<T, Error>;
