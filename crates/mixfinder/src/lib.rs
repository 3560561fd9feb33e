//! Track-to-track mixability and greedy playlist sequencing.
//!
//! Scores pairs of catalog tracks on tempo, Camelot key, energy,
//! danceability and genre, estimates transition points from structural
//! analysis, and orders a candidate pool into a playlist with a transition
//! plan between each consecutive pair.
//!
//! Everything here is pure computation over in-memory [`Track`] records.

pub mod scoring;
pub mod sequencer;
pub mod structure;
pub mod types;

pub use scoring::{
    compatibility_score, difficulty_description, energy_preset, harmonic_candidates,
    rank_candidates, score_description, transition_difficulty, transition_point_score,
    CompatibilityScorer, DifficultyBand, EnergyPreset, ScoreBand, WeightedScorer,
};
pub use sequencer::{order_tracks, order_tracks_with_weights, Sequence, Sequencer, TransitionPlan};
pub use structure::{
    analyze_structure, find_intro_outro, optimal_transition_points, transition_bar_count,
    transition_key_info, transition_recommendation, IntroOutro, KeyInfo, MarkedRegion, Region,
    TrackStructure, TransitionKind, TransitionPoints, TransitionRecommendation,
};
pub use types::{
    parse_tracks, AnalysisSummary, Artist, AudioAnalysis, AudioFeatures, CompatibilityScore, Section,
    TimeInterval, Track,
};

pub use mixconf::{MixConfig, ScoringWeights};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Theory(#[from] mix_theory::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] mixconf::ConfigError),

    #[error("malformed track data: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
