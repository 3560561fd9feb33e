//! Pairwise compatibility scoring.
//!
//! Every pair of tracks yields a numeric score, even when feature data is
//! missing; degradation is to documented neutral or zero values rather than
//! errors, so rankings built on these scores are always total.

use mix_theory::{
    genre_compatibility, harmonic_score, is_harmonic_match, parse_camelot, tempo_compatibility,
    tiered_genre_score, CamelotLabel,
};
use mixconf::{GenreScoring, MixConfig, ScoringWeights};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::types::{AudioAnalysis, CompatibilityScore, Track};
use crate::Result;

/// Scores how well one track mixes into another.
///
/// The sequencer is generic over this seam so callers can swap in a
/// different weighting or a learned model.
pub trait CompatibilityScorer: Send + Sync {
    fn score(&self, from: &Track, to: &Track) -> CompatibilityScore;
}

/// Weighted sum of tempo, key, energy, danceability and genre components.
#[derive(Debug, Clone, Default)]
pub struct WeightedScorer {
    pub config: MixConfig,
    pub weights: ScoringWeights,
}

impl WeightedScorer {
    pub fn new(config: MixConfig, weights: ScoringWeights) -> Self {
        Self { config, weights }
    }
}

impl CompatibilityScorer for WeightedScorer {
    fn score(&self, from: &Track, to: &Track) -> CompatibilityScore {
        compatibility_score(from, to, &self.config, &self.weights)
    }
}

/// Score a track pair. Returns all zeros when either side lacks audio features.
///
/// Disabled policy switches in `config` give their component full credit.
pub fn compatibility_score(
    a: &Track,
    b: &Track,
    config: &MixConfig,
    weights: &ScoringWeights,
) -> CompatibilityScore {
    let (Some(fa), Some(fb)) = (&a.audio_features, &b.audio_features) else {
        return CompatibilityScore::default();
    };

    let tempo = tempo_compatibility(
        fa.tempo,
        fb.tempo,
        config.bpm_tolerance,
        config.allow_half_double_time,
    )
    .score;

    let key = if config.harmonic_matching {
        harmonic_score(fa.camelot(), fb.camelot())
    } else {
        1.0
    };

    let energy = if config.maintain_energy {
        1.0 - (fa.energy - fb.energy).abs()
    } else {
        1.0
    };

    let danceability = 1.0 - (fa.danceability - fb.danceability).abs();

    let genre = if config.same_genre {
        match config.genre_scoring {
            GenreScoring::Tiered => tiered_genre_score(a.genre_tags(), b.genre_tags()),
            GenreScoring::FamilyDistance => genre_compatibility(a.genre_tags(), b.genre_tags()),
        }
    } else {
        1.0
    };

    let overall = tempo * weights.tempo
        + key * weights.key
        + energy * weights.energy
        + danceability * weights.danceability
        + genre * weights.genre;

    let score = CompatibilityScore {
        overall: overall.clamp(0.0, 1.0),
        tempo,
        key,
        energy,
        danceability,
        genre,
    };
    trace!(from = %a.id, to = %b.id, overall = score.overall, "scored pair");
    score
}

/// How hard a transition is to pull off, in [0, 1].
///
/// Starts from `1 - overall` under default weights and adds 0.2 for a tempo
/// gap over 20 BPM and 0.1 for an energy gap over 0.5. Nothing subtracts,
/// so the result never drops below zero.
pub fn transition_difficulty(a: &Track, b: &Track, config: &MixConfig) -> f64 {
    let score = compatibility_score(a, b, config, &ScoringWeights::default());
    let mut difficulty = 1.0 - score.overall;

    if let (Some(fa), Some(fb)) = (&a.audio_features, &b.audio_features) {
        if (fa.tempo - fb.tempo).abs() > 20.0 {
            difficulty += 0.2;
        }
        if (fa.energy - fb.energy).abs() > 0.5 {
            difficulty += 0.1;
        }
    }

    difficulty.min(1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    VeryGood,
    Good,
    Fair,
    Poor,
    VeryPoor,
}

impl ScoreBand {
    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent",
            ScoreBand::VeryGood => "Very Good",
            ScoreBand::Good => "Good",
            ScoreBand::Fair => "Fair",
            ScoreBand::Poor => "Poor",
            ScoreBand::VeryPoor => "Very Poor",
        }
    }
}

impl std::fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

pub fn score_description(score: f64) -> ScoreBand {
    if score >= 0.9 {
        ScoreBand::Excellent
    } else if score >= 0.8 {
        ScoreBand::VeryGood
    } else if score >= 0.7 {
        ScoreBand::Good
    } else if score >= 0.6 {
        ScoreBand::Fair
    } else if score >= 0.5 {
        ScoreBand::Poor
    } else {
        ScoreBand::VeryPoor
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyBand {
    Easy,
    Moderate,
    Challenging,
    Difficult,
    Expert,
}

impl DifficultyBand {
    pub fn label(&self) -> &'static str {
        match self {
            DifficultyBand::Easy => "Easy",
            DifficultyBand::Moderate => "Moderate",
            DifficultyBand::Challenging => "Challenging",
            DifficultyBand::Difficult => "Difficult",
            DifficultyBand::Expert => "Expert",
        }
    }
}

impl std::fmt::Display for DifficultyBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

pub fn difficulty_description(difficulty: f64) -> DifficultyBand {
    if difficulty <= 0.2 {
        DifficultyBand::Easy
    } else if difficulty <= 0.4 {
        DifficultyBand::Moderate
    } else if difficulty <= 0.6 {
        DifficultyBand::Challenging
    } else if difficulty <= 0.8 {
        DifficultyBand::Difficult
    } else {
        DifficultyBand::Expert
    }
}

/// How well the structure of both tracks supports a transition at `transition_time`.
///
/// 0.5 when either track lacks analysis.
pub fn transition_point_score(a: &Track, b: &Track, transition_time: f64) -> f64 {
    let (Some(aa), Some(ab)) = (&a.audio_analysis, &b.audio_analysis) else {
        return 0.5;
    };

    (outro_quality(aa, transition_time) + intro_quality(ab, transition_time)) / 2.0
}

fn outro_quality(analysis: &AudioAnalysis, target: f64) -> f64 {
    if analysis.sections.iter().any(|s| s.start > target - 30.0) {
        0.9
    } else if analysis.bars.iter().any(|b| b.start > target - 20.0) {
        0.7
    } else {
        0.5
    }
}

fn intro_quality(analysis: &AudioAnalysis, target: f64) -> f64 {
    if analysis.sections.iter().any(|s| s.start < target + 30.0) {
        0.9
    } else if analysis.bars.iter().any(|b| b.start < target + 20.0) {
        0.7
    } else {
        0.5
    }
}

/// Candidates paired with their score against `base`, best first.
///
/// Equal scores keep their input order.
pub fn rank_candidates<'a>(
    base: &Track,
    candidates: &'a [Track],
    config: &MixConfig,
    weights: &ScoringWeights,
) -> Vec<(&'a Track, CompatibilityScore)> {
    let mut ranked: Vec<_> = candidates
        .iter()
        .map(|track| (track, compatibility_score(base, track, config, weights)))
        .collect();
    ranked.sort_by(|x, y| y.1.overall.total_cmp(&x.1.overall));
    ranked
}

/// Candidates whose key mixes harmonically with a Camelot label such as `"8A"`.
pub fn harmonic_candidates<'a>(label: &str, candidates: &'a [Track]) -> Result<Vec<&'a Track>> {
    let target = CamelotLabel::Known(parse_camelot(label)?);
    Ok(candidates
        .iter()
        .filter(|track| is_harmonic_match(target, track.camelot()))
        .collect())
}

/// Crossfade character for moving from one energy level to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnergyPreset {
    Rise,
    Fade,
    Melt,
}

impl std::fmt::Display for EnergyPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EnergyPreset::Rise => "Rise",
            EnergyPreset::Fade => "Fade",
            EnergyPreset::Melt => "Melt",
        };
        f.write_str(s)
    }
}

pub fn energy_preset(seed_energy: f64, next_energy: f64) -> EnergyPreset {
    let delta = next_energy - seed_energy;
    if delta > 0.1 {
        EnergyPreset::Rise
    } else if delta < -0.1 {
        EnergyPreset::Fade
    } else {
        EnergyPreset::Melt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnalysisSummary, AudioFeatures, Section, TimeInterval};
    use pretty_assertions::assert_eq;

    fn track(id: &str, tempo: f64, key: i32, mode: i32, energy: f64) -> Track {
        Track {
            id: id.to_string(),
            name: format!("Track {id}"),
            artists: vec![],
            duration_ms: 240_000,
            audio_features: Some(AudioFeatures {
                tempo,
                key,
                mode,
                energy,
                danceability: 0.7,
                valence: 0.5,
                duration_ms: None,
                time_signature: Some(4),
            }),
            audio_analysis: None,
            genres: Some(vec!["house".to_string()]),
        }
    }

    fn bare(id: &str) -> Track {
        Track {
            audio_features: None,
            ..track(id, 0.0, 0, 0, 0.0)
        }
    }

    #[test]
    fn identical_clone_scores_high() {
        let a = track("a", 124.0, 9, 0, 0.8);
        let b = track("b", 124.0, 9, 0, 0.8);
        let score = compatibility_score(&a, &b, &MixConfig::default(), &ScoringWeights::default());

        assert_eq!(score.tempo, 1.0);
        assert_eq!(score.key, 1.0);
        assert_eq!(score.genre, 1.0);
        assert!(score.overall > 0.8, "overall {}", score.overall);
    }

    #[test]
    fn overall_is_clamped_when_weights_exceed_one() {
        let a = track("a", 124.0, 9, 0, 0.8);
        let b = track("b", 124.0, 9, 0, 0.8);
        let weights = ScoringWeights {
            tempo: 1.0,
            key: 1.0,
            energy: 1.0,
            danceability: 1.0,
            genre: 1.0,
        };
        let score = compatibility_score(&a, &b, &MixConfig::default(), &weights);

        assert_eq!(score.overall, 1.0);
        assert_eq!(score.tempo, 1.0);
        assert_eq!(score.genre, 1.0);
    }

    #[test]
    fn missing_features_score_zero() {
        let a = track("a", 124.0, 9, 0, 0.8);
        let score = compatibility_score(&a, &bare("b"), &MixConfig::default(), &ScoringWeights::default());
        assert_eq!(score, CompatibilityScore::default());
    }

    #[test]
    fn disabled_switches_give_full_credit() {
        let a = track("a", 124.0, 0, 1, 0.9);
        let mut b = track("b", 124.0, 6, 1, 0.1);
        b.genres = Some(vec!["bebop".to_string()]);
        let config = MixConfig {
            harmonic_matching: false,
            maintain_energy: false,
            same_genre: false,
            ..Default::default()
        };
        let score = compatibility_score(&a, &b, &config, &ScoringWeights::default());

        assert_eq!(score.key, 1.0);
        assert_eq!(score.energy, 1.0);
        assert_eq!(score.genre, 1.0);
        assert!((score.overall - 1.0).abs() < 1e-9);
    }

    #[test]
    fn genre_formula_follows_config() {
        let mut a = track("a", 124.0, 0, 1, 0.5);
        let mut b = track("b", 124.0, 0, 1, 0.5);
        a.genres = Some(vec!["techno".to_string()]);
        b.genres = Some(vec!["synthpop".to_string()]);

        let tiered = compatibility_score(&a, &b, &MixConfig::default(), &ScoringWeights::default());
        let distance = compatibility_score(
            &a,
            &b,
            &MixConfig {
                genre_scoring: GenreScoring::FamilyDistance,
                ..Default::default()
            },
            &ScoringWeights::default(),
        );

        assert_eq!(tiered.genre, 0.3);
        assert!(distance.genre > 0.3 && distance.genre < 1.0, "{}", distance.genre);
    }

    #[test]
    fn difficulty_adds_penalties_and_caps() {
        let config = MixConfig::default();
        let a = track("a", 124.0, 9, 0, 0.8);
        assert!(transition_difficulty(&a, &a.clone(), &config) < 0.2);

        let far = track("b", 90.0, 3, 1, 0.1);
        let d = transition_difficulty(&a, &far, &config);
        assert!(d > 0.8 && d <= 1.0, "difficulty {d}");
        assert_eq!(transition_difficulty(&a, &bare("c"), &config), 1.0);
    }

    #[test]
    fn score_bands() {
        assert_eq!(score_description(0.95).label(), "Excellent");
        assert_eq!(score_description(0.85).label(), "Very Good");
        assert_eq!(score_description(0.75).label(), "Good");
        assert_eq!(score_description(0.65).label(), "Fair");
        // 0.5 is the floor of Poor
        assert_eq!(score_description(0.45).label(), "Very Poor");
        assert_eq!(score_description(0.55), ScoreBand::Poor);
        assert_eq!(score_description(0.25), ScoreBand::VeryPoor);
        assert_eq!(score_description(0.9), ScoreBand::Excellent);
    }

    #[test]
    fn difficulty_bands() {
        assert_eq!(difficulty_description(0.2), DifficultyBand::Easy);
        assert_eq!(difficulty_description(0.3), DifficultyBand::Moderate);
        assert_eq!(difficulty_description(0.5), DifficultyBand::Challenging);
        assert_eq!(difficulty_description(0.8), DifficultyBand::Difficult);
        assert_eq!(difficulty_description(0.81).to_string(), "Expert");
    }

    #[test]
    fn point_score_uses_structure() {
        let a = track("a", 124.0, 9, 0, 0.8);
        let b = track("b", 124.0, 9, 0, 0.8);
        assert_eq!(transition_point_score(&a, &b, 200.0), 0.5);

        let analysis = |sections: Vec<Section>, bars: Vec<TimeInterval>| AudioAnalysis {
            track: AnalysisSummary {
                duration: 240.0,
                key_confidence: None,
            },
            sections,
            bars,
            beats: vec![],
        };
        let section = |start: f64| Section {
            start,
            duration: 30.0,
            confidence: 0.6,
            loudness: -8.0,
            tempo: 124.0,
            key: 9,
            mode: 0,
        };
        let bar = |start: f64| TimeInterval {
            start,
            duration: 2.0,
            confidence: 0.5,
        };

        let mut a = a;
        let mut b = b;
        a.audio_analysis = Some(analysis(vec![section(0.0), section(190.0)], vec![]));
        b.audio_analysis = Some(analysis(vec![section(0.0)], vec![]));
        assert!((transition_point_score(&a, &b, 200.0) - 0.9).abs() < 1e-9);

        // outro falls back to bars, intro has nothing near
        a.audio_analysis = Some(analysis(vec![section(0.0)], vec![bar(185.0)]));
        b.audio_analysis = Some(analysis(vec![section(300.0)], vec![]));
        assert!((transition_point_score(&a, &b, 200.0) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn ranking_is_descending_and_stable() {
        let base = track("base", 124.0, 9, 0, 0.8);
        let candidates = vec![
            track("far", 90.0, 3, 1, 0.1),
            track("twin1", 124.0, 9, 0, 0.8),
            track("near", 126.0, 10, 0, 0.7),
            track("twin2", 124.0, 9, 0, 0.8),
        ];
        let ranked = rank_candidates(
            &base,
            &candidates,
            &MixConfig::default(),
            &ScoringWeights::default(),
        );
        let ids: Vec<&str> = ranked.iter().map(|(t, _)| t.id.as_str()).collect();
        assert_eq!(ids, vec!["twin1", "twin2", "near", "far"]);
    }

    #[test]
    fn harmonic_candidate_filter() {
        let candidates = vec![
            track("a", 124.0, 9, 0, 0.8), // 8A
            track("b", 124.0, 0, 1, 0.8), // 8B
            track("c", 124.0, 6, 1, 0.8), // 2B
            bare("d"),
        ];
        let matches = harmonic_candidates("8A", &candidates).unwrap();
        let ids: Vec<&str> = matches.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        assert!(harmonic_candidates("13A", &candidates).is_err());
        assert!(harmonic_candidates("Unknown", &candidates).is_err());
    }

    #[test]
    fn presets_follow_energy_delta() {
        assert_eq!(energy_preset(0.5, 0.7), EnergyPreset::Rise);
        assert_eq!(energy_preset(0.7, 0.5), EnergyPreset::Fade);
        assert_eq!(energy_preset(0.5, 0.55), EnergyPreset::Melt);
        assert_eq!(EnergyPreset::Melt.to_string(), "Melt");
    }
}
