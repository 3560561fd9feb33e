//! Mixing policy and scoring weights.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Which genre formula the scorer applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenreScoring {
    /// 1.0 shared tag, 0.7 shared family, 0.3 otherwise.
    #[default]
    Tiered,
    /// Continuous similarity between family characteristics.
    FamilyDistance,
}

impl GenreScoring {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenreScoring::Tiered => "tiered",
            GenreScoring::FamilyDistance => "family_distance",
        }
    }
}

impl std::str::FromStr for GenreScoring {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tiered" => Ok(GenreScoring::Tiered),
            "family_distance" | "family-distance" => Ok(GenreScoring::FamilyDistance),
            other => Err(format!("unknown genre scoring {other:?}")),
        }
    }
}

/// Scoring and ordering policy for one mixing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixConfig {
    /// BPM window for tempo matching.
    /// Default: 4.0
    #[serde(default = "MixConfig::default_bpm_tolerance")]
    pub bpm_tolerance: f64,

    /// Score Camelot key compatibility; when off every pair gets full key credit.
    #[serde(default = "default_true")]
    pub harmonic_matching: bool,

    /// Score genre compatibility; when off every pair gets full genre credit.
    #[serde(default = "default_true")]
    pub same_genre: bool,

    /// Score energy continuity; when off every pair gets full energy credit.
    #[serde(default = "default_true")]
    pub maintain_energy: bool,

    /// Accept 2:1 and 1:2 tempo relationships.
    #[serde(default = "default_true")]
    pub allow_half_double_time: bool,

    #[serde(default)]
    pub genre_scoring: GenreScoring,
}

fn default_true() -> bool {
    true
}

impl MixConfig {
    fn default_bpm_tolerance() -> f64 {
        4.0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.bpm_tolerance.is_finite() || self.bpm_tolerance <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "mix.bpm_tolerance".to_string(),
                message: format!("must be a positive number, got {}", self.bpm_tolerance),
            });
        }
        Ok(())
    }
}

impl Default for MixConfig {
    fn default() -> Self {
        Self {
            bpm_tolerance: Self::default_bpm_tolerance(),
            harmonic_matching: true,
            same_genre: true,
            maintain_energy: true,
            allow_half_double_time: true,
            genre_scoring: GenreScoring::default(),
        }
    }
}

/// Relative weight of each compatibility component. Expected to sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    #[serde(default = "ScoringWeights::default_tempo")]
    pub tempo: f64,
    #[serde(default = "ScoringWeights::default_key")]
    pub key: f64,
    #[serde(default = "ScoringWeights::default_energy")]
    pub energy: f64,
    #[serde(default = "ScoringWeights::default_danceability")]
    pub danceability: f64,
    #[serde(default = "ScoringWeights::default_genre")]
    pub genre: f64,
}

impl ScoringWeights {
    fn default_tempo() -> f64 {
        0.3
    }

    fn default_key() -> f64 {
        0.25
    }

    fn default_energy() -> f64 {
        0.2
    }

    fn default_danceability() -> f64 {
        0.15
    }

    fn default_genre() -> f64 {
        0.1
    }

    pub fn sum(&self) -> f64 {
        self.tempo + self.key + self.energy + self.danceability + self.genre
    }

    /// Rejects negative or non-finite weights. The sum is not enforced.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("weights.tempo", self.tempo),
            ("weights.key", self.key),
            ("weights.energy", self.energy),
            ("weights.danceability", self.danceability),
            ("weights.genre", self.genre),
        ];

        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    field: field.to_string(),
                    message: format!("must be a non-negative number, got {value}"),
                });
            }
        }
        Ok(())
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            tempo: Self::default_tempo(),
            key: Self::default_key(),
            energy: Self::default_energy(),
            danceability: Self::default_danceability(),
            genre: Self::default_genre(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one() {
        let weights = ScoringWeights::default();
        assert!((weights.sum() - 1.0).abs() < 1e-9);
        assert!(weights.validate().is_ok());
    }

    #[test]
    fn negative_weight_is_rejected() {
        let weights = ScoringWeights {
            genre: -0.1,
            ..Default::default()
        };
        let err = weights.validate().unwrap_err();
        assert!(err.to_string().contains("weights.genre"), "{err}");
    }

    #[test]
    fn zero_tolerance_is_rejected() {
        let config = MixConfig {
            bpm_tolerance: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(MixConfig::default().validate().is_ok());
    }

    #[test]
    fn genre_scoring_parses_both_spellings() {
        assert_eq!("tiered".parse(), Ok(GenreScoring::Tiered));
        assert_eq!("Family-Distance".parse(), Ok(GenreScoring::FamilyDistance));
        assert!("fuzzy".parse::<GenreScoring>().is_err());
    }
}
