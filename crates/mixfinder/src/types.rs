use mix_theory::{to_camelot, CamelotLabel, Mode};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Parse a JSON array of catalog track records.
pub fn parse_tracks(json: &str) -> Result<Vec<Track>> {
    Ok(serde_json::from_str(json)?)
}

/// A track as delivered by the music catalog, with whatever feature data
/// was fetched for it. The core never mutates these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    pub duration_ms: u64,
    #[serde(default)]
    pub audio_features: Option<AudioFeatures>,
    #[serde(default)]
    pub audio_analysis: Option<AudioAnalysis>,
    #[serde(default, alias = "artist_genres")]
    pub genres: Option<Vec<String>>,
}

impl Track {
    /// Duration in seconds, preferring the feature record's length when it has one.
    pub fn duration_seconds(&self) -> f64 {
        let ms = self
            .audio_features
            .as_ref()
            .and_then(|f| f.duration_ms)
            .filter(|&ms| ms > 0)
            .unwrap_or(self.duration_ms);
        ms as f64 / 1000.0
    }

    /// Camelot label of the track's key; Unknown without features.
    pub fn camelot(&self) -> CamelotLabel {
        self.audio_features
            .as_ref()
            .map(AudioFeatures::camelot)
            .unwrap_or(CamelotLabel::Unknown)
    }

    pub fn genre_tags(&self) -> &[String] {
        self.genres.as_deref().unwrap_or(&[])
    }

    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    /// BPM
    pub tempo: f64,
    /// Pitch class 0-11, -1 when no key was detected
    pub key: i32,
    /// 0 = minor, 1 = major
    pub mode: i32,
    pub energy: f64,
    pub danceability: f64,
    #[serde(default)]
    pub valence: f64,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub time_signature: Option<u32>,
}

impl AudioFeatures {
    pub fn camelot(&self) -> CamelotLabel {
        to_camelot(self.key, Mode::from_raw(self.mode))
    }
}

/// Structural decomposition of a track.
///
/// `None` on a [`Track`] means no analysis was fetched; an analysis with an
/// empty `sections` list is a separate state with its own fallbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioAnalysis {
    pub track: AnalysisSummary,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub bars: Vec<TimeInterval>,
    #[serde(default)]
    pub beats: Vec<TimeInterval>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Seconds
    pub duration: f64,
    #[serde(default)]
    pub key_confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub start: f64,
    pub duration: f64,
    pub confidence: f64,
    /// dB, usually negative
    pub loudness: f64,
    #[serde(default)]
    pub tempo: f64,
    #[serde(default = "Section::default_key")]
    pub key: i32,
    #[serde(default)]
    pub mode: i32,
}

impl Section {
    fn default_key() -> i32 {
        -1
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// A bar or beat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: f64,
    pub duration: f64,
    #[serde(default)]
    pub confidence: f64,
}

/// Per-component compatibility of a track pair, each in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityScore {
    pub overall: f64,
    pub tempo: f64,
    pub key: f64,
    pub energy: f64,
    pub danceability: f64,
    pub genre: f64,
}
