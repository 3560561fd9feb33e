//! Track structure and transition timing.
//!
//! Works from a track's [`AudioAnalysis`] when present, and from its
//! duration alone otherwise.

use mix_theory::{CamelotLabel, Mode};
use serde::Serialize;

use crate::types::{AudioAnalysis, Section, Track};

/// Sections starting before this many seconds can serve as the intro.
const INTRO_WINDOW_SECS: f64 = 30.0;
const DEFAULT_SECTION_CONFIDENCE: f64 = 0.5;
const BREAKDOWN_MAX_LOUDNESS_DB: f64 = -20.0;
const DROP_MIN_LOUDNESS_DB: f64 = -10.0;
const BUILD_MAX_LOUDNESS_DB: f64 = -15.0;

/// A span of a track, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Region {
    pub start: f64,
    pub duration: f64,
}

impl Region {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

impl From<&Section> for Region {
    fn from(section: &Section) -> Self {
        Self {
            start: section.start,
            duration: section.duration,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkedRegion {
    pub start: f64,
    pub end: f64,
    pub confidence: f64,
}

impl MarkedRegion {
    fn from_section(section: &Section) -> Self {
        Self {
            start: section.start,
            end: section.end(),
            confidence: section.confidence,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IntroOutro {
    pub intro: MarkedRegion,
    pub outro: MarkedRegion,
}

fn intro_section(sections: &[Section]) -> Option<&Section> {
    sections.iter().find(|s| s.start < INTRO_WINDOW_SECS)
}

/// Intro is the first section starting in the first 30 seconds, outro the
/// last section. Missing either, a 30 second region at the matching end
/// of the track stands in with confidence 0.5.
pub fn find_intro_outro(analysis: &AudioAnalysis) -> IntroOutro {
    let intro = intro_section(&analysis.sections)
        .map(MarkedRegion::from_section)
        .unwrap_or(MarkedRegion {
            start: 0.0,
            end: INTRO_WINDOW_SECS,
            confidence: DEFAULT_SECTION_CONFIDENCE,
        });

    let duration = analysis.track.duration;
    let outro = analysis
        .sections
        .last()
        .map(MarkedRegion::from_section)
        .unwrap_or(MarkedRegion {
            start: (duration - INTRO_WINDOW_SECS).max(0.0),
            end: duration,
            confidence: DEFAULT_SECTION_CONFIDENCE,
        });

    IntroOutro { intro, outro }
}

/// Mix-relevant regions of a track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackStructure {
    pub intro: Region,
    pub outro: Region,
    pub breakdown: Option<Region>,
    pub build: Option<Region>,
    pub drop: Option<Region>,
}

fn fallback_intro(duration: f64) -> Region {
    Region {
        start: 0.0,
        duration: INTRO_WINDOW_SECS.min(duration * 0.1),
    }
}

fn fallback_outro(duration: f64) -> Region {
    Region {
        start: duration * 0.8,
        duration: INTRO_WINDOW_SECS.min(duration * 0.2),
    }
}

/// First section with the lowest loudness, kept if quieter than -20 dB.
fn breakdown_section(sections: &[Section]) -> Option<&Section> {
    let quietest = sections
        .iter()
        .reduce(|best, s| if s.loudness < best.loudness { s } else { best })?;
    (quietest.loudness < BREAKDOWN_MAX_LOUDNESS_DB).then_some(quietest)
}

/// First section with the highest loudness, kept if louder than -10 dB.
fn drop_section(sections: &[Section]) -> Option<&Section> {
    let loudest = sections
        .iter()
        .reduce(|best, s| if s.loudness > best.loudness { s } else { best })?;
    (loudest.loudness > DROP_MIN_LOUDNESS_DB).then_some(loudest)
}

/// First quiet section that the next section gets louder from.
fn build_section(sections: &[Section]) -> Option<&Section> {
    sections
        .windows(2)
        .find(|pair| pair[0].loudness < BUILD_MAX_LOUDNESS_DB && pair[0].loudness < pair[1].loudness)
        .map(|pair| &pair[0])
}

pub fn analyze_structure(track: &Track) -> TrackStructure {
    let Some(analysis) = &track.audio_analysis else {
        let duration = track.duration_ms as f64 / 1000.0;
        return TrackStructure {
            intro: fallback_intro(duration),
            outro: fallback_outro(duration),
            breakdown: None,
            build: None,
            drop: None,
        };
    };

    let sections = &analysis.sections;
    let duration = analysis.track.duration;

    TrackStructure {
        intro: intro_section(sections)
            .map(Region::from)
            .unwrap_or_else(|| fallback_intro(duration)),
        outro: sections
            .last()
            .map(Region::from)
            .unwrap_or_else(|| fallback_outro(duration)),
        breakdown: breakdown_section(sections).map(Region::from),
        build: build_section(sections).map(Region::from),
        drop: drop_section(sections).map(Region::from),
    }
}

/// Where to leave one track and enter the next, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransitionPoints {
    /// Offset into the outgoing track.
    pub outro: f64,
    /// Offset into the incoming track.
    pub intro: f64,
    pub confidence: f64,
}

pub fn optimal_transition_points(from: &Track, to: &Track) -> TransitionPoints {
    let (Some(a), Some(b)) = (&from.audio_analysis, &to.audio_analysis) else {
        return TransitionPoints {
            outro: from.duration_seconds() * 0.8,
            intro: to.duration_seconds() * 0.1,
            confidence: 0.3,
        };
    };

    let outro = find_intro_outro(a).outro;
    let intro = find_intro_outro(b).intro;

    TransitionPoints {
        outro: outro.start,
        intro: intro.start,
        confidence: (outro.confidence + intro.confidence) / 2.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    BreakdownBuild,
    DropDrop,
    IntroOutro,
}

impl TransitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionKind::BreakdownBuild => "breakdown_build",
            TransitionKind::DropDrop => "drop_drop",
            TransitionKind::IntroOutro => "intro_outro",
        }
    }

    pub fn confidence(&self) -> f64 {
        match self {
            TransitionKind::BreakdownBuild => 0.9,
            TransitionKind::DropDrop => 0.8,
            TransitionKind::IntroOutro => 0.7,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TransitionKind::BreakdownBuild => {
                "Breakdown to build transition, builds energy into the next track"
            }
            TransitionKind::DropDrop => "Drop to drop transition, keeps the energy high",
            TransitionKind::IntroOutro => "Standard outro to intro transition",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransitionRecommendation {
    pub kind: TransitionKind,
    pub confidence: f64,
    pub description: &'static str,
}

impl From<TransitionKind> for TransitionRecommendation {
    fn from(kind: TransitionKind) -> Self {
        Self {
            kind,
            confidence: kind.confidence(),
            description: kind.description(),
        }
    }
}

pub fn transition_recommendation(from: &Track, to: &Track) -> TransitionRecommendation {
    let a = analyze_structure(from);
    let b = analyze_structure(to);

    let kind = if a.breakdown.is_some() && b.build.is_some() {
        TransitionKind::BreakdownBuild
    } else if a.drop.is_some() && b.drop.is_some() {
        TransitionKind::DropDrop
    } else {
        TransitionKind::IntroOutro
    };

    kind.into()
}

/// Bars of `track` starting within `[start, end]`; 0 without analysis.
pub fn transition_bar_count(track: &Track, start: f64, end: f64) -> usize {
    track.audio_analysis.as_ref().map_or(0, |analysis| {
        analysis
            .bars
            .iter()
            .filter(|bar| bar.start >= start && bar.start <= end)
            .count()
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KeyInfo {
    pub camelot: CamelotLabel,
    pub confidence: f64,
    /// "Major", "Minor", or "Unknown" without features.
    pub mode: &'static str,
}

pub fn transition_key_info(track: &Track) -> KeyInfo {
    let Some(features) = &track.audio_features else {
        return KeyInfo {
            camelot: CamelotLabel::Unknown,
            confidence: 0.0,
            mode: "Unknown",
        };
    };

    let confidence = track
        .audio_analysis
        .as_ref()
        .and_then(|a| a.track.key_confidence)
        .filter(|&c| c > 0.0)
        .unwrap_or(DEFAULT_SECTION_CONFIDENCE);

    KeyInfo {
        camelot: features.camelot(),
        confidence,
        mode: Mode::from_raw(features.mode).as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnalysisSummary, AudioFeatures, TimeInterval};
    use pretty_assertions::assert_eq;

    fn section(start: f64, duration: f64, loudness: f64, confidence: f64) -> Section {
        Section {
            start,
            duration,
            confidence,
            loudness,
            tempo: 126.0,
            key: 7,
            mode: 1,
        }
    }

    fn analysis(duration: f64, sections: Vec<Section>) -> AudioAnalysis {
        AudioAnalysis {
            track: AnalysisSummary {
                duration,
                key_confidence: Some(0.8),
            },
            sections,
            bars: vec![],
            beats: vec![],
        }
    }

    fn track_with(id: &str, duration_ms: u64, analysis: Option<AudioAnalysis>) -> Track {
        Track {
            id: id.to_string(),
            name: id.to_string(),
            artists: vec![],
            duration_ms,
            audio_features: None,
            audio_analysis: analysis,
            genres: None,
        }
    }

    #[test]
    fn intro_outro_from_sections() {
        let a = analysis(
            200.0,
            vec![
                section(0.0, 20.0, -12.0, 0.9),
                section(20.0, 100.0, -6.0, 0.4),
                section(120.0, 80.0, -14.0, 0.6),
            ],
        );
        let io = find_intro_outro(&a);
        assert_eq!(
            io.intro,
            MarkedRegion {
                start: 0.0,
                end: 20.0,
                confidence: 0.9
            }
        );
        assert_eq!(io.outro.start, 120.0);
        assert_eq!(io.outro.end, 200.0);
        assert_eq!(io.outro.confidence, 0.6);
    }

    #[test]
    fn intro_outro_without_sections() {
        let io = find_intro_outro(&analysis(200.0, vec![]));
        assert_eq!(io.intro.end, 30.0);
        assert_eq!(io.intro.confidence, 0.5);
        assert_eq!(io.outro.start, 170.0);
        assert_eq!(io.outro.end, 200.0);

        let short = find_intro_outro(&analysis(20.0, vec![]));
        assert_eq!(short.outro.start, 0.0);
    }

    #[test]
    fn structure_fallback_uses_duration() {
        let structure = analyze_structure(&track_with("t", 200_000, None));
        assert_eq!(structure.intro, Region { start: 0.0, duration: 20.0 });
        assert_eq!(structure.outro, Region { start: 160.0, duration: 30.0 });
        assert!(structure.breakdown.is_none());
        assert!(structure.build.is_none());
        assert!(structure.drop.is_none());
    }

    #[test]
    fn structure_regions_from_loudness() {
        let sections = vec![
            section(0.0, 30.0, -18.0, 0.5),
            section(30.0, 30.0, -9.0, 0.5),
            section(60.0, 30.0, -24.0, 0.5),
            section(90.0, 30.0, -16.0, 0.5),
            section(120.0, 30.0, -5.0, 0.5),
            section(150.0, 30.0, -5.0, 0.5),
        ];
        let structure = analyze_structure(&track_with("t", 180_000, Some(analysis(180.0, sections))));

        assert_eq!(structure.breakdown, Some(Region { start: 60.0, duration: 30.0 }));
        // first quiet section followed by a louder one
        assert_eq!(structure.build, Some(Region { start: 0.0, duration: 30.0 }));
        // ties go to the earlier section
        assert_eq!(structure.drop, Some(Region { start: 120.0, duration: 30.0 }));
    }

    #[test]
    fn structure_thresholds_reject_weak_regions() {
        let sections = vec![section(0.0, 60.0, -12.0, 0.5), section(60.0, 60.0, -11.0, 0.5)];
        let structure = analyze_structure(&track_with("t", 120_000, Some(analysis(120.0, sections))));
        assert!(structure.breakdown.is_none());
        assert!(structure.build.is_none());
        assert!(structure.drop.is_none());
    }

    #[test]
    fn empty_sections_fall_back_to_analysis_duration() {
        let structure = analyze_structure(&track_with("t", 999_000, Some(analysis(100.0, vec![]))));
        assert_eq!(structure.intro, Region { start: 0.0, duration: 10.0 });
        assert_eq!(structure.outro, Region { start: 80.0, duration: 20.0 });
    }

    #[test]
    fn transition_points_fallback_is_in_seconds() {
        let a = track_with("a", 200_000, None);
        let b = track_with("b", 300_000, None);
        let points = optimal_transition_points(&a, &b);
        assert_eq!(points.outro, 160.0);
        assert_eq!(points.intro, 30.0);
        assert_eq!(points.confidence, 0.3);
    }

    #[test]
    fn transition_points_from_analysis() {
        let a = track_with(
            "a",
            200_000,
            Some(analysis(200.0, vec![section(0.0, 150.0, -8.0, 0.2), section(150.0, 50.0, -8.0, 0.6)])),
        );
        let b = track_with("b", 200_000, Some(analysis(200.0, vec![section(4.0, 40.0, -8.0, 0.8)])));
        let points = optimal_transition_points(&a, &b);
        assert_eq!(points.outro, 150.0);
        assert_eq!(points.intro, 4.0);
        assert!((points.confidence - 0.7).abs() < 1e-9);
    }

    #[test]
    fn recommendation_priority() {
        let breakdown = track_with(
            "bd",
            120_000,
            Some(analysis(120.0, vec![section(0.0, 60.0, -25.0, 0.5), section(60.0, 60.0, -25.0, 0.5)])),
        );
        let build = track_with(
            "bu",
            120_000,
            Some(analysis(120.0, vec![section(0.0, 60.0, -18.0, 0.5), section(60.0, 60.0, -6.0, 0.5)])),
        );
        let plain = track_with("p", 120_000, None);

        let rec = transition_recommendation(&breakdown, &build);
        assert_eq!(rec.kind, TransitionKind::BreakdownBuild);
        assert_eq!(rec.confidence, 0.9);

        // build has a drop at -6 dB, breakdown has none
        assert_eq!(transition_recommendation(&build, &build).kind, TransitionKind::DropDrop);
        assert_eq!(transition_recommendation(&build, &build).confidence, 0.8);

        let fallback = transition_recommendation(&plain, &build);
        assert_eq!(fallback.kind, TransitionKind::IntroOutro);
        assert_eq!(fallback.confidence, 0.7);
        assert_eq!(fallback.kind.as_str(), "intro_outro");
    }

    #[test]
    fn bar_count_is_inclusive() {
        let mut a = analysis(60.0, vec![]);
        a.bars = (0..30)
            .map(|i| TimeInterval {
                start: i as f64 * 2.0,
                duration: 2.0,
                confidence: 0.5,
            })
            .collect();
        let track = track_with("t", 60_000, Some(a));

        // bars at 10, 12, ..., 20
        assert_eq!(transition_bar_count(&track, 10.0, 20.0), 6);
        assert_eq!(transition_bar_count(&track, 100.0, 120.0), 0);
        assert_eq!(transition_bar_count(&track_with("n", 60_000, None), 0.0, 60.0), 0);
    }

    #[test]
    fn key_info() {
        let mut track = track_with("t", 60_000, None);
        let info = transition_key_info(&track);
        assert!(info.camelot.is_unknown());
        assert_eq!(info.confidence, 0.0);
        assert_eq!(info.mode, "Unknown");

        track.audio_features = Some(AudioFeatures {
            tempo: 126.0,
            key: 7,
            mode: 0,
            energy: 0.8,
            danceability: 0.8,
            valence: 0.5,
            duration_ms: None,
            time_signature: None,
        });
        let info = transition_key_info(&track);
        assert_eq!(info.camelot.to_string(), "6A");
        assert_eq!(info.confidence, 0.5);
        assert_eq!(info.mode, "Minor");

        track.audio_analysis = Some(analysis(60.0, vec![]));
        assert_eq!(transition_key_info(&track).confidence, 0.8);
    }
}
