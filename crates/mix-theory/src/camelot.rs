//! Camelot wheel notation and harmonic mixing rules.
//!
//! Positions 1–12 run around the wheel in fifths; polarity `A` is minor and
//! `B` is major. Keys one step apart on the wheel, or sharing a position with
//! opposite polarity, mix without clashing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const KEY_NAMES: [&str; 12] = [
    "C", "C#/Db", "D", "Eb", "E", "F", "F#/Gb", "G", "Ab", "A", "Bb", "B",
];

/// Pitch class → (minor, major) wheel position.
const CAMELOT_TABLE: [(CamelotKey, CamelotKey); 12] = [
    (CamelotKey::a(5), CamelotKey::b(8)),   // C
    (CamelotKey::a(12), CamelotKey::b(3)),  // C#/Db
    (CamelotKey::a(7), CamelotKey::b(10)),  // D
    (CamelotKey::a(2), CamelotKey::b(5)),   // Eb
    (CamelotKey::a(9), CamelotKey::b(12)),  // E
    (CamelotKey::a(4), CamelotKey::b(7)),   // F
    (CamelotKey::a(11), CamelotKey::b(2)),  // F#/Gb
    (CamelotKey::a(6), CamelotKey::b(9)),   // G
    (CamelotKey::a(1), CamelotKey::b(4)),   // Ab
    (CamelotKey::a(8), CamelotKey::b(11)),  // A
    (CamelotKey::a(3), CamelotKey::b(6)),   // Bb
    (CamelotKey::a(10), CamelotKey::b(1)),  // B
];

/// Musical mode as reported by audio features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Minor,
    Major,
}

impl Mode {
    /// Catalog encoding: 0 is minor, anything else major.
    pub fn from_raw(mode: i32) -> Self {
        if mode == 0 {
            Mode::Minor
        } else {
            Mode::Major
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Minor => "Minor",
            Mode::Major => "Major",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wheel polarity: `A` = minor, `B` = major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    A,
    B,
}

impl Polarity {
    pub fn opposite(self) -> Self {
        match self {
            Polarity::A => Polarity::B,
            Polarity::B => Polarity::A,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Polarity::A => 'A',
            Polarity::B => 'B',
        }
    }
}

/// A position on the Camelot wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CamelotKey {
    position: u8,
    polarity: Polarity,
}

impl CamelotKey {
    pub fn new(position: u8, polarity: Polarity) -> Result<Self> {
        if !(1..=12).contains(&position) {
            return Err(Error::PositionOutOfRange(position));
        }
        Ok(Self { position, polarity })
    }

    const fn a(position: u8) -> Self {
        Self {
            position,
            polarity: Polarity::A,
        }
    }

    const fn b(position: u8) -> Self {
        Self {
            position,
            polarity: Polarity::B,
        }
    }

    pub fn position(&self) -> u8 {
        self.position
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Same position, opposite polarity.
    pub fn relative(&self) -> Self {
        Self {
            position: self.position,
            polarity: self.polarity.opposite(),
        }
    }

    /// One step clockwise; 12 wraps to 1.
    pub fn next(&self) -> Self {
        Self {
            position: self.position % 12 + 1,
            polarity: self.polarity,
        }
    }

    /// One step counter-clockwise; 1 wraps to 12.
    pub fn previous(&self) -> Self {
        Self {
            position: (self.position + 10) % 12 + 1,
            polarity: self.polarity,
        }
    }

    /// Whether the positions are neighbours on the wheel, ignoring polarity.
    pub fn is_adjacent(&self, other: &Self) -> bool {
        let diff = self.position.abs_diff(other.position);
        diff == 1 || diff == 11
    }
}

impl fmt::Display for CamelotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.position, self.polarity.as_char())
    }
}

impl FromStr for CamelotKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidCamelot(s.to_string());

        let polarity = match s.chars().last() {
            Some('A') => Polarity::A,
            Some('B') => Polarity::B,
            _ => return Err(invalid()),
        };

        let digits = &s[..s.len() - 1];
        if digits.is_empty()
            || digits.starts_with('0')
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let position: u8 = digits.parse().map_err(|_| invalid())?;
        CamelotKey::new(position, polarity).map_err(|_| invalid())
    }
}

impl TryFrom<String> for CamelotKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<CamelotKey> for String {
    fn from(key: CamelotKey) -> Self {
        key.to_string()
    }
}

/// A Camelot key, or `Unknown` when the source key was not detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CamelotLabel {
    Known(CamelotKey),
    Unknown,
}

impl CamelotLabel {
    pub fn key(&self) -> Option<CamelotKey> {
        match self {
            CamelotLabel::Known(key) => Some(*key),
            CamelotLabel::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, CamelotLabel::Unknown)
    }
}

impl fmt::Display for CamelotLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CamelotLabel::Known(key) => key.fmt(f),
            CamelotLabel::Unknown => f.write_str("Unknown"),
        }
    }
}

impl FromStr for CamelotLabel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == "Unknown" {
            return Ok(CamelotLabel::Unknown);
        }
        s.parse().map(CamelotLabel::Known)
    }
}

impl TryFrom<String> for CamelotLabel {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<CamelotLabel> for String {
    fn from(label: CamelotLabel) -> Self {
        label.to_string()
    }
}

impl From<CamelotKey> for CamelotLabel {
    fn from(key: CamelotKey) -> Self {
        CamelotLabel::Known(key)
    }
}

/// How two known keys relate on the wheel, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarmonicRelation {
    Exact,
    Relative,
    Adjacent,
    Clash,
}

impl HarmonicRelation {
    pub fn score(&self) -> f64 {
        match self {
            HarmonicRelation::Exact => 1.0,
            HarmonicRelation::Relative => 0.8,
            HarmonicRelation::Adjacent => 0.6,
            HarmonicRelation::Clash => 0.0,
        }
    }

    pub fn is_match(&self) -> bool {
        !matches!(self, HarmonicRelation::Clash)
    }
}

/// Map a catalog pitch class (0–11, -1 = undetected) and mode to the wheel.
pub fn to_camelot(pitch_class: i32, mode: Mode) -> CamelotLabel {
    let Some(&(minor, major)) = usize::try_from(pitch_class)
        .ok()
        .and_then(|pc| CAMELOT_TABLE.get(pc))
    else {
        return CamelotLabel::Unknown;
    };

    match mode {
        Mode::Minor => CamelotLabel::Known(minor),
        Mode::Major => CamelotLabel::Known(major),
    }
}

/// Parse a `<1-12><A|B>` label. `"Unknown"` is rejected like any other garbage.
pub fn parse_camelot(label: &str) -> Result<CamelotKey> {
    label.parse()
}

/// Classify the pair, or `None` when either side is unknown.
pub fn harmonic_relation(a: CamelotLabel, b: CamelotLabel) -> Option<HarmonicRelation> {
    let (a, b) = (a.key()?, b.key()?);

    let relation = if a == b {
        HarmonicRelation::Exact
    } else if a.position == b.position {
        HarmonicRelation::Relative
    } else if a.is_adjacent(&b) {
        HarmonicRelation::Adjacent
    } else {
        HarmonicRelation::Clash
    };
    Some(relation)
}

pub fn is_harmonic_match(a: CamelotLabel, b: CamelotLabel) -> bool {
    harmonic_relation(a, b).is_some_and(|r| r.is_match())
}

/// 1.0 exact, 0.8 relative, 0.6 adjacent, 0.0 otherwise or unknown.
pub fn harmonic_score(a: CamelotLabel, b: CamelotLabel) -> f64 {
    harmonic_relation(a, b).map_or(0.0, |r| r.score())
}

/// The key itself, its relative, and both wheel neighbours.
pub fn compatible_keys(label: CamelotLabel) -> Vec<CamelotKey> {
    match label.key() {
        Some(key) => vec![key, key.relative(), key.next(), key.previous()],
        None => Vec::new(),
    }
}

pub fn next_key(label: CamelotLabel) -> CamelotLabel {
    label.key().map_or(CamelotLabel::Unknown, |k| k.next().into())
}

pub fn previous_key(label: CamelotLabel) -> CamelotLabel {
    label
        .key()
        .map_or(CamelotLabel::Unknown, |k| k.previous().into())
}

/// Human key name, e.g. "F#/Gb Minor". `None` for undetected keys.
pub fn key_name(pitch_class: i32, mode: Mode) -> Option<String> {
    let name = usize::try_from(pitch_class)
        .ok()
        .and_then(|pc| KEY_NAMES.get(pc))?;
    Some(format!("{} {}", name, mode))
}

/// Relative major/minor in pitch-class space: a major key's relative minor
/// sits three semitones below it.
pub fn is_relative(a_pitch: i32, a_mode: Mode, b_pitch: i32, b_mode: Mode) -> bool {
    if !(0..12).contains(&a_pitch) || !(0..12).contains(&b_pitch) {
        return false;
    }
    match (a_mode, b_mode) {
        (Mode::Major, Mode::Minor) => b_pitch == (a_pitch + 9) % 12,
        (Mode::Minor, Mode::Major) => b_pitch == (a_pitch + 3) % 12,
        _ => false,
    }
}
