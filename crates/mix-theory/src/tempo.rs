use serde::{Deserialize, Serialize};

/// BPM window within which two tempos count as the same.
pub const DEFAULT_BPM_TOLERANCE: f64 = 4.0;

/// Ratios considered musically related when checking harmonic tempos.
const HARMONIC_RATIOS: [f64; 6] = [1.0, 1.5, 2.0, 2.5, 3.0, 4.0];

/// How two tempos relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TempoClass {
    Exact,
    Tolerance,
    HalfTime,
    DoubleTime,
    Incompatible,
}

impl TempoClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            TempoClass::Exact => "exact",
            TempoClass::Tolerance => "tolerance",
            TempoClass::HalfTime => "half-time",
            TempoClass::DoubleTime => "double-time",
            TempoClass::Incompatible => "incompatible",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TempoClass::Exact => "Perfect BPM match",
            TempoClass::Tolerance => "BPM within tolerance",
            TempoClass::HalfTime => "Half-time transition (2:1 ratio)",
            TempoClass::DoubleTime => "Double-time transition (1:2 ratio)",
            TempoClass::Incompatible => "BPM incompatible",
        }
    }
}

impl std::fmt::Display for TempoClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempoCompatibility {
    pub compatible: bool,
    pub score: f64,
    /// Playback ratio applied to the second track: 2.0 half-time, 0.5 double-time.
    pub ratio: f64,
    pub class: TempoClass,
}

impl TempoCompatibility {
    fn incompatible() -> Self {
        Self {
            compatible: false,
            score: 0.0,
            ratio: 0.0,
            class: TempoClass::Incompatible,
        }
    }
}

/// Classify the tempo relationship between two tracks.
///
/// Checks run in order: exact, within `tolerance` BPM, then (if allowed)
/// half-time and double-time. The 2:1 checks use `tolerance / 100` as an
/// absolute window around the ratio, so a 4 BPM tolerance accepts ratios
/// in `[1.96, 2.04]`.
pub fn tempo_compatibility(
    bpm_a: f64,
    bpm_b: f64,
    tolerance: f64,
    allow_half_double: bool,
) -> TempoCompatibility {
    let diff = (bpm_a - bpm_b).abs();

    if diff == 0.0 {
        return TempoCompatibility {
            compatible: true,
            score: 1.0,
            ratio: 1.0,
            class: TempoClass::Exact,
        };
    }

    if diff <= tolerance {
        let score = 1.0 - (diff / tolerance) * 0.3;
        return TempoCompatibility {
            compatible: true,
            score: score.max(0.7),
            ratio: 1.0,
            class: TempoClass::Tolerance,
        };
    }

    if !allow_half_double {
        return TempoCompatibility::incompatible();
    }

    let window = tolerance / 100.0;

    if (bpm_a / bpm_b - 2.0).abs() <= window {
        return TempoCompatibility {
            compatible: true,
            score: 0.8,
            ratio: 2.0,
            class: TempoClass::HalfTime,
        };
    }

    if (bpm_b / bpm_a - 2.0).abs() <= window {
        return TempoCompatibility {
            compatible: true,
            score: 0.8,
            ratio: 0.5,
            class: TempoClass::DoubleTime,
        };
    }

    TempoCompatibility::incompatible()
}

/// Whether the tempos sit near a common musical ratio in either direction.
pub fn is_harmonic_bpm(bpm_a: f64, bpm_b: f64, tolerance: f64) -> bool {
    let window = tolerance / 100.0;
    HARMONIC_RATIOS.iter().any(|&ratio| {
        (bpm_a / bpm_b - ratio).abs() <= window || (bpm_b / bpm_a - ratio).abs() <= window
    })
}

/// Meeting point for a tempo blend.
pub fn optimal_bpm(bpm_a: f64, bpm_b: f64) -> f64 {
    (bpm_a + bpm_b) / 2.0
}

/// Widest window `compatible_bpms` will enumerate, in BPM either side.
pub const MAX_BPM_WINDOW: f64 = 300.0;

/// Whole-BPM neighbours within `tolerance`, plus half and double time.
///
/// `tolerance` is capped at [`MAX_BPM_WINDOW`].
pub fn compatible_bpms(base: f64, tolerance: f64, allow_half_double: bool) -> Vec<f64> {
    let steps = tolerance.clamp(0.0, MAX_BPM_WINDOW).trunc() as i64;
    let mut bpms: Vec<f64> = (-steps..=steps)
        .filter(|&i| i != 0)
        .map(|i| base + i as f64)
        .collect();

    if allow_half_double {
        bpms.push(base / 2.0);
        bpms.push(base * 2.0);
    }

    bpms.retain(|&bpm| bpm > 0.0);
    bpms
}

/// BPM change per second over a blend.
pub fn bpm_drift(start_bpm: f64, end_bpm: f64, duration_seconds: f64) -> f64 {
    if duration_seconds <= 0.0 {
        return 0.0;
    }
    (end_bpm - start_bpm) / duration_seconds
}

/// Shape of a tempo ramp between two tracks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TempoCurve {
    #[default]
    Linear,
    Exponential,
    Logarithmic,
}

/// Tempo at `time` seconds into a ramp of `duration_seconds`.
pub fn tempo_at(
    start_bpm: f64,
    end_bpm: f64,
    duration_seconds: f64,
    time: f64,
    curve: TempoCurve,
) -> f64 {
    let progress = if duration_seconds > 0.0 {
        (time / duration_seconds).clamp(0.0, 1.0)
    } else {
        1.0
    };

    let shaped = match curve {
        TempoCurve::Linear => progress,
        TempoCurve::Exponential => progress * progress,
        TempoCurve::Logarithmic => progress.sqrt(),
    };

    start_bpm + (end_bpm - start_bpm) * shaped
}

/// Length in seconds of a crossfade spanning `bars` bars.
pub fn crossfade_seconds(tempo: f64, bars: u32, beats_per_bar: u32) -> f64 {
    if tempo <= 0.0 {
        return 0.0;
    }
    (60.0 / tempo) * f64::from(bars) * f64::from(beats_per_bar)
}
