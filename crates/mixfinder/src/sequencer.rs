//! Greedy playlist ordering.
//!
//! Starting from a seed track, repeatedly appends the remaining candidate
//! that scores highest against the current track. Choices are never
//! revisited, so the result is a cheap heuristic tour rather than an
//! optimal one. O(n²) in the number of candidates.

use std::sync::Arc;

use mix_theory::CamelotLabel;
use mixconf::{MixConfig, ScoringWeights};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::scoring::{CompatibilityScorer, WeightedScorer};
use crate::structure::{
    optimal_transition_points, transition_bar_count, transition_key_info,
    transition_recommendation, TransitionRecommendation,
};
use crate::types::{CompatibilityScore, Track};
use crate::Result;

/// Seconds either side of the outro point searched for bars.
const BAR_WINDOW_SECS: f64 = 10.0;

/// How to get from one track in a sequence to the next.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionPlan<'a> {
    pub from: &'a Track,
    pub to: &'a Track,
    /// Where in `from` to start the transition, in seconds.
    pub offset_seconds: f64,
    /// Transition length in bars, at least 1.
    pub bars: usize,
    /// Camelot key of `to`.
    pub key_note: CamelotLabel,
    pub compatibility: CompatibilityScore,
    pub recommendation: TransitionRecommendation,
}

/// An ordered playlist with one transition per consecutive pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sequence<'a> {
    pub ordered: Vec<&'a Track>,
    pub transitions: Vec<TransitionPlan<'a>>,
}

impl Sequence<'_> {
    pub fn total_score(&self) -> f64 {
        self.transitions.iter().map(|t| t.compatibility.overall).sum()
    }

    /// 0 when there are no transitions.
    pub fn mean_score(&self) -> f64 {
        if self.transitions.is_empty() {
            return 0.0;
        }
        self.total_score() / self.transitions.len() as f64
    }
}

/// Orders tracks using a pluggable [`CompatibilityScorer`].
pub struct Sequencer {
    scorer: Arc<dyn CompatibilityScorer>,
}

impl Sequencer {
    /// Create with the weighted scorer.
    pub fn new(config: MixConfig, weights: ScoringWeights) -> Self {
        Self {
            scorer: Arc::new(WeightedScorer::new(config, weights)),
        }
    }

    /// Create with a custom scorer.
    pub fn with_scorer(scorer: Arc<dyn CompatibilityScorer>) -> Self {
        Self { scorer }
    }

    /// Greedily order `candidates` after `base`.
    ///
    /// Each step takes the candidate with the strictly highest overall score;
    /// ties keep the earliest candidate in pool order.
    pub fn order<'a>(&self, base: &'a Track, candidates: &'a [Track]) -> Sequence<'a> {
        let mut ordered = Vec::with_capacity(candidates.len() + 1);
        let mut transitions = Vec::with_capacity(candidates.len());
        let mut remaining: Vec<&'a Track> = candidates.iter().collect();
        let mut current = base;
        ordered.push(base);

        while !remaining.is_empty() {
            let mut best: Option<(usize, CompatibilityScore)> = None;
            for (index, candidate) in remaining.iter().enumerate() {
                let score = self.scorer.score(current, candidate);
                if best.map_or(true, |(_, b)| score.overall > b.overall) {
                    best = Some((index, score));
                }
            }
            let Some((index, compatibility)) = best else {
                break;
            };

            let next = remaining.remove(index);
            debug!(
                from = %current.id,
                to = %next.id,
                score = compatibility.overall,
                remaining = remaining.len(),
                "chose next track"
            );

            let plan = plan_transition(current, next, compatibility);
            if plan.key_note.is_unknown() {
                warn!(track = %next.id, "no key for transition target");
            }

            transitions.push(plan);
            ordered.push(next);
            current = next;
        }

        let sequence = Sequence {
            ordered,
            transitions,
        };
        info!(
            tracks = sequence.ordered.len(),
            mean_score = sequence.mean_score(),
            "ordered playlist"
        );
        sequence
    }
}

fn plan_transition<'a>(
    from: &'a Track,
    to: &'a Track,
    compatibility: CompatibilityScore,
) -> TransitionPlan<'a> {
    let points = optimal_transition_points(from, to);
    let bars = transition_bar_count(
        from,
        points.outro - BAR_WINDOW_SECS,
        points.outro + BAR_WINDOW_SECS,
    );

    TransitionPlan {
        from,
        to,
        offset_seconds: points.outro,
        bars: bars.max(1),
        key_note: transition_key_info(to).camelot,
        compatibility,
        recommendation: transition_recommendation(from, to),
    }
}

/// Order `candidates` after `base` with the default scoring weights.
pub fn order_tracks<'a>(base: &'a Track, candidates: &'a [Track], config: &MixConfig) -> Sequence<'a> {
    Sequencer::new(config.clone(), ScoringWeights::default()).order(base, candidates)
}

/// Order with explicit weights, rejecting invalid config or weights up front.
pub fn order_tracks_with_weights<'a>(
    base: &'a Track,
    candidates: &'a [Track],
    config: &MixConfig,
    weights: &ScoringWeights,
) -> Result<Sequence<'a>> {
    config.validate()?;
    weights.validate()?;
    Ok(Sequencer::new(config.clone(), *weights).order(base, candidates))
}
