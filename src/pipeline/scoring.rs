// Fantasy scoring: weighted linear formula over feature-joined rows.
//
// Each observation gets a score from the fixed weight table; a player's
// fantasy value is the sum of their observation scores. Summation runs in
// row order and the ranking sort is stable, so identical input produces
// byte-identical output and ties resolve by first-seen (insertion) order.

use crate::config::ScoringWeights;
use crate::pipeline::strength::OpponentStrength;
use crate::store::{Observation, RowStore};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Output rows
// ---------------------------------------------------------------------------

/// One player's total fantasy value across the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerScore {
    pub player: String,
    pub fantasy_score: f64,
}

/// One observation's fantasy value, keyed by match for per-match queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    pub player: String,
    #[serde(rename = "match")]
    pub match_id: String,
    pub fantasy_score: f64,
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Score a single feature-joined observation.
pub fn score_observation(
    obs: &Observation,
    strength: &OpponentStrength,
    weights: &ScoringWeights,
) -> f64 {
    obs.total_runs as f64 * weights.runs
        + obs.total_wickets as f64 * weights.wickets
        + obs.batting_avg * weights.batting_avg
        + obs.bowling_avg * weights.bowling_avg
        + strength.avg_opponent_runs * weights.opponent_runs
        + strength.avg_opponent_wickets * weights.opponent_wickets
}

/// Per-observation scores in insertion order, for the per-match table.
pub fn compute_match_scores(
    store: &RowStore,
    strengths: &[OpponentStrength],
    weights: &ScoringWeights,
) -> Vec<MatchScore> {
    store
        .rows
        .iter()
        .zip(strengths)
        .map(|(obs, strength)| MatchScore {
            player: obs.player.clone(),
            match_id: obs.match_id.clone(),
            fantasy_score: score_observation(obs, strength, weights),
        })
        .collect()
}

/// Sum observation scores per player and rank descending.
///
/// Players appear at most once; a player with zero observations cannot
/// appear at all. Equal totals keep first-seen order (stable sort).
pub fn rank_players(
    store: &RowStore,
    strengths: &[OpponentStrength],
    weights: &ScoringWeights,
) -> Vec<PlayerScore> {
    let mut ranked: Vec<PlayerScore> = store
        .indices_by_player()
        .into_iter()
        .map(|(player, indices)| {
            let fantasy_score = indices
                .iter()
                .map(|&i| score_observation(&store.rows[i], &strengths[i], weights))
                .sum();
            PlayerScore {
                player,
                fantasy_score,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.fantasy_score
            .partial_cmp(&a.fantasy_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
