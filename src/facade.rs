// Prediction facade: read-only queries over the engineered tables and
// the loaded predictors.
//
// A `QueryContext` is built once at startup and treated as immutable for
// the lifetime of the serving process. Every query borrows it, so the
// context can be shared across worker threads without locking; refreshing
// the data means building a new context.

use serde::Serialize;
use thiserror::Error;

use crate::predictor::PredictorSet;
use crate::tables::{EngineeredTables, FeatureRow};

/// Players returned by `top_fantasy_players` when no count is given.
pub const DEFAULT_TOP_N: usize = 10;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// The only caller-visible failures: the query referenced data absent
/// from the current tables. Everything else was handled with defaults
/// during the pipeline run.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("team not found: {team}")]
    TeamNotFound { team: String },

    #[error("match not found: {match_id}")]
    MatchNotFound { match_id: String },
}

// ---------------------------------------------------------------------------
// Query results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct OutcomePrediction {
    pub team_a: String,
    pub team_b: String,
    pub predicted_winner: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunsPrediction {
    pub team: String,
    pub predicted_runs: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WicketsPrediction {
    pub team: String,
    pub predicted_wickets: f64,
}

/// One ranked entry of a per-match fantasy query.
#[derive(Debug, Clone, Serialize)]
pub struct FantasyEntry {
    pub player: String,
    pub fantasy_score: f64,
}

// ---------------------------------------------------------------------------
// Team averages (internal)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct TeamAverages {
    runs: f64,
    wickets: f64,
    batting_innings: f64,
    bowling_innings: f64,
    opponent_runs: f64,
    opponent_wickets: f64,
}

fn mean<I: Iterator<Item = f64>>(values: I) -> f64 {
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values {
        sum += v;
        n += 1;
    }
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

// ---------------------------------------------------------------------------
// Query context
// ---------------------------------------------------------------------------

/// Shared read-only snapshot of one pipeline run plus the predictors.
pub struct QueryContext {
    tables: EngineeredTables,
    predictors: PredictorSet,
}

impl QueryContext {
    pub fn new(tables: EngineeredTables, predictors: PredictorSet) -> Self {
        QueryContext { tables, predictors }
    }

    /// Rows for a team, matched case-insensitively on team name.
    fn team_rows(&self, team: &str) -> Vec<&FeatureRow> {
        self.tables
            .features
            .iter()
            .filter(|row| row.team.eq_ignore_ascii_case(team))
            .collect()
    }

    fn team_averages(&self, team: &str) -> Result<TeamAverages, QueryError> {
        let rows = self.team_rows(team);
        if rows.is_empty() {
            return Err(QueryError::TeamNotFound { team: team.into() });
        }
        Ok(TeamAverages {
            runs: mean(rows.iter().map(|r| r.total_runs as f64)),
            wickets: mean(rows.iter().map(|r| r.total_wickets as f64)),
            batting_innings: mean(rows.iter().map(|r| r.batting_innings as f64)),
            bowling_innings: mean(rows.iter().map(|r| r.bowling_innings as f64)),
            opponent_runs: mean(rows.iter().map(|r| r.avg_opponent_runs)),
            opponent_wickets: mean(rows.iter().map(|r| r.avg_opponent_wickets)),
        })
    }

    /// Predict which of two teams wins. Label 1 from the outcome
    /// classifier maps to the first team.
    pub fn predict_match_outcome(
        &self,
        team_a: &str,
        team_b: &str,
    ) -> Result<OutcomePrediction, QueryError> {
        let a = self.team_averages(team_a)?;
        let b = self.team_averages(team_b)?;

        let features = [a.runs, a.wickets, b.runs, b.wickets];
        let label = self.predictors.outcome.predict(&features);
        let predicted_winner = if (label - 1.0).abs() < f64::EPSILON {
            team_a.to_string()
        } else {
            team_b.to_string()
        };

        Ok(OutcomePrediction {
            team_a: team_a.to_string(),
            team_b: team_b.to_string(),
            predicted_winner,
        })
    }

    /// Predict a team's runs from its batting-side averages.
    pub fn predict_team_runs(&self, team: &str) -> Result<RunsPrediction, QueryError> {
        let avg = self.team_averages(team)?;
        let features = [
            avg.runs,
            avg.batting_innings,
            avg.opponent_runs,
            avg.opponent_wickets,
        ];
        Ok(RunsPrediction {
            team: team.to_string(),
            predicted_runs: self.predictors.runs.predict(&features),
        })
    }

    /// Predict a team's wickets from its bowling-side averages.
    pub fn predict_team_wickets(&self, team: &str) -> Result<WicketsPrediction, QueryError> {
        let avg = self.team_averages(team)?;
        let features = [
            avg.wickets,
            avg.bowling_innings,
            avg.opponent_runs,
            avg.opponent_wickets,
        ];
        Ok(WicketsPrediction {
            team: team.to_string(),
            predicted_wickets: self.predictors.wickets.predict(&features),
        })
    }

    /// The `top_n` highest-scored players of one match, descending, ties
    /// broken by the scores' original row order.
    pub fn top_fantasy_players(
        &self,
        match_id: &str,
        top_n: Option<usize>,
    ) -> Result<Vec<FantasyEntry>, QueryError> {
        let mut entries: Vec<FantasyEntry> = self
            .tables
            .match_scores
            .iter()
            .filter(|s| s.match_id == match_id)
            .map(|s| FantasyEntry {
                player: s.player.clone(),
                fantasy_score: s.fantasy_score,
            })
            .collect();
        if entries.is_empty() {
            return Err(QueryError::MatchNotFound {
                match_id: match_id.into(),
            });
        }

        entries.sort_by(|a, b| {
            b.fantasy_score
                .partial_cmp(&a.fantasy_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        entries.truncate(top_n.unwrap_or(DEFAULT_TOP_N));
        Ok(entries)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
