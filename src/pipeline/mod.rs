// Feature-derivation and scoring pipeline.
//
// Single-threaded, single-pass batch computation over the row store:
// opponent resolution → rolling form → opponent strength → fantasy
// scoring. Safe to rerun on refreshed input; every stage recomputes from
// scratch and no partial state carries over between runs.

pub mod form;
pub mod opponent;
pub mod scoring;
pub mod strength;

use crate::config::Config;
use crate::store::{RowStore, UNKNOWN};
use crate::tables::{EngineeredTables, FeatureRow};
use tracing::info;

/// Run every pipeline stage and assemble the engineered tables.
pub fn run(store: &mut RowStore, config: &Config) -> EngineeredTables {
    let resolution = opponent::resolve_opponents(store);
    info!(
        "opponent resolution: {} group(s) resolved, {} malformed",
        resolution.resolved_groups, resolution.malformed_groups
    );

    let form = form::compute_rolling_form(store, config.form.window);
    let profiles = strength::build_profiles(store);
    let strengths = strength::join_profiles(store, &profiles);
    info!(
        "aggregation: {} opponent profile(s) over {} row(s)",
        profiles.len(),
        store.len()
    );

    let rankings = scoring::rank_players(store, &strengths, &config.scoring);
    let match_scores = scoring::compute_match_scores(store, &strengths, &config.scoring);
    info!("scored {} player(s)", rankings.len());

    let features = store
        .rows
        .iter()
        .zip(form.iter())
        .zip(strengths.iter())
        .map(|((obs, form), strength)| FeatureRow {
            player: obs.player.clone(),
            team: obs.team.clone(),
            match_id: obs.match_id.clone(),
            opponent_team: obs
                .opponent_team
                .clone()
                .unwrap_or_else(|| UNKNOWN.to_string()),
            match_date: obs.match_date,
            total_runs: obs.total_runs,
            total_wickets: obs.total_wickets,
            batting_avg: obs.batting_avg,
            bowling_avg: obs.bowling_avg,
            batting_innings: obs.batting_innings,
            bowling_innings: obs.bowling_innings,
            rolling_runs: form.rolling_runs,
            rolling_wickets: form.rolling_wickets,
            avg_opponent_runs: strength.avg_opponent_runs,
            avg_opponent_wickets: strength.avg_opponent_wickets,
        })
        .collect();

    EngineeredTables {
        features,
        rankings,
        match_scores,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
