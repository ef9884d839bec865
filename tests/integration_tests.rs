// Integration tests for the cricket forecast crate.
//
// These exercise the full flow through the library's public API: raw
// observations through the feature pipeline, persistence of the
// engineered tables, and the prediction facade on top of them.

use chrono::NaiveDate;

use cricket_forecast::config::{Config, DataPaths, FormConfig, ModelPaths, ScoringWeights};
use cricket_forecast::facade::{QueryContext, QueryError};
use cricket_forecast::pipeline;
use cricket_forecast::predictor::{Predictor, PredictorSet};
use cricket_forecast::store::{Observation, RowStore, UNKNOWN};
use cricket_forecast::tables;

// ===========================================================================
// Test helpers
// ===========================================================================

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn test_config() -> Config {
    Config {
        data: DataPaths {
            observations: "unused.csv".into(),
            output_dir: "unused".into(),
        },
        models: ModelPaths {
            runs: "unused".into(),
            wickets: "unused".into(),
            outcome: "unused".into(),
        },
        scoring: ScoringWeights::default(),
        form: FormConfig { window: 5 },
    }
}

fn obs(player: &str, team: &str, match_id: &str, date: &str, runs: u32, wickets: u32) -> Observation {
    Observation {
        player: player.into(),
        team: team.into(),
        match_id: match_id.into(),
        opponent_team: None,
        match_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        total_runs: runs,
        total_wickets: wickets,
        batting_avg: 35.0,
        bowling_avg: 0.0,
        batting_innings: 1,
        bowling_innings: 1,
    }
}

struct Fixed(f64);

impl Predictor for Fixed {
    fn predict(&self, _features: &[f64]) -> f64 {
        self.0
    }
}

fn fixed_predictors(runs: f64, wickets: f64, outcome: f64) -> PredictorSet {
    PredictorSet {
        runs: Box::new(Fixed(runs)),
        wickets: Box::new(Fixed(wickets)),
        outcome: Box::new(Fixed(outcome)),
    }
}

/// A season where A and B meet weekly; A's players outscore B's.
fn two_team_season() -> RowStore {
    let mut rows = Vec::new();
    for (week, date) in ["2024-01-07", "2024-01-14", "2024-01-21"].iter().enumerate() {
        let m = format!("M{}", week + 1);
        rows.push(obs("A1", "A", &m, date, 60 + week as u32 * 10, 0));
        rows.push(obs("A2", "A", &m, date, 40, 2));
        rows.push(obs("B1", "B", &m, date, 30, 1));
        rows.push(obs("B2", "B", &m, date, 20, 3));
    }
    RowStore::new(rows)
}

// ===========================================================================
// Pipeline scenarios
// ===========================================================================

#[test]
fn opponents_resolved_across_whole_season() {
    let mut store = two_team_season();
    let tables = pipeline::run(&mut store, &test_config());

    for row in &tables.features {
        let expected = if row.team == "A" { "B" } else { "A" };
        assert_eq!(row.opponent_team, expected);
    }
}

#[test]
fn two_team_scenario_from_first_match() {
    // Teams A and B play on 2024-01-01; the A row scores 50, the B row 30.
    let mut store = RowStore::new(vec![
        obs("PA", "A", "M1", "2024-01-01", 50, 0),
        obs("PB", "B", "M1", "2024-01-01", 30, 0),
    ]);
    let tables = pipeline::run(&mut store, &test_config());

    assert_eq!(tables.features[0].opponent_team, "B");
    assert_eq!(tables.features[1].opponent_team, "A");
    // A's only opponent row (facing B) conceded 50, B's conceded 30.
    assert!(approx_eq(tables.features[1].avg_opponent_runs, 30.0));
    assert!(approx_eq(tables.features[0].avg_opponent_runs, 50.0));
}

#[test]
fn rolling_form_matches_trailing_window_definition() {
    // Runs 10,20,30,40,50,60 in date order against a fixed opponent.
    let mut rows = Vec::new();
    for (i, runs) in [10u32, 20, 30, 40, 50, 60].iter().enumerate() {
        let date = format!("2024-02-{:02}", i + 1);
        rows.push(obs("P", "A", &format!("M{i}"), &date, *runs, 0));
        rows.push(obs("Q", "B", &format!("M{i}"), &date, 15, 1));
    }
    let mut store = RowStore::new(rows);
    let tables = pipeline::run(&mut store, &test_config());

    let p_rows: Vec<_> = tables
        .features
        .iter()
        .filter(|r| r.player == "P")
        .collect();
    assert!(approx_eq(p_rows[0].rolling_runs, 10.0));
    assert!(approx_eq(p_rows[5].rolling_runs, 40.0));
}

#[test]
fn malformed_group_degrades_to_zero_aggregates() {
    let mut store = RowStore::new(vec![
        obs("PA", "A", "M1", "2024-01-01", 50, 0),
        obs("PB", "B", "M1", "2024-01-01", 30, 0),
        // Three teams share the next date: unresolvable.
        obs("PC", "C", "M2", "2024-01-08", 40, 1),
        obs("PD", "D", "M2", "2024-01-08", 45, 0),
        obs("PE", "E", "M2", "2024-01-08", 20, 2),
    ]);
    let tables = pipeline::run(&mut store, &test_config());

    for row in tables.features.iter().filter(|r| r.match_id == "M2") {
        assert_eq!(row.opponent_team, UNKNOWN);
        assert!(approx_eq(row.avg_opponent_runs, 0.0));
        assert!(approx_eq(row.avg_opponent_wickets, 0.0));
    }
    // No row was dropped and everyone is still ranked.
    assert_eq!(tables.features.len(), 5);
    assert_eq!(tables.rankings.len(), 5);
}

#[test]
fn ranking_is_stable_across_reruns() {
    let mut first_store = two_team_season();
    let mut second_store = two_team_season();
    let config = test_config();

    let first = pipeline::run(&mut first_store, &config);
    let second = pipeline::run(&mut second_store, &config);
    assert_eq!(first.rankings, second.rankings);
    assert_eq!(first.features, second.features);
    assert_eq!(first.match_scores, second.match_scores);
}

// ===========================================================================
// Persistence round trip
// ===========================================================================

#[test]
fn persisted_tables_reload_identically() {
    let mut store = two_team_season();
    let engineered = pipeline::run(&mut store, &test_config());

    let dir = std::env::temp_dir().join("cricket-forecast-it-roundtrip");
    let _ = std::fs::remove_dir_all(&dir);
    tables::write_all(&engineered, &dir).unwrap();
    let reloaded = tables::load_all(&dir).unwrap();
    let _ = std::fs::remove_dir_all(&dir);

    assert_eq!(reloaded.features.len(), engineered.features.len());
    assert_eq!(reloaded.rankings, engineered.rankings);
    assert_eq!(reloaded.match_scores, engineered.match_scores);
    for (a, b) in reloaded.features.iter().zip(&engineered.features) {
        assert_eq!(a.player, b.player);
        assert_eq!(a.opponent_team, b.opponent_team);
        assert!(approx_eq(a.rolling_runs, b.rolling_runs));
        assert!(approx_eq(a.avg_opponent_runs, b.avg_opponent_runs));
    }
}

// ===========================================================================
// Facade over a real pipeline run
// ===========================================================================

#[test]
fn facade_answers_queries_over_pipeline_output() {
    let mut store = two_team_season();
    let engineered = pipeline::run(&mut store, &test_config());
    let context = QueryContext::new(engineered, fixed_predictors(182.5, 6.0, 1.0));

    let outcome = context.predict_match_outcome("a", "b").unwrap();
    assert_eq!(outcome.predicted_winner, "a");

    let runs = context.predict_team_runs("A").unwrap();
    assert!(approx_eq(runs.predicted_runs, 182.5));

    let wickets = context.predict_team_wickets("B").unwrap();
    assert!(approx_eq(wickets.predicted_wickets, 6.0));
}

#[test]
fn facade_top_players_per_match() {
    let mut store = RowStore::new(vec![
        obs("P1", "A", "Match42", "2024-01-01", 80, 0),
        obs("P2", "A", "Match42", "2024-01-01", 10, 0),
        obs("P3", "B", "Match42", "2024-01-01", 50, 2),
        obs("P4", "B", "Match42", "2024-01-01", 5, 0),
        obs("P5", "B", "Match42", "2024-01-01", 30, 1),
    ]);
    let engineered = pipeline::run(&mut store, &test_config());
    let context = QueryContext::new(engineered, fixed_predictors(0.0, 0.0, 1.0));

    let top = context.top_fantasy_players("Match42", Some(3)).unwrap();
    assert_eq!(top.len(), 3);
    for pair in top.windows(2) {
        assert!(pair[0].fantasy_score >= pair[1].fantasy_score);
    }
    // Wickets dominate the formula at 25 points each.
    assert_eq!(top[0].player, "P3");
}

#[test]
fn facade_not_found_errors() {
    let mut store = two_team_season();
    let engineered = pipeline::run(&mut store, &test_config());
    let context = QueryContext::new(engineered, fixed_predictors(0.0, 0.0, 1.0));

    assert!(matches!(
        context.predict_team_runs("Unknown Team"),
        Err(QueryError::TeamNotFound { .. })
    ));
    assert!(matches!(
        context.top_fantasy_players("NoSuchMatch", None),
        Err(QueryError::MatchNotFound { .. })
    ));
}
