// Opponent-strength aggregation.
//
// Builds one profile per opponent team (average runs and wickets recorded
// against it) and joins the profiles back onto every row with left-join
// semantics. The lookup returns an option; rows whose opponent is
// unresolved or never seen as an opponent get the explicit zero default,
// which deliberately scores them as facing a null-strength opponent
// instead of discarding them.

use crate::store::RowStore;
use std::collections::HashMap;

/// Average performance conceded by a team when playing as the opponent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpponentProfile {
    pub avg_opponent_runs: f64,
    pub avg_opponent_wickets: f64,
}

/// Per-row opponent strength after the join. Defaults to zero for rows
/// without a matching profile.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OpponentStrength {
    pub avg_opponent_runs: f64,
    pub avg_opponent_wickets: f64,
}

/// Build opponent profiles from all rows with a resolved opponent.
/// Recomputed fully on each pipeline run.
pub fn build_profiles(store: &RowStore) -> HashMap<String, OpponentProfile> {
    let mut sums: HashMap<&str, (f64, f64, usize)> = HashMap::new();
    for row in &store.rows {
        if let Some(opponent) = row.opponent_team.as_deref() {
            let entry = sums.entry(opponent).or_insert((0.0, 0.0, 0));
            entry.0 += row.total_runs as f64;
            entry.1 += row.total_wickets as f64;
            entry.2 += 1;
        }
    }

    sums.into_iter()
        .map(|(team, (runs, wickets, n))| {
            let n = n as f64;
            (
                team.to_string(),
                OpponentProfile {
                    avg_opponent_runs: runs / n,
                    avg_opponent_wickets: wickets / n,
                },
            )
        })
        .collect()
}

/// Left-join the profiles onto every row. `result[i]` belongs to
/// `store.rows[i]`; missing profiles become the zero default.
pub fn join_profiles(
    store: &RowStore,
    profiles: &HashMap<String, OpponentProfile>,
) -> Vec<OpponentStrength> {
    store
        .rows
        .iter()
        .map(|row| {
            let profile = row
                .opponent_team
                .as_deref()
                .and_then(|opponent| profiles.get(opponent));
            match profile {
                Some(p) => OpponentStrength {
                    avg_opponent_runs: p.avg_opponent_runs,
                    avg_opponent_wickets: p.avg_opponent_wickets,
                },
                None => OpponentStrength::default(),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Observation;
    use chrono::NaiveDate;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-10
    }

    fn obs(player: &str, team: &str, opponent: Option<&str>, runs: u32, wickets: u32) -> Observation {
        Observation {
            player: player.into(),
            team: team.into(),
            match_id: "M".into(),
            opponent_team: opponent.map(String::from),
            match_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            total_runs: runs,
            total_wickets: wickets,
            batting_avg: 0.0,
            bowling_avg: 0.0,
            batting_innings: 1,
            bowling_innings: 0,
        }
    }

    #[test]
    fn profiles_average_over_rows_facing_that_opponent() {
        let store = RowStore::new(vec![
            obs("P1", "A", Some("B"), 50, 1),
            obs("P2", "A", Some("B"), 30, 3),
            obs("P3", "B", Some("A"), 20, 2),
        ]);

        let profiles = build_profiles(&store);
        let b = &profiles["B"];
        assert!(approx_eq(b.avg_opponent_runs, 40.0));
        assert!(approx_eq(b.avg_opponent_wickets, 2.0));
        let a = &profiles["A"];
        assert!(approx_eq(a.avg_opponent_runs, 20.0));
    }

    #[test]
    fn unresolved_rows_excluded_from_profiles() {
        let store = RowStore::new(vec![
            obs("P1", "A", Some("B"), 50, 0),
            obs("P2", "C", None, 999, 9),
        ]);

        let profiles = build_profiles(&store);
        assert_eq!(profiles.len(), 1);
        assert!(profiles.contains_key("B"));
    }

    #[test]
    fn join_fills_zero_for_unresolved_opponent() {
        let store = RowStore::new(vec![
            obs("P1", "A", Some("B"), 50, 1),
            obs("P2", "C", None, 40, 2),
        ]);

        let profiles = build_profiles(&store);
        let strengths = join_profiles(&store, &profiles);

        assert!(approx_eq(strengths[0].avg_opponent_runs, 50.0));
        assert!(approx_eq(strengths[1].avg_opponent_runs, 0.0));
        assert!(approx_eq(strengths[1].avg_opponent_wickets, 0.0));
    }

    #[test]
    fn join_fills_zero_for_opponent_with_no_profile() {
        // Resolved to a team that never appears as an opponent elsewhere
        // and concedes nothing itself (empty profile side).
        let store = RowStore::new(vec![obs("P1", "A", Some("Ghost"), 50, 1)]);

        let mut profiles = build_profiles(&store);
        profiles.remove("Ghost");
        let strengths = join_profiles(&store, &profiles);
        assert!(approx_eq(strengths[0].avg_opponent_runs, 0.0));
        assert!(approx_eq(strengths[0].avg_opponent_wickets, 0.0));
    }

    #[test]
    fn join_aligned_with_store_rows() {
        let store = RowStore::new(vec![
            obs("P1", "A", Some("B"), 10, 0),
            obs("P2", "B", Some("A"), 20, 0),
            obs("P3", "A", Some("B"), 30, 0),
        ]);

        let profiles = build_profiles(&store);
        let strengths = join_profiles(&store, &profiles);
        assert_eq!(strengths.len(), store.len());
        // Rows 0 and 2 share opponent B: avg of 10 and 30 = 20.
        assert!(approx_eq(strengths[0].avg_opponent_runs, 20.0));
        assert!(approx_eq(strengths[2].avg_opponent_runs, 20.0));
    }
}
