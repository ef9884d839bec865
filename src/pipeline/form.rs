// Rolling recent-form aggregation.
//
// For every player, observations are ordered ascending by match date
// (stable, so insertion order breaks date ties) and each row receives the
// mean of the player's own runs and wickets over a trailing window ending
// at and including that row. The window shrinks at the start of a
// player's history and never includes a future observation.

use crate::store::RowStore;

/// Trailing-window means attached to one observation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RollingForm {
    pub rolling_runs: f64,
    pub rolling_wickets: f64,
}

/// Compute rolling form for every row. The result is aligned with the
/// store: `result[i]` belongs to `store.rows[i]`.
pub fn compute_rolling_form(store: &RowStore, window: usize) -> Vec<RollingForm> {
    debug_assert!(window >= 1);
    let mut form = vec![RollingForm::default(); store.len()];

    for (_, mut indices) in store.indices_by_player() {
        // Stable sort: equal dates keep insertion order.
        indices.sort_by_key(|&i| store.rows[i].match_date);

        for (k, &i) in indices.iter().enumerate() {
            let start = (k + 1).saturating_sub(window);
            let span = &indices[start..=k];
            let n = span.len() as f64;
            let runs: u32 = span.iter().map(|&j| store.rows[j].total_runs).sum();
            let wickets: u32 = span.iter().map(|&j| store.rows[j].total_wickets).sum();
            form[i] = RollingForm {
                rolling_runs: runs as f64 / n,
                rolling_wickets: wickets as f64 / n,
            };
        }
    }

    form
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
