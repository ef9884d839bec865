// Opponent resolution: infer each row's opponent from its match group.
//
// All observations sharing a match date form a match group. A group with
// exactly two distinct teams identifies both opponents; any other shape
// is malformed and leaves its rows unresolved. Malformed groups are a
// data-quality warning, never an error: downstream stages treat the
// unresolved rows as facing a zero-strength opponent.

use crate::store::RowStore;
use tracing::warn;

/// Counts reported by a resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionSummary {
    pub resolved_groups: usize,
    pub malformed_groups: usize,
}

/// Assign `opponent_team` on every row whose match group has exactly two
/// distinct teams. Rows in malformed groups keep `opponent_team = None`.
/// No row is ever dropped and the pass never fails.
pub fn resolve_opponents(store: &mut RowStore) -> ResolutionSummary {
    let mut summary = ResolutionSummary::default();

    for (date, indices) in store.indices_by_date() {
        let mut teams: Vec<&str> = Vec::new();
        for &i in &indices {
            let team = store.rows[i].team.as_str();
            if !teams.contains(&team) {
                teams.push(team);
            }
        }

        if teams.len() != 2 {
            warn!(
                "match group {} has {} distinct team(s), expected 2; leaving opponents unresolved",
                date,
                teams.len()
            );
            summary.malformed_groups += 1;
            continue;
        }

        let (first, second) = (teams[0].to_string(), teams[1].to_string());
        for &i in &indices {
            let row = &mut store.rows[i];
            row.opponent_team = if row.team == first {
                Some(second.clone())
            } else {
                Some(first.clone())
            };
        }
        summary.resolved_groups += 1;
    }

    summary
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
