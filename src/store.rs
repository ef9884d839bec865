// Row store: in-memory table of per-player-per-match observations.
//
// Ingestion accepts the raw cricket stats CSV. Column gaps are filled with
// documented defaults ("Unknown" for categoricals, 0 for numerics) rather
// than propagated as errors; only rows the CSV layer cannot deserialize at
// all are skipped, with a warning.

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::warn;

/// Sentinel for categorical values that are absent or unresolvable.
pub const UNKNOWN: &str = "Unknown";

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One player's recorded performance in one match.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub player: String,
    pub team: String,
    pub match_id: String,
    /// Resolved by the opponent resolver; `None` until then, and stays
    /// `None` when the match group is malformed.
    pub opponent_team: Option<String>,
    pub match_date: NaiveDate,
    pub total_runs: u32,
    pub total_wickets: u32,
    pub batting_avg: f64,
    pub bowling_avg: f64,
    pub batting_innings: u32,
    pub bowling_innings: u32,
}

/// All observations of one ingestion batch, held in a single contiguous
/// vector. Pipeline stages reference rows by index instead of copying
/// subsets, so insertion order doubles as the deterministic tie-break
/// everywhere downstream.
#[derive(Debug, Clone, Default)]
pub struct RowStore {
    pub rows: Vec<Observation>,
}

impl RowStore {
    pub fn new(rows: Vec<Observation>) -> Self {
        RowStore { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row indices grouped by match date, dates in ascending order and
    /// indices in insertion order within each group.
    pub fn indices_by_date(&self) -> Vec<(NaiveDate, Vec<usize>)> {
        let mut groups: Vec<(NaiveDate, Vec<usize>)> = Vec::new();
        let mut positions: HashMap<NaiveDate, usize> = HashMap::new();
        for (i, row) in self.rows.iter().enumerate() {
            match positions.get(&row.match_date) {
                Some(&p) => groups[p].1.push(i),
                None => {
                    positions.insert(row.match_date, groups.len());
                    groups.push((row.match_date, vec![i]));
                }
            }
        }
        groups.sort_by_key(|(date, _)| *date);
        groups
    }

    /// Row indices grouped by player, players in first-seen order and
    /// indices in insertion order within each group.
    pub fn indices_by_player(&self) -> Vec<(String, Vec<usize>)> {
        let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();
        for (i, row) in self.rows.iter().enumerate() {
            match positions.get(row.player.as_str()) {
                Some(&p) => groups[p].1.push(i),
                None => {
                    positions.insert(row.player.as_str(), groups.len());
                    groups.push((row.player.clone(), vec![i]));
                }
            }
        }
        groups
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV serde struct (private)
// ---------------------------------------------------------------------------

/// Raw observation row. Numerics are optional f64 so empty cells and
/// fractional exports both parse; defaults are applied after
/// deserialization. Columns not named here are ignored.
#[derive(Debug, Deserialize)]
struct RawObservation {
    #[serde(default)]
    player: String,
    #[serde(default)]
    team: String,
    #[serde(rename = "match", alias = "match_id", default)]
    match_id: String,
    /// The raw export names this column `start_date`.
    #[serde(alias = "start_date", default)]
    match_date: Option<String>,
    #[serde(default)]
    total_runs: Option<f64>,
    #[serde(default)]
    total_wickets: Option<f64>,
    #[serde(default)]
    batting_avg: Option<f64>,
    #[serde(default)]
    bowling_avg: Option<f64>,
    #[serde(default)]
    batting_innings: Option<f64>,
    #[serde(default)]
    bowling_innings: Option<f64>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn categorical_or_unknown(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        UNKNOWN.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Missing and non-finite numerics degrade to 0 rather than failing the row.
fn count_or_zero(value: Option<f64>) -> u32 {
    match value {
        Some(v) if v.is_finite() => v.max(0.0).round() as u32,
        _ => 0,
    }
}

fn rate_or_zero(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

// ---------------------------------------------------------------------------
// Reader-based loader (private, enables testing without temp files)
// ---------------------------------------------------------------------------

fn load_from_reader<R: Read>(rdr: R) -> Result<RowStore, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut rows = Vec::new();
    for result in reader.deserialize::<RawObservation>() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed observation row: {}", e);
                continue;
            }
        };
        let player = categorical_or_unknown(&raw.player);
        let date_text = match raw.match_date.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => {
                warn!("skipping observation for '{}': no match date", player);
                continue;
            }
        };
        let match_date = match NaiveDate::parse_from_str(&date_text, "%Y-%m-%d") {
            Ok(date) => date,
            Err(e) => {
                warn!(
                    "skipping observation for '{}': bad match date '{}' ({})",
                    player, date_text, e
                );
                continue;
            }
        };
        rows.push(Observation {
            player,
            team: categorical_or_unknown(&raw.team),
            match_id: categorical_or_unknown(&raw.match_id),
            opponent_team: None,
            match_date,
            total_runs: count_or_zero(raw.total_runs),
            total_wickets: count_or_zero(raw.total_wickets),
            batting_avg: rate_or_zero(raw.batting_avg),
            bowling_avg: rate_or_zero(raw.bowling_avg),
            batting_innings: count_or_zero(raw.batting_innings),
            bowling_innings: count_or_zero(raw.bowling_innings),
        });
    }
    Ok(RowStore::new(rows))
}

// ---------------------------------------------------------------------------
// Public path-based loader
// ---------------------------------------------------------------------------

/// Load the observations CSV into a row store.
///
/// Fails only on I/O and CSV-framing problems, or when the file yields
/// zero usable rows; individual bad rows are skipped with a warning.
pub fn load_observations(path: &Path) -> Result<RowStore, StoreError> {
    let file = std::fs::File::open(path).map_err(|e| StoreError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let store = load_from_reader(file).map_err(|e| StoreError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;
    if store.is_empty() {
        return Err(StoreError::Validation(
            "observations CSV produced zero valid rows".into(),
        ));
    }
    Ok(store)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
