// Engineered output tables and their CSV persistence.
//
// The pipeline produces three tables per run: the feature-augmented
// observation table, the ranked per-player fantasy scores, and the
// per-observation match scores. They are written as CSV files and can be
// reloaded by a serving process that only answers queries.

use crate::pipeline::scoring::{MatchScore, PlayerScore};
use crate::store::UNKNOWN;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

pub const FEATURES_FILE: &str = "features.csv";
pub const FANTASY_SCORES_FILE: &str = "fantasy_scores.csv";
pub const MATCH_FANTASY_FILE: &str = "match_fantasy.csv";

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// One observation with all derived features joined on. The unresolved
/// opponent sentinel is materialized here so the persisted table has no
/// empty cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub player: String,
    pub team: String,
    #[serde(rename = "match")]
    pub match_id: String,
    pub opponent_team: String,
    pub match_date: NaiveDate,
    pub total_runs: u32,
    pub total_wickets: u32,
    pub batting_avg: f64,
    pub bowling_avg: f64,
    pub batting_innings: u32,
    pub bowling_innings: u32,
    pub rolling_runs: f64,
    pub rolling_wickets: f64,
    pub avg_opponent_runs: f64,
    pub avg_opponent_wickets: f64,
}

impl FeatureRow {
    pub fn opponent_resolved(&self) -> bool {
        self.opponent_team != UNKNOWN
    }
}

/// Everything one pipeline run produces, in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineeredTables {
    pub features: Vec<FeatureRow>,
    /// Ranked descending by total fantasy score.
    pub rankings: Vec<PlayerScore>,
    /// Per-observation scores in insertion order.
    pub match_scores: Vec<MatchScore>,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

// ---------------------------------------------------------------------------
// Writer/reader primitives (private, enable testing without temp files)
// ---------------------------------------------------------------------------

fn write_rows<W: Write, T: Serialize>(wtr: W, rows: &[T]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(wtr);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn read_rows<R: Read, T: for<'de> Deserialize<'de>>(rdr: R) -> Result<Vec<T>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut rows = Vec::new();
    for result in reader.deserialize::<T>() {
        rows.push(result?);
    }
    Ok(rows)
}

fn write_file<T: Serialize>(dir: &Path, name: &str, rows: &[T]) -> Result<(), TableError> {
    let path = dir.join(name);
    let file = std::fs::File::create(&path).map_err(|e| TableError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    write_rows(file, rows).map_err(|e| TableError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

fn read_file<T: for<'de> Deserialize<'de>>(dir: &Path, name: &str) -> Result<Vec<T>, TableError> {
    let path = dir.join(name);
    let file = std::fs::File::open(&path).map_err(|e| TableError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    read_rows(file).map_err(|e| TableError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Public persistence API
// ---------------------------------------------------------------------------

/// Write all three tables into `dir`, creating it if necessary.
pub fn write_all(tables: &EngineeredTables, dir: &Path) -> Result<(), TableError> {
    std::fs::create_dir_all(dir).map_err(|e| TableError::Io {
        path: dir.display().to_string(),
        source: e,
    })?;
    write_file(dir, FEATURES_FILE, &tables.features)?;
    write_file(dir, FANTASY_SCORES_FILE, &tables.rankings)?;
    write_file(dir, MATCH_FANTASY_FILE, &tables.match_scores)?;
    Ok(())
}

/// Reload a previous run's tables from `dir`. Used by a query-only
/// process that did not run the pipeline itself.
pub fn load_all(dir: &Path) -> Result<EngineeredTables, TableError> {
    Ok(EngineeredTables {
        features: read_file(dir, FEATURES_FILE)?,
        rankings: read_file(dir, FANTASY_SCORES_FILE)?,
        match_scores: read_file(dir, MATCH_FANTASY_FILE)?,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
