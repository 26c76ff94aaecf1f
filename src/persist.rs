//! Save files and history export.
//!
//! The save format is one JSON document (`SaveState`); history export writes JSONL
//! files for offline analysis. Loading never fails: unreadable, corrupt, or
//! wrong-version saves are logged and replaced with an empty state.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PersistError;
use crate::ledger::LedgerSnapshot;
use crate::model::SimDate;
use crate::sim::ElectionsSnapshot;

pub const CURRENT_VERSION: u32 = 1;

/// Everything needed to resume a simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveState {
    pub version: u32,
    pub seed: u64,
    #[serde(default)]
    pub last_date: Option<SimDate>,
    #[serde(default)]
    pub ledger: LedgerSnapshot,
    #[serde(default)]
    pub elections: ElectionsSnapshot,
}

impl Default for SaveState {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            seed: 0,
            last_date: None,
            ledger: LedgerSnapshot::default(),
            elections: ElectionsSnapshot::default(),
        }
    }
}

pub fn save_to_string(state: &SaveState) -> Result<String, PersistError> {
    Ok(serde_json::to_string_pretty(state)?)
}

pub fn save_to_path(state: &SaveState, path: &Path) -> Result<(), PersistError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, save_to_string(state)?)?;
    Ok(())
}

/// Strict parse: fails on bad JSON or an unsupported version.
pub fn parse_save(json: &str) -> Result<SaveState, PersistError> {
    let state: SaveState = serde_json::from_str(json)?;
    if state.version != CURRENT_VERSION {
        return Err(PersistError::Version {
            found: state.version,
            expected: CURRENT_VERSION,
        });
    }
    Ok(state)
}

/// Parse a save, falling back to `SaveState::default()` on any problem.
pub fn load_from_str(json: &str) -> SaveState {
    match parse_save(json) {
        Ok(state) => state,
        Err(err) => {
            tracing::warn!("discarding save data: {err}");
            SaveState::default()
        }
    }
}

pub fn load_from_path(path: &Path) -> SaveState {
    match fs::read_to_string(path) {
        Ok(json) => load_from_str(&json),
        Err(err) => {
            tracing::warn!("cannot read save {}: {err}", path.display());
            SaveState::default()
        }
    }
}

/// Write an iterator of serializable items to a JSONL file (one JSON object per line).
fn write_jsonl<T: Serialize>(
    path: &Path,
    items: impl Iterator<Item = T>,
) -> Result<(), PersistError> {
    let mut writer = BufWriter::new(File::create(path)?);
    for item in items {
        serde_json::to_writer(&mut writer, &item)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Export election history to JSONL files in the given output directory.
///
/// Creates the output directory if it does not exist. Writes 3 files:
/// - `results.jsonl`: one `ElectionResultRecord` per office per year
/// - `declarations.jsonl`: one `Declaration` per line, by year
/// - `careers.jsonl`: one completed term (`CareerRecord`) per line, by character
pub fn export_history_jsonl(state: &SaveState, output_dir: &Path) -> Result<(), PersistError> {
    fs::create_dir_all(output_dir)?;

    let history = &state.elections.history;
    write_jsonl(
        &output_dir.join("results.jsonl"),
        history.values().flat_map(|year| year.results.iter()),
    )?;
    write_jsonl(
        &output_dir.join("declarations.jsonl"),
        history.values().flat_map(|year| year.declarations.iter()),
    )?;
    write_jsonl(
        &output_dir.join("careers.jsonl"),
        state
            .ledger
            .history
            .values()
            .flat_map(|records| records.iter()),
    )?;

    tracing::info!("exported election history to {}", output_dir.display());
    Ok(())
}
