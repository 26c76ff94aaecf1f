use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read office catalogue: {0}")]
    Io(#[from] io::Error),
    #[error("office catalogue is not a JSON array of records: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("office `{office_id}` has no seat available for character {character_id}")]
    NoSeatAvailable { office_id: String, character_id: u64 },
}

/// Failures while wiring systems together. These are the only fatal errors: running
/// with an unresolved dependency would corrupt downstream invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartupError {
    #[error("system `{system}` depends on `{dependency}`, which was never registered")]
    MissingDependency { system: String, dependency: String },
    #[error("dependency cycle among systems: {}", systems.join(", "))]
    DependencyCycle { systems: Vec<String> },
    #[error("system `{0}` registered twice")]
    DuplicateSystem(String),
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to access save data: {0}")]
    Io(#[from] io::Error),
    #[error("save data is not valid JSON for this format: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported save version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },
}
