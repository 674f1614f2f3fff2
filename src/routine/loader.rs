//! Routine file loading

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use super::{PhaseTiming, Routine, StretchConfig};
use crate::error::RoutineError;

/// Routine shipped with the binary, used when no file is given
const BUILTIN_ROUTINE: &str = include_str!("../../routines/default.json");

/// Parse stretch configs from JSON text.
///
/// Accepts either a bare array of stretches or an object with a
/// `stretches` array.
pub fn parse_stretches(json: &str) -> Result<Vec<StretchConfig>, RoutineError> {
    let value: Value = serde_json::from_str(json)?;
    let list = match value {
        Value::Object(mut map) => map.remove("stretches").unwrap_or(Value::Null),
        other => other,
    };
    Ok(serde_json::from_value(list)?)
}

/// Read stretch configs from a JSON file
pub fn load_stretches(path: &Path) -> Result<Vec<StretchConfig>, RoutineError> {
    debug!("Reading routine from {}", path.display());
    let text = std::fs::read_to_string(path).map_err(|source| RoutineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_stretches(&text)
}

/// Stretch configs of the built-in routine
pub fn builtin_stretches() -> Result<Vec<StretchConfig>, RoutineError> {
    parse_stretches(BUILTIN_ROUTINE)
}

/// Load and validate a routine from `path`, or the built-in one when `None`
pub fn load_routine(path: Option<&Path>, timing: PhaseTiming) -> Result<Routine, RoutineError> {
    let configs = match path {
        Some(path) => load_stretches(path)?,
        None => builtin_stretches()?,
    };
    let routine = Routine::new(configs, timing)?;
    info!(
        "Loaded routine with {} stretches ({}s total)",
        routine.len(),
        routine.total_seconds()
    );
    Ok(routine)
}
