//! Error types for routine loading and running

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a routine or starting the runner
#[derive(Debug, Error)]
pub enum RoutineError {
    /// No stretches configured; start is aborted
    #[error("no stretches in routine")]
    EmptyRoutine,

    /// A stretch definition (or the routine-wide timing) is unusable
    #[error("invalid stretch definition `{id}`: {reason}")]
    InvalidDefinition { id: String, reason: String },

    /// Routine file is not valid JSON for a routine
    #[error("failed to parse routine: {0}")]
    Parse(#[from] serde_json::Error),

    /// Routine file could not be read
    #[error("failed to read routine file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RoutineError {
    pub(crate) fn invalid(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let err = RoutineError::invalid("cat-cow", "custom sides require sideNames");
        assert_eq!(
            err.to_string(),
            "invalid stretch definition `cat-cow`: custom sides require sideNames"
        );

        let err = RoutineError::Io {
            path: PathBuf::from("/tmp/missing.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().starts_with("failed to read routine file /tmp/missing.json"));
    }
}
