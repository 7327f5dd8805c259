//! Production batch status.
//!
//! A batch moves through three Kanban columns. Any column is reachable from
//! any other; there is no forced sequencing and no terminal state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kanban column / lifecycle state of a production batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "production.batch_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Recorded but not started. Every batch starts here.
    #[default]
    Todo,
    /// Being produced.
    InProgress,
    /// Finished; counts toward the item's completed quantity.
    Done,
}

impl BatchStatus {
    /// All statuses in column order.
    pub const ALL: [Self; 3] = [Self::Todo, Self::InProgress, Self::Done];

    /// Wire/database code for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }

    /// Column heading shown to lab staff.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Todo => "A Fazer (Lotes)",
            Self::InProgress => "Em andamento",
            Self::Done => "Concluídos",
        }
    }

    /// Whether this status counts toward completed production.
    #[must_use]
    pub const fn is_done(self) -> bool {
        matches!(self, Self::Done)
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid batch status: {0} (expected todo, in_progress or done)")]
pub struct ParseStatusError(pub String);

impl std::str::FromStr for BatchStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(Self::Todo),
            "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}
