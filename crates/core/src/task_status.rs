//! Analysis task lifecycle states and the transition rules between them.
//!
//! The `TaskStatus` enum mirrors the seeded rows in `analysis_task_statuses`.
//! A task moves `pending -> processing -> completed | failed` exactly once;
//! the two terminal states never change again.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TaskStatus enum
// ---------------------------------------------------------------------------

/// Analysis task status.
///
/// Discriminant values match the seeded rows in the `analysis_task_statuses`
/// lookup table (1-based).
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending = 1,
    Processing = 2,
    Completed = 3,
    Failed = 4,
}

impl TaskStatus {
    /// Resolve a database status ID to the corresponding enum variant.
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(Self::Pending),
            2 => Some(Self::Processing),
            3 => Some(Self::Completed),
            4 => Some(Self::Failed),
            _ => None,
        }
    }

    /// Return the database status ID.
    pub fn id(&self) -> i16 {
        *self as i16
    }

    /// Wire name, matching the `name` column in `analysis_task_statuses`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Completed and failed tasks accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Valid target states reachable from `self`.
    pub fn valid_transitions(&self) -> &'static [TaskStatus] {
        match self {
            Self::Pending => &[Self::Processing],
            Self::Processing => &[Self::Completed, Self::Failed],
            Self::Completed | Self::Failed => &[],
        }
    }

    pub fn can_transition_to(&self, to: TaskStatus) -> bool {
        self.valid_transitions().contains(&to)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
