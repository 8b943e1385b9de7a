use std::fmt;

use model_types::{ConstraintId, EntityId, GroupId, ParamId, RequestId, SolveStatus};

/// Errors returned by the engine.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("group not found: {id}")]
    GroupNotFound { id: GroupId },

    #[error("request not found: {id}")]
    RequestNotFound { id: RequestId },

    #[error("constraint not found: {id}")]
    ConstraintNotFound { id: ConstraintId },

    #[error("entity not found: {id}")]
    EntityNotFound { id: EntityId },

    #[error("param not found: {id}")]
    ParamNotFound { id: ParamId },

    #[error("the reference workplanes cannot be deleted")]
    CannotDeleteReferences,

    #[error("operand group {operand} does not come before group {group}")]
    OperandNotEarlier { group: GroupId, operand: GroupId },

    #[error("nothing to export: {reason}")]
    NothingToExport { reason: String },

    #[error("internal invariant violated: {detail}")]
    Invariant { detail: String },

    #[error("invalid configuration: {reason}")]
    Config { reason: String },
}

/// Objects removed by the pruner since the last notice was issued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeletionCounts {
    pub requests: usize,
    pub constraints: usize,
    pub groups: usize,
}

impl DeletionCounts {
    pub fn any(&self) -> bool {
        self.total() > 0
    }

    pub fn total(&self) -> usize {
        self.requests + self.constraints + self.groups
    }
}

/// Tells the user which dependent objects vanished during regeneration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletionNotice {
    pub counts: DeletionCounts,
}

impl DeletionNotice {
    pub fn message(&self) -> String {
        self.to_string()
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

impl fmt::Display for DeletionNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.counts;
        let mut parts = Vec::new();
        if c.requests > 0 {
            parts.push(plural(c.requests, "request"));
        }
        if c.constraints > 0 {
            parts.push(plural(c.constraints, "constraint"));
        }
        if c.groups > 0 {
            parts.push(plural(c.groups, "group"));
        }
        write!(
            f,
            "Automatically removed {} that depended on deleted geometry.",
            parts.join(", ")
        )
    }
}

/// What a completed regeneration reports back to its caller.
#[derive(Debug, Clone, PartialEq)]
pub struct RegenReport {
    /// The display must be redrawn.
    pub repaint: bool,
    /// Present when the pruner removed anything.
    pub deletions: Option<DeletionNotice>,
    /// How many times the pass restarted after a prune.
    pub restarts: usize,
    /// Groups solved in the final pass, in history order.
    pub solved: Vec<(GroupId, SolveStatus)>,
}

impl RegenReport {
    pub fn status_of(&self, group: GroupId) -> Option<&SolveStatus> {
        self.solved
            .iter()
            .find(|(id, _)| *id == group)
            .map(|(_, status)| status)
    }
}

/// An item picked in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Entity(EntityId),
    Constraint(ConstraintId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_pluralizes_each_kind() {
        let notice = DeletionNotice {
            counts: DeletionCounts {
                requests: 1,
                constraints: 3,
                groups: 0,
            },
        };
        assert_eq!(
            notice.message(),
            "Automatically removed 1 request, 3 constraints that depended on deleted geometry."
        );
    }

    #[test]
    fn notice_lists_groups_last() {
        let notice = DeletionNotice {
            counts: DeletionCounts {
                requests: 2,
                constraints: 0,
                groups: 1,
            },
        };
        assert!(notice.message().contains("2 requests, 1 group that"));
    }

    #[test]
    fn empty_counts_are_not_reported() {
        assert!(!DeletionCounts::default().any());
        assert_eq!(
            DeletionCounts {
                requests: 1,
                constraints: 2,
                groups: 3
            }
            .total(),
            6
        );
    }
}
