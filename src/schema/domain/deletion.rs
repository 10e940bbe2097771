//! Step-by-step record of a table deletion.

use super::TableName;
use serde::{Deserialize, Serialize};

/// One step of the deletion sequence, in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", content = "constraint", rename_all = "snake_case")]
pub enum DeletionStepKind {
    /// Remove routes served by the table.
    DeleteRoutes,
    /// Remove relations in other tables that target the table.
    DeleteInboundRelations,
    /// Drop a foreign key in another table that references the table.
    DropInboundForeignKey(String),
    /// Drop a foreign key from the table to another table.
    DropOutboundForeignKey(String),
    /// Drop the physical table.
    DropPhysicalTable,
    /// Drop the physical table along with inbound foreign keys that could
    /// not be dropped one by one.
    DropPhysicalTableCascade,
    /// Remove the table metadata with its own columns and relations.
    DeleteTableMetadata,
}

/// How dropping a physical table treats foreign keys that still reference it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropBehavior {
    /// Refuse the drop while other tables reference it.
    Restrict,
    /// Remove referencing constraints together with the table.
    Cascade,
}

impl DropBehavior {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
        }
    }
}

/// Outcome of a deletion step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    /// The step ran.
    Succeeded {
        /// Number of rows or objects removed.
        affected: u64,
    },
    /// The step was skipped and the deletion continued.
    Skipped {
        /// Why the step was skipped.
        reason: String,
    },
}

/// A recorded deletion step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionStep {
    /// Which step ran.
    pub kind: DeletionStepKind,
    /// What happened.
    pub outcome: StepOutcome,
}

/// Ordered record of everything a table deletion did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionReport {
    table: TableName,
    steps: Vec<DeletionStep>,
}

impl DeletionReport {
    /// Starts an empty report for `table`.
    #[must_use]
    pub const fn new(table: TableName) -> Self {
        Self {
            table,
            steps: Vec::new(),
        }
    }

    /// Records a step that ran.
    pub fn succeeded(&mut self, kind: DeletionStepKind, affected: u64) {
        self.steps.push(DeletionStep {
            kind,
            outcome: StepOutcome::Succeeded { affected },
        });
    }

    /// Records a step that was skipped.
    pub fn skipped(&mut self, kind: DeletionStepKind, reason: impl Into<String>) {
        self.steps.push(DeletionStep {
            kind,
            outcome: StepOutcome::Skipped {
                reason: reason.into(),
            },
        });
    }

    /// Returns the deleted table's name.
    #[must_use]
    pub const fn table(&self) -> &TableName {
        &self.table
    }

    /// Returns the recorded steps in execution order.
    #[must_use]
    pub fn steps(&self) -> &[DeletionStep] {
        &self.steps
    }

    /// Returns the skipped steps.
    pub fn skipped_steps(&self) -> impl Iterator<Item = &DeletionStep> {
        self.steps
            .iter()
            .filter(|step| matches!(step.outcome, StepOutcome::Skipped { .. }))
    }

    /// Returns `true` when every step ran.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.skipped_steps().next().is_none()
    }

    /// Returns the outcome of the first step of `kind`.
    #[must_use]
    pub fn outcome_of(&self, kind: &DeletionStepKind) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|step| &step.kind == kind)
            .map(|step| &step.outcome)
    }
}
