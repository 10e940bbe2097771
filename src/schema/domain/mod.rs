//! Domain model for table, column, relation and route metadata.
//!
//! Table definitions mirror physical database tables. The domain owns the
//! structural invariants (a single `id` primary key, unique property names,
//! inverse sides for one-to-many relations) and the bookkeeping of a
//! deletion; persistence and DDL stay behind the ports.

mod change;
mod column;
mod deletion;
mod error;
mod foreign_key;
mod ids;
mod name;
mod relation;
mod route;
mod table;
pub mod validation;

pub use change::{SchemaChangeEvent, SchemaChangeKind};
pub use column::{ColumnDefinition, ColumnType};
pub use deletion::{DeletionReport, DeletionStep, DeletionStepKind, DropBehavior, StepOutcome};
pub use error::{ParseSchemaValueError, TableDomainError, ValidationError};
pub use foreign_key::ForeignKeyConstraint;
pub use ids::{ColumnId, RelationId, RouteId, TableId};
pub use name::TableName;
pub use relation::{RelationDefinition, RelationType};
pub use route::RouteDefinition;
pub use table::{MemberRemoval, PersistedTableData, TableDefinition, TableDraft, TableType};
