//! Application services for schema mutation.

mod mutation;

pub use mutation::{
    SchemaMutationError, SchemaMutationResult, SchemaMutationService, SchemaOperation,
    UpdateTableRequest,
};
