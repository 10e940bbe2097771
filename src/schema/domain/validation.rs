//! Structural validation rules for table drafts.
//!
//! Each rule is a standalone function so the mutation service can apply
//! them in the order each operation requires.

use super::{
    ColumnDefinition, RelationDefinition, RelationType, ValidationError, name::is_identifier,
};
use std::collections::HashSet;

/// Every one-to-many relation must declare its inverse property.
///
/// # Errors
///
/// Returns [`ValidationError::MissingInverseProperty`] for the first
/// offending relation.
pub fn check_inverse_properties(relations: &[RelationDefinition]) -> Result<(), ValidationError> {
    let missing = relations.iter().find(|relation| {
        relation.relation_type == RelationType::OneToMany
            && relation
                .inverse_property_name
                .as_deref()
                .is_none_or(|inverse| inverse.trim().is_empty())
    });
    match missing {
        Some(relation) => Err(ValidationError::MissingInverseProperty {
            property: relation.property_name.clone(),
        }),
        None => Ok(()),
    }
}

/// Exactly one column is primary, named `id`, with an `int` or `uuid` type.
///
/// # Errors
///
/// Returns [`ValidationError::MissingPrimaryColumn`],
/// [`ValidationError::MultiplePrimaryColumns`],
/// [`ValidationError::PrimaryColumnNotNamedId`] or
/// [`ValidationError::InvalidPrimaryColumnType`].
pub fn check_primary_column(columns: &[ColumnDefinition]) -> Result<(), ValidationError> {
    let primaries: Vec<&ColumnDefinition> = columns.iter().filter(|c| c.is_primary).collect();
    let primary = match primaries.as_slice() {
        [] => return Err(ValidationError::MissingPrimaryColumn),
        [only] => *only,
        many => {
            return Err(ValidationError::MultiplePrimaryColumns { count: many.len() });
        }
    };
    if primary.name != "id" {
        return Err(ValidationError::PrimaryColumnNotNamedId {
            name: primary.name.clone(),
        });
    }
    if !primary.column_type.is_primary_key_type() {
        return Err(ValidationError::InvalidPrimaryColumnType {
            column_type: primary.column_type,
        });
    }
    Ok(())
}

/// At least one submitted column is primary.
///
/// # Errors
///
/// Returns [`ValidationError::MissingPrimaryColumn`] when none is.
pub fn check_has_primary_column(columns: &[ColumnDefinition]) -> Result<(), ValidationError> {
    if columns.iter().any(|column| column.is_primary) {
        Ok(())
    } else {
        Err(ValidationError::MissingPrimaryColumn)
    }
}

/// Column names and relation property names are identifiers, unique across
/// both lists.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidPropertyName`] or
/// [`ValidationError::DuplicatePropertyName`] for the first offender.
pub fn check_unique_property_names(
    columns: &[ColumnDefinition],
    relations: &[RelationDefinition],
) -> Result<(), ValidationError> {
    let names = columns
        .iter()
        .map(|column| column.name.as_str())
        .chain(relations.iter().map(|relation| relation.property_name.as_str()));

    let mut seen = HashSet::new();
    for name in names {
        if !is_identifier(name) {
            return Err(ValidationError::InvalidPropertyName {
                name: name.to_owned(),
            });
        }
        if !seen.insert(name) {
            return Err(ValidationError::DuplicatePropertyName {
                name: name.to_owned(),
            });
        }
    }
    Ok(())
}

/// Member identifiers are unique within the submitted columns and within
/// the submitted relations.
///
/// # Errors
///
/// Returns [`ValidationError::DuplicateMemberId`] naming the first member
/// whose identifier was already seen.
pub fn check_unique_member_ids(
    columns: &[ColumnDefinition],
    relations: &[RelationDefinition],
) -> Result<(), ValidationError> {
    let mut column_ids = HashSet::new();
    if let Some(column) = columns.iter().find(|column| !column_ids.insert(column.id)) {
        return Err(ValidationError::DuplicateMemberId {
            property: column.name.clone(),
        });
    }
    let mut relation_ids = HashSet::new();
    if let Some(relation) = relations
        .iter()
        .find(|relation| !relation_ids.insert(relation.id))
    {
        return Err(ValidationError::DuplicateMemberId {
            property: relation.property_name.clone(),
        });
    }
    Ok(())
}
