//! Catalog introspection queries and DDL statement builders.

use crate::schema::domain::DropBehavior;

/// Foreign keys declared on other tables that point at `$1`.
pub(super) const INBOUND_FOREIGN_KEYS_SQL: &str = "\
SELECT DISTINCT ON (tc.table_name, tc.constraint_name) \
       tc.constraint_name::text AS constraint_name, \
       tc.table_name::text AS table_name, \
       kcu.column_name::text AS column_name, \
       ccu.table_name::text AS referenced_table \
FROM information_schema.table_constraints tc \
JOIN information_schema.key_column_usage kcu \
  ON kcu.constraint_name = tc.constraint_name AND kcu.table_schema = tc.table_schema \
JOIN information_schema.constraint_column_usage ccu \
  ON ccu.constraint_name = tc.constraint_name AND ccu.constraint_schema = tc.table_schema \
WHERE tc.constraint_type = 'FOREIGN KEY' \
  AND tc.table_schema = current_schema() \
  AND ccu.table_name = $1 \
  AND tc.table_name <> $1 \
ORDER BY tc.table_name, tc.constraint_name";

/// Foreign keys declared on `$1`.
pub(super) const OUTBOUND_FOREIGN_KEYS_SQL: &str = "\
SELECT DISTINCT ON (tc.constraint_name) \
       tc.constraint_name::text AS constraint_name, \
       tc.table_name::text AS table_name, \
       kcu.column_name::text AS column_name, \
       ccu.table_name::text AS referenced_table \
FROM information_schema.table_constraints tc \
JOIN information_schema.key_column_usage kcu \
  ON kcu.constraint_name = tc.constraint_name AND kcu.table_schema = tc.table_schema \
JOIN information_schema.constraint_column_usage ccu \
  ON ccu.constraint_name = tc.constraint_name AND ccu.constraint_schema = tc.table_schema \
WHERE tc.constraint_type = 'FOREIGN KEY' \
  AND tc.table_schema = current_schema() \
  AND tc.table_name = $1 \
ORDER BY tc.constraint_name";

/// Whether a base table named `$1` exists in the current schema.
pub(super) const TABLE_EXISTS_SQL: &str = "\
SELECT EXISTS ( \
  SELECT 1 FROM information_schema.tables \
  WHERE table_schema = current_schema() AND table_name = $1 AND table_type = 'BASE TABLE' \
) AS present";

/// Quotes an SQL identifier, doubling embedded quotes.
#[must_use]
pub fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

pub(super) fn drop_constraint_sql(table: &str, constraint: &str) -> String {
    format!(
        "ALTER TABLE {} DROP CONSTRAINT {}",
        quote_identifier(table),
        quote_identifier(constraint)
    )
}

pub(super) fn drop_table_sql(table: &str, behavior: DropBehavior) -> String {
    format!(
        "DROP TABLE IF EXISTS {} {}",
        quote_identifier(table),
        behavior.as_sql()
    )
}
