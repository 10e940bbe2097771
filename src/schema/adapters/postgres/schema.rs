//! Diesel schema for table, column, relation and route metadata.

diesel::table! {
    /// Managed table definitions.
    table_definition (id) {
        /// Table identifier.
        id -> Uuid,
        /// Unique table name.
        #[max_length = 64]
        name -> Varchar,
        /// Free-form description.
        description -> Nullable<Text>,
        /// Whether the table is enabled.
        is_enabled -> Bool,
        /// Table type (`Backend` or `System`).
        #[sql_name = "type"]
        #[max_length = 20]
        table_type -> Varchar,
        /// Optimistic concurrency version.
        version -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Columns of managed tables.
    column_definition (id) {
        /// Column identifier.
        id -> Uuid,
        /// Owning table.
        table_id -> Uuid,
        /// Column name.
        #[max_length = 64]
        name -> Varchar,
        /// Logical column type.
        #[sql_name = "type"]
        #[max_length = 20]
        column_type -> Varchar,
        /// Primary key flag.
        is_primary -> Bool,
        /// Nullability flag.
        #[sql_name = "is_nullable"]
        nullable -> Bool,
        /// Database-generated flag.
        is_generated -> Bool,
        /// Default value as JSONB.
        default_value -> Nullable<Jsonb>,
        /// Position within the table.
        position -> Int4,
    }
}

diesel::table! {
    /// Relations between managed tables.
    relation_definition (id) {
        /// Relation identifier.
        id -> Uuid,
        /// Owning table.
        source_table_id -> Uuid,
        /// Target table.
        target_table_id -> Uuid,
        /// Property name on the owning table.
        #[max_length = 64]
        property_name -> Varchar,
        /// Relation cardinality.
        #[sql_name = "type"]
        #[max_length = 20]
        relation_type -> Varchar,
        /// Property name on the target table.
        #[max_length = 64]
        inverse_property_name -> Nullable<Varchar>,
        /// Nullability flag.
        #[sql_name = "is_nullable"]
        nullable -> Bool,
        /// Position within the table.
        position -> Int4,
    }
}

diesel::table! {
    /// Routes serving managed tables.
    route_definition (id) {
        /// Route identifier.
        id -> Uuid,
        /// Unique route path.
        #[max_length = 255]
        path -> Varchar,
        /// Table served by the route.
        main_table_id -> Uuid,
        /// Whether the route is served.
        is_enabled -> Bool,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    table_definition,
    column_definition,
    relation_definition,
    route_definition,
);
