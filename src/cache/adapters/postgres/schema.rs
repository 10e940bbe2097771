//! Diesel schema for cache persistence and package lookup.

diesel::table! {
    /// Shared cache entries visible to every service instance.
    cache_entries (key) {
        /// Cache key, e.g. `global:packages`.
        #[max_length = 255]
        key -> Varchar,
        /// Serialised cache value.
        value -> Text,
        /// Expiry deadline; `NULL` never expires.
        expires_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Installed package definitions.
    package_definition (id) {
        /// Package identifier.
        id -> Int4,
        /// Package name as published.
        #[max_length = 255]
        name -> Varchar,
        /// Whether the package is loaded at runtime.
        is_enabled -> Bool,
        /// Package kind (`Backend` or `App`).
        #[sql_name = "type"]
        #[max_length = 50]
        package_type -> Varchar,
    }
}
