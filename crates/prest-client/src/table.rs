//! Table addressing.
//!
//! A table identifier is either a bare table name (`"products"`, resolved in
//! the `public` schema) or a schema-qualified name (`"shop.products"`).
//! A trailing dot (`"public."`) addresses the schema itself, which lists its
//! tables.

use std::fmt;

use crate::error::{PrestError, Result};

pub const DEFAULT_SCHEMA: &str = "public";

/// A resolved `(schema, table)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    schema: String,
    table: String,
}

impl TableRef {
    /// Resolve an identifier into schema and table names.
    ///
    /// Only the first `.` splits; an empty schema part falls back to
    /// `public` and an empty table part is kept as is.
    ///
    /// # Examples
    ///
    /// ```
    /// use prest_client::TableRef;
    ///
    /// let t = TableRef::resolve("shop.products").unwrap();
    /// assert_eq!((t.schema(), t.table()), ("shop", "products"));
    ///
    /// let t = TableRef::resolve("products").unwrap();
    /// assert_eq!((t.schema(), t.table()), ("public", "products"));
    /// ```
    pub fn resolve(identifier: &str) -> Result<Self> {
        if identifier.is_empty() {
            return Err(PrestError::InvalidArgument(
                "Table name is required".to_string(),
            ));
        }

        let (schema, table) = match identifier.split_once('.') {
            Some((schema, table)) => {
                let schema = if schema.is_empty() {
                    DEFAULT_SCHEMA
                } else {
                    schema
                };
                (schema, table)
            }
            None => (DEFAULT_SCHEMA, identifier),
        };

        Ok(Self {
            schema: schema.to_string(),
            table: table.to_string(),
        })
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// True when the identifier addressed the whole schema (`"schema."`).
    pub fn is_schema_wide(&self) -> bool {
        self.table.is_empty()
    }

    /// Resource path `/{database}/{schema}/{table}` below an optional prefix
    /// segment such as `show` or `batch`.
    pub fn path(&self, prefix: Option<&str>, database: &str) -> String {
        let mut path = String::new();
        if let Some(prefix) = prefix {
            path.push('/');
            path.push_str(prefix);
        }
        path.push('/');
        path.push_str(database);
        path.push('/');
        path.push_str(&self.schema);
        if !self.table.is_empty() {
            path.push('/');
            path.push_str(&self.table);
        }
        path
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}
