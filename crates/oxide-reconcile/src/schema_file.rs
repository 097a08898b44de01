//! Desired-schema files.
//!
//! A schema file is a JSON document listing the tables to reconcile:
//!
//! ```json
//! {
//!   "tables": [
//!     {
//!       "name": "users",
//!       "columns": [
//!         {"name": "id", "family": "INTEGER", "nullable": false, "auto_increment": true},
//!         {"name": "email", "family": "VARCHAR", "length": 255, "nullable": false}
//!       ],
//!       "indices": [
//!         {"name": "PRIMARY_KEY", "kind": "PRIMARY_KEY", "columns": ["id"]}
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::path::Path;

use oxide_schema::TableDescriptor;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tables to reconcile, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaFile {
    /// Table descriptors.
    pub tables: Vec<TableDescriptor>,
}

impl SchemaFile {
    /// Reads a schema file from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses a schema file.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` does not describe a schema file.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Returns the table named `name`.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.iter().find(|t| t.name == name)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use oxide_schema::{IndexKind, TypeFamily};

    use super::*;
    use crate::error::ReconcileError;

    const USERS: &str = r#"{
        "tables": [{
            "name": "users",
            "columns": [
                {"name": "id", "family": "INTEGER", "nullable": false, "auto_increment": true},
                {"name": "email", "family": "VARCHAR", "length": 255, "nullable": false},
                {"name": "active", "family": "BOOLEAN", "default": {"Bool": true}}
            ],
            "indices": [
                {"name": "PRIMARY_KEY", "kind": "PRIMARY_KEY", "columns": ["id"]},
                {"name": "users_email_key", "kind": "UNIQUE", "columns": ["email"]}
            ]
        }]
    }"#;

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(USERS.as_bytes()).unwrap();

        let schema = SchemaFile::load(file.path()).unwrap();
        let users = schema.table("users").unwrap();
        assert_eq!(users.columns.len(), 3);
        assert_eq!(users.columns[1].family, TypeFamily::Varchar);
        assert_eq!(users.indices[1].kind, IndexKind::Unique);
        assert!(users.validate().is_ok());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SchemaFile::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ReconcileError::Io(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = SchemaFile::from_json("{\"tables\": 3}").unwrap_err();
        assert!(matches!(err, ReconcileError::Serialization(_)));
    }
}
