//! Schema definition loaded from a declarative YAML file.
//!
//! The file is a single top-level mapping with one key per expected column:
//!
//! ```yaml
//! having_IP_Address: int64
//! URL_Length: int64
//! Result:
//!   type: int64
//!   target: true
//! ```
//!
//! Only the column names and their order matter to the validator; the number
//! of entries is the expected column count of every partition.

use crate::prelude::*;
use serde_yaml::Value;
use std::path::Path;
use tracing::{debug, instrument};

/// One declared column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    /// Declared type, e.g. `int64`. `None` when the entry declares no type.
    pub data_type: Option<String>,
}

/// Ordered column declarations, immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDefinition {
    columns: Vec<ColumnSpec>,
}

impl SchemaDefinition {
    /// Builds a schema from `(name, type)` pairs, preserving order.
    pub fn from_columns<I, N, T>(columns: I) -> Self
    where
        I: IntoIterator<Item = (N, T)>,
        N: Into<String>,
        T: Into<String>,
    {
        Self {
            columns: columns
                .into_iter()
                .map(|(name, data_type)| ColumnSpec {
                    name: name.into(),
                    data_type: Some(data_type.into()),
                })
                .collect(),
        }
    }

    /// Reads and parses a schema file.
    #[instrument]
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::configuration_with_source(
                format!("cannot read schema file {}", path.display()),
                e,
            )
        })?;
        let schema = Self::from_yaml_str(&raw)
            .with_context(|| format!("invalid schema file {}", path.display()))?;
        debug!(columns = schema.len(), "Loaded schema definition");
        Ok(schema)
    }

    /// Parses a schema document.
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let document: Value = serde_yaml::from_str(raw).map_err(|e| {
            PipelineError::configuration_with_source("schema is not valid YAML", e)
        })?;

        let mapping = match document {
            Value::Mapping(mapping) => mapping,
            Value::Null => {
                return Err(PipelineError::configuration("schema document is empty"));
            }
            _ => {
                return Err(PipelineError::configuration(
                    "schema document must be a mapping of column names",
                ));
            }
        };

        let columns = mapping
            .into_iter()
            .map(|(key, value)| {
                let name = scalar_to_string(&key).ok_or_else(|| {
                    PipelineError::configuration(format!(
                        "schema keys must be scalar column names, found {key:?}"
                    ))
                })?;
                Ok(ColumnSpec {
                    name,
                    data_type: declared_type(&value),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { columns })
    }

    /// Number of declared columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A column entry is either a type scalar or a mapping with `type`/`dtype`.
fn declared_type(value: &Value) -> Option<String> {
    match value {
        Value::Mapping(props) => ["type", "dtype"]
            .iter()
            .find_map(|key| props.get(*key).and_then(scalar_to_string)),
        other => scalar_to_string(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_scalar_entries_keep_order() {
        let schema = SchemaDefinition::from_yaml_str(
            "having_IP_Address: int64\nURL_Length: int64\nResult: int64\n",
        )
        .unwrap();
        assert_eq!(schema.len(), 3);
        let names: Vec<_> = schema.column_names().collect();
        assert_eq!(names, vec!["having_IP_Address", "URL_Length", "Result"]);
        assert_eq!(schema.columns()[0].data_type.as_deref(), Some("int64"));
    }

    #[test]
    fn test_nested_entries() {
        let schema = SchemaDefinition::from_yaml_str(
            "id:\n  dtype: int64\n  nullable: false\nlabel:\n  type: category\nnote: ~\n",
        )
        .unwrap();
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.columns()[0].data_type.as_deref(), Some("int64"));
        assert_eq!(schema.columns()[1].data_type.as_deref(), Some("category"));
        assert_eq!(schema.columns()[2].data_type, None);
    }

    #[test]
    fn test_rejects_non_mapping() {
        let err = SchemaDefinition::from_yaml_str("- a\n- b\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let err = SchemaDefinition::from_yaml_str("").unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_rejects_malformed_yaml() {
        let err = SchemaDefinition::from_yaml_str("a: [1, 2\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let err =
            SchemaDefinition::from_yaml_file(Path::new("/nonexistent/schema.yaml")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "a: float64").unwrap();
        writeln!(file, "b: float64").unwrap();
        file.flush().unwrap();

        let schema = SchemaDefinition::from_yaml_file(file.path()).unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(
            schema,
            SchemaDefinition::from_columns([("a", "float64"), ("b", "float64")])
        );
    }
}
