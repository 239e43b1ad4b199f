//! Row and parameter types for query results.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::AppError;

/// Parameters for Cypher queries.
///
/// A map of parameter names to JSON values that can be passed to queries.
pub type Params = HashMap<String, JsonValue>;

/// A single row from a query result.
///
/// Contains column values as JSON, with typed extraction via [`Row::get`].
#[derive(Debug, Clone, Default)]
pub struct Row {
    data: HashMap<String, JsonValue>,
}

impl Row {
    /// Creates a new row from a map of column names to values.
    pub fn new(data: HashMap<String, JsonValue>) -> Self {
        Self { data }
    }

    /// Gets a value from the row by column name, deserializing to the
    /// requested type.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, AppError> {
        self.data
            .get(key)
            .ok_or_else(|| AppError::Internal(format!("column not found: {key}")))
            .and_then(|v| {
                serde_json::from_value(v.clone()).map_err(|e| {
                    AppError::Internal(format!("failed to deserialize '{key}': {e}"))
                })
            })
    }

    /// Gets a value from the row, returning `None` if the column is
    /// absent or null. Still errors if a present value has the wrong type.
    pub fn get_opt<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        match self.data.get(key) {
            Some(v) if v.is_null() => Ok(None),
            Some(v) => serde_json::from_value(v.clone())
                .map(Some)
                .map_err(|e| AppError::Internal(format!("failed to deserialize '{key}': {e}"))),
            None => Ok(None),
        }
    }

    /// Converts the row into a JSON object keyed by column name.
    ///
    /// Keys end up sorted (serde_json map), which keeps serialized
    /// results byte-identical across repeated identical queries.
    pub fn into_json(self) -> JsonValue {
        JsonValue::Object(self.data.into_iter().collect())
    }
}

impl From<HashMap<String, JsonValue>> for Row {
    fn from(data: HashMap<String, JsonValue>) -> Self {
        Self::new(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_typed_value() {
        let mut data = HashMap::new();
        data.insert("count".to_string(), json!(42));
        let row = Row::new(data);

        let count: i64 = row.get("count").unwrap();
        assert_eq!(count, 42);
    }

    #[test]
    fn get_missing_column_errors() {
        let row = Row::default();
        assert!(row.get::<String>("missing").is_err());
    }

    #[test]
    fn get_opt_treats_null_as_absent() {
        let mut data = HashMap::new();
        data.insert("label".to_string(), JsonValue::Null);
        let row = Row::new(data);

        assert_eq!(row.get_opt::<String>("label").unwrap(), None);
        assert_eq!(row.get_opt::<String>("other").unwrap(), None);
    }

    #[test]
    fn into_json_sorts_columns() {
        let mut data = HashMap::new();
        data.insert("b".to_string(), json!(2));
        data.insert("a".to_string(), json!(1));
        let row = Row::new(data);

        assert_eq!(
            serde_json::to_string(&row.into_json()).unwrap(),
            r#"{"a":1,"b":2}"#
        );
    }
}
