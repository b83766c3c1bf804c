//! Attribute values and feature records.

use std::fmt;

use geo::Geometry;
use serde_json::Value as JsonValue;

use crate::error::SchemaError;
use crate::schema::SchemaRef;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing value
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Double(f64),
    /// Text value
    String(String),
    /// Nested JSON value
    Json(JsonValue),
    /// Geometry value
    Geometry(Geometry<f64>),
}

impl Value {
    /// Returns the geometry if this value holds one.
    #[must_use]
    pub fn as_geometry(&self) -> Option<&Geometry<f64>> {
        match self {
            Value::Geometry(g) => Some(g),
            _ => None,
        }
    }

    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Geometry<f64>> for Value {
    fn from(value: Geometry<f64>) -> Self {
        Value::Geometry(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
            Value::Json(v) => write!(f, "{v}"),
            Value::Geometry(g) => write!(f, "{g:?}"),
        }
    }
}

/// One feature: an identity plus one value per schema attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: String,
    schema: SchemaRef,
    values: Vec<Value>,
}

impl Record {
    /// Builds a record against `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::AttributeCount`] if `values` does not have exactly
    /// one entry per schema attribute.
    pub fn try_new(
        schema: SchemaRef,
        id: impl Into<String>,
        values: Vec<Value>,
    ) -> Result<Self, SchemaError> {
        if values.len() != schema.len() {
            return Err(SchemaError::AttributeCount {
                type_name: schema.type_name().to_string(),
                expected: schema.len(),
                found: values.len(),
            });
        }
        Ok(Self {
            id: id.into(),
            schema,
            values,
        })
    }

    /// Feature identity.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Schema this record was built against.
    #[must_use]
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Values in schema order.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Value at `index`.
    #[must_use]
    pub fn value(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Value of the attribute called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownAttribute`] if the schema has no such attribute.
    pub fn get(&self, name: &str) -> Result<&Value, SchemaError> {
        self.schema
            .index_of(name)
            .map(|i| &self.values[i])
            .ok_or_else(|| SchemaError::UnknownAttribute {
                type_name: self.schema.type_name().to_string(),
                name: name.to_string(),
            })
    }

    /// The primary geometry, if the schema has one and it is set.
    #[must_use]
    pub fn geometry(&self) -> Option<&Geometry<f64>> {
        self.schema
            .geometry_index()
            .and_then(|i| self.values[i].as_geometry())
    }

    /// Splits the record into its identity and values.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.id, self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeType, GeometryType, Schema};
    use geo::point;
    use std::sync::Arc;

    fn schema() -> SchemaRef {
        Arc::new(
            Schema::builder("cities")
                .geometry("geom", GeometryType::Point)
                .attribute("name", AttributeType::String)
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_record_accessors() {
        let record = Record::try_new(
            schema(),
            "cities.1",
            vec![
                Value::Geometry(Geometry::Point(point!(x: 12.45, y: 41.90))),
                "Vatican City".into(),
            ],
        )
        .unwrap();

        assert_eq!(record.id(), "cities.1");
        assert_eq!(record.get("name").unwrap(), &Value::from("Vatican City"));
        assert!(record.geometry().is_some());
        assert!(matches!(
            record.get("population"),
            Err(SchemaError::UnknownAttribute { .. })
        ));
    }

    #[test]
    fn test_record_value_count_checked() {
        let err = Record::try_new(schema(), "cities.1", vec![Value::Null]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::AttributeCount {
                type_name: "cities".to_string(),
                expected: 2,
                found: 1,
            }
        );
    }

    #[test]
    fn test_null_geometry() {
        let record =
            Record::try_new(schema(), "cities.2", vec![Value::Null, "Nowhere".into()]).unwrap();
        assert!(record.geometry().is_none());
        assert!(record.value(0).unwrap().is_null());
    }
}
