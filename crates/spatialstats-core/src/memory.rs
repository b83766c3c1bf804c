//! In-memory feature source.

use std::sync::Arc;

use log::debug;

use crate::error::{IterationError, Result, SchemaError};
use crate::feature::{
    BoxFeatureIterator, CollectionRef, FeatureCollection, FeatureIterator, restrict_collection,
};
use crate::filter::Filter;
use crate::record::Record;
use crate::schema::SchemaRef;

/// A collection over records held in memory.
///
/// Each cursor walks the shared record list and hands out clones, so the
/// stored records are never mutated and any number of cursors can run at once.
#[derive(Debug, Clone)]
pub struct MemoryCollection {
    schema: SchemaRef,
    records: Arc<Vec<Record>>,
}

impl MemoryCollection {
    /// Creates a collection from records built against `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::AttributeCount`] if a record does not match the
    /// schema's attribute count.
    pub fn try_new(schema: SchemaRef, records: Vec<Record>) -> Result<Self> {
        if let Some(record) = records.iter().find(|r| r.values().len() != schema.len()) {
            return Err(SchemaError::AttributeCount {
                type_name: schema.type_name().to_string(),
                expected: schema.len(),
                found: record.values().len(),
            }
            .into());
        }
        debug!(
            "In-memory collection '{}' with {} record(s)",
            schema.type_name(),
            records.len()
        );
        Ok(Self {
            schema,
            records: Arc::new(records),
        })
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The stored records.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }
}

impl FeatureCollection for MemoryCollection {
    fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    fn features(&self) -> Result<BoxFeatureIterator<'_>> {
        Ok(Box::new(MemoryIterator {
            records: Some(self.records.iter()),
        }))
    }

    fn restrict(self: Arc<Self>, filter: Filter) -> CollectionRef {
        restrict_collection(self, filter)
    }
}

/// Cursor over a [`MemoryCollection`]; `None` once closed.
struct MemoryIterator<'a> {
    records: Option<std::slice::Iter<'a, Record>>,
}

impl FeatureIterator for MemoryIterator<'_> {
    fn has_next(&mut self) -> bool {
        self.records.as_ref().is_some_and(|it| it.len() > 0)
    }

    fn next_feature(&mut self) -> Result<Record> {
        self.records
            .as_mut()
            .and_then(Iterator::next)
            .cloned()
            .ok_or_else(|| IterationError::NoSuchElement.into())
    }

    fn close(&mut self) {
        self.records = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Value;
    use crate::schema::{AttributeType, Schema};

    fn numbers(n: i64) -> MemoryCollection {
        let schema = Arc::new(
            Schema::builder("numbers")
                .attribute("n", AttributeType::Integer)
                .build()
                .unwrap(),
        );
        let records = (0..n)
            .map(|i| Record::try_new(Arc::clone(&schema), format!("n.{i}"), vec![i.into()]))
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        MemoryCollection::try_new(schema, records).unwrap()
    }

    #[test]
    fn test_cursor_walks_all_records() {
        let collection = numbers(3);
        let mut cursor = collection.features().unwrap();
        let mut seen = Vec::new();
        while cursor.has_next() {
            seen.push(cursor.next_feature().unwrap().id().to_string());
        }
        assert_eq!(seen, vec!["n.0", "n.1", "n.2"]);
        assert!(cursor.next_feature().is_err());
    }

    #[test]
    fn test_closed_cursor_is_exhausted() {
        let collection = numbers(3);
        let mut cursor = collection.features().unwrap();
        cursor.close();
        assert!(!cursor.has_next());
        assert!(cursor.next_feature().is_err());
    }

    #[test]
    fn test_mismatched_record_rejected() {
        let schema = Arc::new(
            Schema::builder("pair")
                .attribute("a", AttributeType::Integer)
                .attribute("b", AttributeType::Integer)
                .build()
                .unwrap(),
        );
        let other = Arc::new(
            Schema::builder("single")
                .attribute("a", AttributeType::Integer)
                .build()
                .unwrap(),
        );
        let record = Record::try_new(other, "x", vec![Value::Integer(1)]).unwrap();
        assert!(MemoryCollection::try_new(schema, vec![record]).is_err());
    }
}
