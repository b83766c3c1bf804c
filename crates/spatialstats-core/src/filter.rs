//! Record predicates and filtered sub-collections.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::error::{IterationError, Result};
use crate::feature::{BoxFeatureIterator, CollectionRef, FeatureCollection, FeatureIterator};
use crate::record::{Record, Value};
use crate::schema::SchemaRef;

/// Predicate over records.
#[derive(Clone)]
pub enum Filter {
    /// Matches every record
    Include,
    /// Matches no record
    Exclude,
    /// Matches records whose id is in the set
    Ids(BTreeSet<String>),
    /// Matches records whose attribute `name` equals `value`
    PropertyEquals {
        /// Attribute name
        name: String,
        /// Expected value
        value: Value,
    },
    /// Matches records every member matches
    And(Vec<Filter>),
    /// Arbitrary predicate
    Custom(Arc<dyn Fn(&Record) -> bool + Send + Sync>),
}

impl Filter {
    /// Id filter over the given identifiers.
    pub fn ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Filter::Ids(ids.into_iter().map(Into::into).collect())
    }

    /// Attribute equality filter.
    pub fn property_equals(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::PropertyEquals {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Wraps a closure as a filter.
    pub fn custom(predicate: impl Fn(&Record) -> bool + Send + Sync + 'static) -> Self {
        Filter::Custom(Arc::new(predicate))
    }

    /// Returns `true` for the universal filter.
    #[must_use]
    pub fn is_include(&self) -> bool {
        matches!(self, Filter::Include)
    }

    /// Conjunction of `self` and `other`, simplified where possible.
    #[must_use]
    pub fn and(self, other: Filter) -> Filter {
        match (self, other) {
            (Filter::Include, f) | (f, Filter::Include) => f,
            (Filter::Exclude, _) | (_, Filter::Exclude) => Filter::Exclude,
            (Filter::And(mut a), Filter::And(b)) => {
                a.extend(b);
                Filter::And(a)
            },
            (Filter::And(mut a), f) => {
                a.push(f);
                Filter::And(a)
            },
            (f, Filter::And(mut b)) => {
                b.insert(0, f);
                Filter::And(b)
            },
            (a, b) => Filter::And(vec![a, b]),
        }
    }

    /// Evaluates the filter against `record`.
    ///
    /// A `PropertyEquals` on an attribute the record's schema lacks never matches.
    #[must_use]
    pub fn evaluate(&self, record: &Record) -> bool {
        match self {
            Filter::Include => true,
            Filter::Exclude => false,
            Filter::Ids(ids) => ids.contains(record.id()),
            Filter::PropertyEquals { name, value } => {
                record.get(name).is_ok_and(|v| v == value)
            },
            Filter::And(filters) => filters.iter().all(|f| f.evaluate(record)),
            Filter::Custom(predicate) => predicate(record),
        }
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Include => f.write_str("Include"),
            Filter::Exclude => f.write_str("Exclude"),
            Filter::Ids(ids) => f.debug_tuple("Ids").field(ids).finish(),
            Filter::PropertyEquals { name, value } => f
                .debug_struct("PropertyEquals")
                .field("name", name)
                .field("value", value)
                .finish(),
            Filter::And(filters) => f.debug_tuple("And").field(filters).finish(),
            Filter::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A collection composed with a filter.
pub struct FilteredCollection {
    inner: CollectionRef,
    filter: Filter,
}

impl FilteredCollection {
    /// Composes `inner` with `filter`.
    #[must_use]
    pub fn new(inner: CollectionRef, filter: Filter) -> Self {
        Self { inner, filter }
    }

    /// The filter applied to the inner collection.
    #[must_use]
    pub fn filter(&self) -> &Filter {
        &self.filter
    }
}

impl FeatureCollection for FilteredCollection {
    fn schema(&self) -> SchemaRef {
        self.inner.schema()
    }

    fn features(&self) -> Result<BoxFeatureIterator<'_>> {
        Ok(Box::new(FilteredIterator {
            inner: self.inner.features()?,
            filter: &self.filter,
            pending: None,
            closed: false,
        }))
    }

    fn restrict(self: Arc<Self>, filter: Filter) -> CollectionRef {
        if filter.is_include() {
            return self;
        }
        Arc::new(FilteredCollection::new(
            Arc::clone(&self.inner),
            self.filter.clone().and(filter),
        ))
    }
}

/// Cursor that skips records the filter rejects.
///
/// Holds at most one look-ahead entry so `has_next` can answer truthfully.
/// Errors from the inner cursor are passed through in place, never filtered.
struct FilteredIterator<'a> {
    inner: BoxFeatureIterator<'a>,
    filter: &'a Filter,
    pending: Option<Result<Record>>,
    closed: bool,
}

impl FeatureIterator for FilteredIterator<'_> {
    fn has_next(&mut self) -> bool {
        if self.closed {
            return false;
        }
        if self.pending.is_some() {
            return true;
        }
        while self.inner.has_next() {
            match self.inner.next_feature() {
                Ok(record) if self.filter.evaluate(&record) => {
                    self.pending = Some(Ok(record));
                    return true;
                },
                Ok(_) => {},
                Err(err) => {
                    self.pending = Some(Err(err));
                    return true;
                },
            }
        }
        false
    }

    fn next_feature(&mut self) -> Result<Record> {
        if !self.has_next() {
            return Err(IterationError::NoSuchElement.into());
        }
        self.pending
            .take()
            .unwrap_or_else(|| Err(IterationError::NoSuchElement.into()))
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.pending = None;
            self.inner.close();
        }
    }
}

impl Drop for FilteredIterator<'_> {
    fn drop(&mut self) {
        self.close();
    }
}
