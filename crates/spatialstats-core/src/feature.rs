//! Collection and cursor capabilities.
//!
//! A [`FeatureCollection`] is a read-only, shareable handle that can open any
//! number of independent [`FeatureIterator`] cursors. Cursors are single
//! pass and forward only; they hold whatever resources the source needs and
//! release them on [`FeatureIterator::close`] or when dropped.

use std::sync::Arc;

use crate::error::{IterationError, Result};
use crate::filter::{Filter, FilteredCollection};
use crate::record::Record;
use crate::schema::SchemaRef;

/// A forward-only, non-restartable cursor over records.
///
/// Implementations must release their resources in `close` and must make a
/// second `close` a no-op. Implementations also close themselves on drop.
pub trait FeatureIterator: Send {
    /// Returns `true` while an unconsumed record remains.
    fn has_next(&mut self) -> bool;

    /// Pulls the next record.
    ///
    /// # Errors
    ///
    /// Returns [`IterationError::NoSuchElement`] when called after the last
    /// record or after `close`; otherwise whatever error producing the record
    /// raised.
    fn next_feature(&mut self) -> Result<Record>;

    /// Releases the underlying cursor. Idempotent.
    fn close(&mut self);

    /// `Iterator`-style pull: `None` once the cursor is exhausted.
    fn next_entry(&mut self) -> Option<Result<Record>> {
        if self.has_next() {
            Some(self.next_feature())
        } else {
            None
        }
    }
}

/// Boxed cursor borrowing its collection.
pub type BoxFeatureIterator<'a> = Box<dyn FeatureIterator + 'a>;

/// Shared collection handle.
pub type CollectionRef = Arc<dyn FeatureCollection>;

/// A read-only collection of records sharing one schema.
pub trait FeatureCollection: Send + Sync {
    /// The schema of every record this collection yields.
    fn schema(&self) -> SchemaRef;

    /// Opens a fresh cursor. Cursors never share state with each other.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying source cannot be opened.
    fn features(&self) -> Result<BoxFeatureIterator<'_>>;

    /// The sub-collection of records matching `filter`, in the same order.
    ///
    /// [`Filter::Include`] returns this very collection.
    fn restrict(self: Arc<Self>, filter: Filter) -> CollectionRef;
}

/// Default `restrict` behaviour shared by the collection implementations.
pub(crate) fn restrict_collection(collection: CollectionRef, filter: Filter) -> CollectionRef {
    if filter.is_include() {
        return collection;
    }
    Arc::new(FilteredCollection::new(collection, filter))
}

/// Turns a cursor into a standard iterator. Dropping the iterator closes
/// the cursor.
pub fn into_records<'a>(
    mut cursor: BoxFeatureIterator<'a>,
) -> impl Iterator<Item = Result<Record>> + 'a {
    std::iter::from_fn(move || cursor.next_entry())
}

/// Reads every record of `collection`, stopping at the first error.
///
/// The cursor is closed on every exit path.
///
/// # Errors
///
/// Returns the first error raised while opening the cursor or producing a record.
pub fn collect_features(collection: &dyn FeatureCollection) -> Result<Vec<Record>> {
    into_records(collection.features()?).collect()
}

/// Cursor over an exhausted or empty sequence.
#[derive(Debug, Default)]
pub struct EmptyIterator;

impl FeatureIterator for EmptyIterator {
    fn has_next(&mut self) -> bool {
        false
    }

    fn next_feature(&mut self) -> Result<Record> {
        Err(IterationError::NoSuchElement.into())
    }

    fn close(&mut self) {}
}
