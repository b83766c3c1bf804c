//! Lazy, schema-rewriting feature transformation.
//!
//! [`StreamingCollection`] wraps a source collection and exposes a derived
//! schema whose geometry attribute is declared as the operation's output
//! type. Nothing is computed up front: every cursor opened on it pulls one
//! source record at a time and rewrites its geometry on the way through.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use geo::{Geometry, polygon};
//! use spatialstats_core::feature::{FeatureCollection, collect_features};
//! use spatialstats_core::memory::MemoryCollection;
//! use spatialstats_core::record::{Record, Value};
//! use spatialstats_core::schema::{AttributeType, GeometryType, Schema};
//! use spatialstats_core::transform::StreamingCollection;
//!
//! let schema = Arc::new(
//!     Schema::builder("parcels")
//!         .attribute("id", AttributeType::String)
//!         .geometry("geom", GeometryType::Polygon)
//!         .build()?,
//! );
//! let triangle = polygon![(x: 0.0, y: 0.0), (x: 4.0, y: 0.0), (x: 0.0, y: 3.0)];
//! let record = Record::try_new(
//!     Arc::clone(&schema),
//!     "a",
//!     vec!["a".into(), Value::Geometry(Geometry::Polygon(triangle))],
//! )?;
//! let source = Arc::new(MemoryCollection::try_new(schema, vec![record])?);
//!
//! let rectangles = StreamingCollection::minimum_rectangle(source, false)?;
//! let records = collect_features(&rectangles)?;
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].id(), "a");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::sync::Arc;

use geo::Geometry;
use log::{debug, trace};

use crate::error::{GeometryError, IterationError, Result};
use crate::feature::{
    BoxFeatureIterator, CollectionRef, FeatureCollection, FeatureIterator, restrict_collection,
};
use crate::filter::Filter;
use crate::geometry::{GeometryOperation, MinimumRectangle};
use crate::record::{Record, Value};
use crate::schema::{SchemaRef, derive_schema};
use crate::utils::{GeometryExt, build_geometry};

/// A collection whose records are the source's records with their geometry
/// rewritten by a [`GeometryOperation`].
///
/// The derived schema is computed once at construction. The collection
/// holds no per-traversal state, so it can be shared across threads and
/// iterated any number of times.
pub struct StreamingCollection {
    source: CollectionRef,
    schema: SchemaRef,
    operation: Arc<dyn GeometryOperation>,
    single_part: bool,
}

impl StreamingCollection {
    /// Wraps `source`, rewriting geometries with `operation`.
    ///
    /// With `single_part == false`, multi-part geometries are rewritten part
    /// by part and recombined; otherwise each geometry is rewritten as a whole.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`](crate::error::SchemaError) if the source schema
    /// does not have exactly one geometry attribute.
    pub fn try_new(
        source: CollectionRef,
        operation: Arc<dyn GeometryOperation>,
        single_part: bool,
    ) -> Result<Self> {
        let source_schema = source.schema();
        let schema = derive_schema(&source_schema, operation.output_type())?;
        debug!(
            "Streaming {} over '{}': attribute '{}' declared as {} (single part: {single_part})",
            operation.name(),
            schema.type_name(),
            schema.geometry_attribute().map_or("", |a| a.name()),
            operation.output_type(),
        );

        Ok(Self {
            source,
            schema: Arc::new(schema),
            operation,
            single_part,
        })
    }

    /// Wraps `source`, rewriting every geometry to its minimum bounding rectangle.
    ///
    /// # Errors
    ///
    /// See [`StreamingCollection::try_new`].
    pub fn minimum_rectangle(source: CollectionRef, single_part: bool) -> Result<Self> {
        Self::try_new(source, Arc::new(MinimumRectangle), single_part)
    }

    /// Whether multi-part geometries are collapsed into one result.
    #[must_use]
    pub fn single_part(&self) -> bool {
        self.single_part
    }

    /// The wrapped source collection.
    #[must_use]
    pub fn source(&self) -> &CollectionRef {
        &self.source
    }

    /// Opens a typed cursor over a fresh traversal of the source.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot open a cursor.
    pub fn iter(&self) -> Result<RecordRewriter<'_>> {
        Ok(RecordRewriter {
            source: Some(self.source.features()?),
            schema: Arc::clone(&self.schema),
            operation: self.operation.as_ref(),
            single_part: self.single_part,
        })
    }
}

impl FeatureCollection for StreamingCollection {
    fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    fn features(&self) -> Result<BoxFeatureIterator<'_>> {
        Ok(Box::new(self.iter()?))
    }

    fn restrict(self: Arc<Self>, filter: Filter) -> CollectionRef {
        restrict_collection(self, filter)
    }
}

/// Single-pass cursor produced by [`StreamingCollection`].
///
/// Every geometry value of a pulled record is rewritten; all other values
/// pass through as supplied. Owns its source cursor; closing (or dropping)
/// the rewriter closes it.
pub struct RecordRewriter<'a> {
    source: Option<BoxFeatureIterator<'a>>,
    schema: SchemaRef,
    operation: &'a dyn GeometryOperation,
    single_part: bool,
}

impl RecordRewriter<'_> {
    fn rewrite(&self, geometry: &Geometry<f64>) -> std::result::Result<Geometry<f64>, GeometryError> {
        if !self.single_part && geometry.num_geometries() > 1 {
            let parts = geometry
                .parts()
                .iter()
                .map(|part| self.operation.apply(part))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(build_geometry(parts))
        } else {
            self.operation.apply(geometry)
        }
    }
}

impl FeatureIterator for RecordRewriter<'_> {
    fn has_next(&mut self) -> bool {
        self.source.as_mut().is_some_and(|s| s.has_next())
    }

    fn next_feature(&mut self) -> Result<Record> {
        let Some(source) = self.source.as_mut() else {
            return Err(IterationError::NoSuchElement.into());
        };
        if !source.has_next() {
            return Err(IterationError::NoSuchElement.into());
        }
        let (id, mut values) = source.next_feature()?.into_parts();

        for value in &mut values {
            if let Value::Geometry(geometry) = value {
                *geometry = self.rewrite(geometry)?;
            }
        }
        trace!("Rewrote feature {id}");

        Ok(Record::try_new(Arc::clone(&self.schema), id, values)?)
    }

    fn close(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.close();
        }
    }
}

impl Iterator for RecordRewriter<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry()
    }
}

impl Drop for RecordRewriter<'_> {
    fn drop(&mut self) {
        self.close();
    }
}
