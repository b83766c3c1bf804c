//! `spatialstats-core` is the core library for the `spatialstats` project, providing
//! lazily transformed feature collections for spatial statistics processing.
//!
//! This crate includes:
//! - **Feature Model**: Schemas, records and the collection/cursor capabilities
//!   ([`schema`], [`record`], [`feature`], [`filter`], [`memory`]).
//! - **Streaming Transform**: A collection that rewrites each geometry to its
//!   minimum bounding rectangle on demand ([`transform`], [`geometry`]).
//! - **Process Registry**: Static descriptors of the statistics processes ([`processes`]).
//! - **Formats**: `GeoJSON` reading and writing ([`geojson`]) and the Rogerson's R
//!   result document ([`rogerson`]).
//! - **Operations**: File-level commands consumed by the CLI ([`operations`]).

pub mod error;
pub mod feature;
pub mod filter;
pub mod geojson;
pub mod geometry;
pub mod memory;
pub mod operations;
pub mod processes;
pub mod record;
pub mod rogerson;
pub mod schema;
pub mod transform;
pub mod types;
pub mod utils;

pub use error::{Result, SpatialStatsError};
pub use feature::{CollectionRef, FeatureCollection, FeatureIterator, collect_features};
pub use record::{Record, Value};
pub use schema::{Schema, SchemaRef};
pub use transform::StreamingCollection;
