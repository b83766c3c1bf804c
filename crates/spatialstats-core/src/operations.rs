//! File-level operations behind the CLI commands.
//!
//! These wire the `GeoJSON` reader, the streaming transform and the `GeoJSON`
//! writer together. Every step logs at `info` level.

use std::path::Path;
use std::sync::Arc;

use log::info;

use crate::error::{ConfigError, Result};
use crate::feature::{CollectionRef, FeatureCollection};
use crate::filter::Filter;
use crate::geojson::{GeoJsonWriterOptions, read_geojson, write_geojson_file};
use crate::record::Value;
use crate::transform::StreamingCollection;
use crate::types::{DatasetInfo, FieldInfo, GeometryColumnInfo};

/// Options for [`minimum_rectangle`].
#[derive(Debug, Clone, Default)]
pub struct MinimumRectangleOptions {
    /// Enclose all parts of a multi-part geometry in one rectangle (default: false)
    pub single_part: bool,
    /// Only write the features with these ids (default: all)
    pub ids: Option<Vec<String>>,
    /// Output formatting
    pub writer: GeoJsonWriterOptions,
}

impl MinimumRectangleOptions {
    /// Create new options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set single-part mode
    #[must_use]
    pub fn with_single_part(mut self, single_part: bool) -> Self {
        self.single_part = single_part;
        self
    }

    /// Restrict output to the given feature ids
    #[must_use]
    pub fn with_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Set output formatting
    #[must_use]
    pub fn with_writer_options(mut self, writer: GeoJsonWriterOptions) -> Self {
        self.writer = writer;
        self
    }

    /// Checks the options for values that can never produce output.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] for an empty id list.
    pub fn validate(&self) -> Result<()> {
        if let Some(ids) = &self.ids
            && ids.is_empty()
        {
            return Err(ConfigError::InvalidOption {
                option: "ids".to_string(),
                message: "at least one feature id is required".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Writes the minimum bounding rectangle of every feature in `input` to
/// `output`, both `GeoJSON`.
///
/// Returns the number of features written. The output file is only
/// replaced once every feature has been written.
///
/// # Errors
///
/// This function will return an error if:
/// - The options are invalid or `input` and `output` are the same path.
/// - The input cannot be read or has no geometry.
/// - A feature's geometry has no minimum rectangle (e.g. it is empty).
/// - The output cannot be written.
pub fn minimum_rectangle(
    input: &Path,
    output: &Path,
    options: &MinimumRectangleOptions,
) -> Result<usize> {
    info!("Starting minimum rectangle:");
    info!("Input: {}", input.display());
    info!("Output: {}", output.display());

    options.validate()?;
    if input == output {
        return Err(ConfigError::ConflictingOptions {
            options: format!("input and output are both '{}'", input.display()),
        }
        .into());
    }

    let source = Arc::new(read_geojson(input)?);
    let rectangles: CollectionRef = Arc::new(StreamingCollection::minimum_rectangle(
        source,
        options.single_part,
    )?);
    let rectangles = match &options.ids {
        Some(ids) => {
            info!("Restricting output to {} feature id(s)", ids.len());
            rectangles.restrict(Filter::ids(ids.iter().cloned()))
        },
        None => rectangles,
    };

    let written = write_geojson_file(output, rectangles.as_ref(), &options.writer)?;
    info!("Minimum rectangle completed: {written} feature(s) written");
    Ok(written)
}

/// Summarizes a `GeoJSON` dataset: type name, feature count and schema.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn dataset_info(input: &Path) -> Result<DatasetInfo> {
    info!("Reading dataset info: {}", input.display());
    let collection = read_geojson(input)?;
    let schema = collection.schema();

    let mut geometry_columns = Vec::new();
    let mut fields = Vec::new();
    for (i, attribute) in schema.attributes().iter().enumerate() {
        let nullable = collection
            .records()
            .iter()
            .any(|r| matches!(r.value(i), None | Some(Value::Null)));
        if attribute.attribute_type().is_geometry() {
            geometry_columns.push(GeometryColumnInfo {
                name: attribute.name().to_string(),
                geometry_type: attribute.attribute_type().to_string(),
                primary: schema.geometry_index() == Some(i),
            });
        } else {
            fields.push(FieldInfo {
                name: attribute.name().to_string(),
                data_type: attribute.attribute_type().to_string(),
                nullable,
            });
        }
    }

    Ok(DatasetInfo {
        dataset: input.display().to_string(),
        type_name: schema.type_name().to_string(),
        feature_count: collection.len(),
        geometry_columns,
        fields,
    })
}
