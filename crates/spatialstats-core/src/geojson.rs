//! `GeoJSON` reading and writing.
//!
//! Reading materializes a document into a [`MemoryCollection`] with an
//! inferred schema. Writing streams any [`FeatureCollection`] through its
//! cursor, one feature at a time.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use geo::Geometry;
use geojson::feature::Id;
use geojson::{Feature, GeoJson, JsonObject, JsonValue};
use log::{debug, info};
use tempfile::NamedTempFile;

use crate::error::{FormatError, IoError, IoErrorExt, Result, SpatialStatsError};
use crate::feature::{FeatureCollection, FeatureIterator};
use crate::memory::MemoryCollection;
use crate::record::{Record, Value};
use crate::schema::{AttributeDescriptor, AttributeType, GeometryType, Schema};

/// Name of the geometry attribute in schemas inferred from `GeoJSON`.
pub const GEOMETRY_ATTRIBUTE: &str = "geometry";

const FORMAT: &str = "GeoJSON";

/// Target name reported for write failures on a caller-supplied writer.
const STREAM_TARGET: &str = "<stream>";

/// Options for `GeoJSON` writing
#[derive(Debug, Clone)]
pub struct GeoJsonWriterOptions {
    /// Indent output (default: false)
    pub pretty_print: bool,
    /// Wrap features in a `FeatureCollection` (default: true); otherwise
    /// write one feature per line
    pub feature_collection: bool,
}

impl Default for GeoJsonWriterOptions {
    fn default() -> Self {
        Self {
            pretty_print: false,
            feature_collection: true,
        }
    }
}

impl GeoJsonWriterOptions {
    /// Create new writer options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to indent output
    #[must_use]
    pub fn with_pretty_print(mut self, pretty_print: bool) -> Self {
        self.pretty_print = pretty_print;
        self
    }

    /// Set whether to wrap features in a `FeatureCollection`
    #[must_use]
    pub fn with_feature_collection(mut self, feature_collection: bool) -> Self {
        self.feature_collection = feature_collection;
        self
    }
}

/// A feature as read from the document, before schema inference.
struct ParsedFeature {
    id: Option<String>,
    properties: JsonObject,
    geometry: Option<Geometry<f64>>,
}

fn parse_error(message: impl Into<String>, feature_id: Option<String>) -> SpatialStatsError {
    FormatError::GeoJson {
        message: message.into(),
        feature_id,
    }
    .into()
}


/// Reads a `GeoJSON` file. The file stem becomes the schema's type name.
///
/// # Errors
///
/// Returns an [`IoError`] if the file cannot be read and a [`FormatError`]
/// if it is not valid `GeoJSON`.
pub fn read_geojson(path: impl AsRef<Path>) -> Result<MemoryCollection> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        }
        .into());
    }
    let bytes = std::fs::read(path).with_read_context(FORMAT, path)?;
    let type_name = path
        .file_stem()
        .map_or_else(|| "features".to_string(), |s| s.to_string_lossy().into_owned());

    let collection = parse_geojson(&bytes, &type_name)?;
    info!(
        "Read {} feature(s) from {}",
        collection.len(),
        path.display()
    );
    Ok(collection)
}

/// Parses a `GeoJSON` document (a `FeatureCollection`, a `Feature`, a bare
/// geometry, or newline-delimited features) into a [`MemoryCollection`].
///
/// The inferred schema starts with a `geometry` attribute followed by every
/// property in first-seen order. A property seen with both integer and
/// floating point values becomes `Double`; any other mix becomes `Json`;
/// a property that is always `null` becomes `String`. Features without an
/// `id` are named `{type_name}.{n}`, counting from 1.
///
/// # Errors
///
/// Returns a [`FormatError::GeoJson`] if the document cannot be parsed, or a
/// [`SchemaError`](crate::error::SchemaError) if a property is named `geometry`.
pub fn parse_geojson(bytes: &[u8], type_name: &str) -> Result<MemoryCollection> {
    let features = match GeoJson::from_reader(bytes) {
        Ok(geojson) => geojson_to_features(geojson)?,
        Err(primary) => parse_geojson_sequence(bytes).map_err(|sequence| {
            parse_error(
                format!("{primary}; as a GeoJSON sequence: {sequence}"),
                None,
            )
        })?,
    };
    build_collection(features, type_name)
}

fn geojson_to_features(geojson: GeoJson) -> Result<Vec<ParsedFeature>> {
    match geojson {
        GeoJson::FeatureCollection(collection) => collection
            .features
            .into_iter()
            .map(convert_feature)
            .collect(),
        GeoJson::Feature(feature) => Ok(vec![convert_feature(feature)?]),
        GeoJson::Geometry(geometry) => Ok(vec![ParsedFeature {
            id: None,
            properties: JsonObject::new(),
            geometry: Some(convert_geometry(geometry, None)?),
        }]),
    }
}

fn parse_geojson_sequence(bytes: &[u8]) -> Result<Vec<ParsedFeature>> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| parse_error(format!("not valid UTF-8: {e}"), None))?;

    let mut features = Vec::new();
    for (line_idx, line) in text.lines().enumerate() {
        let line = line.trim().trim_start_matches('\u{1e}');
        if line.is_empty() {
            continue;
        }
        let geojson = line
            .parse::<GeoJson>()
            .map_err(|e| parse_error(format!("line {}: {e}", line_idx + 1), None))?;
        features.extend(geojson_to_features(geojson)?);
    }
    if features.is_empty() {
        return Err(parse_error("no features found", None));
    }
    Ok(features)
}

fn convert_feature(feature: Feature) -> Result<ParsedFeature> {
    let id = feature.id.map(|id| match id {
        Id::String(s) => s,
        Id::Number(n) => n.to_string(),
    });
    let geometry = match feature.geometry {
        Some(geometry) => Some(convert_geometry(geometry, id.clone())?),
        None => None,
    };
    Ok(ParsedFeature {
        id,
        properties: feature.properties.unwrap_or_default(),
        geometry,
    })
}

fn convert_geometry(
    geometry: geojson::Geometry,
    feature_id: Option<String>,
) -> Result<Geometry<f64>> {
    Geometry::<f64>::try_from(geometry)
        .map_err(|e| parse_error(format!("Failed to convert geometry: {e}"), feature_id))
}

/// Attribute type observed for a single JSON value, `None` for `null`.
fn json_type(value: &JsonValue) -> Option<AttributeType> {
    match value {
        JsonValue::Null => None,
        JsonValue::Bool(_) => Some(AttributeType::Boolean),
        JsonValue::Number(n) if n.is_i64() => Some(AttributeType::Integer),
        JsonValue::Number(_) => Some(AttributeType::Double),
        JsonValue::String(_) => Some(AttributeType::String),
        JsonValue::Array(_) | JsonValue::Object(_) => Some(AttributeType::Json),
    }
}

fn widen(current: Option<AttributeType>, observed: Option<AttributeType>) -> Option<AttributeType> {
    use AttributeType::{Double, Integer, Json};

    match (current, observed) {
        (None, t) | (t, None) => t,
        (Some(a), Some(b)) if a == b => Some(a),
        (Some(Integer), Some(Double)) | (Some(Double), Some(Integer)) => Some(Double),
        _ => Some(Json),
    }
}

fn geometry_type_of(features: &[ParsedFeature]) -> GeometryType {
    let mut kinds = features
        .iter()
        .filter_map(|f| f.geometry.as_ref())
        .map(GeometryType::of);
    match kinds.next() {
        Some(first) if kinds.all(|k| k == first) => first,
        _ => GeometryType::Geometry,
    }
}

fn json_to_value(value: &JsonValue, attribute_type: AttributeType) -> Value {
    match (attribute_type, value) {
        (_, JsonValue::Null) => Value::Null,
        (AttributeType::Boolean, JsonValue::Bool(b)) => Value::Boolean(*b),
        (AttributeType::Integer, JsonValue::Number(n)) => {
            n.as_i64().map_or_else(|| Value::Json(value.clone()), Value::Integer)
        },
        (AttributeType::Double, JsonValue::Number(n)) => {
            n.as_f64().map_or_else(|| Value::Json(value.clone()), Value::Double)
        },
        (AttributeType::String, JsonValue::String(s)) => Value::String(s.clone()),
        _ => Value::Json(value.clone()),
    }
}

fn build_collection(features: Vec<ParsedFeature>, type_name: &str) -> Result<MemoryCollection> {
    let mut names: Vec<String> = Vec::new();
    let mut types: Vec<Option<AttributeType>> = Vec::new();
    for feature in &features {
        for (key, value) in &feature.properties {
            let observed = json_type(value);
            match names.iter().position(|n| n == key) {
                Some(i) => types[i] = widen(types[i], observed),
                None => {
                    names.push(key.clone());
                    types.push(observed);
                },
            }
        }
    }

    let mut attributes = Vec::with_capacity(names.len() + 1);
    attributes.push(AttributeDescriptor::new(
        GEOMETRY_ATTRIBUTE,
        AttributeType::Geometry(geometry_type_of(&features)),
    ));
    attributes.extend(
        names
            .iter()
            .zip(&types)
            .map(|(name, t)| AttributeDescriptor::new(name, t.unwrap_or(AttributeType::String))),
    );
    let schema = Arc::new(Schema::try_new(type_name, attributes)?);
    debug!("Inferred GeoJSON schema for '{type_name}': {} attribute(s)", schema.len());

    let records = features
        .into_iter()
        .enumerate()
        .map(|(n, feature)| {
            let mut values = Vec::with_capacity(schema.len());
            values.push(feature.geometry.map_or(Value::Null, Value::Geometry));
            for attribute in &schema.attributes()[1..] {
                let value = feature
                    .properties
                    .get(attribute.name())
                    .map_or(Value::Null, |v| json_to_value(v, attribute.attribute_type()));
                values.push(value);
            }
            let id = feature
                .id
                .unwrap_or_else(|| format!("{type_name}.{}", n + 1));
            Record::try_new(Arc::clone(&schema), id, values).map_err(SpatialStatsError::from)
        })
        .collect::<Result<Vec<_>>>()?;

    MemoryCollection::try_new(schema, records)
}

fn geometry_to_json(geometry: &Geometry<f64>) -> Result<JsonValue> {
    let geometry = geojson::Geometry::new(geojson::Value::from(geometry));
    serde_json::to_value(geometry).map_err(|e| FormatError::from(e).into())
}

fn value_to_json(value: &Value) -> Result<JsonValue> {
    Ok(match value {
        Value::Null => JsonValue::Null,
        Value::Boolean(b) => JsonValue::Bool(*b),
        Value::Integer(i) => JsonValue::from(*i),
        Value::Double(d) => serde_json::Number::from_f64(*d).map_or(JsonValue::Null, JsonValue::Number),
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Json(json) => json.clone(),
        Value::Geometry(geometry) => geometry_to_json(geometry)?,
    })
}

/// Converts a record to a `GeoJSON` feature: the primary geometry becomes
/// the feature geometry, every other attribute a property.
///
/// Two conversions are lossy. Record ids are strings, so a numeric id read
/// from `GeoJSON` (`"id": 7`) is written back as `"7"`. JSON has no
/// non-finite numbers, so a NaN or infinite double is written as `null`.
///
/// # Errors
///
/// Returns a [`FormatError::Json`] if a secondary geometry cannot be serialized.
pub fn record_to_feature(record: &Record) -> Result<Feature> {
    let schema = record.schema();
    let geometry_index = schema.geometry_index();

    let mut properties = JsonObject::new();
    for (i, (attribute, value)) in schema.attributes().iter().zip(record.values()).enumerate() {
        if Some(i) == geometry_index {
            continue;
        }
        properties.insert(attribute.name().to_string(), value_to_json(value)?);
    }

    Ok(Feature {
        bbox: None,
        geometry: record
            .geometry()
            .map(|g| geojson::Geometry::new(geojson::Value::from(g))),
        id: Some(Id::String(record.id().to_string())),
        properties: Some(properties),
        foreign_members: None,
    })
}

fn write_feature<W: Write>(writer: &mut W, feature: &Feature, pretty: bool) -> Result<()> {
    let written = if pretty {
        serde_json::to_writer_pretty(&mut *writer, feature)
    } else {
        serde_json::to_writer(&mut *writer, feature)
    };
    written.map_err(|e| FormatError::from(e).into())
}

/// Streams every feature of `collection` to `writer`.
///
/// Returns the number of features written. The collection's cursor is closed
/// before returning, whether or not writing succeeded.
///
/// # Errors
///
/// Returns the first error raised while reading a record or writing output.
pub fn write_geojson<W: Write>(
    writer: &mut W,
    collection: &dyn FeatureCollection,
    options: &GeoJsonWriterOptions,
) -> Result<usize> {
    write_to(writer, collection, options, Path::new(STREAM_TARGET))
}

fn write_to<W: Write>(
    writer: &mut W,
    collection: &dyn FeatureCollection,
    options: &GeoJsonWriterOptions,
    target: &Path,
) -> Result<usize> {
    let mut cursor = collection.features()?;
    let result = write_features(writer, cursor.as_mut(), options, target);
    cursor.close();
    result
}

fn write_features<W: Write>(
    writer: &mut W,
    cursor: &mut dyn FeatureIterator,
    options: &GeoJsonWriterOptions,
    target: &Path,
) -> Result<usize> {
    let separator: &[u8] = match (options.feature_collection, options.pretty_print) {
        (true, true) => b",\n",
        (true, false) => b",",
        (false, _) => b"\n",
    };

    if options.feature_collection {
        writer
            .write_all(br#"{"type":"FeatureCollection","features":["#)
            .with_write_context(FORMAT, target)?;
        if options.pretty_print {
            writer.write_all(b"\n").with_write_context(FORMAT, target)?;
        }
    }

    let mut written = 0;
    while let Some(record) = cursor.next_entry() {
        let feature = record_to_feature(&record?)?;
        if written > 0 && options.feature_collection {
            writer.write_all(separator).with_write_context(FORMAT, target)?;
        }
        write_feature(writer, &feature, options.pretty_print)?;
        if !options.feature_collection {
            writer.write_all(separator).with_write_context(FORMAT, target)?;
        }
        written += 1;
    }

    if options.feature_collection {
        if options.pretty_print {
            writer.write_all(b"\n").with_write_context(FORMAT, target)?;
        }
        writer.write_all(b"]}\n").with_write_context(FORMAT, target)?;
    }
    writer.flush().with_write_context(FORMAT, target)?;
    Ok(written)
}

/// Writes `collection` to a new `GeoJSON` file at `path`.
///
/// Features are written to a temporary file next to `path`, which replaces
/// `path` only once every feature has been written. On error nothing is
/// left at `path`.
///
/// # Errors
///
/// Returns an [`IoError::Write`] if the file cannot be created or written,
/// otherwise see [`write_geojson`].
pub fn write_geojson_file(
    path: impl AsRef<Path>,
    collection: &dyn FeatureCollection,
    options: &GeoJsonWriterOptions,
) -> Result<usize> {
    let path = path.as_ref();
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut staged = NamedTempFile::new_in(dir).with_write_context(FORMAT, path)?;

    let written = {
        let mut writer = BufWriter::new(&mut staged);
        write_to(&mut writer, collection, options, path)?
    };
    staged.persist(path).with_write_context(FORMAT, path)?;

    info!("Wrote {written} feature(s) to {}", path.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use geo::point;

    use super::*;
    use crate::error::SchemaError;
    use crate::feature::collect_features;

    const PARCELS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": "p-1",
                "geometry": {"type": "Polygon", "coordinates": [[[0,0],[4,0],[0,3],[0,0]]]},
                "properties": {"name": "north", "area": 6, "tags": ["a"]}
            },
            {
                "type": "Feature",
                "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]},
                "properties": {"name": "south", "area": 1.5, "tags": "b", "owner": null}
            },
            {
                "type": "Feature",
                "id": 7,
                "geometry": null,
                "properties": {"area": 2}
            }
        ]
    }"#;

    fn attribute_types(collection: &MemoryCollection) -> Vec<(String, AttributeType)> {
        collection
            .schema()
            .attributes()
            .iter()
            .map(|a| (a.name().to_string(), a.attribute_type()))
            .collect()
    }

    #[test]
    fn test_schema_inference() {
        let collection = parse_geojson(PARCELS.as_bytes(), "parcels").unwrap();
        assert_eq!(collection.schema().type_name(), "parcels");
        assert_eq!(
            attribute_types(&collection),
            vec![
                (
                    "geometry".to_string(),
                    AttributeType::Geometry(GeometryType::Polygon)
                ),
                ("name".to_string(), AttributeType::String),
                ("area".to_string(), AttributeType::Double),
                ("tags".to_string(), AttributeType::Json),
                ("owner".to_string(), AttributeType::String),
            ]
        );
        assert_eq!(collection.schema().geometry_index(), Some(0));
    }

    #[test]
    fn test_ids_and_values() {
        let collection = parse_geojson(PARCELS.as_bytes(), "parcels").unwrap();
        let records = collection.records();
        let ids: Vec<_> = records.iter().map(Record::id).collect();
        assert_eq!(ids, vec!["p-1", "parcels.2", "7"]);

        assert_eq!(records[0].get("area").unwrap(), &Value::Double(6.0));
        assert_eq!(
            records[0].get("tags").unwrap(),
            &Value::Json(serde_json::json!(["a"]))
        );
        assert_eq!(
            records[1].get("tags").unwrap(),
            &Value::Json(serde_json::json!("b"))
        );
        assert_eq!(records[1].get("owner").unwrap(), &Value::Null);
        assert_eq!(records[2].get("name").unwrap(), &Value::Null);
        assert!(records[2].geometry().is_none());
    }

    #[test]
    fn test_mixed_geometry_types() {
        let doc = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [1, 2]}, "properties": {}},
            {"type": "Feature", "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]}, "properties": {}}
        ]}"#;
        let collection = parse_geojson(doc.as_bytes(), "mixed").unwrap();
        assert_eq!(
            collection.schema().attribute(0).unwrap().attribute_type(),
            AttributeType::Geometry(GeometryType::Geometry)
        );
    }

    #[test]
    fn test_single_feature_and_bare_geometry() {
        let feature = r#"{"type": "Feature", "geometry": {"type": "Point", "coordinates": [1, 2]}, "properties": {"n": 1}}"#;
        let collection = parse_geojson(feature.as_bytes(), "one").unwrap();
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.records()[0].id(), "one.1");
        assert_eq!(
            collection.records()[0].get("n").unwrap(),
            &Value::Integer(1)
        );

        let geometry = r#"{"type": "Point", "coordinates": [1, 2]}"#;
        let collection = parse_geojson(geometry.as_bytes(), "bare").unwrap();
        assert_eq!(collection.schema().len(), 1);
        assert_eq!(
            collection.records()[0].geometry(),
            Some(&Geometry::Point(point!(x: 1.0, y: 2.0)))
        );
    }

    #[test]
    fn test_geojson_sequence() {
        let seq = concat!(
            r#"{"type": "Feature", "geometry": {"type": "Point", "coordinates": [0, 0]}, "properties": {"k": "a"}}"#,
            "\n\n",
            r#"{"type": "Feature", "geometry": {"type": "Point", "coordinates": [1, 1]}, "properties": {"k": "b"}}"#,
            "\n"
        );
        let collection = parse_geojson(seq.as_bytes(), "seq").unwrap();
        assert_eq!(collection.len(), 2);
        assert_eq!(
            collection.records()[1].get("k").unwrap(),
            &Value::from("b")
        );
    }

    #[test]
    fn test_invalid_document() {
        let err = parse_geojson(b"{not json", "bad").unwrap_err();
        assert!(matches!(
            err,
            SpatialStatsError::Format(FormatError::GeoJson { .. })
        ));
    }

    #[test]
    fn test_property_named_geometry_rejected() {
        let doc = r#"{"type": "Feature", "geometry": null, "properties": {"geometry": 1}}"#;
        let err = parse_geojson(doc.as_bytes(), "clash").unwrap_err();
        assert!(matches!(
            err,
            SpatialStatsError::Schema(SchemaError::DuplicateAttribute { .. })
        ));
    }

    #[test]
    fn test_write_feature_collection() {
        let collection = parse_geojson(PARCELS.as_bytes(), "parcels").unwrap();
        let mut out = Vec::new();
        let written =
            write_geojson(&mut out, &collection, &GeoJsonWriterOptions::default()).unwrap();
        assert_eq!(written, 3);

        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        let features = json["features"].as_array().unwrap();
        assert_eq!(features.len(), 3);
        assert_eq!(features[0]["id"], "p-1");
        assert_eq!(features[0]["geometry"]["type"], "Polygon");
        assert_eq!(features[0]["properties"]["name"], "north");
        assert_eq!(features[0]["properties"]["area"], 6.0);
        assert!(features[0]["properties"].get("geometry").is_none());
        assert_eq!(features[2]["id"], "7");
        assert!(features[2]["geometry"].is_null());

        let keys: Vec<_> = features[1]["properties"]
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(keys, vec!["name", "area", "tags", "owner"]);
    }

    #[test]
    fn test_lossy_value_conversions() {
        let schema = Arc::new(
            Schema::builder("readings")
                .geometry(GEOMETRY_ATTRIBUTE, GeometryType::Point)
                .attribute("level", AttributeType::Double)
                .build()
                .unwrap(),
        );
        let record = Record::try_new(
            Arc::clone(&schema),
            "7",
            vec![
                Value::Geometry(Geometry::Point(point!(x: 1.0, y: 2.0))),
                Value::Double(f64::NAN),
            ],
        )
        .unwrap();

        let feature = record_to_feature(&record).unwrap();
        assert_eq!(feature.id, Some(Id::String("7".to_string())));
        assert_eq!(feature.properties.unwrap()["level"], JsonValue::Null);
    }

    /// Writer that accepts a fixed number of bytes, then fails.
    struct ShortWriter {
        remaining: usize,
    }

    impl Write for ShortWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.remaining == 0 {
                return Err(std::io::Error::new(std::io::ErrorKind::StorageFull, "disk full"));
            }
            let n = buf.len().min(self.remaining);
            self.remaining -= n;
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_is_io_error() {
        let collection = parse_geojson(PARCELS.as_bytes(), "parcels").unwrap();
        let mut writer = ShortWriter { remaining: 0 };
        let err = write_geojson(&mut writer, &collection, &GeoJsonWriterOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            SpatialStatsError::Io(IoError::Write { ref format, .. }) if format == "GeoJSON"
        ));
        assert!(err.user_message().starts_with("Failed to write GeoJSON file"));
    }

    #[test]
    fn test_failed_file_write_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let doc = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "id": "ok", "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}, "properties": {}},
            {"type": "Feature", "id": "empty", "geometry": {"type": "MultiPolygon", "coordinates": []}, "properties": {}}
        ]}"#;
        let source = Arc::new(parse_geojson(doc.as_bytes(), "parcels").unwrap());
        let rectangles =
            crate::transform::StreamingCollection::minimum_rectangle(source, false).unwrap();

        let output = dir.path().join("out.geojson");
        let err = write_geojson_file(&output, &rectangles, &GeoJsonWriterOptions::default())
            .unwrap_err();
        assert!(matches!(err, SpatialStatsError::Geometry(_)));
        assert!(!output.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_file_write_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.geojson");
        std::fs::write(&output, "stale").unwrap();

        let collection = parse_geojson(PARCELS.as_bytes(), "parcels").unwrap();
        write_geojson_file(&output, &collection, &GeoJsonWriterOptions::default()).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(json["features"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_write_empty_collection() {
        let collection = parse_geojson(br#"{"type": "FeatureCollection", "features": []}"#, "e")
            .unwrap();
        let mut out = Vec::new();
        let written =
            write_geojson(&mut out, &collection, &GeoJsonWriterOptions::default()).unwrap();
        assert_eq!(written, 0);
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["features"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_write_pretty_and_sequence() {
        let collection = parse_geojson(PARCELS.as_bytes(), "parcels").unwrap();

        let mut pretty = Vec::new();
        write_geojson(
            &mut pretty,
            &collection,
            &GeoJsonWriterOptions::new().with_pretty_print(true),
        )
        .unwrap();
        let text = String::from_utf8(pretty).unwrap();
        assert!(text.contains("\n  \""));
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["features"].as_array().unwrap().len(), 3);

        let mut seq = Vec::new();
        write_geojson(
            &mut seq,
            &collection,
            &GeoJsonWriterOptions::new().with_feature_collection(false),
        )
        .unwrap();
        let text = String::from_utf8(seq).unwrap();
        assert_eq!(text.lines().count(), 3);
        for line in text.lines() {
            let feature: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(feature["type"], "Feature");
        }
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("parcels.geojson");
        std::fs::File::create(&input)
            .unwrap()
            .write_all(PARCELS.as_bytes())
            .unwrap();

        let collection = read_geojson(&input).unwrap();
        assert_eq!(collection.schema().type_name(), "parcels");

        let output = dir.path().join("copy.geojson");
        let written =
            write_geojson_file(&output, &collection, &GeoJsonWriterOptions::default()).unwrap();
        assert_eq!(written, 3);

        let copy = read_geojson(&output).unwrap();
        assert_eq!(copy.schema().type_name(), "copy");
        let records = collect_features(&copy).unwrap();
        let ids: Vec<_> = records.iter().map(Record::id).collect();
        assert_eq!(ids, vec!["p-1", "parcels.2", "7"]);
        assert_eq!(records[0].geometry(), collection.records()[0].geometry());
    }

    #[test]
    fn test_missing_file() {
        let err = read_geojson("/definitely/not/here.geojson").unwrap_err();
        assert!(matches!(
            err,
            SpatialStatsError::Io(IoError::FileNotFound { .. })
        ));
        assert!(err.recovery_suggestion().is_some());
    }
}
