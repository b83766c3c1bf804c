//! Feature schemas and schema derivation.
//!
//! A [`Schema`] is a type name plus an ordered list of named, typed
//! attributes. The first geometry-typed attribute is the schema's primary
//! geometry; its index is resolved once when the schema is built so records
//! never have to probe their values to find it.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::SchemaError;

/// Declared geometry type of a geometry attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryType {
    /// Any geometry
    Geometry,
    /// Single point
    Point,
    /// Single line
    LineString,
    /// Single polygon
    Polygon,
    /// Collection of points
    MultiPoint,
    /// Collection of lines
    MultiLineString,
    /// Collection of polygons
    MultiPolygon,
    /// Heterogeneous collection
    GeometryCollection,
}

impl GeometryType {
    /// Returns the name of this geometry type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryType::Geometry => "Geometry",
            GeometryType::Point => "Point",
            GeometryType::LineString => "LineString",
            GeometryType::Polygon => "Polygon",
            GeometryType::MultiPoint => "MultiPoint",
            GeometryType::MultiLineString => "MultiLineString",
            GeometryType::MultiPolygon => "MultiPolygon",
            GeometryType::GeometryCollection => "GeometryCollection",
        }
    }

    /// Maps a concrete geometry value to its declared type.
    #[must_use]
    pub fn of(geometry: &geo::Geometry<f64>) -> Self {
        use geo::Geometry as G;
        match geometry {
            G::Point(_) => GeometryType::Point,
            G::Line(_) | G::LineString(_) => GeometryType::LineString,
            G::Polygon(_) | G::Rect(_) | G::Triangle(_) => GeometryType::Polygon,
            G::MultiPoint(_) => GeometryType::MultiPoint,
            G::MultiLineString(_) => GeometryType::MultiLineString,
            G::MultiPolygon(_) => GeometryType::MultiPolygon,
            G::GeometryCollection(_) => GeometryType::GeometryCollection,
        }
    }
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    /// `true` / `false`
    Boolean,
    /// 64-bit signed integer
    Integer,
    /// 64-bit float
    Double,
    /// UTF-8 text
    String,
    /// Nested JSON (arrays and objects)
    Json,
    /// Geometry with a declared geometry type
    Geometry(GeometryType),
}

impl AttributeType {
    /// Returns `true` for geometry-typed attributes.
    #[must_use]
    pub fn is_geometry(&self) -> bool {
        matches!(self, AttributeType::Geometry(_))
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeType::Boolean => f.write_str("Boolean"),
            AttributeType::Integer => f.write_str("Integer"),
            AttributeType::Double => f.write_str("Double"),
            AttributeType::String => f.write_str("String"),
            AttributeType::Json => f.write_str("Json"),
            AttributeType::Geometry(g) => write!(f, "Geometry({g})"),
        }
    }
}

/// A named, typed attribute slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDescriptor {
    name: String,
    attribute_type: AttributeType,
}

impl AttributeDescriptor {
    /// Creates a new attribute descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, attribute_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attribute_type,
        }
    }

    /// Attribute name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared attribute type.
    #[must_use]
    pub fn attribute_type(&self) -> AttributeType {
        self.attribute_type
    }
}

/// Shared, immutable schema handle.
pub type SchemaRef = Arc<Schema>;

/// The attribute layout shared by every record of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    type_name: String,
    attributes: Vec<AttributeDescriptor>,
    geometry_index: Option<usize>,
}

impl Schema {
    /// Builds a schema, resolving the primary geometry index.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateAttribute`] if two attributes share a name.
    pub fn try_new(
        type_name: impl Into<String>,
        attributes: Vec<AttributeDescriptor>,
    ) -> Result<Self, SchemaError> {
        let type_name = type_name.into();
        let mut seen = HashSet::with_capacity(attributes.len());
        for attribute in &attributes {
            if !seen.insert(attribute.name()) {
                return Err(SchemaError::DuplicateAttribute {
                    type_name,
                    name: attribute.name().to_string(),
                });
            }
        }

        let geometry_index = attributes
            .iter()
            .position(|a| a.attribute_type().is_geometry());

        Ok(Self {
            type_name,
            attributes,
            geometry_index,
        })
    }

    /// Starts a [`SchemaBuilder`] for the given type name.
    #[must_use]
    pub fn builder(type_name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            type_name: type_name.into(),
            attributes: Vec::new(),
        }
    }

    /// Feature type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Attributes in declaration order.
    #[must_use]
    pub fn attributes(&self) -> &[AttributeDescriptor] {
        &self.attributes
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns `true` if the schema declares no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Attribute at `index`.
    #[must_use]
    pub fn attribute(&self, index: usize) -> Option<&AttributeDescriptor> {
        self.attributes.get(index)
    }

    /// Position of the attribute called `name`.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name() == name)
    }

    /// Index of the primary (first) geometry attribute.
    #[must_use]
    pub fn geometry_index(&self) -> Option<usize> {
        self.geometry_index
    }

    /// The primary geometry attribute.
    #[must_use]
    pub fn geometry_attribute(&self) -> Option<&AttributeDescriptor> {
        self.geometry_index.map(|i| &self.attributes[i])
    }

    /// Every geometry-typed attribute, in order.
    pub fn geometry_attributes(&self) -> impl Iterator<Item = &AttributeDescriptor> {
        self.attributes
            .iter()
            .filter(|a| a.attribute_type().is_geometry())
    }
}

/// Incremental [`Schema`] construction.
///
/// # Examples
///
/// ```
/// use spatialstats_core::schema::{AttributeType, GeometryType, Schema};
///
/// let schema = Schema::builder("parcels")
///     .attribute("id", AttributeType::String)
///     .geometry("geom", GeometryType::Polygon)
///     .build()
///     .unwrap();
/// assert_eq!(schema.geometry_index(), Some(1));
/// ```
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    type_name: String,
    attributes: Vec<AttributeDescriptor>,
}

impl SchemaBuilder {
    /// Appends an attribute.
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, attribute_type: AttributeType) -> Self {
        self.attributes
            .push(AttributeDescriptor::new(name, attribute_type));
        self
    }

    /// Appends a geometry attribute.
    #[must_use]
    pub fn geometry(self, name: impl Into<String>, geometry_type: GeometryType) -> Self {
        self.attribute(name, AttributeType::Geometry(geometry_type))
    }

    /// Finishes the schema.
    ///
    /// # Errors
    ///
    /// See [`Schema::try_new`].
    pub fn build(self) -> Result<Schema, SchemaError> {
        Schema::try_new(self.type_name, self.attributes)
    }
}

/// Derives a schema whose geometry attribute is declared as `target`.
///
/// The derived schema keeps the source type name, attribute names and
/// attribute order; only the geometry attribute's declared type changes.
///
/// # Errors
///
/// - [`SchemaError::NoGeometry`] if `source` has no geometry attribute.
/// - [`SchemaError::AmbiguousGeometry`] if it has more than one.
pub fn derive_schema(source: &Schema, target: GeometryType) -> Result<Schema, SchemaError> {
    let geometry_names: Vec<&str> = source.geometry_attributes().map(|a| a.name()).collect();
    let index = match (geometry_names.len(), source.geometry_index()) {
        (1, Some(index)) => index,
        (0, _) | (_, None) => {
            return Err(SchemaError::NoGeometry {
                type_name: source.type_name().to_string(),
            });
        },
        _ => {
            return Err(SchemaError::AmbiguousGeometry {
                type_name: source.type_name().to_string(),
                attributes: geometry_names.join(", "),
            });
        },
    };

    let mut attributes = source.attributes().to_vec();
    attributes[index].attribute_type = AttributeType::Geometry(target);

    Ok(Schema {
        type_name: source.type_name().to_string(),
        attributes,
        geometry_index: Some(index),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roads() -> Schema {
        Schema::builder("roads")
            .attribute("id", AttributeType::String)
            .attribute("lanes", AttributeType::Integer)
            .geometry("geom", GeometryType::LineString)
            .attribute("speed", AttributeType::Double)
            .build()
            .unwrap()
    }

    #[test]
    fn test_geometry_index_resolved_once() {
        let schema = roads();
        assert_eq!(schema.geometry_index(), Some(2));
        assert_eq!(schema.geometry_attribute().unwrap().name(), "geom");
        assert_eq!(schema.index_of("speed"), Some(3));
        assert_eq!(schema.index_of("missing"), None);
    }

    #[test]
    fn test_derive_keeps_shape() {
        let source = roads();
        let derived = derive_schema(&source, GeometryType::Polygon).unwrap();

        assert_eq!(derived.type_name(), source.type_name());
        assert_eq!(derived.len(), source.len());
        for (i, (a, b)) in source
            .attributes()
            .iter()
            .zip(derived.attributes())
            .enumerate()
        {
            assert_eq!(a.name(), b.name());
            if i == 2 {
                assert_eq!(
                    b.attribute_type(),
                    AttributeType::Geometry(GeometryType::Polygon)
                );
            } else {
                assert_eq!(a.attribute_type(), b.attribute_type());
            }
        }
        // Source is untouched
        assert_eq!(
            source.attribute(2).unwrap().attribute_type(),
            AttributeType::Geometry(GeometryType::LineString)
        );
    }

    #[test]
    fn test_derive_without_geometry_fails() {
        let schema = Schema::builder("table")
            .attribute("id", AttributeType::String)
            .build()
            .unwrap();
        assert_eq!(
            derive_schema(&schema, GeometryType::Polygon),
            Err(SchemaError::NoGeometry {
                type_name: "table".to_string()
            })
        );
    }

    #[test]
    fn test_derive_with_two_geometries_fails() {
        let schema = Schema::builder("links")
            .geometry("from_geom", GeometryType::Point)
            .geometry("to_geom", GeometryType::Point)
            .build()
            .unwrap();
        let err = derive_schema(&schema, GeometryType::Polygon).unwrap_err();
        assert_eq!(
            err,
            SchemaError::AmbiguousGeometry {
                type_name: "links".to_string(),
                attributes: "from_geom, to_geom".to_string(),
            }
        );
    }

    #[test]
    fn test_duplicate_attribute_rejected() {
        let err = Schema::builder("dup")
            .attribute("a", AttributeType::String)
            .attribute("a", AttributeType::Integer)
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateAttribute { name, .. } if name == "a"));
    }

    #[test]
    fn test_attribute_type_display() {
        assert_eq!(AttributeType::Double.to_string(), "Double");
        assert_eq!(
            AttributeType::Geometry(GeometryType::MultiPolygon).to_string(),
            "Geometry(MultiPolygon)"
        );
    }
}
