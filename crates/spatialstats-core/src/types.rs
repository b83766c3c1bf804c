//! Data types reported by the `info` operation.
//!
//! This module defines the data structures used to represent dataset information,
//! geometry columns, and field schemas.

/// Information about a dataset.
#[derive(Debug, Clone)]
pub struct DatasetInfo {
    /// Path to the dataset
    pub dataset: String,
    /// Feature type name
    pub type_name: String,
    /// Number of features
    pub feature_count: usize,
    /// Geometry columns information
    pub geometry_columns: Vec<GeometryColumnInfo>,
    /// Schema fields
    pub fields: Vec<FieldInfo>,
}

/// Information about a geometry column.
#[derive(Debug, Clone)]
pub struct GeometryColumnInfo {
    /// Column name
    pub name: String,
    /// Declared geometry type
    pub geometry_type: String,
    /// Whether this is the primary geometry
    pub primary: bool,
}

/// Information about a field/column.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    /// Field name
    pub name: String,
    /// Data type
    pub data_type: String,
    /// Whether any feature has no value for the field
    pub nullable: bool,
}
