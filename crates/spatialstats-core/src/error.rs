//! Custom error types for `spatialstats` operations.
//!
//! Errors are grouped by the layer that raises them: schema construction,
//! the geometry operation collaborator, record iteration, file I/O, format
//! parsing, and the process registry. The root [`SpatialStatsError`] wraps
//! each group transparently so callers can match on the layer they care about.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for `spatialstats` operations.
#[derive(Debug, Error)]
pub enum SpatialStatsError {
    /// Schema construction or derivation errors
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The geometry operation rejected its input
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Cursor misuse (reading past the end, reading after close)
    #[error(transparent)]
    Iteration(#[from] IterationError),

    /// I/O errors (file read/write, path issues, permissions)
    #[error(transparent)]
    Io(#[from] IoError),

    /// Format parsing and encoding errors
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Process registry lookups
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Schema-related errors.
///
/// These are raised when a schema is built or derived, never in the middle of
/// a traversal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The schema has no geometry-typed attribute to rewrite
    #[error("Schema '{type_name}' has no geometry attribute")]
    NoGeometry {
        /// The feature type name
        type_name: String,
    },

    /// More than one geometry attribute; the target cannot be determined
    #[error("Schema '{type_name}' has more than one geometry attribute: {attributes}")]
    AmbiguousGeometry {
        /// The feature type name
        type_name: String,
        /// Comma-separated names of the geometry attributes
        attributes: String,
    },

    /// Two attributes share a name
    #[error("Schema '{type_name}' declares attribute '{name}' more than once")]
    DuplicateAttribute {
        /// The feature type name
        type_name: String,
        /// The repeated attribute name
        name: String,
    },

    /// A record was built with the wrong number of values
    #[error("Schema '{type_name}' expects {expected} values, got {found}")]
    AttributeCount {
        /// The feature type name
        type_name: String,
        /// Number of attributes in the schema
        expected: usize,
        /// Number of values supplied
        found: usize,
    },

    /// An attribute name was not found in the schema
    #[error("Schema '{type_name}' has no attribute named '{name}'")]
    UnknownAttribute {
        /// The feature type name
        type_name: String,
        /// The requested attribute name
        name: String,
    },
}

/// Errors returned by a geometry operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// The input geometry has no coordinates
    #[error("Cannot compute {operation} of an empty {geometry_type}")]
    Empty {
        /// The operation that was applied
        operation: &'static str,
        /// The geometry type of the rejected input
        geometry_type: &'static str,
    },

    /// The operation produced no result for the input
    #[error("{operation} is undefined for the supplied {geometry_type}")]
    Degenerate {
        /// The operation that was applied
        operation: &'static str,
        /// The geometry type of the rejected input
        geometry_type: &'static str,
    },
}

/// Cursor errors.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum IterationError {
    /// `next_feature` was called when `has_next` would return `false`
    #[error("No more features in the iteration")]
    NoSuchElement,
}

/// I/O related errors.
#[derive(Debug, Error)]
pub enum IoError {
    /// Failed to read from a file
    #[error("Failed to read {format} file '{path}': {source}")]
    Read {
        /// The format being read (e.g., "`GeoJSON`")
        format: String,
        /// The file path
        path: PathBuf,
        /// The underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to write to a file
    #[error("Failed to write {format} file '{path}': {source}")]
    Write {
        /// The format being written
        format: String,
        /// The file path
        path: PathBuf,
        /// The underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// File was not found
    #[error("File not found: '{path}'")]
    FileNotFound {
        /// The missing file path
        path: PathBuf,
    },
}

/// Format parsing and encoding errors.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Failed to parse a `GeoJSON` document
    #[error("Failed to parse GeoJSON{}: {message}", feature_id.as_ref().map(|id| format!(" (feature {id})")).unwrap_or_default())]
    GeoJson {
        /// Description of the parse error
        message: String,
        /// Optional feature ID where the error occurred
        feature_id: Option<String>,
    },

    /// Failed to encode or decode an XML document
    #[error("XML error in {element}: {message}")]
    Xml {
        /// The element being processed
        element: String,
        /// Description of the problem
        message: String,
    },

    /// Failed to serialize output
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Process registry errors.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Process was not found in the registry
    #[error("Process '{name}' not found. Available processes: {available}")]
    NotFound {
        /// The requested process name
        name: String,
        /// Comma-separated list of available processes
        available: String,
    },
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid option value
    #[error("Invalid {option} option: {message}")]
    InvalidOption {
        /// The option name
        option: String,
        /// Why it's invalid
        message: String,
    },

    /// Options conflict with each other
    #[error("Conflicting options: {options}")]
    ConflictingOptions {
        /// Description of the conflicting options
        options: String,
    },
}

/// Type alias for Results using `SpatialStatsError`.
pub type Result<T> = std::result::Result<T, SpatialStatsError>;

impl SpatialStatsError {
    /// Get a user-friendly error message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Schema(e) => format!("Schema error: {e}"),
            Self::Geometry(e) => format!("Geometry error: {e}"),
            Self::Iteration(e) => format!("Iteration error: {e}"),
            Self::Io(e) => e.user_message(),
            Self::Format(e) => format!("Format error: {e}"),
            Self::Process(e) => e.user_message(),
            Self::Config(e) => format!("Configuration error: {e}"),
        }
    }

    /// Get recovery suggestions if available.
    #[must_use]
    pub fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::Schema(SchemaError::NoGeometry { .. }) => {
                Some("The input must contain exactly one geometry attribute.".to_string())
            },
            Self::Geometry(_) => {
                Some("Validate geometries using a GIS tool before processing.".to_string())
            },
            Self::Io(e) => e.recovery_suggestion(),
            Self::Process(ProcessError::NotFound { .. }) => {
                Some("Run 'spatialstats processes' to see all available processes.".to_string())
            },
            _ => None,
        }
    }

    /// Check if this error is potentially recoverable.
    ///
    /// A geometry error only affects the record that triggered it, so a caller
    /// may keep pulling records after one.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Geometry(_) | Self::Config(_))
    }
}

impl IoError {
    fn user_message(&self) -> String {
        match self {
            Self::Read { format, path, .. } => {
                format!("Failed to read {} file: {}", format, path.display())
            },
            Self::Write { format, path, .. } => {
                format!("Failed to write {} file: {}", format, path.display())
            },
            Self::FileNotFound { path } => {
                format!("File not found: {}", path.display())
            },
        }
    }

    fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::FileNotFound { .. } => {
                Some("Check that the file path is correct and the file exists.".to_string())
            },
            _ => None,
        }
    }
}

impl ProcessError {
    fn user_message(&self) -> String {
        match self {
            Self::NotFound { name, available } => {
                format!(
                    "Process '{name}' not found.\n\nAvailable processes:\n{}",
                    available
                        .split(", ")
                        .map(|d| format!("  - {d}"))
                        .collect::<Vec<_>>()
                        .join("\n")
                )
            },
        }
    }
}

/// Extension trait for adding I/O context to errors.
pub trait IoErrorExt<T> {
    /// Add read context to an error.
    ///
    /// # Errors
    ///
    /// Returns an [`IoError::Read`] if the underlying operation fails.
    fn with_read_context(self, format: &str, path: impl Into<PathBuf>) -> Result<T>;

    /// Add write context to an error.
    ///
    /// # Errors
    ///
    /// Returns an [`IoError::Write`] if the underlying operation fails.
    fn with_write_context(self, format: &str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T, E> IoErrorExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_read_context(self, format: &str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| {
            SpatialStatsError::Io(IoError::Read {
                format: format.to_string(),
                path: path.into(),
                source: Box::new(e),
            })
        })
    }

    fn with_write_context(self, format: &str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| {
            SpatialStatsError::Io(IoError::Write {
                format: format.to_string(),
                path: path.into(),
                source: Box::new(e),
            })
        })
    }
}

/// Helper to create `ProcessError::NotFound` with the registered process names.
#[must_use]
pub fn process_not_found(name: &str) -> ProcessError {
    use crate::processes::get_process_names;

    let available = get_process_names().join(", ");
    ProcessError::NotFound {
        name: name.to_string(),
        available,
    }
}
