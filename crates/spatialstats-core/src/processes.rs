//! Registry of spatial statistics process descriptors.
//!
//! Each [`ProcessDescriptor`] describes a named process: its title, its
//! ordered input parameters and its outputs. The registry is static; the
//! CLI lists and describes it, and lookups are case-insensitive.
//!
//! # Examples
//!
//! ```
//! use spatialstats_core::processes::{ParameterType, find_process};
//!
//! let delaunay = find_process("statistics:DelaunayTriangulation").expect("registered");
//! assert_eq!(delaunay.parameter_info()[0].key, "inputFeatures");
//! assert_eq!(delaunay.result_info()[0].parameter_type, ParameterType::FeatureCollection);
//! ```

use std::fmt;

use crate::error::{Result, process_not_found};

/// Namespace every registered process belongs to.
pub const NAMESPACE: &str = "statistics";

/// Value type accepted or produced by a process parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterType {
    /// A collection of features
    FeatureCollection,
    /// A single geometry
    Geometry,
    /// `true` / `false`
    Boolean,
    /// Whole number
    Integer,
    /// Floating point number
    Double,
    /// Free text, e.g. an attribute name
    String,
    /// A statistics result document
    StatisticsResult,
}

impl ParameterType {
    /// Returns the display name of this type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterType::FeatureCollection => "FeatureCollection",
            ParameterType::Geometry => "Geometry",
            ParameterType::Boolean => "Boolean",
            ParameterType::Integer => "Integer",
            ParameterType::Double => "Double",
            ParameterType::String => "String",
            ParameterType::StatisticsResult => "StatisticsResult",
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata key naming the feature geometry kinds an input accepts.
pub const FEATURE_TYPES: &str = "featureTypes";

/// One input or output of a process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter key, unique within its process
    pub key: &'static str,
    /// Accepted or produced value type
    pub parameter_type: ParameterType,
    /// Human-readable title
    pub title: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Whether a value must be supplied
    pub required: bool,
    /// Minimum number of values
    pub min_occurs: u32,
    /// Maximum number of values
    pub max_occurs: u32,
    /// Value used when none is supplied
    pub default_value: Option<&'static str>,
    /// Extra key/value hints, e.g. `featureTypes = Point`
    pub metadata: &'static [(&'static str, &'static str)],
}

impl Parameter {
    /// A required, single-valued parameter.
    #[must_use]
    pub const fn required(
        key: &'static str,
        parameter_type: ParameterType,
        title: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            parameter_type,
            title,
            description,
            required: true,
            min_occurs: 1,
            max_occurs: 1,
            default_value: None,
            metadata: &[],
        }
    }

    /// An optional, single-valued parameter.
    #[must_use]
    pub const fn optional(
        key: &'static str,
        parameter_type: ParameterType,
        title: &'static str,
        description: &'static str,
    ) -> Self {
        let mut parameter = Self::required(key, parameter_type, title, description);
        parameter.required = false;
        parameter.min_occurs = 0;
        parameter
    }

    /// Sets the default value.
    #[must_use]
    pub const fn with_default(mut self, value: &'static str) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Sets the metadata hints.
    #[must_use]
    pub const fn with_metadata(mut self, metadata: &'static [(&'static str, &'static str)]) -> Self {
        self.metadata = metadata;
        self
    }

    /// Looks up a metadata hint by key.
    #[must_use]
    pub fn metadata_value(&self, key: &str) -> Option<&'static str> {
        self.metadata
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    /// `min..max` occurrence range, e.g. `0..1`.
    #[must_use]
    pub fn occurs(&self) -> String {
        format!("{}..{}", self.min_occurs, self.max_occurs)
    }
}

/// Description of a registered process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessDescriptor {
    /// Namespace, always [`NAMESPACE`]
    pub namespace: &'static str,
    /// Process name
    pub name: &'static str,
    /// Human-readable title
    pub title: &'static str,
    /// Human-readable description
    pub description: &'static str,
    inputs: Vec<Parameter>,
    outputs: Vec<Parameter>,
}

impl ProcessDescriptor {
    /// Creates a descriptor in the [`NAMESPACE`] namespace.
    #[must_use]
    pub fn new(
        name: &'static str,
        title: &'static str,
        description: &'static str,
        inputs: Vec<Parameter>,
        outputs: Vec<Parameter>,
    ) -> Self {
        Self {
            namespace: NAMESPACE,
            name,
            title,
            description,
            inputs,
            outputs,
        }
    }

    /// Input parameters, in declaration order.
    #[must_use]
    pub fn parameter_info(&self) -> &[Parameter] {
        &self.inputs
    }

    /// Output parameters.
    #[must_use]
    pub fn result_info(&self) -> &[Parameter] {
        &self.outputs
    }

    /// Input parameter by key.
    #[must_use]
    pub fn input(&self, key: &str) -> Option<&Parameter> {
        self.inputs.iter().find(|p| p.key == key)
    }

    /// `namespace:name`, e.g. `statistics:DelaunayTriangulation`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}:{}", self.namespace, self.name)
    }
}

const INPUT_FEATURES: &str = "inputFeatures";
const RESULT: &str = "result";

/// Returns every registered process, in registration order.
///
/// # Examples
///
/// ```
/// use spatialstats_core::processes::get_processes;
///
/// for process in get_processes() {
///     println!("{}: {}", process.qualified_name(), process.title);
/// }
/// ```
#[must_use]
pub fn get_processes() -> Vec<ProcessDescriptor> {
    use ParameterType::{Boolean, Double, FeatureCollection, Geometry, StatisticsResult, String};

    vec![
        ProcessDescriptor::new(
            "DelaunayTriangulation",
            "Delaunay Triangulation",
            "Creates a triangulated irregular network of polygons from input point features.",
            vec![
                Parameter::required(
                    INPUT_FEATURES,
                    FeatureCollection,
                    "Input Features",
                    "Input point features to triangulate.",
                )
                .with_metadata(&[(FEATURE_TYPES, "Point")]),
                Parameter::optional(
                    "clipArea",
                    Geometry,
                    "Clip Area",
                    "Area the output triangles are clipped to.",
                ),
            ],
            vec![Parameter::required(
                RESULT,
                FeatureCollection,
                "Result",
                "Delaunay triangle polygons.",
            )],
        ),
        ProcessDescriptor::new(
            "FeatureToMinimumRectangle",
            "Feature To Minimum Rectangle",
            "Replaces each feature's geometry with its minimum-area bounding rectangle.",
            vec![
                Parameter::required(
                    INPUT_FEATURES,
                    FeatureCollection,
                    "Input Features",
                    "Input features of any geometry type.",
                ),
                Parameter::optional(
                    "singlePart",
                    Boolean,
                    "Single Part",
                    "Enclose all parts of a multi-part geometry in one rectangle.",
                )
                .with_default("false"),
            ],
            vec![Parameter::required(
                RESULT,
                FeatureCollection,
                "Result",
                "Features with rectangle polygons and their original attributes.",
            )],
        ),
        ProcessDescriptor::new(
            "GlobalRogersonsR",
            "Global Rogerson's R",
            "Measures global spatial clustering of a weighted attribute with Rogerson's R statistic.",
            vec![
                Parameter::required(
                    INPUT_FEATURES,
                    FeatureCollection,
                    "Input Features",
                    "Input features to analyze.",
                ),
                Parameter::required(
                    "inputField",
                    String,
                    "Input Field",
                    "Numeric attribute used as the weight.",
                ),
                Parameter::optional(
                    "searchDistance",
                    Double,
                    "Search Distance",
                    "Distance band; derived from the data when omitted.",
                ),
            ],
            vec![Parameter::required(
                RESULT,
                StatisticsResult,
                "Result",
                "Observed and expected index, variance, z-score and p-value.",
            )],
        ),
    ]
}

/// Finds a process by name (case-insensitive).
///
/// Accepts the bare name or the qualified `statistics:Name` form.
///
/// # Examples
///
/// ```
/// use spatialstats_core::processes::find_process;
///
/// let process = find_process("featuretominimumrectangle").expect("registered");
/// assert_eq!(process.name, "FeatureToMinimumRectangle");
/// assert!(find_process("Buffer").is_none());
/// ```
#[must_use]
pub fn find_process(name: &str) -> Option<ProcessDescriptor> {
    let bare = match name.split_once(':') {
        Some((namespace, bare)) if namespace.eq_ignore_ascii_case(NAMESPACE) => bare,
        Some(_) => return None,
        None => name,
    };
    get_processes()
        .into_iter()
        .find(|p| p.name.eq_ignore_ascii_case(bare))
}

/// Like [`find_process`], but reports the available names when nothing matches.
///
/// # Errors
///
/// Returns a [`ProcessError::NotFound`](crate::error::ProcessError::NotFound)
/// listing every registered process.
pub fn require_process(name: &str) -> Result<ProcessDescriptor> {
    find_process(name).ok_or_else(|| process_not_found(name).into())
}

/// Returns all process names in alphabetical order.
#[must_use]
pub fn get_process_names() -> Vec<&'static str> {
    let mut names: Vec<_> = get_processes().iter().map(|p| p.name).collect();
    names.sort_unstable();
    names
}
