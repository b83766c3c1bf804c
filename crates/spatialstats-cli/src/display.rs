//! Display utilities for formatting CLI output.
//!
//! This module provides table row structures and formatting functions
//! for presenting datasets, processes and statistics results in a
//! human-readable format.

use tabled::{Table, Tabled};

use spatialstats_core::processes::{Parameter, ProcessDescriptor};
use spatialstats_core::rogerson::RogersonRResult;
use spatialstats_core::types::DatasetInfo;

/// Table row representation for displaying geometry column information.
#[derive(Tabled)]
pub struct GeometryRow {
    /// Name of the geometry column.
    #[tabled(rename = "Column")]
    pub name: String,
    /// Declared geometry type.
    #[tabled(rename = "Type")]
    pub geometry_type: String,
    /// Whether the column is the primary geometry.
    #[tabled(rename = "Primary")]
    pub primary: String,
}

/// Table row representation for displaying field/column information.
#[derive(Tabled)]
pub struct FieldRow {
    /// Name of the field.
    #[tabled(rename = "Field")]
    pub name: String,
    /// Data type of the field.
    #[tabled(rename = "Type")]
    pub data_type: String,
    /// Whether the field can contain null values.
    #[tabled(rename = "Nullable")]
    pub nullable: String,
}

/// Table row representation for displaying process information.
#[derive(Tabled)]
pub struct ProcessRow {
    /// Qualified process name (e.g., `statistics:DelaunayTriangulation`).
    #[tabled(rename = "Name")]
    pub name: String,
    /// Human-readable title.
    #[tabled(rename = "Title")]
    pub title: String,
    /// Comma-separated input keys.
    #[tabled(rename = "Inputs")]
    pub inputs: String,
    /// Comma-separated output keys.
    #[tabled(rename = "Outputs")]
    pub outputs: String,
}

/// Table row representation for displaying a process parameter.
#[derive(Tabled)]
pub struct ParameterRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Type")]
    pub parameter_type: String,
    #[tabled(rename = "Required")]
    pub required: String,
    #[tabled(rename = "Occurs")]
    pub occurs: String,
    #[tabled(rename = "Default")]
    pub default_value: String,
    #[tabled(rename = "Description")]
    pub description: String,
}

/// Table row representation for one field of a statistics result.
#[derive(Tabled)]
pub struct StatisticRow {
    #[tabled(rename = "Field")]
    pub field: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

fn yes_no(flag: bool) -> String {
    if flag { "Yes" } else { "No" }.to_string()
}

fn keys(parameters: &[Parameter]) -> String {
    parameters
        .iter()
        .map(|p| p.key)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<&ProcessDescriptor> for ProcessRow {
    fn from(process: &ProcessDescriptor) -> Self {
        Self {
            name: process.qualified_name(),
            title: process.title.to_string(),
            inputs: keys(process.parameter_info()),
            outputs: keys(process.result_info()),
        }
    }
}

impl From<&Parameter> for ParameterRow {
    fn from(parameter: &Parameter) -> Self {
        let mut description = parameter.description.to_string();
        for (key, value) in parameter.metadata {
            description.push_str(&format!(" [{key}: {value}]"));
        }
        Self {
            key: parameter.key.to_string(),
            parameter_type: parameter.parameter_type.to_string(),
            required: yes_no(parameter.required),
            occurs: parameter.occurs(),
            default_value: parameter.default_value.unwrap_or("N/A").to_string(),
            description,
        }
    }
}

/// Display dataset information in a formatted table.
///
/// This function presents dataset metadata, geometry columns, and field schema
/// in a human-readable table format written to standard output.
///
/// # Arguments
///
/// * `info` - The dataset information to display
pub fn display_dataset_info(info: &DatasetInfo) {
    println!("\nDataset: {}", info.dataset);
    println!("Type name: {}", info.type_name);
    println!("Features: {}", info.feature_count);

    if !info.geometry_columns.is_empty() {
        println!("\n=== Geometry Columns ===");

        let geo_rows: Vec<GeometryRow> = info
            .geometry_columns
            .iter()
            .map(|g| GeometryRow {
                name: g.name.clone(),
                geometry_type: g.geometry_type.clone(),
                primary: yes_no(g.primary),
            })
            .collect();

        let geo_table = Table::new(geo_rows).to_string();
        println!("{geo_table}");
    }

    if !info.fields.is_empty() {
        println!("\n=== Fields ===");

        let field_rows: Vec<FieldRow> = info
            .fields
            .iter()
            .map(|f| FieldRow {
                name: f.name.clone(),
                data_type: f.data_type.clone(),
                nullable: yes_no(f.nullable),
            })
            .collect();

        let field_table = Table::new(field_rows).to_string();
        println!("{field_table}");
    }
}

/// Display the registered processes as one table.
pub fn display_processes(processes: &[ProcessDescriptor]) {
    println!("\nAvailable Processes ({} total):\n", processes.len());
    let rows: Vec<ProcessRow> = processes.iter().map(ProcessRow::from).collect();
    println!("{}", Table::new(rows));
}

/// Display one process with its inputs and outputs.
pub fn display_process(process: &ProcessDescriptor) {
    println!("\nProcess: {}", process.qualified_name());
    println!("Title: {}", process.title);
    println!("Description: {}", process.description);

    println!("\n=== Inputs ===");
    let inputs: Vec<ParameterRow> = process.parameter_info().iter().map(ParameterRow::from).collect();
    println!("{}", Table::new(inputs));

    println!("\n=== Outputs ===");
    let outputs: Vec<ParameterRow> = process.result_info().iter().map(ParameterRow::from).collect();
    println!("{}", Table::new(outputs));
}

/// Rows for a Rogerson's R result, in document order.
#[must_use]
pub fn rogerson_rows(result: &RogersonRResult) -> Vec<StatisticRow> {
    [
        ("Type Name", result.type_name.clone()),
        ("Property Name", result.property_name.clone()),
        ("Observed Index", result.observed_index.to_string()),
        ("Expected Index", result.expected_index.to_string()),
        ("Variance", result.variance.to_string()),
        ("Z Score", result.z_score.to_string()),
        ("P Value", result.p_value.to_string()),
    ]
    .into_iter()
    .map(|(field, value)| StatisticRow {
        field: field.to_string(),
        value,
    })
    .collect()
}

/// Display a decoded Rogerson's R result.
pub fn display_rogerson(result: &RogersonRResult) {
    println!("\n=== Global Rogerson's R ===");
    println!("{}", Table::new(rogerson_rows(result)));
}
