//! XML encoding of global Rogerson's R results.
//!
//! A result is written as a `GlobalRogersonsR` element in the
//! `http://www.opengis.net/statistics` namespace with one child element per
//! field:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <GlobalRogersonsR xmlns="http://www.opengis.net/statistics">
//!   <TypeName>stations</TypeName>
//!   <PropertyName>rainfall</PropertyName>
//!   <ObservedIndex>0.42</ObservedIndex>
//!   <ExpectedIndex>0.1</ExpectedIndex>
//!   <Variance>0.003</Variance>
//!   <ZScore>5.8</ZScore>
//!   <PValue>0.00001</PValue>
//! </GlobalRogersonsR>
//! ```

use std::collections::HashMap;
use std::fmt::Display;
use std::path::Path;

use log::debug;
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::{FormatError, IoError, IoErrorExt, Result};

/// Namespace of the result document.
pub const STATISTICS_NAMESPACE: &str = "http://www.opengis.net/statistics";

/// Name of the root element.
pub const ROOT_ELEMENT: &str = "GlobalRogersonsR";

const TYPE_NAME: &str = "TypeName";
const PROPERTY_NAME: &str = "PropertyName";
const OBSERVED_INDEX: &str = "ObservedIndex";
const EXPECTED_INDEX: &str = "ExpectedIndex";
const VARIANCE: &str = "Variance";
const Z_SCORE: &str = "ZScore";
const P_VALUE: &str = "PValue";

/// Outcome of a global Rogerson's R analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct RogersonRResult {
    /// Feature type the statistic was computed over
    pub type_name: String,
    /// Weight attribute
    pub property_name: String,
    /// Observed R index
    pub observed_index: f64,
    /// Expected R index under spatial randomness
    pub expected_index: f64,
    /// Variance of R
    pub variance: f64,
    /// Standard score
    pub z_score: f64,
    /// Two-tailed probability
    pub p_value: f64,
}

fn xml_error(element: &str, message: impl Display) -> FormatError {
    FormatError::Xml {
        element: element.to_string(),
        message: message.to_string(),
    }
}

fn write_field<W: std::io::Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new(tag)))
        .map_err(|e| xml_error(tag, e))?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(|e| xml_error(tag, e))?;
    writer
        .write_event(Event::End(BytesEnd::new(tag)))
        .map_err(|e| xml_error(tag, e))?;
    Ok(())
}

/// Encodes `result` as an indented UTF-8 XML document.
///
/// # Errors
///
/// Returns [`FormatError::Xml`] if the document cannot be written.
pub fn encode(result: &RogersonRResult) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|e| xml_error(ROOT_ELEMENT, e))?;
    writer
        .write_event(Event::Start(
            BytesStart::new(ROOT_ELEMENT).with_attributes([("xmlns", STATISTICS_NAMESPACE)]),
        ))
        .map_err(|e| xml_error(ROOT_ELEMENT, e))?;

    write_field(&mut writer, TYPE_NAME, &result.type_name)?;
    write_field(&mut writer, PROPERTY_NAME, &result.property_name)?;
    write_field(&mut writer, OBSERVED_INDEX, &result.observed_index.to_string())?;
    write_field(&mut writer, EXPECTED_INDEX, &result.expected_index.to_string())?;
    write_field(&mut writer, VARIANCE, &result.variance.to_string())?;
    write_field(&mut writer, Z_SCORE, &result.z_score.to_string())?;
    write_field(&mut writer, P_VALUE, &result.p_value.to_string())?;

    writer
        .write_event(Event::End(BytesEnd::new(ROOT_ELEMENT)))
        .map_err(|e| xml_error(ROOT_ELEMENT, e))?;

    let xml = String::from_utf8(writer.into_inner()).map_err(|e| xml_error(ROOT_ELEMENT, e))?;
    debug!("Encoded Rogerson's R result for '{}'", result.type_name);
    Ok(xml)
}

/// Decodes a document produced by [`encode`].
///
/// Element names are matched on their local part, so a prefixed namespace
/// (`<stat:GlobalRogersonsR xmlns:stat="...">`) reads the same. Unknown
/// child elements are ignored.
///
/// # Errors
///
/// Returns [`FormatError::Xml`] if the document is malformed, the root
/// element is not `GlobalRogersonsR`, a field is missing, or a numeric field
/// does not parse.
pub fn decode(xml: &str) -> Result<RogersonRResult> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut fields: HashMap<String, String> = HashMap::new();
    let mut depth = 0_usize;
    let mut current: Option<String> = None;
    let mut seen_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if depth == 0 {
                    if name != ROOT_ELEMENT {
                        return Err(xml_error(&name, "unexpected root element").into());
                    }
                    seen_root = true;
                } else if depth == 1 {
                    fields.entry(name.clone()).or_default();
                    current = Some(name);
                }
                depth += 1;
            },
            Ok(Event::Empty(ref e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if depth == 0 {
                    return Err(xml_error(&name, "root element has no content").into());
                }
                if depth == 1 {
                    fields.insert(name, String::new());
                }
            },
            Ok(Event::Text(ref e)) => {
                if let Some(name) = &current {
                    let text = e.unescape().map_err(|err| xml_error(name, err))?;
                    if let Some(value) = fields.get_mut(name) {
                        value.push_str(&text);
                    }
                }
            },
            Ok(Event::End(_)) => {
                depth = depth.saturating_sub(1);
                if depth <= 1 {
                    current = None;
                }
            },
            Ok(Event::Eof) => break,
            Ok(_) => {},
            Err(e) => {
                let element = current.as_deref().unwrap_or(ROOT_ELEMENT);
                let message = format!("at position {}: {e}", reader.buffer_position());
                return Err(xml_error(element, message).into());
            },
        }
    }

    if !seen_root {
        return Err(xml_error(ROOT_ELEMENT, "missing root element").into());
    }

    let text = |tag: &str| -> Result<String> {
        fields
            .get(tag)
            .cloned()
            .ok_or_else(|| xml_error(tag, "missing element").into())
    };
    let number = |tag: &str| -> Result<f64> {
        let raw = text(tag)?;
        raw.trim()
            .parse::<f64>()
            .map_err(|e| xml_error(tag, format!("invalid number '{raw}': {e}")).into())
    };

    Ok(RogersonRResult {
        type_name: text(TYPE_NAME)?,
        property_name: text(PROPERTY_NAME)?,
        observed_index: number(OBSERVED_INDEX)?,
        expected_index: number(EXPECTED_INDEX)?,
        variance: number(VARIANCE)?,
        z_score: number(Z_SCORE)?,
        p_value: number(P_VALUE)?,
    })
}

/// Reads and decodes a result document from a file.
///
/// # Errors
///
/// Returns an [`IoError`] if the file is missing or unreadable, otherwise
/// see [`decode`].
pub fn read_file(path: impl AsRef<Path>) -> Result<RogersonRResult> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        }
        .into());
    }
    let xml = std::fs::read_to_string(path).with_read_context("XML", path)?;
    debug!("Decoding {ROOT_ELEMENT} document {}", path.display());
    decode(&xml)
}
