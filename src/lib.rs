//! Convert xml documents to json.
//!
//! The xml is first read into a [`Document`], a tree of elements with their
//! local names, attributes and text content. The tree is then projected onto a
//! [`Value`]:
//!
//! - attributes become `"_<name>"` keys,
//! - text of an element that also has attributes or children goes to `"__text"`,
//! - children are keyed by their name, repeated names are folded into an array.
//!
//! The top level value always has one key per top-level element name.
//!
//! ```
//! let json = xml_to_json::convert_str(r#"<a id="x">hi<b>1</b><b>2</b></a>"#).unwrap();
//! assert_eq!(json, r#"{"a":{"_id":"x","__text":"hi","b":["1","2"]}}"#);
//! ```
//!
//! Malformed xml does not fail by default: reading stops at the first error and
//! the elements read so far are converted. Set [`ReadOptions::strict`] to get an
//! [`Error`] instead.

mod document;
mod element;
mod error;
mod parser;
pub mod project;
pub mod value;

pub use crate::document::Document;
pub use crate::element::{Element, CONTAINER_NAME};
pub use crate::error::{Error, Result};
pub use crate::parser::{ReadOptions, DEFAULT_MAX_DEPTH};
pub use crate::project::{project, ProjectOptions};
pub use crate::value::{Map, Value};

use std::path::Path;
use tracing::debug;

/// Options of the whole conversion.
///
/// `pretty`: Indent the json output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    pub read: ReadOptions,
    pub project: ProjectOptions,
    pub pretty: bool,
}

/// Read the whole file at `path`.
///
/// # Errors
///
/// - [`Error::Io`]: the original [`std::io::Error`].
pub fn read_input<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    debug!(path = %path.display(), bytes = bytes.len(), "read input");
    Ok(bytes)
}

/// Parse and project xml bytes.
pub fn to_value(xml: &[u8], opts: &ConvertOptions) -> Result<Value> {
    let document = Document::parse_bytes_with_opts(xml, opts.read.clone())?;
    Ok(document.to_value(&opts.project))
}

/// Write a projected value as json.
pub fn to_json_vec(value: &Value, pretty: bool) -> Result<Vec<u8>> {
    let json = if pretty {
        serde_json::to_vec_pretty(value)?
    } else {
        serde_json::to_vec(value)?
    };
    Ok(json)
}

/// Convert xml bytes to json bytes with default options.
pub fn convert(xml: &[u8]) -> Result<Vec<u8>> {
    convert_with_opts(xml, &ConvertOptions::default())
}

pub fn convert_with_opts(xml: &[u8], opts: &ConvertOptions) -> Result<Vec<u8>> {
    let value = to_value(xml, opts)?;
    let json = to_json_vec(&value, opts.pretty)?;
    debug!(xml = xml.len(), json = json.len(), "converted");
    Ok(json)
}

/// Convert a xml string to a json string with default options.
pub fn convert_str(xml: &str) -> Result<String> {
    let document = Document::parse_str(xml)?;
    let value = document.to_value(&ProjectOptions::default());
    Ok(serde_json::to_string(&value)?)
}

/// Read the file at `path` and convert it.
pub fn convert_file<P: AsRef<Path>>(path: P, opts: &ConvertOptions) -> Result<Vec<u8>> {
    let xml = read_input(path)?;
    convert_with_opts(&xml, opts)
}
