use crate::element::{Element, ElementData};
use crate::error::Result;
use crate::parser::{DocumentParser, ReadOptions};
use crate::project::{project, ProjectOptions};
use crate::value::Value;
use std::path::Path;

/// Tree of elements built from a xml document.
///
/// Elements are stored in a flat arena and addressed by [`Element`] handles.
/// The first element is a synthetic container named `"root"`; every
/// top-level element of the xml becomes one of its children.
///
/// ```
/// use xml_to_json::Document;
///
/// let doc = Document::parse_str("<a><b>1</b></a>").unwrap();
/// let a = doc.root_element().unwrap();
/// let b = a.children(&doc)[0];
/// assert_eq!(b.content(&doc), "1");
/// assert_eq!(b.parent_name(&doc), "a");
/// ```
#[derive(Debug)]
pub struct Document {
    pub(crate) store: Vec<ElementData>,
    container: Element,
}

impl Document {
    pub(crate) fn new() -> Document {
        let (container, container_data) = Element::container();
        Document {
            store: vec![container_data],
            container,
        }
    }

    /// Synthetic element holding the top-level elements.
    pub fn container(&self) -> Element {
        self.container
    }

    /// First top-level element, if any.
    pub fn root_element(&self) -> Option<Element> {
        self.container.children(self).first().copied()
    }

    /// Number of elements, excluding the container.
    pub fn len(&self) -> usize {
        self.store.len() - 1
    }

    /// `true` if no element was read.
    pub fn is_empty(&self) -> bool {
        self.store.len() == 1
    }
}

// Read
impl Document {
    /// Build [`Document`] from xml string with default options.
    pub fn parse_str(str: &str) -> Result<Document> {
        DocumentParser::parse_str(str, ReadOptions::default())
    }

    pub fn parse_str_with_opts(str: &str, opts: ReadOptions) -> Result<Document> {
        DocumentParser::parse_str(str, opts)
    }

    /// Build [`Document`] from raw bytes, detecting the encoding from
    /// the byte order mark or the xml declaration.
    pub fn parse_bytes(bytes: &[u8]) -> Result<Document> {
        DocumentParser::parse_bytes(bytes, ReadOptions::default())
    }

    pub fn parse_bytes_with_opts(bytes: &[u8], opts: ReadOptions) -> Result<Document> {
        DocumentParser::parse_bytes(bytes, opts)
    }

    /// # Errors
    ///
    /// - [`Error::Io`](crate::Error::Io): the file could not be read.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
        Self::parse_file_with_opts(path, ReadOptions::default())
    }

    pub fn parse_file_with_opts<P: AsRef<Path>>(path: P, opts: ReadOptions) -> Result<Document> {
        let bytes = crate::read_input(path)?;
        DocumentParser::parse_bytes(&bytes, opts)
    }
}

// Project
impl Document {
    /// Project the whole document, starting at the container.
    pub fn to_value(&self, opts: &ProjectOptions) -> Value {
        project(self, self.container, opts)
    }
}
