use crate::document::Document;
use indexmap::IndexMap;

/// Name of the synthetic container element that holds every top-level element.
pub const CONTAINER_NAME: &str = "root";

#[derive(Debug)]
pub struct ElementData {
    name: String,
    parent_name: String,
    attributes: IndexMap<String, String>, // q:attr="val" => {"attr": "val"}
    content: String,
    parent: Option<Element>,
    children: Vec<Element>,
}

/// Represents an Xml Element.
///
/// This struct only contains a unique usize id and implements trait `Copy`.
/// So you do not need to bother with having a reference.
///
/// Because the actual data of the element is stored in [`Document`],
/// most methods takes `&Document` as its first argument.
///
/// # Panics
///
/// Accessors panic if the element belongs to another [`Document`]
/// with fewer elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Element {
    id: usize,
}

impl Element {
    /// Create a new element and push it as the last child of `parent`.
    pub(crate) fn with_data(
        document: &mut Document,
        parent: Element,
        name: String,
        attributes: IndexMap<String, String>,
    ) -> Element {
        let elem = Element {
            id: document.store.len(),
        };
        let elem_data = ElementData {
            name,
            parent_name: parent.name(document).to_string(),
            attributes,
            content: String::new(),
            parent: Some(parent),
            children: vec![],
        };
        document.store.push(elem_data);
        parent.mut_data(document).children.push(elem);
        elem
    }

    pub(crate) fn container() -> (Element, ElementData) {
        let elem_data = ElementData {
            name: CONTAINER_NAME.to_string(),
            parent_name: String::new(),
            attributes: IndexMap::new(),
            content: String::new(),
            parent: None,
            children: Vec::new(),
        };
        (Element { id: 0 }, elem_data)
    }

    /// The container element is the synthetic root of a [`Document`].
    pub fn is_container(&self) -> bool {
        self.id == 0
    }

    /// `"prefix:name"` -> `("prefix", "name")`, `"name"` -> `("", "name")`
    ///
    /// Names with an empty prefix, an empty local part or more than one colon
    /// are kept whole: `":a"`, `"a:"` and `"a:b:c"` have no prefix.
    pub fn separate_prefix_name(full_name: &str) -> (&str, &str) {
        match full_name.split_once(':') {
            Some((prefix, name))
                if !prefix.is_empty() && !name.is_empty() && !name.contains(':') =>
            {
                (prefix, name)
            }
            _ => ("", full_name),
        }
    }

    /// Strips the namespace prefix from a tag or attribute name.
    pub fn local_name(full_name: &str) -> &str {
        Self::separate_prefix_name(full_name).1
    }
}

impl Element {
    fn data<'a>(&self, document: &'a Document) -> &'a ElementData {
        &document.store[self.id]
    }

    fn mut_data<'a>(&self, document: &'a mut Document) -> &'a mut ElementData {
        &mut document.store[self.id]
    }

    /// Local name of the element, without its namespace prefix.
    pub fn name<'a>(&self, document: &'a Document) -> &'a str {
        &self.data(document).name
    }

    /// Local name of the parent element.
    /// Children of the container get `"root"`, the container itself an empty string.
    pub fn parent_name<'a>(&self, document: &'a Document) -> &'a str {
        &self.data(document).parent_name
    }

    /// Attributes keyed by their local name, in document order.
    pub fn attributes<'a>(&self, document: &'a Document) -> &'a IndexMap<String, String> {
        &self.data(document).attributes
    }

    pub fn attribute<'a>(&self, document: &'a Document, name: &str) -> Option<&'a str> {
        self.attributes(document).get(name).map(|v| v.as_str())
    }

    /// Text directly under this element. Empty if it had none.
    ///
    /// Whitespace-only text is never stored, but stored text is not trimmed.
    pub fn content<'a>(&self, document: &'a Document) -> &'a str {
        &self.data(document).content
    }

    pub(crate) fn set_content(&self, document: &mut Document, content: String) {
        self.mut_data(document).content = content;
    }

    pub(crate) fn push_content(&self, document: &mut Document, content: &str) {
        self.mut_data(document).content.push_str(content);
    }

    pub fn parent(&self, document: &Document) -> Option<Element> {
        self.data(document).parent
    }

    /// Child elements in document order.
    pub fn children<'a>(&self, document: &'a Document) -> &'a [Element] {
        &self.data(document).children
    }

    pub fn has_children(&self, document: &Document) -> bool {
        !self.children(document).is_empty()
    }

    pub(crate) fn id(&self) -> usize {
        self.id
    }

    /// The element and its descendants in reverse document order.
    ///
    /// Ids are handed out in document order, so a subtree is a contiguous id range
    /// ending at the last child of the last child.
    pub(crate) fn subtree_rev(&self, document: &Document) -> Vec<Element> {
        let mut last = *self;
        while let Some(child) = last.children(document).last() {
            last = *child;
        }
        (self.id..=last.id).rev().map(|id| Element { id }).collect()
    }

    /// Get all descendants of the element in pre-order.
    pub fn children_recursive(&self, document: &Document) -> Vec<Element> {
        let mut elements = self.subtree_rev(document);
        elements.pop(); // self
        elements.reverse();
        elements
    }

    /// An element without attributes, children and content.
    pub fn is_empty(&self, document: &Document) -> bool {
        let data = self.data(document);
        data.attributes.is_empty() && data.children.is_empty() && data.content.is_empty()
    }

    /// Returns the first child element with the given name.
    pub fn find(&self, document: &Document, name: &str) -> Option<Element> {
        self.children(document)
            .iter()
            .find(|c| c.name(document) == name)
            .copied()
    }

    /// Returns every child element with the given name.
    pub fn find_all(&self, document: &Document, name: &str) -> Vec<Element> {
        self.children(document)
            .iter()
            .filter(|c| c.name(document) == name)
            .copied()
            .collect()
    }
}
