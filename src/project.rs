//! Projection of an element tree onto json values
//!
//! | element                           | value                                     |
//! |-----------------------------------|-------------------------------------------|
//! | `<a></a>`, `<a/>`                 | `""`                                      |
//! | `<a>hello</a>`                    | `"hello"`                                 |
//! | `<a id="1"></a>`                  | `{"_id": "1"}`                            |
//! | `<a id="x">hi<b>1</b></a>`        | `{"_id": "x", "__text": "hi", "b": "1"}`  |
//! | `<a><b>1</b><b>2</b></a>`         | `{"b": ["1", "2"]}`                       |

use crate::document::Document;
use crate::element::Element;
use crate::value::{Map, Value};

/// Prefix put in front of attribute names.
pub const ATTRIBUTE_PREFIX: &str = "_";
/// Key holding the content of an element that also has attributes or children.
pub const TEXT_KEY: &str = "__text";
/// Key of the optional element name annotation, see [`ProjectOptions::object_name_key`].
pub const OBJECT_NAME_KEY: &str = "_objectName";

/// Options when projecting elements.
///
/// `object_name_key`: Objects of elements with children also get
/// `"_objectName": "<element name>"`. Older outputs carried this key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectOptions {
    pub object_name_key: bool,
}

/// Project `element` and its descendants.
///
/// Elements are projected bottom-up in reverse document order, so every child
/// value is finished before its parent folds it in and nesting depth never
/// grows the call stack.
pub fn project(document: &Document, element: Element, opts: &ProjectOptions) -> Value {
    let base = element.id();
    let subtree = element.subtree_rev(document);
    let mut finished: Vec<Option<Value>> = Vec::new();
    finished.resize_with(subtree.len(), || None);

    for elem in subtree {
        let value = project_one(document, elem, opts, &mut finished, base);
        finished[elem.id() - base] = Some(value);
    }
    finished
        .first_mut()
        .and_then(Option::take)
        .unwrap_or_default()
}

// Child values are taken out of `finished`, indexed by id relative to `base`.
fn project_one(
    document: &Document,
    element: Element,
    opts: &ProjectOptions,
    finished: &mut [Option<Value>],
    base: usize,
) -> Value {
    if element.is_empty(document) {
        return Value::String(String::new());
    }

    let attributes = element.attributes(document);
    let content = element.content(document);
    let has_children = element.has_children(document);

    if attributes.is_empty() && !has_children {
        return Value::String(content.to_string());
    }

    let children = element.children(document);
    let mut map = Map::with_capacity(attributes.len() + children.len() + 1);
    for (key, value) in attributes {
        map.insert(format!("{}{}", ATTRIBUTE_PREFIX, key), Value::from(value.as_str()));
    }
    if !content.is_empty() {
        map.insert(TEXT_KEY.to_string(), Value::from(content));
    }
    if opts.object_name_key && has_children {
        map.insert(
            OBJECT_NAME_KEY.to_string(),
            Value::from(element.name(document)),
        );
    }
    for child in children {
        let value = finished[child.id() - base].take().unwrap_or_default();
        Value::fold_into(&mut map, child.name(document), value);
    }
    Value::Object(map)
}
