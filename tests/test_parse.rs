use xml_to_json::{convert, Document, Error, ReadOptions, DEFAULT_MAX_DEPTH};

#[test]
fn test_closing_tag_mismatch_err() {
    let opts = ReadOptions::strict();

    // no closing tag
    let xml = "<img>";
    let doc = Document::parse_str_with_opts(xml, opts.clone());
    assert!(matches!(doc.unwrap_err(), Error::MalformedXML(_)));

    // closing tag mismatch
    let xml = "<a><img>Te</a>xt</img>";
    let doc = Document::parse_str_with_opts(xml, opts.clone());
    assert!(matches!(doc.unwrap_err(), Error::MalformedXML(_)));

    // no opening tag
    let xml = "</abc>";
    let doc = Document::parse_str_with_opts(xml, opts);
    assert!(matches!(doc.unwrap_err(), Error::MalformedXML(_)));
}

#[test]
fn test_closing_tag_mismatch_lenient() {
    // no closing tag
    let doc = Document::parse_str("<img>").unwrap();
    assert_eq!(doc.len(), 1);

    // closing tag mismatch keeps what was read before it
    let doc = Document::parse_str("<a><img>Te</a>xt</img>").unwrap();
    let a = doc.root_element().unwrap();
    let img = a.children(&doc)[0];
    assert_eq!(img.name(&doc), "img");
    assert_eq!(img.content(&doc), "Te");
    assert_eq!(doc.len(), 2);

    // no opening tag
    let doc = Document::parse_str("</abc>").unwrap();
    assert!(doc.is_empty());
}

#[test]
fn test_bad_entity() {
    let xml = "<a><b>1</b><c>&nope;</c></a>";
    let err = Document::parse_str_with_opts(xml, ReadOptions::strict()).unwrap_err();
    assert!(matches!(err, Error::MalformedXML(_)));

    let doc = Document::parse_str(xml).unwrap();
    let a = doc.root_element().unwrap();
    assert_eq!(a.children(&doc).len(), 2);
    assert_eq!(a.find(&doc, "b").unwrap().content(&doc), "1");
    assert_eq!(a.find(&doc, "c").unwrap().content(&doc), "");
}

#[test]
fn test_text_runs() {
    let xml = "<a>x<b/>  <c/>y</a>";

    let doc = Document::parse_str(xml).unwrap();
    assert_eq!(doc.root_element().unwrap().content(&doc), "y");

    let opts = ReadOptions {
        join_text_runs: true,
        ..ReadOptions::default()
    };
    let doc = Document::parse_str_with_opts(xml, opts).unwrap();
    assert_eq!(doc.root_element().unwrap().content(&doc), "xy");
}

#[test]
fn test_text_is_not_trimmed() {
    let doc = Document::parse_str("<a>  1 &lt; 2\n</a>").unwrap();
    assert_eq!(doc.root_element().unwrap().content(&doc), "  1 < 2\n");
}

#[test]
fn test_attributes() {
    let xml = r#"<a x:one="1" two="&quot;2&quot;" one="3"/>"#;
    let doc = Document::parse_str(xml).unwrap();
    let a = doc.root_element().unwrap();
    let attrs: Vec<(&str, &str)> = a
        .attributes(&doc)
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    assert_eq!(attrs, vec![("one", "3"), ("two", "\"2\"")]);
    assert_eq!(a.attribute(&doc, "two"), Some("\"2\""));
}

#[test]
fn test_multiple_top_level_elements() {
    let doc = Document::parse_str("<a/><b/>  <a>t</a>").unwrap();
    let container = doc.container();
    let names: Vec<&str> = container
        .children(&doc)
        .iter()
        .map(|e| e.name(&doc))
        .collect();
    assert_eq!(names, vec!["a", "b", "a"]);
    assert_eq!(container.find_all(&doc, "a").len(), 2);
    for child in container.children(&doc) {
        assert_eq!(child.parent(&doc), Some(container));
        assert_eq!(child.parent_name(&doc), "root");
    }
}

#[test]
fn test_document_order() {
    let doc = Document::parse_str("<r><a/><b><c/></b><d/></r>").unwrap();
    let names: Vec<&str> = doc
        .container()
        .children_recursive(&doc)
        .iter()
        .map(|e| e.name(&doc))
        .collect();
    assert_eq!(names, vec!["r", "a", "b", "c", "d"]);
}

#[test]
fn test_parse_bytes_utf16be() {
    let mut bytes = vec![0xfe, 0xff];
    for unit in "<a>\u{1F600}</a>".encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    let doc = Document::parse_bytes(&bytes).unwrap();
    assert_eq!(doc.root_element().unwrap().content(&doc), "\u{1F600}");
}

#[test]
fn test_parse_file_missing() {
    let err = Document::parse_file("tests/documents/missing.xml").unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

fn nested(depth: usize) -> String {
    format!("{}x{}", "<a>".repeat(depth), "</a>".repeat(depth))
}

fn depth_of(doc: &Document) -> usize {
    let mut depth = 0;
    let mut element = doc.root_element();
    while let Some(e) = element {
        depth += 1;
        element = e.children(doc).first().copied();
    }
    depth
}

#[test]
fn test_deep_nesting_is_cut_at_max_depth() {
    let xml = nested(100_000);

    let doc = Document::parse_str(&xml).unwrap();
    assert_eq!(depth_of(&doc), DEFAULT_MAX_DEPTH);
    let json = convert(xml.as_bytes()).unwrap();
    assert!(json.starts_with(b"{\"a\":{\"a\":"));
    assert_eq!(json.iter().filter(|b| **b == b'{').count(), DEFAULT_MAX_DEPTH);

    let err = Document::parse_str_with_opts(&xml, ReadOptions::strict()).unwrap_err();
    assert!(matches!(err, Error::MalformedXML(_)));
}

#[test]
fn test_max_depth_is_inclusive() {
    let xml = nested(DEFAULT_MAX_DEPTH);
    let doc = Document::parse_str_with_opts(&xml, ReadOptions::strict()).unwrap();
    assert_eq!(depth_of(&doc), DEFAULT_MAX_DEPTH);

    let opts = ReadOptions {
        max_depth: 3,
        ..ReadOptions::default()
    };
    let doc = Document::parse_str_with_opts("<a><b><c><d/></c></b><e/></a>", opts).unwrap();
    let names: Vec<&str> = doc
        .container()
        .children_recursive(&doc)
        .iter()
        .map(|e| e.name(&doc))
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn test_invalid_bytes_keep_partial_tree() {
    let xml = b"<a><b>1</b><c>\xff</c><d/></a>";
    let json = convert(xml).unwrap();
    assert_eq!(json, br#"{"a":{"b":"1","c":""}}"#);

    let err = Document::parse_bytes_with_opts(xml, ReadOptions::strict()).unwrap_err();
    assert!(matches!(err, Error::CannotDecode));
}

#[test]
fn test_illegal_characters_keep_partial_tree() {
    let xml = b"<a><b>1</b><c>\x01</c><d/></a>";
    let json = convert(xml).unwrap();
    assert_eq!(json, br#"{"a":{"b":"1","c":""}}"#);

    let err = Document::parse_bytes_with_opts(xml, ReadOptions::strict()).unwrap_err();
    assert!(matches!(err, Error::MalformedXML(_)));

    // a character reference is not checked
    let doc = Document::parse_str("<a>&#9;</a>").unwrap();
    assert_eq!(doc.root_element().unwrap().content(&doc), "\t");
}

#[test]
fn test_line_endings_are_normalized() {
    let doc = Document::parse_str("<a k=\"1\r\n2\">x\r\ny<b/></a>").unwrap();
    let a = doc.root_element().unwrap();
    assert_eq!(a.attribute(&doc, "k"), Some("1\n2"));
    assert_eq!(a.content(&doc), "x\ny");

    let doc = Document::parse_str("<a>x\ry<![CDATA[\r\n]]></a>").unwrap();
    assert_eq!(doc.root_element().unwrap().content(&doc), "x\ny");

    let doc = Document::parse_str("<a>x&#13;y\r</a>").unwrap();
    assert_eq!(doc.root_element().unwrap().content(&doc), "x\ry\n");
}

#[test]
fn test_names_without_a_single_prefix_are_kept() {
    let doc = Document::parse_str(r#"<:a x:y:z="1" p:q="2" r:="3"/>"#).unwrap();
    let a = doc.root_element().unwrap();
    assert_eq!(a.name(&doc), ":a");
    let keys: Vec<&str> = a.attributes(&doc).keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["x:y:z", "q", "r:"]);
}
