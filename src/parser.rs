use crate::document::Document;
use crate::element::Element;
use crate::error::{Error, Result};
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{escape, Error as XMLError, Reader};
use std::borrow::Cow;
use tracing::{debug, trace, warn};

/// Options when parsing xml.
///
/// `strict`: Return [`Error::MalformedXML`] and [`Error::CannotDecode`] instead of
/// keeping the elements read before the error.
///
/// `join_text_runs`: `<a>x<b/>y</a>` stores `"xy"` as the content of `a` instead of `"y"`.
///
/// `max_depth`: Elements nested deeper than this end reading like malformed xml.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    pub strict: bool,
    pub join_text_runs: bool,
    pub max_depth: usize,
}

/// Default of [`ReadOptions::max_depth`].
pub const DEFAULT_MAX_DEPTH: usize = 256;

impl Default for ReadOptions {
    fn default() -> Self {
        ReadOptions {
            strict: false,
            join_text_runs: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ReadOptions {
    pub fn strict() -> ReadOptions {
        ReadOptions {
            strict: true,
            ..ReadOptions::default()
        }
    }
}

/// Decode `bytes` into utf-8 text.
///
/// The encoding is taken from the byte order mark, then from the
/// `<?xml` prefix in utf-16, then from the `encoding` of the xml declaration.
pub(crate) fn decode_input<'a>(bytes: &'a [u8], opts: &ReadOptions) -> Result<Cow<'a, str>> {
    let (encoding, body) = match bytes {
        [0xfe, 0xff, rest @ ..] => (UTF_16BE, rest),
        [0xff, 0xfe, rest @ ..] => (UTF_16LE, rest),
        [0xef, 0xbb, 0xbf, rest @ ..] => (UTF_8, rest),
        [0x00, 0x3c, 0x00, 0x3f, ..] => (UTF_16BE, bytes),
        [0x3c, 0x00, 0x3f, 0x00, ..] => (UTF_16LE, bytes),
        _ => (declared_encoding(bytes, opts)?, bytes),
    };
    let (text, had_errors) = encoding.decode_without_bom_handling(body);
    if !had_errors {
        return Ok(text);
    }
    if opts.strict {
        return Err(Error::CannotDecode);
    }
    // Keep the text before the first malformed sequence.
    let mut decoder = encoding.new_decoder_without_bom_handling();
    let capacity = decoder
        .max_utf8_buffer_length_without_replacement(body.len())
        .unwrap_or(body.len());
    let mut prefix = String::with_capacity(capacity);
    let (_, read) = decoder.decode_to_string_without_replacement(body, &mut prefix, true);
    prefix.truncate(markup_boundary(&prefix));
    warn!(
        encoding = encoding.name(),
        position = read,
        "input has malformed byte sequences, reading up to the first one"
    );
    Ok(Cow::Owned(prefix))
}

/// `Char` production of xml 1.0.
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

/// End of the last complete markup in `head`.
///
/// Text after the last tag is dropped, and so is a tag that was cut off.
fn markup_boundary(head: &str) -> usize {
    match (head.rfind('<'), head.rfind('>')) {
        (Some(lt), Some(gt)) if gt > lt => gt + 1,
        (Some(lt), _) => lt,
        (None, Some(gt)) => gt + 1,
        (None, None) => 0,
    }
}

/// `\r\n` and lone `\r` become `\n`. Applied to raw text, so `&#13;` stays a `\r`.
fn normalize_line_endings(raw: &[u8]) -> Cow<'_, [u8]> {
    if !raw.contains(&b'\r') {
        return Cow::Borrowed(raw);
    }
    let mut normalized = Vec::with_capacity(raw.len());
    let mut bytes = raw.iter().copied().peekable();
    while let Some(b) = bytes.next() {
        if b == b'\r' {
            normalized.push(b'\n');
            if bytes.peek() == Some(&b'\n') {
                bytes.next();
            }
        } else {
            normalized.push(b);
        }
    }
    Cow::Owned(normalized)
}

fn unescape_normalized(raw: &[u8]) -> Result<String> {
    let normalized = normalize_line_endings(raw);
    let unescaped = escape::unescape(&normalized).map_err(XMLError::EscapeError)?;
    Ok(String::from_utf8(unescaped.into_owned())?)
}

// Only called for ascii compatible input.
fn declared_encoding(bytes: &[u8], opts: &ReadOptions) -> Result<&'static Encoding> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::with_capacity(64);
    let label: Vec<u8> = match reader.read_event(&mut buf) {
        Ok(Event::Decl(ref ev)) => match ev.encoding() {
            Some(Ok(label)) => label
                .iter()
                .copied()
                .filter(|b| *b != b'"' && *b != b'\'')
                .collect(),
            _ => return Ok(UTF_8),
        },
        _ => return Ok(UTF_8),
    };
    match Encoding::for_label(&label) {
        // "UTF-16" declared on ascii compatible bytes can't be right.
        Some(encoding) => Ok(encoding.output_encoding()),
        None if opts.strict => Err(Error::CannotDecode),
        None => {
            warn!(
                label = %String::from_utf8_lossy(&label),
                "unknown encoding label, reading as utf-8"
            );
            Ok(UTF_8)
        }
    }
}

pub(crate) struct DocumentParser {
    document: Document,
    read_opts: ReadOptions,
    current: Element,
    element_stack: Vec<Element>, // ancestors of `current`, container first
}

impl DocumentParser {
    pub(crate) fn new(opts: ReadOptions) -> DocumentParser {
        let document = Document::new();
        let current = document.container();
        DocumentParser {
            document,
            read_opts: opts,
            current,
            element_stack: Vec::new(),
        }
    }

    pub(crate) fn parse_bytes(bytes: &[u8], opts: ReadOptions) -> Result<Document> {
        let text = decode_input(bytes, &opts)?;
        Self::parse_str(&text, opts)
    }

    pub(crate) fn parse_str(str: &str, opts: ReadOptions) -> Result<Document> {
        let str = match str.char_indices().find(|(_, c)| !is_xml_char(*c)) {
            None => str,
            Some((pos, c)) if opts.strict => {
                return Err(Error::MalformedXML(format!(
                    "illegal character U+{:04X} at {}",
                    u32::from(c),
                    pos
                )))
            }
            Some((pos, c)) => {
                warn!(
                    character = u32::from(c),
                    position = pos,
                    "illegal character, reading up to it"
                );
                &str[..markup_boundary(&str[..pos])]
            }
        };
        let mut parser = DocumentParser::new(opts);
        let mut reader = Reader::from_str(str);
        reader
            .trim_text(false)
            .expand_empty_elements(true)
            .check_end_names(true);
        match parser.parse_content(&mut reader) {
            Ok(()) => {}
            Err(err) if !parser.read_opts.strict => {
                warn!(
                    error = %err,
                    position = reader.buffer_position(),
                    elements = parser.document.len(),
                    "stopped reading xml, keeping elements read so far"
                );
            }
            Err(err) => return Err(err),
        }
        debug!(elements = parser.document.len(), "built element tree");
        Ok(parser.document)
    }

    fn handle_bytes_start(&mut self, ev: &BytesStart) -> Result<Element> {
        let full_name = std::str::from_utf8(ev.name())?;
        let name = Element::local_name(full_name).to_string();
        let mut attributes = IndexMap::new();
        let mut attrs = ev.attributes();
        // duplicated attributes are allowed, the last one wins.
        attrs.with_checks(false);
        for attr in attrs {
            let attr = attr?;
            let key = std::str::from_utf8(attr.key)?;
            let value = unescape_normalized(&attr.value)?;
            attributes.insert(Element::local_name(key).to_string(), value);
        }
        Ok(Element::with_data(
            &mut self.document,
            self.current,
            name,
            attributes,
        ))
    }

    fn handle_text(&mut self, content: String) {
        if content.trim().is_empty() {
            return;
        }
        let doc = &mut self.document;
        if self.read_opts.join_text_runs {
            self.current.push_content(doc, &content);
        } else {
            self.current.set_content(doc, content);
        }
    }

    // Returns if document parsing is finished.
    fn handle_event(&mut self, event: Event) -> Result<bool> {
        match event {
            Event::Start(ref ev) => {
                if self.element_stack.len() >= self.read_opts.max_depth {
                    return Err(Error::MalformedXML(format!(
                        "elements nested deeper than {}",
                        self.read_opts.max_depth
                    )));
                }
                let element = self.handle_bytes_start(ev)?;
                self.element_stack.push(self.current);
                self.current = element;
            }
            // Only emitted without expand_empty_elements.
            Event::Empty(ref ev) => {
                self.handle_bytes_start(ev)?;
            }
            Event::End(_) => {
                if let Some(parent) = self.element_stack.pop() {
                    self.current = parent;
                }
            }
            Event::Text(ev) => {
                let content = unescape_normalized(&ev)?;
                self.handle_text(content);
            }
            // CData content is not escaped.
            Event::CData(ev) => {
                let content = String::from_utf8(normalize_line_endings(&ev).into_owned())?;
                self.handle_text(content);
            }
            Event::Comment(_) | Event::PI(_) | Event::Decl(_) | Event::DocType(_) => {}
            Event::Eof => {
                if self.read_opts.strict && !self.element_stack.is_empty() {
                    return Err(Error::MalformedXML(format!(
                        "unclosed element <{}>",
                        self.current.name(&self.document)
                    )));
                }
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn parse_content(&mut self, reader: &mut Reader<&[u8]>) -> Result<()> {
        let mut buf = Vec::with_capacity(200); // reduce time increasing capacity at start.
        loop {
            let ev = reader.read_event(&mut buf)?;
            trace!(event = ?ev);
            if self.handle_event(ev)? {
                return Ok(());
            }
            buf.clear();
        }
    }
}
