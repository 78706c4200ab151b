//! Property-list document model and parser
//!
//! Music-library exports are Apple plist XML: nested `<dict>`/`<array>`
//! containers whose leaves are typed by their tag (`<string>`, `<integer>`,
//! `<date>`, ...). The parser walks the XML event stream once and builds an
//! ordered tree. Dictionaries keep their entries in document order, so
//! duplicate keys are preserved and lookups see the first one.

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use crate::error::{Error, Result};

/// A plist value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Dict(Dict),
    Array(Vec<Value>),
    String(String),
    /// Integer text as written; coercion happens downstream
    Integer(String),
    /// ISO-8601 date text as written
    Date(String),
    Real(String),
    Data(String),
    Bool(bool),
}

impl Value {
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Tag name of the value, for log messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Dict(_) => "dict",
            Value::Array(_) => "array",
            Value::String(_) => "string",
            Value::Integer(_) => "integer",
            Value::Date(_) => "date",
            Value::Real(_) => "real",
            Value::Data(_) => "data",
            Value::Bool(_) => "bool",
        }
    }
}

/// Ordered `<dict>` entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dict {
    entries: Vec<(String, Value)>,
}

impl Dict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.entries.push((key.into(), value));
    }

    /// First value stored under `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Dict {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Container under construction
enum Frame {
    Dict {
        dict: Dict,
        pending_key: Option<String>,
    },
    Array(Vec<Value>),
}

impl Frame {
    fn dict() -> Self {
        Frame::Dict {
            dict: Dict::new(),
            pending_key: None,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Frame::Dict { dict, .. } => Value::Dict(dict),
            Frame::Array(items) => Value::Array(items),
        }
    }
}

/// Parse a plist document whose top-level value is a dictionary
pub fn parse(document: &str) -> Result<Dict> {
    match parse_value(document)? {
        Value::Dict(dict) => Ok(dict),
        other => Err(Error::Format(format!(
            "top-level value is a {}, expected a dict",
            other.kind_name()
        ))),
    }
}

/// Parse a plist document into its top-level value
///
/// The `<plist>` wrapper, prolog, DOCTYPE and comments are skipped. Elements
/// that are not part of the plist vocabulary are skipped whole.
pub fn parse_value(document: &str) -> Result<Value> {
    let mut reader = Reader::from_str(document);
    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<Value> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"plist" => {}
                b"dict" => stack.push(Frame::dict()),
                b"array" => stack.push(Frame::Array(Vec::new())),
                b"key" => {
                    let key = read_text(&mut reader)?;
                    set_key(&mut stack, key)?;
                }
                tag => {
                    if let Some(kind) = LeafTag::from_tag(tag) {
                        let text = read_text(&mut reader)?;
                        attach(&mut stack, &mut root, kind.value(text))?;
                    } else {
                        debug!(
                            "Skipping unknown element <{}>",
                            String::from_utf8_lossy(tag)
                        );
                        reader.read_to_end(e.name())?;
                    }
                }
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"dict" => attach(&mut stack, &mut root, Value::Dict(Dict::new()))?,
                b"array" => attach(&mut stack, &mut root, Value::Array(Vec::new()))?,
                b"key" => set_key(&mut stack, String::new())?,
                tag => {
                    if let Some(kind) = LeafTag::from_tag(tag) {
                        attach(&mut stack, &mut root, kind.value(String::new()))?;
                    }
                }
            },
            Event::End(e) => {
                if matches!(e.name().as_ref(), b"dict" | b"array") {
                    let frame = stack
                        .pop()
                        .ok_or_else(|| Error::Format("unbalanced container end".into()))?;
                    attach(&mut stack, &mut root, frame.into_value())?;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(Error::Format(format!(
            "document ends with {} unclosed container(s)",
            stack.len()
        )));
    }

    root.ok_or_else(|| Error::Format("document has no top-level value".into()))
}

/// Leaf element kinds
#[derive(Debug, Clone, Copy)]
enum LeafTag {
    String,
    Integer,
    Date,
    Real,
    Data,
    True,
    False,
}

impl LeafTag {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"string" => Some(LeafTag::String),
            b"integer" => Some(LeafTag::Integer),
            b"date" => Some(LeafTag::Date),
            b"real" => Some(LeafTag::Real),
            b"data" => Some(LeafTag::Data),
            b"true" => Some(LeafTag::True),
            b"false" => Some(LeafTag::False),
            _ => None,
        }
    }

    fn value(self, text: String) -> Value {
        match self {
            LeafTag::String => Value::String(text),
            LeafTag::Integer => Value::Integer(text),
            LeafTag::Date => Value::Date(text),
            LeafTag::Real => Value::Real(text),
            LeafTag::Data => Value::Data(text),
            LeafTag::True => Value::Bool(true),
            LeafTag::False => Value::Bool(false),
        }
    }
}

/// Read the text content of the element just opened, up to its end tag
fn read_text(reader: &mut Reader<&[u8]>) -> Result<String> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(t) => text.push_str(&t.unescape()?),
            Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c)),
            Event::Start(e) => {
                reader.read_to_end(e.name())?;
            }
            Event::End(_) => return Ok(text),
            Event::Eof => {
                return Err(Error::Format("document ends inside a text element".into()));
            }
            _ => {}
        }
    }
}

fn set_key(stack: &mut [Frame], key: String) -> Result<()> {
    match stack.last_mut() {
        Some(Frame::Dict { pending_key, .. }) => {
            if let Some(dangling) = pending_key.replace(key) {
                debug!("Key {:?} has no value", dangling);
            }
            Ok(())
        }
        _ => Err(Error::Format("<key> outside of a dict".into())),
    }
}

fn attach(stack: &mut [Frame], root: &mut Option<Value>, value: Value) -> Result<()> {
    match stack.last_mut() {
        None => {
            if root.is_none() {
                *root = Some(value);
            }
            Ok(())
        }
        Some(Frame::Array(items)) => {
            items.push(value);
            Ok(())
        }
        Some(Frame::Dict { dict, pending_key }) => match pending_key.take() {
            Some(key) => {
                dict.insert(key, value);
                Ok(())
            }
            None => Err(Error::Format(format!(
                "<{}> in a dict without a preceding <key>",
                value.kind_name()
            ))),
        },
    }
}
