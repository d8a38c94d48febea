//! Placeholder mini-language for template strings
//!
//! A template string is scanned once into a [`TextTemplate`]. The grammar:
//!
//! ```text
//! text        := ( placeholder | literal )*
//! placeholder := "{{" identifier "}}"
//! identifier  := [a-zA-Z] [a-zA-Z0-9_]*
//! ```
//!
//! Anything that does not match `placeholder` is literal text, so `{{ x }}`,
//! `{{1}}` or a lone `{{` pass through untouched.
//!
//! Two rendering modes exist:
//!
//! | Form | Example | Result |
//! |------|---------|--------|
//! | Whole value | `"{{key}}"` | the model value itself, any JSON type |
//! | Interpolation | `"{{title}}:{{part}}"` | a string, each value stringified |
//!
//! Rendering is single pass: text produced by a substitution is never scanned
//! again.

use std::fmt;

use serde_json::{Map, Value};

/// A validated placeholder identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaceholderName(String);

impl PlaceholderName {
    /// Validate and wrap an identifier.
    ///
    /// Returns `None` unless `name` matches `[a-zA-Z][a-zA-Z0-9_]*`.
    pub fn new(name: &str) -> Option<Self> {
        (identifier_len(name.as_bytes()) == name.len() && !name.is_empty())
            .then(|| PlaceholderName(name.to_string()))
    }

    /// Get the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaceholderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{{{}}}}}", self.0)
    }
}

/// One piece of an interpolated string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text copied verbatim
    Literal(String),
    /// Replaced by the stringified model value
    Placeholder(PlaceholderName),
}

/// A parsed template string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextTemplate {
    /// No placeholders at all
    Literal(String),
    /// The entire string is a single placeholder; substitution keeps the
    /// value's type
    Whole(PlaceholderName),
    /// One or more placeholders embedded in text; substitution produces a
    /// string
    Interpolated(Vec<Segment>),
}

impl TextTemplate {
    /// Scan a string into its template form.
    pub fn parse(text: &str) -> Self {
        let segments = scan(text);
        let placeholder_count = segments
            .iter()
            .filter(|s| matches!(s, Segment::Placeholder(_)))
            .count();

        match (placeholder_count, segments.as_slice()) {
            (0, _) => TextTemplate::Literal(text.to_string()),
            (1, [Segment::Placeholder(name)]) => TextTemplate::Whole(name.clone()),
            _ => TextTemplate::Interpolated(segments),
        }
    }

    /// Whether rendering depends on the model at all.
    pub fn has_placeholders(&self) -> bool {
        !matches!(self, TextTemplate::Literal(_))
    }

    /// Placeholder names referenced by this string, in order of appearance.
    pub fn placeholders(&self) -> Vec<&PlaceholderName> {
        match self {
            TextTemplate::Literal(_) => Vec::new(),
            TextTemplate::Whole(name) => vec![name],
            TextTemplate::Interpolated(segments) => segments
                .iter()
                .filter_map(|s| match s {
                    Segment::Placeholder(name) => Some(name),
                    Segment::Literal(_) => None,
                })
                .collect(),
        }
    }

    /// Substitute model values.
    ///
    /// Returns `None` only for a whole-value placeholder whose name is absent
    /// from the model; the caller decides what "absent" means at that
    /// position. Interpolation of an absent name inserts nothing.
    pub fn render(&self, fields: &Map<String, Value>) -> Option<Value> {
        match self {
            TextTemplate::Literal(text) => Some(Value::String(text.clone())),
            TextTemplate::Whole(name) => fields.get(name.as_str()).cloned(),
            TextTemplate::Interpolated(segments) => {
                let mut out = String::new();
                for segment in segments {
                    match segment {
                        Segment::Literal(text) => out.push_str(text),
                        Segment::Placeholder(name) => {
                            if let Some(value) = fields.get(name.as_str()) {
                                out.push_str(&stringify(value));
                            }
                        }
                    }
                }
                Some(Value::String(out))
            }
        }
    }
}

/// Text form of a value when it is embedded inside a larger string.
///
/// Strings are inserted without quotes; everything else uses its compact
/// JSON text.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Whether `text` contains at least one well-formed placeholder.
pub fn contains_placeholder(text: &str) -> bool {
    scan(text)
        .iter()
        .any(|s| matches!(s, Segment::Placeholder(_)))
}

fn scan(text: &str) -> Vec<Segment> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find("{{") {
        let open = cursor + offset;
        let name_start = open + 2;
        let name_end = name_start + identifier_len(&bytes[name_start..]);

        if name_end > name_start && bytes[name_end..].starts_with(b"}}") {
            if literal_start < open {
                segments.push(Segment::Literal(text[literal_start..open].to_string()));
            }
            segments.push(Segment::Placeholder(PlaceholderName(
                text[name_start..name_end].to_string(),
            )));
            cursor = name_end + 2;
            literal_start = cursor;
        } else {
            // `{` is one byte, so the next scan starts on a char boundary
            cursor = open + 1;
        }
    }

    if literal_start < text.len() {
        segments.push(Segment::Literal(text[literal_start..].to_string()));
    }
    segments
}

fn identifier_len(bytes: &[u8]) -> usize {
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() => {
            1 + bytes[1..]
                .iter()
                .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
                .count()
        }
        _ => 0,
    }
}
