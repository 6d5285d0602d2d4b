//! Relaxed JSON document tree (JSON plus comments and trailing commas).
//!
//! ## Shape
//! Every [`Value`] owns the raw whitespace/comments directly `before` and
//! `after` it, so printing a parsed tree with `Display` reproduces the source
//! byte for byte. Object member names are themselves `Value`s holding a string
//! literal; their `before` is the gap after the previous comma (or the opening
//! brace) and their `after` is the gap before the colon.
//!
//! ## Files
//! - `parse.rs` — text to tree, with line/column errors.
//! - `format.rs` — canonical pretty-printing that keeps comments.
//! - `patch.rs` — JSON Patch (add/replace/remove) over JSON Pointer paths.
//!
//! Literal validation and decoding are delegated to `serde_json`, so numbers
//! and strings follow the exact JSON grammar.

mod format;
mod parse;
mod patch;

use std::fmt;

pub use parse::{parse_bytes, ParseError};
#[cfg(test)]
pub(crate) use parse::parse;
pub use patch::{patch, Operation, PatchError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    pub before: String,
    pub kind: Kind,
    pub after: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    Literal(Literal),
    Object(Object),
    Array(Array),
}

/// Raw JSON text of a string, number, `true`, `false` or `null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal(String);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Object {
    pub members: Vec<Member>,
    pub trailing_comma: bool,
    /// Whitespace and comments between the last member (or its comma) and `}`.
    pub close: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: Value,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Array {
    pub elements: Vec<Value>,
    pub trailing_comma: bool,
    pub close: String,
}

impl Literal {
    pub(crate) fn from_raw(raw: String) -> Self {
        Literal(raw)
    }

    pub fn string(s: &str) -> Self {
        Literal(serde_json::Value::String(s.to_string()).to_string())
    }

    pub fn raw(&self) -> &str {
        &self.0
    }

    /// Decoded contents when the literal is a JSON string.
    pub fn as_str(&self) -> Option<String> {
        if !self.0.starts_with('"') {
            return None;
        }
        serde_json::from_str(&self.0).ok()
    }
}

impl Value {
    pub fn new(kind: Kind) -> Self {
        Value {
            before: String::new(),
            kind,
            after: String::new(),
        }
    }

    /// Builds a tree from plain JSON. Non-empty objects and arrays are laid
    /// out one entry per line so that formatting expands them.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Object(map) => {
                let members: Vec<Member> = map
                    .iter()
                    .map(|(name, value)| Member::new(name, Value::from_json(value)))
                    .collect();
                let expanded = !members.is_empty();
                Value::new(Kind::Object(Object {
                    members,
                    trailing_comma: expanded,
                    close: if expanded { "\n".into() } else { String::new() },
                }))
            }
            serde_json::Value::Array(items) => {
                let elements: Vec<Value> = items
                    .iter()
                    .map(|item| {
                        let mut element = Value::from_json(item);
                        element.before = "\n".into();
                        element
                    })
                    .collect();
                let expanded = !elements.is_empty();
                Value::new(Kind::Array(Array {
                    elements,
                    trailing_comma: expanded,
                    close: if expanded { "\n".into() } else { String::new() },
                }))
            }
            scalar => Value::new(Kind::Literal(Literal(scalar.to_string()))),
        }
    }

    /// Standard JSON meaning of the tree; comments and layout are dropped.
    pub fn to_json(&self) -> serde_json::Value {
        match &self.kind {
            Kind::Literal(lit) => serde_json::from_str(&lit.0).unwrap_or(serde_json::Value::Null),
            Kind::Object(obj) => {
                let mut map = serde_json::Map::new();
                for member in &obj.members {
                    if let Some(name) = member.name_str() {
                        map.insert(name, member.value.to_json());
                    }
                }
                serde_json::Value::Object(map)
            }
            Kind::Array(arr) => {
                serde_json::Value::Array(arr.elements.iter().map(Value::to_json).collect())
            }
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match &self.kind {
            Kind::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

impl Member {
    /// A member placed on its own line, as patching inserts them.
    pub fn new(name: &str, mut value: Value) -> Self {
        value.before = " ".into();
        Member {
            name: Value {
                before: "\n".into(),
                kind: Kind::Literal(Literal::string(name)),
                after: String::new(),
            },
            value,
        }
    }

    pub fn name_str(&self) -> Option<String> {
        match &self.name.kind {
            Kind::Literal(lit) => lit.as_str(),
            _ => None,
        }
    }
}

impl Object {
    // Duplicate names resolve to the last occurrence, like JSON decoders do.
    fn position(&self, name: &str) -> Option<usize> {
        self.members
            .iter()
            .rposition(|m| m.name_str().as_deref() == Some(name))
    }

    pub fn get(&self, name: &str) -> Option<&Member> {
        self.position(name).map(|i| &self.members[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Member> {
        self.position(name).map(move |i| &mut self.members[i])
    }

    pub fn push(&mut self, name: &str, value: Value) {
        self.members.push(Member::new(name, value));
    }

    pub fn remove(&mut self, name: &str) -> Option<Member> {
        let removed = self.position(name).map(|i| self.members.remove(i));
        if self.members.is_empty() {
            self.trailing_comma = false;
        }
        removed
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.before)?;
        match &self.kind {
            Kind::Literal(lit) => f.write_str(&lit.0)?,
            Kind::Object(obj) => {
                f.write_str("{")?;
                for (i, member) in obj.members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}:{}", member.name, member.value)?;
                }
                if obj.trailing_comma && !obj.members.is_empty() {
                    f.write_str(",")?;
                }
                f.write_str(&obj.close)?;
                f.write_str("}")?;
            }
            Kind::Array(arr) => {
                f.write_str("[")?;
                for (i, element) in arr.elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", element)?;
                }
                if arr.trailing_comma && !arr.elements.is_empty() {
                    f.write_str(",")?;
                }
                f.write_str(&arr.close)?;
                f.write_str("]")?;
            }
        }
        f.write_str(&self.after)
    }
}
