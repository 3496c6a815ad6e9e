use crate::error::{ErrorKind, ValidationError};
use itertools::Itertools;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::Value;
use std::fmt;

/// A JSON-Pointer (RFC 6901) path into the validated document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct JsonPointer(String);

impl JsonPointer {
    /// The pointer to the whole document (the empty string).
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Returns the pointer to a child of this location, escaping `~` and `/`.
    pub fn push(&self, token: impl fmt::Display) -> Self {
        let token = token.to_string().replace('~', "~0").replace('/', "~1");
        Self(format!("{}/{}", self.0, token))
    }

    /// Appends a relative pointer (itself rooted at `""`) to this one.
    pub fn join(&self, relative: &JsonPointer) -> Self {
        Self(format!("{}{}", self.0, relative.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "/")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl Serialize for JsonPointer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// One problem found in a document, located by its JSON pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub path: JsonPointer,
    pub error: ValidationError,
}

impl Diagnostic {
    pub fn new(path: JsonPointer, error: impl Into<ValidationError>) -> Self {
        Self {
            path,
            error: error.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.path, self.kind(), self.error)
    }
}

impl Serialize for Diagnostic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Diagnostic", 3)?;
        state.serialize_field("path", &self.path)?;
        state.serialize_field("kind", &self.kind())?;
        state.serialize_field("message", &self.message())?;
        state.end()
    }
}

/// The error-accumulation buffer owned by a single validation call.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: &JsonPointer, error: impl Into<ValidationError>) {
        self.entries.push(Diagnostic::new(path.clone(), error));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_report(self) -> Report {
        Report {
            diagnostics: self.entries,
        }
    }
}

/// The ordered outcome of validating one document. Empty means accepted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn is_accepted(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.diagnostics.iter().map(Diagnostic::kind).collect()
    }

    /// All diagnostics reported exactly at `path`.
    pub fn at(&self, path: &str) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.path.as_str() == path)
            .collect()
    }

    pub fn contains(&self, kind: ErrorKind, path: &str) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.kind() == kind && d.path.as_str() == path)
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(&self.diagnostics).unwrap_or(Value::Null)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.diagnostics.is_empty() {
            return write!(f, "accepted");
        }
        write!(f, "{}", self.diagnostics.iter().join("\n"))
    }
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.diagnostics.serialize(serializer)
    }
}

/// Describes a JSON value for use in diagnostic messages.
pub fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("the boolean {}", b),
        Value::Number(n) => format!("the number {}", n),
        Value::String(s) => format!("the string {:?}", s),
        Value::Array(items) => format!("an array of {} item(s)", items.len()),
        Value::Object(map) if map.is_empty() => "an empty object".to_string(),
        Value::Object(map) => format!("an object with keys [{}]", map.keys().join(", ")),
    }
}
