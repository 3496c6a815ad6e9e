//! The structural validator.
//!
//! Reads a JSON document into the typed [`DialogueDefinition`] tree, checking
//! required keys, closed field sets, primitive types, string patterns and
//! length limits along the way. Everything that needs cross-references or the
//! expression grammar (successor bounds, reserved namespaces, expression
//! families) is left to the graph pass, which runs over whatever parsed here.

mod content;
pub mod definition;
mod node;
mod reader;
mod trigger;
mod values;

pub use definition::*;

use crate::diagnostic::{Diagnostics, JsonPointer};
use crate::error::StructuralError;
use reader::{ObjectReader, Variants};
use serde_json::Value;

/// The outcome of the structural pass over a whole document.
///
/// Parts that failed to parse are `None`; `nodes` keeps one slot per array
/// element so node positions stay meaningful for the graph pass.
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    pub id: Option<String>,
    pub trigger: Option<Trigger>,
    pub nodes: Vec<Option<Node>>,
    pub model: Option<PropertiesObject>,
    pub entities: Option<PropertiesObject>,
    pub background: Option<bool>,
    complete: bool,
}

impl ParsedDocument {
    /// True when the structural pass reported nothing.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Converts into the typed definition, if every part parsed.
    pub fn into_definition(self) -> Option<DialogueDefinition> {
        if !self.complete {
            return None;
        }
        Some(DialogueDefinition {
            id: self.id?,
            trigger: self.trigger?,
            nodes: self.nodes.into_iter().collect::<Option<Vec<_>>>()?,
            model: self.model,
            entities: self.entities,
            background: self.background,
        })
    }
}

/// Checks the shape of documents and fragments against the dialogue grammar.
pub struct StructuralValidator {
    triggers: Variants<Trigger>,
    nodes: Variants<Node>,
}

impl StructuralValidator {
    pub fn new() -> Self {
        let mut triggers = Variants::new("trigger");
        trigger::register_default_triggers(&mut triggers);
        let mut nodes = Variants::new("node");
        node::register_default_nodes(&mut nodes);
        tracing::trace!(
            triggers = triggers.len(),
            nodes = nodes.len(),
            "structural grammar ready"
        );
        Self { triggers, nodes }
    }

    pub fn validate_document(&self, value: &Value, sink: &mut Diagnostics) -> ParsedDocument {
        let before = sink.len();
        let root = JsonPointer::root();
        let mut document = ParsedDocument::default();
        let Some(mut reader) = ObjectReader::open(value, &root, "a dialogue object", sink) else {
            return document;
        };

        document.trigger = reader
            .required("trigger", |value, path, sink| self.triggers.parse(value, path, sink));
        document.nodes = reader
            .required("nodes", |value, path, sink| {
                Some(self.parse_nodes(value, path, sink))
            })
            .unwrap_or_default();
        document.id = reader.required("id", values::non_empty_string);
        document.model = reader
            .optional("model", values::properties_object)
            .flatten();
        document.entities = reader
            .optional("entities", values::properties_object)
            .flatten();
        document.background = reader.optional("background", values::boolean).flatten();
        let fields_parsed = reader.finish().is_some();
        document.complete = fields_parsed && sink.len() == before;
        document
    }

    pub fn validate_trigger(
        &self,
        value: &Value,
        path: &JsonPointer,
        sink: &mut Diagnostics,
    ) -> Option<Trigger> {
        self.triggers.parse(value, path, sink)
    }

    /// Parses a node array. The result has one slot per element even when some fail.
    pub fn validate_nodes(
        &self,
        value: &Value,
        path: &JsonPointer,
        sink: &mut Diagnostics,
    ) -> Vec<Option<Node>> {
        self.parse_nodes(value, path, sink)
    }

    pub fn validate_node(
        &self,
        value: &Value,
        path: &JsonPointer,
        sink: &mut Diagnostics,
    ) -> Option<Node> {
        self.nodes.parse(value, path, sink)
    }

    pub fn validate_properties(
        &self,
        value: &Value,
        path: &JsonPointer,
        sink: &mut Diagnostics,
    ) -> Option<PropertiesObject> {
        values::properties_object(value, path, sink)
    }

    fn parse_nodes(
        &self,
        value: &Value,
        path: &JsonPointer,
        sink: &mut Diagnostics,
    ) -> Vec<Option<Node>> {
        let Some(items) = value.as_array() else {
            sink.push(
                path,
                StructuralError::InvalidType {
                    expected: "an array of nodes".to_string(),
                    found: crate::diagnostic::describe(value),
                },
            );
            return Vec::new();
        };
        if items.is_empty() {
            sink.push(
                path,
                StructuralError::CardinalityMismatch {
                    expected: "at least 1 node".to_string(),
                    found: "0 nodes".to_string(),
                },
            );
        }
        items
            .iter()
            .enumerate()
            .map(|(index, item)| self.nodes.parse(item, &path.push(index), sink))
            .collect()
    }
}

impl Default for StructuralValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StructuralValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StructuralValidator")
            .field("triggers", &self.triggers.len())
            .field("nodes", &self.nodes.len())
            .finish()
    }
}
