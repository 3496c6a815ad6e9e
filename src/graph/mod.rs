//! The graph integrity checker.
//!
//! Runs over the nodes that survived the structural pass: successor indices must
//! land inside the node array, property references must respect the reserved
//! namespaces, and every embedded expression is handed to the type-checker with
//! the family its use site expects. Cycles are allowed and reachability from the
//! first node is not checked.

use crate::diagnostic::{Diagnostics, JsonPointer};
use crate::error::{GraphError, TypeError};
use crate::logic::{Expectation, TypeChecker, TypeFamily};
use crate::property::{is_context_data_reference, reserved_namespace};
use crate::schema::{
    ButtonOptions, CardContent, Logic, LogicData, Node, ParsedDocument, PropertiesObject,
    Successor, TapOptions, Trigger,
};
use std::collections::BTreeMap;

const BOOLEAN: Expectation = Expectation::Family(TypeFamily::Boolean);

#[derive(Debug, Clone, Copy)]
pub struct GraphChecker<'g> {
    types: TypeChecker<'g>,
}

impl<'g> GraphChecker<'g> {
    pub fn new(types: TypeChecker<'g>) -> Self {
        Self { types }
    }

    pub fn check_document(&self, document: &ParsedDocument, sink: &mut Diagnostics) {
        let root = JsonPointer::root();
        if let Some(trigger) = &document.trigger {
            self.check_trigger(trigger, &root.push("trigger"), sink);
        }
        self.check_nodes(&document.nodes, &root.push("nodes"), sink);
        if let Some(model) = &document.model {
            self.check_properties(model, &root.push("model"), sink);
        }
        if let Some(entities) = &document.entities {
            self.check_properties(entities, &root.push("entities"), sink);
        }
    }

    pub fn check_trigger(&self, trigger: &Trigger, path: &JsonPointer, sink: &mut Diagnostics) {
        if let Trigger::CustomEvent {
            output: Some(output),
            ..
        } = trigger
        {
            self.writable(output, &path.push("output"), sink);
        }
    }

    /// Checks every parsed node. Slots that failed the structural pass still count
    /// toward the length successor indices are bounded by.
    pub fn check_nodes(&self, nodes: &[Option<Node>], path: &JsonPointer, sink: &mut Diagnostics) {
        let before = sink.len();
        for (index, node) in nodes.iter().enumerate() {
            if let Some(node) = node {
                self.check_node(index, node, nodes.len(), &path.push(index), sink);
            }
        }
        tracing::debug!(
            nodes = nodes.len(),
            diagnostics = sink.len() - before,
            "node graph checked"
        );
    }

    pub fn check_node(
        &self,
        index: usize,
        node: &Node,
        len: usize,
        path: &JsonPointer,
        sink: &mut Diagnostics,
    ) {
        for (field, successor) in node.successors() {
            self.successor(index, field, successor, len, &path.push(field), sink);
        }

        match node {
            Node::Action {
                body_outputs,
                header_outputs,
                ..
            } => {
                let outputs = path.push("outputs");
                if let Some(body) = body_outputs {
                    self.check_properties(body, &outputs.push("body"), sink);
                }
                if let Some(header) = header_outputs {
                    self.check_properties(header, &outputs.push("header"), sink);
                }
            }
            Node::DownloadAction { header_outputs, .. } => {
                if let Some(header) = header_outputs {
                    self.check_properties(header, &path.push("outputs").push("header"), sink);
                }
            }
            Node::Card { content, .. } => self.card(content, &path.push("content"), sink),
            Node::CardCollection {
                list_name,
                content,
                output,
                ..
            } => {
                self.writable(list_name, &path.push("listName"), sink);
                self.card(content, &path.push("content"), sink);
                self.writable(output, &path.push("output"), sink);
            }
            Node::ChoicePrompt {
                list_name,
                display_name,
                output,
                ..
            } => {
                self.writable(list_name, &path.push("listName"), sink);
                if let Some(display_name) = display_name {
                    self.writable(display_name, &path.push("displayName"), sink);
                }
                self.writable(output, &path.push("output"), sink);
            }
            Node::ConfirmationPrompt { output, .. } => {
                self.writable(output, &path.push("output"), sink)
            }
            Node::CustomCardCollection {
                list_name,
                output_operation,
                output,
                validation,
                ..
            } => {
                self.writable(list_name, &path.push("listName"), sink);
                if let Some(operation) = output_operation {
                    let at = path.push("outputOperation");
                    self.expression(&operation.operation, &at.push("operation"), Expectation::Logic, sink);
                    self.writable(&operation.output, &at.push("output"), sink);
                }
                self.writable(output, &path.push("output"), sink);
                if let Some(validation) = validation {
                    self.expression(validation, &path.push("validation"), Expectation::Logic, sink);
                }
            }
            Node::CustomEvent { data, .. } => {
                if let Some(data) = data {
                    self.logic_data(data, &path.push("data"), sink);
                }
            }
            Node::Decision { rule, .. } => {
                self.expression(rule, &path.push("rule"), BOOLEAN, sink);
            }
            Node::Dialogue {
                inputs, outputs, ..
            } => {
                if let Some(inputs) = inputs {
                    self.inputs(inputs, &path.push("inputs"), sink);
                }
                if let Some(outputs) = outputs {
                    self.outputs(outputs, &path.push("outputs"), sink);
                }
            }
            Node::Operation {
                operation, output, ..
            } => {
                self.expression(operation, &path.push("operation"), Expectation::Logic, sink);
                self.writable(output, &path.push("output"), sink);
            }
            Node::RepeatDialogue {
                inputs,
                outputs,
                repeat_until,
                ..
            } => {
                self.inputs(inputs, &path.push("inputs"), sink);
                self.outputs(outputs, &path.push("outputs"), sink);
                self.expression(repeat_until, &path.push("repeatUntil"), Expectation::Logic, sink);
            }
            Node::SequenceDialogue {
                inputs, list_name, ..
            } => {
                if let Some(inputs) = inputs {
                    self.inputs(inputs, &path.push("inputs"), sink);
                }
                self.writable(list_name, &path.push("listName"), sink);
            }
            Node::SimplePrompt {
                output, validation, ..
            } => {
                self.writable(output, &path.push("output"), sink);
                if let Some(validation) = validation {
                    self.expression(validation, &path.push("validation"), Expectation::Logic, sink);
                }
            }
            Node::AttachmentPrompt { .. } | Node::Event { .. } | Node::Message { .. } => {}
        }
    }

    /// Every key of a properties object is a write target.
    pub fn check_properties(
        &self,
        properties: &PropertiesObject,
        path: &JsonPointer,
        sink: &mut Diagnostics,
    ) {
        for key in properties.keys() {
            self.writable(key, &path.push(key), sink);
        }
    }

    fn successor(
        &self,
        node: usize,
        field: &str,
        successor: &Successor,
        len: usize,
        path: &JsonPointer,
        sink: &mut Diagnostics,
    ) {
        let Some(target) = successor else {
            return;
        };
        let in_range = target
            .as_u64()
            .and_then(|index| usize::try_from(index).ok())
            .is_some_and(|index| index < len);
        if !in_range {
            sink.push(
                path,
                GraphError::DanglingReference {
                    node,
                    field: field.to_string(),
                    index: target.to_string(),
                    len,
                },
            );
        }
    }

    fn card(&self, content: &CardContent, path: &JsonPointer, sink: &mut Diagnostics) {
        if let Some(is_thumbnail) = &content.is_thumbnail {
            self.expression(is_thumbnail, &path.push("isThumbnail"), BOOLEAN, sink);
        }
        if let Some(TapOptions {
            display_name,
            output,
            ..
        }) = &content.tap_options
        {
            let at = path.push("tapOptions");
            self.writable(display_name, &at.push("displayName"), sink);
            self.writable(output, &at.push("output"), sink);
        }
        if let Some(ButtonOptions {
            list_name,
            display_name,
            output,
        }) = &content.button_options
        {
            let at = path.push("buttonOptions");
            self.writable(list_name, &at.push("listName"), sink);
            if let Some(display_name) = display_name {
                self.writable(display_name, &at.push("displayName"), sink);
            }
            self.writable(output, &at.push("output"), sink);
        }
    }

    fn inputs(&self, inputs: &BTreeMap<String, Logic>, path: &JsonPointer, sink: &mut Diagnostics) {
        for (key, input) in inputs {
            self.expression(input, &path.push(key), Expectation::Logic, sink);
        }
    }

    fn outputs(
        &self,
        outputs: &BTreeMap<String, LogicData>,
        path: &JsonPointer,
        sink: &mut Diagnostics,
    ) {
        for (key, data) in outputs {
            let at = path.push(key);
            self.writable(key, &at, sink);
            self.logic_data(data, &at, sink);
        }
    }

    fn expression(
        &self,
        logic: &Logic,
        path: &JsonPointer,
        expect: Expectation,
        sink: &mut Diagnostics,
    ) {
        self.types.check(logic.value(), path, expect, sink);
    }

    fn writable(&self, reference: &str, path: &JsonPointer, sink: &mut Diagnostics) {
        if let Some(namespace) = reserved_namespace(reference) {
            sink.push(
                path,
                TypeError::ReservedNamespace {
                    reference: reference.to_string(),
                    namespace,
                },
            );
        }
    }

    /// `{"var": ...}` in a read position: the well-known system references are allowed.
    fn logic_data(&self, data: &LogicData, path: &JsonPointer, sink: &mut Diagnostics) {
        if is_context_data_reference(&data.var) {
            return;
        }
        self.writable(&data.var, &path.push("var"), sink);
    }
}
