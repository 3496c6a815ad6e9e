//! Parsers for the value shapes shared between triggers, nodes and the document.
//!
//! Every parser has the same shape: it receives the value, its pointer and the
//! diagnostics buffer, and returns `None` after reporting why the value was rejected.

use super::definition::{CustomContent, Logic, LogicData, MessageValue, PropertiesObject, PropertyValue, Successor};
use super::reader::ObjectReader;
use crate::diagnostic::{Diagnostics, JsonPointer, describe};
use crate::error::StructuralError;
use crate::property::{is_alphanumeric_key, is_blob_reference, is_language_reference};
use ahash::AHashSet;
use itertools::Itertools;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

const OUTPUT_SHORT_MAX: usize = 320;

fn invalid_type(path: &JsonPointer, expected: &str, value: &Value, sink: &mut Diagnostics) {
    sink.push(
        path,
        StructuralError::InvalidType {
            expected: expected.to_string(),
            found: describe(value),
        },
    );
}

fn pattern_mismatch(path: &JsonPointer, expected: &str, value: &str, sink: &mut Diagnostics) {
    sink.push(
        path,
        StructuralError::PatternMismatch {
            expected: expected.to_string(),
            value: format!("{:?}", value),
        },
    );
}

pub(crate) fn string(value: &Value, path: &JsonPointer, sink: &mut Diagnostics) -> Option<String> {
    match value.as_str() {
        Some(s) => Some(s.to_string()),
        None => {
            invalid_type(path, "a string", value, sink);
            None
        }
    }
}

fn bounded_string(
    value: &Value,
    path: &JsonPointer,
    sink: &mut Diagnostics,
    max: Option<usize>,
) -> Option<String> {
    let text = string(value, path, sink)?;
    let len = text.chars().count();
    if len == 0 || max.is_some_and(|max| len > max) {
        let expected = match max {
            Some(max) => format!("a string of 1 to {} characters", max),
            None => "a non-empty string".to_string(),
        };
        sink.push(
            path,
            StructuralError::CardinalityMismatch {
                expected,
                found: format!("{} character(s)", len),
            },
        );
        return None;
    }
    Some(text)
}

/// A string of at least one character (dialogue ids, document ids).
pub(crate) fn non_empty_string(
    value: &Value,
    path: &JsonPointer,
    sink: &mut Diagnostics,
) -> Option<String> {
    bounded_string(value, path, sink, None)
}

pub(crate) fn output_short(
    value: &Value,
    path: &JsonPointer,
    sink: &mut Diagnostics,
) -> Option<String> {
    bounded_string(value, path, sink, Some(OUTPUT_SHORT_MAX))
}

pub(crate) fn output_long(
    value: &Value,
    path: &JsonPointer,
    sink: &mut Diagnostics,
) -> Option<String> {
    bounded_string(value, path, sink, None)
}

pub(crate) fn alphanumeric(
    value: &Value,
    path: &JsonPointer,
    sink: &mut Diagnostics,
) -> Option<String> {
    let text = string(value, path, sink)?;
    if !is_alphanumeric_key(&text) {
        pattern_mismatch(path, "^[a-zA-Z0-9]{1,128}$", &text, sink);
        return None;
    }
    Some(text)
}

pub(crate) fn blob_reference(
    value: &Value,
    path: &JsonPointer,
    sink: &mut Diagnostics,
) -> Option<String> {
    let text = string(value, path, sink)?;
    if !is_blob_reference(&text) {
        pattern_mismatch(path, "^(/*conversation/+)?[^/]+$", &text, sink);
        return None;
    }
    Some(text)
}

pub(crate) fn boolean(value: &Value, path: &JsonPointer, sink: &mut Diagnostics) -> Option<bool> {
    match value.as_bool() {
        Some(b) => Some(b),
        None => {
            invalid_type(path, "a boolean", value, sink);
            None
        }
    }
}

pub(crate) fn number(value: &Value, path: &JsonPointer, sink: &mut Diagnostics) -> Option<Number> {
    match value {
        Value::Number(n) => Some(n.clone()),
        other => {
            invalid_type(path, "a number", other, sink);
            None
        }
    }
}

/// `number | null`
pub(crate) fn successor(
    value: &Value,
    path: &JsonPointer,
    sink: &mut Diagnostics,
) -> Option<Successor> {
    match value {
        Value::Null => Some(None),
        Value::Number(n) => Some(Some(n.clone())),
        other => {
            invalid_type(path, "a node index or null", other, sink);
            None
        }
    }
}

pub(crate) fn json_object(
    value: &Value,
    path: &JsonPointer,
    sink: &mut Diagnostics,
) -> Option<Map<String, Value>> {
    match value.as_object() {
        Some(map) => Some(map.clone()),
        None => {
            invalid_type(path, "an object", value, sink);
            None
        }
    }
}

/// Any JSON value; the expression is typed later.
pub(crate) fn logic(value: &Value, _: &JsonPointer, _: &mut Diagnostics) -> Option<Logic> {
    Some(Logic(value.clone()))
}

/// Maps a string onto one of a closed set of choices.
pub(crate) fn enumerated<T: Copy>(
    value: &Value,
    path: &JsonPointer,
    sink: &mut Diagnostics,
    choices: &[(&str, T)],
) -> Option<T> {
    let text = string(value, path, sink)?;
    match choices.iter().find(|(name, _)| *name == text) {
        Some((_, choice)) => Some(*choice),
        None => {
            let expected = format!("one of {}", choices.iter().map(|(name, _)| name).join(", "));
            pattern_mismatch(path, &expected, &text, sink);
            None
        }
    }
}

/// An array whose items are each parsed by `item`, reporting every bad item.
pub(crate) fn array_of<T>(
    value: &Value,
    path: &JsonPointer,
    sink: &mut Diagnostics,
    expected: &str,
    mut item: impl FnMut(&Value, &JsonPointer, &mut Diagnostics) -> Option<T>,
) -> Option<Vec<T>> {
    let Some(items) = value.as_array() else {
        invalid_type(path, expected, value, sink);
        return None;
    };
    let parsed = items
        .iter()
        .enumerate()
        .map(|(index, value)| item(value, &path.push(index), sink))
        .collect_vec();
    parsed.into_iter().collect()
}

/// A non-empty array of unique strings.
pub(crate) fn mime_types(
    value: &Value,
    path: &JsonPointer,
    sink: &mut Diagnostics,
) -> Option<Vec<String>> {
    let Some(items) = value.as_array() else {
        invalid_type(path, "an array of content types", value, sink);
        return None;
    };
    if items.is_empty() {
        sink.push(
            path,
            StructuralError::CardinalityMismatch {
                expected: "at least 1 content type".to_string(),
                found: "0 items".to_string(),
            },
        );
        return None;
    }

    let mut seen = AHashSet::new();
    let mut types = Vec::with_capacity(items.len());
    let mut ok = true;
    for (index, item) in items.iter().enumerate() {
        let item_path = path.push(index);
        let Some(text) = string(item, &item_path, sink) else {
            ok = false;
            continue;
        };
        if !seen.insert(text.clone()) {
            sink.push(
                &item_path,
                StructuralError::CardinalityMismatch {
                    expected: "unique content types".to_string(),
                    found: format!("{:?} more than once", text),
                },
            );
            ok = false;
        }
        types.push(text);
    }
    ok.then_some(types)
}

/// `{"var": <reference>}`, read through the context-data rules.
pub(crate) fn logic_data(
    value: &Value,
    path: &JsonPointer,
    sink: &mut Diagnostics,
) -> Option<LogicData> {
    let mut reader = ObjectReader::open(value, path, "a {\"var\": ...} reference", sink)?;
    let var = reader.required("var", string);
    reader.finish()?;
    Some(LogicData { var: var? })
}

/// `{"var": "Language/<key>"}`
pub(crate) fn language_reference(
    value: &Value,
    path: &JsonPointer,
    sink: &mut Diagnostics,
) -> Option<String> {
    let mut reader = ObjectReader::open(value, path, "a language reference", sink)?;
    let var = reader.required("var", |value, path, sink| {
        let text = string(value, path, sink)?;
        if !is_language_reference(&text) {
            pattern_mismatch(path, "^/*Language/[a-zA-Z0-9]{1,128}$", &text, sink);
            return None;
        }
        Some(text)
    });
    reader.finish()?;
    var
}

/// An item of a message trigger: short text or a language reference.
pub(crate) fn message_value(
    value: &Value,
    path: &JsonPointer,
    sink: &mut Diagnostics,
) -> Option<MessageValue> {
    match value {
        Value::String(_) => output_short(value, path, sink).map(MessageValue::Text),
        Value::Object(_) => language_reference(value, path, sink).map(MessageValue::Language),
        other => {
            sink.push(
                path,
                StructuralError::VariantNotMatched {
                    union: "message value".to_string(),
                    reason: format!("expected text or a language reference, found {}", describe(other)),
                },
            );
            None
        }
    }
}

pub(crate) fn custom_content(
    value: &Value,
    path: &JsonPointer,
    sink: &mut Diagnostics,
) -> Option<CustomContent> {
    let mut reader = ObjectReader::open(value, path, "a custom content object", sink)?;
    let content_type = reader.required("contentType", string);
    let content = reader.required("content", json_object);
    reader.finish()?;
    Some(CustomContent {
        content_type: content_type?,
        content: content?,
    })
}

/// Applies `parse` to every member of an object, keeping going past failures.
fn object_members<T>(
    value: &Value,
    path: &JsonPointer,
    sink: &mut Diagnostics,
    expected: &str,
    mut parse: impl FnMut(&str, &Value, &JsonPointer, &mut Diagnostics) -> Option<T>,
) -> Option<BTreeMap<String, T>> {
    let Some(map) = value.as_object() else {
        invalid_type(path, expected, value, sink);
        return None;
    };
    let mut members = BTreeMap::new();
    let mut ok = true;
    for (key, member) in map {
        match parse(key, member, &path.push(key), sink) {
            Some(parsed) => {
                members.insert(key.clone(), parsed);
            }
            None => ok = false,
        }
    }
    ok.then_some(members)
}

/// A string, or a non-empty array of strings.
fn property_value(
    value: &Value,
    path: &JsonPointer,
    sink: &mut Diagnostics,
) -> Option<PropertyValue> {
    match value {
        Value::String(s) => Some(PropertyValue::Single(s.clone())),
        Value::Array(items) if items.is_empty() => {
            sink.push(
                path,
                StructuralError::CardinalityMismatch {
                    expected: "at least 1 string".to_string(),
                    found: "0 items".to_string(),
                },
            );
            None
        }
        Value::Array(items) => {
            let strings = items
                .iter()
                .enumerate()
                .map(|(index, item)| string(item, &path.push(index), sink))
                .collect_vec();
            strings
                .into_iter()
                .collect::<Option<Vec<_>>>()
                .map(PropertyValue::Many)
        }
        other => {
            sink.push(
                path,
                StructuralError::VariantNotMatched {
                    union: "property value".to_string(),
                    reason: format!(
                        "expected a string or an array of strings, found {}",
                        describe(other)
                    ),
                },
            );
            None
        }
    }
}

/// Keys are property references; their reserved-namespace check belongs to the graph pass.
pub(crate) fn properties_object(
    value: &Value,
    path: &JsonPointer,
    sink: &mut Diagnostics,
) -> Option<PropertiesObject> {
    object_members(value, path, sink, "a properties object", |_, member, path, sink| {
        property_value(member, path, sink)
    })
}

/// Dialogue inputs: alphanumeric keys mapped to expressions.
pub(crate) fn dialogue_inputs(
    value: &Value,
    path: &JsonPointer,
    sink: &mut Diagnostics,
) -> Option<BTreeMap<String, Logic>> {
    object_members(value, path, sink, "an inputs object", |key, member, path, sink| {
        if !is_alphanumeric_key(key) {
            sink.push(
                path,
                StructuralError::UnknownField {
                    field: key.to_string(),
                    found: describe(member),
                },
            );
        }
        logic(member, path, sink)
    })
}

/// Dialogue outputs: property references mapped to `{"var": ...}` lookups.
pub(crate) fn dialogue_outputs(
    value: &Value,
    path: &JsonPointer,
    sink: &mut Diagnostics,
) -> Option<BTreeMap<String, LogicData>> {
    object_members(value, path, sink, "an outputs object", |_, member, path, sink| {
        logic_data(member, path, sink)
    })
}

/// Service headers: non-empty names mapped to strings.
pub(crate) fn headers(
    value: &Value,
    path: &JsonPointer,
    sink: &mut Diagnostics,
) -> Option<BTreeMap<String, String>> {
    object_members(value, path, sink, "a headers object", |key, member, path, sink| {
        if key.is_empty() {
            sink.push(
                path,
                StructuralError::UnknownField {
                    field: key.to_string(),
                    found: describe(member),
                },
            );
        }
        string(member, path, sink)
    })
}
