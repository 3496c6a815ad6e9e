use crate::diagnostic::{Diagnostics, JsonPointer, describe};
use crate::error::StructuralError;
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use serde_json::{Map, Value};

/// Reads the fields of one closed JSON object, collecting every problem it meets.
///
/// Each field accessor records the key as declared; `finish` then reports any
/// key that was never declared as an `UnknownField`. A reader whose declared
/// fields were missing or invalid yields `None` from `finish`, so callers can
/// accumulate all field errors before bailing out with `?`. Undeclared keys are
/// reported but still let the typed value be built, so later passes see it.
pub(crate) struct ObjectReader<'v, 'd> {
    map: &'v Map<String, Value>,
    path: JsonPointer,
    sink: &'d mut Diagnostics,
    seen: AHashSet<&'static str>,
    failed: bool,
}

impl<'v, 'd> ObjectReader<'v, 'd> {
    pub(crate) fn open(
        value: &'v Value,
        path: &JsonPointer,
        expected: &str,
        sink: &'d mut Diagnostics,
    ) -> Option<Self> {
        let Some(map) = value.as_object() else {
            sink.push(
                path,
                StructuralError::InvalidType {
                    expected: expected.to_string(),
                    found: describe(value),
                },
            );
            return None;
        };
        Some(Self {
            map,
            path: path.clone(),
            sink,
            seen: AHashSet::new(),
            failed: false,
        })
    }

    /// Reads the `type` discriminator as a string.
    pub(crate) fn discriminator(&mut self) -> Option<&'v str> {
        let map = self.map;
        self.required("type", |value, path, sink| match value.as_str() {
            Some(_) => Some(()),
            None => {
                sink.push(
                    path,
                    StructuralError::InvalidType {
                        expected: "a type name string".to_string(),
                        found: describe(value),
                    },
                );
                None
            }
        })?;
        map.get("type").and_then(Value::as_str)
    }

    pub(crate) fn required<T>(
        &mut self,
        field: &'static str,
        parse: impl FnOnce(&'v Value, &JsonPointer, &mut Diagnostics) -> Option<T>,
    ) -> Option<T> {
        self.seen.insert(field);
        let Some(value) = self.map.get(field) else {
            self.sink.push(
                &self.path,
                StructuralError::MissingRequiredField {
                    field: field.to_string(),
                },
            );
            self.failed = true;
            return None;
        };
        let parsed = parse(value, &self.path.push(field), &mut *self.sink);
        self.failed |= parsed.is_none();
        parsed
    }

    /// Reads a field that may be absent. `Some(None)` means absent; `None` means invalid.
    pub(crate) fn optional<T>(
        &mut self,
        field: &'static str,
        parse: impl FnOnce(&'v Value, &JsonPointer, &mut Diagnostics) -> Option<T>,
    ) -> Option<Option<T>> {
        self.seen.insert(field);
        let Some(value) = self.map.get(field) else {
            return Some(None);
        };
        let parsed = parse(value, &self.path.push(field), &mut *self.sink);
        self.failed |= parsed.is_none();
        parsed.map(Some)
    }

    /// Requires at least one of `fields` to be present.
    pub(crate) fn any_of(&mut self, union: &str, fields: &[&str]) {
        if fields.iter().any(|field| self.map.contains_key(*field)) {
            return;
        }
        self.sink.push(
            &self.path,
            StructuralError::VariantNotMatched {
                union: union.to_string(),
                reason: format!("at least one of {} is required", fields.join(", ")),
            },
        );
        self.failed = true;
    }

    /// Reports undeclared keys. Returns `None` if a declared field was missing or invalid.
    pub(crate) fn finish(&mut self) -> Option<()> {
        let map = self.map;
        for (key, value) in map.iter().filter(|(key, _)| !self.seen.contains(key.as_str())) {
            self.sink.push(
                &self.path.push(key),
                StructuralError::UnknownField {
                    field: key.clone(),
                    found: describe(value),
                },
            );
        }
        (!self.failed).then_some(())
    }
}

/// Parses the body of one variant of a `type`-discriminated union.
pub(crate) trait VariantParser<T>: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn parse(&self, reader: &mut ObjectReader<'_, '_>) -> Option<T>;
}

/// A `type`-discriminated union: the registered variant parsers, keyed by type name.
pub(crate) struct Variants<T> {
    union: &'static str,
    parsers: AHashMap<&'static str, Box<dyn VariantParser<T>>>,
}

impl<T> Variants<T> {
    pub(crate) fn new(union: &'static str) -> Self {
        Self {
            union,
            parsers: AHashMap::new(),
        }
    }

    pub(crate) fn register(&mut self, parser: Box<dyn VariantParser<T>>) {
        self.parsers.insert(parser.type_name(), parser);
    }

    pub(crate) fn len(&self) -> usize {
        self.parsers.len()
    }

    pub(crate) fn parse(
        &self,
        value: &Value,
        path: &JsonPointer,
        sink: &mut Diagnostics,
    ) -> Option<T> {
        let expected = format!("a {} object", self.union);
        let mut reader = ObjectReader::open(value, path, &expected, sink)?;
        let type_name = reader.discriminator()?;
        let Some(parser) = self.parsers.get(type_name) else {
            let known = self.parsers.keys().sorted().join(", ");
            reader.sink.push(
                &path.push("type"),
                StructuralError::VariantNotMatched {
                    union: self.union.to_string(),
                    reason: format!("type {:?} is not one of {}", type_name, known),
                },
            );
            return None;
        };
        tracing::trace!(path = %path, variant = type_name, "parsing {}", self.union);
        parser.parse(&mut reader)
    }
}
