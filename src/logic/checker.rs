use super::family::{Expectation, FamilySet, LiteralKind, Shape, TypeFamily};
use super::grammar::{Arity, Grammar, MethodSignature, Operand, Operands, Receiver, Signature};
use crate::diagnostic::{Diagnostics, JsonPointer, Report, describe};
use crate::error::{StructuralError, TypeError, ValidationError};
use crate::property::{is_context_data_reference, reserved_namespace};
use itertools::Itertools;
use serde_json::{Map, Value};

/// Infers and checks the family of expression trees against a shared `Grammar`.
///
/// The checker is stateless between calls; every call writes into the
/// diagnostics buffer it is handed.
#[derive(Debug, Clone, Copy)]
pub struct TypeChecker<'g> {
    grammar: &'g Grammar,
    max_depth: usize,
}

impl<'g> TypeChecker<'g> {
    pub fn new(grammar: &'g Grammar, max_depth: usize) -> Self {
        Self { grammar, max_depth }
    }

    /// Checks an expression at a use site and returns the family it was accepted as.
    ///
    /// Problems inside the expression are reported at their own paths; a use site
    /// whose expectation the expression cannot meet gets a `FamilyMismatch` at `path`.
    pub fn check(
        &self,
        value: &Value,
        path: &JsonPointer,
        expect: Expectation,
        sink: &mut Diagnostics,
    ) -> Option<TypeFamily> {
        let members = self.members(value, path, sink)?;
        match expect {
            Expectation::Logic => members.primary(),
            Expectation::Family(family) if members.contains(family) => Some(family),
            Expectation::Family(family) => {
                sink.push(
                    path,
                    TypeError::FamilyMismatch {
                        expected: family,
                        found: members.primary().unwrap_or(TypeFamily::Any),
                    },
                );
                None
            }
        }
    }

    /// Every family the expression belongs to, or `None` if it could not be classified.
    pub fn members(
        &self,
        value: &Value,
        path: &JsonPointer,
        sink: &mut Diagnostics,
    ) -> Option<FamilySet> {
        Walk {
            grammar: self.grammar,
            max_depth: self.max_depth,
            sink,
        }
        .infer(value, path, 0)
    }

    /// Infers the family of a standalone expression, optionally narrowed to `expected`.
    pub fn infer_type(
        &self,
        value: &Value,
        expected: Option<TypeFamily>,
    ) -> Result<TypeFamily, Report> {
        let mut sink = Diagnostics::new();
        let expect = expected.map_or(Expectation::Logic, Expectation::Family);
        let family = self.check(value, &JsonPointer::root(), expect, &mut sink);
        match family {
            Some(family) if sink.is_empty() => Ok(family),
            _ => Err(sink.into_report()),
        }
    }
}

/// One recursive pass over an expression tree.
struct Walk<'g, 's> {
    grammar: &'g Grammar,
    max_depth: usize,
    sink: &'s mut Diagnostics,
}

impl<'g> Walk<'g, '_> {
    fn infer(&mut self, value: &Value, path: &JsonPointer, depth: usize) -> Option<FamilySet> {
        if depth > self.max_depth {
            tracing::debug!(path = %path, limit = self.max_depth, "expression depth ceiling hit");
            self.sink.push(
                path,
                ValidationError::DepthExceeded {
                    limit: self.max_depth,
                },
            );
            return None;
        }

        let grammar = self.grammar;
        let literal = |kind| Some(grammar.members(Shape::Literal(kind)));
        match value {
            Value::Null => literal(LiteralKind::Null),
            Value::Bool(_) => literal(LiteralKind::Bool),
            Value::Number(_) => literal(LiteralKind::Number),
            Value::String(_) => literal(LiteralKind::Text),
            Value::Array(_) => {
                self.sink.push(
                    path,
                    StructuralError::InvalidType {
                        expected: "an expression".to_string(),
                        found: describe(value),
                    },
                );
                None
            }
            Value::Object(map) => self.call(map, path, depth),
        }
    }

    fn call(
        &mut self,
        map: &Map<String, Value>,
        path: &JsonPointer,
        depth: usize,
    ) -> Option<FamilySet> {
        let (key, args) = match map.iter().exactly_one() {
            Ok(entry) => entry,
            Err(_) => {
                self.sink.push(
                    path,
                    StructuralError::VariantNotMatched {
                        union: "expression".to_string(),
                        reason: format!(
                            "an operation must carry exactly one operator key, found {}",
                            map.len()
                        ),
                    },
                );
                return None;
            }
        };

        let at = path.push(key);
        let grammar = self.grammar;
        match key.as_str() {
            "var" => self.variable(args, &at),
            "current" => self.current(args, &at),
            "method" => self.method(args, &at, depth),
            _ => match grammar.operator(key) {
                Some(signature) => Some(self.operator(signature, args, &at, depth)),
                None => {
                    self.sink.push(
                        &at,
                        TypeError::UnknownOperator {
                            operator: key.clone(),
                        },
                    );
                    None
                }
            },
        }
    }

    /// `{"var": reference}`: a context lookup, readable through the system references.
    fn variable(&mut self, reference: &Value, at: &JsonPointer) -> Option<FamilySet> {
        let Some(reference) = reference.as_str() else {
            self.sink.push(
                at,
                StructuralError::InvalidType {
                    expected: "a property reference string".to_string(),
                    found: describe(reference),
                },
            );
            return None;
        };
        if !is_context_data_reference(reference) {
            if let Some(namespace) = reserved_namespace(reference) {
                self.sink.push(
                    at,
                    TypeError::ReservedNamespace {
                        reference: reference.to_string(),
                        namespace,
                    },
                );
            }
        }
        Some(self.grammar.members(Shape::AnyArm))
    }

    /// `{"current": tag}`: the item of the enclosing loop.
    fn current(&mut self, tag: &Value, at: &JsonPointer) -> Option<FamilySet> {
        if !tag.is_string() {
            self.sink.push(
                at,
                StructuralError::InvalidType {
                    expected: "a loop tag string".to_string(),
                    found: describe(tag),
                },
            );
            return None;
        }
        Some(self.grammar.members(Shape::AnyArm))
    }

    fn operator(
        &mut self,
        signature: &Signature,
        args: &Value,
        at: &JsonPointer,
        depth: usize,
    ) -> FamilySet {
        let result = self.grammar.members_of_result(signature.result);
        let name = signature.name;

        if signature.operands == Operands::Unary {
            match args {
                Value::Array(items) if items.len() != 1 => {
                    self.arity_mismatch(name, signature.arity, items.len(), at)
                }
                Value::Array(items) => {
                    self.operand(name, Operand::Expr(Expectation::Logic), &items[0], &at.push(0), depth)
                }
                bare => self.operand(name, Operand::Expr(Expectation::Logic), bare, at, depth),
            }
            return result;
        }

        let Some(items) = args.as_array() else {
            self.sink.push(
                at,
                StructuralError::InvalidType {
                    expected: format!("an argument array for '{}'", name),
                    found: describe(args),
                },
            );
            return result;
        };
        if !signature.arity.admits(items.len()) {
            self.arity_mismatch(name, signature.arity, items.len(), at);
            return result;
        }
        self.operands(name, signature.operands, items, at, depth);
        result
    }

    /// `{"method": [receiver, name, args?]}`
    fn method(&mut self, call: &Value, at: &JsonPointer, depth: usize) -> Option<FamilySet> {
        let Some(items) = call.as_array() else {
            self.sink.push(
                at,
                StructuralError::InvalidType {
                    expected: "a method call [receiver, name, arguments]".to_string(),
                    found: describe(call),
                },
            );
            return None;
        };
        let name_path = at.push(1);
        let Some(name) = items.get(1).and_then(Value::as_str) else {
            match items.get(1) {
                Some(other) => self.sink.push(
                    &name_path,
                    StructuralError::InvalidType {
                        expected: "a method name string".to_string(),
                        found: describe(other),
                    },
                ),
                None => self.sink.push(
                    at,
                    StructuralError::CardinalityMismatch {
                        expected: "a method call of 2 or 3 items".to_string(),
                        found: format!("{} item(s)", items.len()),
                    },
                ),
            }
            return None;
        };
        let grammar = self.grammar;
        let Some(overloads) = grammar.methods(name) else {
            self.sink.push(
                &name_path,
                TypeError::UnknownOperator {
                    operator: name.to_string(),
                },
            );
            return None;
        };

        let signature = overloads[0];
        let call_len = if signature.args.is_some() { 3 } else { 2 };
        if items.len() != call_len {
            self.sink.push(
                at,
                StructuralError::CardinalityMismatch {
                    expected: format!("a '{}' call of {} items", name, call_len),
                    found: format!("{} item(s)", items.len()),
                },
            );
            return None;
        }

        let receiver_path = at.push(0);
        let receiver = match signature.receiver {
            Receiver::Variable => self.variable_receiver(name, &items[0], &receiver_path),
            Receiver::Family(_) => self.infer(&items[0], &receiver_path, depth + 1),
        };

        if let Some((arity, operands)) = signature.args {
            let args_path = at.push(2);
            match items[2].as_array() {
                Some(args) if !arity.admits(args.len()) => {
                    self.arity_mismatch(name, arity, args.len(), &args_path)
                }
                Some(args) => self.operands(name, operands, args, &args_path, depth),
                None => self.sink.push(
                    &args_path,
                    StructuralError::InvalidType {
                        expected: format!("an argument array for '{}'", name),
                        found: describe(&items[2]),
                    },
                ),
            }
        }

        let all = self.results(overloads.iter());
        let Some(receiver) = receiver else {
            return Some(all);
        };
        let matching: Vec<&MethodSignature> = overloads
            .iter()
            .filter(|overload| match overload.receiver {
                Receiver::Variable => true,
                Receiver::Family(family) => receiver.contains(family),
            })
            .collect();
        if matching.is_empty() {
            let expected = overloads
                .iter()
                .filter_map(|overload| match overload.receiver {
                    Receiver::Family(family) => Some(family.to_string()),
                    Receiver::Variable => None,
                })
                .join(" or ");
            self.sink.push(
                &receiver_path,
                TypeError::OperandType {
                    operator: name.to_string(),
                    expected: format!("a {} receiver", expected),
                    found: found_description(receiver),
                },
            );
            return Some(all);
        }
        Some(self.results(matching.into_iter()))
    }

    fn results<'m>(&self, overloads: impl Iterator<Item = &'m MethodSignature>) -> FamilySet {
        overloads.fold(FamilySet::EMPTY, |set, overload| {
            set.union(self.grammar.members_of_result(overload.result))
        })
    }

    /// `getCount` is only defined on a literal variable lookup.
    fn variable_receiver(
        &mut self,
        name: &str,
        receiver: &Value,
        at: &JsonPointer,
    ) -> Option<FamilySet> {
        match receiver.as_object().map(|map| map.iter().exactly_one()) {
            Some(Ok((key, reference))) if key == "var" => self.variable(reference, &at.push(key)),
            _ => {
                self.sink.push(
                    at,
                    TypeError::OperandType {
                        operator: name.to_string(),
                        expected: "a variable reference {\"var\": ...}".to_string(),
                        found: describe(receiver),
                    },
                );
                None
            }
        }
    }

    fn operands(
        &mut self,
        name: &str,
        operands: Operands,
        items: &[Value],
        at: &JsonPointer,
        depth: usize,
    ) {
        let layout: Vec<Operand> = match operands {
            Operands::Uniform(expect) => vec![Operand::Expr(expect); items.len()],
            Operands::Positional(layout) => layout.to_vec(),
            Operands::ByArity(layouts) => layouts
                .iter()
                .find(|layout| layout.len() == items.len())
                .map(|layout| layout.to_vec())
                .unwrap_or_default(),
            Operands::Ordered => return self.ordered(name, items, at, depth),
            Operands::Unary => vec![Operand::Expr(Expectation::Logic)],
        };
        for (index, (item, operand)) in items.iter().zip(layout).enumerate() {
            self.operand(name, operand, item, &at.push(index), depth);
        }
    }

    fn operand(
        &mut self,
        name: &str,
        operand: Operand,
        value: &Value,
        path: &JsonPointer,
        depth: usize,
    ) {
        match operand {
            Operand::Expr(expect) => {
                let Some(members) = self.infer(value, path, depth + 1) else {
                    return;
                };
                if !expect.accepts(members) {
                    self.sink.push(
                        path,
                        TypeError::OperandType {
                            operator: name.to_string(),
                            expected: expect.to_string(),
                            found: found_description(members),
                        },
                    );
                }
            }
            Operand::Format(class) => match value.as_str() {
                Some(format) if class.admits(format) => {}
                Some(format) => self.sink.push(
                    path,
                    StructuralError::PatternMismatch {
                        expected: class.pattern().to_string(),
                        value: format!("{:?}", format),
                    },
                ),
                None => self.sink.push(
                    path,
                    StructuralError::InvalidType {
                        expected: "a format string".to_string(),
                        found: describe(value),
                    },
                ),
            },
            Operand::Binding => {
                if !value.is_string() {
                    self.sink.push(
                        path,
                        StructuralError::InvalidType {
                            expected: "a loop variable name".to_string(),
                            found: describe(value),
                        },
                    );
                }
            }
        }
    }

    /// Both operands must share one of Date, DateTime, Numeric or Time.
    fn ordered(&mut self, name: &str, items: &[Value], at: &JsonPointer, depth: usize) {
        let left = self.infer(&items[0], &at.push(0), depth + 1);
        let right = self.infer(&items[1], &at.push(1), depth + 1);
        let (Some(left), Some(right)) = (left, right) else {
            return;
        };
        let ordered = |set: FamilySet| {
            TypeFamily::ORDERED
                .into_iter()
                .filter(move |family| set.contains(*family))
        };
        if ordered(left).any(|family| right.contains(family)) {
            return;
        }

        let (index, found, expected) = match ordered(left).next() {
            Some(_) => (
                1,
                right,
                format!("a {} expression", ordered(left).join(" or ")),
            ),
            None => (
                0,
                left,
                "a Date, DateTime, Numeric or Time expression".to_string(),
            ),
        };
        self.sink.push(
            &at.push(index),
            TypeError::OperandType {
                operator: name.to_string(),
                expected,
                found: found_description(found),
            },
        );
    }

    fn arity_mismatch(&mut self, name: &str, expected: Arity, found: usize, at: &JsonPointer) {
        self.sink.push(
            at,
            TypeError::ArityMismatch {
                operator: name.to_string(),
                expected,
                found,
            },
        );
    }
}

fn found_description(members: FamilySet) -> String {
    match members.primary() {
        Some(family) => format!("a {} expression", family),
        None => "an unclassified expression".to_string(),
    }
}
