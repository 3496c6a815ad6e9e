use crate::logic::{Arity, TypeFamily};
use crate::property::SystemNamespace;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors raised while checking the shape of a document, independent of cross-references.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StructuralError {
    #[error("Missing required field '{field}'")]
    MissingRequiredField { field: String },

    #[error("Field '{field}' is not allowed here (found {found})")]
    UnknownField { field: String, found: String },

    #[error("Expected {expected}, but found {found}")]
    InvalidType { expected: String, found: String },

    #[error("Value {value} does not match {expected}")]
    PatternMismatch { expected: String, value: String },

    #[error("Expected {expected}, but found {found}")]
    CardinalityMismatch { expected: String, found: String },

    #[error("No {union} variant matches: {reason}")]
    VariantNotMatched { union: String, reason: String },
}

/// Errors raised by the expression type-checker.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypeError {
    #[error("Unknown operator '{operator}'")]
    UnknownOperator { operator: String },

    #[error("Operator '{operator}' takes {expected} argument(s), but received {found}")]
    ArityMismatch {
        operator: String,
        expected: Arity,
        found: usize,
    },

    #[error("Operand of '{operator}' must be {expected}, but found {found}")]
    OperandType {
        operator: String,
        expected: String,
        found: String,
    },

    #[error("Reference '{reference}' is inside the reserved {namespace} namespace")]
    ReservedNamespace {
        reference: String,
        namespace: SystemNamespace,
    },

    #[error("Expected a {expected} expression, but found {found}")]
    FamilyMismatch {
        expected: TypeFamily,
        found: TypeFamily,
    },
}

/// Errors raised by the node graph integrity checker.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error(
        "Node {node} field '{field}' points at {index}, which is outside the {len} available nodes"
    )]
    DanglingReference {
        node: usize,
        field: String,
        index: String,
        len: usize,
    },
}

/// Any error that can end up in a validation report.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Malformed JSON at line {line}, column {column}: {message}")]
    MalformedJson {
        line: usize,
        column: usize,
        message: String,
    },

    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Expression nesting exceeds the limit of {limit} levels")]
    DepthExceeded { limit: usize },
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        ValidationError::MalformedJson {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}

/// A flat tag for every leaf error kind, convenient for matching diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    MalformedJson,
    MissingRequiredField,
    UnknownField,
    InvalidType,
    PatternMismatch,
    CardinalityMismatch,
    VariantNotMatched,
    UnknownOperator,
    ArityMismatch,
    OperandType,
    ReservedNamespace,
    FamilyMismatch,
    DanglingReference,
    DepthExceeded,
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::MalformedJson { .. } => ErrorKind::MalformedJson,
            ValidationError::Structural(err) => match err {
                StructuralError::MissingRequiredField { .. } => ErrorKind::MissingRequiredField,
                StructuralError::UnknownField { .. } => ErrorKind::UnknownField,
                StructuralError::InvalidType { .. } => ErrorKind::InvalidType,
                StructuralError::PatternMismatch { .. } => ErrorKind::PatternMismatch,
                StructuralError::CardinalityMismatch { .. } => ErrorKind::CardinalityMismatch,
                StructuralError::VariantNotMatched { .. } => ErrorKind::VariantNotMatched,
            },
            ValidationError::Type(err) => match err {
                TypeError::UnknownOperator { .. } => ErrorKind::UnknownOperator,
                TypeError::ArityMismatch { .. } => ErrorKind::ArityMismatch,
                TypeError::OperandType { .. } => ErrorKind::OperandType,
                TypeError::ReservedNamespace { .. } => ErrorKind::ReservedNamespace,
                TypeError::FamilyMismatch { .. } => ErrorKind::FamilyMismatch,
            },
            ValidationError::Graph(GraphError::DanglingReference { .. }) => {
                ErrorKind::DanglingReference
            }
            ValidationError::DepthExceeded { .. } => ErrorKind::DepthExceeded,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
