//! The expression type-checker.
//!
//! Expressions are single-key JSON objects naming an operator (`{"==": [a, b]}`),
//! a `{"method": [receiver, name, args]}` call, a `{"var": ...}` lookup or a
//! `{"current": ...}` loop reference, or plain literals. Each expression is
//! classified into the set of [`TypeFamily`] values it belongs to; use sites
//! then accept it if their expected family is in that set.
//!
//! The operator, method and family tables live in an immutable [`Grammar`]
//! built once and shared by every check.

mod checker;
mod family;
mod grammar;

pub use checker::TypeChecker;
pub use family::{
    AnyFamily, Expectation, FamilyChecker, FamilySet, LiteralKind, Shape, TypeFamily,
};
pub use grammar::{
    Arity, FormatClass, Grammar, MethodSignature, Operand, Operands, Receiver, Signature,
};
