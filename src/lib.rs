//! # dialogue-schema - Dialogue Definition Validator and Type-Checker
//!
//! **dialogue-schema** verifies conversational dialogue definitions: JSON documents
//! made of a trigger, an array of flow nodes and a pair of property maps. Nodes
//! embed a small typed expression language ("logic") for computing values and
//! branching, and point at each other by array index.
//!
//! ## Core Workflow
//!
//! Validation is a pure function of the input document and runs in three passes
//! that all write into one diagnostics buffer:
//!
//! 1.  **Structure**: every object is read against its variant's closed field set,
//!     with primitive types, patterns and length limits checked on the way.
//! 2.  **Expressions**: every embedded expression is classified into its type
//!     families and checked against the family its use site expects.
//! 3.  **Graph**: successor indices must point inside the node array, and no
//!     write target may sit in a reserved system namespace.
//!
//! Only unparseable JSON stops validation early. Everything else is collected, so
//! one run returns the complete list of problems, each located by a JSON pointer.
//!
//! ## Quick Start
//!
//! ```rust
//! use dialogue_schema::prelude::*;
//!
//! let validator = Validator::builder().max_depth(32).build();
//!
//! let report = validator.validate_str(r#"{
//!     "id": "greeting",
//!     "trigger": {"type": "intent", "intent": "hello"},
//!     "nodes": [
//!         {"type": "decision", "rule": {"==": [{"var": "count"}, 3]},
//!          "passNodeIndex": 1, "failNodeIndex": null},
//!         {"type": "message", "message": "hi", "nextNodeIndex": 5}
//!     ]
//! }"#);
//!
//! assert!(!report.is_accepted());
//! assert!(report.contains(ErrorKind::DanglingReference, "/nodes/1/nextNodeIndex"));
//! println!("{}", report);
//! ```
//!
//! Expressions can also be typed on their own:
//!
//! ```rust
//! use dialogue_schema::prelude::*;
//! use serde_json::json;
//!
//! let validator = Validator::new();
//! let family = validator.infer_type(&json!({"cat": ["a", {"var": "name"}]}), None);
//! assert_eq!(family, Ok(TypeFamily::String));
//! ```

pub mod diagnostic;
pub mod error;
pub mod graph;
pub mod logic;
pub mod prelude;
pub mod property;
pub mod schema;
pub mod validator;
