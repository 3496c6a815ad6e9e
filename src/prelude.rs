//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types from the dialogue-schema
//! crate. Import it to validate documents without importing each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use dialogue_schema::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let text = std::fs::read_to_string("path/to/dialogue.json")?;
//!
//! let validator = Validator::new();
//! match validator.validate(&text) {
//!     Ok(definition) => println!("{} nodes accepted", definition.nodes.len()),
//!     Err(report) => eprintln!("{}", report),
//! }
//! # Ok(())
//! # }
//! ```

// Validation pipeline
pub use crate::validator::{Fragment, Validator, ValidatorBuilder, ValidatorConfig};

// Diagnostics
pub use crate::diagnostic::{Diagnostic, JsonPointer, Report};
pub use crate::error::{ErrorKind, GraphError, StructuralError, TypeError, ValidationError};

// Expression typing
pub use crate::logic::{Grammar, TypeChecker, TypeFamily};

// Typed definition tree
pub use crate::schema::{DialogueDefinition, Node, Trigger};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
