use crate::diagnostic::{Diagnostics, JsonPointer, Report};
use crate::error::ValidationError;
use crate::graph::GraphChecker;
use crate::logic::{Grammar, TypeChecker, TypeFamily};
use crate::schema::{DialogueDefinition, ParsedDocument, StructuralValidator};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Tunables for a [`Validator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidatorConfig {
    /// Expression nesting deeper than this is reported as `DepthExceeded`.
    pub max_depth: usize,
    /// Run the type and graph passes even when the structural pass found problems.
    pub graph_on_structural_failure: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            graph_on_structural_failure: true,
        }
    }
}

/// Which editor document a piece of JSON is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Fragment {
    Document,
    Trigger,
    Nodes,
    /// A `model` or `entities` properties map.
    Properties,
}

impl Fragment {
    /// Picks the fragment an editor file holds by its name: `trigger.json`,
    /// `nodes.json`, `model.json` and `entities.json`; anything else is a document.
    pub fn from_file_name(path: &Path) -> Self {
        match path.file_stem().and_then(|stem| stem.to_str()) {
            Some("trigger") => Fragment::Trigger,
            Some("nodes") => Fragment::Nodes,
            Some("model") | Some("entities") => Fragment::Properties,
            _ => Fragment::Document,
        }
    }
}

/// Validates dialogue definitions end to end: structure, expressions and node graph.
///
/// A validator holds no per-call state. Clones share the same grammar tables, so
/// one instance can serve any number of threads.
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidatorConfig,
    grammar: Arc<Grammar>,
    structure: Arc<StructuralValidator>,
}

pub struct ValidatorBuilder {
    config: ValidatorConfig,
}

impl ValidatorBuilder {
    pub fn new() -> Self {
        Self {
            config: ValidatorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    pub fn graph_on_structural_failure(mut self, enabled: bool) -> Self {
        self.config.graph_on_structural_failure = enabled;
        self
    }

    pub fn build(self) -> Validator {
        Validator {
            config: self.config,
            grammar: Arc::new(Grammar::new()),
            structure: Arc::new(StructuralValidator::new()),
        }
    }
}

impl Default for ValidatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Validator {
    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::new()
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn type_checker(&self) -> TypeChecker<'_> {
        TypeChecker::new(&self.grammar, self.config.max_depth)
    }

    fn graph_checker(&self) -> GraphChecker<'_> {
        GraphChecker::new(self.type_checker())
    }

    /// Validates raw JSON text. Unparseable input yields a single `MalformedJson` diagnostic.
    pub fn validate_str(&self, text: &str) -> Report {
        match parse_json(text) {
            Ok(value) => self.validate_value(&value),
            Err(report) => report,
        }
    }

    pub fn validate_value(&self, value: &Value) -> Report {
        self.check_document(value).1
    }

    /// Validates a document and, on acceptance, hands back its typed form.
    pub fn validate(&self, text: &str) -> Result<DialogueDefinition, Report> {
        let value = parse_json(text)?;
        let (document, report) = self.check_document(&value);
        match document.into_definition() {
            Some(definition) if report.is_accepted() => Ok(definition),
            _ => Err(report),
        }
    }

    /// Validates a standalone trigger document. Paths are rooted at the trigger.
    pub fn validate_trigger(&self, value: &Value) -> Report {
        let root = JsonPointer::root();
        let mut sink = Diagnostics::new();
        let trigger = self.structure.validate_trigger(value, &root, &mut sink);
        if let Some(trigger) = trigger {
            if self.continue_after_structure(&sink) {
                self.graph_checker().check_trigger(&trigger, &root, &mut sink);
            }
        }
        self.finish("trigger", sink)
    }

    /// Validates a standalone node array. Paths are rooted at the array.
    pub fn validate_nodes(&self, value: &Value) -> Report {
        let root = JsonPointer::root();
        let mut sink = Diagnostics::new();
        let nodes = self.structure.validate_nodes(value, &root, &mut sink);
        if self.continue_after_structure(&sink) {
            self.graph_checker().check_nodes(&nodes, &root, &mut sink);
        }
        self.finish("nodes", sink)
    }

    /// Validates a standalone `model` or `entities` properties map.
    pub fn validate_properties(&self, value: &Value) -> Report {
        let root = JsonPointer::root();
        let mut sink = Diagnostics::new();
        let properties = self.structure.validate_properties(value, &root, &mut sink);
        if let Some(properties) = properties {
            if self.continue_after_structure(&sink) {
                self.graph_checker()
                    .check_properties(&properties, &root, &mut sink);
            }
        }
        self.finish("properties", sink)
    }

    pub fn validate_fragment(&self, fragment: Fragment, text: &str) -> Report {
        let value = match parse_json(text) {
            Ok(value) => value,
            Err(report) => return report,
        };
        match fragment {
            Fragment::Document => self.validate_value(&value),
            Fragment::Trigger => self.validate_trigger(&value),
            Fragment::Nodes => self.validate_nodes(&value),
            Fragment::Properties => self.validate_properties(&value),
        }
    }

    /// Validates independent documents in parallel. Reports keep the input order.
    pub fn validate_many(&self, texts: &[&str]) -> Vec<Report> {
        texts.par_iter().map(|text| self.validate_str(text)).collect()
    }

    /// Infers the family of a standalone expression.
    pub fn infer_type(
        &self,
        expression: &Value,
        expected: Option<TypeFamily>,
    ) -> Result<TypeFamily, Report> {
        self.type_checker().infer_type(expression, expected)
    }

    fn check_document(&self, value: &Value) -> (ParsedDocument, Report) {
        let mut sink = Diagnostics::new();
        let document = self.structure.validate_document(value, &mut sink);
        tracing::trace!(
            structural = sink.len(),
            nodes = document.nodes.len(),
            "structural pass done"
        );
        if self.continue_after_structure(&sink) {
            self.graph_checker().check_document(&document, &mut sink);
        }
        (document, self.finish("document", sink))
    }

    fn continue_after_structure(&self, sink: &Diagnostics) -> bool {
        sink.is_empty() || self.config.graph_on_structural_failure
    }

    fn finish(&self, what: &str, sink: Diagnostics) -> Report {
        let report = sink.into_report();
        if report.is_accepted() {
            tracing::debug!("{} accepted", what);
        } else {
            tracing::debug!(diagnostics = report.len(), "{} rejected", what);
        }
        report
    }
}

fn parse_json(text: &str) -> Result<Value, Report> {
    serde_json::from_str(text).map_err(|err| {
        let error = ValidationError::from(err);
        tracing::debug!(%error, "input is not JSON");
        let mut sink = Diagnostics::new();
        sink.push(&JsonPointer::root(), error);
        sink.into_report()
    })
}
