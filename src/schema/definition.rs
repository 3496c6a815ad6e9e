use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// A `number | null` successor index. `None` ends the dialogue at that node.
///
/// The number is kept as written; whether it points inside the node array is
/// decided by the graph pass.
pub type Successor = Option<Number>;

/// A property reference as written. Reserved-namespace rules are applied by the graph pass.
pub type PropertyReference = String;

/// A pattern-keyed map of property references to a string or a non-empty list of strings.
pub type PropertiesObject = BTreeMap<String, PropertyValue>;

/// An unchecked expression tree. Typing happens in [`crate::logic::TypeChecker`].
#[derive(Debug, Clone, PartialEq)]
pub struct Logic(pub Value);

impl Logic {
    pub fn value(&self) -> &Value {
        &self.0
    }
}

/// `{"var": ContextDataProperty}`
#[derive(Debug, Clone, PartialEq)]
pub struct LogicData {
    pub var: PropertyReference,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Single(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageValue {
    Text(String),
    /// `{"var": "Language/<key>"}`
    Language(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomContent {
    pub content_type: String,
    pub content: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DialogueDefinition {
    pub id: String,
    pub trigger: Trigger,
    pub nodes: Vec<Node>,
    pub model: Option<PropertiesObject>,
    pub entities: Option<PropertiesObject>,
    pub background: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemEvent {
    ConversationStart,
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    Attachment {
        content_types: Vec<String>,
        output: String,
    },
    CustomEvent {
        name: String,
        output: Option<PropertyReference>,
    },
    NestedDialogue,
    Event {
        event: SystemEvent,
    },
    Intent {
        intent: String,
    },
    Message {
        values: Vec<MessageValue>,
    },
}

impl Trigger {
    pub fn type_name(&self) -> &'static str {
        match self {
            Trigger::Attachment { .. } => "attachment",
            Trigger::CustomEvent { .. } => "customEvent",
            Trigger::NestedDialogue => "nestedDialogue",
            Trigger::Event { .. } => "event",
            Trigger::Intent { .. } => "intent",
            Trigger::Message { .. } => "message",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub url: String,
    /// Always `None` for a download action.
    pub method: Option<HttpMethod>,
    pub headers: Option<BTreeMap<String, String>>,
    pub body: Option<serde_json::Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TapOptions {
    pub display_name: PropertyReference,
    pub output: PropertyReference,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ButtonOptions {
    pub list_name: PropertyReference,
    pub display_name: Option<PropertyReference>,
    pub output: PropertyReference,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CardContent {
    pub url: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub text: Option<String>,
    pub image: Option<String>,
    pub is_thumbnail: Option<Logic>,
    pub retry_message: Option<String>,
    pub tap_options: Option<TapOptions>,
    pub button_options: Option<ButtonOptions>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputOperation {
    pub operation: Logic,
    pub output: PropertyReference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeEvent {
    LeaveConversation,
    ResetDialogue,
    EndDialogue,
    ResetAuthentication,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Date,
    DateTime,
    Number,
    String,
    Time,
}

impl PromptKind {
    pub fn type_name(self) -> &'static str {
        match self {
            PromptKind::Date => "datePrompt",
            PromptKind::DateTime => "dateTimePrompt",
            PromptKind::Number => "numberPrompt",
            PromptKind::String => "stringPrompt",
            PromptKind::Time => "timePrompt",
        }
    }
}

/// One step of dialogue flow.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Action {
        service: Service,
        body_outputs: Option<PropertiesObject>,
        header_outputs: Option<PropertiesObject>,
        next_node_index: Successor,
    },
    AttachmentPrompt {
        content_types: Option<Vec<String>>,
        message: String,
        retry_message: String,
        custom_content: Option<CustomContent>,
        output: String,
        next_node_index: Successor,
    },
    Card {
        content: CardContent,
        next_node_index: Successor,
    },
    CardCollection {
        list_name: PropertyReference,
        content_item: String,
        content: CardContent,
        output: PropertyReference,
        page_size: Option<Number>,
        next_node_index: Successor,
    },
    ChoicePrompt {
        message: String,
        retry_message: String,
        list_name: PropertyReference,
        display_name: Option<PropertyReference>,
        output: PropertyReference,
        next_node_index: Successor,
    },
    ConfirmationPrompt {
        message: String,
        retry_message: String,
        positive_message: Option<String>,
        negative_message: Option<String>,
        output: PropertyReference,
        next_node_index: Successor,
    },
    CustomCardCollection {
        list_name: PropertyReference,
        content_item: String,
        custom_content: CustomContent,
        retry_message: Option<String>,
        output_operation: Option<OutputOperation>,
        output: PropertyReference,
        page_size: Option<Number>,
        validation: Option<Logic>,
        next_node_index: Successor,
    },
    CustomEvent {
        name: String,
        data: Option<LogicData>,
    },
    Decision {
        rule: Logic,
        pass_node_index: Successor,
        fail_node_index: Successor,
    },
    Dialogue {
        dialogue_id: String,
        inputs: Option<BTreeMap<String, Logic>>,
        outputs: Option<BTreeMap<String, LogicData>>,
        next_node_index: Successor,
    },
    DownloadAction {
        service: Service,
        content_output: Option<String>,
        header_outputs: Option<PropertiesObject>,
        next_node_index: Successor,
    },
    Event {
        event: NodeEvent,
    },
    Message {
        message: String,
        custom_content: Option<CustomContent>,
        next_node_index: Successor,
    },
    Operation {
        operation: Logic,
        output: PropertyReference,
        next_node_index: Successor,
    },
    RepeatDialogue {
        dialogue_id: String,
        inputs: BTreeMap<String, Logic>,
        outputs: BTreeMap<String, LogicData>,
        repeat_until: Logic,
        next_node_index: Successor,
    },
    SequenceDialogue {
        dialogue_id: String,
        input_item: String,
        inputs: Option<BTreeMap<String, Logic>>,
        list_name: PropertyReference,
        next_node_index: Successor,
    },
    SimplePrompt {
        kind: PromptKind,
        message: String,
        retry_message: String,
        custom_content: Option<CustomContent>,
        output: PropertyReference,
        validation: Option<Logic>,
        next_node_index: Successor,
    },
}

impl Node {
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Action { .. } => "action",
            Node::AttachmentPrompt { .. } => "attachmentPrompt",
            Node::Card { .. } => "card",
            Node::CardCollection { .. } => "cardCollection",
            Node::ChoicePrompt { .. } => "choicePrompt",
            Node::ConfirmationPrompt { .. } => "confirmationPrompt",
            Node::CustomCardCollection { .. } => "customCardCollection",
            Node::CustomEvent { .. } => "customEvent",
            Node::Decision { .. } => "decision",
            Node::Dialogue { .. } => "dialogue",
            Node::DownloadAction { .. } => "downloadAction",
            Node::Event { .. } => "event",
            Node::Message { .. } => "message",
            Node::Operation { .. } => "operation",
            Node::RepeatDialogue { .. } => "repeatDialogue",
            Node::SequenceDialogue { .. } => "sequenceDialogue",
            Node::SimplePrompt { kind, .. } => kind.type_name(),
        }
    }

    /// The successor fields of this node, by JSON field name.
    pub fn successors(&self) -> Vec<(&'static str, &Successor)> {
        match self {
            Node::Decision {
                pass_node_index,
                fail_node_index,
                ..
            } => vec![
                ("passNodeIndex", pass_node_index),
                ("failNodeIndex", fail_node_index),
            ],
            Node::CustomEvent { .. } | Node::Event { .. } => Vec::new(),
            Node::Action {
                next_node_index, ..
            }
            | Node::AttachmentPrompt {
                next_node_index, ..
            }
            | Node::Card {
                next_node_index, ..
            }
            | Node::CardCollection {
                next_node_index, ..
            }
            | Node::ChoicePrompt {
                next_node_index, ..
            }
            | Node::ConfirmationPrompt {
                next_node_index, ..
            }
            | Node::CustomCardCollection {
                next_node_index, ..
            }
            | Node::Dialogue {
                next_node_index, ..
            }
            | Node::DownloadAction {
                next_node_index, ..
            }
            | Node::Message {
                next_node_index, ..
            }
            | Node::Operation {
                next_node_index, ..
            }
            | Node::RepeatDialogue {
                next_node_index, ..
            }
            | Node::SequenceDialogue {
                next_node_index, ..
            }
            | Node::SimplePrompt {
                next_node_index, ..
            } => vec![("nextNodeIndex", next_node_index)],
        }
    }
}
