use super::content::{card_content, output_operation, service};
use super::definition::{Node, NodeEvent, PromptKind};
use super::reader::{ObjectReader, VariantParser, Variants};
use super::values::{self, string};

const NODE_EVENTS: [(&str, NodeEvent); 4] = [
    ("leaveConversation", NodeEvent::LeaveConversation),
    ("resetDialogue", NodeEvent::ResetDialogue),
    ("endDialogue", NodeEvent::EndDialogue),
    ("resetAuthentication", NodeEvent::ResetAuthentication),
];

const PROMPT_KINDS: [PromptKind; 5] = [
    PromptKind::Date,
    PromptKind::DateTime,
    PromptKind::Number,
    PromptKind::String,
    PromptKind::Time,
];

/// Defines a parser struct per node type and the function registering all of them.
macro_rules! define_node_parsers {
    ( $( ($struct_name:ident, $type_name:expr, |$reader:ident| $body:block) ),* $(,)? ) => {
        $(
            struct $struct_name;
            impl VariantParser<Node> for $struct_name {
                fn type_name(&self) -> &'static str { $type_name }
                fn parse(&self, $reader: &mut ObjectReader<'_, '_>) -> Option<Node> $body
            }
        )*

        pub(crate) fn register_default_nodes(registry: &mut Variants<Node>) {
            $( registry.register(Box::new($struct_name)); )*
            for kind in PROMPT_KINDS {
                registry.register(Box::new(SimplePromptParser(kind)));
            }
        }
    };
}

define_node_parsers! {
    (ActionParser, "action", |r| {
        let service = r.required("service", |v, p, s| service(v, p, s, true));
        let outputs = r.optional("outputs", |value, path, sink| {
            let mut outputs = ObjectReader::open(value, path, "an outputs object", sink)?;
            let body = outputs.optional("body", values::properties_object);
            let header = outputs.optional("header", values::properties_object);
            outputs.finish()?;
            Some((body?, header?))
        });
        let next_node_index = r.required("nextNodeIndex", values::successor);
        r.finish()?;
        let (body_outputs, header_outputs) = outputs?.unwrap_or_default();
        Some(Node::Action {
            service: service?,
            body_outputs,
            header_outputs,
            next_node_index: next_node_index?,
        })
    }),
    (AttachmentPromptParser, "attachmentPrompt", |r| {
        let content_types = r.optional("contentTypes", values::mime_types);
        let message = r.required("message", values::output_short);
        let retry_message = r.required("retryMessage", values::output_short);
        let custom_content = r.optional("customContent", values::custom_content);
        let output = r.required("output", values::blob_reference);
        let next_node_index = r.required("nextNodeIndex", values::successor);
        r.finish()?;
        Some(Node::AttachmentPrompt {
            content_types: content_types?,
            message: message?,
            retry_message: retry_message?,
            custom_content: custom_content?,
            output: output?,
            next_node_index: next_node_index?,
        })
    }),
    (CardParser, "card", |r| {
        let content = r.required("content", card_content);
        let next_node_index = r.required("nextNodeIndex", values::successor);
        r.finish()?;
        Some(Node::Card {
            content: content?,
            next_node_index: next_node_index?,
        })
    }),
    (CardCollectionParser, "cardCollection", |r| {
        let list_name = r.required("listName", string);
        let content_item = r.required("contentItem", values::alphanumeric);
        let content = r.required("content", card_content);
        let output = r.required("output", string);
        let page_size = r.optional("pageSize", values::number);
        let next_node_index = r.required("nextNodeIndex", values::successor);
        r.finish()?;
        Some(Node::CardCollection {
            list_name: list_name?,
            content_item: content_item?,
            content: content?,
            output: output?,
            page_size: page_size?,
            next_node_index: next_node_index?,
        })
    }),
    (ChoicePromptParser, "choicePrompt", |r| {
        let message = r.required("message", values::output_short);
        let retry_message = r.required("retryMessage", values::output_short);
        let list_name = r.required("listName", string);
        let display_name = r.optional("displayName", string);
        let output = r.required("output", string);
        let next_node_index = r.required("nextNodeIndex", values::successor);
        r.finish()?;
        Some(Node::ChoicePrompt {
            message: message?,
            retry_message: retry_message?,
            list_name: list_name?,
            display_name: display_name?,
            output: output?,
            next_node_index: next_node_index?,
        })
    }),
    (ConfirmationPromptParser, "confirmationPrompt", |r| {
        let message = r.required("message", values::output_short);
        let retry_message = r.required("retryMessage", values::output_short);
        let positive_message = r.optional("positiveMessage", values::output_short);
        let negative_message = r.optional("negativeMessage", values::output_short);
        let output = r.required("output", string);
        let next_node_index = r.required("nextNodeIndex", values::successor);
        r.finish()?;
        Some(Node::ConfirmationPrompt {
            message: message?,
            retry_message: retry_message?,
            positive_message: positive_message?,
            negative_message: negative_message?,
            output: output?,
            next_node_index: next_node_index?,
        })
    }),
    (CustomCardCollectionParser, "customCardCollection", |r| {
        let list_name = r.required("listName", string);
        let content_item = r.required("contentItem", values::alphanumeric);
        let custom_content = r.required("customContent", values::custom_content);
        let retry_message = r.optional("retryMessage", values::output_short);
        let output_operation = r.optional("outputOperation", output_operation);
        let output = r.required("output", string);
        let page_size = r.optional("pageSize", values::number);
        let validation = r.optional("validation", values::logic);
        let next_node_index = r.required("nextNodeIndex", values::successor);
        r.finish()?;
        Some(Node::CustomCardCollection {
            list_name: list_name?,
            content_item: content_item?,
            custom_content: custom_content?,
            retry_message: retry_message?,
            output_operation: output_operation?,
            output: output?,
            page_size: page_size?,
            validation: validation?,
            next_node_index: next_node_index?,
        })
    }),
    (CustomEventParser, "customEvent", |r| {
        let name = r.required("name", string);
        let data = r.optional("data", values::logic_data);
        r.finish()?;
        Some(Node::CustomEvent {
            name: name?,
            data: data?,
        })
    }),
    (DecisionParser, "decision", |r| {
        let rule = r.required("rule", values::logic);
        let pass_node_index = r.required("passNodeIndex", values::successor);
        let fail_node_index = r.required("failNodeIndex", values::successor);
        r.finish()?;
        Some(Node::Decision {
            rule: rule?,
            pass_node_index: pass_node_index?,
            fail_node_index: fail_node_index?,
        })
    }),
    (DialogueParser, "dialogue", |r| {
        let dialogue_id = r.required("dialogueId", values::non_empty_string);
        let inputs = r.optional("inputs", values::dialogue_inputs);
        let outputs = r.optional("outputs", values::dialogue_outputs);
        let next_node_index = r.required("nextNodeIndex", values::successor);
        r.finish()?;
        Some(Node::Dialogue {
            dialogue_id: dialogue_id?,
            inputs: inputs?,
            outputs: outputs?,
            next_node_index: next_node_index?,
        })
    }),
    (DownloadActionParser, "downloadAction", |r| {
        let service = r.required("service", |v, p, s| service(v, p, s, false));
        let outputs = r.optional("outputs", |value, path, sink| {
            let mut outputs = ObjectReader::open(value, path, "an outputs object", sink)?;
            let content = outputs.optional("content", values::blob_reference);
            let header = outputs.optional("header", values::properties_object);
            outputs.finish()?;
            Some((content?, header?))
        });
        let next_node_index = r.required("nextNodeIndex", values::successor);
        r.finish()?;
        let (content_output, header_outputs) = outputs?.unwrap_or_default();
        Some(Node::DownloadAction {
            service: service?,
            content_output,
            header_outputs,
            next_node_index: next_node_index?,
        })
    }),
    (EventParser, "event", |r| {
        let event = r.required("event", |v, p, s| values::enumerated(v, p, s, &NODE_EVENTS));
        r.finish()?;
        Some(Node::Event { event: event? })
    }),
    (MessageParser, "message", |r| {
        let message = r.required("message", values::output_short);
        let custom_content = r.optional("customContent", values::custom_content);
        let next_node_index = r.required("nextNodeIndex", values::successor);
        r.finish()?;
        Some(Node::Message {
            message: message?,
            custom_content: custom_content?,
            next_node_index: next_node_index?,
        })
    }),
    (OperationParser, "operation", |r| {
        let operation = r.required("operation", values::logic);
        let output = r.required("output", string);
        let next_node_index = r.required("nextNodeIndex", values::successor);
        r.finish()?;
        Some(Node::Operation {
            operation: operation?,
            output: output?,
            next_node_index: next_node_index?,
        })
    }),
    (RepeatDialogueParser, "repeatDialogue", |r| {
        let dialogue_id = r.required("dialogueId", values::non_empty_string);
        let inputs = r.required("inputs", values::dialogue_inputs);
        let outputs = r.required("outputs", values::dialogue_outputs);
        let repeat_until = r.required("repeatUntil", values::logic);
        let next_node_index = r.required("nextNodeIndex", values::successor);
        r.finish()?;
        Some(Node::RepeatDialogue {
            dialogue_id: dialogue_id?,
            inputs: inputs?,
            outputs: outputs?,
            repeat_until: repeat_until?,
            next_node_index: next_node_index?,
        })
    }),
    (SequenceDialogueParser, "sequenceDialogue", |r| {
        let dialogue_id = r.required("dialogueId", values::non_empty_string);
        let input_item = r.required("inputItem", values::alphanumeric);
        let inputs = r.optional("inputs", values::dialogue_inputs);
        let list_name = r.required("listName", string);
        let next_node_index = r.required("nextNodeIndex", values::successor);
        r.finish()?;
        Some(Node::SequenceDialogue {
            dialogue_id: dialogue_id?,
            input_item: input_item?,
            inputs: inputs?,
            list_name: list_name?,
            next_node_index: next_node_index?,
        })
    }),
}

/// One parser per prompt flavour; the five share a field set.
struct SimplePromptParser(PromptKind);

impl VariantParser<Node> for SimplePromptParser {
    fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    fn parse(&self, r: &mut ObjectReader<'_, '_>) -> Option<Node> {
        let message = r.required("message", values::output_short);
        let retry_message = r.required("retryMessage", values::output_short);
        let custom_content = r.optional("customContent", values::custom_content);
        let output = r.required("output", string);
        let validation = r.optional("validation", values::logic);
        let next_node_index = r.required("nextNodeIndex", values::successor);
        r.finish()?;
        Some(Node::SimplePrompt {
            kind: self.0,
            message: message?,
            retry_message: retry_message?,
            custom_content: custom_content?,
            output: output?,
            validation: validation?,
            next_node_index: next_node_index?,
        })
    }
}
