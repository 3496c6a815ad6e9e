use super::definition::{SystemEvent, Trigger};
use super::reader::{ObjectReader, VariantParser, Variants};
use super::values::{self, string};

struct AttachmentTrigger;

impl VariantParser<Trigger> for AttachmentTrigger {
    fn type_name(&self) -> &'static str {
        "attachment"
    }

    fn parse(&self, reader: &mut ObjectReader<'_, '_>) -> Option<Trigger> {
        let content_types = reader.required("contentTypes", values::mime_types);
        let output = reader.required("output", values::blob_reference);
        reader.finish()?;
        Some(Trigger::Attachment {
            content_types: content_types?,
            output: output?,
        })
    }
}

struct CustomEventTrigger;

impl VariantParser<Trigger> for CustomEventTrigger {
    fn type_name(&self) -> &'static str {
        "customEvent"
    }

    fn parse(&self, reader: &mut ObjectReader<'_, '_>) -> Option<Trigger> {
        let name = reader.required("name", string);
        let output = reader.optional("output", string);
        reader.finish()?;
        Some(Trigger::CustomEvent {
            name: name?,
            output: output?,
        })
    }
}

struct NestedDialogueTrigger;

impl VariantParser<Trigger> for NestedDialogueTrigger {
    fn type_name(&self) -> &'static str {
        "nestedDialogue"
    }

    fn parse(&self, reader: &mut ObjectReader<'_, '_>) -> Option<Trigger> {
        reader.finish()?;
        Some(Trigger::NestedDialogue)
    }
}

struct EventTrigger;

impl VariantParser<Trigger> for EventTrigger {
    fn type_name(&self) -> &'static str {
        "event"
    }

    fn parse(&self, reader: &mut ObjectReader<'_, '_>) -> Option<Trigger> {
        let event = reader.required("event", |value, path, sink| {
            values::enumerated(
                value,
                path,
                sink,
                &[
                    ("conversationStart", SystemEvent::ConversationStart),
                    ("help", SystemEvent::Help),
                ],
            )
        });
        reader.finish()?;
        Some(Trigger::Event { event: event? })
    }
}

struct IntentTrigger;

impl VariantParser<Trigger> for IntentTrigger {
    fn type_name(&self) -> &'static str {
        "intent"
    }

    fn parse(&self, reader: &mut ObjectReader<'_, '_>) -> Option<Trigger> {
        let intent = reader.required("intent", string);
        reader.finish()?;
        Some(Trigger::Intent { intent: intent? })
    }
}

struct MessageTrigger;

impl VariantParser<Trigger> for MessageTrigger {
    fn type_name(&self) -> &'static str {
        "message"
    }

    fn parse(&self, reader: &mut ObjectReader<'_, '_>) -> Option<Trigger> {
        let messages = reader.required("values", |value, path, sink| {
            values::array_of(value, path, sink, "an array of messages", values::message_value)
        });
        reader.finish()?;
        Some(Trigger::Message { values: messages? })
    }
}

pub(crate) fn register_default_triggers(registry: &mut Variants<Trigger>) {
    registry.register(Box::new(AttachmentTrigger));
    registry.register(Box::new(CustomEventTrigger));
    registry.register(Box::new(NestedDialogueTrigger));
    registry.register(Box::new(EventTrigger));
    registry.register(Box::new(IntentTrigger));
    registry.register(Box::new(MessageTrigger));
}
