use super::definition::{ButtonOptions, CardContent, HttpMethod, OutputOperation, Service, TapOptions};
use super::reader::ObjectReader;
use super::values::{self, string};
use crate::diagnostic::{Diagnostics, JsonPointer};
use serde_json::Value;

const CARD_FIELDS: [&str; 6] = ["title", "subtitle", "text", "image", "tapOptions", "buttonOptions"];

const HTTP_METHODS: [(&str, HttpMethod); 4] = [
    ("GET", HttpMethod::Get),
    ("PUT", HttpMethod::Put),
    ("POST", HttpMethod::Post),
    ("DELETE", HttpMethod::Delete),
];

pub(crate) fn card_content(
    value: &Value,
    path: &JsonPointer,
    sink: &mut Diagnostics,
) -> Option<CardContent> {
    let mut reader = ObjectReader::open(value, path, "a card content object", sink)?;
    reader.any_of("card content", &CARD_FIELDS);
    let url = reader.optional("url", string);
    let title = reader.optional("title", values::output_short);
    let subtitle = reader.optional("subtitle", values::output_short);
    let text = reader.optional("text", values::output_long);
    let image = reader.optional("image", values::output_long);
    let is_thumbnail = reader.optional("isThumbnail", values::logic);
    let retry_message = reader.optional("retryMessage", values::output_short);
    let tap_options = reader.optional("tapOptions", tap_options);
    let button_options = reader.optional("buttonOptions", button_options);
    reader.finish()?;
    Some(CardContent {
        url: url?,
        title: title?,
        subtitle: subtitle?,
        text: text?,
        image: image?,
        is_thumbnail: is_thumbnail?,
        retry_message: retry_message?,
        tap_options: tap_options?,
        button_options: button_options?,
    })
}

fn tap_options(value: &Value, path: &JsonPointer, sink: &mut Diagnostics) -> Option<TapOptions> {
    let mut reader = ObjectReader::open(value, path, "a tap options object", sink)?;
    let display_name = reader.required("displayName", string);
    let output = reader.required("output", string);
    let value = reader.required("value", values::output_short);
    reader.finish()?;
    Some(TapOptions {
        display_name: display_name?,
        output: output?,
        value: value?,
    })
}

fn button_options(
    value: &Value,
    path: &JsonPointer,
    sink: &mut Diagnostics,
) -> Option<ButtonOptions> {
    let mut reader = ObjectReader::open(value, path, "a button options object", sink)?;
    let list_name = reader.required("listName", string);
    let display_name = reader.optional("displayName", string);
    let output = reader.required("output", string);
    reader.finish()?;
    Some(ButtonOptions {
        list_name: list_name?,
        display_name: display_name?,
        output: output?,
    })
}

/// The service block of an action (`with_method`) or a download action.
pub(crate) fn service(
    value: &Value,
    path: &JsonPointer,
    sink: &mut Diagnostics,
    with_method: bool,
) -> Option<Service> {
    let mut reader = ObjectReader::open(value, path, "a service object", sink)?;
    let url = reader.required("url", string);
    let headers = reader.optional("headers", values::headers);
    let (method, body) = if with_method {
        let method = reader
            .required("method", |value, path, sink| {
                values::enumerated(value, path, sink, &HTTP_METHODS)
            })
            .map(Some);
        let body = reader.optional("body", values::json_object);
        (method, body)
    } else {
        (Some(None), Some(None))
    };
    reader.finish()?;
    Some(Service {
        url: url?,
        method: method?,
        headers: headers?,
        body: body?,
    })
}

pub(crate) fn output_operation(
    value: &Value,
    path: &JsonPointer,
    sink: &mut Diagnostics,
) -> Option<OutputOperation> {
    let mut reader = ObjectReader::open(value, path, "an output operation object", sink)?;
    let operation = reader.required("operation", values::logic);
    let output = reader.required("output", string);
    reader.finish()?;
    Some(OutputOperation {
        operation: operation?,
        output: output?,
    })
}
