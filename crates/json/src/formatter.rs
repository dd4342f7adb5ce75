//! The JSON event formatter.

use mime::Mime;
use serde_json::{Map, Value};

use cloudevents_core::attribute::CloudEventAttribute;
use cloudevents_core::attribute_type::{AttributeType, AttributeValue};
use cloudevents_core::error::{CoreError, FormatError};
use cloudevents_core::event::{CloudEvent, Data};
use cloudevents_core::formatter::{EncodedEvent, EventFormatter};
use cloudevents_core::spec_version::{SPEC_VERSION_ATTRIBUTE_NAME, SpecVersion};
use cloudevents_core::{binary_data, media_type, validation};

/// Structured-mode content type emitted by this formatter.
pub const JSON_CLOUD_EVENTS_MEDIA_TYPE: &str = "application/cloudevents+json";

const FORMAT: &str = "JSON";
const DATA_MEMBER: &str = "data";
const DATA_BASE64_MEMBER: &str = "data_base64";

/// CloudEvents JSON event format codec.
///
/// Stateless; a single instance can serve any number of encode/decode calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonEventFormatter;

impl JsonEventFormatter {
    pub fn new() -> Self {
        Self
    }

    fn structured_content_type(&self) -> Result<Mime, FormatError> {
        Ok(media_type::parse_content_type(JSON_CLOUD_EVENTS_MEDIA_TYPE)?)
    }
}

impl EventFormatter for JsonEventFormatter {
    fn encode_structured(&self, event: &CloudEvent) -> Result<EncodedEvent, FormatError> {
        validation::check_cloud_event(event, "event")?;

        let mut members = Map::new();
        members.insert(
            SPEC_VERSION_ATTRIBUTE_NAME.to_owned(),
            Value::String(event.spec_version().version_id().to_owned()),
        );
        for (attribute, value) in event.populated_attributes() {
            // Legal extension names at the entity level, but they would
            // collide with the payload members and get consumed as payload
            // on decode.
            if matches!(attribute.name(), DATA_MEMBER | DATA_BASE64_MEMBER) {
                return Err(FormatError::malformed(
                    FORMAT,
                    format!(
                        "extension attribute `{}` collides with a payload member",
                        attribute.name()
                    ),
                ));
            }
            members.insert(attribute.name().to_owned(), attribute_to_json(value));
        }
        match event.data() {
            None => {}
            Some(Data::Bytes(bytes)) => {
                members.insert(
                    DATA_BASE64_MEMBER.to_owned(),
                    Value::String(binary_data::encode_base64(bytes)),
                );
            }
            Some(Data::Text(text)) => {
                members.insert(DATA_MEMBER.to_owned(), Value::String(text.clone()));
            }
            Some(Data::Json(json)) => {
                members.insert(DATA_MEMBER.to_owned(), json.clone());
            }
        }

        let body = serde_json::to_vec(&Value::Object(members))
            .map_err(|e| FormatError::malformed(FORMAT, e.to_string()))?;
        tracing::debug!(bytes = body.len(), "encoded structured-mode event");
        Ok(EncodedEvent {
            body,
            content_type: self.structured_content_type()?,
        })
    }

    fn decode_structured(
        &self,
        body: &[u8],
        content_type: Option<&Mime>,
        extension_attributes: &[CloudEventAttribute],
    ) -> Result<CloudEvent, FormatError> {
        if let Some(declared) = content_type {
            check_declared_content_type(declared)?;
        }

        let root: Value = serde_json::from_slice(body)
            .map_err(|e| FormatError::malformed(FORMAT, e.to_string()))?;
        let Value::Object(members) = root else {
            return Err(FormatError::malformed(FORMAT, "body is not a JSON object"));
        };

        let version_token = members
            .get(SPEC_VERSION_ATTRIBUTE_NAME)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                FormatError::malformed(FORMAT, "missing or non-string `specversion` member")
            })?;
        let spec_version = SpecVersion::from_version_id(version_token)
            .ok_or_else(|| CoreError::UnknownSpecVersion(version_token.to_owned()))?;

        let mut event =
            CloudEvent::with_extension_attributes(spec_version, extension_attributes.to_vec())?;

        if members.contains_key(DATA_MEMBER) && members.contains_key(DATA_BASE64_MEMBER) {
            return Err(FormatError::malformed(
                FORMAT,
                "`data` and `data_base64` are mutually exclusive",
            ));
        }

        for (name, member) in &members {
            if matches!(
                name.as_str(),
                SPEC_VERSION_ATTRIBUTE_NAME | DATA_MEMBER | DATA_BASE64_MEMBER
            ) {
                continue;
            }
            match event.attribute(name).cloned() {
                Some(attribute) => {
                    let value = json_to_attribute_value(&attribute, member)?;
                    event.set_attribute(&attribute, value)?;
                }
                None => {
                    let (attribute, value) = infer_extension(name, member)?;
                    event.set_attribute(&attribute, value)?;
                }
            }
        }

        if let Some(encoded) = members.get(DATA_BASE64_MEMBER) {
            let raw = encoded.as_str().ok_or_else(|| {
                FormatError::malformed(FORMAT, "`data_base64` must be a string")
            })?;
            let bytes = binary_data::decode_base64(raw)
                .map_err(|e| FormatError::malformed(FORMAT, e.to_string()))?;
            event.set_data(bytes);
        } else if let Some(member) = members.get(DATA_MEMBER) {
            match member {
                Value::String(text) if !declares_json_data(&event) => {
                    event.set_data(text.as_str());
                }
                _ => event.set_data(member.clone()),
            }
        }

        validation::check_cloud_event(&event, "body")?;
        tracing::debug!(
            id = event.id(),
            event_type = event.event_type(),
            "decoded structured-mode event"
        );
        Ok(event)
    }

    fn encode_binary_data(&self, event: &CloudEvent) -> Result<EncodedEvent, FormatError> {
        let content_type = match event.data_content_type() {
            Some(declared) => media_type::parse_content_type(declared)?,
            None => mime::APPLICATION_JSON,
        };
        let body = match event.data() {
            None => Vec::new(),
            Some(Data::Bytes(bytes)) => bytes.clone(),
            // Text under a JSON content type becomes a quoted JSON string,
            // matching how structured mode carries it in the `data` member.
            Some(Data::Text(text)) if is_json_media_type(&content_type) => {
                serde_json::to_vec(text)
                    .map_err(|e| FormatError::malformed(FORMAT, e.to_string()))?
            }
            Some(Data::Text(text)) => text.clone().into_bytes(),
            Some(Data::Json(json)) => serde_json::to_vec(json)
                .map_err(|e| FormatError::malformed(FORMAT, e.to_string()))?,
        };
        Ok(EncodedEvent { body, content_type })
    }

    fn decode_binary_data(&self, body: &[u8], event: &mut CloudEvent) -> Result<(), FormatError> {
        if body.is_empty() {
            event.clear_data();
            return Ok(());
        }
        let content_type = match event.data_content_type() {
            Some(declared) => media_type::parse_content_type(declared)?,
            None => mime::APPLICATION_JSON,
        };
        if is_json_media_type(&content_type) {
            let json: Value = serde_json::from_slice(body)
                .map_err(|e| FormatError::malformed(FORMAT, e.to_string()))?;
            event.set_data(json);
        } else if content_type.type_() == mime::TEXT {
            let text = binary_data::text_from_bytes(body)
                .map_err(|e| FormatError::malformed(FORMAT, e.to_string()))?;
            event.set_data(text);
        } else {
            event.set_data(body.to_vec());
        }
        Ok(())
    }
}

fn check_declared_content_type(declared: &Mime) -> Result<(), FormatError> {
    if !media_type::is_cloud_events(Some(declared)) {
        return Err(FormatError::unsupported_content_type(declared.to_string()));
    }
    if let Some(charset) = declared.get_param(mime::CHARSET) {
        // Transcoding is a binding concern; this codec reads UTF-8 only.
        if !charset.as_str().eq_ignore_ascii_case("utf-8") {
            return Err(FormatError::unsupported_content_type(declared.to_string()));
        }
    }
    Ok(())
}

fn attribute_to_json(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::Boolean(b) => Value::Bool(*b),
        AttributeValue::Integer(i) => Value::Number((*i).into()),
        other => Value::String(other.to_string()),
    }
}

fn json_to_attribute_value(
    attribute: &CloudEventAttribute,
    member: &Value,
) -> Result<AttributeValue, FormatError> {
    match (attribute.attribute_type(), member) {
        (AttributeType::Boolean, Value::Bool(b)) => Ok(AttributeValue::Boolean(*b)),
        (AttributeType::Integer, Value::Number(n)) => {
            let value = n
                .as_i64()
                .and_then(|i| i32::try_from(i).ok())
                .ok_or_else(|| {
                    FormatError::malformed(
                        FORMAT,
                        format!("attribute `{}` is out of Integer range", attribute.name()),
                    )
                })?;
            Ok(AttributeValue::Integer(value))
        }
        (_, Value::String(raw)) => Ok(attribute.parse(raw)?),
        _ => Err(FormatError::malformed(
            FORMAT,
            format!(
                "attribute `{}` has the wrong JSON type for {}",
                attribute.name(),
                attribute.attribute_type()
            ),
        )),
    }
}

/// Build an extension descriptor for a member nothing was registered under.
///
/// Primitive members map onto the obvious attribute types; anything else is
/// not a legal attribute value in the JSON format.
fn infer_extension(
    name: &str,
    member: &Value,
) -> Result<(CloudEventAttribute, AttributeValue), FormatError> {
    let (attr_type, value) = match member {
        Value::Bool(b) => (AttributeType::Boolean, AttributeValue::Boolean(*b)),
        Value::Number(n) => {
            let value = n
                .as_i64()
                .and_then(|i| i32::try_from(i).ok())
                .ok_or_else(|| {
                    FormatError::malformed(
                        FORMAT,
                        format!("attribute `{name}` is out of Integer range"),
                    )
                })?;
            (AttributeType::Integer, AttributeValue::Integer(value))
        }
        Value::String(s) => (AttributeType::String, AttributeValue::String(s.clone())),
        _ => {
            return Err(FormatError::malformed(
                FORMAT,
                format!("attribute `{name}` must be a JSON primitive"),
            ));
        }
    };
    let attribute = CloudEventAttribute::extension(name, attr_type)?;
    Ok((attribute, value))
}

fn declares_json_data(event: &CloudEvent) -> bool {
    match event.data_content_type() {
        Some(declared) => match media_type::parse_content_type(declared) {
            Ok(mime) => is_json_media_type(&mime),
            Err(_) => false,
        },
        // No content type declared: the JSON format treats `data` as JSON.
        None => true,
    }
}

fn is_json_media_type(mime: &Mime) -> bool {
    mime.subtype() == mime::JSON || mime.suffix() == Some(mime::JSON)
}
