//! The CloudEvent envelope entity.
//!
//! A `CloudEvent` is mutable while being populated (typed setters validate on
//! assignment) and is treated as frozen once it has passed the
//! [`validation`](crate::validation) gate; nothing here enforces the freeze,
//! the binding layer establishes it by not mutating after validation.

use chrono::{DateTime, FixedOffset};

use crate::attribute::CloudEventAttribute;
use crate::attribute_type::AttributeValue;
use crate::error::{CoreError, CoreResult};
use crate::spec_version::{SPEC_VERSION_ATTRIBUTE_NAME, SpecVersion};

/// Opaque event payload.
///
/// `Json` is what structured formatters produce for JSON-typed content;
/// `Bytes` is the pass-through representation for everything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Data {
    Bytes(Vec<u8>),
    Text(String),
    Json(serde_json::Value),
}

impl From<Vec<u8>> for Data {
    fn from(value: Vec<u8>) -> Self {
        Data::Bytes(value)
    }
}

impl From<String> for Data {
    fn from(value: String) -> Self {
        Data::Text(value)
    }
}

impl From<&str> for Data {
    fn from(value: &str) -> Self {
        Data::Text(value.to_owned())
    }
}

impl From<serde_json::Value> for Data {
    fn from(value: serde_json::Value) -> Self {
        Data::Json(value)
    }
}

/// The event envelope: spec version, populated attributes, payload.
#[derive(Debug, Clone)]
pub struct CloudEvent {
    spec_version: SpecVersion,
    extensions: Vec<CloudEventAttribute>,
    values: Vec<(CloudEventAttribute, AttributeValue)>,
    data: Option<Data>,
}

impl CloudEvent {
    /// Empty envelope; all required attributes start unset.
    pub fn new(spec_version: SpecVersion) -> Self {
        Self {
            spec_version,
            extensions: Vec::new(),
            values: Vec::new(),
            data: None,
        }
    }

    /// Empty envelope with extension descriptors registered up front.
    ///
    /// Fails if any descriptor is not an extension or two descriptors share
    /// a name.
    pub fn with_extension_attributes(
        spec_version: SpecVersion,
        extension_attributes: impl IntoIterator<Item = CloudEventAttribute>,
    ) -> CoreResult<Self> {
        let mut event = Self::new(spec_version);
        for attribute in extension_attributes {
            event.register_extension(attribute)?;
        }
        Ok(event)
    }

    pub fn spec_version(&self) -> SpecVersion {
        self.spec_version
    }

    /// Extension descriptors registered on this event (populated or not).
    pub fn extension_attributes(&self) -> &[CloudEventAttribute] {
        &self.extensions
    }

    /// Register an extension descriptor without populating it.
    ///
    /// Registering the same descriptor twice is a no-op; a different
    /// descriptor under the same name is a collision.
    pub fn register_extension(&mut self, attribute: CloudEventAttribute) -> CoreResult<()> {
        if !attribute.is_extension() {
            return Err(CoreError::collision(attribute.name()));
        }
        match self.extensions.iter().find(|e| e.name() == attribute.name()) {
            Some(existing) if *existing == attribute => Ok(()),
            Some(_) => Err(CoreError::collision(attribute.name())),
            None => {
                self.extensions.push(attribute);
                Ok(())
            }
        }
    }

    /// Look up the descriptor a name resolves to on this event: spec-defined
    /// attributes of the event's version first, then registered extensions.
    pub fn attribute(&self, name: &str) -> Option<&CloudEventAttribute> {
        self.spec_version
            .attribute(name)
            .or_else(|| self.extensions.iter().find(|e| e.name() == name))
    }

    /// Current value of a populated attribute.
    pub fn attribute_value(&self, name: &str) -> Option<&AttributeValue> {
        self.entry(name).map(|(_, value)| value)
    }

    /// Set an attribute through its descriptor, validating on assignment.
    ///
    /// Unseen extension descriptors are registered as a side effect; a
    /// descriptor clashing with a registered one (or with a spec attribute of
    /// a different shape) fails before anything is stored.
    pub fn set_attribute(
        &mut self,
        attribute: &CloudEventAttribute,
        value: AttributeValue,
    ) -> CoreResult<()> {
        if attribute.name() == SPEC_VERSION_ATTRIBUTE_NAME {
            return Err(CoreError::Reserved(attribute.name().to_owned()));
        }
        attribute.validate(&value)?;
        if attribute.is_extension() {
            self.register_extension(attribute.clone())?;
        } else {
            match self.spec_version.attribute(attribute.name()) {
                Some(known) if known == attribute => {}
                Some(_) => return Err(CoreError::collision(attribute.name())),
                None => return Err(CoreError::unknown_attribute(attribute.name())),
            }
        }
        self.store(attribute.clone(), value);
        Ok(())
    }

    /// Set an attribute from its wire-string form, resolving the descriptor
    /// by name.
    ///
    /// `specversion` is reserved (bindings carry it as a distinguished
    /// header, never through this path); names nothing is registered under
    /// are an error rather than an implicit extension.
    pub fn set_attribute_from_string(&mut self, name: &str, raw: &str) -> CoreResult<()> {
        if name == SPEC_VERSION_ATTRIBUTE_NAME {
            return Err(CoreError::Reserved(name.to_owned()));
        }
        let attribute = self
            .attribute(name)
            .ok_or_else(|| CoreError::unknown_attribute(name))?
            .clone();
        let value = attribute.parse(raw)?;
        self.store(attribute, value);
        Ok(())
    }

    /// Unset an attribute, returning its previous value.
    pub fn remove_attribute(&mut self, name: &str) -> Option<AttributeValue> {
        let index = self.values.iter().position(|(a, _)| a.name() == name)?;
        Some(self.values.remove(index).1)
    }

    /// Populated attributes in pinned order: spec-defined attributes in
    /// registry order, then extensions in insertion order.
    ///
    /// Bindings iterate this to emit wire headers, so the order is part of
    /// the contract. Safe to enumerate repeatedly.
    pub fn populated_attributes(
        &self,
    ) -> impl Iterator<Item = (&CloudEventAttribute, &AttributeValue)> {
        let spec = self
            .spec_version
            .all_attributes()
            .filter_map(|attribute| self.entry(attribute.name()));
        let extensions = self
            .values
            .iter()
            .filter(|(attribute, _)| attribute.is_extension())
            .map(|(attribute, value)| (attribute, value));
        spec.chain(extensions)
    }

    // Typed accessors over the spec-defined attributes.

    pub fn id(&self) -> Option<&str> {
        self.string_value("id")
    }

    pub fn set_id(&mut self, id: impl Into<String>) -> CoreResult<()> {
        self.set_spec_value("id", AttributeValue::String(id.into()))
    }

    pub fn source(&self) -> Option<&str> {
        self.string_value("source")
    }

    pub fn set_source(&mut self, source: impl Into<String>) -> CoreResult<()> {
        self.set_spec_value("source", AttributeValue::UriReference(source.into()))
    }

    pub fn event_type(&self) -> Option<&str> {
        self.string_value("type")
    }

    pub fn set_event_type(&mut self, event_type: impl Into<String>) -> CoreResult<()> {
        self.set_spec_value("type", AttributeValue::String(event_type.into()))
    }

    pub fn subject(&self) -> Option<&str> {
        self.string_value("subject")
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) -> CoreResult<()> {
        self.set_spec_value("subject", AttributeValue::String(subject.into()))
    }

    pub fn time(&self) -> Option<&DateTime<FixedOffset>> {
        self.attribute_value("time").and_then(|v| v.as_timestamp())
    }

    pub fn set_time(&mut self, time: DateTime<FixedOffset>) -> CoreResult<()> {
        self.set_spec_value("time", AttributeValue::Timestamp(time))
    }

    pub fn data_schema(&self) -> Option<&str> {
        self.string_value("dataschema")
    }

    pub fn set_data_schema(&mut self, schema: impl Into<String>) -> CoreResult<()> {
        self.set_spec_value("dataschema", AttributeValue::Uri(schema.into()))
    }

    pub fn data_content_type(&self) -> Option<&str> {
        self.string_value("datacontenttype")
    }

    pub fn set_data_content_type(&mut self, content_type: impl Into<String>) -> CoreResult<()> {
        self.set_spec_value("datacontenttype", AttributeValue::String(content_type.into()))
    }

    pub fn data(&self) -> Option<&Data> {
        self.data.as_ref()
    }

    pub fn set_data(&mut self, data: impl Into<Data>) {
        self.data = Some(data.into());
    }

    pub fn clear_data(&mut self) {
        self.data = None;
    }

    /// Run the validation gate; pass-through on success for fluent chaining.
    pub fn validate(&self, param_name: &'static str) -> CoreResult<&Self> {
        crate::validation::check_cloud_event(self, param_name)
    }

    fn entry(&self, name: &str) -> Option<(&CloudEventAttribute, &AttributeValue)> {
        self.values
            .iter()
            .find(|(attribute, _)| attribute.name() == name)
            .map(|(attribute, value)| (attribute, value))
    }

    fn string_value(&self, name: &str) -> Option<&str> {
        self.attribute_value(name).and_then(|v| v.as_str())
    }

    fn set_spec_value(&mut self, name: &str, value: AttributeValue) -> CoreResult<()> {
        let attribute = self
            .spec_version
            .attribute(name)
            .ok_or_else(|| CoreError::unknown_attribute(name))?;
        attribute.validate(&value)?;
        self.store(attribute.clone(), value);
        Ok(())
    }

    fn store(&mut self, attribute: CloudEventAttribute, value: AttributeValue) {
        match self
            .values
            .iter_mut()
            .find(|(existing, _)| existing.name() == attribute.name())
        {
            Some(slot) => *slot = (attribute, value),
            None => self.values.push((attribute, value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute_type::AttributeType;
    use crate::error::ValueError;
    use uuid::Uuid;

    fn sample_event() -> CloudEvent {
        let mut event = CloudEvent::new(SpecVersion::V1_0);
        event.set_id(Uuid::now_v7().to_string()).unwrap();
        event.set_source("urn:example:source").unwrap();
        event.set_event_type("com.example.test").unwrap();
        event
    }

    #[test]
    fn typed_setters_validate_on_assignment() {
        let mut event = CloudEvent::new(SpecVersion::V1_0);
        assert!(event.set_source("urn:example:source").is_ok());
        assert_eq!(event.source(), Some("urn:example:source"));

        let err = event.set_source("has space").unwrap_err();
        assert!(matches!(err, CoreError::Attribute { name, .. } if name == "source"));
        // Failed assignment leaves the previous value intact.
        assert_eq!(event.source(), Some("urn:example:source"));
    }

    #[test]
    fn set_attribute_from_string_resolves_spec_attributes() {
        let mut event = sample_event();
        event
            .set_attribute_from_string("time", "2024-05-01T12:30:00Z")
            .unwrap();
        assert_eq!(
            event.time().unwrap().to_rfc3339(),
            "2024-05-01T12:30:00+00:00"
        );
    }

    #[test]
    fn set_attribute_from_string_rejects_unknown_names() {
        let mut event = sample_event();
        let err = event.set_attribute_from_string("mystery", "1").unwrap_err();
        assert_eq!(err, CoreError::UnknownAttribute("mystery".to_owned()));
    }

    #[test]
    fn specversion_is_never_settable_as_a_generic_attribute() {
        let mut event = sample_event();
        let before: Vec<String> = event
            .populated_attributes()
            .map(|(a, _)| a.name().to_owned())
            .collect();

        let err = event
            .set_attribute_from_string("specversion", "1.0")
            .unwrap_err();
        assert_eq!(err, CoreError::Reserved("specversion".to_owned()));

        let after: Vec<String> = event
            .populated_attributes()
            .map(|(a, _)| a.name().to_owned())
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn extension_values_parse_through_registered_descriptors() {
        let partition_key =
            CloudEventAttribute::extension("partitionkey", AttributeType::String).unwrap();
        let mut event = CloudEvent::with_extension_attributes(
            SpecVersion::V1_0,
            vec![partition_key],
        )
        .unwrap();
        event
            .set_attribute_from_string("partitionkey", "order-17")
            .unwrap();
        assert_eq!(
            event.attribute_value("partitionkey"),
            Some(&AttributeValue::String("order-17".to_owned()))
        );
    }

    #[test]
    fn conflicting_extension_descriptors_collide() {
        let as_string = CloudEventAttribute::extension("rank", AttributeType::String).unwrap();
        let as_integer = CloudEventAttribute::extension("rank", AttributeType::Integer).unwrap();

        let mut event = CloudEvent::new(SpecVersion::V1_0);
        event
            .set_attribute(&as_string, AttributeValue::String("a".to_owned()))
            .unwrap();
        let err = event
            .set_attribute(&as_integer, AttributeValue::Integer(1))
            .unwrap_err();
        assert_eq!(err, CoreError::Collision("rank".to_owned()));
    }

    #[test]
    fn set_attribute_rejects_kind_mismatches() {
        let mut event = CloudEvent::new(SpecVersion::V1_0);
        let time = SpecVersion::V1_0.attribute("time").unwrap();
        let err = event
            .set_attribute(time, AttributeValue::String("noon".to_owned()))
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::attribute(
                "time",
                ValueError::TypeMismatch {
                    expected: "Timestamp",
                    actual: "String"
                }
            )
        );
    }

    #[test]
    fn populated_attributes_order_is_spec_then_extensions_by_insertion() {
        let first = CloudEventAttribute::extension("zfirst", AttributeType::String).unwrap();
        let second = CloudEventAttribute::extension("asecond", AttributeType::String).unwrap();

        let mut event = CloudEvent::new(SpecVersion::V1_0);
        // Deliberately interleave spec and extension assignments.
        event
            .set_attribute(&first, AttributeValue::String("1".to_owned()))
            .unwrap();
        event.set_event_type("com.example.test").unwrap();
        event
            .set_attribute(&second, AttributeValue::String("2".to_owned()))
            .unwrap();
        event.set_id("id-1").unwrap();
        event.set_source("urn:example:source").unwrap();
        event.set_subject("s").unwrap();

        let names: Vec<&str> = event.populated_attributes().map(|(a, _)| a.name()).collect();
        assert_eq!(
            names,
            vec!["id", "source", "type", "subject", "zfirst", "asecond"]
        );
    }

    #[test]
    fn remove_attribute_unsets_a_value() {
        let mut event = sample_event();
        event.set_subject("s").unwrap();
        assert_eq!(
            event.remove_attribute("subject"),
            Some(AttributeValue::String("s".to_owned()))
        );
        assert_eq!(event.subject(), None);
        assert_eq!(event.remove_attribute("subject"), None);
    }

    #[test]
    fn data_round_trips_through_the_payload_slot() {
        let mut event = sample_event();
        assert!(event.data().is_none());

        event.set_data(serde_json::json!({"key": "value"}));
        assert_eq!(
            event.data(),
            Some(&Data::Json(serde_json::json!({"key": "value"})))
        );

        event.set_data(b"raw".to_vec());
        assert_eq!(event.data(), Some(&Data::Bytes(b"raw".to_vec())));

        event.clear_data();
        assert!(event.data().is_none());
    }
}
