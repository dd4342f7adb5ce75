//! The encode/decode contract every format codec implements.
//!
//! Transport bindings never touch wire bytes directly: they pick a content
//! mode from the declared content type (see [`crate::media_type`]) and
//! delegate to an [`EventFormatter`]. Formatters hold no shared mutable
//! state; implementations are plain stateless values.

use mime::Mime;

use crate::attribute::CloudEventAttribute;
use crate::error::FormatError;
use crate::event::CloudEvent;

/// How an event is laid out on the wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ContentMode {
    /// The whole envelope plus data is one self-describing blob with an
    /// `application/cloudevents+<format>` content type.
    Structured,
    /// The data payload is the message body; envelope attributes travel as
    /// transport-native headers.
    Binary,
}

/// A serialized body plus the content type to declare alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedEvent {
    pub body: Vec<u8>,
    pub content_type: Mime,
}

/// A format-specific codec for CloudEvents.
///
/// Contract binding every implementation: for each content mode the
/// formatter supports, decoding its own encoding must reproduce an event
/// with the same populated attributes and semantically equal data. Decoders
/// delegate the final required-attribute gate to
/// [`validation::check_cloud_event`](crate::validation::check_cloud_event).
pub trait EventFormatter {
    /// Serialize the full envelope plus data as one structured-mode blob.
    fn encode_structured(&self, event: &CloudEvent) -> Result<EncodedEvent, FormatError>;

    /// Decode a structured-mode body into a validated event.
    ///
    /// `extension_attributes` are the descriptors to resolve non-spec
    /// members against; how unrecognized members are handled is up to the
    /// format.
    fn decode_structured(
        &self,
        body: &[u8],
        content_type: Option<&Mime>,
        extension_attributes: &[CloudEventAttribute],
    ) -> Result<CloudEvent, FormatError>;

    /// Serialize only the data payload for binary-mode transport.
    ///
    /// The returned content type reflects the event's `datacontenttype`,
    /// defaulted by the formatter when unset.
    fn encode_binary_data(&self, event: &CloudEvent) -> Result<EncodedEvent, FormatError>;

    /// Populate `event`'s data from a binary-mode body.
    ///
    /// The envelope attributes (including `datacontenttype`) must already be
    /// in place; the transport binding populates them from native headers
    /// before calling this.
    fn decode_binary_data(&self, body: &[u8], event: &mut CloudEvent) -> Result<(), FormatError>;
}
