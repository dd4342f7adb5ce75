//! Content-type classification shared by formatters and bindings.

use mime::Mime;

use crate::error::CoreError;
use crate::formatter::ContentMode;

/// Media type prefix for structured-mode single events.
pub const CLOUD_EVENTS_MEDIA_TYPE: &str = "application/cloudevents";

/// Media type prefix for structured-mode event batches.
pub const CLOUD_EVENTS_BATCH_MEDIA_TYPE: &str = "application/cloudevents-batch";

/// Parse a content-type header value.
pub fn parse_content_type(raw: &str) -> Result<Mime, CoreError> {
    raw.parse::<Mime>().map_err(|e| CoreError::InvalidContentType {
        value: raw.to_owned(),
        reason: e.to_string(),
    })
}

/// True for `application/cloudevents` with an optional `+<format>` suffix.
///
/// Batch media types are deliberately excluded; `application/cloudevents-batch`
/// is a different subtype, not a suffix of this one.
pub fn is_cloud_events(content_type: Option<&Mime>) -> bool {
    subtype_matches(content_type, "cloudevents")
}

/// True for `application/cloudevents-batch` with an optional suffix.
pub fn is_cloud_events_batch(content_type: Option<&Mime>) -> bool {
    subtype_matches(content_type, "cloudevents-batch")
}

/// Mode sniffing for bindings: structured iff the declared content type is a
/// (non-batch) cloudevents media type, binary otherwise. A missing content
/// type means binary mode, which then requires a version header upstream.
pub fn content_mode_of(content_type: Option<&Mime>) -> ContentMode {
    if is_cloud_events(content_type) {
        ContentMode::Structured
    } else {
        ContentMode::Binary
    }
}

fn subtype_matches(content_type: Option<&Mime>, subtype: &str) -> bool {
    let Some(mime) = content_type else {
        return false;
    };
    if mime.type_() != mime::APPLICATION {
        return false;
    }
    let actual = mime.subtype().as_str();
    actual == subtype
        || (actual.starts_with(subtype) && actual[subtype.len()..].starts_with('+'))
}
