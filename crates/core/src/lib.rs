//! `cloudevents-core` — the shared CloudEvents data model and encoding contract.
//!
//! This crate contains the pieces every transport binding relies on: the
//! typed attribute system, the [`CloudEvent`] envelope, the validation gate,
//! and the binary/structured [`EventFormatter`] contract. It is a pure,
//! synchronous, in-memory library: no networking, no retries, no
//! persistence. A `CloudEvent` is not safe for concurrent mutation; once
//! validated and no longer mutated it is safe to share for reads.

pub mod attribute;
pub mod attribute_type;
pub mod binary_data;
pub mod error;
pub mod event;
pub mod formatter;
pub mod media_type;
pub mod spec_version;
pub mod validation;

pub use attribute::CloudEventAttribute;
pub use attribute_type::{AttributeType, AttributeValue};
pub use error::{CoreError, CoreResult, FormatError, ValueError};
pub use event::{CloudEvent, Data};
pub use formatter::{ContentMode, EncodedEvent, EventFormatter};
pub use spec_version::{SPEC_VERSION_ATTRIBUTE_NAME, SpecVersion};
