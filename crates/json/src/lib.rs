//! `cloudevents-json` — JSON event format codec.
//!
//! Implements the [`EventFormatter`](cloudevents_core::EventFormatter)
//! contract with the CloudEvents JSON event format: structured-mode bodies
//! are a single JSON object carrying the envelope attributes as members and
//! the payload as `data` (or `data_base64` for raw bytes).

pub mod formatter;

pub use formatter::JsonEventFormatter;
