//! The CloudEvents attribute type system.
//!
//! A closed set of seven primitive types, each with its own parse/format/
//! validate rules and a fixed ordinal rank. Keeping the set closed makes the
//! per-type dispatch exhaustive and compiler-checked; adding a kind is a
//! breaking change that re-audits every match below.

use chrono::{DateTime, FixedOffset, SecondsFormat};

use crate::binary_data;
use crate::error::ValueError;

/// One of the seven CloudEvents attribute types.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AttributeType {
    Boolean,
    Integer,
    String,
    Binary,
    Uri,
    UriReference,
    Timestamp,
}

/// A typed attribute value.
///
/// Values are immutable once stored on an event; "modifying" one means
/// setting a new value through the owning attribute's setter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Boolean(bool),
    Integer(i32),
    String(String),
    Binary(Vec<u8>),
    /// Absolute URI (scheme required).
    Uri(String),
    /// Absolute or relative URI reference.
    UriReference(String),
    /// RFC3339 instant with explicit offset.
    Timestamp(DateTime<FixedOffset>),
}

impl AttributeType {
    /// All kinds in ordinal order.
    pub const ALL: [AttributeType; 7] = [
        AttributeType::Boolean,
        AttributeType::Integer,
        AttributeType::String,
        AttributeType::Binary,
        AttributeType::Uri,
        AttributeType::UriReference,
        AttributeType::Timestamp,
    ];

    /// Stable display name (matches the CloudEvents type-system names).
    pub fn name(&self) -> &'static str {
        match self {
            AttributeType::Boolean => "Boolean",
            AttributeType::Integer => "Integer",
            AttributeType::String => "String",
            AttributeType::Binary => "Binary",
            AttributeType::Uri => "Uri",
            AttributeType::UriReference => "UriReference",
            AttributeType::Timestamp => "Timestamp",
        }
    }

    /// Resolve a kind by its display name.
    ///
    /// Returns `None` for anything outside the known set; this is the only
    /// place an "unrecognized type" can exist, since the enum is closed.
    pub fn from_name(name: &str) -> Option<AttributeType> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Fixed rank used for deterministic attribute ordering.
    ///
    /// Boolean < Integer < String < Binary < Uri < UriReference < Timestamp.
    pub fn ordinal(&self) -> u8 {
        match self {
            AttributeType::Boolean => 0,
            AttributeType::Integer => 1,
            AttributeType::String => 2,
            AttributeType::Binary => 3,
            AttributeType::Uri => 4,
            AttributeType::UriReference => 5,
            AttributeType::Timestamp => 6,
        }
    }

    /// Parse a wire string into a typed value.
    pub fn parse(&self, raw: &str) -> Result<AttributeValue, ValueError> {
        let value = match self {
            AttributeType::Boolean => match raw {
                "true" => AttributeValue::Boolean(true),
                "false" => AttributeValue::Boolean(false),
                _ => {
                    return Err(ValueError::parse(
                        self.name(),
                        raw,
                        "expected `true` or `false`",
                    ));
                }
            },
            AttributeType::Integer => {
                let parsed = raw
                    .parse::<i32>()
                    .map_err(|e| ValueError::parse(self.name(), raw, e.to_string()))?;
                AttributeValue::Integer(parsed)
            }
            AttributeType::String => AttributeValue::String(raw.to_owned()),
            AttributeType::Binary => AttributeValue::Binary(binary_data::decode_base64(raw)?),
            AttributeType::Uri => AttributeValue::Uri(raw.to_owned()),
            AttributeType::UriReference => AttributeValue::UriReference(raw.to_owned()),
            AttributeType::Timestamp => {
                let parsed = DateTime::parse_from_rfc3339(raw)
                    .map_err(|e| ValueError::parse(self.name(), raw, e.to_string()))?;
                AttributeValue::Timestamp(parsed)
            }
        };
        self.validate(&value)?;
        Ok(value)
    }

    /// Format a typed value as its canonical wire string.
    ///
    /// Fails only on a kind mismatch; for a matching value this is
    /// [`AttributeValue`]'s `Display`.
    pub fn format(&self, value: &AttributeValue) -> Result<String, ValueError> {
        self.check_kind(value)?;
        Ok(value.to_string())
    }

    /// Check shape/range constraints beyond what parsing enforces.
    pub fn validate(&self, value: &AttributeValue) -> Result<(), ValueError> {
        self.check_kind(value)?;
        match value {
            AttributeValue::Boolean(_)
            | AttributeValue::Integer(_)
            | AttributeValue::Binary(_)
            | AttributeValue::Timestamp(_) => Ok(()),
            AttributeValue::String(s) => check_text(s),
            AttributeValue::Uri(s) => {
                check_uri_reference(s)?;
                if !has_scheme(s) {
                    return Err(ValueError::constraint(format!(
                        "`{s}` is not an absolute URI (missing scheme)"
                    )));
                }
                Ok(())
            }
            AttributeValue::UriReference(s) => check_uri_reference(s),
        }
    }

    fn check_kind(&self, value: &AttributeValue) -> Result<(), ValueError> {
        let actual = value.attribute_type();
        if actual != *self {
            return Err(ValueError::TypeMismatch {
                expected: self.name(),
                actual: actual.name(),
            });
        }
        Ok(())
    }
}

impl core::fmt::Display for AttributeType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl AttributeValue {
    /// The kind this value belongs to.
    pub fn attribute_type(&self) -> AttributeType {
        match self {
            AttributeValue::Boolean(_) => AttributeType::Boolean,
            AttributeValue::Integer(_) => AttributeType::Integer,
            AttributeValue::String(_) => AttributeType::String,
            AttributeValue::Binary(_) => AttributeType::Binary,
            AttributeValue::Uri(_) => AttributeType::Uri,
            AttributeValue::UriReference(_) => AttributeType::UriReference,
            AttributeValue::Timestamp(_) => AttributeType::Timestamp,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s)
            | AttributeValue::Uri(s)
            | AttributeValue::UriReference(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            AttributeValue::Timestamp(t) => Some(t),
            _ => None,
        }
    }
}

/// Canonical wire representation.
///
/// `parse(format(v)) == v` for every valid `v`; the reverse is not promised
/// verbatim (e.g. `+05` parses as Integer but formats as `5`).
impl core::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AttributeValue::Boolean(b) => f.write_str(if *b { "true" } else { "false" }),
            AttributeValue::Integer(i) => write!(f, "{i}"),
            AttributeValue::String(s)
            | AttributeValue::Uri(s)
            | AttributeValue::UriReference(s) => f.write_str(s),
            AttributeValue::Binary(bytes) => f.write_str(&binary_data::encode_base64(bytes)),
            AttributeValue::Timestamp(t) => {
                f.write_str(&t.to_rfc3339_opts(SecondsFormat::AutoSi, false))
            }
        }
    }
}

/// Reject C0/C1 control characters (forbidden in attribute text).
fn check_text(s: &str) -> Result<(), ValueError> {
    if let Some(c) = s.chars().find(|c| c.is_control()) {
        return Err(ValueError::constraint(format!(
            "control character U+{:04X} is not allowed",
            c as u32
        )));
    }
    Ok(())
}

fn check_uri_reference(s: &str) -> Result<(), ValueError> {
    if s.is_empty() {
        return Err(ValueError::constraint("URI reference cannot be empty"));
    }
    if let Some(c) = s.chars().find(|c| c.is_whitespace() || c.is_control()) {
        return Err(ValueError::constraint(format!(
            "character U+{:04X} is not allowed in a URI",
            c as u32
        )));
    }
    Ok(())
}

/// RFC3986 scheme test: `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ) ":"`,
/// and the colon must come before any path/query/fragment delimiter.
fn has_scheme(s: &str) -> bool {
    let Some(end) = s.find([':', '/', '?', '#']) else {
        return false;
    };
    if !s[end..].starts_with(':') || end == 0 {
        return false;
    }
    let scheme = &s[..end];
    scheme.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && scheme[1..]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
