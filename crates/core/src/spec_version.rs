//! CloudEvents specification versions and their attribute registries.
//!
//! The registries are process-wide immutable state, built once on first use.
//! `specversion` itself is carried as a distinguished header on every wire
//! representation and never appears among the payload attributes.

use std::sync::LazyLock;

use crate::attribute::CloudEventAttribute;
use crate::attribute_type::AttributeType;

/// Wire name of the distinguished spec-version attribute.
pub const SPEC_VERSION_ATTRIBUTE_NAME: &str = "specversion";

/// A supported CloudEvents specification version.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SpecVersion {
    V1_0,
}

static V1_0_REQUIRED: LazyLock<Vec<CloudEventAttribute>> = LazyLock::new(|| {
    vec![
        CloudEventAttribute::spec("id", AttributeType::String, true),
        CloudEventAttribute::spec("source", AttributeType::UriReference, true),
        CloudEventAttribute::spec("type", AttributeType::String, true),
    ]
});

static V1_0_OPTIONAL: LazyLock<Vec<CloudEventAttribute>> = LazyLock::new(|| {
    vec![
        CloudEventAttribute::spec("datacontenttype", AttributeType::String, false),
        CloudEventAttribute::spec("dataschema", AttributeType::Uri, false),
        CloudEventAttribute::spec("subject", AttributeType::String, false),
        CloudEventAttribute::spec("time", AttributeType::Timestamp, false),
    ]
});

impl SpecVersion {
    /// The wire token for this version (the `specversion` value).
    pub fn version_id(&self) -> &'static str {
        match self {
            SpecVersion::V1_0 => "1.0",
        }
    }

    /// Resolve a wire token to a version.
    ///
    /// Returns `None` for unknown tokens; whether that is fatal is the
    /// caller's decision.
    pub fn from_version_id(id: &str) -> Option<SpecVersion> {
        match id {
            "1.0" => Some(SpecVersion::V1_0),
            _ => None,
        }
    }

    /// Attributes every event of this version must populate, in registry order.
    pub fn required_attributes(&self) -> &'static [CloudEventAttribute] {
        match self {
            SpecVersion::V1_0 => &V1_0_REQUIRED,
        }
    }

    /// Spec-defined optional attributes, in registry order.
    pub fn optional_attributes(&self) -> &'static [CloudEventAttribute] {
        match self {
            SpecVersion::V1_0 => &V1_0_OPTIONAL,
        }
    }

    /// All spec-defined attributes: required first, then optional.
    pub fn all_attributes(&self) -> impl Iterator<Item = &'static CloudEventAttribute> {
        self.required_attributes()
            .iter()
            .chain(self.optional_attributes().iter())
    }

    /// Look up a spec-defined attribute descriptor by name.
    pub fn attribute(&self, name: &str) -> Option<&'static CloudEventAttribute> {
        self.all_attributes().find(|a| a.name() == name)
    }
}

impl core::fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.version_id())
    }
}

/// True for names no extension attribute may use: `specversion` plus every
/// spec-defined attribute of any registered version.
pub(crate) fn is_reserved_name(name: &str) -> bool {
    if name == SPEC_VERSION_ATTRIBUTE_NAME {
        return true;
    }
    SpecVersion::V1_0.attribute(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_version_id_resolves_known_tokens_only() {
        assert_eq!(SpecVersion::from_version_id("1.0"), Some(SpecVersion::V1_0));
        assert_eq!(SpecVersion::from_version_id("0.3"), None);
        assert_eq!(SpecVersion::from_version_id(""), None);
    }

    #[test]
    fn v1_required_attributes_are_id_source_type() {
        let names: Vec<&str> = SpecVersion::V1_0
            .required_attributes()
            .iter()
            .map(|a| a.name())
            .collect();
        assert_eq!(names, vec!["id", "source", "type"]);
        assert!(
            SpecVersion::V1_0
                .required_attributes()
                .iter()
                .all(|a| a.is_required())
        );
    }

    #[test]
    fn attribute_lookup_covers_optional_set() {
        let time = SpecVersion::V1_0.attribute("time").unwrap();
        assert_eq!(time.attribute_type(), AttributeType::Timestamp);
        assert!(!time.is_required());
        assert!(SpecVersion::V1_0.attribute("specversion").is_none());
        assert!(SpecVersion::V1_0.attribute("partitionkey").is_none());
    }

    #[test]
    fn specversion_is_reserved() {
        assert!(is_reserved_name("specversion"));
        assert!(is_reserved_name("datacontenttype"));
        assert!(!is_reserved_name("partitionkey"));
    }
}
