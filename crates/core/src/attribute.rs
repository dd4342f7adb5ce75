//! Attribute descriptors: named, typed, optionally validated.
//!
//! A descriptor is a value object — immutable after construction and compared
//! by name/type/flags, never by identity. Spec-defined descriptors live in
//! [`SpecVersion`](crate::spec_version::SpecVersion) registries; extension
//! descriptors are built by callers via [`CloudEventAttribute::extension`].

use std::sync::Arc;

use crate::attribute_type::{AttributeType, AttributeValue};
use crate::error::{CoreError, CoreResult};

/// Validator run on every assignment of the attribute, after type checks.
pub type AttributeValidator = Arc<dyn Fn(&AttributeValue) -> Result<(), String> + Send + Sync>;

/// Descriptor for a single CloudEvents attribute.
#[derive(Clone)]
pub struct CloudEventAttribute {
    name: String,
    attr_type: AttributeType,
    required: bool,
    extension: bool,
    validator: Option<AttributeValidator>,
}

impl CloudEventAttribute {
    /// Spec-defined attribute. Names are trusted here; the registries are the
    /// only callers.
    pub(crate) fn spec(name: &'static str, attr_type: AttributeType, required: bool) -> Self {
        Self {
            name: name.to_owned(),
            attr_type,
            required,
            extension: false,
            validator: None,
        }
    }

    /// Extension attribute with the given name and type.
    ///
    /// Fails if the name is empty, contains anything other than lowercase
    /// ASCII alphanumerics, or collides with a spec-defined attribute name
    /// (including `specversion`).
    pub fn extension(name: impl Into<String>, attr_type: AttributeType) -> CoreResult<Self> {
        let name = name.into();
        validate_name(&name)?;
        if crate::spec_version::is_reserved_name(&name) {
            return Err(CoreError::collision(name));
        }
        Ok(Self {
            name,
            attr_type,
            required: false,
            extension: true,
            validator: None,
        })
    }

    /// Attach a validator, consuming the descriptor.
    pub fn with_validator(
        mut self,
        validator: impl Fn(&AttributeValue) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute_type(&self) -> AttributeType {
        self.attr_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_extension(&self) -> bool {
        self.extension
    }

    /// Parse a wire string into a value valid for this attribute.
    pub fn parse(&self, raw: &str) -> CoreResult<AttributeValue> {
        let value = self
            .attr_type
            .parse(raw)
            .map_err(|e| CoreError::attribute(&self.name, e))?;
        self.run_validator(&value)?;
        Ok(value)
    }

    /// Validate an already-typed value against this attribute.
    pub fn validate(&self, value: &AttributeValue) -> CoreResult<()> {
        self.attr_type
            .validate(value)
            .map_err(|e| CoreError::attribute(&self.name, e))?;
        self.run_validator(value)
    }

    /// Canonical wire string for a value of this attribute.
    pub fn format(&self, value: &AttributeValue) -> CoreResult<String> {
        self.attr_type
            .format(value)
            .map_err(|e| CoreError::attribute(&self.name, e))
    }

    fn run_validator(&self, value: &AttributeValue) -> CoreResult<()> {
        if let Some(validator) = &self.validator {
            validator(value).map_err(|reason| {
                CoreError::attribute(&self.name, crate::error::ValueError::constraint(reason))
            })?;
        }
        Ok(())
    }
}

impl core::fmt::Debug for CloudEventAttribute {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CloudEventAttribute")
            .field("name", &self.name)
            .field("attr_type", &self.attr_type)
            .field("required", &self.required)
            .field("extension", &self.extension)
            .field("validator", &self.validator.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Compared by descriptor shape; validators are opaque and ignored.
impl PartialEq for CloudEventAttribute {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.attr_type == other.attr_type
            && self.required == other.required
            && self.extension == other.extension
    }
}

impl Eq for CloudEventAttribute {}

/// Attribute names are lowercase ASCII alphanumerics, non-empty.
pub(crate) fn validate_name(name: &str) -> CoreResult<()> {
    if name.is_empty() {
        return Err(CoreError::invalid_name(name, "name cannot be empty"));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit()))
    {
        return Err(CoreError::invalid_name(
            name,
            format!("character `{c}` is not lowercase ASCII alphanumeric"),
        ));
    }
    Ok(())
}
