//! Argument and envelope validation gates.
//!
//! Callers treat an event as usable only after [`check_cloud_event`] has
//! passed; the check is always explicit, never implicit in other operations.

use crate::error::{CoreError, CoreResult};
use crate::event::CloudEvent;

/// Check that every required attribute of the event's spec version is
/// populated and that every populated value still satisfies its descriptor.
///
/// Returns the same event unchanged on success so call sites can chain.
pub fn check_cloud_event<'a>(
    event: &'a CloudEvent,
    param_name: &'static str,
) -> CoreResult<&'a CloudEvent> {
    for attribute in event.spec_version().required_attributes() {
        if event.attribute_value(attribute.name()).is_none() {
            tracing::debug!(
                attribute = attribute.name(),
                param = param_name,
                "cloud event failed validation"
            );
            return Err(CoreError::MissingAttribute {
                param: param_name,
                attribute: attribute.name().to_owned(),
            });
        }
    }
    // Values are validated on assignment; re-running catches descriptors
    // whose custom validators depend on state outside the value itself.
    for (attribute, value) in event.populated_attributes() {
        attribute.validate(value)?;
    }
    Ok(event)
}

/// Require an optional argument to be present.
///
/// Ownership makes a general null-guard unnecessary; this covers the inputs
/// that are genuinely optional at the boundary (declared content types and
/// the like).
pub fn require<T>(value: Option<T>, param_name: &'static str) -> CoreResult<T> {
    value.ok_or(CoreError::MissingArgument(param_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec_version::SpecVersion;

    fn valid_event() -> CloudEvent {
        let mut event = CloudEvent::new(SpecVersion::V1_0);
        event.set_id("id-1").unwrap();
        event.set_source("urn:example:1").unwrap();
        event.set_event_type("com.example.test").unwrap();
        event
    }

    #[test]
    fn check_passes_through_a_valid_event() {
        let event = valid_event();
        let checked = check_cloud_event(&event, "event").unwrap();
        assert!(std::ptr::eq(checked, &event));
    }

    #[test]
    fn check_names_the_first_missing_required_attribute() {
        let mut event = CloudEvent::new(SpecVersion::V1_0);
        event.set_event_type("com.example.test").unwrap();

        let err = check_cloud_event(&event, "event").unwrap_err();
        assert_eq!(
            err,
            CoreError::MissingAttribute {
                param: "event",
                attribute: "id".to_owned()
            }
        );
    }

    #[test]
    fn all_required_attributes_are_populated_after_check() {
        let event = valid_event();
        check_cloud_event(&event, "event").unwrap();
        for required in event.spec_version().required_attributes() {
            assert!(
                event
                    .populated_attributes()
                    .any(|(a, _)| a.name() == required.name())
            );
        }
    }

    #[test]
    fn require_surfaces_absent_arguments() {
        assert_eq!(require(Some(5), "n").unwrap(), 5);
        assert_eq!(
            require(None::<i32>, "n").unwrap_err(),
            CoreError::MissingArgument("n")
        );
    }
}
