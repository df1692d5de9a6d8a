use super::*;
use crate::net::http::ErrorKind;

#[test]
fn item_endpoints_append_id() {
    assert_eq!(expense_endpoint(42), "/accounting/expenses/42");
    assert_eq!(application_endpoint(9), "/career/applications/9");
    assert_eq!(supply_item_endpoint(3), "/supply/items/3");
}

#[test]
fn survey_endpoints() {
    assert_eq!(survey_endpoint(5), "/surveys/5");
    assert_eq!(survey_responses_endpoint(5), "/surveys/5/responses");
    assert_eq!(SURVEYS, "/surveys/");
}

// =============================================================================
// IDENTITY
// =============================================================================

#[test]
fn blank_identity_is_malformed() {
    let error = checked_identity(UserIdentity::default()).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Malformed);
    assert_eq!(error.status_code(), None);

    let empty_strings = UserIdentity {
        email: Some(String::new()),
        phone: Some(String::new()),
        full_name: Some(String::new()),
    };
    assert!(checked_identity(empty_strings).is_err());
}

#[test]
fn any_named_field_is_enough() {
    let phone_only = UserIdentity {
        phone: Some("+1 555 0100".to_owned()),
        ..UserIdentity::default()
    };
    assert_eq!(checked_identity(phone_only.clone()).unwrap(), phone_only);
}
