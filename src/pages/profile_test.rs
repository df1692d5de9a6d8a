use super::*;

#[test]
fn prefill_from_identity() {
    let identity = UserIdentity {
        email: Some("ada@example.com".to_owned()),
        phone: None,
        full_name: Some("Ada".to_owned()),
    };
    let form = ProfileForm::from_identity(&identity);
    assert_eq!(form.full_name, "Ada");
    assert_eq!(form.phone, "");
}

#[test]
fn empty_phone_is_sent_as_null() {
    let form = ProfileForm { full_name: "Ada".to_owned(), phone: "  ".to_owned() };
    let update = form.validate().unwrap();
    assert_eq!(update.phone, None);
    assert_eq!(serde_json::to_value(&update).unwrap()["phone"], serde_json::Value::Null);
}

#[test]
fn phone_accepts_common_punctuation() {
    let form = ProfileForm { full_name: "Ada".to_owned(), phone: "+1 (555) 010-2030".to_owned() };
    assert_eq!(form.validate().unwrap().phone.as_deref(), Some("+1 (555) 010-2030"));
}

#[test]
fn phone_rejects_letters() {
    let form = ProfileForm { full_name: "Ada".to_owned(), phone: "555-CALL".to_owned() };
    assert!(matches!(form.validate(), Err(FormError::Invalid(_))));
}

#[test]
fn full_name_is_required() {
    let form = ProfileForm { full_name: " ".to_owned(), phone: String::new() };
    assert_eq!(form.validate(), Err(FormError::Required("Full name")));
}
