use super::*;
use serde_json::json;

#[test]
fn success_yields_data_exactly() {
    let body = r#"{"success":true,"data":{"accessToken":"A1","refreshToken":"R1"}}"#;
    assert_eq!(
        unwrap_envelope(body),
        Outcome::Success(json!({ "accessToken": "A1", "refreshToken": "R1" }))
    );
}

#[test]
fn success_without_data_yields_null() {
    assert_eq!(unwrap_envelope(r#"{"success":true}"#), Outcome::Success(Value::Null));
}

#[test]
fn success_ignores_message_and_code() {
    let body = r#"{"success":true,"code":200,"message":"ok","data":[1,2]}"#;
    assert_eq!(unwrap_envelope(body), Outcome::Success(json!([1, 2])));
}

#[test]
fn failure_carries_code_and_message() {
    let body = r#"{"success":false,"code":"USER_AUTH_EXPIRED","message":"session expired"}"#;
    let Outcome::Rejected(rejection) = unwrap_envelope(body) else {
        panic!("expected rejection");
    };
    assert_eq!(rejection.code.as_deref(), Some(USER_AUTH_EXPIRED));
    assert_eq!(rejection.message, "session expired");
    assert!(rejection.is_session_expiry());
    assert_eq!(rejection.to_string(), "session expired");
}

#[test]
fn failure_without_message_uses_default() {
    let Outcome::Rejected(rejection) = unwrap_envelope(r#"{"success":false,"message":""}"#) else {
        panic!("expected rejection");
    };
    assert_eq!(rejection.message, DEFAULT_FAILURE_MESSAGE);
    assert_eq!(rejection.code, None);
}

#[test]
fn numeric_code_is_kept_as_text() {
    let Outcome::Rejected(rejection) = unwrap_envelope(r#"{"success":false,"code":20004}"#) else {
        panic!("expected rejection");
    };
    assert_eq!(rejection.code.as_deref(), Some("20004"));
    assert!(!rejection.is_session_expiry());
}

#[test]
fn not_logged_in_is_session_expiry() {
    let rejection = Rejection { code: Some(USER_NOT_LOGIN.to_owned()), message: "login".to_owned() };
    assert!(rejection.is_session_expiry());
}

#[test]
fn ordinary_code_is_not_session_expiry() {
    let rejection = Rejection { code: Some("USER_PASSWORD_ERROR".to_owned()), message: "bad".to_owned() };
    assert!(!rejection.is_session_expiry());
}

#[test]
fn malformed_bodies_are_rejected() {
    for body in ["", "not json", "[]", r#"{"data":1}"#, r#"{"success":"yes"}"#] {
        assert_eq!(
            unwrap_envelope(body),
            Outcome::Rejected(Rejection { code: None, message: DEFAULT_FAILURE_MESSAGE.to_owned() }),
            "body {body:?}"
        );
    }
}
