//! Security requirements compiled from a YAML components file and checked
//! against in-memory requests.

use oasv_auth::{compile_security, AuthValidator, StaticCredentials};
use oasv_core::Components;
use serde_json::{json, Value};

const COMPONENTS: &str = r"
securitySchemes:
  bearerAuth:
    type: http
    scheme: bearer
  apiKeyCookieAuth:
    type: apiKey
    in: cookie
    name: C-API-KEY
";

fn validator(security: Value) -> Option<AuthValidator> {
    let components: Value = serde_yaml::from_str(COMPONENTS).unwrap();
    let components = Components::from_value(components).unwrap();
    compile_security(&security, Some(&components)).unwrap()
}

#[test]
fn any_of_bearer_or_cookie() {
    let v = validator(json!([{"bearerAuth": []}, {"apiKeyCookieAuth": []}])).unwrap();

    let cookie = StaticCredentials::new().with_cookie("C-API-KEY", "key");
    let credentials = v.validate(&cookie).unwrap();
    assert_eq!(credentials.get("C-API-KEY").map(String::as_str), Some("key"));
    assert!(!credentials.contains_key("authorization"));

    let both = cookie.with_header("Authorization", "Bearer token");
    let credentials = v.validate(&both).unwrap();
    assert_eq!(credentials.len(), 1);
    assert_eq!(credentials.get("authorization").map(String::as_str), Some("token"));

    let error = v.validate(&StaticCredentials::new()).unwrap_err();
    assert_eq!(error.to_json(), json!({"authorization": "is required"}));
}

#[test]
fn any_of_with_empty_alternative_is_optional() {
    let v = validator(json!([{"bearerAuth": []}, {"apiKeyCookieAuth": []}, {}])).unwrap();
    assert!(v.validate(&StaticCredentials::new()).unwrap().is_empty());

    let cookie = StaticCredentials::new().with_cookie("C-API-KEY", "key");
    assert_eq!(v.validate(&cookie).unwrap().len(), 1);
}

#[test]
fn all_of_reports_the_missing_part() {
    let v = validator(json!([{"bearerAuth": [], "apiKeyCookieAuth": []}])).unwrap();
    let header_only = StaticCredentials::new().with_header("Authorization", "Bearer t");
    assert_eq!(
        v.validate(&header_only).unwrap_err().to_json(),
        json!({"C-API-KEY": "is required"})
    );
}
