use super::*;
use chrono::TimeZone;
use jsonwebtoken::{decode, DecodingKey, Validation};
use secrecy::ExposeSecret;
use test_utils::{
    jwt_claims, jwt_header, malformed_private_key_pem, private_key_pem, public_key_pem,
    structurally_invalid_private_key_pem, KeyFormat,
};

const TEST_APP_ID: u64 = 123;

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + TimeDelta::milliseconds(250)
}

#[test]
fn test_parse_accepts_pkcs1_and_pkcs8_keys() {
    for format in [KeyFormat::Pkcs1, KeyFormat::Pkcs8] {
        let identity = AppIdentity::parse("123", &private_key_pem(format))
            .unwrap_or_else(|e| panic!("{format:?} key should parse: {e}"));
        assert_eq!(identity.app_id(), TEST_APP_ID);
    }
}

#[test]
fn test_parse_trims_app_id() {
    let identity = AppIdentity::parse(" 42\n", &private_key_pem(KeyFormat::Pkcs1)).unwrap();
    assert_eq!(identity.app_id(), 42);
}

#[test]
fn test_parse_rejects_non_numeric_app_id() {
    let result = AppIdentity::parse("my-app", &private_key_pem(KeyFormat::Pkcs1));
    match result {
        Err(Error::InvalidAppId { value, .. }) => assert_eq!(value, "my-app"),
        other => panic!("Expected InvalidAppId, got {other:?}"),
    }
}

#[test]
fn test_parse_rejects_negative_app_id() {
    let result = AppIdentity::parse("-5", &private_key_pem(KeyFormat::Pkcs1));
    assert!(matches!(result, Err(Error::InvalidAppId { .. })));
}

#[test]
fn test_parse_rejects_text_without_pem_block() {
    let result = AppIdentity::parse("123", "not a key at all");
    assert!(matches!(result, Err(Error::InvalidPrivateKey(_))));
}

#[test]
fn test_debug_redacts_private_key() {
    let identity = AppIdentity::parse("123", &private_key_pem(KeyFormat::Pkcs8)).unwrap();
    let debug_output = format!("{identity:?}");
    assert!(debug_output.contains("<REDACTED>"));
    assert!(!debug_output.contains("PRIVATE KEY"));
}

#[test]
fn test_sign_sets_claims_relative_to_now() {
    let identity = AppIdentity::parse("123", &private_key_pem(KeyFormat::Pkcs1)).unwrap();
    let now = fixed_now();

    let assertion = identity.sign(now).unwrap();

    assert_eq!(assertion.generated_at(), now);
    assert_eq!(now - assertion.issued_at(), TimeDelta::seconds(60));
    assert_eq!(assertion.expires_at() - now, TimeDelta::seconds(600));
    assert_eq!(assertion.lifetime(), TimeDelta::seconds(ASSERTION_LIFETIME_SECONDS));
    assert_eq!(assertion.app_id(), TEST_APP_ID);

    let claims = jwt_claims(assertion.value().expose_secret());
    assert_eq!(claims["iss"], "123");
    assert_eq!(claims["iat"], now.timestamp() - 60);
    assert_eq!(claims["exp"], now.timestamp() + 600);

    let object = claims.as_object().unwrap();
    assert_eq!(object.len(), 3, "only iss, iat and exp are expected");
}

#[test]
fn test_sign_uses_rs256() {
    let identity = AppIdentity::parse("123", &private_key_pem(KeyFormat::Pkcs8)).unwrap();
    let assertion = identity.sign(fixed_now()).unwrap();

    let header = jwt_header(assertion.value().expose_secret());
    assert_eq!(header["alg"], "RS256");
}

#[test]
fn test_signature_verifies_with_public_key() {
    let identity = AppIdentity::parse("987654", &private_key_pem(KeyFormat::Pkcs1)).unwrap();
    let assertion = identity.sign(fixed_now()).unwrap();

    let key = DecodingKey::from_rsa_pem(public_key_pem().as_bytes()).unwrap();
    let mut validation = Validation::new(Algorithm::RS256);
    validation.validate_exp = false;

    let decoded = decode::<serde_json::Value>(assertion.value().expose_secret(), &key, &validation)
        .expect("assertion should verify against the public key");
    assert_eq!(decoded.claims["iss"], "987654");
}

#[test]
fn test_window_is_independent_of_app_id() {
    for app_id in ["1", "42", "18446744073709551615"] {
        let identity = AppIdentity::parse(app_id, &private_key_pem(KeyFormat::Pkcs8)).unwrap();
        let now = Utc::now();
        let assertion = identity.sign(now).unwrap();

        assert_eq!(now - assertion.issued_at(), TimeDelta::seconds(60));
        assert_eq!(assertion.expires_at() - now, TimeDelta::seconds(600));
        assert_eq!(jwt_claims(assertion.value().expose_secret())["iss"], app_id);
    }
}

#[test]
fn test_sign_with_structurally_invalid_key_fails() {
    let key = EncodingKey::from_rsa_der(&[0x30, 0x03, 0x02, 0x01, 0x00]);
    let identity = AppIdentity::from_parts(TEST_APP_ID, key);

    let result = identity.sign(fixed_now());

    assert!(matches!(result, Err(Error::Signing(_))));
}

#[test]
fn test_malformed_pem_body_is_rejected_when_parsed() {
    let result = AppIdentity::parse("123", &malformed_private_key_pem());

    assert!(matches!(result, Err(Error::InvalidPrivateKey(_))));
}

#[test]
fn test_pem_with_non_rsa_body_fails_to_sign() {
    let identity = AppIdentity::parse("123", &structurally_invalid_private_key_pem()).unwrap();

    let result = identity.sign(fixed_now());

    assert!(matches!(result, Err(Error::Signing(_))));
}
