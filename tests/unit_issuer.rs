use accesstoken::auth::privileges::rtc;
use accesstoken::auth::{BuildError, ParseError, VerifyError};
use accesstoken::{CheckError, Issuer, Role, TokenConfig};
use std::collections::HashMap;

fn get_test_config() -> TokenConfig {
    TokenConfig::new(
        "970ca35de60c44645bbae8a215061b33",
        "5cfd2fd1755d40ecb72977518be15d3b",
    )
}

#[test]
fn test_issue_and_check_publisher() {
    let issuer = Issuer::new(get_test_config().with_token_expire(3600));
    let issued = issuer
        .issue_with_role("room1", 12345, Role::Publisher)
        .unwrap();
    assert_eq!(issued.uid, "12345");

    let parsed = issuer.parse(&issued.token).unwrap();
    let now = u64::from(parsed.issue_ts);
    let checked = issuer.check(&issued.token, now).unwrap();

    let service = checked.rtc().unwrap();
    assert_eq!(service.channel_name, "room1");
    assert_eq!(service.uid, "12345");
    let granted: Vec<u16> = service.privileges.iter().map(|(id, _)| id).collect();
    assert_eq!(granted, Role::Publisher.privileges());
    assert_eq!(checked.expires_at(), now + 3600);
}

#[test]
fn test_subscriber_only_joins() {
    let issuer = Issuer::new(get_test_config());
    let issued = issuer.issue_with_role("room1", 0, Role::Subscriber).unwrap();

    let parsed = issuer.parse(&issued.token).unwrap();
    let service = parsed.rtc().unwrap();
    assert!(service.uid.is_empty());
    assert!(service.privileges.contains(rtc::JOIN_CHANNEL));
    assert!(!service.privileges.contains(rtc::PUBLISH_AUDIO_STREAM));
}

#[test]
fn test_privilege_expiry_follows_config() {
    let issuer = Issuer::new(get_test_config().with_privilege_expire(0));
    let issued = issuer
        .issue("room1", 7, &[rtc::JOIN_CHANNEL, rtc::PUBLISH_AUDIO_STREAM], 600)
        .unwrap();
    let parsed = issuer.parse(&issued.token).unwrap();

    assert_eq!(
        parsed.privilege_expires_at(1, rtc::JOIN_CHANNEL),
        Some(parsed.expires_at())
    );
    assert_eq!(parsed.privilege_expires_at(1, rtc::PUBLISH_VIDEO_STREAM), None);
    assert_eq!(parsed.privilege_expires_at(2, rtc::JOIN_CHANNEL), None);
}

#[test]
fn test_check_rejects_wrong_certificate() {
    let issued = Issuer::new(get_test_config())
        .issue_with_role("room1", 1, Role::Publisher)
        .unwrap();

    let mut config = get_test_config();
    config.app_certificate = "0123456789abcdef0123456789abcdef".to_string();
    let other = Issuer::new(config);

    assert_eq!(
        other.check(&issued.token, 0),
        Err(CheckError::Signature(VerifyError::SignatureMismatch))
    );
}

#[test]
fn test_check_rejects_garbage() {
    let issuer = Issuer::new(get_test_config());
    assert_eq!(
        issuer.check("007!!!", 0),
        Err(CheckError::Parse(ParseError::Malformed))
    );
    assert!(matches!(
        issuer.check("006abc", 0),
        Err(CheckError::Parse(ParseError::UnsupportedVersion { .. }))
    ));
}

#[test]
fn test_config_from_lookup_drives_issuer() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("TOKEN_APP_ID", "970ca35de60c44645bbae8a215061b33"),
        ("TOKEN_APP_CERTIFICATE", "5cfd2fd1755d40ecb72977518be15d3b"),
        ("TOKEN_EXPIRE_SECONDS", "90"),
    ]);
    let config = TokenConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
    let issuer = Issuer::new(config);

    let issued = issuer.issue_with_role("room1", 1, Role::Publisher).unwrap();
    assert_eq!(issuer.parse(&issued.token).unwrap().expire, 90);
}

#[test]
fn test_invalid_certificate_is_a_build_error() {
    let issuer = Issuer::new(TokenConfig::new("970ca35de60c44645bbae8a215061b33", ""));
    assert!(matches!(
        issuer.issue("room1", 1, &[rtc::JOIN_CHANNEL], 60),
        Err(BuildError::InvalidAppCertificate)
    ));
}
