use accesstoken::auth::privileges::rtc;
use accesstoken::auth::{AccessToken, BuildError, ParseError, Service, ServiceRtc, VERSION};
use rand::Rng;

const APP_ID: &str = "970ca35de60c44645bbae8a215061b33";
const APP_CERTIFICATE: &str = "5cfd2fd1755d40ecb72977518be15d3b";

fn publisher(channel: &str, uid: u32, expire: u32) -> Service {
    Service::from(ServiceRtc::new(channel, uid))
        .with_privilege(rtc::JOIN_CHANNEL, expire)
        .with_privilege(rtc::PUBLISH_AUDIO_STREAM, expire)
        .with_privilege(rtc::PUBLISH_VIDEO_STREAM, expire)
        .with_privilege(rtc::PUBLISH_DATA_STREAM, expire)
}

#[test]
fn test_build_token_for_room1() {
    let token = AccessToken::new("a".repeat(32), "b".repeat(32), 600)
        .with_service(publisher("room1", 12345, 0))
        .build()
        .unwrap();

    assert!(token.starts_with("007"));

    let parsed = AccessToken::parse(&token).unwrap();
    let service = parsed.rtc().unwrap();
    assert_eq!(service.uid.as_bytes(), b"12345");
    assert_eq!(service.channel_name.as_bytes(), b"room1");
    assert_eq!(parsed.app_id, "a".repeat(32));
}

#[test]
fn test_round_trip_random_inputs() {
    let mut rng = rand::thread_rng();
    for _ in 0..50 {
        let uid: u32 = if rng.gen_bool(0.2) { 0 } else { rng.r#gen() };
        let issue_ts: u32 = rng.gen_range(1..=u32::MAX);
        let expire: u32 = rng.r#gen();
        let salt: u32 = rng.gen_range(1..=99_999_999);
        let channel: String = (0..rng.gen_range(1..64))
            .map(|_| rng.gen_range(b'a'..=b'z') as char)
            .collect();

        let mut service = Service::from(ServiceRtc::new(channel.clone(), uid));
        for _ in 0..rng.gen_range(1..8) {
            service.add_privilege(rng.r#gen(), rng.r#gen());
        }

        let token = AccessToken::new(APP_ID, APP_CERTIFICATE, expire)
            .with_issue_ts(issue_ts)
            .with_salt(salt)
            .with_service(service.clone());
        let parsed = AccessToken::parse(&token.build().unwrap()).unwrap();

        assert_eq!(parsed.app_id, APP_ID);
        assert_eq!(parsed.issue_ts, issue_ts);
        assert_eq!(parsed.expire, expire);
        assert_eq!(parsed.salt, salt);
        assert_eq!(parsed.service(ServiceRtc::SERVICE_TYPE), Some(&service));
        assert_eq!(parsed.rtc().unwrap().channel_name, channel);
        assert_eq!(parsed.rtc().unwrap().numeric_uid(), Some(uid));
        parsed.verify(APP_CERTIFICATE).unwrap();
    }
}

// Built independently with Python's hmac, zlib and base64 modules:
// issue_ts 1700000000, expire 3600, salt 12345678, channel "room1", uid 42,
// privileges {1: 0, 2: 600}.
const FOREIGN_TOKEN: &str = "007eJxTYNikILfI+aGgRr0qv53JTha/izoOQnx8dp27zaWK7wh/n63AYGlukJxobJqSamaQbGJiZmKalJSYapFoZGhqYGaYZGzM8DE4VYCPgcEvcQ8DIxAyATEIMDFEMDEwsDIU5efnGjIxmBgBAInVGf8=";

#[test]
fn test_parse_token_built_elsewhere() {
    let parsed = AccessToken::parse(FOREIGN_TOKEN).unwrap();

    assert_eq!(parsed.app_id, APP_ID);
    assert_eq!(parsed.issue_ts, 1_700_000_000);
    assert_eq!(parsed.expire, 3600);
    assert_eq!(parsed.salt, 12_345_678);
    assert_eq!(
        hex::encode(&parsed.signature),
        "b2201ea243e111287f250f3e34b9044ed12c40120e0e3e89bb371a73dc13f79b"
    );

    let service = parsed.rtc().unwrap();
    assert_eq!(service.channel_name, "room1");
    assert_eq!(service.numeric_uid(), Some(42));
    assert_eq!(service.privileges.get(rtc::JOIN_CHANNEL), Some(0));
    assert_eq!(service.privileges.get(rtc::PUBLISH_AUDIO_STREAM), Some(600));
    assert_eq!(parsed.services.len(), 1);

    parsed.verify(APP_CERTIFICATE).unwrap();
}

#[test]
fn test_rebuild_matches_foreign_signature() {
    let service = Service::from(ServiceRtc::new("room1", 42))
        .with_privilege(rtc::JOIN_CHANNEL, 0)
        .with_privilege(rtc::PUBLISH_AUDIO_STREAM, 600);
    let rebuilt = AccessToken::new(APP_ID, APP_CERTIFICATE, 3600)
        .with_issue_ts(1_700_000_000)
        .with_salt(12_345_678)
        .with_service(service)
        .build()
        .unwrap();

    let ours = AccessToken::parse(&rebuilt).unwrap();
    let theirs = AccessToken::parse(FOREIGN_TOKEN).unwrap();
    assert_eq!(ours, theirs);
}

#[test]
fn test_precondition_failures() {
    let short_cert =
        AccessToken::new(APP_ID, "b".repeat(31), 60).with_service(publisher("room1", 1, 0));
    assert!(matches!(short_cert.build(), Err(BuildError::InvalidAppCertificate)));

    let no_services = AccessToken::new(APP_ID, APP_CERTIFICATE, 60);
    assert!(matches!(no_services.build(), Err(BuildError::NoServices)));

    let long_app_id = AccessToken::new(format!("{APP_ID}0"), APP_CERTIFICATE, 60)
        .with_service(publisher("room1", 1, 0));
    assert!(matches!(long_app_id.build(), Err(BuildError::InvalidAppId)));
}

#[test]
fn test_version_is_checked_first() {
    let token = AccessToken::new(APP_ID, APP_CERTIFICATE, 60)
        .with_service(publisher("room1", 1, 0))
        .build()
        .unwrap();
    let retagged = format!("006{}", &token[VERSION.len()..]);

    assert!(matches!(
        AccessToken::parse(&retagged),
        Err(ParseError::UnsupportedVersion { .. })
    ));
    assert!(matches!(
        AccessToken::parse("xyz-not-base64-!!"),
        Err(ParseError::UnsupportedVersion { .. })
    ));
}

#[test]
fn test_corrupted_tokens_are_malformed() {
    let token = AccessToken::new(APP_ID, APP_CERTIFICATE, 60)
        .with_service(publisher("room1", 1, 0))
        .build()
        .unwrap();
    let body = &token[VERSION.len()..];

    let half = format!("{VERSION}{}", &body[..body.len() / 2]);
    assert_eq!(AccessToken::parse(&half), Err(ParseError::Malformed));

    assert_eq!(AccessToken::parse(VERSION), Err(ParseError::Malformed));

    let mut flipped = body.as_bytes().to_vec();
    let mid = flipped.len() / 2;
    flipped[mid] = if flipped[mid] == b'A' { b'B' } else { b'A' };
    let flipped = format!("{VERSION}{}", String::from_utf8(flipped).unwrap());
    // A flipped character either breaks decoding or changes the signed bytes.
    match AccessToken::parse(&flipped) {
        Err(err) => assert_eq!(err, ParseError::Malformed),
        Ok(parsed) => assert!(parsed.verify(APP_CERTIFICATE).is_err()),
    }
}

#[test]
fn test_successive_builds_differ() {
    let token = AccessToken::new(APP_ID, APP_CERTIFICATE, 60)
        .with_issue_ts(1_700_000_000)
        .with_service(publisher("room1", 1, 0));

    let a = AccessToken::parse(&token.build().unwrap()).unwrap();
    let b = AccessToken::parse(&token.build().unwrap()).unwrap();
    assert_ne!(a.salt, b.salt);
    assert_ne!(a.signature, b.signature);
}
