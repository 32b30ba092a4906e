//! Two-phase validation against the in-memory store.
//!
//! Run with: `cargo test --test session_client`

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use djsession::session::{decode_session_data, encode_session_data};
use djsession::{
    DigestAlgorithm, InMemorySessionStore, RawSession, SecretString, SessionClient,
    SessionClientConfig, SessionError, Signer,
};
use serde_json::{Map, json};

const SECRET: &str = "s3cr3t";

fn config() -> SessionClientConfig {
    SessionClientConfig {
        secret_key: SecretString::new(SECRET),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_expired_record_is_never_decoded() {
    let store = InMemorySessionStore::new();
    // a payload that would fail verification if anyone looked at it
    store.insert(RawSession::new(
        "abc123",
        "definitely:not:signed",
        Utc::now() - Duration::seconds(1),
    ));
    let client = SessionClient::new(store.clone(), config()).unwrap();

    assert_eq!(
        client.get_raw_session("abc123").await,
        Err(SessionError::SessionExpired)
    );
    assert_eq!(
        client.authenticate("abc123").await,
        Err(SessionError::SessionExpired)
    );
    assert_eq!(store.lookup_count(), 2);
}

#[tokio::test]
async fn test_oversized_key_is_not_queried() {
    let store = InMemorySessionStore::new();
    let client = SessionClient::new(store.clone(), config()).unwrap();

    let key = "k".repeat(256);
    assert_eq!(
        client.get_raw_session(&key).await,
        Err(SessionError::SessionNotFound)
    );
    assert_eq!(store.lookup_count(), 0);
}

#[tokio::test]
async fn test_record_written_by_framework() {
    // payload produced by the framework for {"_auth_user_id": "42"} with this secret
    let payload = ".eJyrVopPLC3JiC8tTi2Kz0xRslIyMVKqBQBdkQd8:1r31eq:3N1t9CDF_cJVxzBGf_8NChk6I6tDrGNZwNvhN3XNn9o";
    let store = InMemorySessionStore::new();
    store.insert(RawSession::new(
        "fromdjango",
        payload,
        Utc::now() + Duration::days(14),
    ));
    let client = SessionClient::new(store, config()).unwrap();

    let (raw, user_id) = client.authenticate("fromdjango").await.unwrap();
    assert_eq!(raw.session_data, payload);
    assert_eq!(user_id, "42");
}

#[tokio::test]
async fn test_max_age_rejects_old_framework_payload() {
    // signed in November 2023
    let payload = ".eJyrVopPLC3JiC8tTi2Kz0xRslIyMVKqBQBdkQd8:1r31eq:3N1t9CDF_cJVxzBGf_8NChk6I6tDrGNZwNvhN3XNn9o";
    let store = InMemorySessionStore::new();
    store.insert(RawSession::new("k", payload, Utc::now() + Duration::days(1)));
    let client = SessionClient::new(
        store,
        SessionClientConfig {
            max_age: Some(Duration::weeks(2)),
            ..config()
        },
    )
    .unwrap();

    let raw = client.get_raw_session("k").await.unwrap();
    assert_eq!(
        client.decode_identity_from_record(&raw),
        Err(SessionError::SessionExpired)
    );
}

#[tokio::test]
async fn test_integer_identity() {
    let signer = Signer::new(SECRET).unwrap();
    let object = json!({
        "_auth_user_backend": "django.contrib.auth.backends.ModelBackend",
        "_auth_user_id": 12345,
    });
    let payload = signer.sign_object(&object, false).unwrap();

    let store = InMemorySessionStore::new();
    store.insert(RawSession::new("int", payload, Utc::now() + Duration::hours(1)));
    let client = SessionClient::new(store, config()).unwrap();

    let (_, user_id) = client.authenticate("int").await.unwrap();
    assert_eq!(user_id, "12345");
}

#[tokio::test]
async fn test_missing_identity() {
    let signer = Signer::new(SECRET).unwrap();
    let payload = signer.sign_object(&json!({"cart": [1, 2]}), true).unwrap();

    let store = InMemorySessionStore::new();
    store.insert(RawSession::new("anon", payload, Utc::now() + Duration::hours(1)));
    let client = SessionClient::new(store, config()).unwrap();

    let raw = client.get_raw_session("anon").await.unwrap();
    let err = client.decode_identity_from_record(&raw).unwrap_err();
    assert_eq!(err, SessionError::IdentityNotFound);
    assert!(err.is_authentication_failure());
}

#[tokio::test]
async fn test_sha512_deployment() {
    let config = SessionClientConfig {
        algorithm: DigestAlgorithm::Sha512,
        ..config()
    };
    let store = InMemorySessionStore::new();
    let client = SessionClient::new(store, config).unwrap();

    let payload = encode_session_data(client.signer(), "9", Map::new(), true).unwrap();
    client
        .store()
        .insert(RawSession::new("k", payload.clone(), Utc::now() + Duration::hours(1)));

    let (_, user_id) = client.authenticate("k").await.unwrap();
    assert_eq!(user_id, "9");

    // a SHA-256 signer must not accept it
    let sha256 = Signer::new(SECRET).unwrap();
    assert_eq!(
        decode_session_data(&sha256, &payload, None),
        Err(SessionError::InvalidSignature)
    );
}

#[tokio::test]
async fn test_concurrent_lookups() {
    let store = InMemorySessionStore::new();
    let client = Arc::new(SessionClient::new(store.clone(), config()).unwrap());
    for i in 0..16 {
        let payload =
            encode_session_data(client.signer(), &i.to_string(), Map::new(), true).unwrap();
        store.insert(RawSession::new(
            format!("key{i}"),
            payload,
            Utc::now() + Duration::hours(1),
        ));
    }

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.authenticate(&format!("key{i}")).await })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let (_, user_id) = handle.await.unwrap().unwrap();
        assert_eq!(user_id, i.to_string());
    }
    assert_eq!(store.lookup_count(), 16);
}
