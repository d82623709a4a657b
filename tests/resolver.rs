//! End-to-end decoding through `Config` → `build_resolver`.

use std::collections::HashMap;
use std::io::Write;

use chrono::{Duration, TimeZone, Utc};

use authz_claims::services::payload::UnsignedPayload;
use authz_claims::services::policy::CredentialDigest;
use authz_claims::{
    Claim, ClaimSet, ClaimsResolver, Config, PartyId, ResolveError, build_resolver,
};

fn resolver_with(pairs: &[(&str, &str)]) -> std::sync::Arc<dyn ClaimsResolver> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let config = Config::from_lookup(|k| map.get(k).cloned()).expect("config");
    build_resolver(&config).expect("resolver")
}

fn party(s: &str) -> PartyId {
    PartyId::parse(s).unwrap()
}

#[test]
fn scenario_wildcard_empty_and_party_token() {
    let resolver = resolver_with(&[]);

    let wildcard = resolver.decode(Some(b"wildcard-token")).unwrap();
    assert_eq!(wildcard, ClaimSet::wildcard());

    assert_eq!(resolver.decode(Some(b"")), Err(ResolveError::Unauthenticated));
    assert_eq!(resolver.decode(None), Err(ResolveError::Unauthenticated));

    let p = resolver.decode(Some(b"P-token")).unwrap();
    assert_eq!(
        p.claims(),
        &[
            Claim::Admin,
            Claim::Public,
            Claim::ActAsAnyParty,
            Claim::ReadAsParty { party: party("P") },
            Claim::ActAsParty { party: party("P") },
        ]
    );
    assert_eq!(p.expiration(), None);
    assert_eq!(p.application_id(), None);
    assert!(!p.is_wildcard());
}

#[test]
fn decoding_is_deterministic() {
    let resolver = resolver_with(&[]);
    for cred in [&b"wildcard-token"[..], b"P-token", b"Alice-token"] {
        assert_eq!(resolver.decode(Some(cred)), resolver.decode(Some(cred)));
    }
    for cred in [&b"bad$-token"[..], b"nope"] {
        assert_eq!(resolver.decode(Some(cred)), resolver.decode(Some(cred)));
    }
}

#[test]
fn malformed_credentials_are_invalid() {
    let resolver = resolver_with(&[]);
    for cred in [
        &b"bad$party-token"[..],
        b"P.Q-token",
        b"-token",
        b"random-secret",
        b"claims:!!",
    ] {
        match resolver.decode(Some(cred)) {
            Err(ResolveError::InvalidCredential { reason }) => {
                assert!(!reason.contains(std::str::from_utf8(cred).unwrap()));
            }
            other => panic!("expected InvalidCredential, got {other:?}"),
        }
    }
}

#[test]
fn production_rejects_test_credentials_by_default() {
    let resolver = resolver_with(&[("APP_ENV", "production")]);
    for cred in [&b"wildcard-token"[..], b"P-token"] {
        assert!(matches!(
            resolver.decode(Some(cred)),
            Err(ResolveError::InvalidCredential { .. })
        ));
    }
}

#[test]
fn stub_resolvers_selected_by_config() {
    let wildcard = resolver_with(&[("AUTHZ_RESOLVER", "wildcard")]);
    assert!(wildcard.decode(Some(b"whatever")).unwrap().is_wildcard());
    assert_eq!(wildcard.decode(None), Err(ResolveError::Unauthenticated));

    let fixed = resolver_with(&[("AUTHZ_RESOLVER", "fixed"), ("AUTHZ_FIXED_PARTY", "P")]);
    assert_eq!(
        fixed.decode(Some(b"whatever")).unwrap(),
        ClaimSet::fixed_identity(party("P"))
    );
}

#[test]
fn policy_file_grants_and_wildcards() {
    let now = Utc::now();
    let expired_at = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let policy = serde_json::json!({
        "wildcard": [{"sha256": CredentialDigest::of(b"root-secret").to_hex()}],
        "grants": [
            {
                "credential": {"token": "alice-secret"},
                "claims": [{"type": "read_as_party", "party": "Alice"}],
                "application_id": "ledger-app",
                "identity_provider": "idp-1"
            },
            {
                "credential": {"token": "old-secret"},
                "claims": [{"type": "public"}],
                "expiration": "2020-01-01T00:00:00Z"
            },
            {
                "credential": {"token": "empty-secret"}
            }
        ]
    });

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", policy).unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let resolver = resolver_with(&[
        ("APP_ENV", "production"),
        ("AUTHZ_POLICY_PATH", path.as_str()),
    ]);

    assert!(resolver.decode(Some(b"root-secret")).unwrap().is_wildcard());

    let alice = resolver.decode(Some(b"alice-secret")).unwrap();
    assert!(alice.can_read_as(&party("Alice")));
    assert!(!alice.can_act_as(&party("Alice")));
    assert!(alice.valid_for_application("ledger-app"));
    assert_eq!(alice.identity_provider(), Some("idp-1"));

    assert_eq!(
        resolver.decode_at(Some(b"old-secret"), now),
        Err(ResolveError::ExpiredCredential { expired_at })
    );

    let empty = resolver.decode(Some(b"empty-secret")).unwrap();
    assert!(empty.is_empty());
    assert!(!empty.is_wildcard());
}

#[test]
fn missing_policy_file_fails_resolver_construction() {
    let config = Config::from_lookup(|k| match k {
        "AUTHZ_POLICY_PATH" => Some("/nonexistent/authz/policy.json".to_string()),
        _ => None,
    })
    .unwrap();
    assert!(build_resolver(&config).is_err());
}

#[test]
fn duplicate_between_env_and_file_fails() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"wildcard": [{{"token": "wildcard-token"}}]}}"#).unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let config = Config::from_lookup(|k| match k {
        "AUTHZ_POLICY_PATH" => Some(path.clone()),
        _ => None,
    })
    .unwrap();
    assert!(build_resolver(&config).is_err());
}

#[test]
fn unsigned_payload_credentials() {
    let resolver = resolver_with(&[("AUTHZ_EXPIRY_LEEWAY_SECONDS", "0")]);
    let now = Utc::now();

    let credential = UnsignedPayload {
        admin: true,
        act_as: vec![party("Bob")],
        exp: Some((now + Duration::hours(1)).timestamp()),
        ..Default::default()
    }
    .encode()
    .unwrap();
    let set = resolver.decode_at(Some(credential.as_bytes()), now).unwrap();
    assert!(set.is_admin());
    assert!(set.can_act_as(&party("Bob")));
    assert!(!set.can_act_as(&party("Alice")));

    let expired = UnsignedPayload {
        public: true,
        exp: Some((now - Duration::minutes(1)).timestamp()),
        ..Default::default()
    }
    .encode()
    .unwrap();
    let err = resolver.decode_at(Some(expired.as_bytes()), now).unwrap_err();
    assert_eq!(err.code(), "EXPIRED_CREDENTIAL");
}

#[test]
fn resolver_is_shareable_across_threads() {
    let resolver = resolver_with(&[]);
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let resolver = resolver.clone();
            std::thread::spawn(move || {
                let cred = format!("party{}-token", i);
                resolver.decode(Some(cred.as_bytes())).unwrap()
            })
        })
        .collect();
    for (i, h) in handles.into_iter().enumerate() {
        let set = h.join().unwrap();
        assert!(set.can_act_as(&party(&format!("party{}", i))));
    }
}

#[test]
fn oversized_leeway_is_rejected_before_decoding() {
    let config = Config::from_lookup(|k| match k {
        "AUTHZ_EXPIRY_LEEWAY_SECONDS" => Some("9000000000000".to_string()),
        _ => None,
    });
    assert!(config.is_err());

    // fields are public, so the factory re-checks
    let mut config = Config::from_lookup(|_| None).unwrap();
    config.expiry_leeway_seconds = 9_000_000_000_000;
    assert!(build_resolver(&config).is_err());
}

#[test]
fn zero_leeway_expiry_boundary_through_policy_file() {
    let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
    let policy = serde_json::json!({
        "grants": [
            {
                "credential": {"token": "ends-now"},
                "claims": [{"type": "public"}],
                "expiration": "2030-01-01T00:00:00Z"
            },
            {
                "credential": {"token": "ends-next-second"},
                "claims": [{"type": "public"}],
                "expiration": "2030-01-01T00:00:01Z"
            }
        ]
    });
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", policy).unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let resolver = resolver_with(&[
        ("AUTHZ_POLICY_PATH", path.as_str()),
        ("AUTHZ_EXPIRY_LEEWAY_SECONDS", "0"),
    ]);

    assert_eq!(
        resolver.decode_at(Some(b"ends-now"), now),
        Err(ResolveError::ExpiredCredential { expired_at: now })
    );
    let set = resolver.decode_at(Some(b"ends-next-second"), now).unwrap();
    assert!(set.is_public());
}

#[test]
fn zero_leeway_expiry_boundary_for_payloads() {
    let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
    let resolver = resolver_with(&[("AUTHZ_EXPIRY_LEEWAY_SECONDS", "0")]);

    let at_now = UnsignedPayload {
        public: true,
        exp: Some(now.timestamp()),
        ..Default::default()
    }
    .encode()
    .unwrap();
    assert_eq!(
        resolver.decode_at(Some(at_now.as_bytes()), now),
        Err(ResolveError::ExpiredCredential { expired_at: now })
    );

    let next_second = UnsignedPayload {
        public: true,
        exp: Some(now.timestamp() + 1),
        ..Default::default()
    }
    .encode()
    .unwrap();
    assert!(resolver.decode_at(Some(next_second.as_bytes()), now).is_ok());
}

#[test]
fn maximum_leeway_still_expires_old_grants() {
    let now = Utc::now();
    let resolver = resolver_with(&[("AUTHZ_EXPIRY_LEEWAY_SECONDS", "86400")]);

    let two_days_old = UnsignedPayload {
        public: true,
        exp: Some((now - Duration::days(2)).timestamp()),
        ..Default::default()
    }
    .encode()
    .unwrap();
    assert_eq!(
        resolver
            .decode_at(Some(two_days_old.as_bytes()), now)
            .unwrap_err()
            .code(),
        "EXPIRED_CREDENTIAL"
    );
}
