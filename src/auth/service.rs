//! Bearer-token authorization against an identity provider's published key
//! set.
//!
//! The verifier is an owned service object: the JWKS cache lives inside it and
//! is refreshed by a background task it spawns, not by module-level state.
//! Signature cryptography is the identity provider's concern; this service
//! validates token structure, key id, standard claims and scopes.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Leeway on `exp` so clock skew does not reject freshly issued tokens.
const EXP_SKEW_SECS: u64 = 30;
const KEY_REFRESH_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AuthError {
    #[error("malformed bearer token")]
    InvalidToken,
    #[error("token expired")]
    Expired,
    #[error("token signed with an unknown key")]
    UnknownKey,
    #[error("wrong issuer or audience")]
    BadClaims,
    #[error("missing required scope `{0}`")]
    MissingScope(String),
}

impl AuthError {
    /// A recognized caller lacking a scope is forbidden; everything else is
    /// unauthorized.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, AuthError::MissingScope(_))
    }
}

/// Permission check collaborator: caller credentials against a required scope.
#[async_trait::async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(&self, token: &str, scope: &str) -> Result<(), AuthError>;
}

#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kid: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Header {
    kid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Claims {
    exp: u64,
    iss: String,
    aud: Audience,
    #[serde(default)]
    permissions: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Audience {
    fn contains(&self, audience: &str) -> bool {
        match self {
            Audience::One(aud) => aud == audience,
            Audience::Many(auds) => auds.iter().any(|aud| aud == audience),
        }
    }
}

/// Authorizer backed by an Auth0-style tenant: keys come from
/// `https://{domain}/.well-known/jwks.json`, scopes from the `permissions`
/// claim.
pub struct Auth0Verifier {
    issuer: String,
    audience: String,
    jwks_url: String,
    client: reqwest::Client,
    keys: RwLock<JwkSet>,
}

impl Auth0Verifier {
    /// Fetches the initial key set; startup fails closed if the key endpoint
    /// is unreachable.
    pub async fn new(domain: &str, audience: &str) -> anyhow::Result<Arc<Self>> {
        let issuer = format!("https://{domain}/");
        let jwks_url = format!("{issuer}.well-known/jwks.json");
        let client = reqwest::Client::new();
        let keys = fetch_keys(&client, &jwks_url).await?;
        log::info!("loaded {} signing keys from {}", keys.keys.len(), jwks_url);

        Ok(Arc::new(Self {
            issuer,
            audience: audience.to_string(),
            jwks_url,
            client,
            keys: RwLock::new(keys),
        }))
    }

    /// Spawn the background key refresh. Refresh failures log a warning and
    /// the stale set keeps serving.
    pub fn spawn_refresh(self: &Arc<Self>) {
        let verifier = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval(Duration::from_secs(KEY_REFRESH_INTERVAL_SECS));
            // the first tick fires immediately and the keys were just fetched
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match fetch_keys(&verifier.client, &verifier.jwks_url).await {
                    Ok(keys) => {
                        log::info!("refreshed {} signing keys", keys.keys.len());
                        *verifier.keys.write() = keys;
                    }
                    Err(e) => log::warn!("JWKS refresh failed, serving stale keys: {e:#}"),
                }
            }
        });
    }

    fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, AuthError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(segment)
            .map_err(|_| AuthError::InvalidToken)?;
        serde_json::from_slice(&bytes).map_err(|_| AuthError::InvalidToken)
    }
}

async fn fetch_keys(client: &reqwest::Client, url: &str) -> anyhow::Result<JwkSet> {
    let set: JwkSet = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    anyhow::ensure!(!set.keys.is_empty(), "JWKS endpoint returned no keys");
    Ok(set)
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[async_trait::async_trait]
impl Authorizer for Auth0Verifier {
    async fn authorize(&self, token: &str, scope: &str) -> Result<(), AuthError> {
        let mut segments = token.split('.');
        let (Some(header), Some(payload), Some(_signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(AuthError::InvalidToken);
        };

        let header: Header = Self::decode_segment(header)?;
        let kid = header.kid.ok_or(AuthError::InvalidToken)?;
        if !self.keys.read().keys.iter().any(|key| key.kid == kid) {
            return Err(AuthError::UnknownKey);
        }

        let claims: Claims = Self::decode_segment(payload)?;
        // `exp` is attacker-supplied; saturate so a huge value cannot overflow
        if claims.exp.saturating_add(EXP_SKEW_SECS) <= now_secs() {
            return Err(AuthError::Expired);
        }
        if claims.iss != self.issuer || !claims.aud.contains(&self.audience) {
            return Err(AuthError::BadClaims);
        }
        if !claims.permissions.iter().any(|p| p == scope) {
            return Err(AuthError::MissingScope(scope.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn segment(value: &serde_json::Value) -> String {
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(value).unwrap())
    }

    fn verifier_with_key(kid: &str) -> Auth0Verifier {
        Auth0Verifier {
            issuer: "https://tenant.example/".to_string(),
            audience: "casting".to_string(),
            jwks_url: "https://tenant.example/.well-known/jwks.json".to_string(),
            client: reqwest::Client::new(),
            keys: RwLock::new(JwkSet {
                keys: vec![Jwk {
                    kid: kid.to_string(),
                }],
            }),
        }
    }

    fn token(kid: &str, claims: serde_json::Value) -> String {
        format!("{}.{}.signature", segment(&json!({ "kid": kid })), segment(&claims))
    }

    #[tokio::test]
    async fn far_future_exp_does_not_overflow() {
        let verifier = verifier_with_key("k1");
        let token = token(
            "k1",
            json!({
                "exp": u64::MAX,
                "iss": "https://tenant.example/",
                "aud": "casting",
                "permissions": ["read:actors"],
            }),
        );
        assert_eq!(verifier.authorize(&token, "read:actors").await, Ok(()));
        assert_eq!(
            verifier.authorize(&token, "delete:actors").await,
            Err(AuthError::MissingScope("delete:actors".to_string()))
        );
    }

    #[tokio::test]
    async fn expired_and_mismatched_claims_are_rejected() {
        let verifier = verifier_with_key("k1");

        let stale = token(
            "k1",
            json!({
                "exp": 1,
                "iss": "https://tenant.example/",
                "aud": "casting",
                "permissions": ["read:actors"],
            }),
        );
        assert_eq!(
            verifier.authorize(&stale, "read:actors").await,
            Err(AuthError::Expired)
        );

        let wrong_audience = token(
            "k1",
            json!({
                "exp": u64::MAX,
                "iss": "https://tenant.example/",
                "aud": "other",
                "permissions": ["read:actors"],
            }),
        );
        assert_eq!(
            verifier.authorize(&wrong_audience, "read:actors").await,
            Err(AuthError::BadClaims)
        );

        let unknown_key = token(
            "other-key",
            json!({
                "exp": u64::MAX,
                "iss": "https://tenant.example/",
                "aud": "casting",
                "permissions": ["read:actors"],
            }),
        );
        assert_eq!(
            verifier.authorize(&unknown_key, "read:actors").await,
            Err(AuthError::UnknownKey)
        );
    }

    #[test]
    fn audience_matches_string_or_array() {
        let one: Audience = serde_json::from_value(json!("casting")).unwrap();
        assert!(one.contains("casting"));
        assert!(!one.contains("other"));

        let many: Audience = serde_json::from_value(json!(["a", "casting"])).unwrap();
        assert!(many.contains("casting"));
        assert!(!many.contains("b"));
    }

    #[test]
    fn decode_segment_rejects_garbage() {
        let err = Auth0Verifier::decode_segment::<Header>("not base64!!").unwrap_err();
        assert_eq!(err, AuthError::InvalidToken);

        let not_json = URL_SAFE_NO_PAD.encode(b"plain text");
        let err = Auth0Verifier::decode_segment::<Header>(&not_json).unwrap_err();
        assert_eq!(err, AuthError::InvalidToken);
    }

    #[test]
    fn missing_scope_is_forbidden_everything_else_is_not() {
        assert!(AuthError::MissingScope("read:actors".to_string()).is_forbidden());
        assert!(!AuthError::InvalidToken.is_forbidden());
        assert!(!AuthError::Expired.is_forbidden());
    }
}
