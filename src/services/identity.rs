// SPDX-License-Identifier: MIT

//! Hosted identity provider session-token verification.
//!
//! The application never handles credentials itself; the provider's
//! frontend SDK establishes a session and hands the browser an RS256
//! session token. The only capability this service needs is "who is
//! calling", resolved by verifying that token against the provider's
//! published JWKS.

use crate::config::Config;
use anyhow::Context;
use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::header::CACHE_CONTROL;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);
const CLOCK_SKEW_SECS: u64 = 60;

/// Verified subject extracted from a valid session token.
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    /// The provider's stable subject id for this end user
    pub external_id: String,
    /// The user's primary email as reported by the provider
    pub email: String,
}

/// The outcome of resolving a caller's identity.
#[derive(Debug, Clone)]
pub enum Caller {
    Authenticated(CallerIdentity),
    Anonymous,
}

/// Capability interface over the hosted identity provider.
///
/// Abstracted so the core flow can be exercised without the real provider;
/// session handling and sign-in UI stay entirely with the provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve the caller behind a session token. Returns `Anonymous` when
    /// the token is missing, invalid, expired, or the provider cannot be
    /// reached to verify it.
    async fn current_caller(&self, session_token: Option<&str>) -> Caller;
}

/// Session verification error categories.
#[derive(Debug, Clone)]
enum VerifyError {
    /// The token is missing/invalid or claims do not match expectations.
    Rejected(String),
    /// A transient infrastructure failure occurred while fetching keys.
    Transient(String),
}

#[derive(Clone)]
struct JwksCacheEntry {
    keys_by_kid: HashMap<String, Arc<DecodingKey>>,
    expires_at: Instant,
}

/// Verifier for identity-provider-issued session tokens.
pub struct SessionVerifier {
    http_client: reqwest::Client,
    issuer: String,
    jwks_url: String,
    jwks_cache: RwLock<Option<JwksCacheEntry>>,
    refresh_lock: Mutex<()>,
}

impl SessionVerifier {
    /// Create a verifier that fetches and caches the provider's JWKS.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building identity HTTP client")?;

        let issuer = canonicalize_issuer(&config.identity_issuer);
        let jwks_url = config
            .identity_jwks_url
            .clone()
            .unwrap_or_else(|| format!("{}/.well-known/jwks.json", issuer));

        tracing::info!(
            issuer = %issuer,
            jwks_url = %jwks_url,
            "Initialized session verifier"
        );

        Ok(Self {
            http_client,
            issuer,
            jwks_url,
            jwks_cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        })
    }

    async fn verify(&self, token: &str) -> Result<CallerIdentity, VerifyError> {
        let header = decode_header(token)
            .map_err(|e| VerifyError::Rejected(format!("invalid JWT header: {e}")))?;

        if header.alg != Algorithm::RS256 {
            return Err(VerifyError::Rejected(format!(
                "unexpected JWT alg: {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| VerifyError::Rejected("missing JWT kid".to_string()))?;

        let decoding_key = self.decoding_key_for_kid(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.validate_aud = false;
        validation.leeway = CLOCK_SKEW_SECS;

        let token_data = decode::<SessionClaims>(token, decoding_key.as_ref(), &validation)
            .map_err(|e| VerifyError::Rejected(format!("JWT validation failed: {e}")))?;

        let claims = token_data.claims;

        let email = claims
            .email
            .ok_or_else(|| VerifyError::Rejected("missing email claim".to_string()))?;

        Ok(CallerIdentity {
            external_id: claims.sub,
            email,
        })
    }

    async fn decoding_key_for_kid(&self, kid: &str) -> Result<Arc<DecodingKey>, VerifyError> {
        if let Some(key) = self.lookup_cached_key(kid).await {
            return Ok(key);
        }

        // Unknown kid: one refresh from cache expiry, one forced, then give up.
        for force_refresh in [false, true] {
            self.refresh_jwks(force_refresh).await?;
            if let Some(key) = self.lookup_cached_key(kid).await {
                return Ok(key);
            }
        }

        Err(VerifyError::Rejected(format!(
            "JWT kid not found in JWKS after refresh: {kid}"
        )))
    }

    async fn lookup_cached_key(&self, kid: &str) -> Option<Arc<DecodingKey>> {
        let cache = self.jwks_cache.read().await;
        let now = Instant::now();
        cache
            .as_ref()
            .filter(|entry| entry.expires_at > now)
            .and_then(|entry| entry.keys_by_kid.get(kid))
            .cloned()
    }

    async fn refresh_jwks(&self, force_refresh: bool) -> Result<(), VerifyError> {
        let _guard = self.refresh_lock.lock().await;

        if !force_refresh {
            let cache = self.jwks_cache.read().await;
            if cache
                .as_ref()
                .is_some_and(|entry| entry.expires_at > Instant::now())
            {
                return Ok(());
            }
        }

        tracing::debug!(jwks_url = %self.jwks_url, "Refreshing JWKS cache");

        let response = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| VerifyError::Transient(format!("JWKS request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(VerifyError::Transient(format!(
                "JWKS request returned status {}",
                response.status()
            )));
        }

        let ttl = cache_ttl_from_headers(response.headers(), DEFAULT_CACHE_TTL);

        let jwks: Jwks = response
            .json()
            .await
            .map_err(|e| VerifyError::Transient(format!("invalid JWKS JSON: {e}")))?;

        let mut keys_by_kid: HashMap<String, Arc<DecodingKey>> = HashMap::new();

        for jwk in jwks.keys {
            if jwk.kty != "RSA" {
                continue;
            }

            if jwk.kid.trim().is_empty() {
                continue;
            }

            if let Some(alg) = &jwk.alg {
                if alg != "RS256" {
                    continue;
                }
            }

            if let Some(use_) = &jwk.use_ {
                if use_ != "sig" {
                    continue;
                }
            }

            match DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
                Ok(key) => {
                    keys_by_kid.insert(jwk.kid, Arc::new(key));
                }
                Err(e) => {
                    tracing::warn!(error = %e, kid = %jwk.kid, "Skipping invalid RSA JWKS key");
                }
            }
        }

        if keys_by_kid.is_empty() {
            return Err(VerifyError::Transient(
                "JWKS response did not include any usable RSA keys".to_string(),
            ));
        }

        let entry = JwksCacheEntry {
            keys_by_kid,
            expires_at: Instant::now() + ttl,
        };

        *self.jwks_cache.write().await = Some(entry);

        tracing::debug!(ttl_secs = ttl.as_secs(), "JWKS cache refreshed");
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for SessionVerifier {
    async fn current_caller(&self, session_token: Option<&str>) -> Caller {
        let Some(token) = session_token else {
            return Caller::Anonymous;
        };

        match self.verify(token).await {
            Ok(identity) => Caller::Authenticated(identity),
            Err(VerifyError::Rejected(reason)) => {
                tracing::debug!(reason = %reason, "Session token rejected");
                Caller::Anonymous
            }
            Err(VerifyError::Transient(reason)) => {
                tracing::warn!(
                    reason = %reason,
                    "Identity provider unreachable; treating caller as anonymous"
                );
                Caller::Anonymous
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct SessionClaims {
    sub: String,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    alg: Option<String>,
    n: String,
    e: String,
    #[serde(rename = "use")]
    use_: Option<String>,
}

fn cache_ttl_from_headers(headers: &reqwest::header::HeaderMap, fallback: Duration) -> Duration {
    let Some(max_age) = headers
        .get(CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_cache_control_max_age)
    else {
        return fallback;
    };

    Duration::from_secs(max_age)
}

fn parse_cache_control_max_age(value: &str) -> Option<u64> {
    for directive in value.split(',') {
        let directive = directive.trim();

        if let Some(raw) = directive.strip_prefix("max-age=") {
            let raw = raw.trim_matches('"');
            if let Ok(seconds) = raw.parse::<u64>() {
                return Some(seconds);
            }
        }
    }

    None
}

fn canonicalize_issuer(issuer: &str) -> String {
    issuer.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_cache_control_max_age_valid() {
        assert_eq!(
            parse_cache_control_max_age("public, max-age=3600"),
            Some(3600)
        );
        assert_eq!(parse_cache_control_max_age("max-age=60"), Some(60));
        assert_eq!(parse_cache_control_max_age("max-age=\"120\""), Some(120));
    }

    #[test]
    fn parse_cache_control_max_age_invalid() {
        assert_eq!(parse_cache_control_max_age("public, immutable"), None);
        assert_eq!(parse_cache_control_max_age("max-age=abc"), None);
        assert_eq!(parse_cache_control_max_age(""), None);
    }

    #[test]
    fn canonicalize_issuer_strips_trailing_slash() {
        assert_eq!(
            canonicalize_issuer("https://example.accounts.dev/"),
            "https://example.accounts.dev"
        );
        assert_eq!(
            canonicalize_issuer("https://example.accounts.dev"),
            "https://example.accounts.dev"
        );
    }

    #[tokio::test]
    async fn missing_token_is_anonymous() {
        let config = Config::test_default();
        let verifier = SessionVerifier::new(&config).unwrap();

        assert!(matches!(
            verifier.current_caller(None).await,
            Caller::Anonymous
        ));
    }

    #[tokio::test]
    async fn malformed_token_is_anonymous() {
        let config = Config::test_default();
        let verifier = SessionVerifier::new(&config).unwrap();

        assert!(matches!(
            verifier.current_caller(Some("not.a.jwt")).await,
            Caller::Anonymous
        ));
    }
}
