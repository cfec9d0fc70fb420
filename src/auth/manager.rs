//! Session lifecycle management
//!
//! One [`SessionManager`] owns the authentication state for one vendor
//! account. A session moves through `Unauthenticated -> Authenticating ->
//! Authenticated -> Expired`, with `Expired` looping back to
//! `Authenticating`; the transitions all live inside
//! [`ensure_valid`](SessionManager::ensure_valid).
//!
//! The expiry of a freshly issued token is read from the `exp` claim of its
//! JWT payload segment *without* verifying the signature. That is a
//! deliberate trust boundary, not a security check: the token originated
//! from the login call the manager just made, so its payload is trusted as
//! a bearer credential, never used as a verified identity assertion.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};

use crate::auth::credential::CredentialEncoder;
use crate::auth::store::SessionStore;
use crate::error::{Result, ShinebridgeError};
use crate::vendor::VendorApi;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// An authenticated credential: the vendor-prefixed bearer token plus its
/// absolute expiry.
///
/// A session is never destroyed explicitly; it is superseded by a newer one
/// on re-authentication.
#[derive(Debug, Clone)]
pub struct Session {
    token: String,
    expires_at: DateTime<Utc>,
}

impl Session {
    /// Create a session from a token and its absolute expiry.
    pub fn new(token: String, expires_at: DateTime<Utc>) -> Self {
        Self { token, expires_at }
    }

    /// The bearer token, already vendor-prefixed. Attached verbatim as the
    /// Authorization header value of subsequent calls.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Absolute expiry of the token.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// A session is valid iff its token is non-empty and its expiry is
    /// strictly in the future.
    pub fn is_valid(&self) -> bool {
        !self.token.is_empty() && self.expires_at > Utc::now()
    }
}

// ---------------------------------------------------------------------------
// SessionManager
// ---------------------------------------------------------------------------

/// Owns the current authentication state for one account and decides when
/// re-authentication is required.
pub struct SessionManager {
    account_id: String,
    password: String,
    encoder: CredentialEncoder,
    store: SessionStore,
    current: Option<Session>,
}

impl SessionManager {
    /// Create a manager with no session; the first
    /// [`ensure_valid`](Self::ensure_valid) call resolves one.
    pub fn new(
        account_id: String,
        password: String,
        encoder: CredentialEncoder,
        store: SessionStore,
    ) -> Self {
        Self {
            account_id,
            password,
            encoder,
            store,
            current: None,
        }
    }

    /// The account this manager authenticates.
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// The current in-memory session, if any (valid or not).
    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// Return a valid session, authenticating only when necessary.
    ///
    /// The resolution order is:
    ///
    /// 1. The in-memory session, when still valid. This path is pure memory
    ///    inspection and is invoked every poll cycle, so it must stay cheap.
    /// 2. The persisted session from the [`SessionStore`], when valid.
    /// 3. A full login: encode the password, submit it, decode the expiry
    ///    claim from the returned token, persist, and adopt.
    ///
    /// A persistence failure after a successful login is logged but not
    /// propagated; the fresh session stays usable for the remainder of the
    /// process even if it cannot be reused after a restart.
    ///
    /// # Errors
    ///
    /// Returns [`ShinebridgeError::Encoding`] when the credential cannot be
    /// encoded and [`ShinebridgeError::Authentication`] when the login call
    /// fails or the returned token's expiry claim cannot be decoded.
    pub async fn ensure_valid<C: VendorApi + ?Sized>(&mut self, api: &C) -> Result<Session> {
        if let Some(session) = &self.current {
            if session.is_valid() {
                return Ok(session.clone());
            }
        }

        if let Some(session) = self.store.load(&self.account_id) {
            if session.is_valid() {
                tracing::info!("Adopted persisted session for {}", self.account_id);
                self.current = Some(session.clone());
                return Ok(session);
            }
        }

        tracing::info!("Authenticating account {}", self.account_id);
        let encoded_secret = self.encoder.encode(&self.password)?;
        let token = api.login(&self.account_id, &encoded_secret).await?;
        let expires_at = decode_bearer_expiry(&token)?;
        let session = Session::new(token, expires_at);

        if let Err(e) = self.store.save(&self.account_id, &session) {
            tracing::warn!("Failed to persist session for {}: {}", self.account_id, e);
        }

        tracing::info!(
            "Authenticated {} (token expires {})",
            self.account_id,
            session.expires_at()
        );
        self.current = Some(session.clone());
        Ok(session)
    }
}

// ---------------------------------------------------------------------------
// Token expiry decoding
// ---------------------------------------------------------------------------

/// Decode the `exp` claim (Unix seconds) from a vendor bearer token.
///
/// The vendor prefixes the JWT with `Bearer_`; the prefix is stripped
/// before splitting the token into its segments. The signature is not
/// verified (see the module docs).
pub fn decode_bearer_expiry(token: &str) -> Result<DateTime<Utc>> {
    let jwt = token.strip_prefix("Bearer_").unwrap_or(token);
    let payload_b64 = jwt.split('.').nth(1).ok_or_else(|| {
        ShinebridgeError::Authentication("token is not in JWT form".to_string())
    })?;
    let payload = URL_SAFE_NO_PAD.decode(payload_b64).map_err(|e| {
        ShinebridgeError::Authentication(format!("token payload is not base64: {e}"))
    })?;
    let claims: serde_json::Value = serde_json::from_slice(&payload).map_err(|e| {
        ShinebridgeError::Authentication(format!("token payload is not JSON: {e}"))
    })?;
    let exp = claims
        .get("exp")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| {
            ShinebridgeError::Authentication("token payload has no numeric exp claim".to_string())
        })?;
    DateTime::<Utc>::from_timestamp(exp, 0).ok_or_else(|| {
        ShinebridgeError::Authentication(format!("exp claim {exp} is out of range")).into()
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
