//! Session token construction for the VoxKit API.
//!
//! VoxKit authenticates every RPC with a short-lived HS256 JWT passed as a
//! `Bearer` credential plus the public API key in `x-api-key`. The token is
//! built by hand rather than through a JWT library: the service verifies the
//! exact byte encoding (compact JSON separators, padded base64url, padding
//! repair on the secret), so the signing routine is kept explicit and test
//! covered.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;

use crate::errors::{ClientError, ClientResult};

type HmacSha256 = Hmac<Sha256>;

/// Token lifetime. `exp` is always issuance time plus exactly this value.
const TOKEN_TTL_SECS: i64 = 600;

const ISSUER: &str = "voxkit-client";
const SUBJECT: &str = "voxkit-client";

#[derive(Serialize)]
struct Header<'a> {
    alg: &'static str,
    typ: &'static str,
    kid: &'a str,
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'static str,
    sub: &'static str,
    aud: &'a str,
    exp: i64,
}

/// A signed, time-bounded session credential for one VoxKit service.
///
/// Owned by the client instance that created it. Refreshing regenerates
/// header, payload and signature together; there is no internal locking, so
/// a client shared across concurrent calls must serialize refreshes
/// externally. Consult [`SessionToken::is_fresh`] immediately before each
/// call.
pub struct SessionToken {
    api_key: String,
    secret_key: String,
    audience: String,
    jwt: String,
    expires_at: i64,
}

impl SessionToken {
    /// Build a token for the given key pair and audience.
    ///
    /// Fails with [`ClientError::InvalidCredential`] if the secret key is
    /// not base64url even after padding repair.
    pub fn new(
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
        audience: impl Into<String>,
    ) -> ClientResult<Self> {
        let api_key = api_key.into();
        let secret_key = secret_key.into();
        let audience = audience.into();

        let (jwt, expires_at) = build_jwt(&api_key, &secret_key, &audience, now_unix())?;
        Ok(Self {
            api_key,
            secret_key,
            audience,
            jwt,
            expires_at,
        })
    }

    /// Whether the token is still valid at call time. No skew adjustment.
    pub fn is_fresh(&self) -> bool {
        self.expires_at > now_unix()
    }

    /// Re-derive the token with the same key pair and audience, advancing
    /// the expiry to now plus the token lifetime.
    pub fn refresh(&mut self) -> ClientResult<()> {
        let (jwt, expires_at) =
            build_jwt(&self.api_key, &self.secret_key, &self.audience, now_unix())?;
        self.jwt = jwt;
        self.expires_at = expires_at;
        Ok(())
    }

    /// Transport metadata pairs reflecting the current token state.
    pub fn credential_headers(&self) -> [(&'static str, String); 2] {
        [
            ("authorization", format!("Bearer {}", self.jwt)),
            ("x-api-key", self.api_key.clone()),
        ]
    }

    /// The serialized JWT.
    pub fn jwt(&self) -> &str {
        &self.jwt
    }

    /// Unix expiry timestamp.
    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    /// Audience this token was minted for.
    pub fn audience(&self) -> &str {
        &self.audience
    }
}

fn now_unix() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

/// Construct the serialized JWT and its expiry for the given issuance time.
fn build_jwt(api_key: &str, secret_key: &str, audience: &str, now: i64) -> ClientResult<(String, i64)> {
    let expires_at = now + TOKEN_TTL_SECS;

    let header = Header {
        alg: "HS256",
        typ: "JWT",
        kid: api_key,
    };
    let claims = Claims {
        iss: ISSUER,
        sub: SUBJECT,
        aud: audience,
        exp: expires_at,
    };

    // serde_json emits compact separators; the service verifies these bytes.
    let header_json = serde_json::to_vec(&header)
        .map_err(|e| ClientError::InvalidCredential(format!("header serialization: {e}")))?;
    let claims_json = serde_json::to_vec(&claims)
        .map_err(|e| ClientError::InvalidCredential(format!("claims serialization: {e}")))?;

    let mut data = URL_SAFE.encode(header_json);
    data.push('.');
    data.push_str(&URL_SAFE.encode(claims_json));

    let key = decode_secret(secret_key)?;
    let mut mac = HmacSha256::new_from_slice(&key)
        .map_err(|e| ClientError::InvalidCredential(format!("HMAC key: {e}")))?;
    mac.update(data.as_bytes());
    let signature = URL_SAFE.encode(mac.finalize().into_bytes());

    data.push('.');
    data.push_str(&signature);

    Ok((data, expires_at))
}

/// Base64url-decode the secret key, restoring padding first.
fn decode_secret(secret_key: &str) -> ClientResult<Vec<u8>> {
    let padded = repair_padding(secret_key);
    URL_SAFE
        .decode(padded.as_bytes())
        .map_err(|e| ClientError::InvalidCredential(format!("secret key is not base64url: {e}")))
}

/// Append `'='` until the length is a multiple of four. Already-aligned
/// input is returned unchanged.
fn repair_padding(value: &str) -> std::borrow::Cow<'_, str> {
    match value.len() % 4 {
        0 => std::borrow::Cow::Borrowed(value),
        rem => {
            let mut padded = String::with_capacity(value.len() + (4 - rem));
            padded.push_str(value);
            for _ in 0..(4 - rem) {
                padded.push('=');
            }
            std::borrow::Cow::Owned(padded)
        }
    }
}
