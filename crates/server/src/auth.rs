use std::{fmt, sync::Arc};

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use shared::api::{error::ServerError, response_errors::AuthError};
use tracing::debug;

/// Who the identity provider says is calling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
}

/// Boundary to whatever issues bearer credentials
pub trait IdentityVerifier: Send + Sync + fmt::Debug {
    fn verify(&self, credential: &str) -> Result<Identity, AuthError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// HS256 JWT verification with a shared secret
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &[u8], issuer: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
            // A configured issuer is only enforced when the claim is required
            validation.set_required_spec_claims(&["exp", "iss"]);
        }
        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("iss", &self.validation.iss)
            .finish_non_exhaustive()
    }
}

impl IdentityVerifier for JwtVerifier {
    fn verify(&self, credential: &str) -> Result<Identity, AuthError> {
        let data = decode::<Claims>(credential, &self.key, &self.validation).map_err(|e| {
            debug!("Rejected bearer token: {e}");
            AuthError::InvalidCredential
        })?;

        if data.claims.sub.is_empty() {
            Err(AuthError::InvalidCredential)?;
        }

        Ok(Identity {
            uid: data.claims.sub,
            email: data.claims.email,
        })
    }
}

/// The authenticated caller. Rejects the request when the bearer token is missing or invalid.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<dyn IdentityVerifier>: FromRef<S>,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::MissingCredential)?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingCredential)?;

        let verifier = <Arc<dyn IdentityVerifier>>::from_ref(state);
        let Identity { uid, email } = verifier.verify(token)?;

        Ok(AuthUser { uid, email })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use jsonwebtoken::{encode, EncodingKey, Header};

    use super::*;

    pub(crate) const SECRET: &[u8] = b"test-secret";

    pub(crate) fn token_for(uid: &str) -> String {
        token_from(uid, None)
    }

    fn token_from(uid: &str, iss: Option<&str>) -> String {
        let claims = Claims {
            sub: uid.to_string(),
            email: Some(format!("{uid}@example.com")),
            exp: chrono::Utc::now().timestamp() as u64 + 3600,
            iss: iss.map(str::to_string),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)).unwrap()
    }

    #[test]
    fn accepts_signed_token() {
        let verifier = JwtVerifier::new(SECRET, None);
        let identity = verifier.verify(&token_for("alice")).unwrap();
        assert_eq!(identity.uid, "alice");
        assert_eq!(identity.email.as_deref(), Some("alice@example.com"));
    }

    #[test]
    fn rejects_wrong_secret_and_issuer() {
        let token = token_for("alice");
        assert_eq!(
            JwtVerifier::new(b"other", None).verify(&token),
            Err(AuthError::InvalidCredential)
        );
        assert_eq!(
            JwtVerifier::new(SECRET, Some("https://issuer.example")).verify(&token),
            Err(AuthError::InvalidCredential)
        );
    }

    #[test]
    fn configured_issuer_must_be_present_and_match() {
        const ISSUER: &str = "https://issuer.example";
        let verifier = JwtVerifier::new(SECRET, Some(ISSUER));

        let identity = verifier.verify(&token_from("alice", Some(ISSUER))).unwrap();
        assert_eq!(identity.uid, "alice");

        assert_eq!(
            verifier.verify(&token_from("alice", None)),
            Err(AuthError::InvalidCredential)
        );
        assert_eq!(
            verifier.verify(&token_from("alice", Some("https://elsewhere.example"))),
            Err(AuthError::InvalidCredential)
        );
    }

    #[test]
    fn rejects_expired_token() {
        let claims = Claims {
            sub: "alice".into(),
            email: None,
            exp: 1_000,
            iss: None,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)).unwrap();
        assert!(JwtVerifier::new(SECRET, None).verify(&token).is_err());
    }
}
