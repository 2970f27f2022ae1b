use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

pub const MIN_SECRET_LEN: usize = 32;
pub const IDENTITY_TOKEN_TTL_SECONDS: i64 = 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token secret must be at least {MIN_SECRET_LEN} characters long")]
    SecretTooShort,
    #[error("system clock is before unix epoch")]
    ClockBeforeEpoch,
    #[error("failed to encode token")]
    Encode(#[source] jsonwebtoken::errors::Error),
    #[error("failed to decode token")]
    Decode(#[source] jsonwebtoken::errors::Error),
    #[error("token subject is empty")]
    EmptySubject,
}

/// HS256 signing and verification with zero leeway on `exp`.
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenSigner {
    pub fn new(secret: &str) -> Result<Self, TokenError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(TokenError::SecretTooShort);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    pub fn sign<C: Serialize>(&self, claims: &C) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(TokenError::Encode)
    }

    pub fn verify<C: DeserializeOwned>(&self, token: &str) -> Result<C, TokenError> {
        decode::<C>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::Decode)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IdentityClaims {
    sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    iat: i64,
    exp: i64,
}

/// The authenticated caller behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: String,
    pub display_name: Option<String>,
}

/// Issues and validates caller identity tokens.
#[derive(Clone)]
pub struct IdentityTokenService {
    signer: TokenSigner,
}

impl IdentityTokenService {
    pub fn new(secret: &str) -> Result<Self, TokenError> {
        Ok(Self { signer: TokenSigner::new(secret)? })
    }

    pub fn issue_identity_token(
        &self,
        user_id: &str,
        display_name: Option<&str>,
    ) -> Result<String, TokenError> {
        self.issue_identity_token_with_ttl(user_id, display_name, IDENTITY_TOKEN_TTL_SECONDS)
    }

    pub fn issue_identity_token_with_ttl(
        &self,
        user_id: &str,
        display_name: Option<&str>,
        ttl_seconds: i64,
    ) -> Result<String, TokenError> {
        self.issue_identity_token_at(user_id, display_name, current_unix_timestamp()?, ttl_seconds)
    }

    fn issue_identity_token_at(
        &self,
        user_id: &str,
        display_name: Option<&str>,
        issued_at: i64,
        ttl_seconds: i64,
    ) -> Result<String, TokenError> {
        let claims = IdentityClaims {
            sub: user_id.to_owned(),
            name: display_name.map(ToOwned::to_owned),
            iat: issued_at,
            exp: issued_at + ttl_seconds,
        };
        self.signer.sign(&claims)
    }

    pub fn validate_identity_token(&self, token: &str) -> Result<CallerIdentity, TokenError> {
        let claims: IdentityClaims = self.signer.verify(token)?;
        if claims.sub.trim().is_empty() {
            return Err(TokenError::EmptySubject);
        }

        Ok(CallerIdentity {
            user_id: claims.sub,
            display_name: claims.name.filter(|name| !name.trim().is_empty()),
        })
    }
}

pub(crate) fn current_unix_timestamp() -> Result<i64, TokenError> {
    let duration =
        SystemTime::now().duration_since(UNIX_EPOCH).map_err(|_| TokenError::ClockBeforeEpoch)?;

    Ok(i64::try_from(duration.as_secs()).unwrap_or(i64::MAX))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const TEST_SECRET: &str = "folio_test_secret_that_is_definitely_long_enough";

    #[test]
    fn rejects_short_secrets() {
        assert!(matches!(IdentityTokenService::new("too-short"), Err(TokenError::SecretTooShort)));
    }

    #[test]
    fn issues_and_validates_identity_tokens() {
        let service = IdentityTokenService::new(TEST_SECRET).expect("service should initialize");
        let token =
            service.issue_identity_token("user-42", Some("Ada")).expect("token should be issued");
        let identity = service.validate_identity_token(&token).expect("token should validate");

        assert_eq!(identity.user_id, "user-42");
        assert_eq!(identity.display_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn display_name_is_optional() {
        let service = IdentityTokenService::new(TEST_SECRET).expect("service should initialize");
        let token = service.issue_identity_token("user-42", None).expect("token should be issued");
        let identity = service.validate_identity_token(&token).expect("token should validate");
        assert_eq!(identity.display_name, None);
    }

    #[test]
    fn rejects_tampered_tokens() {
        let service = IdentityTokenService::new(TEST_SECRET).expect("service should initialize");
        let token = service.issue_identity_token("user-42", None).expect("token should be issued");
        let tampered = format!("{token}x");

        assert!(service.validate_identity_token(&tampered).is_err());
    }

    #[test]
    fn rejects_tokens_signed_with_another_secret() {
        let service = IdentityTokenService::new(TEST_SECRET).expect("service should initialize");
        let other = IdentityTokenService::new("another_secret_that_is_also_long_enough_ok")
            .expect("service should initialize");
        let token = other.issue_identity_token("user-42", None).expect("token should be issued");

        assert!(service.validate_identity_token(&token).is_err());
    }

    #[test]
    fn rejects_expired_tokens() {
        let service = IdentityTokenService::new(TEST_SECRET).expect("service should initialize");
        let issued_at = current_unix_timestamp().expect("current timestamp should resolve")
            - IDENTITY_TOKEN_TTL_SECONDS
            - 1;
        let token = service
            .issue_identity_token_at("user-42", None, issued_at, IDENTITY_TOKEN_TTL_SECONDS)
            .expect("token should be issued");

        assert!(service.validate_identity_token(&token).is_err());
    }

    #[test]
    fn rejects_blank_subject() {
        let service = IdentityTokenService::new(TEST_SECRET).expect("service should initialize");
        let token = service.issue_identity_token("  ", None).expect("token should be issued");
        assert!(matches!(
            service.validate_identity_token(&token),
            Err(TokenError::EmptySubject)
        ));
    }
}
