//! Token service - Issues and verifies signed access/refresh token pairs.
//!
//! Access and refresh tokens are signed with distinct secrets and carry an
//! explicit `type` claim. Validity is judged against an injected clock.

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::{TokenSettings, TOKEN_KIND_ACCESS, TOKEN_KIND_REFRESH, TOKEN_TYPE_BEARER};
use crate::domain::User;
use crate::errors::{AppError, AppResult};
use crate::utils::{Clock, SystemClock};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Which half of a pair a token is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Access => write!(f, "{}", TOKEN_KIND_ACCESS),
            TokenKind::Refresh => write!(f, "{}", TOKEN_KIND_REFRESH),
        }
    }
}

/// JWT claims payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Identity ID
    pub sub: String,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

/// Freshly issued access and refresh tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Token response returned after login or refresh
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// JWT refresh token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub refresh_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Access token lifetime in seconds
    #[schema(example = 3600)]
    pub expires_in: i64,
}

impl TokenResponse {
    pub fn new(pair: TokenPair, expires_in: i64) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in,
        }
    }
}

/// Token service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait TokenService: Send + Sync {
    /// Issue a new access/refresh pair for a user
    fn issue_pair(&self, user: &User) -> AppResult<TokenPair>;

    /// Verify an access token and return its claims
    fn verify_access(&self, token: &str) -> AppResult<Claims>;

    /// Exchange a refresh token for a brand-new pair with the same subject
    fn refresh_pair(&self, refresh_token: &str) -> AppResult<TokenPair>;

    /// Access token lifetime in seconds
    fn access_ttl_secs(&self) -> i64;
}

/// HMAC-signed token issuer.
pub struct TokenIssuer {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    /// Create a token issuer on the system clock.
    pub fn new(settings: &TokenSettings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    /// Create a token issuer on an explicit clock.
    pub fn with_clock(settings: &TokenSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(settings.access_secret_bytes()),
            access_decoding: DecodingKey::from_secret(settings.access_secret_bytes()),
            refresh_encoding: EncodingKey::from_secret(settings.refresh_secret_bytes()),
            refresh_decoding: DecodingKey::from_secret(settings.refresh_secret_bytes()),
            access_ttl: Duration::seconds(settings.access_ttl_secs),
            refresh_ttl: Duration::seconds(settings.refresh_ttl_secs),
            validation: hmac_validation(),
            clock,
        }
    }

    fn issue_for(&self, subject: &str) -> AppResult<TokenPair> {
        Ok(TokenPair {
            access_token: self.sign(subject, TokenKind::Access)?,
            refresh_token: self.sign(subject, TokenKind::Refresh)?,
        })
    }

    fn sign(&self, subject: &str, kind: TokenKind) -> AppResult<String> {
        let (key, ttl) = match kind {
            TokenKind::Access => (&self.access_encoding, self.access_ttl),
            TokenKind::Refresh => (&self.refresh_encoding, self.refresh_ttl),
        };

        let now = self.clock.now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::internal(format!("{} token expiry overflows", kind)))?;
        let claims = Claims {
            sub: subject.to_string(),
            kind,
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, key)
            .map_err(|e| AppError::internal(format!("Failed to sign {} token: {}", kind, e)))
    }

    /// Decode against one key, then check the time window and the kind.
    fn verify(&self, token: &str, key: &DecodingKey, expected: TokenKind) -> AppResult<Claims> {
        let claims = decode::<Claims>(token, key, &self.validation)
            .map_err(|e| {
                tracing::debug!("Token rejected: {}", e);
                AppError::InvalidToken
            })?
            .claims;

        let now = self.clock.now().timestamp();
        if now < claims.nbf || now > claims.exp {
            tracing::debug!("Token outside its validity window");
            return Err(AppError::InvalidToken);
        }

        if claims.kind != expected {
            tracing::debug!("Expected {} token, got {}", expected, claims.kind);
            return Err(AppError::InvalidTokenType);
        }

        Ok(claims)
    }
}

/// HMAC algorithms only; `exp` and `nbf` are checked against our clock.
fn hmac_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "nbf", "sub"]);
    validation
}

impl TokenService for TokenIssuer {
    fn issue_pair(&self, user: &User) -> AppResult<TokenPair> {
        self.issue_for(&user.id.to_string())
    }

    fn verify_access(&self, token: &str) -> AppResult<Claims> {
        self.verify(token, &self.access_decoding, TokenKind::Access)
    }

    fn refresh_pair(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let claims = self.verify(refresh_token, &self.refresh_decoding, TokenKind::Refresh)?;
        self.issue_for(&claims.sub)
    }

    fn access_ttl_secs(&self) -> i64 {
        self.access_ttl.num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_TOKEN_TTL_SECS;
    use crate::utils::FixedClock;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    const ACCESS: &str = "access-secret-with-at-least-32-chars!";
    const REFRESH: &str = "refresh-secret-with-at-least-32-chars";

    fn settings() -> TokenSettings {
        TokenSettings::new(ACCESS, REFRESH, 3600, 7200).unwrap()
    }

    fn fixed_issuer() -> (TokenIssuer, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        ));
        (TokenIssuer::with_clock(&settings(), clock.clone()), clock)
    }

    fn user() -> User {
        User::new(
            Uuid::new_v4(),
            "Maria Silva".to_string(),
            "maria@example.com".to_string(),
            "15245901854".to_string(),
            30,
            "hash".to_string(),
        )
    }

    /// Replace the header segment of a token, keeping payload and signature.
    fn with_header(token: &str, header_b64: &str) -> String {
        let mut parts = token.splitn(2, '.');
        parts.next();
        format!("{}.{}", header_b64, parts.next().unwrap())
    }

    #[test]
    fn test_issue_then_verify_access() {
        let issuer = TokenIssuer::new(&settings());
        let user = user();

        let pair = issuer.issue_pair(&user).unwrap();
        let claims = issuer.verify_access(&pair.access_token).unwrap();

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.kind, TokenKind::Access);
        assert_ne!(pair.access_token, pair.refresh_token);
    }

    #[test]
    fn test_claims_carry_window() {
        let (issuer, clock) = fixed_issuer();
        let pair = issuer.issue_pair(&user()).unwrap();
        let claims = issuer.verify_access(&pair.access_token).unwrap();

        let now = clock.now().timestamp();
        assert_eq!(claims.iat, now);
        assert_eq!(claims.nbf, now);
        assert_eq!(claims.exp, now + 3600);
        assert_eq!(issuer.access_ttl_secs(), 3600);
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let issuer = TokenIssuer::new(&settings());
        let pair = issuer.issue_pair(&user()).unwrap();

        let err = issuer.verify_access(&pair.refresh_token).unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[test]
    fn test_access_token_rejected_for_refresh() {
        let issuer = TokenIssuer::new(&settings());
        let pair = issuer.issue_pair(&user()).unwrap();

        let err = issuer.refresh_pair(&pair.access_token).unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[test]
    fn test_kind_checked_even_with_matching_signature() {
        let issuer = TokenIssuer::new(&settings());
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "someone".to_string(),
            kind: TokenKind::Refresh,
            iat: now,
            nbf: now,
            exp: now + 60,
        };
        let forged = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(ACCESS.as_bytes()),
        )
        .unwrap();

        let err = issuer.verify_access(&forged).unwrap_err();
        assert!(matches!(err, AppError::InvalidTokenType));
    }

    #[test]
    fn test_refresh_issues_new_pair_for_same_subject() {
        let (issuer, clock) = fixed_issuer();
        let user = user();
        let first = issuer.issue_pair(&user).unwrap();

        clock.advance(Duration::seconds(5));
        let second = issuer.refresh_pair(&first.refresh_token).unwrap();

        assert_ne!(first.access_token, second.access_token);
        let claims = issuer.verify_access(&second.access_token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
    }

    #[test]
    fn test_expired_access_token_rejected() {
        let (issuer, clock) = fixed_issuer();
        let pair = issuer.issue_pair(&user()).unwrap();

        clock.advance(Duration::seconds(3600));
        assert!(issuer.verify_access(&pair.access_token).is_ok());

        clock.advance(Duration::seconds(1));
        let err = issuer.verify_access(&pair.access_token).unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[test]
    fn test_expired_refresh_token_rejected() {
        let (issuer, clock) = fixed_issuer();
        let pair = issuer.issue_pair(&user()).unwrap();

        clock.advance(Duration::seconds(7201));
        let err = issuer.refresh_pair(&pair.refresh_token).unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[test]
    fn test_not_yet_valid_token_rejected() {
        let (issuer, clock) = fixed_issuer();
        let pair = issuer.issue_pair(&user()).unwrap();

        clock.advance(Duration::seconds(-1));
        let err = issuer.verify_access(&pair.access_token).unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[test]
    fn test_non_hmac_algorithms_rejected() {
        let issuer = TokenIssuer::new(&settings());
        let pair = issuer.issue_pair(&user()).unwrap();

        // {"alg":"RS256","typ":"JWT"}
        let rs256 = with_header(&pair.access_token, "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9");
        assert!(matches!(
            issuer.verify_access(&rs256).unwrap_err(),
            AppError::InvalidToken
        ));

        // {"alg":"none","typ":"JWT"}
        let none = with_header(&pair.access_token, "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0");
        assert!(matches!(
            issuer.verify_access(&none).unwrap_err(),
            AppError::InvalidToken
        ));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let issuer = TokenIssuer::new(&settings());
        let pair = issuer.issue_pair(&user()).unwrap();

        // Access header and payload with the refresh token's signature
        let (signed, _) = pair.access_token.rsplit_once('.').unwrap();
        let (_, foreign_sig) = pair.refresh_token.rsplit_once('.').unwrap();
        let tampered = format!("{}.{}", signed, foreign_sig);

        assert!(matches!(
            issuer.verify_access(&tampered).unwrap_err(),
            AppError::InvalidToken
        ));
        assert!(issuer.verify_access("not.a.token").is_err());
        assert!(issuer.verify_access("").is_err());
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let issuer = TokenIssuer::new(&settings());
        let other = TokenIssuer::new(
            &TokenSettings::new(
                "another-access-secret-32-chars-long!!",
                "another-refresh-secret-32-chars-long!",
                3600,
                7200,
            )
            .unwrap(),
        );
        let pair = other.issue_pair(&user()).unwrap();

        assert!(matches!(
            issuer.verify_access(&pair.access_token).unwrap_err(),
            AppError::InvalidToken
        ));
    }

    #[test]
    fn test_expiry_overflow_is_an_error() {
        let clock = Arc::new(FixedClock::new(chrono::DateTime::<Utc>::MAX_UTC));
        let issuer = TokenIssuer::with_clock(&settings(), clock);

        let err = issuer.issue_pair(&user()).unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn test_longest_allowed_ttl_issues() {
        let issuer = TokenIssuer::new(
            &TokenSettings::new(ACCESS, REFRESH, MAX_TOKEN_TTL_SECS, MAX_TOKEN_TTL_SECS).unwrap(),
        );
        let pair = issuer.issue_pair(&user()).unwrap();
        assert!(issuer.refresh_pair(&pair.refresh_token).is_ok());
    }

    #[test]
    fn test_token_response_shape() {
        let response = TokenResponse::new(
            TokenPair {
                access_token: "a".to_string(),
                refresh_token: "r".to_string(),
            },
            3600,
        );
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_in, 3600);
    }
}
