//! HS256 session token verifier.
//!
//! Accepts both the flat OIDC claim layout (`sub`, `given_name`, ...) and
//! the nested `user` object some session issuers emit. Flat claims win when
//! both are present.

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};
use serde::Deserialize;
use tenant_access_sdk::{IdentityError, IdentityVerifier, ProfileClaims, VerifiedIdentity};

#[derive(Debug, Clone, Deserialize)]
struct SessionClaims {
    sub: Option<String>,
    email: Option<String>,
    given_name: Option<String>,
    family_name: Option<String>,
    picture: Option<String>,
    user: Option<SessionUser>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionUser {
    id: Option<String>,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    picture: Option<String>,
}

impl SessionClaims {
    fn into_identity(self) -> Option<VerifiedIdentity> {
        let user = self.user;
        let pick = |flat: Option<String>, nested: fn(&SessionUser) -> Option<String>| {
            flat.or_else(|| user.as_ref().and_then(nested))
        };

        let subject = pick(self.sub, |u| u.id.clone()).filter(|s| !s.trim().is_empty())?;
        Some(VerifiedIdentity {
            subject,
            profile: ProfileClaims {
                email: pick(self.email, |u| u.email.clone()),
                first_name: pick(self.given_name, |u| u.first_name.clone()),
                last_name: pick(self.family_name, |u| u.last_name.clone()),
                picture: pick(self.picture, |u| u.picture.clone()),
            },
        })
    }
}

pub struct JwtIdentityVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityVerifier {
    /// `exp` is required; `iss` is checked when `issuer` is given.
    #[must_use]
    pub fn hs256(secret: &[u8], issuer: Option<&str>, leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        validation.leeway = leeway_seconds;
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }
        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

#[async_trait]
impl IdentityVerifier for JwtIdentityVerifier {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, IdentityError> {
        let data = jsonwebtoken::decode::<SessionClaims>(credential, &self.key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => IdentityError::Expired,
                _ => IdentityError::InvalidCredential(e.to_string()),
            })?;
        data.claims
            .into_identity()
            .ok_or_else(|| IdentityError::InvalidCredential("missing subject claim".to_owned()))
    }
}
