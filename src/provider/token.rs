use std::time::SystemTime;

use jsonwebtoken::{Header, Validation};
use tracing::{event, Level};

use crate::auth::TokenType;
use crate::core::{models::FlowSession, types::ClientId};
use crate::oidc::ClaimSet;
use crate::provider::{
    claims::{AccessClaims, IdClaims, TokenKind},
    key::SigningKey,
    Error,
};
use crate::util::config::IssuerConfig;

/// Source of the issuance instant, in seconds since the Unix epoch.
pub trait Clock {
    fn now(&self) -> Result<u64, Error>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Result<u64, Error> {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .map_err(|e| {
                event!(Level::ERROR, error = %e, "System clock is before the Unix epoch");
                Error::Clock(e)
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now(&self) -> Result<u64, Error> {
        Ok(self.0)
    }
}

#[derive(Debug)]
pub struct TokenService {
    key: SigningKey,
    config: IssuerConfig,
}

impl TokenService {
    pub fn new(key: SigningKey, config: IssuerConfig) -> Self {
        Self { key, config }
    }

    pub fn config(&self) -> &IssuerConfig {
        &self.config
    }

    pub fn token_type() -> TokenType {
        TokenType::Bearer
    }

    pub fn build_access_claims(&self, session: &FlowSession, issued_at: u64) -> AccessClaims {
        AccessClaims {
            iss: self.config.issuer().to_string(),
            sub: session.user().username.clone(),
            iat: issued_at,
            exp: issued_at.saturating_add(self.config.access_token_ttl()),
            scope: session.scopes().as_joined(),
        }
    }

    pub fn build_id_claims(
        &self,
        session: &FlowSession,
        claims: ClaimSet,
        issued_at: u64,
    ) -> IdClaims {
        IdClaims {
            iss: self.config.issuer().to_string(),
            sub: session.user().username.clone(),
            aud: session.client().id.0.clone(),
            iat: issued_at,
            exp: issued_at.saturating_add(self.config.id_token_ttl()),
            claims,
        }
    }

    pub fn build_access_token(
        &self,
        session: &FlowSession,
        clock: &impl Clock,
    ) -> Result<String, Error> {
        let claims = self.build_access_claims(session, clock.now()?);

        event!(Level::DEBUG, exp = claims.exp, "Issuing access_token");
        self.sign(TokenKind::Access, &claims)
    }

    pub fn build_identity_token(
        &self,
        session: &FlowSession,
        claims: ClaimSet,
        clock: &impl Clock,
    ) -> Result<String, Error> {
        let claims = self.build_id_claims(session, claims, clock.now()?);

        event!(
            Level::DEBUG,
            aud = %claims.aud,
            exp = claims.exp,
            claims = claims.claims.len(),
            "Issuing id_token"
        );
        self.sign(TokenKind::Identity, &claims)
    }

    fn sign(&self, kind: TokenKind, claims: &impl serde::Serialize) -> Result<String, Error> {
        let header = Header::new(self.key.algorithm());
        jsonwebtoken::encode(&header, claims, self.key.secret())
            .map_err(|source| Error::Signing { kind, source })
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.key.algorithm());
        validation.set_issuer(&[self.config.issuer()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation
    }

    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, Error> {
        jsonwebtoken::decode::<AccessClaims>(token, self.key.public(), &self.validation())
            .map(|td| td.claims)
            .map_err(|e| {
                event!(Level::WARN, error = %e, kind = %TokenKind::Access, "Rejected token");
                Error::InvalidToken(e)
            })
    }

    pub fn verify_id_token(&self, token: &str, audience: &ClientId) -> Result<IdClaims, Error> {
        let mut validation = self.validation();
        validation.set_audience(&[audience.as_ref()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub", "aud"]);

        jsonwebtoken::decode::<IdClaims>(token, self.key.public(), &validation)
            .map(|td| td.claims)
            .map_err(|e| {
                event!(Level::WARN, error = %e, kind = %TokenKind::Identity, "Rejected token");
                Error::InvalidToken(e)
            })
    }
}
