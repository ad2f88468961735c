pub mod claims;
pub mod error;
pub mod key;
pub mod token;

pub use error::Error;

use crate::auth::TokenResponse;
use crate::core::models::FlowSession;
use crate::oidc::derive_identity_claims;
use token::{Clock, FixedClock, SystemClock, TokenService};

use tracing::{event, Level};

/// Turns completed flow sessions into token responses.
///
/// Holds only immutable state, so one instance can be shared across threads
/// behind an `Arc` and called concurrently.
#[derive(Debug)]
pub struct TokenProvider {
    token: TokenService,
}

impl TokenProvider {
    pub fn new(token: TokenService) -> Self {
        Self { token }
    }

    pub fn token_service(&self) -> &TokenService {
        &self.token
    }

    pub fn assemble(&self, session: &FlowSession) -> Result<TokenResponse, Error> {
        self.assemble_at(session, &SystemClock)
    }

    #[tracing::instrument(
        skip_all,
        fields(
            sub = %session.user().username,
            client_id = ?session.client().id,
            scope = %session.scopes()
        )
    )]
    pub fn assemble_at(
        &self,
        session: &FlowSession,
        clock: &impl Clock,
    ) -> Result<TokenResponse, Error> {
        event!(Level::TRACE, "Assembling token response");
        // Both tokens share one issuance instant.
        let clock = FixedClock(clock.now()?);
        let scope = session.scopes().as_joined();

        let access_token = self.token.build_access_token(session, &clock)?;

        let id_token = if session.scopes().has_openid() {
            event!(Level::DEBUG, "Processing OpenID Connect scopes");
            let claims = derive_identity_claims(session);
            Some(self.token.build_identity_token(session, claims, &clock)?)
        } else {
            None
        };

        Ok(TokenResponse {
            access_token,
            id_token,
            token_type: TokenService::token_type(),
            expires_in: self.token.config().access_token_ttl(),
            scope,
        })
    }
}
