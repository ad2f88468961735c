use crate::core::{models::ValidationError, types::UnknownScope};
use crate::util::config::ConfigError;

use super::claims::TokenKind;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    UnknownScope(#[from] UnknownScope),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to sign {kind}")]
    Signing {
        kind: TokenKind,
        #[source]
        source: jsonwebtoken::errors::Error,
    },
    #[error("system clock is set before the Unix epoch")]
    Clock(#[source] std::time::SystemTimeError),
    #[error("token rejected")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),
}

impl Error {
    /// Configuration failures are fatal to the process; everything else is
    /// a problem with the caller's input.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Signing { .. } | Self::Clock(_))
    }
}
