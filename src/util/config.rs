use std::{path::PathBuf, str::FromStr};

pub const DEFAULT_ISSUER: &str = "hakko";
pub const DEFAULT_ACCESS_TOKEN_TTL: u64 = 15 * 60;
pub const DEFAULT_ID_TOKEN_TTL: u64 = 60 * 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read key file {}", path.display())]
    ReadKey {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("signing key is invalid")]
    InvalidKey(#[source] jsonwebtoken::errors::Error),
    #[error("signing key and verification key do not match")]
    KeyMismatch(#[source] jsonwebtoken::errors::Error),
    #[error("signing secret must not be empty")]
    EmptySecret,
    #[error("missing required setting {0}")]
    MissingKey(&'static str),
    #[error("issuer must not be blank")]
    BlankIssuer,
    #[error("{0} lifetime must be greater than zero")]
    InvalidLifetime(&'static str),
    #[error("unknown signing algorithm `{0}`")]
    UnknownAlgorithm(String),
}

/// Static issuance settings, fixed for the life of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuerConfig {
    issuer: String,
    access_token_ttl: u64,
    id_token_ttl: u64,
}

impl IssuerConfig {
    pub fn new(
        issuer: impl Into<String>,
        access_token_ttl: u64,
        id_token_ttl: u64,
    ) -> Result<Self, ConfigError> {
        let issuer = issuer.into();
        if issuer.trim().is_empty() {
            return Err(ConfigError::BlankIssuer);
        }
        if access_token_ttl == 0 {
            return Err(ConfigError::InvalidLifetime("access token"));
        }
        if id_token_ttl == 0 {
            return Err(ConfigError::InvalidLifetime("id token"));
        }

        Ok(Self {
            issuer,
            access_token_ttl,
            id_token_ttl,
        })
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Seconds an access token stays valid; also reported as `expires_in`.
    pub fn access_token_ttl(&self) -> u64 {
        self.access_token_ttl
    }

    pub fn id_token_ttl(&self) -> u64 {
        self.id_token_ttl
    }
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            issuer: DEFAULT_ISSUER.to_string(),
            access_token_ttl: DEFAULT_ACCESS_TOKEN_TTL,
            id_token_ttl: DEFAULT_ID_TOKEN_TTL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    Es256,
    Hs256,
}

impl FromStr for KeyAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "es256" => Ok(Self::Es256),
            "hs256" => Ok(Self::Hs256),
            _ => Err(ConfigError::UnknownAlgorithm(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_lifetimes() {
        let config = IssuerConfig::default();
        assert_eq!(config.issuer(), "hakko");
        assert_eq!(config.access_token_ttl(), 900);
        assert_eq!(config.id_token_ttl(), 3600);
    }

    #[test]
    fn zero_lifetimes_are_rejected() {
        assert!(matches!(
            IssuerConfig::new("hakko", 0, 3600),
            Err(ConfigError::InvalidLifetime("access token"))
        ));
        assert!(matches!(
            IssuerConfig::new("hakko", 900, 0),
            Err(ConfigError::InvalidLifetime("id token"))
        ));
    }

    #[test]
    fn blank_issuer_is_rejected() {
        assert!(matches!(
            IssuerConfig::new(" ", 900, 3600),
            Err(ConfigError::BlankIssuer)
        ));
    }

    #[test]
    fn algorithm_names_parse_case_insensitively() {
        assert_eq!("ES256".parse::<KeyAlgorithm>().unwrap(), KeyAlgorithm::Es256);
        assert_eq!("hs256".parse::<KeyAlgorithm>().unwrap(), KeyAlgorithm::Hs256);
        assert!("rs256".parse::<KeyAlgorithm>().is_err());
    }
}
