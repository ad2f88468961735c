use std::path::Path;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::{event, Level};

use crate::util::config::ConfigError;

/// The process-wide signing key together with its verification half.
///
/// Built once at startup. Construction signs and verifies a throwaway token so a
/// mismatched or unusable key pair fails here rather than on first issuance.
#[derive(Clone)]
pub struct SigningKey {
    algorithm: Algorithm,
    secret: EncodingKey,
    public: DecodingKey,
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningKey {{ algorithm: {:?}, .. }}", self.algorithm)
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
struct KeyCheck {
    check: bool,
}

fn read_key_file(path: &Path) -> Result<Vec<u8>, ConfigError> {
    std::fs::read(path).map_err(|source| ConfigError::ReadKey {
        path: path.to_path_buf(),
        source,
    })
}

impl SigningKey {
    pub fn from_ec_pem(secret: &[u8], public: &[u8]) -> Result<Self, ConfigError> {
        let secret = EncodingKey::from_ec_pem(secret).map_err(ConfigError::InvalidKey)?;
        let public = DecodingKey::from_ec_pem(public).map_err(ConfigError::InvalidKey)?;

        Self {
            algorithm: Algorithm::ES256,
            secret,
            public,
        }
        .checked()
    }

    pub fn from_ec_pem_files(
        secret_path: impl AsRef<Path>,
        public_path: impl AsRef<Path>,
    ) -> Result<Self, ConfigError> {
        let secret = read_key_file(secret_path.as_ref())?;
        let public = read_key_file(public_path.as_ref())?;
        Self::from_ec_pem(&secret, &public)
    }

    pub fn from_secret(secret: &[u8]) -> Result<Self, ConfigError> {
        if secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }

        Self {
            algorithm: Algorithm::HS256,
            secret: EncodingKey::from_secret(secret),
            public: DecodingKey::from_secret(secret),
        }
        .checked()
    }

    fn checked(self) -> Result<Self, ConfigError> {
        let token = jsonwebtoken::encode(
            &Header::new(self.algorithm),
            &KeyCheck { check: true },
            &self.secret,
        )
        .map_err(ConfigError::InvalidKey)?;

        let mut validation = Validation::new(self.algorithm);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        jsonwebtoken::decode::<KeyCheck>(&token, &self.public, &validation)
            .map_err(ConfigError::KeyMismatch)?;

        event!(Level::DEBUG, algorithm = ?self.algorithm, "Loaded signing key");
        Ok(self)
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub(crate) fn secret(&self) -> &EncodingKey {
        &self.secret
    }

    pub(crate) fn public(&self) -> &DecodingKey {
        &self.public
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EC_SECRET: &[u8] = include_bytes!("../../tests/fixtures/ec_private.pem");
    const EC_PUBLIC: &[u8] = include_bytes!("../../tests/fixtures/ec_public.pem");
    const EC_OTHER_PUBLIC: &[u8] = include_bytes!("../../tests/fixtures/ec_other_public.pem");

    #[test]
    fn hmac_key_loads() {
        let key = SigningKey::from_secret(b"a test secret").unwrap();
        assert_eq!(key.algorithm(), Algorithm::HS256);
    }

    #[test]
    fn empty_hmac_secret_is_rejected() {
        assert!(matches!(
            SigningKey::from_secret(b""),
            Err(ConfigError::EmptySecret)
        ));
    }

    #[test]
    fn ec_key_pair_loads() {
        let key = SigningKey::from_ec_pem(EC_SECRET, EC_PUBLIC).unwrap();
        assert_eq!(key.algorithm(), Algorithm::ES256);
    }

    #[test]
    fn mismatched_ec_pair_is_rejected() {
        assert!(matches!(
            SigningKey::from_ec_pem(EC_SECRET, EC_OTHER_PUBLIC),
            Err(ConfigError::KeyMismatch(_))
        ));
    }

    #[test]
    fn garbage_pem_is_rejected() {
        assert!(matches!(
            SigningKey::from_ec_pem(b"not a key", EC_PUBLIC),
            Err(ConfigError::InvalidKey(_))
        ));
    }

    #[test]
    fn missing_key_file_is_reported() {
        let err =
            SigningKey::from_ec_pem_files("/nonexistent/secret.pem", "/nonexistent/public.pem")
                .unwrap_err();
        assert!(matches!(err, ConfigError::ReadKey { .. }));
    }

    #[test]
    fn debug_output_hides_key_material() {
        let key = SigningKey::from_secret(b"a test secret").unwrap();
        assert_eq!(format!("{:?}", key), "SigningKey { algorithm: HS256, .. }");
    }
}
