use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::{event, Level};

use crate::auth::TokenResponse;
use crate::core::models::{Client, ClientRegistration, FlowSession, User};
use crate::core::types::{ClientId, Scopes};
use crate::provider::{key::SigningKey, token::TokenService, Error, TokenProvider};
use crate::util::config::{ConfigError, IssuerConfig, KeyAlgorithm};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Provider(#[from] Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser)]
#[clap(
    name = "hakko-util",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS")
)]
pub struct Options {
    #[clap(flatten)]
    pub settings: Settings,
    #[clap(subcommand)]
    command: SubCommand,
}

/// Process-wide issuer settings, read once at startup.
#[derive(Args)]
pub struct Settings {
    #[clap(long, env = "HAKKO_ISSUER", default_value = "hakko")]
    pub issuer: String,
    #[clap(long, env = "HAKKO_ACCESS_TOKEN_TTL", default_value = "900")]
    pub access_token_ttl: u64,
    #[clap(long, env = "HAKKO_ID_TOKEN_TTL", default_value = "3600")]
    pub id_token_ttl: u64,
    #[clap(long, env = "HAKKO_ALGORITHM", default_value = "es256")]
    pub algorithm: KeyAlgorithm,
    #[clap(long, env = "HAKKO_PRIVATE_KEY_FILE")]
    pub private_key_file: Option<PathBuf>,
    #[clap(long, env = "HAKKO_PUBLIC_KEY_FILE")]
    pub public_key_file: Option<PathBuf>,
    #[clap(long, env = "HAKKO_HMAC_SECRET", hide_env_values = true)]
    pub hmac_secret: Option<String>,
}

impl Settings {
    pub fn signing_key(&self) -> Result<SigningKey, ConfigError> {
        match self.algorithm {
            KeyAlgorithm::Es256 => {
                let secret = self
                    .private_key_file
                    .as_ref()
                    .ok_or(ConfigError::MissingKey("HAKKO_PRIVATE_KEY_FILE"))?;
                let public = self
                    .public_key_file
                    .as_ref()
                    .ok_or(ConfigError::MissingKey("HAKKO_PUBLIC_KEY_FILE"))?;
                SigningKey::from_ec_pem_files(secret, public)
            }
            KeyAlgorithm::Hs256 => {
                let secret = self
                    .hmac_secret
                    .as_ref()
                    .ok_or(ConfigError::MissingKey("HAKKO_HMAC_SECRET"))?;
                SigningKey::from_secret(secret.as_bytes())
            }
        }
    }

    pub fn issuer_config(&self) -> Result<IssuerConfig, ConfigError> {
        IssuerConfig::new(&self.issuer, self.access_token_ttl, self.id_token_ttl)
    }

    pub fn token_provider(&self) -> Result<TokenProvider, ConfigError> {
        let key = self.signing_key()?;
        let config = self.issuer_config()?;
        event!(
            Level::INFO,
            issuer = config.issuer(),
            algorithm = ?key.algorithm(),
            "Issuer configured"
        );
        Ok(TokenProvider::new(TokenService::new(key, config)))
    }
}

#[derive(Subcommand)]
enum SubCommand {
    ValidateClient(ValidateClient),
    Issue(Issue),
    VerifyAccess(VerifyAccess),
    VerifyId(VerifyId),
}

#[derive(Args)]
struct ValidateClient {
    #[clap(short, long)]
    file: PathBuf,
}

#[derive(Args)]
struct Issue {
    #[clap(short, long)]
    client: PathBuf,
    #[clap(short, long)]
    username: String,
    #[clap(short, long)]
    name: String,
    #[clap(short, long, default_value = "")]
    scope: String,
}

#[derive(Args)]
struct VerifyAccess {
    #[clap(short, long)]
    token: String,
}

#[derive(Args)]
struct VerifyId {
    #[clap(short, long)]
    token: String,
    #[clap(short, long)]
    audience: String,
}

fn read_client(path: &Path) -> Result<Client, CliError> {
    let contents = std::fs::read(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let registration: ClientRegistration = serde_json::from_slice(&contents)?;
    registration.validate().map_err(|e| Error::from(e).into())
}

fn validate_client(c: &ValidateClient) -> Result<serde_json::Value, CliError> {
    let client = read_client(&c.file)?;
    event!(Level::INFO, client_id = ?client.id, "Client record is valid");
    Ok(serde_json::json!({ "client_id": client.id, "valid": true }))
}

fn issue(c: &Issue, provider: &TokenProvider) -> Result<TokenResponse, CliError> {
    let client = read_client(&c.client)?;
    let scopes = Scopes::from_delimited(&c.scope).map_err(Error::from)?;
    let session = FlowSession::builder()
        .client(client)
        .user(User {
            username: c.username.clone(),
            name: c.name.clone(),
        })
        .scopes(scopes)
        .build()
        .map_err(Error::from)?;

    Ok(provider.assemble(&session)?)
}

fn verify_access(
    c: &VerifyAccess,
    provider: &TokenProvider,
) -> Result<serde_json::Value, CliError> {
    let claims = provider.token_service().verify_access_token(&c.token)?;
    Ok(serde_json::to_value(claims)?)
}

fn verify_id(c: &VerifyId, provider: &TokenProvider) -> Result<serde_json::Value, CliError> {
    let audience = ClientId(c.audience.clone());
    let claims = provider.token_service().verify_id_token(&c.token, &audience)?;
    Ok(serde_json::to_value(claims)?)
}

pub fn run_cli_action(opts: Options) -> Result<serde_json::Value, CliError> {
    use SubCommand::*;

    match &opts.command {
        ValidateClient(c) => validate_client(c),
        Issue(c) => {
            let provider = opts.settings.token_provider()?;
            Ok(serde_json::to_value(issue(c, &provider)?)?)
        }
        VerifyAccess(c) => verify_access(c, &opts.settings.token_provider()?),
        VerifyId(c) => verify_id(c, &opts.settings.token_provider()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> String {
        format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    fn parse(args: &[&str]) -> Options {
        let mut argv = vec!["hakko-util".to_string()];
        argv.extend(args.iter().map(|s| s.to_string()));
        Options::try_parse_from(argv).unwrap()
    }

    #[test]
    fn es256_requires_both_key_files() {
        let secret = fixture("ec_private.pem");
        let opts = parse(&[
            "--algorithm",
            "es256",
            "--private-key-file",
            secret.as_str(),
            "verify-access",
            "--token",
            "x",
        ]);
        assert!(matches!(
            opts.settings.token_provider(),
            Err(ConfigError::MissingKey("HAKKO_PUBLIC_KEY_FILE"))
        ));
    }

    #[test]
    fn hs256_requires_secret() {
        let opts = parse(&["--algorithm", "hs256", "verify-access", "--token", "x"]);
        assert!(matches!(
            opts.settings.token_provider(),
            Err(ConfigError::MissingKey("HAKKO_HMAC_SECRET"))
        ));
    }

    #[test]
    fn issue_then_verify_round_trip() {
        let secret = fixture("ec_private.pem");
        let public = fixture("ec_public.pem");
        let settings = [
            "--algorithm",
            "es256",
            "--private-key-file",
            secret.as_str(),
            "--public-key-file",
            public.as_str(),
        ];

        let mut args = settings.to_vec();
        let client = fixture("client.json");
        args.extend([
            "issue",
            "--client",
            client.as_str(),
            "--username",
            "alice",
            "--name",
            "Alice",
            "--scope",
            "openid email",
        ]);
        let response = run_cli_action(parse(&args)).unwrap();
        assert_eq!(response["scope"], "openid email");
        assert_eq!(response["token_type"], "bearer");

        let access = response["access_token"].as_str().unwrap();
        let mut args = settings.to_vec();
        args.extend(["verify-access", "--token", access]);
        let claims = run_cli_action(parse(&args)).unwrap();
        assert_eq!(claims["sub"], "alice");

        let id = response["id_token"].as_str().unwrap();
        let mut args = settings.to_vec();
        args.extend(["verify-id", "--token", id, "--audience", "client123"]);
        let claims = run_cli_action(parse(&args)).unwrap();
        assert_eq!(claims["email"], "alice");
    }

    #[test]
    fn unknown_scope_is_invalid_input() {
        let client = fixture("client.json");
        let opts = parse(&[
            "--algorithm",
            "hs256",
            "--hmac-secret",
            "cli test secret",
            "issue",
            "--client",
            client.as_str(),
            "--username",
            "bob",
            "--name",
            "Bob",
            "--scope",
            "openid profile",
        ]);
        match run_cli_action(opts) {
            Err(CliError::Provider(e)) => assert!(!e.is_configuration()),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn validate_client_does_not_need_a_key() {
        let file = fixture("client.json");
        let opts = parse(&["validate-client", "--file", file.as_str()]);
        let result = run_cli_action(opts).unwrap();
        assert_eq!(result["client_id"], "client123");
    }

    #[test]
    fn verify_without_a_key_is_a_config_error() {
        let opts = parse(&["--algorithm", "hs256", "verify-id", "-t", "x", "-a", "c"]);
        assert!(matches!(
            run_cli_action(opts),
            Err(CliError::Config(ConfigError::MissingKey("HAKKO_HMAC_SECRET")))
        ));
    }

    #[test]
    fn blank_client_field_is_rejected() {
        let file = fixture("blank_client.json");
        let opts = parse(&["validate-client", "--file", file.as_str()]);
        assert!(matches!(
            run_cli_action(opts),
            Err(CliError::Provider(Error::Invalid(_)))
        ));
    }
}
