use std::sync::Arc;

use super::types::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub id: ClientId,
    pub secret: ClientSecret,
    pub name: String,
    pub description: String,
    pub redirect_uri: RedirectUri,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("client field `{0}` must not be blank")]
    BlankField(&'static str),
    #[error("flow session is missing its {0}")]
    MissingReference(&'static str),
}

/// A client record as submitted for registration.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ClientRegistration {
    pub client_id: String,
    pub secret: String,
    pub name: String,
    pub description: String,
    pub redirect_uri: String,
}

impl ClientRegistration {
    /// Rejects the record if any field is empty or whitespace.
    pub fn validate(self) -> Result<Client, ValidationError> {
        let fields = [
            ("client_id", &self.client_id),
            ("secret", &self.secret),
            ("name", &self.name),
            ("description", &self.description),
            ("redirect_uri", &self.redirect_uri),
        ];
        if let Some((field, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ValidationError::BlankField(*field));
        }

        Ok(Client {
            id: ClientId(self.client_id),
            secret: ClientSecret(self.secret),
            name: self.name,
            description: self.description,
            redirect_uri: RedirectUri(self.redirect_uri),
        })
    }
}

/// The outcome of a completed authorization: who consented, for which
/// client, and what was granted.
#[derive(Debug, Clone)]
pub struct FlowSession {
    client: Arc<Client>,
    user: Arc<User>,
    scopes: Scopes,
}

impl FlowSession {
    pub fn builder() -> FlowSessionBuilder {
        FlowSessionBuilder::default()
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn scopes(&self) -> &Scopes {
        &self.scopes
    }
}

#[derive(Debug, Default)]
pub struct FlowSessionBuilder {
    client: Option<Arc<Client>>,
    user: Option<Arc<User>>,
    scopes: Scopes,
}

impl FlowSessionBuilder {
    pub fn client(mut self, client: impl Into<Arc<Client>>) -> Self {
        self.client = Some(client.into());
        self
    }

    pub fn user(mut self, user: impl Into<Arc<User>>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn scopes(mut self, scopes: Scopes) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn build(self) -> Result<FlowSession, ValidationError> {
        let client = self.client.ok_or(ValidationError::MissingReference("client"))?;
        let user = self.user.ok_or(ValidationError::MissingReference("user"))?;

        Ok(FlowSession {
            client,
            user,
            scopes: self.scopes,
        })
    }
}
