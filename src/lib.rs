pub mod auth;
pub mod core;
pub mod oidc;
pub mod provider;
pub mod util;

pub use crate::auth::{TokenResponse, TokenType};
pub use crate::core::models::{Client, ClientRegistration, FlowSession, User, ValidationError};
pub use crate::core::types::{Scope, Scopes};
pub use crate::provider::{Error, TokenProvider};
