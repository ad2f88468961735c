pub mod claims;

use crate::core::types::{Scope, Scopes};

pub use claims::{derive_identity_claims, ClaimSet};

impl Scopes {
    /// An identity token is only issued when `openid` was granted.
    pub fn has_openid(&self) -> bool {
        self.contains(Scope::Openid)
    }
}
