use std::collections::BTreeMap;

use serde_json::Value;

use crate::core::{
    models::{FlowSession, User},
    types::Scope,
};

/// Identity claims derived for a single issuance.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(BTreeMap<String, Value>);

impl ClaimSet {
    pub fn get(&self, claim: &str) -> Option<&Value> {
        self.0.get(claim)
    }

    pub fn contains(&self, claim: &str) -> bool {
        self.0.contains_key(claim)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn insert(&mut self, claim: &str, value: Value) {
        self.0.insert(claim.to_string(), value);
    }
}

pub struct ClaimRule {
    pub scope: Scope,
    pub claim: &'static str,
    pub value: fn(&User) -> Value,
}

fn email(user: &User) -> Value {
    Value::String(user.username.clone())
}

fn display_name(user: &User) -> Value {
    Value::String(user.name.clone())
}

/// Claim keys must stay unique across rules.
pub const CLAIM_RULES: &[ClaimRule] = &[
    ClaimRule {
        scope: Scope::Email,
        claim: "email",
        value: email,
    },
    ClaimRule {
        scope: Scope::Name,
        claim: "name",
        value: display_name,
    },
];

pub fn derive_identity_claims(session: &FlowSession) -> ClaimSet {
    let mut claims = ClaimSet::default();
    for scope in session.scopes().iter() {
        for rule in CLAIM_RULES.iter().filter(|rule| rule.scope == scope) {
            claims.insert(rule.claim, (rule.value)(session.user()));
        }
    }
    claims
}
