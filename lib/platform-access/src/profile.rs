//! Verified identity claims.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The claim set of a verified identity token.
///
/// Holds every claim the provider issued, standard and custom, keyed by claim
/// name. Only ever built from a token that passed verification.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Profile(Map<String, Value>);

impl Profile {
    /// Wraps a decoded claim map.
    #[must_use]
    pub fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    /// Returns the value of a claim.
    #[must_use]
    pub fn get(&self, claim: &str) -> Option<&Value> {
        self.0.get(claim)
    }

    /// Returns a claim if it is a string.
    #[must_use]
    pub fn get_str(&self, claim: &str) -> Option<&str> {
        self.0.get(claim).and_then(Value::as_str)
    }

    /// The `sub` claim.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.get_str("sub")
    }

    /// The best available display name: `name`, then `nickname`, then `preferred_username`.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.get_str("name")
            .or_else(|| self.get_str("nickname"))
            .or_else(|| self.get_str("preferred_username"))
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.get_str("email")
    }

    #[must_use]
    pub fn picture(&self) -> Option<&str> {
        self.get_str("picture")
    }

    /// Iterates over all claims in name order.
    pub fn claims(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Converts the profile into its JSON session representation.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile(value: Value) -> Profile {
        serde_json::from_value(value).expect("profile")
    }

    #[test]
    fn display_name_prefers_name_claim() {
        let p = profile(json!({"sub": "auth0|1", "name": "Ada", "nickname": "ada"}));
        assert_eq!(p.display_name(), Some("Ada"));
        assert_eq!(p.subject(), Some("auth0|1"));
    }

    #[test]
    fn display_name_falls_back_to_nickname() {
        let p = profile(json!({"sub": "auth0|1", "nickname": "ada"}));
        assert_eq!(p.display_name(), Some("ada"));
    }

    #[test]
    fn non_string_claims_are_not_returned_as_str() {
        let p = profile(json!({"email": 42, "email_verified": true}));
        assert_eq!(p.email(), None);
        assert_eq!(p.get("email_verified"), Some(&json!(true)));
    }

    #[test]
    fn into_value_is_a_json_object() {
        let p = profile(json!({"sub": "x"}));
        assert_eq!(p.into_value(), json!({"sub": "x"}));
    }
}
