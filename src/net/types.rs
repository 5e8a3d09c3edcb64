//! Typed wire payloads for the account API.
//!
//! The server speaks JSON; everything crossing the wire (or persisted into
//! the cookie / localStorage mirror) is deserialized into these types so
//! malformed payloads fail explicitly instead of flowing through as
//! loosely-shaped values.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

/// Lightweight account record returned by the login endpoint.
///
/// Serialized into the `authenticatedAccount` cookie; its presence there is
/// the sole client-side authentication signal.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Account {
    #[serde(default)]
    pub id: u64,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// Full account record: profile fields, staff flag, and credit balance.
///
/// Fetched separately from the lightweight [`Account`], cached in memory for
/// the session lifetime and mirrored to localStorage across page reloads.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FullAccount {
    #[serde(default)]
    pub id: u64,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub credit: f64,
}

/// Body for `POST /api/v1/accounts/`.
#[derive(Clone, Debug, serde::Serialize)]
pub struct RegisterRequest {
    pub password: String,
    pub email: String,
    pub last_name: String,
    pub first_name: String,
}

/// Body for `POST /api/v1/auth/login/`.
#[derive(Clone, Debug, serde::Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body for `POST /api/v1/auth/update-profile/`.
///
/// The same endpoint serves full profile edits and credit-only top-ups;
/// absent fields are omitted from the payload entirely.
#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct ProfileUpdate {
    pub account_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit: Option<f64>,
}

/// Optional filters for `GET /api/v1/auth/accounts/`.
///
/// Only the filters actually provided become query parameters.
#[derive(Clone, Debug, Default)]
pub struct AccountFilter {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl AccountFilter {
    /// The `(name, value)` query pairs for the filters that are set.
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = Vec::new();
        if let Some(first_name) = self.first_name.as_deref() {
            pairs.push(("first_name", first_name));
        }
        if let Some(last_name) = self.last_name.as_deref() {
            pairs.push(("last_name", last_name));
        }
        if let Some(email) = self.email.as_deref() {
            pairs.push(("email", email));
        }
        pairs
    }
}
