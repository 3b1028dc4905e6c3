//! Authentication payloads: login, onboarding responses, and the identity
//! carried by the session.

use serde::{Deserialize, Serialize};

/// Kind of institution being onboarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchoolType {
    Primary,
    Secondary,
    College,
    University,
    Other,
}

impl SchoolType {
    /// Wire names accepted by the backend, used by the wizard's enum rule.
    pub const WIRE_VALUES: &'static [&'static str] =
        &["PRIMARY", "SECONDARY", "COLLEGE", "UNIVERSITY", "OTHER"];
}

/// Funding/ownership category of the school.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchoolCategory {
    Public,
    Private,
    Religious,
    Other,
}

impl SchoolCategory {
    pub const WIRE_VALUES: &'static [&'static str] = &["PUBLIC", "PRIVATE", "RELIGIOUS", "OTHER"];
}

/// Credentials exchanged for a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The authenticated administrator as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub position: String,
    pub school_id: String,
}

impl UserIdentity {
    /// Display name in "First Last" form.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The school attached to the authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(rename = "type")]
    pub school_type: String,
    pub category: String,
}

/// Successful response from `auth/login` and `auth/onboard-school`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserIdentity,
    pub school: SchoolSummary,
    pub token: String,
}
