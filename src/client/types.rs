//! Request and response payloads for the users and auth services. Passwords,
//! verification tokens, codes and TOTP secrets travel through these types, so
//! their `Debug` output masks them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Second-factor channel requested at enrollment.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AuthType {
    Email,
    AuthApp,
}

/// Account identifier assigned by the users service. Kept in the JSON shape the
/// service returned so it can be echoed back unchanged.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum UserId {
    Number(u64),
    Text(String),
}

impl UserId {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Number(_) => false,
            Self::Text(id) => id.trim().is_empty(),
        }
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

#[derive(Clone, Serialize, Default)]
pub struct CreateUser {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "authType", skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<AuthType>,
    #[serde(rename = "verificationToken", skip_serializing_if = "Option::is_none")]
    pub verification_token: Option<String>,
}

impl fmt::Debug for CreateUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"***")
            .field("display_name", &self.display_name)
            .field("auth_type", &self.auth_type)
            .field(
                "verification_token",
                &self.verification_token.as_ref().map(|_| "***"),
            )
            .finish()
    }
}

#[derive(Clone, Serialize)]
pub struct Login {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Login")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Initiate2fa {
    pub username: String,
    pub email: String,
    #[serde(rename = "authType")]
    pub auth_type: AuthType,
}

#[derive(Clone, Serialize)]
pub struct VerifyRegistration {
    #[serde(rename = "verificationToken")]
    pub verification_token: String,
    pub code: String,
}

impl fmt::Debug for VerifyRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifyRegistration")
            .field("verification_token", &"***")
            .field("code", &"***")
            .finish()
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Verify2fa {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    pub code: String,
}

/// `201` body of `POST /users`.
#[derive(Clone, Debug, Deserialize)]
pub struct CreatedUser {
    pub user: UserRecord,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
}

/// `200` body of `POST /auth/2fa/register/initiate`. `secret` is only
/// present for the authenticator-app channel.
#[derive(Clone, Deserialize)]
pub struct Initiated {
    #[serde(rename = "verificationToken")]
    pub verification_token: String,
    #[serde(default)]
    pub secret: Option<String>,
}

impl fmt::Debug for Initiated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Initiated")
            .field("verification_token", &"***")
            .field("secret", &self.secret.as_ref().map(|_| "***"))
            .finish()
    }
}
