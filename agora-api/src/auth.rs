use std::{fmt, str::FromStr};

use crate::{Error, UserId};

#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct NewSession {
    pub email: String,
    pub password: String,
}

impl NewSession {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_required("Email", &self.email)?;
        crate::validate_required("Password", &self.password)?;
        Ok(())
    }
}

#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password: String,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_required("Email", &self.email)?;
        crate::validate_required("Password", &self.password)?;
        Ok(())
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct AuthToken(pub String);

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: AuthToken,
    pub user_id: UserId,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn from_admin(admin: bool) -> Role {
        match admin {
            true => Role::Admin,
            false => Role::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Role, Error> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(Error::Validation(format!("unknown role {s:?}"))),
        }
    }
}

/// Authentication state of the current client. Either the whole triple
/// exists or the client is anonymous.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Session {
    pub token: AuthToken,
    pub user_id: UserId,
    pub role: Role,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Advisory: whether edit and delete controls should be offered for a
    /// resource created by `creator`
    pub fn can_modify(&self, creator: UserId) -> bool {
        self.is_admin() || self.user_id == creator
    }
}
