use chrono::Utc;

mod auth;
pub use auth::{AuthResponse, AuthToken, NewSession, NewUser, Role, Session};

mod comment;
pub use comment::{Comment, CommentId, CommentUpdate, NewComment};

mod error;
pub use error::Error;

mod thread;
pub use thread::{NewThread, Thread, ThreadId, ThreadPage, ThreadSort, ThreadUpdate};

mod user;
pub use user::{SetAdmin, User, UserId, UserUpdate};

pub type Time = chrono::DateTime<Utc>;

/// Body of the like and watch endpoints
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Toggle<Id> {
    pub id: Id,
    pub turnon: bool,
}

/// Body naming a single resource: delete requests and creation responses
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Target<Id> {
    pub id: Id,
}

// All `validate` functions only check what the client can know before hitting
// the network. The backend remains the authority on everything else.
pub(crate) fn validate_required(what: &str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{what} cannot be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_uses_backend_field_names() {
        let body = serde_json::to_value(Toggle {
            id: ThreadId(4),
            turnon: true,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "id": 4, "turnon": true }));
    }

    #[test]
    fn whitespace_is_not_content() {
        assert_eq!(
            validate_required("Comment", " \n\t"),
            Err(Error::Validation(String::from("Comment cannot be empty")))
        );
        assert_eq!(validate_required("Comment", "hi"), Ok(()));
    }
}
