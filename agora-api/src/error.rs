use http::StatusCode;
use serde_json::json;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// Caught on the client, before any request got sent
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Transport(String),

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The local session storage could not be written
    #[error("{0}")]
    Storage(String),
}

impl Error {
    pub fn rejected(status: StatusCode, message: impl Into<String>) -> Error {
        Error::Rejected {
            status: status.as_u16(),
            message: message.into(),
        }
    }

    pub fn permission_denied() -> Error {
        Error::rejected(StatusCode::FORBIDDEN, "permission denied")
    }

    pub fn not_found(what: &str) -> Error {
        Error::rejected(StatusCode::NOT_FOUND, format!("{what} not found"))
    }

    pub fn bad_request(message: impl Into<String>) -> Error {
        Error::rejected(StatusCode::BAD_REQUEST, message)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Rejected { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Transport(_) => StatusCode::BAD_GATEWAY,
            Error::Decode(_) | Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body as the backend sends it along with `status_code`
    pub fn contents(&self) -> Vec<u8> {
        let message = match self {
            Error::Rejected { message, .. } => message.clone(),
            e => e.to_string(),
        };
        json!({ "error": message }).to_string().into_bytes()
    }

    /// Builds the error for a non-success response. The backend's `error`
    /// field wins; bodies without one fall back to the status reason.
    pub fn parse(status: StatusCode, body: &[u8]) -> Error {
        let message = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .and_then(|data| {
                data.get("error")
                    .and_then(|e| e.as_str())
                    .filter(|e| !e.is_empty())
                    .map(String::from)
            })
            .unwrap_or_else(|| {
                format!(
                    "request failed: {}",
                    status.canonical_reason().unwrap_or("unknown status")
                )
            });
        Error::rejected(status, message)
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_prefers_backend_message() {
        let err = Error::parse(StatusCode::NOT_FOUND, br#"{"error":"not found"}"#);
        assert_eq!(
            err,
            Error::Rejected {
                status: 404,
                message: String::from("not found"),
            }
        );
        assert_eq!(err.to_string(), "not found");
    }

    #[test]
    fn parse_falls_back_to_status_reason() {
        let err = Error::parse(StatusCode::INTERNAL_SERVER_ERROR, b"<html>oops</html>");
        assert_eq!(err.to_string(), "request failed: Internal Server Error");

        let err = Error::parse(StatusCode::BAD_REQUEST, br#"{"message":"nope"}"#);
        assert_eq!(err.to_string(), "request failed: Bad Request");
    }

    #[test]
    fn contents_parses_back() {
        let err = Error::permission_denied();
        assert_eq!(Error::parse(err.status_code(), &err.contents()), err);
    }
}
