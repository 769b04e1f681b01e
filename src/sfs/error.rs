//! Error classification for SFS HTTP responses.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::session::SessionError;

/// Errors raised while building a manager from configuration.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SetupError {
    /// Raised when configuration is incomplete or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Raised when the session cannot be established.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Huawei-style fault body: `{"error_code": "...", "error_msg": "..."}`.
#[derive(Debug, Deserialize)]
struct FlatFault {
    error_code: String,
    #[serde(default)]
    error_msg: String,
}

/// Inner part of a Manila fault: `{"badRequest": {"code": 400, "message": "..."}}`.
#[derive(Debug, Deserialize)]
struct NestedFault {
    #[serde(default)]
    message: String,
}

/// Extracts a provider code and message from an error body.
///
/// Bodies that match neither fault shape are returned verbatim as the
/// message so nothing the provider said is lost.
pub(super) fn fault_details(body: &[u8]) -> (Option<String>, String) {
    if let Ok(flat) = serde_json::from_slice::<FlatFault>(body) {
        return (Some(flat.error_code), flat.error_msg);
    }
    if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body)
        && map.len() == 1
        && let Some((kind, inner)) = map.into_iter().next()
        && let Ok(nested) = serde_json::from_value::<NestedFault>(inner)
    {
        return (Some(kind), nested.message);
    }
    (None, String::from_utf8_lossy(body).trim().to_owned())
}

/// Maps a non-success response to an [`ApiError`].
pub(super) fn classify(status: StatusCode, body: &[u8], resource: &str) -> ApiError {
    if status == StatusCode::NOT_FOUND {
        return ApiError::NotFound {
            resource: resource.to_owned(),
        };
    }
    let (code, message) = fault_details(body);
    ApiError::Rejected {
        status: status.as_u16(),
        code,
        message,
    }
}

pub(super) fn transport(err: &reqwest::Error) -> ApiError {
    ApiError::Transport {
        message: err.to_string(),
    }
}

pub(super) fn decode(err: &serde_json::Error) -> ApiError {
    ApiError::Decode {
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn not_found_is_classified_before_body_parsing() {
        let err = classify(StatusCode::NOT_FOUND, b"not json", "s-1");
        assert_eq!(
            err,
            ApiError::NotFound {
                resource: String::from("s-1")
            }
        );
    }

    #[rstest]
    #[case(
        br#"{"error_code":"SFS.0004","error_msg":"quota exceeded"}"#.as_slice(),
        Some("SFS.0004"),
        "quota exceeded"
    )]
    #[case(
        br#"{"badRequest":{"code":400,"message":"Invalid share size"}}"#.as_slice(),
        Some("badRequest"),
        "Invalid share size"
    )]
    #[case(b"  upstream timeout \n".as_slice(), None, "upstream timeout")]
    fn rejection_keeps_provider_message(
        #[case] body: &[u8],
        #[case] code: Option<&str>,
        #[case] message: &str,
    ) {
        let err = classify(StatusCode::BAD_REQUEST, body, "shares");
        assert_eq!(
            err,
            ApiError::Rejected {
                status: 400,
                code: code.map(str::to_owned),
                message: message.to_owned(),
            }
        );
    }
}
