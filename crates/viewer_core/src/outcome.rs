use serde::de::DeserializeOwned;
use thiserror::Error;

use shared::error::{ApiError, ErrorCode};

/// Three-way classification of one remote call. Produced exactly once per
/// call; nothing here retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Success(T),
    DomainError(ApiError),
    TransportFault(FetchFault),
}

/// Unexpected low-level failure of a remote call. Any of these aborts the
/// remainder of the fetch job that observed it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFault {
    #[error("request timed out")]
    Timeout,
    #[error("failed to reach remote host: {detail}")]
    Connect { detail: String },
    #[error("malformed response payload: {detail}")]
    Decode { detail: String },
    #[error("image endpoint returned an empty result set")]
    EmptyImageSet,
    #[error("{detail}")]
    Other { detail: String },
}

impl FetchFault {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Descriptive text worth surfacing to a user, if the fault carries any.
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::Timeout => None,
            Self::Other { detail } if detail.is_empty() => None,
            fault => Some(fault.to_string()),
        }
    }
}

impl From<reqwest::Error> for FetchFault {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect {
                detail: err.to_string(),
            }
        } else if err.is_decode() {
            Self::Decode {
                detail: err.to_string(),
            }
        } else {
            Self::Other {
                detail: err.to_string(),
            }
        }
    }
}

fn code_for_status(status: reqwest::StatusCode) -> ErrorCode {
    use reqwest::StatusCode;
    match status {
        StatusCode::UNAUTHORIZED => ErrorCode::Unauthorized,
        StatusCode::FORBIDDEN => ErrorCode::Forbidden,
        StatusCode::NOT_FOUND => ErrorCode::NotFound,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ErrorCode::Validation,
        StatusCode::TOO_MANY_REQUESTS => ErrorCode::RateLimited,
        _ => ErrorCode::Internal,
    }
}

/// Classifies one raw remote-call result. A non-success status is a domain
/// error: parsed from the body when it carries an [`ApiError`], synthesized
/// from the status otherwise. Only failures beneath the response itself
/// (connect, timeout, malformed success body) become transport faults.
pub async fn classify_json<T: DeserializeOwned>(
    result: Result<reqwest::Response, reqwest::Error>,
) -> Outcome<T> {
    let response = match result {
        Ok(response) => response,
        Err(err) => return Outcome::TransportFault(err.into()),
    };

    let status = response.status();
    if !status.is_success() {
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => return Outcome::TransportFault(err.into()),
        };
        let error = serde_json::from_str::<ApiError>(&body).unwrap_or_else(|_| {
            let message = if body.trim().is_empty() {
                status.to_string()
            } else {
                body.trim().to_string()
            };
            ApiError::new(code_for_status(status), message)
        });
        return Outcome::DomainError(error);
    }

    match response.json::<T>().await {
        Ok(value) => Outcome::Success(value),
        Err(err) => Outcome::TransportFault(err.into()),
    }
}
