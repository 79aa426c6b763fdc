use filing_core::constants::{FORBIDDEN_CODE, UNAUTHORIZED_CODE};
use filing_core::FilingError;

/// Broad category of a failed call, used by error-stage middleware.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// Missing or expired login (HTTP 401 or envelope code 401).
    Unauthorized,
    /// Logged in but not permitted (HTTP 403 or envelope code 403).
    Forbidden,
    NotFound,
    /// Any other 4xx response.
    BadRequest,
    /// 5xx response.
    Server,
    /// HTTP success with a failed envelope.
    Business,
    /// No response received.
    Network,
    Timeout,
    /// Response body did not match the expected shape.
    Decode,
    /// Rejected locally before sending.
    InvalidInput,
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid request: {0}")]
    InvalidInput(String),
    #[error("request timed out: {0}")]
    Timeout(reqwest::Error),
    #[error("request failed: {0}")]
    Transport(reqwest::Error),
    #[error("server responded {status}: {message}")]
    Http { status: u16, message: String },
    #[error("api error {code}: {message}")]
    Business { code: i32, message: String },
    #[error("response carried no data")]
    MissingData,
    #[error("failed to decode response: {0}")]
    Decode(serde_json::Error),
    #[error("session error: {0}")]
    Session(#[from] FilingError),
    #[error("failed to write download: {0}")]
    DownloadWrite(std::io::Error),
}

impl ClientError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidInput(_) | Self::Session(_) | Self::DownloadWrite(_) => {
                ErrorClass::InvalidInput
            }
            Self::Timeout(_) => ErrorClass::Timeout,
            Self::Transport(_) => ErrorClass::Network,
            Self::Http { status, .. } => match *status {
                401 => ErrorClass::Unauthorized,
                403 => ErrorClass::Forbidden,
                404 => ErrorClass::NotFound,
                s if s >= 500 => ErrorClass::Server,
                _ => ErrorClass::BadRequest,
            },
            Self::Business { code, .. } => match *code {
                UNAUTHORIZED_CODE => ErrorClass::Unauthorized,
                FORBIDDEN_CODE => ErrorClass::Forbidden,
                _ => ErrorClass::Business,
            },
            Self::MissingData | Self::Decode(_) => ErrorClass::Decode,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.class() == ErrorClass::Unauthorized
    }

    pub(crate) fn from_send(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e)
        } else {
            Self::Transport(e)
        }
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_http_statuses() {
        let http = |status| ClientError::Http {
            status,
            message: String::new(),
        };
        assert_eq!(http(401).class(), ErrorClass::Unauthorized);
        assert_eq!(http(403).class(), ErrorClass::Forbidden);
        assert_eq!(http(404).class(), ErrorClass::NotFound);
        assert_eq!(http(400).class(), ErrorClass::BadRequest);
        assert_eq!(http(502).class(), ErrorClass::Server);
    }

    #[test]
    fn classifies_envelope_codes() {
        let business = |code| ClientError::Business {
            code,
            message: "x".into(),
        };
        assert!(business(401).is_unauthorized());
        assert_eq!(business(403).class(), ErrorClass::Forbidden);
        assert_eq!(business(500).class(), ErrorClass::Business);
    }
}
