use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong between a form submission and a rendered verdict.
/// None of these are fatal, the user can always resubmit.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Cannot connect to API at {url}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Request timed out. The API may be waking up - try again.")]
    Timeout { url: String },
    #[error("API Error: {detail}")]
    Remote { status: StatusCode, detail: String },
    #[error("Unexpected response from API")]
    Decode(#[source] reqwest::Error),
    #[error("Couldn't send request")]
    Request(#[source] reqwest::Error),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}
#[derive(Debug, Error, PartialEq, Clone)]
pub enum ValidationError {
    #[error("Category is required")]
    MissingCategory,
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl ClientError {
    /// Sorts a transport error into the taxonomy. Timeouts are checked first
    /// since a connect timeout also reports as a connect error. A body cut off
    /// mid-read is a bad response, not a failed send.
    pub fn from_reqwest(e: reqwest::Error, url: &str) -> Self {
        if e.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else if e.is_connect() {
            Self::Connection {
                url: url.to_string(),
                source: e,
            }
        } else if e.is_decode() || e.is_body() {
            Self::Decode(e)
        } else {
            Self::Request(e)
        }
    }
    /// Follow up advice shown below the error message.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Connection { .. } => Some("The API may be sleeping. Try again in 30 seconds."),
            _ => None,
        }
    }
    pub fn is_cold_start(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Connection { .. })
    }
}
