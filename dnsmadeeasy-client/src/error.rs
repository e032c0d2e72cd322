use serde::{Deserialize, Serialize};

use crate::domain::DomainNameError;

/// Unified error type for all DNSMadeEasy client operations.
///
/// All variants are serializable for structured error reporting.
///
/// # Retried errors
///
/// Only rate limiting is retried, and only inside the transport pipeline.
/// A [`RateLimited`](Self::RateLimited) error reaching the caller means the
/// retry budget is already spent (or the request was refused before it was
/// sent). Every other variant surfaces on the first occurrence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ClientError {
    /// A domain name failed validation.
    InvalidDomainName {
        /// The rejected input.
        name: String,
        /// Human-readable diagnostic pinpointing the problem.
        detail: String,
    },

    /// A call parameter violated the operation's contract.
    InvalidArgument {
        /// Name of the offending parameter.
        param: String,
        /// Error details.
        detail: String,
    },

    /// The API rate limit was exceeded.
    RateLimited {
        /// Number of retries spent before giving up.
        retries: u32,
        /// Error details.
        detail: String,
    },

    /// The server rejected the request signature because the local clock
    /// is too far from the server clock.
    ClockSkew {
        /// The signed request date sent by the client.
        request_date: String,
        /// The `Date` header returned by the server.
        server_date: String,
    },

    /// The API key or secret key was rejected.
    InvalidCredentials {
        /// Original response body, if available.
        raw_message: Option<String>,
    },

    /// The requested resource does not exist.
    NotFound {
        /// Original response body, if available.
        raw_message: Option<String>,
    },

    /// The server reported a single application error.
    Remote {
        /// Message reported by the server.
        message: String,
    },

    /// The server reported several application errors at once.
    AggregateRemote {
        /// Messages reported by the server, in order.
        messages: Vec<String>,
    },

    /// The request failed and the server's error could not be interpreted.
    UnparseableFailure {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The server referenced state the client cannot reconcile.
    ///
    /// This indicates a broken invariant on the server side rather than a
    /// routine failure.
    Consistency {
        /// Error details.
        detail: String,
    },

    /// A network-level error occurred (DNS resolution failure, connection refused, etc.).
    NetworkError {
        /// Error details.
        detail: String,
    },

    /// The request timed out.
    Timeout {
        /// Error details.
        detail: String,
    },

    /// Failed to parse the API response.
    ParseError {
        /// Details about the parse failure.
        detail: String,
    },

    /// Failed to serialize a request body.
    SerializationError {
        /// Details about the serialization failure.
        detail: String,
    },

    /// The operation was cancelled by the caller.
    Cancelled,
}

impl ClientError {
    /// 是否为预期行为（用户输入、资源不存在等），用于日志分级。
    ///
    /// 返回 `true` 时应使用 `warn` 级别，`false` 时使用 `error` 级别。
    /// **新增变体时请同步更新此方法。**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::InvalidDomainName { .. }
                | Self::InvalidArgument { .. }
                | Self::RateLimited { .. }
                | Self::InvalidCredentials { .. }
                | Self::NotFound { .. }
                | Self::Remote { .. }
                | Self::AggregateRemote { .. }
                | Self::Cancelled
        )
    }

    pub(crate) fn invalid_argument(param: &str, detail: impl Into<String>) -> Self {
        Self::InvalidArgument {
            param: param.to_string(),
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDomainName { name, detail } => {
                write!(f, "Invalid domain name '{name}': {detail}")
            }
            Self::InvalidArgument { param, detail } => {
                write!(f, "Invalid argument '{param}': {detail}")
            }
            Self::RateLimited { detail, .. } => write!(f, "{detail}"),
            Self::ClockSkew {
                request_date,
                server_date,
            } => write!(
                f,
                "Clock skew detected: request signed at '{request_date}', server time '{server_date}'"
            ),
            Self::InvalidCredentials { .. } => write!(f, "The given credentials were invalid"),
            Self::NotFound { .. } => write!(f, "The requested resource could not be found"),
            Self::Remote { message } => write!(f, "{message}"),
            Self::AggregateRemote { messages } => write!(
                f,
                "There were multiple errors with your request: {}",
                messages.join("; ")
            ),
            Self::UnparseableFailure { status, .. } => write!(
                f,
                "The request failed (HTTP {status}), but the error could not be parsed"
            ),
            Self::Consistency { detail } => write!(f, "Consistency error: {detail}"),
            Self::NetworkError { detail } => write!(f, "Network error: {detail}"),
            Self::Timeout { detail } => write!(f, "Request timeout: {detail}"),
            Self::ParseError { detail } => write!(f, "Parse error: {detail}"),
            Self::SerializationError { detail } => write!(f, "Serialization error: {detail}"),
            Self::Cancelled => write!(f, "Operation cancelled"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<DomainNameError> for ClientError {
    fn from(e: DomainNameError) -> Self {
        match e {
            DomainNameError::Invalid { name, detail } => Self::InvalidDomainName { name, detail },
            DomainNameError::TooLong { ref name } => Self::InvalidDomainName {
                name: name.clone(),
                detail: e.to_string(),
            },
            DomainNameError::Argument { param, detail } => Self::InvalidArgument {
                param: param.to_string(),
                detail,
            },
        }
    }
}

/// Convenience type alias for `Result<T, ClientError>`.
pub type Result<T> = std::result::Result<T, ClientError>;
