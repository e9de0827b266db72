/// Classification of a failed repository listing request.
///
/// Used for diagnostics only: a failed poll is never retried early, the next
/// timer tick simply issues a new request.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Anonymous rate limit exhausted (429, or 403 with a rate limit message)
    RateLimit(String),
    /// Other 4xx responses, e.g. unknown account
    Client { status: u16, message: String },
    /// 5xx responses
    Server { status: u16, message: String },
    /// Connection, TLS or timeout failures
    Transport(String),
    /// The body was not JSON, or a list element did not decode as a repository
    Parse(String),
    /// Anything octocrab reports that does not fit the categories above
    Other(String),
}

impl FetchError {
    /// Convert octocrab error to the matching category
    pub fn from_octocrab_error(error: octocrab::Error) -> Self {
        tracing::debug!("Raw octocrab error: {:?}", error);

        let result = match &error {
            octocrab::Error::GitHub { source, .. } => {
                let status = source.status_code.as_u16();
                let message = source.message.clone();

                match status {
                    429 => Self::RateLimit(message),
                    403 if message.contains("rate limit") => Self::RateLimit(message),
                    400..=499 => Self::Client { status, message },
                    500..=599 => Self::Server { status, message },
                    _ => Self::Other(format!("Unexpected status {}: {}", status, message)),
                }
            }
            octocrab::Error::Http { .. } => Self::Transport(format!("HTTP layer error: {}", error)),
            octocrab::Error::Hyper { .. } => {
                Self::Transport(format!("Hyper HTTP error: {}", error))
            }
            octocrab::Error::Json { .. } => Self::Parse(format!("JSON parsing error: {}", error)),
            octocrab::Error::Uri { .. } => Self::Other(format!("URI parsing error: {}", error)),
            _ => Self::Other(format!("Unknown error type: {}", error)),
        };

        tracing::debug!("Error classification result: {:?}", result);
        result
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit(msg) => write!(f, "Rate limit error: {}", msg),
            Self::Client { status, message } => {
                write!(f, "Client error ({}): {}", status, message)
            }
            Self::Server { status, message } => {
                write!(f, "Server error ({}): {}", status, message)
            }
            Self::Transport(msg) => write!(f, "Transport error: {}", msg),
            Self::Parse(msg) => write!(f, "Parse error: {}", msg),
            Self::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            FetchError::Client {
                status: 404,
                message: "Not Found".to_string()
            }
            .to_string(),
            "Client error (404): Not Found"
        );
        assert_eq!(
            FetchError::RateLimit("API rate limit exceeded".to_string()).to_string(),
            "Rate limit error: API rate limit exceeded"
        );
    }
}
