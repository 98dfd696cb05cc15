pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Session is invalid or expired: {message}")]
	SessionInvalid { message: String },
	#[error("Malformed query: {message}")]
	MalformedQuery { message: String },
	#[error("Rate limit exhausted: {message}")]
	RateLimited { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Backend call timed out.")]
	Timeout,
	#[error("Backend returned HTTP {status}: {message}")]
	Backend { status: u16, message: String },
	#[error(transparent)]
	Network(reqwest::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error(transparent)]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error("{message}")]
	InvalidConfig { message: String },
	#[error("{message}")]
	InvalidResponse { message: String },
}
impl Error {
	pub fn is_session_invalid(&self) -> bool {
		matches!(self, Self::SessionInvalid { .. })
	}

	/// Stable identifier reported alongside per-query failures.
	pub fn code(&self) -> &'static str {
		match self {
			Self::SessionInvalid { .. } => "session_invalid",
			Self::MalformedQuery { .. } => "malformed_query",
			Self::RateLimited { .. } => "rate_limited",
			Self::NotFound { .. } => "not_found",
			Self::Timeout => "timeout",
			Self::Backend { .. } => "backend_error",
			Self::Network(_) => "network",
			Self::SerdeJson(_) | Self::InvalidResponse { .. } => "invalid_response",
			Self::InvalidHeaderName(_) | Self::InvalidHeaderValue(_) | Self::InvalidConfig { .. } =>
				"invalid_config",
		}
	}
}

impl From<reqwest::Error> for Error {
	fn from(err: reqwest::Error) -> Self {
		if err.is_timeout() { Self::Timeout } else { Self::Network(err) }
	}
}
