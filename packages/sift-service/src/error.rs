pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Whole-request failures. Per-query backend failures are reported in the response instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("No CRM session is stored for team {team_id}.")]
	SessionMissing { team_id: String },
	#[error("Transport unavailable: {message}")]
	Transport { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Session store error: {message}")]
	SessionStore { message: String },
}
impl From<sift_providers::Error> for Error {
	fn from(err: sift_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
