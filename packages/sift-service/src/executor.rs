//! Runs single backend calls with one refresh-and-retry on an expired session.

use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{BoxFuture, CrmTransport, Providers, Session, SessionStore};
use sift_config::{Backend, OAuth};
use sift_providers::salesforce::{QueryPage, SearchRecord};

pub(crate) const REFRESH_FAILED: &str = "refresh_failed";

/// A failed backend call as reported back to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct QueryFailure {
	pub code: String,
	pub message: String,
}
impl From<sift_providers::Error> for QueryFailure {
	fn from(err: sift_providers::Error) -> Self {
		Self { code: err.code().to_string(), message: err.to_string() }
	}
}

pub(crate) trait BackendCall
where
	Self: Sync,
{
	type Output: Send;

	fn send<'a>(
		&'a self,
		transport: &'a dyn CrmTransport,
		cfg: &'a Backend,
		session: &'a Session,
	) -> BoxFuture<'a, sift_providers::Result<Self::Output>>;
}

pub(crate) struct Discover<'q>(pub &'q str);
impl BackendCall for Discover<'_> {
	type Output = Vec<SearchRecord>;

	fn send<'a>(
		&'a self,
		transport: &'a dyn CrmTransport,
		cfg: &'a Backend,
		session: &'a Session,
	) -> BoxFuture<'a, sift_providers::Result<Self::Output>> {
		transport.discover(cfg, session, self.0)
	}
}

pub(crate) struct Query<'q>(pub &'q str);
impl BackendCall for Query<'_> {
	type Output = QueryPage;

	fn send<'a>(
		&'a self,
		transport: &'a dyn CrmTransport,
		cfg: &'a Backend,
		session: &'a Session,
	) -> BoxFuture<'a, sift_providers::Result<Self::Output>> {
		transport.query(cfg, session, self.0)
	}
}

struct SessionState {
	session: Session,
	/// Set once a refresh for the current token failed, so sibling queries do not retry it.
	refresh_error: Option<QueryFailure>,
}

/// Per-request executor. Sibling queries share the session, so one refresh serves all of them.
pub(crate) struct Executor<'a> {
	backend: &'a Backend,
	oauth: &'a OAuth,
	providers: &'a Providers,
	sessions: &'a dyn SessionStore,
	team_id: &'a str,
	trace_id: Uuid,
	state: Mutex<SessionState>,
}
impl<'a> Executor<'a> {
	pub(crate) fn new(
		backend: &'a Backend,
		oauth: &'a OAuth,
		providers: &'a Providers,
		sessions: &'a dyn SessionStore,
		team_id: &'a str,
		trace_id: Uuid,
		session: Session,
	) -> Self {
		Self {
			backend,
			oauth,
			providers,
			sessions,
			team_id,
			trace_id,
			state: Mutex::new(SessionState { session, refresh_error: None }),
		}
	}

	pub(crate) fn trace_id(&self) -> Uuid {
		self.trace_id
	}

	pub(crate) async fn discover(&self, sosl: &str) -> Result<Vec<SearchRecord>, QueryFailure> {
		tracing::debug!(trace_id = %self.trace_id, sosl, "Running discovery query.");

		self.run(&Discover(sosl)).await
	}

	pub(crate) async fn query(&self, soql: &str) -> Result<QueryPage, QueryFailure> {
		tracing::debug!(trace_id = %self.trace_id, soql, "Running structured query.");

		self.run(&Query(soql)).await
	}

	pub(crate) async fn run<C>(&self, call: &C) -> Result<C::Output, QueryFailure>
	where
		C: BackendCall,
	{
		let session = self.current().await;
		let transport = self.providers.transport.as_ref();

		match call.send(transport, self.backend, &session).await {
			Err(err) if err.is_session_invalid() => {
				tracing::warn!(
					trace_id = %self.trace_id,
					team_id = self.team_id,
					error = %err,
					"Backend reported an invalid session."
				);
			},
			other => return other.map_err(QueryFailure::from),
		}

		let session = self.refreshed(&session.access_token).await?;

		call.send(transport, self.backend, &session).await.map_err(QueryFailure::from)
	}

	async fn current(&self) -> Session {
		self.state.lock().await.session.clone()
	}

	/// Returns a session whose token differs from `stale_token`, refreshing at most once.
	async fn refreshed(&self, stale_token: &str) -> Result<Session, QueryFailure> {
		let mut state = self.state.lock().await;

		if state.session.access_token != stale_token {
			return Ok(state.session.clone());
		}
		if let Some(failure) = state.refresh_error.as_ref() {
			return Err(failure.clone());
		}

		let Some(refresh_token) = state.session.refresh_token.clone() else {
			let failure = QueryFailure {
				code: REFRESH_FAILED.to_string(),
				message: "Session expired and no refresh token is stored.".to_string(),
			};

			state.refresh_error = Some(failure.clone());

			return Err(failure);
		};

		match self.providers.refresher.refresh(self.oauth, &refresh_token).await {
			Ok(token) => {
				state.session.access_token = token.access_token;

				if let Some(instance_url) = token.instance_url {
					state.session.instance_url = instance_url;
				}

				state.session.refreshed_at = Some(OffsetDateTime::now_utc());

				tracing::info!(
					trace_id = %self.trace_id,
					team_id = self.team_id,
					"Session refreshed."
				);

				if let Err(err) = self.sessions.save(self.team_id, &state.session).await {
					tracing::warn!(
						trace_id = %self.trace_id,
						team_id = self.team_id,
						error = %err,
						"Failed to persist refreshed session."
					);
				}

				Ok(state.session.clone())
			},
			Err(err) => {
				tracing::warn!(
					trace_id = %self.trace_id,
					team_id = self.team_id,
					error = %err,
					"Session refresh failed."
				);

				let failure = QueryFailure {
					code: REFRESH_FAILED.to_string(),
					message: format!("Session refresh failed: {err}"),
				};

				state.refresh_error = Some(failure.clone());

				Err(failure)
			},
		}
	}
}
