use std::{collections::HashMap, sync::RwLock};

use serde::Deserialize;
use time::OffsetDateTime;

use crate::{BoxFuture, Error, Result};
use sift_providers::salesforce;

/// Plaintext CRM credentials for one team, already decrypted by the caller.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Session {
	pub access_token: String,
	pub instance_url: String,
	#[serde(default)]
	pub refresh_token: Option<String>,
	#[serde(skip)]
	pub refreshed_at: Option<OffsetDateTime>,
}
impl Session {
	pub fn new(
		access_token: impl Into<String>,
		instance_url: impl Into<String>,
		refresh_token: Option<String>,
	) -> Self {
		Self {
			access_token: access_token.into(),
			instance_url: instance_url.into(),
			refresh_token,
			refreshed_at: None,
		}
	}

	/// Trims caller input and checks that the instance URL can host a transport.
	pub fn normalized(self) -> Result<Self> {
		let access_token = self.access_token.trim().to_string();
		let instance_url = self.instance_url.trim().trim_end_matches('/').to_string();
		let refresh_token = self
			.refresh_token
			.map(|token| token.trim().to_string())
			.filter(|token| !token.is_empty());

		if access_token.is_empty() {
			return Err(Error::InvalidRequest {
				message: "access_token must be non-empty.".to_string(),
			});
		}

		salesforce::validate_instance_url(&instance_url)
			.map_err(|err| Error::InvalidRequest { message: err.to_string() })?;

		Ok(Self { access_token, instance_url, refresh_token, refreshed_at: self.refreshed_at })
	}
}
impl From<&sift_config::TeamSession> for Session {
	fn from(team: &sift_config::TeamSession) -> Self {
		let refresh_token = team
			.refresh_token
			.as_deref()
			.map(str::trim)
			.filter(|token| !token.is_empty())
			.map(str::to_string);

		Self::new(
			team.access_token.trim(),
			team.instance_url.trim().trim_end_matches('/'),
			refresh_token,
		)
	}
}

/// Caller-owned session storage. The engine loads a session per call and writes back
/// refreshed tokens; lifetime and expiry policy belong to the implementation.
pub trait SessionStore
where
	Self: Send + Sync,
{
	fn load<'a>(&'a self, team_id: &'a str) -> BoxFuture<'a, Result<Option<Session>>>;

	fn save<'a>(&'a self, team_id: &'a str, session: &'a Session) -> BoxFuture<'a, Result<()>>;

	fn remove<'a>(&'a self, team_id: &'a str) -> BoxFuture<'a, Result<bool>>;
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
	sessions: RwLock<HashMap<String, Session>>,
}
impl MemorySessionStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_config(teams: &[sift_config::TeamSession]) -> Self {
		let sessions = teams
			.iter()
			.map(|team| (team.team_id.trim().to_string(), Session::from(team)))
			.collect();

		Self { sessions: RwLock::new(sessions) }
	}

	pub fn insert(&self, team_id: impl Into<String>, session: Session) {
		let mut sessions = self.sessions.write().unwrap_or_else(|err| err.into_inner());

		sessions.insert(team_id.into(), session);
	}

	pub fn get(&self, team_id: &str) -> Option<Session> {
		let sessions = self.sessions.read().unwrap_or_else(|err| err.into_inner());

		sessions.get(team_id).cloned()
	}

	pub fn len(&self) -> usize {
		self.sessions.read().unwrap_or_else(|err| err.into_inner()).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
impl SessionStore for MemorySessionStore {
	fn load<'a>(&'a self, team_id: &'a str) -> BoxFuture<'a, Result<Option<Session>>> {
		let session = self.get(team_id);

		Box::pin(async move { Ok(session) })
	}

	fn save<'a>(&'a self, team_id: &'a str, session: &'a Session) -> BoxFuture<'a, Result<()>> {
		self.insert(team_id, session.clone());

		Box::pin(async { Ok(()) })
	}

	fn remove<'a>(&'a self, team_id: &'a str) -> BoxFuture<'a, Result<bool>> {
		let removed = {
			let mut sessions = self.sessions.write().unwrap_or_else(|err| err.into_inner());

			sessions.remove(team_id).is_some()
		};

		Box::pin(async move { Ok(removed) })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn normalizes_caller_sessions() {
		let session = Session::new(" token ", "https://acme.my.salesforce.com/", Some(" ".to_string()))
			.normalized()
			.expect("normalize failed");

		assert_eq!(session.access_token, "token");
		assert_eq!(session.instance_url, "https://acme.my.salesforce.com");
		assert_eq!(session.refresh_token, None);
	}

	#[test]
	fn rejects_sessions_without_a_usable_origin() {
		let err = Session::new("token", "acme", None).normalized().expect_err("expected rejection");

		assert!(matches!(err, Error::InvalidRequest { .. }));
	}

	#[test]
	fn seeded_sessions_are_trimmed() {
		let store = MemorySessionStore::from_config(&[sift_config::TeamSession {
			team_id: " T1 ".to_string(),
			access_token: " 00Dxx!token ".to_string(),
			instance_url: " https://acme.my.salesforce.com/ ".to_string(),
			refresh_token: Some(" ".to_string()),
		}]);
		let session = store.get("T1").expect("seeded session missing");

		assert_eq!(session.access_token, "00Dxx!token");
		assert_eq!(session.instance_url, "https://acme.my.salesforce.com");
		assert_eq!(session.refresh_token, None);
	}

	#[tokio::test]
	async fn memory_store_round_trips_sessions() {
		let store = MemorySessionStore::new();
		let session = Session::new("token", "https://acme.my.salesforce.com", None);

		store.save("T1", &session).await.expect("save failed");

		assert_eq!(store.load("T1").await.expect("load failed"), Some(session));
		assert!(store.remove("T1").await.expect("remove failed"));
		assert!(!store.remove("T1").await.expect("remove failed"));
	}
}
