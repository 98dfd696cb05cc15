use std::sync::Arc;

use sift_service::{MemorySessionStore, SiftService};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<SiftService>,
	pub sessions: Arc<MemorySessionStore>,
}
impl AppState {
	/// Seeds the in-memory session store from the `[[teams]]` config entries.
	pub fn new(config: sift_config::Config) -> Self {
		let sessions = MemorySessionStore::from_config(&config.teams);

		Self::with_service(SiftService::new(config), sessions)
	}

	pub fn with_service(service: SiftService, sessions: MemorySessionStore) -> Self {
		Self { service: Arc::new(service), sessions: Arc::new(sessions) }
	}
}
