use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub backend: Backend,
	pub oauth: OAuth,
	pub providers: Providers,
	#[serde(default)]
	pub search: Search,
	/// Optional. Sessions seeded into the in-memory store at startup.
	#[serde(default)]
	pub teams: Vec<TeamSession>,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Backend {
	/// REST API version segment, e.g. "v59.0".
	pub api_version: String,
	pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct OAuth {
	pub token_url: String,
	pub client_id: String,
	pub client_secret: String,
	pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub planner: LlmProviderConfig,
	pub summarizer: LlmProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Search {
	/// Cap for structured queries that carry filters or an identifier restriction.
	pub filtered_limit: u32,
	/// Cap for keyword-only discovery projections and the default recent-cases query.
	pub fallback_limit: u32,
	pub max_discovery_keywords: u32,
	pub max_restriction_ids: u32,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			filtered_limit: 50,
			fallback_limit: 20,
			max_discovery_keywords: 3,
			max_restriction_ids: 200,
		}
	}
}

#[derive(Debug, Deserialize)]
pub struct TeamSession {
	pub team_id: String,
	pub access_token: String,
	pub instance_url: String,
	pub refresh_token: Option<String>,
}
