pub mod analysis;
pub mod merge;
pub mod search;
pub mod session;

mod error;
mod executor;

pub use analysis::ANALYSIS_FALLBACK;
pub use error::{Error, Result};
pub use merge::{ResultBuckets, ResultMerger};
pub use search::{
	AskRequest, AskResponse, QueryError, QueryPhase, QueryTarget, SearchRequest, SearchResponse,
};
pub use session::{MemorySessionStore, Session, SessionStore};

use std::{future::Future, pin::Pin, sync::Arc};

use sift_config::{Backend, Config, LlmProviderConfig, OAuth};
use sift_domain::SearchIntent;
use sift_providers::{
	oauth::{self, RefreshedToken},
	planner,
	salesforce::{self, QueryPage, SearchRecord},
	summarizer,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Backend transport. Implementations bound every call by a timeout and report an
/// expired token as `sift_providers::Error::SessionInvalid`.
pub trait CrmTransport
where
	Self: Send + Sync,
{
	fn discover<'a>(
		&'a self,
		cfg: &'a Backend,
		session: &'a Session,
		sosl: &'a str,
	) -> BoxFuture<'a, sift_providers::Result<Vec<SearchRecord>>>;

	fn query<'a>(
		&'a self,
		cfg: &'a Backend,
		session: &'a Session,
		soql: &'a str,
	) -> BoxFuture<'a, sift_providers::Result<QueryPage>>;
}

pub trait CredentialRefresher
where
	Self: Send + Sync,
{
	fn refresh<'a>(
		&'a self,
		cfg: &'a OAuth,
		refresh_token: &'a str,
	) -> BoxFuture<'a, sift_providers::Result<RefreshedToken>>;
}

pub trait Summarizer
where
	Self: Send + Sync,
{
	fn summarize<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		buckets: &'a ResultBuckets,
		intent: &'a SearchIntent,
	) -> BoxFuture<'a, sift_providers::Result<String>>;
}

pub trait Planner
where
	Self: Send + Sync,
{
	fn plan<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, sift_providers::Result<SearchIntent>>;
}

#[derive(Clone)]
pub struct Providers {
	pub transport: Arc<dyn CrmTransport>,
	pub refresher: Arc<dyn CredentialRefresher>,
	pub summarizer: Arc<dyn Summarizer>,
	pub planner: Arc<dyn Planner>,
}
impl Providers {
	pub fn new(
		transport: Arc<dyn CrmTransport>,
		refresher: Arc<dyn CredentialRefresher>,
		summarizer: Arc<dyn Summarizer>,
		planner: Arc<dyn Planner>,
	) -> Self {
		Self { transport, refresher, summarizer, planner }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self {
			transport: provider.clone(),
			refresher: provider.clone(),
			summarizer: provider.clone(),
			planner: provider,
		}
	}
}

pub struct SiftService {
	pub cfg: Config,
	pub providers: Providers,
}
impl SiftService {
	pub fn new(cfg: Config) -> Self {
		Self { cfg, providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Self {
		Self { cfg, providers }
	}
}

struct DefaultProviders;
impl CrmTransport for DefaultProviders {
	fn discover<'a>(
		&'a self,
		cfg: &'a Backend,
		session: &'a Session,
		sosl: &'a str,
	) -> BoxFuture<'a, sift_providers::Result<Vec<SearchRecord>>> {
		Box::pin(salesforce::search(cfg, &session.instance_url, &session.access_token, sosl))
	}

	fn query<'a>(
		&'a self,
		cfg: &'a Backend,
		session: &'a Session,
		soql: &'a str,
	) -> BoxFuture<'a, sift_providers::Result<QueryPage>> {
		Box::pin(salesforce::query(cfg, &session.instance_url, &session.access_token, soql))
	}
}

impl CredentialRefresher for DefaultProviders {
	fn refresh<'a>(
		&'a self,
		cfg: &'a OAuth,
		refresh_token: &'a str,
	) -> BoxFuture<'a, sift_providers::Result<RefreshedToken>> {
		Box::pin(oauth::refresh(cfg, refresh_token))
	}
}

impl Summarizer for DefaultProviders {
	fn summarize<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		buckets: &'a ResultBuckets,
		intent: &'a SearchIntent,
	) -> BoxFuture<'a, sift_providers::Result<String>> {
		Box::pin(async move {
			let intent = serde_json::to_value(intent)?;
			let results = serde_json::to_value(buckets)?;

			summarizer::summarize(cfg, &intent, &results).await
		})
	}
}

impl Planner for DefaultProviders {
	fn plan<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, sift_providers::Result<SearchIntent>> {
		Box::pin(async move {
			let raw = planner::plan(cfg, text).await?;

			Ok(serde_json::from_value(raw)?)
		})
	}
}
