use std::collections::HashSet;

use futures::future;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
	Error, Result, SessionStore, SiftService,
	executor::{Executor, QueryFailure},
	merge::{ResultBuckets, ResultMerger},
};
use sift_domain::{
	BuiltQuery, DiscoveryProjection, DiscoveryQuery, DiscoveryTarget, ObjectType,
	RetrievalStrategy, SearchFilters, SearchIntent, SearchPlan, StructuredQuery,
};
use sift_providers::salesforce;

const INVALID_QUERY: &str = "invalid_query";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchRequest {
	pub team_id: String,
	#[serde(default)]
	pub intent: SearchIntent,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AskRequest {
	pub team_id: String,
	pub text: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchResponse {
	pub trace_id: Uuid,
	pub strategy: RetrievalStrategy,
	pub strategy_label: String,
	pub results: ResultBuckets,
	pub total_records: usize,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub analysis: Option<String>,
	#[serde(default)]
	pub query_errors: Vec<QueryError>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AskResponse {
	pub intent: SearchIntent,
	#[serde(flatten)]
	pub search: SearchResponse,
}

/// One failed backend call. Sibling queries of the same strategy still ran.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryError {
	#[serde(flatten)]
	pub target: QueryTarget,
	pub phase: QueryPhase,
	pub code: String,
	pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryTarget {
	ObjectType(ObjectType),
	Keyword(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryPhase {
	Discovery,
	Structured,
}

/// Records and failures from one object type or one keyword.
#[derive(Default)]
struct Outcome {
	records: Vec<(ObjectType, Vec<Value>)>,
	errors: Vec<QueryError>,
}
impl Outcome {
	fn failed(target: QueryTarget, phase: QueryPhase, failure: QueryFailure) -> Self {
		let error = QueryError { target, phase, code: failure.code, message: failure.message };

		Self { records: Vec::new(), errors: vec![error] }
	}

	fn records(object_type: ObjectType, records: Vec<Value>) -> Self {
		Self { records: vec![(object_type, records)], errors: Vec::new() }
	}
}

impl SiftService {
	pub async fn search(
		&self,
		sessions: &dyn SessionStore,
		req: SearchRequest,
	) -> Result<SearchResponse> {
		let team_id = req.team_id.trim();

		if team_id.is_empty() {
			return Err(Error::InvalidRequest { message: "team_id must be non-empty.".to_string() });
		}

		let session = sessions
			.load(team_id)
			.await?
			.ok_or_else(|| Error::SessionMissing { team_id: team_id.to_string() })?;

		salesforce::validate_instance_url(&session.instance_url)
			.map_err(|err| Error::Transport { message: err.to_string() })?;

		let trace_id = Uuid::new_v4();
		let intent = req.intent;
		let plan = SearchPlan::from_intent(&intent);

		tracing::info!(
			trace_id = %trace_id,
			team_id,
			strategy = plan.strategy.as_str(),
			keywords = plan.keywords.len(),
			object_types = plan.object_types.len(),
			"Search strategy selected."
		);

		let executor = Executor::new(
			&self.cfg.backend,
			&self.cfg.oauth,
			&self.providers,
			sessions,
			team_id,
			trace_id,
			session,
		);
		let mut merger = ResultMerger::new();
		let outcomes = match plan.strategy {
			RetrievalStrategy::SoslThenSoql => {
				for object_type in &plan.object_types {
					merger.ensure(*object_type);
				}

				future::join_all(plan.object_types.iter().map(|object_type| {
					self.discover_then_filter(&executor, *object_type, &plan.keywords, &intent.filters)
				}))
				.await
			},
			RetrievalStrategy::SoqlOnly => {
				for object_type in &plan.object_types {
					merger.ensure(*object_type);
				}

				future::join_all(plan.object_types.iter().map(|object_type| {
					self.filter_only(&executor, *object_type, &intent.filters)
				}))
				.await
			},
			RetrievalStrategy::SoslOnly => {
				for object_type in ObjectType::ALL {
					merger.ensure(object_type);
				}

				self.discover_across_objects(&executor, &plan.keywords).await
			},
			RetrievalStrategy::Default => {
				merger.ensure(ObjectType::Case);

				vec![self.recent_cases(&executor).await]
			},
		};
		let mut query_errors = Vec::new();

		for outcome in outcomes {
			for (object_type, records) in outcome.records {
				merger.extend(object_type, records);
			}

			query_errors.extend(outcome.errors);
		}

		let results = merger.finish();
		let total_records = results.total();
		let analysis = self.analyze(&intent, &results, trace_id).await;

		tracing::info!(
			trace_id = %trace_id,
			strategy = plan.strategy.as_str(),
			total_records,
			query_errors = query_errors.len(),
			analysis = analysis.is_some(),
			"Search completed."
		);

		Ok(SearchResponse {
			trace_id,
			strategy: plan.strategy,
			strategy_label: plan.strategy.label().to_string(),
			results,
			total_records,
			analysis,
			query_errors,
		})
	}

	/// Plans an intent from free text, then runs it.
	pub async fn ask(&self, sessions: &dyn SessionStore, req: AskRequest) -> Result<AskResponse> {
		let text = req.text.trim();

		if text.is_empty() {
			return Err(Error::InvalidRequest { message: "text must be non-empty.".to_string() });
		}

		let intent = self.providers.planner.plan(&self.cfg.providers.planner, text).await?;

		tracing::debug!(?intent, "Planned search intent.");

		let search =
			self.search(sessions, SearchRequest { team_id: req.team_id, intent: intent.clone() }).await?;

		Ok(AskResponse { intent, search })
	}

	async fn discover_then_filter(
		&self,
		executor: &Executor<'_>,
		object_type: ObjectType,
		keywords: &[String],
		filters: &SearchFilters,
	) -> Outcome {
		let trace_id = executor.trace_id();
		let target = QueryTarget::ObjectType(object_type);
		let discovery = match DiscoveryQuery::new(
			keywords,
			DiscoveryTarget::Object(object_type),
			DiscoveryProjection::IdOnly,
		) {
			Ok(discovery) => discovery,
			Err(err) => {
				let failure = QueryFailure { code: INVALID_QUERY.to_string(), message: err.to_string() };

				return Outcome::failed(target, QueryPhase::Discovery, failure);
			},
		};
		let hits = match executor.discover(&discovery.render()).await {
			Ok(hits) => hits,
			Err(failure) => {
				log_failure(trace_id, &target, QueryPhase::Discovery, &failure);

				return Outcome::failed(target, QueryPhase::Discovery, failure);
			},
		};
		let mut seen = HashSet::new();
		let mut ids = hits
			.into_iter()
			.filter(|hit| ObjectType::from_api_name(&hit.object_type) == Some(object_type))
			.map(|hit| hit.id)
			.filter(|id| seen.insert(id.clone()))
			.collect::<Vec<_>>();
		let max_ids = self.cfg.search.max_restriction_ids as usize;

		if ids.len() > max_ids {
			tracing::warn!(
				trace_id = %trace_id,
				object_type = object_type.api_name(),
				discovered = ids.len(),
				kept = max_ids,
				"Truncating discovery identifiers for the structured query."
			);

			ids.truncate(max_ids);
		}

		let built = StructuredQuery::builder(object_type, self.cfg.search.filtered_limit)
			.restrict_to_ids(ids)
			.predicates(object_type.compile_filters(filters))
			.build();

		match built {
			BuiltQuery::Ready(query) => self.structured(executor, query).await,
			BuiltQuery::NoMatchingRecords => {
				tracing::debug!(
					trace_id = %trace_id,
					object_type = object_type.api_name(),
					"Discovery found nothing; skipping structured query."
				);

				Outcome::default()
			},
		}
	}

	async fn filter_only(
		&self,
		executor: &Executor<'_>,
		object_type: ObjectType,
		filters: &SearchFilters,
	) -> Outcome {
		let built = StructuredQuery::builder(object_type, self.cfg.search.filtered_limit)
			.predicates(object_type.compile_filters(filters))
			.build();

		match built {
			BuiltQuery::Ready(query) => self.structured(executor, query).await,
			BuiltQuery::NoMatchingRecords => Outcome::default(),
		}
	}

	async fn discover_across_objects(
		&self,
		executor: &Executor<'_>,
		keywords: &[String],
	) -> Vec<Outcome> {
		let trace_id = executor.trace_id();
		let projection = DiscoveryProjection::Display { limit: self.cfg.search.fallback_limit };
		let max_keywords = self.cfg.search.max_discovery_keywords as usize;
		let mut outcomes = Vec::with_capacity(keywords.len().min(max_keywords));

		// Sequential so that first-seen order follows keyword order.
		for keyword in keywords.iter().take(max_keywords) {
			let target = QueryTarget::Keyword(keyword.clone());
			let discovery = match DiscoveryQuery::new(&[keyword], DiscoveryTarget::All, projection)
			{
				Ok(discovery) => discovery,
				Err(err) => {
					let failure =
						QueryFailure { code: INVALID_QUERY.to_string(), message: err.to_string() };

					outcomes.push(Outcome::failed(target, QueryPhase::Discovery, failure));

					continue;
				},
			};

			match executor.discover(&discovery.render()).await {
				Ok(hits) => {
					let mut outcome = Outcome::default();

					for hit in hits {
						let Some(object_type) = ObjectType::from_api_name(&hit.object_type) else {
							tracing::debug!(
								trace_id = %trace_id,
								object_type = hit.object_type.as_str(),
								"Dropping discovery hit of an unknown type."
							);

							continue;
						};

						outcome.records.push((object_type, vec![hit.record]));
					}

					outcomes.push(outcome);
				},
				Err(failure) => {
					log_failure(trace_id, &target, QueryPhase::Discovery, &failure);
					outcomes.push(Outcome::failed(target, QueryPhase::Discovery, failure));
				},
			}
		}

		outcomes
	}

	async fn recent_cases(&self, executor: &Executor<'_>) -> Outcome {
		match StructuredQuery::builder(ObjectType::Case, self.cfg.search.fallback_limit).build() {
			BuiltQuery::Ready(query) => self.structured(executor, query).await,
			BuiltQuery::NoMatchingRecords => Outcome::default(),
		}
	}

	async fn structured(&self, executor: &Executor<'_>, query: StructuredQuery) -> Outcome {
		let object_type = query.object_type();

		match executor.query(&query.render()).await {
			Ok(page) => Outcome::records(object_type, page.records),
			Err(failure) => {
				let target = QueryTarget::ObjectType(object_type);

				log_failure(executor.trace_id(), &target, QueryPhase::Structured, &failure);

				Outcome::failed(target, QueryPhase::Structured, failure)
			},
		}
	}
}

fn log_failure(trace_id: Uuid, target: &QueryTarget, phase: QueryPhase, failure: &QueryFailure) {
	tracing::warn!(
		trace_id = %trace_id,
		target = ?target,
		phase = ?phase,
		code = failure.code.as_str(),
		message = failure.message.as_str(),
		"Backend query failed."
	);
}
