use sift_domain::{
	BuiltQuery, CaseStatus, DiscoveryProjection, DiscoveryQuery, DiscoveryTarget, ObjectScope,
	ObjectType, OpportunityStage, QueryBuildError, RetrievalStrategy, SearchFilters, SearchIntent,
	SearchPlan, StructuredQuery, TimeRange, filters, sanitize,
};

fn keywords(raw: &[&str]) -> Vec<String> {
	raw.iter().map(|keyword| keyword.to_string()).collect()
}

fn filter_variants() -> Vec<SearchFilters> {
	vec![
		SearchFilters { time_range: Some(TimeRange::Today), ..Default::default() },
		SearchFilters { time_range: Some(TimeRange::AllTime), ..Default::default() },
		SearchFilters { min_amount: Some(1.0), ..Default::default() },
		SearchFilters { max_amount: Some(1.0), ..Default::default() },
		SearchFilters { stage: Some(OpportunityStage::Lost), ..Default::default() },
		SearchFilters { status: Some(CaseStatus::Escalated), ..Default::default() },
	]
}

#[test]
fn selector_follows_intent_shape() {
	let with_keywords = keywords(&["motor"]);

	for filters in filter_variants() {
		assert!(!filters.is_empty());
		assert_eq!(RetrievalStrategy::select(&with_keywords, true), RetrievalStrategy::SoslThenSoql);

		let both = SearchIntent {
			keywords: with_keywords.clone(),
			filters: filters.clone(),
			..Default::default()
		};
		let only_filters = SearchIntent { filters, ..Default::default() };

		assert_eq!(SearchPlan::from_intent(&both).strategy, RetrievalStrategy::SoslThenSoql);
		assert_eq!(SearchPlan::from_intent(&only_filters).strategy, RetrievalStrategy::SoqlOnly);
	}

	let only_keywords = SearchIntent { keywords: with_keywords, ..Default::default() };

	assert_eq!(SearchPlan::from_intent(&only_keywords).strategy, RetrievalStrategy::SoslOnly);
	assert_eq!(
		SearchPlan::from_intent(&SearchIntent::default()).strategy,
		RetrievalStrategy::Default
	);
}

#[test]
fn sanitizing_twice_is_a_no_op() {
	let raw = keywords(&["  motor**  ", "a & b ~ c", "?", "big   deal%", "", "plain"]);
	let once = sanitize::sanitize_keywords(&raw);
	let twice = sanitize::sanitize_keywords(&once);

	assert_eq!(once, vec!["motor", "a b c", "big deal", "plain"]);
	assert_eq!(once, twice);
}

#[test]
fn empty_identifier_set_short_circuits() {
	let built = StructuredQuery::builder(ObjectType::Opportunity, 50)
		.restrict_to_ids(Vec::new())
		.predicates(vec!["Amount >= 25000".to_string()])
		.build();

	assert_eq!(built, BuiltQuery::NoMatchingRecords);
}

#[test]
fn discovery_rejects_empty_phrase() {
	let empty: Vec<String> = vec![" ".to_string()];
	let err = DiscoveryQuery::new(
		&empty,
		DiscoveryTarget::Object(ObjectType::Case),
		DiscoveryProjection::IdOnly,
	)
	.expect_err("Expected empty phrase to be rejected.");

	assert_eq!(err, QueryBuildError::EmptyKeywords);
}

#[test]
fn keyword_and_amount_scenario_builds_restricted_query() {
	let intent: SearchIntent = serde_json::from_value(serde_json::json!({
		"object_types": ["Opportunity"],
		"keywords": ["motor"],
		"min_amount": 25000,
	}))
	.expect("Failed to parse intent.");
	let plan = SearchPlan::from_intent(&intent);

	assert_eq!(plan.strategy, RetrievalStrategy::SoslThenSoql);
	assert_eq!(plan.object_types, vec![ObjectType::Opportunity]);

	let discovery = DiscoveryQuery::new(
		&plan.keywords,
		DiscoveryTarget::Object(ObjectType::Opportunity),
		DiscoveryProjection::IdOnly,
	)
	.expect("Failed to build discovery query.");

	assert_eq!(discovery.render(), "FIND {motor} RETURNING Opportunity(Id)");

	let built = StructuredQuery::builder(ObjectType::Opportunity, 50)
		.restrict_to_ids(keywords(&["a", "b", "c"]))
		.predicates(ObjectType::Opportunity.compile_filters(&intent.filters))
		.build();
	let BuiltQuery::Ready(query) = built else {
		panic!("Expected a ready query.");
	};
	let soql = query.render();

	assert!(
		soql.starts_with("SELECT Id, Name, StageName, Amount, CloseDate, IsWon, IsClosed, CreatedDate, Account.Name FROM Opportunity WHERE Id IN ('a','b','c') AND Amount >= 25000"),
		"Unexpected query: {soql}"
	);
	assert!(soql.ends_with("ORDER BY CreatedDate DESC LIMIT 50"), "Unexpected query: {soql}");
	assert!(!soql.contains("IN ()"));
}

#[test]
fn won_in_last_thirty_days_ands_both_clauses() {
	let intent: SearchIntent = serde_json::from_value(serde_json::json!({
		"stage": "won",
		"time_range": "last_30_days",
	}))
	.expect("Failed to parse intent.");

	assert_eq!(SearchPlan::from_intent(&intent).strategy, RetrievalStrategy::SoqlOnly);

	let predicates = filters::compile_opportunity(&intent.filters);

	assert_eq!(predicates, vec!["IsWon = true", "CreatedDate = LAST_N_DAYS:30"]);

	let BuiltQuery::Ready(query) = StructuredQuery::builder(ObjectType::Opportunity, 50)
		.predicates(predicates)
		.build()
	else {
		panic!("Expected a ready query.");
	};

	assert!(query.render().contains("WHERE IsWon = true AND CreatedDate = LAST_N_DAYS:30 ORDER BY"));
}

#[test]
fn lost_and_in_flight_stages_expand() {
	let lost = SearchFilters {
		stage: Some(OpportunityStage::Lost),
		time_range: Some(TimeRange::AllTime),
		..Default::default()
	};
	let open = SearchFilters {
		stage: Some(OpportunityStage::InFlight),
		time_range: Some(TimeRange::Last90Days),
		..Default::default()
	};

	assert_eq!(filters::compile_opportunity(&lost), vec!["IsWon = false AND IsClosed = true"]);
	assert_eq!(
		filters::compile_opportunity(&open),
		vec![
			"IsClosed = false AND StageName NOT IN ('Closed Won', 'Closed Lost')",
			"CreatedDate = LAST_N_DAYS:90",
		]
	);
}

#[test]
fn families_ignore_filters_they_do_not_own() {
	let filters = SearchFilters {
		min_amount: Some(10.0),
		status: Some(CaseStatus::Open),
		time_range: Some(TimeRange::AllTime),
		..Default::default()
	};

	assert_eq!(ObjectType::Case.compile_filters(&filters), vec!["IsClosed = false"]);
	assert!(ObjectType::Account.compile_filters(&filters).is_empty());
	assert!(ObjectType::Contact.compile_filters(&filters).is_empty());
	assert_eq!(ObjectType::Opportunity.compile_filters(&filters), vec!["Amount >= 10"]);
}

#[test]
fn default_query_has_no_where_clause() {
	let BuiltQuery::Ready(query) = StructuredQuery::builder(ObjectType::Case, 20).build() else {
		panic!("Expected a ready query.");
	};

	assert_eq!(
		query.render(),
		"SELECT Id, CaseNumber, Subject, Status, Priority, CreatedDate, Account.Name FROM Case ORDER BY CreatedDate DESC LIMIT 20"
	);
}

#[test]
fn cross_object_discovery_projects_display_fields() {
	let query = DiscoveryQuery::new(
		&keywords(&["acme"]),
		DiscoveryTarget::All,
		DiscoveryProjection::Display { limit: 20 },
	)
	.expect("Failed to build discovery query.");

	assert_eq!(
		query.render(),
		"FIND {acme} RETURNING Case(Id, CaseNumber, Subject, Status LIMIT 20), Account(Id, Name, Type, Industry LIMIT 20), Opportunity(Id, Name, StageName, Amount LIMIT 20), Contact(Id, Name, Title, Email LIMIT 20)"
	);
}

#[test]
fn object_scope_accepts_all_single_and_lists() {
	let parse = |value: serde_json::Value| -> ObjectScope {
		let intent: SearchIntent = serde_json::from_value(serde_json::json!({ "object_types": value }))
			.expect("Failed to parse intent.");

		intent.object_types
	};

	assert_eq!(parse(serde_json::json!("all")), ObjectScope::All);
	assert_eq!(parse(serde_json::json!("deals")), ObjectScope::Only(vec![ObjectType::Opportunity]));
	assert_eq!(
		parse(serde_json::json!(["Case", "contacts", "unknown", "case"])).types(),
		vec![ObjectType::Case, ObjectType::Contact]
	);
	assert_eq!(parse(serde_json::json!(["unknown"])), ObjectScope::All);
	assert_eq!(parse(serde_json::Value::Null), ObjectScope::All);
}

#[test]
fn amounts_accept_strings() {
	let intent: SearchIntent = serde_json::from_value(serde_json::json!({
		"min_amount": "$25k",
		"max_amount": "not a number",
		"keywords": "motor",
	}))
	.expect("Failed to parse intent.");

	assert_eq!(intent.filters.min_amount, Some(25_000.0));
	assert_eq!(intent.filters.max_amount, None);
	assert_eq!(intent.keywords, vec!["motor"]);
}

#[test]
fn deep_analysis_accepts_loose_flags() {
	let parse = |raw: serde_json::Value| -> SearchIntent {
		serde_json::from_value(raw).expect("Failed to parse intent.")
	};
	let intent = parse(serde_json::json!({ "deep_analysis": "true", "stage": "won" }));

	assert!(intent.deep_analysis);
	assert_eq!(intent.filters.stage, Some(OpportunityStage::Won));
	assert!(parse(serde_json::json!({ "deep_analysis": "Yes" })).deep_analysis);
	assert!(parse(serde_json::json!({ "deep_analysis": 1 })).deep_analysis);
	assert!(!parse(serde_json::json!({ "deep_analysis": "maybe" })).deep_analysis);
	assert!(!parse(serde_json::json!({ "deep_analysis": null })).deep_analysis);
	assert!(!parse(serde_json::json!({})).deep_analysis);
}
