use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

const MAX_ATTEMPTS: usize = 3;
const SYSTEM_PROMPT: &str = r#"Translate the user's CRM search request into JSON with these keys:
"object_types": "all" or a list drawn from Case, Account, Opportunity, Contact;
"keywords": list of free-text terms (names, products), empty when none;
"time_range": one of today, yesterday, this_week, this_month, last_30_days, last_90_days, last_6_months, all_time;
"min_amount" / "max_amount": numbers for opportunity amounts;
"stage": won, lost, in_flight, prospecting, qualification, proposal, negotiation;
"status": new, working, escalated, open, closed;
"priority": high, medium, low;
"account_type": customer, prospect, partner, competitor;
"health": healthy, neutral, at_risk;
"contact_role": executive, director, manager, engineer;
"deep_analysis": true when the user asks for analysis, trends, or a summary.
Omit keys that do not apply. Reply with the JSON object only."#;

/// Turns free text into a search intent object. The caller owns schema validation.
pub async fn plan(cfg: &sift_config::LlmProviderConfig, text: &str) -> Result<Value> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);

	for attempt in 1..=MAX_ATTEMPTS {
		let body = serde_json::json!({
			"model": cfg.model,
			"temperature": cfg.temperature,
			"response_format": { "type": "json_object" },
			"messages": [
				{ "role": "system", "content": SYSTEM_PROMPT },
				{ "role": "user", "content": text },
			],
		});
		let res = client
			.post(&url)
			.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
			.json(&body)
			.send()
			.await?;
		let json: Value = res.error_for_status()?.json().await?;

		match parse_plan_json(&json) {
			Ok(parsed) => return Ok(parsed),
			Err(err) => tracing::warn!(attempt, error = %err, "Planner returned unusable JSON."),
		}
	}

	Err(Error::InvalidResponse { message: "Planner response is not valid JSON.".to_string() })
}

fn parse_plan_json(json: &Value) -> Result<Value> {
	let content = crate::completion_content(json).ok_or_else(|| Error::InvalidResponse {
		message: "Planner response is missing message content.".to_string(),
	})?;
	let trimmed = content
		.trim()
		.trim_start_matches("```json")
		.trim_start_matches("```")
		.trim_end_matches("```")
		.trim();
	let parsed: Value = serde_json::from_str(trimmed).map_err(|_| Error::InvalidResponse {
		message: "Planner content is not valid JSON.".to_string(),
	})?;

	if !parsed.is_object() {
		return Err(Error::InvalidResponse {
			message: "Planner content must be a JSON object.".to_string(),
		});
	}

	Ok(parsed)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_choice_content_json() {
		let json = serde_json::json!({
			"choices": [
				{ "message": { "content": "{\"keywords\": [\"motor\"], \"stage\": \"won\"}" } }
			]
		});
		let parsed = parse_plan_json(&json).expect("parse failed");

		assert_eq!(parsed.get("stage").and_then(Value::as_str), Some("won"));
	}

	#[test]
	fn strips_code_fences() {
		let json = serde_json::json!({
			"choices": [{ "message": { "content": "```json\n{\"keywords\": []}\n```" } }]
		});

		assert!(parse_plan_json(&json).is_ok());
	}

	#[test]
	fn rejects_non_object_content() {
		let json = serde_json::json!({ "choices": [{ "message": { "content": "[1, 2]" } }] });

		assert!(parse_plan_json(&json).is_err());
	}
}
