use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

const SYSTEM_PROMPT: &str = "You are a sales operations analyst. Summarize the CRM records \
	returned for the user's search. Call out totals, notable amounts, stages, owners of risk, \
	and any follow-ups worth doing. Be concise and do not invent records.";

/// Asks the summarization model for an analysis of the merged results.
pub async fn summarize(
	cfg: &sift_config::LlmProviderConfig,
	intent: &Value,
	results: &Value,
) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let user = serde_json::json!({ "search": intent, "results": results });
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": [
			{ "role": "system", "content": SYSTEM_PROMPT },
			{ "role": "user", "content": serde_json::to_string(&user)? },
		],
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_summary_response(&json)
}

fn parse_summary_response(json: &Value) -> Result<String> {
	crate::completion_content(json)
		.map(str::trim)
		.filter(|content| !content.is_empty())
		.map(str::to_string)
		.ok_or_else(|| Error::InvalidResponse {
			message: "Summary response is missing message content.".to_string(),
		})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn extracts_trimmed_content() {
		let json = serde_json::json!({
			"choices": [{ "message": { "content": "  Three won deals.\n" } }]
		});

		assert_eq!(parse_summary_response(&json).expect("parse failed"), "Three won deals.");
	}

	#[test]
	fn rejects_blank_content() {
		let json = serde_json::json!({ "choices": [{ "message": { "content": " " } }] });

		assert!(parse_summary_response(&json).is_err());
	}
}
