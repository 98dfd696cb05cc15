//! CRM REST transport: discovery runs through the `search` resource, structured
//! queries through the `query` resource.

use std::time::Duration;

use reqwest::{Client, Response, Url};
use serde_json::Value;

use crate::{Error, Result};

const MAX_ERROR_BODY_CHARS: usize = 512;

/// One discovery hit: identifier, backend type tag, and whatever fields were projected.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRecord {
	pub id: String,
	pub object_type: String,
	pub record: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryPage {
	pub records: Vec<Value>,
	pub total_size: u64,
}

pub async fn search(
	cfg: &sift_config::Backend,
	instance_url: &str,
	access_token: &str,
	sosl: &str,
) -> Result<Vec<SearchRecord>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = endpoint(instance_url, &cfg.api_version, "search")?;
	let res = client.get(url).bearer_auth(access_token).query(&[("q", sosl)]).send().await?;
	let json = read_json(res).await?;

	parse_search_response(json)
}

pub async fn query(
	cfg: &sift_config::Backend,
	instance_url: &str,
	access_token: &str,
	soql: &str,
) -> Result<QueryPage> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = endpoint(instance_url, &cfg.api_version, "query")?;
	let res = client.get(url).bearer_auth(access_token).query(&[("q", soql)]).send().await?;
	let json = read_json(res).await?;

	parse_query_response(json)
}

/// Checks that an instance URL can host a transport at all.
pub fn validate_instance_url(instance_url: &str) -> Result<Url> {
	let url = Url::parse(instance_url.trim()).map_err(|err| Error::InvalidConfig {
		message: format!("Instance URL {instance_url:?} is not a valid URL: {err}."),
	})?;

	if !matches!(url.scheme(), "https" | "http") || url.host_str().is_none() {
		return Err(Error::InvalidConfig {
			message: format!("Instance URL {instance_url:?} must be an http(s) origin."),
		});
	}

	Ok(url)
}

pub fn endpoint(instance_url: &str, api_version: &str, resource: &str) -> Result<Url> {
	let base = validate_instance_url(instance_url)?;
	let path = format!("/services/data/{api_version}/{resource}/");

	base.join(&path).map_err(|err| Error::InvalidConfig {
		message: format!("Failed to build {resource} endpoint: {err}."),
	})
}

/// Maps a non-success response onto the error taxonomy.
pub fn classify_error(status: u16, body: &str) -> Error {
	let parsed: Option<Value> = serde_json::from_str(body).ok();
	let first = parsed.as_ref().and_then(|json| match json {
		Value::Array(items) => items.first(),
		Value::Object(_) => Some(json),
		_ => None,
	});
	let code = first
		.and_then(|item| item.get("errorCode").or_else(|| item.get("error")))
		.and_then(Value::as_str)
		.unwrap_or_default();
	let message = first
		.and_then(|item| item.get("message").or_else(|| item.get("error_description")))
		.and_then(Value::as_str)
		.map(str::to_string)
		.unwrap_or_else(|| body.chars().take(MAX_ERROR_BODY_CHARS).collect());

	match (status, code) {
		(_, "INVALID_SESSION_ID") | (401, _) => Error::SessionInvalid { message },
		(_, "REQUEST_LIMIT_EXCEEDED") | (429, _) => Error::RateLimited { message },
		(
			_,
			"MALFORMED_QUERY" | "MALFORMED_SEARCH" | "INVALID_FIELD" | "INVALID_TYPE"
			| "INVALID_QUERY_FILTER_OPERATOR",
		)
		| (400, _) => Error::MalformedQuery { message },
		(_, "NOT_FOUND") | (404, _) => Error::NotFound { message },
		_ => Error::Backend { status, message },
	}
}

async fn read_json(res: Response) -> Result<Value> {
	let status = res.status();

	if status.is_success() {
		return Ok(res.json().await?);
	}

	let body = res.text().await.unwrap_or_default();

	Err(classify_error(status.as_u16(), &body))
}

fn parse_search_response(json: Value) -> Result<Vec<SearchRecord>> {
	let items = match json {
		Value::Object(mut obj) => match obj.remove("searchRecords") {
			Some(Value::Array(items)) => items,
			_ =>
				return Err(Error::InvalidResponse {
					message: "Search response is missing searchRecords array.".to_string(),
				}),
		},
		Value::Array(items) => items,
		_ =>
			return Err(Error::InvalidResponse {
				message: "Search response must be an object or array.".to_string(),
			}),
	};
	let mut hits = Vec::with_capacity(items.len());

	for record in items {
		let object_type = record
			.get("attributes")
			.and_then(|attrs| attrs.get("type"))
			.and_then(Value::as_str)
			.map(str::to_string);
		let id = record.get("Id").and_then(Value::as_str).map(str::to_string);
		let (Some(id), Some(object_type)) = (id, object_type) else {
			tracing::debug!("Skipping search record without Id or type tag.");

			continue;
		};

		hits.push(SearchRecord { id, object_type, record });
	}

	Ok(hits)
}

fn parse_query_response(json: Value) -> Result<QueryPage> {
	let total_size = json.get("totalSize").and_then(Value::as_u64);
	let records = json
		.get("records")
		.and_then(Value::as_array)
		.cloned()
		.ok_or_else(|| Error::InvalidResponse {
			message: "Query response is missing records array.".to_string(),
		})?;

	Ok(QueryPage { total_size: total_size.unwrap_or(records.len() as u64), records })
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_search_records_with_type_tags() {
		let json = serde_json::json!({
			"searchRecords": [
				{ "attributes": { "type": "Opportunity" }, "Id": "006A" },
				{ "attributes": { "type": "Account" }, "Id": "001B", "Name": "Acme" },
				{ "attributes": { "type": "Account" } }
			]
		});
		let hits = parse_search_response(json).expect("parse failed");

		assert_eq!(hits.len(), 2);
		assert_eq!(hits[0].id, "006A");
		assert_eq!(hits[1].object_type, "Account");
		assert_eq!(hits[1].record.get("Name").and_then(Value::as_str), Some("Acme"));
	}

	#[test]
	fn accepts_legacy_array_search_shape() {
		let json = serde_json::json!([{ "attributes": { "type": "Case" }, "Id": "500C" }]);
		let hits = parse_search_response(json).expect("parse failed");

		assert_eq!(hits[0].object_type, "Case");
	}

	#[test]
	fn parses_query_page() {
		let json = serde_json::json!({
			"totalSize": 7,
			"done": true,
			"records": [{ "Id": "006A" }]
		});
		let page = parse_query_response(json).expect("parse failed");

		assert_eq!(page.total_size, 7);
		assert_eq!(page.records.len(), 1);
	}
}
