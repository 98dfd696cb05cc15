use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result, salesforce};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshedToken {
	pub access_token: String,
	/// Present when the provider moved the org to a different instance.
	pub instance_url: Option<String>,
}

/// Exchanges a refresh token for a new access token.
pub async fn refresh(cfg: &sift_config::OAuth, refresh_token: &str) -> Result<RefreshedToken> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let form = [
		("grant_type", "refresh_token"),
		("client_id", cfg.client_id.as_str()),
		("client_secret", cfg.client_secret.as_str()),
		("refresh_token", refresh_token),
	];
	let res = client.post(&cfg.token_url).form(&form).send().await?;
	let status = res.status();

	if !status.is_success() {
		let body = res.text().await.unwrap_or_default();

		return Err(match salesforce::classify_error(status.as_u16(), &body) {
			// A rejected grant is not a session problem of the query being retried.
			Error::SessionInvalid { message } | Error::MalformedQuery { message } =>
				Error::Backend { status: status.as_u16(), message },
			other => other,
		});
	}

	let json: Value = res.json().await?;

	parse_refresh_response(json)
}

fn parse_refresh_response(json: Value) -> Result<RefreshedToken> {
	let access_token = json
		.get("access_token")
		.and_then(Value::as_str)
		.filter(|token| !token.trim().is_empty())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Token response is missing access_token.".to_string(),
		})?
		.to_string();
	let instance_url = json
		.get("instance_url")
		.and_then(Value::as_str)
		.map(|url| url.trim_end_matches('/').to_string())
		.filter(|url| !url.is_empty());

	Ok(RefreshedToken { access_token, instance_url })
}
