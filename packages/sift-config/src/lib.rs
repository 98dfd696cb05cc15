mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Backend, Config, LlmProviderConfig, OAuth, Providers, Search, Service, TeamSession,
};

use std::{collections::HashSet, fs, path::Path};

/// Upper bound the backend accepts for a single `LIMIT` clause.
pub const MAX_QUERY_LIMIT: u32 = 2_000;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if !cfg.backend.api_version.starts_with('v') || cfg.backend.api_version.len() < 2 {
		return Err(Error::Validation {
			message: "backend.api_version must look like v59.0.".to_string(),
		});
	}
	if cfg.backend.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "backend.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.oauth.token_url.trim().is_empty() {
		return Err(Error::Validation {
			message: "oauth.token_url must be non-empty.".to_string(),
		});
	}
	if cfg.oauth.client_id.trim().is_empty() {
		return Err(Error::Validation {
			message: "oauth.client_id must be non-empty.".to_string(),
		});
	}
	if cfg.oauth.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "oauth.timeout_ms must be greater than zero.".to_string(),
		});
	}

	for (label, provider) in
		[("planner", &cfg.providers.planner), ("summarizer", &cfg.providers.summarizer)]
	{
		if provider.api_key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
		if provider.timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("providers.{label}.timeout_ms must be greater than zero."),
			});
		}
		if !provider.temperature.is_finite() {
			return Err(Error::Validation {
				message: format!("providers.{label}.temperature must be a finite number."),
			});
		}
	}

	for (label, limit) in [
		("search.filtered_limit", cfg.search.filtered_limit),
		("search.fallback_limit", cfg.search.fallback_limit),
	] {
		if limit == 0 || limit > MAX_QUERY_LIMIT {
			return Err(Error::Validation {
				message: format!("{label} must be in the range 1-{MAX_QUERY_LIMIT}."),
			});
		}
	}

	if cfg.search.max_discovery_keywords == 0 {
		return Err(Error::Validation {
			message: "search.max_discovery_keywords must be greater than zero.".to_string(),
		});
	}
	if cfg.search.max_restriction_ids == 0 {
		return Err(Error::Validation {
			message: "search.max_restriction_ids must be greater than zero.".to_string(),
		});
	}

	let mut team_ids = HashSet::new();

	for team in &cfg.teams {
		for (label, value) in [
			("teams.team_id", &team.team_id),
			("teams.access_token", &team.access_token),
			("teams.instance_url", &team.instance_url),
		] {
			if value.trim().is_empty() {
				return Err(Error::Validation { message: format!("{label} must be non-empty.") });
			}
		}

		if !team_ids.insert(team.team_id.as_str()) {
			return Err(Error::DuplicateTeam { team_id: team.team_id.clone() });
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.backend.api_version = cfg.backend.api_version.trim().to_string();

	for team in &mut cfg.teams {
		team.team_id = team.team_id.trim().to_string();
		team.access_token = team.access_token.trim().to_string();
		team.instance_url = team.instance_url.trim().trim_end_matches('/').to_string();
		team.refresh_token = team
			.refresh_token
			.take()
			.map(|token| token.trim().to_string())
			.filter(|token| !token.is_empty());
	}
}
