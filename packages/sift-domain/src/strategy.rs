use serde::{Deserialize, Serialize};

use crate::{intent::SearchIntent, object_type::ObjectType, sanitize};

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalStrategy {
	/// Keyword discovery per object type, then a filtered query restricted to the hits.
	SoslThenSoql,
	/// Filtered query per object type.
	SoqlOnly,
	/// One cross-object discovery query per keyword.
	SoslOnly,
	/// Most recent cases, no filters.
	Default,
}
impl RetrievalStrategy {
	/// First match wins; `keywords` must already be sanitized.
	pub fn select(keywords: &[String], has_filters: bool) -> Self {
		match (!keywords.is_empty(), has_filters) {
			(true, true) => Self::SoslThenSoql,
			(false, true) => Self::SoqlOnly,
			(true, false) => Self::SoslOnly,
			(false, false) => Self::Default,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::SoslThenSoql => "sosl_then_soql",
			Self::SoqlOnly => "soql_only",
			Self::SoslOnly => "sosl_only",
			Self::Default => "default",
		}
	}

	/// Human-readable summary of what ran.
	pub fn label(self) -> &'static str {
		match self {
			Self::SoslThenSoql => "SOSL keyword discovery, then SOQL filters on the matches",
			Self::SoqlOnly => "SOQL filters only",
			Self::SoslOnly => "SOSL keyword search across all objects",
			Self::Default => "Default: most recent cases",
		}
	}

	pub fn uses_discovery(self) -> bool {
		matches!(self, Self::SoslThenSoql | Self::SoslOnly)
	}
}

/// The strategy decision plus the normalized inputs it was made from.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchPlan {
	pub strategy: RetrievalStrategy,
	pub keywords: Vec<String>,
	pub object_types: Vec<ObjectType>,
}
impl SearchPlan {
	pub fn from_intent(intent: &SearchIntent) -> Self {
		let keywords = sanitize::sanitize_keywords(&intent.keywords);
		let strategy = RetrievalStrategy::select(&keywords, !intent.filters.is_empty());

		Self { strategy, keywords, object_types: intent.object_types.types() }
	}
}
