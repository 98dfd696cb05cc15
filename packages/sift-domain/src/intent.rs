use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::object_type::ObjectType;

/// Structured search parameters produced by the planner, immutable per call.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SearchIntent {
	#[serde(default)]
	pub object_types: ObjectScope,
	#[serde(default, deserialize_with = "keywords")]
	pub keywords: Vec<String>,
	#[serde(flatten)]
	pub filters: SearchFilters,
	#[serde(default, deserialize_with = "flag")]
	pub deep_analysis: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ObjectScope {
	#[default]
	All,
	Only(Vec<ObjectType>),
}
impl ObjectScope {
	/// Requested types in request order, without repeats.
	pub fn types(&self) -> Vec<ObjectType> {
		match self {
			Self::All => ObjectType::ALL.to_vec(),
			Self::Only(types) => {
				let mut out = Vec::with_capacity(types.len());

				for object_type in types {
					if !out.contains(object_type) {
						out.push(*object_type);
					}
				}

				out
			},
		}
	}
}
impl Serialize for ObjectScope {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		match self {
			Self::All => serializer.serialize_str("all"),
			Self::Only(types) => types.serialize(serializer),
		}
	}
}
impl<'de> Deserialize<'de> for ObjectScope {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = Option::<Value>::deserialize(deserializer)?;
		let names: Vec<&str> = match raw.as_ref() {
			Some(Value::String(name)) => vec![name.as_str()],
			Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
			_ => Vec::new(),
		};

		if names.iter().any(|name| name.trim().eq_ignore_ascii_case("all")) {
			return Ok(Self::All);
		}

		let types: Vec<ObjectType> = names.into_iter().filter_map(ObjectType::parse).collect();

		if types.is_empty() { Ok(Self::All) } else { Ok(Self::Only(types)) }
	}
}

/// Generic filter set; each object family compiles the subset it understands.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SearchFilters {
	#[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
	pub time_range: Option<TimeRange>,
	#[serde(default, deserialize_with = "amount", skip_serializing_if = "Option::is_none")]
	pub min_amount: Option<f64>,
	#[serde(default, deserialize_with = "amount", skip_serializing_if = "Option::is_none")]
	pub max_amount: Option<f64>,
	#[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
	pub stage: Option<OpportunityStage>,
	#[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
	pub status: Option<CaseStatus>,
	#[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
	pub priority: Option<CasePriority>,
	#[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
	pub account_type: Option<AccountType>,
	#[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
	pub health: Option<AccountHealth>,
	#[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
	pub contact_role: Option<ContactRole>,
}
impl SearchFilters {
	/// True when no structured filter dimension is present.
	pub fn is_empty(&self) -> bool {
		self.time_range.is_none()
			&& self.min_amount.is_none()
			&& self.max_amount.is_none()
			&& self.stage.is_none()
			&& self.status.is_none()
			&& self.priority.is_none()
			&& self.account_type.is_none()
			&& self.health.is_none()
			&& self.contact_role.is_none()
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum TimeRange {
	#[serde(rename = "today")]
	Today,
	#[serde(rename = "yesterday")]
	Yesterday,
	#[serde(rename = "this_week")]
	ThisWeek,
	#[serde(rename = "this_month")]
	ThisMonth,
	#[serde(rename = "last_30_days")]
	Last30Days,
	#[serde(rename = "last_90_days")]
	Last90Days,
	#[serde(rename = "last_6_months")]
	Last6Months,
	#[serde(rename = "all_time")]
	AllTime,
}
impl Lenient for TimeRange {
	fn parse(raw: &str) -> Option<Self> {
		match normalize_token(raw).as_str() {
			"today" => Some(Self::Today),
			"yesterday" => Some(Self::Yesterday),
			"this_week" => Some(Self::ThisWeek),
			"this_month" => Some(Self::ThisMonth),
			"last_30_days" => Some(Self::Last30Days),
			"last_90_days" => Some(Self::Last90Days),
			"last_6_months" => Some(Self::Last6Months),
			"all_time" => Some(Self::AllTime),
			_ => None,
		}
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityStage {
	Won,
	Lost,
	InFlight,
	Prospecting,
	Qualification,
	Proposal,
	Negotiation,
}
impl Lenient for OpportunityStage {
	fn parse(raw: &str) -> Option<Self> {
		match normalize_token(raw).as_str() {
			"won" | "closed_won" => Some(Self::Won),
			"lost" | "closed_lost" => Some(Self::Lost),
			"in_flight" | "open" | "active" | "in_progress" => Some(Self::InFlight),
			"prospecting" => Some(Self::Prospecting),
			"qualification" => Some(Self::Qualification),
			"proposal" => Some(Self::Proposal),
			"negotiation" => Some(Self::Negotiation),
			_ => None,
		}
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
	New,
	Working,
	Escalated,
	Open,
	Closed,
}
impl Lenient for CaseStatus {
	fn parse(raw: &str) -> Option<Self> {
		match normalize_token(raw).as_str() {
			"new" => Some(Self::New),
			"working" | "in_progress" => Some(Self::Working),
			"escalated" => Some(Self::Escalated),
			"open" | "unresolved" => Some(Self::Open),
			"closed" | "resolved" => Some(Self::Closed),
			_ => None,
		}
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CasePriority {
	High,
	Medium,
	Low,
}
impl Lenient for CasePriority {
	fn parse(raw: &str) -> Option<Self> {
		match normalize_token(raw).as_str() {
			"high" | "urgent" | "critical" => Some(Self::High),
			"medium" | "normal" => Some(Self::Medium),
			"low" => Some(Self::Low),
			_ => None,
		}
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
	Customer,
	Prospect,
	Partner,
	Competitor,
}
impl Lenient for AccountType {
	fn parse(raw: &str) -> Option<Self> {
		match normalize_token(raw).as_str() {
			"customer" | "customers" => Some(Self::Customer),
			"prospect" | "prospects" => Some(Self::Prospect),
			"partner" | "partners" => Some(Self::Partner),
			"competitor" | "competitors" => Some(Self::Competitor),
			_ => None,
		}
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountHealth {
	Healthy,
	Neutral,
	AtRisk,
}
impl Lenient for AccountHealth {
	fn parse(raw: &str) -> Option<Self> {
		match normalize_token(raw).as_str() {
			"healthy" | "good" => Some(Self::Healthy),
			"neutral" => Some(Self::Neutral),
			"at_risk" | "risk" | "unhealthy" => Some(Self::AtRisk),
			_ => None,
		}
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactRole {
	Executive,
	Director,
	Manager,
	Engineer,
}
impl Lenient for ContactRole {
	fn parse(raw: &str) -> Option<Self> {
		match normalize_token(raw).as_str() {
			"executive" | "exec" | "decision_maker" => Some(Self::Executive),
			"director" => Some(Self::Director),
			"manager" => Some(Self::Manager),
			"engineer" | "technical" => Some(Self::Engineer),
			_ => None,
		}
	}
}

/// Enum values parsed leniently: anything unrecognized is treated as absent.
pub trait Lenient
where
	Self: Sized,
{
	fn parse(raw: &str) -> Option<Self>;
}

/// Parses amounts such as `25000`, `"$25,000"`, `"25k"` or `"1.5m"`.
pub fn parse_amount(raw: &str) -> Option<f64> {
	let re = Regex::new(r"(?i)^\$?\s*([0-9][0-9,]*(?:\.[0-9]+)?)\s*([km])?$").ok()?;
	let captures = re.captures(raw.trim())?;
	let digits = captures.get(1)?.as_str().replace(',', "");
	let base: f64 = digits.parse().ok()?;
	let multiplier = match captures.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
		Some(suffix) if suffix == "k" => 1_000.0,
		Some(suffix) if suffix == "m" => 1_000_000.0,
		_ => 1.0,
	};

	Some(base * multiplier)
}

fn normalize_token(raw: &str) -> String {
	raw.trim().to_ascii_lowercase().replace([' ', '-'], "_")
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
	D: Deserializer<'de>,
	T: Lenient,
{
	let raw = Option::<Value>::deserialize(deserializer)?;

	Ok(raw.as_ref().and_then(Value::as_str).and_then(T::parse))
}

fn amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Option::<Value>::deserialize(deserializer)?;
	let parsed = match raw {
		Some(Value::Number(number)) => number.as_f64(),
		Some(Value::String(text)) => parse_amount(&text),
		_ => None,
	};

	Ok(parsed.filter(|value| value.is_finite() && *value >= 0.0))
}

fn keywords<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Option::<Value>::deserialize(deserializer)?;

	Ok(match raw {
		Some(Value::String(single)) => vec![single],
		Some(Value::Array(items)) =>
			items.into_iter().filter_map(|item| item.as_str().map(str::to_string)).collect(),
		_ => Vec::new(),
	})
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Option::<Value>::deserialize(deserializer)?;

	Ok(match raw {
		Some(Value::Bool(flag)) => flag,
		Some(Value::String(text)) =>
			matches!(normalize_token(&text).as_str(), "true" | "yes" | "1"),
		Some(Value::Number(number)) => number.as_f64() == Some(1.0),
		_ => false,
	})
}
