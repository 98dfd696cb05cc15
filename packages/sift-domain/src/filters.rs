//! Per-family filter compilers. Each turns the generic filter set into conjunctive
//! predicate clauses for the structured query language; all are pure.

use crate::intent::{
	AccountHealth, AccountType, CasePriority, CaseStatus, ContactRole, OpportunityStage,
	SearchFilters, TimeRange,
};

pub const DATE_FIELD: &str = "CreatedDate";
pub const DEFAULT_TIME_RANGE: TimeRange = TimeRange::Last30Days;

impl TimeRange {
	/// Relative-date literal for the window; `AllTime` has none.
	pub fn date_literal(self) -> Option<&'static str> {
		match self {
			Self::Today => Some("TODAY"),
			Self::Yesterday => Some("YESTERDAY"),
			Self::ThisWeek => Some("THIS_WEEK"),
			Self::ThisMonth => Some("THIS_MONTH"),
			Self::Last30Days => Some("LAST_N_DAYS:30"),
			Self::Last90Days => Some("LAST_N_DAYS:90"),
			Self::Last6Months => Some("LAST_N_MONTHS:6"),
			Self::AllTime => None,
		}
	}
}

/// Shared time-window clause. An absent window falls back to the trailing 30 days.
pub fn time_clause(range: Option<TimeRange>) -> Option<String> {
	range
		.unwrap_or(DEFAULT_TIME_RANGE)
		.date_literal()
		.map(|literal| format!("{DATE_FIELD} = {literal}"))
}

pub fn compile_case(filters: &SearchFilters) -> Vec<String> {
	let mut clauses = Vec::new();

	if let Some(status) = filters.status {
		clauses.push(
			match status {
				CaseStatus::New => "Status = 'New'",
				CaseStatus::Working => "Status = 'Working'",
				CaseStatus::Escalated => "Status = 'Escalated'",
				CaseStatus::Open => "IsClosed = false",
				CaseStatus::Closed => "IsClosed = true",
			}
			.to_string(),
		);
	}
	if let Some(priority) = filters.priority {
		clauses.push(
			match priority {
				CasePriority::High => "Priority = 'High'",
				CasePriority::Medium => "Priority = 'Medium'",
				CasePriority::Low => "Priority = 'Low'",
			}
			.to_string(),
		);
	}

	clauses.extend(time_clause(filters.time_range));

	clauses
}

pub fn compile_account(filters: &SearchFilters) -> Vec<String> {
	let mut clauses = Vec::new();

	if let Some(account_type) = filters.account_type {
		clauses.push(
			match account_type {
				AccountType::Customer => "Type LIKE 'Customer%'",
				AccountType::Prospect => "Type = 'Prospect'",
				AccountType::Partner => "Type = 'Partner'",
				AccountType::Competitor => "Type = 'Competitor'",
			}
			.to_string(),
		);
	}
	if let Some(health) = filters.health {
		clauses.push(
			match health {
				AccountHealth::Healthy => "Rating = 'Hot'",
				AccountHealth::Neutral => "Rating = 'Warm'",
				AccountHealth::AtRisk => "Rating = 'Cold'",
			}
			.to_string(),
		);
	}

	clauses.extend(time_clause(filters.time_range));

	clauses
}

pub fn compile_opportunity(filters: &SearchFilters) -> Vec<String> {
	let mut clauses = Vec::new();

	if let Some(stage) = filters.stage {
		clauses.push(
			match stage {
				OpportunityStage::Won => "IsWon = true",
				OpportunityStage::Lost => "IsWon = false AND IsClosed = true",
				OpportunityStage::InFlight =>
					"IsClosed = false AND StageName NOT IN ('Closed Won', 'Closed Lost')",
				OpportunityStage::Prospecting => "StageName = 'Prospecting'",
				OpportunityStage::Qualification => "StageName = 'Qualification'",
				OpportunityStage::Proposal => "StageName = 'Proposal/Price Quote'",
				OpportunityStage::Negotiation => "StageName = 'Negotiation/Review'",
			}
			.to_string(),
		);
	}
	if let Some(min) = filters.min_amount {
		clauses.push(format!("Amount >= {min}"));
	}
	if let Some(max) = filters.max_amount {
		clauses.push(format!("Amount <= {max}"));
	}

	clauses.extend(time_clause(filters.time_range));

	clauses
}

pub fn compile_contact(filters: &SearchFilters) -> Vec<String> {
	let mut clauses = Vec::new();

	if let Some(role) = filters.contact_role {
		clauses.push(
			match role {
				ContactRole::Executive =>
					"(Title LIKE '%Chief%' OR Title LIKE '%VP%' OR Title LIKE '%President%')",
				ContactRole::Director => "Title LIKE '%Director%'",
				ContactRole::Manager => "Title LIKE '%Manager%'",
				ContactRole::Engineer => "(Title LIKE '%Engineer%' OR Title LIKE '%Developer%')",
			}
			.to_string(),
		);
	}

	clauses.extend(time_clause(filters.time_range));

	clauses
}
