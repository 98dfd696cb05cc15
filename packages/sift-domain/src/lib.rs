pub mod filters;
pub mod intent;
pub mod object_type;
pub mod query;
pub mod sanitize;
pub mod strategy;

pub use intent::{
	AccountHealth, AccountType, CasePriority, CaseStatus, ContactRole, ObjectScope,
	OpportunityStage, SearchFilters, SearchIntent, TimeRange,
};
pub use object_type::ObjectType;
pub use query::{
	BuiltQuery, DiscoveryProjection, DiscoveryQuery, DiscoveryTarget, QueryBuildError,
	StructuredQuery,
};
pub use strategy::{RetrievalStrategy, SearchPlan};
