use serde::{Deserialize, Serialize};

use crate::{filters, intent::SearchFilters};

/// Record families the engine can query.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum ObjectType {
	Case,
	Account,
	Opportunity,
	Contact,
}
impl ObjectType {
	pub const ALL: [Self; 4] = [Self::Case, Self::Account, Self::Opportunity, Self::Contact];

	pub fn spec(self) -> &'static ObjectSpec {
		&OBJECT_SPECS[self as usize]
	}

	/// Backend object name, as used in `FROM` and `RETURNING` clauses.
	pub fn api_name(self) -> &'static str {
		self.spec().api_name
	}

	/// Lower-cased plural key of the result bucket.
	pub fn bucket(self) -> &'static str {
		self.spec().bucket
	}

	pub fn fields(self) -> &'static [&'static str] {
		self.spec().fields
	}

	pub fn display_fields(self) -> &'static [&'static str] {
		&self.spec().fields[..DISPLAY_FIELD_COUNT]
	}

	pub fn compile_filters(self, filters: &SearchFilters) -> Vec<String> {
		(self.spec().compile)(filters)
	}

	/// Resolves a backend type tag such as `Opportunity`.
	pub fn from_api_name(raw: &str) -> Option<Self> {
		OBJECT_SPECS.iter().find(|spec| spec.api_name == raw).map(|spec| spec.object_type)
	}

	/// Resolves a user-facing name: case-insensitive, singular or plural, plus aliases.
	pub fn parse(raw: &str) -> Option<Self> {
		let needle = raw.trim().to_ascii_lowercase();

		if needle.is_empty() {
			return None;
		}

		OBJECT_SPECS
			.iter()
			.find(|spec| {
				spec.api_name.eq_ignore_ascii_case(&needle)
					|| spec.bucket == needle
					|| spec.aliases.contains(&needle.as_str())
			})
			.map(|spec| spec.object_type)
	}
}

pub struct ObjectSpec {
	pub object_type: ObjectType,
	pub api_name: &'static str,
	pub bucket: &'static str,
	pub aliases: &'static [&'static str],
	pub fields: &'static [&'static str],
	pub compile: fn(&SearchFilters) -> Vec<String>,
}

const DISPLAY_FIELD_COUNT: usize = 4;

// Indexed by `ObjectType as usize`.
static OBJECT_SPECS: [ObjectSpec; 4] = [
	ObjectSpec {
		object_type: ObjectType::Case,
		api_name: "Case",
		bucket: "cases",
		aliases: &["ticket", "tickets", "support_ticket"],
		fields: &[
			"Id",
			"CaseNumber",
			"Subject",
			"Status",
			"Priority",
			"CreatedDate",
			"Account.Name",
		],
		compile: filters::compile_case,
	},
	ObjectSpec {
		object_type: ObjectType::Account,
		api_name: "Account",
		bucket: "accounts",
		aliases: &["company", "companies", "customer", "customers"],
		fields: &["Id", "Name", "Type", "Industry", "Rating", "AnnualRevenue", "CreatedDate"],
		compile: filters::compile_account,
	},
	ObjectSpec {
		object_type: ObjectType::Opportunity,
		api_name: "Opportunity",
		bucket: "opportunities",
		aliases: &["deal", "deals", "opp", "opps"],
		fields: &[
			"Id",
			"Name",
			"StageName",
			"Amount",
			"CloseDate",
			"IsWon",
			"IsClosed",
			"CreatedDate",
			"Account.Name",
		],
		compile: filters::compile_opportunity,
	},
	ObjectSpec {
		object_type: ObjectType::Contact,
		api_name: "Contact",
		bucket: "contacts",
		aliases: &["person", "people"],
		fields: &["Id", "Name", "Title", "Email", "Phone", "CreatedDate", "Account.Name"],
		compile: filters::compile_contact,
	},
];

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn table_is_indexed_by_discriminant() {
		for object_type in ObjectType::ALL {
			assert_eq!(object_type.spec().object_type, object_type);
		}
	}

	#[test]
	fn parses_names_and_aliases() {
		assert_eq!(ObjectType::parse("Opportunities"), Some(ObjectType::Opportunity));
		assert_eq!(ObjectType::parse("ticket"), Some(ObjectType::Case));
		assert_eq!(ObjectType::parse(" contact "), Some(ObjectType::Contact));
		assert_eq!(ObjectType::parse("lead"), None);
		assert_eq!(ObjectType::from_api_name("Account"), Some(ObjectType::Account));
		assert_eq!(ObjectType::from_api_name("account"), None);
	}
}
