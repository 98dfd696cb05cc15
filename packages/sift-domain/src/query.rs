//! Query values for the two backend sublanguages. Builders keep a structured
//! representation and only render to a string at the execution boundary.

use crate::object_type::ObjectType;

pub const ORDER_BY: &str = "CreatedDate DESC";

// Reserved inside a discovery phrase; the sanitizer already removes `& % * ? ~`.
const DISCOVERY_ESCAPED: [char; 15] =
	['\\', '|', '!', '{', '}', '[', ']', '(', ')', '^', ':', '"', '\'', '+', '-'];

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum QueryBuildError {
	#[error("Discovery queries require at least one non-empty keyword.")]
	EmptyKeywords,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiscoveryTarget {
	Object(ObjectType),
	All,
}
impl DiscoveryTarget {
	pub fn object_types(self) -> Vec<ObjectType> {
		match self {
			Self::Object(object_type) => vec![object_type],
			Self::All => ObjectType::ALL.to_vec(),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiscoveryProjection {
	/// Identifier only, used to seed an identifier restriction.
	IdOnly,
	/// Identifier plus display fields, used when discovery is the final answer.
	Display { limit: u32 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscoveryQuery {
	phrase: String,
	target: DiscoveryTarget,
	projection: DiscoveryProjection,
}
impl DiscoveryQuery {
	/// Joins already-sanitized keywords into one phrase.
	pub fn new<S>(
		keywords: &[S],
		target: DiscoveryTarget,
		projection: DiscoveryProjection,
	) -> Result<Self, QueryBuildError>
	where
		S: AsRef<str>,
	{
		let phrase = keywords
			.iter()
			.map(|keyword| keyword.as_ref().trim())
			.filter(|keyword| !keyword.is_empty())
			.collect::<Vec<_>>()
			.join(" ");

		if phrase.is_empty() {
			return Err(QueryBuildError::EmptyKeywords);
		}

		Ok(Self { phrase, target, projection })
	}

	pub fn phrase(&self) -> &str {
		&self.phrase
	}

	pub fn target(&self) -> DiscoveryTarget {
		self.target
	}

	pub fn projection(&self) -> DiscoveryProjection {
		self.projection
	}

	pub fn render(&self) -> String {
		let returning = self
			.target
			.object_types()
			.into_iter()
			.map(|object_type| match self.projection {
				DiscoveryProjection::IdOnly => format!("{}(Id)", object_type.api_name()),
				DiscoveryProjection::Display { limit } => format!(
					"{}({} LIMIT {limit})",
					object_type.api_name(),
					object_type.display_fields().join(", ")
				),
			})
			.collect::<Vec<_>>()
			.join(", ");

		format!("FIND {{{}}} RETURNING {returning}", escape_phrase(&self.phrase))
	}
}

/// Outcome of building a structured query.
#[derive(Clone, Debug, PartialEq)]
pub enum BuiltQuery {
	Ready(StructuredQuery),
	/// The identifier restriction was present but empty; nothing can match.
	NoMatchingRecords,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StructuredQuery {
	object_type: ObjectType,
	fields: Vec<&'static str>,
	id_restriction: Option<Vec<String>>,
	predicates: Vec<String>,
	limit: u32,
}
impl StructuredQuery {
	pub fn builder(object_type: ObjectType, limit: u32) -> StructuredQueryBuilder {
		StructuredQueryBuilder {
			object_type,
			fields: object_type.fields().to_vec(),
			id_restriction: None,
			predicates: Vec::new(),
			limit,
		}
	}

	pub fn object_type(&self) -> ObjectType {
		self.object_type
	}

	pub fn fields(&self) -> &[&'static str] {
		&self.fields
	}

	pub fn id_restriction(&self) -> Option<&[String]> {
		self.id_restriction.as_deref()
	}

	pub fn predicates(&self) -> &[String] {
		&self.predicates
	}

	pub fn limit(&self) -> u32 {
		self.limit
	}

	pub fn render(&self) -> String {
		let mut clauses = Vec::with_capacity(self.predicates.len() + 1);

		if let Some(ids) = self.id_restriction.as_ref() {
			let quoted = ids.iter().map(|id| quote_literal(id)).collect::<Vec<_>>().join(",");

			clauses.push(format!("Id IN ({quoted})"));
		}

		clauses.extend(self.predicates.iter().cloned());

		let mut soql =
			format!("SELECT {} FROM {}", self.fields.join(", "), self.object_type.api_name());

		if !clauses.is_empty() {
			soql.push_str(" WHERE ");
			soql.push_str(&clauses.join(" AND "));
		}

		soql.push_str(&format!(" ORDER BY {ORDER_BY} LIMIT {}", self.limit));

		soql
	}
}

pub struct StructuredQueryBuilder {
	object_type: ObjectType,
	fields: Vec<&'static str>,
	id_restriction: Option<Vec<String>>,
	predicates: Vec<String>,
	limit: u32,
}
impl StructuredQueryBuilder {
	pub fn predicates(mut self, predicates: Vec<String>) -> Self {
		self.predicates = predicates;

		self
	}

	pub fn restrict_to_ids(mut self, ids: Vec<String>) -> Self {
		self.id_restriction = Some(ids);

		self
	}

	pub fn build(self) -> BuiltQuery {
		if self.id_restriction.as_ref().is_some_and(Vec::is_empty) {
			return BuiltQuery::NoMatchingRecords;
		}

		BuiltQuery::Ready(StructuredQuery {
			object_type: self.object_type,
			fields: self.fields,
			id_restriction: self.id_restriction,
			predicates: self.predicates,
			limit: self.limit,
		})
	}
}

/// Single-quoted string literal with backslash escapes.
pub fn quote_literal(raw: &str) -> String {
	format!("'{}'", raw.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn escape_phrase(phrase: &str) -> String {
	let mut escaped = String::with_capacity(phrase.len());

	for c in phrase.chars() {
		if DISCOVERY_ESCAPED.contains(&c) {
			escaped.push('\\');
		}

		escaped.push(c);
	}

	escaped
}
