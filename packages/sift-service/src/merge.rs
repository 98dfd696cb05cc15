use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use sift_domain::ObjectType;

/// Final results keyed by bucket name (`cases`, `accounts`, `opportunities`, `contacts`).
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultBuckets(BTreeMap<String, Vec<Value>>);
impl ResultBuckets {
	pub fn get(&self, object_type: ObjectType) -> Option<&[Value]> {
		self.0.get(object_type.bucket()).map(Vec::as_slice)
	}

	pub fn total(&self) -> usize {
		self.0.values().map(Vec::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.total() == 0
	}

	pub fn buckets(&self) -> impl Iterator<Item = (&str, &[Value])> {
		self.0.iter().map(|(name, records)| (name.as_str(), records.as_slice()))
	}
}

/// Folds per-query record lists into buckets. The first record seen for a backend
/// identifier wins; records without an identifier are kept as-is.
#[derive(Debug, Default)]
pub struct ResultMerger {
	buckets: BTreeMap<String, Vec<Value>>,
	seen: HashSet<(ObjectType, String)>,
}
impl ResultMerger {
	pub fn new() -> Self {
		Self::default()
	}

	/// Makes the bucket for `object_type` present even if nothing lands in it.
	pub fn ensure(&mut self, object_type: ObjectType) {
		self.buckets.entry(object_type.bucket().to_string()).or_default();
	}

	/// Returns `false` when the record was a duplicate and dropped.
	pub fn push(&mut self, object_type: ObjectType, record: Value) -> bool {
		let id = record.get("Id").and_then(Value::as_str).map(str::to_string);

		if id.is_some_and(|id| !self.seen.insert((object_type, id))) {
			return false;
		}

		self.buckets.entry(object_type.bucket().to_string()).or_default().push(record);

		true
	}

	pub fn extend<I>(&mut self, object_type: ObjectType, records: I) -> usize
	where
		I: IntoIterator<Item = Value>,
	{
		self.ensure(object_type);

		let mut added = 0;

		for record in records {
			if self.push(object_type, record) {
				added += 1;
			}
		}

		added
	}

	pub fn finish(self) -> ResultBuckets {
		ResultBuckets(self.buckets)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn first_seen_record_wins() {
		let mut merger = ResultMerger::new();

		merger.extend(
			ObjectType::Opportunity,
			[
				serde_json::json!({ "Id": "006A", "Name": "first" }),
				serde_json::json!({ "Id": "006B" }),
			],
		);

		let added = merger.extend(
			ObjectType::Opportunity,
			[serde_json::json!({ "Id": "006A", "Name": "second" })],
		);
		let buckets = merger.finish();
		let records = buckets.get(ObjectType::Opportunity).expect("missing bucket");

		assert_eq!(added, 0);
		assert_eq!(records.len(), 2);
		assert_eq!(records[0]["Name"], "first");
	}

	#[test]
	fn identical_ids_in_different_families_are_distinct() {
		let mut merger = ResultMerger::new();

		merger.push(ObjectType::Case, serde_json::json!({ "Id": "X" }));
		merger.push(ObjectType::Account, serde_json::json!({ "Id": "X" }));

		assert_eq!(merger.finish().total(), 2);
	}

	#[test]
	fn ensured_buckets_serialize_as_empty_lists() {
		let mut merger = ResultMerger::new();

		merger.ensure(ObjectType::Contact);

		let json = serde_json::to_value(merger.finish()).expect("serialize failed");

		assert_eq!(json, serde_json::json!({ "contacts": [] }));
	}
}
